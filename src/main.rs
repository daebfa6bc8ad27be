use clap::Parser;
use orrery::{CliArgs, Config};

fn main() {
    let args = CliArgs::parse();

    // Resolve config directory
    let config_dir = args.config.clone().unwrap_or_else(Config::default_dir);
    let config_path = Config::file_path(&config_dir);
    let existed = config_path.exists();

    // Load or create config, then apply CLI overrides. Logging needs the
    // config, so the outcome is reported once the subscriber is up.
    let (mut config, load_error) = match Config::load_or_create(&config_dir) {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    config.apply_cli_overrides(&args);

    orrery::logging::init_logging(Some(&config));
    match load_error {
        Some(e) => tracing::warn!(
            path = %config_path.display(),
            error = %e,
            "Failed to load config, using defaults"
        ),
        None if existed => tracing::info!(path = %config_path.display(), "Loaded config"),
        None => tracing::info!(path = %config_path.display(), "Created default config"),
    }
    tracing::info!(
        textures = %config.assets.texture_root.display(),
        "Starting orrery"
    );

    if let Err(e) = orrery::run(config) {
        tracing::error!(error = %e, "Event loop terminated");
        std::process::exit(1);
    }
}
