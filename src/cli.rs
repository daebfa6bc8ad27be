//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;

/// Orrery command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "orrery", about = "Interactive solar system")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Simulated days per real second.
    #[arg(long)]
    pub days_per_second: Option<f32>,

    /// Directory containing the planet textures.
    #[arg(long)]
    pub texture_root: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(days) = args.days_per_second {
            self.simulation.days_per_second = days;
        }
        if let Some(ref root) = args.texture_root {
            self.assets.texture_root = root.clone();
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            width: Some(1920),
            days_per_second: Some(10.0),
            texture_root: Some(PathBuf::from("assets/tex")),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.window.width, 1920);
        assert_eq!(config.simulation.days_per_second, 10.0);
        assert_eq!(config.assets.texture_root, PathBuf::from("assets/tex"));
        // Non-overridden fields retain defaults
        assert_eq!(config.window.height, 720);
        assert_eq!(config.debug.log_level, "info");
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_parse_flags() {
        let args = CliArgs::parse_from([
            "orrery",
            "--width",
            "800",
            "--log-level",
            "debug",
            "--config",
            "/tmp/orrery",
        ]);
        assert_eq!(args.width, Some(800));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert_eq!(args.config, Some(PathBuf::from("/tmp/orrery")));
        assert_eq!(args.height, None);
    }
}
