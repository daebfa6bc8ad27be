//! Window and event loop driving the simulation.

use std::sync::Arc;
use std::time::Instant;

use glam::Vec2;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::config::Config;
use crate::gpu::GpuContext;
use crate::input::Input;
use crate::renderer::Renderer;
use crate::simulation::SimulationContext;

/// Longest frame step fed to the simulation, in seconds.
///
/// Keeps a stalled window (dragging, breakpoints) from teleporting the planets.
const MAX_FRAME_DT: f32 = 0.1;

/// Open the window and run until it is closed.
///
/// GPU initialization failures are logged and end the loop; only errors of
/// the event loop itself are returned.
pub fn run(config: Config) -> Result<(), winit::error::EventLoopError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = OrreryApp::Pending { config };
    event_loop.run_app(&mut app)
}

enum OrreryApp {
    Pending {
        config: Config,
    },
    Running {
        window: Arc<Window>,
        gpu: GpuContext,
        renderer: Renderer,
        sim: SimulationContext,
        input: Input,
        last_frame: Instant,
    },
}

impl ApplicationHandler for OrreryApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let OrreryApp::Pending { config } = self else {
            return;
        };

        let window_attrs = WindowAttributes::default()
            .with_title(&config.window.title)
            .with_inner_size(winit::dpi::LogicalSize::new(
                config.window.width,
                config.window.height,
            ));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                tracing::error!(error = %e, "Failed to create window");
                event_loop.exit();
                return;
            }
        };

        let gpu = match GpuContext::new(window.clone(), config.window.vsync) {
            Ok(gpu) => gpu,
            Err(e) => {
                tracing::error!(error = %e, "Failed to initialize GPU");
                event_loop.exit();
                return;
            }
        };

        let renderer = Renderer::new(&gpu, config);
        let sim = SimulationContext::new(config);

        tracing::info!(
            width = gpu.width(),
            height = gpu.height(),
            format = ?gpu.config.format,
            "Window ready"
        );

        window.request_redraw();
        *self = OrreryApp::Running {
            window,
            gpu,
            renderer,
            sim,
            input: Input::new(),
            last_frame: Instant::now(),
        };
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let OrreryApp::Running {
            window,
            gpu,
            renderer,
            sim,
            input,
            last_frame,
        } = self
        else {
            return;
        };

        input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("Window closed");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                gpu.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = now
                    .duration_since(*last_frame)
                    .as_secs_f32()
                    .min(MAX_FRAME_DT);
                *last_frame = now;

                let viewport = Vec2::new(gpu.width() as f32, gpu.height() as f32);
                sim.update(dt, input, viewport);

                match renderer.render(gpu, sim) {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        gpu.reconfigure();
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        tracing::error!("GPU out of memory");
                        event_loop.exit();
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Dropped frame");
                    }
                }

                input.begin_frame();
                window.request_redraw();
            }
            _ => {}
        }
    }
}
