//! Window lifecycle: the winit event loop that drives the engine through its
//! load, update, render and unload phases.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::config::AppConfig;
use crate::engine::Engine;
use crate::scheduler::FrameScheduler;

/// Run Horizon until the window is closed.
///
/// Returns the error that stopped the engine, if any: a failed load (GPU,
/// shaders, meshes) or a fatal render error.
///
/// # Example
/// ```no_run
/// let config = horizon::AppConfig::new().title("Cubes").size(800, 600);
/// horizon::run(config).unwrap();
/// ```
pub fn run(config: AppConfig) -> anyhow::Result<()> {
    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = HorizonApp::Pending { config };
    event_loop
        .run_app(&mut app)
        .context("event loop terminated with error")?;

    match app {
        HorizonApp::Exited { error: Some(error) } => Err(error),
        HorizonApp::Running { engine, .. } => {
            // The platform stopped the loop without an exit notification
            engine.unload();
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Application lifecycle.
///
/// `Pending` until the platform allows creating a window, `Running` while
/// the engine is loaded, `Exited` once it has been unloaded.
enum HorizonApp {
    Pending {
        config: AppConfig,
    },
    Running {
        window: Arc<Window>,
        engine: Engine,
        scheduler: FrameScheduler,
    },
    Exited {
        error: Option<anyhow::Error>,
    },
}

impl HorizonApp {
    fn start(event_loop: &ActiveEventLoop, config: &AppConfig) -> anyhow::Result<Self> {
        let window_attrs = WindowAttributes::default()
            .with_title(&config.window.title)
            .with_inner_size(winit::dpi::LogicalSize::new(
                config.window.width,
                config.window.height,
            ));

        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .context("failed to create window")?,
        );
        log::info!("Window loaded");

        let engine =
            Engine::load(Arc::clone(&window), config).context("failed to load engine")?;
        let scheduler =
            FrameScheduler::new(config.timing.update_rate_hz, config.timing.render_rate_hz);

        Ok(HorizonApp::Running {
            window,
            engine,
            scheduler,
        })
    }

    /// Unloads the engine if it is running and stops the event loop.
    fn shutdown(&mut self, event_loop: &ActiveEventLoop, error: Option<anyhow::Error>) {
        let previous = std::mem::replace(self, HorizonApp::Exited { error });
        if let HorizonApp::Running { engine, .. } = previous {
            engine.unload();
        }
        event_loop.exit();
    }
}

impl ApplicationHandler for HorizonApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let HorizonApp::Pending { config } = self else {
            return;
        };

        match Self::start(event_loop, config) {
            Ok(running) => *self = running,
            Err(err) => {
                log::error!("{err:#}");
                self.shutdown(event_loop, Some(err));
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let HorizonApp::Running {
            engine, scheduler, ..
        } = self
        else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                self.shutdown(event_loop, None);
            }
            WindowEvent::Resized(size) => {
                engine.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                let tick = scheduler.tick(Instant::now());

                for _ in 0..tick.updates {
                    engine.update(tick.update_dt);
                }

                if let Some(dt) = tick.render_dt {
                    if let Err(err) = engine.render(dt) {
                        log::error!("Fatal render error: {err}");
                        self.shutdown(event_loop, Some(err.into()));
                    }
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let HorizonApp::Running {
            window, scheduler, ..
        } = self
        else {
            return;
        };

        match scheduler.next_deadline() {
            Some(deadline) if deadline > Instant::now() => {
                event_loop.set_control_flow(ControlFlow::WaitUntil(deadline));
            }
            _ => {
                event_loop.set_control_flow(ControlFlow::Poll);
                window.request_redraw();
            }
        }
    }

    fn exiting(&mut self, event_loop: &ActiveEventLoop) {
        if matches!(self, HorizonApp::Running { .. }) {
            self.shutdown(event_loop, None);
        }
    }
}
