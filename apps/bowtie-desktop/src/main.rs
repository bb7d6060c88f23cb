use anyhow::{Context, Result};
use bowtie_render::{GlView, RecordingBackend, subsec_millis_now};
use bowtie_render_wgpu::WgpuBackend;
use clap::{Parser, ValueEnum};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Fullscreen, Window, WindowId};

#[derive(Parser)]
#[command(name = "bowtie", about = "Phong-lit bowtie mesh with a frame counter")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Open a 1280x720 window instead of going full-screen
    #[arg(long)]
    windowed: bool,

    /// Graphics API to render with
    #[arg(long, value_enum, default_value_t = BackendArg::Auto)]
    backend: BackendArg,

    /// Drive the render loop without a window or GPU and print what it did
    #[arg(long)]
    headless: bool,

    /// Number of frames to run in headless mode
    #[arg(long, default_value = "120")]
    frames: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BackendArg {
    Auto,
    Vulkan,
    Metal,
    Dx12,
    Gl,
}

impl BackendArg {
    fn backends(self) -> wgpu::Backends {
        match self {
            BackendArg::Auto => wgpu::Backends::all(),
            BackendArg::Vulkan => wgpu::Backends::VULKAN,
            BackendArg::Metal => wgpu::Backends::METAL,
            BackendArg::Dx12 => wgpu::Backends::DX12,
            BackendArg::Gl => wgpu::Backends::GL,
        }
    }
}

struct DesktopApp {
    windowed: bool,
    backends: wgpu::Backends,
    window: Option<Arc<Window>>,
    view: Option<GlView<WgpuBackend>>,
    egui_winit: Option<egui_winit::State>,
    cursor: PhysicalPosition<f64>,
    error: Option<anyhow::Error>,
}

impl DesktopApp {
    fn new(cli: &Cli) -> Self {
        Self {
            windowed: cli.windowed,
            backends: cli.backend.backends(),
            window: None,
            view: None,
            egui_winit: None,
            cursor: PhysicalPosition::new(0.0, 0.0),
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes().with_title("bowtie");
        let attrs = if self.windowed {
            attrs.with_inner_size(PhysicalSize::new(1280u32, 720))
        } else {
            attrs.with_fullscreen(Some(Fullscreen::Borderless(None)))
        };
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: self.backends,
            ..Default::default()
        });
        let surface = instance
            .create_surface(window.clone())
            .context("failed to create drawing surface")?;

        let size = window.inner_size();
        let backend = WgpuBackend::new(&instance, surface, size.width, size.height)
            .context("failed to initialize graphics device")?;
        let egui_winit = egui_winit::State::new(
            backend.egui_context(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        let mut view = GlView::new(backend, subsec_millis_now());
        view.on_init().context("failed to initialize renderer")?;
        view.on_resize(size.width, size.height);

        self.window = Some(window);
        self.view = Some(view);
        self.egui_winit = Some(egui_winit);
        tracing::info!("renderer initialized");
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        tracing::error!("{err:#}");
        self.error = Some(err);
        event_loop.exit();
    }
}

impl ApplicationHandler for DesktopApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.init(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let (Some(egui_winit), Some(window)) = (&mut self.egui_winit, &self.window) {
            let response = egui_winit.on_window_event(window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(view) = &mut self.view {
                    view.on_resize(new_size.width, new_size.height);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = position;
                tracing::debug!("moved at : ({}, {})", position.x, position.y);
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                ..
            } => {
                tracing::debug!("touched at : ({}, {})", self.cursor.x, self.cursor.y);
            }
            WindowEvent::RedrawRequested => {
                let (Some(view), Some(egui_winit), Some(window)) =
                    (&mut self.view, &mut self.egui_winit, &self.window)
                else {
                    return;
                };
                view.backend_mut()
                    .set_overlay_input(egui_winit.take_egui_input(window));
                let result = view.on_frame(subsec_millis_now());
                if let Err(err) = result {
                    self.fail(event_loop, anyhow::Error::new(err).context("frame failed"));
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn run_headless(frames: u32) -> Result<()> {
    let mut view = GlView::new(RecordingBackend::new(), subsec_millis_now());
    view.on_init().context("failed to initialize renderer")?;
    view.on_resize(1280, 720);
    for _ in 0..frames {
        view.on_frame(subsec_millis_now())?;
    }
    print!("{}", view.backend().summary());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    tracing::info!("bowtie starting");

    if cli.headless {
        return run_headless(cli.frames);
    }

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = DesktopApp::new(&cli);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
