#![cfg_attr(target_os = "windows", windows_subsystem = "windows")]

use clap::Parser;
use egui_wgpu::ScreenDescriptor;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use winit::{
    dpi::{LogicalSize, PhysicalSize},
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder,
};

mod config;
mod flash;
mod key_entry;
mod page;
mod session;
mod shortcut;
mod store;
mod topbar;

use config::AppConfig;
use key_entry::KeyEntry;
use session::{BrowserHelp, LoggingSessionStarter};
use shortcut::KeyChord;
use store::{JsonFileStore, KeyValueStore, MemoryStore};

const WINDOW_WIDTH: f64 = 640.0;
const WINDOW_HEIGHT: f64 = 400.0;

type AppKeyEntry = KeyEntry<Box<dyn KeyValueStore>, LoggingSessionStarter, BrowserHelp>;

struct UiState {
    entry: AppKeyEntry,
    title: String,
    close_requested: bool,
}

#[derive(Debug, Error)]
enum GpuInitError {
    #[error("failed to create window surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no GPU adapter can present to this window")]
    NoAdapter,
    #[error("window surface reports no supported formats")]
    NoSurfaceFormat,
    #[error("failed to open GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}

struct State {
    window: Arc<winit::window::Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
}

impl State {
    async fn new(window: Arc<winit::window::Window>) -> Result<Self, GpuInitError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuInitError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or(GpuInitError::NoSurfaceFormat)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo),
            desired_maximum_frame_latency: 2,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            size,
        })
    }

    fn window(&self) -> &winit::window::Window {
        self.window.as_ref()
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
    }

    fn render_with_egui(
        &mut self,
        egui_renderer: &mut egui_wgpu::Renderer,
        paint_jobs: &[egui::epaint::ClippedPrimitive],
        screen_desc: &ScreenDescriptor,
    ) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render encoder"),
            });

        egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            paint_jobs,
            screen_desc,
        );

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("render pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.09,
                            g: 0.09,
                            b: 0.09,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            egui_renderer.render(&mut rpass, paint_jobs, screen_desc);
        }

        self.queue.submit(Some(encoder.finish()));
        output.present();
        Ok(())
    }
}

fn build_ui(ctx: &egui::Context, ui_state: &mut UiState, window: &winit::window::Window) {
    let panel_stroke = egui::Stroke::new(1.0, egui::Color32::from_gray(60));

    egui::CentralPanel::default()
        .frame(
            egui::Frame::none()
                .fill(egui::Color32::from_gray(24))
                .stroke(panel_stroke),
        )
        .show(ctx, |ui| {
            let full = ui.max_rect();
            let header_rect = egui::Rect::from_min_size(
                full.min,
                egui::vec2(full.width(), topbar::TOPBAR_HEIGHT),
            );
            let body_rect =
                egui::Rect::from_min_max(egui::pos2(full.left(), header_rect.bottom()), full.max);

            ui.allocate_ui_at_rect(header_rect, |ui| {
                let action = topbar::render(ui, &ui_state.title, egui::Color32::from_gray(30));
                if action.request_minimize {
                    window.set_minimized(true);
                }
                if action.request_drag_window {
                    if let Err(err) = window.drag_window() {
                        tracing::debug!(error = %err, "window drag not available");
                    }
                }
                if action.request_close {
                    ui_state.close_requested = true;
                }
            });

            ui.allocate_ui_at_rect(body_rect, |ui| {
                page::render(ui, &mut ui_state.entry);
            });
        });
}

fn open_store(config: &AppConfig) -> Box<dyn KeyValueStore> {
    if config.ephemeral {
        tracing::info!("using in-memory key store");
        return Box::new(MemoryStore::new());
    }
    let path = config
        .store
        .clone()
        .unwrap_or_else(JsonFileStore::default_path);
    match JsonFileStore::open_or_recover(&path) {
        Ok(store) => {
            tracing::info!(path = %store.path().display(), "using key store file");
            Box::new(store)
        }
        Err(err) => {
            tracing::warn!(error = %err, "key store unavailable, keeping the key in memory only");
            Box::new(MemoryStore::new())
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let config = AppConfig::parse();
    let platform = config.host_platform();

    let store = open_store(&config);
    let entry = KeyEntry::load(
        store,
        LoggingSessionStarter::default(),
        BrowserHelp::new(config.help_url.clone()),
        platform,
    );

    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.title.as_str())
            .with_inner_size(LogicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT))
            .with_min_inner_size(LogicalSize::new(420.0, 260.0))
            .with_decorations(false)
            .with_visible(false)
            .build(&event_loop)?,
    );

    let mut state = pollster::block_on(State::new(window.clone()))?;
    let egui_ctx = egui::Context::default();
    egui_ctx.set_visuals(egui::Visuals::dark());
    let mut egui_state = egui_winit::State::new(
        egui_ctx.clone(),
        egui::ViewportId::ROOT,
        window.as_ref(),
        None,
        None,
    );
    let mut egui_renderer = egui_wgpu::Renderer::new(&state.device, state.config.format, None, 1);

    let mut ui_state = UiState {
        entry,
        title: config.title,
        close_requested: false,
    };
    let mut window_shown = false;
    let mut next_repaint: Option<Instant> = Some(Instant::now());
    let mut current_modifiers = winit::event::Modifiers::default();

    tracing::info!(?platform, "key entry window ready");

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, window_id } if window_id == state.window().id() => {
            if let WindowEvent::ModifiersChanged(mods) = &event {
                current_modifiers = mods.clone();
            }

            // The start accelerator is handled before egui sees the key so the
            // text field never receives it.
            let mut consumed = false;
            if let WindowEvent::KeyboardInput { ref event, .. } = event {
                if event.state.is_pressed() {
                    if let Some(chord) =
                        KeyChord::from_winit(&event.logical_key, current_modifiers.state())
                    {
                        consumed = ui_state.entry.handle_key(&chord, Instant::now());
                    }
                }
            }
            if consumed {
                next_repaint = Some(Instant::now());
            } else {
                let response = egui_state.on_window_event(window.as_ref(), &event);
                if response.repaint {
                    window.request_redraw();
                }
            }

            match event {
                WindowEvent::CloseRequested => elwt.exit(),
                WindowEvent::Resized(size) => {
                    state.resize(size);
                    window.request_redraw();
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    ui_state.entry.tick(now);

                    let raw_input = egui_state.take_egui_input(window.as_ref());
                    let full_output = egui_ctx.run(raw_input, |ctx| {
                        build_ui(ctx, &mut ui_state, window.as_ref());
                    });

                    if ui_state.close_requested {
                        elwt.exit();
                        return;
                    }

                    let repaint_delay = full_output
                        .viewport_output
                        .get(&egui::ViewportId::ROOT)
                        .map(|viewport| viewport.repaint_delay)
                        .unwrap_or(Duration::MAX);
                    let flash_delay = ui_state.entry.next_wakeup(now).unwrap_or(Duration::MAX);
                    next_repaint = now.checked_add(repaint_delay.min(flash_delay));

                    egui_state
                        .handle_platform_output(window.as_ref(), full_output.platform_output);

                    let paint_jobs =
                        egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
                    let screen_desc = ScreenDescriptor {
                        size_in_pixels: [state.config.width, state.config.height],
                        pixels_per_point: full_output.pixels_per_point,
                    };

                    for (id, image_delta) in &full_output.textures_delta.set {
                        egui_renderer.update_texture(
                            &state.device,
                            &state.queue,
                            *id,
                            image_delta,
                        );
                    }

                    match state.render_with_egui(&mut egui_renderer, &paint_jobs, &screen_desc) {
                        Ok(()) => {}
                        Err(wgpu::SurfaceError::Lost) => state.resize(state.size),
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            tracing::error!("GPU out of memory, exiting");
                            elwt.exit();
                        }
                        Err(err) => tracing::debug!(error = %err, "skipped frame"),
                    }

                    for id in &full_output.textures_delta.free {
                        egui_renderer.free_texture(id);
                    }
                }
                _ => {}
            }
        }
        Event::AboutToWait => {
            // Some platforms never redraw a hidden window, so show it here.
            if !window_shown {
                state.window().set_visible(true);
                window_shown = true;
            }
            match next_repaint {
                Some(at) if at <= Instant::now() => {
                    next_repaint = None;
                    elwt.set_control_flow(ControlFlow::Wait);
                    state.window().request_redraw();
                }
                Some(at) => elwt.set_control_flow(ControlFlow::WaitUntil(at)),
                None => elwt.set_control_flow(ControlFlow::Wait),
            }
        }
        _ => {}
    })?;
    Ok(())
}
