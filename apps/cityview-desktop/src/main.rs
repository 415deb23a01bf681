use anyhow::{Context, Result};
use cityview_assets::{AssetManifest, SceneAssets};
use cityview_input::{Action, InputState, Key};
use cityview_render::FramePlan;
use cityview_render_wgpu::{
    ErrorScope, WgpuRenderer, fill_mode_features, install_uncaptured_error_handler,
};
use cityview_scene::{Scene, SceneConfig};
use clap::Parser;
use egui::Context as EguiContext;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

#[derive(Parser)]
#[command(name = "cityview-desktop", about = "Interactive 3D city scene viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Root directory the asset manifest paths are relative to
    #[arg(long, default_value = ".")]
    assets: PathBuf,

    /// Asset manifest (JSON); built-in paths when omitted
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Scene configuration (JSON); built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Initial window width in pixels
    #[arg(long, default_value = "1024")]
    width: u32,

    /// Initial window height in pixels
    #[arg(long, default_value = "768")]
    height: u32,
}

fn map_key(code: KeyCode) -> Option<Key> {
    let key = match code {
        KeyCode::Digit1 => Key::Digit1,
        KeyCode::Digit2 => Key::Digit2,
        KeyCode::Digit3 => Key::Digit3,
        KeyCode::Digit4 => Key::Digit4,
        KeyCode::Digit5 => Key::Digit5,
        KeyCode::Digit6 => Key::Digit6,
        KeyCode::Digit7 => Key::Digit7,
        KeyCode::Digit8 => Key::Digit8,
        KeyCode::Digit9 => Key::Digit9,
        KeyCode::KeyA => Key::A,
        KeyCode::KeyC => Key::C,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyE => Key::E,
        KeyCode::KeyI => Key::I,
        KeyCode::KeyM => Key::M,
        KeyCode::KeyN => Key::N,
        KeyCode::KeyQ => Key::Q,
        KeyCode::KeyR => Key::R,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyT => Key::T,
        KeyCode::KeyU => Key::U,
        KeyCode::KeyV => Key::V,
        KeyCode::KeyW => Key::W,
        KeyCode::KeyY => Key::Y,
        KeyCode::Escape => Key::Escape,
        KeyCode::F1 => Key::F1,
        _ => return None,
    };
    Some(key)
}

/// Viewer state owned by the frame loop.
struct Viewer {
    scene: Scene,
    input: InputState,
    show_hud: bool,
    /// Raw device motion drives the camera while the cursor is locked;
    /// otherwise absolute cursor positions are differenced.
    pointer_locked: bool,
}

impl Viewer {
    fn new(scene: Scene) -> Self {
        Self {
            scene,
            input: InputState::new(),
            show_hud: true,
            pointer_locked: false,
        }
    }

    fn handle_device_event(&mut self, event: &DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event
            && self.pointer_locked
        {
            self.input.add_pointer_delta(delta.0, delta.1);
        }
    }

    fn draw_hud(&self, ctx: &EguiContext) {
        if !self.show_hud {
            return;
        }
        let scene = &self.scene;
        let position = scene.camera().position();
        egui::Window::new("cityview")
            .resizable(false)
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.label(format!("Frame: {}", scene.frame()));
                ui.label(format!(
                    "Camera: ({:.1}, {:.1}, {:.1})",
                    position.x, position.y, position.z
                ));
                ui.label(format!("Light angle: {:.0}°", scene.light.angle));
                ui.separator();
                ui.label(format!(
                    "Fog: {} (density {:.3})",
                    on_off(scene.fog.enabled),
                    scene.fog.density()
                ));
                ui.label(format!("Spotlight: {}", on_off(scene.spotlight.enabled)));
                ui.label(format!("Collision: {}", on_off(scene.collision.enabled)));
                ui.label(format!(
                    "Preview: {}",
                    on_off(scene.animation.preview_active)
                ));
                ui.label(format!(
                    "Car: {} (distance {:.2}, wheels {:.0}°)",
                    on_off(scene.animation.car_active),
                    scene.animation.car_distance,
                    scene.animation.wheel_angle
                ));
                ui.label(format!("Fill mode: {}", scene.fill_mode.name()));
                ui.separator();
                ui.small(
                    "WASD/RT: Move | Mouse: Look | N/M: Collision | 1/2: Preview | \
                     3/4: Fog | 5/6: Density | C/V: Spotlight | 7/8/9: Fill | \
                     Q/E: Light | Y/U/I: Car | F1: HUD | Esc: Quit",
                );
            });
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}

/// Window, device and per-surface resources. Exists only after a
/// successful `resumed`.
struct GpuState {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl GpuState {
    fn new(
        event_loop: &ActiveEventLoop,
        size: PhysicalSize<u32>,
        shadow_map_size: u32,
        assets: &SceneAssets,
        egui_ctx: &EguiContext,
    ) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("cityview")
            .with_inner_size(size);
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window.clone())
            .context("failed to create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no compatible GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("cityview_device"),
                required_features: fill_mode_features(&adapter),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("failed to create device")?;
        install_uncaptured_error_handler(&device);

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no texture formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(
            &device,
            &queue,
            surface_format,
            (config.width, config.height),
            shadow_map_size,
            assets,
        )
        .context("failed to build renderer")?;

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );
        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height.max(1) as f32
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
        tracing::info!(
            width = self.config.width,
            height = self.config.height,
            "resized"
        );
    }

    /// Lock the cursor to the window, falling back to confining it.
    /// Returns whether it is locked.
    fn grab_cursor(&self) -> bool {
        self.window.set_cursor_visible(false);
        match self.window.set_cursor_grab(CursorGrabMode::Locked) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!("cursor lock unavailable ({e}), confining instead");
                if let Err(e) = self.window.set_cursor_grab(CursorGrabMode::Confined) {
                    tracing::warn!("failed to grab cursor: {e}");
                }
                false
            }
        }
    }

    fn render_frame(&mut self, viewer: &mut Viewer, egui_ctx: &EguiContext) {
        viewer.scene.step(&mut viewer.input);
        let plan = FramePlan::build(&viewer.scene, self.aspect());

        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.renderer
            .render(&self.device, &self.queue, &view, &plan);

        let raw_input = self.egui_winit.take_egui_input(&self.window);
        let full_output = egui_ctx.run(raw_input, |ctx| viewer.draw_hud(ctx));
        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);
        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        let scope = ErrorScope::push(&self.device);
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
        scope.finish();

        output.present();
        self.window.request_redraw();
    }
}

struct GpuApp {
    viewer: Viewer,
    assets: SceneAssets,
    initial_size: PhysicalSize<u32>,
    gpu: Option<GpuState>,
    egui_ctx: EguiContext,
    init_error: Option<anyhow::Error>,
}

impl GpuApp {
    fn new(scene: Scene, assets: SceneAssets, initial_size: PhysicalSize<u32>) -> Self {
        Self {
            viewer: Viewer::new(scene),
            assets,
            initial_size,
            gpu: None,
            egui_ctx: EguiContext::default(),
            init_error: None,
        }
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, key: Key, pressed: bool) {
        match self.viewer.input.set_key(key, pressed) {
            Some(Action::Exit) => {
                tracing::info!("escape pressed, closing");
                event_loop.exit();
            }
            Some(Action::ToggleHud) => {
                self.viewer.show_hud = !self.viewer.show_hud;
                tracing::debug!(visible = self.viewer.show_hud, "hud toggled");
            }
            Some(action) => self.viewer.scene.apply(action),
            None => {}
        }
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        let shadow_map_size = self.viewer.scene.config().shadow.map_size;
        match GpuState::new(
            event_loop,
            self.initial_size,
            shadow_map_size,
            &self.assets,
            &self.egui_ctx,
        ) {
            Ok(gpu) => {
                self.viewer.pointer_locked = gpu.grab_cursor();
                self.gpu = Some(gpu);
            }
            Err(e) => {
                tracing::error!("initialization failed: {e:#}");
                self.init_error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
        if response.consumed {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                gpu.resize(new_size);
            }
            WindowEvent::Focused(false) => {
                self.viewer.input.release_all();
            }
            WindowEvent::Focused(true) => {
                self.viewer.pointer_locked = gpu.grab_cursor();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => {
                if let Some(key) = map_key(code) {
                    self.handle_key(event_loop, key, state == ElementState::Pressed);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if !self.viewer.pointer_locked {
                    self.viewer.input.cursor_moved_to(position.x, position.y);
                }
            }
            WindowEvent::RedrawRequested => {
                gpu.render_frame(&mut self.viewer, &self.egui_ctx);
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        self.viewer.handle_device_event(&event);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("cityview-desktop starting");

    let config = match &cli.config {
        Some(path) => SceneConfig::load(path)?,
        None => SceneConfig::default(),
    };
    let scene = Scene::new(config).context("failed to set up scene")?;

    let manifest = match &cli.manifest {
        Some(path) => AssetManifest::load(path)?,
        None => AssetManifest::default(),
    };
    let assets = SceneAssets::load(&cli.assets, &manifest)
        .with_context(|| format!("failed to load assets from {}", cli.assets.display()))?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(scene, assets, PhysicalSize::new(cli.width, cli.height));
    event_loop.run_app(&mut app)?;

    match app.init_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_motion_only_counts_while_locked() {
        let scene = Scene::new(SceneConfig::default()).unwrap();
        let mut viewer = Viewer::new(scene);
        let motion = DeviceEvent::MouseMotion { delta: (3.0, -2.0) };

        viewer.handle_device_event(&motion);
        let delta = viewer.input.take_pointer_delta();
        assert_eq!((delta.x, delta.y), (0.0, 0.0));

        viewer.pointer_locked = true;
        viewer.handle_device_event(&motion);
        viewer.handle_device_event(&motion);
        let delta = viewer.input.take_pointer_delta();
        assert_eq!((delta.x, delta.y), (6.0, -4.0));
    }

    #[test]
    fn every_bound_key_has_a_key_code() {
        let codes = [
            KeyCode::Digit1,
            KeyCode::Digit9,
            KeyCode::KeyW,
            KeyCode::KeyY,
            KeyCode::Escape,
            KeyCode::F1,
        ];
        for code in codes {
            assert!(map_key(code).is_some(), "{code:?} unmapped");
        }
        assert_eq!(map_key(KeyCode::KeyQ), Some(Key::Q));
    }

    #[test]
    fn unbound_key_codes_are_ignored() {
        assert_eq!(map_key(KeyCode::KeyZ), None);
        assert_eq!(map_key(KeyCode::Space), None);
    }

    #[test]
    fn cli_defaults() {
        let cli = Cli::parse_from(["cityview-desktop"]);
        assert_eq!(cli.assets, PathBuf::from("."));
        assert_eq!((cli.width, cli.height), (1024, 768));
        assert!(cli.config.is_none());
        assert!(!cli.verbose);
    }
}
