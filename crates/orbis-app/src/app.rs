//! Window, GPU and event handling via winit.
//!
//! [`AppState`] implements winit's [`ApplicationHandler`]. The globe engine
//! exists from startup; window-bound GPU state is created on `resumed`.
//! Each `RedrawRequested` runs exactly one tick followed by one composited
//! frame, and `about_to_wait` schedules the next redraw through the
//! [`FrameLimiter`].

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use orbis_config::{CliArgs, Config, Quality, QualityStore};
use orbis_globe::{
    ChartSet, FileTextureSource, GlobeEngine, GlobeRenderer, GlobeScene, Inbox, Outbox,
    SelectionEvent, Severity,
};
use orbis_input::{DesktopCapabilities, InputCapabilities, WinitPointerAdapter};
use orbis_render::{
    ClearPass, Compositor, FrameContext, FxaaPass, OutlinePass, RenderContext, ScenePass,
    SurfaceError, SurfaceResizeEvent, SurfaceWrapper, init_render_context_blocking,
};
use orbis_space::{StarfieldPass, StarfieldState};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Fullscreen, Window, WindowAttributes, WindowId};

use crate::frame_limiter::FrameLimiter;
use crate::loader::{ChartLoader, countries_or_demo};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("event loop failed: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

/// Returns [`WindowAttributes`] based on the given configuration.
pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    let attributes = WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            config.window.width as f64,
            config.window.height as f64,
        ));
    if config.window.fullscreen {
        attributes.with_fullscreen(Some(Fullscreen::Borderless(None)))
    } else {
        attributes
    }
}

/// Everything tied to the window surface.
struct Graphics {
    window: Arc<Window>,
    gpu: RenderContext,
    surface: SurfaceWrapper,
    compositor: Compositor,
    renderer: GlobeRenderer,
}

pub struct AppState {
    config: Config,
    config_dir: PathBuf,
    quality_store: QualityStore,
    /// Tier forced on the command line; never persisted.
    quality_override: Option<Quality>,
    engine: GlobeEngine,
    inbox: Inbox,
    charts: Option<ChartLoader>,
    textures: FileTextureSource,
    pointer: WinitPointerAdapter,
    limiter: FrameLimiter,
    graphics: Option<Graphics>,
}

impl AppState {
    /// Load country data and assemble the globe. Chart data is fetched in
    /// the background and merged in when it arrives.
    pub fn new(config: Config, config_dir: PathBuf, args: &CliArgs) -> Self {
        let countries = countries_or_demo(args.countries.as_deref());
        let scene = GlobeScene::build(&countries, &ChartSet::new(), &config.globe);
        let (outbox, inbox) = Outbox::channel();

        // Refined once the adapter is known.
        let quality = args.quality.unwrap_or(Quality::Low);
        let mut engine = GlobeEngine::new(scene, &config.globe, &config.input, quality, outbox);
        let touch_mode = config
            .input
            .touch_mode
            .or_else(|| DesktopCapabilities.prefers_touch().then_some(true));
        engine.controller_mut().set_touch_mode(touch_mode);
        engine.set_starfield_state(StarfieldState::Hyper);

        let images = args.images.clone().unwrap_or_else(|| PathBuf::from("."));
        Self {
            quality_store: QualityStore::new(&config_dir),
            quality_override: args.quality,
            engine,
            inbox,
            charts: Some(ChartLoader::spawn(args.charts.clone())),
            textures: FileTextureSource::new(images),
            pointer: WinitPointerAdapter::new(1.0),
            limiter: FrameLimiter::new(quality.target_fps(), Instant::now()),
            graphics: None,
            config,
            config_dir,
        }
    }

    pub fn engine(&self) -> &GlobeEngine {
        &self.engine
    }

    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> Option<Graphics> {
        let window = match event_loop.create_window(window_attributes_from_config(&self.config)) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Failed to create window: {e}");
                return None;
            }
        };
        let gpu = match init_render_context_blocking(window.clone(), self.config.window.vsync) {
            Ok(gpu) => gpu,
            Err(e) => {
                error!("GPU initialization failed: {e}");
                return None;
            }
        };

        let (adapter_name, device_class) = gpu.adapter_profile();
        let detected = Quality::detect(&adapter_name, device_class);
        let quality = self
            .quality_override
            .unwrap_or_else(|| self.quality_store.resolve(detected));
        info!(adapter = %adapter_name, ?detected, ?quality, "Quality tier");
        self.engine.set_quality(quality);
        self.limiter.set_target_fps(quality.target_fps());

        let scale_factor = window.scale_factor();
        let inner = window.inner_size();
        self.pointer.set_scale_factor(scale_factor);
        let surface = SurfaceWrapper::new(
            inner.width,
            inner.height,
            scale_factor,
            f64::from(self.config.render.pixel_ratio),
        );

        let render = &self.config.render;
        let mut compositor = Compositor::new(
            gpu.surface_format,
            surface.logical_width().round() as u32,
            surface.logical_height().round() as u32,
            surface.pixel_ratio(),
        );
        compositor.add_pass(Box::new(ClearPass::new(render.clear_color)));
        compositor.add_pass(Box::new(StarfieldPass::for_quality(quality)));
        compositor.add_pass(Box::new(ScenePass::new()));
        compositor.add_pass(Box::new(OutlinePass::new(
            render.outline_color,
            render.outline_thickness,
        )));
        compositor.add_pass(Box::new(FxaaPass::new()));
        compositor.set_enabled::<FxaaPass>(render.antialias);
        info!(
            passes = ?compositor.pass_labels().collect::<Vec<_>>(),
            "Compositor ready"
        );

        let renderer = GlobeRenderer::new(&gpu.device, &gpu.queue, gpu.surface_format);
        self.engine.resize(
            surface.logical_width() as f32,
            surface.logical_height() as f32,
        );

        Some(Graphics {
            window,
            gpu,
            surface,
            compositor,
            renderer,
        })
    }

    fn apply_resize(&mut self, resize: SurfaceResizeEvent) {
        let Some(graphics) = &mut self.graphics else {
            return;
        };
        graphics
            .gpu
            .resize(resize.physical.width, resize.physical.height);
        graphics.compositor.set_pixel_ratio(resize.pixel_ratio);
        graphics.compositor.set_size(
            resize.logical_width.round() as u32,
            resize.logical_height.round() as u32,
        );
        self.engine
            .resize(resize.logical_width as f32, resize.logical_height as f32);
        info!(
            "Resized to {}x{} (pixel ratio {:.2})",
            resize.physical.width, resize.physical.height, resize.pixel_ratio
        );
    }

    /// Switch tiers. Explicit user changes are persisted.
    fn apply_quality(&mut self, quality: Quality, persist: bool) {
        if !self.engine.set_quality(quality) {
            return;
        }
        self.limiter.set_target_fps(quality.target_fps());
        if let Some(graphics) = &mut self.graphics
            && let Some(starfield) = graphics.compositor.pass_mut::<StarfieldPass>()
        {
            starfield.apply_quality(quality);
        }
        if persist && let Err(e) = self.quality_store.save(quality) {
            warn!("Failed to save quality preference: {e}");
        }
        info!("Quality set to {}", quality.label());
    }

    fn handle_key(&mut self, event: &KeyEvent) {
        if event.state != ElementState::Pressed || event.repeat {
            return;
        }
        match &event.logical_key {
            Key::Named(NamedKey::Escape) => {
                self.engine.deselect();
            }
            Key::Character(c) if c.as_str().eq_ignore_ascii_case("q") => {
                let next = self.engine.quality().next();
                self.apply_quality(next, true);
            }
            Key::Character(c) if c.as_str().eq_ignore_ascii_case("r") => self.reload_config(),
            _ => {}
        }
    }

    /// Re-read `config.ron` and apply the render settings that can change
    /// live.
    fn reload_config(&mut self) {
        match self.config.reload(&self.config_dir) {
            Ok(Some(config)) => {
                if let Some(graphics) = &mut self.graphics {
                    let compositor = &mut graphics.compositor;
                    if let Some(clear) = compositor.pass_mut::<ClearPass>() {
                        clear.set_color(config.render.clear_color);
                    }
                    if let Some(outline) = compositor.pass_mut::<OutlinePass>() {
                        outline.set_color(config.render.outline_color);
                        outline.set_thickness(config.render.outline_thickness);
                    }
                    compositor.set_enabled::<FxaaPass>(config.render.antialias);
                }
                self.config = config;
            }
            Ok(None) => debug!("Config unchanged"),
            Err(e) => warn!("Config reload failed: {e}"),
        }
    }

    /// Merge chart data once the loader delivers it. The starfield halts
    /// behind the idle globe from then on.
    fn poll_charts(&mut self) {
        let Some(loader) = &mut self.charts else {
            return;
        };
        let Some(charts) = loader.try_take() else {
            return;
        };
        let added = self.engine.refresh_charts(&charts);
        info!(added, "Chart data merged");
        self.engine.set_starfield_state(StarfieldState::Halt);
        self.charts = None;
    }

    fn drain_events(&mut self) {
        for notification in self.inbox.drain_notifications() {
            match notification.severity {
                Severity::Info => info!(target: "orbis::notify", "{}", notification.message),
                Severity::Warning => warn!(target: "orbis::notify", "{}", notification.message),
                Severity::Error => error!(target: "orbis::notify", "{}", notification.message),
            }
        }
        for event in self.inbox.drain_selection() {
            let Some(graphics) = &self.graphics else {
                continue;
            };
            let title = &self.config.window.title;
            match event {
                SelectionEvent::Selected(name) => {
                    graphics.window.set_title(&format!("{title} | {name}"));
                }
                SelectionEvent::SelectionCleared => graphics.window.set_title(title),
                SelectionEvent::Hovered(_) => {}
            }
        }
    }

    fn render_frame(&mut self, event_loop: &ActiveEventLoop, dt: f32) {
        self.poll_charts();
        let motion = self.engine.tick(dt);
        self.drain_events();

        let Some(graphics) = &mut self.graphics else {
            return;
        };
        if !graphics.surface.is_configured() {
            return;
        }
        if let Some(starfield) = graphics.compositor.pass_mut::<StarfieldPass>() {
            starfield.set_motion(&motion);
        }

        let gpu = &graphics.gpu;
        graphics.renderer.prepare(
            &gpu.device,
            &gpu.queue,
            self.engine.scene(),
            self.engine.camera(),
            &self.textures,
        );

        let frame = match gpu.get_current_texture() {
            Ok(frame) => frame,
            Err(SurfaceError::Timeout) => {
                warn!("Surface timeout, skipping frame");
                return;
            }
            Err(e) => {
                error!("Surface error: {e}");
                event_loop.exit();
                return;
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("orbis-frame"),
            });
        {
            let mut context = FrameContext {
                device: &gpu.device,
                queue: &gpu.queue,
                encoder: &mut encoder,
                scene: &graphics.renderer,
                delta_time: dt,
            };
            graphics.compositor.render(&mut context, &view);
        }
        gpu.queue.submit(Some(encoder.finish()));
        graphics.window.pre_present_notify();
        frame.present();
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.graphics.is_some() {
            return;
        }
        match self.init_graphics(event_loop) {
            Some(graphics) => {
                graphics.window.request_redraw();
                self.graphics = Some(graphics);
            }
            None => event_loop.exit(),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(pointer) = self.pointer.convert(&event) {
            self.engine.handle_pointer(pointer);
            return;
        }
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                let resize = self
                    .graphics
                    .as_mut()
                    .and_then(|g| g.surface.handle_resize(size.width, size.height));
                if let Some(resize) = resize {
                    self.apply_resize(resize);
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.pointer.set_scale_factor(scale_factor);
                let resize = self.graphics.as_mut().map(|g| {
                    let inner = g.window.inner_size();
                    g.surface
                        .handle_scale_factor_changed(scale_factor, inner.width, inner.height)
                });
                if let Some(resize) = resize {
                    self.apply_resize(resize);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => self.handle_key(&event),
            WindowEvent::RedrawRequested => {
                // Redraws the OS asks for between scheduled frames advance nothing.
                let dt = self.limiter.poll(Instant::now()).unwrap_or(0.0);
                self.render_frame(event_loop, dt);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(graphics) = &self.graphics else {
            return;
        };
        if self.limiter.is_due(Instant::now()) {
            graphics.window.request_redraw();
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.limiter.next_deadline()));
    }
}

/// Create the event loop and run until the window closes.
pub fn run(config: Config, config_dir: PathBuf, args: &CliArgs) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    let mut app = AppState::new(config, config_dir, args);
    event_loop.run_app(&mut app)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_attributes_from_config() {
        let mut config = Config::default();
        config.window.title = "Globe".into();
        let attributes = window_attributes_from_config(&config);
        assert_eq!(attributes.title, "Globe");
        assert!(attributes.fullscreen.is_none());

        config.window.fullscreen = true;
        assert!(window_attributes_from_config(&config).fullscreen.is_some());
    }

    #[test]
    fn test_new_app_starts_hyper_with_demo_globe() {
        let dir = tempfile::tempdir().unwrap();
        let args = CliArgs {
            quality: Some(Quality::High),
            ..Default::default()
        };
        let app = AppState::new(Config::default(), dir.path().to_path_buf(), &args);
        assert_eq!(app.engine().starfield().state(), StarfieldState::Hyper);
        assert_eq!(app.engine().quality(), Quality::High);
        assert!(app.engine().scene().country_count() > 0);
        assert!(app.graphics.is_none());
    }

    #[test]
    fn test_starfield_halts_once_charts_arrive() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = AppState::new(
            Config::default(),
            dir.path().to_path_buf(),
            &CliArgs::default(),
        );
        assert_eq!(app.engine().starfield().state(), StarfieldState::Hyper);

        for _ in 0..500 {
            app.poll_charts();
            if app.charts.is_none() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        assert!(app.charts.is_none(), "chart loader never delivered");
        assert_eq!(app.engine().starfield().state(), StarfieldState::Halt);
        assert!(app.engine().scene().extrudable_count() > 0);
    }
}
