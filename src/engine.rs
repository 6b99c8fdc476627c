use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

use crate::audio::AudioManager;
use crate::camera::Camera;
use crate::canvas::{Canvas, Color};
use crate::config::EngineConfig;
use crate::debug::DebugOverlay;
use crate::error::{EngineError, ModuleError};
use crate::input::{normalize_wheel_lines, EventListener, EventRouter, InputEvent, InputState, ListenerId};
use crate::modules::{Module, ModuleRegistry};
use crate::renderer::Renderer;
use crate::resources::ResourceManager;
use crate::state::{State, StateMachine, Transition};
use crate::timing::{FixedTimestep, FrameStats};
use crate::viewport::Viewport;

const DEFAULT_TITLE: &str = "cadence2d";

/// Hook drawn after the current state, still inside viewport scaling.
pub type GlobalRender = Box<dyn FnMut(&mut Engine, &mut Canvas)>;

// ── Engine ──────────────────────────────────────────────────────────────────

/// Everything a state can reach while it runs.
pub struct Engine {
    config: EngineConfig,
    tick: u64,
    state_tick: u64,
    /// Mouse position and held buttons / keys, kept current by the router.
    pub input: InputState,
    pub viewport: Viewport,
    /// Game-driven: call `camera.update` from a state to ease it and receive
    /// its finish events.
    pub camera: Camera,
    pub debug: DebugOverlay,
    pub resources: ResourceManager,
    pub audio: AudioManager,
    pub modules: ModuleRegistry,
    /// Rolling buffer of recent frame times for the fps line.
    pub frame_stats: FrameStats,
    quit_requested: bool,
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// A context with no module loaded and audio running headless.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            viewport: Viewport::new(config.width, config.height, config.auto_scaling),
            debug: DebugOverlay::new(config.debug_toggle_key),
            resources: ResourceManager::new(config.asset_root.clone()),
            config,
            tick: 0,
            state_tick: 0,
            input: InputState::new(),
            camera: Camera::default(),
            audio: AudioManager::headless(),
            modules: ModuleRegistry::new(),
            frame_stats: FrameStats::new(),
            quit_requested: false,
        }
    }

    // ── Accessors ──────────────────────────────────────────────────────────

    pub fn config(&self) -> &EngineConfig { &self.config }
    /// Updates run since the engine started.
    pub fn tick(&self) -> u64 { self.tick }
    /// Updates run since the current state was entered.
    pub fn state_tick(&self) -> u64 { self.state_tick }
    /// Seconds simulated by one update.
    pub fn dt(&self) -> f32 { self.config.update_interval().as_secs_f32() }
    /// Internal game width, independent of the window size.
    pub fn width(&self) -> u32 { self.config.width }
    pub fn height(&self) -> u32 { self.config.height }

    /// Leave the current state and stop once the running update finishes.
    pub fn request_quit(&mut self) {
        self.quit_requested = true;
    }

    pub fn is_quit_requested(&self) -> bool { self.quit_requested }

    pub(crate) fn reset_state_tick(&mut self) {
        self.state_tick = 0;
    }

    /// Enable an optional module by name and perform its startup work.
    pub fn load_module(&mut self, name: &str) -> Result<Module, ModuleError> {
        let module = self.modules.load(name)?;
        self.on_module_loaded(module);
        Ok(module)
    }

    /// Enable every module not loaded yet.
    pub fn load_all_modules(&mut self) -> Vec<Module> {
        let loaded = self.modules.load_all();
        for module in &loaded {
            self.on_module_loaded(*module);
        }
        loaded
    }

    fn on_module_loaded(&mut self, module: Module) {
        match module {
            Module::AudioManager => {
                self.audio.start();
            }
            Module::Debug => self.debug.enabled = true,
            _ => {}
        }
        info!(module = %module, "module_loaded");
    }
}

// ── Runtime ─────────────────────────────────────────────────────────────────

/// What one call to [`Runtime::frame`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    pub updates: u32,
    pub rendered: bool,
}

/// The game loop without a window: fixed-step updates, one render per
/// frame, input dispatch and state transitions. [`EngineBuilder::run`]
/// drives one of these from winit.
pub struct Runtime {
    engine: Engine,
    router: EventRouter,
    states: StateMachine,
    timestep: FixedTimestep,
    canvas: Canvas,
    global_render: Option<GlobalRender>,
    clear_color: Color,
}

impl Runtime {
    /// Validate `config`, build the engine context and load the modules it
    /// lists. A module that fails to load is logged and skipped.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;

        let timestep = FixedTimestep::new(config.update_frequency).with_max_elapsed(config.max_frame_delta());
        let canvas = Canvas::new(config.width, config.height);
        let modules = config.load_modules.clone();

        let mut engine = Engine::new(config);
        for name in &modules {
            if let Err(e) = engine.load_module(name) {
                warn!(module = %name, error = %e, "module_load_failed");
            }
        }

        Ok(Self {
            engine,
            router: EventRouter::new(),
            states: StateMachine::new(),
            timestep,
            canvas,
            global_render: None,
            clear_color: Color::BLACK,
        })
    }

    pub fn with_global_render(mut self, hook: impl FnMut(&mut Engine, &mut Canvas) + 'static) -> Self {
        self.global_render = Some(Box::new(hook));
        self
    }

    pub fn with_clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    pub fn engine(&self) -> &Engine { &self.engine }
    pub fn engine_mut(&mut self) -> &mut Engine { &mut self.engine }
    pub fn canvas(&self) -> &Canvas { &self.canvas }
    pub fn router(&self) -> &EventRouter { &self.router }
    pub fn timestep(&self) -> &FixedTimestep { &self.timestep }

    pub fn current_state(&self) -> Option<&dyn State> {
        self.states.current()
    }

    pub fn add_listener(&mut self, listener: Box<dyn EventListener>) -> ListenerId {
        self.router.add_listener(listener)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.router.remove_listener(id)
    }

    /// Switch to `state` immediately.
    pub fn set_state(&mut self, state: Box<dyn State>) {
        self.states.set_state(&mut self.engine, &mut self.router, state);
    }

    pub fn should_quit(&self) -> bool {
        self.engine.quit_requested
    }

    /// Run every update that is due after `elapsed` of wall time, then render
    /// once. Nothing more runs after a quit request.
    pub fn frame(&mut self, elapsed: Duration) -> FrameReport {
        let due = self.timestep.advance(elapsed);

        let mut updates = 0;
        while updates < due && !self.should_quit() {
            self.update();
            updates += 1;
        }
        self.engine.frame_stats.record(elapsed, updates);

        if self.should_quit() {
            return FrameReport { updates, rendered: false };
        }
        self.render();
        FrameReport { updates, rendered: true }
    }

    /// One fixed simulation step.
    pub fn update(&mut self) {
        self.engine.resources.poll();

        let transition = self.states.update(&mut self.engine);

        self.engine.tick += 1;
        self.engine.state_tick += 1;
        self.engine.audio.update();
        self.engine.viewport.has_scaling_changed = false;

        self.apply(transition);
    }

    /// Draw the current state and overlays onto the canvas.
    pub fn render(&mut self) {
        let Self { engine, states, canvas, global_render, clear_color, .. } = self;

        canvas.clear(*clear_color);
        canvas.save();
        engine.viewport.apply_scaling(canvas);
        states.render(engine, canvas);
        if let Some(hook) = global_render.as_mut() {
            hook(engine, canvas);
        }
        canvas.restore();

        if !engine.modules.is_loaded(Module::Debug) {
            engine.debug.clear();
            return;
        }
        if engine.debug.enabled && engine.debug.show_frame_stats {
            let fps = engine.frame_stats.fps().round();
            let updates = engine.frame_stats.updates_last_frame();
            engine.debug.add_line("fps", fps);
            engine.debug.add_line("updates", updates);
        }
        engine.debug.render(canvas);
    }

    /// Route one input event to the listeners and the current state, then
    /// apply the first transition any of them requested.
    pub fn dispatch(&mut self, event: InputEvent) {
        if let InputEvent::KeyDown(key) = event {
            if key == self.engine.debug.toggle_key && self.engine.modules.is_loaded(Module::Debug) {
                self.engine.debug.toggle();
                debug!(enabled = self.engine.debug.enabled, "debug_overlay_toggled");
            }
        }
        self.route(event);
    }

    /// Route an auto-repeated key press. Listeners see it like any other
    /// event; the debug toggle key is ignored.
    pub fn dispatch_repeat(&mut self, event: InputEvent) {
        self.route(event);
    }

    fn route(&mut self, event: InputEvent) {
        let transition = self.states.route(&mut self.engine, &mut self.router, event);
        self.apply(transition);
    }

    /// The window's drawable area changed size.
    pub fn resize(&mut self, container_width: f32, container_height: f32) {
        let (game_width, game_height) = (self.engine.width(), self.engine.height());
        self.engine
            .viewport
            .refresh_scaling(container_width, container_height, game_width, game_height);

        let (width, height) = self.engine.viewport.canvas_size();
        self.canvas.resize(width, height);
        debug!(width, height, "canvas_resized");
    }

    fn apply(&mut self, transition: Transition) {
        match transition {
            Transition::None => {}
            Transition::Switch(next) => self.set_state(next),
            Transition::Quit => self.engine.request_quit(),
        }
        if self.engine.quit_requested && !self.states.is_empty() {
            self.states.clear(&mut self.engine, &mut self.router);
            info!("quit_requested");
        }
    }
}

// ── EngineBuilder ───────────────────────────────────────────────────────────

pub struct EngineBuilder {
    config: EngineConfig,
    global_render: Option<GlobalRender>,
    clear_color: Color,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            global_render: None,
            clear_color: Color::BLACK,
        }
    }
}

impl EngineBuilder {
    pub fn with_config(mut self, config: EngineConfig) -> Self { self.config = config; self }
    pub fn with_title(mut self, title: &str) -> Self { self.config.title = Some(title.into()); self }
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.config.width = width;
        self.config.height = height;
        self
    }
    pub fn with_ups(mut self, ups: u32) -> Self { self.config.update_frequency = ups; self }
    pub fn with_asset_root(mut self, root: impl Into<PathBuf>) -> Self { self.config.asset_root = root.into(); self }
    pub fn with_clear_color(mut self, color: Color) -> Self { self.clear_color = color; self }

    /// Modules loaded at startup, by name (`"debug"`, `"audio-manager"`...).
    pub fn with_modules<I, S>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.load_modules.extend(modules.into_iter().map(Into::into));
        self
    }

    pub fn with_global_render(mut self, hook: impl FnMut(&mut Engine, &mut Canvas) + 'static) -> Self {
        self.global_render = Some(Box::new(hook));
        self
    }

    pub fn config(&self) -> &EngineConfig { &self.config }

    /// Build the runtime without opening a window.
    pub fn build(self) -> Result<Runtime, EngineError> {
        let mut runtime = Runtime::new(self.config)?.with_clear_color(self.clear_color);
        runtime.global_render = self.global_render;
        Ok(runtime)
    }

    /// Open the window and run until it is closed or a state quits.
    pub fn run(self, state: impl State + 'static) -> Result<(), EngineError> {
        let runtime = self.build()?;

        let event_loop = EventLoop::new().map_err(EngineError::CreateEventLoop)?;
        let mut app = App {
            runtime,
            initial_state: Some(Box::new(state)),
            renderer: None,
            last_instant: None,
            error: None,
        };
        event_loop.run_app(&mut app).map_err(EngineError::EventLoopRun)?;

        match app.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

// ── App (winit ApplicationHandler) ──────────────────────────────────────────

struct App {
    runtime: Runtime,
    initial_state: Option<Box<dyn State>>,
    renderer: Option<Renderer>,
    last_instant: Option<Instant>,
    /// Startup failure reported back from `run`.
    error: Option<EngineError>,
}

impl App {
    fn open_window(&mut self, event_loop: &ActiveEventLoop) -> Result<(), EngineError> {
        let config = self.runtime.engine().config();
        let title = config.title.clone().unwrap_or_else(|| DEFAULT_TITLE.to_string());
        let window = Arc::new(
            event_loop
                .create_window(
                    Window::default_attributes()
                        .with_title(title)
                        .with_inner_size(PhysicalSize::new(config.width, config.height)),
                )
                .map_err(EngineError::CreateWindow)?,
        );

        let canvas = self.runtime.canvas();
        let renderer = pollster::block_on(Renderer::new(Arc::clone(&window), canvas.width(), canvas.height()))?;

        let size = window.inner_size();
        self.runtime.resize(size.width as f32, size.height as f32);
        if let Some(state) = self.initial_state.take() {
            self.runtime.set_state(state);
        }
        self.renderer = Some(renderer);
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let elapsed = self.last_instant.map_or(Duration::ZERO, |prev| now.duration_since(prev));
        self.last_instant = Some(now);

        let report = self.runtime.frame(elapsed);
        if self.runtime.should_quit() {
            event_loop.exit();
            return;
        }
        if !report.rendered {
            return;
        }

        let Some(renderer) = self.renderer.as_mut() else { return };
        let letterbox = self.runtime.engine().viewport.letterbox();
        match renderer.present(self.runtime.canvas(), letterbox) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost) => {
                let size = renderer.window.inner_size();
                renderer.resize(size);
            }
            Err(e) => error!(error = %e, "present_failed"),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() {
            return;
        }
        if let Err(e) = self.open_window(event_loop) {
            error!(error = %e, "startup_failed");
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(renderer) = self.renderer.as_ref() {
            renderer.window.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if self.renderer.is_none() {
            return;
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::Resized(size) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(size);
                }
                self.runtime.resize(size.width as f32, size.height as f32);
            }

            WindowEvent::CursorMoved { position, .. } => {
                let canvas_pos = self
                    .runtime
                    .engine()
                    .viewport
                    .container_to_canvas(position.x as f32, position.y as f32);
                self.runtime.dispatch(InputEvent::MouseMove { canvas_x: canvas_pos.x, canvas_y: canvas_pos.y });
            }

            WindowEvent::MouseInput { button, state, .. } => match state {
                ElementState::Pressed => self.runtime.dispatch(InputEvent::MouseDown(button)),
                ElementState::Released => self.runtime.dispatch(InputEvent::MouseUp(button)),
            },

            // Positive deltas scroll down, as on the web.
            WindowEvent::MouseWheel { delta, .. } => {
                let pixels = match delta {
                    MouseScrollDelta::LineDelta(_, y) => normalize_wheel_lines(-y),
                    MouseScrollDelta::PixelDelta(pos) => -pos.y as f32,
                };
                self.runtime.dispatch(InputEvent::Wheel(pixels));
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        repeat,
                        ..
                    },
                ..
            } => match state {
                ElementState::Pressed if repeat => self.runtime.dispatch_repeat(InputEvent::KeyDown(code)),
                ElementState::Pressed => self.runtime.dispatch(InputEvent::KeyDown(code)),
                ElementState::Released => self.runtime.dispatch(InputEvent::KeyUp(code)),
            },

            _ => {}
        }

        if self.runtime.should_quit() {
            event_loop.exit();
        }
    }
}
