use std::collections::HashSet;

use glam::Vec2;
use tracing::debug;
pub use winit::event::MouseButton;
pub use winit::keyboard::KeyCode;

use crate::engine::Engine;
use crate::state::{State, Transition};

/// Pixels per wheel "line" when the platform reports line deltas.
pub const WHEEL_LINE_PIXELS: f32 = 100.0 / 3.0;

/// Convert a line-based wheel delta into the pixel-based delta listeners see.
pub fn normalize_wheel_lines(lines: f32) -> f32 {
    lines * WHEEL_LINE_PIXELS
}

/// Platform-neutral input event, already translated from window events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    MouseDown(MouseButton),
    MouseUp(MouseButton),
    /// Cursor position relative to the canvas' top-left corner, in canvas pixels.
    MouseMove { canvas_x: f32, canvas_y: f32 },
    /// Vertical scroll amount in pixels.
    Wheel(f32),
    KeyDown(KeyCode),
    KeyUp(KeyCode),
}

/// Cursor position in game space (`x`, `y`) and canvas space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MouseData {
    pub x: f32,
    pub y: f32,
    pub canvas_x: f32,
    pub canvas_y: f32,
    /// True while any mouse button is held.
    pub pressed: bool,
}

impl MouseData {
    pub fn position(&self) -> Vec2 { Vec2::new(self.x, self.y) }
}

/// Live mouse and keyboard state, updated by the [`EventRouter`].
#[derive(Debug, Default)]
pub struct InputState {
    pub mouse: MouseData,
    pub mouse_held: HashSet<MouseButton>,
    pub keys_pressed: HashSet<KeyCode>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_key_down(&self, key: KeyCode) -> bool { self.keys_pressed.contains(&key) }
    pub fn is_mouse_down(&self, button: MouseButton) -> bool { self.mouse_held.contains(&button) }

    /// Returns true if the mouse is currently within the given game-space bounds.
    pub fn is_mouse_over(&self, x: f32, y: f32, w: f32, h: f32) -> bool {
        let MouseData { x: mx, y: my, .. } = self.mouse;
        mx >= x && mx < x + w && my >= y && my < y + h
    }
}

/// Receiver of routed input events. Every handler defaults to a no-op.
///
/// Handlers may request a state change by returning a [`Transition`]; the
/// router applies it once the event has reached every listener.
#[allow(unused_variables)]
pub trait EventListener {
    fn on_mouse_down(&mut self, engine: &mut Engine, button: MouseButton) -> Transition {
        Transition::None
    }
    fn on_mouse_up(&mut self, engine: &mut Engine, button: MouseButton) -> Transition {
        Transition::None
    }
    /// `previous` is the game-space position before this move.
    fn on_mouse_move(&mut self, engine: &mut Engine, mouse: MouseData, previous: Vec2) -> Transition {
        Transition::None
    }
    fn on_wheel(&mut self, engine: &mut Engine, delta: f32) -> Transition {
        Transition::None
    }
    fn on_key_down(&mut self, engine: &mut Engine, key: KeyCode) -> Transition {
        Transition::None
    }
    fn on_key_up(&mut self, engine: &mut Engine, key: KeyCode) -> Transition {
        Transition::None
    }
}

/// Handle returned by [`EventRouter::add_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

enum Slot {
    Listener(ListenerId, Box<dyn EventListener>),
    /// Position of the current state's listener in the routing order.
    State,
}

/// What a single listener is handed, computed once per event.
#[derive(Clone, Copy)]
enum Delivery {
    MouseDown(MouseButton),
    MouseUp(MouseButton),
    MouseMove(MouseData, Vec2),
    Wheel(f32),
    KeyDown(KeyCode),
    KeyUp(KeyCode),
}

/// Ordered list of event listeners. The current state's listener occupies a
/// slot like any other; it is moved to the end whenever the state changes.
#[derive(Default)]
pub struct EventRouter {
    slots: Vec<Slot>,
    next_id: u64,
}

impl EventRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, listener: Box<dyn EventListener>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.slots.push(Slot::Listener(id, listener));
        id
    }

    /// Returns false if no listener with that id is attached.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.slots.len();
        self.slots.retain(|slot| !matches!(slot, Slot::Listener(l, _) if *l == id));
        self.slots.len() != before
    }

    /// Number of attached listeners, the state slot excluded.
    pub fn listener_count(&self) -> usize {
        self.slots.iter().filter(|s| matches!(s, Slot::Listener(..))).count()
    }

    pub fn is_state_attached(&self) -> bool {
        self.slots.iter().any(|s| matches!(s, Slot::State))
    }

    pub(crate) fn attach_state(&mut self) {
        self.detach_state();
        self.slots.push(Slot::State);
    }

    pub(crate) fn detach_state(&mut self) {
        self.slots.retain(|s| !matches!(s, Slot::State));
    }

    /// Update `engine.input` for `event` and hand it to every listener in
    /// order. Returns the first transition any listener requested.
    pub fn route(
        &mut self,
        engine: &mut Engine,
        mut state: Option<&mut dyn State>,
        event: InputEvent,
    ) -> Transition {
        let delivery = match event {
            InputEvent::MouseDown(button) => {
                engine.input.mouse_held.insert(button);
                engine.input.mouse.pressed = true;
                Delivery::MouseDown(button)
            }
            InputEvent::MouseUp(button) => {
                engine.input.mouse_held.remove(&button);
                engine.input.mouse.pressed = !engine.input.mouse_held.is_empty();
                Delivery::MouseUp(button)
            }
            InputEvent::MouseMove { canvas_x, canvas_y } => {
                let scaling = engine.viewport.render_scaling();
                let mouse = &mut engine.input.mouse;
                let previous = mouse.position();
                mouse.canvas_x = canvas_x;
                mouse.canvas_y = canvas_y;
                mouse.x = canvas_x / scaling.x;
                mouse.y = canvas_y / scaling.y;
                Delivery::MouseMove(*mouse, previous)
            }
            InputEvent::Wheel(delta) => Delivery::Wheel(delta),
            InputEvent::KeyDown(key) => Delivery::KeyDown(key),
            InputEvent::KeyUp(key) => Delivery::KeyUp(key),
        };

        let mut requested = Transition::None;
        for slot in &mut self.slots {
            let transition = match slot {
                Slot::Listener(_, listener) => deliver(listener.as_mut(), engine, delivery),
                Slot::State => match state.as_deref_mut() {
                    Some(state) => deliver(state, engine, delivery),
                    None => Transition::None,
                },
            };
            if requested.is_none() {
                requested = transition;
            } else if !transition.is_none() {
                debug!(ignored = ?transition, "transition_already_requested");
            }
        }

        // Keys are recorded after routing so handlers can tell a fresh press
        // from a repeat.
        match event {
            InputEvent::KeyDown(key) => { engine.input.keys_pressed.insert(key); }
            InputEvent::KeyUp(key) => { engine.input.keys_pressed.remove(&key); }
            _ => {}
        }

        requested
    }
}

fn deliver<L: EventListener + ?Sized>(listener: &mut L, engine: &mut Engine, delivery: Delivery) -> Transition {
    match delivery {
        Delivery::MouseDown(button) => listener.on_mouse_down(engine, button),
        Delivery::MouseUp(button) => listener.on_mouse_up(engine, button),
        Delivery::MouseMove(mouse, previous) => listener.on_mouse_move(engine, mouse, previous),
        Delivery::Wheel(delta) => listener.on_wheel(engine, delta),
        Delivery::KeyDown(key) => listener.on_key_down(engine, key),
        Delivery::KeyUp(key) => listener.on_key_up(engine, key),
    }
}
