use std::fmt;

use tracing::info;

use crate::canvas::Canvas;
use crate::engine::Engine;
use crate::input::{EventListener, EventRouter};

/// What the engine should do after a state callback returns.
pub enum Transition {
    /// Stay in the current state.
    None,
    /// Leave the current state and enter the given one.
    Switch(Box<dyn State>),
    /// Leave the current state and stop the engine.
    Quit,
}

impl Transition {
    pub fn is_none(&self) -> bool {
        matches!(self, Transition::None)
    }
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::None => write!(f, "None"),
            Transition::Switch(state) => write!(f, "Switch({})", state.name()),
            Transition::Quit => write!(f, "Quit"),
        }
    }
}

/// One screen of the game (menu, level, pause...). Its input handlers come
/// from [`EventListener`] and only fire while the state is current.
#[allow(unused_variables)]
pub trait State: EventListener {
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Called when the state becomes current. `previous` is the state being
    /// left, if any.
    fn on_enter(&mut self, engine: &mut Engine, previous: Option<&dyn State>) {}

    fn on_leave(&mut self, engine: &mut Engine) {}

    /// One fixed simulation step.
    fn update(&mut self, engine: &mut Engine) -> Transition {
        Transition::None
    }

    /// Draw the state. Viewport scaling is already applied to `canvas`.
    fn render(&mut self, engine: &mut Engine, canvas: &mut Canvas) {}
}

/// Holds the current state and performs synchronous transitions.
#[derive(Default)]
pub struct StateMachine {
    current: Option<Box<dyn State>>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&dyn State> {
        self.current.as_deref()
    }

    pub fn current_mut(&mut self) -> Option<&mut dyn State> {
        match self.current.as_mut() {
            Some(state) => Some(state.as_mut()),
            None => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }

    /// Leave the current state, detach its listener, enter `next` and attach
    /// the new listener at the end of the routing order. The old state is
    /// dropped once `next.on_enter` has seen it.
    pub fn set_state(&mut self, engine: &mut Engine, router: &mut EventRouter, mut next: Box<dyn State>) {
        let mut previous = self.current.take();
        if let Some(old) = previous.as_mut() {
            old.on_leave(engine);
            router.detach_state();
        }

        next.on_enter(engine, previous.as_deref());
        info!(
            from = previous.as_ref().map(|s| s.name()).unwrap_or("<none>"),
            to = next.name(),
            "state_changed"
        );

        self.current = Some(next);
        router.attach_state();
        engine.reset_state_tick();
    }

    /// Leave the current state without entering another one.
    pub fn clear(&mut self, engine: &mut Engine, router: &mut EventRouter) {
        if let Some(mut old) = self.current.take() {
            old.on_leave(engine);
            router.detach_state();
            info!(from = old.name(), "state_cleared");
        }
    }

    pub fn update(&mut self, engine: &mut Engine) -> Transition {
        match self.current.as_mut() {
            Some(state) => state.update(engine),
            None => Transition::None,
        }
    }

    pub fn render(&mut self, engine: &mut Engine, canvas: &mut Canvas) {
        if let Some(state) = self.current.as_mut() {
            state.render(engine, canvas);
        }
    }

    /// Route an input event through `router`, delivering to the current
    /// state at its slot.
    pub fn route(&mut self, engine: &mut Engine, router: &mut EventRouter, event: crate::input::InputEvent) -> Transition {
        router.route(engine, self.current_mut(), event)
    }
}
