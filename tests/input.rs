use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;

use cadence2d::config::EngineConfig;
use cadence2d::input::{normalize_wheel_lines, InputState, MouseData, WHEEL_LINE_PIXELS};
use cadence2d::{Engine, EventListener, InputEvent, KeyCode, MouseButton, Runtime, State, Transition};

// ── helpers ───────────────────────────────────────────────────────────────────

type Log = Rc<RefCell<Vec<String>>>;

/// Listener that logs what it sees, including the engine's input state at
/// the moment the handler runs.
struct Recorder {
    tag: &'static str,
    log: Log,
}

impl Recorder {
    fn boxed(tag: &'static str, log: &Log) -> Box<Recorder> {
        Box::new(Recorder { tag, log: Rc::clone(log) })
    }

    fn push(&self, entry: String) {
        self.log.borrow_mut().push(entry);
    }
}

impl EventListener for Recorder {
    fn on_mouse_down(&mut self, engine: &mut Engine, button: MouseButton) -> Transition {
        self.push(format!("{}:down:{button:?}:pressed={}", self.tag, engine.input.mouse.pressed));
        Transition::None
    }

    fn on_mouse_up(&mut self, engine: &mut Engine, button: MouseButton) -> Transition {
        self.push(format!("{}:up:{button:?}:pressed={}", self.tag, engine.input.mouse.pressed));
        Transition::None
    }

    fn on_mouse_move(&mut self, _engine: &mut Engine, mouse: MouseData, previous: Vec2) -> Transition {
        self.push(format!("{}:move:{},{}:from {},{}", self.tag, mouse.x, mouse.y, previous.x, previous.y));
        Transition::None
    }

    fn on_wheel(&mut self, _engine: &mut Engine, delta: f32) -> Transition {
        self.push(format!("{}:wheel:{delta}", self.tag));
        Transition::None
    }

    fn on_key_down(&mut self, engine: &mut Engine, key: KeyCode) -> Transition {
        self.push(format!("{}:keydown:{key:?}:held={}", self.tag, engine.input.is_key_down(key)));
        Transition::None
    }

    fn on_key_up(&mut self, engine: &mut Engine, key: KeyCode) -> Transition {
        self.push(format!("{}:keyup:{key:?}:held={}", self.tag, engine.input.is_key_down(key)));
        Transition::None
    }
}

/// State that forwards to a recorder and can request a transition on a key.
struct Screen {
    recorder: Recorder,
    on_key: Option<Box<dyn FnMut() -> Transition>>,
}

impl Screen {
    fn boxed(tag: &'static str, log: &Log) -> Box<Screen> {
        Box::new(Screen { recorder: Recorder { tag, log: Rc::clone(log) }, on_key: None })
    }

    fn switching_to(tag: &'static str, log: &Log, next: &'static str) -> Box<Screen> {
        let log_for_next = Rc::clone(log);
        let mut screen = Screen::boxed(tag, log);
        screen.on_key = Some(Box::new(move || Transition::Switch(Screen::boxed(next, &log_for_next))));
        screen
    }
}

impl EventListener for Screen {
    fn on_key_down(&mut self, engine: &mut Engine, key: KeyCode) -> Transition {
        self.recorder.on_key_down(engine, key);
        match self.on_key.as_mut() {
            Some(make) => make(),
            None => Transition::None,
        }
    }

    fn on_mouse_down(&mut self, engine: &mut Engine, button: MouseButton) -> Transition {
        self.recorder.on_mouse_down(engine, button)
    }
}

impl State for Screen {
    fn name(&self) -> &str { self.recorder.tag }
}

fn runtime() -> Runtime {
    Runtime::new(EngineConfig { width: 100, height: 50, ..Default::default() }).unwrap()
}

fn entries(log: &Log) -> Vec<String> {
    log.borrow().clone()
}

// ── routing order ─────────────────────────────────────────────────────────────

/// Listeners hear events in the order they were added; the state hears them
/// at its slot.
#[test]
fn listeners_are_called_in_order() {
    let log = Log::default();
    let mut rt = runtime();
    rt.add_listener(Recorder::boxed("a", &log));
    rt.set_state(Screen::boxed("state", &log));
    rt.add_listener(Recorder::boxed("b", &log));

    rt.dispatch(InputEvent::MouseDown(MouseButton::Left));

    assert_eq!(
        entries(&log),
        vec!["a:down:Left:pressed=true", "state:down:Left:pressed=true", "b:down:Left:pressed=true"]
    );
}

/// On every state change the state slot moves to the end of the list.
#[test]
fn state_slot_moves_to_end_on_switch() {
    let log = Log::default();
    let mut rt = runtime();
    rt.set_state(Screen::boxed("first", &log));
    rt.add_listener(Recorder::boxed("overlay", &log));
    rt.set_state(Screen::boxed("second", &log));

    rt.dispatch(InputEvent::MouseDown(MouseButton::Right));

    assert_eq!(
        entries(&log),
        vec!["overlay:down:Right:pressed=true", "second:down:Right:pressed=true"]
    );
}

#[test]
fn removed_listener_hears_nothing() {
    let log = Log::default();
    let mut rt = runtime();
    let id = rt.add_listener(Recorder::boxed("gone", &log));
    assert!(rt.remove_listener(id));
    assert!(!rt.remove_listener(id), "second removal finds nothing");

    rt.dispatch(InputEvent::Wheel(3.0));
    assert!(entries(&log).is_empty());
    assert_eq!(rt.router().listener_count(), 0);
}

// ── input state bookkeeping ───────────────────────────────────────────────────

/// Mouse buttons update `pressed` before routing.
#[test]
fn mouse_up_clears_pressed_before_routing() {
    let log = Log::default();
    let mut rt = runtime();
    rt.add_listener(Recorder::boxed("l", &log));

    rt.dispatch(InputEvent::MouseDown(MouseButton::Left));
    rt.dispatch(InputEvent::MouseUp(MouseButton::Left));

    assert_eq!(entries(&log)[1], "l:up:Left:pressed=false");
    assert!(!rt.engine().input.is_mouse_down(MouseButton::Left));
}

#[test]
fn pressed_stays_while_another_button_is_held() {
    let mut rt = runtime();
    rt.dispatch(InputEvent::MouseDown(MouseButton::Left));
    rt.dispatch(InputEvent::MouseDown(MouseButton::Right));
    rt.dispatch(InputEvent::MouseUp(MouseButton::Left));

    assert!(rt.engine().input.mouse.pressed);
    assert!(rt.engine().input.is_mouse_down(MouseButton::Right));
}

/// Keys are recorded after routing, so a handler sees `held=false` on the
/// first press and `held=true` on a repeat.
#[test]
fn keys_are_recorded_after_routing() {
    let log = Log::default();
    let mut rt = runtime();
    rt.add_listener(Recorder::boxed("l", &log));

    rt.dispatch(InputEvent::KeyDown(KeyCode::KeyW));
    rt.dispatch(InputEvent::KeyDown(KeyCode::KeyW));
    rt.dispatch(InputEvent::KeyUp(KeyCode::KeyW));

    assert_eq!(
        entries(&log),
        vec!["l:keydown:KeyW:held=false", "l:keydown:KeyW:held=true", "l:keyup:KeyW:held=true"]
    );
    assert!(!rt.engine().input.is_key_down(KeyCode::KeyW));
}

/// Canvas coordinates are divided by the render scaling; listeners also get
/// the previous game-space position.
#[test]
fn mouse_move_converts_to_game_space() {
    let log = Log::default();
    let mut rt = runtime();
    rt.resize(200.0, 100.0);
    rt.add_listener(Recorder::boxed("l", &log));

    rt.dispatch(InputEvent::MouseMove { canvas_x: 50.0, canvas_y: 20.0 });
    rt.dispatch(InputEvent::MouseMove { canvas_x: 100.0, canvas_y: 40.0 });

    assert_eq!(entries(&log), vec!["l:move:25,10:from 0,0", "l:move:50,20:from 25,10"]);
    let mouse = rt.engine().input.mouse;
    assert_eq!((mouse.canvas_x, mouse.canvas_y), (100.0, 40.0));
}

#[test]
fn mouse_over_uses_game_space() {
    let mut input = InputState::new();
    input.mouse.x = 15.0;
    input.mouse.y = 5.0;
    assert!(input.is_mouse_over(10.0, 0.0, 10.0, 10.0));
    assert!(!input.is_mouse_over(20.0, 0.0, 10.0, 10.0), "right edge is exclusive");
}

#[test]
fn wheel_lines_become_pixels() {
    assert_eq!(normalize_wheel_lines(3.0), 100.0);
    assert_eq!(normalize_wheel_lines(1.0), WHEEL_LINE_PIXELS);
}

// ── transitions requested by handlers ─────────────────────────────────────────

/// The transition is applied only after every listener has seen the event;
/// the new state does not receive the event that created it.
#[test]
fn transition_applies_after_routing_completes() {
    let log = Log::default();
    let mut rt = runtime();
    rt.set_state(Screen::switching_to("menu", &log, "level"));
    rt.add_listener(Recorder::boxed("after", &log));

    rt.dispatch(InputEvent::KeyDown(KeyCode::Enter));

    assert_eq!(entries(&log), vec!["menu:keydown:Enter:held=false", "after:keydown:Enter:held=false"]);
    assert_eq!(rt.current_state().map(|s| s.name()), Some("level"));
}

/// When several handlers ask for a transition, the first one wins.
#[test]
fn first_requested_transition_wins() {
    let log = Log::default();
    let mut rt = runtime();
    let mut early = Screen::switching_to("early", &log, "from-listener");
    early.recorder.tag = "listener";
    rt.add_listener(early);
    rt.set_state(Screen::switching_to("menu", &log, "from-state"));

    rt.dispatch(InputEvent::KeyDown(KeyCode::Enter));

    assert_eq!(rt.current_state().map(|s| s.name()), Some("from-listener"));
}
