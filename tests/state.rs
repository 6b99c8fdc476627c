use std::cell::RefCell;
use std::rc::Rc;

use cadence2d::config::EngineConfig;
use cadence2d::input::{EventRouter, InputEvent};
use cadence2d::state::StateMachine;
use cadence2d::{Canvas, Engine, EventListener, KeyCode, State, Transition};

// ── helpers ───────────────────────────────────────────────────────────────────

type Log = Rc<RefCell<Vec<String>>>;

/// State that records every callback into a shared log.
struct Probe {
    name: &'static str,
    log: Log,
}

impl Probe {
    fn boxed(name: &'static str, log: &Log) -> Box<dyn State> {
        Box::new(Probe { name, log: Rc::clone(log) })
    }

    fn push(&self, entry: String) {
        self.log.borrow_mut().push(entry);
    }
}

impl EventListener for Probe {
    fn on_key_down(&mut self, _engine: &mut Engine, key: KeyCode) -> Transition {
        self.push(format!("{}:key:{key:?}", self.name));
        Transition::None
    }
}

impl State for Probe {
    fn name(&self) -> &str { self.name }

    fn on_enter(&mut self, _engine: &mut Engine, previous: Option<&dyn State>) {
        let previous = previous.map(|p| p.name().to_string()).unwrap_or_else(|| "-".into());
        self.push(format!("{}:enter(from {previous})", self.name));
    }

    fn on_leave(&mut self, _engine: &mut Engine) {
        self.push(format!("{}:leave", self.name));
    }

    fn update(&mut self, _engine: &mut Engine) -> Transition {
        self.push(format!("{}:update", self.name));
        Transition::None
    }

    fn render(&mut self, _engine: &mut Engine, _canvas: &mut Canvas) {
        self.push(format!("{}:render", self.name));
    }
}

fn setup() -> (Engine, EventRouter, StateMachine, Log) {
    let engine = Engine::new(EngineConfig { width: 64, height: 48, ..Default::default() });
    (engine, EventRouter::new(), StateMachine::new(), Log::default())
}

fn entries(log: &Log) -> Vec<String> {
    log.borrow().clone()
}

// ── transitions ───────────────────────────────────────────────────────────────

#[test]
fn first_state_enters_without_previous() {
    let (mut engine, mut router, mut states, log) = setup();
    states.set_state(&mut engine, &mut router, Probe::boxed("menu", &log));

    assert_eq!(entries(&log), vec!["menu:enter(from -)"]);
    assert_eq!(states.current().map(|s| s.name()), Some("menu"));
    assert!(router.is_state_attached());
}

/// Leave the old state, then enter the new one with the old one as
/// `previous`.
#[test]
fn switch_runs_leave_then_enter() {
    let (mut engine, mut router, mut states, log) = setup();
    states.set_state(&mut engine, &mut router, Probe::boxed("menu", &log));
    log.borrow_mut().clear();

    states.set_state(&mut engine, &mut router, Probe::boxed("level", &log));

    assert_eq!(entries(&log), vec!["menu:leave", "level:enter(from menu)"]);
    assert_eq!(states.current().map(|s| s.name()), Some("level"));
}

/// After a switch only the new state hears input.
#[test]
fn detached_state_receives_no_events() {
    let (mut engine, mut router, mut states, log) = setup();
    states.set_state(&mut engine, &mut router, Probe::boxed("menu", &log));
    states.set_state(&mut engine, &mut router, Probe::boxed("level", &log));
    log.borrow_mut().clear();

    states.route(&mut engine, &mut router, InputEvent::KeyDown(KeyCode::KeyA));

    assert_eq!(entries(&log), vec!["level:key:KeyA"]);
}

#[test]
fn clear_leaves_without_entering() {
    let (mut engine, mut router, mut states, log) = setup();
    states.set_state(&mut engine, &mut router, Probe::boxed("menu", &log));
    states.clear(&mut engine, &mut router);

    assert_eq!(entries(&log), vec!["menu:enter(from -)", "menu:leave"]);
    assert!(states.is_empty());
    assert!(!router.is_state_attached());
}

/// With no current state, update and render do nothing.
#[test]
fn empty_machine_is_inert() {
    let (mut engine, mut router, mut states, _log) = setup();
    let mut canvas = Canvas::new(4, 4);

    assert!(states.update(&mut engine).is_none());
    states.render(&mut engine, &mut canvas);
    assert!(states.route(&mut engine, &mut router, InputEvent::KeyDown(KeyCode::Space)).is_none());
}

#[test]
fn update_and_render_reach_current_state() {
    let (mut engine, mut router, mut states, log) = setup();
    let mut canvas = Canvas::new(4, 4);
    states.set_state(&mut engine, &mut router, Probe::boxed("level", &log));
    log.borrow_mut().clear();

    states.update(&mut engine);
    states.render(&mut engine, &mut canvas);

    assert_eq!(entries(&log), vec!["level:update", "level:render"]);
}

// ── Transition ────────────────────────────────────────────────────────────────

#[test]
fn transition_debug_names_target_state() {
    let log = Log::default();
    let switch = Transition::Switch(Probe::boxed("pause", &log));
    assert_eq!(format!("{switch:?}"), "Switch(pause)");
    assert_eq!(format!("{:?}", Transition::Quit), "Quit");
    assert!(Transition::None.is_none());
    assert!(!Transition::Quit.is_none());
}
