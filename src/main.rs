use std::f32::consts::TAU;

use cadence2d::canvas::{builtin_font, Font, Image};
use cadence2d::debug::Expectations;
use cadence2d::particles::{Movement, ParticleConfig, ParticleSpawner, Value};
use cadence2d::{logging, Canvas, Color, Engine, EventListener, KeyCode, MouseButton, State, Transition};

const BACKGROUND: Color = Color([18, 22, 30, 255]);
const TEXT: Color = Color([220, 230, 225, 255]);
const ACCENT: Color = Color([255, 200, 60, 255]);

// ── Title screen ─────────────────────────────────────────────────────────────

struct Title {
    font: Font,
    atlas: Image,
}

impl Title {
    fn new() -> Self {
        let (font, atlas) = builtin_font();
        Self { font, atlas }
    }
}

impl EventListener for Title {
    fn on_key_down(&mut self, _engine: &mut Engine, key: KeyCode) -> Transition {
        match key {
            KeyCode::Enter | KeyCode::Space => Transition::Switch(Box::new(Sparks::new())),
            KeyCode::Escape => Transition::Quit,
            _ => Transition::None,
        }
    }

    fn on_mouse_down(&mut self, _engine: &mut Engine, _button: MouseButton) -> Transition {
        Transition::Switch(Box::new(Sparks::new()))
    }
}

impl State for Title {
    fn name(&self) -> &str { "title" }

    fn render(&mut self, engine: &mut Engine, canvas: &mut Canvas) {
        let (w, h) = (engine.width() as f32, engine.height() as f32);
        canvas.fill_rect(0.0, 0.0, w, h, BACKGROUND);

        let heading = "CADENCE2D";
        let size = 48.0;
        let x = (w - canvas.measure_text(heading, &self.font, size)) / 2.0;
        canvas.fill_text(heading, &self.font, &self.atlas, x, h / 3.0, size, ACCENT);

        // Blink the prompt twice a second.
        if (engine.state_tick() / 30) % 2 == 0 {
            let prompt = "PRESS ENTER OR CLICK";
            let size = 18.0;
            let x = (w - canvas.measure_text(prompt, &self.font, size)) / 2.0;
            canvas.fill_text(prompt, &self.font, &self.atlas, x, h / 2.0, size, TEXT);
        }
    }
}

// ── Particle playground ──────────────────────────────────────────────────────

struct Sparks {
    spawner: ParticleSpawner,
    bursts: u32,
}

impl Sparks {
    fn new() -> Self {
        let config = ParticleConfig {
            spawn_angles: vec![Value::Range { min: 0.0, max: TAU }],
            life_time: Value::Range { min: 40.0, max: 90.0 },
            speed: Value::Range { min: 2.0, max: 7.0 },
            spawn_count: Value::Fixed(40.0),
            width: 6.0,
            height: 6.0,
            fade_out_speed: 0.04,
            y_movement: Movement { acceleration: 0.15, ..Movement::default() },
            ..ParticleConfig::default()
        };
        let spawner = ParticleSpawner::new(config).on_render(|p, canvas| {
            canvas.fill_rect(-p.width / 2.0, -p.height / 2.0, p.width, p.height, ACCENT);
        });
        Self { spawner, bursts: 0 }
    }
}

impl EventListener for Sparks {
    fn on_mouse_down(&mut self, engine: &mut Engine, button: MouseButton) -> Transition {
        if button == MouseButton::Left {
            let mouse = engine.input.mouse;
            self.spawner.spawn_at(mouse.x, mouse.y, Some(&engine.resources));
            self.bursts += 1;
        }
        Transition::None
    }

    fn on_key_down(&mut self, _engine: &mut Engine, key: KeyCode) -> Transition {
        match key {
            KeyCode::Escape => Transition::Switch(Box::new(Title::new())),
            KeyCode::KeyC => {
                self.spawner.clear();
                Transition::None
            }
            _ => Transition::None,
        }
    }
}

impl State for Sparks {
    fn name(&self) -> &str { "sparks" }

    fn on_enter(&mut self, engine: &mut Engine, _previous: Option<&dyn State>) {
        let (x, y) = (engine.width() as f32 / 2.0, engine.height() as f32 / 2.0);
        self.spawner.spawn_at(x, y, Some(&engine.resources));
    }

    fn update(&mut self, engine: &mut Engine) -> Transition {
        self.spawner.update();

        if engine.input.is_mouse_down(MouseButton::Right) && engine.state_tick() % 4 == 0 {
            let mouse = engine.input.mouse;
            self.spawner.spawn_at(mouse.x, mouse.y, Some(&engine.resources));
        }
        Transition::None
    }

    fn render(&mut self, engine: &mut Engine, canvas: &mut Canvas) {
        canvas.fill_rect(0.0, 0.0, engine.width() as f32, engine.height() as f32, BACKGROUND);
        self.spawner.render(canvas, &engine.resources);

        engine.debug.add_line("state", self.name());
        engine.debug.add_line("bursts", self.bursts);
        engine.debug.add_line_with(
            "particles",
            self.spawner.len(),
            Expectations { max_value: Some(2000.0), ..Default::default() },
        );
    }
}

fn main() {
    logging::init();

    let result = Engine::builder()
        .with_title("cadence2d sparks")
        .with_size(640, 360)
        .with_ups(60)
        .with_modules(["debug", "particle"])
        .with_clear_color(Color::BLACK)
        .run(Title::new());

    if let Err(e) = result {
        tracing::error!(error = %e, "engine_failed");
        std::process::exit(1);
    }
}
