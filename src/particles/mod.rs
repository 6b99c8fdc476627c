mod particle;

pub use particle::Particle;

use std::f32::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::canvas::Canvas;
use crate::resources::ResourceManager;
use particle::SpawnParams;

// ── Config ───────────────────────────────────────────────────────────────────

/// A number that is either fixed or drawn uniformly from `[min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Fixed(f32),
    Range { min: f32, max: f32 },
}

impl Value {
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        match *self {
            Value::Fixed(v) => v,
            Value::Range { min, max } => rng.r#gen::<f32>() * (max - min) + min,
        }
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self { Value::Fixed(v) }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnPosition {
    pub x: Value,
    pub y: Value,
}

impl Default for SpawnPosition {
    fn default() -> Self {
        Self { x: Value::Fixed(0.0), y: Value::Fixed(0.0) }
    }
}

/// Per-axis acceleration and speed clamp, in pixels per tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Movement {
    pub acceleration: f32,
    pub min_speed: f32,
    pub max_speed: f32,
}

impl Default for Movement {
    fn default() -> Self {
        Self { acceleration: 0.0, min_speed: -1000.0, max_speed: 1000.0 }
    }
}

/// Rotation behaviour, in radians per tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rotation {
    pub acceleration: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    pub initial: Value,
}

impl Default for Rotation {
    fn default() -> Self {
        Self { acceleration: 0.0, min_speed: 0.0, max_speed: 0.0, initial: Value::Fixed(0.0) }
    }
}

/// Spawner settings. Every field has a default so configs can be sparse JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    /// Angles (radians) particles leave at; one entry is picked per particle.
    pub spawn_angles: Vec<Value>,
    /// Lifetime in ticks, `-1` for particles that never expire.
    pub life_time: Value,
    pub speed: Value,
    pub spawn_count: Value,
    pub position: SpawnPosition,
    /// Particle size; `0` falls back to the image size.
    pub width: f32,
    pub height: f32,
    pub opacity: f32,
    pub fade_in_speed: f32,
    /// Fading starts early enough for the opacity to hit zero right before
    /// the particle expires.
    pub fade_out_speed: f32,
    pub x_movement: Movement,
    pub y_movement: Movement,
    pub rotation: Rotation,
    /// Image key used for every particle; has priority over `images`.
    pub image: Option<String>,
    /// Image keys picked from at random.
    pub images: Vec<String>,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            spawn_angles: vec![Value::Range { min: 0.0, max: TAU }],
            life_time: Value::Fixed(-1.0),
            speed: Value::Fixed(5.0),
            spawn_count: Value::Fixed(10.0),
            position: SpawnPosition::default(),
            width: 32.0,
            height: 32.0,
            opacity: 1.0,
            fade_in_speed: 0.0,
            fade_out_speed: 0.0,
            x_movement: Movement::default(),
            y_movement: Movement::default(),
            rotation: Rotation::default(),
            image: None,
            images: Vec::new(),
        }
    }
}

// ── Spawner ──────────────────────────────────────────────────────────────────

type UpdateHook = Box<dyn FnMut(&mut Particle)>;
type RenderHook = Box<dyn FnMut(&Particle, &mut Canvas)>;
type AddedHook = Box<dyn FnMut(&mut Particle, usize)>;
type RemovedHook = Box<dyn FnMut(&Particle)>;

/// Spawns, updates and draws a group of particles sharing one config.
pub struct ParticleSpawner {
    pub config: ParticleConfig,
    particles: Vec<Particle>,
    rng: StdRng,
    custom_update: Option<UpdateHook>,
    custom_render: Option<RenderHook>,
    custom_render_absolute: Option<RenderHook>,
    on_particle_added: Option<AddedHook>,
    on_particle_removed: Option<RemovedHook>,
}

impl ParticleSpawner {
    pub fn new(config: ParticleConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Deterministic spawner, mostly for tests and replays.
    pub fn with_seed(config: ParticleConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: ParticleConfig, rng: StdRng) -> Self {
        Self {
            config,
            particles: Vec::new(),
            rng,
            custom_update: None,
            custom_render: None,
            custom_render_absolute: None,
            on_particle_added: None,
            on_particle_removed: None,
        }
    }

    /// Runs after the built-in update of every surviving particle.
    pub fn on_update(mut self, hook: impl FnMut(&mut Particle) + 'static) -> Self {
        self.custom_update = Some(Box::new(hook));
        self
    }

    /// Runs inside the particle's translation, rotation and opacity.
    pub fn on_render(mut self, hook: impl FnMut(&Particle, &mut Canvas) + 'static) -> Self {
        self.custom_render = Some(Box::new(hook));
        self
    }

    /// Runs after the particle transforms are undone.
    pub fn on_render_absolute(mut self, hook: impl FnMut(&Particle, &mut Canvas) + 'static) -> Self {
        self.custom_render_absolute = Some(Box::new(hook));
        self
    }

    /// Called with each new particle and its index within the spawn batch.
    pub fn on_particle_added(mut self, hook: impl FnMut(&mut Particle, usize) + 'static) -> Self {
        self.on_particle_added = Some(Box::new(hook));
        self
    }

    pub fn on_particle_removed(mut self, hook: impl FnMut(&Particle) + 'static) -> Self {
        self.on_particle_removed = Some(Box::new(hook));
        self
    }

    pub fn particles(&self) -> &[Particle] { &self.particles }
    pub fn len(&self) -> usize { self.particles.len() }
    pub fn is_empty(&self) -> bool { self.particles.is_empty() }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Spawn a batch with the spawner's own config. Returns the batch size.
    pub fn spawn(&mut self, resources: Option<&ResourceManager>) -> usize {
        let config = self.config.clone();
        self.spawn_with(&config, resources)
    }

    /// Spawn a batch at a fixed position.
    pub fn spawn_at(&mut self, x: f32, y: f32, resources: Option<&ResourceManager>) -> usize {
        let mut config = self.config.clone();
        config.position = SpawnPosition { x: Value::Fixed(x), y: Value::Fixed(y) };
        self.spawn_with(&config, resources)
    }

    /// Spawn a batch using `config` in place of the spawner's config. Living
    /// particles are still updated with the spawner's config.
    pub fn spawn_with(&mut self, config: &ParticleConfig, resources: Option<&ResourceManager>) -> usize {
        let count = config.spawn_count.sample(&mut self.rng).floor().max(0.0) as usize;

        for i in 0..count {
            let angle = if config.spawn_angles.is_empty() {
                0.0
            } else {
                let pick = self.rng.gen_range(0..config.spawn_angles.len());
                config.spawn_angles[pick].sample(&mut self.rng)
            };

            let image = match (&config.image, config.images.is_empty()) {
                (Some(key), _) => Some(key.clone()),
                (None, false) => Some(config.images[self.rng.gen_range(0..config.images.len())].clone()),
                (None, true) => None,
            };
            let image_size = image
                .as_deref()
                .and_then(|key| resources.and_then(|r| r.get_image(key)))
                .map(|img| (img.width(), img.height()));

            let params = SpawnParams {
                life_time: config.life_time.sample(&mut self.rng).floor() as i64,
                speed: config.speed.sample(&mut self.rng),
                x: config.position.x.sample(&mut self.rng),
                y: config.position.y.sample(&mut self.rng),
                rotation: config.rotation.initial.sample(&mut self.rng),
                angle,
                image,
            };

            let mut particle = Particle::new(params, config, image_size);
            if let Some(hook) = self.on_particle_added.as_mut() {
                hook(&mut particle, i);
            }
            self.particles.push(particle);
        }
        count
    }

    /// Advance every particle one tick and drop the expired ones, keeping
    /// the order of the survivors.
    pub fn update(&mut self) {
        let config = &self.config;
        let custom_update = &mut self.custom_update;
        let on_removed = &mut self.on_particle_removed;

        self.particles.retain_mut(|p| {
            if p.update(config) {
                if let Some(hook) = custom_update.as_mut() {
                    hook(p);
                }
                true
            } else {
                if let Some(hook) = on_removed.as_mut() {
                    hook(p);
                }
                false
            }
        });
    }

    pub fn render(&mut self, canvas: &mut Canvas, resources: &ResourceManager) {
        for p in &self.particles {
            canvas.save();
            canvas.translate(p.x, p.y);
            canvas.rotate(p.r);
            canvas.set_global_alpha(p.opacity * canvas.global_alpha());

            if let Some(image) = p.image.as_deref().and_then(|key| resources.get_image(key)) {
                canvas.draw_image(image, -p.width / 2.0, -p.height / 2.0, p.width, p.height);
            }
            if let Some(hook) = self.custom_render.as_mut() {
                hook(p, canvas);
            }
            canvas.restore();

            if let Some(hook) = self.custom_render_absolute.as_mut() {
                hook(p, canvas);
            }
        }
    }
}
