use super::ParticleConfig;

/// Values drawn for one particle when it is spawned.
#[derive(Debug, Clone)]
pub(crate) struct SpawnParams {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub speed: f32,
    pub rotation: f32,
    pub life_time: i64,
    pub image: Option<String>,
}

/// A single live particle.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    /// Rotation in radians.
    pub r: f32,
    pub dx: f32,
    pub dy: f32,
    pub dr: f32,
    pub width: f32,
    pub height: f32,
    pub initial_x: f32,
    pub initial_y: f32,
    pub living_ticks: i64,
    /// Ticks before removal; negative means the particle never expires.
    pub life_time: i64,
    pub opacity: f32,
    /// Resource key of the particle image.
    pub image: Option<String>,
    done_fading_in: bool,
}

impl Particle {
    pub(crate) fn new(params: SpawnParams, config: &ParticleConfig, image_size: Option<(u32, u32)>) -> Self {
        let width = if config.width > 0.0 { config.width } else { image_size.map_or(0.0, |(w, _)| w as f32) };
        let height = if config.height > 0.0 { config.height } else { image_size.map_or(0.0, |(_, h)| h as f32) };

        Self {
            x: params.x,
            y: params.y,
            r: params.rotation,
            dx: params.angle.cos() * params.speed,
            dy: params.angle.sin() * params.speed,
            dr: 0.0,
            width,
            height,
            initial_x: params.x,
            initial_y: params.y,
            living_ticks: 0,
            life_time: params.life_time,
            opacity: config.opacity,
            image: params.image,
            done_fading_in: false,
        }
    }

    pub fn is_immortal(&self) -> bool {
        self.life_time < 0
    }

    /// Advance one tick. Returns false once the particle has expired.
    pub fn update(&mut self, config: &ParticleConfig) -> bool {
        self.living_ticks += 1;
        if self.living_ticks == self.life_time {
            return false;
        }

        if config.fade_in_speed > 0.0 && !self.done_fading_in {
            self.opacity += config.fade_in_speed;
            if self.opacity >= 1.0 {
                self.opacity = 1.0;
                self.done_fading_in = true;
            }
        } else if config.fade_out_speed > 0.0 && !self.is_immortal() {
            // Opacity left at expiry if the fade started now.
            let remaining = (self.life_time - self.living_ticks) as f32;
            let end_opacity = self.opacity - remaining * config.fade_out_speed;
            if end_opacity > -config.fade_out_speed {
                self.opacity = (self.opacity - config.fade_out_speed).max(0.0);
            }
        }

        let x = &config.x_movement;
        self.dx = (self.dx + x.acceleration).max(x.min_speed).min(x.max_speed);
        let y = &config.y_movement;
        self.dy = (self.dy + y.acceleration).max(y.min_speed).min(y.max_speed);
        let rot = &config.rotation;
        self.dr = (self.dr + rot.acceleration).max(rot.min_speed).min(rot.max_speed);

        self.r += self.dr;
        self.x += self.dx;
        self.y += self.dy;
        true
    }
}
