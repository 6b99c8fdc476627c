use glam::Vec2;

use crate::canvas::Canvas;

/// Smallest scaling the camera accepts.
pub const MIN_SCALING: f32 = 0.075;

/// Distance under which eased values snap onto their target.
const SNAP_EPSILON: f32 = 0.001;

/// Distance under which a scaling animation counts as finished.
const SCALING_FINISHED_EPSILON: f32 = 0.02;

/// Optional clamp applied to the camera position after every update.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraBounds {
    pub min_x: Option<f32>,
    pub min_y: Option<f32>,
    pub max_x: Option<f32>,
    pub max_y: Option<f32>,
}

/// Notifications produced by [`Camera::update`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CameraEvents {
    /// The position reached the target set by `set_target_position`.
    pub translation_finished: bool,
    /// The scaling got close enough to the target set by `set_target_scaling`.
    pub scaling_finished: bool,
}

/// 2D camera with eased translation, eased scaling around a fixed point and
/// optional entity following.
///
/// `position` is the top-left corner of the view in scaled world space: a
/// world point `p` lands on screen at `p * scaling - position`.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec2,
    pub target_position: Vec2,
    /// Fraction of the remaining distance covered per update, per axis.
    pub speed: Vec2,
    pub bounds: CameraBounds,
    pub scaling: f32,
    target_scaling: f32,
    pub scaling_speed: f32,
    /// Screen point kept fixed while the scaling eases.
    scaling_point: Option<Vec2>,
    /// Rotation in radians (reserved; not applied by `apply_transforms`).
    pub rotation: f32,
    has_scaling_changed: bool,
    /// Bounds `[x, y, w, h]` of the followed entity.
    attached: Option<[f32; 4]>,
    notify_translation: bool,
    notify_scaling: bool,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Camera {
    pub fn new(scaling: f32) -> Self {
        let scaling = scaling.max(MIN_SCALING);
        Self {
            position: Vec2::ZERO,
            target_position: Vec2::ZERO,
            speed: Vec2::splat(0.2),
            bounds: CameraBounds::default(),
            scaling,
            target_scaling: scaling,
            scaling_speed: 0.2,
            scaling_point: Some(Vec2::ZERO),
            rotation: 0.0,
            has_scaling_changed: false,
            attached: None,
            notify_translation: false,
            notify_scaling: false,
        }
    }

    pub fn target_scaling(&self) -> f32 { self.target_scaling }

    /// True for the update in which the scaling changed.
    pub fn has_scaling_changed(&self) -> bool { self.has_scaling_changed }

    pub fn is_attached(&self) -> bool { self.attached.is_some() }

    /// Advance one tick. `view_width`/`view_height` are the game resolution,
    /// used to centre a followed entity.
    pub fn update(&mut self, view_width: f32, view_height: f32) -> CameraEvents {
        let mut events = CameraEvents::default();
        self.has_scaling_changed = false;

        if let Some([x, y, w, h]) = self.attached {
            self.target_position = Vec2::new(
                (x + w / 2.0) * self.scaling - view_width / 2.0,
                (y + h / 2.0) * self.scaling - view_height / 2.0,
            );
        }

        if !self.is_at_target_position() {
            self.position += (self.target_position - self.position) * self.speed;

            if (self.target_position.x - self.position.x).abs() < SNAP_EPSILON {
                self.position.x = self.target_position.x;
            }
            if (self.target_position.y - self.position.y).abs() < SNAP_EPSILON {
                self.position.y = self.target_position.y;
            }

            if self.is_at_target_position() && self.notify_translation {
                self.notify_translation = false;
                events.translation_finished = true;
            }
        }

        if self.scaling != self.target_scaling {
            let pre_scaling = self.scaling;
            self.scaling += (self.target_scaling - self.scaling) * self.scaling_speed;

            if let Some(point) = self.scaling_point {
                let relative = self.scaling / pre_scaling;
                self.set_position(self.position.x * relative + point.x * (relative - 1.0),
                                  self.position.y * relative + point.y * (relative - 1.0));
            }

            if (self.target_scaling - self.scaling).abs() < SNAP_EPSILON {
                self.scaling = self.target_scaling;
            }

            if self.notify_scaling && (self.target_scaling - self.scaling).abs() < SCALING_FINISHED_EPSILON {
                self.notify_scaling = false;
                events.scaling_finished = true;
            }
            self.has_scaling_changed = true;
        }

        self.clamp_to_bounds();
        events
    }

    pub fn is_at_target_position(&self) -> bool {
        self.position == self.target_position
    }

    /// Follow an entity. Call again whenever the entity moves.
    pub fn attach(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.attached = Some([x, y, w, h]);
    }

    pub fn detach(&mut self) {
        self.attached = None;
    }

    /// Ease toward `(x, y)`; the next update that reaches it reports
    /// `translation_finished`.
    pub fn set_target_position(&mut self, x: f32, y: f32) {
        self.target_position = Vec2::new(x, y);
        self.notify_translation = true;
    }

    /// Jump to `(x, y)` without easing.
    pub fn set_position(&mut self, x: f32, y: f32) {
        self.position = Vec2::new(x, y);
        self.target_position = self.position;
    }

    /// Set the scaling immediately. With a `point`, the position is
    /// re-anchored so that screen point stays over the same world point.
    pub fn set_scaling(&mut self, scaling: f32, point: Option<Vec2>) {
        if self.scaling == scaling {
            return;
        }
        let scaling = scaling.max(MIN_SCALING);

        if let Some(point) = point {
            let relative = scaling / self.scaling;
            self.set_position(self.position.x * relative + point.x * (relative - 1.0),
                              self.position.y * relative + point.y * (relative - 1.0));
        }

        self.scaling = scaling;
        self.target_scaling = scaling;
        self.has_scaling_changed = true;
    }

    /// Ease toward `scaling` around `point`. `speed` replaces the current
    /// scaling speed when given.
    pub fn set_target_scaling(&mut self, scaling: f32, point: Option<Vec2>, speed: Option<f32>) {
        self.target_scaling = scaling.max(MIN_SCALING);
        self.scaling_point = point;
        self.notify_scaling = true;
        if let Some(speed) = speed {
            self.scaling_speed = speed;
        }
    }

    pub fn set_bounds(&mut self, bounds: CameraBounds) {
        self.bounds = bounds;
    }

    pub fn apply_transforms(&self, canvas: &mut Canvas) {
        canvas.translate(-self.position.x, -self.position.y);
        canvas.scale(self.scaling, self.scaling);
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        world * self.scaling - self.position
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        (screen + self.position) / self.scaling
    }

    fn clamp_to_bounds(&mut self) {
        let b = self.bounds;
        if let Some(min_x) = b.min_x { self.position.x = self.position.x.max(min_x); }
        if let Some(max_x) = b.max_x { self.position.x = self.position.x.min(max_x); }
        if let Some(min_y) = b.min_y { self.position.y = self.position.y.max(min_y); }
        if let Some(max_y) = b.max_y { self.position.y = self.position.y.min(max_y); }
    }
}
