use glam::Vec2;

use crate::canvas::Canvas;

/// Maps the fixed game resolution onto whatever canvas size the window
/// allows.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    canvas_width: f32,
    canvas_height: f32,
    container_width: f32,
    container_height: f32,
    /// Canvas pixels per game pixel along each axis.
    render_scaling: Vec2,
    pub auto_scaling: bool,
    /// True for the single tick that follows a scaling change.
    pub has_scaling_changed: bool,
}

impl Viewport {
    /// A viewport whose canvas exactly matches the game resolution.
    pub fn new(game_width: u32, game_height: u32, auto_scaling: bool) -> Self {
        Self {
            canvas_width: game_width as f32,
            canvas_height: game_height as f32,
            container_width: game_width as f32,
            container_height: game_height as f32,
            render_scaling: Vec2::ONE,
            auto_scaling,
            has_scaling_changed: false,
        }
    }

    pub fn canvas_width(&self) -> f32 { self.canvas_width }
    pub fn canvas_height(&self) -> f32 { self.canvas_height }
    pub fn render_scaling(&self) -> Vec2 { self.render_scaling }

    /// Canvas size rounded to whole pixels, at least 1x1.
    pub fn canvas_size(&self) -> (u32, u32) {
        (
            (self.canvas_width.round() as u32).max(1),
            (self.canvas_height.round() as u32).max(1),
        )
    }

    /// Resize the canvas for a container of the given size.
    ///
    /// With auto scaling the game aspect ratio is preserved: when the game
    /// is relatively taller than the container the canvas fits the container
    /// height, otherwise it fits the width. Without auto scaling the canvas
    /// fills the container and nothing is scaled.
    pub fn refresh_scaling(&mut self, container_width: f32, container_height: f32, game_width: u32, game_height: u32) {
        self.container_width = container_width;
        self.container_height = container_height;
        self.has_scaling_changed = true;

        if !self.auto_scaling || container_width <= 0.0 || game_width == 0 {
            self.canvas_width = container_width;
            self.canvas_height = container_height;
            self.render_scaling = Vec2::ONE;
            return;
        }

        let height_to_width = game_height as f32 / game_width as f32;
        if height_to_width > container_height / container_width {
            self.canvas_height = container_height;
            self.canvas_width = container_height / height_to_width;
        } else {
            self.canvas_width = container_width;
            self.canvas_height = container_width * height_to_width;
        }

        self.render_scaling = Vec2::new(
            self.canvas_width / game_width as f32,
            self.canvas_height / game_height as f32,
        );
    }

    pub fn apply_scaling(&self, canvas: &mut Canvas) {
        canvas.scale(self.render_scaling.x, self.render_scaling.y);
    }

    pub fn remove_scaling(&self, canvas: &mut Canvas) {
        canvas.scale(1.0 / self.render_scaling.x, 1.0 / self.render_scaling.y);
    }

    pub fn canvas_to_game(&self, canvas_x: f32, canvas_y: f32) -> Vec2 {
        Vec2::new(canvas_x, canvas_y) / self.render_scaling
    }

    /// Placement `[x, y, w, h]` of the canvas centred inside the container,
    /// in container pixels.
    pub fn letterbox(&self) -> [f32; 4] {
        [
            ((self.container_width - self.canvas_width) / 2.0).max(0.0),
            ((self.container_height - self.canvas_height) / 2.0).max(0.0),
            self.canvas_width,
            self.canvas_height,
        ]
    }

    /// Convert a window cursor position into canvas coordinates.
    pub fn container_to_canvas(&self, x: f32, y: f32) -> Vec2 {
        let [left, top, _, _] = self.letterbox();
        Vec2::new(x - left, y - top)
    }
}
