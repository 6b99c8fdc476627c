mod builtin_font;
pub mod font;
pub mod image;

pub use builtin_font::builtin_font;
pub use font::{layout_text, Font, Glyph, GlyphQuad};
pub use self::image::Image;

use glam::{Affine2, Vec2};
use serde::{Deserialize, Serialize};

// ── Color ────────────────────────────────────────────────────────────────────

/// Straight-alpha RGBA8 color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub [u8; 4]);

impl Color {
    pub const TRANSPARENT: Self = Self([0, 0, 0, 0]);
    pub const BLACK: Self = Self([0, 0, 0, 255]);
    pub const WHITE: Self = Self([255, 255, 255, 255]);
    pub const RED: Self = Self([255, 0, 0, 255]);
    pub const GREEN: Self = Self([0, 255, 0, 255]);
    pub const BLUE: Self = Self([0, 0, 255, 255]);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self { Self([r, g, b, 255]) }
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self { Self([r, g, b, a]) }

    pub fn r(self) -> u8 { self.0[0] }
    pub fn g(self) -> u8 { self.0[1] }
    pub fn b(self) -> u8 { self.0[2] }
    pub fn a(self) -> u8 { self.0[3] }

    /// Same color with alpha given as a `0.0..=1.0` fraction.
    pub fn with_alpha(self, alpha: f32) -> Self {
        let [r, g, b, _] = self.0;
        Self([r, g, b, (alpha.clamp(0.0, 1.0) * 255.0).round() as u8])
    }
}

// ── Canvas ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct DrawState {
    transform: Affine2,
    global_alpha: f32,
}

/// Software 2D drawing surface over an RGBA8 framebuffer.
///
/// The API follows the HTML canvas context: transforms post-multiply onto the
/// current matrix, `save`/`restore` push and pop the transform and global
/// alpha, and every draw call blends source-over.
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    state: DrawState,
    stack: Vec<DrawState>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width as usize) * (height as usize) * 4],
            state: DrawState { transform: Affine2::IDENTITY, global_alpha: 1.0 },
            stack: Vec::new(),
        }
    }

    /// Resize the framebuffer. Like a canvas element, this clears the pixels
    /// and resets the drawing state.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels = vec![0; (width as usize) * (height as usize) * 4];
        self.state = DrawState { transform: Affine2::IDENTITY, global_alpha: 1.0 };
        self.stack.clear();
    }

    pub fn width(&self) -> u32 { self.width }
    pub fn height(&self) -> u32 { self.height }

    /// Raw RGBA8 rows, top to bottom.
    pub fn pixels(&self) -> &[u8] { &self.pixels }

    pub fn pixel(&self, x: u32, y: u32) -> Color {
        if x >= self.width || y >= self.height {
            return Color::TRANSPARENT;
        }
        let i = ((y * self.width + x) * 4) as usize;
        Color([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]])
    }

    /// Overwrite every pixel with `color`, ignoring transform and alpha.
    pub fn clear(&mut self, color: Color) {
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&color.0);
        }
    }

    // ── State ────────────────────────────────────────────────────────────────

    pub fn save(&mut self) {
        self.stack.push(self.state);
    }

    /// Pop the last saved state. An unbalanced `restore` is ignored.
    pub fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    pub fn save_depth(&self) -> usize { self.stack.len() }

    pub fn translate(&mut self, x: f32, y: f32) {
        self.state.transform = self.state.transform * Affine2::from_translation(Vec2::new(x, y));
    }

    pub fn scale(&mut self, sx: f32, sy: f32) {
        self.state.transform = self.state.transform * Affine2::from_scale(Vec2::new(sx, sy));
    }

    pub fn rotate(&mut self, radians: f32) {
        self.state.transform = self.state.transform * Affine2::from_angle(radians);
    }

    pub fn transform(&self) -> Affine2 { self.state.transform }

    pub fn set_transform(&mut self, transform: Affine2) {
        self.state.transform = transform;
    }

    pub fn reset_transform(&mut self) {
        self.state.transform = Affine2::IDENTITY;
    }

    pub fn global_alpha(&self) -> f32 { self.state.global_alpha }

    pub fn set_global_alpha(&mut self, alpha: f32) {
        self.state.global_alpha = alpha.clamp(0.0, 1.0);
    }

    // ── Drawing ──────────────────────────────────────────────────────────────

    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        self.raster(x, y, w, h, |_, _| Some(color));
    }

    /// Outline a rectangle; the stroke is centred on the rectangle edges.
    pub fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, line_width: f32, color: Color) {
        let half = line_width / 2.0;
        self.fill_rect(x - half, y - half, w + line_width, line_width, color);
        self.fill_rect(x - half, y + h - half, w + line_width, line_width, color);
        self.fill_rect(x - half, y + half, line_width, h - line_width, color);
        self.fill_rect(x + w - half, y + half, line_width, h - line_width, color);
    }

    /// Draw the whole image stretched into `(x, y, w, h)`.
    pub fn draw_image(&mut self, image: &Image, x: f32, y: f32, w: f32, h: f32) {
        let src = [0.0, 0.0, image.width() as f32, image.height() as f32];
        self.draw_image_region(image, src, [x, y, w, h]);
    }

    /// Draw the `src` rectangle (image pixels) of `image` into `dest`
    /// (canvas units). Sampling is nearest-neighbour.
    pub fn draw_image_region(&mut self, image: &Image, src: [f32; 4], dest: [f32; 4]) {
        let [sx, sy, sw, sh] = src;
        let [dx, dy, dw, dh] = dest;
        self.raster(dx, dy, dw, dh, |u, v| {
            let px = (sx + u * sw).floor();
            let py = (sy + v * sh).floor();
            if px < 0.0 || py < 0.0 {
                return None;
            }
            Some(image.pixel(px as u32, py as u32))
        });
    }

    /// Draw `text` with a bitmap font whose glyphs live in `atlas`. Glyph
    /// pixels keep their alpha and take the RGB of `color`.
    pub fn fill_text(
        &mut self,
        text: &str,
        font: &Font,
        atlas: &Image,
        x: f32,
        y: f32,
        font_size: f32,
        color: Color,
    ) {
        for quad in layout_text(text, font, [x, y], font_size) {
            let [sx, sy, sw, sh] = quad.src.map(|v| v as f32);
            let [dx, dy, dw, dh] = quad.dest;
            self.raster(dx, dy, dw, dh, |u, v| {
                let glyph = atlas.pixel((sx + u * sw) as u32, (sy + v * sh) as u32);
                let alpha = (glyph.a() as u16 * color.a() as u16 / 255) as u8;
                Some(Color([color.r(), color.g(), color.b(), alpha]))
            });
        }
    }

    pub fn measure_text(&self, text: &str, font: &Font, font_size: f32) -> f32 {
        font.measure(text, font_size)
    }

    /// Rasterise the rectangle `(x, y, w, h)` in local space under the
    /// current transform. `shade` receives the normalised `(u, v)` position
    /// inside the rectangle of each covered pixel centre.
    fn raster(&mut self, x: f32, y: f32, w: f32, h: f32, mut shade: impl FnMut(f32, f32) -> Option<Color>) {
        if w == 0.0 || h == 0.0 || self.width == 0 || self.height == 0 {
            return;
        }
        let (x, w) = if w < 0.0 { (x + w, -w) } else { (x, w) };
        let (y, h) = if h < 0.0 { (y + h, -h) } else { (y, h) };

        let transform = self.state.transform;
        if transform.matrix2.determinant().abs() <= f32::EPSILON {
            return;
        }
        let inverse = transform.inverse();

        let corners = [
            transform.transform_point2(Vec2::new(x, y)),
            transform.transform_point2(Vec2::new(x + w, y)),
            transform.transform_point2(Vec2::new(x, y + h)),
            transform.transform_point2(Vec2::new(x + w, y + h)),
        ];
        let min = corners.iter().fold(Vec2::splat(f32::INFINITY), |acc, c| acc.min(*c));
        let max = corners.iter().fold(Vec2::splat(f32::NEG_INFINITY), |acc, c| acc.max(*c));

        let x0 = min.x.floor().clamp(0.0, self.width as f32) as u32;
        let y0 = min.y.floor().clamp(0.0, self.height as f32) as u32;
        let x1 = max.x.ceil().clamp(0.0, self.width as f32) as u32;
        let y1 = max.y.ceil().clamp(0.0, self.height as f32) as u32;

        let alpha = self.state.global_alpha;
        for py in y0..y1 {
            for px in x0..x1 {
                let local = inverse.transform_point2(Vec2::new(px as f32 + 0.5, py as f32 + 0.5));
                if local.x < x || local.x >= x + w || local.y < y || local.y >= y + h {
                    continue;
                }
                if let Some(color) = shade((local.x - x) / w, (local.y - y) / h) {
                    self.blend(px, py, color, alpha);
                }
            }
        }
    }

    fn blend(&mut self, x: u32, y: u32, src: Color, global_alpha: f32) {
        let sa = src.a() as f32 / 255.0 * global_alpha;
        if sa <= 0.0 {
            return;
        }
        let i = ((y * self.width + x) * 4) as usize;
        let dst = &mut self.pixels[i..i + 4];
        let da = dst[3] as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        for c in 0..3 {
            let value = (src.0[c] as f32 * sa + dst[c] as f32 * da * (1.0 - sa)) / out_a;
            dst[c] = value.round().clamp(0.0, 255.0) as u8;
        }
        dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }
}
