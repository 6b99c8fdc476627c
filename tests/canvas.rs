use std::f32::consts::FRAC_PI_2;

use cadence2d::canvas::{builtin_font, Image};
use cadence2d::{Canvas, Color};

fn canvas() -> Canvas {
    let mut canvas = Canvas::new(8, 8);
    canvas.clear(Color::BLACK);
    canvas
}

/// Count pixels equal to `color`.
fn count(canvas: &Canvas, color: Color) -> usize {
    (0..canvas.height())
        .flat_map(|y| (0..canvas.width()).map(move |x| (x, y)))
        .filter(|&(x, y)| canvas.pixel(x, y) == color)
        .count()
}

// ── Color ─────────────────────────────────────────────────────────────────────

#[test]
fn with_alpha_scales_to_u8() {
    assert_eq!(Color::RED.with_alpha(0.5), Color::rgba(255, 0, 0, 128));
    assert_eq!(Color::RED.with_alpha(2.0).a(), 255, "alpha is clamped");
}

// ── basic drawing ─────────────────────────────────────────────────────────────

#[test]
fn new_canvas_is_transparent() {
    let canvas = Canvas::new(3, 2);
    assert_eq!(canvas.pixels().len(), 3 * 2 * 4);
    assert_eq!(canvas.pixel(2, 1), Color::TRANSPARENT);
    assert_eq!(canvas.pixel(3, 0), Color::TRANSPARENT, "out of bounds reads are transparent");
}

#[test]
fn fill_rect_covers_exact_pixels() {
    let mut c = canvas();
    c.fill_rect(2.0, 1.0, 3.0, 2.0, Color::RED);

    assert_eq!(count(&c, Color::RED), 6);
    assert_eq!(c.pixel(2, 1), Color::RED);
    assert_eq!(c.pixel(4, 2), Color::RED);
    assert_eq!(c.pixel(5, 2), Color::BLACK);
}

#[test]
fn negative_size_is_normalised() {
    let mut c = canvas();
    c.fill_rect(4.0, 4.0, -2.0, -2.0, Color::GREEN);
    assert_eq!(count(&c, Color::GREEN), 4);
    assert_eq!(c.pixel(2, 2), Color::GREEN);
}

#[test]
fn drawing_outside_is_clipped() {
    let mut c = canvas();
    c.fill_rect(-4.0, -4.0, 6.0, 6.0, Color::BLUE);
    assert_eq!(count(&c, Color::BLUE), 4);
}

/// Source-over blending with a half transparent color.
#[test]
fn translucent_fill_blends() {
    let mut c = canvas();
    c.fill_rect(0.0, 0.0, 1.0, 1.0, Color::rgba(255, 255, 255, 128));
    let px = c.pixel(0, 0);
    assert_eq!(px.a(), 255);
    assert!((127..=129).contains(&px.r()), "got {px:?}");
}

#[test]
fn global_alpha_multiplies_source_alpha() {
    let mut c = Canvas::new(1, 1);
    c.set_global_alpha(0.5);
    c.fill_rect(0.0, 0.0, 1.0, 1.0, Color::WHITE);
    let px = c.pixel(0, 0);
    assert_eq!((px.r(), px.a()), (255, 128));
}

#[test]
fn stroke_rect_leaves_inside_untouched() {
    let mut c = canvas();
    c.stroke_rect(1.0, 1.0, 6.0, 6.0, 2.0, Color::WHITE);
    assert_eq!(c.pixel(0, 0), Color::WHITE);
    assert_eq!(c.pixel(1, 4), Color::WHITE);
    assert_eq!(c.pixel(4, 4), Color::BLACK);
    assert_eq!(c.pixel(6, 6), Color::WHITE);
}

// ── transforms ────────────────────────────────────────────────────────────────

#[test]
fn translate_then_scale_compose_like_html_canvas() {
    let mut c = canvas();
    c.translate(2.0, 2.0);
    c.scale(2.0, 2.0);
    c.fill_rect(0.0, 0.0, 1.0, 1.0, Color::RED);

    assert_eq!(count(&c, Color::RED), 4);
    assert_eq!(c.pixel(2, 2), Color::RED);
    assert_eq!(c.pixel(3, 3), Color::RED);
}

#[test]
fn rotation_turns_rect_around_origin() {
    let mut c = canvas();
    c.translate(4.0, 4.0);
    c.rotate(FRAC_PI_2);
    // Along +x before rotation, along +y after.
    c.fill_rect(0.0, 0.0, 3.0, 1.0, Color::GREEN);

    assert_eq!(c.pixel(3, 4), Color::GREEN);
    assert_eq!(c.pixel(3, 6), Color::GREEN);
    assert_eq!(c.pixel(6, 3), Color::BLACK);
}

#[test]
fn save_restore_round_trips_state() {
    let mut c = canvas();
    c.save();
    c.translate(5.0, 5.0);
    c.set_global_alpha(0.1);
    assert_eq!(c.save_depth(), 1);
    c.restore();

    assert_eq!(c.global_alpha(), 1.0);
    c.fill_rect(0.0, 0.0, 1.0, 1.0, Color::RED);
    assert_eq!(c.pixel(0, 0), Color::RED);
}

#[test]
fn unbalanced_restore_is_ignored() {
    let mut c = canvas();
    c.translate(1.0, 0.0);
    c.restore();
    c.fill_rect(0.0, 0.0, 1.0, 1.0, Color::RED);
    assert_eq!(c.pixel(1, 0), Color::RED);
}

/// A degenerate transform draws nothing instead of dividing by zero.
#[test]
fn zero_scale_draws_nothing() {
    let mut c = canvas();
    c.scale(0.0, 1.0);
    c.fill_rect(0.0, 0.0, 8.0, 8.0, Color::RED);
    assert_eq!(count(&c, Color::RED), 0);
}

#[test]
fn resize_clears_and_resets() {
    let mut c = canvas();
    c.translate(3.0, 3.0);
    c.save();
    c.resize(4, 4);

    assert_eq!((c.width(), c.height()), (4, 4));
    assert_eq!(c.pixel(0, 0), Color::TRANSPARENT);
    assert_eq!(c.save_depth(), 0);
    c.fill_rect(0.0, 0.0, 1.0, 1.0, Color::RED);
    assert_eq!(c.pixel(0, 0), Color::RED);
}

// ── images ────────────────────────────────────────────────────────────────────

fn checker() -> Image {
    // 2x2: red, green / blue, white
    let rgba = [Color::RED, Color::GREEN, Color::BLUE, Color::WHITE]
        .iter()
        .flat_map(|c| c.0)
        .collect();
    Image::from_rgba(2, 2, rgba).unwrap()
}

#[test]
fn from_rgba_checks_length() {
    assert!(Image::from_rgba(2, 2, vec![0; 15]).is_none());
}

#[test]
fn draw_image_stretches_with_nearest_sampling() {
    let mut c = canvas();
    c.draw_image(&checker(), 0.0, 0.0, 4.0, 4.0);

    assert_eq!(c.pixel(0, 0), Color::RED);
    assert_eq!(c.pixel(1, 1), Color::RED);
    assert_eq!(c.pixel(2, 0), Color::GREEN);
    assert_eq!(c.pixel(0, 3), Color::BLUE);
    assert_eq!(c.pixel(3, 3), Color::WHITE);
    assert_eq!(c.pixel(4, 4), Color::BLACK);
}

#[test]
fn draw_image_region_cuts_source() {
    let mut c = canvas();
    c.draw_image_region(&checker(), [1.0, 1.0, 1.0, 1.0], [0.0, 0.0, 2.0, 2.0]);
    assert_eq!(count(&c, Color::WHITE), 4);
}

#[test]
fn decodes_png_bytes() {
    let mut png = Vec::new();
    let buffer = image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
    buffer
        .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
        .unwrap();

    let img = Image::from_bytes(&png).unwrap();
    assert_eq!((img.width(), img.height()), (3, 2));
    assert_eq!(img.pixel(2, 1), Color::rgb(10, 20, 30));
}

#[test]
fn garbage_bytes_fail_to_decode() {
    assert!(Image::from_bytes(b"not a png").is_err());
}

// ── text ──────────────────────────────────────────────────────────────────────

#[test]
fn fill_text_uses_color_rgb() {
    let (font, atlas) = builtin_font();
    let mut c = Canvas::new(32, 8);
    c.clear(Color::BLACK);
    c.fill_text("1", &font, &atlas, 0.0, 0.0, 6.0, Color::RED);

    // '1' has its middle column lit on every row.
    assert_eq!(c.pixel(1, 2), Color::RED);
    assert!(count(&c, Color::RED) > 0);
    assert_eq!(count(&c, Color::WHITE), 0);
}

#[test]
fn measure_text_matches_font() {
    let (font, _) = builtin_font();
    let c = Canvas::new(1, 1);
    assert_eq!(c.measure_text("AB", &font, 6.0), font.measure("AB", 6.0));
    assert_eq!(c.measure_text("AB", &font, 6.0), 8.0);
}
