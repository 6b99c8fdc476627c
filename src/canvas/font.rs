use std::collections::HashMap;

use serde::Deserialize;

// ── GlyphQuad ────────────────────────────────────────────────────────────────

/// One placed glyph: where it lands on the canvas and which atlas region
/// it is cut from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphQuad {
    /// Destination rectangle `[x, y, w, h]` in canvas units.
    pub dest: [f32; 4],
    /// Source rectangle `[x, y, w, h]` in atlas pixels.
    pub src: [u32; 4],
}

// ── layout_text ──────────────────────────────────────────────────────────────

/// Lay `text` out as a list of glyph quads.
///
/// `start` is the top-left of the text block; `font_size` is the desired line
/// height and scales every glyph by `font_size / font.line_height`.
///
/// - `'\n'` resets x to `start[0]` and moves down one scaled line.
/// - Characters missing from the font are skipped.
/// - A font with a zero line height lays out nothing.
pub fn layout_text(text: &str, font: &Font, start: [f32; 2], font_size: f32) -> Vec<GlyphQuad> {
    if font.line_height == 0 {
        return Vec::new();
    }

    let scale = font_size / font.line_height as f32;
    let mut quads = Vec::with_capacity(text.len());
    let mut x = start[0];
    let mut y = start[1];

    for ch in text.chars() {
        if ch == '\n' {
            x = start[0];
            y += font.line_height as f32 * scale;
            continue;
        }

        let Some(glyph) = font.glyphs.get(&ch) else {
            continue;
        };

        quads.push(GlyphQuad {
            dest: [
                x + glyph.x_offset as f32 * scale,
                y + glyph.y_offset as f32 * scale,
                glyph.width as f32 * scale,
                glyph.height as f32 * scale,
            ],
            src: [glyph.x, glyph.y, glyph.width, glyph.height],
        });

        x += glyph.x_advance as f32 * scale;
    }

    quads
}

// ── Glyph ────────────────────────────────────────────────────────────────────

/// Metrics for a single character in the bitmap font atlas.
#[derive(Debug, Clone)]
pub struct Glyph {
    pub id: char,
    /// Top-left pixel X of the glyph region in the atlas.
    pub x: u32,
    /// Top-left pixel Y of the glyph region in the atlas.
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Horizontal offset applied when rendering (may be negative).
    pub x_offset: i32,
    /// Vertical offset applied when rendering (may be negative).
    pub y_offset: i32,
    /// How far to advance the cursor after drawing this glyph.
    pub x_advance: u32,
}

// ── Font ─────────────────────────────────────────────────────────────────────

/// A bitmap font described by JSON. The atlas image itself lives in the
/// resource manager; the font only knows the glyph rectangles.
#[derive(Debug, Clone)]
pub struct Font {
    pub glyphs: HashMap<char, Glyph>,
    /// Vertical distance between successive baselines in pixels.
    pub line_height: u32,
    pub texture_width: u32,
    pub texture_height: u32,
}

impl Font {
    /// Deserialise a `Font` from the full-metrics JSON format.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let raw: RawFont = serde_json::from_str(json)?;

        let glyphs = raw
            .glyphs
            .into_iter()
            .filter_map(|g| {
                // Skip any code point that isn't a valid Unicode scalar value.
                char::from_u32(g.id).map(|ch| {
                    (ch, Glyph {
                        id: ch,
                        x: g.x,
                        y: g.y,
                        width: g.width,
                        height: g.height,
                        x_offset: g.x_offset,
                        y_offset: g.y_offset,
                        x_advance: g.x_advance,
                    })
                })
            })
            .collect();

        Ok(Self {
            glyphs,
            line_height: raw.line_height,
            texture_width: raw.texture_width,
            texture_height: raw.texture_height,
        })
    }

    /// Deserialise a `Font` from the grid-atlas format, where each key is a
    /// single character mapped to its pixel rectangle:
    ///
    /// ```json
    /// { "A": { "x": 0, "y": 0, "w": 8, "h": 12 }, ... }
    /// ```
    ///
    /// `x_advance` defaults to the glyph width, offsets are zero.
    pub fn from_atlas_json(
        json: &str,
        texture_width: u32,
        texture_height: u32,
    ) -> Result<Self, serde_json::Error> {
        #[derive(Deserialize)]
        struct AtlasEntry { x: u32, y: u32, w: u32, h: u32 }

        let raw: HashMap<String, AtlasEntry> = serde_json::from_str(json)?;

        let line_height = raw.values().map(|e| e.h).max().unwrap_or(0);

        let glyphs = raw
            .into_iter()
            .filter_map(|(key, entry)| {
                let mut chars = key.chars();
                let ch = chars.next()?;
                if chars.next().is_some() { return None; }

                Some((ch, Glyph {
                    id: ch,
                    x: entry.x,
                    y: entry.y,
                    width: entry.w,
                    height: entry.h,
                    x_offset: 0,
                    y_offset: 0,
                    x_advance: entry.w,
                }))
            })
            .collect();

        Ok(Self { glyphs, line_height, texture_width, texture_height })
    }

    /// Width of the widest line of `text` at `font_size`.
    pub fn measure(&self, text: &str, font_size: f32) -> f32 {
        if self.line_height == 0 {
            return 0.0;
        }
        let scale = font_size / self.line_height as f32;
        text.split('\n')
            .map(|line| {
                line.chars()
                    .filter_map(|ch| self.glyphs.get(&ch))
                    .map(|g| g.x_advance as f32 * scale)
                    .sum::<f32>()
            })
            .fold(0.0, f32::max)
    }
}

// ── Raw (JSON-facing) types ───────────────────────────────────────────────────

#[derive(Deserialize)]
struct RawGlyph {
    /// Unicode code point (e.g. 65 for 'A').
    id: u32,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    x_offset: i32,
    y_offset: i32,
    x_advance: u32,
}

#[derive(Deserialize)]
struct RawFont {
    line_height: u32,
    texture_width: u32,
    texture_height: u32,
    glyphs: Vec<RawGlyph>,
}
