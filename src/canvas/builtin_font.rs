use std::collections::HashMap;

use super::{Color, Font, Glyph, Image};

const GLYPH_W: u32 = 3;
const GLYPH_H: u32 = 5;
const CELL_W: u32 = 4;
const CELL_H: u32 = 6;
const ATLAS_COLS: u32 = 16;

#[rustfmt::skip]
const GLYPHS: &[(char, [&str; 5])] = &[
    ('0', ["###", "#.#", "#.#", "#.#", "###"]),
    ('1', [".#.", "##.", ".#.", ".#.", "###"]),
    ('2', ["###", "..#", "###", "#..", "###"]),
    ('3', ["###", "..#", ".##", "..#", "###"]),
    ('4', ["#.#", "#.#", "###", "..#", "..#"]),
    ('5', ["###", "#..", "###", "..#", "###"]),
    ('6', ["###", "#..", "###", "#.#", "###"]),
    ('7', ["###", "..#", "..#", ".#.", ".#."]),
    ('8', ["###", "#.#", "###", "#.#", "###"]),
    ('9', ["###", "#.#", "###", "..#", "###"]),
    ('A', [".#.", "#.#", "###", "#.#", "#.#"]),
    ('B', ["##.", "#.#", "##.", "#.#", "##."]),
    ('C', [".##", "#..", "#..", "#..", ".##"]),
    ('D', ["##.", "#.#", "#.#", "#.#", "##."]),
    ('E', ["###", "#..", "##.", "#..", "###"]),
    ('F', ["###", "#..", "##.", "#..", "#.."]),
    ('G', [".##", "#..", "#.#", "#.#", ".##"]),
    ('H', ["#.#", "#.#", "###", "#.#", "#.#"]),
    ('I', ["###", ".#.", ".#.", ".#.", "###"]),
    ('J', ["..#", "..#", "..#", "#.#", ".#."]),
    ('K', ["#.#", "#.#", "##.", "#.#", "#.#"]),
    ('L', ["#..", "#..", "#..", "#..", "###"]),
    ('M', ["#.#", "###", "###", "#.#", "#.#"]),
    ('N', ["##.", "#.#", "#.#", "#.#", "#.#"]),
    ('O', [".#.", "#.#", "#.#", "#.#", ".#."]),
    ('P', ["##.", "#.#", "##.", "#..", "#.."]),
    ('Q', [".#.", "#.#", "#.#", "##.", ".##"]),
    ('R', ["##.", "#.#", "##.", "#.#", "#.#"]),
    ('S', [".##", "#..", ".#.", "..#", "##."]),
    ('T', ["###", ".#.", ".#.", ".#.", ".#."]),
    ('U', ["#.#", "#.#", "#.#", "#.#", "###"]),
    ('V', ["#.#", "#.#", "#.#", "#.#", ".#."]),
    ('W', ["#.#", "#.#", "###", "###", "#.#"]),
    ('X', ["#.#", "#.#", ".#.", "#.#", "#.#"]),
    ('Y', ["#.#", "#.#", ".#.", ".#.", ".#."]),
    ('Z', ["###", "..#", ".#.", "#..", "###"]),
    (' ', ["...", "...", "...", "...", "..."]),
    ('.', ["...", "...", "...", "...", ".#."]),
    (',', ["...", "...", "...", ".#.", "#.."]),
    (':', ["...", ".#.", "...", ".#.", "..."]),
    ('-', ["...", "...", "###", "...", "..."]),
    ('+', ["...", ".#.", "###", ".#.", "..."]),
    ('=', ["...", "###", "...", "###", "..."]),
    ('/', ["..#", "..#", ".#.", "#..", "#.."]),
    ('(', [".#.", "#..", "#..", "#..", ".#."]),
    (')', [".#.", "..#", "..#", "..#", ".#."]),
    ('[', ["##.", "#..", "#..", "#..", "##."]),
    (']', [".##", "..#", "..#", "..#", ".##"]),
    ('%', ["#.#", "..#", ".#.", "#..", "#.#"]),
    ('_', ["...", "...", "...", "...", "###"]),
    ('!', [".#.", ".#.", ".#.", "...", ".#."]),
    ('?', ["##.", "..#", ".#.", "...", ".#."]),
    ('<', ["..#", ".#.", "#..", ".#.", "..#"]),
    ('>', ["#..", ".#.", "..#", ".#.", "#.."]),
    ('\'', [".#.", ".#.", "...", "...", "..."]),
    ('#', ["#.#", "###", "#.#", "###", "#.#"]),
];

/// Tiny 3x5 pixel font rasterised at startup, used by the debug overlay
/// when no font is supplied. Lowercase letters share the uppercase glyphs.
pub fn builtin_font() -> (Font, Image) {
    let rows = (GLYPHS.len() as u32).div_ceil(ATLAS_COLS);
    let width = ATLAS_COLS * CELL_W;
    let height = rows * CELL_H;
    let mut rgba = vec![0u8; (width * height * 4) as usize];
    let mut glyphs = HashMap::new();

    for (i, (ch, bitmap)) in GLYPHS.iter().enumerate() {
        let x0 = (i as u32 % ATLAS_COLS) * CELL_W;
        let y0 = (i as u32 / ATLAS_COLS) * CELL_H;

        for (dy, row) in bitmap.iter().enumerate() {
            for (dx, cell) in row.bytes().enumerate() {
                if cell == b'#' {
                    let idx = (((y0 + dy as u32) * width + x0 + dx as u32) * 4) as usize;
                    rgba[idx..idx + 4].copy_from_slice(&Color::WHITE.0);
                }
            }
        }

        let glyph = Glyph {
            id: *ch,
            x: x0,
            y: y0,
            width: GLYPH_W,
            height: GLYPH_H,
            x_offset: 0,
            y_offset: 0,
            x_advance: CELL_W,
        };
        if ch.is_ascii_uppercase() {
            let lower = ch.to_ascii_lowercase();
            glyphs.insert(lower, Glyph { id: lower, ..glyph.clone() });
        }
        glyphs.insert(*ch, glyph);
    }

    let font = Font { glyphs, line_height: CELL_H, texture_width: width, texture_height: height };
    (font, Image::from_parts(width, height, rgba))
}
