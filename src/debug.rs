use std::fmt;

use serde::{Deserialize, Serialize};
use winit::keyboard::KeyCode;

use crate::canvas::{builtin_font, Canvas, Color, Font, Image};

// ── Values ───────────────────────────────────────────────────────────────────

/// Value shown on a debug line.
#[derive(Debug, Clone, PartialEq)]
pub enum DebugValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl fmt::Display for DebugValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DebugValue::Bool(b) => write!(f, "{b}"),
            DebugValue::Number(n) if n.fract() == 0.0 => write!(f, "{n:.0}"),
            DebugValue::Number(n) => write!(f, "{n:.2}"),
            DebugValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for DebugValue { fn from(v: bool) -> Self { Self::Bool(v) } }
impl From<f64> for DebugValue { fn from(v: f64) -> Self { Self::Number(v) } }
impl From<f32> for DebugValue { fn from(v: f32) -> Self { Self::Number(v as f64) } }
impl From<i32> for DebugValue { fn from(v: i32) -> Self { Self::Number(v as f64) } }
impl From<u32> for DebugValue { fn from(v: u32) -> Self { Self::Number(v as f64) } }
impl From<u64> for DebugValue { fn from(v: u64) -> Self { Self::Number(v as f64) } }
impl From<usize> for DebugValue { fn from(v: usize) -> Self { Self::Number(v as f64) } }
impl From<&str> for DebugValue { fn from(v: &str) -> Self { Self::Text(v.to_string()) } }
impl From<String> for DebugValue { fn from(v: String) -> Self { Self::Text(v) } }

/// Expected range of a debug value; a line that breaks one is drawn in the
/// error color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Expectations {
    pub boolean: Option<bool>,
    pub max_value: Option<f64>,
    pub min_value: Option<f64>,
}

impl Expectations {
    pub fn is_violated_by(&self, value: &DebugValue) -> bool {
        match value {
            DebugValue::Bool(b) => self.boolean.is_some_and(|expected| expected != *b),
            DebugValue::Number(n) => {
                self.max_value.is_some_and(|max| *n > max) || self.min_value.is_some_and(|min| *n < min)
            }
            DebugValue::Text(_) => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DebugLine {
    pub name: String,
    pub value: DebugValue,
    pub expectations: Option<Expectations>,
}

// ── Style ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugStyle {
    pub font_size: f32,
    pub line_height: f32,
    pub color: Color,
    pub error_color: Color,
    pub background_color: Color,
    pub x: f32,
    pub y: f32,
    pub padding: f32,
}

impl Default for DebugStyle {
    fn default() -> Self {
        Self {
            font_size: 14.0,
            line_height: 16.0,
            color: Color::WHITE,
            error_color: Color::rgb(220, 100, 80),
            background_color: Color::rgba(40, 40, 40, 179),
            x: 0.0,
            y: 0.0,
            padding: 6.0,
        }
    }
}

// ── Overlay ──────────────────────────────────────────────────────────────────

/// Per-frame list of `name : value` lines drawn in a box over the game.
/// Lines are cleared after every render, so they are re-added each frame.
pub struct DebugOverlay {
    pub enabled: bool,
    pub toggle_key: KeyCode,
    pub style: DebugStyle,
    /// Add an fps / tps line before every render.
    pub show_frame_stats: bool,
    lines: Vec<DebugLine>,
    font: Font,
    atlas: Image,
}

impl Default for DebugOverlay {
    fn default() -> Self {
        Self::new(KeyCode::F3)
    }
}

impl DebugOverlay {
    pub fn new(toggle_key: KeyCode) -> Self {
        let (font, atlas) = builtin_font();
        Self {
            enabled: true,
            toggle_key,
            style: DebugStyle::default(),
            show_frame_stats: true,
            lines: Vec::new(),
            font,
            atlas,
        }
    }

    /// Replace the built-in font.
    pub fn set_font(&mut self, font: Font, atlas: Image) {
        self.font = font;
        self.atlas = atlas;
    }

    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }

    pub fn add_line(&mut self, name: impl Into<String>, value: impl Into<DebugValue>) {
        self.lines.push(DebugLine { name: name.into(), value: value.into(), expectations: None });
    }

    pub fn add_line_with(&mut self, name: impl Into<String>, value: impl Into<DebugValue>, expectations: Expectations) {
        self.lines.push(DebugLine {
            name: name.into(),
            value: value.into(),
            expectations: Some(expectations),
        });
    }

    pub fn lines(&self) -> &[DebugLine] { &self.lines }

    /// Drop the lines added this frame without drawing them.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Width and height of the box the current lines would need.
    pub fn box_size(&self) -> (f32, f32) {
        let s = &self.style;
        let name_width = self.lines.iter().map(|l| self.font.measure(&l.name, s.font_size)).fold(0.0, f32::max);
        let value_width = self
            .lines
            .iter()
            .map(|l| self.font.measure(&l.value.to_string(), s.font_size))
            .fold(0.0, f32::max);
        let width = 2.0 * s.padding + name_width + value_width + self.font.measure(" : ", s.font_size);
        let height = 2.0 * s.padding + self.lines.len() as f32 * s.line_height - (s.line_height - s.font_size);
        (width, height)
    }

    /// Draw the box and clear the lines. Nothing is drawn while disabled or
    /// when no line was added.
    pub fn render(&mut self, canvas: &mut Canvas) {
        if !self.enabled || self.lines.is_empty() {
            self.lines.clear();
            return;
        }

        let s = self.style;
        let (width, height) = self.box_size();
        canvas.fill_rect(s.x, s.y, width, height, s.background_color);

        let pad_to = self.lines.iter().map(|l| l.name.chars().count()).max().unwrap_or(0);
        for (i, line) in self.lines.iter().enumerate() {
            let violated = line.expectations.is_some_and(|e| e.is_violated_by(&line.value));
            let color = if violated { s.error_color } else { s.color };
            let text = format!("{:<pad_to$} : {}", line.name, line.value);
            canvas.fill_text(
                &text,
                &self.font,
                &self.atlas,
                s.x + s.padding,
                s.y + s.padding + i as f32 * s.line_height,
                s.font_size,
                color,
            );
        }

        self.lines.clear();
    }
}
