use serde::{Deserialize, Serialize};

use crate::canvas::Canvas;
use crate::resources::ResourceManager;

/// How many ticks each frame stays on screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Delays {
    /// Same delay for every frame.
    Constant(u32),
    /// One delay per frame; missing entries count as one tick.
    PerFrame(Vec<u32>),
}

/// Tick-driven flip-book over a list of image keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Animation {
    frames: Vec<String>,
    delays: Vec<u32>,
    index: usize,
    to_next_frame: u32,
}

impl Animation {
    pub fn new<S: Into<String>>(frames: impl IntoIterator<Item = S>, delays: Delays) -> Self {
        let frames: Vec<String> = frames.into_iter().map(Into::into).collect();
        let delays = match delays {
            Delays::Constant(d) => vec![d.max(1); frames.len()],
            Delays::PerFrame(list) => (0..frames.len())
                .map(|i| list.get(i).copied().unwrap_or(1).max(1))
                .collect(),
        };
        let to_next_frame = delays.first().copied().unwrap_or(1);
        Self { frames, delays, index: 0, to_next_frame }
    }

    /// Advance one tick; moves to the next frame (wrapping) when the
    /// current frame's delay runs out.
    pub fn update(&mut self) {
        if self.frames.is_empty() {
            return;
        }
        self.to_next_frame = self.to_next_frame.saturating_sub(1);
        if self.to_next_frame == 0 {
            self.index = (self.index + 1) % self.frames.len();
            self.to_next_frame = self.delays[self.index];
        }
    }

    pub fn index(&self) -> usize { self.index }
    pub fn len(&self) -> usize { self.frames.len() }
    pub fn is_empty(&self) -> bool { self.frames.is_empty() }

    /// Image key of the frame on screen.
    pub fn current(&self) -> Option<&str> {
        self.frames.get(self.index).map(String::as_str)
    }

    pub fn reset(&mut self) {
        self.index = 0;
        self.to_next_frame = self.delays.first().copied().unwrap_or(1);
    }

    /// Draw the current frame; does nothing if its image isn't loaded.
    pub fn render(&self, canvas: &mut Canvas, resources: &ResourceManager, x: f32, y: f32, w: f32, h: f32) {
        if let Some(image) = self.current().and_then(|key| resources.get_image(key)) {
            canvas.draw_image(image, x, y, w, h);
        }
    }
}
