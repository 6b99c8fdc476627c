pub mod animation;
pub mod audio;
pub mod camera;
pub mod canvas;
pub mod config;
pub mod debug;
pub mod engine;
pub mod error;
pub mod input;
pub mod logging;
pub mod modules;
pub mod particles;
pub mod renderer;
pub mod resources;
pub mod state;
pub mod tilemap;
pub mod timing;
pub mod viewport;

pub use canvas::{Canvas, Color};
pub use config::EngineConfig;
pub use engine::{Engine, EngineBuilder, FrameReport, Runtime};
pub use error::EngineError;
pub use input::{EventListener, InputEvent, KeyCode, MouseButton};
pub use state::{State, Transition};
