use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("update frequency must be greater than zero")]
    InvalidUpdateFrequency,
    #[error("game resolution must be non-zero, got {width}x{height}")]
    InvalidResolution { width: u32, height: u32 },
    #[error("max frame delta must be between 1 and 1000 ms, got {0}")]
    InvalidMaxFrameDelta(u64),
}

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("missing parameters for resource '{key}'")]
    MissingParameters { key: String },
    #[error("failed to read resource '{key}' from {path}: {source}")]
    Read {
        key: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image '{key}': {source}")]
    Image {
        key: String,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to decode sound '{key}': {message}")]
    Sound { key: String, message: String },
    #[error("resource '{key}' is not valid UTF-8 text")]
    NotText { key: String },
    #[error("resource '{key}' is not valid JSON: {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("a background load is already running")]
    AlreadyLoading,
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("unknown sound '{0}'")]
    UnknownSound(String),
    #[error("audio backend failed to play '{key}': {message}")]
    Playback { key: String, message: String },
}

#[derive(Debug, Error)]
pub enum TilemapError {
    #[error("failed to parse map: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("map '{map}' references unknown tileset '{tileset}'")]
    UnknownTileset { map: String, tileset: String },
    #[error("layer '{layer}' has {found} rows, map has {expected}")]
    LayerSize {
        layer: String,
        expected: usize,
        found: usize,
    },
}

#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("module '{0}' does not exist")]
    Unknown(String),
    #[error("module '{0}' is already loaded")]
    AlreadyLoaded(String),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Module(#[from] ModuleError),
    #[error(transparent)]
    Resource(#[from] ResourceError),
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] winit::error::EventLoopError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] winit::error::EventLoopError),
    #[error("failed to create window: {0}")]
    CreateWindow(#[source] winit::error::OsError),
    #[error("failed to initialise renderer: {0}")]
    Renderer(String),
}
