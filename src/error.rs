//! Configuration errors
//!
//! These indicate a broken scene graph or config file and are surfaced to the
//! caller immediately. Transient draw failures live in `renderer::RenderError`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown scene '{0}'")]
    UnknownScene(String),
    #[error("entity '{entity}' has no animation named '{animation}'")]
    UnknownAnimation { entity: String, animation: String },
    #[error("no entity with id '{0}' in the active scene")]
    UnknownEntity(String),
    #[error("entity id '{0}' is already used in this scene")]
    DuplicateEntity(String),
    #[error("an animation needs at least one frame")]
    EmptyAnimation,
    #[error("animation has {frames} frames, frame {index} is out of range")]
    FrameOutOfRange { index: usize, frames: usize },
    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
