//! Rendering sink
//!
//! The simulation never owns a window or GPU context. It issues draw calls
//! through the `Renderer` trait and treats the implementation as a black box.

pub mod headless;
pub mod shapes;
pub mod vertex;

pub use headless::{DrawCommand, HeadlessRenderer};
pub use vertex::Vertex;

use glam::IVec2;
use thiserror::Error;

use crate::sim::DrawParams;

/// Per-draw failures. These never stop the loop; the room logs and moves on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("no texture registered as '{0}'")]
    MissingTexture(String),
    #[error("no font registered as '{0}'")]
    MissingFont(String),
    #[error("draw failed: {0}")]
    Draw(String),
}

/// Draw-call sink implemented by the platform layer
pub trait Renderer {
    /// Start a new frame, filling it with `color`
    fn clear(&mut self, color: [u8; 4]);

    /// Textured rectangle with rotation and flip
    fn draw_sprite(&mut self, params: &DrawParams<'_>) -> Result<(), RenderError>;

    /// Closed outline through `vertices`
    fn draw_outline(&mut self, vertices: &[Vertex]) -> Result<(), RenderError>;

    fn draw_text(
        &mut self,
        font: &str,
        text: &str,
        pos: IVec2,
        color: [u8; 4],
    ) -> Result<(), RenderError>;

    /// Show the finished frame
    fn present(&mut self) {}

    fn set_fullscreen(&mut self, _fullscreen: bool) {}
}
