//! Simulation module
//!
//! Everything that runs inside a frame lives here:
//! - Collision geometry and sprite animation (pure, no I/O)
//! - The entity contract and rooms that drive it through the four phases
//! - The loop driver that paces ticks and switches scenes
//!
//! Rendering and audio are reached only through the `Renderer` and
//! `AudioSink` traits.

pub mod collision;
pub mod context;
pub mod entity;
pub mod room;
pub mod sprite;
pub mod tick;

pub use collision::{Shape, overlaps};
pub use context::{Commands, FrameContext};
pub use entity::{Entity, EntityState, Peers};
pub use room::Room;
pub use sprite::{Animation, DrawParams, Frame, Rect, Transform};
pub use tick::{Driver, EventSource, InputEvent, Key, LoopState};
