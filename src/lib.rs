//! Roomcraft - a minimal real-time room/entity engine
//!
//! Core modules:
//! - `sim`: Rooms, entities, sprite animation, collision geometry and the loop driver
//! - `renderer`: Draw-call sink consumed by the simulation (plus a headless recorder)
//! - `audio`: Fire-and-forget audio collaborator
//! - `assets`: String-keyed asset registries
//! - `settings`: Engine configuration

pub mod assets;
pub mod audio;
pub mod error;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use assets::Registry;
pub use audio::{AudioManager, AudioSink, NullAudio, SoundKind};
pub use error::EngineError;
pub use renderer::{HeadlessRenderer, RenderError, Renderer};
pub use settings::EngineConfig;

/// Engine configuration constants
pub mod consts {
    /// Default render rate (frames per second)
    pub const DEFAULT_FPS: f64 = 60.0;
    /// Minimum sleep between loop iterations (milliseconds)
    pub const MIN_UPDATE_MS: u64 = 1;

    /// Default window size
    pub const DEFAULT_WIDTH: u32 = 1920;
    pub const DEFAULT_HEIGHT: u32 = 1080;

    /// Segments used when outlining circle colliders
    pub const CIRCLE_OUTLINE_SEGMENTS: u32 = 24;
}

/// Linear interpolation from `val` toward `approach` by `weight`
#[inline]
pub fn lerp(val: f64, approach: f64, weight: f64) -> f64 {
    val * (1.0 - weight) + (approach * weight)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_endpoints() {
        assert_eq!(lerp(2.0, 10.0, 0.0), 2.0);
        assert_eq!(lerp(2.0, 10.0, 1.0), 10.0);
        assert!((lerp(0.0, 10.0, 0.25) - 2.5).abs() < 1e-9);
    }
}
