//! Engine configuration
//!
//! Loaded from a JSON file at startup; every field falls back to its default
//! when missing.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_FPS, DEFAULT_HEIGHT, DEFAULT_WIDTH, MIN_UPDATE_MS};
use crate::error::EngineError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === Window ===
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
    /// Clear color (RGBA)
    pub background: [u8; 4],

    // === Timing ===
    /// Render rate; simulation ticks run independently of this
    pub target_fps: f64,
    /// Sleep between loop iterations (milliseconds)
    pub min_update_ms: u64,

    // === Debug ===
    /// Draw collider outlines after each entity
    pub debug_colliders: bool,

    // === Audio ===
    pub master_volume: f32,
    pub music_volume: f32,
    pub sfx_volume: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            title: "roomcraft".to_string(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            fullscreen: false,
            background: [0, 0, 0, 255],

            target_fps: DEFAULT_FPS,
            min_update_ms: MIN_UPDATE_MS,

            debug_colliders: false,

            master_volume: 0.8,
            music_volume: 0.7,
            sfx_volume: 1.0,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load config from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Seconds between rendered frames (0 = render every tick)
    pub fn render_interval(&self) -> f64 {
        if self.target_fps > 0.0 {
            1.0 / self.target_fps
        } else {
            0.0
        }
    }
}
