//! Audio collaborator
//!
//! Entities request sounds fire-and-forget through `AudioSink`. Nothing in the
//! simulation waits on playback. `AudioManager` is the headless mixer: it knows
//! which clips exist and tracks volume and music state, and a platform layer
//! can drain its queue to a real device.

use crate::assets::Registry;
use crate::settings::EngineConfig;

/// Clip categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundKind {
    /// Looping background track; only one plays at a time
    Music,
    /// One-shot effect
    Effect,
}

/// Fire-and-forget audio requests
pub trait AudioSink {
    fn play(&mut self, clip: &str);
    fn is_music_playing(&self) -> bool;
    fn pause_music(&mut self);
    fn resume_music(&mut self);
    fn halt_music(&mut self);
}

/// Audio sink that ignores every request
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _clip: &str) {}

    fn is_music_playing(&self) -> bool {
        false
    }

    fn pause_music(&mut self) {}

    fn resume_music(&mut self) {}

    fn halt_music(&mut self) {}
}

#[derive(Debug, Clone, PartialEq)]
struct MusicState {
    clip: String,
    paused: bool,
}

/// A playback request with its effective volume
#[derive(Debug, Clone, PartialEq)]
pub struct PlayRequest {
    pub clip: String,
    pub kind: SoundKind,
    pub volume: f32,
}

/// Audio manager for the engine
#[derive(Debug, Clone)]
pub struct AudioManager {
    clips: Registry<SoundKind>,
    master_volume: f32,
    music_volume: f32,
    sfx_volume: f32,
    muted: bool,
    music: Option<MusicState>,
    queue: Vec<PlayRequest>,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new(Registry::new())
    }
}

impl AudioManager {
    pub fn new(clips: Registry<SoundKind>) -> Self {
        Self {
            clips,
            master_volume: 0.8,
            music_volume: 0.7,
            sfx_volume: 1.0,
            muted: false,
            music: None,
            queue: Vec::new(),
        }
    }

    /// Create a manager using the volume levels from `config`
    pub fn from_config(clips: Registry<SoundKind>, config: &EngineConfig) -> Self {
        let mut manager = Self::new(clips);
        manager.set_master_volume(config.master_volume);
        manager.set_music_volume(config.music_volume);
        manager.set_sfx_volume(config.sfx_volume);
        manager
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set music volume (0.0 - 1.0)
    pub fn set_music_volume(&mut self, vol: f32) {
        self.music_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Get effective volume for a clip kind
    fn effective_volume(&self, kind: SoundKind) -> f32 {
        if self.muted {
            return 0.0;
        }
        let channel = match kind {
            SoundKind::Music => self.music_volume,
            SoundKind::Effect => self.sfx_volume,
        };
        self.master_volume * channel
    }

    /// Currently selected music track, paused or not
    pub fn current_music(&self) -> Option<&str> {
        self.music.as_ref().map(|m| m.clip.as_str())
    }

    /// Take every request made since the last drain
    pub fn drain(&mut self) -> Vec<PlayRequest> {
        std::mem::take(&mut self.queue)
    }
}

impl AudioSink for AudioManager {
    fn play(&mut self, clip: &str) {
        let Some(&kind) = self.clips.get(clip) else {
            log::warn!("Unknown audio clip '{}' - skipped", clip);
            return;
        };

        if kind == SoundKind::Music {
            self.music = Some(MusicState {
                clip: clip.to_string(),
                paused: false,
            });
        }

        let volume = self.effective_volume(kind);
        if volume <= 0.0 && kind == SoundKind::Effect {
            return;
        }
        log::debug!("Play {:?} '{}' at volume {:.2}", kind, clip, volume);
        self.queue.push(PlayRequest {
            clip: clip.to_string(),
            kind,
            volume,
        });
    }

    fn is_music_playing(&self) -> bool {
        self.music.as_ref().is_some_and(|m| !m.paused)
    }

    fn pause_music(&mut self) {
        if let Some(music) = &mut self.music {
            music.paused = true;
        }
    }

    fn resume_music(&mut self) {
        if let Some(music) = &mut self.music {
            music.paused = false;
        }
    }

    fn halt_music(&mut self) {
        self.music = None;
    }
}
