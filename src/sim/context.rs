//! Per-frame context handed to entity hooks
//!
//! Hooks never touch the room's entity list directly. Structural changes are
//! queued in `Commands` and applied by the driver between frames.

use super::entity::Entity;
use crate::audio::AudioSink;

/// Deferred scene mutations requested during a frame
#[derive(Default)]
pub struct Commands {
    spawns: Vec<Box<dyn Entity>>,
    despawns: Vec<String>,
    scene: Option<String>,
}

impl Commands {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entity to the active scene after this frame
    pub fn spawn(&mut self, entity: Box<dyn Entity>) {
        self.spawns.push(entity);
    }

    /// Remove an entity (by id) from the active scene after this frame
    pub fn despawn(&mut self, id: impl Into<String>) {
        self.despawns.push(id.into());
    }

    /// Switch scenes at the start of the next tick. Last request wins.
    pub fn change_scene(&mut self, name: impl Into<String>) {
        self.scene = Some(name.into());
    }

    pub fn is_empty(&self) -> bool {
        self.spawns.is_empty() && self.despawns.is_empty() && self.scene.is_none()
    }

    /// Drop everything queued
    pub(crate) fn clear(&mut self) {
        self.spawns.clear();
        self.despawns.clear();
        self.scene = None;
    }

    pub(crate) fn take_scene(&mut self) -> Option<String> {
        self.scene.take()
    }

    pub(crate) fn take_despawns(&mut self) -> Vec<String> {
        std::mem::take(&mut self.despawns)
    }

    pub(crate) fn take_spawns(&mut self) -> Vec<Box<dyn Entity>> {
        std::mem::take(&mut self.spawns)
    }
}

impl std::fmt::Debug for Commands {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Commands")
            .field("spawns", &self.spawns.len())
            .field("despawns", &self.despawns)
            .field("scene", &self.scene)
            .finish()
    }
}

/// Collaborators available to entity hooks
pub struct FrameContext<'a> {
    pub audio: &'a mut dyn AudioSink,
    pub commands: &'a mut Commands,
}

impl<'a> FrameContext<'a> {
    pub fn new(audio: &'a mut dyn AudioSink, commands: &'a mut Commands) -> Self {
        Self { audio, commands }
    }

    pub fn play(&mut self, clip: &str) {
        self.audio.play(clip);
    }

    pub fn spawn(&mut self, entity: Box<dyn Entity>) {
        self.commands.spawn(entity);
    }

    pub fn despawn(&mut self, id: impl Into<String>) {
        self.commands.despawn(id);
    }

    pub fn change_scene(&mut self, name: impl Into<String>) {
        self.commands.change_scene(name);
    }
}
