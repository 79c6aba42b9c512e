//! Loop driver
//!
//! Owns every room, the active scene name and frame pacing. One `tick` runs the
//! event, update and collision phases unconditionally, then renders only when
//! enough time has built up since the last rendered frame.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::context::{Commands, FrameContext};
use super::entity::Entity;
use super::room::Room;
use crate::audio::AudioSink;
use crate::error::EngineError;
use crate::renderer::Renderer;
use crate::settings::EngineConfig;

/// Keys the engine distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Space,
    Enter,
    Escape,
    /// Fullscreen toggle (handled by the driver on release)
    F4,
    Char(char),
    /// Platform scancode for anything else
    Other(u32),
}

/// Input delivered to the event phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    KeyDown(Key),
    KeyUp(Key),
    MouseMotion { x: i32, y: i32 },
    MouseDown { x: i32, y: i32 },
    MouseUp { x: i32, y: i32 },
    /// Stops the driver once the current tick completes
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

/// Source of pending input, drained once per tick
pub trait EventSource {
    fn poll(&mut self) -> Vec<InputEvent>;
}

impl<F: FnMut() -> Vec<InputEvent>> EventSource for F {
    fn poll(&mut self) -> Vec<InputEvent> {
        self()
    }
}

pub struct Driver {
    rooms: HashMap<String, Room>,
    active: String,
    pending_scene: Option<String>,
    pending_reset: bool,
    state: LoopState,
    config: EngineConfig,
    /// Time since the last rendered frame
    render_elapsed: f64,
    fullscreen: bool,
    commands: Commands,
}

impl Driver {
    pub fn new<N: Into<String>>(
        config: EngineConfig,
        rooms: impl IntoIterator<Item = (N, Room)>,
        start: &str,
    ) -> Result<Self, EngineError> {
        let rooms: HashMap<String, Room> = rooms
            .into_iter()
            .map(|(name, room)| (name.into(), room))
            .collect();
        if !rooms.contains_key(start) {
            return Err(EngineError::UnknownScene(start.to_string()));
        }

        Ok(Self {
            rooms,
            active: start.to_string(),
            pending_scene: None,
            pending_reset: false,
            state: LoopState::Running,
            fullscreen: config.fullscreen,
            config,
            render_elapsed: 0.0,
            commands: Commands::new(),
        })
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Name of the scene the next tick runs (before any pending switch)
    pub fn active_scene(&self) -> &str {
        &self.active
    }

    pub fn pending_scene(&self) -> Option<&str> {
        self.pending_scene.as_deref()
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn room(&self, name: &str) -> Option<&Room> {
        self.rooms.get(name)
    }

    pub fn active_room(&self) -> Result<&Room, EngineError> {
        self.rooms
            .get(&self.active)
            .ok_or_else(|| EngineError::UnknownScene(self.active.clone()))
    }

    pub fn active_room_mut(&mut self) -> Result<&mut Room, EngineError> {
        self.rooms
            .get_mut(&self.active)
            .ok_or_else(|| EngineError::UnknownScene(self.active.clone()))
    }

    /// Toggle collider outlines
    pub fn set_debug(&mut self, debug: bool) {
        self.config.debug_colliders = debug;
    }

    /// Request a scene switch at the start of the next tick
    ///
    /// The target room is reset before its first event phase. Fails fast on an
    /// unknown scene name.
    pub fn change_scene(&mut self, name: &str) -> Result<(), EngineError> {
        if !self.rooms.contains_key(name) {
            return Err(EngineError::UnknownScene(name.to_string()));
        }
        self.pending_scene = Some(name.to_string());
        self.pending_reset = true;
        Ok(())
    }

    /// Append an entity to the active room. Only call between ticks.
    pub fn add_to_active(&mut self, entity: Box<dyn Entity>) -> Result<(), EngineError> {
        self.active_room_mut()?.add(entity)
    }

    /// Remove an entity from the active room by id. Only call between ticks.
    pub fn remove_from_active(&mut self, id: &str) -> Result<Box<dyn Entity>, EngineError> {
        self.active_room_mut()?.remove(id)
    }

    /// Stop after the current tick
    pub fn stop(&mut self) {
        self.state = LoopState::Stopped;
    }

    fn apply_pending_scene(&mut self) -> Result<(), EngineError> {
        let Some(next) = self.pending_scene.take() else {
            return Ok(());
        };
        let reset = std::mem::take(&mut self.pending_reset);
        let room = self
            .rooms
            .get_mut(&next)
            .ok_or_else(|| EngineError::UnknownScene(next.clone()))?;

        log::info!("Scene switch '{}' -> '{}'", self.active, next);
        if reset && !room.is_persistent() {
            room.reset();
            log::info!("Reset scene '{}'", next);
        }
        self.active = next;
        Ok(())
    }

    /// Run one loop iteration with `delta` seconds of elapsed time
    pub fn tick(
        &mut self,
        delta: f64,
        events: impl IntoIterator<Item = InputEvent>,
        renderer: &mut dyn Renderer,
        audio: &mut dyn AudioSink,
    ) -> Result<LoopState, EngineError> {
        if self.state == LoopState::Stopped {
            return Ok(self.state);
        }
        self.apply_pending_scene()?;

        let room = self
            .rooms
            .get_mut(&self.active)
            .ok_or_else(|| EngineError::UnknownScene(self.active.clone()))?;
        let mut ctx = FrameContext::new(audio, &mut self.commands);

        for event in events {
            match event {
                InputEvent::Quit => {
                    log::info!("Quit requested");
                    self.state = LoopState::Stopped;
                }
                InputEvent::KeyUp(Key::F4) => {
                    self.fullscreen = !self.fullscreen;
                    renderer.set_fullscreen(self.fullscreen);
                    log::debug!("Fullscreen {}", self.fullscreen);
                }
                _ => {}
            }
            room.handle_event(&event, &mut ctx);
        }

        room.step(delta, &mut ctx);
        if let Err(e) = room.apply(&mut self.commands) {
            // Nothing from a failed tick carries over into the next one
            self.commands.clear();
            return Err(e);
        }

        self.render_elapsed += delta;
        if self.render_elapsed >= self.config.render_interval() {
            room.render(
                renderer,
                self.render_elapsed,
                self.config.background,
                self.config.debug_colliders,
            );
            renderer.present();
            self.render_elapsed = 0.0;
        }

        if let Some(scene) = self.commands.take_scene() {
            self.change_scene(&scene)?;
        }
        Ok(self.state)
    }

    /// Tick against wall-clock time until a `Quit` event arrives
    pub fn run(
        &mut self,
        events: &mut dyn EventSource,
        renderer: &mut dyn Renderer,
        audio: &mut dyn AudioSink,
    ) -> Result<(), EngineError> {
        log::info!("Driver started in scene '{}'", self.active);
        renderer.set_fullscreen(self.fullscreen);

        let pause = Duration::from_millis(self.config.min_update_ms);
        let mut last = Instant::now();
        while self.state == LoopState::Running {
            std::thread::sleep(pause);
            let now = Instant::now();
            let delta = now.duration_since(last).as_secs_f64();
            last = now;
            self.tick(delta, events.poll(), renderer, audio)?;
        }

        log::info!("Driver stopped in scene '{}'", self.active);
        Ok(())
    }
}
