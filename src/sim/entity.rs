//! Entities: positioned, collidable, animated units with pluggable behavior
//!
//! Every concrete entity embeds an `EntityState` and implements the `Entity`
//! hooks. Sprite rendering and the collider overlay are provided by
//! `EntityState` and can't be overridden; `draw_overlay` only adds to them.

use glam::DVec2;

use super::collision::Shape;
use super::context::FrameContext;
use super::sprite::Animation;
use super::tick::InputEvent;
use crate::error::EngineError;
use crate::renderer::shapes::collider_outline;
use crate::renderer::vertex::colors;
use crate::renderer::{RenderError, Renderer};

/// Behavior hooks implemented by each entity type
pub trait Entity {
    fn state(&self) -> &EntityState;
    fn state_mut(&mut self) -> &mut EntityState;

    /// Stable type tag other entities dispatch on (e.g. "Brick")
    fn identify(&self) -> &str;

    /// Advance own state. `peers` holds every other entity in the room, in
    /// room order, already updated if they come earlier in that order.
    fn update(&mut self, delta: f64, peers: &Peers<'_>, ctx: &mut FrameContext<'_>);

    fn handle_input(&mut self, event: &InputEvent, ctx: &mut FrameContext<'_>);

    /// Called once per overlapping ordered pair `(self, other)`
    fn on_collision(&mut self, other: &dyn Entity, ctx: &mut FrameContext<'_>);

    /// Return to the state captured at construction. Must be idempotent.
    fn reset(&mut self);

    /// Extra drawing (text, HUD) issued after the sprite
    fn draw_overlay(&self, _renderer: &mut dyn Renderer) -> Result<(), RenderError> {
        Ok(())
    }

    fn id(&self) -> &str {
        &self.state().id
    }
}

/// Read-only view of the other entities in a room during the update phase
#[derive(Clone, Copy)]
pub struct Peers<'a> {
    before: &'a [Box<dyn Entity>],
    after: &'a [Box<dyn Entity>],
}

impl<'a> Peers<'a> {
    pub fn new(before: &'a [Box<dyn Entity>], after: &'a [Box<dyn Entity>]) -> Self {
        Self { before, after }
    }

    /// Peers in room order
    pub fn iter(self) -> impl Iterator<Item = &'a dyn Entity> + 'a {
        self.before
            .iter()
            .chain(self.after.iter())
            .map(|e| &**e as &dyn Entity)
    }

    pub fn get(self, id: &str) -> Option<&'a dyn Entity> {
        self.iter().find(|e| e.id() == id)
    }

    /// Peers whose `identify()` equals `tag`
    pub fn tagged<'t>(self, tag: &'t str) -> impl Iterator<Item = &'a dyn Entity> + 't
    where
        'a: 't,
    {
        self.iter().filter(move |e| e.identify() == tag)
    }

    pub fn len(self) -> usize {
        self.before.len() + self.after.len()
    }

    pub fn is_empty(self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone)]
struct Baseline {
    pos: DVec2,
    collider: Shape,
    animations: Vec<(String, Animation)>,
    active: usize,
}

/// State shared by all entities
#[derive(Debug, Clone)]
pub struct EntityState {
    /// Unique within a room
    pub id: String,
    pub pos: DVec2,
    /// Collider relative to `pos`
    pub collider: Shape,
    animations: Vec<(String, Animation)>,
    active: usize,
    baseline: Baseline,
}

impl EntityState {
    /// Build an entity's state. The values given here become its reset baseline.
    pub fn new<N: Into<String>>(
        id: impl Into<String>,
        pos: DVec2,
        collider: Shape,
        animations: impl IntoIterator<Item = (N, Animation)>,
        active: &str,
    ) -> Result<Self, EngineError> {
        let id = id.into();
        let mut table: Vec<(String, Animation)> = Vec::new();
        for (name, anim) in animations {
            let name = name.into();
            match table.iter_mut().find(|(n, _)| *n == name) {
                Some(slot) => slot.1 = anim,
                None => table.push((name, anim)),
            }
        }
        let Some(active) = table.iter().position(|(n, _)| n == active) else {
            return Err(EngineError::UnknownAnimation {
                entity: id,
                animation: active.to_string(),
            });
        };

        Ok(Self {
            baseline: Baseline {
                pos,
                collider,
                animations: table.clone(),
                active,
            },
            id,
            pos,
            collider,
            animations: table,
            active,
        })
    }

    pub fn active_animation(&self) -> &str {
        &self.animations[self.active].0
    }

    pub fn animation(&self) -> &Animation {
        &self.animations[self.active].1
    }

    pub fn animation_mut(&mut self) -> &mut Animation {
        &mut self.animations[self.active].1
    }

    pub fn animation_names(&self) -> impl Iterator<Item = &str> {
        self.animations.iter().map(|(n, _)| n.as_str())
    }

    /// Switch the active animation
    ///
    /// The new animation restarts from its first frame and inherits the
    /// previous one's scale, rotation and flip. Selecting the animation that is
    /// already active does nothing.
    pub fn set_animation(&mut self, name: &str) -> Result<(), EngineError> {
        let Some(next) = self.animations.iter().position(|(n, _)| n == name) else {
            return Err(EngineError::UnknownAnimation {
                entity: self.id.clone(),
                animation: name.to_string(),
            });
        };
        if next == self.active {
            return Ok(());
        }
        let transform = self.animations[self.active].1.transform;
        let anim = &mut self.animations[next].1;
        anim.restart();
        anim.transform = transform;
        self.active = next;
        Ok(())
    }

    /// Collider in world space
    pub fn world_collider(&self) -> Shape {
        self.collider.at(self.pos)
    }

    pub fn initial_pos(&self) -> DVec2 {
        self.baseline.pos
    }

    /// Restore position, collider and animations to their construction values
    pub fn restore(&mut self) {
        self.pos = self.baseline.pos;
        self.collider = self.baseline.collider;
        self.animations = self.baseline.animations.clone();
        self.active = self.baseline.active;
    }

    /// Advance the active animation by `elapsed` and draw it at the entity position
    pub fn render(&mut self, renderer: &mut dyn Renderer, elapsed: f64) -> Result<(), RenderError> {
        let pos = self.pos;
        let anim = self.animation_mut();
        anim.advance(elapsed);
        renderer.draw_sprite(&anim.render_frame(pos))
    }

    /// Draw the world-space collider outline
    pub fn debug_render_collider(&self, renderer: &mut dyn Renderer) -> Result<(), RenderError> {
        renderer.draw_outline(&collider_outline(&self.world_collider(), colors::DEBUG_COLLIDER))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{DrawCommand, HeadlessRenderer};
    use crate::sim::sprite::{Frame, Rect};
    use glam::IVec2;

    fn frame(x: i32) -> Frame {
        Frame::new("character", Rect::new(x, 0, 32, 32), IVec2::new(32, 32))
    }

    fn player_state() -> EntityState {
        let idle = Animation::still(frame(0), IVec2::new(16, 16));
        let walk = Animation::new(vec![frame(0), frame(32)], 12.0, IVec2::new(16, 16)).unwrap();
        EntityState::new(
            "player",
            DVec2::new(100.0, 50.0),
            Shape::rect(IVec2::new(0, 0), 32, 32),
            [("idle", idle), ("walk", walk)],
            "idle",
        )
        .unwrap()
    }

    #[test]
    fn test_unknown_initial_animation() {
        let result = EntityState::new(
            "x",
            DVec2::ZERO,
            Shape::circle(IVec2::ZERO, 1),
            [("idle", Animation::still(frame(0), IVec2::ZERO))],
            "run",
        );
        assert!(matches!(
            result,
            Err(EngineError::UnknownAnimation { ref animation, .. }) if animation == "run"
        ));
    }

    #[test]
    fn test_set_animation_keeps_transform_and_restarts() {
        let mut state = player_state();
        state.animation_mut().transform.flip = (true, false);
        state.animation_mut().transform.scale = DVec2::splat(0.5);

        state.set_animation("walk").unwrap();
        state.animation_mut().advance(0.1);
        assert_eq!(state.animation().index(), 1);
        assert_eq!(state.animation().transform.flip, (true, false));

        state.set_animation("idle").unwrap();
        state.set_animation("walk").unwrap();
        assert_eq!(state.active_animation(), "walk");
        assert_eq!(state.animation().index(), 0);
        assert_eq!(state.animation().accumulator(), 0.0);
        assert_eq!(state.animation().transform.scale, DVec2::splat(0.5));
    }

    #[test]
    fn test_set_same_animation_is_noop() {
        let mut state = player_state();
        state.set_animation("walk").unwrap();
        state.animation_mut().advance(0.1);
        state.set_animation("walk").unwrap();
        assert_eq!(state.animation().index(), 1);
    }

    #[test]
    fn test_set_unknown_animation_fails() {
        let mut state = player_state();
        assert!(state.set_animation("jump").is_err());
        assert_eq!(state.active_animation(), "idle");
    }

    #[test]
    fn test_restore_is_idempotent() {
        let mut state = player_state();
        state.pos = DVec2::new(-4.0, 9.0);
        state.set_animation("walk").unwrap();
        state.animation_mut().advance(0.5);

        state.restore();
        let once = (state.pos, state.active_animation().to_string(), state.animation().clone());
        state.restore();
        assert_eq!(state.pos, DVec2::new(100.0, 50.0));
        assert_eq!(once.0, state.pos);
        assert_eq!(once.1, state.active_animation());
        assert_eq!(&once.2, state.animation());
    }

    #[test]
    fn test_render_advances_and_draws() {
        let mut renderer = HeadlessRenderer::new().with_texture("character", IVec2::splat(64));
        let mut state = player_state();
        state.set_animation("walk").unwrap();

        state.render(&mut renderer, 0.1).unwrap();
        assert_eq!(state.animation().index(), 1);
        match &renderer.commands()[0] {
            DrawCommand::Sprite { clip, dest, .. } => {
                assert_eq!(*clip, Rect::new(32, 0, 32, 32));
                assert_eq!(*dest, Rect::new(84, 34, 32, 32));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_debug_collider_outline_in_world_space() {
        let mut renderer = HeadlessRenderer::new();
        let state = player_state();
        state.debug_render_collider(&mut renderer).unwrap();
        match &renderer.commands()[0] {
            DrawCommand::Outline(verts) => {
                assert_eq!(verts[0].position, [84.0, 34.0]);
                assert_eq!(verts[2].position, [116.0, 66.0]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
