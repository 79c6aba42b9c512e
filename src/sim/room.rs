//! Rooms: ordered entity collections driven through one frame cycle
//!
//! A frame runs four phases, always in this order and always to completion:
//! 1. events: `handle_input` on every entity
//! 2. update: `update` on every entity
//! 3. collisions: `on_collision` for every overlapping ordered pair
//! 4. render: clear, then `render` on every entity (separate cadence)
//!
//! Entities are visited in room order. Update order matters: an entity sees
//! peers earlier in the list in their already-updated state, so rooms must list
//! producers of positional state before the entities that read it (a snake
//! head before its body segments, a leader before its followers).

use std::collections::HashSet;

use super::context::{Commands, FrameContext};
use super::entity::{Entity, Peers};
use super::tick::InputEvent;
use crate::error::EngineError;
use crate::renderer::Renderer;

pub struct Room {
    entities: Vec<Box<dyn Entity>>,
    /// Index in the initial entity list, parallel to `entities`; `None` for
    /// entities added after construction
    ranks: Vec<Option<usize>>,
    /// Initial entities despawned since the last reset, with their rank
    despawned: Vec<(usize, Box<dyn Entity>)>,
    /// Persistent rooms keep their state when re-entered
    persistent: bool,
}

impl Room {
    /// Create a room from its initial entity list (order is update order)
    ///
    /// This list is what `reset` returns the room to.
    pub fn new(entities: Vec<Box<dyn Entity>>, persistent: bool) -> Result<Self, EngineError> {
        let mut room = Self {
            entities: Vec::with_capacity(entities.len()),
            ranks: Vec::with_capacity(entities.len()),
            despawned: Vec::new(),
            persistent,
        };
        for (rank, entity) in entities.into_iter().enumerate() {
            room.insert(entity, Some(rank))?;
        }
        Ok(room)
    }

    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entity ids in room order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entities.iter().map(|e| e.id())
    }

    pub fn entities(&self) -> impl Iterator<Item = &dyn Entity> {
        self.entities.iter().map(|e| &**e as &dyn Entity)
    }

    pub fn get(&self, id: &str) -> Option<&dyn Entity> {
        self.entities().find(|e| e.id() == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut (dyn Entity + 'static)> {
        self.entities
            .iter_mut()
            .find(|e| e.id() == id)
            .map(|e| &mut **e)
    }

    fn insert(&mut self, entity: Box<dyn Entity>, rank: Option<usize>) -> Result<(), EngineError> {
        if self.get(entity.id()).is_some() {
            return Err(EngineError::DuplicateEntity(entity.id().to_string()));
        }
        self.entities.push(entity);
        self.ranks.push(rank);
        Ok(())
    }

    fn take(&mut self, id: &str) -> Result<(Option<usize>, Box<dyn Entity>), EngineError> {
        let index = self
            .entities
            .iter()
            .position(|e| e.id() == id)
            .ok_or_else(|| EngineError::UnknownEntity(id.to_string()))?;
        Ok((self.ranks.remove(index), self.entities.remove(index)))
    }

    /// Append an entity. Only call between frames; dropped again on reset.
    pub fn add(&mut self, entity: Box<dyn Entity>) -> Result<(), EngineError> {
        self.insert(entity, None)
    }

    /// Remove an entity by id and hand it to the caller. Only call between frames.
    ///
    /// Ownership moves out, so a later `reset` can't bring it back.
    pub fn remove(&mut self, id: &str) -> Result<Box<dyn Entity>, EngineError> {
        self.take(id).map(|(_, entity)| entity)
    }

    /// Fail unless every despawn names a live entity and every spawn a free id
    fn check_batch(&self, despawns: &[String], spawns: &[Box<dyn Entity>]) -> Result<(), EngineError> {
        let mut ids: HashSet<&str> = self.ids().collect();
        for id in despawns {
            if !ids.remove(id.as_str()) {
                return Err(EngineError::UnknownEntity(id.clone()));
            }
        }
        for entity in spawns {
            if !ids.insert(entity.id()) {
                return Err(EngineError::DuplicateEntity(entity.id().to_string()));
            }
        }
        Ok(())
    }

    /// Apply queued despawns, then queued spawns
    ///
    /// The batch is all or nothing: on error the room is unchanged and the
    /// queued spawns and despawns are discarded. Scene change requests are left
    /// in `commands` for the driver.
    pub fn apply(&mut self, commands: &mut Commands) -> Result<(), EngineError> {
        let despawns = commands.take_despawns();
        let spawns = commands.take_spawns();
        self.check_batch(&despawns, &spawns)?;

        for id in despawns {
            let (rank, entity) = self.take(&id)?;
            match rank {
                Some(rank) if !self.persistent => self.despawned.push((rank, entity)),
                _ => {}
            }
            log::debug!("Despawned '{}'", id);
        }
        for entity in spawns {
            let id = entity.id().to_string();
            self.add(entity)?;
            log::debug!("Spawned '{}'", id);
        }
        Ok(())
    }

    /// Event phase
    pub fn handle_event(&mut self, event: &InputEvent, ctx: &mut FrameContext<'_>) {
        for entity in self.entities.iter_mut() {
            entity.handle_input(event, ctx);
        }
    }

    /// Update phase
    pub fn update(&mut self, delta: f64, ctx: &mut FrameContext<'_>) {
        for i in 0..self.entities.len() {
            let (before, rest) = self.entities.split_at_mut(i);
            let Some((current, after)) = rest.split_first_mut() else {
                break;
            };
            let peers = Peers::new(before, after);
            current.update(delta, &peers, ctx);
        }
    }

    /// Ordered pairs `(i, j)`, `i != j`, whose world colliders overlap right now
    pub fn overlapping_pairs(&self) -> Vec<(usize, usize)> {
        let colliders: Vec<_> = self
            .entities
            .iter()
            .map(|e| e.state().world_collider())
            .collect();

        let mut pairs = Vec::new();
        for (i, a) in colliders.iter().enumerate() {
            for (j, b) in colliders.iter().enumerate() {
                if i != j && a.collides_with(b) {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }

    /// Collision phase
    ///
    /// Pairs are found from start-of-phase positions before any callback runs,
    /// so a callback that moves its entity can't hide or create other hits.
    pub fn resolve_collisions(&mut self, ctx: &mut FrameContext<'_>) {
        for (i, j) in self.overlapping_pairs() {
            let (this, other) = pair_mut(&mut self.entities, i, j);
            this.on_collision(other, ctx);
        }
    }

    /// Update phase followed by collision phase
    pub fn step(&mut self, delta: f64, ctx: &mut FrameContext<'_>) {
        self.update(delta, ctx);
        self.resolve_collisions(ctx);
    }

    /// Render phase
    ///
    /// A failed draw is logged and skipped; the rest of the frame still draws.
    pub fn render(
        &mut self,
        renderer: &mut dyn Renderer,
        elapsed: f64,
        background: [u8; 4],
        debug_colliders: bool,
    ) {
        renderer.clear(background);
        for entity in self.entities.iter_mut() {
            if let Err(e) = entity.state_mut().render(renderer, elapsed) {
                log::warn!("Skipped drawing '{}': {}", entity.id(), e);
            }
            if let Err(e) = entity.draw_overlay(renderer) {
                log::warn!("Skipped overlay for '{}': {}", entity.id(), e);
            }
            if debug_colliders {
                if let Err(e) = entity.state().debug_render_collider(renderer) {
                    log::warn!("Skipped collider outline for '{}': {}", entity.id(), e);
                }
            }
        }
    }

    /// Return to the initial entity list, each in its initial state
    ///
    /// Entities added after construction are dropped, despawned initial ones
    /// come back in their original order, and every survivor's `reset` hook
    /// runs once. No-op for persistent rooms.
    pub fn reset(&mut self) {
        if self.persistent {
            return;
        }
        let mut initial = std::mem::take(&mut self.despawned);
        for (entity, rank) in self.entities.drain(..).zip(self.ranks.drain(..)) {
            match rank {
                Some(rank) => initial.push((rank, entity)),
                None => log::debug!("Dropped '{}' on reset", entity.id()),
            }
        }
        initial.sort_by_key(|(rank, _)| *rank);

        for (rank, mut entity) in initial {
            entity.reset();
            self.entities.push(entity);
            self.ranks.push(Some(rank));
        }
    }
}

/// Borrow entity `i` mutably and entity `j` shared (`i != j`)
fn pair_mut(
    entities: &mut [Box<dyn Entity>],
    i: usize,
    j: usize,
) -> (&mut (dyn Entity + 'static), &(dyn Entity + 'static)) {
    debug_assert_ne!(i, j);
    if i < j {
        let (head, tail) = entities.split_at_mut(j);
        (&mut *head[i], &*tail[0])
    } else {
        let (head, tail) = entities.split_at_mut(i);
        (&mut *tail[0], &*head[j])
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::audio::NullAudio;
    use crate::renderer::{DrawCommand, HeadlessRenderer, RenderError};
    use crate::sim::collision::Shape;
    use crate::sim::entity::EntityState;
    use crate::sim::sprite::{Animation, Frame, Rect};
    use crate::sim::tick::Key;
    use glam::{DVec2, IVec2};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// What a dummy saw, shared with the test after the dummy is boxed
    #[derive(Debug, Default)]
    pub(crate) struct Journal {
        pub resets: u32,
        pub events: Vec<InputEvent>,
        pub hits: Vec<String>,
    }

    /// Configurable entity for exercising the room phases
    pub(crate) struct Dummy {
        state: EntityState,
        velocity: DVec2,
        initial_velocity: DVec2,
        /// Copy this peer's position during update
        follow: Option<String>,
        /// Jump far away when hit
        flee_on_hit: bool,
        /// Drawn with the "hud" font as an overlay
        label: Option<String>,
        journal: Rc<RefCell<Journal>>,
    }

    impl Dummy {
        pub(crate) fn new(id: &str, pos: DVec2, image: &str) -> Self {
            let still = Animation::still(
                Frame::new(image, Rect::new(0, 0, 16, 16), IVec2::new(16, 16)),
                IVec2::ZERO,
            );
            Self {
                state: EntityState::new(
                    id,
                    pos,
                    Shape::rect(IVec2::ZERO, 10, 10),
                    [("idle", still)],
                    "idle",
                )
                .unwrap(),
                velocity: DVec2::ZERO,
                initial_velocity: DVec2::ZERO,
                follow: None,
                flee_on_hit: false,
                label: None,
                journal: Rc::default(),
            }
        }

        pub(crate) fn with_velocity(mut self, velocity: DVec2) -> Self {
            self.velocity = velocity;
            self.initial_velocity = velocity;
            self
        }

        pub(crate) fn following(mut self, leader: &str) -> Self {
            self.follow = Some(leader.to_string());
            self
        }

        pub(crate) fn fleeing(mut self) -> Self {
            self.flee_on_hit = true;
            self
        }

        /// Swap the still frame for `frames` 16px frames played at `rate`
        pub(crate) fn animated(mut self, frames: i32, rate: f64) -> Self {
            let image = self.state.animation().current_frame().image().to_string();
            let frames = (0..frames)
                .map(|i| Frame::new(image.as_str(), Rect::new(i * 16, 0, 16, 16), IVec2::new(16, 16)))
                .collect();
            self.state = EntityState::new(
                self.state.id.clone(),
                self.state.pos,
                self.state.collider,
                [("run", Animation::new(frames, rate, IVec2::ZERO).unwrap())],
                "run",
            )
            .unwrap();
            self
        }

        pub(crate) fn labelled(mut self, label: &str) -> Self {
            self.label = Some(label.to_string());
            self
        }

        pub(crate) fn journal(&self) -> Rc<RefCell<Journal>> {
            Rc::clone(&self.journal)
        }

        pub(crate) fn boxed(self) -> Box<dyn Entity> {
            Box::new(self)
        }
    }

    impl Entity for Dummy {
        fn state(&self) -> &EntityState {
            &self.state
        }

        fn state_mut(&mut self) -> &mut EntityState {
            &mut self.state
        }

        fn identify(&self) -> &str {
            "Dummy"
        }

        fn update(&mut self, delta: f64, peers: &Peers<'_>, _ctx: &mut FrameContext<'_>) {
            self.state.pos += self.velocity * delta;
            if let Some(leader) = self.follow.as_deref().and_then(|id| peers.get(id)) {
                self.state.pos = leader.state().pos;
            }
        }

        fn handle_input(&mut self, event: &InputEvent, _ctx: &mut FrameContext<'_>) {
            self.journal.borrow_mut().events.push(*event);
        }

        fn on_collision(&mut self, other: &dyn Entity, _ctx: &mut FrameContext<'_>) {
            self.journal.borrow_mut().hits.push(other.id().to_string());
            if self.flee_on_hit {
                self.state.pos = DVec2::splat(10_000.0);
            }
        }

        fn reset(&mut self) {
            self.state.restore();
            self.velocity = self.initial_velocity;
            self.journal.borrow_mut().resets += 1;
        }

        fn draw_overlay(&self, renderer: &mut dyn Renderer) -> Result<(), RenderError> {
            match &self.label {
                Some(label) => renderer.draw_text(
                    "hud",
                    label,
                    self.state.pos.as_ivec2(),
                    [255, 255, 255, 255],
                ),
                None => Ok(()),
            }
        }
    }

    fn pos(room: &Room, id: &str) -> DVec2 {
        room.get(id).unwrap().state().pos
    }

    fn run<F: FnOnce(&mut Room, &mut FrameContext<'_>)>(room: &mut Room, f: F) -> Commands {
        let mut audio = NullAudio;
        let mut commands = Commands::new();
        let mut ctx = FrameContext::new(&mut audio, &mut commands);
        f(room, &mut ctx);
        commands
    }

    fn leader_and_follower(leader_first: bool) -> Room {
        let leader = Dummy::new("leader", DVec2::new(0.0, 0.0), "img")
            .with_velocity(DVec2::new(100.0, 0.0));
        let follower = Dummy::new("follower", DVec2::new(-50.0, 0.0), "img").following("leader");
        let wall = Dummy::new("wall", DVec2::new(500.0, 500.0), "img");

        let entities = if leader_first {
            vec![leader.boxed(), follower.boxed(), wall.boxed()]
        } else {
            vec![follower.boxed(), leader.boxed(), wall.boxed()]
        };
        Room::new(entities, false).unwrap()
    }

    #[test]
    fn test_update_order_propagates_leader_position() {
        let mut room = leader_and_follower(true);
        run(&mut room, |r, ctx| r.update(0.1, ctx));
        assert_eq!(pos(&room, "leader"), DVec2::new(10.0, 0.0));
        assert_eq!(pos(&room, "follower"), DVec2::new(10.0, 0.0));
    }

    #[test]
    fn test_update_order_reversed_sees_previous_position() {
        let mut room = leader_and_follower(false);
        run(&mut room, |r, ctx| r.update(0.1, ctx));
        assert_eq!(pos(&room, "leader"), DVec2::new(10.0, 0.0));
        assert_eq!(pos(&room, "follower"), DVec2::new(0.0, 0.0));
    }

    #[test]
    fn test_events_reach_every_entity_in_order() {
        let dummies = [
            Dummy::new("a", DVec2::ZERO, "img"),
            Dummy::new("b", DVec2::ZERO, "img"),
        ];
        let journals: Vec<_> = dummies.iter().map(|p| p.journal()).collect();
        let mut room = Room::new(dummies.into_iter().map(Dummy::boxed).collect(), false).unwrap();

        let down = InputEvent::KeyDown(Key::Left);
        let up = InputEvent::KeyUp(Key::Left);
        run(&mut room, |r, ctx| {
            r.handle_event(&down, ctx);
            r.handle_event(&up, ctx);
        });
        for journal in journals {
            assert_eq!(journal.borrow().events, vec![down, up]);
        }
    }

    #[test]
    fn test_collisions_are_ordered_pairs_without_self() {
        let a = Dummy::new("a", DVec2::new(0.0, 0.0), "img");
        let b = Dummy::new("b", DVec2::new(8.0, 0.0), "img");
        let c = Dummy::new("c", DVec2::new(100.0, 0.0), "img");
        let (ja, jb, jc) = (a.journal(), b.journal(), c.journal());
        let mut room = Room::new(vec![a.boxed(), b.boxed(), c.boxed()], false).unwrap();

        assert_eq!(room.overlapping_pairs(), vec![(0, 1), (1, 0)]);
        run(&mut room, |r, ctx| r.resolve_collisions(ctx));
        assert_eq!(ja.borrow().hits, vec!["b".to_string()]);
        assert_eq!(jb.borrow().hits, vec!["a".to_string()]);
        assert!(jc.borrow().hits.is_empty());
    }

    #[test]
    fn test_collisions_use_start_of_phase_positions() {
        let a = Dummy::new("a", DVec2::new(0.0, 0.0), "img").fleeing();
        let b = Dummy::new("b", DVec2::new(5.0, 5.0), "img");
        let jb = b.journal();
        let mut room = Room::new(vec![a.boxed(), b.boxed()], false).unwrap();

        run(&mut room, |r, ctx| r.resolve_collisions(ctx));
        // a fled during its own callback, b still gets its hit
        assert_eq!(pos(&room, "a"), DVec2::splat(10_000.0));
        assert_eq!(jb.borrow().hits, vec!["a".to_string()]);
    }

    #[test]
    fn test_reset_restores_each_entity_once() {
        let a = Dummy::new("a", DVec2::new(1.0, 2.0), "img").with_velocity(DVec2::new(10.0, 0.0));
        let b = Dummy::new("b", DVec2::new(30.0, 40.0), "img")
            .with_velocity(DVec2::new(0.0, -10.0));
        let (ja, jb) = (a.journal(), b.journal());
        let mut room = Room::new(vec![a.boxed(), b.boxed()], false).unwrap();

        run(&mut room, |r, ctx| r.step(1.0, ctx));
        assert_ne!(pos(&room, "a"), DVec2::new(1.0, 2.0));

        room.reset();
        assert_eq!(ja.borrow().resets, 1);
        assert_eq!(jb.borrow().resets, 1);
        assert_eq!(pos(&room, "a"), DVec2::new(1.0, 2.0));
        assert_eq!(pos(&room, "b"), DVec2::new(30.0, 40.0));
    }

    #[test]
    fn test_reset_twice_matches_reset_once() {
        let a = Dummy::new("a", DVec2::new(1.0, 2.0), "img").with_velocity(DVec2::new(10.0, 0.0));
        let mut room = Room::new(vec![a.boxed()], false).unwrap();
        run(&mut room, |r, ctx| r.step(0.5, ctx));

        let snapshot = |room: &Room| {
            let state = room.get("a").unwrap().state();
            (state.pos, state.active_animation().to_string(), state.animation().clone())
        };
        room.reset();
        let once = snapshot(&room);
        room.reset();
        assert_eq!(once, snapshot(&room));

        // Velocity was restored too: a further step moves it the same way again
        run(&mut room, |r, ctx| r.update(0.5, ctx));
        assert_eq!(pos(&room, "a"), DVec2::new(6.0, 2.0));
    }

    #[test]
    fn test_persistent_room_ignores_reset() {
        let a = Dummy::new("a", DVec2::ZERO, "img").with_velocity(DVec2::new(1.0, 0.0));
        let ja = a.journal();
        let mut room = Room::new(vec![a.boxed()], true).unwrap();
        run(&mut room, |r, ctx| r.update(2.0, ctx));

        room.reset();
        assert_eq!(ja.borrow().resets, 0);
        assert_eq!(pos(&room, "a"), DVec2::new(2.0, 0.0));
    }

    #[test]
    fn test_duplicate_and_unknown_ids_fail() {
        let a = Dummy::new("a", DVec2::ZERO, "img");
        let a2 = Dummy::new("a", DVec2::ONE, "img");
        assert!(matches!(
            Room::new(vec![a.boxed(), a2.boxed()], false),
            Err(EngineError::DuplicateEntity(ref id)) if id == "a"
        ));

        let mut room = Room::new(Vec::new(), false).unwrap();
        assert!(matches!(
            room.remove("ghost"),
            Err(EngineError::UnknownEntity(ref id)) if id == "ghost"
        ));
    }

    #[test]
    fn test_apply_despawns_before_spawns() {
        let a = Dummy::new("pickup", DVec2::ZERO, "img");
        let mut room = Room::new(vec![a.boxed()], false).unwrap();

        let mut commands = run(&mut room, |_, ctx| {
            ctx.despawn("pickup");
            ctx.spawn(Dummy::new("pickup", DVec2::new(7.0, 7.0), "img").boxed());
        });
        room.apply(&mut commands).unwrap();
        assert_eq!(room.len(), 1);
        assert_eq!(pos(&room, "pickup"), DVec2::new(7.0, 7.0));
        assert!(commands.is_empty());
    }

    #[test]
    fn test_render_skips_missing_texture() {
        let a = Dummy::new("a", DVec2::ZERO, "missing");
        let b = Dummy::new("b", DVec2::new(50.0, 0.0), "snake");
        let mut room = Room::new(vec![a.boxed(), b.boxed()], false).unwrap();
        let mut renderer = HeadlessRenderer::new().with_texture("snake", IVec2::splat(16));

        room.render(&mut renderer, 0.016, [1, 2, 3, 255], false);
        assert_eq!(renderer.commands()[0], DrawCommand::Clear([1, 2, 3, 255]));
        assert_eq!(renderer.sprite_count(), 1);
    }

    #[test]
    fn test_render_debug_colliders() {
        let a = Dummy::new("a", DVec2::ZERO, "snake");
        let mut room = Room::new(vec![a.boxed()], false).unwrap();
        let mut renderer = HeadlessRenderer::new().with_texture("snake", IVec2::splat(16));

        room.render(&mut renderer, 0.016, [0; 4], true);
        assert!(matches!(renderer.commands()[2], DrawCommand::Outline(_)));
        assert_eq!(renderer.vertex_count(), 4);
    }

    #[test]
    fn test_overlay_text_follows_sprite() {
        let a = Dummy::new("a", DVec2::new(3.0, 4.0), "snake").labelled("score 0");
        let b = Dummy::new("b", DVec2::ZERO, "snake").labelled("lost");
        let mut room = Room::new(vec![a.boxed(), b.boxed()], false).unwrap();
        let mut renderer = HeadlessRenderer::new()
            .with_texture("snake", IVec2::splat(16))
            .with_font("hud", 20);

        room.render(&mut renderer, 0.016, [0; 4], false);
        assert_eq!(
            renderer.commands()[2],
            DrawCommand::Text {
                font: "hud".into(),
                text: "score 0".into(),
                pos: IVec2::new(3, 4),
                color: [255, 255, 255, 255],
            }
        );
        assert_eq!(renderer.commands().len(), 5);
    }

    #[test]
    fn test_missing_font_skips_only_the_text() {
        let a = Dummy::new("a", DVec2::ZERO, "snake").labelled("hi");
        let mut room = Room::new(vec![a.boxed()], false).unwrap();
        let mut renderer = HeadlessRenderer::new().with_texture("snake", IVec2::splat(16));

        room.render(&mut renderer, 0.016, [0; 4], true);
        assert_eq!(renderer.sprite_count(), 1);
        assert!(matches!(renderer.commands()[2], DrawCommand::Outline(_)));
    }

    fn ids(room: &Room) -> Vec<&str> {
        room.ids().collect()
    }

    #[test]
    fn test_reset_returns_to_initial_entities() {
        let a = Dummy::new("a", DVec2::ZERO, "img");
        let b = Dummy::new("b", DVec2::new(50.0, 0.0), "img");
        let c = Dummy::new("c", DVec2::new(100.0, 0.0), "img");
        let jb = b.journal();
        let mut room = Room::new(vec![a.boxed(), b.boxed(), c.boxed()], false).unwrap();

        let mut commands = run(&mut room, |_, ctx| {
            ctx.despawn("b");
            ctx.spawn(Dummy::new("spawned", DVec2::ZERO, "img").boxed());
        });
        room.apply(&mut commands).unwrap();
        room.add(Dummy::new("added", DVec2::ZERO, "img").boxed()).unwrap();
        assert_eq!(ids(&room), vec!["a", "c", "spawned", "added"]);

        room.reset();
        assert_eq!(ids(&room), vec!["a", "b", "c"]);
        assert_eq!(jb.borrow().resets, 1);

        room.reset();
        assert_eq!(ids(&room), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_respawned_id_resets_to_the_original_entity() {
        let pickup = Dummy::new("pickup", DVec2::new(5.0, 5.0), "img");
        let mut room = Room::new(vec![pickup.boxed()], false).unwrap();

        let mut commands = run(&mut room, |_, ctx| {
            ctx.despawn("pickup");
            ctx.spawn(Dummy::new("pickup", DVec2::new(80.0, 80.0), "img").boxed());
        });
        room.apply(&mut commands).unwrap();
        assert_eq!(pos(&room, "pickup"), DVec2::new(80.0, 80.0));

        room.reset();
        assert_eq!(room.len(), 1);
        assert_eq!(pos(&room, "pickup"), DVec2::new(5.0, 5.0));
    }

    #[test]
    fn test_persistent_room_keeps_spawns() {
        let mut room = Room::new(vec![Dummy::new("a", DVec2::ZERO, "img").boxed()], true).unwrap();
        let mut commands = run(&mut room, |_, ctx| {
            ctx.spawn(Dummy::new("spawned", DVec2::ZERO, "img").boxed());
        });
        room.apply(&mut commands).unwrap();
        room.reset();
        assert_eq!(ids(&room), vec!["a", "spawned"]);
    }

    #[test]
    fn test_failed_apply_changes_nothing() {
        let a = Dummy::new("a", DVec2::ZERO, "img");
        let b = Dummy::new("b", DVec2::ZERO, "img");
        let mut room = Room::new(vec![a.boxed(), b.boxed()], false).unwrap();

        let mut commands = run(&mut room, |_, ctx| {
            ctx.despawn("a");
            ctx.despawn("ghost");
            ctx.spawn(Dummy::new("late", DVec2::ZERO, "img").boxed());
        });
        assert!(matches!(
            room.apply(&mut commands),
            Err(EngineError::UnknownEntity(ref id)) if id == "ghost"
        ));
        assert_eq!(ids(&room), vec!["a", "b"]);
        assert!(commands.is_empty());

        let mut commands = run(&mut room, |_, ctx| {
            ctx.despawn("a");
            ctx.despawn("a");
        });
        assert!(room.apply(&mut commands).is_err());
        assert_eq!(ids(&room), vec!["a", "b"]);

        let mut commands = run(&mut room, |_, ctx| {
            ctx.spawn(Dummy::new("c", DVec2::ZERO, "img").boxed());
            ctx.spawn(Dummy::new("b", DVec2::ZERO, "img").boxed());
        });
        assert!(matches!(
            room.apply(&mut commands),
            Err(EngineError::DuplicateEntity(ref id)) if id == "b"
        ));
        assert_eq!(ids(&room), vec!["a", "b"]);
    }

    #[test]
    fn test_peers_skip_the_updating_entity() {
        let list: Vec<Box<dyn Entity>> = ["a", "b", "c"]
            .into_iter()
            .map(|id| Dummy::new(id, DVec2::ZERO, "img").boxed())
            .collect();
        let peers = Peers::new(&list[..1], &list[2..]);

        assert_eq!(peers.len(), 2);
        assert!(peers.get("b").is_none());
        assert_eq!(peers.iter().map(|e| e.id()).collect::<Vec<_>>(), vec!["a", "c"]);
        assert_eq!(peers.tagged("Dummy").count(), 2);
        assert_eq!(peers.tagged("Obstacle").count(), 0);
    }
}
