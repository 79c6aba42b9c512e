//! Roomcraft demo
//!
//! Builds a title room and a game room in code and drives them headlessly
//! with a scripted input feed. Pass a JSON config path as the first argument
//! to override the defaults.

use std::collections::VecDeque;

use glam::{DVec2, IVec2};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use roomcraft::sim::{
    Animation, Driver, Entity, EntityState, EventSource, Frame, FrameContext, InputEvent, Key,
    Peers, Rect, Room, Shape,
};
use roomcraft::{
    AudioManager, AudioSink, EngineConfig, EngineError, HeadlessRenderer, RenderError, Renderer,
    SoundKind, lerp,
};

/// Seed for obstacle and pickup placement
const DEMO_SEED: u64 = 0x5EED;
const TILE: i32 = 32;
const LEADER_SPEED: f64 = 480.0;
const FOLLOWERS: usize = 4;
const OBSTACLES: usize = 6;
/// How far each follower closes on its target per update
const FOLLOW_WEIGHT: f64 = 0.35;
const WHITE: [u8; 4] = [255, 255, 255, 255];

fn tile(image: &str, column: i32) -> Frame {
    Frame::new(
        image,
        Rect::new(column * TILE, 0, TILE, TILE),
        IVec2::splat(TILE),
    )
}

fn still(image: &str) -> Animation {
    Animation::still(tile(image, 0), IVec2::splat(TILE / 2))
}

// === Title ===

struct TitleCard {
    state: EntityState,
}

impl TitleCard {
    fn new(config: &EngineConfig) -> Result<Self, EngineError> {
        let center = DVec2::new(config.width as f64 / 2.0, config.height as f64 / 2.0);
        let card = Animation::still(
            Frame::new("title", Rect::new(0, 0, 640, 360), IVec2::new(640, 360)),
            IVec2::new(320, 180),
        );
        Ok(Self {
            state: EntityState::new(
                "title_card",
                center,
                Shape::rect(IVec2::ZERO, 640, 360),
                [("card", card)],
                "card",
            )?,
        })
    }
}

impl Entity for TitleCard {
    fn state(&self) -> &EntityState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut EntityState {
        &mut self.state
    }

    fn identify(&self) -> &str {
        "TitleCard"
    }

    fn update(&mut self, _delta: f64, _peers: &Peers<'_>, _ctx: &mut FrameContext<'_>) {}

    fn handle_input(&mut self, event: &InputEvent, ctx: &mut FrameContext<'_>) {
        if *event == InputEvent::KeyUp(Key::Enter) {
            ctx.play("select");
            ctx.change_scene("game");
        }
    }

    fn on_collision(&mut self, _other: &dyn Entity, _ctx: &mut FrameContext<'_>) {}

    fn reset(&mut self) {
        self.state.restore();
    }

    fn draw_overlay(&self, renderer: &mut dyn Renderer) -> Result<(), RenderError> {
        let pos = self.state.pos.as_ivec2() + IVec2::new(-80, 200);
        renderer.draw_text("ui", "Press Enter", pos, WHITE)
    }
}

// === Game ===

/// Keyboard-driven head of the chain
struct Leader {
    state: EntityState,
    /// Held direction keys
    held: [bool; 4],
    score: u32,
}

impl Leader {
    fn new(pos: DVec2) -> Result<Self, EngineError> {
        let walk = Animation::new(
            vec![tile("hero", 1), tile("hero", 2), tile("hero", 3)],
            8.0,
            IVec2::splat(TILE / 2),
        )?;
        Ok(Self {
            state: EntityState::new(
                "leader",
                pos,
                Shape::rect(IVec2::ZERO, TILE - 4, TILE - 4),
                [("idle", still("hero")), ("walk", walk)],
                "idle",
            )?,
            held: [false; 4],
            score: 0,
        })
    }

    fn direction(&self) -> DVec2 {
        let [up, down, left, right] = self.held.map(|h| if h { 1.0 } else { 0.0 });
        let dir = DVec2::new(right - left, down - up);
        dir.normalize_or_zero()
    }

    fn switch_animation(&mut self, name: &str) {
        if let Err(e) = self.state.set_animation(name) {
            log::warn!("{}", e);
        }
    }
}

impl Entity for Leader {
    fn state(&self) -> &EntityState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut EntityState {
        &mut self.state
    }

    fn identify(&self) -> &str {
        "Leader"
    }

    fn update(&mut self, delta: f64, peers: &Peers<'_>, ctx: &mut FrameContext<'_>) {
        if !ctx.audio.is_music_playing() {
            ctx.play("theme");
        }

        let dir = self.direction();
        let next = self.state.pos + dir * LEADER_SPEED * delta;
        let collider = self.state.collider.at(next);
        let blocked = peers
            .tagged("Obstacle")
            .any(|rock| collider.collides_with(&rock.state().world_collider()));
        if blocked {
            ctx.play("bump");
        } else {
            self.state.pos = next;
        }

        if dir == DVec2::ZERO {
            self.switch_animation("idle");
        } else {
            self.switch_animation("walk");
            if dir.x != 0.0 {
                self.state.animation_mut().transform.flip = (dir.x < 0.0, false);
            }
        }
    }

    fn handle_input(&mut self, event: &InputEvent, ctx: &mut FrameContext<'_>) {
        let (key, pressed) = match *event {
            InputEvent::KeyDown(key) => (key, true),
            InputEvent::KeyUp(Key::Escape) => {
                ctx.audio.halt_music();
                ctx.change_scene("title");
                return;
            }
            InputEvent::KeyUp(key) => (key, false),
            _ => return,
        };
        let slot = match key {
            Key::Up => 0,
            Key::Down => 1,
            Key::Left => 2,
            Key::Right => 3,
            _ => return,
        };
        self.held[slot] = pressed;
    }

    fn on_collision(&mut self, other: &dyn Entity, _ctx: &mut FrameContext<'_>) {
        if other.identify() == "Pickup" {
            self.score += 1;
            log::debug!("Score {}", self.score);
        }
    }

    fn reset(&mut self) {
        self.state.restore();
        self.held = [false; 4];
        self.score = 0;
    }

    fn draw_overlay(&self, renderer: &mut dyn Renderer) -> Result<(), RenderError> {
        renderer.draw_text("ui", &format!("Score: {}", self.score), IVec2::new(16, 16), WHITE)
    }
}

/// Trails the entity named `target`, easing toward its position
struct Follower {
    state: EntityState,
    target: String,
}

impl Follower {
    fn new(index: usize, target: &str, pos: DVec2) -> Result<Self, EngineError> {
        Ok(Self {
            state: EntityState::new(
                format!("follower_{}", index),
                pos,
                Shape::circle(IVec2::ZERO, TILE / 2 - 2),
                [("idle", still("segment"))],
                "idle",
            )?,
            target: target.to_string(),
        })
    }
}

impl Entity for Follower {
    fn state(&self) -> &EntityState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut EntityState {
        &mut self.state
    }

    fn identify(&self) -> &str {
        "Follower"
    }

    fn update(&mut self, _delta: f64, peers: &Peers<'_>, _ctx: &mut FrameContext<'_>) {
        let Some(target) = peers.get(&self.target) else {
            return;
        };
        let goal = target.state().pos;
        let pos = &mut self.state.pos;
        pos.x = lerp(pos.x, goal.x, FOLLOW_WEIGHT);
        pos.y = lerp(pos.y, goal.y, FOLLOW_WEIGHT);
    }

    fn handle_input(&mut self, _event: &InputEvent, _ctx: &mut FrameContext<'_>) {}

    fn on_collision(&mut self, _other: &dyn Entity, _ctx: &mut FrameContext<'_>) {}

    fn reset(&mut self) {
        self.state.restore();
    }
}

struct Obstacle {
    state: EntityState,
}

impl Obstacle {
    fn new(index: usize, pos: DVec2) -> Result<Self, EngineError> {
        Ok(Self {
            state: EntityState::new(
                format!("rock_{}", index),
                pos,
                Shape::rect(IVec2::ZERO, TILE, TILE),
                [("idle", still("rock"))],
                "idle",
            )?,
        })
    }
}

impl Entity for Obstacle {
    fn state(&self) -> &EntityState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut EntityState {
        &mut self.state
    }

    fn identify(&self) -> &str {
        "Obstacle"
    }

    fn update(&mut self, _delta: f64, _peers: &Peers<'_>, _ctx: &mut FrameContext<'_>) {}

    fn handle_input(&mut self, _event: &InputEvent, _ctx: &mut FrameContext<'_>) {}

    fn on_collision(&mut self, _other: &dyn Entity, _ctx: &mut FrameContext<'_>) {}

    fn reset(&mut self) {
        self.state.restore();
    }
}

/// Collectable that respawns somewhere else when the leader touches it
struct Pickup {
    state: EntityState,
    rng: Pcg32,
    bounds: DVec2,
}

impl Pickup {
    fn new(pos: DVec2, rng: Pcg32, bounds: DVec2) -> Result<Self, EngineError> {
        let spin = Animation::new(
            (0..4).map(|i| tile("apple", i)).collect(),
            6.0,
            IVec2::splat(TILE / 2),
        )?;
        Ok(Self {
            state: EntityState::new(
                "pickup",
                pos,
                Shape::circle(IVec2::ZERO, TILE / 2),
                [("spin", spin)],
                "spin",
            )?,
            rng,
            bounds,
        })
    }
}

impl Entity for Pickup {
    fn state(&self) -> &EntityState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut EntityState {
        &mut self.state
    }

    fn identify(&self) -> &str {
        "Pickup"
    }

    fn update(&mut self, _delta: f64, _peers: &Peers<'_>, _ctx: &mut FrameContext<'_>) {}

    fn handle_input(&mut self, _event: &InputEvent, _ctx: &mut FrameContext<'_>) {}

    fn on_collision(&mut self, other: &dyn Entity, ctx: &mut FrameContext<'_>) {
        if other.identify() != "Leader" {
            return;
        }
        ctx.play("bite");

        let mut rng = self.rng.clone();
        let next = random_point(&mut rng, self.bounds);
        match Pickup::new(next, rng, self.bounds) {
            Ok(pickup) => {
                ctx.despawn(self.state.id.clone());
                ctx.spawn(Box::new(pickup));
            }
            Err(e) => log::warn!("Pickup not respawned: {}", e),
        }
    }

    fn reset(&mut self) {
        self.state.restore();
    }
}

fn random_point(rng: &mut Pcg32, bounds: DVec2) -> DVec2 {
    let margin = TILE as f64;
    let far = (bounds - margin).max(DVec2::splat(margin + 1.0));
    DVec2::new(
        rng.random_range(margin..far.x),
        rng.random_range(margin..far.y),
    )
}

// === Scenes ===

fn title_room(config: &EngineConfig) -> Result<Room, EngineError> {
    Room::new(vec![Box::new(TitleCard::new(config)?)], false)
}

/// Leader first, then followers in chain order, so each reads an already-moved target
fn game_room(config: &EngineConfig) -> Result<Room, EngineError> {
    let bounds = DVec2::new(config.width as f64, config.height as f64);
    let start = bounds / 2.0;
    let mut rng = Pcg32::seed_from_u64(DEMO_SEED);

    let mut entities: Vec<Box<dyn Entity>> = vec![Box::new(Leader::new(start)?)];
    let mut target = "leader".to_string();
    for i in 0..FOLLOWERS {
        let follower = Follower::new(i, &target, start)?;
        target = follower.state.id.clone();
        entities.push(Box::new(follower));
    }
    for i in 0..OBSTACLES {
        let pos = random_point(&mut rng, bounds);
        // Keep the spawn point clear
        if pos.distance(start) < 4.0 * TILE as f64 {
            continue;
        }
        entities.push(Box::new(Obstacle::new(i, pos)?));
    }
    let first = start + DVec2::new(3.0 * TILE as f64, 0.0);
    entities.push(Box::new(Pickup::new(first, rng, bounds)?));

    Room::new(entities, false)
}

// === Input ===

/// Replays a fixed list of per-tick event batches, then quits
struct ScriptedInput {
    batches: VecDeque<Vec<InputEvent>>,
}

impl ScriptedInput {
    fn demo() -> Self {
        let mut batches = VecDeque::new();
        let idle = |batches: &mut VecDeque<Vec<InputEvent>>, ticks: usize| {
            batches.extend(std::iter::repeat_with(Vec::new).take(ticks));
        };

        idle(&mut batches, 10);
        batches.push_back(vec![InputEvent::KeyDown(Key::Enter)]);
        batches.push_back(vec![InputEvent::KeyUp(Key::Enter)]);
        idle(&mut batches, 5);
        batches.push_back(vec![InputEvent::KeyDown(Key::Right)]);
        idle(&mut batches, 60);
        batches.push_back(vec![
            InputEvent::KeyUp(Key::Right),
            InputEvent::KeyDown(Key::Down),
        ]);
        idle(&mut batches, 40);
        batches.push_back(vec![InputEvent::KeyUp(Key::Down), InputEvent::KeyUp(Key::F4)]);
        idle(&mut batches, 20);
        batches.push_back(vec![InputEvent::KeyUp(Key::Escape)]);
        idle(&mut batches, 10);
        batches.push_back(vec![InputEvent::KeyUp(Key::Enter)]);
        idle(&mut batches, 10);

        Self { batches }
    }
}

impl EventSource for ScriptedInput {
    fn poll(&mut self) -> Vec<InputEvent> {
        self.batches
            .pop_front()
            .unwrap_or_else(|| vec![InputEvent::Quit])
    }
}

fn run() -> Result<(), EngineError> {
    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    log::info!("{} ({}x{})", config.title, config.width, config.height);

    let mut renderer = HeadlessRenderer::new()
        .with_texture("title", IVec2::new(640, 360))
        .with_texture("hero", IVec2::new(4 * TILE, TILE))
        .with_texture("segment", IVec2::splat(TILE))
        .with_texture("rock", IVec2::splat(TILE))
        .with_texture("apple", IVec2::new(4 * TILE, TILE))
        .with_font("ui", 20);
    let clips = [
        ("theme", SoundKind::Music),
        ("select", SoundKind::Effect),
        ("bite", SoundKind::Effect),
        ("bump", SoundKind::Effect),
    ]
    .into_iter()
    .collect();
    let mut audio = AudioManager::from_config(clips, &config);

    let rooms = [
        ("title", title_room(&config)?),
        ("game", game_room(&config)?),
    ];
    let mut driver = Driver::new(config, rooms, "title")?;
    let mut input = ScriptedInput::demo();
    driver.run(&mut input, &mut renderer, &mut audio)?;

    log::info!(
        "Presented {} frames, {} audio requests, fullscreen: {}",
        renderer.frames_presented(),
        audio.drain().len(),
        renderer.is_fullscreen()
    );
    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
