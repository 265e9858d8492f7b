//! Game state and session transitions
//!
//! `GameState` is the single owned simulation context: RNG, pools, spawners,
//! live entities and the session all live here, so independent games can
//! run side by side (and in tests) without shared globals.

use std::collections::VecDeque;
use std::rc::Rc;

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::entity::{Color, Entity, Fragment, Spark, Style, Target, TrailPoint};
use super::mesh::{Mesh, build_cube, build_fractal_cube, menger_sponge_split, weld_mesh};
use super::pool::StylePool;
use super::scene::Scene;
use super::spawn::{SelectContext, TargetSelector, TargetSpec, spawn_delay};
use crate::audio::SoundEffect;
use crate::consts::*;
use crate::highscores::HighScore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameMode {
    /// Scores can be submitted to the host leaderboard
    #[default]
    Ranked,
    Casual,
}

/// Active overlay; the simulation only runs with `None`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    None,
    Main,
    Pause,
    Score,
}

/// Per-game counters plus the cross-session best score
#[derive(Debug, Clone, Default)]
pub struct GameSession {
    pub mode: GameMode,
    /// Simulation time in ms since the game started
    pub time: f32,
    pub score: u64,
    pub cube_count: u32,
    pub high_score: HighScore,
}

impl GameSession {
    /// Apply a signed score change, flooring at zero
    pub fn add_score(&mut self, delta: i64) {
        self.score = self.score.saturating_add_signed(delta);
    }

    fn reset(&mut self) {
        self.time = 0.0;
        self.score = 0;
        self.cube_count = 0;
        self.high_score.begin_game();
    }
}

/// Things that happened during a tick, for audio
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    Sound(SoundEffect),
    GameOver { score: u64, new_high_score: bool },
}

/// Values the HUD displays
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hud {
    pub score: u64,
    pub cube_count: u32,
    /// 0..=1 share of the slow-motion window remaining
    pub slowmo: f32,
    pub casual: bool,
    pub visible: bool,
}

/// Shared mesh templates and precomputed burst layout
#[derive(Debug, Clone)]
pub struct MeshLibrary {
    pub target: Rc<Mesh>,
    pub fragment: Rc<Mesh>,
    /// Fragment offsets from a target's origin
    pub burst_offsets: Vec<Vec3>,
    /// Unit directions of `burst_offsets`
    pub burst_normals: Vec<Vec3>,
}

impl Default for MeshLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshLibrary {
    pub fn new() -> Self {
        let sponge = build_fractal_cube(1, menger_sponge_split, TARGET_RADIUS);
        let target = weld_mesh(&sponge, WELD_EPSILON);
        let burst_offsets = menger_sponge_split(Vec3::ZERO, FRAG_RADIUS * 2.0);
        let burst_normals = burst_offsets.iter().map(|o| o.normalize_or_zero()).collect();
        Self {
            target: Rc::new(target),
            fragment: Rc::new(build_cube(FRAG_RADIUS)),
            burst_offsets,
            burst_normals,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GameState {
    pub rng: Pcg32,
    pub session: GameSession,
    pub menu: MenuState,
    /// Set by `end_game`; the score menu may only show while this is true
    pub game_over: bool,

    /// Time dilation factor, eased toward its target each tick
    pub game_speed: f32,
    pub slowmo_remaining: f32,
    pub spawn_timer: f32,
    /// Spawns queued to follow at a short fixed delay
    pub spawn_extra: u32,
    pub selector: TargetSelector,
    pub meshes: MeshLibrary,

    pub targets: Vec<Target>,
    pub fragments: Vec<Fragment>,
    pub sparks: VecDeque<Spark>,
    pub trail: VecDeque<TrailPoint>,
    pub target_pool: StylePool<Target>,
    pub fragment_pool: StylePool<Fragment>,
    pub max_sparks: usize,

    pub scene: Scene,
    pub events: Vec<GameEvent>,
}

impl GameState {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            session: GameSession::default(),
            menu: MenuState::Main,
            game_over: false,
            game_speed: 1.0,
            slowmo_remaining: 0.0,
            spawn_timer: 0.0,
            spawn_extra: 0,
            selector: TargetSelector::new(),
            meshes: MeshLibrary::new(),
            targets: Vec::new(),
            fragments: Vec::new(),
            sparks: VecDeque::new(),
            trail: VecDeque::new(),
            target_pool: StylePool::new(),
            fragment_pool: StylePool::new(),
            max_sparks: crate::QualityPreset::default().max_sparks(),
            scene: Scene::new(),
            events: Vec::new(),
        }
    }

    pub fn is_in_game(&self) -> bool {
        self.menu == MenuState::None
    }

    pub fn is_menu_visible(&self) -> bool {
        self.menu != MenuState::None
    }

    pub fn is_paused(&self) -> bool {
        self.menu == MenuState::Pause
    }

    pub fn is_casual(&self) -> bool {
        self.session.mode == GameMode::Casual
    }

    /// Switch menus; the score menu outside a game over falls back to none
    pub fn set_menu(&mut self, menu: MenuState) {
        self.menu = match menu {
            MenuState::Score if !self.game_over => MenuState::None,
            other => other,
        };
    }

    /// Clear the field and counters for a fresh game
    pub fn reset_game(&mut self) {
        self.game_over = false;
        for target in self.targets.drain(..) {
            self.target_pool.put(target);
        }
        for fragment in self.fragments.drain(..) {
            self.fragment_pool.put(fragment);
        }
        self.sparks.clear();
        self.session.reset();
        self.selector.reset();
        self.slowmo_remaining = 0.0;
        self.spawn_extra = 0;
        self.spawn_timer = spawn_delay(0);
    }

    /// Start a new game in `mode` (the host gate is checked by the caller)
    pub fn start_game(&mut self, mode: GameMode) {
        self.session.mode = mode;
        self.set_menu(MenuState::None);
        self.reset_game();
        log::info!("Starting {mode:?} game (best {})", self.session.high_score.best());
    }

    pub fn pause(&mut self) {
        if self.is_in_game() {
            self.set_menu(MenuState::Pause);
        }
    }

    pub fn resume(&mut self) {
        if self.is_paused() {
            self.set_menu(MenuState::None);
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.is_paused() {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// A peaked target was missed
    pub fn end_game(&mut self) {
        let score = self.session.score;
        let new_high_score = self.session.high_score.is_new_high_score(score);
        if new_high_score {
            self.session.high_score.confirm(score);
            self.events.push(GameEvent::Sound(SoundEffect::HighScore));
        } else {
            self.events.push(GameEvent::Sound(SoundEffect::GameOver));
        }
        self.game_over = true;
        self.set_menu(MenuState::Score);
        self.events.push(GameEvent::GameOver {
            score,
            new_high_score,
        });
        log::info!(
            "Game over: score {score}, {} cubes{}",
            self.session.cube_count,
            if new_high_score { " (new high score)" } else { "" }
        );
    }

    /// Only counts while playing
    pub fn increment_score(&mut self, delta: i64) {
        if self.is_in_game() {
            self.session.add_score(delta);
        }
    }

    pub fn increment_cube_count(&mut self, n: u32) {
        if self.is_in_game() {
            self.session.cube_count = self.session.cube_count.saturating_add(n);
        }
    }

    pub fn slowmo_fraction(&self) -> f32 {
        (self.slowmo_remaining / SLOWMO_DURATION).clamp(0.0, 1.0)
    }

    pub fn hud(&self) -> Hud {
        Hud {
            score: self.session.score,
            cube_count: self.session.cube_count,
            slowmo: self.slowmo_fraction(),
            casual: self.is_casual(),
            visible: !self.is_menu_visible(),
        }
    }

    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Choose the next variant and pull a matching target from the pool
    pub(crate) fn acquire_target(&mut self) -> Target {
        let ctx = SelectContext {
            score: self.session.score,
            cube_count: self.session.cube_count,
            time: self.session.time,
            in_game: self.is_in_game(),
        };
        let TargetSpec {
            color,
            style,
            health,
            max_health,
            rotation,
            spin,
            ..
        } = self.selector.select(&mut self.rng, ctx);

        let mesh = &self.meshes.target;
        let mut target = self
            .target_pool
            .take_or_else(color, style, || Target::new(mesh.clone(), color, style));
        target.hit = false;
        target.health = health;
        target.max_health = max_health;
        target.update_glue();
        let motion = target.motion_mut();
        motion.rotation = rotation;
        motion.spin = spin;
        target
    }

    /// Pull a fragment styled like `target` from the pool
    pub(crate) fn acquire_fragment(&mut self, color: Color, style: Style) -> Fragment {
        let mesh = &self.meshes.fragment;
        self.fragment_pool
            .take_or_else(color, style, || Entity::new(mesh.clone(), color, style))
    }

    /// Add a spark, evicting the oldest when over the cap
    pub(crate) fn push_spark(&mut self, spark: Spark) {
        if self.max_sparks == 0 {
            return;
        }
        if self.sparks.len() >= self.max_sparks {
            self.sparks.pop_front();
        }
        self.sparks.push_back(spark);
    }
}
