//! Target selection policy: which variant spawns next, and when

use glam::Vec3;
use rand::Rng;
use rand::seq::IndexedRandom;

use super::cooldown::{Spawner, SpawnerMutation};
use super::entity::{Color, Style};
use crate::consts::*;
use crate::random_between;

/// Pairs of axes (as `Vec3` component indices) that a target tumbles around
const SPIN_AXES: [[usize; 2]; 3] = [[0, 1], [1, 2], [2, 0]];

const SPINNER_SPEED: f32 = -0.25;
const DEFAULT_SPIN: f32 = 0.05;

/// Milliseconds until the next regular spawn
pub fn spawn_delay(cube_count: u32) -> f32 {
    (SPAWN_DELAY_MAX - cube_count as f32 * SPAWN_DELAY_PER_CUBE).max(SPAWN_DELAY_MIN)
}

/// What the next target should look like
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetSpec {
    pub color: Color,
    pub style: Style,
    pub health: u32,
    pub max_health: u32,
    pub rotation: Vec3,
    pub spin: Vec3,
    pub spinner: bool,
}

/// Session facts the policy depends on
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectContext {
    pub score: u64,
    pub cube_count: u32,
    pub time: f32,
    pub in_game: bool,
}

#[derive(Debug, Clone)]
pub struct TargetSelector {
    pub slowmo: Spawner,
    pub strong: Spawner,
    pub spinner: Spawner,
    double_strong: bool,
}

impl Default for TargetSelector {
    fn default() -> Self {
        Self {
            slowmo: Spawner::new(0.5, 10_000.0, 1),
            strong: Spawner::new(0.3, 12_000.0, 1),
            spinner: Spawner::new(0.1, 10_000.0, 1),
            double_strong: false,
        }
    }
}

impl TargetSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn double_strong(&self) -> bool {
        self.double_strong
    }

    /// Toggle the strong spawner's doubled burst capacity around the score threshold
    pub fn update_double_strong(&mut self, score: u64) {
        if self.double_strong && score <= DOUBLE_STRONG_ENABLE_SCORE {
            self.double_strong = false;
            self.strong.mutate(SpawnerMutation {
                units: Some(1),
                ..Default::default()
            });
        } else if !self.double_strong && score > DOUBLE_STRONG_ENABLE_SCORE {
            self.double_strong = true;
            self.strong.mutate(SpawnerMutation {
                units: Some(2),
                ..Default::default()
            });
            log::debug!("Strong targets can now spawn in pairs");
        }
    }

    /// Pick the next target variant
    pub fn select<R: Rng + ?Sized>(&mut self, rng: &mut R, ctx: SelectContext) -> TargetSpec {
        self.update_double_strong(ctx.score);

        let mut color = *Color::BASE.choose(rng).unwrap_or(&Color::Blue);
        let mut style = Style::Solid;
        let mut health = 1;
        let mut max_health = 1;

        let spinner = ctx.cube_count >= SPINNER_THRESHOLD
            && ctx.in_game
            && self.spinner.should_spawn(rng, ctx.time);

        if ctx.cube_count >= SLOWMO_THRESHOLD && self.slowmo.should_spawn(rng, ctx.time) {
            color = Color::Blue;
            style = Style::Wireframe;
            log::debug!("Spawning slow-motion target");
        } else if ctx.cube_count >= STRONG_THRESHOLD && self.strong.should_spawn(rng, ctx.time) {
            color = Color::Pink;
            health = STRONG_HEALTH;
            max_health = STRONG_HEALTH;
            log::debug!("Spawning strong target");
        }

        let mut speeds = [
            random_between(rng, -DEFAULT_SPIN, DEFAULT_SPIN),
            random_between(rng, -DEFAULT_SPIN, DEFAULT_SPIN),
        ];
        let axes = *SPIN_AXES.choose(rng).unwrap_or(&SPIN_AXES[0]);
        let mut rotation = Vec3::ZERO;
        if spinner {
            speeds = [SPINNER_SPEED, 0.0];
            rotation[axes[0]] = random_between(rng, 0.0, std::f32::consts::TAU);
        }
        let mut spin = Vec3::ZERO;
        for (axis, speed) in axes.into_iter().zip(speeds) {
            spin[axis] = speed;
        }

        TargetSpec {
            color,
            style,
            health,
            max_health,
            rotation,
            spin,
            spinner,
        }
    }

    /// Back to the start-of-game configuration
    pub fn reset(&mut self) {
        self.slowmo.reset();
        self.strong.reset();
        self.spinner.reset();
        self.double_strong = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_spawn_delay_scales_with_cubes() {
        assert_eq!(spawn_delay(0), 1400.0);
        assert_eq!(spawn_delay(100), 1090.0);
        assert_eq!(spawn_delay(500), 550.0);
        assert_eq!(spawn_delay(10_000), 550.0);
    }

    #[test]
    fn test_early_targets_are_plain() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut selector = TargetSelector::new();
        for i in 0..200 {
            let spec = selector.select(
                &mut rng,
                SelectContext {
                    cube_count: 5,
                    time: i as f32 * 1000.0,
                    in_game: true,
                    ..Default::default()
                },
            );
            assert_ne!(spec.color, Color::Pink);
            assert_eq!(spec.style, Style::Solid);
            assert_eq!(spec.health, 1);
            assert!(!spec.spinner);
            assert!(spec.spin.abs().max_element() <= DEFAULT_SPIN);
            // Exactly one axis stays still
            assert!(spec.spin.to_array().iter().filter(|s| **s == 0.0).count() >= 1);
        }
    }

    #[test]
    fn test_variants_appear_later() {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut selector = TargetSelector::new();
        let (mut slowmo, mut strong, mut spinner) = (0, 0, 0);
        for i in 0..400 {
            let spec = selector.select(
                &mut rng,
                SelectContext {
                    cube_count: 30,
                    time: i as f32 * 1000.0,
                    in_game: true,
                    ..Default::default()
                },
            );
            match (spec.style, spec.color) {
                (Style::Wireframe, c) => {
                    assert_eq!(c, Color::Blue);
                    assert_eq!(spec.health, 1);
                    slowmo += 1;
                }
                (Style::Solid, Color::Pink) => {
                    assert_eq!((spec.health, spec.max_health), (3, 3));
                    strong += 1;
                }
                _ => {}
            }
            if spec.spinner {
                assert!(spec.spin.to_array().contains(&SPINNER_SPEED));
                spinner += 1;
            }
        }
        // 400 s of play with 10-12 s cooldowns: bounded by the cooldown
        assert!(slowmo > 0 && slowmo <= 41);
        assert!(strong > 0 && strong <= 34);
        assert!(spinner > 0 && spinner <= 41);
    }

    #[test]
    fn test_no_spinners_outside_game() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut selector = TargetSelector::new();
        for i in 0..200 {
            let spec = selector.select(
                &mut rng,
                SelectContext {
                    cube_count: 100,
                    time: i as f32 * 20_000.0,
                    in_game: false,
                    ..Default::default()
                },
            );
            assert!(!spec.spinner);
        }
    }

    #[test]
    fn test_double_strong_toggles_with_score() {
        let mut selector = TargetSelector::new();
        selector.update_double_strong(2001);
        assert!(selector.double_strong());
        assert_eq!(selector.strong.cooldown.units(), 2);
        selector.update_double_strong(0);
        assert!(!selector.double_strong());
        assert_eq!(selector.strong.cooldown.units(), 1);
    }
}
