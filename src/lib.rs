//! Block Ninja - swipe-to-smash arcade game
//!
//! Core modules:
//! - `sim`: Simulation (meshes, entities, pools, spawning, tick, scene assembly)
//! - `game`: Menu/session state machine and host hooks
//! - `renderer`: Painter's-algorithm drawing onto a 2D surface
//! - `platform`: Browser/native platform abstraction (input, frame timing, wasm glue)
//! - `persistence`: Best-score storage

pub mod audio;
pub mod game;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use game::{Game, Host, MenuAction, OfflineHost};
pub use highscores::HighScore;
pub use settings::{QualityPreset, Settings};

use rand::Rng;

/// Game configuration constants
///
/// Times are in milliseconds of simulation time. Velocities are in scene units
/// per reference frame (16.67 ms) and are scaled by `sim_speed` each tick.
pub mod consts {
    /// Camera sits this far in front of the origin, looking down -Z
    pub const CAMERA_DISTANCE: f32 = 900.0;
    pub const SCENE_SCALE: f32 = 1.0;
    /// Faces closer than this start fading out
    pub const CAMERA_FADE_START_Z: f32 = 0.45 * CAMERA_DISTANCE;
    /// Faces closer than this are invisible; fragments past it are retired
    pub const CAMERA_FADE_END_Z: f32 = 0.65 * CAMERA_DISTANCE;
    pub const CAMERA_FADE_RANGE: f32 = CAMERA_FADE_END_Z - CAMERA_FADE_START_Z;
    /// Back wall that shadows are cast onto
    pub const BACKBOARD_Z: f32 = -400.0;

    /// Logical height of the view in scene units (width follows aspect ratio)
    pub const VIEW_HEIGHT: f32 = 1000.0;

    /// Physics
    pub const GRAVITY: f32 = 0.3;
    pub const AIR_DRAG: f32 = 0.022;
    pub const AIR_DRAG_SPARK: f32 = 0.1;
    /// Velocity kept (and reversed) when bouncing off a side or the backboard
    pub const BOUND_DAMPING: f32 = 0.4;
    /// Ceiling sits this far above the top edge of the view
    pub const CEILING_MARGIN: f32 = 120.0;

    /// Targets
    pub const TARGET_RADIUS: f32 = 40.0;
    pub const TARGET_HIT_RADIUS: f32 = 50.0;
    /// Rise needed before a target that falls out counts as a miss
    pub const TARGET_APEX_THRESHOLD: f32 = TARGET_HIT_RADIUS * 0.5;
    pub const TARGET_LAUNCH_SPEED: f32 = -20.0;
    pub const MAX_SPAWN_X: f32 = 450.0;
    pub const STRONG_HEALTH: u32 = 3;
    pub const FRAG_RADIUS: f32 = TARGET_RADIUS / 3.0;
    pub const WELD_EPSILON: f32 = 0.0001;

    /// Swiping
    pub const MIN_POINTER_SPEED: f32 = 60.0;
    pub const HIT_DAMPENING: f32 = 0.1;
    pub const TOUCH_POINT_LIFE: f32 = 120.0;

    /// Scoring
    pub const SCORE_HIT: i64 = 10;
    pub const SCORE_GRAZE: i64 = 5;

    /// Spawning
    pub const SPAWN_DELAY_MAX: f32 = 1400.0;
    pub const SPAWN_DELAY_MIN: f32 = 550.0;
    pub const SPAWN_DELAY_PER_CUBE: f32 = 3.1;
    pub const SPAWN_EXTRA_DELAY: f32 = 300.0;
    pub const SPAWN_EXTRA_COUNT: u32 = 2;
    pub const SLOWMO_THRESHOLD: u32 = 10;
    pub const STRONG_THRESHOLD: u32 = 25;
    pub const SPINNER_THRESHOLD: u32 = 25;
    pub const DOUBLE_STRONG_ENABLE_SCORE: u64 = 2000;

    /// Time dilation
    pub const SLOWMO_DURATION: f32 = 1500.0;
    pub const SLOWMO_SPEED: f32 = 0.3;
    pub const SLOWMO_SPEED_POINTER_DOWN: f32 = 0.075;
    pub const MENU_PEEK_SPEED: f32 = 0.025;
    /// Divisor for easing game speed toward its target
    pub const SPEED_EASE: f32 = 22.0;

    /// Frame timing
    pub const REFERENCE_FRAME_MS: f32 = 16.6667;
    pub const MAX_FRAME_MS: f32 = 68.0;
}

/// Uniform random value in [min, max)
///
/// Unlike `Rng::random_range` this tolerates an empty range (returns `min`).
#[inline]
pub fn random_between<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    rng.random::<f32>() * (max - min) + min
}

/// Linear interpolation from `a` to `b`
#[inline]
pub fn lerp(a: f32, b: f32, mix: f32) -> f32 {
    (b - a) * mix + a
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_random_between_stays_in_range() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..1000 {
            let v = random_between(&mut rng, -3.0, 5.0);
            assert!((-3.0..5.0).contains(&v));
        }
        assert_eq!(random_between(&mut rng, 2.0, 2.0), 2.0);
    }

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(0.0, 10.0, 0.5), 5.0);
        assert_eq!(lerp(4.0, 8.0, 0.0), 4.0);
        assert_eq!(lerp(4.0, 8.0, 1.0), 8.0);
    }
}
