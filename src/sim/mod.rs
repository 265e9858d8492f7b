//! Simulation module
//!
//! All gameplay logic lives here. It is deterministic given a seed and a
//! sequence of frame times and pointer samples:
//! - Seeded RNG only, owned by `GameState`
//! - Stable iteration order (entities are kept in insertion order)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod cooldown;
pub mod entity;
pub mod mesh;
pub mod pool;
pub mod scene;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod transform;

pub use autopilot::{Autopilot, AutopilotAction};
pub use cooldown::{Cooldown, Spawner, SpawnerMutation};
pub use entity::{Color, Entity, Fragment, Kinematics, Spark, Style, Target, TrailPoint};
pub use mesh::{Face, Mesh, build_cube, build_fractal_cube, menger_sponge_split, weld_mesh};
pub use pool::{Poolable, StylePool};
pub use scene::{Scene, SceneFace, ShadowFace};
pub use spawn::{TargetSelector, TargetSpec, spawn_delay};
pub use state::{GameEvent, GameMode, GameSession, GameState, Hud, MenuState, MeshLibrary};
pub use tick::{FrameStep, TickInput, tick};
