//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events (pointer, touch, autopilot)
//! - Frame timing
//! - Menu button wiring
//! - Browser glue: canvas, DOM menus/HUD, host hooks (wasm32 only)

pub mod input;
pub mod menu;
pub mod reentry;
pub mod time;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use input::{InputAdapter, PointerSample, PointerSource, SampleQueue, TouchTracker, Viewport};
pub use menu::MENU_BUTTONS;
pub use reentry::read_or_last;
pub use time::FrameClock;
