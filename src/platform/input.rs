//! Pointer input normalization
//!
//! Mouse, pen and touch events all collapse into [`PointerSample`]s in
//! screen pixels. The game drains them at the top of each frame, so event
//! handlers never touch the simulation directly.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;

use crate::consts::VIEW_HEIGHT;
use crate::sim::tick::TickInput;
use crate::sim::{Autopilot, AutopilotAction, GameState};

/// Drawing area in CSS pixels plus the device pixel ratio
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub dpr: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1600.0, VIEW_HEIGHT, 1.0)
    }
}

impl Viewport {
    pub fn new(width: f32, height: f32, dpr: f32) -> Self {
        let sane = |v: f32, fallback: f32| if v.is_finite() && v > 0.0 { v } else { fallback };
        Self {
            width: sane(width, 1.0),
            height: sane(height, 1.0),
            dpr: sane(dpr, 1.0),
        }
    }

    /// Screen pixels per scene unit; the scene is always 1000 units tall
    pub fn view_scale(&self) -> f32 {
        self.height / VIEW_HEIGHT
    }

    /// View size in scene units
    pub fn scene_size(&self) -> Vec2 {
        Vec2::new(self.width, self.height) / self.view_scale()
    }

    /// Screen pixels to scene units centred on the view
    pub fn to_scene(&self, screen: Vec2) -> Vec2 {
        screen / self.view_scale() - self.scene_size() * 0.5
    }

    pub fn to_screen(&self, scene: Vec2) -> Vec2 {
        (scene + self.scene_size() * 0.5) * self.view_scale()
    }

    /// Backing-store size of the canvas in device pixels
    pub fn buffer_size(&self) -> (u32, u32) {
        (
            (self.width * self.dpr).round() as u32,
            (self.height * self.dpr).round() as u32,
        )
    }

    /// Device pixels per scene unit
    pub fn draw_scale(&self) -> f32 {
        self.view_scale() * self.dpr
    }
}

/// Normalized pointer event, positions in screen pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerSample {
    Down(Vec2),
    Move(Vec2),
    Up,
}

/// Anything that produces pointer samples once per frame
pub trait PointerSource {
    /// Append samples gathered since the last call, oldest first
    fn poll(&mut self, state: &GameState, viewport: &Viewport, out: &mut Vec<PointerSample>);
}

/// Shared queue filled by event handlers and drained by the game
#[derive(Debug, Clone, Default)]
pub struct SampleQueue(Rc<RefCell<Vec<PointerSample>>>);

impl SampleQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, sample: PointerSample) {
        self.0.borrow_mut().push(sample);
    }
}

impl PointerSource for SampleQueue {
    fn poll(&mut self, _state: &GameState, _viewport: &Viewport, out: &mut Vec<PointerSample>) {
        out.append(&mut self.0.borrow_mut());
    }
}

impl PointerSource for Autopilot {
    fn poll(&mut self, state: &GameState, viewport: &Viewport, out: &mut Vec<PointerSample>) {
        let sample = match self.next_action(state) {
            Some(AutopilotAction::Press(p)) => PointerSample::Down(viewport.to_screen(p)),
            Some(AutopilotAction::Move(p)) => PointerSample::Move(viewport.to_screen(p)),
            Some(AutopilotAction::Release) => PointerSample::Up,
            None => return,
        };
        out.push(sample);
    }
}

/// Pointer state between frames
#[derive(Debug, Clone, Copy, Default)]
pub struct InputAdapter {
    down: bool,
    screen: Vec2,
    /// Released since the last `tick_input`
    pending_break: bool,
}

impl InputAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_down(&self) -> bool {
        self.down
    }

    pub fn position(&self) -> Vec2 {
        self.screen
    }

    /// Returns true on a fresh press
    pub fn press(&mut self, pos: Vec2) -> bool {
        if !pos.is_finite() || self.down {
            return false;
        }
        self.down = true;
        self.screen = pos;
        true
    }

    /// Returns true if the pointer was down
    pub fn release(&mut self) -> bool {
        if !self.down {
            return false;
        }
        self.down = false;
        self.pending_break = true;
        true
    }

    /// Track the pointer; ignored while it is up
    pub fn move_to(&mut self, pos: Vec2) {
        if self.down && pos.is_finite() {
            self.screen = pos;
        }
    }

    /// Snapshot for one tick; consumes the pending release
    pub fn tick_input(&mut self, viewport: &Viewport) -> TickInput {
        let size = viewport.scene_size();
        TickInput {
            width: size.x,
            height: size.y,
            pointer_down: self.down,
            pointer: viewport.to_scene(self.screen),
            touch_break: std::mem::take(&mut self.pending_break),
        }
    }
}

/// Follows a single touch; other fingers are ignored until it lifts
#[derive(Debug, Clone, Copy, Default)]
pub struct TouchTracker {
    active: Option<i32>,
}

impl TouchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, id: i32, pos: Vec2) -> Option<PointerSample> {
        if self.active.is_some() {
            return None;
        }
        self.active = Some(id);
        Some(PointerSample::Down(pos))
    }

    pub fn moved(&self, id: i32, pos: Vec2) -> Option<PointerSample> {
        (self.active == Some(id)).then_some(PointerSample::Move(pos))
    }

    /// `ids` are the touches that just ended
    pub fn end(&mut self, ids: impl IntoIterator<Item = i32>) -> Option<PointerSample> {
        let active = self.active?;
        if ids.into_iter().any(|id| id == active) {
            self.active = None;
            Some(PointerSample::Up)
        } else {
            None
        }
    }
}

/// Pointer events from secondary pointers (extra fingers, pens) are dropped
pub fn primary_sample(is_primary: bool, sample: PointerSample) -> Option<PointerSample> {
    is_primary.then_some(sample)
}
