//! Idle/demo swipe bot
//!
//! Plays the game with ordinary pointer samples: press beside the most
//! dangerous target, drag across where it will be, release. Used for headless
//! runs and end-to-end tests.

use glam::Vec2;

use super::state::GameState;

/// Half the length of each swipe, in scene units
const SWIPE_REACH: f32 = 100.0;
/// Frames between the aim decision and the hit test
const LEAD_FRAMES: f32 = 2.0;

/// One pointer action in scene units
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AutopilotAction {
    Press(Vec2),
    Move(Vec2),
    Release,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Phase {
    #[default]
    Idle,
    Pressed,
    Swiped,
}

#[derive(Debug, Clone, Default)]
pub struct Autopilot {
    phase: Phase,
    aim: Vec2,
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next pointer action, or `None` when there is nothing to do
    pub fn next_action(&mut self, state: &GameState) -> Option<AutopilotAction> {
        match self.phase {
            Phase::Idle => {
                let aim = Self::pick_aim(state)?;
                self.aim = aim;
                self.phase = Phase::Pressed;
                Some(AutopilotAction::Press(aim - Vec2::X * SWIPE_REACH))
            }
            Phase::Pressed => {
                self.phase = Phase::Swiped;
                Some(AutopilotAction::Move(self.aim + Vec2::X * SWIPE_REACH))
            }
            Phase::Swiped => {
                self.phase = Phase::Idle;
                Some(AutopilotAction::Release)
            }
        }
    }

    /// Predicted screen position of the lowest target (closest to falling out)
    fn pick_aim(state: &GameState) -> Option<Vec2> {
        if !state.is_in_game() {
            return None;
        }
        state
            .targets
            .iter()
            .max_by(|a, b| {
                a.entity
                    .projected
                    .y
                    .partial_cmp(&b.entity.projected.y)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|t| {
                let vel = t.motion().velocity;
                t.entity.projected + Vec2::new(vel.x, vel.y) * LEAD_FRAMES
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::REFERENCE_FRAME_MS;
    use crate::sim::state::GameMode;
    use crate::sim::tick::{TickInput, tick};

    #[test]
    fn test_idle_without_targets() {
        let mut state = GameState::new(3);
        state.start_game(GameMode::Casual);
        let mut bot = Autopilot::new();
        assert_eq!(bot.next_action(&state), None);
    }

    #[test]
    fn test_autopilot_clears_targets() {
        let mut state = GameState::new(11);
        state.start_game(GameMode::Casual);
        let mut bot = Autopilot::new();
        let mut input = TickInput {
            width: 1600.0,
            height: 1000.0,
            ..Default::default()
        };

        for _ in 0..600 {
            input.touch_break = false;
            match bot.next_action(&state) {
                Some(AutopilotAction::Press(p)) => {
                    input.pointer_down = true;
                    input.pointer = p;
                }
                Some(AutopilotAction::Move(p)) => input.pointer = p,
                Some(AutopilotAction::Release) => {
                    input.pointer_down = false;
                    input.touch_break = true;
                }
                None => {}
            }
            tick(&mut state, &input, REFERENCE_FRAME_MS);
        }
        assert!(state.session.cube_count >= 1);
        assert!(state.session.score >= 10);
    }
}
