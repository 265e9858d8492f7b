//! Menu buttons in the host page and what they do

use crate::game::MenuAction;

/// CSS selector and action for every button the page wires up
///
/// Selectors may match several elements; each match gets the listener.
pub const MENU_BUTTONS: &[(&str, MenuAction)] = &[
    (".play-normal-btn", MenuAction::PlayRanked),
    (".play-casual-btn", MenuAction::PlayCasual),
    (".pause-btn", MenuAction::Pause),
    (".resume-btn", MenuAction::Resume),
    (".menu-btn--pause", MenuAction::MainMenu),
    (".play-again-btn", MenuAction::PlayAgain),
    (".menu-btn--score", MenuAction::MainMenu),
    (".submit-score-btn", MenuAction::SubmitScore),
    (".menu--main .leaderboard-btn", MenuAction::OpenLeaderboard),
    (".menu--score .leaderboard-btn", MenuAction::OpenLeaderboard),
];
