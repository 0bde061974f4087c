//! Pre-decoded input events
//!
//! Device polling happens outside the core; the loop receives these already
//! translated from keys/buttons.

use glam::Vec2;

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Window closed / quit requested
    Quit,
    /// Start a run from the menu
    Start,
    /// Choose a difficulty mode by name (menu only)
    SelectMode(String),
    /// Open the hall of fame from the menu
    ViewScores,
    /// Leave the current screen (Esc): hall of fame / game over -> menu
    Back,
    /// Start another run from game over (R)
    Restart,
    /// Toggle pause while playing
    Pause,
    /// Held movement direction; zero stops the player
    Move(Vec2),
}
