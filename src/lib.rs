//! Dodging Simulator - a 2D survival game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, difficulty strategies)
//! - `game`: Screen state machine and per-run context
//! - `events` / `observers`: Event bus plus score and stats subscribers
//! - `highscores`: Per-mode leaderboard persisted to disk
//! - `runner`: Fixed-cadence loop driven by an injectable clock
//! - `render` / `audio` / `input`: Boundaries to the outside world

pub mod audio;
pub mod error;
pub mod events;
pub mod game;
pub mod highscores;
pub mod input;
pub mod observers;
pub mod render;
pub mod runner;
pub mod settings;
pub mod sim;

pub use error::{AudioError, ModeError, PersistError, SimError};
pub use game::{Game, GameSession, Screen};
pub use highscores::HighScores;
pub use settings::{HeartProgression, Settings};

/// Game configuration constants
pub mod consts {
    /// Target updates (and renders) per second
    pub const TARGET_FPS: u32 = 60;
    /// Nominal simulation timestep at the target rate
    pub const SIM_DT: f32 = 1.0 / TARGET_FPS as f32;
    /// Largest delta a single tick will integrate (stalls are not replayed)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Playfield dimensions
    pub const GAME_WIDTH: f32 = 800.0;
    pub const GAME_HEIGHT: f32 = 600.0;

    /// Player defaults
    pub const PLAYER_RADIUS: f32 = 14.0;
    pub const PLAYER_SPEED: f32 = 320.0;

    /// Number of scores kept per mode
    pub const LEADERBOARD_SIZE: usize = 5;

    /// Dodges between "milestone" audio cues
    pub const DODGE_MILESTONE: u32 = 25;
}

/// Format elapsed seconds for the HUD and leaderboards ("12.3s")
pub fn format_seconds(seconds: f64) -> String {
    format!("{:.1}s", seconds.max(0.0))
}
