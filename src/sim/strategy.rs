//! Difficulty modes
//!
//! A mode is a tagged variant; every per-mode policy is a `match` over it, so
//! the tables below are the whole difficulty model. `GameModeContext` holds the
//! active mode and routes spawn calls through the factory.

use std::time::Duration;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entities::{Player, Projectile, ProjectileKind, WarningIndicator};
use super::factory::{ObjectFactory, Spawn};
use crate::error::ModeError;
use crate::settings::HeartProgression;

/// Normal mode spawns at a fixed cadence
pub const NORMAL_SPAWN_INTERVAL: Duration = Duration::from_millis(1200);
/// Nightmare starts here and tightens over time
pub const NIGHTMARE_BASE_INTERVAL: Duration = Duration::from_millis(700);
/// Interval shaved off per elapsed second in Nightmare
pub const NIGHTMARE_DECAY_PER_SEC: Duration = Duration::from_millis(8);
/// Nightmare never spawns faster than this
pub const NIGHTMARE_MIN_INTERVAL: Duration = Duration::from_millis(200);

/// Starting hearts for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerStats {
    pub health: i32,
    pub max_health: i32,
}

/// Difficulty mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    #[default]
    Normal,
    Nightmare,
}

impl GameMode {
    pub const ALL: [GameMode; 2] = [GameMode::Normal, GameMode::Nightmare];

    pub fn name(&self) -> &'static str {
        match self {
            GameMode::Normal => "normal",
            GameMode::Nightmare => "nightmare",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, ModeError> {
        match name.trim().to_lowercase().as_str() {
            "normal" => Ok(GameMode::Normal),
            "nightmare" => Ok(GameMode::Nightmare),
            _ => Err(ModeError::UnknownMode(name.to_string())),
        }
    }

    /// Human-readable title ("Normal Mode")
    pub fn title(&self) -> &'static str {
        match self {
            GameMode::Normal => "Normal Mode",
            GameMode::Nightmare => "Nightmare Mode",
        }
    }

    /// Time between spawns after `elapsed` seconds of play
    ///
    /// Monotonically non-increasing in `elapsed` and never below
    /// `NIGHTMARE_MIN_INTERVAL`.
    pub fn spawn_interval(&self, elapsed: f32) -> Duration {
        match self {
            GameMode::Normal => NORMAL_SPAWN_INTERVAL,
            GameMode::Nightmare => {
                // `as` saturates, so huge or NaN elapsed values cannot panic
                let shaved_ms =
                    (NIGHTMARE_DECAY_PER_SEC.as_millis() as f64 * elapsed.max(0.0) as f64) as u64;
                NIGHTMARE_BASE_INTERVAL
                    .saturating_sub(Duration::from_millis(shaved_ms))
                    .max(NIGHTMARE_MIN_INTERVAL)
            }
        }
    }

    pub fn player_stats(&self) -> PlayerStats {
        match self {
            GameMode::Normal => PlayerStats {
                health: 3,
                max_health: 3,
            },
            GameMode::Nightmare => PlayerStats {
                health: 1,
                max_health: 3,
            },
        }
    }

    /// Relative spawn weights; kinds with weight 0 never appear
    pub fn kind_weight(&self, kind: ProjectileKind) -> u32 {
        match (self, kind) {
            (GameMode::Normal, ProjectileKind::Straight) => 75,
            (GameMode::Normal, ProjectileKind::Arcing) => 25,
            (GameMode::Normal, _) => 0,
            (GameMode::Nightmare, ProjectileKind::Straight) => 40,
            (GameMode::Nightmare, ProjectileKind::Arcing) => 25,
            (GameMode::Nightmare, ProjectileKind::Dart) => 20,
            (GameMode::Nightmare, ProjectileKind::Longsword) => 15,
        }
    }

    /// Base projectile speed range (pixels/second)
    pub fn speed_range(&self) -> (f32, f32) {
        match self {
            GameMode::Normal => (160.0, 240.0),
            GameMode::Nightmare => (220.0, 340.0),
        }
    }

    /// How long telegraphed hazards are announced before firing
    pub fn warning_duration(&self) -> f32 {
        match self {
            GameMode::Normal => 1.5,
            GameMode::Nightmare => 1.0,
        }
    }

    /// Whether dodging earns hearts back in this mode
    pub fn restores_hearts(&self) -> bool {
        matches!(self, GameMode::Nightmare)
    }

    /// Pick a projectile kind by weight
    pub fn pick_kind(&self, rng: &mut impl Rng) -> ProjectileKind {
        let total: u32 = ProjectileKind::ALL.iter().map(|k| self.kind_weight(*k)).sum();
        let mut roll = rng.random_range(0..total);
        for kind in ProjectileKind::ALL {
            let w = self.kind_weight(kind);
            if roll < w {
                return kind;
            }
            roll -= w;
        }
        ProjectileKind::Straight
    }
}

/// Holds the active mode; all spawning goes through here
#[derive(Debug, Clone)]
pub struct GameModeContext {
    mode: GameMode,
    /// Set while a run is live; mode switches are rejected
    run_active: bool,
    factory: ObjectFactory,
}

impl GameModeContext {
    pub fn new(mode: GameMode, factory: ObjectFactory) -> Self {
        Self {
            mode,
            run_active: false,
            factory,
        }
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn get_mode_name(&self) -> &'static str {
        self.mode.name()
    }

    pub fn is_run_active(&self) -> bool {
        self.run_active
    }

    /// Swap the active strategy; rejected while a run is in progress
    pub fn set_strategy(&mut self, mode: GameMode) -> Result<(), ModeError> {
        if mode == self.mode {
            return Ok(());
        }
        if self.run_active {
            return Err(ModeError::RunInProgress {
                requested: mode.name(),
                active: self.mode.name(),
            });
        }
        log::info!("Game mode set to {}", mode.name());
        self.mode = mode;
        Ok(())
    }

    /// Lock the strategy for the duration of a run
    pub fn begin_run(&mut self) {
        self.run_active = true;
    }

    /// Full reset (back at the menu): strategy may change again
    pub fn end_run(&mut self) {
        self.run_active = false;
    }

    pub fn get_spawn_interval(&self, elapsed: f32) -> Duration {
        self.mode.spawn_interval(elapsed)
    }

    pub fn heart_progression(&self, configured: HeartProgression) -> Option<HeartProgression> {
        self.mode.restores_hearts().then_some(configured)
    }

    pub fn create_player(&self) -> Player {
        self.factory.create_player(self.mode)
    }

    pub fn create_projectile(&mut self, rng: &mut impl Rng, target: Vec2) -> Spawn {
        self.factory.create_projectile(self.mode, rng, target)
    }

    pub fn emit_from_warning(&mut self, warning: &WarningIndicator) -> Projectile {
        self.factory.emit_from_warning(warning)
    }
}
