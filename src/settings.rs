//! Game settings and tunables
//!
//! Built once at startup and handed to `Game::new`. Persisted as JSON next to
//! the leaderboard; a missing or malformed file falls back to defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::PersistError;
use crate::sim::ProjectileKind;

/// Smallest playfield side that still fits the player between the widest hazard
/// on either side
pub fn min_playfield_side() -> f32 {
    let widest = ProjectileKind::ALL
        .iter()
        .map(|kind| kind.hitbox().half_extents().max_element())
        .fold(0.0, f32::max);
    widest * 2.0 + PLAYER_RADIUS * 2.0
}

/// Dodge counts at which Nightmare mode restores a heart
///
/// The next heart is due at `milestone * (hearts_restored + 1)` dodges, where
/// `milestone` is `first_milestone` until the first heart has been restored and
/// `milestone_step` afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartProgression {
    pub first_milestone: u32,
    pub milestone_step: u32,
}

impl Default for HeartProgression {
    fn default() -> Self {
        Self {
            first_milestone: 75,
            milestone_step: 150,
        }
    }
}

impl HeartProgression {
    /// Dodge count at which the next heart is restored
    pub fn next_heart_at(&self, hearts_restored: u32) -> u32 {
        let milestone = if hearts_restored == 0 {
            self.first_milestone
        } else {
            self.milestone_step
        };
        milestone.saturating_mul(hearts_restored + 1)
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Playfield ===
    pub width: f32,
    pub height: f32,
    /// Loop cadence (updates and renders per second)
    pub target_fps: u32,

    // === Player ===
    /// Movement speed in pixels/second
    pub player_speed: f32,

    // === Progression ===
    pub heart_progression: HeartProgression,
    /// Fixed RNG seed (None = seed from the wall clock)
    pub seed: Option<u64>,

    // === Persistence ===
    /// Scores kept per mode
    pub leaderboard_size: usize,
    pub score_file: PathBuf,

    // === Presentation ===
    pub background_image: Option<PathBuf>,
    pub background_color: [u8; 3],
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: GAME_WIDTH,
            height: GAME_HEIGHT,
            target_fps: TARGET_FPS,

            player_speed: PLAYER_SPEED,

            heart_progression: HeartProgression::default(),
            seed: None,

            leaderboard_size: LEADERBOARD_SIZE,
            score_file: PathBuf::from("scores.json"),

            background_image: Some(PathBuf::from("assets/background.png")),
            background_color: [18, 18, 28],
            master_volume: 0.8,
            muted: false,
        }
    }
}

impl Settings {
    /// Fixed timestep implied by `target_fps`
    pub fn frame_dt(&self) -> f32 {
        1.0 / self.target_fps.max(1) as f32
    }

    /// Effective volume (0 when muted)
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume.clamp(0.0, 1.0)
        }
    }

    /// Replace out-of-range values with their defaults
    ///
    /// A playfield smaller than `min_playfield_side` cannot host every hazard,
    /// so both sides are reset together.
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        let min_side = min_playfield_side();
        let side_ok = |side: f32| side.is_finite() && side >= min_side;
        if !side_ok(self.width) || !side_ok(self.height) {
            log::warn!(
                "Playfield {}x{} is below the {min_side} minimum, using {}x{}",
                self.width,
                self.height,
                defaults.width,
                defaults.height
            );
            self.width = defaults.width;
            self.height = defaults.height;
        }
        if !(self.player_speed.is_finite() && self.player_speed >= 0.0) {
            log::warn!(
                "Invalid player_speed {}, using {}",
                self.player_speed,
                defaults.player_speed
            );
            self.player_speed = defaults.player_speed;
        }
        if !self.master_volume.is_finite() {
            log::warn!("Invalid master_volume, using {}", defaults.master_volume);
            self.master_volume = defaults.master_volume;
        }
        self
    }

    /// Load settings from `path`, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings.validated()
            }
            Err(err) => {
                log::warn!("Using default settings: {err}");
                Self::default()
            }
        }
    }

    fn try_load(path: &Path) -> Result<Self, PersistError> {
        let json = fs::read_to_string(path).map_err(|source| PersistError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| PersistError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write settings to `path` as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), PersistError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| PersistError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heart_progression_thresholds() {
        let hp = HeartProgression::default();
        assert_eq!(hp.next_heart_at(0), 75);
        assert_eq!(hp.next_heart_at(1), 300);
        assert_eq!(hp.next_heart_at(2), 450);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: Settings = serde_json::from_str(r#"{ "target_fps": 30 }"#).unwrap();
        assert_eq!(settings.target_fps, 30);
        assert_eq!(settings.leaderboard_size, LEADERBOARD_SIZE);
        assert!((settings.frame_dt() - 1.0 / 30.0).abs() < 1e-6);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let settings = Settings::load(Path::new("/definitely/not/here/settings.json"));
        assert_eq!(settings, Settings::default());
    }

    fn scratch_file(label: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "dodging-sim-settings-{}-{label}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir.join("settings.json")
    }

    #[test]
    fn test_default_frame_dt_matches_sim_dt() {
        assert!((Settings::default().frame_dt() - SIM_DT).abs() < 1e-9);
    }

    #[test]
    fn test_tiny_playfield_falls_back() {
        let tiny: Settings = serde_json::from_str(r#"{ "width": 0, "height": 12 }"#).unwrap();
        let fixed = tiny.validated();
        assert_eq!((fixed.width, fixed.height), (GAME_WIDTH, GAME_HEIGHT));

        let narrow = Settings {
            width: f32::NAN,
            player_speed: -10.0,
            target_fps: 30,
            ..Default::default()
        }
        .validated();
        assert_eq!(narrow.width, GAME_WIDTH);
        assert_eq!(narrow.player_speed, PLAYER_SPEED);
        assert_eq!(narrow.target_fps, 30);

        // Same through the file path, keeping the valid fields
        let path = scratch_file("tiny");
        fs::write(&path, r#"{ "width": 800, "height": 12, "target_fps": 30 }"#).unwrap();
        let loaded = Settings::load(&path);
        assert_eq!(loaded.height, GAME_HEIGHT);
        assert_eq!(loaded.target_fps, 30);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_smallest_playfield_is_accepted() {
        let side = min_playfield_side();
        assert!(side >= 2.0 * 90.0 + 2.0 * PLAYER_RADIUS);
        let settings = Settings {
            width: side,
            height: side,
            ..Default::default()
        }
        .validated();
        assert_eq!((settings.width, settings.height), (side, side));
    }

    #[test]
    fn test_save_then_load() {
        let path = scratch_file("save");
        let settings = Settings {
            width: 1024.0,
            seed: Some(7),
            muted: true,
            ..Default::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path), settings);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_muted_volume() {
        let settings = Settings {
            muted: true,
            ..Default::default()
        };
        assert_eq!(settings.effective_volume(), 0.0);
    }
}
