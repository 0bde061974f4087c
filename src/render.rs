//! Draw requests handed to the renderer
//!
//! The core describes what to show each frame; how pixels get produced is the
//! renderer's business.

use std::path::{Path, PathBuf};

use glam::Vec2;

use crate::sim::ProjectileKind;

/// What to paint behind everything else
#[derive(Debug, Clone, PartialEq)]
pub enum Background {
    Image(PathBuf),
    SolidColor([u8; 3]),
}

impl Background {
    /// Use the image if it exists, otherwise fall back to a flat colour
    pub fn resolve(image: Option<&Path>, fallback: [u8; 3]) -> Self {
        match image {
            Some(path) if path.is_file() => Background::Image(path.to_path_buf()),
            Some(path) => {
                log::warn!(
                    "Could not load background image from {}, using solid colour",
                    path.display()
                );
                Background::SolidColor(fallback)
            }
            None => Background::SolidColor(fallback),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerView {
    pub sprite: &'static str,
    pub pos: Vec2,
    pub radius: f32,
    pub health: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectileView {
    pub sprite: &'static str,
    pub kind: ProjectileKind,
    pub pos: Vec2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WarningView {
    pub kind: ProjectileKind,
    pub pos: Vec2,
    /// Seconds until the hazard fires
    pub remaining: f32,
    /// 0..1, for flashing faster as it nears
    pub progress: f32,
}

/// Nightmare-only HUD line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartProgress {
    pub dodged: u32,
    pub next_heart_at: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hud {
    /// Clamped at zero for display
    pub health: i32,
    pub max_health: i32,
    pub elapsed: f64,
    pub mode: &'static str,
    pub paused: bool,
    pub heart_progress: Option<HeartProgress>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardView {
    pub mode: &'static str,
    pub title: &'static str,
    /// Best first
    pub entries: Vec<f64>,
}

/// Final-run summary for the game over screen
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub final_score: f64,
    pub projectiles_dodged: u32,
    pub hearts_restored: u32,
    pub hits_taken: u32,
    /// Leaderboard placement, if any
    pub rank: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Scene {
    Menu {
        selected_mode: &'static str,
    },
    Playing {
        player: PlayerView,
        projectiles: Vec<ProjectileView>,
        warnings: Vec<WarningView>,
        hud: Hud,
    },
    GameOver {
        summary: RunSummary,
        leaderboard: LeaderboardView,
    },
    HallOfFame {
        leaderboards: Vec<LeaderboardView>,
    },
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub background: Background,
    pub scene: Scene,
}

/// Something that can draw frames
pub trait Renderer {
    fn render(&mut self, frame: &RenderFrame);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_background_falls_back() {
        let bg = Background::resolve(Some(Path::new("/no/such/background.png")), [1, 2, 3]);
        assert_eq!(bg, Background::SolidColor([1, 2, 3]));
        assert_eq!(Background::resolve(None, [0, 0, 0]), Background::SolidColor([0, 0, 0]));
    }
}
