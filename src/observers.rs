//! Event subscribers: leaderboard submission and per-run statistics

use crate::events::{GameEvent, Observer};
use crate::highscores::HighScores;
use crate::settings::HeartProgression;

/// Submits finished runs to the leaderboard
#[derive(Debug)]
pub struct ScoreObserver {
    scores: HighScores,
    /// Rank of the most recent run (None if it didn't place)
    last_rank: Option<usize>,
}

impl ScoreObserver {
    pub fn new(scores: HighScores) -> Self {
        Self {
            scores,
            last_rank: None,
        }
    }

    pub fn scores(&self) -> &HighScores {
        &self.scores
    }

    pub fn last_rank(&self) -> Option<usize> {
        self.last_rank
    }

    /// Best times for `mode`, descending
    pub fn top_scores(&self, n: usize, mode: &str) -> Vec<f64> {
        self.scores.top_scores(n, mode)
    }
}

impl Observer for ScoreObserver {
    fn on_event(&mut self, event: &GameEvent) {
        if let GameEvent::RunEnded { mode, elapsed } = event {
            self.last_rank = self.scores.add_score(mode.name(), *elapsed);
            match self.last_rank {
                Some(rank) => log::info!(
                    "{} run of {} placed #{rank}",
                    mode.name(),
                    crate::format_seconds(*elapsed)
                ),
                None => log::info!(
                    "{} run of {} did not place",
                    mode.name(),
                    crate::format_seconds(*elapsed)
                ),
            }
        }
    }
}

/// In-run counters for the HUD; never persisted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsObserver {
    pub hearts_restored: u32,
    pub projectiles_dodged: u32,
    pub hits_taken: u32,
}

impl StatsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called when a run starts (not at game over, so the summary survives)
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Dodge count at which the next heart is due
    pub fn next_heart_at(&self, progression: &HeartProgression) -> u32 {
        progression.next_heart_at(self.hearts_restored)
    }

    /// Whether the dodge count has reached the next heart milestone
    pub fn heart_due(&self, progression: &HeartProgression) -> bool {
        self.projectiles_dodged >= self.next_heart_at(progression)
    }
}

impl Observer for StatsObserver {
    fn on_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::ProjectileDodged { .. } => self.projectiles_dodged += 1,
            GameEvent::HeartRestored { .. } => self.hearts_restored += 1,
            GameEvent::PlayerHit { .. } => self.hits_taken += 1,
            GameEvent::RunEnded { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{GameMode, ProjectileKind};

    fn dodged() -> GameEvent {
        GameEvent::ProjectileDodged {
            kind: ProjectileKind::Straight,
        }
    }

    #[test]
    fn test_stats_reset_then_dodge() {
        let mut stats = StatsObserver::new();
        stats.on_event(&dodged());
        stats.on_event(&GameEvent::HeartRestored { health: 2 });
        stats.on_event(&GameEvent::PlayerHit {
            kind: ProjectileKind::Dart,
            damage: 1,
            health: 1,
        });
        assert_eq!(stats.hits_taken, 1);
        stats.reset();
        assert_eq!(stats.hearts_restored, 0);
        assert_eq!(stats.hits_taken, 0);
        assert_eq!(stats.projectiles_dodged, 0);

        stats.on_event(&dodged());
        assert_eq!(stats.projectiles_dodged, 1);
    }

    #[test]
    fn test_stats_ignore_run_end() {
        let mut stats = StatsObserver::new();
        stats.on_event(&dodged());
        stats.on_event(&GameEvent::RunEnded {
            mode: GameMode::Normal,
            elapsed: 4.0,
        });
        assert_eq!(stats.projectiles_dodged, 1);
    }

    #[test]
    fn test_heart_due() {
        let progression = HeartProgression::default();
        let mut stats = StatsObserver::new();
        stats.projectiles_dodged = 74;
        assert!(!stats.heart_due(&progression));
        stats.projectiles_dodged = 75;
        assert!(stats.heart_due(&progression));
        stats.hearts_restored = 1;
        assert_eq!(stats.next_heart_at(&progression), 300);
        assert!(!stats.heart_due(&progression));
    }

    #[test]
    fn test_score_observer_submits_run() {
        let mut observer = ScoreObserver::new(HighScores::new(5));
        observer.on_event(&GameEvent::RunEnded {
            mode: GameMode::Nightmare,
            elapsed: 42.0,
        });
        assert_eq!(observer.last_rank(), Some(1));
        assert_eq!(observer.scores().top_score("nightmare"), Some(42.0));
        assert!(observer.scores().path().is_none());
        assert_eq!(observer.top_scores(5, "nightmare"), vec![42.0]);
        assert!(observer.top_scores(5, "normal").is_empty());

        // Other events are ignored
        observer.on_event(&dodged());
        assert_eq!(observer.top_scores(5, "nightmare"), vec![42.0]);
    }
}
