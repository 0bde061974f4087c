//! Best-time leaderboards, one per game mode
//!
//! Persisted as JSON. Loaded once at startup and written through on every
//! qualifying score: the file is replaced via write-to-temp then rename, so a
//! crash mid-write leaves the previous leaderboard intact.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::LEADERBOARD_SIZE;
use crate::error::PersistError;

/// On-disk layout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ScoreFile {
    /// Mode name -> survival times in seconds, best first
    #[serde(default)]
    scores: BTreeMap<String, Vec<f64>>,
}

/// Per-mode leaderboard
#[derive(Debug, Clone)]
pub struct HighScores {
    /// Backing file (None = memory only)
    path: Option<PathBuf>,
    /// Entries kept per mode
    capacity: usize,
    scores: BTreeMap<String, Vec<f64>>,
    /// In-memory state differs from disk (a write failed)
    dirty: bool,
}

impl Default for HighScores {
    fn default() -> Self {
        Self::new(LEADERBOARD_SIZE)
    }
}

impl HighScores {
    /// Create an empty, memory-only leaderboard
    pub fn new(capacity: usize) -> Self {
        Self {
            path: None,
            capacity: capacity.max(1),
            scores: BTreeMap::new(),
            dirty: false,
        }
    }

    /// Load from `path`; a missing or corrupt file yields an empty leaderboard
    pub fn load(path: impl Into<PathBuf>, capacity: usize) -> Self {
        let path = path.into();
        let mut board = Self::new(capacity);

        match Self::read_file(&path) {
            Ok(Some(file)) => {
                for (mode, times) in file.scores {
                    let times = board.normalized(times);
                    board.scores.insert(mode, times);
                }
                log::info!(
                    "Loaded {} high scores from {}",
                    board.scores.values().map(Vec::len).sum::<usize>(),
                    path.display()
                );
            }
            Ok(None) => log::info!("No high scores found, starting fresh"),
            Err(err) => log::warn!("Ignoring unreadable high scores: {err}"),
        }

        board.path = Some(path);
        board
    }

    fn read_file(path: &Path) -> Result<Option<ScoreFile>, PersistError> {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(PersistError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|source| PersistError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Drop junk values, sort best first, trim to capacity
    fn normalized(&self, mut times: Vec<f64>) -> Vec<f64> {
        times.retain(|t| t.is_finite() && *t > 0.0);
        times.sort_by(|a, b| b.total_cmp(a));
        times.truncate(self.capacity);
        times
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether the last write-through failed
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Check if a time qualifies for the mode's leaderboard
    pub fn qualifies(&self, mode: &str, time: f64) -> bool {
        if !time.is_finite() || time <= 0.0 {
            return false;
        }
        match self.scores.get(mode) {
            Some(entries) if entries.len() >= self.capacity => {
                entries.last().map(|worst| time > *worst).unwrap_or(true)
            }
            _ => true,
        }
    }

    /// Get the rank a time would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, mode: &str, time: f64) -> Option<usize> {
        if !self.qualifies(mode, time) {
            return None;
        }
        let entries = self.scores.get(mode).map(Vec::as_slice).unwrap_or_default();
        let rank = entries.iter().position(|e| time > *e);
        Some(rank.unwrap_or(entries.len()) + 1)
    }

    /// Insert a time (if it qualifies) and write through to disk
    ///
    /// Returns the rank achieved. A failed write is logged and retried on the
    /// next submission; the in-memory leaderboard keeps the new entry.
    pub fn add_score(&mut self, mode: &str, time: f64) -> Option<usize> {
        let rank = self.potential_rank(mode, time);
        if let Some(rank) = rank {
            let entries = self.scores.entry(mode.to_string()).or_default();
            entries.insert(rank - 1, time);
            entries.truncate(self.capacity);
            self.dirty = true;
        }

        if self.dirty {
            self.flush();
        }
        rank
    }

    /// Best times for `mode`, descending, at most `n`
    pub fn top_scores(&self, n: usize, mode: &str) -> Vec<f64> {
        self.scores
            .get(mode)
            .map(|entries| entries.iter().take(n).copied().collect())
            .unwrap_or_default()
    }

    /// Get the best time for a mode (if any)
    pub fn top_score(&self, mode: &str) -> Option<f64> {
        self.scores.get(mode).and_then(|e| e.first().copied())
    }

    pub fn is_empty(&self) -> bool {
        self.scores.values().all(Vec::is_empty)
    }

    fn flush(&mut self) {
        match self.save() {
            Ok(()) => self.dirty = false,
            Err(err) => log::warn!("High scores kept in memory only: {err}"),
        }
    }

    /// Atomically replace the backing file
    pub fn save(&self) -> Result<(), PersistError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let file = ScoreFile {
            scores: self.scores.clone(),
        };
        let json = serde_json::to_string_pretty(&file)?;

        let io_err = |source: std::io::Error| PersistError::Io {
            path: path.clone(),
            source,
        };
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(io_err)?;
        }

        let tmp = tmp_path(path);
        let mut out = File::create(&tmp).map_err(io_err)?;
        out.write_all(json.as_bytes()).map_err(io_err)?;
        out.sync_all().map_err(io_err)?;
        drop(out);
        fs::rename(&tmp, path).map_err(io_err)?;

        log::info!(
            "High scores saved ({} entries)",
            self.scores.values().map(Vec::len).sum::<usize>()
        );
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static COUNTER: AtomicUsize = AtomicUsize::new(0);

    /// Fresh directory under the system temp dir
    fn scratch_dir(label: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "dodging-sim-{}-{}-{}",
            label,
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_top_scores_sorted_and_capped() {
        let mut board = HighScores::new(5);
        for t in [3.0, 9.0, 1.0, 7.0, 5.0, 11.0, 2.0] {
            board.add_score("normal", t);
        }
        let top = board.top_scores(5, "normal");
        assert_eq!(top, vec![11.0, 9.0, 7.0, 5.0, 3.0]);
        // Stable across repeated reads
        assert_eq!(board.top_scores(5, "normal"), top);
        assert_eq!(board.top_scores(2, "normal"), vec![11.0, 9.0]);
        assert!(board.top_scores(5, "nightmare").is_empty());
    }

    #[test]
    fn test_modes_are_independent() {
        let mut board = HighScores::new(5);
        board.add_score("normal", 10.0);
        board.add_score("nightmare", 4.0);
        assert_eq!(board.top_score("normal"), Some(10.0));
        assert_eq!(board.top_score("nightmare"), Some(4.0));
    }

    #[test]
    fn test_rank_and_qualify() {
        let mut board = HighScores::new(3);
        assert_eq!(board.add_score("normal", 5.0), Some(1));
        assert_eq!(board.add_score("normal", 8.0), Some(1));
        assert_eq!(board.add_score("normal", 6.0), Some(2));
        assert!(!board.qualifies("normal", 4.0));
        assert_eq!(board.add_score("normal", 4.0), None);
        assert!(!board.qualifies("normal", 0.0));
        assert!(!board.qualifies("normal", f64::NAN));
    }

    #[test]
    fn test_persist_roundtrip() {
        let dir = scratch_dir("roundtrip");
        let path = dir.join("scores.json");

        let mut board = HighScores::load(&path, 5);
        assert!(board.is_empty());
        board.add_score("normal", 12.5);
        board.add_score("nightmare", 3.25);
        assert!(path.exists());
        assert!(!tmp_path(&path).exists());

        let reloaded = HighScores::load(&path, 5);
        assert_eq!(reloaded.path(), Some(path.as_path()));
        assert_eq!(reloaded.capacity(), 5);
        assert_eq!(reloaded.top_scores(5, "normal"), vec![12.5]);
        assert_eq!(reloaded.top_scores(5, "nightmare"), vec![3.25]);
    }

    #[test]
    fn test_non_qualifying_leaves_file_untouched() {
        let dir = scratch_dir("untouched");
        let path = dir.join("scores.json");

        let mut board = HighScores::load(&path, 5);
        for t in [10.0, 20.0, 30.0, 40.0, 50.0] {
            board.add_score("normal", t);
        }
        let before = fs::read_to_string(&path).unwrap();

        assert_eq!(board.add_score("normal", 5.0), None);
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
        assert_eq!(board.top_scores(5, "normal"), vec![50.0, 40.0, 30.0, 20.0, 10.0]);
    }

    #[test]
    fn test_corrupt_file_is_empty() {
        let dir = scratch_dir("corrupt");
        let path = dir.join("scores.json");
        fs::write(&path, "{ not json").unwrap();

        let board = HighScores::load(&path, 5);
        assert!(board.is_empty());
    }

    #[test]
    fn test_load_sanitizes_entries() {
        let dir = scratch_dir("sanitize");
        let path = dir.join("scores.json");
        fs::write(
            &path,
            r#"{ "scores": { "normal": [1.0, 9.0, -3.0, 4.0, 2.0, 8.0, 7.0] } }"#,
        )
        .unwrap();

        let board = HighScores::load(&path, 5);
        assert_eq!(board.top_scores(10, "normal"), vec![9.0, 8.0, 7.0, 4.0, 2.0]);
    }

    #[test]
    fn test_failed_write_keeps_memory_and_retries() {
        let dir = scratch_dir("retry");
        // A directory where the file should be makes the rename fail
        let path = dir.join("scores.json");
        fs::create_dir_all(path.join("blocker")).unwrap();

        let mut board = HighScores::load(&path, 5);
        board.add_score("normal", 15.0);
        assert!(board.is_dirty());
        assert_eq!(board.top_scores(5, "normal"), vec![15.0]);

        fs::remove_dir_all(&path).unwrap();
        // A non-qualifying submission still retries the pending write
        board.add_score("normal", -1.0);
        assert!(!board.is_dirty());
        let reloaded = HighScores::load(&path, 5);
        assert_eq!(reloaded.top_scores(5, "normal"), vec![15.0]);
    }
}
