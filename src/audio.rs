//! Sound cue boundary
//!
//! The core fires cues and forgets them. Playback lives behind `SoundSink`;
//! a sink that fails is logged at debug level and otherwise ignored.

use crate::error::AudioError;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    /// Player took damage
    Hit,
    /// A hazard left the playfield
    Dodge,
    /// Every `DODGE_MILESTONE` dodges
    DodgeMilestone,
    /// Nightmare heart restored
    HeartRestored,
    /// Run over
    GameOver,
    /// Run placed on the leaderboard
    HighScore,
    /// Menu navigation
    MenuSelect,
}

impl SoundCue {
    /// Asset name for the cue
    pub fn name(&self) -> &'static str {
        match self {
            SoundCue::Hit => "hit",
            SoundCue::Dodge => "dodge",
            SoundCue::DodgeMilestone => "dodge-milestone",
            SoundCue::HeartRestored => "heart",
            SoundCue::GameOver => "game-over",
            SoundCue::HighScore => "high-score",
            SoundCue::MenuSelect => "menu-select",
        }
    }
}

/// Something that can play cues
pub trait SoundSink {
    fn play(&mut self, cue: SoundCue, volume: f32) -> Result<(), AudioError>;
}

/// Sink that plays nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSink;

impl SoundSink for SilentSink {
    fn play(&mut self, _cue: SoundCue, _volume: f32) -> Result<(), AudioError> {
        Ok(())
    }
}

/// Fire a cue, swallowing failures
pub fn trigger(sink: &mut dyn SoundSink, cue: SoundCue, volume: f32) {
    if volume <= 0.0 {
        return;
    }
    if let Err(err) = sink.play(cue, volume) {
        log::debug!("Dropped sound cue '{}': {err}", cue.name());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl SoundSink for Broken {
        fn play(&mut self, _cue: SoundCue, _volume: f32) -> Result<(), AudioError> {
            Err(AudioError("no device".to_string()))
        }
    }

    #[test]
    fn test_failed_cue_is_ignored() {
        trigger(&mut Broken, SoundCue::Hit, 1.0);
        trigger(&mut SilentSink, SoundCue::Hit, 1.0);
    }
}
