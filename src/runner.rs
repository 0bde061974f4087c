//! Fixed-cadence driver
//!
//! Each iteration waits out the rest of the frame budget, measures the real
//! delta, drains a batch of decoded input, ticks the game and hands the result
//! to the renderer. Time comes from a `Clock` so tests can step it by hand.

use std::collections::VecDeque;
use std::thread;
use std::time::{Duration, Instant};

use crate::consts::{MAX_FRAME_DT, TARGET_FPS};
use crate::game::Game;
use crate::input::InputEvent;
use crate::render::Renderer;

/// Monotonic time source
pub trait Clock {
    /// Time since an arbitrary fixed origin
    fn now(&self) -> Duration;
    /// Block for `duration`
    fn sleep(&mut self, duration: Duration);
}

/// Wall clock backed by `Instant`
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Clock that only moves when told to (sleeping advances it)
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualClock {
    now: Duration,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, duration: Duration) {
        self.now += duration;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now
    }

    fn sleep(&mut self, duration: Duration) {
        self.now += duration;
    }
}

/// Caps the tick rate, like a game-library frame clock
#[derive(Debug, Clone, Copy)]
pub struct FrameLimiter {
    frame_time: Duration,
    last: Option<Duration>,
}

impl FrameLimiter {
    pub fn new(target_fps: u32) -> Self {
        Self {
            frame_time: Duration::from_secs(1) / target_fps.max(1),
            last: None,
        }
    }

    /// Sleep until the frame budget is used up; returns seconds since the last tick
    ///
    /// Long stalls are clamped to `MAX_FRAME_DT` so a hiccup cannot tunnel
    /// hazards through the player.
    pub fn tick(&mut self, clock: &mut dyn Clock) -> f32 {
        let Some(last) = self.last else {
            self.last = Some(clock.now());
            return self.frame_time.as_secs_f32();
        };

        let spent = clock.now().saturating_sub(last);
        if spent < self.frame_time {
            clock.sleep(self.frame_time - spent);
        }

        let now = clock.now();
        self.last = Some(now);
        now.saturating_sub(last).as_secs_f32().min(MAX_FRAME_DT)
    }
}

/// Where decoded input batches come from
pub trait InputSource {
    /// Everything that arrived since the last poll
    fn poll(&mut self) -> Vec<InputEvent>;
}

/// Replays pre-recorded batches, one per frame, then goes quiet
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    batches: VecDeque<Vec<InputEvent>>,
}

impl ScriptedInput {
    pub fn new(batches: impl IntoIterator<Item = Vec<InputEvent>>) -> Self {
        Self {
            batches: batches.into_iter().collect(),
        }
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> Vec<InputEvent> {
        self.batches.pop_front().unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub target_fps: u32,
    /// Stop after this many frames (None = until quit)
    pub max_frames: Option<u64>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            target_fps: TARGET_FPS,
            max_frames: None,
        }
    }
}

/// Run until the session stops (or `max_frames` is reached); returns frames run
pub fn run(
    game: &mut Game,
    clock: &mut dyn Clock,
    input: &mut dyn InputSource,
    renderer: &mut dyn Renderer,
    config: &LoopConfig,
) -> u64 {
    let mut limiter = FrameLimiter::new(config.target_fps);
    let mut frames = 0u64;

    while game.is_running() {
        if config.max_frames.is_some_and(|max| frames >= max) {
            break;
        }
        let dt = limiter.tick(clock);
        let inputs = input.poll();
        game.tick(dt, &inputs);
        frames += 1;

        if !game.is_running() {
            break;
        }
        match game.frame() {
            Ok(frame) => renderer.render(&frame),
            Err(err) => log::error!("Skipping render: {err}"),
        }
    }

    log::info!("Loop finished after {frames} frames");
    frames
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SilentSink;
    use crate::game::{GameSession, Screen};
    use crate::highscores::HighScores;
    use crate::render::{RenderFrame, Scene};
    use crate::settings::Settings;

    #[derive(Default)]
    struct Recording {
        frames: Vec<RenderFrame>,
    }

    impl Renderer for Recording {
        fn render(&mut self, frame: &RenderFrame) {
            self.frames.push(frame.clone());
        }
    }

    fn game() -> Game {
        let settings = Settings {
            seed: Some(99),
            background_image: None,
            ..Default::default()
        };
        Game::new(
            GameSession::new(),
            settings,
            HighScores::new(5),
            Box::new(SilentSink),
        )
    }

    #[test]
    fn test_limiter_paces_manual_clock() {
        let mut clock = ManualClock::new();
        let mut limiter = FrameLimiter::new(60);
        limiter.tick(&mut clock);
        for _ in 0..10 {
            let dt = limiter.tick(&mut clock);
            assert!((dt - 1.0 / 60.0).abs() < 1e-4);
        }
        assert!((clock.now().as_secs_f32() - 10.0 / 60.0).abs() < 1e-3);
    }

    #[test]
    fn test_limiter_reports_slow_frames_and_clamps() {
        let mut clock = ManualClock::new();
        let mut limiter = FrameLimiter::new(60);
        limiter.tick(&mut clock);

        clock.advance(Duration::from_millis(50));
        assert!((limiter.tick(&mut clock) - 0.05).abs() < 1e-4);

        clock.advance(Duration::from_secs(3));
        assert_eq!(limiter.tick(&mut clock), MAX_FRAME_DT);
    }

    #[test]
    fn test_run_until_quit() {
        let mut g = game();
        let mut clock = ManualClock::new();
        let mut input = ScriptedInput::new(vec![
            vec![InputEvent::Start],
            vec![],
            vec![],
            vec![InputEvent::Quit],
        ]);
        let mut renderer = Recording::default();

        let frames = run(
            &mut g,
            &mut clock,
            &mut input,
            &mut renderer,
            &LoopConfig::default(),
        );

        assert_eq!(frames, 4);
        assert_eq!(renderer.frames.len(), 3);
        assert!(matches!(renderer.frames[0].scene, Scene::Playing { .. }));
        assert!(!g.is_running());
        assert_eq!(g.screen(), Screen::Playing);
    }

    #[test]
    fn test_run_respects_max_frames() {
        let mut g = game();
        let mut clock = ManualClock::new();
        let mut input = ScriptedInput::new(vec![vec![InputEvent::Start]]);
        let mut renderer = Recording::default();
        let config = LoopConfig {
            max_frames: Some(120),
            ..Default::default()
        };

        let frames = run(&mut g, &mut clock, &mut input, &mut renderer, &config);

        assert_eq!(frames, 120);
        // Normal mode spawns at most one single-damage hazard in two seconds,
        // so the three-heart run is still going
        assert_eq!(g.screen(), Screen::Playing);
        let elapsed = g.world().map(|w| w.elapsed).unwrap_or_default();
        assert!((elapsed - 2.0).abs() < 1e-3, "elapsed {elapsed}");
        assert_eq!(renderer.frames.len(), 120);
    }
}
