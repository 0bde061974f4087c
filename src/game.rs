//! Screen state machine and the per-process game context
//!
//! `Game` owns everything a session needs: the active difficulty, the event
//! bus and its observers, the current run's `World` and the RNG. The loop feeds
//! it decoded input plus a timestep via `tick`, then asks for a `frame`.
//!
//! Screens: Menu -> Playing -> GameOver -> (Playing | Menu), and
//! Menu <-> HallOfFame. There is no terminal screen; the loop stops when the
//! session's `running` flag is cleared.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::audio::{self, SoundCue, SoundSink};
use crate::consts::DODGE_MILESTONE;
use crate::error::{ModeError, SimError};
use crate::events::{EventManager, GameEvent, ObserverHandle};
use crate::highscores::HighScores;
use crate::input::InputEvent;
use crate::observers::{ScoreObserver, StatsObserver};
use crate::render::{
    Background, HeartProgress, Hud, LeaderboardView, PlayerView, ProjectileView, RenderFrame,
    RunSummary, Scene, WarningView,
};
use crate::settings::Settings;
use crate::sim::{Bounds, GameMode, GameModeContext, ObjectFactory, World};

/// Seed from the wall clock
fn clock_seed() -> u64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    fold_nanos(nanos)
}

/// Fold a 128-bit nanosecond count into 64 bits without dropping the high half
fn fold_nanos(nanos: u128) -> u64 {
    (nanos as u64) ^ ((nanos >> 64) as u64)
}

/// Which screen is active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Playing,
    GameOver,
    HallOfFame,
}

/// Process-wide session record
///
/// Create exactly one per process, at startup, and move it into `Game::new`.
/// Nothing else holds a copy; components that need it go through `Game`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSession {
    mode: GameMode,
    running: bool,
}

impl GameSession {
    pub fn new() -> Self {
        Self {
            mode: GameMode::default(),
            running: true,
        }
    }

    pub fn mode_name(&self) -> &'static str {
        self.mode.name()
    }

    /// Whether the outer loop should keep going
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn stop(&mut self) {
        self.running = false;
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Game {
    settings: Settings,
    session: GameSession,
    screen: Screen,
    paused: bool,
    modes: GameModeContext,
    events: EventManager,
    scores: Rc<RefCell<ScoreObserver>>,
    stats: Rc<RefCell<StatsObserver>>,
    /// Live run; Some only while Playing
    world: Option<World>,
    /// Survival time of the last finished run
    final_score: Option<f64>,
    rng: Pcg32,
    audio: Box<dyn SoundSink>,
    background: Background,
}

impl Game {
    pub fn new(
        session: GameSession,
        settings: Settings,
        scores: HighScores,
        audio: Box<dyn SoundSink>,
    ) -> Self {
        let settings = settings.validated();
        let seed = settings.seed.unwrap_or_else(clock_seed);
        log::info!("Session seed: {seed}");

        let bounds = Bounds::new(settings.width, settings.height);
        let modes = GameModeContext::new(
            session.mode,
            ObjectFactory::new(bounds, settings.player_speed),
        );

        let scores = Rc::new(RefCell::new(ScoreObserver::new(scores)));
        let stats = Rc::new(RefCell::new(StatsObserver::new()));
        let mut events = EventManager::new();
        events.attach(Rc::clone(&scores) as ObserverHandle);
        events.attach(Rc::clone(&stats) as ObserverHandle);

        let background =
            Background::resolve(settings.background_image.as_deref(), settings.background_color);

        Self {
            settings,
            session,
            screen: Screen::Menu,
            paused: false,
            modes,
            events,
            scores,
            stats,
            world: None,
            final_score: None,
            rng: Pcg32::seed_from_u64(seed),
            audio,
            background,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn is_running(&self) -> bool {
        self.session.is_running()
    }

    pub fn mode(&self) -> GameMode {
        self.modes.mode()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn world(&self) -> Option<&World> {
        self.world.as_ref()
    }

    pub fn final_score(&self) -> Option<f64> {
        self.final_score
    }

    /// Snapshot of the current run's counters
    pub fn stats(&self) -> StatsObserver {
        self.stats.borrow().clone()
    }

    pub fn top_scores(&self, n: usize, mode: &str) -> Vec<f64> {
        self.scores.borrow().top_scores(n, mode)
    }

    /// Subscribe an extra observer to game events
    pub fn attach_observer(&mut self, observer: ObserverHandle) {
        self.events.attach(observer);
    }

    /// Switch difficulty by name
    ///
    /// Unknown names and switches during a run are rejected; the previous mode
    /// stays active.
    pub fn set_game_mode(&mut self, name: &str) -> Result<(), ModeError> {
        let mode = GameMode::from_name(name)?;
        self.modes.set_strategy(mode)?;
        self.session.mode = mode;
        Ok(())
    }

    /// One loop iteration: apply input, then advance the active screen
    pub fn tick(&mut self, dt: f32, inputs: &[InputEvent]) {
        for input in inputs {
            self.handle_event(input);
        }
        self.update(dt);
    }

    /// Route an input to the active screen; irrelevant input is ignored
    pub fn handle_event(&mut self, input: &InputEvent) {
        if *input == InputEvent::Quit {
            log::info!("Quit requested");
            self.session.stop();
            return;
        }

        let next = match (self.screen, input) {
            (Screen::Menu, InputEvent::Start) => Some(Screen::Playing),
            (Screen::Menu, InputEvent::ViewScores) => Some(Screen::HallOfFame),
            (Screen::Menu, InputEvent::SelectMode(name)) => {
                match self.set_game_mode(name) {
                    Ok(()) => self.play(SoundCue::MenuSelect),
                    Err(err) => log::warn!("{err}; staying in {} mode", self.mode().name()),
                }
                None
            }
            (Screen::HallOfFame, InputEvent::Back) => Some(Screen::Menu),
            (Screen::Playing, InputEvent::Pause) => {
                self.paused = !self.paused;
                log::info!("{}", if self.paused { "Paused" } else { "Resumed" });
                None
            }
            (Screen::Playing, InputEvent::Move(dir)) => {
                if let Some(world) = self.world.as_mut() {
                    world.player.move_dir = *dir;
                }
                None
            }
            (Screen::GameOver, InputEvent::Restart) => Some(Screen::Playing),
            (Screen::GameOver, InputEvent::Back) => Some(Screen::Menu),
            _ => None,
        };

        if let Some(next) = next {
            self.transition(next);
        }
    }

    fn transition(&mut self, next: Screen) {
        log::debug!("Screen {:?} -> {:?}", self.screen, next);
        match next {
            Screen::Playing => self.initialize_game(),
            Screen::GameOver => self.finish_run(),
            Screen::Menu => {
                self.world = None;
                self.modes.end_run();
            }
            Screen::HallOfFame => {}
        }
        self.screen = next;
    }

    /// Fresh run with the active mode
    pub fn initialize_game(&mut self) {
        self.stats.borrow_mut().reset();
        let player = self.modes.create_player();
        let bounds = Bounds::new(self.settings.width, self.settings.height);
        self.world = Some(World::new(bounds, player));
        self.paused = false;
        self.final_score = None;
        self.modes.begin_run();
        log::info!(
            "Run started ({}, spawn every {:?})",
            self.modes.get_mode_name(),
            self.modes.get_spawn_interval(0.0)
        );
    }

    /// Close out the live run and submit it; runs at most once per run
    fn finish_run(&mut self) {
        let Some(world) = self.world.take() else {
            log::error!("{}", SimError::Invariant("game over without a live run"));
            return;
        };
        let elapsed = world.elapsed as f64;
        self.final_score = Some(elapsed);
        log::info!("Run ended after {}", crate::format_seconds(elapsed));
        self.dispatch(&GameEvent::RunEnded {
            mode: self.modes.mode(),
            elapsed,
        });
    }

    /// Advance the active screen by `dt` seconds
    pub fn update(&mut self, dt: f32) {
        if self.screen != Screen::Playing {
            return;
        }
        if let Err(err) = self.update_playing(dt) {
            log::error!("Tick aborted: {err}");
        }
    }

    fn update_playing(&mut self, dt: f32) -> Result<(), SimError> {
        if self.paused {
            return Ok(());
        }
        let world = self
            .world
            .as_mut()
            .ok_or(SimError::Invariant("playing without a live run"))?;
        let events = world.step(dt, &mut self.modes, &mut self.rng);
        for event in &events {
            self.dispatch(event);
        }

        let dead = self.world.as_ref().is_some_and(|w| w.player.is_dead());
        if dead {
            self.transition(Screen::GameOver);
            return Ok(());
        }
        self.restore_heart()
    }

    /// Nightmare: hand back a heart once the dodge milestone is reached
    fn restore_heart(&mut self) -> Result<(), SimError> {
        let Some(progression) = self.modes.heart_progression(self.settings.heart_progression)
        else {
            return Ok(());
        };
        if !self.stats.borrow().heart_due(&progression) {
            return Ok(());
        }
        let world = self
            .world
            .as_mut()
            .ok_or(SimError::Invariant("heart restore without a live run"))?;
        world.player.restore_heart()?;
        let health = world.player.health;
        self.dispatch(&GameEvent::HeartRestored { health });
        Ok(())
    }

    /// Publish to observers, then fire the matching sound cue
    fn dispatch(&mut self, event: &GameEvent) {
        self.events.publish(event);
        match event {
            GameEvent::PlayerHit { .. } => self.play(SoundCue::Hit),
            GameEvent::ProjectileDodged { .. } => {
                let dodged = self.stats.borrow().projectiles_dodged;
                if dodged > 0 && dodged % DODGE_MILESTONE == 0 {
                    self.play(SoundCue::DodgeMilestone);
                } else {
                    self.play(SoundCue::Dodge);
                }
            }
            GameEvent::HeartRestored { .. } => self.play(SoundCue::HeartRestored),
            GameEvent::RunEnded { .. } => {
                self.play(SoundCue::GameOver);
                if self.scores.borrow().last_rank().is_some() {
                    self.play(SoundCue::HighScore);
                }
            }
        }
    }

    fn play(&mut self, cue: SoundCue) {
        audio::trigger(self.audio.as_mut(), cue, self.settings.effective_volume());
    }

    fn leaderboard(&self, mode: GameMode) -> LeaderboardView {
        LeaderboardView {
            mode: mode.name(),
            title: mode.title(),
            entries: self.top_scores(self.settings.leaderboard_size, mode.name()),
        }
    }

    /// Draw request for the current screen
    pub fn frame(&self) -> Result<RenderFrame, SimError> {
        let scene = match self.screen {
            Screen::Menu => Scene::Menu {
                selected_mode: self.modes.get_mode_name(),
            },
            Screen::HallOfFame => Scene::HallOfFame {
                leaderboards: GameMode::ALL.iter().map(|m| self.leaderboard(*m)).collect(),
            },
            Screen::GameOver => {
                let stats = self.stats.borrow();
                Scene::GameOver {
                    summary: RunSummary {
                        final_score: self.final_score.unwrap_or_default(),
                        projectiles_dodged: stats.projectiles_dodged,
                        hearts_restored: stats.hearts_restored,
                        hits_taken: stats.hits_taken,
                        rank: self.scores.borrow().last_rank(),
                    },
                    leaderboard: self.leaderboard(self.modes.mode()),
                }
            }
            Screen::Playing => {
                let world = self
                    .world
                    .as_ref()
                    .ok_or(SimError::Invariant("playing without a live run"))?;
                self.playing_scene(world)
            }
        };

        Ok(RenderFrame {
            background: self.background.clone(),
            scene,
        })
    }

    fn playing_scene(&self, world: &World) -> Scene {
        let stats = self.stats.borrow();
        let heart_progress = self
            .modes
            .heart_progression(self.settings.heart_progression)
            .map(|p| HeartProgress {
                dodged: stats.projectiles_dodged,
                next_heart_at: stats.next_heart_at(&p),
            });

        Scene::Playing {
            player: PlayerView {
                sprite: "player",
                pos: world.player.pos,
                radius: world.player.radius,
                health: world.player.health,
            },
            projectiles: world
                .projectiles
                .iter()
                .map(|p| ProjectileView {
                    sprite: p.kind.sprite(),
                    kind: p.kind,
                    pos: p.pos,
                })
                .collect(),
            warnings: world
                .warnings
                .iter()
                .map(|w| WarningView {
                    kind: w.kind,
                    pos: w.target,
                    remaining: w.remaining,
                    progress: w.progress(),
                })
                .collect(),
            hud: Hud {
                health: world.player.health.max(0),
                max_health: world.player.max_health,
                elapsed: world.elapsed as f64,
                mode: self.modes.get_mode_name(),
                paused: self.paused,
                heart_progress,
            },
        }
    }
}
