//! Dodging Sim entry point
//!
//! Headless driver: loads settings and scores, then lets a simple autopilot
//! play a few runs while a logging renderer reports what would be drawn.
//!
//! Usage: `dodging-sim [settings.json] [--mode NAME] [--runs N] [--fast]`

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use glam::Vec2;

use dodging_sim::audio::SilentSink;
use dodging_sim::input::InputEvent;
use dodging_sim::render::{RenderFrame, Renderer, Scene};
use dodging_sim::runner::{self, Clock, InputSource, LoopConfig, ManualClock, SystemClock};
use dodging_sim::{Game, GameSession, HighScores, Settings, format_seconds};

/// Hard stop for a headless session (ten minutes of simulated time)
const MAX_FRAMES: u64 = 60 * 60 * 10;

/// How close a hazard has to be before the autopilot reacts
const DANGER_RADIUS: f32 = 160.0;

struct Args {
    settings: Option<PathBuf>,
    mode: Option<String>,
    runs: u32,
    fast: bool,
}

fn parse_args() -> Args {
    let mut args = Args {
        settings: None,
        mode: None,
        runs: 3,
        fast: false,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--mode" => args.mode = iter.next(),
            "--runs" => match iter.next().map(|n| n.parse::<u32>()) {
                Some(Ok(n)) => args.runs = n.max(1),
                _ => log::warn!("--runs expects a positive number, keeping {}", args.runs),
            },
            "--fast" => args.fast = true,
            other => args.settings = Some(PathBuf::from(other)),
        }
    }
    args
}

/// Last frame handed to the renderer, shared with the autopilot
type SharedFrame = Rc<RefCell<Option<RenderFrame>>>;

/// Logs scene changes and a once-per-second HUD line
struct LogRenderer {
    last: SharedFrame,
    last_logged_second: Option<u64>,
}

impl Renderer for LogRenderer {
    fn render(&mut self, frame: &RenderFrame) {
        let previous = self.last.borrow_mut().replace(frame.clone());
        let changed = previous
            .map(|p| std::mem::discriminant(&p.scene) != std::mem::discriminant(&frame.scene))
            .unwrap_or(true);

        match &frame.scene {
            Scene::Menu { selected_mode } if changed => {
                log::info!("[menu] mode: {selected_mode}");
            }
            Scene::Playing {
                projectiles,
                warnings,
                hud,
                ..
            } => {
                let second = hud.elapsed as u64;
                if changed || self.last_logged_second != Some(second) {
                    self.last_logged_second = Some(second);
                    let hearts = hud
                        .heart_progress
                        .map(|p| format!(" | dodged {}/{}", p.dodged, p.next_heart_at))
                        .unwrap_or_default();
                    log::info!(
                        "[{}] {} | health {}/{} | {} hazards, {} warnings{hearts}",
                        hud.mode,
                        format_seconds(hud.elapsed),
                        hud.health,
                        hud.max_health,
                        projectiles.len(),
                        warnings.len()
                    );
                }
            }
            Scene::GameOver {
                summary,
                leaderboard,
            } if changed => {
                log::info!(
                    "[game over] survived {} | dodged {} | hit {} | hearts {}",
                    format_seconds(summary.final_score),
                    summary.projectiles_dodged,
                    summary.hits_taken,
                    summary.hearts_restored
                );
                if let Some(rank) = summary.rank {
                    log::info!("New high score! Rank #{rank}");
                }
                for (i, time) in leaderboard.entries.iter().enumerate() {
                    log::info!("  {}. {}", i + 1, format_seconds(*time));
                }
            }
            Scene::HallOfFame { leaderboards } if changed => {
                for board in leaderboards {
                    let times: Vec<String> =
                        board.entries.iter().map(|t| format_seconds(*t)).collect();
                    log::info!("[hall of fame] {}: {}", board.title, times.join(", "));
                }
            }
            _ => {}
        }
    }
}

/// Plays by steering away from nearby hazards and back towards the middle
struct Autopilot {
    last: SharedFrame,
    mode: Option<String>,
    centre: Vec2,
    runs_left: u32,
    started: bool,
    in_game_over: bool,
}

impl Autopilot {
    fn steer(player: Vec2, hazards: impl Iterator<Item = Vec2>, centre: Vec2) -> Vec2 {
        let mut push = Vec2::ZERO;
        for pos in hazards {
            let away = player - pos;
            let dist = away.length();
            if dist < DANGER_RADIUS && dist > f32::EPSILON {
                push += away / dist * (DANGER_RADIUS - dist) / DANGER_RADIUS;
            }
        }
        if push.length_squared() < 0.01 {
            // Drift home so the walls don't pin us
            push = (centre - player) / DANGER_RADIUS;
        }
        if push.length_squared() < 0.01 {
            Vec2::ZERO
        } else {
            push.normalize_or_zero()
        }
    }
}

impl InputSource for Autopilot {
    fn poll(&mut self) -> Vec<InputEvent> {
        let frame = self.last.borrow();
        let Some(frame) = frame.as_ref() else {
            return Vec::new();
        };

        match &frame.scene {
            Scene::Menu { .. } if !self.started => {
                self.started = true;
                let mut events = Vec::new();
                if let Some(mode) = self.mode.take() {
                    events.push(InputEvent::SelectMode(mode));
                }
                events.push(InputEvent::Start);
                events
            }
            Scene::Menu { .. } => vec![InputEvent::ViewScores],
            Scene::HallOfFame { .. } => vec![InputEvent::Quit],
            Scene::Playing {
                player,
                projectiles,
                warnings,
                ..
            } => {
                self.in_game_over = false;
                let hazards = projectiles
                    .iter()
                    .map(|p| p.pos)
                    .chain(warnings.iter().map(|w| w.pos));
                vec![InputEvent::Move(Self::steer(player.pos, hazards, self.centre))]
            }
            Scene::GameOver { .. } if self.in_game_over => Vec::new(),
            Scene::GameOver { .. } => {
                self.in_game_over = true;
                self.runs_left = self.runs_left.saturating_sub(1);
                if self.runs_left > 0 {
                    vec![InputEvent::Restart]
                } else {
                    vec![InputEvent::Back]
                }
            }
        }
    }
}

fn main() {
    env_logger::init();
    log::info!("Dodging Sim (headless) starting...");

    let args = parse_args();
    let settings = match &args.settings {
        Some(path) => Settings::load(path),
        None => Settings::default(),
    };
    let scores = HighScores::load(&settings.score_file, settings.leaderboard_size);

    let last: SharedFrame = Rc::new(RefCell::new(None));
    let mut renderer = LogRenderer {
        last: Rc::clone(&last),
        last_logged_second: None,
    };
    let mut autopilot = Autopilot {
        last: Rc::clone(&last),
        mode: args.mode,
        centre: Vec2::new(settings.width, settings.height) / 2.0,
        runs_left: args.runs,
        started: false,
        in_game_over: false,
    };

    let config = LoopConfig {
        target_fps: settings.target_fps,
        max_frames: Some(MAX_FRAMES),
    };
    let mut game = Game::new(GameSession::new(), settings, scores, Box::new(SilentSink));

    // Prime the shared frame so the autopilot sees the menu on its first poll
    if let Ok(frame) = game.frame() {
        renderer.render(&frame);
    }

    let mut clock: Box<dyn Clock> = if args.fast {
        Box::new(ManualClock::new())
    } else {
        Box::new(SystemClock::new())
    };
    let frames = runner::run(
        &mut game,
        clock.as_mut(),
        &mut autopilot,
        &mut renderer,
        &config,
    );
    log::info!(
        "Session over after {frames} frames ({})",
        game.session().mode_name()
    );
}
