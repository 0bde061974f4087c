//! In-process event bus
//!
//! Publishing is synchronous: every attached observer handles the event to
//! completion, in attachment order, before `publish` returns. There is no
//! per-kind filtering; observers ignore what they do not care about.
//!
//! Observers must not publish or attach from inside `on_event`. The bus holds a
//! `RefCell` borrow on each observer while it runs, so re-entrant use panics
//! rather than silently reordering delivery.

use std::cell::RefCell;
use std::rc::Rc;

use crate::sim::{GameMode, ProjectileKind};

/// Event discriminant, for logging and matching without payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ProjectileDodged,
    PlayerHit,
    HeartRestored,
    RunEnded,
}

/// Domain events raised by the simulation
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// A hazard left the playfield without touching the player
    ProjectileDodged { kind: ProjectileKind },
    /// A hazard hit the player; `health` is what remains afterwards
    PlayerHit {
        kind: ProjectileKind,
        damage: i32,
        health: i32,
    },
    /// A dodge milestone restored a heart
    HeartRestored { health: i32 },
    /// The run is over
    RunEnded { mode: GameMode, elapsed: f64 },
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::ProjectileDodged { .. } => EventKind::ProjectileDodged,
            GameEvent::PlayerHit { .. } => EventKind::PlayerHit,
            GameEvent::HeartRestored { .. } => EventKind::HeartRestored,
            GameEvent::RunEnded { .. } => EventKind::RunEnded,
        }
    }
}

/// Something that wants to hear about game events
pub trait Observer {
    fn on_event(&mut self, event: &GameEvent);
}

/// Shared handle to an attached observer
pub type ObserverHandle = Rc<RefCell<dyn Observer>>;

/// Ordered list of subscribers
#[derive(Default)]
pub struct EventManager {
    observers: Vec<ObserverHandle>,
}

impl EventManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe an observer; it receives every event published from now on
    pub fn attach(&mut self, observer: ObserverHandle) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Deliver `event` to every observer in attachment order
    pub fn publish(&self, event: &GameEvent) {
        log::trace!("Publishing {:?} to {} observers", event.kind(), self.observers.len());
        for observer in &self.observers {
            observer.borrow_mut().on_event(event);
        }
    }
}

impl std::fmt::Debug for EventManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventManager")
            .field("observers", &self.observers.len())
            .finish()
    }
}
