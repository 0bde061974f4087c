//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Caller-supplied timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod entities;
pub mod factory;
pub mod strategy;
pub mod world;

pub use collision::{Bounds, Hitbox, overlaps};
pub use entities::{Player, Projectile, ProjectileKind, WarningIndicator};
pub use factory::{ObjectFactory, Spawn};
pub use strategy::{GameMode, GameModeContext, PlayerStats};
pub use world::World;
