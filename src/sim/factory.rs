//! Entity construction
//!
//! The factory turns a mode's tuning tables into concrete players, projectiles
//! and warnings. It owns entity ID allocation so IDs stay unique across runs.

use glam::Vec2;
use rand::Rng;

use super::collision::Bounds;
use super::entities::{Player, Projectile, ProjectileKind, WarningIndicator};
use super::strategy::GameMode;
use crate::consts::PLAYER_RADIUS;

/// Downward pull applied to arcing projectiles (pixels/s²)
pub const ARC_GRAVITY: f32 = 260.0;
/// Darts travel this much faster than the mode's base speed
pub const DART_SPEED_MULT: f32 = 1.6;
/// Longsword sweep speed (pixels/second)
pub const LONGSWORD_SPEED: f32 = 720.0;
/// Aim scatter around the player for aimed kinds (pixels)
pub const AIM_JITTER: f32 = 90.0;

/// Result of a spawn tick: either a live hazard or a telegraph for one
#[derive(Debug, Clone)]
pub enum Spawn {
    Projectile(Projectile),
    Warning(WarningIndicator),
}

/// Builds entities for a given mode
#[derive(Debug, Clone)]
pub struct ObjectFactory {
    bounds: Bounds,
    player_speed: f32,
    next_id: u32,
}

impl ObjectFactory {
    pub fn new(bounds: Bounds, player_speed: f32) -> Self {
        Self {
            bounds,
            player_speed,
            next_id: 1,
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Allocate a new entity ID
    fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Player starts in the middle of the playfield
    pub fn create_player(&self, mode: GameMode) -> Player {
        let stats = mode.player_stats();
        Player::new(
            self.bounds.center(),
            stats.health,
            stats.max_health,
            PLAYER_RADIUS,
            self.player_speed,
        )
    }

    /// Roll a projectile kind for `mode` and build it
    ///
    /// `target` is where aimed kinds head for (normally the player). Telegraphed
    /// kinds come back as a warning that fires later.
    pub fn create_projectile(
        &mut self,
        mode: GameMode,
        rng: &mut impl Rng,
        target: Vec2,
    ) -> Spawn {
        let kind = mode.pick_kind(rng);
        if kind.is_telegraphed() {
            return Spawn::Warning(self.sweep_warning(kind, mode, rng, target));
        }

        let (min_speed, max_speed) = mode.speed_range();
        let speed = sample(rng, min_speed, max_speed);
        let projectile = match kind {
            ProjectileKind::Arcing => self.arcing(rng, speed),
            ProjectileKind::Dart => self.aimed(kind, rng, target, speed * DART_SPEED_MULT),
            _ => self.aimed(kind, rng, target, speed),
        };
        Spawn::Projectile(projectile)
    }

    /// Turn an expired warning into its hazard
    pub fn emit_from_warning(&mut self, warning: &WarningIndicator) -> Projectile {
        let id = self.next_entity_id();
        Projectile::new(id, warning.kind, warning.spawn_pos, warning.spawn_vel)
    }

    /// Random point on the playfield border
    fn edge_point(&self, rng: &mut impl Rng) -> Vec2 {
        let Bounds { width, height } = self.bounds;
        match rng.random_range(0..4) {
            0 => Vec2::new(sample(rng, 0.0, width), 0.0),
            1 => Vec2::new(width, sample(rng, 0.0, height)),
            2 => Vec2::new(sample(rng, 0.0, width), height),
            _ => Vec2::new(0.0, sample(rng, 0.0, height)),
        }
    }

    fn aimed(
        &mut self,
        kind: ProjectileKind,
        rng: &mut impl Rng,
        target: Vec2,
        speed: f32,
    ) -> Projectile {
        let origin = self.edge_point(rng);
        let jitter = Vec2::new(
            rng.random_range(-AIM_JITTER..AIM_JITTER),
            rng.random_range(-AIM_JITTER..AIM_JITTER),
        );
        let aim = self.bounds.clamp_inside(target + jitter, Vec2::splat(1.0));
        // An origin sitting on the aim point falls back to heading for the centre
        let dir = (aim - origin)
            .try_normalize()
            .or_else(|| (self.bounds.center() - origin).try_normalize())
            .unwrap_or(Vec2::Y);
        let id = self.next_entity_id();
        Projectile::new(id, kind, origin, dir * speed)
    }

    /// Lobbed in from a side wall, falling under gravity
    fn arcing(&mut self, rng: &mut impl Rng, speed: f32) -> Projectile {
        let Bounds { width, height } = self.bounds;
        let from_left = rng.random_bool(0.5);
        let y = sample(rng, height * 0.25, height * 0.75);
        let (x, vx) = if from_left { (0.0, speed) } else { (width, -speed) };
        let vy = -rng.random_range(0.3..0.8) * speed;
        let id = self.next_entity_id();
        Projectile::new(id, ProjectileKind::Arcing, Vec2::new(x, y), Vec2::new(vx, vy))
            .with_accel(Vec2::new(0.0, ARC_GRAVITY))
    }

    /// Telegraphed blades sweep the player's current row from one side
    fn sweep_warning(
        &mut self,
        kind: ProjectileKind,
        mode: GameMode,
        rng: &mut impl Rng,
        target: Vec2,
    ) -> WarningIndicator {
        let Bounds { width, height } = self.bounds;
        let half = kind.hitbox().half_extents();
        // Keep the blade on the field; a field thinner than the blade gets its middle row
        let row = if height > half.y * 2.0 {
            target.y.clamp(half.y, height - half.y)
        } else {
            height * 0.5
        };
        let from_left = rng.random_bool(0.5);
        let (spawn_x, vx) = if from_left {
            (0.0, LONGSWORD_SPEED)
        } else {
            (width, -LONGSWORD_SPEED)
        };
        let duration = mode.warning_duration();
        WarningIndicator {
            id: self.next_entity_id(),
            kind,
            target: Vec2::new(width * 0.5, row),
            remaining: duration,
            duration,
            spawn_pos: Vec2::new(spawn_x, row),
            spawn_vel: Vec2::new(vx, 0.0),
        }
    }
}

/// Uniform sample from `lo..hi`; an empty or degenerate range yields `lo`
fn sample(rng: &mut impl Rng, lo: f32, hi: f32) -> f32 {
    if hi > lo {
        rng.random_range(lo..hi)
    } else {
        lo
    }
}
