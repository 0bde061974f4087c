//! Entity types and their per-frame update rules

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Bounds, Hitbox};
use crate::error::SimError;

/// The player's avatar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    /// Remaining hearts; the run ends at zero or below
    pub health: i32,
    pub max_health: i32,
    pub radius: f32,
    /// Movement speed (pixels/second)
    pub speed: f32,
    /// Held movement direction, each axis in [-1, 1]
    pub move_dir: Vec2,
}

impl Player {
    pub fn new(pos: Vec2, health: i32, max_health: i32, radius: f32, speed: f32) -> Self {
        Self {
            pos,
            health,
            max_health,
            radius,
            speed,
            move_dir: Vec2::ZERO,
        }
    }

    pub fn hitbox(&self) -> Hitbox {
        Hitbox::Circle {
            radius: self.radius,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    /// Move along the held direction, staying inside the playfield
    pub fn update(&mut self, dt: f32, bounds: &Bounds) {
        let dir = self.move_dir.clamp(Vec2::NEG_ONE, Vec2::ONE);
        // Diagonals are no faster than straight lines
        let dir = if dir.length_squared() > 1.0 {
            dir.normalize()
        } else {
            dir
        };
        self.pos = bounds.clamp_inside(self.pos + dir * self.speed * dt, Vec2::splat(self.radius));
    }

    /// Apply damage from a hazard; returns remaining health
    ///
    /// Health is allowed to drop below zero when several hazards land in the
    /// same frame.
    pub fn take_damage(&mut self, damage: i32) -> i32 {
        self.health -= damage;
        self.health
    }

    /// Restore one heart, capped at `max_health`
    ///
    /// Returns whether health actually increased.
    pub fn restore_heart(&mut self) -> Result<bool, SimError> {
        if self.health > self.max_health {
            return Err(SimError::Invariant("player health above max_health"));
        }
        if self.health == self.max_health {
            return Ok(false);
        }
        self.health += 1;
        Ok(true)
    }
}

/// Hazard variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// Constant velocity, aimed across the playfield
    Straight,
    /// Curves under a constant acceleration
    Arcing,
    /// Small and quick (Nightmare only)
    Dart,
    /// Long blade that sweeps a whole row; telegraphed by a warning (Nightmare only)
    Longsword,
}

impl ProjectileKind {
    pub const ALL: [ProjectileKind; 4] = [
        ProjectileKind::Straight,
        ProjectileKind::Arcing,
        ProjectileKind::Dart,
        ProjectileKind::Longsword,
    ];

    pub fn hitbox(&self) -> Hitbox {
        match self {
            ProjectileKind::Straight => Hitbox::Circle { radius: 10.0 },
            ProjectileKind::Arcing => Hitbox::Circle { radius: 12.0 },
            ProjectileKind::Dart => Hitbox::Circle { radius: 6.0 },
            ProjectileKind::Longsword => Hitbox::Rect {
                half_extents: Vec2::new(90.0, 9.0),
            },
        }
    }

    pub fn damage(&self) -> i32 {
        match self {
            ProjectileKind::Longsword => 2,
            _ => 1,
        }
    }

    /// Whether this kind must be announced by a warning indicator first
    pub fn is_telegraphed(&self) -> bool {
        matches!(self, ProjectileKind::Longsword)
    }

    /// Sprite name handed to the renderer
    pub fn sprite(&self) -> &'static str {
        match self {
            ProjectileKind::Straight => "projectile",
            ProjectileKind::Arcing => "projectile_arc",
            ProjectileKind::Dart => "dart",
            ProjectileKind::Longsword => "longsword",
        }
    }
}

/// A moving hazard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub kind: ProjectileKind,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Constant acceleration (zero for straight-line kinds)
    pub accel: Vec2,
    pub damage: i32,
    pub hitbox: Hitbox,
}

impl Projectile {
    pub fn new(id: u32, kind: ProjectileKind, pos: Vec2, vel: Vec2) -> Self {
        Self {
            id,
            kind,
            pos,
            vel,
            accel: Vec2::ZERO,
            damage: kind.damage(),
            hitbox: kind.hitbox(),
        }
    }

    pub fn with_accel(mut self, accel: Vec2) -> Self {
        self.accel = accel;
        self
    }

    pub fn update(&mut self, dt: f32) {
        self.pos += self.vel * dt;
        self.vel += self.accel * dt;
    }
}

/// Telegraph shown before a hazard appears
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarningIndicator {
    pub id: u32,
    pub kind: ProjectileKind,
    /// Where the hazard will pass (shown to the player)
    pub target: Vec2,
    /// Seconds until the hazard is emitted
    pub remaining: f32,
    pub duration: f32,
    /// Spawn point and velocity of the pending hazard
    pub spawn_pos: Vec2,
    pub spawn_vel: Vec2,
}

impl WarningIndicator {
    /// Count down; returns true once expired
    pub fn tick(&mut self, dt: f32) -> bool {
        self.remaining -= dt;
        self.remaining <= 0.0
    }

    /// 0 when freshly shown, 1 when about to fire
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (1.0 - self.remaining / self.duration).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Player {
        Player::new(Vec2::new(400.0, 300.0), 3, 3, 14.0, 300.0)
    }

    #[test]
    fn test_player_moves_and_clamps() {
        let bounds = Bounds::new(800.0, 600.0);
        let mut p = player();
        p.move_dir = Vec2::new(1.0, 0.0);
        p.update(0.5, &bounds);
        assert!((p.pos.x - 550.0).abs() < 1e-3);

        p.update(10.0, &bounds);
        assert!((p.pos.x - (800.0 - 14.0)).abs() < 1e-3);
    }

    #[test]
    fn test_diagonal_not_faster() {
        let bounds = Bounds::new(800.0, 600.0);
        let mut p = player();
        p.move_dir = Vec2::new(1.0, 1.0);
        let start = p.pos;
        p.update(0.1, &bounds);
        assert!(((p.pos - start).length() - 30.0).abs() < 1e-3);
    }

    #[test]
    fn test_restore_heart_caps() {
        let mut p = player();
        assert_eq!(p.restore_heart(), Ok(false));
        p.take_damage(1);
        assert_eq!(p.restore_heart(), Ok(true));
        assert_eq!(p.health, 3);
    }

    #[test]
    fn test_restore_heart_rejects_overfull() {
        let mut p = player();
        p.health = 5;
        assert!(p.restore_heart().is_err());
        assert_eq!(p.health, 5);
    }

    #[test]
    fn test_overkill_goes_negative() {
        let mut p = player();
        p.health = 1;
        p.take_damage(1);
        p.take_damage(2);
        assert_eq!(p.health, -2);
        assert!(p.is_dead());
    }

    #[test]
    fn test_arcing_projectile_curves() {
        let mut proj = Projectile::new(1, ProjectileKind::Arcing, Vec2::ZERO, Vec2::new(100.0, 0.0))
            .with_accel(Vec2::new(0.0, 200.0));
        proj.update(0.5);
        proj.update(0.5);
        assert!(proj.vel.y > 0.0);
        assert!(proj.pos.y > 0.0);
    }

    #[test]
    fn test_warning_countdown() {
        let mut w = WarningIndicator {
            id: 1,
            kind: ProjectileKind::Longsword,
            target: Vec2::ZERO,
            remaining: 1.0,
            duration: 1.0,
            spawn_pos: Vec2::ZERO,
            spawn_vel: Vec2::ZERO,
        };
        assert!(!w.tick(0.6));
        assert!((w.progress() - 0.6).abs() < 1e-5);
        assert!(w.tick(0.5));
        assert_eq!(w.progress(), 1.0);
    }
}
