//! Per-run entity store and frame step
//!
//! One `World` lives for exactly one run. Each step advances entities, fires
//! expired warnings, runs the spawn countdown and then the collision pass,
//! reporting what happened as `GameEvent`s for the caller to publish.

use rand::Rng;

use super::collision::{Bounds, overlaps};
use super::entities::{Player, Projectile, WarningIndicator};
use super::factory::Spawn;
use super::strategy::GameModeContext;
use crate::events::GameEvent;

#[derive(Debug, Clone)]
pub struct World {
    pub bounds: Bounds,
    pub player: Player,
    /// Live hazards, in spawn order
    pub projectiles: Vec<Projectile>,
    pub warnings: Vec<WarningIndicator>,
    /// Seconds survived this run
    pub elapsed: f32,
    /// Seconds accumulated toward the next spawn
    pub spawn_timer: f32,
}

impl World {
    pub fn new(bounds: Bounds, player: Player) -> Self {
        Self {
            bounds,
            player,
            projectiles: Vec::new(),
            warnings: Vec::new(),
            elapsed: 0.0,
            spawn_timer: 0.0,
        }
    }

    /// Advance one frame and return the events it produced
    pub fn step(
        &mut self,
        dt: f32,
        ctx: &mut GameModeContext,
        rng: &mut impl Rng,
    ) -> Vec<GameEvent> {
        let mut events = Vec::new();
        self.elapsed += dt;
        self.advance_entities(dt, ctx);
        self.tick_spawner(dt, ctx, rng);
        self.resolve_collisions(&mut events);
        events
    }

    /// Move everything and fire warnings whose countdown ran out
    pub fn advance_entities(&mut self, dt: f32, ctx: &mut GameModeContext) {
        self.player.update(dt, &self.bounds);

        for projectile in &mut self.projectiles {
            projectile.update(dt);
        }

        let mut fired = Vec::new();
        self.warnings.retain_mut(|warning| {
            if warning.tick(dt) {
                fired.push(warning.clone());
                false
            } else {
                true
            }
        });
        for warning in &fired {
            let projectile = ctx.emit_from_warning(warning);
            log::debug!("Warning {} fired {:?} #{}", warning.id, projectile.kind, projectile.id);
            self.projectiles.push(projectile);
        }
    }

    /// Polled spawn countdown
    ///
    /// The interval is re-read every frame, so a shrinking interval takes effect
    /// without restarting the timer. At most one spawn happens per frame.
    pub fn tick_spawner(&mut self, dt: f32, ctx: &mut GameModeContext, rng: &mut impl Rng) {
        self.spawn_timer += dt;
        let interval = ctx.get_spawn_interval(self.elapsed).as_secs_f32();
        if self.spawn_timer < interval {
            return;
        }
        self.spawn_timer -= interval;
        self.spawn(ctx, rng);
    }

    pub fn spawn(&mut self, ctx: &mut GameModeContext, rng: &mut impl Rng) {
        match ctx.create_projectile(rng, self.player.pos) {
            Spawn::Projectile(p) => {
                log::debug!("Spawned {:?} #{} at {:?}", p.kind, p.id, p.pos);
                self.projectiles.push(p);
            }
            Spawn::Warning(w) => {
                log::debug!("Warning #{} for {:?} at {:?}", w.id, w.kind, w.target);
                self.warnings.push(w);
            }
        }
    }

    /// Hits first, then playfield exits
    ///
    /// Every hazard overlapping the player this frame lands; each is consumed and
    /// reported. A hazard only counts as dodged once it has fully left the
    /// playfield without touching the player.
    pub fn resolve_collisions(&mut self, events: &mut Vec<GameEvent>) {
        let player_pos = self.player.pos;
        let player_hitbox = self.player.hitbox();

        let mut hits = Vec::new();
        self.projectiles.retain(|p| {
            if overlaps(player_pos, player_hitbox, p.pos, p.hitbox) {
                hits.push((p.kind, p.damage));
                false
            } else {
                true
            }
        });
        for (kind, damage) in hits {
            let health = self.player.take_damage(damage);
            events.push(GameEvent::PlayerHit {
                kind,
                damage,
                health,
            });
        }

        let bounds = self.bounds;
        self.projectiles.retain(|p| {
            if bounds.is_fully_outside(p.pos, p.hitbox) {
                events.push(GameEvent::ProjectileDodged { kind: p.kind });
                false
            } else {
                true
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entities::ProjectileKind;
    use crate::sim::factory::ObjectFactory;
    use crate::sim::strategy::GameMode;
    use glam::Vec2;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const DT: f32 = 1.0 / 60.0;

    fn setup(mode: GameMode) -> (World, GameModeContext) {
        let bounds = Bounds::new(800.0, 600.0);
        let ctx = GameModeContext::new(mode, ObjectFactory::new(bounds, 300.0));
        let world = World::new(bounds, ctx.create_player());
        (world, ctx)
    }

    #[test]
    fn test_hit_removes_projectile_and_damages() {
        let (mut world, _ctx) = setup(GameMode::Normal);
        let at_player = world.player.pos + Vec2::new(5.0, 0.0);
        world
            .projectiles
            .push(Projectile::new(1, ProjectileKind::Straight, at_player, Vec2::ZERO));
        world
            .projectiles
            .push(Projectile::new(2, ProjectileKind::Straight, Vec2::new(50.0, 50.0), Vec2::ZERO));

        let mut events = Vec::new();
        world.resolve_collisions(&mut events);

        assert_eq!(world.player.health, 2);
        assert_eq!(world.projectiles.len(), 1);
        assert_eq!(world.projectiles[0].id, 2);
        assert_eq!(
            events,
            vec![GameEvent::PlayerHit {
                kind: ProjectileKind::Straight,
                damage: 1,
                health: 2
            }]
        );
    }

    #[test]
    fn test_simultaneous_hits_all_land() {
        let (mut world, _ctx) = setup(GameMode::Normal);
        let pos = world.player.pos;
        for id in 0..2 {
            world
                .projectiles
                .push(Projectile::new(id, ProjectileKind::Straight, pos, Vec2::ZERO));
        }
        world
            .projectiles
            .push(Projectile::new(9, ProjectileKind::Longsword, pos, Vec2::ZERO));

        let mut events = Vec::new();
        world.resolve_collisions(&mut events);

        assert_eq!(world.player.health, 3 - 1 - 1 - 2);
        assert!(world.projectiles.is_empty());
        assert_eq!(events.len(), 3);
    }

    #[test]
    fn test_exit_counts_as_dodge() {
        let (mut world, _ctx) = setup(GameMode::Normal);
        world.projectiles.push(Projectile::new(
            1,
            ProjectileKind::Straight,
            Vec2::new(-10.0, 100.0),
            Vec2::new(-200.0, 0.0),
        ));
        // Still straddling the edge
        world.projectiles.push(Projectile::new(
            2,
            ProjectileKind::Straight,
            Vec2::new(-5.0, 100.0),
            Vec2::new(-200.0, 0.0),
        ));

        let mut events = Vec::new();
        world.resolve_collisions(&mut events);

        assert_eq!(
            events,
            vec![GameEvent::ProjectileDodged {
                kind: ProjectileKind::Straight
            }]
        );
        assert_eq!(world.projectiles.len(), 1);
        assert_eq!(world.player.health, 3);
    }

    #[test]
    fn test_warning_fires_after_countdown() {
        let (mut world, mut ctx) = setup(GameMode::Nightmare);
        world.warnings.push(WarningIndicator {
            id: 100,
            kind: ProjectileKind::Longsword,
            target: Vec2::new(400.0, 50.0),
            remaining: 0.5,
            duration: 0.5,
            spawn_pos: Vec2::new(0.0, 50.0),
            spawn_vel: Vec2::new(720.0, 0.0),
        });

        for _ in 0..29 {
            world.advance_entities(DT, &mut ctx);
        }
        assert_eq!(world.warnings.len(), 1);
        assert!(world.projectiles.is_empty());

        world.advance_entities(DT * 2.0, &mut ctx);
        assert!(world.warnings.is_empty());
        assert_eq!(world.projectiles.len(), 1);
        assert_eq!(world.projectiles[0].kind, ProjectileKind::Longsword);
    }

    #[test]
    fn test_normal_spawn_cadence() {
        let (mut world, mut ctx) = setup(GameMode::Normal);
        let mut rng = Pcg32::seed_from_u64(5);
        // 1.2s interval at 60 Hz: nothing before ~72 frames
        for _ in 0..70 {
            world.tick_spawner(DT, &mut ctx, &mut rng);
        }
        assert!(world.projectiles.is_empty());
        for _ in 0..4 {
            world.tick_spawner(DT, &mut ctx, &mut rng);
        }
        assert_eq!(world.projectiles.len(), 1);
    }

    #[test]
    fn test_step_accumulates_elapsed() {
        let (mut world, mut ctx) = setup(GameMode::Normal);
        let mut rng = Pcg32::seed_from_u64(5);
        for _ in 0..60 {
            world.step(DT, &mut ctx, &mut rng);
        }
        assert!((world.elapsed - 1.0).abs() < 1e-3);
    }

    proptest! {
        #[test]
        fn prop_constant_velocity_is_linear(
            x in 100.0f32..700.0,
            y in 100.0f32..500.0,
            vx in -300.0f32..300.0,
            vy in -300.0f32..300.0,
            n in 1usize..240,
        ) {
            let start = Vec2::new(x, y);
            let vel = Vec2::new(vx, vy);
            let mut p = Projectile::new(1, ProjectileKind::Straight, start, vel);
            for _ in 0..n {
                p.update(DT);
            }
            let expected = start + vel * (n as f32 * DT);
            prop_assert!((p.pos - expected).length() < 0.05);
        }
    }
}
