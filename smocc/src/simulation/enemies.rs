use super::{Buffs, Bullets, Explosions, Session};
use crate::config::EnemyConfig;
use log::debug;
use macroquad::prelude::*;
use ::rand::Rng;
use shared::geometry::{circles_overlap, inverse_lerp, lerp, point_in_bounds};
use shared::{
    AbilityKind, AbilityState, EnemyId, EnemyRoster, EnemySnapshot, PlayerProvider, SessionView,
};
use slotmap::{Key, SlotMap, new_key_type};
use std::f32::consts::{FRAC_PI_2, PI};

new_key_type! {
    /// Key for enemy slotmap.
    pub struct EnemyKey;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpawnEdge {
    Left,
    Right,
    Top,
    Bottom,
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub position: Vec2,
    /// Unslowed velocity in px/ms.
    pub velocity: Vec2,
    pub speed: f32,
    pub initial_speed: f32,
    pub radius: f32,
    pub health: f32,
}

/// Everything an enemy touches during its update.
pub struct EnemyWorld<'a> {
    pub session: &'a mut Session,
    pub player: &'a dyn PlayerProvider,
    pub bullets: &'a mut Bullets,
    pub buffs: &'a mut Buffs,
    pub explosions: &'a mut Explosions,
}

pub struct Enemies {
    enemies: SlotMap<EnemyKey, Enemy>,
    spawn_rolls_done: u64,
    config: EnemyConfig,
    reset_done: bool,
}

impl Enemies {
    pub fn new(config: EnemyConfig) -> Self {
        Self {
            enemies: SlotMap::with_key(),
            spawn_rolls_done: 0,
            config,
            reset_done: true,
        }
    }

    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.values()
    }

    fn speed_factor(&self, abilities: &dyn AbilityState) -> f32 {
        if abilities.is_active(AbilityKind::SlowEnemies) {
            self.config.slow_factor
        } else {
            1.0
        }
    }

    /// Snapshot of every enemy with the velocity it will actually move at.
    pub fn roster(&self, abilities: &dyn AbilityState) -> EnemyRoster {
        let factor = self.speed_factor(abilities);
        let mut roster = EnemyRoster::new(
            self.config.min_health,
            self.config.max_health,
            self.config.max_radius,
        );
        for (key, enemy) in &self.enemies {
            roster.push(EnemySnapshot {
                id: EnemyId(key.data().as_ffi()),
                position: enemy.position,
                velocity: enemy.velocity * factor,
                radius: enemy.radius,
                health: enemy.health,
            });
        }
        roster
    }

    pub fn update(&mut self, mut world: EnemyWorld, rng: &mut impl Rng) {
        if !world.session.is_running() {
            if !self.reset_done {
                self.reset();
            }
            return;
        }
        self.reset_done = false;

        let difficulty = world.session.difficulty();
        let max_count = (self.config.max_count as f32 * difficulty) as usize;
        let playfield = world.session.playfield();

        let rolls_due = (world.session.elapsed_ms() / self.config.spawn_interval_ms) as u64;
        while self.spawn_rolls_done < rolls_due {
            self.roll_spawn(difficulty, max_count, playfield, rng);
            self.spawn_rolls_done += 1;
        }

        let dead: Vec<EnemyKey> = self
            .enemies
            .iter()
            .filter(|(_, e)| e.health <= 0.0)
            .map(|(key, _)| key)
            .collect();
        for key in dead {
            self.destroy(key, &mut world, rng);
        }

        let keys: Vec<EnemyKey> = self.enemies.keys().collect();
        for key in keys {
            self.update_enemy(key, &mut world);
            // The player was hit; nothing else matters this frame.
            if !world.session.is_running() {
                return;
            }
        }
    }

    fn reset(&mut self) {
        self.enemies.clear();
        self.spawn_rolls_done = 0;
        self.reset_done = true;
    }

    fn roll_spawn(
        &mut self,
        difficulty: f32,
        max_count: usize,
        playfield: Vec2,
        rng: &mut impl Rng,
    ) {
        let count = self.enemies.len();
        if count < self.config.min_count {
            self.spawn(difficulty, playfield, rng);
        } else if count < max_count && rng.random::<f32>() < difficulty {
            self.spawn(difficulty, playfield, rng);
        }
    }

    fn spawn(&mut self, difficulty: f32, playfield: Vec2, rng: &mut impl Rng) {
        let config = &self.config;
        let edge = match rng.random_range(0..4) {
            0 => SpawnEdge::Left,
            1 => SpawnEdge::Right,
            2 => SpawnEdge::Top,
            _ => SpawnEdge::Bottom,
        };

        let along: f32 = rng.random();
        let position = match edge {
            SpawnEdge::Left => vec2(0.0, along * playfield.y),
            SpawnEdge::Right => vec2(playfield.x, along * playfield.y),
            SpawnEdge::Top => vec2(along * playfield.x, 0.0),
            SpawnEdge::Bottom => vec2(along * playfield.x, playfield.y),
        };

        let health = lerp(
            config.min_health,
            config.max_health,
            rng.random::<f32>() * difficulty,
        )
        .round();
        let speed = lerp(config.min_speed, config.max_speed, rng.random());

        // Half-turn fan pointing into the field.
        let mut heading = PI * rng.random::<f32>();
        match edge {
            SpawnEdge::Left => heading -= FRAC_PI_2,
            SpawnEdge::Right => heading += FRAC_PI_2,
            SpawnEdge::Top => heading += PI,
            SpawnEdge::Bottom => {}
        }

        let key = self.enemies.insert(Enemy {
            position,
            velocity: vec2(heading.cos(), -heading.sin()) * speed,
            speed,
            initial_speed: speed,
            radius: 0.0,
            health,
        });
        debug!("Spawned enemy {:?} with {} health from {:?}", key, health, edge);
    }

    fn destroy(&mut self, key: EnemyKey, world: &mut EnemyWorld, rng: &mut impl Rng) {
        let Some(enemy) = self.enemies.remove(key) else {
            return;
        };

        let mut drift = enemy.velocity * self.config.dropped_buff_relative_speed;
        // Pushed enemies fly outwards, so the drop goes the other way.
        if world.buffs.is_active(AbilityKind::PushEnemies) {
            drift = -drift;
        }

        world.buffs.roll_drop(enemy.position, drift, rng);
        world.session.increment_score();
    }

    fn update_enemy(&mut self, key: EnemyKey, world: &mut EnemyWorld) {
        let Some(mut enemy) = self.enemies.get(key).cloned() else {
            return;
        };
        let dt = world.session.delta_time_ms();
        let playfield = world.session.playfield();
        let player = world.player.position();

        if circles_overlap(enemy.position, enemy.radius, player, world.player.radius()) {
            world.session.end();
            return;
        }

        if !point_in_bounds(enemy.position, playfield) {
            enemy.speed = enemy.initial_speed;
            if let Some(heading) = (player - enemy.position).try_normalize() {
                enemy.velocity = heading * enemy.speed;
            }
        }

        for (other_key, other) in &self.enemies {
            if other_key == key {
                continue;
            }
            if circles_overlap(enemy.position, enemy.radius, other.position, other.radius) {
                if let Some(towards) = (other.position - enemy.position).try_normalize() {
                    enemy.velocity = -towards * enemy.speed;
                }
            }
        }

        let damage = world.bullets.damage(&*world.buffs);
        let hits = world.bullets.hits_in_circle(enemy.position, enemy.radius);
        for (bullet, tip, direction) in hits {
            self.take_hit(&mut enemy, damage, direction, &*world.buffs);
            world.explosions.spawn(tip);
            world.bullets.despawn(bullet);
        }

        self.ease_radius(&mut enemy, dt);
        enemy.position += enemy.velocity * self.speed_factor(&*world.buffs) * dt;

        if let Some(slot) = self.enemies.get_mut(key) {
            *slot = enemy;
        }
    }

    fn take_hit(
        &self,
        enemy: &mut Enemy,
        damage: f32,
        direction: Vec2,
        abilities: &dyn AbilityState,
    ) {
        let config = &self.config;
        enemy.health -= damage;

        if !abilities.is_active(AbilityKind::PushEnemies) {
            return;
        }

        // Healthier enemies are harder to push.
        let t = 1.0 - inverse_lerp(config.min_health, config.max_health, enemy.health);
        let effect = lerp(
            config.push_effect_at_max_health,
            config.push_effect_at_min_health,
            t,
        );
        enemy.velocity += direction * config.push_factor * effect;
        enemy.speed = enemy.velocity.length();

        if enemy.speed > config.max_pushed_speed {
            enemy.velocity = enemy.velocity.normalize_or_zero() * config.max_pushed_speed;
            enemy.speed = config.max_pushed_speed;
        }
    }

    /// Grows or shrinks towards the size matching the current health.
    fn ease_radius(&self, enemy: &mut Enemy, dt: f32) {
        let config = &self.config;
        let target = lerp(
            config.min_radius,
            config.max_radius,
            enemy.health / config.max_health,
        );
        let change = config.radius_change_speed * dt;

        if enemy.radius < target {
            enemy.radius = (enemy.radius + change).min(target);
        } else if enemy.radius > target {
            enemy.radius = (enemy.radius - change).max(target);
        }
    }
}
