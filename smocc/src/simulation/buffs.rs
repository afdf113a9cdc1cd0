use crate::config::BuffConfig;
use log::info;
use macroquad::prelude::*;
use ::rand::Rng;
use shared::geometry::distance;
use shared::{AbilityKind, AbilityState, PlayerProvider, SessionView};
use slotmap::{SlotMap, new_key_type};
use std::f32::consts::SQRT_2;

new_key_type! {
    /// Key for dropped buffs.
    pub struct DropKey;
}

/// A buff square dropped by a dead enemy, waiting to be picked up.
#[derive(Debug, Clone)]
pub struct BuffDrop {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Spin angle in radians.
    pub rotation: f32,
}

/// Remaining time of every ability plus the drops lying on the field.
pub struct Buffs {
    time_left: [f32; AbilityKind::COUNT],
    drops: SlotMap<DropKey, BuffDrop>,
    config: BuffConfig,
    reset_done: bool,
}

impl Buffs {
    pub fn new(config: BuffConfig) -> Self {
        Self {
            time_left: [0.0; AbilityKind::COUNT],
            drops: SlotMap::with_key(),
            config,
            reset_done: true,
        }
    }

    /// Half the diagonal of a drop square, rounded up.
    pub fn bounding_radius(&self) -> f32 {
        (self.config.square_side * SQRT_2 / 2.0).ceil()
    }

    pub fn trigger_radius(&self) -> f32 {
        self.bounding_radius() * 2.0
    }

    pub fn square_side(&self) -> f32 {
        self.config.square_side
    }

    pub fn time_left(&self, kind: AbilityKind) -> f32 {
        self.time_left[kind.index()]
    }

    /// Abilities with time left, in declaration order.
    pub fn active(&self) -> impl Iterator<Item = (AbilityKind, f32)> + '_ {
        AbilityKind::ALL
            .iter()
            .map(|&kind| (kind, self.time_left(kind)))
            .filter(|(_, left)| *left > 0.0)
    }

    pub fn drops(&self) -> impl Iterator<Item = &BuffDrop> {
        self.drops.values()
    }

    /// Extends `kind` by one buff duration.
    pub fn grant(&mut self, kind: AbilityKind) {
        self.time_left[kind.index()] += self.config.duration_ms;
        info!("Applied buff: {}", kind.title());
    }

    pub fn grant_random(&mut self, rng: &mut impl Rng) {
        let kind = AbilityKind::ALL[rng.random_range(0..AbilityKind::COUNT)];
        self.grant(kind);
    }

    /// Rolls the drop chance for a buff leaving `position` at `velocity`.
    pub fn roll_drop(&mut self, position: Vec2, velocity: Vec2, rng: &mut impl Rng) {
        if rng.random::<f32>() < self.config.drop_chance {
            self.drops.insert(BuffDrop {
                position,
                velocity,
                rotation: 0.0,
            });
        }
    }

    pub fn update(
        &mut self,
        session: &dyn SessionView,
        player: &dyn PlayerProvider,
        rng: &mut impl Rng,
    ) {
        if !session.is_running() {
            if !self.reset_done {
                self.reset();
            }
            return;
        }
        self.reset_done = false;

        let dt = session.delta_time_ms();
        for left in &mut self.time_left {
            *left = (*left - dt).max(0.0);
        }

        let playfield = session.playfield();
        let bounds = self.bounding_radius();
        let trigger = self.trigger_radius();
        let config = &self.config;
        let target = player.position();
        let mut picked = 0;

        self.drops.retain(|_, drop| {
            let off_screen = drop.position.x + bounds < 0.0
                || drop.position.x - bounds > playfield.x
                || drop.position.y + bounds < 0.0
                || drop.position.y - bounds > playfield.y;
            if off_screen {
                return false;
            }

            let gap = distance(drop.position, target);
            if gap < trigger {
                picked += 1;
                return false;
            }

            drop.position += drop.velocity * dt;
            if gap < config.magnetic_radius {
                // Magnet pulls on top of the drift.
                let pull = (target - drop.position).normalize_or_zero();
                drop.position += pull * config.chase_speed * dt;
            }
            drop.rotation -= config.rotation_radians_per_ms * dt;
            true
        });

        for _ in 0..picked {
            self.grant_random(rng);
        }
    }

    fn reset(&mut self) {
        self.time_left = [0.0; AbilityKind::COUNT];
        self.drops.clear();
        self.reset_done = true;
    }
}

impl AbilityState for Buffs {
    fn is_active(&self, kind: AbilityKind) -> bool {
        self.time_left(kind) > 0.0
    }
}
