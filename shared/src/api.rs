use crate::geometry::{UNIT_TOLERANCE, is_unit, segment_intersects_circle};
use macroquad::math::Vec2;
use thiserror::Error;

/// Programming errors raised by the bot subsystem and its collaborators.
///
/// These are never expected in a correct program; ordinary outcomes such as
/// "no fire target this frame" are modelled with `Option` instead.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ContractViolation {
    #[error("agent index {index} is out of range for a pool of {pool_size}")]
    AgentIndexOutOfRange { index: usize, pool_size: usize },
    #[error("agent {index} is inactive")]
    InactiveAgent { index: usize },
    #[error("direction ({x}, {y}) is not a unit vector")]
    NonUnitDirection { x: f32, y: f32 },
    #[error("emitter handle is not registered")]
    UnknownEmitter,
}

/// Stable identity of a live enemy, valid for as long as the enemy exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnemyId(pub u64);

/// Opaque handle into the bullet collaborator's emitter registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EmitterHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemySnapshot {
    pub id: EnemyId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub health: f32,
}

/// Read-only view of every live enemy for one frame, plus the constants used
/// to normalize enemy health and size.
#[derive(Debug, Clone, Default)]
pub struct EnemyRoster {
    enemies: Vec<EnemySnapshot>,
    pub min_health: f32,
    pub max_health: f32,
    pub max_radius: f32,
}

impl EnemyRoster {
    pub fn new(min_health: f32, max_health: f32, max_radius: f32) -> Self {
        Self {
            enemies: Vec::new(),
            min_health,
            max_health,
            max_radius,
        }
    }

    pub fn push(&mut self, enemy: EnemySnapshot) {
        self.enemies.push(enemy);
    }

    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.enemies.iter()
    }

    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&EnemySnapshot> {
        self.enemies.get(index)
    }

    pub fn find(&self, id: EnemyId) -> Option<&EnemySnapshot> {
        self.enemies.iter().find(|e| e.id == id)
    }

    /// Returns true when the segment `a`-`b` touches any enemy circle, skipping
    /// the enemy identified by `except`.
    pub fn blocks_segment(&self, a: Vec2, b: Vec2, except: Option<EnemyId>) -> bool {
        self.enemies
            .iter()
            .filter(|e| Some(e.id) != except)
            .any(|e| segment_intersects_circle(a, b, e.position, e.radius))
    }
}

/// Timed abilities granted by buff pickups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbilityKind {
    FollowEnemies,
    DoubleDamage,
    RapidFire,
    TripleFire,
    SlowEnemies,
    BouncingBullets,
    DoubleFire,
    PushEnemies,
    FriendlyBots,
}

impl AbilityKind {
    pub const COUNT: usize = 9;

    pub const ALL: [AbilityKind; Self::COUNT] = [
        AbilityKind::FollowEnemies,
        AbilityKind::DoubleDamage,
        AbilityKind::RapidFire,
        AbilityKind::TripleFire,
        AbilityKind::SlowEnemies,
        AbilityKind::BouncingBullets,
        AbilityKind::DoubleFire,
        AbilityKind::PushEnemies,
        AbilityKind::FriendlyBots,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn title(self) -> &'static str {
        match self {
            AbilityKind::FollowEnemies => "Follow enemies",
            AbilityKind::DoubleDamage => "Double damage",
            AbilityKind::RapidFire => "Rapid fire",
            AbilityKind::TripleFire => "Triple fire",
            AbilityKind::SlowEnemies => "Slow enemies",
            AbilityKind::BouncingBullets => "Bouncing bullets",
            AbilityKind::DoubleFire => "Double fire",
            AbilityKind::PushEnemies => "Push enemies",
            AbilityKind::FriendlyBots => "Friendly bots",
        }
    }
}

pub trait PlayerProvider {
    fn position(&self) -> Vec2;
    fn radius(&self) -> f32;
}

pub trait SessionView {
    fn is_running(&self) -> bool;
    fn delta_time_ms(&self) -> f32;
    /// Width and height of the playfield; the origin is the top-left corner.
    fn playfield(&self) -> Vec2;
}

pub trait AbilityState {
    fn is_active(&self, kind: AbilityKind) -> bool;
}

/// Commands accepted by the bullet collaborator for virtual emitters.
pub trait EmitterControl {
    fn create_emitter(&mut self) -> EmitterHandle;
    fn set_emitter_position(
        &mut self,
        handle: EmitterHandle,
        position: Vec2,
    ) -> Result<(), ContractViolation>;
    fn set_emitter_direction(
        &mut self,
        handle: EmitterHandle,
        direction: Vec2,
    ) -> Result<(), ContractViolation>;
    fn delete_emitter(&mut self, handle: EmitterHandle) -> Result<(), ContractViolation>;
    fn projectile_speed(&self) -> f32;
}

/// Rejects directions that are not unit length.
pub fn check_unit_direction(direction: Vec2) -> Result<(), ContractViolation> {
    if is_unit(direction, UNIT_TOLERANCE) {
        Ok(())
    } else {
        Err(ContractViolation::NonUnitDirection {
            x: direction.x,
            y: direction.y,
        })
    }
}
