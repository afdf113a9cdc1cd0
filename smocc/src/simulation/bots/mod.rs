mod aim;
mod targeting;
mod wander;
mod waypoint;

pub use aim::{AimController, intercept_time, lead_aim};
pub use targeting::TargetScorer;
pub use wander::PointOfInterest;
pub use waypoint::{HeatField, Obstacle, gather_obstacles, step_towards};

use crate::config::BotConfig;
use log::debug;
use macroquad::prelude::*;
use ::rand::Rng;
use shared::{
    AbilityKind, AbilityState, ContractViolation, EmitterControl, EmitterHandle, EnemyId,
    EnemyRoster, PlayerProvider, SessionView,
};
use std::f32::consts::TAU;
use std::iter;

/// Read-only collaborators the bots look at each frame.
pub struct BotFrame<'a> {
    pub session: &'a dyn SessionView,
    pub abilities: &'a dyn AbilityState,
    pub player: &'a dyn PlayerProvider,
    pub enemies: &'a EnemyRoster,
}

/// One friendly bot slot. Slots are created once and reused on every
/// activation.
#[derive(Debug, Clone)]
pub struct Bot {
    index: usize,
    emitter: Option<EmitterHandle>,
    position: Vec2,
    active: bool,
    reset_done: bool,
    poi: PointOfInterest,
    aim: Vec2,
    target: Option<EnemyId>,
    waypoint: Vec2,
}

impl Bot {
    fn new(index: usize) -> Self {
        Self {
            index,
            emitter: None,
            position: Vec2::ZERO,
            active: false,
            reset_done: true,
            poi: PointOfInterest::default(),
            aim: vec2(1.0, 0.0),
            target: None,
            waypoint: Vec2::ZERO,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn aim(&self) -> Vec2 {
        self.aim
    }

    pub fn target(&self) -> Option<EnemyId> {
        self.target
    }

    pub fn waypoint(&self) -> Vec2 {
        self.waypoint
    }

    pub fn point_of_interest(&self) -> Vec2 {
        self.poi.position
    }
}

/// Owns the fixed pool of friendly bots and drives them while the
/// FRIENDLY_BOTS ability is active.
pub struct BotSubsystem {
    bots: Vec<Bot>,
    config: BotConfig,
    aim: AimController,
    buff_was_active: bool,
    reset_done: bool,
    max_distance: f32,
}

impl BotSubsystem {
    pub fn new(config: BotConfig) -> Self {
        let bots = (0..config.count).map(Bot::new).collect();
        let aim = AimController::new(config.full_rotation_ms);
        Self {
            bots,
            config,
            aim,
            buff_was_active: false,
            reset_done: true,
            max_distance: 0.0,
        }
    }

    pub fn pool_size(&self) -> usize {
        self.bots.len()
    }

    pub fn bots(&self) -> &[Bot] {
        &self.bots
    }

    pub fn radius(&self) -> f32 {
        self.config.radius
    }

    fn slot(&self, index: usize) -> Result<&Bot, ContractViolation> {
        self.bots
            .get(index)
            .ok_or(ContractViolation::AgentIndexOutOfRange {
                index,
                pool_size: self.bots.len(),
            })
    }

    fn active_slot(&self, index: usize) -> Result<&Bot, ContractViolation> {
        let bot = self.slot(index)?;
        if bot.active {
            Ok(bot)
        } else {
            Err(ContractViolation::InactiveAgent { index })
        }
    }

    pub fn is_active(&self, index: usize) -> Result<bool, ContractViolation> {
        Ok(self.slot(index)?.active)
    }

    /// Current position of an active bot.
    pub fn location(&self, index: usize) -> Result<Vec2, ContractViolation> {
        Ok(self.active_slot(index)?.position)
    }

    /// Current unit aim direction of an active bot.
    pub fn aim(&self, index: usize) -> Result<Vec2, ContractViolation> {
        Ok(self.active_slot(index)?.aim)
    }

    /// Takes a bot out of play. Its emitter is released on the next update.
    pub fn deactivate(&mut self, index: usize) -> Result<(), ContractViolation> {
        self.slot(index)?;
        self.bots[index].active = false;
        debug!("Bot {} deactivated", index);
        Ok(())
    }

    pub fn update(
        &mut self,
        frame: &BotFrame,
        emitters: &mut dyn EmitterControl,
        rng: &mut impl Rng,
    ) -> Result<(), ContractViolation> {
        if !frame.session.is_running() {
            if !self.reset_done {
                self.reset(emitters)?;
            }
            return Ok(());
        }

        self.reset_done = false;
        self.max_distance = frame.session.playfield().length();

        let buff_active = frame.abilities.is_active(AbilityKind::FriendlyBots);
        let turned_on = buff_active && !self.buff_was_active;
        let turned_off = !buff_active && self.buff_was_active;
        self.buff_was_active = buff_active;

        if turned_on {
            for index in 0..self.bots.len() {
                self.activate(index, frame, emitters, rng)?;
            }
        }

        if turned_off {
            debug!("Friendly bots expired");
            for bot in &mut self.bots {
                bot.active = false;
            }
        }

        for index in 0..self.bots.len() {
            if self.bots[index].active {
                self.update_bot(index, frame, emitters, rng)?;
            } else if !self.bots[index].reset_done {
                self.reset_bot(index, emitters)?;
            }
        }

        Ok(())
    }

    fn reset(&mut self, emitters: &mut dyn EmitterControl) -> Result<(), ContractViolation> {
        self.buff_was_active = false;
        for index in 0..self.bots.len() {
            self.bots[index].active = false;
            if !self.bots[index].reset_done {
                self.reset_bot(index, emitters)?;
            }
        }
        self.reset_done = true;
        Ok(())
    }

    fn activate(
        &mut self,
        index: usize,
        frame: &BotFrame,
        emitters: &mut dyn EmitterControl,
        rng: &mut impl Rng,
    ) -> Result<(), ContractViolation> {
        let playfield = frame.session.playfield();
        let player = frame.player.position();
        let poi = PointOfInterest::random(playfield, self.config.poi_speed, rng);
        let angle = TAU * rng.random::<f32>();

        let bot = &mut self.bots[index];
        // A bot deactivated this frame may still hold its previous emitter.
        if let Some(stale) = bot.emitter.take() {
            emitters.delete_emitter(stale)?;
        }

        bot.active = true;
        bot.reset_done = false;
        bot.position = player;
        bot.waypoint = player;
        bot.poi = poi;
        bot.aim = vec2(angle.cos(), -angle.sin());
        bot.target = None;
        bot.emitter = Some(emitters.create_emitter());

        debug!(
            "Bot {} activated at ({:.1}, {:.1})",
            index, player.x, player.y
        );
        Ok(())
    }

    fn reset_bot(
        &mut self,
        index: usize,
        emitters: &mut dyn EmitterControl,
    ) -> Result<(), ContractViolation> {
        let bot = &mut self.bots[index];
        if let Some(handle) = bot.emitter.take() {
            emitters.delete_emitter(handle)?;
        }
        bot.target = None;
        bot.reset_done = true;
        debug!("Bot {} reset", index);
        Ok(())
    }

    fn obstacles_around(&self, index: usize, frame: &BotFrame) -> Vec<Obstacle> {
        let center = self.bots[index].position;
        let bot_radius = self.config.radius;

        let enemies = frame.enemies.iter().map(|e| Obstacle {
            position: e.position,
            radius: e.radius,
        });
        let other_bots = self
            .bots
            .iter()
            .filter(|b| b.active && b.index != index)
            .map(|b| Obstacle {
                position: b.position,
                radius: bot_radius,
            });
        let player = iter::once(Obstacle {
            position: frame.player.position(),
            radius: frame.player.radius(),
        });

        gather_obstacles(
            center,
            self.config.check_radius,
            enemies.chain(other_bots).chain(player),
        )
    }

    fn update_bot(
        &mut self,
        index: usize,
        frame: &BotFrame,
        emitters: &mut dyn EmitterControl,
        rng: &mut impl Rng,
    ) -> Result<(), ContractViolation> {
        let dt = frame.session.delta_time_ms();
        let playfield = frame.session.playfield();

        self.bots[index]
            .poi
            .advance(dt, self.config.poi_speed, playfield, rng);

        let obstacles = self.obstacles_around(index, frame);
        let waypoint = HeatField {
            config: &self.config,
            obstacles: &obstacles,
            poi: self.bots[index].poi.position,
            max_distance: self.max_distance,
        }
        .best_waypoint(self.bots[index].position, frame.enemies, playfield);

        let position = step_towards(self.bots[index].position, waypoint, self.config.speed, dt);

        let scorer = TargetScorer {
            agent: position,
            player: frame.player.position(),
            enemies: frame.enemies,
            max_distance: self.max_distance,
            health_weight: self.config.health_priority_weight,
        };
        let target = scorer.select().and_then(|i| frame.enemies.get(i));

        let bot = &mut self.bots[index];
        bot.waypoint = waypoint;
        bot.position = position;
        bot.target = target.map(|e| e.id);

        // No target: hold the current aim.
        if let Some(enemy) = target {
            let speed = emitters.projectile_speed();
            if let Some(desired) = lead_aim(position, enemy.position, enemy.velocity, speed) {
                bot.aim = self.aim.step(bot.aim, desired, dt);
            }
        }

        let handle = bot.emitter.ok_or(ContractViolation::UnknownEmitter)?;
        emitters.set_emitter_position(handle, bot.position)?;
        emitters.set_emitter_direction(handle, bot.aim)?;
        Ok(())
    }
}
