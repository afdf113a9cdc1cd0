use crate::config::PlayerConfig;
use log::debug;
use macroquad::prelude::*;
use shared::{ContractViolation, EmitterControl, EmitterHandle, PlayerProvider, SessionView};

/// Input sampled once per frame by the app.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerInput {
    /// Each axis is -1, 0 or 1.
    pub movement: Vec2,
    /// Cursor in playfield coordinates, if it is over the window.
    pub cursor: Option<Vec2>,
}

/// The player's ship. Fires through its own emitter while a session runs.
pub struct Player {
    position: Vec2,
    aim: Vec2,
    emitter: Option<EmitterHandle>,
    config: PlayerConfig,
}

impl Player {
    pub fn new(config: PlayerConfig) -> Self {
        Self {
            position: Vec2::ZERO,
            aim: vec2(0.0, -1.0),
            emitter: None,
            config,
        }
    }

    pub fn aim(&self) -> Vec2 {
        self.aim
    }

    pub fn is_spawned(&self) -> bool {
        self.emitter.is_some()
    }

    pub fn emitter(&self) -> Option<EmitterHandle> {
        self.emitter
    }

    /// Places the player in the middle of the playfield with a fresh emitter.
    pub fn spawn(
        &mut self,
        playfield: Vec2,
        emitters: &mut dyn EmitterControl,
    ) -> Result<(), ContractViolation> {
        self.despawn(emitters)?;
        self.position = playfield / 2.0;
        self.aim = vec2(0.0, -1.0);

        let handle = emitters.create_emitter();
        emitters.set_emitter_position(handle, self.position)?;
        emitters.set_emitter_direction(handle, self.aim)?;
        self.emitter = Some(handle);
        debug!("Player spawned at {:?}", self.position);
        Ok(())
    }

    pub fn despawn(&mut self, emitters: &mut dyn EmitterControl) -> Result<(), ContractViolation> {
        if let Some(handle) = self.emitter.take() {
            emitters.delete_emitter(handle)?;
        }
        Ok(())
    }

    pub fn update(
        &mut self,
        input: &PlayerInput,
        session: &dyn SessionView,
        emitters: &mut dyn EmitterControl,
    ) -> Result<(), ContractViolation> {
        if !session.is_running() {
            return Ok(());
        }
        let Some(handle) = self.emitter else {
            return Ok(());
        };

        let dt = session.delta_time_ms();
        let playfield = session.playfield();
        let radius = self.config.radius;

        // Axes move independently, like the keyboard does.
        self.position += input.movement * self.config.speed * dt;
        self.position = self
            .position
            .clamp(Vec2::splat(radius), playfield - Vec2::splat(radius));

        if let Some(aim) = input.cursor.and_then(|c| (c - self.position).try_normalize()) {
            self.aim = aim;
        }

        emitters.set_emitter_position(handle, self.position)?;
        emitters.set_emitter_direction(handle, self.aim)?;
        Ok(())
    }
}

impl PlayerProvider for Player {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn radius(&self) -> f32 {
        self.config.radius
    }
}
