use super::bots::{BotFrame, BotSubsystem};
use super::enemies::EnemyWorld;
use super::{Buffs, Bullets, Enemies, Explosions, Player, PlayerInput, Session};
use crate::config::GameConfig;
use log::{info, warn};
use macroquad::prelude::*;
use ::rand::SeedableRng;
use ::rand::rngs::StdRng;
use shared::{AbilityKind, AbilityState, ContractViolation, SessionView};

/// Owns every subsystem and advances them in a fixed order each frame.
pub struct Simulation {
    pub session: Session,
    pub player: Player,
    pub bots: BotSubsystem,
    pub enemies: Enemies,
    pub bullets: Bullets,
    pub buffs: Buffs,
    pub explosions: Explosions,
    rng: StdRng,
}

impl Simulation {
    pub fn new(config: &GameConfig, seed: Option<u64>) -> Self {
        let playfield = vec2(config.playfield.width, config.playfield.height);
        let rng = match seed {
            Some(seed) => {
                info!("Using RNG seed {}", seed);
                StdRng::seed_from_u64(seed)
            }
            None => StdRng::from_os_rng(),
        };

        Self {
            session: Session::new(playfield, config.session.clone()),
            player: Player::new(config.player.clone()),
            bots: BotSubsystem::new(config.bots.clone()),
            enemies: Enemies::new(config.enemies.clone()),
            bullets: Bullets::new(config.bullets.clone()),
            buffs: Buffs::new(config.buffs.clone()),
            explosions: Explosions::new(config.explosions.clone()),
            rng,
        }
    }

    pub fn is_running(&self) -> bool {
        self.session.is_running()
    }

    /// Starts a new game. Does nothing while one is already running.
    pub fn begin(&mut self) -> Result<(), ContractViolation> {
        if self.session.is_running() {
            return Ok(());
        }
        self.session.begin();
        self.player.spawn(self.session.playfield(), &mut self.bullets)
    }

    /// Advances the world by one frame of `frame_ms` wall-clock milliseconds.
    ///
    /// A contract violation in one subsystem does not stop the others from
    /// updating this frame.
    pub fn update(&mut self, frame_ms: f32, input: &PlayerInput) -> Result<(), ContractViolation> {
        let was_running = self.session.is_running();

        self.session.advance(frame_ms);
        let player = self.player.update(input, &self.session, &mut self.bullets);
        self.buffs.update(&self.session, &self.player, &mut self.rng);

        let roster = self.enemies.roster(&self.buffs);
        let frame = BotFrame {
            session: &self.session,
            abilities: &self.buffs,
            player: &self.player,
            enemies: &roster,
        };
        let bots = self.bots.update(&frame, &mut self.bullets, &mut self.rng);
        self.bullets.update(&self.session, &self.buffs, &roster);

        let world = EnemyWorld {
            session: &mut self.session,
            player: &self.player,
            bullets: &mut self.bullets,
            buffs: &mut self.buffs,
            explosions: &mut self.explosions,
        };
        self.enemies.update(world, &mut self.rng);
        self.explosions.update(&self.session);

        let despawn = if was_running && !self.session.is_running() {
            self.player.despawn(&mut self.bullets)
        } else {
            Ok(())
        };

        // The frame always completes; the first violation is reported.
        player.and(bots).and(despawn)
    }

    /// Runs one frame and logs contract violations instead of failing.
    pub fn step(&mut self, frame_ms: f32, input: &PlayerInput) {
        if let Err(e) = self.update(frame_ms, input) {
            warn!("Frame update failed: {}", e);
        }
    }

    pub fn bots_active(&self) -> bool {
        self.buffs.is_active(AbilityKind::FriendlyBots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{EmitterControl, PlayerProvider};

    fn simulation() -> Simulation {
        Simulation::new(&GameConfig::default(), Some(1234))
    }

    #[test]
    fn test_begin_spawns_player_with_emitter() {
        let mut sim = simulation();
        assert!(!sim.is_running());
        sim.begin().unwrap();

        assert!(sim.is_running());
        assert!(sim.player.is_spawned());
        assert_eq!(sim.player.position(), vec2(500.0, 360.0));
        assert_eq!(sim.bullets.emitter_count(), 1);

        // A second begin while running is ignored.
        sim.begin().unwrap();
        assert_eq!(sim.bullets.emitter_count(), 1);
    }

    #[test]
    fn test_violation_does_not_skip_rest_of_frame() {
        let mut sim = simulation();
        sim.begin().unwrap();
        let handle = sim.player.emitter().unwrap();
        sim.bullets.delete_emitter(handle).unwrap();
        sim.bullets.spawn(vec2(100.0, 100.0), vec2(1.0, 0.0));

        let result = sim.update(10.0, &PlayerInput::default());
        assert_eq!(result, Err(ContractViolation::UnknownEmitter));

        let (base, _) = sim.bullets.segments().next().unwrap();
        assert!(base.x > 100.0);
    }

    #[test]
    fn test_idle_world_does_not_move() {
        let mut sim = simulation();
        sim.update(16.0, &PlayerInput::default()).unwrap();
        assert_eq!(sim.session.elapsed_ms(), 0.0);
        assert_eq!(sim.enemies.len(), 0);
        assert_eq!(sim.bullets.len(), 0);
    }

    #[test]
    fn test_friendly_bots_buff_spawns_bots_at_player() {
        let mut sim = simulation();
        sim.begin().unwrap();
        sim.buffs.grant(AbilityKind::FriendlyBots);
        sim.update(0.0, &PlayerInput::default()).unwrap();

        assert!(sim.bots_active());
        for index in 0..sim.bots.pool_size() {
            assert_eq!(sim.bots.location(index).unwrap(), sim.player.position());
        }
        assert_eq!(sim.bullets.emitter_count(), 1 + sim.bots.pool_size());
    }

    #[test]
    fn test_long_game_keeps_emitters_balanced() {
        let mut sim = simulation();
        sim.begin().unwrap();
        sim.buffs.grant(AbilityKind::FriendlyBots);
        let input = PlayerInput {
            movement: Vec2::ZERO,
            cursor: Some(vec2(500.0, 0.0)),
        };

        for _ in 0..3000 {
            sim.update(16.0, &input).unwrap();
            if !sim.is_running() {
                break;
            }
            let bots = sim.bots.bots().iter().filter(|b| b.is_active()).count();
            assert_eq!(sim.bullets.emitter_count(), 1 + bots);
        }

        // Whatever happened, a stopped game releases everything on the next frame.
        sim.session.end();
        sim.update(16.0, &input).unwrap();
        sim.player.despawn(&mut sim.bullets).unwrap();
        assert_eq!(sim.bullets.emitter_count(), 0);
        assert_eq!(sim.bullets.len(), 0);
        assert_eq!(sim.enemies.len(), 0);
    }
}
