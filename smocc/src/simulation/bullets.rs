use super::Timer;
use crate::config::BulletConfig;
use log::debug;
use macroquad::prelude::*;
use shared::geometry::{
    leftward, point_in_bounds, point_in_circle, rightward, rotate, rotate_towards,
};
use shared::{
    AbilityKind, AbilityState, ContractViolation, EmitterControl, EmitterHandle, EnemyRoster,
    SessionView, check_unit_direction,
};
use slotmap::{Key, KeyData, SlotMap, new_key_type};

new_key_type! {
    /// Key for bullet emitters.
    pub struct EmitterKey;
    /// Key for bullets in flight.
    pub struct BulletKey;
}

impl From<EmitterKey> for EmitterHandle {
    fn from(key: EmitterKey) -> Self {
        EmitterHandle(key.data().as_ffi())
    }
}

impl From<EmitterHandle> for EmitterKey {
    fn from(handle: EmitterHandle) -> Self {
        KeyData::from_ffi(handle.0).into()
    }
}

/// A point that fires bullets along its direction at a fixed cadence.
/// It stays silent until it has been given a position.
pub struct Emitter {
    pub position: Option<Vec2>,
    pub direction: Vec2,
    fire_timer: Timer,
}

#[derive(Debug, Clone)]
pub struct Bullet {
    pub base: Vec2,
    pub direction: Vec2,
    despawning: bool,
}

pub struct Bullets {
    emitters: SlotMap<EmitterKey, Emitter>,
    bullets: SlotMap<BulletKey, Bullet>,
    config: BulletConfig,
    reset_done: bool,
}

impl Bullets {
    pub fn new(config: BulletConfig) -> Self {
        Self {
            emitters: SlotMap::with_key(),
            bullets: SlotMap::with_key(),
            config,
            reset_done: true,
        }
    }

    pub fn emitter_count(&self) -> usize {
        self.emitters.len()
    }

    pub fn len(&self) -> usize {
        self.bullets.values().filter(|b| !b.despawning).count()
    }

    /// Damage dealt by one bullet hit.
    pub fn damage(&self, abilities: &dyn AbilityState) -> f32 {
        if abilities.is_active(AbilityKind::DoubleDamage) {
            self.config.damage * 2.0
        } else {
            self.config.damage
        }
    }

    pub fn tip(&self, bullet: &Bullet) -> Vec2 {
        bullet.base + bullet.direction * self.config.length
    }

    /// Base and tip of every bullet still in flight.
    pub fn segments(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        self.bullets
            .values()
            .filter(|b| !b.despawning)
            .map(|b| (b.base, self.tip(b)))
    }

    /// Bullets whose tip is inside the circle, with their tip and direction.
    pub fn hits_in_circle(&self, center: Vec2, radius: f32) -> Vec<(BulletKey, Vec2, Vec2)> {
        self.bullets
            .iter()
            .filter(|(_, b)| !b.despawning)
            .map(|(key, b)| (key, self.tip(b), b.direction))
            .filter(|(_, tip, _)| point_in_circle(*tip, center, radius))
            .collect()
    }

    /// Marks a bullet for removal on the next update.
    pub fn despawn(&mut self, key: BulletKey) {
        if let Some(bullet) = self.bullets.get_mut(key) {
            bullet.despawning = true;
        }
    }

    pub fn update(
        &mut self,
        session: &dyn SessionView,
        abilities: &dyn AbilityState,
        enemies: &EnemyRoster,
    ) {
        if !session.is_running() {
            if !self.reset_done {
                // Emitters belong to their owners and are released by them.
                self.bullets.clear();
                self.reset_done = true;
            }
            return;
        }
        self.reset_done = false;

        self.bullets.retain(|_, b| !b.despawning);

        let dt = session.delta_time_ms();
        self.fire_emitters(dt, abilities);
        self.move_bullets(dt, session.playfield(), abilities, enemies);
    }

    fn fire_emitters(&mut self, dt: f32, abilities: &dyn AbilityState) {
        let rate = if abilities.is_active(AbilityKind::RapidFire) {
            2.0
        } else {
            1.0
        };

        let mut shots = Vec::new();
        for emitter in self.emitters.values_mut() {
            emitter.fire_timer.update(dt * rate);
            let volleys = emitter.fire_timer.drain();
            if let Some(position) = emitter.position {
                for _ in 0..volleys {
                    shots.push((position, emitter.direction));
                }
            }
        }

        for (position, direction) in shots {
            self.fire(position, direction, abilities);
        }
    }

    fn fire(&mut self, position: Vec2, direction: Vec2, abilities: &dyn AbilityState) {
        let mut directions = vec![direction];
        if abilities.is_active(AbilityKind::TripleFire) {
            let spread = self.config.triple_fire_radians;
            directions.push(rotate(direction, spread));
            directions.push(rotate(direction, -spread));
        }

        let half_spacing = self.config.double_fire_spacing / 2.0;
        for direction in directions {
            if abilities.is_active(AbilityKind::DoubleFire) {
                self.spawn(leftward(position, half_spacing, direction), direction);
                self.spawn(rightward(position, half_spacing, direction), direction);
            } else {
                self.spawn(position, direction);
            }
        }
    }

    pub(super) fn spawn(&mut self, base: Vec2, direction: Vec2) {
        self.bullets.insert(Bullet {
            base,
            direction,
            despawning: false,
        });
    }

    fn move_bullets(
        &mut self,
        dt: f32,
        playfield: Vec2,
        abilities: &dyn AbilityState,
        enemies: &EnemyRoster,
    ) {
        let homing = abilities.is_active(AbilityKind::FollowEnemies);
        let bouncing = abilities.is_active(AbilityKind::BouncingBullets);
        let config = &self.config;

        for bullet in self.bullets.values_mut() {
            bullet.base += bullet.direction * config.speed * dt;
            let tip = bullet.base + bullet.direction * config.length;

            if homing {
                let nearest = enemies
                    .iter()
                    .map(|e| e.position)
                    .min_by(|a, b| a.distance_squared(tip).total_cmp(&b.distance_squared(tip)));
                if let Some(wanted) = nearest.and_then(|p| (p - bullet.base).try_normalize()) {
                    let gap = (bullet.direction - wanted).abs();
                    if gap.x + gap.y > 0.001 {
                        let max_turn = config.homing_radians_per_ms * dt;
                        let turned = rotate_towards(bullet.direction, wanted, max_turn);
                        bullet.direction = turned.try_normalize().unwrap_or(wanted);
                    }
                }
            }

            if bouncing {
                // Flip only the components still heading out.
                if (tip.x < 0.0 && bullet.direction.x < 0.0)
                    || (tip.x > playfield.x && bullet.direction.x > 0.0)
                {
                    bullet.direction.x = -bullet.direction.x;
                }
                if (tip.y < 0.0 && bullet.direction.y < 0.0)
                    || (tip.y > playfield.y && bullet.direction.y > 0.0)
                {
                    bullet.direction.y = -bullet.direction.y;
                }
            } else if !point_in_bounds(bullet.base, playfield) {
                bullet.despawning = true;
            }
        }
    }
}

impl EmitterControl for Bullets {
    fn create_emitter(&mut self) -> EmitterHandle {
        let key = self.emitters.insert(Emitter {
            position: None,
            direction: vec2(1.0, 0.0),
            fire_timer: Timer::new(self.config.fire_interval_ms, 0.0),
        });
        debug!("Created emitter {:?}", key);
        key.into()
    }

    fn set_emitter_position(
        &mut self,
        handle: EmitterHandle,
        position: Vec2,
    ) -> Result<(), ContractViolation> {
        let emitter = self
            .emitters
            .get_mut(handle.into())
            .ok_or(ContractViolation::UnknownEmitter)?;
        emitter.position = Some(position);
        Ok(())
    }

    fn set_emitter_direction(
        &mut self,
        handle: EmitterHandle,
        direction: Vec2,
    ) -> Result<(), ContractViolation> {
        check_unit_direction(direction)?;
        let emitter = self
            .emitters
            .get_mut(handle.into())
            .ok_or(ContractViolation::UnknownEmitter)?;
        emitter.direction = direction;
        Ok(())
    }

    fn delete_emitter(&mut self, handle: EmitterHandle) -> Result<(), ContractViolation> {
        let key: EmitterKey = handle.into();
        self.emitters
            .remove(key)
            .ok_or(ContractViolation::UnknownEmitter)?;
        debug!("Deleted emitter {:?}", key);
        Ok(())
    }

    fn projectile_speed(&self) -> f32 {
        self.config.speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::bots::test_support::FakeSession;
    use approx::assert_abs_diff_eq;
    use shared::{EnemyId, EnemySnapshot};

    struct Abilities(Vec<AbilityKind>);

    impl AbilityState for Abilities {
        fn is_active(&self, kind: AbilityKind) -> bool {
            self.0.contains(&kind)
        }
    }

    fn session(dt: f32) -> FakeSession {
        FakeSession {
            running: true,
            dt,
            playfield: vec2(1000.0, 720.0),
        }
    }

    fn armed(position: Vec2, direction: Vec2) -> Bullets {
        let mut bullets = Bullets::new(BulletConfig::default());
        let handle = bullets.create_emitter();
        bullets.set_emitter_position(handle, position).unwrap();
        bullets.set_emitter_direction(handle, direction).unwrap();
        bullets
    }

    fn no_enemies() -> EnemyRoster {
        EnemyRoster::new(1.0, 30.0, 75.0)
    }

    #[test]
    fn test_handles_round_trip_through_keys() {
        let mut bullets = Bullets::new(BulletConfig::default());
        let handle = bullets.create_emitter();
        assert!(bullets.set_emitter_position(handle, vec2(1.0, 2.0)).is_ok());
        bullets.delete_emitter(handle).unwrap();

        assert_eq!(
            bullets.set_emitter_position(handle, Vec2::ZERO),
            Err(ContractViolation::UnknownEmitter)
        );
        assert_eq!(
            bullets.delete_emitter(handle),
            Err(ContractViolation::UnknownEmitter)
        );
    }

    #[test]
    fn test_rejects_non_unit_direction() {
        let mut bullets = Bullets::new(BulletConfig::default());
        let handle = bullets.create_emitter();
        assert_eq!(
            bullets.set_emitter_direction(handle, vec2(0.0, 0.0)),
            Err(ContractViolation::NonUnitDirection { x: 0.0, y: 0.0 })
        );
    }

    #[test]
    fn test_emitter_fires_at_interval() {
        let mut bullets = armed(vec2(500.0, 360.0), vec2(1.0, 0.0));
        let abilities = Abilities(vec![]);
        bullets.update(&session(50.0), &abilities, &no_enemies());
        assert_eq!(bullets.len(), 0);
        bullets.update(&session(50.0), &abilities, &no_enemies());
        assert_eq!(bullets.len(), 1);

        // Bullets move right at 0.5 px/ms.
        let (base, tip) = bullets.segments().next().unwrap();
        assert_abs_diff_eq!(base.x, 525.0, epsilon = 1e-4);
        assert_abs_diff_eq!(tip.x, 531.0, epsilon = 1e-4);
    }

    #[test]
    fn test_silent_until_positioned() {
        let mut bullets = Bullets::new(BulletConfig::default());
        bullets.create_emitter();
        for _ in 0..10 {
            bullets.update(&session(50.0), &Abilities(vec![]), &no_enemies());
        }
        assert_eq!(bullets.len(), 0);
    }

    #[test]
    fn test_rapid_fire_doubles_cadence() {
        let mut bullets = armed(vec2(500.0, 360.0), vec2(1.0, 0.0));
        let abilities = Abilities(vec![AbilityKind::RapidFire]);
        for _ in 0..4 {
            bullets.update(&session(50.0), &abilities, &no_enemies());
        }
        assert_eq!(bullets.len(), 4);
    }

    #[test]
    fn test_triple_and_double_fire_multiply() {
        let mut bullets = armed(vec2(500.0, 360.0), vec2(0.0, -1.0));
        let abilities = Abilities(vec![AbilityKind::TripleFire, AbilityKind::DoubleFire]);
        bullets.update(&session(100.0), &abilities, &no_enemies());
        assert_eq!(bullets.len(), 6);
    }

    #[test]
    fn test_bullet_leaving_the_field_despawns() {
        let mut bullets = armed(vec2(995.0, 360.0), vec2(1.0, 0.0));
        let abilities = Abilities(vec![]);
        bullets.update(&session(100.0), &abilities, &no_enemies());
        assert_eq!(bullets.len(), 0);
    }

    #[test]
    fn test_bouncing_bullet_turns_back() {
        let mut bullets = Bullets::new(BulletConfig::default());
        bullets.spawn(vec2(990.0, 360.0), vec2(1.0, 0.0));
        let abilities = Abilities(vec![AbilityKind::BouncingBullets]);
        bullets.update(&session(20.0), &abilities, &no_enemies());

        let bullet = bullets.bullets.values().next().unwrap();
        assert_eq!(bullet.direction, vec2(-1.0, 0.0));
        assert!(!bullet.despawning);
    }

    #[test]
    fn test_homing_turns_towards_nearest_enemy() {
        let mut bullets = Bullets::new(BulletConfig::default());
        bullets.spawn(vec2(100.0, 100.0), vec2(1.0, 0.0));
        let mut enemies = no_enemies();
        enemies.push(EnemySnapshot {
            id: EnemyId(1),
            position: vec2(100.0, 600.0),
            velocity: Vec2::ZERO,
            radius: 20.0,
            health: 5.0,
        });
        let abilities = Abilities(vec![AbilityKind::FollowEnemies]);
        bullets.update(&session(10.0), &abilities, &enemies);

        let bullet = bullets.bullets.values().next().unwrap();
        // Turned by 0.05 rad towards +y.
        assert!(bullet.direction.y > 0.0);
        assert_abs_diff_eq!(bullet.direction.y, 0.05_f32.sin(), epsilon = 1e-4);
        assert_abs_diff_eq!(bullet.direction.length(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_homing_keeps_direction_when_aligned() {
        let mut bullets = Bullets::new(BulletConfig::default());
        bullets.spawn(vec2(100.0, 100.0), vec2(1.0, 0.0));
        let mut enemies = no_enemies();
        enemies.push(EnemySnapshot {
            id: EnemyId(1),
            position: vec2(800.0, 100.0),
            velocity: Vec2::ZERO,
            radius: 20.0,
            health: 5.0,
        });
        let abilities = Abilities(vec![AbilityKind::FollowEnemies]);
        bullets.update(&session(10.0), &abilities, &enemies);

        let bullet = bullets.bullets.values().next().unwrap();
        assert_eq!(bullet.direction, vec2(1.0, 0.0));
    }

    #[test]
    fn test_hits_and_despawn() {
        let mut bullets = Bullets::new(BulletConfig::default());
        bullets.spawn(vec2(100.0, 100.0), vec2(1.0, 0.0));
        let hits = bullets.hits_in_circle(vec2(110.0, 100.0), 5.0);
        assert_eq!(hits.len(), 1);

        bullets.despawn(hits[0].0);
        assert!(bullets.hits_in_circle(vec2(110.0, 100.0), 5.0).is_empty());
        bullets.update(&session(10.0), &Abilities(vec![]), &no_enemies());
        assert!(bullets.bullets.is_empty());
    }

    #[test]
    fn test_session_end_clears_bullets_but_keeps_emitters() {
        let mut bullets = armed(vec2(500.0, 360.0), vec2(1.0, 0.0));
        bullets.update(&session(100.0), &Abilities(vec![]), &no_enemies());
        assert_eq!(bullets.len(), 1);

        let stopped = FakeSession {
            running: false,
            dt: 0.0,
            playfield: vec2(1000.0, 720.0),
        };
        bullets.update(&stopped, &Abilities(vec![]), &no_enemies());
        assert_eq!(bullets.len(), 0);
        assert_eq!(bullets.emitter_count(), 1);
    }
}
