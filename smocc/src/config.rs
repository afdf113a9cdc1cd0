use anyhow::{Context, Result};
use macroquad::prelude::Conf;
use serde::Deserialize;
use std::f32::consts::FRAC_PI_8;
use std::fs;
use std::path::Path;
use thiserror::Error;

// Window constants
pub const DEFAULT_WINDOW_WIDTH: f32 = 1000.0;
pub const DEFAULT_WINDOW_HEIGHT: f32 = 720.0;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("`{field}` must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },

    #[error("`{field}` must be at least 1")]
    ZeroCount { field: &'static str },

    #[error("`{field}` must be within [0, 1], got {value}")]
    OutOfUnitRange { field: &'static str, value: f32 },

    #[error("`{min_field}` must not exceed `{max_field}`")]
    InvertedRange {
        min_field: &'static str,
        max_field: &'static str,
    },
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct GameConfig {
    pub playfield: PlayfieldConfig,
    pub session: SessionConfig,
    pub player: PlayerConfig,
    pub bots: BotConfig,
    pub enemies: EnemyConfig,
    pub bullets: BulletConfig,
    pub buffs: BuffConfig,
    pub explosions: ExplosionConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct PlayfieldConfig {
    pub width: f32,
    pub height: f32,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SessionConfig {
    /// Longest frame the simulation will step in one go.
    pub max_frame_ms: f32,
    pub min_difficulty: f32,
    /// Session time after which difficulty reaches 1.0.
    pub difficulty_ramp_ms: f32,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct PlayerConfig {
    pub speed: f32,
    pub radius: f32,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct BotConfig {
    pub count: usize,
    pub speed: f32,
    pub radius: f32,
    /// Radius of the circle candidate waypoints are sampled on.
    pub check_radius: f32,
    /// Lower bound for the sampling radius when it shrinks to nearby obstacles.
    pub min_sample_radius: f32,
    pub shrink_to_obstacles: bool,
    pub candidate_count: usize,
    pub baseline_heat: f32,
    pub poi_speed: f32,
    /// 0.0 ignores the point of interest, 1.0 lets it fully cancel hazard heat.
    pub poi_priority_factor: f32,
    pub full_rotation_ms: f32,
    /// Largest share of target priority lost by a full-health enemy.
    pub health_priority_weight: f32,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct EnemyConfig {
    pub spawn_interval_ms: f32,
    pub min_count: usize,
    pub max_count: usize,
    pub min_health: f32,
    pub max_health: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    pub radius_change_speed: f32,
    pub max_pushed_speed: f32,
    pub slow_factor: f32,
    pub push_factor: f32,
    pub push_effect_at_min_health: f32,
    pub push_effect_at_max_health: f32,
    pub dropped_buff_relative_speed: f32,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct BulletConfig {
    pub speed: f32,
    pub length: f32,
    pub damage: f32,
    pub fire_interval_ms: f32,
    pub double_fire_spacing: f32,
    pub triple_fire_radians: f32,
    pub homing_radians_per_ms: f32,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct BuffConfig {
    pub duration_ms: f32,
    pub drop_chance: f32,
    pub chase_speed: f32,
    pub magnetic_radius: f32,
    pub square_side: f32,
    pub rotation_radians_per_ms: f32,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ExplosionConfig {
    pub duration_ms: f32,
    pub final_radius: f32,
    pub initial_opacity: f32,
}

impl Default for PlayfieldConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WINDOW_WIDTH,
            height: DEFAULT_WINDOW_HEIGHT,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_frame_ms: 50.0,
            min_difficulty: 0.1,
            difficulty_ramp_ms: 120_000.0,
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: 0.3,
            radius: 3.0,
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            count: 3,
            speed: 0.3,
            radius: 3.0,
            check_radius: 60.0,
            min_sample_radius: 10.0,
            shrink_to_obstacles: true,
            candidate_count: 8,
            baseline_heat: 0.1,
            poi_speed: 0.1,
            poi_priority_factor: 0.4,
            full_rotation_ms: 1000.0,
            health_priority_weight: 0.3,
        }
    }
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            spawn_interval_ms: 500.0,
            min_count: 1,
            max_count: 10,
            min_health: 1.0,
            max_health: 30.0,
            min_speed: 0.2,
            max_speed: 0.5,
            min_radius: 15.0,
            max_radius: 75.0,
            radius_change_speed: 0.1,
            max_pushed_speed: 2.0,
            slow_factor: 0.2,
            push_factor: 0.2,
            push_effect_at_min_health: 1.5,
            push_effect_at_max_health: 0.5,
            dropped_buff_relative_speed: 1.0 / 6.0,
        }
    }
}

impl Default for BulletConfig {
    fn default() -> Self {
        Self {
            speed: 0.5,
            length: 6.0,
            damage: 1.0,
            fire_interval_ms: 100.0,
            double_fire_spacing: 6.0,
            triple_fire_radians: FRAC_PI_8,
            homing_radians_per_ms: 0.005,
        }
    }
}

impl Default for BuffConfig {
    fn default() -> Self {
        Self {
            duration_ms: 10_000.0,
            drop_chance: 0.15,
            chase_speed: 0.2,
            magnetic_radius: 100.0,
            square_side: 10.0,
            rotation_radians_per_ms: 0.01,
        }
    }
}

impl Default for ExplosionConfig {
    fn default() -> Self {
        Self {
            duration_ms: 400.0,
            final_radius: 40.0,
            initial_opacity: 0.2,
        }
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

fn unit_range(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfUnitRange { field, value })
    }
}

fn ordered<T: PartialOrd>(
    min_field: &'static str,
    min: T,
    max_field: &'static str,
    max: T,
) -> Result<(), ConfigError> {
    if min <= max {
        Ok(())
    } else {
        Err(ConfigError::InvertedRange {
            min_field,
            max_field,
        })
    }
}

impl GameConfig {
    /// Reads, parses and validates a TOML configuration file.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        let config: GameConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file '{}'", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file '{}'", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("playfield.width", self.playfield.width)?;
        positive("playfield.height", self.playfield.height)?;

        positive("session.max_frame_ms", self.session.max_frame_ms)?;
        unit_range("session.min_difficulty", self.session.min_difficulty)?;
        positive("session.difficulty_ramp_ms", self.session.difficulty_ramp_ms)?;

        positive("player.speed", self.player.speed)?;
        positive("player.radius", self.player.radius)?;

        let bots = &self.bots;
        if bots.count == 0 {
            return Err(ConfigError::ZeroCount { field: "bots.count" });
        }
        if bots.candidate_count == 0 {
            return Err(ConfigError::ZeroCount {
                field: "bots.candidate_count",
            });
        }
        positive("bots.speed", bots.speed)?;
        positive("bots.radius", bots.radius)?;
        positive("bots.check_radius", bots.check_radius)?;
        positive("bots.min_sample_radius", bots.min_sample_radius)?;
        ordered(
            "bots.min_sample_radius",
            bots.min_sample_radius,
            "bots.check_radius",
            bots.check_radius,
        )?;
        positive("bots.baseline_heat", bots.baseline_heat)?;
        positive("bots.poi_speed", bots.poi_speed)?;
        unit_range("bots.poi_priority_factor", bots.poi_priority_factor)?;
        positive("bots.full_rotation_ms", bots.full_rotation_ms)?;
        unit_range("bots.health_priority_weight", bots.health_priority_weight)?;

        let enemies = &self.enemies;
        positive("enemies.spawn_interval_ms", enemies.spawn_interval_ms)?;
        ordered(
            "enemies.min_count",
            enemies.min_count,
            "enemies.max_count",
            enemies.max_count,
        )?;
        positive("enemies.min_health", enemies.min_health)?;
        ordered(
            "enemies.min_health",
            enemies.min_health,
            "enemies.max_health",
            enemies.max_health,
        )?;
        positive("enemies.min_speed", enemies.min_speed)?;
        ordered(
            "enemies.min_speed",
            enemies.min_speed,
            "enemies.max_speed",
            enemies.max_speed,
        )?;
        positive("enemies.min_radius", enemies.min_radius)?;
        ordered(
            "enemies.min_radius",
            enemies.min_radius,
            "enemies.max_radius",
            enemies.max_radius,
        )?;
        positive("enemies.radius_change_speed", enemies.radius_change_speed)?;
        positive("enemies.max_pushed_speed", enemies.max_pushed_speed)?;
        positive("enemies.slow_factor", enemies.slow_factor)?;

        positive("bullets.speed", self.bullets.speed)?;
        positive("bullets.length", self.bullets.length)?;
        positive("bullets.damage", self.bullets.damage)?;
        positive("bullets.fire_interval_ms", self.bullets.fire_interval_ms)?;

        positive("buffs.duration_ms", self.buffs.duration_ms)?;
        unit_range("buffs.drop_chance", self.buffs.drop_chance)?;
        positive("buffs.magnetic_radius", self.buffs.magnetic_radius)?;
        positive("buffs.square_side", self.buffs.square_side)?;

        positive("explosions.duration_ms", self.explosions.duration_ms)?;
        unit_range("explosions.initial_opacity", self.explosions.initial_opacity)?;

        Ok(())
    }
}

pub fn window_conf() -> Conf {
    Conf {
        window_title: "SMOCC".to_owned(),
        window_width: DEFAULT_WINDOW_WIDTH as i32,
        window_height: DEFAULT_WINDOW_HEIGHT as i32,
        high_dpi: true,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_are_valid() {
        let config = GameConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.bots.count, 3);
        assert_eq!(config.playfield.width, 1000.0);
        assert_eq!(config.playfield.height, 720.0);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: GameConfig = toml::from_str("").unwrap();
        assert_eq!(config.bots.candidate_count, 8);
        assert_eq!(config.bullets.speed, 0.5);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: GameConfig = toml::from_str(
            r#"
            [bots]
            count = 5
            poi_priority_factor = 0.75
            "#,
        )
        .unwrap();
        assert_eq!(config.bots.count, 5);
        assert_eq!(config.bots.poi_priority_factor, 0.75);
        assert_eq!(config.bots.speed, 0.3);
        assert_eq!(config.enemies.max_health, 30.0);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = GameConfig::default();
        config.bots.count = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroCount { field: "bots.count" })
        );

        let mut config = GameConfig::default();
        config.bots.poi_priority_factor = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfUnitRange {
                field: "bots.poi_priority_factor",
                ..
            })
        ));

        let mut config = GameConfig::default();
        config.enemies.min_health = 40.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvertedRange {
                min_field: "enemies.min_health",
                ..
            })
        ));

        let mut config = GameConfig::default();
        config.bullets.speed = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive {
                field: "bullets.speed",
                ..
            })
        ));
    }

    #[test]
    fn test_load_from_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[playfield]\nwidth = 800.0\n\n[buffs]\ndrop_chance = 1.0").unwrap();

        let config = GameConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.playfield.width, 800.0);
        assert_eq!(config.playfield.height, 720.0);
        assert_eq!(config.buffs.drop_chance, 1.0);
    }

    #[test]
    fn test_load_from_path_reports_invalid_values() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[bots]\ncount = 0").unwrap();

        let err = GameConfig::load_from_path(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("bots.count"));
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(GameConfig::load_from_path(&missing).is_err());
    }
}
