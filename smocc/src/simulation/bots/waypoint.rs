use crate::config::BotConfig;
use macroquad::prelude::*;
use shared::EnemyRoster;
use shared::geometry::{circles_overlap, distance, lerp, point_in_bounds, rotate};
use std::f32::consts::TAU;

/// Circle a bot keeps away from when picking where to move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub position: Vec2,
    pub radius: f32,
}

/// Keeps only the obstacles whose circle overlaps the bot's sampling circle.
pub fn gather_obstacles(
    center: Vec2,
    reach: f32,
    candidates: impl IntoIterator<Item = Obstacle>,
) -> Vec<Obstacle> {
    candidates
        .into_iter()
        .filter(|o| circles_overlap(center, reach, o.position, o.radius))
        .collect()
}

/// Evenly spaced points on a circle around `center`, starting east of it.
pub fn candidate_waypoints(center: Vec2, radius: f32, count: usize) -> impl Iterator<Item = Vec2> {
    let step = TAU / count as f32;
    (0..count).map(move |i| center + rotate(vec2(radius, 0.0), i as f32 * step))
}

/// Heat field around one bot for one frame. Lower heat is better.
pub struct HeatField<'a> {
    pub config: &'a BotConfig,
    pub obstacles: &'a [Obstacle],
    pub poi: Vec2,
    /// Playfield diagonal.
    pub max_distance: f32,
}

impl<'a> HeatField<'a> {
    /// Radius candidates are sampled on. Shrinks towards the closest obstacle
    /// surface so the bot never samples through it.
    pub fn sampling_radius(&self, center: Vec2) -> f32 {
        let check_radius = self.config.check_radius;
        if !self.config.shrink_to_obstacles {
            return check_radius;
        }

        let nearest_surface = self
            .obstacles
            .iter()
            .map(|o| distance(center, o.position) - o.radius)
            .fold(f32::INFINITY, f32::min);

        nearest_surface.clamp(self.config.min_sample_radius, check_radius)
    }

    pub fn heat(&self, candidate: Vec2) -> f32 {
        let mut heat = self.config.baseline_heat;

        for obstacle in self.obstacles {
            let surface = distance(candidate, obstacle.position) - obstacle.radius;
            if surface <= 0.0 {
                return f32::INFINITY;
            }
            heat += self.config.check_radius / surface;
        }

        let t = (distance(candidate, self.poi) / self.max_distance).clamp(0.0, 1.0);
        heat * lerp(1.0 - self.config.poi_priority_factor, 1.0, t)
    }

    /// Coldest reachable candidate around `agent`, or `agent` itself when every
    /// candidate is blocked. Ties keep the earliest candidate.
    pub fn best_waypoint(&self, agent: Vec2, enemies: &EnemyRoster, playfield: Vec2) -> Vec2 {
        let radius = self.sampling_radius(agent);
        let mut best = agent;
        let mut coldest = f32::INFINITY;

        for candidate in candidate_waypoints(agent, radius, self.config.candidate_count) {
            if !is_reachable(agent, candidate, enemies, playfield) {
                continue;
            }

            let heat = self.heat(candidate);
            if heat < coldest {
                coldest = heat;
                best = candidate;
            }
        }

        best
    }
}

/// A waypoint is reachable when it lies inside the playfield and the straight
/// path to it does not touch any enemy.
pub fn is_reachable(from: Vec2, to: Vec2, enemies: &EnemyRoster, playfield: Vec2) -> bool {
    point_in_bounds(to, playfield) && !enemies.blocks_segment(from, to, None)
}

/// Moves `position` towards `waypoint` at `speed`, snapping onto it when it is
/// closer than one step.
pub fn step_towards(position: Vec2, waypoint: Vec2, speed: f32, dt_ms: f32) -> Vec2 {
    let travel = speed * dt_ms;
    let remaining = distance(position, waypoint);

    if remaining <= travel {
        waypoint
    } else {
        position + (waypoint - position) / remaining * travel
    }
}
