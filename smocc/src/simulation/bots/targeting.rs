use macroquad::prelude::*;
use shared::geometry::{distance, inverse_lerp};
use shared::{EnemyRoster, EnemySnapshot};

/// Scores enemies as fire targets for one bot.
pub struct TargetScorer<'a> {
    pub agent: Vec2,
    pub player: Vec2,
    pub enemies: &'a EnemyRoster,
    pub max_distance: f32,
    pub health_weight: f32,
}

impl<'a> TargetScorer<'a> {
    /// Priority of `enemy`, or 0 when another enemy blocks the line of fire.
    pub fn priority(&self, enemy: &EnemySnapshot) -> f32 {
        if self
            .enemies
            .blocks_segment(self.agent, enemy.position, Some(enemy.id))
        {
            return 0.0;
        }

        let bot_factor = self.max_distance / distance(self.agent, enemy.position) / 2.0;
        let player_factor = self.max_distance / distance(self.player, enemy.position);

        let (min_health, max_health) = (self.enemies.min_health, self.enemies.max_health);
        let health_t = if max_health > min_health {
            inverse_lerp(min_health, max_health, enemy.health)
        } else {
            0.0
        };
        let health_factor = 1.0 - health_t * self.health_weight;

        bot_factor.max(player_factor) * health_factor
    }

    /// Index into the roster of the enemy with the strictly highest positive
    /// priority. Ties keep the earliest enemy.
    pub fn select(&self) -> Option<usize> {
        let mut best = None;
        let mut best_priority = 0.0;

        for (index, enemy) in self.enemies.iter().enumerate() {
            let priority = self.priority(enemy);
            if priority > best_priority {
                best_priority = priority;
                best = Some(index);
            }
        }

        best
    }
}
