use super::{
    AIM_LINE_LENGTH, BACKGROUND_COLOR, BOT_COLOR, BUFF_COLOR, BULLET_COLOR, DEBUG_COLOR,
    EXPLOSION_COLOR, FOREGROUND_COLOR, GameCamera, LETTERBOX_COLOR, PLAYER_COLOR,
};
use crate::simulation::Simulation;
use macroquad::prelude::*;
use shared::{PlayerProvider, SessionView};

/// Draws the game world. UI is drawn on top by egui.
pub struct Renderer {
    /// The main game camera.
    pub game_camera: GameCamera,
}

impl Renderer {
    pub fn new(playfield: Vec2) -> Self {
        Self {
            game_camera: GameCamera::new(playfield),
        }
    }

    /// Main rendering function, draws all game elements.
    pub fn render(&mut self, simulation: &Simulation, show_debug: bool) {
        self.game_camera.handle_resize();
        clear_background(LETTERBOX_COLOR);
        set_camera(&self.game_camera.camera);

        let playfield = simulation.session.playfield();
        draw_rectangle(0.0, 0.0, playfield.x, playfield.y, BACKGROUND_COLOR);

        self.draw_explosions(simulation);
        self.draw_buff_drops(simulation);
        self.draw_bullets(simulation);
        self.draw_enemies(simulation);
        self.draw_bots(simulation);
        if show_debug {
            self.draw_bot_debug(simulation);
        }
        self.draw_player(simulation);

        set_default_camera();
    }

    fn draw_explosions(&self, simulation: &Simulation) {
        for (position, radius, opacity) in simulation.explosions.iter() {
            let color = Color {
                a: opacity,
                ..EXPLOSION_COLOR
            };
            draw_circle(position.x, position.y, radius, color);
        }
    }

    fn draw_buff_drops(&self, simulation: &Simulation) {
        let side = simulation.buffs.square_side();
        for drop in simulation.buffs.drops() {
            draw_rectangle_ex(
                drop.position.x,
                drop.position.y,
                side,
                side,
                DrawRectangleParams {
                    offset: vec2(0.5, 0.5),
                    rotation: drop.rotation,
                    color: BUFF_COLOR,
                },
            );
        }
    }

    fn draw_bullets(&self, simulation: &Simulation) {
        for (base, tip) in simulation.bullets.segments() {
            draw_line(base.x, base.y, tip.x, tip.y, 2.0, BULLET_COLOR);
        }
    }

    fn draw_enemies(&self, simulation: &Simulation) {
        for enemy in simulation.enemies.iter() {
            draw_circle(
                enemy.position.x,
                enemy.position.y,
                enemy.radius,
                FOREGROUND_COLOR,
            );
        }
    }

    fn draw_bots(&self, simulation: &Simulation) {
        let radius = simulation.bots.radius();
        for bot in simulation.bots.bots().iter().filter(|b| b.is_active()) {
            let p = bot.position();
            let tip = p + bot.aim() * AIM_LINE_LENGTH;
            draw_line(p.x, p.y, tip.x, tip.y, 1.5, BOT_COLOR);
            draw_circle(p.x, p.y, radius, BOT_COLOR);
        }
    }

    /// Waypoints, points of interest and target lines of active bots.
    fn draw_bot_debug(&self, simulation: &Simulation) {
        let roster = simulation.enemies.roster(&simulation.buffs);
        for bot in simulation.bots.bots().iter().filter(|b| b.is_active()) {
            let p = bot.position();
            let waypoint = bot.waypoint();
            let poi = bot.point_of_interest();

            draw_line(p.x, p.y, waypoint.x, waypoint.y, 1.0, DEBUG_COLOR);
            draw_circle_lines(poi.x, poi.y, 4.0, 1.0, DEBUG_COLOR);

            if let Some(target) = bot.target().and_then(|id| roster.find(id)) {
                let t = target.position;
                draw_line(p.x, p.y, t.x, t.y, 1.0, Color { a: 0.25, ..DEBUG_COLOR });
            }
        }
    }

    fn draw_player(&self, simulation: &Simulation) {
        let player = &simulation.player;
        if !player.is_spawned() {
            return;
        }
        let p = player.position();
        let tip = p + player.aim() * AIM_LINE_LENGTH;
        draw_line(p.x, p.y, tip.x, tip.y, 1.5, PLAYER_COLOR);
        draw_circle(p.x, p.y, player.radius(), PLAYER_COLOR);
    }
}
