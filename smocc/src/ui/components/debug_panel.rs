use crate::engine::GameCamera;
use crate::simulation::Simulation;
use crate::ui::{BASE_PADDING, BASE_SPACING};
use egui::{self, Color32};
use macroquad::prelude::*;
use shared::SessionView;

/// Debug panel component that displays debug information
pub struct DebugPanel {
    displayed_fps: i32,
    fps_timer: f32,
    show_debug: bool,
    pub show_bot_overlay: bool,
}

impl DebugPanel {
    pub fn new() -> Self {
        Self {
            displayed_fps: get_fps(),
            fps_timer: 0.0,
            show_debug: false,
            show_bot_overlay: true,
        }
    }

    /// Update the FPS counter
    pub fn update(&mut self) {
        self.fps_timer += get_frame_time();
        if self.fps_timer >= 0.5 {
            self.displayed_fps = get_fps();
            self.fps_timer = 0.0;
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.show_debug
    }

    pub fn toggle(&mut self) -> bool {
        self.show_debug = !self.show_debug;
        self.show_debug
    }

    /// Whether the world renderer should draw bot waypoints and targets.
    pub fn wants_overlay(&self) -> bool {
        self.show_debug && self.show_bot_overlay
    }

    pub fn draw(&mut self, egui_ctx: &egui::Context, simulation: &Simulation, camera: &GameCamera) {
        if !self.show_debug {
            return;
        }

        egui::Window::new("Debug Info")
            .resizable(true)
            .collapsible(true)
            .default_pos(egui::pos2(screen_width() - 320.0, 32.0 + 6.0 * 2.0))
            .default_size(egui::vec2(300.0, screen_height() * 0.6))
            .show(egui_ctx, |ui| {
                ui.heading("Performance");
                ui.group(|ui| {
                    let fps_color = if self.displayed_fps > 55 {
                        Color32::from_rgb(0, 180, 0)
                    } else if self.displayed_fps > 30 {
                        Color32::from_rgb(220, 180, 70)
                    } else {
                        Color32::from_rgb(220, 100, 100)
                    };

                    egui::Grid::new("perf_grid")
                        .num_columns(2)
                        .spacing([BASE_SPACING * 2.0, BASE_SPACING])
                        .show(ui, |ui| {
                            ui.label("FPS:");
                            ui.colored_label(fps_color, format!("{}", self.displayed_fps));
                            ui.end_row();
                        });
                });

                ui.add_space(BASE_PADDING);
                ui.heading("World");
                ui.group(|ui| {
                    egui::Grid::new("world_stats")
                        .num_columns(2)
                        .spacing([BASE_SPACING * 2.0, BASE_SPACING])
                        .show(ui, |ui| {
                            let session = &simulation.session;
                            ui.label("Running:");
                            ui.label(session.is_running().to_string());
                            ui.end_row();

                            ui.label("Difficulty:");
                            ui.label(format!("{:.2}", session.difficulty()));
                            ui.end_row();

                            let mouse_pos = camera.get_mouse_world_pos();
                            ui.label("Mouse:");
                            ui.label(format!("({:.1}, {:.1})", mouse_pos.x, mouse_pos.y));
                            ui.end_row();

                            ui.label("Enemies:");
                            ui.label(simulation.enemies.len().to_string());
                            ui.end_row();

                            ui.label("Bullets:");
                            ui.label(simulation.bullets.len().to_string());
                            ui.end_row();

                            ui.label("Emitters:");
                            ui.label(simulation.bullets.emitter_count().to_string());
                            ui.end_row();

                            ui.label("Explosions:");
                            ui.label(simulation.explosions.len().to_string());
                            ui.end_row();
                        });
                });

                ui.add_space(BASE_PADDING);
                ui.heading("Friendly bots");
                ui.checkbox(&mut self.show_bot_overlay, "Show waypoints and targets");
                ui.group(|ui| {
                    egui::Grid::new("bot_grid")
                        .num_columns(4)
                        .spacing([BASE_SPACING * 2.0, BASE_SPACING])
                        .show(ui, |ui| {
                            ui.strong("#");
                            ui.strong("Position");
                            ui.strong("Aim");
                            ui.strong("Target");
                            ui.end_row();

                            for bot in simulation.bots.bots() {
                                ui.label(bot.index().to_string());
                                if !bot.is_active() {
                                    ui.colored_label(Color32::GRAY, "inactive");
                                    ui.label("");
                                    ui.label("");
                                    ui.end_row();
                                    continue;
                                }
                                let p = bot.position();
                                let aim = bot.aim();
                                ui.label(format!("({:.0}, {:.0})", p.x, p.y));
                                ui.label(format!("{:.0}°", (-aim.y).atan2(aim.x).to_degrees()));
                                match bot.target() {
                                    Some(id) => ui.label(format!("{}", id.0 & 0xffff_ffff)),
                                    None => ui.colored_label(Color32::GRAY, "none"),
                                };
                                ui.end_row();
                            }
                        });
                });
            });
    }
}
