use catppuccin_egui::set_theme;
use macroquad::prelude::*;
use egui::{self};

use crate::engine::GameCamera;
use crate::simulation::Simulation;
use crate::ui::components::{DebugPanel, Hud};
use crate::ui::events::AppAction;

fn auto_zoom(ctx: &egui::Context, base_px: egui::Vec2) -> f32 {
    let logical = ctx.screen_rect().size();
    let win_px = logical * ctx.pixels_per_point(); // physical pixels
    let s = (win_px.x / base_px.x).min(win_px.y / base_px.y);
    ((s * 4.0).round() / 4.0).clamp(0.75, 3.0) // snap to 0.25 for crisp text
}

pub struct UIManager {
    debug_panel: DebugPanel,
    hud: Hud,
    last_win_px: egui::Vec2,
}

impl UIManager {
    pub fn new() -> Self {
        Self {
            debug_panel: DebugPanel::new(),
            hud: Hud::new(),
            last_win_px: egui::vec2(0.0, 0.0),
        }
    }

    pub fn toggle_debug_panel(&mut self) {
        self.debug_panel.toggle();
    }

    pub fn show_bot_overlay(&self) -> bool {
        self.debug_panel.wants_overlay()
    }

    /// Builds this frame's UI. Returns the requested action, if any, and whether
    /// the pointer is over a UI element.
    pub fn update(
        &mut self,
        simulation: &Simulation,
        camera: &GameCamera,
    ) -> (Option<AppAction>, bool) {
        self.debug_panel.update();

        let mut app_action = None;
        let mut input_consumed = false;

        new_egui_macroquad::ui(|egui_ctx| {
            set_theme(egui_ctx, catppuccin_egui::MOCHA);
            // Auto-zoom only on window resize or DPI change
            let win_px = egui_ctx.screen_rect().size() * egui_ctx.pixels_per_point();
            if (win_px.x - self.last_win_px.x).abs() > 1.0
                || (win_px.y - self.last_win_px.y).abs() > 1.0
            {
                self.last_win_px = win_px;
                let target = auto_zoom(egui_ctx, egui::vec2(1920.0, 1080.0));
                egui_ctx.set_zoom_factor(target);
            }

            app_action = self.hud.draw(egui_ctx, simulation);
            self.debug_panel.draw(egui_ctx, simulation, camera);
            input_consumed = egui_ctx.is_pointer_over_area();
        });

        (app_action, input_consumed)
    }

    pub fn render(&self) {
        new_egui_macroquad::draw();
    }
}
