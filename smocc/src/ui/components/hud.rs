use crate::simulation::Simulation;
use crate::ui::events::AppAction;
use crate::ui::{BASE_BUTTON_HEIGHT, BASE_BUTTON_WIDTH, BASE_PADDING, BASE_SPACING};
use egui::RichText;
use shared::SessionView;

/// Score, clock and running buffs while playing; a start prompt otherwise.
pub struct Hud;

impl Hud {
    pub fn new() -> Self {
        Self
    }

    pub fn draw(&self, egui_ctx: &egui::Context, simulation: &Simulation) -> Option<AppAction> {
        if simulation.session.is_running() {
            self.draw_status(egui_ctx, simulation);
            None
        } else {
            self.draw_start_prompt(egui_ctx, simulation)
        }
    }

    fn draw_status(&self, egui_ctx: &egui::Context, simulation: &Simulation) {
        let session = &simulation.session;

        egui::Area::new(egui::Id::new("hud_status"))
            .anchor(egui::Align2::LEFT_TOP, egui::vec2(BASE_PADDING, BASE_PADDING))
            .interactable(false)
            .show(egui_ctx, |ui| {
                ui.label(RichText::new(format!("Score: {}", session.score())).size(20.0).strong());
                ui.label(format!("Time: {:.1}s", session.elapsed_ms() / 1000.0));
                ui.add_space(BASE_SPACING);

                for (kind, left) in simulation.buffs.active() {
                    ui.label(format!("{} ({:.1}s)", kind.title(), left / 1000.0));
                }
            });
    }

    fn draw_start_prompt(
        &self,
        egui_ctx: &egui::Context,
        simulation: &Simulation,
    ) -> Option<AppAction> {
        let session = &simulation.session;
        let mut action = None;
        let played = session.elapsed_ms() > 0.0;

        egui::Window::new(if played { "Game over" } else { "SMOCC" })
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .collapsible(false)
            .resizable(false)
            .show(egui_ctx, |ui| {
                ui.vertical_centered(|ui| {
                    if played {
                        ui.label(RichText::new(format!("Score: {}", session.score())).size(24.0));
                        ui.label(format!("Best: {}", session.best_score()));
                    } else {
                        ui.label("Move with WASD or the arrow keys, aim with the mouse.");
                        ui.label("Shoot enemies and pick up the buffs they drop.");
                    }
                    ui.add_space(BASE_SPACING);

                    let button = egui::Button::new(if played { "Retry" } else { "Start" });
                    if ui
                        .add_sized([BASE_BUTTON_WIDTH * 2.0, BASE_BUTTON_HEIGHT], button)
                        .clicked()
                    {
                        action = Some(AppAction::StartGame);
                    }
                    ui.small("or press Enter");
                });
            });

        action
    }
}
