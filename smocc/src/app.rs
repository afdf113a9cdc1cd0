use crate::config::GameConfig;
use crate::engine::Renderer;
use crate::simulation::{PlayerInput, Simulation};
use crate::ui::UIManager;
use crate::ui::events::AppAction;
use log::warn;
use macroquad::prelude::*;

/// Main application structure for SMOCC.
pub struct SmoccApp {
    ui: UIManager,          // Manages all UI elements and interactions.
    renderer: Renderer,     // Responsible for drawing the game world.
    simulation: Simulation, // Core game logic.
}

impl SmoccApp {
    pub fn new(config: &GameConfig, seed: Option<u64>) -> Self {
        let simulation = Simulation::new(config, seed);
        let playfield = vec2(config.playfield.width, config.playfield.height);

        Self {
            ui: UIManager::new(),
            renderer: Renderer::new(playfield),
            simulation,
        }
    }

    /// Runs the main application loop.
    pub async fn run(&mut self) {
        loop {
            let (app_action, ui_consumed_input) =
                self.ui.update(&self.simulation, &self.renderer.game_camera);
            self.handle_app_actions(app_action);
            if let Some(action) = self.handle_global_shortcuts() {
                self.handle_app_actions(Some(action));
            }

            let input = self.sample_input(ui_consumed_input);
            let frame_ms = get_frame_time() * 1000.0;
            self.simulation.step(frame_ms, &input);

            self.render();

            // Yield back to Macroquad (swap buffers, poll events, vsync)
            next_frame().await;
        }
    }

    fn handle_global_shortcuts(&mut self) -> Option<AppAction> {
        if is_key_pressed(KeyCode::F3) {
            return Some(AppAction::ToggleDebugPanel);
        }
        if !self.simulation.is_running()
            && (is_key_pressed(KeyCode::Enter) || is_key_pressed(KeyCode::Space))
        {
            return Some(AppAction::StartGame);
        }
        None
    }

    fn handle_app_actions(&mut self, action: Option<AppAction>) {
        match action {
            Some(AppAction::StartGame) => {
                if let Err(e) = self.simulation.begin() {
                    warn!("Could not start the game: {}", e);
                }
            }
            Some(AppAction::ToggleDebugPanel) => self.ui.toggle_debug_panel(),
            None => {}
        }
    }

    /// Reads movement keys and the cursor. The cursor is ignored while it is
    /// over the UI.
    fn sample_input(&self, ui_consumed_input: bool) -> PlayerInput {
        let axis = |negative: &[KeyCode], positive: &[KeyCode]| -> f32 {
            let down = |keys: &[KeyCode]| keys.iter().any(|&k| is_key_down(k));
            match (down(negative), down(positive)) {
                (true, false) => -1.0,
                (false, true) => 1.0,
                _ => 0.0,
            }
        };

        let movement = vec2(
            axis(&[KeyCode::A, KeyCode::Left], &[KeyCode::D, KeyCode::Right]),
            axis(&[KeyCode::W, KeyCode::Up], &[KeyCode::S, KeyCode::Down]),
        );
        let cursor = (!ui_consumed_input).then(|| self.renderer.game_camera.get_mouse_world_pos());

        PlayerInput { movement, cursor }
    }

    fn render(&mut self) {
        let overlay = self.ui.show_bot_overlay();
        self.renderer.render(&self.simulation, overlay);
        self.ui.render();
    }
}
