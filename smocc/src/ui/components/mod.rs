// Components for the UI system
mod debug_panel;
mod hud;

// Export components
pub use debug_panel::DebugPanel;
pub use hud::Hud;
