mod camera;
mod rendering;

pub use camera::GameCamera;
pub use rendering::Renderer;

use macroquad::prelude::Color;

// Palette, roughly catppuccin mocha to match the egui theme
pub const BACKGROUND_COLOR: Color = Color::new(0.118, 0.118, 0.180, 1.0);
pub const LETTERBOX_COLOR: Color = Color::new(0.067, 0.067, 0.106, 1.0);
pub const FOREGROUND_COLOR: Color = Color::new(0.804, 0.839, 0.957, 1.0);
pub const PLAYER_COLOR: Color = Color::new(0.537, 0.706, 0.980, 1.0);
pub const BOT_COLOR: Color = Color::new(0.651, 0.890, 0.631, 1.0);
pub const BULLET_COLOR: Color = Color::new(0.976, 0.886, 0.686, 1.0);
pub const BUFF_COLOR: Color = Color::new(0.796, 0.651, 0.969, 1.0);
pub const EXPLOSION_COLOR: Color = Color::new(0.980, 0.702, 0.529, 1.0);
pub const DEBUG_COLOR: Color = Color::new(0.953, 0.545, 0.659, 0.6);

pub const AIM_LINE_LENGTH: f32 = 12.0;
