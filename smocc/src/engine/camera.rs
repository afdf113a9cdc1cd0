use macroquad::prelude::*;

/// World rectangle to show so the whole playfield fits the screen without
/// distortion. The spare axis is padded evenly on both sides.
pub fn visible_rect(playfield: Vec2, screen: Vec2) -> Rect {
    let playfield_ratio = playfield.x / playfield.y;
    let screen_ratio = screen.x / screen.y;

    if playfield_ratio >= screen_ratio {
        // Playfield is wider than screen, pad vertically
        let height = playfield.x / screen_ratio;
        let pad = (height - playfield.y) / 2.0;
        Rect::new(0.0, -pad, playfield.x, height)
    } else {
        // Playfield is taller than screen, pad horizontally
        let width = playfield.y * screen_ratio;
        let pad = (width - playfield.x) / 2.0;
        Rect::new(-pad, 0.0, width, playfield.y)
    }
}

/// Keeps the playfield fitted to the window
pub struct GameCamera {
    pub playfield: Vec2,
    screen: Vec2,

    /// The actual macroquad camera object
    pub camera: Camera2D,
}

impl GameCamera {
    pub fn new(playfield: Vec2) -> Self {
        let screen = vec2(screen_width(), screen_height());
        Self {
            playfield,
            screen,
            camera: Camera2D::from_display_rect(visible_rect(playfield, screen)),
        }
    }

    /// Refits the camera when the window size changed.
    pub fn handle_resize(&mut self) {
        let screen = vec2(screen_width(), screen_height());
        if screen != self.screen && screen.x > 0.0 && screen.y > 0.0 {
            self.screen = screen;
            self.camera = Camera2D::from_display_rect(visible_rect(self.playfield, screen));
        }
    }

    /// Converts the current mouse screen position to world coordinates
    pub fn get_mouse_world_pos(&self) -> Vec2 {
        self.camera.screen_to_world(Vec2::from(mouse_position()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_matching_ratio_needs_no_padding() {
        let rect = visible_rect(vec2(1000.0, 720.0), vec2(500.0, 360.0));
        assert_abs_diff_eq!(rect.x, 0.0, epsilon = 1e-3);
        assert_abs_diff_eq!(rect.y, 0.0, epsilon = 1e-3);
        assert_abs_diff_eq!(rect.w, 1000.0, epsilon = 1e-3);
        assert_abs_diff_eq!(rect.h, 720.0, epsilon = 1e-3);
    }

    #[test]
    fn test_wide_screen_pads_sides() {
        let rect = visible_rect(vec2(1000.0, 720.0), vec2(2000.0, 720.0));
        assert_abs_diff_eq!(rect.h, 720.0);
        assert_abs_diff_eq!(rect.w, 2000.0, epsilon = 1e-2);
        assert_abs_diff_eq!(rect.x, -500.0, epsilon = 1e-2);
    }

    #[test]
    fn test_tall_screen_pads_top_and_bottom() {
        let rect = visible_rect(vec2(1000.0, 720.0), vec2(1000.0, 1000.0));
        assert_abs_diff_eq!(rect.w, 1000.0);
        assert_abs_diff_eq!(rect.h, 1000.0, epsilon = 1e-3);
        assert_abs_diff_eq!(rect.y, -140.0, epsilon = 1e-3);
    }
}
