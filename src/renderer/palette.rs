//! Colors and screen layout
//!
//! The table plane has y growing upward; screen rows grow downward.
//! Everything in here works in screen pixels.

use glam::Vec2;

use super::display::Rgb565;
use crate::consts::*;

pub const FELT: Rgb565 = Rgb565(0x03E0);
pub const RAIL: Rgb565 = Rgb565(0x8200);
pub const OUTSIDE: Rgb565 = Rgb565(0x0000);
pub const POCKET: Rgb565 = Rgb565(0x0000);
pub const POCKET_RIM: Rgb565 = RAIL;
pub const SHADOW: Rgb565 = Rgb565(0x2104);
pub const HIGHLIGHT: Rgb565 = Rgb565::WHITE;
/// Silver, so the highlight shows on the white cue ball
pub const CUE_HIGHLIGHT: Rgb565 = Rgb565(0xC618);
pub const STICK: Rgb565 = Rgb565(0xC4A6);
pub const POWER_FRAME: Rgb565 = Rgb565::WHITE;
pub const POWER_FILL: Rgb565 = Rgb565(0xFD20);
pub const HUD_TEXT: Rgb565 = Rgb565::WHITE;

/// Power bar placement, in the top margin between the corner and side pockets
pub const POWER_BAR_X: i32 = 38;
pub const POWER_BAR_Y: i32 = 4;
pub const POWER_BAR_W: i32 = 74;
pub const POWER_BAR_H: i32 = 8;
/// Percentage readout right of the bar ("100%" is 4 cells of 6x8)
pub const POWER_TEXT_X: i32 = POWER_BAR_X + POWER_BAR_W + 6;
pub const POWER_TEXT_Y: i32 = POWER_BAR_Y;
pub const POWER_TEXT_W: i32 = 4 * 6;

/// Screen rectangle as (x, y, w, h)
pub type ScreenRect = (i32, i32, i32, i32);

/// Map a table-plane position to screen pixels (float, not yet rounded)
#[inline]
pub fn to_screen(p: Vec2) -> Vec2 {
    Vec2::new(p.x, SCREEN_HEIGHT as f32 - p.y)
}

/// Round a screen position to a pixel
#[inline]
pub fn pixel(p: Vec2) -> (i32, i32) {
    (p.x.round() as i32, p.y.round() as i32)
}

/// Playing surface on screen
pub fn felt_rect() -> ScreenRect {
    let x = TABLE_X as i32;
    let y = SCREEN_HEIGHT - (TABLE_Y + TABLE_HEIGHT) as i32;
    (x, y, TABLE_WIDTH as i32, TABLE_HEIGHT as i32)
}

/// Felt plus the rail band around it
pub fn rail_rect() -> ScreenRect {
    let (x, y, w, h) = felt_rect();
    let t = RAIL_THICKNESS as i32;
    (x - t, y - t, w + 2 * t, h + 2 * t)
}

#[inline]
fn rect_contains((x, y, w, h): ScreenRect, px: i32, py: i32) -> bool {
    px >= x && px < x + w && py >= y && py < y + h
}

/// What the static table looks like at a screen pixel, ignoring pockets
pub fn background_at(sx: i32, sy: i32) -> Rgb565 {
    if rect_contains(felt_rect(), sx, sy) {
        FELT
    } else if rect_contains(rail_rect(), sx, sy) {
        RAIL
    } else {
        OUTSIDE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_regions() {
        assert_eq!(background_at(160, 120), FELT);
        assert_eq!(background_at(20, 20), FELT);
        assert_eq!(background_at(19, 120), RAIL);
        assert_eq!(background_at(16, 120), RAIL);
        assert_eq!(background_at(15, 120), OUTSIDE);
        assert_eq!(background_at(300, 120), RAIL);
        assert_eq!(background_at(5, 5), OUTSIDE);
    }

    #[test]
    fn test_to_screen_flips_y() {
        let top_left = to_screen(Vec2::new(TABLE_X, TABLE_Y + TABLE_HEIGHT));
        let (x, y, _, _) = felt_rect();
        assert_eq!(pixel(top_left), (x, y));
        assert_eq!(pixel(to_screen(Vec2::new(100.0, 180.0))), (100, 60));
    }

    #[test]
    fn test_hud_clear_of_rails() {
        let (_, rail_y, _, _) = rail_rect();
        assert!(POWER_BAR_Y + POWER_BAR_H <= rail_y);
        assert!(POWER_TEXT_X + POWER_TEXT_W <= SCREEN_WIDTH);
    }
}
