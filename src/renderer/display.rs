//! Display abstraction for 16-bit pixel panels
//!
//! Mirrors the primitive set of small SPI display drivers: solid fills,
//! lines, circles and a text cursor. Coordinates are screen pixels with
//! the origin at the top left.

use bytemuck::{Pod, Zeroable};

/// 16-bit panel color (5 bits red, 6 green, 5 blue)
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
pub struct Rgb565(pub u16);

impl Rgb565 {
    pub const BLACK: Rgb565 = Rgb565(0x0000);
    pub const WHITE: Rgb565 = Rgb565(0xFFFF);

    /// Pack 8-bit channels, dropping the low bits
    pub const fn from_rgb888(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u16 & 0xF8) << 8) | ((g as u16 & 0xFC) << 3) | (b as u16 >> 3))
    }

    /// Expand to 8-bit channels, replicating high bits into the low ones
    pub fn to_rgb888(self) -> [u8; 3] {
        let r = ((self.0 >> 11) & 0x1F) as u8;
        let g = ((self.0 >> 5) & 0x3F) as u8;
        let b = (self.0 & 0x1F) as u8;
        [(r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2)]
    }
}

/// A pixel display the renderer draws on
///
/// Every call is assumed to be slow (it goes out over a serial bus on real
/// hardware), so callers keep the number of touched pixels small.
pub trait Display {
    /// Width and height in pixels
    fn size(&self) -> (i32, i32);
    fn fill_screen(&mut self, color: Rgb565);
    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgb565);
    /// One pixel wide outline
    fn draw_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgb565);
    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb565);
    fn draw_pixel(&mut self, x: i32, y: i32, color: Rgb565);
    fn fill_circle(&mut self, cx: i32, cy: i32, r: i32, color: Rgb565);
    fn draw_circle(&mut self, cx: i32, cy: i32, r: i32, color: Rgb565);
    fn set_cursor(&mut self, x: i32, y: i32);
    /// Foreground and background used by subsequent `print` calls
    fn set_text_color(&mut self, fg: Rgb565, bg: Rgb565);
    fn print(&mut self, text: &str);
}

/// Walk the pixels of a line from (x0, y0) to (x1, y1), both ends included
///
/// Shared by line drawing and line erasing so both touch the same pixels.
pub fn bresenham(x0: i32, y0: i32, x1: i32, y1: i32, mut plot: impl FnMut(i32, i32)) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);

    loop {
        plot(x, y);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Half-width of a filled circle's row at vertical offset `dy`
#[inline]
pub fn circle_span(r: i32, dy: i32) -> Option<i32> {
    let rem = r * r - dy * dy;
    if r < 0 || rem < 0 {
        return None;
    }
    Some((rem as f32).sqrt().floor() as i32)
}
