//! In-memory display
//!
//! A software rasterizer that implements [`Display`] over a plain pixel
//! vector. Used by the desktop demo to dump frames, and by tests to check
//! exactly which pixels a frame touched.

use std::io::{self, Write};

use super::display::{Display, Rgb565, bresenham, circle_span};

/// Text cell size (matches the classic 5x7 font in a 6x8 cell)
pub const CHAR_W: i32 = 6;
pub const CHAR_H: i32 = 8;

/// Counters for everything drawn since the last reset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    pub screen_fills: u32,
    pub pixel_writes: u64,
    pub prints: u32,
}

/// 2D framebuffer of RGB565 pixels
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    width: i32,
    height: i32,
    pixels: Vec<Rgb565>,
    cursor: (i32, i32),
    text_fg: Rgb565,
    text_bg: Rgb565,
    last_text: String,
    stats: DrawStats,
}

impl FrameBuffer {
    pub fn new(width: i32, height: i32) -> Self {
        let len = (width.max(0) as usize) * (height.max(0) as usize);
        Self {
            width,
            height,
            pixels: vec![Rgb565::BLACK; len],
            cursor: (0, 0),
            text_fg: Rgb565::WHITE,
            text_bg: Rgb565::BLACK,
            last_text: String::new(),
            stats: DrawStats::default(),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline(always)]
    fn idx(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        Some((y as usize) * (self.width as usize) + (x as usize))
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgb565> {
        self.idx(x, y).map(|i| self.pixels[i])
    }

    pub fn pixels(&self) -> &[Rgb565] {
        &self.pixels
    }

    /// Raw little-endian RGB565 bytes, as a panel would receive them
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Expanded 8-bit RGB triplets, row-major
    pub fn to_rgb888(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|p| p.to_rgb888()).collect()
    }

    /// Write a binary PPM (P6) image
    pub fn write_ppm<W: Write>(&self, mut out: W) -> io::Result<()> {
        write!(out, "P6\n{} {}\n255\n", self.width, self.height)?;
        out.write_all(&self.to_rgb888())?;
        out.flush()
    }

    pub fn stats(&self) -> DrawStats {
        self.stats
    }

    /// Return the counters and start over from zero
    pub fn take_stats(&mut self) -> DrawStats {
        std::mem::take(&mut self.stats)
    }

    /// Text passed to the most recent `print`
    pub fn last_text(&self) -> &str {
        &self.last_text
    }

    fn hline(&mut self, x: i32, y: i32, w: i32, color: Rgb565) {
        if y < 0 || y >= self.height || w <= 0 {
            return;
        }
        let x0 = x.max(0);
        let x1 = (x + w).min(self.width);
        if x0 >= x1 {
            return;
        }
        let row = (y as usize) * (self.width as usize);
        self.pixels[row + x0 as usize..row + x1 as usize].fill(color);
        self.stats.pixel_writes += (x1 - x0) as u64;
    }

    fn draw_glyph(&mut self, x: i32, y: i32, ch: char) {
        let fg = self.text_fg;
        let bg = self.text_bg;
        self.fill_rect(x, y, CHAR_W, CHAR_H, bg);
        let Some(rows) = glyph(ch) else {
            return;
        };
        // 3x5 glyph inset one pixel into the cell
        for (gy, bits) in rows.iter().enumerate() {
            for gx in 0..3 {
                if bits & (0b100 >> gx) != 0 {
                    self.draw_pixel(x + 1 + gx, y + 1 + gy as i32, fg);
                }
            }
        }
    }
}

/// 3x5 bitmaps for the characters the HUD prints
fn glyph(ch: char) -> Option<[u8; 5]> {
    let rows = match ch {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b010, 0b010, 0b010],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        '%' => [0b101, 0b001, 0b010, 0b100, 0b101],
        _ => return None,
    };
    Some(rows)
}

impl Display for FrameBuffer {
    fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    fn fill_screen(&mut self, color: Rgb565) {
        self.pixels.fill(color);
        self.stats.screen_fills += 1;
        self.stats.pixel_writes += self.pixels.len() as u64;
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgb565) {
        for row in y..y + h.max(0) {
            self.hline(x, row, w, color);
        }
    }

    fn draw_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgb565) {
        if w <= 0 || h <= 0 {
            return;
        }
        self.hline(x, y, w, color);
        if h > 1 {
            self.hline(x, y + h - 1, w, color);
        }
        for row in y + 1..y + h - 1 {
            self.draw_pixel(x, row, color);
            if w > 1 {
                self.draw_pixel(x + w - 1, row, color);
            }
        }
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb565) {
        bresenham(x0, y0, x1, y1, |x, y| self.draw_pixel(x, y, color));
    }

    fn draw_pixel(&mut self, x: i32, y: i32, color: Rgb565) {
        if let Some(i) = self.idx(x, y) {
            self.pixels[i] = color;
            self.stats.pixel_writes += 1;
        }
    }

    fn fill_circle(&mut self, cx: i32, cy: i32, r: i32, color: Rgb565) {
        for dy in -r..=r {
            if let Some(half) = circle_span(r, dy) {
                self.hline(cx - half, cy + dy, 2 * half + 1, color);
            }
        }
    }

    /// Midpoint circle outline
    fn draw_circle(&mut self, cx: i32, cy: i32, r: i32, color: Rgb565) {
        if r < 0 {
            return;
        }
        let mut x = r;
        let mut y = 0;
        let mut err = 1 - r;
        while x >= y {
            for (px, py) in [
                (x, y),
                (y, x),
                (-y, x),
                (-x, y),
                (-x, -y),
                (-y, -x),
                (y, -x),
                (x, -y),
            ] {
                self.draw_pixel(cx + px, cy + py, color);
            }
            y += 1;
            if err < 0 {
                err += 2 * y + 1;
            } else {
                x -= 1;
                err += 2 * (y - x) + 1;
            }
        }
    }

    fn set_cursor(&mut self, x: i32, y: i32) {
        self.cursor = (x, y);
    }

    fn set_text_color(&mut self, fg: Rgb565, bg: Rgb565) {
        self.text_fg = fg;
        self.text_bg = bg;
    }

    fn print(&mut self, text: &str) {
        self.stats.prints += 1;
        self.last_text.clear();
        self.last_text.push_str(text);
        for ch in text.chars() {
            let (x, y) = self.cursor;
            self.draw_glyph(x, y, ch);
            self.cursor.0 += CHAR_W;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_rect_is_clipped() {
        let mut fb = FrameBuffer::new(10, 10);
        fb.fill_rect(-5, 8, 20, 5, Rgb565::WHITE);
        assert_eq!(fb.stats().pixel_writes, 20);
        assert_eq!(fb.pixel(0, 9), Some(Rgb565::WHITE));
        assert_eq!(fb.pixel(0, 7), Some(Rgb565::BLACK));
        assert_eq!(fb.pixel(10, 9), None);
    }

    #[test]
    fn test_fill_circle_is_symmetric() {
        let mut fb = FrameBuffer::new(32, 32);
        fb.fill_circle(16, 16, 6, Rgb565::WHITE);
        assert_eq!(fb.pixel(22, 16), Some(Rgb565::WHITE));
        assert_eq!(fb.pixel(10, 16), Some(Rgb565::WHITE));
        assert_eq!(fb.pixel(16, 22), Some(Rgb565::WHITE));
        assert_eq!(fb.pixel(23, 16), Some(Rgb565::BLACK));
        assert_eq!(fb.pixel(21, 21), Some(Rgb565::BLACK));
    }

    #[test]
    fn test_draw_circle_outline_only() {
        let mut fb = FrameBuffer::new(32, 32);
        fb.draw_circle(16, 16, 5, Rgb565::WHITE);
        assert_eq!(fb.pixel(21, 16), Some(Rgb565::WHITE));
        assert_eq!(fb.pixel(16, 11), Some(Rgb565::WHITE));
        assert_eq!(fb.pixel(16, 16), Some(Rgb565::BLACK));
    }

    #[test]
    fn test_draw_rect_outline() {
        let mut fb = FrameBuffer::new(20, 20);
        fb.draw_rect(2, 2, 5, 4, Rgb565::WHITE);
        assert_eq!(fb.stats().pixel_writes, 14);
        assert_eq!(fb.pixel(4, 4), Some(Rgb565::BLACK));
        assert_eq!(fb.pixel(6, 5), Some(Rgb565::WHITE));
    }

    #[test]
    fn test_print_advances_cursor_and_paints_background() {
        let mut fb = FrameBuffer::new(40, 10);
        fb.set_cursor(0, 0);
        fb.set_text_color(Rgb565::WHITE, Rgb565(0x001F));
        fb.print("1%");
        assert_eq!(fb.last_text(), "1%");
        assert_eq!(fb.stats().prints, 1);
        // Cell background covers both characters, nothing past them
        assert_eq!(fb.pixel(0, 0), Some(Rgb565(0x001F)));
        assert_eq!(fb.pixel(11, 7), Some(Rgb565(0x001F)));
        assert_eq!(fb.pixel(12, 0), Some(Rgb565::BLACK));
        // Middle column of the '1' is lit
        assert_eq!(fb.pixel(2, 1), Some(Rgb565::WHITE));
    }

    #[test]
    fn test_byte_views() {
        let mut fb = FrameBuffer::new(2, 1);
        fb.draw_pixel(1, 0, Rgb565(0xF800));
        assert_eq!(fb.as_bytes().len(), 4);
        assert_eq!(fb.to_rgb888(), vec![0, 0, 0, 255, 0, 0]);

        let mut ppm = Vec::new();
        fb.write_ppm(&mut ppm).unwrap();
        assert!(ppm.starts_with(b"P6\n2 1\n255\n"));
        assert_eq!(ppm.len(), 11 + 6);
    }

    #[test]
    fn test_take_stats_resets() {
        let mut fb = FrameBuffer::new(4, 4);
        fb.fill_screen(Rgb565::WHITE);
        let stats = fb.take_stats();
        assert_eq!(stats.screen_fills, 1);
        assert_eq!(stats.pixel_writes, 16);
        assert_eq!(fb.stats(), DrawStats::default());
    }
}
