//! Damage-tracked incremental rendering
//!
//! After the first full draw the table is never repainted wholesale. Each
//! frame compares the simulation against a [`RenderCache`] of what is on
//! screen and touches only what changed. Layers, bottom to top:
//!
//! 1. background (felt, rail band, outside)
//! 2. pockets
//! 3. object balls
//! 4. cue ball
//! 5. cue stick
//! 6. HUD (power bar and readout)
//!
//! [`DamageRenderer::render`] is the only entry point, so that order holds
//! for every frame: all erasing happens first, then each layer is redrawn
//! wherever the erased area touched it.

use std::iter;

use glam::Vec2;

use super::display::{Display, Rgb565, bresenham, circle_span};
use super::palette::*;
use crate::consts::*;
use crate::direction;
use crate::sim::{Ball, GameState, Pocket};

/// Extra radius erased around a ball, enough to cover its drop shadow
const ERASE_MARGIN: i32 = 2;
/// Pockets within this distance of damage are repainted
const POCKET_RESTORE_MARGIN: i32 = 5;
/// Gap between the cue ball rim and the stick tip
const STICK_GAP: f32 = 2.0;
const STICK_BASE_LENGTH: f32 = 40.0;
/// Extra stick length per point of power
const STICK_POWER_LENGTH: f32 = 0.3;

/// Axis-aligned screen rectangle that was (or will be) repainted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DamageRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl DamageRect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Square bounding a circle
    pub fn around(cx: i32, cy: i32, r: i32) -> Self {
        Self::new(cx - r, cy - r, 2 * r + 1, 2 * r + 1)
    }

    pub fn intersects(&self, other: &DamageRect) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }

    pub fn union(&self, other: &DamageRect) -> DamageRect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = (self.x + self.w).max(other.x + other.w);
        let bottom = (self.y + self.h).max(other.y + other.h);
        DamageRect::new(x, y, right - x, bottom - y)
    }
}

/// Damage accumulated during one frame
#[derive(Debug, Clone, Default)]
pub struct Damage {
    rects: Vec<DamageRect>,
}

impl Damage {
    pub fn add(&mut self, rect: DamageRect) {
        self.rects.push(rect);
    }

    pub fn intersects(&self, rect: &DamageRect) -> bool {
        self.rects.iter().any(|r| r.intersects(rect))
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn clear(&mut self) {
        self.rects.clear();
    }

    pub fn rects(&self) -> &[DamageRect] {
        &self.rects
    }
}

/// Cue stick as last drawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StickPose {
    /// Cue ball center in screen space
    pub origin: Vec2,
    pub angle: f32,
    pub power: f32,
}

impl StickPose {
    /// The three parallel strokes as pixel endpoints (x0, y0, x1, y1)
    fn strokes(&self, ball_radius: f32) -> [(i32, i32, i32, i32); 3] {
        let aim = direction(self.angle);
        // Screen y is flipped relative to the table plane; a degenerate
        // heading lays the stick out horizontally
        let dir = Vec2::new(aim.x, -aim.y).try_normalize().unwrap_or(Vec2::X);
        let tip = self.origin - dir * (ball_radius + STICK_GAP);
        let butt = self.origin
            - dir * (ball_radius + STICK_GAP + STICK_BASE_LENGTH + self.power * STICK_POWER_LENGTH);
        let offset = dir.perp();

        let (x0, y0) = pixel(tip);
        let (x1, y1) = pixel(butt);
        let (ox, oy) = pixel(offset);
        [-1, 0, 1].map(|k| (x0 + k * ox, y0 + k * oy, x1 + k * ox, y1 + k * oy))
    }

    fn bounds(&self, ball_radius: f32) -> DamageRect {
        let strokes = self.strokes(ball_radius);
        let (x0, y0, x1, y1) = strokes[0];
        strokes
            .iter()
            .map(|&(ax, ay, bx, by)| {
                DamageRect::new(ax.min(bx), ay.min(by), (ax - bx).abs() + 1, (ay - by).abs() + 1)
            })
            .fold(
                DamageRect::new(x0.min(x1), y0.min(y1), 1, 1),
                |acc, r| acc.union(&r),
            )
    }
}

/// What the renderer believes is currently on screen
#[derive(Debug, Clone, Default)]
pub struct RenderCache {
    /// Screen position per ball; `None` when nothing is drawn for it
    pub balls: Vec<Option<Vec2>>,
    /// `None` when no stick is on screen
    pub stick: Option<StickPose>,
    /// `None` when the power bar is hidden
    pub power: Option<f32>,
    pub table_drawn: bool,
    /// A collision happened since the last frame; take the safe path
    pub collision_pending: bool,
    /// Balls that jumped instead of rolling since the last frame
    pub teleported: Vec<usize>,
}

/// Incremental table renderer
#[derive(Debug, Default)]
pub struct DamageRenderer {
    cache: RenderCache,
    damage: Damage,
}

impl DamageRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache(&self) -> &RenderCache {
        &self.cache
    }

    /// Forget everything on screen; the next frame repaints the whole table
    pub fn invalidate(&mut self) {
        self.cache = RenderCache::default();
    }

    /// Ball-ball contact reported by physics
    pub fn note_collision(&mut self) {
        self.cache.collision_pending = true;
    }

    /// A ball was placed somewhere new without traveling there
    pub fn note_teleport(&mut self, index: usize) {
        self.cache.teleported.push(index);
    }

    /// Bring the display in line with `state`
    pub fn render<D: Display>(&mut self, display: &mut D, state: &GameState) {
        if !self.cache.table_drawn {
            self.full_redraw(display, state);
            return;
        }

        let n = state.balls.len();
        self.cache.balls.resize(n, None);
        self.damage.clear();

        let radius = BALL_RADIUS;
        let safe = self.cache.collision_pending;
        if safe {
            log::debug!("Collision-safe redraw");
        }

        // Erase pass: stick, balls, HUD

        let stick = stick_pose(state);
        let stick_changed = stick != self.cache.stick;
        if stick_changed {
            if let Some(old) = self.cache.stick.take() {
                erase_stick(display, &old, radius);
                self.damage.add(old.bounds(radius));
            }
        }

        let mut dirty = vec![false; n];
        for (i, ball) in state.balls.iter().enumerate() {
            let cached = self.cache.balls[i];
            let current = ball.on_table().then(|| to_screen(ball.pos));
            if !(safe || ball.is_moving() || cached != current) {
                continue;
            }
            if let Some(old) = cached {
                let path = current.filter(|_| !self.cache.teleported.contains(&i));
                self.erase_ball(display, old, path, radius);
            }
            self.cache.balls[i] = None;
            dirty[i] = current.is_some();
        }

        let power = state.cue.is_charging.then_some(state.cue.power);
        let mut shrunk = None;
        if let Some(old) = self.cache.power {
            match power {
                None => {
                    let hud = hud_rect();
                    erase_rect(display, hud);
                    self.damage.add(hud);
                    self.cache.power = None;
                }
                Some(new) => {
                    let (from, to) = (fill_width(new), fill_width(old));
                    if from < to {
                        let rect = bar_inner(from, to);
                        erase_rect(display, rect);
                        self.damage.add(rect);
                        shrunk = Some(rect);
                    }
                }
            }
        }

        // Draw pass, bottom layer first

        for pocket in state.table.pockets() {
            let rect = pocket_rect(pocket);
            let (cx, cy) = (rect.x + rect.w / 2, rect.y + rect.h / 2);
            let reach = pocket.visual_radius.round() as i32 + POCKET_RESTORE_MARGIN;
            if safe || self.damage.intersects(&DamageRect::around(cx, cy, reach)) {
                draw_pocket(display, pocket);
                self.damage.add(rect);
            }
        }

        for i in draw_order(n) {
            let ball = &state.balls[i];
            if !ball.on_table() {
                continue;
            }
            let rect = ball_rect(ball);
            if dirty[i] || self.damage.intersects(&rect) {
                draw_ball(display, ball);
                self.cache.balls[i] = Some(to_screen(ball.pos));
                self.damage.add(rect);
            }
        }

        match stick {
            Some(pose) => {
                let bounds = pose.bounds(radius);
                if stick_changed || self.damage.intersects(&bounds) {
                    draw_stick(display, &pose, radius);
                    self.damage.add(bounds);
                }
                self.cache.stick = Some(pose);
            }
            None => self.cache.stick = None,
        }

        if let Some(new) = power {
            // The bar's own shrink does not force a full repaint
            let hud = hud_rect();
            let overdrawn = self
                .damage
                .rects()
                .iter()
                .any(|r| Some(*r) != shrunk && r.intersects(&hud));
            let full = self.cache.power.is_none() || overdrawn;
            draw_power_bar(display, new, if full { None } else { self.cache.power });
            self.cache.power = Some(new);
        }

        self.cache.collision_pending = false;
        self.cache.teleported.clear();
    }

    /// Paint the whole table and rebuild the cache from scratch
    fn full_redraw<D: Display>(&mut self, display: &mut D, state: &GameState) {
        log::debug!("Full table redraw");
        display.fill_screen(OUTSIDE);
        let (x, y, w, h) = rail_rect();
        display.fill_rect(x, y, w, h, RAIL);
        let (x, y, w, h) = felt_rect();
        display.fill_rect(x, y, w, h, FELT);

        for pocket in state.table.pockets() {
            draw_pocket(display, pocket);
        }

        self.cache = RenderCache {
            balls: vec![None; state.balls.len()],
            table_drawn: true,
            ..RenderCache::default()
        };
        for i in draw_order(state.balls.len()) {
            let ball = &state.balls[i];
            if ball.on_table() {
                draw_ball(display, ball);
                self.cache.balls[i] = Some(to_screen(ball.pos));
            }
        }

        if let Some(pose) = stick_pose(state) {
            draw_stick(display, &pose, BALL_RADIUS);
            self.cache.stick = Some(pose);
        }
        if state.cue.is_charging {
            draw_power_bar(display, state.cue.power, None);
            self.cache.power = Some(state.cue.power);
        }
    }

    /// Erase a ball's old footprint, plus the path to `to` if it moved far
    fn erase_ball<D: Display>(&mut self, display: &mut D, from: Vec2, to: Option<Vec2>, r: f32) {
        let radius = r.round() as i32 + ERASE_MARGIN;
        self.erase_footprint(display, from, radius);

        let Some(to) = to else {
            return;
        };
        let travel = to - from;
        let distance = travel.length();
        if distance > 3.0 * r {
            let dir = travel / distance;
            let step = r / 2.0;
            let mut along = step;
            while along < distance {
                self.erase_footprint(display, from + dir * along, radius);
                along += step;
            }
        }
    }

    fn erase_footprint<D: Display>(&mut self, display: &mut D, p: Vec2, radius: i32) {
        let (x, y) = pixel(p);
        erase_disk(display, x, y, radius);
        self.damage.add(DamageRect::around(x, y, radius));
    }
}

/// Object balls in index order, then the cue ball
fn draw_order(n: usize) -> impl Iterator<Item = usize> {
    (0..n)
        .filter(|&i| i != CUE_BALL)
        .chain(iter::once(CUE_BALL).filter(move |&i| i < n))
}

/// Stick is shown while aiming with the cue ball at rest
fn stick_pose(state: &GameState) -> Option<StickPose> {
    let cue_ball = state.cue_ball();
    if !state.cue.is_aiming || cue_ball.is_moving() || !cue_ball.on_table() {
        return None;
    }
    Some(StickPose {
        origin: to_screen(cue_ball.pos),
        angle: state.cue.angle,
        power: state.cue.power,
    })
}

fn ball_rect(ball: &Ball) -> DamageRect {
    let (x, y) = pixel(to_screen(ball.pos));
    DamageRect::around(x, y, ball.radius.round() as i32 + ERASE_MARGIN)
}

fn pocket_rect(pocket: &Pocket) -> DamageRect {
    let (x, y) = pixel(to_screen(pocket.center));
    DamageRect::around(x, y, pocket.visual_radius.round() as i32)
}

/// Bar frame plus the percentage readout
fn hud_rect() -> DamageRect {
    let bar = DamageRect::new(POWER_BAR_X, POWER_BAR_Y, POWER_BAR_W, POWER_BAR_H);
    let text = DamageRect::new(POWER_TEXT_X, POWER_TEXT_Y, POWER_TEXT_W, POWER_BAR_H);
    bar.union(&text)
}

/// Filled span inside the bar frame for a power level
fn fill_width(power: f32) -> i32 {
    let inner = (POWER_BAR_W - 2) as f32;
    ((power / MAX_POWER).clamp(0.0, 1.0) * inner).round() as i32
}

/// Columns [from, to) of the bar interior
fn bar_inner(from: i32, to: i32) -> DamageRect {
    DamageRect::new(POWER_BAR_X + 1 + from, POWER_BAR_Y + 1, to - from, POWER_BAR_H - 2)
}

/// Repaint a horizontal run with whatever the table has underneath
fn erase_row<D: Display>(display: &mut D, x0: i32, x1: i32, y: i32) {
    let mut start = x0;
    while start <= x1 {
        let color = background_at(start, y);
        let mut end = start;
        while end < x1 && background_at(end + 1, y) == color {
            end += 1;
        }
        display.fill_rect(start, y, end - start + 1, 1, color);
        start = end + 1;
    }
}

fn erase_disk<D: Display>(display: &mut D, cx: i32, cy: i32, r: i32) {
    for dy in -r..=r {
        if let Some(half) = circle_span(r, dy) {
            erase_row(display, cx - half, cx + half, cy + dy);
        }
    }
}

fn erase_rect<D: Display>(display: &mut D, rect: DamageRect) {
    for y in rect.y..rect.y + rect.h {
        erase_row(display, rect.x, rect.x + rect.w - 1, y);
    }
}

/// Walk the stick's strokes pixel by pixel, restoring the background
fn erase_stick<D: Display>(display: &mut D, pose: &StickPose, ball_radius: f32) {
    for (x0, y0, x1, y1) in pose.strokes(ball_radius) {
        bresenham(x0, y0, x1, y1, |x, y| display.draw_pixel(x, y, background_at(x, y)));
    }
}

fn draw_stick<D: Display>(display: &mut D, pose: &StickPose, ball_radius: f32) {
    for (x0, y0, x1, y1) in pose.strokes(ball_radius) {
        display.draw_line(x0, y0, x1, y1, STICK);
    }
}

fn draw_pocket<D: Display>(display: &mut D, pocket: &Pocket) {
    let (x, y) = pixel(to_screen(pocket.center));
    let r = pocket.visual_radius.round() as i32;
    display.fill_circle(x, y, r, POCKET);
    display.draw_circle(x, y, r, POCKET_RIM);
}

/// Shadow, body, then a small specular highlight
fn draw_ball<D: Display>(display: &mut D, ball: &Ball) {
    let (x, y) = pixel(to_screen(ball.pos));
    let r = ball.radius.round() as i32;
    display.fill_circle(x - 1, y + 1, r, SHADOW);
    display.fill_circle(x, y, r, Rgb565(ball.color));
    let highlight = if ball.is_cue() { CUE_HIGHLIGHT } else { HIGHLIGHT };
    display.fill_circle(x - 2, y - 2, 2, highlight);
}

/// Draw the power bar; `previous` is the level already on screen, if any
fn draw_power_bar<D: Display>(display: &mut D, power: f32, previous: Option<f32>) {
    let width = fill_width(power);
    match previous {
        None => {
            display.draw_rect(POWER_BAR_X, POWER_BAR_Y, POWER_BAR_W, POWER_BAR_H, POWER_FRAME);
            let filled = bar_inner(0, width);
            display.fill_rect(filled.x, filled.y, filled.w, filled.h, POWER_FILL);
            erase_rect(display, bar_inner(width, POWER_BAR_W - 2));
        }
        Some(old) => {
            let old_width = fill_width(old);
            if width > old_width {
                let grown = bar_inner(old_width, width);
                display.fill_rect(grown.x, grown.y, grown.w, grown.h, POWER_FILL);
            }
            if power_label(old) == power_label(power) {
                return;
            }
        }
    }
    display.set_cursor(POWER_TEXT_X, POWER_TEXT_Y);
    display.set_text_color(HUD_TEXT, background_at(POWER_TEXT_X, POWER_TEXT_Y));
    display.print(&power_label(power));
}

fn power_label(power: f32) -> String {
    format!("{:>3}%", power.round() as i32)
}
