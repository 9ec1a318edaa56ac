//! Game state and core simulation types
//!
//! Everything the physics tick and the cue controller mutate lives in
//! [`GameState`]. It is owned by the frame orchestrator and passed by
//! reference; there is no global simulation state.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::table::Table;
use crate::consts::*;
use crate::tuning::Tuning;

/// Ball colors (RGB565)
pub mod ball_colors {
    pub const CUE: u16 = 0xFFFF;
    pub const RACK: [u16; 15] = [
        0xF800, // Red
        0xFFE0, // Yellow
        0x07E0, // Green
        0x001F, // Blue
        0xF81F, // Magenta
        0x8410, // Brown
        0x07FF, // Cyan
        0x0000, // Black (8-ball)
        0xFC00, // Orange
        0x7BE0, // Light green
        0x041F, // Light blue
        0xFB56, // Pink
        0xFA00, // Orange-red
        0x03E0, // Dark green
        0x0010, // Navy
    ];
}

/// Ball lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BallState {
    /// On the table, not moving
    #[default]
    Resting,
    /// On the table, integrated every tick
    Moving,
    /// In a pocket; position is meaningless from here on
    Captured,
}

/// A ball on the table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    /// 0 for the cue ball, 1..=15 for object balls
    pub number: u8,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// RGB565 color
    pub color: u16,
    pub state: BallState,
}

impl Ball {
    pub fn new(number: u8, pos: Vec2, color: u16) -> Self {
        Self {
            number,
            pos,
            vel: Vec2::ZERO,
            radius: BALL_RADIUS,
            color,
            state: BallState::Resting,
        }
    }

    #[inline]
    pub fn is_cue(&self) -> bool {
        self.number as usize == CUE_BALL
    }

    #[inline]
    pub fn is_moving(&self) -> bool {
        self.state == BallState::Moving
    }

    #[inline]
    pub fn is_captured(&self) -> bool {
        self.state == BallState::Captured
    }

    /// Still on the table (resting or moving)
    #[inline]
    pub fn on_table(&self) -> bool {
        !self.is_captured()
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    /// Zero velocity and mark resting
    pub fn stop(&mut self) {
        self.vel = Vec2::ZERO;
        self.state = BallState::Resting;
    }

    /// Mark moving unless already pocketed
    pub fn wake(&mut self) {
        if self.state == BallState::Resting {
            self.state = BallState::Moving;
        }
    }
}

/// Aim and power of the cue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CueState {
    /// Aim angle in radians, always in [0, 2π)
    pub angle: f32,
    /// Shot power in [0, 100]
    pub power: f32,
    pub is_aiming: bool,
    pub is_charging: bool,
}

impl Default for CueState {
    fn default() -> Self {
        Self {
            angle: 0.0,
            power: 0.0,
            is_aiming: true,
            is_charging: false,
        }
    }
}

/// Something that happened during a physics tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimEvent {
    /// Two balls touched (reported once per pair per resolver pass)
    Collision { a: usize, b: usize },
    /// An object ball dropped into a pocket for good
    Pocketed { ball: usize, pocket: usize },
    /// The cue ball dropped and was put back on its spot
    CueBallRespawned { pocket: usize },
    /// Every ball came to rest after a shot
    TableSettled,
}

/// Result of one physics tick
#[derive(Debug, Clone, Default)]
pub struct StepReport {
    /// A ball-ball contact was resolved on the first relaxation iteration
    pub collided: bool,
    pub events: Vec<SimEvent>,
}

/// Complete simulation context
#[derive(Debug, Clone)]
pub struct GameState {
    pub table: Table,
    pub tuning: Tuning,
    /// Index `CUE_BALL` is the cue ball
    pub balls: Vec<Ball>,
    pub cue: CueState,
    /// Physics ticks since the last reset
    pub time_ticks: u64,
}

impl GameState {
    pub fn new(tuning: Tuning) -> Self {
        let table = Table::standard(&tuning);
        let mut state = Self {
            table,
            tuning,
            balls: Vec::new(),
            cue: CueState::default(),
            time_ticks: 0,
        };
        state.rack();
        state
    }

    /// Put every ball back in its starting spot and reset the cue
    pub fn rack(&mut self) {
        self.balls.clear();
        self.balls.push(Ball::new(CUE_BALL as u8, CUE_START, ball_colors::CUE));
        for (i, pos) in rack_positions(RACK_APEX, RACK_ROWS, BALL_RADIUS)
            .into_iter()
            .enumerate()
        {
            let color = ball_colors::RACK[i % ball_colors::RACK.len()];
            self.balls.push(Ball::new(i as u8 + 1, pos, color));
        }
        self.cue = CueState::default();
        self.time_ticks = 0;
    }

    pub fn cue_ball(&self) -> &Ball {
        &self.balls[CUE_BALL]
    }

    pub fn cue_ball_mut(&mut self) -> &mut Ball {
        &mut self.balls[CUE_BALL]
    }

    /// Any ball still rolling
    pub fn any_moving(&self) -> bool {
        self.balls.iter().any(Ball::is_moving)
    }

    /// Balls still on the table (cue ball included)
    pub fn count_on_table(&self) -> usize {
        self.balls.iter().filter(|b| b.on_table()).count()
    }

    /// Total kinetic energy of all balls on the table
    pub fn kinetic_energy(&self) -> f32 {
        self.balls
            .iter()
            .filter(|b| b.on_table())
            .map(|b| crate::kinetic_energy(b.vel))
            .sum()
    }
}

/// Triangle rack with the apex pointing toward the cue ball (-x)
///
/// Rows grow away from the apex; each row is one ball taller and
/// centered on the apex line.
pub fn rack_positions(apex: Vec2, rows: usize, radius: f32) -> Vec<Vec2> {
    // Slightly looser than touching so the break has something to separate
    let row_spacing = radius * 3f32.sqrt() + 0.5;
    let ball_spacing = radius * 2.0 + 1.0;
    let mut positions = Vec::with_capacity(rows * (rows + 1) / 2);
    for row in 0..rows {
        let x = apex.x + row as f32 * row_spacing;
        let top = apex.y + row as f32 * ball_spacing / 2.0;
        for k in 0..=row {
            positions.push(Vec2::new(x, top - k as f32 * ball_spacing));
        }
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rack_layout() {
        let state = GameState::new(Tuning::default());
        assert_eq!(state.balls.len(), 16);
        assert!(state.cue_ball().is_cue());
        assert_eq!(state.cue_ball().pos, CUE_START);
        assert!(state.balls.iter().all(|b| b.state == BallState::Resting));
        assert!(state.cue.is_aiming);
        assert!(!state.cue.is_charging);
    }

    #[test]
    fn test_rack_balls_do_not_overlap() {
        let positions = rack_positions(RACK_APEX, RACK_ROWS, BALL_RADIUS);
        assert_eq!(positions.len(), 15);
        for i in 0..positions.len() {
            for j in (i + 1)..positions.len() {
                let d = (positions[i] - positions[j]).length();
                assert!(d >= BALL_RADIUS * 2.0, "balls {} and {} overlap ({})", i, j, d);
            }
        }
    }

    #[test]
    fn test_rack_clear_of_pockets() {
        let state = GameState::new(Tuning::default());
        for ball in &state.balls {
            assert!(state.table.contains(ball.pos));
            assert!(!state.table.is_near_pocket(ball.pos));
            assert!(!state.table.is_in_attraction_zone(ball.pos));
        }
    }

    #[test]
    fn test_wake_does_not_revive_captured() {
        let mut ball = Ball::new(3, Vec2::new(100.0, 100.0), 0xF800);
        ball.state = BallState::Captured;
        ball.wake();
        assert!(ball.is_captured());
    }

    #[test]
    fn test_count_on_table() {
        let mut state = GameState::new(Tuning::default());
        state.balls[4].state = BallState::Captured;
        assert_eq!(state.count_on_table(), 15);
    }
}
