//! Billiard Table - a pocket billiards simulation for slow pixel displays
//!
//! Core modules:
//! - `sim`: Frame-stepped simulation (table geometry, physics, cue control)
//! - `renderer`: Damage-based incremental renderer over an abstract display
//! - `game`: Frame orchestrator tying simulation and rendering together
//! - `tuning`: Data-driven physics feel

pub mod game;
pub mod renderer;
pub mod sim;
pub mod tuning;

pub use game::{BilliardGame, FrameClock};
pub use tuning::Tuning;

use glam::Vec2;

/// Table and simulation configuration constants
pub mod consts {
    use glam::Vec2;

    /// Fixed simulation timestep (one physics tick per 60 Hz frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum ticks per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Display dimensions (ST7789 panel in landscape)
    pub const SCREEN_WIDTH: i32 = 320;
    pub const SCREEN_HEIGHT: i32 = 240;

    /// Playing surface, in table-plane units (y grows upward)
    pub const TABLE_X: f32 = 20.0;
    pub const TABLE_Y: f32 = 20.0;
    pub const TABLE_WIDTH: f32 = 280.0;
    pub const TABLE_HEIGHT: f32 = 200.0;
    /// Rail band drawn just outside the playing surface
    pub const RAIL_THICKNESS: f32 = 4.0;
    /// Visible pocket hole radius
    pub const POCKET_RADIUS: f32 = 12.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 6.0;
    /// Index of the cue ball in the ball list
    pub const CUE_BALL: usize = 0;
    /// Cue ball spot (bottom left quarter of the table)
    pub const CUE_START: Vec2 = Vec2::new(TABLE_X + 80.0, TABLE_Y + TABLE_HEIGHT - 40.0);
    /// Apex of the rack triangle
    pub const RACK_APEX: Vec2 = Vec2::new(TABLE_X + TABLE_WIDTH - 100.0, TABLE_Y + TABLE_HEIGHT / 2.0);
    /// Rows in the rack (5 rows = 15 object balls)
    pub const RACK_ROWS: usize = 5;

    /// Maximum shot power
    pub const MAX_POWER: f32 = 100.0;
}

/// Normalize an angle to [0, 2π)
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    use std::f32::consts::TAU;
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Unit direction for an angle
#[inline]
pub fn direction(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}

/// Kinetic energy of a unit-mass body
#[inline]
pub fn kinetic_energy(vel: Vec2) -> f32 {
    0.5 * vel.length_squared()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f32::consts::{PI, TAU};

    #[test]
    fn test_normalize_angle_wraps_negative() {
        let a = normalize_angle(-0.1);
        assert!((a - (TAU - 0.1)).abs() < 1e-5);
    }

    #[test]
    fn test_normalize_angle_full_turn_is_zero() {
        assert_eq!(normalize_angle(TAU), 0.0);
        assert_eq!(normalize_angle(0.0), 0.0);
        assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-5);
    }

    #[test]
    fn test_normalize_angle_non_finite() {
        assert_eq!(normalize_angle(f32::NAN), 0.0);
        assert_eq!(normalize_angle(f32::INFINITY), 0.0);
    }

    proptest! {
        #[test]
        fn prop_normalize_angle_in_range(angle in -1000.0f32..1000.0) {
            let a = normalize_angle(angle);
            prop_assert!(a >= 0.0);
            prop_assert!(a < TAU);
        }

        #[test]
        fn prop_normalize_angle_tiny_negatives(angle in -1e-6f32..0.0) {
            let a = normalize_angle(angle);
            prop_assert!(a >= 0.0 && a < TAU);
        }
    }
}
