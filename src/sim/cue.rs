//! Cue controller: aiming, charging and releasing a shot
//!
//! Aiming → Charging → shot in flight → (table settles) → Aiming.
//! Aim changes are only accepted while aiming with the cue ball at rest.

use std::f32::consts::{FRAC_PI_4, PI};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::GameState;
use crate::consts::*;
use crate::{direction, normalize_angle};

/// Compass headings in the table plane (north is +y, east is +x)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Heading {
    East,
    NorthEast,
    North,
    NorthWest,
    West,
    SouthWest,
    South,
    SouthEast,
}

impl Heading {
    pub const ALL: [Heading; 8] = [
        Heading::East,
        Heading::NorthEast,
        Heading::North,
        Heading::NorthWest,
        Heading::West,
        Heading::SouthWest,
        Heading::South,
        Heading::SouthEast,
    ];

    /// Angle in radians, in [0, 2π)
    pub fn angle(self) -> f32 {
        match self {
            Heading::East => 0.0,
            Heading::NorthEast => FRAC_PI_4,
            Heading::North => PI / 2.0,
            Heading::NorthWest => 3.0 * FRAC_PI_4,
            Heading::West => PI,
            Heading::SouthWest => 5.0 * FRAC_PI_4,
            Heading::South => 3.0 * PI / 2.0,
            Heading::SouthEast => 7.0 * FRAC_PI_4,
        }
    }
}

impl GameState {
    /// Aim changes are allowed: aiming, and the cue ball is still
    pub fn can_aim(&self) -> bool {
        self.cue.is_aiming && !self.cue_ball().is_moving() && self.cue_ball().on_table()
    }

    /// Set the aim angle (normalized). Returns false if aiming is locked.
    pub fn aim_to(&mut self, angle: f32) -> bool {
        if !self.can_aim() {
            return false;
        }
        self.cue.angle = normalize_angle(angle);
        true
    }

    /// Rotate the aim by `delta` radians
    pub fn aim_by(&mut self, delta: f32) -> bool {
        let angle = self.cue.angle + delta;
        self.aim_to(angle)
    }

    pub fn aim_left(&mut self) -> bool {
        self.aim_by(-self.tuning.aim_step)
    }

    pub fn aim_right(&mut self) -> bool {
        self.aim_by(self.tuning.aim_step)
    }

    pub fn aim_heading(&mut self, heading: Heading) -> bool {
        self.aim_to(heading.angle())
    }

    /// Aim at the closest object ball still on the table
    pub fn aim_at_nearest_ball(&mut self) -> bool {
        let origin = self.cue_ball().pos;
        let target = self
            .balls
            .iter()
            .enumerate()
            .filter(|(i, b)| *i != CUE_BALL && b.on_table())
            .map(|(_, b)| b.pos)
            .min_by(|a, b| {
                a.distance_squared(origin)
                    .partial_cmp(&b.distance_squared(origin))
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        match target {
            Some(target) => self.aim_toward(target),
            None => false,
        }
    }

    /// Aim straight at the closest pocket
    pub fn aim_at_nearest_pocket(&mut self) -> bool {
        let origin = self.cue_ball().pos;
        let target = self.table.nearest_pocket(origin).center;
        self.aim_toward(target)
    }

    fn aim_toward(&mut self, target: Vec2) -> bool {
        let delta = target - self.cue_ball().pos;
        if delta.length_squared() < f32::EPSILON {
            return false;
        }
        self.aim_to(delta.y.atan2(delta.x))
    }

    /// Start charging from zero power
    pub fn charge_start(&mut self) -> bool {
        if !self.can_aim() {
            return false;
        }
        self.cue.is_charging = true;
        self.cue.power = 0.0;
        true
    }

    /// Per-tick automatic charge
    pub fn charge_tick(&mut self) {
        if self.cue.is_charging && self.cue.is_aiming {
            self.cue.power = (self.cue.power + self.tuning.charge_rate).min(MAX_POWER);
        }
    }

    pub fn power_up(&mut self) -> bool {
        self.adjust_power(self.tuning.power_step_up)
    }

    pub fn power_down(&mut self) -> bool {
        self.adjust_power(-self.tuning.power_step_down)
    }

    fn adjust_power(&mut self, delta: f32) -> bool {
        if !self.cue.is_charging {
            return false;
        }
        self.cue.power = (self.cue.power + delta).clamp(0.0, MAX_POWER);
        true
    }

    /// Release the shot. Returns the launch velocity if a shot was taken.
    pub fn charge_release(&mut self) -> Option<Vec2> {
        if !(self.cue.is_charging && self.cue.is_aiming) {
            return None;
        }
        let power = self.cue.power.max(self.tuning.min_shot_power);
        let speed = power * self.tuning.power_to_speed;
        let velocity = direction(self.cue.angle) * speed;

        let cue_ball = self.cue_ball_mut();
        cue_ball.vel = velocity;
        cue_ball.wake();

        self.cue.is_aiming = false;
        self.cue.is_charging = false;
        self.cue.power = 0.0;

        log::info!(
            "Shot: angle {:.2} rad, power {:.0}, speed {:.2}",
            self.cue.angle,
            power,
            speed
        );
        Some(velocity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::BallState;
    use crate::tuning::Tuning;
    use proptest::prelude::*;
    use std::f32::consts::TAU;

    fn state() -> GameState {
        GameState::new(Tuning::default())
    }

    #[test]
    fn test_release_below_minimum_power() {
        let mut state = state();
        assert!(state.charge_start());
        state.cue.power = 2.0;
        let velocity = state.charge_release().unwrap();
        assert!((velocity.x - 1.5).abs() < 1e-6);
        assert!(velocity.y.abs() < 1e-6);
        assert_eq!(state.cue_ball().vel, velocity);
        assert_eq!(state.cue_ball().state, BallState::Moving);
        assert!(!state.cue.is_aiming);
        assert!(!state.cue.is_charging);
        assert_eq!(state.cue.power, 0.0);
    }

    #[test]
    fn test_release_follows_angle() {
        let mut state = state();
        state.aim_heading(Heading::North);
        state.charge_start();
        state.cue.power = 50.0;
        let velocity = state.charge_release().unwrap();
        assert!(velocity.x.abs() < 1e-5);
        assert!((velocity.y - 15.0).abs() < 1e-4);
    }

    #[test]
    fn test_release_without_charge_is_noop() {
        let mut state = state();
        assert!(state.charge_release().is_none());
        assert!(state.cue.is_aiming);
        assert_eq!(state.cue_ball().state, BallState::Resting);
    }

    #[test]
    fn test_charge_tick_caps_at_max() {
        let mut state = state();
        state.charge_start();
        for _ in 0..80 {
            state.charge_tick();
        }
        assert_eq!(state.cue.power, MAX_POWER);
    }

    #[test]
    fn test_power_commands_only_while_charging() {
        let mut state = state();
        assert!(!state.power_up());
        assert_eq!(state.cue.power, 0.0);
        state.charge_start();
        assert!(state.power_up());
        assert!(state.power_up());
        assert!(state.power_down());
        assert_eq!(state.cue.power, 7.0);
        for _ in 0..5 {
            state.power_down();
        }
        assert_eq!(state.cue.power, 0.0);
    }

    #[test]
    fn test_aim_left_wraps() {
        let mut state = state();
        assert!(state.aim_left());
        assert!((state.cue.angle - (TAU - 0.1)).abs() < 1e-5);
        assert!(state.aim_right());
        assert!(state.cue.angle < 1e-4 || state.cue.angle > TAU - 1e-4);
    }

    #[test]
    fn test_aim_locked_while_cue_ball_moving() {
        let mut state = state();
        state.cue_ball_mut().state = BallState::Moving;
        assert!(!state.aim_to(1.0));
        assert!(!state.charge_start());
        assert_eq!(state.cue.angle, 0.0);
    }

    #[test]
    fn test_aim_locked_after_release() {
        let mut state = state();
        state.charge_start();
        state.charge_release();
        state.cue_ball_mut().stop();
        assert!(!state.aim_heading(Heading::West));
    }

    #[test]
    fn test_headings_are_normalized() {
        let mut state = state();
        for heading in Heading::ALL {
            assert!(state.aim_heading(heading));
            assert!(state.cue.angle >= 0.0 && state.cue.angle < TAU);
        }
        state.aim_heading(Heading::SouthWest);
        assert!((state.cue.angle - 5.0 * FRAC_PI_4).abs() < 1e-6);
    }

    #[test]
    fn test_aim_at_nearest_ball_points_at_rack() {
        let mut state = state();
        assert!(state.aim_at_nearest_ball());
        let aim = direction(state.cue.angle);
        let origin = state.cue_ball().pos;
        let nearest = state.balls[1..]
            .iter()
            .min_by(|a, b| {
                a.pos
                    .distance(origin)
                    .partial_cmp(&b.pos.distance(origin))
                    .unwrap()
            })
            .unwrap();
        let to_target = (nearest.pos - origin).normalize();
        assert!(aim.dot(to_target) > 0.9999);
    }

    #[test]
    fn test_aim_at_nearest_ball_ignores_captured() {
        let mut state = state();
        for ball in state.balls.iter_mut().skip(1) {
            ball.state = BallState::Captured;
        }
        assert!(!state.aim_at_nearest_ball());
    }

    #[test]
    fn test_aim_at_nearest_pocket() {
        let mut state = state();
        assert!(state.aim_at_nearest_pocket());
        let origin = state.cue_ball().pos;
        let pocket = state.table.nearest_pocket(origin).center;
        let to_pocket = (pocket - origin).normalize();
        assert!(direction(state.cue.angle).dot(to_pocket) > 0.9999);
        assert!(state.cue.angle >= 0.0 && state.cue.angle < TAU);
    }

    proptest! {
        #[test]
        fn prop_aim_rotate_stays_normalized(start in -50.0f32..50.0, delta in -50.0f32..50.0) {
            let mut state = state();
            state.aim_to(start);
            state.aim_by(delta);
            prop_assert!(state.cue.angle >= 0.0 && state.cue.angle < TAU);
        }
    }
}
