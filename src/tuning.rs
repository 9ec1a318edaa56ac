//! Physics tuning
//!
//! Every hand-tuned constant that shapes the feel of the table lives here.
//! None of them are derived physical quantities; they are picked to look
//! right on a 320x240 panel. Loaded from JSON, any missing field falls back
//! to its default.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Tunable physics and cue constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Motion ===
    /// Multiplicative velocity decay per tick
    pub friction: f32,
    /// Below this speed a ball comes to rest
    pub min_velocity: f32,
    /// Fraction of velocity applied per integration half-step
    pub sub_step: f32,

    // === Pockets ===
    /// Ball center within this distance of a pocket center is captured
    pub capture_radius: f32,
    /// Attraction radius = capture + ball radius + this margin
    pub attraction_margin: f32,
    /// Near-pocket radius = pocket hole + ball radius + this margin
    pub near_pocket_margin: f32,
    /// Velocity added toward the pocket per attraction impulse
    pub pocket_attraction: f32,

    // === Rails ===
    /// Velocity retained on a rail bounce
    pub rail_restitution: f32,
    /// Gap kept between a clamped ball and the rail
    pub rail_clearance: f32,
    /// Stop instead of bouncing below this multiple of `min_velocity`
    pub rail_stop_factor: f32,
    /// Extra distance a near-pocket ball may drift outside the table
    pub outside_margin: f32,

    // === Corner jam zone ===
    /// Jam zone starts this far inside the capture radius
    pub jam_inner_margin: f32,
    /// Jam zone ends this far past capture radius + ball radius
    pub jam_outer_margin: f32,
    /// Stop outright below this multiple of `min_velocity`
    pub jam_stop_factor: f32,
    /// Velocity retained per tick while coasting into a corner pocket
    pub jam_coast_decay: f32,

    // === Ball-ball contacts ===
    /// Relaxation iterations per resolver pass
    pub collision_iterations: u32,
    /// Fraction of the overlap corrected per iteration
    pub separation_factor: f32,
    /// Impulse as a fraction of the closing speed
    pub impulse_factor: f32,
    /// Contacts closer than this fraction of a diameter always get an impulse
    pub deep_overlap_ratio: f32,

    // === Cue ===
    /// Power gained per tick while charging
    pub charge_rate: f32,
    /// Power added by a power-up command
    pub power_step_up: f32,
    /// Power removed by a power-down command
    pub power_step_down: f32,
    /// Minimum power a released shot carries
    pub min_shot_power: f32,
    /// Launch speed per unit of power
    pub power_to_speed: f32,
    /// Rotation per aim-left/aim-right command (radians)
    pub aim_step: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            friction: 0.975,
            min_velocity: 0.2,
            sub_step: 0.5,

            capture_radius: 8.0,
            attraction_margin: 4.0,
            near_pocket_margin: 3.0,
            pocket_attraction: 0.3,

            rail_restitution: 0.8,
            rail_clearance: 1.0,
            rail_stop_factor: 2.0,
            outside_margin: 2.0,

            jam_inner_margin: 2.0,
            jam_outer_margin: 5.0,
            jam_stop_factor: 3.0,
            jam_coast_decay: 0.95,

            collision_iterations: 3,
            separation_factor: 0.6,
            impulse_factor: 0.6,
            deep_overlap_ratio: 0.9,

            charge_rate: 2.0,
            power_step_up: 5.0,
            power_step_down: 3.0,
            min_shot_power: 5.0,
            power_to_speed: 0.3,
            aim_step: 0.1,
        }
    }
}

impl Tuning {
    /// Parse tuning from a JSON document
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize tuning to pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load tuning from a JSON file, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(tuning) => {
                    log::info!("Loaded tuning from {}", path.display());
                    tuning
                }
                Err(e) => {
                    log::warn!("Invalid tuning in {}: {} - using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Could not read {}: {} - using defaults", path.display(), e);
                Self::default()
            }
        }
    }
}
