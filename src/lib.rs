//! Prize Wheel - an interactive segmented spinner
//!
//! Core modules:
//! - `sim`: Deterministic spin engine (prize set, geometry, planning, animation)
//! - `engine`: `WheelEngine` context object tying the engine to its collaborators
//! - `platform`: Frame scheduling and clocks (manual clock, requestAnimationFrame)
//! - `persistence`: JSON documents over a key-value store
//! - `settings`: Spin configuration plus audio/appearance preferences
//! - `history`: Bounded spin history
//! - `renderer`: Wheel layout math and the canvas painter

pub mod audio;
pub mod engine;
pub mod error;
pub mod history;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use engine::{NoticeLevel, WheelEngine, WheelObserver};
pub use error::{Result, SpinError};
pub use history::{HistoryEntry, SpinHistoryLog};
pub use settings::{SpinConfiguration, WheelSettings};

use glam::DVec2;

/// Wheel configuration constants
pub mod consts {
    /// Degrees in one full turn
    pub const FULL_TURN_DEG: f64 = 360.0;
    /// Safe margins are clamped this far below half a slice so the landing zone never collapses
    pub const MARGIN_EPSILON_DEG: f64 = 1e-6;
    /// Upper (exclusive) bound for the safe margin percentage
    pub const SAFE_MARGIN_LIMIT_PERCENT: f64 = 50.0;
    /// Value an out-of-range margin is clamped to when loading settings
    pub const SAFE_MARGIN_CLAMP_PERCENT: f64 = 49.0;
    /// Maximum number of retained history entries
    pub const MAX_HISTORY_ENTRIES: usize = 1000;
    /// Nominal frame interval (60 Hz) for headless runs
    pub const FRAME_INTERVAL_MS: f64 = 1000.0 / 60.0;
}

/// Normalize an angle in degrees to [0, 360)
#[inline]
pub fn normalize_degrees(angle: f64) -> f64 {
    let a = angle.rem_euclid(consts::FULL_TURN_DEG);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if a >= consts::FULL_TURN_DEG { 0.0 } else { a }
}

/// Convert polar (r, degrees) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f64, degrees: f64) -> DVec2 {
    let theta = degrees.to_radians();
    DVec2::new(r * theta.cos(), r * theta.sin())
}
