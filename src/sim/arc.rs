//! Slice geometry and rotation targeting
//!
//! In the wheel's local (unrotated) frame, slice `i` of `n` spans
//! `[i * 360/n, (i + 1) * 360/n)` degrees. Local angle 0 sits under the fixed
//! pointer when the wheel rotation is 0; rotating the wheel by `r` brings local
//! angle `360 - r (mod 360)` under the pointer.

use glam::DVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::{FULL_TURN_DEG, MARGIN_EPSILON_DEG};
use crate::error::{Result, SpinError};
use crate::{normalize_degrees, polar_to_cartesian};

/// Angular extent of one slice in the wheel's local frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliceArc {
    /// Start angle (degrees, inclusive)
    pub start_deg: f64,
    /// End angle (degrees, exclusive)
    pub end_deg: f64,
}

impl SliceArc {
    pub fn new(start_deg: f64, end_deg: f64) -> Self {
        Self { start_deg, end_deg }
    }

    /// Slice `index` of a wheel with `count` equal slices
    pub fn for_segment(index: usize, count: usize) -> Self {
        let slice = FULL_TURN_DEG / count.max(1) as f64;
        Self::new(index as f64 * slice, (index + 1) as f64 * slice)
    }

    /// Angular span of the slice
    #[inline]
    pub fn span(&self) -> f64 {
        self.end_deg - self.start_deg
    }

    /// Mid-angle of the slice
    #[inline]
    pub fn mid_deg(&self) -> f64 {
        self.start_deg + self.span() / 2.0
    }

    /// Check if a local angle falls in `[start, end)`
    pub fn contains_angle(&self, degrees: f64) -> bool {
        let a = normalize_degrees(degrees);
        a >= self.start_deg && a < self.end_deg
    }

    /// The safe sub-range left after trimming the margin from both sides
    pub fn landing_zone(&self, safe_margin_percent: f64) -> SliceArc {
        let margin = effective_margin_deg(self.span(), safe_margin_percent);
        SliceArc::new(self.start_deg + margin, self.end_deg - margin)
    }

    /// Uniformly random angle inside the slice's landing zone
    pub fn sample_landing<R: Rng>(&self, safe_margin_percent: f64, rng: &mut R) -> f64 {
        let zone = self.landing_zone(safe_margin_percent);
        zone.start_deg + rng.random::<f64>() * zone.span()
    }

    /// Point at `radius` along the slice's mid-angle, in the local frame
    pub fn anchor(&self, radius: f64) -> DVec2 {
        polar_to_cartesian(radius, self.mid_deg())
    }
}

/// Margin in degrees for one side of a slice, clamped so the landing zone keeps positive width
pub fn effective_margin_deg(slice_deg: f64, safe_margin_percent: f64) -> f64 {
    let pct = if safe_margin_percent.is_finite() {
        safe_margin_percent.max(0.0)
    } else {
        0.0
    };
    let ceiling = (slice_deg / 2.0 - MARGIN_EPSILON_DEG).max(0.0);
    (slice_deg * pct / 100.0).min(ceiling)
}

/// Local angle currently under the pointer for a given wheel rotation
#[inline]
pub fn pointer_local_angle(rotation_deg: f64) -> f64 {
    normalize_degrees(FULL_TURN_DEG - normalize_degrees(rotation_deg))
}

/// Index of the slice under the pointer for a given wheel rotation
pub fn segment_under_pointer(rotation_deg: f64, segment_count: usize) -> Option<usize> {
    if segment_count == 0 {
        return None;
    }
    let slice = FULL_TURN_DEG / segment_count as f64;
    let index = (pointer_local_angle(rotation_deg) / slice).floor() as usize;
    Some(index.min(segment_count - 1))
}

/// Outcome of rotation targeting
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetAngle {
    /// Absolute (accumulated) rotation that brings the landing angle under the pointer
    pub target_rotation_deg: f64,
    /// Chosen stopping point in the wheel's local frame
    pub landing_angle_deg: f64,
}

/// Resolve the absolute rotation that stops the pointer inside a segment's landing zone
///
/// The result is always strictly greater than `current_rotation_deg` and at
/// most one full turn ahead of it; extra revolutions are the planner's job.
pub fn resolve_target_angle<R: Rng>(
    segment_index: usize,
    segment_count: usize,
    current_rotation_deg: f64,
    safe_margin_percent: f64,
    rng: &mut R,
) -> Result<TargetAngle> {
    if segment_count == 0 {
        return Err(SpinError::InvalidState("wheel has no segments".into()));
    }
    if segment_index >= segment_count {
        return Err(SpinError::InvalidState(format!(
            "segment {} out of range (wheel has {})",
            segment_index, segment_count
        )));
    }

    let slice = SliceArc::for_segment(segment_index, segment_count);
    let landing = slice.sample_landing(safe_margin_percent, rng);

    // Offset that brings `landing` under the pointer, in (0, 360]
    let align = FULL_TURN_DEG - landing;
    let residual = normalize_degrees(current_rotation_deg);
    let mut target = current_rotation_deg - residual + align;
    // Never stand still or wind backwards
    if target <= current_rotation_deg {
        target += FULL_TURN_DEG;
    }

    Ok(TargetAngle {
        target_rotation_deg: target,
        landing_angle_deg: landing,
    })
}
