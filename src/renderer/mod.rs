//! Wheel rendering
//!
//! Layout math is platform-neutral; the canvas painter is browser-only.
//! Screen convention: the pointer sits at the top, so the local frame is drawn
//! rotated by -90 degrees on top of the wheel rotation.

#[cfg(target_arch = "wasm32")]
pub mod canvas;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasPainter;

use glam::DVec2;

use crate::sim::SliceArc;

/// Pointer direction on screen, relative to the canvas x axis (degrees)
pub const POINTER_SCREEN_DEG: f64 = -90.0;
/// Radial position of slice icons (fraction of radius)
pub const ICON_RADIUS_FRACTION: f64 = 0.75;
/// Radial position of slice names (fraction of radius)
pub const NAME_RADIUS_FRACTION: f64 = 0.4;
/// Widest a slice name may be drawn (fraction of radius)
pub const NAME_MAX_WIDTH_FRACTION: f64 = 0.7;

const ELLIPSIS: &str = "...";

/// Geometry of a wheel with `segment_count` slices drawn at `radius`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelLayout {
    pub segment_count: usize,
    pub radius: f64,
}

impl WheelLayout {
    /// Layout for a square canvas of side `size`, leaving a rim for the border
    pub fn for_canvas(segment_count: usize, size: f64) -> Self {
        Self {
            segment_count,
            radius: (size / 2.0 - 10.0).max(0.0),
        }
    }

    pub fn slice(&self, index: usize) -> SliceArc {
        SliceArc::for_segment(index, self.segment_count)
    }

    /// Rotation (degrees) to apply to the drawing context for a wheel rotation
    pub fn context_rotation_deg(&self, wheel_rotation_deg: f64) -> f64 {
        wheel_rotation_deg + POINTER_SCREEN_DEG
    }

    /// Icon position in the rotated local frame
    pub fn icon_anchor(&self, index: usize) -> DVec2 {
        self.slice(index).anchor(self.radius * ICON_RADIUS_FRACTION)
    }

    /// Name position in the rotated local frame
    pub fn name_anchor(&self, index: usize) -> DVec2 {
        self.slice(index).anchor(self.radius * NAME_RADIUS_FRACTION)
    }

    pub fn icon_font_px(&self) -> u32 {
        (self.radius / 10.0).floor().max(1.0) as u32
    }

    pub fn name_font_px(&self) -> u32 {
        (self.radius / 15.0).floor().max(1.0) as u32
    }

    pub fn name_max_width(&self) -> f64 {
        self.radius * NAME_MAX_WIDTH_FRACTION
    }
}

/// Shorten `name` with an ellipsis until `measure` says it fits `max_width`
///
/// Names keep at least three characters before the ellipsis.
pub fn truncate_label(name: &str, max_width: f64, measure: impl Fn(&str) -> f64) -> String {
    if measure(name) <= max_width {
        return name.to_string();
    }
    let mut chars: Vec<char> = name.chars().collect();
    while chars.len() > 3 {
        let candidate: String = chars.iter().collect::<String>() + ELLIPSIS;
        if measure(&candidate) <= max_width {
            break;
        }
        chars.pop();
    }
    chars.into_iter().collect::<String>() + ELLIPSIS
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Monospace stand-in for canvas text metrics
    fn mono(s: &str) -> f64 {
        s.chars().count() as f64 * 10.0
    }

    #[test]
    fn test_short_names_untouched() {
        assert_eq!(truncate_label("Pizza", 100.0, mono), "Pizza");
    }

    #[test]
    fn test_long_names_get_ellipsis() {
        let out = truncate_label("Grand Prize Vacation", 100.0, mono);
        assert!(out.ends_with("..."));
        assert!(mono(&out) <= 100.0);
        assert_eq!(out, "Grand P...");
    }

    #[test]
    fn test_truncation_keeps_three_chars() {
        assert_eq!(truncate_label("Jackpot", 5.0, mono), "Jac...");
    }

    #[test]
    fn test_layout_anchors() {
        let layout = WheelLayout::for_canvas(4, 420.0);
        assert_eq!(layout.radius, 200.0);
        // Slice 0 mid-angle is 45 degrees
        let icon = layout.icon_anchor(0);
        assert!((icon.length() - 150.0).abs() < 1e-9);
        assert!((icon.x - icon.y).abs() < 1e-9);
        assert_eq!(layout.icon_font_px(), 20);
        assert_eq!(layout.name_font_px(), 13);
        assert_eq!(layout.context_rotation_deg(90.0), 0.0);
    }
}
