//! Canvas 2D wheel painter

use std::f64::consts::TAU;

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::{WheelLayout, truncate_label};
use crate::sim::{PrizeSet, prize::DEFAULT_PRIZE_COLOR};

/// Draws the wheel onto a `<canvas>`
pub struct CanvasPainter {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasPainter {
    pub fn new(canvas: HtmlCanvasElement) -> Option<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        Some(Self { canvas, ctx })
    }

    /// Match the backing store to the element's on-screen size
    pub fn resize(&self) {
        let size = self.canvas.client_width().max(0) as u32;
        self.canvas.set_width(size);
        self.canvas.set_height(size);
    }

    /// Redraw the wheel turned by `rotation_deg`
    pub fn draw(&self, rotation_deg: f64, prizes: &PrizeSet) {
        let width = self.canvas.width() as f64;
        let height = self.canvas.height() as f64;
        let ctx = &self.ctx;
        ctx.clear_rect(0.0, 0.0, width, height);
        if prizes.is_empty() {
            return;
        }

        let layout = WheelLayout::for_canvas(prizes.len(), width.min(height));
        let radius = layout.radius;

        ctx.save();
        let _ = ctx.translate(width / 2.0, height / 2.0);
        let _ = ctx.rotate(layout.context_rotation_deg(rotation_deg).to_radians());

        // Slices
        for (index, prize) in prizes.iter().enumerate() {
            let slice = layout.slice(index);
            ctx.begin_path();
            ctx.move_to(0.0, 0.0);
            let _ = ctx.arc(
                0.0,
                0.0,
                radius,
                slice.start_deg.to_radians(),
                slice.end_deg.to_radians(),
            );
            ctx.close_path();
            let color = if prize.color.is_empty() {
                DEFAULT_PRIZE_COLOR
            } else {
                prize.color.as_str()
            };
            ctx.set_fill_style_str(color);
            ctx.fill();
            ctx.set_stroke_style_str("#333");
            ctx.set_line_width(2.0);
            ctx.stroke();
        }

        // Separators
        ctx.set_stroke_style_str("#fff");
        ctx.set_line_width(3.0);
        for index in 0..prizes.len() {
            let edge = crate::polar_to_cartesian(radius, layout.slice(index).start_deg);
            ctx.begin_path();
            ctx.move_to(0.0, 0.0);
            ctx.line_to(edge.x, edge.y);
            ctx.stroke();
        }

        // Icons and names
        ctx.set_fill_style_str("#000");
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        for (index, prize) in prizes.iter().enumerate() {
            let icon = layout.icon_anchor(index);
            ctx.set_font(&format!("{}px Arial", layout.icon_font_px()));
            let glyph = if prize.icon.is_empty() { "?" } else { prize.icon.as_str() };
            let _ = ctx.fill_text(glyph, icon.x, icon.y);

            ctx.set_font(&format!("bold {}px Arial", layout.name_font_px()));
            let label = truncate_label(&prize.name, layout.name_max_width(), |s| {
                ctx.measure_text(s).map(|m| m.width()).unwrap_or(0.0)
            });
            let name = layout.name_anchor(index);
            let _ = ctx.fill_text(&label, name.x, name.y);
        }

        // Hub
        ctx.begin_path();
        let _ = ctx.arc(0.0, 0.0, radius * 0.08, 0.0, TAU);
        ctx.set_fill_style_str("#fff");
        ctx.fill();

        ctx.restore();
    }
}
