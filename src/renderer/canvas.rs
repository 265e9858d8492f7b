//! Canvas 2D surface

use glam::Vec2;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::colors::Rgba;
use super::{Stroke, Surface};
use crate::platform::input::Viewport;

pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: &HtmlCanvasElement) -> Option<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        Some(Self { ctx })
    }

    /// Clear and set up the scene transform (origin at the view centre)
    pub fn begin_frame(&self, viewport: &Viewport) {
        let (w, h) = viewport.buffer_size();
        let scale = viewport.draw_scale() as f64;
        let half = viewport.scene_size() * 0.5;
        self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0).ok();
        self.ctx.clear_rect(0.0, 0.0, w as f64, h as f64);
        self.ctx.scale(scale, scale).ok();
        self.ctx.translate(half.x as f64, half.y as f64).ok();
        self.ctx.set_line_join("bevel");
        self.ctx.set_global_alpha(1.0);
    }

    fn trace(&self, points: &[Vec2]) {
        let Some(last) = points.last() else { return };
        self.ctx.begin_path();
        self.ctx.move_to(last.x as f64, last.y as f64);
        for p in points {
            self.ctx.line_to(p.x as f64, p.y as f64);
        }
    }

    fn apply_stroke(&self, stroke: Stroke) {
        self.ctx.set_stroke_style_str(&stroke.color.to_css());
        self.ctx.set_line_width(stroke.width as f64);
    }
}

impl Surface for CanvasSurface {
    fn set_alpha(&mut self, alpha: f32) {
        self.ctx.set_global_alpha(alpha.clamp(0.0, 1.0) as f64);
    }

    fn polygon(&mut self, points: &[Vec2], fill: Option<Rgba>, stroke: Option<Stroke>) {
        if points.is_empty() {
            return;
        }
        self.trace(points);
        if let Some(color) = fill {
            self.ctx.set_fill_style_str(&color.to_css());
            self.ctx.fill();
        }
        if let Some(stroke) = stroke {
            self.apply_stroke(stroke);
            self.ctx.stroke();
        }
    }

    fn lines(&mut self, segments: &[(Vec2, Vec2)], stroke: Stroke) {
        if segments.is_empty() {
            return;
        }
        self.ctx.begin_path();
        for (from, to) in segments {
            self.ctx.move_to(from.x as f64, from.y as f64);
            self.ctx.line_to(to.x as f64, to.y as f64);
        }
        self.apply_stroke(stroke);
        self.ctx.stroke();
    }
}
