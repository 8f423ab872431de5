use kurbo::Shape as _;

use crate::{
    foundation::core::{Affine, Rect, Rgb8},
    lottie::model::FillRule,
    render::DrawOp,
};

/// A filled rectangle, used as the saver's background.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shape {
    rect: Rect,
    fill: Option<Rgb8>,
}

impl Shape {
    pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            rect: Rect::new(x, y, x + width, y + height),
            fill: None,
        }
    }

    pub fn with_fill(mut self, color: Rgb8) -> Self {
        self.fill = Some(color);
        self
    }

    pub fn fill(&self) -> Option<Rgb8> {
        self.fill
    }

    pub fn bounds(&self) -> Rect {
        self.rect
    }

    /// Whether the shape covers a `width`x`height` canvas anchored at the origin.
    pub fn covers(&self, width: u32, height: u32) -> bool {
        let r = self.rect.abs();
        r.x0 <= 0.0 && r.y0 <= 0.0 && r.x1 >= f64::from(width) && r.y1 >= f64::from(height)
    }

    pub(crate) fn draw_op(&self) -> Option<DrawOp> {
        let c = self.fill?;
        Some(DrawOp::Fill {
            path: self.rect.abs().to_path(0.1),
            transform: Affine::IDENTITY,
            color: [c.r, c.g, c.b, 255],
            rule: FillRule::NonZero,
        })
    }
}
