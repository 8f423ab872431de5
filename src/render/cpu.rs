use crate::{
    foundation::core::{Affine, BezPath, Point},
    foundation::error::{ConvertError, ConvertResult},
    lottie::model::FillRule,
    render::{
        FrameRGBA, RenderSettings,
        compile::{DrawOp, FramePlan},
    },
};

/// Rasterizes [`FramePlan`]s with `vello_cpu`. One rasterizer is reused for every frame of an
/// animation; the render context is kept between frames while the size stays the same.
pub struct CpuRasterizer {
    settings: RenderSettings,
    ctx: Option<vello_cpu::RenderContext>,
}

impl CpuRasterizer {
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            ctx: None,
        }
    }

    pub fn render(&mut self, plan: &FramePlan) -> ConvertResult<FrameRGBA> {
        let width: u16 = plan.width.try_into().map_err(|_| {
            ConvertError::render(format!("frame width {} exceeds 65535", plan.width))
        })?;
        let height: u16 = plan.height.try_into().map_err(|_| {
            ConvertError::render(format!("frame height {} exceeds 65535", plan.height))
        })?;
        if width == 0 || height == 0 {
            return Err(ConvertError::render("frame size must be non-zero"));
        }

        let settings = vello_cpu::RenderSettings {
            num_threads: self.settings.num_threads,
            ..Default::default()
        };
        // A context that failed mid-frame may hold open layers; it is dropped instead of reused.
        let mut ctx = match self.ctx.take() {
            Some(mut ctx) if ctx.width() == width && ctx.height() == height => {
                ctx.reset();
                ctx
            }
            _ => vello_cpu::RenderContext::new_with(width, height, settings),
        };

        if let Some([r, g, b]) = self.settings.background {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, 255));
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(width),
                f64::from(height),
            ));
        }

        let mut depth = 0usize;
        for op in &plan.ops {
            draw_op(&mut ctx, op, &mut depth)?;
        }
        if depth != 0 {
            return Err(ConvertError::render(format!(
                "draw list left {depth} layer(s) open"
            )));
        }

        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        ctx.render_to_pixmap(&mut pixmap);
        self.ctx = Some(ctx);

        Ok(FrameRGBA {
            width: plan.width,
            height: plan.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

fn draw_op(
    ctx: &mut vello_cpu::RenderContext,
    op: &DrawOp,
    depth: &mut usize,
) -> ConvertResult<()> {
    match op {
        DrawOp::PushOpacity(opacity) => {
            ctx.push_opacity_layer(opacity.clamp(0.0, 1.0));
            *depth += 1;
        }
        DrawOp::PushClip { path, transform } => {
            ctx.set_transform(affine_to_cpu(*transform));
            ctx.push_clip_layer(&bezpath_to_cpu(path));
            *depth += 1;
        }
        DrawOp::Pop => {
            if *depth == 0 {
                return Err(ConvertError::render("unbalanced layer pop in draw list"));
            }
            ctx.pop_layer();
            *depth -= 1;
        }
        DrawOp::Fill {
            path,
            transform,
            color: [r, g, b, a],
            rule,
        } => {
            ctx.set_transform(affine_to_cpu(*transform));
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(*r, *g, *b, *a));
            ctx.set_fill_rule(match rule {
                FillRule::NonZero => vello_cpu::peniko::Fill::NonZero,
                FillRule::EvenOdd => vello_cpu::peniko::Fill::EvenOdd,
            });
            ctx.fill_path(&bezpath_to_cpu(path));
        }
        DrawOp::Stroke {
            path,
            transform,
            color: [r, g, b, a],
            style,
        } => {
            ctx.set_transform(affine_to_cpu(*transform));
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(*r, *g, *b, *a));
            ctx.set_stroke(stroke_to_cpu(style));
            ctx.stroke_path(&bezpath_to_cpu(path));
        }
    }
    Ok(())
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn stroke_to_cpu(style: &kurbo::Stroke) -> vello_cpu::kurbo::Stroke {
    use vello_cpu::kurbo::{Cap, Join};

    let cap = |c: kurbo::Cap| match c {
        kurbo::Cap::Butt => Cap::Butt,
        kurbo::Cap::Round => Cap::Round,
        kurbo::Cap::Square => Cap::Square,
    };
    let join = match style.join {
        kurbo::Join::Bevel => Join::Bevel,
        kurbo::Join::Miter => Join::Miter,
        kurbo::Join::Round => Join::Round,
    };
    vello_cpu::kurbo::Stroke::new(style.width)
        .with_start_cap(cap(style.start_cap))
        .with_end_cap(cap(style.end_cap))
        .with_join(join)
        .with_miter_limit(style.miter_limit)
}
