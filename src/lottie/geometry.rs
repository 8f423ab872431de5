use std::f64::consts::{FRAC_PI_2, PI};

use kurbo::{BezPath, Ellipse, Point, Rect, Shape as _};

use crate::lottie::{
    model::{EllipseShape, PathShape, RectShape, StarKind, StarShape},
    property::PathData,
};

const TOLERANCE: f64 = 0.1;

pub fn rect_path(shape: &RectShape, frame: f64) -> BezPath {
    let p = shape.p.sample(frame);
    let s = shape.s.sample(frame);
    let (w, h) = (s.get(0).abs(), s.get(1).abs());
    let rect = Rect::from_center_size(Point::new(p.get(0), p.get(1)), (w, h));
    let radius = shape.r.sample(frame).first().clamp(0.0, 0.5 * w.min(h));
    if radius > 0.0 {
        rect.to_rounded_rect(radius).to_path(TOLERANCE)
    } else {
        rect.to_path(TOLERANCE)
    }
}

pub fn ellipse_path(shape: &EllipseShape, frame: f64) -> BezPath {
    let p = shape.p.sample(frame);
    let s = shape.s.sample(frame);
    let rect = Rect::from_center_size(
        Point::new(p.get(0), p.get(1)),
        (s.get(0).abs(), s.get(1).abs()),
    );
    Ellipse::from_rect(rect).to_path(TOLERANCE)
}

pub fn shape_path(shape: &PathShape, frame: f64) -> BezPath {
    bezier_path(&shape.ks.sample(frame))
}

/// Build a path from Lottie vertices; tangents are relative to their vertex.
pub fn bezier_path(data: &PathData) -> BezPath {
    let mut path = BezPath::new();
    let n = data.vertices.len();
    if n == 0 {
        return path;
    }

    let vertex = |i: usize| Point::new(data.vertices[i][0], data.vertices[i][1]);
    let tangent = |list: &[[f64; 2]], i: usize| {
        list.get(i)
            .map(|t| kurbo::Vec2::new(t[0], t[1]))
            .unwrap_or(kurbo::Vec2::ZERO)
    };
    let segment = |path: &mut BezPath, from: usize, to: usize| {
        let c1 = vertex(from) + tangent(&data.out_tangents, from);
        let c2 = vertex(to) + tangent(&data.in_tangents, to);
        path.curve_to(c1, c2, vertex(to));
    };

    path.move_to(vertex(0));
    for i in 1..n {
        segment(&mut path, i - 1, i);
    }
    if data.closed {
        segment(&mut path, n - 1, 0);
        path.close_path();
    }
    path
}

pub fn star_path(shape: &StarShape, frame: f64) -> BezPath {
    let center = shape.p.sample(frame);
    let center = Point::new(center.get(0), center.get(1));
    let points = shape.pt.sample(frame).first().round().max(0.0) as usize;
    let outer = shape.or.sample(frame).first();
    let rotation = shape.r.sample(frame).first().to_radians();

    let mut path = BezPath::new();
    if points < 2 {
        return path;
    }

    let vertices: Vec<(f64, f64)> = match shape.kind() {
        StarKind::Polygon => (0..points)
            .map(|i| (outer, 2.0 * PI * i as f64 / points as f64))
            .collect(),
        StarKind::Star => {
            let inner = shape
                .ir
                .as_ref()
                .map(|ir| ir.sample(frame).first())
                .unwrap_or(outer * 0.5);
            (0..points * 2)
                .map(|i| {
                    let r = if i % 2 == 0 { outer } else { inner };
                    (r, PI * i as f64 / points as f64)
                })
                .collect()
        }
    };

    for (i, (r, angle)) in vertices.into_iter().enumerate() {
        // Zero degrees points straight up.
        let a = angle + rotation - FRAC_PI_2;
        let pt = Point::new(center.x + r * a.cos(), center.y + r * a.sin());
        if i == 0 {
            path.move_to(pt);
        } else {
            path.line_to(pt);
        }
    }
    path.close_path();
    path
}
