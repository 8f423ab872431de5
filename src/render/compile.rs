use kurbo::{BezPath, Cap, Join, Shape as _};

use crate::{
    foundation::core::{Affine, Rect, Rgb8},
    lottie::{
        geometry,
        model::{Document, Fill, FillRule, Layer, LayerKind, ShapeItem, Stroke},
        property::{Numbers, Property},
    },
};

// Deepest chain of nested precomps that is still expanded.
const MAX_PRECOMP_DEPTH: usize = 16;

#[derive(Clone, Debug)]
/// Backend-agnostic draw list for a single frame.
///
/// Ops are in painter's order (bottom first). `PushOpacity`/`PushClip` open a layer that is
/// closed by the matching `Pop`.
pub struct FramePlan {
    pub width: u32,
    pub height: u32,
    pub ops: Vec<DrawOp>,
}

#[derive(Clone, Debug)]
pub enum DrawOp {
    PushOpacity(f32),
    PushClip {
        path: BezPath,
        transform: Affine,
    },
    Pop,
    Fill {
        path: BezPath,
        transform: Affine,
        /// Straight (non-premultiplied) RGBA.
        color: [u8; 4],
        rule: FillRule,
    },
    Stroke {
        path: BezPath,
        transform: Affine,
        color: [u8; 4],
        style: kurbo::Stroke,
    },
}

/// Compile the document at composition frame `frame` into a draw list for a
/// `width`x`height` canvas. `root` maps document space onto the canvas.
pub fn compile_frame(
    doc: &Document,
    frame: f64,
    root: Affine,
    width: u32,
    height: u32,
) -> FramePlan {
    let mut builder = PlanBuilder {
        doc,
        ops: Vec::new(),
        chain: Vec::new(),
    };
    builder.push_layers(&doc.layers, frame, root);
    FramePlan {
        width,
        height,
        ops: builder.ops,
    }
}

struct PlanBuilder<'a> {
    doc: &'a Document,
    ops: Vec<DrawOp>,
    /// Asset ids of the precomps currently being expanded, outermost first.
    chain: Vec<&'a str>,
}

impl<'a> PlanBuilder<'a> {
    fn push_layers(&mut self, layers: &'a [Layer], frame: f64, to_canvas: Affine) {
        // The first layer in the list is the topmost one.
        for (idx, layer) in layers.iter().enumerate().rev() {
            if layer.hd || layer.is_matte_source() || !layer.is_active(frame) {
                continue;
            }
            let local = layer.local_time(frame);
            let opacity = layer.ks.opacity(local);
            if opacity <= 0.0 {
                continue;
            }
            let matrix = to_canvas * layer_matrix(layers, idx, frame);

            let wrap = opacity < 1.0;
            if wrap {
                self.ops.push(DrawOp::PushOpacity(opacity as f32));
            }
            match layer.kind {
                LayerKind::Shape => self.push_shapes(&layer.shapes, local, matrix),
                LayerKind::Solid => self.push_solid(layer, matrix),
                LayerKind::Precomp => self.push_precomp(layer, local, matrix),
                LayerKind::Null => {}
                LayerKind::Image | LayerKind::Text | LayerKind::Other(_) => {
                    tracing::debug!(
                        layer = layer.nm.as_deref().unwrap_or(""),
                        kind = ?layer.kind,
                        "layer type not rendered"
                    );
                }
            }
            if wrap {
                self.ops.push(DrawOp::Pop);
            }
        }
    }

    fn push_solid(&mut self, layer: &Layer, matrix: Affine) {
        let (Some(w), Some(h)) = (layer.sw, layer.sh) else {
            return;
        };
        let color = layer
            .sc
            .as_deref()
            .and_then(|sc| Rgb8::from_hex(sc).ok())
            .unwrap_or(Rgb8::new(0, 0, 0));
        self.ops.push(DrawOp::Fill {
            path: Rect::new(0.0, 0.0, w, h).to_path(0.1),
            transform: matrix,
            color: [color.r, color.g, color.b, 255],
            rule: FillRule::NonZero,
        });
    }

    fn push_precomp(&mut self, layer: &'a Layer, local: f64, matrix: Affine) {
        let Some(id) = layer.ref_id.as_deref() else {
            return;
        };
        let Some(children) = self.doc.precomp(id) else {
            tracing::warn!(ref_id = id, "precomp layer references a missing asset");
            return;
        };
        if self.chain.contains(&id) {
            tracing::warn!(ref_id = id, "precomp references itself; skipping");
            return;
        }
        if self.chain.len() >= MAX_PRECOMP_DEPTH {
            tracing::warn!(ref_id = id, "precomp nesting too deep; skipping");
            return;
        }

        let clip = match (layer.w, layer.h) {
            (Some(w), Some(h)) if w > 0.0 && h > 0.0 => Some(Rect::new(0.0, 0.0, w, h)),
            _ => None,
        };
        if let Some(rect) = clip {
            self.ops.push(DrawOp::PushClip {
                path: rect.to_path(0.1),
                transform: matrix,
            });
        }
        self.chain.push(id);
        self.push_layers(children, local, matrix);
        self.chain.pop();
        if clip.is_some() {
            self.ops.push(DrawOp::Pop);
        }
    }

    fn push_shapes(&mut self, items: &[ShapeItem], frame: f64, matrix: Affine) {
        let mut ops = Vec::new();
        collect_group(items, frame, matrix, 1.0, &mut ops);
        // Collected top-first; painter's order is bottom-first.
        ops.reverse();
        self.ops.extend(ops);
    }
}

/// Layer-to-parent-space matrix including the parent chain.
fn layer_matrix(layers: &[Layer], idx: usize, frame: f64) -> Affine {
    let layer = &layers[idx];
    let mut m = layer.ks.affine(layer.local_time(frame));
    let mut parent = layer.parent;
    let mut hops = 0;
    while let Some(pid) = parent {
        if hops >= layers.len() {
            break;
        }
        let Some(p) = layers.iter().find(|l| l.ind == Some(pid)) else {
            break;
        };
        m = p.ks.affine(p.local_time(frame)) * m;
        parent = p.parent;
        hops += 1;
    }
    m
}

/// Walk one group. Paints apply to every path collected before them in this group (nested
/// groups included). Returns the group's paths expressed in the group's own space.
fn collect_group(
    items: &[ShapeItem],
    frame: f64,
    to_canvas: Affine,
    opacity: f64,
    out: &mut Vec<DrawOp>,
) -> Vec<BezPath> {
    let mut paths: Vec<BezPath> = Vec::new();
    for item in items {
        match item {
            ShapeItem::Group(g) if !g.hd => {
                let (m, o) = g
                    .it
                    .iter()
                    .find_map(|i| match i {
                        ShapeItem::Transform(t) => Some((t.affine(frame), t.opacity(frame))),
                        _ => None,
                    })
                    .unwrap_or((Affine::IDENTITY, 1.0));
                if o <= 0.0 {
                    continue;
                }
                for mut p in collect_group(&g.it, frame, to_canvas * m, opacity * o, out) {
                    p.apply_affine(m);
                    paths.push(p);
                }
            }
            ShapeItem::Rect(s) if !s.hd => paths.push(geometry::rect_path(s, frame)),
            ShapeItem::Ellipse(s) if !s.hd => paths.push(geometry::ellipse_path(s, frame)),
            ShapeItem::Path(s) if !s.hd => paths.push(geometry::shape_path(s, frame)),
            ShapeItem::Star(s) if !s.hd => paths.push(geometry::star_path(s, frame)),
            ShapeItem::Fill(f) if !f.hd => {
                out.extend(fill_op(f, &paths, frame, to_canvas, opacity));
            }
            ShapeItem::Stroke(s) if !s.hd => {
                out.extend(stroke_op(s, &paths, frame, to_canvas, opacity));
            }
            _ => {}
        }
    }
    paths
}

fn fill_op(
    fill: &Fill,
    paths: &[BezPath],
    frame: f64,
    transform: Affine,
    opacity: f64,
) -> Option<DrawOp> {
    let path = combine(paths)?;
    let color = paint_color(&fill.c.sample(frame), percent(fill.o.as_ref(), frame) * opacity)?;
    Some(DrawOp::Fill {
        path,
        transform,
        color,
        rule: fill.rule(),
    })
}

fn stroke_op(
    stroke: &Stroke,
    paths: &[BezPath],
    frame: f64,
    transform: Affine,
    opacity: f64,
) -> Option<DrawOp> {
    let width = stroke.w.sample(frame).first();
    if !(width > 0.0) {
        return None;
    }
    let path = combine(paths)?;
    let color = paint_color(
        &stroke.c.sample(frame),
        percent(stroke.o.as_ref(), frame) * opacity,
    )?;

    let cap = match stroke.lc {
        Some(2) => Cap::Round,
        Some(3) => Cap::Square,
        _ => Cap::Butt,
    };
    let join = match stroke.lj {
        Some(2) => Join::Round,
        Some(3) => Join::Bevel,
        _ => Join::Miter,
    };
    let style = kurbo::Stroke::new(width)
        .with_caps(cap)
        .with_join(join)
        .with_miter_limit(stroke.ml.unwrap_or(4.0));
    Some(DrawOp::Stroke {
        path,
        transform,
        color,
        style,
    })
}

fn combine(paths: &[BezPath]) -> Option<BezPath> {
    let mut out = BezPath::new();
    for p in paths {
        out.extend(p.iter());
    }
    (!out.is_empty()).then_some(out)
}

fn percent(p: Option<&Property<Numbers>>, frame: f64) -> f64 {
    p.map(|p| (p.sample(frame).get_or_last(0, 100.0) / 100.0).clamp(0.0, 1.0))
        .unwrap_or(1.0)
}

/// Lottie colors are `0..=1` floats; some exporters write `0..=255`.
fn paint_color(c: &Numbers, opacity: f64) -> Option<[u8; 4]> {
    let rgb = [c.get(0), c.get(1), c.get(2)];
    let scale = if rgb.iter().any(|&v| v > 1.0) {
        255.0
    } else {
        1.0
    };
    let alpha = if c.0.len() >= 4 { c.get(3) / scale } else { 1.0 };
    let a = (alpha.clamp(0.0, 1.0) * opacity * 255.0).round();
    if a <= 0.0 {
        return None;
    }
    let channel = |v: f64| ((v / scale).clamp(0.0, 1.0) * 255.0).round() as u8;
    Some([channel(rgb[0]), channel(rgb[1]), channel(rgb[2]), a as u8])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lottie::model::parse_document;
    use kurbo::Shape as _;

    fn doc(layers: &str) -> Document {
        parse_document(&format!(
            r#"{{ "fr": 10, "ip": 0, "op": 10, "w": 100, "h": 100, "layers": {layers} }}"#
        ))
        .unwrap()
    }

    fn fills(plan: &FramePlan) -> Vec<[u8; 4]> {
        plan.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Fill { color, .. } => Some(*color),
                _ => None,
            })
            .collect()
    }

    const RED_RECT: &str = r#"{ "ty": 4, "ip": 0, "op": 10, "ks": {}, "shapes": [
        { "ty": "rc", "p": { "a": 0, "k": [50, 50] }, "s": { "a": 0, "k": [20, 20] } },
        { "ty": "fl", "c": { "a": 0, "k": [1, 0, 0, 1] }, "o": { "a": 0, "k": 100 } }
    ] }"#;

    const BLUE_RECT: &str = r#"{ "ty": 4, "ip": 0, "op": 10, "ks": {}, "shapes": [
        { "ty": "rc", "p": { "a": 0, "k": [50, 50] }, "s": { "a": 0, "k": [20, 20] } },
        { "ty": "fl", "c": { "a": 0, "k": [0, 0, 1, 1] } }
    ] }"#;

    #[test]
    fn first_layer_is_painted_last() {
        let d = doc(&format!("[{RED_RECT}, {BLUE_RECT}]"));
        let plan = compile_frame(&d, 0.0, Affine::IDENTITY, 100, 100);
        assert_eq!(fills(&plan), vec![[0, 0, 255, 255], [255, 0, 0, 255]]);
    }

    #[test]
    fn inactive_and_hidden_layers_are_skipped() {
        let late = RED_RECT.replace(r#""ip": 0"#, r#""ip": 5"#);
        let hidden = BLUE_RECT.replace(r#""ty": 4,"#, r#""ty": 4, "hd": true,"#);
        let d = doc(&format!("[{late}, {hidden}]"));
        assert!(compile_frame(&d, 0.0, Affine::IDENTITY, 100, 100).ops.is_empty());
        assert_eq!(
            fills(&compile_frame(&d, 5.0, Affine::IDENTITY, 100, 100)).len(),
            1
        );
    }

    #[test]
    fn fill_above_stroke_in_list_paints_on_top() {
        let d = doc(
            r#"[{ "ty": 4, "ip": 0, "op": 10, "ks": {}, "shapes": [
                { "ty": "el", "p": { "a": 0, "k": [50, 50] }, "s": { "a": 0, "k": [40, 40] } },
                { "ty": "fl", "c": { "a": 0, "k": [0, 1, 0] } },
                { "ty": "st", "c": { "a": 0, "k": [0, 0, 0] }, "w": { "a": 0, "k": 4 }, "lc": 2, "lj": 2 }
            ] }]"#,
        );
        let plan = compile_frame(&d, 0.0, Affine::IDENTITY, 100, 100);
        assert!(matches!(plan.ops[0], DrawOp::Stroke { .. }));
        assert!(matches!(plan.ops[1], DrawOp::Fill { .. }));
    }

    #[test]
    fn parent_fill_covers_nested_group_paths() {
        let d = doc(
            r#"[{ "ty": 4, "ip": 0, "op": 10, "ks": {}, "shapes": [
                { "ty": "gr", "it": [
                    { "ty": "rc", "p": { "a": 0, "k": [0, 0] }, "s": { "a": 0, "k": [10, 10] } },
                    { "ty": "tr", "p": { "a": 0, "k": [30, 30] } }
                ] },
                { "ty": "fl", "c": { "a": 0, "k": [1, 1, 1] } }
            ] }]"#,
        );
        let plan = compile_frame(&d, 0.0, Affine::IDENTITY, 100, 100);
        let [DrawOp::Fill { path, transform, .. }] = plan.ops.as_slice() else {
            panic!("expected exactly one fill, got {:?}", plan.ops);
        };
        let bbox = (*transform * path.clone()).bounding_box();
        assert_eq!(bbox, Rect::new(25.0, 25.0, 35.0, 35.0));
    }

    #[test]
    fn layer_opacity_wraps_content() {
        let faded = RED_RECT.replace(r#""ks": {}"#, r#""ks": { "o": { "a": 0, "k": 50 } }"#);
        let d = doc(&format!("[{faded}]"));
        let plan = compile_frame(&d, 0.0, Affine::IDENTITY, 100, 100);
        assert!(matches!(plan.ops.first(), Some(DrawOp::PushOpacity(o)) if (*o - 0.5).abs() < 1e-6));
        assert!(matches!(plan.ops.last(), Some(DrawOp::Pop)));
    }

    #[test]
    fn parenting_applies_parent_transform() {
        let d = doc(
            r##"[
                { "ty": 3, "ind": 1, "ip": 0, "op": 10, "ks": { "p": { "a": 0, "k": [40, 0] } } },
                { "ty": 1, "ind": 2, "parent": 1, "ip": 0, "op": 10, "sc": "#00ff00", "sw": 10, "sh": 10, "ks": {} }
            ]"##,
        );
        let plan = compile_frame(&d, 0.0, Affine::IDENTITY, 100, 100);
        let [DrawOp::Fill { path, transform, color, .. }] = plan.ops.as_slice() else {
            panic!("expected the solid fill");
        };
        assert_eq!(*color, [0, 255, 0, 255]);
        assert_eq!(
            (*transform * path.clone()).bounding_box(),
            Rect::new(40.0, 0.0, 50.0, 10.0)
        );
    }

    #[test]
    fn precomp_is_clipped_and_time_shifted() {
        let d = parse_document(
            r##"{ "fr": 10, "ip": 0, "op": 20, "w": 100, "h": 100,
                 "assets": [ { "id": "comp_0", "layers": [
                    { "ty": 1, "ip": 0, "op": 5, "sc": "#ffffff", "sw": 200, "sh": 200, "ks": {} }
                 ] } ],
                 "layers": [
                    { "ty": 0, "refId": "comp_0", "ip": 0, "op": 20, "st": 10, "w": 50, "h": 50, "ks": {} }
                 ] }"##,
        )
        .unwrap();
        // frame 12 -> precomp time 2: child is visible
        let plan = compile_frame(&d, 12.0, Affine::IDENTITY, 100, 100);
        assert!(matches!(plan.ops[0], DrawOp::PushClip { .. }));
        assert_eq!(fills(&plan).len(), 1);
        assert!(matches!(plan.ops.last(), Some(DrawOp::Pop)));
        // frame 16 -> precomp time 6: child has ended
        let plan = compile_frame(&d, 16.0, Affine::IDENTITY, 100, 100);
        assert!(fills(&plan).is_empty());
    }

    #[test]
    fn self_referencing_precomp_expands_once() {
        let d = parse_document(
            r##"{ "fr": 10, "ip": 0, "op": 10, "w": 100, "h": 100,
                 "assets": [ { "id": "loop", "layers": [
                    { "ty": 0, "refId": "loop", "ip": 0, "op": 10, "ks": {} },
                    { "ty": 0, "refId": "loop", "ip": 0, "op": 10, "ks": {} },
                    { "ty": 0, "refId": "loop", "ip": 0, "op": 10, "ks": {} },
                    { "ty": 1, "ip": 0, "op": 10, "sc": "#ff0000", "sw": 10, "sh": 10, "ks": {} }
                 ] } ],
                 "layers": [
                    { "ty": 0, "refId": "loop", "ip": 0, "op": 10, "ks": {} },
                    { "ty": 0, "refId": "loop", "ip": 0, "op": 10, "ks": {} }
                 ] }"##,
        )
        .unwrap();
        let plan = compile_frame(&d, 0.0, Affine::IDENTITY, 100, 100);
        assert_eq!(fills(&plan), vec![[255, 0, 0, 255], [255, 0, 0, 255]]);
    }

    #[test]
    fn colors_accept_byte_range_and_drop_invisible_paints() {
        assert_eq!(
            paint_color(&Numbers(vec![255.0, 128.0, 0.0]), 1.0),
            Some([255, 128, 0, 255])
        );
        assert_eq!(
            paint_color(&Numbers(vec![1.0, 0.0, 0.0, 1.0]), 0.5),
            Some([255, 0, 0, 128])
        );
        assert_eq!(paint_color(&Numbers(vec![1.0, 1.0, 1.0]), 0.0), None);
    }
}
