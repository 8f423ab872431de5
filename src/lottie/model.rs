//! Serde model of the Lottie subset this crate renders.
//!
//! Field names follow the Lottie JSON keys; unknown keys are ignored so that files exported with
//! features outside the subset still load and render what is supported.

use serde::Deserialize;

use crate::{
    foundation::core::{Affine, Size, Vec2},
    foundation::error::{ConvertError, ConvertResult},
    lottie::property::{Numbers, PathData, Property},
};

/// Top-level Lottie document.
#[derive(Clone, Debug, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub v: Option<String>,
    #[serde(default)]
    pub nm: Option<String>,
    /// Frame rate.
    pub fr: f64,
    /// In point (first frame).
    pub ip: f64,
    /// Out point (exclusive end frame).
    pub op: f64,
    pub w: f64,
    pub h: f64,
    #[serde(default)]
    pub layers: Vec<Layer>,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

impl Document {
    pub fn validate(&self) -> ConvertResult<()> {
        if !(self.w > 0.0 && self.h > 0.0) || !self.w.is_finite() || !self.h.is_finite() {
            return Err(ConvertError::load(format!(
                "animation size must be positive, got {}x{}",
                self.w, self.h
            )));
        }
        if !(self.fr > 0.0) || !self.fr.is_finite() {
            return Err(ConvertError::load(format!(
                "frame rate must be positive, got {}",
                self.fr
            )));
        }
        if !(self.op > self.ip) {
            return Err(ConvertError::load(format!(
                "out point ({}) must be after in point ({})",
                self.op, self.ip
            )));
        }
        Ok(())
    }

    pub fn size(&self) -> Size {
        Size::new(self.w, self.h)
    }

    pub fn total_frames(&self) -> f64 {
        self.op - self.ip
    }

    pub fn duration_secs(&self) -> f64 {
        self.total_frames() / self.fr
    }

    pub fn precomp(&self, id: &str) -> Option<&[Layer]> {
        self.assets
            .iter()
            .find(|a| a.id == id)
            .and_then(|a| a.layers.as_deref())
    }
}

/// Entry of the `assets` array. Only precompositions (assets with `layers`) are used.
#[derive(Clone, Debug, Deserialize)]
pub struct Asset {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default)]
    pub layers: Option<Vec<Layer>>,
}

fn de_id<'de, D>(d: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Str(String),
        Num(serde_json::Number),
    }

    Ok(match Id::deserialize(d)? {
        Id::Str(s) => s,
        Id::Num(n) => n.to_string(),
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerKind {
    Precomp,
    Solid,
    Image,
    Null,
    Shape,
    Text,
    Other(u32),
}

impl From<u32> for LayerKind {
    fn from(ty: u32) -> Self {
        match ty {
            0 => Self::Precomp,
            1 => Self::Solid,
            2 => Self::Image,
            3 => Self::Null,
            4 => Self::Shape,
            5 => Self::Text,
            other => Self::Other(other),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Layer {
    #[serde(rename = "ty", deserialize_with = "de_layer_kind")]
    pub kind: LayerKind,
    #[serde(default)]
    pub nm: Option<String>,
    #[serde(default)]
    pub ind: Option<f64>,
    #[serde(default)]
    pub parent: Option<f64>,
    #[serde(default)]
    pub ip: f64,
    #[serde(default = "default_out_point")]
    pub op: f64,
    /// Start time offset applied to the layer's local timeline.
    #[serde(default)]
    pub st: f64,
    /// Time stretch.
    #[serde(default = "default_stretch")]
    pub sr: f64,
    #[serde(default)]
    pub ks: Transform,
    #[serde(default)]
    pub shapes: Vec<ShapeItem>,
    #[serde(rename = "refId", default)]
    pub ref_id: Option<String>,
    #[serde(default)]
    pub w: Option<f64>,
    #[serde(default)]
    pub h: Option<f64>,
    /// Solid color as `#rrggbb`.
    #[serde(default)]
    pub sc: Option<String>,
    #[serde(default)]
    pub sw: Option<f64>,
    #[serde(default)]
    pub sh: Option<f64>,
    #[serde(default)]
    pub hd: bool,
    /// `1` when this layer only serves as a track matte for the layer below.
    #[serde(default)]
    pub td: Option<u8>,
}

fn default_out_point() -> f64 {
    f64::INFINITY
}

fn default_stretch() -> f64 {
    1.0
}

fn de_layer_kind<'de, D>(d: D) -> Result<LayerKind, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let ty = f64::deserialize(d)?;
    Ok(LayerKind::from(ty.max(0.0) as u32))
}

impl Layer {
    /// Whether the layer is on screen at composition frame `frame`.
    pub fn is_active(&self, frame: f64) -> bool {
        self.ip <= frame && frame < self.op
    }

    /// Map a composition frame into this layer's local timeline.
    pub fn local_time(&self, frame: f64) -> f64 {
        let sr = if self.sr == 0.0 { 1.0 } else { self.sr };
        (frame - self.st) / sr
    }

    pub fn is_matte_source(&self) -> bool {
        self.td.is_some_and(|td| td != 0)
    }
}

/// Position is either a single vector property or split into separate `x`/`y` properties.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum Position {
    Split {
        x: Property<Numbers>,
        y: Property<Numbers>,
    },
    Unified(Property<Numbers>),
}

impl Position {
    pub fn sample(&self, frame: f64) -> Vec2 {
        match self {
            Self::Split { x, y } => Vec2::new(x.sample(frame).first(), y.sample(frame).first()),
            Self::Unified(p) => {
                let v = p.sample(frame);
                Vec2::new(v.get(0), v.get(1))
            }
        }
    }
}

/// Layer transform (`ks`) and shape-group transform (`tr`).
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Transform {
    #[serde(default)]
    pub a: Option<Property<Numbers>>,
    #[serde(default)]
    pub p: Option<Position>,
    #[serde(default)]
    pub s: Option<Property<Numbers>>,
    #[serde(default, alias = "rz")]
    pub r: Option<Property<Numbers>>,
    #[serde(default)]
    pub o: Option<Property<Numbers>>,
    #[serde(default)]
    pub sk: Option<Property<Numbers>>,
    #[serde(default)]
    pub sa: Option<Property<Numbers>>,
}

impl Transform {
    /// `translate(p) * rotate(r) * skew * scale(s) * translate(-a)`.
    pub fn affine(&self, frame: f64) -> Affine {
        let anchor = self
            .a
            .as_ref()
            .map(|a| {
                let v = a.sample(frame);
                Vec2::new(v.get(0), v.get(1))
            })
            .unwrap_or(Vec2::ZERO);
        let position = self
            .p
            .as_ref()
            .map(|p| p.sample(frame))
            .unwrap_or(Vec2::ZERO);
        let (sx, sy) = self
            .s
            .as_ref()
            .map(|s| {
                let v = s.sample(frame);
                (v.get_or_last(0, 100.0) / 100.0, v.get_or_last(1, 100.0) / 100.0)
            })
            .unwrap_or((1.0, 1.0));
        let rotation = self
            .r
            .as_ref()
            .map(|r| r.sample(frame).first().to_radians())
            .unwrap_or(0.0);

        let mut m = Affine::translate(position) * Affine::rotate(rotation);
        if let Some(sk) = &self.sk {
            let skew = sk.sample(frame).first().to_radians();
            if skew != 0.0 {
                let axis = self
                    .sa
                    .as_ref()
                    .map(|sa| sa.sample(frame).first().to_radians())
                    .unwrap_or(0.0);
                m = m
                    * Affine::rotate(axis)
                    * Affine::skew((-skew).tan(), 0.0)
                    * Affine::rotate(-axis);
            }
        }
        m * Affine::scale_non_uniform(sx, sy) * Affine::translate(-anchor)
    }

    /// Opacity in `0.0..=1.0`.
    pub fn opacity(&self, frame: f64) -> f64 {
        self.o
            .as_ref()
            .map(|o| (o.sample(frame).get_or_last(0, 100.0) / 100.0).clamp(0.0, 1.0))
            .unwrap_or(1.0)
    }
}

/// Items of a shape layer's `shapes` array or a group's `it` array, tagged by `ty`.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "ty")]
pub enum ShapeItem {
    #[serde(rename = "gr")]
    Group(Group),
    #[serde(rename = "rc")]
    Rect(RectShape),
    #[serde(rename = "el")]
    Ellipse(EllipseShape),
    #[serde(rename = "sh")]
    Path(PathShape),
    #[serde(rename = "sr")]
    Star(StarShape),
    #[serde(rename = "fl")]
    Fill(Fill),
    #[serde(rename = "st")]
    Stroke(Stroke),
    #[serde(rename = "tr")]
    Transform(Transform),
    #[serde(other)]
    Unsupported,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Group {
    #[serde(default)]
    pub nm: Option<String>,
    #[serde(default)]
    pub hd: bool,
    #[serde(default)]
    pub it: Vec<ShapeItem>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RectShape {
    #[serde(default)]
    pub hd: bool,
    /// Center.
    pub p: Property<Numbers>,
    /// Size.
    pub s: Property<Numbers>,
    /// Corner roundness.
    #[serde(default)]
    pub r: Property<Numbers>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EllipseShape {
    #[serde(default)]
    pub hd: bool,
    pub p: Property<Numbers>,
    pub s: Property<Numbers>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PathShape {
    #[serde(default)]
    pub hd: bool,
    pub ks: Property<PathData>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StarKind {
    Star,
    Polygon,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StarShape {
    #[serde(default)]
    pub hd: bool,
    pub p: Property<Numbers>,
    /// Outer radius.
    pub or: Property<Numbers>,
    /// Inner radius (stars only).
    #[serde(default)]
    pub ir: Option<Property<Numbers>>,
    /// Rotation in degrees.
    #[serde(default)]
    pub r: Property<Numbers>,
    /// Number of points.
    pub pt: Property<Numbers>,
    #[serde(default = "default_star_type")]
    pub sy: u8,
}

fn default_star_type() -> u8 {
    1
}

impl StarShape {
    pub fn kind(&self) -> StarKind {
        if self.sy == 2 {
            StarKind::Polygon
        } else {
            StarKind::Star
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FillRule {
    NonZero,
    EvenOdd,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Fill {
    #[serde(default)]
    pub hd: bool,
    /// Color, components in `0..=1`.
    pub c: Property<Numbers>,
    /// Opacity in percent.
    #[serde(default)]
    pub o: Option<Property<Numbers>>,
    #[serde(default)]
    pub r: Option<u8>,
}

impl Fill {
    pub fn rule(&self) -> FillRule {
        if self.r == Some(2) {
            FillRule::EvenOdd
        } else {
            FillRule::NonZero
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Stroke {
    #[serde(default)]
    pub hd: bool,
    pub c: Property<Numbers>,
    #[serde(default)]
    pub o: Option<Property<Numbers>>,
    /// Stroke width.
    pub w: Property<Numbers>,
    /// Line cap: 1 butt, 2 round, 3 square.
    #[serde(default)]
    pub lc: Option<u8>,
    /// Line join: 1 miter, 2 round, 3 bevel.
    #[serde(default)]
    pub lj: Option<u8>,
    /// Miter limit.
    #[serde(default)]
    pub ml: Option<f64>,
}

/// Parse and validate a document from JSON text.
pub fn parse_document(json: &str) -> ConvertResult<Document> {
    let doc: Document = serde_json::from_str(json)
        .map_err(|e| ConvertError::load(format!("malformed lottie json: {e}")))?;
    doc.validate()?;
    Ok(doc)
}
