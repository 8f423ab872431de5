use serde::Deserialize;

use crate::lottie::ease::CubicEase;

pub trait Lerp: Sized {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

/// A numeric property value: a scalar or a vector of components.
///
/// Lottie writes scalars either bare (`5`) or wrapped (`[5]`); both decode to one component.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(from = "RawNumbers")]
pub struct Numbers(pub Vec<f64>);

impl Numbers {
    pub fn scalar(v: f64) -> Self {
        Self(vec![v])
    }

    /// Component `i`, or `0.0` when absent.
    pub fn get(&self, i: usize) -> f64 {
        self.0.get(i).copied().unwrap_or(0.0)
    }

    /// Component `i`, falling back to the last available component, then to `default`.
    pub fn get_or_last(&self, i: usize, default: f64) -> f64 {
        self.0
            .get(i)
            .or_else(|| self.0.last())
            .copied()
            .unwrap_or(default)
    }

    pub fn first(&self) -> f64 {
        self.get(0)
    }
}

impl Lerp for Numbers {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        let out = a
            .0
            .iter()
            .enumerate()
            .map(|(i, &av)| {
                let bv = b.0.get(i).copied().unwrap_or(av);
                f64::lerp(&av, &bv, t)
            })
            .collect();
        Self(out)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumbers {
    One(f64),
    Many(Vec<f64>),
}

impl From<RawNumbers> for Numbers {
    fn from(raw: RawNumbers) -> Self {
        match raw {
            RawNumbers::One(v) => Self(vec![v]),
            RawNumbers::Many(v) => Self(v),
        }
    }
}

/// Cubic bezier outline as stored by Lottie: vertices plus tangents relative to each vertex.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(from = "RawPath")]
pub struct PathData {
    pub closed: bool,
    pub vertices: Vec<[f64; 2]>,
    pub in_tangents: Vec<[f64; 2]>,
    pub out_tangents: Vec<[f64; 2]>,
}

impl Lerp for PathData {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        let same_shape = a.vertices.len() == b.vertices.len()
            && a.in_tangents.len() == b.in_tangents.len()
            && a.out_tangents.len() == b.out_tangents.len();
        if !same_shape {
            return if t < 1.0 { a.clone() } else { b.clone() };
        }

        fn mix(a: &[[f64; 2]], b: &[[f64; 2]], t: f64) -> Vec<[f64; 2]> {
            a.iter()
                .zip(b)
                .map(|(p, q)| [f64::lerp(&p[0], &q[0], t), f64::lerp(&p[1], &q[1], t)])
                .collect()
        }

        Self {
            closed: a.closed,
            vertices: mix(&a.vertices, &b.vertices, t),
            in_tangents: mix(&a.in_tangents, &b.in_tangents, t),
            out_tangents: mix(&a.out_tangents, &b.out_tangents, t),
        }
    }
}

#[derive(Deserialize)]
struct RawPathData {
    #[serde(default)]
    c: bool,
    #[serde(default)]
    v: Vec<[f64; 2]>,
    #[serde(default)]
    i: Vec<[f64; 2]>,
    #[serde(default)]
    o: Vec<[f64; 2]>,
}

// Keyframed shapes wrap the outline in a one-element array.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawPath {
    One(RawPathData),
    Many(Vec<RawPathData>),
}

impl From<RawPath> for PathData {
    fn from(raw: RawPath) -> Self {
        let data = match raw {
            RawPath::One(d) => Some(d),
            RawPath::Many(v) => v.into_iter().next(),
        };
        match data {
            Some(d) => Self {
                closed: d.c,
                vertices: d.v,
                in_tangents: d.i,
                out_tangents: d.o,
            },
            None => Self::default(),
        }
    }
}

/// A property that is either static or animated by keyframes.
#[derive(Clone, Debug, Deserialize)]
#[serde(
    from = "RawProperty<T>",
    bound(deserialize = "T: Deserialize<'de>")
)]
pub enum Property<T> {
    Static(T),
    Animated(Vec<Keyframe<T>>),
}

#[derive(Clone, Debug)]
pub struct Keyframe<T> {
    pub time: f64,
    pub start: Option<T>,
    /// Legacy end value; newer files use the next keyframe's `start`.
    pub end: Option<T>,
    pub ease: CubicEase,
    pub hold: bool,
}

impl<T> Default for Property<T>
where
    T: Default,
{
    fn default() -> Self {
        Self::Static(T::default())
    }
}

impl<T> Property<T>
where
    T: Lerp + Clone + Default,
{
    pub fn fixed(value: T) -> Self {
        Self::Static(value)
    }

    pub fn is_animated(&self) -> bool {
        matches!(self, Self::Animated(keys) if keys.len() > 1)
    }

    /// Sample the property at `frame` (layer-local time).
    pub fn sample(&self, frame: f64) -> T {
        let keys = match self {
            Self::Static(v) => return v.clone(),
            Self::Animated(keys) => keys,
        };
        if keys.is_empty() {
            return T::default();
        }

        let idx = keys.partition_point(|k| k.time <= frame);
        if idx == 0 {
            return start_value(keys, 0);
        }
        if idx >= keys.len() {
            return start_value(keys, keys.len() - 1);
        }

        let a = &keys[idx - 1];
        let b = &keys[idx];
        let from = start_value(keys, idx - 1);
        if a.hold {
            return from;
        }
        let to = a
            .end
            .clone()
            .or_else(|| b.start.clone())
            .unwrap_or_else(|| from.clone());

        let span = b.time - a.time;
        if span <= 0.0 {
            return to;
        }
        let t = ((frame - a.time) / span).clamp(0.0, 1.0);
        T::lerp(&from, &to, a.ease.apply(t))
    }
}

// Value in effect at keyframe `i`: its own start, else whatever the previous segment ended on.
fn start_value<T: Clone + Default>(keys: &[Keyframe<T>], i: usize) -> T {
    if let Some(v) = &keys[i].start {
        return v.clone();
    }
    keys[..i]
        .iter()
        .rev()
        .find_map(|k| k.end.clone().or_else(|| k.start.clone()))
        .unwrap_or_default()
}

#[derive(Deserialize)]
struct RawProperty<T> {
    k: RawValue<T>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue<T> {
    Animated(Vec<RawKeyframe<T>>),
    Static(T),
}

#[derive(Deserialize)]
struct RawKeyframe<T> {
    t: f64,
    s: Option<T>,
    e: Option<T>,
    i: Option<RawHandle>,
    o: Option<RawHandle>,
    h: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct RawHandle {
    x: Numbers,
    y: Numbers,
}

impl<T> From<RawProperty<T>> for Property<T> {
    fn from(raw: RawProperty<T>) -> Self {
        match raw.k {
            RawValue::Static(v) => Self::Static(v),
            RawValue::Animated(keys) => {
                let mut keys: Vec<Keyframe<T>> = keys.into_iter().map(Keyframe::from).collect();
                keys.sort_by(|a, b| a.time.total_cmp(&b.time));
                Self::Animated(keys)
            }
        }
    }
}

impl<T> From<RawKeyframe<T>> for Keyframe<T> {
    fn from(raw: RawKeyframe<T>) -> Self {
        let ease = match (&raw.o, &raw.i) {
            (Some(o), Some(i)) => CubicEase::new(o.x.first(), o.y.first(), i.x.first(), i.y.first()),
            _ => CubicEase::LINEAR,
        };
        let hold = match raw.h {
            Some(serde_json::Value::Bool(b)) => b,
            Some(serde_json::Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
            _ => false,
        };
        Self {
            time: raw.t,
            start: raw.s,
            end: raw.e,
            ease,
            hold,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/lottie/property.rs"]
mod tests;
