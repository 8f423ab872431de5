/// Keyframe easing curve: a CSS-style cubic bezier through `(0,0)`, `(x1,y1)`, `(x2,y2)`, `(1,1)`.
///
/// Lottie stores the first control point on the outgoing keyframe (`o`) and the second one on
/// the same keyframe's incoming handle (`i`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicEase {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl CubicEase {
    pub const LINEAR: Self = Self {
        x1: 0.0,
        y1: 0.0,
        x2: 1.0,
        y2: 1.0,
    };

    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        // x must stay monotonic for the curve to be a function of time.
        Self {
            x1: x1.clamp(0.0, 1.0),
            y1,
            x2: x2.clamp(0.0, 1.0),
            y2,
        }
    }

    pub fn is_linear(&self) -> bool {
        self.x1 == self.y1 && self.x2 == self.y2
    }

    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        if self.is_linear() || t == 0.0 || t == 1.0 {
            return t;
        }
        let s = self.solve_x(t);
        bezier(s, self.y1, self.y2)
    }

    fn solve_x(&self, x: f64) -> f64 {
        const EPS: f64 = 1e-7;

        let mut s = x;
        for _ in 0..8 {
            let err = bezier(s, self.x1, self.x2) - x;
            if err.abs() < EPS {
                return s;
            }
            let d = bezier_slope(s, self.x1, self.x2);
            if d.abs() < 1e-6 {
                break;
            }
            s -= err / d;
        }

        let (mut lo, mut hi) = (0.0, 1.0);
        s = x;
        for _ in 0..64 {
            let v = bezier(s, self.x1, self.x2);
            if (v - x).abs() < EPS {
                break;
            }
            if v < x {
                lo = s;
            } else {
                hi = s;
            }
            s = 0.5 * (lo + hi);
        }
        s
    }
}

impl Default for CubicEase {
    fn default() -> Self {
        Self::LINEAR
    }
}

fn bezier(s: f64, p1: f64, p2: f64) -> f64 {
    let inv = 1.0 - s;
    3.0 * inv * inv * s * p1 + 3.0 * inv * s * s * p2 + s * s * s
}

fn bezier_slope(s: f64, p1: f64, p2: f64) -> f64 {
    let inv = 1.0 - s;
    3.0 * inv * inv * p1 + 6.0 * inv * s * (p2 - p1) + 3.0 * s * s * (1.0 - p2)
}
