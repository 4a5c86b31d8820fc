use serde::{Deserialize, Serialize};

use crate::foundation::error::{FlockError, FlockResult};

/// One `(time, value)` control point of a [`Spline`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Knot {
    /// Normalized time, usually in `[0, 1]`.
    pub t: f64,
    /// Value at `t`.
    pub v: f64,
}

impl Knot {
    /// Build a knot.
    pub fn new(t: f64, v: f64) -> Self {
        Self { t, v }
    }
}

/// A scalar animated over normalized time.
///
/// Segments between knots are cubic Hermite curves. Interior tangents are Catmull-Rom style
/// central differences; the first and last knot use the explicit boundary slopes when given and
/// a one-sided secant otherwise. Outside the knot range the curve continues along the boundary
/// tangent, which is what stabilizing knots at `t = -2` and `t = 3` placed on those tangents would
/// produce, without disturbing the interior shape.
///
/// At the first and last knot, [`Spline::eval`] and [`Spline::deriv`] return the stored value and
/// slope exactly.
#[derive(Clone, Debug, PartialEq)]
pub struct Spline {
    knots: Vec<Knot>, // sorted by t, non-empty
    v0: Option<f64>,  // slope at first knot
    v1: Option<f64>,  // slope at last knot
}

impl Spline {
    /// Build a spline, validating that `knots` is non-empty, finite, and sorted by time.
    pub fn new(knots: Vec<Knot>, v0: Option<f64>, v1: Option<f64>) -> FlockResult<Self> {
        if knots.is_empty() {
            return Err(FlockError::spline("spline must have at least one knot"));
        }
        if knots.iter().any(|k| !k.t.is_finite() || !k.v.is_finite()) {
            return Err(FlockError::spline("spline knots must be finite"));
        }
        if !knots.windows(2).all(|w| w[0].t <= w[1].t) {
            return Err(FlockError::spline("spline knots must be sorted by time"));
        }
        if v0.is_some_and(|s| !s.is_finite()) || v1.is_some_and(|s| !s.is_finite()) {
            return Err(FlockError::spline("spline boundary slopes must be finite"));
        }
        Ok(Self { knots, v0, v1 })
    }

    /// Build a spline from a flat `[t0, v0, t1, v1, ...]` list.
    pub fn from_flat(flat: &[f64], v0: Option<f64>, v1: Option<f64>) -> FlockResult<Self> {
        if flat.len() % 2 != 0 {
            return Err(FlockError::spline(
                "flat knot list must have an even number of values",
            ));
        }
        let knots = flat
            .chunks_exact(2)
            .map(|p| Knot::new(p[0], p[1]))
            .collect();
        Self::new(knots, v0, v1)
    }

    /// A spline that holds `value` everywhere.
    pub fn constant(value: f64) -> Self {
        Self {
            knots: vec![Knot::new(0.0, value), Knot::new(1.0, value)],
            v0: None,
            v1: None,
        }
    }

    /// Two-knot spline over `[0, 1]` with the given boundary values and slopes.
    pub fn hermite(start: f64, start_slope: f64, end: f64, end_slope: f64) -> Self {
        Self {
            knots: vec![Knot::new(0.0, start), Knot::new(1.0, end)],
            v0: Some(start_slope),
            v1: Some(end_slope),
        }
    }

    /// Control points, sorted by time.
    pub fn knots(&self) -> &[Knot] {
        &self.knots
    }

    /// Explicit boundary slopes, if any.
    pub fn slopes(&self) -> (Option<f64>, Option<f64>) {
        (self.v0, self.v1)
    }

    /// Whether this spline holds a single value over `[0, 1]`.
    pub fn is_constant(&self) -> bool {
        let zero = |s: Option<f64>| s.is_none_or(|s| s == 0.0);
        matches!(self.knots.as_slice(), [a, b]
            if a.t == 0.0 && b.t == 1.0 && a.v == b.v && zero(self.v0) && zero(self.v1))
    }

    /// Value at `t`.
    pub fn eval(&self, t: f64) -> f64 {
        let first = self.knots[0];
        let last = self.knots[self.knots.len() - 1];
        if t <= first.t {
            return first.v + self.tangent(0) * (t - first.t);
        }
        if t >= last.t {
            return last.v + self.tangent(self.knots.len() - 1) * (t - last.t);
        }

        let (a, b, h, s) = self.segment(t);
        let (s2, s3) = (s * s, s * s * s);
        let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
        let h10 = s3 - 2.0 * s2 + s;
        let h01 = -2.0 * s3 + 3.0 * s2;
        let h11 = s3 - s2;
        h00 * self.knots[a].v
            + h10 * h * self.tangent(a)
            + h01 * self.knots[b].v
            + h11 * h * self.tangent(b)
    }

    /// First derivative with respect to `t`.
    pub fn deriv(&self, t: f64) -> f64 {
        let first = self.knots[0];
        let last = self.knots[self.knots.len() - 1];
        if t <= first.t {
            return self.tangent(0);
        }
        if t >= last.t {
            return self.tangent(self.knots.len() - 1);
        }

        let (a, b, h, s) = self.segment(t);
        let s2 = s * s;
        let d00 = 6.0 * s2 - 6.0 * s;
        let d10 = 3.0 * s2 - 4.0 * s + 1.0;
        let d01 = -6.0 * s2 + 6.0 * s;
        let d11 = 3.0 * s2 - 2.0 * s;
        (d00 * self.knots[a].v + d01 * self.knots[b].v) / h
            + d10 * self.tangent(a)
            + d11 * self.tangent(b)
    }

    // Caller guarantees first.t < t < last.t, so the bracketing segment has positive width.
    fn segment(&self, t: f64) -> (usize, usize, f64, f64) {
        let b = self.knots.partition_point(|k| k.t <= t);
        let a = b - 1;
        let h = self.knots[b].t - self.knots[a].t;
        (a, b, h, (t - self.knots[a].t) / h)
    }

    fn tangent(&self, i: usize) -> f64 {
        let n = self.knots.len();
        if n == 1 {
            return self.v0.or(self.v1).unwrap_or(0.0);
        }
        if i == 0 {
            return self.v0.unwrap_or_else(|| self.secant(0, 1));
        }
        if i == n - 1 {
            return self.v1.unwrap_or_else(|| self.secant(n - 2, n - 1));
        }
        self.secant(i - 1, i + 1)
    }

    fn secant(&self, i: usize, j: usize) -> f64 {
        let dt = self.knots[j].t - self.knots[i].t;
        if dt <= 0.0 {
            return 0.0;
        }
        (self.knots[j].v - self.knots[i].v) / dt
    }

    fn flat(&self) -> Vec<f64> {
        self.knots.iter().flat_map(|k| [k.t, k.v]).collect()
    }
}

impl Serialize for Spline {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        #[derive(Serialize)]
        struct WithSlopes {
            knots: Vec<f64>,
            #[serde(skip_serializing_if = "Option::is_none")]
            v0: Option<f64>,
            #[serde(skip_serializing_if = "Option::is_none")]
            v1: Option<f64>,
        }

        if self.is_constant() {
            return serializer.serialize_f64(self.knots[0].v);
        }
        if self.v0.is_none() && self.v1.is_none() {
            return self.flat().serialize(serializer);
        }
        WithSlopes {
            knots: self.flat(),
            v0: self.v0,
            v1: self.v1,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Spline {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Constant(f64),
            Flat(Vec<f64>),
            WithSlopes {
                knots: Vec<f64>,
                #[serde(default)]
                v0: Option<f64>,
                #[serde(default)]
                v1: Option<f64>,
            },
        }

        match Repr::deserialize(deserializer)? {
            Repr::Constant(v) if v.is_finite() => Ok(Self::constant(v)),
            Repr::Constant(_) => Err(serde::de::Error::custom("spline value must be finite")),
            Repr::Flat(flat) => Self::from_flat(&flat, None, None).map_err(serde::de::Error::custom),
            Repr::WithSlopes { knots, v0, v1 } => {
                Self::from_flat(&knots, v0, v1).map_err(serde::de::Error::custom)
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/spline.rs"]
mod tests;
