use std::f64::consts::{PI, TAU};

use crate::{
    foundation::error::{FlockError, FlockResult},
    genome::palette::Palette,
};

const KR: f64 = 0.299;
const KG: f64 = 0.587;
const KB: f64 = 0.114;
const U_SCALE: f64 = 0.492;
const V_SCALE: f64 = 0.877;

/// Kernel half-width in standard deviations.
const TRUNCATE: f64 = 4.0;

/// A palette in luma / chroma / hue form, one value per entry.
///
/// `hue` is unwrapped along the palette axis, so neighbouring entries never differ by more than
/// half a turn and the channel can be smoothed like any other.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PolarPalette {
    pub(crate) luma: Vec<f64>,
    pub(crate) chroma: Vec<f64>,
    pub(crate) hue: Vec<f64>,
}

impl PolarPalette {
    pub(crate) fn from_palette(palette: &Palette) -> Self {
        let n = palette.len();
        let mut out = Self {
            luma: Vec::with_capacity(n),
            chroma: Vec::with_capacity(n),
            hue: Vec::with_capacity(n),
        };
        for &[r, g, b] in palette.entries() {
            let y = KR * r + KG * g + KB * b;
            let u = U_SCALE * (b - y);
            let v = V_SCALE * (r - y);
            out.luma.push(y);
            out.chroma.push(u.hypot(v));
            out.hue.push(v.atan2(u));
        }
        unwrap_phase(&mut out.hue);
        out
    }

    /// Back to RGB, clamping each channel to `[0, 1]`.
    pub(crate) fn to_palette(&self) -> FlockResult<Palette> {
        if self.chroma.len() != self.luma.len() || self.hue.len() != self.luma.len() {
            return Err(FlockError::validation(
                "polar palette channels differ in length",
            ));
        }
        let entries = self
            .luma
            .iter()
            .zip(&self.chroma)
            .zip(&self.hue)
            .map(|((&y, &c), &h)| {
                let (u, v) = (c * h.cos(), c * h.sin());
                let b = y + u / U_SCALE;
                let r = y + v / V_SCALE;
                let g = (y - KR * r - KB * b) / KG;
                [r, g, b].map(|x| x.clamp(0.0, 1.0))
            })
            .collect();
        Palette::new(entries)
    }

    /// Gaussian-smoothed copy; hue at `stdev`, luma and chroma at half of it.
    pub(crate) fn smoothed(&self, stdev: f64) -> FlockResult<Self> {
        Ok(Self {
            luma: gaussian_filter1d(&self.luma, stdev / 2.0)?,
            chroma: gaussian_filter1d(&self.chroma, stdev / 2.0)?,
            hue: gaussian_filter1d(&self.hue, stdev)?,
        })
    }
}

/// Remove jumps larger than half a turn between consecutive angles.
pub(crate) fn unwrap_phase(angles: &mut [f64]) {
    let mut offset = 0.0;
    for i in 1..angles.len() {
        let raw = angles[i];
        let d = raw + offset - angles[i - 1];
        if d > PI {
            offset -= TAU * ((d - PI) / TAU).ceil();
        } else if d < -PI {
            offset += TAU * ((-PI - d) / TAU).ceil();
        }
        angles[i] = raw + offset;
    }
}

/// Reflect padding repeats every `2n` samples; the kernel is folded onto one such period and
/// truncated after this many of them.
const MAX_PERIODS: i64 = 256;

/// Gaussian weights folded onto `period` buckets, normalized to sum to one.
///
/// Bucket `k` holds the weight of every offset `j` with `j mod period == k`. A kernel wider than
/// `MAX_PERIODS` periods is cut at whole periods, with half weight on the two end taps.
fn folded_kernel(sigma: f64, period: i64) -> FlockResult<Vec<f64>> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(FlockError::validation("blur sigma must be > 0"));
    }
    let reach = (TRUNCATE * sigma + 0.5).floor();
    let limit = MAX_PERIODS * period;
    let (r, capped) = if reach > limit as f64 {
        (limit, true)
    } else {
        (reach as i64, false)
    };

    let mut weights = vec![0.0; period as usize];
    for j in -r..=r {
        // Scaled before squaring so a tiny sigma cannot turn 0/0 into NaN.
        let z = j as f64 / sigma;
        let mut w = (-0.5 * z * z).exp();
        if capped && j.abs() == r {
            w *= 0.5;
        }
        weights[j.rem_euclid(period) as usize] += w;
    }
    let sum: f64 = weights.iter().sum();
    for w in &mut weights {
        *w /= sum;
    }
    Ok(weights)
}

/// 1-D Gaussian smoothing with mirror-reflected edges (`d c b a | a b c d | d c b a`).
pub(crate) fn gaussian_filter1d(data: &[f64], sigma: f64) -> FlockResult<Vec<f64>> {
    let n = data.len() as i64;
    let kernel = folded_kernel(sigma, 2 * n.max(1))?;
    if n == 0 {
        return Ok(Vec::new());
    }
    let reflect = |i: i64| {
        let m = i.rem_euclid(2 * n);
        (if m >= n { 2 * n - 1 - m } else { m }) as usize
    };
    Ok((0..n)
        .map(|i| {
            kernel
                .iter()
                .zip(i..)
                .map(|(w, j)| w * data[reflect(j)])
                .sum::<f64>()
        })
        .collect())
}

#[cfg(test)]
#[path = "../../tests/unit/blend/color.rs"]
mod tests;
