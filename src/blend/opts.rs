use std::str::FromStr;

use crate::foundation::error::{FlockError, FlockResult};

/// Order in which each side's regular xforms are paired up before padding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignSort {
    /// By original key, numerically.
    Natural,
    /// By density, heaviest first on both sides.
    Weight,
    /// By density, heaviest first on the left and lightest first on the right.
    #[default]
    WeightFlip,
    /// By colour coordinate, ascending.
    Color,
}

impl FromStr for AlignSort {
    type Err = FlockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "natural" => Ok(Self::Natural),
            "weight" => Ok(Self::Weight),
            "weightflip" => Ok(Self::WeightFlip),
            "color" => Ok(Self::Color),
            other => Err(FlockError::validation(format!(
                "unknown alignment sort method '{other}'"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Options controlling [`crate::blend_genomes`].
pub struct BlendOpts {
    /// Full rotations traversed by animated affine angles. Values below 2 are allowed but tend to
    /// produce degenerate rotations.
    pub loops: u32,
    /// Xform pairing order.
    pub align: AlignSort,
    /// Standard deviation, in palette entries, of the optional palette smoothing.
    pub blur_stdev: Option<f64>,
    /// Whether to invert the right palette when that lowers colour discontinuity.
    pub pal_flip: bool,
    /// Experimental: add randomized interior knots to every blended spline.
    pub stagger: bool,
    /// Seed for `stagger`; derived from the genome names when absent.
    pub seed: Option<u64>,
}

impl Default for BlendOpts {
    fn default() -> Self {
        Self {
            loops: 2,
            align: AlignSort::default(),
            blur_stdev: None,
            pal_flip: true,
            stagger: false,
            seed: None,
        }
    }
}

impl BlendOpts {
    /// Validate option ranges.
    pub fn validate(&self) -> FlockResult<()> {
        if self.loops == 0 {
            return Err(FlockError::validation("loops must be > 0"));
        }
        if let Some(s) = self.blur_stdev
            && !(s.is_finite() && s > 0.0)
        {
            return Err(FlockError::validation("blur_stdev must be finite and > 0"));
        }
        if self.loops < 2 {
            tracing::warn!(
                loops = self.loops,
                "loop counts below 2 risk degenerate rotation blends"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/blend/opts.rs"]
mod tests;
