use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::{
    animation::spline::Spline,
    foundation::error::{FlockError, FlockResult},
    genome::palette::{Palette, PaletteTimes},
};

/// Xforms keyed by [`XformKey`].
pub type XformMap = BTreeMap<XformKey, Xform>;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A complete animation descriptor for one flame.
///
/// Every numeric parameter is a [`Spline`] over normalized time `[0, 1]`; the wall-clock length
/// of that interval is [`Time::duration`].
pub struct Genome {
    /// Name and authorship.
    #[serde(default)]
    pub info: Info,
    /// Duration and temporal filtering.
    pub time: Time,
    /// Viewport parameters.
    #[serde(default)]
    pub camera: Camera,
    /// Global colouring parameters and palette selection.
    #[serde(default)]
    pub color: ColorParams,
    /// Density estimation filter parameters.
    #[serde(default)]
    pub de: DensityEstimation,
    /// Encoded colour tables, referenced by index from [`ColorParams::palette_times`].
    pub palettes: Vec<Palette>,
    /// Transforms keyed by index, plus at most one [`XformKey::Final`].
    pub xforms: XformMap,
    /// Opaque provenance link, copied from the left genome when blending.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl Genome {
    /// The final xform, if present.
    pub fn final_xform(&self) -> Option<&Xform> {
        self.xforms.get(&XformKey::Final)
    }

    /// Regular (non-final) xforms in key order.
    pub fn regular_xforms(&self) -> impl Iterator<Item = (u32, &Xform)> {
        self.xforms.iter().filter_map(|(k, x)| match k {
            XformKey::Index(i) => Some((*i, x)),
            XformKey::Final => None,
        })
    }

    /// Validate static invariants of the genome.
    pub fn validate(&self) -> FlockResult<()> {
        let d = self.time.duration.value();
        if !(d.is_finite() && d > 0.0) {
            return Err(FlockError::validation("time.duration must be finite and > 0"));
        }
        if self.palettes.is_empty() {
            return Err(FlockError::validation("genome must have at least one palette"));
        }
        self.color.palette_times.validate(self.palettes.len())?;

        for (key, xf) in &self.xforms {
            match (key, &xf.density) {
                (XformKey::Final, Some(_)) => {
                    return Err(FlockError::validation(
                        "xforms.final must not carry a density",
                    ));
                }
                (XformKey::Index(i), None) => {
                    return Err(FlockError::validation(format!(
                        "xforms.{i} is missing its density"
                    )));
                }
                _ => {}
            }
            if xf.variations.is_empty() {
                return Err(FlockError::validation(format!(
                    "xforms.{key} must have at least one variation"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// Name and authorship metadata.
pub struct Info {
    /// Display name; blended genomes are named `left=right`.
    #[serde(default)]
    pub name: String,
    /// Contributors, in credit order.
    #[serde(default)]
    pub authors: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Timing parameters.
pub struct Time {
    /// Length of the normalized `[0, 1]` interval.
    pub duration: Duration,
    /// Temporal filter width.
    #[serde(default = "spline_one")]
    pub frame_width: Spline,
}

/// Genome duration, either wall-clock or relative to the content.
///
/// Relative durations are written as a string with a trailing `s` (`"10s"`), absolute ones as a
/// bare number of seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Duration {
    /// Seconds of wall-clock time.
    Absolute(f64),
    /// Content-relative length.
    Relative(f64),
}

impl Duration {
    /// Magnitude regardless of kind.
    pub fn value(self) -> f64 {
        match self {
            Self::Absolute(v) | Self::Relative(v) => v,
        }
    }

    /// Whether this duration is content-relative.
    pub fn is_relative(self) -> bool {
        matches!(self, Self::Relative(_))
    }
}

impl serde::Serialize for Duration {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match *self {
            Self::Absolute(v) => serializer.serialize_f64(v),
            Self::Relative(v) => serializer.collect_str(&format_args!("{v}s")),
        }
    }
}

impl<'de> serde::Deserialize<'de> for Duration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Seconds(f64),
            Tagged(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Seconds(v) => Ok(Self::Absolute(v)),
            Repr::Tagged(s) => {
                let num = s.trim().strip_suffix('s').ok_or_else(|| {
                    <D::Error as serde::de::Error>::custom(format!(
                        "relative duration \"{s}\" must end with 's'"
                    ))
                })?;
                num.trim()
                    .parse::<f64>()
                    .map(Self::Relative)
                    .map_err(|_| serde::de::Error::custom(format!("invalid duration \"{s}\"")))
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A pair of animated coordinates.
pub struct Point2 {
    /// Horizontal component.
    pub x: Spline,
    /// Vertical component.
    pub y: Spline,
}

impl Point2 {
    /// Constant point.
    pub fn constant(x: f64, y: f64) -> Self {
        Self {
            x: Spline::constant(x),
            y: Spline::constant(y),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Viewport parameters.
pub struct Camera {
    /// Centre of the view in flame space.
    pub center: Point2,
    /// Zoom factor.
    pub scale: Spline,
    /// View rotation in degrees.
    pub rotation: Spline,
    /// Spatial dither width.
    pub dither_width: Spline,
    /// Sample density multiplier.
    pub density: Spline,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            center: Point2::constant(0.0, 0.0),
            scale: Spline::constant(1.0),
            rotation: Spline::constant(0.0),
            dither_width: Spline::constant(1.0),
            density: Spline::constant(1.0),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Animated RGB triple with channels in `[0, 1]`.
pub struct RgbSpline {
    /// Red.
    pub r: Spline,
    /// Green.
    pub g: Spline,
    /// Blue.
    pub b: Spline,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Global colouring parameters.
pub struct ColorParams {
    /// Output brightness.
    #[serde(default = "default_brightness")]
    pub brightness: Spline,
    /// Output gamma.
    #[serde(default = "default_gamma")]
    pub gamma: Spline,
    /// Highlight power; negative disables.
    #[serde(default = "default_highlight_power")]
    pub highlight_power: Spline,
    /// Linear range below which gamma is not applied.
    #[serde(default = "default_gamma_threshold")]
    pub gamma_threshold: Spline,
    /// Saturation boost.
    #[serde(default = "spline_one")]
    pub vibrance: Spline,
    /// Background colour.
    #[serde(default = "default_background")]
    pub background: RgbSpline,
    /// Which palette is in effect over time.
    #[serde(default)]
    pub palette_times: PaletteTimes,
}

impl Default for ColorParams {
    fn default() -> Self {
        Self {
            brightness: default_brightness(),
            gamma: default_gamma(),
            highlight_power: default_highlight_power(),
            gamma_threshold: default_gamma_threshold(),
            vibrance: spline_one(),
            background: default_background(),
            palette_times: PaletteTimes::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Density estimation filter parameters.
pub struct DensityEstimation {
    /// Maximum filter radius.
    pub radius: Spline,
    /// Minimum filter radius.
    pub minimum: Spline,
    /// Falloff curve exponent.
    pub curve: Spline,
}

impl Default for DensityEstimation {
    fn default() -> Self {
        Self {
            radius: Spline::constant(11.0),
            minimum: Spline::constant(0.0),
            curve: Spline::constant(0.6),
        }
    }
}

/// Key of an entry in [`Genome::xforms`].
///
/// Index keys carry no ordering meaning; they only need to be unique.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum XformKey {
    /// A regular xform.
    Index(u32),
    /// The final xform, applied once after the iteration chain.
    Final,
}

impl fmt::Display for XformKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Final => f.write_str("final"),
        }
    }
}

impl FromStr for XformKey {
    type Err = FlockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "final" {
            return Ok(Self::Final);
        }
        s.parse::<u32>()
            .map(Self::Index)
            .map_err(|_| FlockError::validation(format!("invalid xform key '{s}'")))
    }
}

impl serde::Serialize for XformKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for XformKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// One weighted geometric and colour transform.
pub struct Xform {
    /// Palette coordinate this xform pulls towards.
    #[serde(default = "spline_zero")]
    pub color: Spline,
    /// How strongly `color` is mixed in per iteration.
    #[serde(default = "default_color_speed")]
    pub color_speed: Spline,
    /// Visibility of points produced by this xform.
    #[serde(default = "spline_one")]
    pub opacity: Spline,
    /// Selection weight; absent on the final xform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density: Option<Spline>,
    /// Pre-variation affine.
    pub affine: Affine,
    /// Post-variation affine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Affine>,
    /// Variation parameter sets keyed by variation name.
    pub variations: BTreeMap<String, Variation>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Polar description of a 2D affine transform.
///
/// The x axis points at `angle - spread` degrees and the y axis at `angle + spread`; a negative
/// `spread` mirrors the transform.
pub struct Affine {
    /// Half the angle between the two axes, in degrees.
    pub spread: Spline,
    /// Mean axis direction, in degrees.
    pub angle: Spline,
    /// Axis lengths.
    pub magnitude: Point2,
    /// Translation.
    pub offset: Point2,
}

impl Affine {
    /// Canonical unmirrored affine (spread 45, angle 45).
    pub fn normal() -> Self {
        Self::canonical(45.0, 45.0)
    }

    /// Canonical mirrored affine (spread -45, angle 135).
    pub fn flipped() -> Self {
        Self::canonical(-45.0, 135.0)
    }

    fn canonical(spread: f64, angle: f64) -> Self {
        Self {
            spread: Spline::constant(spread),
            angle: Spline::constant(angle),
            magnitude: Point2::constant(1.0, 1.0),
            offset: Point2::constant(0.0, 0.0),
        }
    }

    /// Whether the transform is mirrored at `t = 0`.
    pub fn is_flipped(&self) -> bool {
        self.spread.eval(0.0) < 0.0
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Parameters of one variation; every variation has a `weight`.
pub struct Variation {
    /// Contribution of this variation to the xform output.
    pub weight: Spline,
    /// Variation-specific parameters.
    #[serde(flatten)]
    pub params: BTreeMap<String, Spline>,
}

impl Variation {
    /// Variation with the given constant weight and no parameters.
    pub fn with_weight(weight: f64) -> Self {
        Self {
            weight: Spline::constant(weight),
            params: BTreeMap::new(),
        }
    }
}

fn spline_zero() -> Spline {
    Spline::constant(0.0)
}

fn spline_one() -> Spline {
    Spline::constant(1.0)
}

fn default_color_speed() -> Spline {
    Spline::constant(0.5)
}

fn default_brightness() -> Spline {
    Spline::constant(4.0)
}

fn default_gamma() -> Spline {
    Spline::constant(4.0)
}

fn default_highlight_power() -> Spline {
    Spline::constant(-1.0)
}

fn default_gamma_threshold() -> Spline {
    Spline::constant(0.01)
}

fn default_background() -> RgbSpline {
    RgbSpline {
        r: spline_zero(),
        g: spline_zero(),
        b: spline_zero(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/genome/model.rs"]
mod tests;
