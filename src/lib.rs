//! Flock blends two flame-fractal animation genomes into a transition genome.
//!
//! The output starts exactly where the left genome ends and finishes exactly where the right
//! genome begins, in value and in slope, for every animated parameter:
//!
//! - [`align_xforms`] makes the two xform collections structurally identical
//! - [`blend_genomes`] aligns, merges every field, and picks the boundary palettes
//!
//! The engine is pure: no I/O, no global state, and the same inputs (and seed) always give the
//! same output.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod blend;
pub(crate) mod genome;

pub use crate::animation::spline::{Knot, Spline};
pub use crate::blend::align::align_xforms;
pub use crate::blend::blend_genomes;
pub use crate::blend::fields::BLEND_AUTHOR;
pub use crate::blend::opts::{AlignSort, BlendOpts};
pub use crate::foundation::error::{FlockError, FlockResult};
pub use crate::genome::model::{
    Affine, Camera, ColorParams, DensityEstimation, Duration, Genome, Info, Point2, RgbSpline,
    Time, Variation, Xform, XformKey, XformMap,
};
pub use crate::genome::palette::{Palette, PaletteTimes, Rgb};

#[cfg(test)]
#[path = "../tests/unit/support.rs"]
mod test_support;
