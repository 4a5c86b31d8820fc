use std::collections::BTreeMap;
use std::fmt;

use smallvec::SmallVec;

use crate::{
    animation::spline::Spline,
    blend::interp::{AngleMode, SlopeScale, blend_knots},
    blend::opts::BlendOpts,
    blend::palette::boundary_palettes,
    foundation::error::{FlockError, FlockResult},
    foundation::math::{Rng64, approx_zero, seed_from_names},
    genome::model::{
        Affine, Camera, ColorParams, DensityEstimation, Duration, Genome, Info, Point2, RgbSpline,
        Time, Variation, Xform, XformKey, XformMap,
    },
    genome::palette::PaletteTimes,
};

/// Marker appended to the author list of every blended genome.
pub const BLEND_AUTHOR: &str = "flockutil";

/// How a spline leaf of the genome schema is merged.
///
/// Non-spline leaves have fixed rules in their section's [`Blend`] impl: `palette_times` is
/// replaced by [`PaletteTimes::endpoints`] and `link` is copied from the left side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Strategy {
    /// Default boundary-continuous spline blend.
    Linear,
    /// Angle in degrees; loop count picked from how rotationally active each side is.
    AngleLoops,
    /// Angle in degrees; shortest rotation, no extra turns.
    AngleClockwise,
}

/// Which affine of an xform is being blended; decides the angle strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AffineSlot {
    Pre { is_final: bool },
    Post,
}

impl AffineSlot {
    fn angle_strategy(self) -> Strategy {
        match self {
            Self::Pre { is_final: false } => Strategy::AngleLoops,
            Self::Pre { is_final: true } | Self::Post => Strategy::AngleClockwise,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Field(&'static str),
    Key(String),
}

/// Dotted location of the field being blended, rooted at `$`.
#[derive(Clone, Debug, Default)]
pub(crate) struct FieldPath(SmallVec<[Segment; 6]>);

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for seg in &self.0 {
            match seg {
                Segment::Field(name) => write!(f, ".{name}")?,
                Segment::Key(key) => write!(f, ".{key}")?,
            }
        }
        Ok(())
    }
}

/// Walk state shared by every field blend of one genome pair.
pub(crate) struct BlendCx {
    scale: SlopeScale,
    loops: u32,
    stagger: Option<Rng64>,
    path: FieldPath,
}

impl BlendCx {
    pub(crate) fn new(scale: SlopeScale, loops: u32, stagger: Option<Rng64>) -> Self {
        Self {
            scale,
            loops,
            stagger,
            path: FieldPath::default(),
        }
    }

    fn descend<T>(
        &mut self,
        seg: Segment,
        f: impl FnOnce(&mut Self) -> FlockResult<T>,
    ) -> FlockResult<T> {
        self.path.0.push(seg);
        let out = f(self);
        self.path.0.pop();
        out
    }

    fn field<T>(
        &mut self,
        name: &'static str,
        f: impl FnOnce(&mut Self) -> FlockResult<T>,
    ) -> FlockResult<T> {
        self.descend(Segment::Field(name), f)
    }

    fn mismatch(&self, msg: impl Into<String>) -> FlockError {
        FlockError::structure(self.path.to_string(), msg)
    }

    fn mismatch_at(&mut self, key: &impl fmt::Display, msg: &str) -> FlockError {
        self.path.0.push(Segment::Key(key.to_string()));
        let err = self.mismatch(msg);
        self.path.0.pop();
        err
    }

    /// Blend the spline field `name` with `strategy`.
    fn spline(
        &mut self,
        name: &'static str,
        a: &Spline,
        b: &Spline,
        strategy: Strategy,
    ) -> FlockResult<Spline> {
        self.field(name, |cx| cx.leaf(a, b, strategy))
    }

    fn leaf(&mut self, a: &Spline, b: &Spline, strategy: Strategy) -> FlockResult<Spline> {
        let mode = match strategy {
            Strategy::Linear => AngleMode::Plain,
            Strategy::AngleClockwise => AngleMode::Clockwise,
            Strategy::AngleLoops => self.loop_mode(a, b),
        };
        blend_knots(a, b, self.scale, mode, self.stagger.as_mut()).map_err(|e| match e {
            FlockError::Spline(msg) => FlockError::spline(format!("{}: {msg}", self.path)),
            other => other,
        })
    }

    fn loop_mode(&self, a: &Spline, b: &Spline) -> AngleMode {
        let mode = match (approx_zero(a.deriv(1.0)), approx_zero(b.deriv(0.0))) {
            (true, true) => AngleMode::Clockwise,
            (true, false) | (false, true) => AngleMode::Loops(1),
            (false, false) => AngleMode::Loops(self.loops),
        };
        tracing::debug!(path = %self.path, ?mode, "angle blend");
        mode
    }

    /// Both present or both absent; anything else survived alignment by mistake.
    fn optional<T>(
        &mut self,
        name: &'static str,
        a: &Option<T>,
        b: &Option<T>,
        f: impl FnOnce(&mut Self, &T, &T) -> FlockResult<T>,
    ) -> FlockResult<Option<T>> {
        self.field(name, |cx| match (a, b) {
            (Some(a), Some(b)) => f(cx, a, b).map(Some),
            (None, None) => Ok(None),
            (Some(_), None) => Err(cx.mismatch("present on the left side only")),
            (None, Some(_)) => Err(cx.mismatch("present on the right side only")),
        })
    }

    /// Key-wise blend of two maps with identical key sets, visited in sorted key order.
    fn keys<K, V>(
        &mut self,
        a: &BTreeMap<K, V>,
        b: &BTreeMap<K, V>,
        mut f: impl FnMut(&mut Self, &K, &V, &V) -> FlockResult<V>,
    ) -> FlockResult<BTreeMap<K, V>>
    where
        K: Ord + Clone + fmt::Display,
    {
        if let Some(k) = a.keys().find(|k| !b.contains_key(*k)) {
            return Err(self.mismatch_at(k, "present on the left side only"));
        }
        if let Some(k) = b.keys().find(|k| !a.contains_key(*k)) {
            return Err(self.mismatch_at(k, "present on the right side only"));
        }
        let mut out = BTreeMap::new();
        for (k, va) in a {
            let vb = &b[k];
            let v = self.descend(Segment::Key(k.to_string()), |cx| f(cx, k, va, vb))?;
            out.insert(k.clone(), v);
        }
        Ok(out)
    }
}

/// A genome section whose fields all blend with a fixed per-field strategy.
pub(crate) trait Blend: Sized {
    fn blend(a: &Self, b: &Self, cx: &mut BlendCx) -> FlockResult<Self>;
}

impl Blend for Point2 {
    fn blend(a: &Self, b: &Self, cx: &mut BlendCx) -> FlockResult<Self> {
        Ok(Self {
            x: cx.spline("x", &a.x, &b.x, Strategy::Linear)?,
            y: cx.spline("y", &a.y, &b.y, Strategy::Linear)?,
        })
    }
}

impl Blend for RgbSpline {
    fn blend(a: &Self, b: &Self, cx: &mut BlendCx) -> FlockResult<Self> {
        Ok(Self {
            r: cx.spline("r", &a.r, &b.r, Strategy::Linear)?,
            g: cx.spline("g", &a.g, &b.g, Strategy::Linear)?,
            b: cx.spline("b", &a.b, &b.b, Strategy::Linear)?,
        })
    }
}

impl Blend for Camera {
    fn blend(a: &Self, b: &Self, cx: &mut BlendCx) -> FlockResult<Self> {
        Ok(Self {
            center: cx.field("center", |cx| Point2::blend(&a.center, &b.center, cx))?,
            density: cx.spline("density", &a.density, &b.density, Strategy::Linear)?,
            dither_width: cx.spline(
                "dither_width",
                &a.dither_width,
                &b.dither_width,
                Strategy::Linear,
            )?,
            rotation: cx.spline("rotation", &a.rotation, &b.rotation, Strategy::AngleClockwise)?,
            scale: cx.spline("scale", &a.scale, &b.scale, Strategy::Linear)?,
        })
    }
}

impl Blend for ColorParams {
    fn blend(a: &Self, b: &Self, cx: &mut BlendCx) -> FlockResult<Self> {
        Ok(Self {
            background: cx.field("background", |cx| {
                RgbSpline::blend(&a.background, &b.background, cx)
            })?,
            brightness: cx.spline("brightness", &a.brightness, &b.brightness, Strategy::Linear)?,
            gamma: cx.spline("gamma", &a.gamma, &b.gamma, Strategy::Linear)?,
            gamma_threshold: cx.spline(
                "gamma_threshold",
                &a.gamma_threshold,
                &b.gamma_threshold,
                Strategy::Linear,
            )?,
            highlight_power: cx.spline(
                "highlight_power",
                &a.highlight_power,
                &b.highlight_power,
                Strategy::Linear,
            )?,
            // Actual boundary palettes are chosen separately; the output always runs 0 -> 1.
            palette_times: PaletteTimes::endpoints(),
            vibrance: cx.spline("vibrance", &a.vibrance, &b.vibrance, Strategy::Linear)?,
        })
    }
}

impl Blend for DensityEstimation {
    fn blend(a: &Self, b: &Self, cx: &mut BlendCx) -> FlockResult<Self> {
        Ok(Self {
            curve: cx.spline("curve", &a.curve, &b.curve, Strategy::Linear)?,
            minimum: cx.spline("minimum", &a.minimum, &b.minimum, Strategy::Linear)?,
            radius: cx.spline("radius", &a.radius, &b.radius, Strategy::Linear)?,
        })
    }
}

impl Blend for Variation {
    fn blend(a: &Self, b: &Self, cx: &mut BlendCx) -> FlockResult<Self> {
        // Parameters sit next to `weight` in the encoded form, so they add no path segment.
        let params = cx.keys(&a.params, &b.params, |cx, _, pa, pb| {
            cx.leaf(pa, pb, Strategy::Linear)
        })?;
        Ok(Self {
            params,
            weight: cx.spline("weight", &a.weight, &b.weight, Strategy::Linear)?,
        })
    }
}

fn blend_affine(a: &Affine, b: &Affine, slot: AffineSlot, cx: &mut BlendCx) -> FlockResult<Affine> {
    Ok(Affine {
        angle: cx.spline("angle", &a.angle, &b.angle, slot.angle_strategy())?,
        magnitude: cx.field("magnitude", |cx| Point2::blend(&a.magnitude, &b.magnitude, cx))?,
        offset: cx.field("offset", |cx| Point2::blend(&a.offset, &b.offset, cx))?,
        spread: cx.spline("spread", &a.spread, &b.spread, Strategy::Linear)?,
    })
}

fn blend_xform(a: &Xform, b: &Xform, is_final: bool, cx: &mut BlendCx) -> FlockResult<Xform> {
    let affine = cx.field("affine", |cx| {
        blend_affine(&a.affine, &b.affine, AffineSlot::Pre { is_final }, cx)
    })?;
    let color = cx.spline("color", &a.color, &b.color, Strategy::Linear)?;
    let color_speed = cx.spline("color_speed", &a.color_speed, &b.color_speed, Strategy::Linear)?;
    let density = cx.optional("density", &a.density, &b.density, |cx, da, db| {
        cx.leaf(da, db, Strategy::Linear)
    })?;
    let opacity = cx.spline("opacity", &a.opacity, &b.opacity, Strategy::Linear)?;
    let post = cx.optional("post", &a.post, &b.post, |cx, pa, pb| {
        blend_affine(pa, pb, AffineSlot::Post, cx)
    })?;
    let variations = cx.field("variations", |cx| {
        cx.keys(&a.variations, &b.variations, |cx, _, va, vb| {
            Variation::blend(va, vb, cx)
        })
    })?;
    Ok(Xform {
        color,
        color_speed,
        opacity,
        density,
        affine,
        post,
        variations,
    })
}

fn blend_xforms(a: &XformMap, b: &XformMap, cx: &mut BlendCx) -> FlockResult<XformMap> {
    cx.field("xforms", |cx| {
        cx.keys(a, b, |cx, key, xa, xb| {
            blend_xform(xa, xb, *key == XformKey::Final, cx)
        })
    })
}

/// Combined duration of a blend that spends `loops` half-lengths of each side.
pub(crate) fn blended_duration(a: Duration, b: Duration, loops: u32) -> FlockResult<Duration> {
    let mix = |x: f64, y: f64| (x + y) * f64::from(loops) / 2.0;
    match (a, b) {
        (Duration::Absolute(x), Duration::Absolute(y)) => Ok(Duration::Absolute(mix(x, y))),
        (Duration::Relative(x), Duration::Relative(y)) => Ok(Duration::Relative(mix(x, y))),
        _ => Err(FlockError::validation(
            "cannot blend a relative duration with an absolute one",
        )),
    }
}

/// `left=right` name and the union of both author lists, marked as a blend.
pub(crate) fn blend_info(a: &Info, b: &Info) -> Info {
    let mut authors: Vec<String> = Vec::with_capacity(a.authors.len() + b.authors.len() + 1);
    for author in a.authors.iter().chain(&b.authors) {
        if !authors.contains(author) {
            authors.push(author.clone());
        }
    }
    if !authors.iter().any(|x| x == BLEND_AUTHOR) {
        authors.push(BLEND_AUTHOR.to_owned());
    }
    Info {
        name: format!("{}={}", a.name, b.name),
        authors,
    }
}

/// Merge two structurally aligned genomes into the transition from `left`'s end to `right`'s start.
///
/// Every spline of the result starts with `left`'s value and slope at `t = 1` and ends with
/// `right`'s at `t = 0`; slopes are rescaled from each side's duration to the blended one.
#[tracing::instrument(skip_all, fields(left = %left.info.name, right = %right.info.name))]
pub(crate) fn blend_fields(left: &Genome, right: &Genome, opts: &BlendOpts) -> FlockResult<Genome> {
    let duration = blended_duration(left.time.duration, right.time.duration, opts.loops)?;
    let scale = SlopeScale {
        left: duration.value() / left.time.duration.value(),
        right: duration.value() / right.time.duration.value(),
    };
    let stagger = opts.stagger.then(|| {
        Rng64::new(
            opts.seed
                .unwrap_or_else(|| seed_from_names(&left.info.name, &right.info.name)),
        )
    });
    let mut cx = BlendCx::new(scale, opts.loops, stagger);

    let camera = cx.field("camera", |cx| Camera::blend(&left.camera, &right.camera, cx))?;
    let color = cx.field("color", |cx| ColorParams::blend(&left.color, &right.color, cx))?;
    let de = cx.field("de", |cx| DensityEstimation::blend(&left.de, &right.de, cx))?;
    let frame_width = cx.field("time", |cx| {
        cx.spline(
            "frame_width",
            &left.time.frame_width,
            &right.time.frame_width,
            Strategy::Linear,
        )
    })?;
    let xforms = blend_xforms(&left.xforms, &right.xforms, &mut cx)?;

    if left.link != right.link {
        tracing::debug!("genome links differ; keeping the left one");
    }
    Ok(Genome {
        info: blend_info(&left.info, &right.info),
        time: Time {
            duration,
            frame_width,
        },
        camera,
        color,
        de,
        palettes: boundary_palettes(left, right)?,
        xforms,
        link: left.link.clone(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/blend/fields.rs"]
mod tests;
