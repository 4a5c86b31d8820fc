use std::collections::BTreeMap;

use crate::{
    animation::spline::Spline,
    genome::model::{Affine, Variation, Xform},
};

/// Variations that open a visible hole when faded out; a pad next to one of these cancels the
/// aperture with a negated, rotated `linear` instead.
pub(crate) const HOLE_VARIATIONS: &[&str] = &[
    "spherical",
    "ngon",
    "julian",
    "juliascope",
    "polar",
    "wedge_sph",
    "wedge_julia",
    "bipolar",
];

#[derive(Clone, Copy, Debug)]
pub(crate) enum IdentityParam {
    Fixed(f64),
    /// Copied from the source variation; `default` when the source lacks it.
    FromSource { default: f64 },
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct IdentityVariation {
    pub(crate) name: &'static str,
    pub(crate) params: &'static [(&'static str, IdentityParam)],
}

/// Variations with a parameterization that reduces them to the identity.
pub(crate) const IDENTITY_VARIATIONS: &[IdentityVariation] = &[
    IdentityVariation {
        name: "rectangles",
        params: &[("x", IdentityParam::Fixed(0.0)), ("y", IdentityParam::Fixed(0.0))],
    },
    IdentityVariation {
        name: "rings2",
        params: &[("val", IdentityParam::Fixed(0.0))],
    },
    IdentityVariation {
        name: "fan2",
        params: &[("x", IdentityParam::Fixed(0.0)), ("y", IdentityParam::Fixed(0.0))],
    },
    IdentityVariation {
        name: "blob",
        params: &[
            ("low", IdentityParam::Fixed(1.0)),
            ("high", IdentityParam::Fixed(1.0)),
            ("waves", IdentityParam::Fixed(1.0)),
        ],
    },
    IdentityVariation {
        name: "perspective",
        params: &[
            ("angle", IdentityParam::Fixed(0.0)),
            ("dist", IdentityParam::FromSource { default: 0.0 }),
        ],
    },
    IdentityVariation {
        name: "curl",
        params: &[("c1", IdentityParam::Fixed(0.0)), ("c2", IdentityParam::Fixed(0.0))],
    },
    IdentityVariation {
        name: "super_shape",
        params: &[
            ("n1", IdentityParam::Fixed(2.0)),
            ("n2", IdentityParam::Fixed(2.0)),
            ("n3", IdentityParam::Fixed(2.0)),
            ("rnd", IdentityParam::Fixed(0.0)),
            ("holes", IdentityParam::Fixed(0.0)),
            ("m", IdentityParam::FromSource { default: 0.0 }),
        ],
    },
];

/// Orientation class of a canonical pad affine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Orientation {
    Normal,
    Flipped,
}

impl Orientation {
    pub(crate) fn from_flipped(flipped: bool) -> Self {
        if flipped { Self::Flipped } else { Self::Normal }
    }

    pub(crate) fn affine(self) -> Affine {
        match self {
            Self::Normal => Affine::normal(),
            Self::Flipped => Affine::flipped(),
        }
    }
}

/// Synthesize a near-identity xform standing in for `src` on the other side of a blend.
///
/// Colour fields are kept so the pad does not disturb colouring while it fades; the density is
/// zero (final pads carry none). A post affine is added only when `src` has one.
pub(crate) fn pad_xform(src: &Xform, affine: Orientation, post: Orientation, is_final: bool) -> Xform {
    let mut out = Xform {
        color: src.color.clone(),
        color_speed: src.color_speed.clone(),
        opacity: src.opacity.clone(),
        density: (!is_final).then(|| Spline::constant(0.0)),
        affine: affine.affine(),
        post: src.post.as_ref().map(|_| post.affine()),
        variations: BTreeMap::new(),
    };

    if HOLE_VARIATIONS.iter().any(|v| src.variations.contains_key(*v)) {
        let angle = out.affine.angle.eval(0.0) + 180.0;
        out.affine.angle = Spline::constant(angle);
        out.variations
            .insert("linear".to_owned(), Variation::with_weight(-1.0));
        return out;
    }

    let matched: Vec<_> = IDENTITY_VARIATIONS
        .iter()
        .filter_map(|iv| src.variations.get(iv.name).map(|v| (iv, v)))
        .collect();
    if matched.is_empty() {
        out.variations
            .insert("linear".to_owned(), Variation::with_weight(1.0));
        return out;
    }

    let weight = 1.0 / matched.len() as f64;
    for (iv, source) in matched {
        let params = iv
            .params
            .iter()
            .map(|&(name, p)| {
                let value = match p {
                    IdentityParam::Fixed(v) => Spline::constant(v),
                    IdentityParam::FromSource { default } => source
                        .params
                        .get(name)
                        .cloned()
                        .unwrap_or_else(|| Spline::constant(default)),
                };
                (name.to_owned(), value)
            })
            .collect();
        out.variations.insert(
            iv.name.to_owned(),
            Variation {
                weight: Spline::constant(weight),
                params,
            },
        );
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/blend/pad.rs"]
mod tests;
