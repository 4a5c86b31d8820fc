pub(crate) mod align;
pub(crate) mod color;
pub(crate) mod fields;
pub(crate) mod interp;
pub(crate) mod opts;
pub(crate) mod pad;
pub(crate) mod palette;

use crate::{
    foundation::error::FlockResult,
    genome::model::Genome,
};

use self::{align::align_xforms, fields::blend_fields, opts::BlendOpts};

/// Build the transition genome that carries `left`'s end state into `right`'s start state.
///
/// Neither input is modified. Both are validated, their xforms are aligned, every field is
/// blended, and the boundary palettes are optionally flipped and smoothed.
#[tracing::instrument(skip_all, fields(left = %left.info.name, right = %right.info.name))]
pub fn blend_genomes(left: &Genome, right: &Genome, opts: &BlendOpts) -> FlockResult<Genome> {
    opts.validate()?;
    left.validate()?;
    right.validate()?;

    let (left_xforms, right_xforms) = align_xforms(&left.xforms, &right.xforms, opts.align)?;
    let left = Genome {
        xforms: left_xforms,
        ..left.clone()
    };
    let right = Genome {
        xforms: right_xforms,
        ..right.clone()
    };

    let mut out = blend_fields(&left, &right, opts)?;
    if opts.pal_flip {
        palette::check_pal_flip(&mut out)?;
    }
    if let Some(stdev) = opts.blur_stdev {
        palette::blur_palettes(&mut out, stdev)?;
    }
    tracing::debug!(
        xforms = out.xforms.len(),
        palettes = out.palettes.len(),
        "blend complete"
    );
    Ok(out)
}
