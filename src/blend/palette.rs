use crate::{
    animation::spline::Spline,
    blend::color::PolarPalette,
    foundation::error::{FlockError, FlockResult},
    genome::model::Genome,
    genome::palette::{Palette, PaletteTimes},
};

/// Colour mismatch across the blend boundary, weighted by xform density.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct FlipDiscrepancy {
    /// With the right side's colours as they are.
    pub(crate) plain: f64,
    /// With the right side's colours inverted (`1 - c`).
    pub(crate) inverted: f64,
}

impl FlipDiscrepancy {
    pub(crate) fn prefers_flip(self) -> bool {
        self.plain > self.inverted
    }
}

fn palette_at(g: &Genome, index: usize, side: &str) -> FlockResult<Palette> {
    g.palettes.get(index).cloned().ok_or_else(|| {
        FlockError::validation(format!(
            "{side} genome selects palette {index} but has {}",
            g.palettes.len()
        ))
    })
}

/// `[left palette at its end, right palette at its start]`.
pub(crate) fn boundary_palettes(left: &Genome, right: &Genome) -> FlockResult<Vec<Palette>> {
    Ok(vec![
        palette_at(left, left.color.palette_times.end_index(), "left")?,
        palette_at(right, right.color.palette_times.start_index(), "right")?,
    ])
}

/// Compare effective colours of a blended genome at `t = 0` (left side) and `t = 1` (right side).
///
/// The effective colour of an xform mixes in the final xform's colour by its colour speed.
pub(crate) fn flip_discrepancy(g: &Genome) -> FlipDiscrepancy {
    let zero = Spline::constant(0.0);
    let (final_color, final_speed) = g
        .final_xform()
        .map_or((&zero, &zero), |f| (&f.color, &f.color_speed));
    let effective = |c: &Spline, t: f64| {
        let speed = final_speed.eval(t);
        c.eval(t) * (1.0 - speed) + final_color.eval(t) * speed
    };

    let mut out = FlipDiscrepancy {
        plain: 0.0,
        inverted: 0.0,
    };
    for (_, x) in g.regular_xforms() {
        let lc = effective(&x.color, 0.0);
        let rc = effective(&x.color, 1.0);
        let dens = x
            .density
            .as_ref()
            .map_or(0.0, |d| d.eval(0.0).hypot(d.eval(1.0)));
        out.plain += (dens * (rc - lc)).abs();
        out.inverted += (dens * ((1.0 - rc) - lc)).abs();
    }
    out
}

/// Invert the right half of a blend: every xform colour ends at `1 - c(1)` and the right
/// palette is reversed, which leaves the rendered colours at `t = 1` unchanged.
pub(crate) fn flip_right_palette(g: &mut Genome) -> FlockResult<()> {
    let Some(right) = g.palettes.get_mut(1) else {
        return Err(FlockError::validation(
            "palette flip needs a right boundary palette",
        ));
    };
    *right = right.reversed();
    for x in g.xforms.values_mut() {
        let c = &x.color;
        x.color = Spline::hermite(c.eval(0.0), c.deriv(0.0), 1.0 - c.eval(1.0), -c.deriv(1.0));
    }
    Ok(())
}

/// Flip the right palette when that lowers the colour jump at the boundary.
pub(crate) fn check_pal_flip(g: &mut Genome) -> FlockResult<bool> {
    let d = flip_discrepancy(g);
    if !d.prefers_flip() {
        return Ok(false);
    }
    tracing::debug!(plain = d.plain, inverted = d.inverted, "flipping right palette");
    flip_right_palette(g)?;
    Ok(true)
}

/// Append smoothed copies of both boundary palettes and fade through them near the ends.
pub(crate) fn blur_palettes(g: &mut Genome, stdev: f64) -> FlockResult<()> {
    if g.palettes.len() != 2 {
        return Err(FlockError::validation(format!(
            "palette blur expects two boundary palettes, found {}",
            g.palettes.len()
        )));
    }
    let blurred = g
        .palettes
        .iter()
        .map(|p| PolarPalette::from_palette(p).smoothed(stdev)?.to_palette())
        .collect::<FlockResult<Vec<_>>>()?;
    g.palettes.extend(blurred);
    g.color.palette_times = PaletteTimes::smoothed_endpoints();
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/blend/palette.rs"]
mod tests;
