use crate::{
    animation::spline::Spline,
    blend::opts::AlignSort,
    blend::pad::{Orientation, pad_xform},
    foundation::error::{FlockError, FlockResult},
    genome::model::{Affine, Variation, Xform, XformKey, XformMap},
};

/// Orientation buckets: bit 0 is a flipped affine, bit 1 a flipped post.
const CATEGORIES: usize = 4;

/// Make two xform collections positionally correspondent.
///
/// Returns fresh maps with identical key sets, identical `post` presence per key, and identical
/// variation names per key. The inputs are never modified; every output xform is an owned copy.
/// `left` is sorted at its end (`t = 1`) and `right` at its start (`t = 0`).
#[tracing::instrument(skip(left, right))]
pub fn align_xforms(
    left: &XformMap,
    right: &XformMap,
    sort: AlignSort,
) -> FlockResult<(XformMap, XformMap)> {
    let left_final = left.get(&XformKey::Final).cloned();
    let right_final = right.get(&XformKey::Final).cloned();
    for (side, fin) in [("left", &left_final), ("right", &right_final)] {
        if let Some(fin) = fin {
            check_final(side, fin)?;
        }
    }

    let mut left_cats = categorize(sort_xforms(left, sort, 1.0));
    let mut right_cats = categorize(sort_xforms(right, sort, 0.0));

    for cat in 0..CATEGORIES {
        let (l, r) = (&mut left_cats[cat], &mut right_cats[cat]);

        // An unflipped post may be omitted on either side; give both a post before pairing.
        if cat < 2 {
            for (a, b) in l.iter_mut().zip(r.iter_mut()) {
                match (&a.post, &b.post) {
                    (Some(_), None) => b.post = Some(Affine::normal()),
                    (None, Some(_)) => a.post = Some(Affine::normal()),
                    _ => {}
                }
            }
        }

        let (padme, useme, side) = if l.len() < r.len() {
            (l, &*r, "left")
        } else {
            (r, &*l, "right")
        };
        let have = padme.len();
        if have == useme.len() {
            continue;
        }
        tracing::debug!(
            category = cat,
            side,
            count = useme.len() - have,
            "padding xforms"
        );
        let affine = Orientation::from_flipped(cat & 1 != 0);
        let post = Orientation::from_flipped(cat & 2 != 0);
        padme.extend(
            useme[have..]
                .iter()
                .map(|src| pad_xform(src, affine, post, false)),
        );
    }

    let mut left_out = rekey(left_cats);
    let mut right_out = rekey(right_cats);

    match (left_final, right_final) {
        (Some(l), Some(r)) => {
            left_out.insert(XformKey::Final, l);
            right_out.insert(XformKey::Final, r);
        }
        (Some(l), None) => {
            right_out.insert(XformKey::Final, final_pad(&l));
            left_out.insert(XformKey::Final, l);
        }
        (None, Some(r)) => {
            left_out.insert(XformKey::Final, final_pad(&r));
            right_out.insert(XformKey::Final, r);
        }
        (None, None) => {}
    }

    for (a, b) in left_out.values_mut().zip(right_out.values_mut()) {
        share_variations(a, b);
    }
    Ok((left_out, right_out))
}

fn check_final(side: &str, fin: &Xform) -> FlockResult<()> {
    if fin.affine.is_flipped() {
        return Err(FlockError::alignment(format!(
            "{side} final xform has a flipped affine"
        )));
    }
    if fin.post.as_ref().is_some_and(Affine::is_flipped) {
        return Err(FlockError::alignment(format!(
            "{side} final xform has a flipped post"
        )));
    }
    Ok(())
}

/// Regular xforms of `xforms` in the order `method` dictates when evaluated at `t`.
pub(crate) fn sort_xforms(xforms: &XformMap, method: AlignSort, t: f64) -> Vec<Xform> {
    // Map iteration is in natural key order, which is also the tie-break order below.
    let mut out: Vec<Xform> = xforms
        .iter()
        .filter(|(k, _)| **k != XformKey::Final)
        .map(|(_, x)| x.clone())
        .collect();

    let density = |x: &Xform| x.density.as_ref().map_or(0.0, |d| d.eval(t));
    match method {
        AlignSort::Natural => {}
        AlignSort::Weight | AlignSort::WeightFlip => {
            out.sort_by(|a, b| density(a).total_cmp(&density(b)));
            if !(method == AlignSort::WeightFlip && t == 0.0) {
                out.reverse();
            }
        }
        AlignSort::Color => {
            out.sort_by(|a, b| a.color.eval(t).total_cmp(&b.color.eval(t)));
        }
    }
    out
}

fn category(x: &Xform) -> usize {
    let post = x.post.as_ref().is_some_and(Affine::is_flipped);
    usize::from(x.affine.is_flipped()) | (usize::from(post) << 1)
}

fn categorize(sorted: Vec<Xform>) -> [Vec<Xform>; CATEGORIES] {
    let mut out: [Vec<Xform>; CATEGORIES] = Default::default();
    for x in sorted {
        out[category(&x)].push(x);
    }
    out
}

fn rekey(cats: [Vec<Xform>; CATEGORIES]) -> XformMap {
    cats.into_iter()
        .flatten()
        .enumerate()
        .map(|(i, x)| (XformKey::Index(i as u32), x))
        .collect()
}

fn final_pad(src: &Xform) -> Xform {
    let mut pad = pad_xform(src, Orientation::Normal, Orientation::Normal, true);
    pad.color_speed = Spline::constant(0.0);
    pad
}

fn share_variations(a: &mut Xform, b: &mut Xform) {
    fn muted(v: &Variation) -> Variation {
        Variation {
            weight: Spline::constant(0.0),
            params: v.params.clone(),
        }
    }

    for (name, v) in &b.variations {
        if !a.variations.contains_key(name) {
            a.variations.insert(name.clone(), muted(v));
        }
    }
    for (name, v) in &a.variations {
        if !b.variations.contains_key(name) {
            b.variations.insert(name.clone(), muted(v));
        }
    }

    // A parameter left implicit on one side takes the other side's value.
    for (name, va) in &mut a.variations {
        let Some(vb) = b.variations.get_mut(name) else {
            continue;
        };
        for (k, p) in &vb.params {
            va.params.entry(k.clone()).or_insert_with(|| p.clone());
        }
        for (k, p) in &va.params {
            vb.params.entry(k.clone()).or_insert_with(|| p.clone());
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/blend/align.rs"]
mod tests;
