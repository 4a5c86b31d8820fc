use super::*;
use crate::test_support::{final_xform, variations, with_post, xform};

#[test]
fn keeps_colour_fields_and_zeroes_density() {
    let src = xform(3.0, 0.7, &["sinusoidal"]);
    let pad = pad_xform(&src, Orientation::Normal, Orientation::Normal, false);
    assert_eq!(pad.color, src.color);
    assert_eq!(pad.color_speed, src.color_speed);
    assert_eq!(pad.opacity, src.opacity);
    assert_eq!(pad.density, Some(Spline::constant(0.0)));
    assert!(pad.post.is_none());
    assert_eq!(pad.affine, Affine::normal());
    assert_eq!(pad.variations.keys().collect::<Vec<_>>(), vec!["linear"]);
    assert_eq!(pad.variations["linear"].weight.eval(0.0), 1.0);
}

#[test]
fn final_pad_has_no_density() {
    let src = final_xform(0.2, 0.0, &["linear"]);
    let pad = pad_xform(&src, Orientation::Normal, Orientation::Normal, true);
    assert!(pad.density.is_none());
}

#[test]
fn orientation_selects_canonical_affines() {
    let src = with_post(xform(1.0, 0.0, &["linear"]), Affine::normal());
    let pad = pad_xform(&src, Orientation::Flipped, Orientation::Flipped, false);
    assert!(pad.affine.is_flipped());
    assert!(pad.post.as_ref().is_some_and(Affine::is_flipped));
    assert_eq!(pad.affine.angle.eval(0.0), 135.0);
}

#[test]
fn hole_variation_forces_negated_linear_and_rotates() {
    let src = xform(1.0, 0.0, &["julian", "rectangles"]);
    let pad = pad_xform(&src, Orientation::Normal, Orientation::Normal, false);
    assert_eq!(pad.variations.len(), 1);
    assert_eq!(pad.variations["linear"].weight.eval(0.5), -1.0);
    assert_eq!(pad.affine.angle.eval(0.0), 225.0);
}

#[test]
fn identity_variations_share_unit_weight() {
    let mut src = xform(1.0, 0.0, &["curl", "blob", "sinusoidal"]);
    src.variations.extend(variations(&["perspective"]));
    src.variations
        .get_mut("perspective")
        .unwrap()
        .params
        .insert("dist".to_owned(), Spline::constant(2.5));

    let pad = pad_xform(&src, Orientation::Normal, Orientation::Normal, false);
    assert_eq!(
        pad.variations.keys().collect::<Vec<_>>(),
        vec!["blob", "curl", "perspective"]
    );
    let total: f64 = pad.variations.values().map(|v| v.weight.eval(0.0)).sum();
    assert!((total - 1.0).abs() < 1e-12);
    let persp = &pad.variations["perspective"];
    assert_eq!(persp.params["dist"], Spline::constant(2.5));
    assert_eq!(persp.params["angle"], Spline::constant(0.0));
    assert_eq!(pad.variations["blob"].params["waves"], Spline::constant(1.0));
}

#[test]
fn missing_source_parameter_uses_table_default() {
    let src = xform(1.0, 0.0, &["super_shape"]);
    let pad = pad_xform(&src, Orientation::Normal, Orientation::Normal, false);
    let ss = &pad.variations["super_shape"];
    assert_eq!(ss.weight.eval(0.0), 1.0);
    assert_eq!(ss.params["m"], Spline::constant(0.0));
    assert_eq!(ss.params["n1"], Spline::constant(2.0));
}
