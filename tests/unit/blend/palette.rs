use super::*;
use crate::genome::model::{Duration, XformKey};
use crate::test_support::{final_xform, genome, gradient, regular, xform};

fn solid(rgb: [f64; 3]) -> Palette {
    Palette::new(vec![rgb; 4]).unwrap()
}

/// A genome shaped like a blend result: one xform whose colour runs `from -> to`.
fn blended(from: f64, to: f64) -> Genome {
    let mut x = xform(1.0, 0.0, &["linear"]);
    x.color = Spline::hermite(from, 0.0, to, 0.0);
    let mut g = genome("ab", Duration::Absolute(1.0), regular(vec![x]));
    g.palettes = vec![gradient(8), gradient(8)];
    g.color.palette_times = PaletteTimes::endpoints();
    g
}

#[test]
fn boundary_palettes_follow_each_side_schedule() {
    let mut left = genome("a", Duration::Absolute(1.0), vec![]);
    left.palettes = vec![solid([1.0, 0.0, 0.0]), solid([0.0, 1.0, 0.0])];
    left.color.palette_times = PaletteTimes::Knots(vec![(0.0, 0), (1.0, 1)]);
    let mut right = genome("b", Duration::Absolute(1.0), vec![]);
    right.palettes = vec![solid([0.0, 0.0, 1.0]), solid([1.0, 1.0, 1.0])];
    right.color.palette_times = PaletteTimes::Knots(vec![(0.0, 1), (1.0, 0)]);

    let out = boundary_palettes(&left, &right).unwrap();
    assert_eq!(out, vec![solid([0.0, 1.0, 0.0]), solid([1.0, 1.0, 1.0])]);

    right.color.palette_times = PaletteTimes::Single(5);
    let err = boundary_palettes(&left, &right).unwrap_err();
    assert!(matches!(err, FlockError::Validation(_)));
}

#[test]
fn discrepancy_weighs_by_density_magnitude() {
    let d = flip_discrepancy(&blended(0.1, 0.9));
    assert!((d.plain - 2f64.sqrt() * 0.8).abs() < 1e-12);
    assert!(d.inverted.abs() < 1e-12);
    assert!(d.prefers_flip());

    let d = flip_discrepancy(&blended(0.2, 0.3));
    assert!(!d.prefers_flip());
}

#[test]
fn final_colour_speed_mixes_into_effective_colour() {
    let mut g = blended(0.1, 0.9);
    g.xforms
        .insert(XformKey::Final, final_xform(0.5, 1.0, &["linear"]));
    let d = flip_discrepancy(&g);
    assert!(d.plain.abs() < 1e-12);
    assert!(d.inverted.abs() < 1e-12);
    assert!(!d.prefers_flip());
}

#[test]
fn flip_inverts_the_end_and_reverses_the_right_palette() {
    let mut g = blended(0.1, 0.9);
    let right = g.palettes[1].clone();
    assert!(check_pal_flip(&mut g).unwrap());

    let c = &g.xforms[&XformKey::Index(0)].color;
    assert_eq!(c.eval(0.0), 0.1);
    assert!((c.eval(1.0) - 0.1).abs() < 1e-12);
    assert_eq!(g.palettes[1], right.reversed());
    assert_eq!(g.palettes[0], gradient(8));

    // A second check finds nothing to gain.
    assert!(!check_pal_flip(&mut g).unwrap());
}

#[test]
fn flipping_twice_restores_the_discrepancy_ordering() {
    let mut g = blended(0.3, 0.8);
    let before = flip_discrepancy(&g);
    flip_right_palette(&mut g).unwrap();
    let once = flip_discrepancy(&g);
    assert!((once.plain - before.inverted).abs() < 1e-12);
    assert!((once.inverted - before.plain).abs() < 1e-12);
    flip_right_palette(&mut g).unwrap();
    let twice = flip_discrepancy(&g);
    assert!((twice.plain - before.plain).abs() < 1e-12);
    assert!((twice.inverted - before.inverted).abs() < 1e-12);
    assert_eq!(g.palettes[1], gradient(8));
}

#[test]
fn blur_appends_smoothed_palettes_near_the_ends() {
    let mut g = blended(0.0, 1.0);
    blur_palettes(&mut g, 3.0).unwrap();
    assert_eq!(g.palettes.len(), 4);
    assert_eq!(g.color.palette_times, PaletteTimes::smoothed_endpoints());
    assert_eq!(g.palettes[2].len(), 8);
    g.validate().unwrap();

    // A flat palette survives smoothing unchanged.
    let mut flat = blended(0.0, 1.0);
    flat.palettes = vec![solid([0.2, 0.4, 0.6]), solid([0.2, 0.4, 0.6])];
    blur_palettes(&mut flat, 2.0).unwrap();
    for e in flat.palettes[3].entries() {
        assert!((e[0] - 0.2).abs() < 1e-9 && (e[2] - 0.6).abs() < 1e-9);
    }
}

#[test]
fn blur_requires_exactly_the_boundary_pair() {
    let mut g = blended(0.0, 1.0);
    g.palettes.push(gradient(8));
    assert!(blur_palettes(&mut g, 1.0).is_err());
}
