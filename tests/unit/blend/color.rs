use super::*;
use crate::test_support::gradient;

fn assert_close(a: f64, b: f64, eps: f64) {
    assert!((a - b).abs() <= eps, "{a} != {b} (eps {eps})");
}

#[test]
fn polar_round_trip_reproduces_palette() {
    let mut entries = gradient(32).entries().to_vec();
    entries.extend([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.5, 0.5, 0.5], [0.0, 0.0, 0.0]]);
    let palette = Palette::new(entries).unwrap();

    let back = PolarPalette::from_palette(&palette).to_palette().unwrap();
    assert_eq!(back.len(), palette.len());
    for (a, b) in palette.entries().iter().zip(back.entries()) {
        for c in 0..3 {
            assert_close(a[c], b[c], 1e-9);
        }
    }
}

#[test]
fn unwrapped_hue_has_no_half_turn_jumps() {
    // Walks around the hue circle twice.
    let entries = (0..64)
        .map(|i| {
            let h = i as f64 / 32.0 * TAU;
            [0.5 + 0.4 * h.cos(), 0.5, 0.5 + 0.4 * h.sin()]
        })
        .collect();
    let polar = PolarPalette::from_palette(&Palette::new(entries).unwrap());
    for w in polar.hue.windows(2) {
        assert!((w[1] - w[0]).abs() <= PI, "{} -> {}", w[0], w[1]);
    }
    let total = polar.hue[63] - polar.hue[0];
    assert!(total.abs() > 1.5 * TAU, "total travel {total}");
}

#[test]
fn unwrap_phase_shifts_by_whole_turns() {
    let mut a = vec![3.0, -3.0, 3.0, -3.1];
    unwrap_phase(&mut a);
    assert_eq!(a[0], 3.0);
    assert_close(a[1], -3.0 + TAU, 1e-12);
    assert_close(a[2], 3.0, 1e-12);
    assert_close(a[3], -3.1 + TAU, 1e-12);
}

#[test]
fn filter_preserves_constants_and_mass() {
    let flat = vec![0.25; 10];
    for v in gaussian_filter1d(&flat, 3.0).unwrap() {
        assert_close(v, 0.25, 1e-12);
    }

    let mut spike = vec![0.0; 41];
    spike[20] = 1.0;
    let out = gaussian_filter1d(&spike, 2.0).unwrap();
    assert_close(out.iter().sum(), 1.0, 1e-12);
    assert!(out[20] < 1.0 && out[20] > out[19]);
    assert_close(out[19], out[21], 1e-15);
}

#[test]
fn filter_reflects_at_the_edges() {
    // With reflect mode a ramp's first sample only sees values at or above itself.
    let ramp: Vec<f64> = (0..8).map(f64::from).collect();
    let out = gaussian_filter1d(&ramp, 1.0).unwrap();
    assert!(out[0] > 0.0);
    assert!(out[7] < 7.0);
    assert_close(out[0] + out[7], 7.0, 1e-12);

    // Kernel wider than the data still folds back inside.
    let short = gaussian_filter1d(&[1.0, 2.0], 5.0).unwrap();
    assert_close(short[0] + short[1], 3.0, 1e-12);
}

#[test]
fn filter_rejects_bad_sigma() {
    assert!(gaussian_filter1d(&[1.0], 0.0).is_err());
    assert!(gaussian_filter1d(&[1.0], f64::NAN).is_err());
}

#[test]
fn smoothing_keeps_length() {
    let polar = PolarPalette::from_palette(&gradient(20));
    let smooth = polar.smoothed(4.0).unwrap();
    assert_eq!(smooth.luma.len(), 20);
    assert_eq!(smooth.to_palette().unwrap().len(), 20);
}

#[test]
fn huge_sigma_flattens_to_the_mean() {
    let data = [0.1, 0.2, 0.3];
    let out = gaussian_filter1d(&data, 1e18).unwrap();
    assert_eq!(out.len(), 3);
    for v in out {
        assert_close(v, 0.2, 1e-12);
    }

    // Wider than the fold limit: still mirror-symmetric and close to the mean.
    let ramp: Vec<f64> = (0..5).map(f64::from).collect();
    let out = gaussian_filter1d(&ramp, 1e3).unwrap();
    assert_close(out[0] + out[4], 4.0, 1e-9);
    for v in out {
        assert_close(v, 2.0, 0.1);
    }
}

#[test]
fn tiny_sigma_leaves_data_unchanged() {
    let data = [0.1, 0.2, 0.3];
    assert_eq!(gaussian_filter1d(&data, 1e-300).unwrap(), data.to_vec());
    assert_eq!(gaussian_filter1d(&data, f64::MIN_POSITIVE).unwrap(), data.to_vec());
}
