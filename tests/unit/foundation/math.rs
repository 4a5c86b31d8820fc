use super::*;

#[test]
fn fnv_matches_reference_vectors() {
    assert_eq!(Fnv1a64::new_default().finish(), Fnv1a64::OFFSET_BASIS);

    let mut h = Fnv1a64::new_default();
    h.write_bytes(b"a");
    assert_eq!(h.finish(), 0xaf63_dc4c_8601_ec8c);
}

#[test]
fn name_seed_is_order_sensitive() {
    assert_eq!(seed_from_names("a", "b"), seed_from_names("a", "b"));
    assert_ne!(seed_from_names("a", "b"), seed_from_names("b", "a"));
    assert_ne!(seed_from_names("ab", "c"), seed_from_names("a", "bc"));
}

#[test]
fn rng_is_deterministic_and_unit_bounded() {
    let mut a = Rng64::new(42);
    let mut b = Rng64::new(42);
    for _ in 0..32 {
        let x = a.next_f64_01();
        assert_eq!(x, b.next_f64_01());
        assert!((0.0..1.0).contains(&x));
    }
}

#[test]
fn approx_zero_threshold() {
    assert!(approx_zero(0.0));
    assert!(approx_zero(-5e-7));
    assert!(!approx_zero(1e-3));
}
