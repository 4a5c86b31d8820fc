use super::*;

const GENOME: &str = r#"{
    "info": {"name": "spiral", "authors": ["a"]},
    "time": {"duration": "10s"},
    "color": {"palette_times": "0"},
    "palettes": ["rgb8:000000ffffff"],
    "xforms": {
        "0": {
            "color": 0.25,
            "density": 0.5,
            "affine": {
                "spread": 45, "angle": [0, 45, 1, -315],
                "magnitude": {"x": 1, "y": 1}, "offset": {"x": 0, "y": 0}
            },
            "variations": {"linear": {"weight": 1}}
        },
        "final": {
            "color_speed": 0,
            "affine": {
                "spread": 45, "angle": 45,
                "magnitude": {"x": 1, "y": 1}, "offset": {"x": 0, "y": 0}
            },
            "variations": {"julia": {"weight": 0.5, "power": 3}}
        }
    }
}"#;

#[test]
fn decodes_and_validates_fixture() {
    let g: Genome = serde_json::from_str(GENOME).unwrap();
    g.validate().unwrap();
    assert_eq!(g.time.duration, Duration::Relative(10.0));
    assert_eq!(g.regular_xforms().count(), 1);
    let fin = g.final_xform().unwrap();
    assert!(fin.density.is_none());
    assert_eq!(fin.variations["julia"].params["power"], Spline::constant(3.0));
    assert_eq!(fin.opacity, Spline::constant(1.0));
    assert_eq!(g.camera, Camera::default());
}

#[test]
fn reencoding_is_stable() {
    let g: Genome = serde_json::from_str(GENOME).unwrap();
    let json = serde_json::to_string(&g).unwrap();
    let back: Genome = serde_json::from_str(&json).unwrap();
    assert_eq!(serde_json::to_string(&back).unwrap(), json);
    assert!(json.contains(r#""duration":"10s""#));
}

#[test]
fn validate_rejects_density_on_final_and_missing_density() {
    let mut g: Genome = serde_json::from_str(GENOME).unwrap();
    g.xforms.get_mut(&XformKey::Final).unwrap().density = Some(Spline::constant(1.0));
    assert!(g.validate().is_err());

    let mut g: Genome = serde_json::from_str(GENOME).unwrap();
    g.xforms.get_mut(&XformKey::Index(0)).unwrap().density = None;
    assert!(g.validate().is_err());
}

#[test]
fn validate_rejects_bad_duration_and_palette_reference() {
    let mut g: Genome = serde_json::from_str(GENOME).unwrap();
    g.time.duration = Duration::Absolute(0.0);
    assert!(g.validate().is_err());

    let mut g: Genome = serde_json::from_str(GENOME).unwrap();
    g.color.palette_times = PaletteTimes::Single(1);
    assert!(g.validate().is_err());
}

#[test]
fn xform_keys_order_indices_before_final() {
    let mut keys = vec![XformKey::Final, XformKey::Index(10), XformKey::Index(2)];
    keys.sort();
    assert_eq!(
        keys,
        vec![XformKey::Index(2), XformKey::Index(10), XformKey::Final]
    );
    assert_eq!("final".parse::<XformKey>().unwrap(), XformKey::Final);
    assert!("-1".parse::<XformKey>().is_err());
}

#[test]
fn duration_accepts_numbers_and_relative_strings() {
    let d: Duration = serde_json::from_str("20").unwrap();
    assert_eq!(d, Duration::Absolute(20.0));
    let d: Duration = serde_json::from_str("\"2.5s\"").unwrap();
    assert_eq!(d, Duration::Relative(2.5));
    assert!(serde_json::from_str::<Duration>("\"2.5\"").is_err());
    assert_eq!(
        serde_json::to_string(&Duration::Relative(30.0)).unwrap(),
        "\"30s\""
    );
}

#[test]
fn canonical_affines_differ_only_in_orientation() {
    let (normal, flipped) = (Affine::normal(), Affine::flipped());
    assert!(!normal.is_flipped());
    assert!(flipped.is_flipped());
    assert_eq!(normal.magnitude, flipped.magnitude);
    assert_eq!(normal.offset, flipped.offset);
    assert_eq!(flipped.spread.eval(0.5), -45.0);
    assert_eq!(flipped.angle.eval(0.5), 135.0);

    // Orientation is read at t = 0 only.
    let mut late = Affine::normal();
    late.spread = Spline::hermite(45.0, 0.0, -45.0, 0.0);
    assert!(!late.is_flipped());
}
