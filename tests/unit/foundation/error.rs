use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        FlockError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(FlockError::spline("x").to_string().contains("spline error:"));
    assert!(
        FlockError::alignment("x")
            .to_string()
            .contains("alignment error:")
    );
}

#[test]
fn structure_error_names_the_path() {
    let err = FlockError::structure("$.xforms.0.variations.julia", "missing on right");
    assert_eq!(
        err.to_string(),
        "structure mismatch at $.xforms.0.variations.julia: missing on right"
    );
}

