/// Convenience result type used across the blend engine.
pub type FlockResult<T> = Result<T, FlockError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Every variant is a caller-side problem: the engine is a pure function, so the same inputs
/// fail the same way on every attempt.
#[derive(thiserror::Error, Debug)]
pub enum FlockError {
    /// Invalid genome content or blend options.
    #[error("validation error: {0}")]
    Validation(String),

    /// Malformed spline knots (empty or non-monotonic).
    #[error("spline error: {0}")]
    Spline(String),

    /// Xform collections that cannot be aligned (e.g. a flipped final xform).
    #[error("alignment error: {0}")]
    Alignment(String),

    /// Two genomes whose structure still differs when fields are merged.
    #[error("structure mismatch at {path}: {message}")]
    Structure {
        /// Dotted field path from the genome root, e.g. `$.xforms.2.post`.
        path: String,
        /// What differed at `path`.
        message: String,
    },
}

impl FlockError {
    /// Build a [`FlockError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FlockError::Spline`] value.
    pub fn spline(msg: impl Into<String>) -> Self {
        Self::Spline(msg.into())
    }

    /// Build a [`FlockError::Alignment`] value.
    pub fn alignment(msg: impl Into<String>) -> Self {
        Self::Alignment(msg.into())
    }

    /// Build a [`FlockError::Structure`] value.
    pub fn structure(path: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Structure {
            path: path.into(),
            message: msg.into(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
