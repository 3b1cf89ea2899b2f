//! Error types.
//!
//! Every error maps to a process exit code so the binary can stay a thin
//! wrapper (`main` just prints the message and exits with `exit_code()`).

use thiserror::Error;

use crate::domain::CurveKind;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Numeric failures raised by the least-squares solvers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    #[error("need at least {required} samples, got {found}")]
    InsufficientData { required: usize, found: usize },
    #[error("did not converge after {iterations} iterations")]
    NoConvergence { iterations: usize },
    #[error("non-finite values in model evaluation")]
    NonFinite,
    #[error("least squares system is too ill-conditioned to solve")]
    Singular,
}

#[derive(Debug, Error)]
pub enum Error {
    /// A run used for curve fitting was recorded without arguments.
    #[error("Arguments must have been logged to determine a best fit curve")]
    ArgumentsRequired,

    #[error("{name} is an invalid curve type. Must be in [{}]", .known.join(", "))]
    UnknownCurveType { name: String, known: Vec<String> },

    /// The family's `poll` rejected the projected samples.
    #[error("{curve} cannot be fit to these samples: poll rejected them (feature arity must be {})", arity_requirement(.curve))]
    UnsupportedCurve { curve: CurveKind },

    #[error("{curve} fit failed: {source}")]
    Fit {
        curve: CurveKind,
        #[source]
        source: SolverError,
    },

    #[error("argument {slot} is not numeric; add a transformer for it or exclude it")]
    NonNumericArgument { slot: String },

    #[error("argument name {name} is used by both a positional index and a keyword; exclude one of them")]
    AmbiguousArgument { name: String },

    #[error("{curve} parameters expect {expected} argument(s), got {found}")]
    ArityMismatch {
        curve: CurveKind,
        expected: usize,
        found: usize,
    },

    #[error("The split index/label {0} is out of bounds/could not be found")]
    SplitNotFound(String),

    #[error("No split exists. Create one with split() or pass new_split")]
    NoSplit,

    #[error("start() must be called before log()")]
    NotStarted,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn arity_requirement(curve: &CurveKind) -> &'static str {
    match curve {
        CurveKind::Exponential | CurveKind::Logarithmic => "exactly 1 in every sample",
        CurveKind::Linear | CurveKind::Polynomial => "the same and at least 1 in every sample",
    }
}

impl Error {
    /// Exit code used by the binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::InvalidConfig(_)
            | Error::UnknownCurveType { .. }
            | Error::SplitNotFound(_)
            | Error::NoSplit
            | Error::NotStarted => 2,
            Error::ArgumentsRequired
            | Error::UnsupportedCurve { .. }
            | Error::NonNumericArgument { .. }
            | Error::AmbiguousArgument { .. }
            | Error::ArityMismatch { .. } => 3,
            Error::Fit { .. } => 4,
            Error::Io(_) | Error::Json(_) => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_curve_message_lists_known_families() {
        let err = Error::UnknownCurveType {
            name: "Test".to_string(),
            known: vec!["Exponential".to_string(), "Linear".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Test is an invalid curve type. Must be in [Exponential, Linear]"
        );
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn unsupported_curve_message_names_the_arity_rule() {
        let err = Error::UnsupportedCurve { curve: CurveKind::Linear };
        assert_eq!(
            err.to_string(),
            "Linear cannot be fit to these samples: poll rejected them \
             (feature arity must be the same and at least 1 in every sample)"
        );
        let err = Error::UnsupportedCurve { curve: CurveKind::Logarithmic };
        assert!(err.to_string().ends_with("(feature arity must be exactly 1 in every sample)"));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn fit_errors_keep_solver_source() {
        let err = Error::Fit {
            curve: CurveKind::Exponential,
            source: SolverError::NoConvergence { iterations: 200 },
        };
        assert_eq!(err.exit_code(), 4);
        assert!(err.to_string().contains("did not converge after 200 iterations"));
    }
}
