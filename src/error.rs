//! Application error taxonomy.
//!
//! Every variant maps to a process exit code (see [`AppError::exit_code`]) so the
//! binary can stay a thin wrapper. Variants that concern a single dataset carry
//! its identifier (the file path as given) so a failing batch can be localized.

use thiserror::Error;

/// Failure raised by the numeric layer (`math`, `fit`).
///
/// These errors carry no file context; the pipeline attaches the dataset id via
/// [`AppError::numeric`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NumericError {
    #[error("too few points: {needed} required, {got} available")]
    TooFewPoints { needed: usize, got: usize },

    #[error("R² never reached {threshold} within {cycles} calibration cycles (best {best_r_squared:.6})")]
    ThresholdNotReached {
        threshold: f64,
        cycles: usize,
        best_r_squared: f64,
    },

    #[error("solver did not converge within {iterations} iterations")]
    NoConvergence { iterations: usize },

    #[error("least-squares system is singular or ill-conditioned")]
    Singular,

    #[error("abscissae must be strictly increasing (index {index})")]
    NotIncreasing { index: usize },

    #[error("non-finite value encountered: {0}")]
    NonFinite(String),

    #[error("rate constant must be positive to take its logarithm, got {0}")]
    NonPositiveRateConstant(f64),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(
        "input sequences differ in length (filepaths={filepaths}, temperatures={temperatures}, \
         k_0={k_0}, k_inf={k_inf}, c_0={c_0})"
    )]
    InputShape {
        filepaths: usize,
        temperatures: usize,
        k_0: usize,
        k_inf: usize,
        c_0: usize,
    },

    #[error("{context}: {message}")]
    Io { context: String, message: String },

    #[error("dataset '{dataset}': {message}")]
    Dataset { dataset: String, message: String },

    #[error("dataset '{dataset}': insufficient data: {source}")]
    InsufficientData {
        dataset: String,
        #[source]
        source: NumericError,
    },

    #[error("dataset '{dataset}': numerical fit failed: {source}")]
    NumericalFit {
        dataset: String,
        #[source]
        source: NumericError,
    },
}

impl AppError {
    /// Attach a dataset identifier to a numeric-layer failure.
    pub fn numeric(dataset: impl Into<String>, err: NumericError) -> Self {
        let dataset = dataset.into();
        match err {
            NumericError::TooFewPoints { .. } | NumericError::ThresholdNotReached { .. } => {
                AppError::InsufficientData { dataset, source: err }
            }
            _ => AppError::NumericalFit { dataset, source: err },
        }
    }

    pub fn io(context: impl Into<String>, err: impl std::fmt::Display) -> Self {
        AppError::Io {
            context: context.into(),
            message: err.to_string(),
        }
    }

    pub fn dataset(dataset: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Dataset {
            dataset: dataset.into(),
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Config(_) | AppError::InvalidArgument(_) | AppError::InputShape { .. } => 2,
            AppError::InsufficientData { .. } => 3,
            AppError::NumericalFit { .. } => 4,
            AppError::Io { .. } | AppError::Dataset { .. } => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_errors_are_classified_by_kind() {
        let short = AppError::numeric("a.csv", NumericError::TooFewPoints { needed: 3, got: 2 });
        assert!(matches!(short, AppError::InsufficientData { .. }));
        assert_eq!(short.exit_code(), 3);

        let diverged = AppError::numeric("a.csv", NumericError::NoConvergence { iterations: 10 });
        assert!(matches!(diverged, AppError::NumericalFit { .. }));
        assert_eq!(diverged.exit_code(), 4);
    }

    #[test]
    fn messages_name_the_dataset() {
        let err = AppError::numeric("runs/25.xlsx", NumericError::Singular);
        assert!(err.to_string().contains("runs/25.xlsx"));
    }
}
