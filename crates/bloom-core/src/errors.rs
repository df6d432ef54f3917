use thiserror::Error;

/// Error type for invalid operations.
#[derive(Error, Debug)]
pub enum BloomError {
    #[error("step size underflow at t={t}: t + {step} is not representable; no further progress possible")]
    StepSizeUnderflow { t: f64, step: f64 },
    #[error("forcing series '{name}' has {actual} samples, expected {expected}")]
    ForcingLength {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Convenience type for `Result<T, BloomError>`.
pub type BloomResult<T> = Result<T, BloomError>;
