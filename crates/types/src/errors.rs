use thiserror::Error;

/// Errors raised by fixed-point and coin-set arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MathError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("arithmetic overflow: {0}")]
    Overflow(&'static str),

    #[error("insufficient {denom}: have {have}, need {need}")]
    Insufficient {
        denom: String,
        have: String,
        need: String,
    },

    #[error("negative amount of {denom}: {amount}")]
    Negative { denom: String, amount: String },

    #[error("invalid decimal {input:?}: {reason}")]
    Parse { input: String, reason: &'static str },

    #[error("invalid denomination {0:?}")]
    InvalidDenom(String),
}
