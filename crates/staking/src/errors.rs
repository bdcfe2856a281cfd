use setl_types::{ConsAddress, Dec};
use thiserror::Error;

/// Errors raised while building or validating the staking view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StakingError {
    #[error("{field} must be within [0, 1], got {value}")]
    RateOutOfRange { field: &'static str, value: Dec },

    #[error("invalid staking parameter: {0}")]
    InvalidParameter(&'static str),

    #[error("consensus address {0} is already registered")]
    DuplicateConsAddress(ConsAddress),

    #[error("voting power {power} overflows for {address}")]
    PowerOverflow { address: ConsAddress, power: u128 },
}
