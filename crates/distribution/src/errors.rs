use crate::bank::BankError;
use setl_types::{ConsAddress, DecCoins, MathError, OperatorId};
use thiserror::Error;

/// Failures that abort a block's distribution. None of them is retried; the
/// caller discards the block's state transition.
#[derive(Debug, Error)]
pub enum DistributionError {
    #[error("failed to move collected fees into the distribution account: {0}")]
    Transfer(#[source] BankError),

    #[error("failed to burn unallocated rewards: {0}")]
    Burn(#[source] BankError),

    #[error("vote list references unknown validator {0}")]
    UnknownValidator(ConsAddress),

    #[error("negative voting power {power} for {address}")]
    NegativePower { address: ConsAddress, power: i64 },

    #[error("negative total voting power {0}")]
    NegativeTotalPower(i64),

    #[error("{votes} votes exceed {slots} validator slots")]
    TooManyVotes { votes: usize, slots: u32 },

    #[error("distribution expects {params} validator slots but the registry has {registry}")]
    SlotMismatch { params: u32, registry: u32 },

    #[error("negative reward {amount} for validator {validator}")]
    NegativeReward {
        validator: OperatorId,
        amount: DecCoins,
    },

    #[error("invalid distribution parameter: {0}")]
    InvalidParams(String),

    #[error("remainder would go negative: {0}")]
    Insufficient(#[source] MathError),

    #[error("allocation does not conserve collected fees: {0}")]
    Conservation(String),

    #[error(transparent)]
    Arithmetic(#[from] MathError),
}
