//! Settle distribution
//!
//! Per-block reward and fee distribution for a proof-of-stake validator set.
//! Collected fees are split between validator commission, delegator-shared
//! rewards and the community pool under one of two policies:
//!
//! - `proportional`: shares follow voting power, with an optional bonus for
//!   the previous block's proposer.
//! - `equal_slot_with_burn`: every configured slot gets the same share;
//!   shares of unfilled slots are burned and probono validators divert part
//!   of theirs to the community pool.
//!
//! Arithmetic truncates everywhere, and the truncation slack is credited to
//! the community pool so that no value is minted or lost.

pub mod allocation;
pub mod bank;
pub mod errors;
pub mod events;
pub mod invariants;
pub mod keeper;
pub mod ledger;
pub mod params;
pub mod splitter;

pub use allocation::{allocate_tokens, AllocationInput, AllocationOutcome};
pub use bank::{BankError, CoinLedger, InMemoryBank, MockCoinLedger, DISTRIBUTION, FEE_COLLECTOR};
pub use errors::DistributionError;
pub use events::{BurnReason, DistributionEvent, EventSink};
pub use invariants::{all_invariants, InvariantError};
pub use keeper::{BlockContext, DistributionKeeper};
pub use ledger::{FeePool, RewardStore};
pub use params::{AllocationPolicy, DistributionParams};
pub use splitter::allocate_tokens_to_validator;
