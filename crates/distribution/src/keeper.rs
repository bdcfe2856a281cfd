//! Block driver.
//!
//! `begin_block` runs allocation against cached copies of the reward store
//! and the bank and writes them back only when the whole block succeeded.

use crate::allocation::{allocate_tokens, AllocationInput, AllocationOutcome};
use crate::bank::CoinLedger;
use crate::errors::DistributionError;
use crate::events::DistributionEvent;
use crate::ledger::RewardStore;
use crate::params::DistributionParams;
use serde::{Deserialize, Serialize};
use setl_staking::{ValidatorRegistry, VoteInfo};
use setl_types::{ConsAddress, MathError};
use tracing::{debug, error};

/// Consensus data handed to `begin_block`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockContext {
    pub height: u64,
    /// Proposer of the block now starting.
    pub proposer: ConsAddress,
    /// Votes from the previous block's commit.
    pub votes: Vec<VoteInfo>,
}

impl BlockContext {
    /// Total power of the previous commit.
    pub fn total_power(&self) -> Result<i64, DistributionError> {
        self.votes
            .iter()
            .try_fold(0i64, |acc, vote| acc.checked_add(vote.power))
            .ok_or(DistributionError::Arithmetic(MathError::Overflow(
                "total voting power",
            )))
    }
}

#[derive(Debug, Clone, Default)]
pub struct DistributionKeeper {
    params: DistributionParams,
    store: RewardStore,
    events: Vec<DistributionEvent>,
}

impl DistributionKeeper {
    pub fn new(params: DistributionParams) -> Result<Self, DistributionError> {
        Self::with_store(params, RewardStore::new())
    }

    /// Keeper resuming from a stored snapshot.
    pub fn with_store(
        params: DistributionParams,
        store: RewardStore,
    ) -> Result<Self, DistributionError> {
        params.validate()?;
        Ok(Self {
            params,
            store,
            events: Vec::new(),
        })
    }

    pub fn params(&self) -> &DistributionParams {
        &self.params
    }

    pub fn set_params(&mut self, params: DistributionParams) -> Result<(), DistributionError> {
        params.validate()?;
        self.params = params;
        Ok(())
    }

    pub fn store(&self) -> &RewardStore {
        &self.store
    }

    pub fn events(&self) -> &[DistributionEvent] {
        &self.events
    }

    /// Takes every event emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<DistributionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Distributes the previous block's fees, then records `ctx.proposer`
    /// for the next block.
    ///
    /// The genesis block has no previous commit, so nothing is allocated at
    /// height 1 or below. On error neither the store nor the bank is changed
    /// and no events are kept.
    ///
    /// Atomicity comes from running against clones of the store and bank, so
    /// each call costs time and memory proportional to their total size.
    pub fn begin_block<B, R>(
        &mut self,
        bank: &mut B,
        registry: &R,
        ctx: &BlockContext,
    ) -> Result<Option<AllocationOutcome>, DistributionError>
    where
        B: CoinLedger + Clone,
        R: ValidatorRegistry + ?Sized,
    {
        let mut store = self.store.clone();
        let mut bank_cache = bank.clone();
        let mut events = Vec::new();

        let outcome = if ctx.height > 1 {
            let input = AllocationInput {
                total_power: ctx.total_power()?,
                votes: &ctx.votes,
                previous_proposer: self.store.previous_proposer(),
            };
            match allocate_tokens(
                &mut store,
                &mut bank_cache,
                registry,
                &mut events,
                &self.params,
                input,
            ) {
                Ok(outcome) => Some(outcome),
                Err(err) => {
                    error!(
                        target: "distribution",
                        height = ctx.height,
                        "Block distribution failed, discarding changes: {}",
                        err
                    );
                    return Err(err);
                }
            }
        } else {
            debug!(target: "distribution", height = ctx.height, "Skipping allocation at genesis");
            None
        };

        store.set_previous_proposer(ctx.proposer);
        self.store = store;
        *bank = bank_cache;
        self.events.extend(events);
        Ok(outcome)
    }
}
