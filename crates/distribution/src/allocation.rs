//! Token allocation engine
//!
//! Sweeps the fees collected during the previous block into the distribution
//! account and divides them between validators, the community pool and (for
//! the equal-slot policy) the burn. All multiplications truncate; whatever the
//! truncation leaves behind is credited to the community pool, so
//!
//! ```text
//! to_validators + community_pool + burned == collected
//! ```
//!
//! holds exactly for every block.

use crate::bank::{CoinLedger, DISTRIBUTION, FEE_COLLECTOR};
use crate::errors::DistributionError;
use crate::events::{BurnReason, DistributionEvent, EventSink};
use crate::ledger::RewardStore;
use crate::params::{AllocationPolicy, DistributionParams};
use crate::splitter::allocate_tokens_to_validator;
use serde::{Deserialize, Serialize};
use setl_staking::{Validator, ValidatorRegistry, VoteInfo};
use setl_types::{Coins, ConsAddress, Dec, DecCoins};
use tracing::{debug, info, warn};

/// Consensus data for the block being rewarded.
#[derive(Debug, Clone, Copy)]
pub struct AllocationInput<'a> {
    /// Total voting power of the previous block's validator set.
    pub total_power: i64,
    /// Last-commit votes, in consensus order.
    pub votes: &'a [VoteInfo],
    /// Proposer of the previous block, if one was recorded.
    pub previous_proposer: Option<&'a ConsAddress>,
}

/// What a single allocation did with the collected fees.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationOutcome {
    pub policy: AllocationPolicy,
    pub collected: Coins,
    pub to_validators: DecCoins,
    pub community_pool: DecCoins,
    pub burned: Coins,
    pub proposer_rewarded: bool,
}

impl AllocationOutcome {
    fn new(policy: AllocationPolicy, collected: Coins) -> Self {
        Self {
            policy,
            collected,
            ..Default::default()
        }
    }

    /// True when every collected unit is accounted for.
    pub fn is_conserved(&self) -> bool {
        let accounted = self
            .to_validators
            .add(&self.community_pool)
            .add(&DecCoins::from_coins(&self.burned));
        accounted == DecCoins::from_coins(&self.collected)
    }
}

/// Distributes everything held by the fee collector.
///
/// Returns early without touching any state when nothing was collected.
/// Transfer and burn failures, votes for unknown validators and malformed
/// powers abort the call; callers run it against a cached state
/// (see [`crate::keeper::DistributionKeeper::begin_block`]) so a failure
/// leaves nothing half-applied.
pub fn allocate_tokens<B, R, S>(
    store: &mut RewardStore,
    bank: &mut B,
    registry: &R,
    events: &mut S,
    params: &DistributionParams,
    input: AllocationInput<'_>,
) -> Result<AllocationOutcome, DistributionError>
where
    B: CoinLedger + ?Sized,
    R: ValidatorRegistry + ?Sized,
    S: EventSink + ?Sized,
{
    let collected = bank.all_balances(FEE_COLLECTOR);
    if collected.is_empty() {
        debug!(target: "distribution", "No fees collected, nothing to allocate");
        return Ok(AllocationOutcome::new(params.policy, collected));
    }

    params.validate()?;
    check_powers(&input)?;

    bank.send_coins(FEE_COLLECTOR, DISTRIBUTION, &collected)
        .map_err(DistributionError::Transfer)?;

    let mut outcome = AllocationOutcome::new(params.policy, collected);

    if input.total_power == 0 {
        allocate_without_power(store, bank, events, &mut outcome)?;
    } else {
        match params.policy {
            AllocationPolicy::Proportional => {
                allocate_proportional(store, registry, events, params, &input, &mut outcome)?
            }
            AllocationPolicy::EqualSlotWithBurn => {
                allocate_equal_slots(store, bank, registry, events, params, &input, &mut outcome)?
            }
        }
    }

    if !outcome.is_conserved() {
        return Err(DistributionError::Conservation(format!(
            "collected {}, validators {}, community pool {}, burned {}",
            outcome.collected, outcome.to_validators, outcome.community_pool, outcome.burned
        )));
    }

    info!(
        target: "distribution",
        policy = outcome.policy.as_str(),
        votes = input.votes.len(),
        "Allocated {} collected: {} to validators, {} to community pool, {} burned",
        outcome.collected,
        outcome.to_validators,
        outcome.community_pool,
        outcome.burned
    );
    Ok(outcome)
}

fn check_powers(input: &AllocationInput<'_>) -> Result<(), DistributionError> {
    if input.total_power < 0 {
        return Err(DistributionError::NegativeTotalPower(input.total_power));
    }
    if let Some(vote) = input.votes.iter().find(|vote| vote.power < 0) {
        return Err(DistributionError::NegativePower {
            address: vote.cons_address,
            power: vote.power,
        });
    }
    Ok(())
}

fn lookup<'r, R: ValidatorRegistry + ?Sized>(
    registry: &'r R,
    address: &ConsAddress,
) -> Result<&'r Validator, DistributionError> {
    registry
        .validator_by_cons_addr(address)
        .ok_or(DistributionError::UnknownValidator(*address))
}

fn take(remaining: &DecCoins, amount: &DecCoins) -> Result<DecCoins, DistributionError> {
    remaining
        .checked_sub(amount)
        .map_err(DistributionError::Insufficient)
}

/// Nobody holds power: the pool keeps everything under the proportional
/// policy, the equal-slot policy burns it.
fn allocate_without_power<B, S>(
    store: &mut RewardStore,
    bank: &mut B,
    events: &mut S,
    outcome: &mut AllocationOutcome,
) -> Result<(), DistributionError>
where
    B: CoinLedger + ?Sized,
    S: EventSink + ?Sized,
{
    match outcome.policy {
        AllocationPolicy::Proportional => {
            let fees = DecCoins::from_coins(&outcome.collected);
            store.credit_community_pool(&fees);
            outcome.community_pool = fees;
        }
        AllocationPolicy::EqualSlotWithBurn => {
            bank.burn_coins(DISTRIBUTION, &outcome.collected)
                .map_err(DistributionError::Burn)?;
            events.emit(DistributionEvent::Burn {
                burner: DISTRIBUTION.to_string(),
                amount: outcome.collected.clone(),
                reason: BurnReason::ZeroVotingPower,
            });
            outcome.burned = outcome.collected.clone();
        }
    }
    debug!(
        target: "distribution",
        "Zero total voting power, {} handled by {} policy",
        outcome.collected,
        outcome.policy.as_str()
    );
    Ok(())
}

fn allocate_proportional<R, S>(
    store: &mut RewardStore,
    registry: &R,
    events: &mut S,
    params: &DistributionParams,
    input: &AllocationInput<'_>,
    outcome: &mut AllocationOutcome,
) -> Result<(), DistributionError>
where
    R: ValidatorRegistry + ?Sized,
    S: EventSink + ?Sized,
{
    let fees = DecCoins::from_coins(&outcome.collected);
    let mut remaining = fees.clone();
    let total_power = Dec::from(input.total_power);

    let mut proposer_multiplier = Dec::zero();
    if params.proposer_bonus_configured() {
        let signed_power: u128 = input
            .votes
            .iter()
            .filter(|vote| vote.signed_last_block)
            .map(|vote| u128::from(vote.power.unsigned_abs()))
            .sum();
        let signed_fraction = Dec::from(signed_power).quo_truncate(&total_power)?;
        proposer_multiplier = &params.base_proposer_reward
            + &params.bonus_proposer_reward.mul_truncate(&signed_fraction);

        match input
            .previous_proposer
            .and_then(|address| registry.validator_by_cons_addr(address))
        {
            Some(proposer) => {
                let reward = fees.mul_dec_truncate(&proposer_multiplier);
                allocate_tokens_to_validator(store, events, proposer, &reward)?;
                events.emit(DistributionEvent::ProposerReward {
                    validator: proposer.operator,
                    amount: reward.clone(),
                });
                remaining = take(&remaining, &reward)?;
                outcome.to_validators = outcome.to_validators.add(&reward);
                outcome.proposer_rewarded = true;
            }
            None => {
                warn!(
                    target: "distribution",
                    proposer = ?input.previous_proposer,
                    "Previous proposer not found in the validator set; its reward goes to the community pool"
                );
            }
        }
    }

    let vote_multiplier = &proposer_multiplier.complement() - &params.community_tax;
    let fee_multiplier = fees.mul_dec_truncate(&vote_multiplier);

    for vote in input.votes {
        let validator = lookup(registry, &vote.cons_address)?;
        let power_fraction = Dec::from(vote.power).quo_truncate(&total_power)?;
        let reward = fee_multiplier.mul_dec_truncate(&power_fraction);
        allocate_tokens_to_validator(store, events, validator, &reward)?;
        remaining = take(&remaining, &reward)?;
        outcome.to_validators = outcome.to_validators.add(&reward);
    }

    store.credit_community_pool(&remaining);
    outcome.community_pool = remaining;
    Ok(())
}

fn allocate_equal_slots<B, R, S>(
    store: &mut RewardStore,
    bank: &mut B,
    registry: &R,
    events: &mut S,
    params: &DistributionParams,
    input: &AllocationInput<'_>,
    outcome: &mut AllocationOutcome,
) -> Result<(), DistributionError>
where
    B: CoinLedger + ?Sized,
    R: ValidatorRegistry + ?Sized,
    S: EventSink + ?Sized,
{
    let slots = params.max_validator_slots;
    if registry.max_validators() != slots {
        return Err(DistributionError::SlotMismatch {
            params: slots,
            registry: registry.max_validators(),
        });
    }
    let filled = input.votes.len();
    if filled > slots as usize {
        return Err(DistributionError::TooManyVotes {
            votes: filled,
            slots,
        });
    }

    let fees = DecCoins::from_coins(&outcome.collected);
    let reward_per_slot = fees.quo_dec_truncate(&Dec::from(u64::from(slots)))?;
    let contribution = reward_per_slot.mul_dec_truncate(&params.community_tax);
    let after_contribution = reward_per_slot.checked_sub(&contribution)?;

    // Only whole units can be burned; the fractional change stays in the pool.
    let unfilled = reward_per_slot.mul_int((slots as usize - filled) as u64);
    let (burn, _) = unfilled.truncate_decimal()?;
    let mut remaining = take(&fees, &DecCoins::from_coins(&burn))?;
    if !burn.is_empty() {
        bank.burn_coins(DISTRIBUTION, &burn)
            .map_err(DistributionError::Burn)?;
        events.emit(DistributionEvent::Burn {
            burner: DISTRIBUTION.to_string(),
            amount: burn.clone(),
            reason: BurnReason::UnfilledSlots,
        });
    }
    outcome.burned = burn;

    for vote in input.votes {
        let validator = lookup(registry, &vote.cons_address)?;
        let kept = validator.effective_probono_rate().complement();
        let reward = after_contribution.mul_dec_truncate(&kept);
        allocate_tokens_to_validator(store, events, validator, &reward)?;
        remaining = take(&remaining, &reward)?;
        outcome.to_validators = outcome.to_validators.add(&reward);
    }

    store.credit_community_pool(&remaining);
    outcome.community_pool = remaining;
    Ok(())
}
