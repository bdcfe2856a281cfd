//! Per-validator reward split.

use crate::errors::DistributionError;
use crate::events::{DistributionEvent, EventSink};
use crate::ledger::RewardStore;
use setl_staking::Validator;
use setl_types::DecCoins;
use tracing::debug;

/// Credits `tokens` to `validator`.
///
/// Commission is `tokens × commission_rate` (truncated), zero for probono
/// validators; the rest is shared with delegators. Outstanding rewards grow by
/// the full amount. A zero amount changes nothing and emits nothing.
pub fn allocate_tokens_to_validator<S: EventSink + ?Sized>(
    store: &mut RewardStore,
    events: &mut S,
    validator: &Validator,
    tokens: &DecCoins,
) -> Result<(), DistributionError> {
    if tokens.is_zero() {
        return Ok(());
    }
    if tokens.has_negative() {
        return Err(DistributionError::NegativeReward {
            validator: validator.operator,
            amount: tokens.clone(),
        });
    }

    let commission = tokens.mul_dec_truncate(&validator.effective_commission_rate());
    let shared = tokens.checked_sub(&commission)?;
    let operator = validator.operator;

    let accumulated = store.accumulated_commission(&operator).add(&commission);
    store.set_accumulated_commission(operator, accumulated);
    events.emit(DistributionEvent::Commission {
        validator: operator,
        amount: commission.clone(),
    });

    let current = store.current_rewards(&operator).add(&shared);
    store.set_current_rewards(operator, current);
    events.emit(DistributionEvent::Rewards {
        validator: operator,
        amount: tokens.clone(),
    });

    let outstanding = store.outstanding_rewards(&operator).add(tokens);
    store.set_outstanding_rewards(operator, outstanding);

    debug!(
        target: "distribution",
        "Allocated {} to validator {} (commission {}, shared {})",
        tokens, operator, commission, shared
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use setl_types::{ConsAddress, Dec, OperatorId};

    fn stake(s: &str) -> DecCoins {
        DecCoins::single("stake", s.parse().unwrap())
    }

    fn validator(label: &str, commission: &str) -> Validator {
        Validator::new(
            OperatorId::from_label(label),
            ConsAddress::from_label(label),
            1_000_000,
            commission.parse().unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_commission_and_shared_split() {
        let mut store = RewardStore::new();
        let mut events = Vec::new();
        let v = validator("v0", "0.5");

        allocate_tokens_to_validator(&mut store, &mut events, &v, &stake("49")).unwrap();

        assert_eq!(store.accumulated_commission(&v.operator), stake("24.5"));
        assert_eq!(store.current_rewards(&v.operator), stake("24.5"));
        assert_eq!(store.outstanding_rewards(&v.operator), stake("49"));
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind(), "commission");
        assert_eq!(events[1].kind(), "rewards");
    }

    #[test]
    fn test_probono_earns_no_commission() {
        let mut store = RewardStore::new();
        let mut events = Vec::new();
        let mut v = Validator::new_probono(
            OperatorId::from_label("p"),
            ConsAddress::from_label("p"),
            1_000_000,
            Dec::new_with_prec(5, 1),
        )
        .unwrap();
        v.commission_rate = Dec::new_with_prec(9, 1);

        allocate_tokens_to_validator(&mut store, &mut events, &v, &stake("10")).unwrap();

        assert!(store.accumulated_commission(&v.operator).is_zero());
        assert_eq!(store.current_rewards(&v.operator), stake("10"));
        assert_eq!(store.outstanding_rewards(&v.operator), stake("10"));
    }

    #[test]
    fn test_commission_truncates() {
        let mut store = RewardStore::new();
        let mut events = Vec::new();
        let v = validator("v0", "0.333333333333333333");

        allocate_tokens_to_validator(&mut store, &mut events, &v, &stake("0.000000000000000002"))
            .unwrap();

        // 2e-18 × 0.333… truncates to zero; everything is shared.
        assert!(store.accumulated_commission(&v.operator).is_zero());
        assert_eq!(
            store.current_rewards(&v.operator),
            stake("0.000000000000000002")
        );
    }

    #[test]
    fn test_accumulates_across_calls() {
        let mut store = RewardStore::new();
        let mut events = Vec::new();
        let v = validator("v0", "0.1");

        allocate_tokens_to_validator(&mut store, &mut events, &v, &stake("10")).unwrap();
        allocate_tokens_to_validator(&mut store, &mut events, &v, &stake("20")).unwrap();

        assert_eq!(store.accumulated_commission(&v.operator), stake("3"));
        assert_eq!(store.current_rewards(&v.operator), stake("27"));
        assert_eq!(store.outstanding_rewards(&v.operator), stake("30"));
    }

    #[test]
    fn test_negative_reward_rejected() {
        let mut store = RewardStore::new();
        let mut events: Vec<DistributionEvent> = Vec::new();
        let v = validator("v0", "0.1");

        let err = allocate_tokens_to_validator(&mut store, &mut events, &v, &stake("-1"))
            .unwrap_err();

        assert!(matches!(
            err,
            DistributionError::NegativeReward { validator, .. } if validator == v.operator
        ));
        assert!(events.is_empty());
        assert_eq!(store, RewardStore::new());
    }

    #[test]
    fn test_zero_amount_is_noop() {
        let mut store = RewardStore::new();
        let mut events: Vec<DistributionEvent> = Vec::new();
        let v = validator("v0", "0.1");

        allocate_tokens_to_validator(&mut store, &mut events, &v, &DecCoins::new()).unwrap();

        assert!(events.is_empty());
        assert_eq!(store, RewardStore::new());
    }
}
