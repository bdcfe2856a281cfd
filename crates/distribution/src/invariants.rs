//! Ledger invariants checked after each block by tests and the simulator.

use crate::bank::{CoinLedger, DISTRIBUTION};
use crate::ledger::RewardStore;
use setl_types::{Coins, MathError, OperatorId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantError {
    #[error("distribution account holds {actual}, rewards owed truncate to {expected}")]
    ModuleBalance { expected: Coins, actual: Coins },

    #[error("validator {0} has negative outstanding rewards")]
    NegativeOutstanding(OperatorId),

    #[error("community pool is negative")]
    NegativeCommunityPool,

    #[error(transparent)]
    Math(#[from] MathError),
}

/// The distribution account must hold exactly the whole-unit part of
/// everything owed: outstanding rewards plus the community pool.
pub fn module_account_invariant<B: CoinLedger + ?Sized>(
    store: &RewardStore,
    bank: &B,
) -> Result<(), InvariantError> {
    let (expected, _) = store.total_owed().truncate_decimal()?;
    let actual = bank.all_balances(DISTRIBUTION);
    if expected != actual {
        return Err(InvariantError::ModuleBalance { expected, actual });
    }
    Ok(())
}

pub fn nonnegative_outstanding_invariant(store: &RewardStore) -> Result<(), InvariantError> {
    if let Some((validator, _)) = store
        .outstanding_iter()
        .find(|(_, rewards)| rewards.has_negative())
    {
        return Err(InvariantError::NegativeOutstanding(*validator));
    }
    if store.community_pool().has_negative() {
        return Err(InvariantError::NegativeCommunityPool);
    }
    Ok(())
}

pub fn all_invariants<B: CoinLedger + ?Sized>(
    store: &RewardStore,
    bank: &B,
) -> Result<(), InvariantError> {
    nonnegative_outstanding_invariant(store)?;
    module_account_invariant(store, bank)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::InMemoryBank;
    use setl_types::{Dec, DecCoins};

    #[test]
    fn test_balance_matches_owed() {
        let mut store = RewardStore::new();
        store.set_outstanding_rewards(
            OperatorId::from_label("v0"),
            DecCoins::single("stake", Dec::new_with_prec(495, 1)),
        );
        store.credit_community_pool(&DecCoins::single("stake", Dec::new_with_prec(5, 1)));

        let mut bank = InMemoryBank::new();
        bank.mint_coins(DISTRIBUTION, &Coins::single("stake", 50))
            .unwrap();
        assert!(all_invariants(&store, &bank).is_ok());

        bank.mint_coins(DISTRIBUTION, &Coins::single("stake", 1))
            .unwrap();
        assert!(matches!(
            module_account_invariant(&store, &bank),
            Err(InvariantError::ModuleBalance { .. })
        ));
    }

    #[test]
    fn test_empty_state_holds() {
        let store = RewardStore::new();
        let bank = InMemoryBank::new();
        assert!(all_invariants(&store, &bank).is_ok());
    }
}
