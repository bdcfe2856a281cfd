//! Coin ledger interface used by distribution
//!
//! Only whole coins move through the ledger. Fees accumulate in the
//! [`FEE_COLLECTOR`] module account during a block and are swept into
//! [`DISTRIBUTION`] at the start of the next one.

use serde::{Deserialize, Serialize};
use setl_types::{Coins, MathError};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Module account receiving transaction fees and block rewards.
pub const FEE_COLLECTOR: &str = "fee_collector";

/// Module account backing outstanding rewards and the community pool.
pub const DISTRIBUTION: &str = "distribution";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BankError {
    #[error("account {account} has insufficient funds: {source}")]
    InsufficientFunds {
        account: String,
        #[source]
        source: MathError,
    },

    #[error("account {0} has no burn permission")]
    BurnNotPermitted(String),

    #[error("ledger rejected the operation: {0}")]
    Rejected(String),

    #[error(transparent)]
    Math(#[from] MathError),
}

/// Interface for the coin ledger primitives distribution relies on.
pub trait CoinLedger {
    /// Every balance held by `account`.
    fn all_balances(&self, account: &str) -> Coins;

    /// Moves `amount` from `from` to `to`, all or nothing.
    fn send_coins(&mut self, from: &str, to: &str, amount: &Coins) -> Result<(), BankError>;

    /// Destroys `amount` held by `account`, reducing total supply.
    fn burn_coins(&mut self, account: &str, amount: &Coins) -> Result<(), BankError>;
}

// -----------------------------------------------------------------------------
// In-memory bank (simulator and tests)
// -----------------------------------------------------------------------------
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryBank {
    balances: BTreeMap<String, Coins>,
    supply: Coins,
    burners: BTreeSet<String>,
}

impl InMemoryBank {
    /// Bank where only the distribution account may burn.
    pub fn new() -> Self {
        let mut bank = Self::default();
        bank.burners.insert(DISTRIBUTION.to_string());
        bank
    }

    /// Creates `amount` in `account`, increasing total supply.
    pub fn mint_coins(&mut self, account: &str, amount: &Coins) -> Result<(), BankError> {
        let balance = self.all_balances(account).checked_add(amount)?;
        self.supply = self.supply.checked_add(amount)?;
        self.set_balance(account, balance);
        Ok(())
    }

    pub fn total_supply(&self) -> &Coins {
        &self.supply
    }

    fn set_balance(&mut self, account: &str, balance: Coins) {
        if balance.is_empty() {
            self.balances.remove(account);
        } else {
            self.balances.insert(account.to_string(), balance);
        }
    }

    fn debit(&self, account: &str, amount: &Coins) -> Result<Coins, BankError> {
        self.all_balances(account)
            .checked_sub(amount)
            .map_err(|source| BankError::InsufficientFunds {
                account: account.to_string(),
                source,
            })
    }
}

impl CoinLedger for InMemoryBank {
    fn all_balances(&self, account: &str) -> Coins {
        self.balances.get(account).cloned().unwrap_or_default()
    }

    fn send_coins(&mut self, from: &str, to: &str, amount: &Coins) -> Result<(), BankError> {
        if from == to {
            return Ok(());
        }
        let from_balance = self.debit(from, amount)?;
        let to_balance = self.all_balances(to).checked_add(amount)?;
        self.set_balance(from, from_balance);
        self.set_balance(to, to_balance);
        Ok(())
    }

    fn burn_coins(&mut self, account: &str, amount: &Coins) -> Result<(), BankError> {
        if !self.burners.contains(account) {
            return Err(BankError::BurnNotPermitted(account.to_string()));
        }
        let balance = self.debit(account, amount)?;
        let supply = self.supply.checked_sub(amount)?;
        self.set_balance(account, balance);
        self.supply = supply;
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Mock ledger (failure injection and call recording)
// -----------------------------------------------------------------------------
#[derive(Debug, Clone, Default)]
pub struct MockCoinLedger {
    inner: InMemoryBank,
    pub fail_transfers: bool,
    pub fail_burns: bool,
    send_calls: Vec<(String, String, Coins)>,
    burn_calls: Vec<(String, Coins)>,
}

impl MockCoinLedger {
    pub fn new() -> Self {
        Self {
            inner: InMemoryBank::new(),
            ..Default::default()
        }
    }

    pub fn with_fees(fees: &Coins) -> Result<Self, BankError> {
        let mut ledger = Self::new();
        ledger.inner.mint_coins(FEE_COLLECTOR, fees)?;
        Ok(ledger)
    }

    pub fn bank(&self) -> &InMemoryBank {
        &self.inner
    }

    pub fn get_send_calls(&self) -> &[(String, String, Coins)] {
        &self.send_calls
    }

    pub fn get_burn_calls(&self) -> &[(String, Coins)] {
        &self.burn_calls
    }

    pub fn clear_calls(&mut self) {
        self.send_calls.clear();
        self.burn_calls.clear();
    }
}

impl CoinLedger for MockCoinLedger {
    fn all_balances(&self, account: &str) -> Coins {
        self.inner.all_balances(account)
    }

    fn send_coins(&mut self, from: &str, to: &str, amount: &Coins) -> Result<(), BankError> {
        self.send_calls
            .push((from.to_string(), to.to_string(), amount.clone()));
        if self.fail_transfers {
            return Err(BankError::Rejected("transfers disabled".to_string()));
        }
        self.inner.send_coins(from, to, amount)
    }

    fn burn_coins(&mut self, account: &str, amount: &Coins) -> Result<(), BankError> {
        self.burn_calls.push((account.to_string(), amount.clone()));
        if self.fail_burns {
            return Err(BankError::Rejected("burns disabled".to_string()));
        }
        self.inner.burn_coins(account, amount)
    }
}
