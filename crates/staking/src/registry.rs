//! Validator registry lookups and the last-commit vote list.

use crate::errors::StakingError;
use crate::params::StakingParams;
use crate::validator::Validator;
use serde::{Deserialize, Serialize};
use setl_types::ConsAddress;
use std::collections::BTreeMap;
use tracing::debug;

/// One entry of the previous block's commit, as handed over by consensus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteInfo {
    pub cons_address: ConsAddress,
    pub power: i64,
    pub signed_last_block: bool,
}

impl VoteInfo {
    pub fn new(cons_address: ConsAddress, power: i64, signed_last_block: bool) -> Self {
        Self {
            cons_address,
            power,
            signed_last_block,
        }
    }
}

/// Read-only registry consulted during reward allocation.
pub trait ValidatorRegistry {
    /// Validator owning the consensus address, if it is still known.
    fn validator_by_cons_addr(&self, address: &ConsAddress) -> Option<&Validator>;

    /// Configured number of validator slots.
    fn max_validators(&self) -> u32;
}

/// Registry kept in memory, ordered by registration.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistry {
    params: StakingParams,
    validators: Vec<Validator>,
    by_cons: BTreeMap<ConsAddress, usize>,
}

impl InMemoryRegistry {
    pub fn new(params: StakingParams) -> Self {
        Self {
            params,
            validators: Vec::new(),
            by_cons: BTreeMap::new(),
        }
    }

    pub fn params(&self) -> &StakingParams {
        &self.params
    }

    /// Registers a validator; consensus addresses must be unique.
    pub fn add_validator(&mut self, validator: Validator) -> Result<(), StakingError> {
        validator.validate()?;
        if self.by_cons.contains_key(&validator.cons_address) {
            return Err(StakingError::DuplicateConsAddress(validator.cons_address));
        }
        debug!(
            target: "staking",
            operator = %validator.operator,
            probono = validator.probono,
            "registered validator"
        );
        self.by_cons
            .insert(validator.cons_address, self.validators.len());
        self.validators.push(validator);
        Ok(())
    }

    /// Drops a validator entirely, as if it unbonded within one block.
    pub fn remove_validator(&mut self, address: &ConsAddress) -> Option<Validator> {
        let index = self.by_cons.remove(address)?;
        let removed = self.validators.remove(index);
        for slot in self.by_cons.values_mut() {
            if *slot > index {
                *slot -= 1;
            }
        }
        Some(removed)
    }

    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }

    pub fn bonded_validators(&self) -> impl Iterator<Item = &Validator> {
        self.validators.iter().filter(|v| v.is_bonded())
    }

    /// Sum of consensus power over bonded validators.
    pub fn total_power(&self) -> i64 {
        self.bonded_validators()
            .map(|v| v.consensus_power(&self.params))
            .fold(0i64, i64::saturating_add)
    }

    /// Builds the last-commit vote list in registration order. Validators
    /// with zero power have no signing rights and are left out.
    pub fn last_commit_votes<F>(&self, signed: F) -> Vec<VoteInfo>
    where
        F: Fn(&ConsAddress) -> bool,
    {
        self.bonded_validators()
            .filter_map(|v| {
                let power = v.consensus_power(&self.params);
                (power > 0).then(|| VoteInfo::new(v.cons_address, power, signed(&v.cons_address)))
            })
            .collect()
    }
}

impl ValidatorRegistry for InMemoryRegistry {
    fn validator_by_cons_addr(&self, address: &ConsAddress) -> Option<&Validator> {
        self.by_cons.get(address).and_then(|&i| self.validators.get(i))
    }

    fn max_validators(&self) -> u32 {
        self.params.max_validators
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::PowerMode;
    use setl_types::{Dec, OperatorId};

    fn validator(label: &str, tokens: u128) -> Validator {
        Validator::new(
            OperatorId::from_label(label),
            ConsAddress::from_label(label),
            tokens,
            Dec::zero(),
        )
        .unwrap()
    }

    #[test]
    fn test_lookup_and_duplicate() {
        let mut registry = InMemoryRegistry::new(StakingParams::default());
        registry.add_validator(validator("a", 1_000_000)).unwrap();
        assert!(registry
            .validator_by_cons_addr(&ConsAddress::from_label("a"))
            .is_some());
        assert!(registry
            .validator_by_cons_addr(&ConsAddress::from_label("b"))
            .is_none());
        assert!(matches!(
            registry.add_validator(validator("a", 5)),
            Err(StakingError::DuplicateConsAddress(_))
        ));
    }

    #[test]
    fn test_remove_keeps_index_consistent() {
        let mut registry = InMemoryRegistry::new(StakingParams::default());
        for label in ["a", "b", "c"] {
            registry.add_validator(validator(label, 1_000_000)).unwrap();
        }
        registry.remove_validator(&ConsAddress::from_label("a")).unwrap();
        let c = registry
            .validator_by_cons_addr(&ConsAddress::from_label("c"))
            .unwrap();
        assert_eq!(c.operator, OperatorId::from_label("c"));
        assert_eq!(registry.validators().len(), 2);
    }

    #[test]
    fn test_last_commit_votes_order_and_power() {
        let params = StakingParams {
            power_mode: PowerMode::Constant,
            ..Default::default()
        };
        let mut registry = InMemoryRegistry::new(params);
        registry.add_validator(validator("a", 50_000_000)).unwrap();
        registry.add_validator(validator("b", 10)).unwrap();
        registry.add_validator(validator("c", 7_000_000)).unwrap();

        let absent = ConsAddress::from_label("c");
        let votes = registry.last_commit_votes(|addr| addr != &absent);
        assert_eq!(votes.len(), 2);
        assert_eq!(votes[0].cons_address, ConsAddress::from_label("a"));
        assert_eq!(votes[0].power, 1);
        assert!(!votes[1].signed_last_block);
        assert_eq!(registry.total_power(), 2);
    }
}
