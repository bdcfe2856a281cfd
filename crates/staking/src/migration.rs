//! Migration of legacy validator records.
//!
//! Older records carried a boolean `probono` flag. The current model stores a
//! probono rate instead: a flagged validator diverts everything (rate 1), an
//! unflagged one nothing (rate 0). All other fields carry over unchanged.

use crate::errors::StakingError;
use crate::registry::InMemoryRegistry;
use crate::validator::{BondStatus, Validator};
use serde::{Deserialize, Serialize};
use setl_types::{ConsAddress, Dec, OperatorId};
use tracing::info;

/// Validator record as stored before probono rates existed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyValidator {
    pub operator: OperatorId,
    pub cons_address: ConsAddress,
    pub tokens: u128,
    pub commission_rate: Dec,
    pub probono: bool,
    pub status: BondStatus,
    pub jailed: bool,
}

pub fn migrate_legacy_validator(legacy: LegacyValidator) -> Validator {
    let probono_rate = if legacy.probono {
        Dec::one()
    } else {
        Dec::zero()
    };
    Validator {
        operator: legacy.operator,
        cons_address: legacy.cons_address,
        tokens: legacy.tokens,
        commission_rate: legacy.commission_rate,
        probono: legacy.probono,
        probono_rate,
        status: legacy.status,
        jailed: legacy.jailed,
    }
}

/// Migrates every legacy record into `registry`, preserving order.
pub fn migrate_validators<I>(registry: &mut InMemoryRegistry, legacy: I) -> Result<usize, StakingError>
where
    I: IntoIterator<Item = LegacyValidator>,
{
    let mut migrated = 0usize;
    for record in legacy {
        registry.add_validator(migrate_legacy_validator(record))?;
        migrated += 1;
    }
    info!(target: "staking", migrated, "migrated legacy validators to probono rates");
    Ok(migrated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::StakingParams;
    use crate::registry::ValidatorRegistry;

    fn legacy(label: &str, probono: bool) -> LegacyValidator {
        LegacyValidator {
            operator: OperatorId::from_label(label),
            cons_address: ConsAddress::from_label(label),
            tokens: 1_000_000,
            commission_rate: Dec::new_with_prec(1, 1),
            probono,
            status: BondStatus::Bonded,
            jailed: false,
        }
    }

    #[test]
    fn test_flag_becomes_rate() {
        let regular = migrate_legacy_validator(legacy("regular", false));
        let probono = migrate_legacy_validator(legacy("probono", true));

        assert_eq!(regular.probono_rate, Dec::zero());
        assert_eq!(probono.probono_rate, Dec::one());
        assert!(probono.is_probono());
        assert_eq!(regular.commission_rate, Dec::new_with_prec(1, 1));
        assert_eq!(regular.tokens, 1_000_000);
        assert_eq!(regular.status, BondStatus::Bonded);
    }

    #[test]
    fn test_migrate_into_registry() {
        let mut registry = InMemoryRegistry::new(StakingParams::default());
        let count =
            migrate_validators(&mut registry, vec![legacy("a", false), legacy("b", true)]).unwrap();
        assert_eq!(count, 2);
        let b = registry
            .validator_by_cons_addr(&ConsAddress::from_label("b"))
            .unwrap();
        assert_eq!(b.effective_probono_rate(), Dec::one());

        assert!(migrate_validators(&mut registry, vec![legacy("a", true)]).is_err());
    }
}
