//! Read-only validator view consumed by distribution.

use crate::errors::StakingError;
use crate::params::StakingParams;
use crate::power::tokens_to_consensus_power;
use serde::{Deserialize, Serialize};
use setl_types::{ConsAddress, Dec, OperatorId};

/// Bonding status of a validator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BondStatus {
    #[default]
    Unbonded,
    Unbonding,
    Bonded,
}

/// Validator as seen by the reward engine.
///
/// A probono validator accrues no commission: its personal share is reduced
/// by `probono_rate` and the diverted part goes to the community pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    pub operator: OperatorId,
    pub cons_address: ConsAddress,
    pub tokens: u128,
    pub commission_rate: Dec,
    pub probono: bool,
    pub probono_rate: Dec,
    pub status: BondStatus,
    pub jailed: bool,
}

impl Validator {
    /// Bonded validator charging `commission_rate`.
    pub fn new(
        operator: OperatorId,
        cons_address: ConsAddress,
        tokens: u128,
        commission_rate: Dec,
    ) -> Result<Self, StakingError> {
        let validator = Self {
            operator,
            cons_address,
            tokens,
            commission_rate,
            probono: false,
            probono_rate: Dec::zero(),
            status: BondStatus::Bonded,
            jailed: false,
        };
        validator.validate()?;
        Ok(validator)
    }

    /// Bonded probono validator diverting `probono_rate` of its reward.
    pub fn new_probono(
        operator: OperatorId,
        cons_address: ConsAddress,
        tokens: u128,
        probono_rate: Dec,
    ) -> Result<Self, StakingError> {
        let validator = Self {
            operator,
            cons_address,
            tokens,
            commission_rate: Dec::zero(),
            probono: true,
            probono_rate,
            status: BondStatus::Bonded,
            jailed: false,
        };
        validator.validate()?;
        Ok(validator)
    }

    pub fn validate(&self) -> Result<(), StakingError> {
        if !self.commission_rate.is_rate() {
            return Err(StakingError::RateOutOfRange {
                field: "commission_rate",
                value: self.commission_rate.clone(),
            });
        }
        if !self.probono_rate.is_rate() {
            return Err(StakingError::RateOutOfRange {
                field: "probono_rate",
                value: self.probono_rate.clone(),
            });
        }
        Ok(())
    }

    pub fn is_probono(&self) -> bool {
        self.probono
    }

    pub fn is_bonded(&self) -> bool {
        self.status == BondStatus::Bonded && !self.jailed
    }

    /// Rate charged as commission; always zero for probono validators.
    pub fn effective_commission_rate(&self) -> Dec {
        if self.probono {
            Dec::zero()
        } else {
            self.commission_rate.clone()
        }
    }

    /// Share of the validator's reward redirected to the community pool.
    pub fn effective_probono_rate(&self) -> Dec {
        if self.probono {
            self.probono_rate.clone()
        } else {
            Dec::zero()
        }
    }

    pub fn consensus_power(&self, params: &StakingParams) -> i64 {
        if !self.is_bonded() {
            return 0;
        }
        tokens_to_consensus_power(self.tokens, params.power_reduction, params.power_mode)
    }
}
