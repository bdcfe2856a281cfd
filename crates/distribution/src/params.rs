//! Distribution parameters.

use crate::errors::DistributionError;
use serde::{Deserialize, Serialize};
use setl_types::Dec;

/// Reward-allocation policy applied to a block's collected fees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationPolicy {
    /// Split by voting power, with an optional proposer bonus.
    #[default]
    Proportional,
    /// Split into equal per-slot shares and burn the unused slots.
    EqualSlotWithBurn,
}

impl AllocationPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AllocationPolicy::Proportional => "proportional",
            AllocationPolicy::EqualSlotWithBurn => "equal_slot_with_burn",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistributionParams {
    /// Share of collected fees credited to the community pool.
    pub community_tax: Dec,
    /// Fixed proposer share (proportional policy only).
    pub base_proposer_reward: Dec,
    /// Proposer share scaled by the signed fraction of power.
    pub bonus_proposer_reward: Dec,
    /// Number of reward slots the equal-slot policy divides fees into.
    pub max_validator_slots: u32,
    pub policy: AllocationPolicy,
}

impl Default for DistributionParams {
    fn default() -> Self {
        Self {
            community_tax: Dec::new_with_prec(2, 2),
            base_proposer_reward: Dec::new_with_prec(1, 2),
            bonus_proposer_reward: Dec::new_with_prec(4, 2),
            max_validator_slots: 100,
            policy: AllocationPolicy::Proportional,
        }
    }
}

impl DistributionParams {
    /// Checks every rate and the policy-specific constraints.
    pub fn validate(&self) -> Result<(), DistributionError> {
        for (name, rate) in [
            ("community_tax", &self.community_tax),
            ("base_proposer_reward", &self.base_proposer_reward),
            ("bonus_proposer_reward", &self.bonus_proposer_reward),
        ] {
            if !rate.is_rate() {
                return Err(DistributionError::InvalidParams(format!(
                    "{name} must be within [0, 1], got {rate}"
                )));
            }
        }
        if self.max_validator_slots == 0 {
            return Err(DistributionError::InvalidParams(
                "max_validator_slots must be positive".to_string(),
            ));
        }
        if self.policy == AllocationPolicy::Proportional {
            let total = &(&self.base_proposer_reward + &self.bonus_proposer_reward)
                + &self.community_tax;
            if total > Dec::one() {
                return Err(DistributionError::InvalidParams(format!(
                    "base_proposer_reward + bonus_proposer_reward + community_tax must not exceed 1, got {total}"
                )));
            }
        }
        Ok(())
    }

    /// True when either proposer reward is non-zero.
    pub fn proposer_bonus_configured(&self) -> bool {
        !self.base_proposer_reward.is_zero() || !self.bonus_proposer_reward.is_zero()
    }
}
