use crate::errors::StakingError;
use serde::{Deserialize, Serialize};
use setl_types::{validate_denom, DEFAULT_BOND_DENOM};

/// How bonded tokens map to consensus power.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerMode {
    /// Power is `tokens / power_reduction`.
    #[default]
    Proportional,
    /// Any validator with non-zero power counts as exactly 1.
    Constant,
}

/// Staking parameters read by distribution and the vote-list builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StakingParams {
    /// Maximum number of bonded validator slots.
    pub max_validators: u32,
    /// Tokens required for one unit of consensus power.
    pub power_reduction: u128,
    pub power_mode: PowerMode,
    pub bond_denom: String,
}

impl Default for StakingParams {
    fn default() -> Self {
        Self {
            max_validators: 100,
            power_reduction: 1_000_000,
            power_mode: PowerMode::Proportional,
            bond_denom: DEFAULT_BOND_DENOM.to_string(),
        }
    }
}

impl StakingParams {
    pub fn validate(&self) -> Result<(), StakingError> {
        if self.max_validators == 0 {
            return Err(StakingError::InvalidParameter(
                "max_validators must be positive",
            ));
        }
        if self.power_reduction == 0 {
            return Err(StakingError::InvalidParameter(
                "power_reduction must be positive",
            ));
        }
        validate_denom(&self.bond_denom)
            .map_err(|_| StakingError::InvalidParameter("bond_denom is not a valid denomination"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_are_valid() {
        assert!(StakingParams::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_slots_and_reduction() {
        let mut params = StakingParams {
            max_validators: 0,
            ..Default::default()
        };
        assert!(params.validate().is_err());

        params.max_validators = 10;
        params.power_reduction = 0;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_power_mode_serde() {
        let params: StakingParams =
            serde_json::from_str(r#"{"max_validators": 4, "power_mode": "constant"}"#).unwrap();
        assert_eq!(params.power_mode, PowerMode::Constant);
        assert_eq!(params.power_reduction, 1_000_000);
    }
}
