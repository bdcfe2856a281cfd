//! Token ↔ consensus power conversion.
//!
//! The constant-power switch is a `PowerMode` value passed by the caller.

use crate::params::PowerMode;

/// Consensus power for `tokens` bonded tokens. Saturates at `i64::MAX`;
/// a zero `power_reduction` yields zero power.
pub fn tokens_to_consensus_power(tokens: u128, power_reduction: u128, mode: PowerMode) -> i64 {
    if power_reduction == 0 {
        return 0;
    }
    let power = i64::try_from(tokens / power_reduction).unwrap_or(i64::MAX);
    match mode {
        PowerMode::Constant if power > 0 => 1,
        _ => power,
    }
}

/// Tokens represented by `power` units of consensus power.
pub fn tokens_from_consensus_power(power: i64, power_reduction: u128) -> u128 {
    u128::try_from(power.max(0))
        .unwrap_or(0)
        .saturating_mul(power_reduction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proportional_power() {
        assert_eq!(tokens_to_consensus_power(100_000_000, 1_000_000, PowerMode::Proportional), 100);
        assert_eq!(tokens_to_consensus_power(999_999, 1_000_000, PowerMode::Proportional), 0);
    }

    #[test]
    fn test_constant_power_clamps_to_one() {
        assert_eq!(tokens_to_consensus_power(100_000_000, 1_000_000, PowerMode::Constant), 1);
        // below one unit stays unbonded-equivalent
        assert_eq!(tokens_to_consensus_power(10, 1_000_000, PowerMode::Constant), 0);
    }

    #[test]
    fn test_power_round_trip_and_saturation() {
        assert_eq!(tokens_from_consensus_power(100, 1_000_000), 100_000_000);
        assert_eq!(tokens_from_consensus_power(-5, 1_000_000), 0);
        assert_eq!(tokens_to_consensus_power(u128::MAX, 1, PowerMode::Proportional), i64::MAX);
        assert_eq!(tokens_to_consensus_power(100, 0, PowerMode::Proportional), 0);
    }
}
