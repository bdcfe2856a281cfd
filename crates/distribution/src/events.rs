//! Events emitted while distributing a block's rewards.

use serde::{Deserialize, Serialize};
use setl_types::{Coins, DecCoins, OperatorId};

/// Why coins were burned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BurnReason {
    /// Nobody held voting power; the equal-slot policy burns everything.
    ZeroVotingPower,
    /// Slots without a bonded vote.
    UnfilledSlots,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DistributionEvent {
    Commission {
        validator: OperatorId,
        amount: DecCoins,
    },
    Rewards {
        validator: OperatorId,
        amount: DecCoins,
    },
    ProposerReward {
        validator: OperatorId,
        amount: DecCoins,
    },
    Burn {
        burner: String,
        amount: Coins,
        reason: BurnReason,
    },
}

impl DistributionEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            DistributionEvent::Commission { .. } => "commission",
            DistributionEvent::Rewards { .. } => "rewards",
            DistributionEvent::ProposerReward { .. } => "proposer_reward",
            DistributionEvent::Burn { .. } => "burn",
        }
    }

    /// Validator the event refers to, if any.
    pub fn validator(&self) -> Option<&OperatorId> {
        match self {
            DistributionEvent::Commission { validator, .. }
            | DistributionEvent::Rewards { validator, .. }
            | DistributionEvent::ProposerReward { validator, .. } => Some(validator),
            DistributionEvent::Burn { .. } => None,
        }
    }
}

/// Receives events as they are produced.
pub trait EventSink {
    fn emit(&mut self, event: DistributionEvent);
}

impl EventSink for Vec<DistributionEvent> {
    fn emit(&mut self, event: DistributionEvent) {
        self.push(event);
    }
}
