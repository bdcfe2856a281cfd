//! Scenario replay.
//!
//! A scenario lists validators and a sequence of blocks. For every block the
//! fees are minted into the fee collector, `begin_block` distributes whatever
//! the previous block collected, and the invariants are checked.

use crate::settings::SimConfig;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use setl_distribution::invariants::all_invariants;
use setl_distribution::{
    AllocationOutcome, BlockContext, CoinLedger, DistributionEvent, DistributionKeeper,
    InMemoryBank, DISTRIBUTION, FEE_COLLECTOR,
};
use setl_staking::{InMemoryRegistry, Validator, ValidatorRegistry};
use setl_types::{Coins, ConsAddress, Dec, DecCoins, OperatorId};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub validators: Vec<ScenarioValidator>,
    pub blocks: Vec<ScenarioBlock>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioValidator {
    pub label: String,
    pub tokens: u128,
    #[serde(default)]
    pub commission_rate: Dec,
    /// Present for probono validators.
    #[serde(default)]
    pub probono_rate: Option<Dec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioBlock {
    pub height: u64,
    pub proposer: String,
    /// Fees collected while this block executes.
    #[serde(default)]
    pub fees: Coins,
    /// Validators that did not sign the previous block.
    #[serde(default)]
    pub absent: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockReport {
    pub height: u64,
    pub outcome: Option<AllocationOutcome>,
    pub events: Vec<DistributionEvent>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidatorReport {
    pub label: String,
    pub operator: OperatorId,
    pub outstanding: DecCoins,
    pub commission: DecCoins,
    pub current: DecCoins,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub blocks: Vec<BlockReport>,
    pub validators: Vec<ValidatorReport>,
    pub community_pool: DecCoins,
    pub distribution_balance: Coins,
    pub total_supply: Coins,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse scenario {}", path.display()))
    }
}

fn build_registry(config: &SimConfig, scenario: &Scenario) -> Result<InMemoryRegistry> {
    let mut registry = InMemoryRegistry::new(config.staking.clone());
    for entry in &scenario.validators {
        let operator = OperatorId::from_label(&entry.label);
        let cons = ConsAddress::from_label(&entry.label);
        let validator = match &entry.probono_rate {
            Some(rate) => Validator::new_probono(operator, cons, entry.tokens, rate.clone()),
            None => Validator::new(operator, cons, entry.tokens, entry.commission_rate.clone()),
        }
        .with_context(|| format!("invalid validator {}", entry.label))?;
        registry
            .add_validator(validator)
            .with_context(|| format!("cannot register validator {}", entry.label))?;
    }
    Ok(registry)
}

pub fn run_scenario(config: &SimConfig, scenario: &Scenario) -> Result<SimulationReport> {
    let registry = build_registry(config, scenario)?;
    let mut bank = InMemoryBank::new();
    let mut keeper = DistributionKeeper::new(config.distribution.clone())?;
    let mut reports = Vec::with_capacity(scenario.blocks.len());
    let mut last_height = 0u64;

    for block in &scenario.blocks {
        if block.height <= last_height {
            bail!(
                "block heights must increase: {} follows {}",
                block.height,
                last_height
            );
        }
        last_height = block.height;

        let proposer = ConsAddress::from_label(&block.proposer);
        if registry.validator_by_cons_addr(&proposer).is_none() {
            warn!(
                target: "distribution",
                height = block.height,
                "Proposer {} is not registered",
                block.proposer
            );
        }
        let absent: BTreeSet<ConsAddress> = block
            .absent
            .iter()
            .map(|label| ConsAddress::from_label(label))
            .collect();
        let ctx = BlockContext {
            height: block.height,
            proposer,
            votes: registry.last_commit_votes(|address| !absent.contains(address)),
        };

        let outcome = keeper
            .begin_block(&mut bank, &registry, &ctx)
            .with_context(|| format!("distribution failed at height {}", block.height))?;
        all_invariants(keeper.store(), &bank)
            .with_context(|| format!("invariant broken at height {}", block.height))?;

        bank.mint_coins(FEE_COLLECTOR, &block.fees)
            .with_context(|| format!("cannot collect fees at height {}", block.height))?;

        reports.push(BlockReport {
            height: block.height,
            outcome,
            events: keeper.drain_events(),
        });
    }

    let store = keeper.store();
    let validators = scenario
        .validators
        .iter()
        .map(|entry| {
            let operator = OperatorId::from_label(&entry.label);
            ValidatorReport {
                label: entry.label.clone(),
                operator,
                outstanding: store.outstanding_rewards(&operator),
                commission: store.accumulated_commission(&operator),
                current: store.current_rewards(&operator),
            }
        })
        .collect();

    info!(
        target: "distribution",
        blocks = reports.len(),
        "Simulation finished, community pool {}",
        store.community_pool()
    );

    Ok(SimulationReport {
        blocks: reports,
        validators,
        community_pool: store.community_pool().clone(),
        distribution_balance: bank.all_balances(DISTRIBUTION),
        total_supply: bank.total_supply().clone(),
    })
}
