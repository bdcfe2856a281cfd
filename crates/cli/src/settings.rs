//! Simulator configuration.
//!
//! Sources, later ones overriding earlier ones:
//! 1. built-in defaults
//! 2. the file passed with `--config` (format from its extension)
//! 3. environment variables prefixed `SETL_`, nested with `__`,
//!    e.g. `SETL_DISTRIBUTION__COMMUNITY_TAX=0.05`

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File as ConfigFile};
use serde::{Deserialize, Serialize};
use setl_distribution::DistributionParams;
use setl_staking::StakingParams;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub log_level: String,
    /// `pretty` or `compact`.
    pub log_format: String,
    pub distribution: DistributionParams,
    pub staking: StakingParams,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            distribution: DistributionParams::default(),
            staking: StakingParams::default(),
        }
    }
}

/// `SETL_` then the key path joined by `__`.
fn environment() -> Environment {
    Environment::with_prefix("SETL")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

impl SimConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, environment())
    }

    fn load_with_env(path: Option<&Path>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                bail!(
                    "Configuration file {} not found (specified via --config)",
                    path.display()
                );
            }
            builder = builder.add_source(ConfigFile::from(path));
        }

        builder = builder.add_source(env);

        let config: SimConfig = builder
            .build()
            .context("failed to read configuration")?
            .try_deserialize()
            .context("failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.distribution
            .validate()
            .context("invalid distribution parameters")?;
        self.staking
            .validate()
            .context("invalid staking parameters")?;
        if self.distribution.max_validator_slots != self.staking.max_validators {
            bail!(
                "distribution.max_validator_slots ({}) must equal staking.max_validators ({})",
                self.distribution.max_validator_slots,
                self.staking.max_validators
            );
        }
        if !matches!(self.log_format.as_str(), "pretty" | "compact") {
            bail!(
                "log_format must be \"pretty\" or \"compact\", got {:?}",
                self.log_format
            );
        }
        Ok(())
    }
}
