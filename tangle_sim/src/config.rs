//! Run configuration for the tangle and witness-chain simulations.
//! Handles defaults, TOML loading and validation.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tangle_core::TipSelectionMode;

// ------------------------------------------------------------------------------------------------
// Tangle
// ------------------------------------------------------------------------------------------------

/// Parameters of one tangle run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TangleConfig {
    /// Number of simulated processes
    pub num_processes: usize,
    /// Expected transactions per process per tick
    pub lambda_per_process: f64,
    /// Last simulated tick (inclusive)
    pub sim_duration: f64,
    /// Lower bound of the gossip delay
    pub min_delay: f64,
    /// Upper bound of the gossip delay
    pub max_delay: f64,
    /// Tip-selection strategy
    pub mode: TipSelectionMode,
    /// Probability of using the biased walk in hybrid mode
    pub security_bias: f64,
    /// Height-bias exponent of the walk
    pub alpha_high: f64,
    /// Master seed
    pub seed: u64,
    /// Metrics CSV destination
    pub output: PathBuf,
}

impl Default for TangleConfig {
    fn default() -> Self {
        Self {
            num_processes: 10,
            lambda_per_process: 0.3,
            sim_duration: 100.0,
            min_delay: 1.0,
            max_delay: 5.0,
            mode: TipSelectionMode::Hybrid,
            security_bias: 0.7,
            alpha_high: 0.001,
            seed: 42,
            output: PathBuf::from("data/tangle_results.csv"),
        }
    }
}

impl TangleConfig {
    /// Checks parameter ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_processes == 0 {
            return Err(ConfigError::invalid("num_processes must be greater than 0"));
        }
        check_rate("lambda_per_process", self.lambda_per_process)?;
        check_duration(self.sim_duration)?;
        check_delays(self.min_delay, self.max_delay)?;
        check_probability("security_bias", self.security_bias)?;
        if !self.alpha_high.is_finite() {
            return Err(ConfigError::invalid("alpha_high must be a finite number"));
        }
        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// Witness chain
// ------------------------------------------------------------------------------------------------

/// Parameters of one witness-chain run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WitnessConfig {
    /// Number of users
    pub num_users: usize,
    /// Probability that a user posts a block in a given tick
    pub post_prob_per_step: f64,
    /// Last simulated tick (inclusive)
    pub sim_duration: f64,
    pub min_delay: f64,
    pub max_delay: f64,
    /// Maximum witnesses linked by a new block
    pub max_witnesses: usize,
    pub seed: u64,
    pub output: PathBuf,
}

impl Default for WitnessConfig {
    fn default() -> Self {
        Self {
            num_users: 100,
            post_prob_per_step: 0.02,
            sim_duration: 100.0,
            min_delay: 1.0,
            max_delay: 5.0,
            max_witnesses: 3,
            seed: 1337,
            output: PathBuf::from("data/witness_results.csv"),
        }
    }
}

impl WitnessConfig {
    /// Checks parameter ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_users == 0 {
            return Err(ConfigError::invalid("num_users must be greater than 0"));
        }
        check_probability("post_prob_per_step", self.post_prob_per_step)?;
        check_duration(self.sim_duration)?;
        check_delays(self.min_delay, self.max_delay)?;
        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// File loading
// ------------------------------------------------------------------------------------------------

/// Contents of a simulation config file.
///
/// ```toml
/// [tangle]
/// num_processes = 20
/// mode = "MCMC_ONLY"
///
/// [witness]
/// num_users = 50
/// ```
///
/// Missing sections and fields take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationFile {
    pub tangle: TangleConfig,
    pub witness: WitnessConfig,
}

impl SimulationFile {
    /// Reads and parses a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parses TOML text.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }
}

// ------------------------------------------------------------------------------------------------
// Validation helpers
// ------------------------------------------------------------------------------------------------

fn check_rate(name: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::invalid(format!("{} must be a non-negative number, got {}", name, value)));
    }
    Ok(())
}

fn check_probability(name: &str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::invalid(format!("{} must be in [0, 1], got {}", name, value)));
    }
    Ok(())
}

fn check_duration(value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::invalid(format!("sim_duration must be a non-negative number, got {}", value)));
    }
    Ok(())
}

fn check_delays(min_delay: f64, max_delay: f64) -> Result<(), ConfigError> {
    if !min_delay.is_finite() || !max_delay.is_finite() || min_delay < 0.0 {
        return Err(ConfigError::invalid("delays must be finite and non-negative"));
    }
    if min_delay > max_delay {
        return Err(ConfigError::invalid(format!(
            "min_delay ({}) must not exceed max_delay ({})",
            min_delay, max_delay
        )));
    }
    Ok(())
}
