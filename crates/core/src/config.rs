//! Configuration structures for the pricewatch system.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Main configuration for the validation engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bar validation and repair thresholds.
    pub validation: ValidationConfig,
    /// Live-price trade gate thresholds.
    pub trade_gate: TradeGateConfig,
}

impl Config {
    /// Parse a configuration from JSON, filling missing fields with defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Reject thresholds that would make the checks meaningless.
    pub fn validate(&self) -> Result<()> {
        self.validation.validate()?;
        self.trade_gate.validate()
    }
}

/// Thresholds for bar validation and batch repair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Close above `avg * max_price_multiplier` is too high.
    pub max_price_multiplier: f64,
    /// Close below `avg * min_price_multiplier` is too low.
    pub min_price_multiplier: f64,
    /// Day-over-day increase (percent) above which a bar is a spike.
    pub max_change_pct: f64,
    /// Day-over-day change (percent) below which a bar is a crash.
    pub min_change_pct: f64,
    /// Absolute close ceiling when no context exists.
    pub absolute_max_price: f64,
    /// Absolute close floor when no context exists.
    pub absolute_min_price: f64,
    /// Number of context bars used for the trailing average.
    pub context_window: usize,
    /// Repair fraction above which a batch is reported as suspicious.
    pub repair_warn_fraction: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_price_multiplier: 10.0,
            min_price_multiplier: 0.1,
            max_change_pct: 1000.0,
            min_change_pct: -90.0,
            absolute_max_price: 10_000.0,
            absolute_min_price: 0.01,
            context_window: 30,
            repair_warn_fraction: 0.5,
        }
    }
}

impl ValidationConfig {
    /// Reject thresholds that would make the checks meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.min_price_multiplier <= 0.0 || self.max_price_multiplier <= self.min_price_multiplier {
            return Err(Error::config(format!(
                "price multipliers must satisfy 0 < min ({}) < max ({})",
                self.min_price_multiplier, self.max_price_multiplier
            )));
        }
        if self.min_change_pct >= self.max_change_pct {
            return Err(Error::config(format!(
                "min_change_pct ({}) must be below max_change_pct ({})",
                self.min_change_pct, self.max_change_pct
            )));
        }
        if self.absolute_min_price < 0.0 || self.absolute_max_price <= self.absolute_min_price {
            return Err(Error::config(format!(
                "absolute bounds must satisfy 0 <= min ({}) < max ({})",
                self.absolute_min_price, self.absolute_max_price
            )));
        }
        if self.context_window == 0 {
            return Err(Error::config("context_window must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.repair_warn_fraction) {
            return Err(Error::config(format!(
                "repair_warn_fraction ({}) must be within [0, 1]",
                self.repair_warn_fraction
            )));
        }
        Ok(())
    }
}

/// Thresholds for checking a live price before trading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeGateConfig {
    /// Minimum closes required before any anomaly check applies.
    pub min_history: usize,
    /// Number of most recent closes averaged.
    pub window: usize,
    /// Ratio to the average at or above which trading is blocked.
    pub block_multiplier: f64,
    /// Ratio to the average at or below which a crash warning is raised.
    pub warn_low_multiplier: f64,
}

impl Default for TradeGateConfig {
    fn default() -> Self {
        Self {
            min_history: 30,
            window: 30,
            block_multiplier: 10.0,
            warn_low_multiplier: 0.1,
        }
    }
}

impl TradeGateConfig {
    /// Reject an empty window or inverted multipliers.
    pub fn validate(&self) -> Result<()> {
        if self.window == 0 {
            return Err(Error::config("trade gate window must be at least 1"));
        }
        if self.warn_low_multiplier <= 0.0 || self.block_multiplier <= self.warn_low_multiplier {
            return Err(Error::config(format!(
                "trade gate multipliers must satisfy 0 < low ({}) < block ({})",
                self.warn_low_multiplier, self.block_multiplier
            )));
        }
        Ok(())
    }
}
