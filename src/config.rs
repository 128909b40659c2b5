//! Service configuration.
//!
//! Values come from an optional JSON file and are then overridden by CLI flags.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid failure probability: {0}. Must be between 0 and 1")]
    InvalidProbability(f64),
    #[error("Invalid delay range for {name}: min {min}ms is greater than max {max}ms")]
    InvalidDelay { name: &'static str, min: u64, max: u64 },
    #[error("Failure reason catalog must not be empty")]
    EmptyReasonCatalog,
    #[error("Maximum amount must be positive, got {0}")]
    InvalidMaxAmount(Decimal),
    #[error("Configuration file error: {0}")]
    FileError(String),
}

pub const DEFAULT_FAILURE_REASONS: [&str; 8] = [
    "Insufficient funds",
    "Card expired",
    "Card declined by issuer",
    "Invalid card number",
    "Daily transaction limit exceeded",
    "Suspected fraud",
    "Invalid CVV",
    "Card blocked",
];

/// Inclusive range of milliseconds used for simulated gateway latency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min: u64,
    pub max: u64,
}

impl DelayRange {
    pub const ZERO: Self = Self { min: 0, max: 0 };

    pub fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    pub fn is_zero(&self) -> bool {
        self.max == 0
    }
}

/// Request limits enforced by the validation gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_amount: Decimal,
    pub max_reason_length: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_amount: dec!(100000),
            max_reason_length: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettlementConfig {
    pub failure_probability: f64,
    pub settle_delay_ms: DelayRange,
    pub refund_delay_ms: DelayRange,
    pub failure_reasons: Vec<String>,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            failure_probability: 0.10,
            settle_delay_ms: DelayRange::new(500, 1500),
            refund_delay_ms: DelayRange::new(300, 800),
            failure_reasons: DEFAULT_FAILURE_REASONS
                .iter()
                .map(|r| r.to_string())
                .collect(),
        }
    }
}

impl SettlementConfig {
    /// Settlement with no artificial latency.
    pub fn without_delay(mut self) -> Self {
        self.settle_delay_ms = DelayRange::ZERO;
        self.refund_delay_ms = DelayRange::ZERO;
        self
    }

    pub fn with_failure_probability(mut self, probability: f64) -> Self {
        self.failure_probability = probability;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub limits: Limits,
    pub settlement: SettlementConfig,
}

impl ServiceConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileError(format!("{}: {}", path.as_ref().display(), e)))?;
        let config: ServiceConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::FileError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let settlement = &self.settlement;
        if !(0.0..=1.0).contains(&settlement.failure_probability) {
            return Err(ConfigError::InvalidProbability(
                settlement.failure_probability,
            ));
        }
        for (name, range) in [
            ("settle_delay_ms", settlement.settle_delay_ms),
            ("refund_delay_ms", settlement.refund_delay_ms),
        ] {
            if range.min > range.max {
                return Err(ConfigError::InvalidDelay {
                    name,
                    min: range.min,
                    max: range.max,
                });
            }
        }
        if settlement.failure_reasons.is_empty() {
            return Err(ConfigError::EmptyReasonCatalog);
        }
        if self.limits.max_amount <= Decimal::ZERO {
            return Err(ConfigError::InvalidMaxAmount(self.limits.max_amount));
        }
        Ok(())
    }
}
