//! Simulated payment gateway.
//!
//! Decides settlement outcomes at random with a configured failure rate and
//! sleeps for a random latency to model the gateway round-trip. The sleep is a
//! `tokio` timer, so it never blocks other in-flight requests.

use crate::config::{DelayRange, SettlementConfig};
use crate::domain::money::Amount;
use crate::domain::payment::{Payment, SettlementOutcome};
use crate::domain::ports::PaymentGateway;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore, SeedableRng};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::debug;

const SUCCESS_TAG: &str = "OK";
const FAILURE_TAG: &str = "FAIL";

/// What a single settlement draw decided, before any waiting happens.
struct Draw {
    delay: Duration,
    failure_reason: Option<String>,
    disambiguator: u32,
}

pub struct SettlementSimulator {
    config: SettlementConfig,
    rng: Mutex<Box<dyn RngCore + Send>>,
    sequence: AtomicU64,
}

impl SettlementSimulator {
    /// Creates a simulator seeded from OS entropy.
    pub fn new(config: SettlementConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Creates a simulator drawing from the given generator.
    ///
    /// All concurrent callers share this one generator behind a lock, so they
    /// consume disjoint parts of a single stream.
    pub fn with_rng<R: RngCore + Send + 'static>(config: SettlementConfig, rng: R) -> Self {
        Self {
            config,
            rng: Mutex::new(Box::new(rng)),
            sequence: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &SettlementConfig {
        &self.config
    }

    /// The configured failure probability, clamped into `[0, 1]`.
    ///
    /// Configs built in code skip `ServiceConfig::validate`; NaN counts as 0.
    fn failure_probability(&self) -> f64 {
        let p = self.config.failure_probability;
        if p.is_nan() {
            0.0
        } else {
            p.clamp(0.0, 1.0)
        }
    }

    fn with_rng_locked<T>(&self, f: impl FnOnce(&mut dyn RngCore) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut **rng)
    }

    fn draw_delay(rng: &mut dyn RngCore, range: DelayRange) -> Duration {
        if range.is_zero() {
            return Duration::ZERO;
        }
        Duration::from_millis(rng.gen_range(range.min..=range.max))
    }

    fn draw_settlement(&self) -> Result<Draw> {
        self.with_rng_locked(|rng| {
            let delay = Self::draw_delay(rng, self.config.settle_delay_ms);
            let failed = rng.gen_bool(self.failure_probability());
            let failure_reason = if failed {
                let reason = self.config.failure_reasons.choose(rng).ok_or_else(|| {
                    PaymentError::InternalError("failure reason catalog is empty".into())
                })?;
                Some(reason.clone())
            } else {
                None
            };
            Ok(Draw {
                delay,
                failure_reason,
                disambiguator: rng.gen_range(1000..=9999),
            })
        })
    }

    /// Builds a reference such as `TXN-20241120153012123-4821-000017-OK`.
    ///
    /// The per-process sequence keeps references unique even when the
    /// timestamp and random part collide.
    fn transaction_reference(&self, disambiguator: u32, tag: &str) -> String {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        format!(
            "TXN-{}-{}-{:06}-{}",
            Utc::now().format("%Y%m%d%H%M%S%3f"),
            disambiguator,
            sequence,
            tag
        )
    }
}

#[async_trait]
impl PaymentGateway for SettlementSimulator {
    async fn settle(&self, payment: &Payment) -> Result<SettlementOutcome> {
        let draw = self.draw_settlement()?;
        debug!(
            payment_id = payment.id,
            delay_ms = draw.delay.as_millis() as u64,
            "Simulating gateway settlement"
        );
        if !draw.delay.is_zero() {
            tokio::time::sleep(draw.delay).await;
        }

        Ok(match draw.failure_reason {
            Some(reason) => SettlementOutcome::Failed {
                transaction_id: self.transaction_reference(draw.disambiguator, FAILURE_TAG),
                reason,
            },
            None => SettlementOutcome::Completed {
                transaction_id: self.transaction_reference(draw.disambiguator, SUCCESS_TAG),
            },
        })
    }

    async fn refund(&self, payment: &Payment, amount: Amount) -> Result<()> {
        let delay =
            self.with_rng_locked(|rng| Self::draw_delay(rng, self.config.refund_delay_ms));
        debug!(
            payment_id = payment.id,
            amount = %amount,
            delay_ms = delay.as_millis() as u64,
            "Simulating gateway refund"
        );
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }
}
