//! Live-price anomaly checks before trading.
//!
//! A quote far above the recent average is almost always a feed error, so
//! trading is blocked. A quote far below it may be a genuine crash and is only
//! surfaced as a warning.

use pricewatch_core::{config::TradeGateConfig, Result};
use statrs::statistics::Statistics;
use tracing::warn;

/// Whether a trade may proceed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    /// Blocked, with the reason shown to the operator.
    Block(String),
}

impl GateDecision {
    /// Is trading allowed?
    pub fn is_allowed(&self) -> bool {
        matches!(self, GateDecision::Allow)
    }
}

/// Trade gate over a trailing close history.
#[derive(Debug, Clone, Default)]
pub struct TradeGate {
    config: TradeGateConfig,
}

impl TradeGate {
    /// Create a new trade gate, rejecting an empty window or inverted multipliers.
    pub fn new(config: TradeGateConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Decide whether to trade at `current_price`.
    ///
    /// `history` holds recent closes, oldest first.
    pub fn check_trade_blocking(&self, current_price: f64, history: &[f64]) -> GateDecision {
        if history.len() < self.config.min_history {
            return GateDecision::Allow;
        }
        if current_price <= 0.0 {
            return GateDecision::Block("invalid current price (zero or negative)".to_string());
        }

        let avg = match self.recent_average(history) {
            Some(avg) => avg,
            None => return GateDecision::Allow,
        };

        let ratio = current_price / avg;
        if ratio >= self.config.block_multiplier {
            warn!(current_price, avg, ratio, "Blocking trade on high price anomaly");
            return GateDecision::Block(format!(
                "high price anomaly: current {:.2} is {:.1}x the {}-day avg {:.2}",
                current_price, ratio, self.config.window, avg
            ));
        }

        GateDecision::Allow
    }

    /// Describe an anomalous `current_price`, if it is one.
    ///
    /// Unlike [`check_trade_blocking`](Self::check_trade_blocking) this also
    /// reports low anomalies.
    pub fn anomaly_warning(&self, current_price: f64, history: &[f64]) -> Option<String> {
        if history.len() < self.config.min_history {
            return None;
        }
        if current_price <= 0.0 {
            return Some("Current price is zero or negative".to_string());
        }

        let avg = self.recent_average(history)?;
        let ratio = current_price / avg;

        if ratio >= self.config.block_multiplier {
            Some(format!(
                "Price spike detected: {:.2} is {:.1}x the {}-day average ({:.2}). Trades blocked.",
                current_price, ratio, self.config.window, avg
            ))
        } else if ratio <= self.config.warn_low_multiplier {
            Some(format!(
                "Price crash detected: {:.2} is {:.1}x the {}-day average ({:.2}). Verify before trading.",
                current_price, ratio, self.config.window, avg
            ))
        } else {
            None
        }
    }

    /// Mean of the last `window` closes, if positive.
    fn recent_average(&self, history: &[f64]) -> Option<f64> {
        let start = history.len().saturating_sub(self.config.window);
        let recent = &history[start..];
        if recent.is_empty() {
            return None;
        }

        let avg = recent.mean();
        (avg > 0.0).then_some(avg)
    }
}
