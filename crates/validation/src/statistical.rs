//! Statistical plausibility checks.
//!
//! A bar is compared against the previous day's close, then against the
//! trailing average of the context window. When there is no context at all,
//! fixed absolute bounds are used instead.

use pricewatch_core::{config::ValidationConfig, FailureReason, PriceBar, Result, Verdict};
use statrs::statistics::Statistics;

/// Statistical validator with configurable thresholds.
#[derive(Debug, Clone)]
pub struct StatisticalValidator {
    config: ValidationConfig,
}

impl StatisticalValidator {
    /// Create a new statistical validator.
    ///
    /// Fails with [`Error::Config`](pricewatch_core::Error::Config) if the
    /// thresholds are inconsistent or the context window is empty.
    pub fn new(config: ValidationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Get the configuration.
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Check a bar against its previous day and the context window.
    ///
    /// `previous` must be the bar immediately preceding `bar` in the series
    /// being validated. `context` is ordered most-recent-first and may be
    /// unrelated in time to `bar`, so it is never used as a previous day.
    pub fn check(&self, bar: &PriceBar, previous: Option<&PriceBar>, context: &[PriceBar]) -> Verdict {
        self.check_day_over_day(bar, previous).and_then(|| {
            if context.is_empty() {
                self.check_absolute_bounds(bar)
            } else {
                self.check_trailing_average(bar, context)
            }
        })
    }

    /// Percentage change of the close from the previous close.
    fn check_day_over_day(&self, bar: &PriceBar, previous: Option<&PriceBar>) -> Verdict {
        let prev_close = match previous {
            Some(prev) if prev.close > 0.0 => prev.close,
            _ => return Verdict::Valid,
        };

        let change_pct = (bar.close - prev_close) / prev_close * 100.0;
        if change_pct > self.config.max_change_pct {
            Verdict::Invalid(FailureReason::SpikeDetected)
        } else if change_pct < self.config.min_change_pct {
            Verdict::Invalid(FailureReason::CrashDetected)
        } else {
            Verdict::Valid
        }
    }

    fn check_trailing_average(&self, bar: &PriceBar, context: &[PriceBar]) -> Verdict {
        let avg = self.trailing_average(context);
        if bar.close > avg * self.config.max_price_multiplier {
            Verdict::Invalid(FailureReason::PriceTooHigh)
        } else if bar.close < avg * self.config.min_price_multiplier {
            Verdict::Invalid(FailureReason::PriceTooLow)
        } else {
            Verdict::Valid
        }
    }

    fn check_absolute_bounds(&self, bar: &PriceBar) -> Verdict {
        if bar.close > self.config.absolute_max_price {
            Verdict::Invalid(FailureReason::AbsoluteBoundExceeded)
        } else if bar.close < self.config.absolute_min_price {
            Verdict::Invalid(FailureReason::AbsoluteBoundBelowMinimum)
        } else {
            Verdict::Valid
        }
    }

    /// Mean close over the leading `context_window` entries.
    pub fn trailing_average(&self, context: &[PriceBar]) -> f64 {
        context
            .iter()
            .take(self.config.context_window)
            .map(|b| b.close)
            .mean()
    }
}

impl Default for StatisticalValidator {
    fn default() -> Self {
        Self {
            config: ValidationConfig::default(),
        }
    }
}
