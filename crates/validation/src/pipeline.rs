//! Batch validation and repair.
//!
//! Bars are processed strictly in batch order. Each bar is validated against
//! the accepted bar before it and the persisted context; rejected bars are
//! interpolated from the nearest anchors. A bar is never dropped: if
//! interpolation fails the original is kept.

use pricewatch_core::{FailureReason, PriceBar, RepairLog, Verdict};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    anchors::{Direction, SearchSpace},
    validator::PriceValidator,
};

/// A rejected bar that could not be interpolated and was kept as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairFailure {
    /// Date of the bar.
    pub date: String,
    /// Validation failure that triggered the repair attempt.
    pub reason: FailureReason,
    /// Interpolation error message.
    pub error: String,
}

/// Result of one repair attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum RepairOutcome {
    /// Replacement bar and its log entry.
    Repaired { bar: PriceBar, log: RepairLog },
    /// Interpolation failed; the original bar is kept.
    Fallback { original: PriceBar, failure: RepairFailure },
}

/// Output of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepairReport {
    /// Clean bars, same length and order as the input batch.
    pub bars: Vec<PriceBar>,
    /// One entry per repaired bar, in batch order.
    pub logs: Vec<RepairLog>,
    /// Rejected bars kept unrepaired, in batch order.
    pub failures: Vec<RepairFailure>,
}

impl RepairReport {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            bars: Vec::with_capacity(capacity),
            logs: Vec::new(),
            failures: Vec::new(),
        }
    }

    fn record(&mut self, outcome: RepairOutcome) {
        match outcome {
            RepairOutcome::Repaired { bar, log } => {
                self.bars.push(bar);
                self.logs.push(log);
            }
            RepairOutcome::Fallback { original, failure } => {
                self.bars.push(original);
                self.failures.push(failure);
            }
        }
    }

    /// Number of bars replaced.
    pub fn repaired_count(&self) -> usize {
        self.logs.len()
    }

    /// Number of bars that failed validation, repaired or not.
    pub fn flagged_count(&self) -> usize {
        self.logs.len() + self.failures.len()
    }

    /// Fraction of the batch that failed validation.
    pub fn flagged_fraction(&self) -> f64 {
        if self.bars.is_empty() {
            0.0
        } else {
            self.flagged_count() as f64 / self.bars.len() as f64
        }
    }

    /// Did every bar pass validation untouched?
    pub fn is_clean(&self) -> bool {
        self.flagged_count() == 0
    }
}

impl PriceValidator {
    /// Validate a chronological batch and repair rejected bars.
    ///
    /// Each bar's day-over-day reference is the bar preceding it in the batch
    /// as already accepted; `context` is only used for the trailing average
    /// and as an anchor source. `context` holds persisted bars for the same
    /// instrument, most recent first. The returned report always has one bar
    /// per input bar.
    pub fn validate_and_repair(&self, batch: &[PriceBar], context: &[PriceBar]) -> RepairReport {
        let mut report = RepairReport::with_capacity(batch.len());

        for (index, bar) in batch.iter().enumerate() {
            // The accepted predecessor, so a repaired spike does not make the
            // next normal day look like a crash.
            let previous = report.bars.last();

            let reason = match self.validate(bar, previous, context) {
                Verdict::Valid => {
                    report.bars.push(bar.clone());
                    continue;
                }
                Verdict::Invalid(reason) => reason,
            };

            let space = SearchSpace {
                clean: &report.bars,
                batch,
                index,
                unrepaired: &report.failures,
                context,
            };
            let outcome = self.repair(bar, reason, &space);
            report.record(outcome);
        }

        let fraction = report.flagged_fraction();
        if fraction > self.config().repair_warn_fraction {
            warn!(
                flagged = report.flagged_count(),
                total = batch.len(),
                fraction,
                "More than the expected share of prices flagged invalid"
            );
        }

        report
    }

    /// Validate a most-recent-first series.
    ///
    /// The series is validated in chronological order and the bars are
    /// returned most-recent-first again. Logs and failures stay chronological.
    pub fn validate_series_desc(&self, prices: &[PriceBar], context: &[PriceBar]) -> RepairReport {
        let chronological: Vec<PriceBar> = prices.iter().rev().cloned().collect();
        let mut report = self.validate_and_repair(&chronological, context);
        report.bars.reverse();
        report
    }

    /// Find anchors for a rejected bar and interpolate it.
    fn repair(&self, bar: &PriceBar, reason: FailureReason, space: &SearchSpace<'_>) -> RepairOutcome {
        let is_valid = |candidate: &PriceBar| self.validate(candidate, None, space.context).is_valid();
        let before = space.find(Direction::Before, is_valid);
        let after = space.find(Direction::After, is_valid);

        match self.interpolate(bar, before, after) {
            Ok((repaired, method)) => {
                debug!(
                    date = %bar.date,
                    %reason,
                    %method,
                    original_close = bar.close,
                    interpolated_close = repaired.close,
                    "Repaired abnormal price"
                );
                let log = RepairLog {
                    date: bar.date.clone(),
                    original_close: bar.close,
                    interpolated_close: repaired.close,
                    method,
                    reason,
                };
                RepairOutcome::Repaired { bar: repaired, log }
            }
            Err(e) => {
                warn!(date = %bar.date, %reason, error = %e, "Interpolation failed, keeping original price");
                RepairOutcome::Fallback {
                    original: bar.clone(),
                    failure: RepairFailure {
                        date: bar.date.clone(),
                        reason,
                        error: e.to_string(),
                    },
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use pricewatch_core::InterpolationMethod;

    fn normal(date: &str, close: f64) -> PriceBar {
        PriceBar::new(date, close, close * 1.01, close * 0.99, close)
    }

    fn abnormal(date: &str) -> PriceBar {
        PriceBar::new(date, 44050.53, 44497.59, 44050.53, 44458.62)
    }

    #[test]
    fn test_empty_batch() {
        let validator = PriceValidator::default();
        let report = validator.validate_and_repair(&[], &[]);

        assert!(report.bars.is_empty());
        assert!(report.logs.is_empty());
        assert!(report.is_clean());
        assert_eq!(report.flagged_fraction(), 0.0);
    }

    #[test]
    fn test_valid_batch_passes_through() {
        let validator = PriceValidator::default();
        let batch = vec![normal("2025-08-10", 47.0), normal("2025-08-11", 47.5)];

        let report = validator.validate_and_repair(&batch, &[]);

        assert_eq!(report.bars, batch);
        assert!(report.is_clean());
    }

    #[test]
    fn test_spike_is_interpolated() {
        let validator = PriceValidator::default();
        let batch = vec![
            normal("2025-08-10", 47.0),
            abnormal("2025-08-11"),
            normal("2025-08-12", 46.7),
        ];

        let report = validator.validate_and_repair(&batch, &[]);

        assert_eq!(report.bars.len(), 3);
        assert_eq!(report.repaired_count(), 1);
        let log = &report.logs[0];
        assert_eq!(log.reason, FailureReason::SpikeDetected);
        assert_eq!(log.method, InterpolationMethod::Linear);
        assert_abs_diff_eq!(report.bars[1].close, 46.85, epsilon = 1e-9);
        assert_abs_diff_eq!(log.interpolated_close, report.bars[1].close);
    }

    #[test]
    fn test_first_bar_invalid_uses_backward_fill() {
        let validator = PriceValidator::default();
        let batch = vec![
            PriceBar::new("2025-08-10", 50.0, 45.0, 48.0, 52.0),
            normal("2025-08-11", 47.0),
        ];

        let report = validator.validate_and_repair(&batch, &[]);

        assert_eq!(report.logs[0].method, InterpolationMethod::BackwardFill);
        assert_eq!(report.logs[0].reason, FailureReason::HighBelowLow);
        assert_eq!(report.bars[0].close, 47.0);
        assert_eq!(report.bars[0].date, "2025-08-10");
    }

    #[test]
    fn test_interpolation_failure_keeps_original() {
        let validator = PriceValidator::default();
        let batch = vec![
            normal("2025-08-10", 47.0),
            abnormal("2025-08-11x"),
            normal("2025-08-12", 46.7),
        ];

        let report = validator.validate_and_repair(&batch, &[]);

        assert_eq!(report.bars.len(), 3);
        assert_eq!(report.bars[1], batch[1]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].date, "2025-08-11x");
        assert_eq!(report.failures[0].reason, FailureReason::SpikeDetected);
        assert!(report.logs.iter().all(|log| log.date != "2025-08-11x"));
    }

    #[test]
    fn test_unrepaired_bar_is_not_an_anchor() {
        let validator = PriceValidator::default();
        let batch = vec![
            normal("2025-08-10", 47.0),
            abnormal("2025-08-11x"),
            normal("2025-08-12", 46.7),
        ];

        let report = validator.validate_and_repair(&batch, &[]);

        // The kept spike makes the next day look like a crash, but the
        // repair must come from the last trusted bar.
        assert_eq!(report.logs.len(), 1);
        assert_eq!(report.logs[0].date, "2025-08-12");
        assert_eq!(report.logs[0].method, InterpolationMethod::ForwardFill);
        assert_eq!(report.bars[2].close, 47.0);
    }

    #[test]
    fn test_series_desc_round_trips_order() {
        let validator = PriceValidator::default();
        let desc = vec![
            normal("2025-08-12", 46.7),
            abnormal("2025-08-11"),
            normal("2025-08-10", 47.0),
        ];

        let report = validator.validate_series_desc(&desc, &[]);

        let dates: Vec<&str> = report.bars.iter().map(|b| b.date.as_str()).collect();
        assert_eq!(dates, ["2025-08-12", "2025-08-11", "2025-08-10"]);
        assert_abs_diff_eq!(report.bars[1].close, 46.85, epsilon = 1e-9);
        assert_eq!(report.logs[0].reason, FailureReason::SpikeDetected);
    }

    #[test]
    fn test_report_serializes() {
        let validator = PriceValidator::default();
        let report = validator.validate_and_repair(&[abnormal("2025-08-11")], &[]);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["logs"][0]["method"], "no_interpolation");
        assert_eq!(json["logs"][0]["reason"], "absolute_bound_exceeded");
    }
}
