//! Core data types for the pricewatch system.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Date format used for bar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Daily OHLCV bar for one instrument.
///
/// Dates are ISO-8601 calendar days (`YYYY-MM-DD`), so string ordering
/// matches chronological ordering for well-formed dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// Trading day.
    pub date: String,
    /// Open price.
    pub open: f64,
    /// High price.
    pub high: f64,
    /// Low price.
    pub low: f64,
    /// Close price.
    pub close: f64,
    /// Traded volume, when the feed reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<i64>,
}

impl PriceBar {
    /// Create a bar without volume.
    pub fn new(date: impl Into<String>, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            date: date.into(),
            open,
            high,
            low,
            close,
            volume: None,
        }
    }

    /// Attach a volume.
    pub fn with_volume(mut self, volume: i64) -> Self {
        self.volume = Some(volume);
        self
    }

    /// Parse the bar date.
    pub fn day(&self) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, DATE_FORMAT)
            .map_err(|e| Error::invalid_date(&self.date, e))
    }

    /// Check `high >= open, close, low` and `low <= open, close, high`.
    #[inline]
    pub fn is_consistent(&self) -> bool {
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
    }

    /// Widen high/low so the bar satisfies the OHLC invariant.
    pub fn enforce_consistency(&mut self) {
        self.high = self.high.max(self.open).max(self.close);
        self.low = self.low.min(self.open).min(self.close);
        if self.high < self.low {
            self.high = self.low;
        }
    }
}

/// Why a bar was rejected.
///
/// The string codes are stable and appear in repair logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    HighBelowLow,
    HighBelowOpen,
    HighBelowClose,
    LowAboveOpen,
    LowAboveClose,
    /// Day-over-day increase above the spike threshold.
    SpikeDetected,
    /// Day-over-day decrease below the crash threshold.
    CrashDetected,
    /// Close above the trailing-average multiple.
    PriceTooHigh,
    /// Close below the trailing-average fraction.
    PriceTooLow,
    /// Close above the absolute ceiling (no context available).
    AbsoluteBoundExceeded,
    /// Close below the absolute floor (no context available).
    AbsoluteBoundBelowMinimum,
}

impl FailureReason {
    /// Stable code for this reason.
    pub fn as_str(self) -> &'static str {
        match self {
            FailureReason::HighBelowLow => "high_below_low",
            FailureReason::HighBelowOpen => "high_below_open",
            FailureReason::HighBelowClose => "high_below_close",
            FailureReason::LowAboveOpen => "low_above_open",
            FailureReason::LowAboveClose => "low_above_close",
            FailureReason::SpikeDetected => "spike_detected",
            FailureReason::CrashDetected => "crash_detected",
            FailureReason::PriceTooHigh => "price_too_high",
            FailureReason::PriceTooLow => "price_too_low",
            FailureReason::AbsoluteBoundExceeded => "absolute_bound_exceeded",
            FailureReason::AbsoluteBoundBelowMinimum => "absolute_bound_below_minimum",
        }
    }

    /// Is this an OHLC consistency failure?
    pub fn is_structural(self) -> bool {
        matches!(
            self,
            FailureReason::HighBelowLow
                | FailureReason::HighBelowOpen
                | FailureReason::HighBelowClose
                | FailureReason::LowAboveOpen
                | FailureReason::LowAboveClose
        )
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of validating one bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    Invalid(FailureReason),
}

impl Verdict {
    /// Did the bar pass?
    #[inline]
    pub fn is_valid(self) -> bool {
        matches!(self, Verdict::Valid)
    }

    /// The failure reason, if any.
    #[inline]
    pub fn reason(self) -> Option<FailureReason> {
        match self {
            Verdict::Valid => None,
            Verdict::Invalid(reason) => Some(reason),
        }
    }

    /// Chain another check, evaluated only if this one passed.
    #[inline]
    pub fn and_then(self, next: impl FnOnce() -> Verdict) -> Verdict {
        match self {
            Verdict::Valid => next(),
            invalid => invalid,
        }
    }
}

/// Repair strategy applied to a rejected bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationMethod {
    /// Time-weighted blend of the surrounding anchors.
    Linear,
    /// Copy of the nearest earlier anchor.
    ForwardFill,
    /// Copy of the nearest later anchor.
    BackwardFill,
    /// No anchors; original bar with its range repaired.
    NoInterpolation,
}

impl InterpolationMethod {
    /// Pick the strategy from anchor availability.
    pub fn select(has_before: bool, has_after: bool) -> Self {
        match (has_before, has_after) {
            (true, true) => InterpolationMethod::Linear,
            (true, false) => InterpolationMethod::ForwardFill,
            (false, true) => InterpolationMethod::BackwardFill,
            (false, false) => InterpolationMethod::NoInterpolation,
        }
    }

    /// Stable code for this method.
    pub fn as_str(self) -> &'static str {
        match self {
            InterpolationMethod::Linear => "linear",
            InterpolationMethod::ForwardFill => "forward_fill",
            InterpolationMethod::BackwardFill => "backward_fill",
            InterpolationMethod::NoInterpolation => "no_interpolation",
        }
    }
}

impl fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record of one repaired bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairLog {
    /// Date of the repaired bar.
    pub date: String,
    /// Close as received.
    pub original_close: f64,
    /// Close after repair.
    pub interpolated_close: f64,
    /// Strategy used.
    pub method: InterpolationMethod,
    /// Validation failure that triggered the repair.
    pub reason: FailureReason,
}
