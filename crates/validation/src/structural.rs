//! OHLC consistency checks for a single bar.

use pricewatch_core::{FailureReason, PriceBar, Verdict};

/// Check the internal consistency of a bar.
///
/// Rules are evaluated in a fixed order and the first violation wins, so a
/// bar breaking several rules always reports the same reason.
pub fn check_structure(bar: &PriceBar) -> Verdict {
    let reason = if bar.high < bar.low {
        FailureReason::HighBelowLow
    } else if bar.high < bar.open {
        FailureReason::HighBelowOpen
    } else if bar.high < bar.close {
        FailureReason::HighBelowClose
    } else if bar.low > bar.open {
        FailureReason::LowAboveOpen
    } else if bar.low > bar.close {
        FailureReason::LowAboveClose
    } else {
        return Verdict::Valid;
    };
    Verdict::Invalid(reason)
}
