//! Reconstruction of rejected bars from neighbouring anchors.
//!
//! The strategy is chosen only from which anchors exist:
//!
//! | before | after | method             |
//! |--------|-------|--------------------|
//! | yes    | yes   | `Linear`           |
//! | yes    | no    | `ForwardFill`      |
//! | no     | yes   | `BackwardFill`     |
//! | no     | no    | `NoInterpolation`  |

use pricewatch_core::{Error, InterpolationMethod, PriceBar, Result};

/// Produce a replacement for `bar`.
///
/// `before` must be dated earlier than `bar` and `after` later. Date and
/// volume always come from the original bar.
pub fn interpolate(
    bar: &PriceBar,
    before: Option<&PriceBar>,
    after: Option<&PriceBar>,
) -> Result<(PriceBar, InterpolationMethod)> {
    let method = InterpolationMethod::select(before.is_some(), after.is_some());

    let repaired = match (before, after) {
        (Some(before), Some(after)) => linear(bar, before, after)?,
        (Some(anchor), None) | (None, Some(anchor)) => fill_from(bar, anchor),
        (None, None) => {
            let mut repaired = bar.clone();
            repaired.enforce_consistency();
            repaired
        }
    };

    Ok((repaired, method))
}

/// Copy the anchor's prices onto the original date and volume.
fn fill_from(bar: &PriceBar, anchor: &PriceBar) -> PriceBar {
    PriceBar {
        date: bar.date.clone(),
        open: anchor.open,
        high: anchor.high,
        low: anchor.low,
        close: anchor.close,
        volume: bar.volume,
    }
}

/// Time-weighted close with open/high/low rebuilt from the anchors' ratios.
fn linear(bar: &PriceBar, before: &PriceBar, after: &PriceBar) -> Result<PriceBar> {
    let day = bar.day()?;
    let before_day = before.day()?;
    let after_day = after.day()?;

    let elapsed = (day - before_day).num_days() as f64;
    let span = (after_day - before_day).num_days();
    if span <= 0 {
        return Err(Error::non_positive_span(&before.date, &after.date));
    }

    let close = before.close + (after.close - before.close) * (elapsed / span as f64);

    let open_ratio = mean_ratio(before, after, |b| b.open);
    let high_ratio = mean_ratio(before, after, |b| b.high);
    let low_ratio = mean_ratio(before, after, |b| b.low);

    let open = close * open_ratio;
    let high = (close * high_ratio).max(open).max(close);
    let low = (close * low_ratio).min(open).min(close);

    Ok(PriceBar {
        date: bar.date.clone(),
        open,
        high,
        low,
        close,
        volume: bar.volume,
    })
}

/// Average of `field / close` across both anchors.
///
/// An anchor with a non-positive close contributes a neutral ratio of 1.
fn mean_ratio(before: &PriceBar, after: &PriceBar, field: impl Fn(&PriceBar) -> f64) -> f64 {
    let ratio = |b: &PriceBar| {
        if b.close > 0.0 {
            field(b) / b.close
        } else {
            1.0
        }
    };
    (ratio(before) + ratio(after)) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn anomalous() -> PriceBar {
        PriceBar::new("2025-08-11", 44050.53, 44497.59, 44050.53, 44458.62).with_volume(1_285_994)
    }

    #[test]
    fn test_linear() {
        let before = PriceBar::new("2025-08-09", 46.0, 48.0, 45.0, 47.0);
        let after = PriceBar::new("2025-08-12", 47.2, 47.3, 46.6, 46.7);

        let (repaired, method) = interpolate(&anomalous(), Some(&before), Some(&after)).unwrap();

        assert_eq!(method, InterpolationMethod::Linear);
        let expected = 47.0 + (46.7 - 47.0) * (2.0 / 3.0);
        assert_abs_diff_eq!(repaired.close, expected, epsilon = 1e-9);
        assert_abs_diff_eq!(repaired.close, 46.8, epsilon = 0.1);
        assert!(repaired.high > repaired.close);
        assert!(repaired.low < repaired.close);
        assert!(repaired.high > repaired.low);
        assert!(repaired.is_consistent());
        assert_eq!(repaired.date, "2025-08-11");
        assert_eq!(repaired.volume, Some(1_285_994));
    }

    #[test]
    fn test_linear_clamps_range() {
        // Anchors whose high sits below open produce a ratio that must be clamped.
        let before = PriceBar::new("2025-08-09", 12.0, 10.0, 9.0, 10.0);
        let after = PriceBar::new("2025-08-13", 12.0, 10.0, 9.0, 10.0);

        let (repaired, _) = interpolate(&anomalous(), Some(&before), Some(&after)).unwrap();

        assert!(repaired.is_consistent());
        assert_abs_diff_eq!(repaired.high, repaired.open, epsilon = 1e-12);
    }

    #[test]
    fn test_linear_rejects_non_positive_span() {
        let before = PriceBar::new("2025-08-12", 46.0, 48.0, 45.0, 47.0);
        let after = PriceBar::new("2025-08-12", 47.2, 47.3, 46.6, 46.7);

        let err = interpolate(&anomalous(), Some(&before), Some(&after)).unwrap_err();
        assert!(matches!(err, Error::NonPositiveSpan { .. }));
    }

    #[test]
    fn test_linear_rejects_malformed_date() {
        let before = PriceBar::new("2025-08-09", 46.0, 48.0, 45.0, 47.0);
        let after = PriceBar::new("12.08.2025", 47.2, 47.3, 46.6, 46.7);

        let err = interpolate(&anomalous(), Some(&before), Some(&after)).unwrap_err();
        assert!(matches!(err, Error::InvalidDate { .. }));
    }

    #[test]
    fn test_forward_fill() {
        let before = PriceBar::new("2025-08-10", 46.0, 48.0, 45.0, 47.0);

        let (repaired, method) = interpolate(&anomalous(), Some(&before), None).unwrap();

        assert_eq!(method, InterpolationMethod::ForwardFill);
        assert_eq!(repaired.open, 46.0);
        assert_eq!(repaired.high, 48.0);
        assert_eq!(repaired.low, 45.0);
        assert_eq!(repaired.close, 47.0);
        assert_eq!(repaired.date, "2025-08-11");
        assert_eq!(repaired.volume, Some(1_285_994));
    }

    #[test]
    fn test_backward_fill() {
        let after = PriceBar::new("2025-08-12", 47.2, 47.3, 46.6, 46.7);

        let (repaired, method) = interpolate(&anomalous(), None, Some(&after)).unwrap();

        assert_eq!(method, InterpolationMethod::BackwardFill);
        assert_eq!(repaired.open, 47.2);
        assert_eq!(repaired.high, 47.3);
        assert_eq!(repaired.low, 46.6);
        assert_eq!(repaired.close, 46.7);
        assert_eq!(repaired.volume, Some(1_285_994));
    }

    #[test]
    fn test_fill_ignores_malformed_dates() {
        let mut bar = anomalous();
        bar.date = "not-a-date".to_string();
        let before = PriceBar::new("2025-08-10", 46.0, 48.0, 45.0, 47.0);

        let (repaired, method) = interpolate(&bar, Some(&before), None).unwrap();
        assert_eq!(method, InterpolationMethod::ForwardFill);
        assert_eq!(repaired.date, "not-a-date");
    }

    #[test]
    fn test_no_interpolation() {
        let (repaired, method) = interpolate(&anomalous(), None, None).unwrap();

        assert_eq!(method, InterpolationMethod::NoInterpolation);
        assert_eq!(repaired.close, 44458.62);
        assert!(repaired.is_consistent());
    }

    #[test]
    fn test_no_interpolation_restores_consistency() {
        let broken = PriceBar::new("2025-01-15", 50.0, 45.0, 48.0, 52.0);

        let (repaired, method) = interpolate(&broken, None, None).unwrap();

        assert_eq!(method, InterpolationMethod::NoInterpolation);
        assert_eq!(repaired.close, 52.0);
        assert_eq!(repaired.high, 52.0);
        assert_eq!(repaired.low, 48.0);
        assert!(repaired.is_consistent());
    }
}
