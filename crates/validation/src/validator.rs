//! Combined structural and statistical validation.

use pricewatch_core::{config::ValidationConfig, Config, InterpolationMethod, PriceBar, Result, Verdict};

use crate::{interpolator, statistical::StatisticalValidator, structural::check_structure};

/// Validates bars and repairs the ones that fail.
///
/// Holds only immutable thresholds, so one instance can be shared across
/// threads validating different instruments.
#[derive(Debug, Clone, Default)]
pub struct PriceValidator {
    statistical: StatisticalValidator,
}

impl PriceValidator {
    /// Create a new validator, rejecting nonsensical thresholds.
    pub fn new(config: ValidationConfig) -> Result<Self> {
        Ok(Self {
            statistical: StatisticalValidator::new(config)?,
        })
    }

    /// Create a validator from the full system configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.validation.clone())
    }

    /// Get the configuration.
    pub fn config(&self) -> &ValidationConfig {
        self.statistical.config()
    }

    /// Structural check followed by the statistical check.
    pub fn validate(&self, bar: &PriceBar, previous: Option<&PriceBar>, context: &[PriceBar]) -> Verdict {
        check_structure(bar).and_then(|| self.statistical.check(bar, previous, context))
    }

    /// Build a replacement for a rejected bar.
    pub fn interpolate(
        &self,
        bar: &PriceBar,
        before: Option<&PriceBar>,
        after: Option<&PriceBar>,
    ) -> Result<(PriceBar, InterpolationMethod)> {
        interpolator::interpolate(bar, before, after)
    }
}
