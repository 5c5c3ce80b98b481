//! Indicator trait definitions.

use crate::error::IndicatorError;
use crate::types::BaseSeries;

/// Trait for indicators computed from a single numeric series
/// (typically closes).
///
/// Implementations are pure: the output is aligned 1:1 with the input and
/// depends only on the input and the indicator's own parameters.
pub trait Indicator: Send + Sync {
    /// The per-bar output type of the indicator.
    type Output;

    /// Calculate indicator values for the given data.
    ///
    /// # Arguments
    /// * `data` - Input data (typically prices)
    ///
    /// # Returns
    /// One output per input point
    fn calculate(&self, data: &[f64]) -> Result<Vec<Self::Output>, IndicatorError>;

    /// Get the minimum data points required.
    fn period(&self) -> usize;

    /// Get the name of the indicator.
    fn name(&self) -> &str;

    /// Validate that there's enough data.
    fn validate_data(&self, data: &[f64]) -> Result<(), IndicatorError> {
        if data.len() < self.period() {
            return Err(IndicatorError::InsufficientData {
                required: self.period(),
                available: data.len(),
            });
        }
        Ok(())
    }
}

/// Indicator that uses all bar data (not just close).
pub trait OhlcvIndicator: Send + Sync {
    /// The per-bar output type of the indicator.
    type Output;

    /// Calculate indicator values from a base series.
    fn calculate(&self, series: &BaseSeries) -> Result<Vec<Self::Output>, IndicatorError>;

    /// Get the minimum bars required.
    fn period(&self) -> usize;

    /// Get the name of the indicator.
    fn name(&self) -> &str;

    /// Validate that there are enough bars.
    fn validate_series(&self, series: &BaseSeries) -> Result<(), IndicatorError> {
        if series.len() < self.period() {
            return Err(IndicatorError::InsufficientData {
                required: self.period(),
                available: series.len(),
            });
        }
        Ok(())
    }
}
