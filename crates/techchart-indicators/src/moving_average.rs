//! Moving average indicators and exponential smoothing kernels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use techchart_core::error::IndicatorError;
use techchart_core::traits::Indicator;
use techchart_core::types::Column;

use crate::simd::dot_product_simd;
use crate::window::{rolling_mean, rolling_mean_partial};

pub(crate) fn check_period(name: &str, period: usize) -> Result<(), IndicatorError> {
    if period == 0 {
        return Err(IndicatorError::InvalidParameter(format!(
            "{} period must be greater than 0",
            name
        )));
    }
    Ok(())
}

/// Recursive exponential smoothing seeded with the first value:
/// `s[0] = x[0]`, `s[i] = alpha * x[i] + (1 - alpha) * s[i-1]`.
pub fn exp_smooth(data: &[f64], alpha: f64) -> Vec<f64> {
    let mut result = Vec::with_capacity(data.len());
    let one_minus = 1.0 - alpha;
    let mut state: Option<f64> = None;

    for &value in data {
        let next = match state {
            Some(prev) => alpha * value + one_minus * prev,
            None => value,
        };
        state = Some(next);
        result.push(next);
    }

    result
}

/// Exponential smoothing over a column with gaps.
///
/// Smoothing starts at the first defined value; later gaps carry the previous
/// smoothed value forward.
pub fn exp_smooth_options(values: &[Option<f64>], alpha: f64) -> Column {
    let one_minus = 1.0 - alpha;
    let mut state: Option<f64> = None;

    values
        .iter()
        .map(|value| {
            if let Some(x) = value {
                state = Some(match state {
                    Some(prev) => alpha * x + one_minus * prev,
                    None => *x,
                });
            }
            state
        })
        .collect()
}

/// Smoothing factor of an EMA with the given span.
#[inline]
pub fn ema_alpha(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

/// EMA with smoothing factor `2 / (span + 1)`, defined from the first bar.
pub fn ema_series(data: &[f64], span: usize) -> Vec<f64> {
    exp_smooth(data, ema_alpha(span))
}

/// Wilder smoothing (factor `1 / period`), defined from the first bar.
pub fn wilder_series(data: &[f64], period: usize) -> Vec<f64> {
    exp_smooth(data, 1.0 / period as f64)
}

/// Moving average flavour used by envelope and deviation-rate indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaType {
    Sma,
    Ema,
}

impl MaType {
    /// Apply this moving average. The SMA needs a full window; the EMA is
    /// defined from the first bar.
    pub fn apply(self, data: &[f64], period: usize) -> Column {
        match self {
            MaType::Sma => rolling_mean(data, period),
            MaType::Ema => ema_series(data, period).into_iter().map(Some).collect(),
        }
    }
}

impl FromStr for MaType {
    type Err = IndicatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sma" => Ok(MaType::Sma),
            "ema" => Ok(MaType::Ema),
            other => Err(IndicatorError::InvalidParameter(format!(
                "ma_type must be 'sma' or 'ema', got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for MaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaType::Sma => write!(f, "sma"),
            MaType::Ema => write!(f, "ema"),
        }
    }
}

/// Simple Moving Average (SMA).
///
/// Calculates the arithmetic mean of the last N values. Until N values exist
/// the mean of all values so far is used, so every position is defined.
#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
}

impl Sma {
    /// Create a new SMA with the specified period.
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        check_period("SMA", period)?;
        Ok(Self { period })
    }
}

impl Indicator for Sma {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Result<Vec<f64>, IndicatorError> {
        self.validate_data(data)?;
        Ok(rolling_mean_partial(data, self.period))
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "SMA"
    }
}

/// Exponential Moving Average (EMA).
///
/// Gives more weight to recent prices using an exponential decay. Seeded
/// with the first price, so every position is defined.
#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    multiplier: f64,
}

impl Ema {
    /// Create a new EMA with the specified period.
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        check_period("EMA", period)?;
        Ok(Self {
            period,
            multiplier: ema_alpha(period),
        })
    }
}

impl Indicator for Ema {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Result<Vec<f64>, IndicatorError> {
        self.validate_data(data)?;
        Ok(exp_smooth(data, self.multiplier))
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "EMA"
    }
}

/// Weighted Moving Average (WMA).
///
/// Gives linearly decreasing weights to older prices.
#[derive(Debug, Clone)]
pub struct Wma {
    period: usize,
    weights: Vec<f64>,
    weights_sum: f64,
}

impl Wma {
    /// Create a new WMA with the specified period.
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        check_period("WMA", period)?;
        let weights: Vec<f64> = (1..=period).map(|w| w as f64).collect();
        // Sum of weights: 1 + 2 + ... + n = n(n+1)/2
        let weights_sum = (period * (period + 1)) as f64 / 2.0;
        Ok(Self {
            period,
            weights,
            weights_sum,
        })
    }

    /// WMA over a column with gaps; a gap inside the window yields `None`.
    pub fn calculate_options(&self, values: &[Option<f64>]) -> Column {
        let mut buf = Vec::with_capacity(self.period);
        (0..values.len())
            .map(|i| {
                if i + 1 < self.period {
                    return None;
                }
                buf.clear();
                for v in &values[i + 1 - self.period..=i] {
                    buf.push((*v)?);
                }
                Some(dot_product_simd(&buf, &self.weights) / self.weights_sum)
            })
            .collect()
    }
}

impl Indicator for Wma {
    type Output = Option<f64>;

    fn calculate(&self, data: &[f64]) -> Result<Column, IndicatorError> {
        self.validate_data(data)?;
        let values: Column = data.iter().copied().map(Some).collect();
        Ok(self.calculate_options(&values))
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "WMA"
    }
}
