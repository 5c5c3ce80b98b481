//! Price channels and overlays drawn on the price chart.

use serde::{Deserialize, Serialize};
use techchart_core::error::IndicatorError;
use techchart_core::traits::{Indicator, OhlcvIndicator};
use techchart_core::types::{BaseSeries, Column};

use crate::moving_average::{check_period, ema_series, MaType};
use crate::volatility::atr_series;
use crate::window::{rolling_max, rolling_min, shift_backward, shift_forward, zip_with};

/// Upper/middle/lower band triple shared by channel indicators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelOutput {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Midpoint of the rolling highest high and lowest low.
fn rolling_midpoint(highs: &[f64], lows: &[f64], period: usize) -> Column {
    zip_with(&rolling_max(highs, period), &rolling_min(lows, period), |h, l| {
        (h + l) / 2.0
    })
}

/// Ichimoku Kinko Hyo output for one bar.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct IchimokuOutput {
    pub tenkan_sen: Option<f64>,
    pub kijun_sen: Option<f64>,
    /// Leading span A, displaced forward
    pub senkou_span_a: Option<f64>,
    /// Leading span B, displaced forward
    pub senkou_span_b: Option<f64>,
    /// Lagging span: the close `chikou_period` bars later
    pub chikou_span: Option<f64>,
}

/// Ichimoku Kinko Hyo.
///
/// The leading spans at bar `i` hold the value computed at `i - senkou_shift`.
/// The lagging span at bar `i` holds `close[i + chikou_period]`.
#[derive(Debug, Clone)]
pub struct Ichimoku {
    tenkan_period: usize,
    kijun_period: usize,
    senkou_b_period: usize,
    chikou_period: usize,
    senkou_shift: usize,
}

impl Ichimoku {
    /// Create Ichimoku with the classic parameters (9, 26, 52, 26, 26).
    pub fn new() -> Self {
        Self {
            tenkan_period: 9,
            kijun_period: 26,
            senkou_b_period: 52,
            chikou_period: 26,
            senkou_shift: 26,
        }
    }

    pub fn with_params(
        tenkan_period: usize,
        kijun_period: usize,
        senkou_b_period: usize,
        chikou_period: usize,
        senkou_shift: usize,
    ) -> Result<Self, IndicatorError> {
        check_period("Ichimoku tenkan", tenkan_period)?;
        check_period("Ichimoku kijun", kijun_period)?;
        check_period("Ichimoku senkou B", senkou_b_period)?;
        Ok(Self {
            tenkan_period,
            kijun_period,
            senkou_b_period,
            chikou_period,
            senkou_shift,
        })
    }
}

impl Default for Ichimoku {
    fn default() -> Self {
        Self::new()
    }
}

impl OhlcvIndicator for Ichimoku {
    type Output = IchimokuOutput;

    fn calculate(&self, series: &BaseSeries) -> Result<Vec<IchimokuOutput>, IndicatorError> {
        self.validate_series(series)?;

        let highs = series.highs();
        let lows = series.lows();
        let closes: Column = series.closes().into_iter().map(Some).collect();

        let tenkan = rolling_midpoint(&highs, &lows, self.tenkan_period);
        let kijun = rolling_midpoint(&highs, &lows, self.kijun_period);
        let span_a = zip_with(&tenkan, &kijun, |t, k| (t + k) / 2.0);
        let span_b = rolling_midpoint(&highs, &lows, self.senkou_b_period);

        let senkou_a = shift_forward(&span_a, self.senkou_shift);
        let senkou_b = shift_forward(&span_b, self.senkou_shift);
        let chikou = shift_backward(&closes, self.chikou_period);

        Ok((0..series.len())
            .map(|i| IchimokuOutput {
                tenkan_sen: tenkan[i],
                kijun_sen: kijun[i],
                senkou_span_a: senkou_a[i],
                senkou_span_b: senkou_b[i],
                chikou_span: chikou[i],
            })
            .collect())
    }

    fn period(&self) -> usize {
        self.tenkan_period
            .max(self.kijun_period)
            .max(self.senkou_b_period)
    }

    fn name(&self) -> &str {
        "Ichimoku"
    }
}

/// Donchian Channel: rolling highest high, lowest low and their midpoint.
#[derive(Debug, Clone)]
pub struct Donchian {
    period: usize,
}

impl Donchian {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        check_period("Donchian", period)?;
        Ok(Self { period })
    }
}

impl OhlcvIndicator for Donchian {
    type Output = Option<ChannelOutput>;

    fn calculate(&self, series: &BaseSeries) -> Result<Vec<Option<ChannelOutput>>, IndicatorError> {
        self.validate_series(series)?;

        let upper = rolling_max(&series.highs(), self.period);
        let lower = rolling_min(&series.lows(), self.period);

        Ok(upper
            .iter()
            .zip(lower.iter())
            .map(|(u, l)| {
                let (upper, lower) = ((*u)?, (*l)?);
                Some(ChannelOutput {
                    upper,
                    middle: (upper + lower) / 2.0,
                    lower,
                })
            })
            .collect())
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "Donchian Channel"
    }
}

/// Keltner Channels.
///
/// EMA middle line with bands at a multiple of the canonical ATR. The ATR is
/// always computed here from the series itself.
#[derive(Debug, Clone)]
pub struct KeltnerChannels {
    ema_period: usize,
    atr_period: usize,
    atr_multiplier: f64,
}

impl KeltnerChannels {
    /// Create Keltner Channels with default parameters (20, 10, 2.0).
    pub fn new() -> Self {
        Self {
            ema_period: 20,
            atr_period: 10,
            atr_multiplier: 2.0,
        }
    }

    pub fn with_params(ema_period: usize, atr_period: usize, atr_multiplier: f64) -> Result<Self, IndicatorError> {
        check_period("Keltner EMA", ema_period)?;
        check_period("Keltner ATR", atr_period)?;
        if !(atr_multiplier.is_finite() && atr_multiplier >= 0.0) {
            return Err(IndicatorError::InvalidParameter(format!(
                "Keltner ATR multiplier must be non-negative, got {}",
                atr_multiplier
            )));
        }
        Ok(Self {
            ema_period,
            atr_period,
            atr_multiplier,
        })
    }
}

impl Default for KeltnerChannels {
    fn default() -> Self {
        Self::new()
    }
}

impl OhlcvIndicator for KeltnerChannels {
    type Output = ChannelOutput;

    fn calculate(&self, series: &BaseSeries) -> Result<Vec<ChannelOutput>, IndicatorError> {
        self.validate_series(series)?;

        let middle = ema_series(&series.closes(), self.ema_period);
        let atr = atr_series(series, self.atr_period);

        Ok(middle
            .iter()
            .zip(atr.iter())
            .map(|(&mid, &atr)| {
                let offset = self.atr_multiplier * atr;
                ChannelOutput {
                    upper: mid + offset,
                    middle: mid,
                    lower: mid - offset,
                }
            })
            .collect())
    }

    fn period(&self) -> usize {
        self.ema_period.max(self.atr_period)
    }

    fn name(&self) -> &str {
        "Keltner Channels"
    }
}

/// Moving Average Envelope: MA scaled up and down by a percentage.
#[derive(Debug, Clone)]
pub struct MaEnvelope {
    period: usize,
    percentage: f64,
    ma_type: MaType,
}

impl MaEnvelope {
    /// `percentage` is in percent: 2.5 puts the bands 2.5% from the MA.
    pub fn new(period: usize, percentage: f64, ma_type: MaType) -> Result<Self, IndicatorError> {
        check_period("MA Envelope", period)?;
        if !(percentage.is_finite() && percentage >= 0.0) {
            return Err(IndicatorError::InvalidParameter(format!(
                "envelope percentage must be non-negative, got {}",
                percentage
            )));
        }
        Ok(Self {
            period,
            percentage,
            ma_type,
        })
    }
}

impl Indicator for MaEnvelope {
    type Output = Option<ChannelOutput>;

    fn calculate(&self, data: &[f64]) -> Result<Vec<Option<ChannelOutput>>, IndicatorError> {
        self.validate_data(data)?;

        let ratio = self.percentage / 100.0;
        Ok(self
            .ma_type
            .apply(data, self.period)
            .into_iter()
            .map(|mid| {
                mid.map(|middle| ChannelOutput {
                    upper: middle * (1.0 + ratio),
                    middle,
                    lower: middle * (1.0 - ratio),
                })
            })
            .collect())
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "MA Envelope"
    }
}

/// Classic floor-trader pivot levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PivotLevels {
    pub pivot: f64,
    pub r1: f64,
    pub s1: f64,
    pub r2: f64,
    pub s2: f64,
    pub r3: f64,
    pub s3: f64,
}

impl PivotLevels {
    /// Levels derived from one bar's high, low and close.
    pub fn from_hlc(high: f64, low: f64, close: f64) -> Self {
        let pivot = (high + low + close) / 3.0;
        Self {
            pivot,
            r1: 2.0 * pivot - low,
            s1: 2.0 * pivot - high,
            r2: pivot + (high - low),
            s2: pivot - (high - low),
            r3: high + 2.0 * (pivot - low),
            s3: low - 2.0 * (high - pivot),
        }
    }
}

/// Pivot points for each bar, computed from the previous bar.
#[derive(Debug, Clone, Default)]
pub struct PivotPoints;

impl OhlcvIndicator for PivotPoints {
    type Output = Option<PivotLevels>;

    fn calculate(&self, series: &BaseSeries) -> Result<Vec<Option<PivotLevels>>, IndicatorError> {
        self.validate_series(series)?;

        let bars = series.bars();
        Ok((0..bars.len())
            .map(|i| {
                let prev = bars.get(i.checked_sub(1)?)?;
                Some(PivotLevels::from_hlc(prev.high, prev.low, prev.close))
            })
            .collect())
    }

    fn period(&self) -> usize {
        1
    }

    fn name(&self) -> &str {
        "Pivot Points"
    }
}
