//! Technical indicator algorithms.
//!
//! Every indicator is a pure struct implementing [`Indicator`] (single series,
//! usually closes) or [`OhlcvIndicator`] (whole bars). Outputs are aligned 1:1
//! with the input; positions that cannot be computed are `None` or the
//! indicator's documented fallback value.
//!
//! Families:
//! - Moving averages (SMA, EMA, WMA) and the exponential smoothing kernels
//! - Momentum oscillators (RSI, MACD, Stochastic, RCI, Coppock, ...)
//! - Directional indicators (DMI/ADX, Aroon, Parabolic SAR)
//! - Price channels (Ichimoku, Donchian, Keltner, MA Envelope, Pivot Points)
//! - Volatility (ATR, Bollinger Bands, Standard Deviation, Mass Index)
//! - Volume (OBV, MFI, VWAP, CMF, EOM)
//!
//! [`Indicator`]: techchart_core::traits::Indicator
//! [`OhlcvIndicator`]: techchart_core::traits::OhlcvIndicator

pub mod channels;
pub mod directional;
pub mod momentum;
pub mod moving_average;
pub mod simd;
pub mod volatility;
pub mod volume;
pub mod window;

pub use channels::{
    ChannelOutput, Donchian, Ichimoku, IchimokuOutput, KeltnerChannels, MaEnvelope, PivotLevels,
    PivotPoints,
};
pub use directional::{
    Aroon, AroonOutput, Dmi, DmiOutput, ParabolicSar, Reversal, SarSeries, SarState, Trend,
};
pub use momentum::{
    Coppock, ForceIndex, Macd, MacdOutput, MaDeviationRate, PsychologicalLine, Rci, Rsi,
    Stochastic, StochasticOutput, WilliamsR,
};
pub use moving_average::{Ema, MaType, Sma, Wma};
pub use volatility::{atr_series, Atr, BollingerBands, BollingerOutput, MassIndex, StdDev};
pub use volume::{Cmf, Eom, Mfi, Obv, Vwap};
