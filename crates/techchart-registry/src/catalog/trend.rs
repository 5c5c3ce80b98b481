//! Trend indicators: moving averages, channels and overlays.

use techchart_core::error::IndicatorError;
use techchart_core::traits::{Indicator, OhlcvIndicator};
use techchart_core::types::{defined, BaseSeries, DerivedColumns, Params};
use techchart_indicators::{
    BollingerBands, Donchian, Ema, Ichimoku, KeltnerChannels, MaEnvelope, MaType, Macd,
    ParabolicSar, Sma,
};

use super::{assemble, field, optional_field, window};
use crate::definition::{Category, IndicatorDefinition, ParamSpec, Placement};

pub(super) fn definitions() -> Vec<IndicatorDefinition> {
    vec![
        IndicatorDefinition {
            key: "sma",
            label: "Simple Moving Average (SMA)",
            category: Category::Trend,
            params: vec![window(20, Some(200))],
            placement: Placement::OnPrice,
            compute: sma,
            columns: sma_columns,
        },
        IndicatorDefinition {
            key: "ema",
            label: "Exponential Moving Average (EMA)",
            category: Category::Trend,
            params: vec![window(20, Some(200))],
            placement: Placement::OnPrice,
            compute: ema,
            columns: ema_columns,
        },
        IndicatorDefinition {
            key: "bollinger",
            label: "Bollinger Bands (2σ & 3σ)",
            category: Category::Trend,
            params: vec![window(20, Some(200))],
            placement: Placement::OnPrice,
            compute: bollinger,
            columns: bollinger_columns,
        },
        IndicatorDefinition {
            key: "ichimoku",
            label: "Ichimoku Cloud",
            category: Category::Trend,
            params: vec![
                ParamSpec::int("tenkan_period", "Conversion line", 9, 1, Some(200)),
                ParamSpec::int("kijun_period", "Base line", 26, 1, Some(200)),
                ParamSpec::int("senkou_b_period", "Leading span B", 52, 1, Some(200)),
                ParamSpec::int("chikou_period", "Lagging span", 26, 0, Some(200)),
                ParamSpec::int("senkou_shift", "Leading shift", 26, 0, Some(200)),
            ],
            placement: Placement::OnPrice,
            compute: ichimoku,
            columns: ichimoku_columns,
        },
        IndicatorDefinition {
            key: "psar",
            label: "Parabolic SAR",
            category: Category::Trend,
            params: vec![
                ParamSpec::float("initial_af", "Initial AF", 0.02, 0.01, 0.2, 0.01),
                ParamSpec::float("af_increment", "AF increment", 0.02, 0.01, 0.2, 0.01),
                ParamSpec::float("max_af", "Maximum AF", 0.2, 0.1, 1.0, 0.05),
            ],
            placement: Placement::OnPrice,
            compute: psar,
            columns: psar_columns,
        },
        IndicatorDefinition {
            key: "ma_envelope",
            label: "Moving Average Envelope",
            category: Category::Trend,
            params: vec![
                window(20, Some(200)),
                ParamSpec::float("percentage", "Deviation (%)", 2.5, 0.1, 50.0, 0.1),
                ParamSpec::choice("ma_type", "Moving average", "sma", &["sma", "ema"]),
            ],
            placement: Placement::OnPrice,
            compute: ma_envelope,
            columns: ma_envelope_columns,
        },
        IndicatorDefinition {
            key: "donchian",
            label: "Donchian Channel",
            category: Category::Trend,
            params: vec![window(20, Some(200))],
            placement: Placement::OnPrice,
            compute: donchian,
            columns: donchian_columns,
        },
        IndicatorDefinition {
            key: "keltner",
            label: "Keltner Channels",
            category: Category::Trend,
            params: vec![
                ParamSpec::int("ema_window", "EMA window", 20, 1, Some(100)),
                ParamSpec::int("atr_window", "ATR window", 10, 1, Some(100)),
                ParamSpec::float("atr_multiplier", "ATR multiplier", 2.0, 0.1, 10.0, 0.1),
            ],
            placement: Placement::OnPrice,
            compute: keltner,
            columns: keltner_columns,
        },
        IndicatorDefinition {
            key: "macd",
            label: "MACD",
            category: Category::Trend,
            params: vec![
                ParamSpec::int("fast_period", "Fast EMA", 12, 1, None),
                ParamSpec::int("slow_period", "Slow EMA", 26, 1, None),
                ParamSpec::int("signal_period", "Signal", 9, 1, None),
            ],
            placement: Placement::OwnSubplot("MACD"),
            compute: macd,
            columns: macd_columns,
        },
    ]
}

fn sma_columns(p: &Params) -> Result<Vec<String>, IndicatorError> {
    Ok(vec![format!("SMA_{}", p.usize("window")?)])
}

fn sma(series: &BaseSeries, p: &Params) -> Result<DerivedColumns, IndicatorError> {
    let values = Sma::new(p.usize("window")?)?.calculate(&series.closes())?;
    assemble(sma_columns(p)?, vec![defined(values)])
}

fn ema_columns(p: &Params) -> Result<Vec<String>, IndicatorError> {
    Ok(vec![format!("EMA_{}", p.usize("window")?)])
}

fn ema(series: &BaseSeries, p: &Params) -> Result<DerivedColumns, IndicatorError> {
    let values = Ema::new(p.usize("window")?)?.calculate(&series.closes())?;
    assemble(ema_columns(p)?, vec![defined(values)])
}

fn bollinger_columns(p: &Params) -> Result<Vec<String>, IndicatorError> {
    let w = p.usize("window")?;
    Ok(vec![
        format!("BB_Mid_{}", w),
        format!("BB_Upper_2std_{}", w),
        format!("BB_Lower_2std_{}", w),
        format!("BB_Upper_3std_{}", w),
        format!("BB_Lower_3std_{}", w),
    ])
}

fn bollinger(series: &BaseSeries, p: &Params) -> Result<DerivedColumns, IndicatorError> {
    let bands = BollingerBands::with_period(p.usize("window")?)?.calculate(&series.closes())?;
    assemble(
        bollinger_columns(p)?,
        vec![
            optional_field(&bands, |b| b.middle),
            optional_field(&bands, |b| b.upper_2),
            optional_field(&bands, |b| b.lower_2),
            optional_field(&bands, |b| b.upper_3),
            optional_field(&bands, |b| b.lower_3),
        ],
    )
}

fn ichimoku_columns(p: &Params) -> Result<Vec<String>, IndicatorError> {
    let shift = p.usize("senkou_shift")?;
    Ok(vec![
        format!("tenkan_sen_{}", p.usize("tenkan_period")?),
        format!("kijun_sen_{}", p.usize("kijun_period")?),
        format!("senkou_span_a_{}", shift),
        format!("senkou_span_b_{}_{}", p.usize("senkou_b_period")?, shift),
        format!("chikou_span_{}", p.usize("chikou_period")?),
    ])
}

fn ichimoku(series: &BaseSeries, p: &Params) -> Result<DerivedColumns, IndicatorError> {
    let lines = Ichimoku::with_params(
        p.usize("tenkan_period")?,
        p.usize("kijun_period")?,
        p.usize("senkou_b_period")?,
        p.usize("chikou_period")?,
        p.usize("senkou_shift")?,
    )?
    .calculate(series)?;

    assemble(
        ichimoku_columns(p)?,
        vec![
            field(&lines, |l| l.tenkan_sen),
            field(&lines, |l| l.kijun_sen),
            field(&lines, |l| l.senkou_span_a),
            field(&lines, |l| l.senkou_span_b),
            field(&lines, |l| l.chikou_span),
        ],
    )
}

fn psar_columns(p: &Params) -> Result<Vec<String>, IndicatorError> {
    Ok(vec![format!(
        "PSAR_{}_{}_{}",
        p.f64("initial_af")?,
        p.f64("af_increment")?,
        p.f64("max_af")?
    )])
}

fn psar(series: &BaseSeries, p: &Params) -> Result<DerivedColumns, IndicatorError> {
    let values = ParabolicSar::with_params(p.f64("initial_af")?, p.f64("af_increment")?, p.f64("max_af")?)?
        .calculate(series)?;
    assemble(psar_columns(p)?, vec![defined(values)])
}

fn ma_envelope_columns(p: &Params) -> Result<Vec<String>, IndicatorError> {
    let w = p.usize("window")?;
    let pct = p.f64("percentage")?;
    let ma = p.text("ma_type")?;
    Ok(vec![
        format!("envelope_upper_{}_{}_{}", ma, w, pct),
        format!("envelope_mid_{}_{}", ma, w),
        format!("envelope_lower_{}_{}_{}", ma, w, pct),
    ])
}

fn ma_envelope(series: &BaseSeries, p: &Params) -> Result<DerivedColumns, IndicatorError> {
    let ma_type: MaType = p.text("ma_type")?.parse()?;
    let bands = MaEnvelope::new(p.usize("window")?, p.f64("percentage")?, ma_type)?
        .calculate(&series.closes())?;
    assemble(
        ma_envelope_columns(p)?,
        vec![
            optional_field(&bands, |b| b.upper),
            optional_field(&bands, |b| b.middle),
            optional_field(&bands, |b| b.lower),
        ],
    )
}

fn donchian_columns(p: &Params) -> Result<Vec<String>, IndicatorError> {
    let w = p.usize("window")?;
    Ok(vec![
        format!("donchian_upper_{}", w),
        format!("donchian_mid_{}", w),
        format!("donchian_lower_{}", w),
    ])
}

fn donchian(series: &BaseSeries, p: &Params) -> Result<DerivedColumns, IndicatorError> {
    let channel = Donchian::new(p.usize("window")?)?.calculate(series)?;
    assemble(
        donchian_columns(p)?,
        vec![
            optional_field(&channel, |c| c.upper),
            optional_field(&channel, |c| c.middle),
            optional_field(&channel, |c| c.lower),
        ],
    )
}

fn keltner_columns(p: &Params) -> Result<Vec<String>, IndicatorError> {
    let e = p.usize("ema_window")?;
    let a = p.usize("atr_window")?;
    let m = p.f64("atr_multiplier")?;
    Ok(vec![
        format!("kc_upper_{}_{}_{}", e, a, m),
        format!("kc_mid_{}", e),
        format!("kc_lower_{}_{}_{}", e, a, m),
    ])
}

fn keltner(series: &BaseSeries, p: &Params) -> Result<DerivedColumns, IndicatorError> {
    let channel = KeltnerChannels::with_params(
        p.usize("ema_window")?,
        p.usize("atr_window")?,
        p.f64("atr_multiplier")?,
    )?
    .calculate(series)?;
    assemble(
        keltner_columns(p)?,
        vec![
            field(&channel, |c| Some(c.upper)),
            field(&channel, |c| Some(c.middle)),
            field(&channel, |c| Some(c.lower)),
        ],
    )
}

fn macd_columns(p: &Params) -> Result<Vec<String>, IndicatorError> {
    let suffix = format!(
        "{}_{}_{}",
        p.usize("fast_period")?,
        p.usize("slow_period")?,
        p.usize("signal_period")?
    );
    Ok(vec![
        format!("MACD_{}", suffix),
        format!("MACD_Signal_{}", suffix),
        format!("MACD_Hist_{}", suffix),
    ])
}

fn macd(series: &BaseSeries, p: &Params) -> Result<DerivedColumns, IndicatorError> {
    let lines = Macd::with_periods(
        p.usize("fast_period")?,
        p.usize("slow_period")?,
        p.usize("signal_period")?,
    )?
    .calculate(&series.closes())?;
    assemble(
        macd_columns(p)?,
        vec![
            field(&lines, |m| Some(m.macd)),
            field(&lines, |m| Some(m.signal)),
            field(&lines, |m| Some(m.histogram)),
        ],
    )
}
