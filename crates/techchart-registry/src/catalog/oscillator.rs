//! Oscillators drawn in their own subplots.

use techchart_core::error::IndicatorError;
use techchart_core::traits::{Indicator, OhlcvIndicator};
use techchart_core::types::{defined, BaseSeries, DerivedColumns, Params};
use techchart_indicators::{
    Aroon, Coppock, Dmi, ForceIndex, MaDeviationRate, MaType, MassIndex, PsychologicalLine, Rci,
    Rsi, Stochastic, WilliamsR,
};

use super::{assemble, field, optional_field, window};
use crate::definition::{Category, IndicatorDefinition, ParamSpec, Placement};

pub(super) fn definitions() -> Vec<IndicatorDefinition> {
    vec![
        IndicatorDefinition {
            key: "rsi",
            label: "Relative Strength Index (RSI)",
            category: Category::Oscillator,
            params: vec![window(14, Some(100))],
            placement: Placement::OwnSubplot("RSI"),
            compute: rsi,
            columns: rsi_columns,
        },
        IndicatorDefinition {
            key: "stochastics",
            label: "Stochastic Oscillator",
            category: Category::Oscillator,
            params: vec![
                ParamSpec::int("k_window", "%K window", 14, 1, Some(100)),
                ParamSpec::int("d_window", "%D window", 3, 1, Some(50)),
                ParamSpec::int("smooth_k", "%K smoothing", 3, 1, Some(50)),
            ],
            placement: Placement::OwnSubplot("Stochastics"),
            compute: stochastics,
            columns: stochastics_columns,
        },
        IndicatorDefinition {
            key: "rci",
            label: "Rank Correlation Index (RCI)",
            category: Category::Oscillator,
            params: vec![ParamSpec::int("window", "Window", 9, 2, Some(50))],
            placement: Placement::OwnSubplot("RCI"),
            compute: rci,
            columns: rci_columns,
        },
        IndicatorDefinition {
            key: "dmi_adx",
            label: "DMI / ADX",
            category: Category::Oscillator,
            params: vec![window(14, Some(100))],
            placement: Placement::OwnSubplot("DMI/ADX"),
            compute: dmi_adx,
            columns: dmi_adx_columns,
        },
        IndicatorDefinition {
            key: "williams_r",
            label: "Williams %R",
            category: Category::Oscillator,
            params: vec![window(14, Some(100))],
            placement: Placement::OwnSubplot("Williams %R"),
            compute: williams_r,
            columns: williams_r_columns,
        },
        IndicatorDefinition {
            key: "aroon",
            label: "Aroon",
            category: Category::Oscillator,
            params: vec![window(25, Some(100))],
            placement: Placement::OwnSubplot("Aroon"),
            compute: aroon,
            columns: aroon_columns,
        },
        IndicatorDefinition {
            key: "coppock",
            label: "Coppock Curve",
            category: Category::Oscillator,
            params: vec![
                ParamSpec::int("roc1_window", "Long ROC", 14, 1, Some(100)),
                ParamSpec::int("roc2_window", "Short ROC", 11, 1, Some(100)),
                ParamSpec::int("wma_window", "WMA window", 10, 1, Some(100)),
            ],
            placement: Placement::OwnSubplot("Coppock Curve"),
            compute: coppock,
            columns: coppock_columns,
        },
        IndicatorDefinition {
            key: "force_index",
            label: "Force Index",
            category: Category::Oscillator,
            params: vec![window(13, Some(100))],
            placement: Placement::OwnSubplot("Force Index"),
            compute: force_index,
            columns: force_index_columns,
        },
        IndicatorDefinition {
            key: "mass_index",
            label: "Mass Index",
            category: Category::Oscillator,
            params: vec![
                ParamSpec::int("ema_window", "EMA window", 9, 1, Some(50)),
                ParamSpec::int("sum_window", "Sum window", 25, 1, Some(100)),
            ],
            placement: Placement::OwnSubplot("Mass Index"),
            compute: mass_index,
            columns: mass_index_columns,
        },
        IndicatorDefinition {
            key: "psy_line",
            label: "Psychological Line",
            category: Category::Oscillator,
            params: vec![window(12, Some(100))],
            placement: Placement::OwnSubplot("Psychological Line"),
            compute: psy_line,
            columns: psy_line_columns,
        },
        IndicatorDefinition {
            key: "ma_dev_rate",
            label: "MA Deviation Rate",
            category: Category::Oscillator,
            params: vec![
                window(20, Some(200)),
                ParamSpec::choice("ma_type", "Moving average", "sma", &["sma", "ema"]),
            ],
            placement: Placement::OwnSubplot("MA Deviation Rate"),
            compute: ma_dev_rate,
            columns: ma_dev_rate_columns,
        },
    ]
}

fn rsi_columns(p: &Params) -> Result<Vec<String>, IndicatorError> {
    Ok(vec![format!("RSI_{}", p.usize("window")?)])
}

fn rsi(series: &BaseSeries, p: &Params) -> Result<DerivedColumns, IndicatorError> {
    let values = Rsi::new(p.usize("window")?)?.calculate(&series.closes())?;
    assemble(rsi_columns(p)?, vec![defined(values)])
}

fn stochastics_columns(p: &Params) -> Result<Vec<String>, IndicatorError> {
    let k = p.usize("k_window")?;
    let s = p.usize("smooth_k")?;
    Ok(vec![
        format!("%K_{}_{}", k, s),
        format!("%D_{}_{}_{}", k, s, p.usize("d_window")?),
    ])
}

fn stochastics(series: &BaseSeries, p: &Params) -> Result<DerivedColumns, IndicatorError> {
    let lines = Stochastic::with_params(p.usize("k_window")?, p.usize("d_window")?, p.usize("smooth_k")?)?
        .calculate(series)?;
    assemble(
        stochastics_columns(p)?,
        vec![field(&lines, |s| Some(s.k)), field(&lines, |s| Some(s.d))],
    )
}

fn rci_columns(p: &Params) -> Result<Vec<String>, IndicatorError> {
    Ok(vec![format!("RCI_{}", p.usize("window")?)])
}

fn rci(series: &BaseSeries, p: &Params) -> Result<DerivedColumns, IndicatorError> {
    let values = Rci::new(p.usize("window")?)?.calculate(&series.closes())?;
    assemble(rci_columns(p)?, vec![values])
}

fn dmi_adx_columns(p: &Params) -> Result<Vec<String>, IndicatorError> {
    let w = p.usize("window")?;
    Ok(vec![
        format!("plus_di_{}", w),
        format!("minus_di_{}", w),
        format!("adx_{}", w),
    ])
}

fn dmi_adx(series: &BaseSeries, p: &Params) -> Result<DerivedColumns, IndicatorError> {
    let lines = Dmi::new(p.usize("window")?)?.calculate(series)?;
    assemble(
        dmi_adx_columns(p)?,
        vec![
            field(&lines, |d| Some(d.plus_di)),
            field(&lines, |d| Some(d.minus_di)),
            field(&lines, |d| Some(d.adx)),
        ],
    )
}

fn williams_r_columns(p: &Params) -> Result<Vec<String>, IndicatorError> {
    Ok(vec![format!("williams_r_{}", p.usize("window")?)])
}

fn williams_r(series: &BaseSeries, p: &Params) -> Result<DerivedColumns, IndicatorError> {
    let values = WilliamsR::new(p.usize("window")?)?.calculate(series)?;
    assemble(williams_r_columns(p)?, vec![defined(values)])
}

fn aroon_columns(p: &Params) -> Result<Vec<String>, IndicatorError> {
    let w = p.usize("window")?;
    Ok(vec![
        format!("aroon_up_{}", w),
        format!("aroon_down_{}", w),
        format!("aroon_osc_{}", w),
    ])
}

fn aroon(series: &BaseSeries, p: &Params) -> Result<DerivedColumns, IndicatorError> {
    let lines = Aroon::new(p.usize("window")?)?.calculate(series)?;
    assemble(
        aroon_columns(p)?,
        vec![
            optional_field(&lines, |a| a.up),
            optional_field(&lines, |a| a.down),
            optional_field(&lines, |a| a.oscillator),
        ],
    )
}

fn coppock_columns(p: &Params) -> Result<Vec<String>, IndicatorError> {
    Ok(vec![format!(
        "coppock_{}_{}_{}",
        p.usize("roc1_window")?,
        p.usize("roc2_window")?,
        p.usize("wma_window")?
    )])
}

fn coppock(series: &BaseSeries, p: &Params) -> Result<DerivedColumns, IndicatorError> {
    let values = Coppock::with_params(
        p.usize("roc1_window")?,
        p.usize("roc2_window")?,
        p.usize("wma_window")?,
    )?
    .calculate(&series.closes())?;
    assemble(coppock_columns(p)?, vec![defined(values)])
}

fn force_index_columns(p: &Params) -> Result<Vec<String>, IndicatorError> {
    Ok(vec![format!("force_index_{}", p.usize("window")?)])
}

fn force_index(series: &BaseSeries, p: &Params) -> Result<DerivedColumns, IndicatorError> {
    let values = ForceIndex::new(p.usize("window")?)?.calculate(series)?;
    assemble(force_index_columns(p)?, vec![defined(values)])
}

fn mass_index_columns(p: &Params) -> Result<Vec<String>, IndicatorError> {
    Ok(vec![format!(
        "mass_index_{}_{}",
        p.usize("ema_window")?,
        p.usize("sum_window")?
    )])
}

fn mass_index(series: &BaseSeries, p: &Params) -> Result<DerivedColumns, IndicatorError> {
    let values = MassIndex::with_params(p.usize("ema_window")?, p.usize("sum_window")?)?
        .calculate(series)?;
    assemble(mass_index_columns(p)?, vec![defined(values)])
}

fn psy_line_columns(p: &Params) -> Result<Vec<String>, IndicatorError> {
    Ok(vec![format!("psy_line_{}", p.usize("window")?)])
}

fn psy_line(series: &BaseSeries, p: &Params) -> Result<DerivedColumns, IndicatorError> {
    let values = PsychologicalLine::new(p.usize("window")?)?.calculate(&series.closes())?;
    assemble(psy_line_columns(p)?, vec![defined(values)])
}

fn ma_dev_rate_columns(p: &Params) -> Result<Vec<String>, IndicatorError> {
    Ok(vec![format!(
        "ma_dev_rate_{}_{}",
        p.text("ma_type")?,
        p.usize("window")?
    )])
}

fn ma_dev_rate(series: &BaseSeries, p: &Params) -> Result<DerivedColumns, IndicatorError> {
    let ma_type: MaType = p.text("ma_type")?.parse()?;
    let values = MaDeviationRate::new(p.usize("window")?, ma_type)?.calculate(&series.closes())?;
    assemble(ma_dev_rate_columns(p)?, vec![defined(values)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use techchart_core::types::Bar;

    fn rising(len: usize) -> BaseSeries {
        let bars = (0..len)
            .map(|i| {
                let c = 100.0 + i as f64;
                Bar::new(i as i64 * 86_400_000, c, c, c, c, 1_000.0)
            })
            .collect();
        BaseSeries::new("UP", bars).unwrap()
    }

    fn definition(key: &str) -> IndicatorDefinition {
        definitions().into_iter().find(|d| d.key == key).unwrap()
    }

    #[test]
    fn test_stochastics_column_names() {
        let stoch = definition("stochastics");
        assert_eq!(
            stoch.column_names(&stoch.default_params()).unwrap(),
            vec!["%K_14_3", "%D_14_3_3"]
        );
    }

    #[test]
    fn test_aroon_on_rising_closes() {
        let aroon = definition("aroon");
        let derived = aroon.compute(&rising(60), &aroon.default_params()).unwrap();

        let up = derived.get("aroon_up_25").unwrap();
        let down = derived.get("aroon_down_25").unwrap();
        assert_eq!(up[24], None);
        assert_eq!(up[59], Some(100.0));
        assert_eq!(down[59], Some(0.0));
    }

    #[test]
    fn test_rci_window_below_two_is_rejected() {
        let rci = definition("rci");
        let err = rci
            .resolve_params(Some(&Params::new().with("window", 1i64)))
            .unwrap_err();
        assert!(matches!(err, IndicatorError::InvalidParameter(_)));
    }

    #[test]
    fn test_ma_dev_rate_accepts_uppercase_choice() {
        let dev = definition("ma_dev_rate");
        let params = dev
            .resolve_params(Some(&Params::new().with("ma_type", "EMA")))
            .unwrap();
        let derived = dev.compute(&rising(40), &params).unwrap();
        assert_eq!(derived.names(), vec!["ma_dev_rate_ema_20"]);
    }
}
