//! Volatility measures and price levels.

use techchart_core::error::IndicatorError;
use techchart_core::traits::{Indicator, OhlcvIndicator};
use techchart_core::types::{defined, BaseSeries, DerivedColumns, Params};
use techchart_indicators::{Atr, PivotPoints, StdDev};

use super::{assemble, optional_field, window};
use crate::definition::{Category, IndicatorDefinition, Placement};

pub(super) fn definitions() -> Vec<IndicatorDefinition> {
    vec![
        IndicatorDefinition {
            key: "atr",
            label: "Average True Range (ATR)",
            category: Category::Other,
            params: vec![window(14, Some(100))],
            placement: Placement::OwnSubplot("ATR"),
            compute: atr,
            columns: atr_columns,
        },
        IndicatorDefinition {
            key: "std_dev",
            label: "Standard Deviation",
            category: Category::Other,
            params: vec![window(20, Some(200))],
            placement: Placement::OwnSubplot("Standard Deviation"),
            compute: std_dev,
            columns: std_dev_columns,
        },
        IndicatorDefinition {
            key: "pivot",
            label: "Pivot Points",
            category: Category::Other,
            params: Vec::new(),
            placement: Placement::OnPrice,
            compute: pivot,
            columns: pivot_columns,
        },
    ]
}

fn atr_columns(p: &Params) -> Result<Vec<String>, IndicatorError> {
    Ok(vec![format!("ATR_{}", p.usize("window")?)])
}

fn atr(series: &BaseSeries, p: &Params) -> Result<DerivedColumns, IndicatorError> {
    let values = Atr::new(p.usize("window")?)?.calculate(series)?;
    assemble(atr_columns(p)?, vec![defined(values)])
}

fn std_dev_columns(p: &Params) -> Result<Vec<String>, IndicatorError> {
    Ok(vec![format!("std_dev_{}", p.usize("window")?)])
}

fn std_dev(series: &BaseSeries, p: &Params) -> Result<DerivedColumns, IndicatorError> {
    let values = StdDev::new(p.usize("window")?)?.calculate(&series.closes())?;
    assemble(std_dev_columns(p)?, vec![values])
}

const PIVOT_COLUMNS: [&str; 7] = ["pivot", "r1", "s1", "r2", "s2", "r3", "s3"];

fn pivot_columns(_: &Params) -> Result<Vec<String>, IndicatorError> {
    Ok(PIVOT_COLUMNS.iter().map(|name| name.to_string()).collect())
}

fn pivot(series: &BaseSeries, p: &Params) -> Result<DerivedColumns, IndicatorError> {
    let levels = PivotPoints.calculate(series)?;
    assemble(
        pivot_columns(p)?,
        vec![
            optional_field(&levels, |l| l.pivot),
            optional_field(&levels, |l| l.r1),
            optional_field(&levels, |l| l.s1),
            optional_field(&levels, |l| l.r2),
            optional_field(&levels, |l| l.s2),
            optional_field(&levels, |l| l.r3),
            optional_field(&levels, |l| l.s3),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use techchart_core::types::Bar;

    #[test]
    fn test_pivot_levels_from_previous_bar() {
        let bars = vec![
            Bar::new(0, 10.0, 12.0, 8.0, 10.0, 1.0),
            Bar::new(1, 10.0, 11.0, 9.0, 10.0, 1.0),
        ];
        let series = BaseSeries::new("P", bars).unwrap();
        let pivot = definitions().into_iter().find(|d| d.key == "pivot").unwrap();

        let derived = pivot.compute(&series, &pivot.default_params()).unwrap();
        assert_eq!(derived.names(), PIVOT_COLUMNS.to_vec());
        assert_eq!(derived.get("pivot").unwrap(), &vec![None, Some(10.0)]);
        assert_eq!(derived.get("r1").unwrap(), &vec![None, Some(12.0)]);
        assert_eq!(derived.get("s1").unwrap(), &vec![None, Some(8.0)]);
    }

    #[test]
    fn test_atr_of_flat_series_is_zero() {
        let bars = (0..20)
            .map(|i| Bar::new(i * 60_000, 100.0, 100.0, 100.0, 100.0, 0.0))
            .collect();
        let series = BaseSeries::new("FLAT", bars).unwrap();
        let atr = definitions().into_iter().find(|d| d.key == "atr").unwrap();

        let derived = atr.compute(&series, &atr.default_params()).unwrap();
        assert!(derived.get("ATR_14").unwrap().iter().all(|v| *v == Some(0.0)));
    }
}
