//! Volume-based indicators.

use techchart_core::error::IndicatorError;
use techchart_core::traits::{Indicator, OhlcvIndicator};
use techchart_core::types::{defined, BaseSeries, DerivedColumns, Params};
use techchart_indicators::{Cmf, Eom, Mfi, Obv, Sma, Vwap};

use super::{assemble, window};
use crate::definition::{Category, IndicatorDefinition, ParamSpec, Placement};

pub(super) fn definitions() -> Vec<IndicatorDefinition> {
    vec![
        IndicatorDefinition {
            key: "volume",
            label: "Volume",
            category: Category::Volume,
            params: Vec::new(),
            placement: Placement::OwnSubplot("Volume"),
            compute: volume,
            columns: volume_columns,
        },
        IndicatorDefinition {
            key: "volume_sma",
            label: "Volume SMA",
            category: Category::Volume,
            params: vec![window(20, Some(200))],
            placement: Placement::SharedSubplot("volume"),
            compute: volume_sma,
            columns: volume_sma_columns,
        },
        IndicatorDefinition {
            key: "obv",
            label: "On-Balance Volume (OBV)",
            category: Category::Volume,
            params: Vec::new(),
            placement: Placement::OwnSubplot("OBV"),
            compute: obv,
            columns: obv_columns,
        },
        IndicatorDefinition {
            key: "mfi",
            label: "Money Flow Index (MFI)",
            category: Category::Volume,
            params: vec![window(14, Some(100))],
            placement: Placement::OwnSubplot("MFI"),
            compute: mfi,
            columns: mfi_columns,
        },
        IndicatorDefinition {
            key: "cmf",
            label: "Chaikin Money Flow (CMF)",
            category: Category::Volume,
            params: vec![window(20, Some(100))],
            placement: Placement::OwnSubplot("CMF"),
            compute: cmf,
            columns: cmf_columns,
        },
        IndicatorDefinition {
            key: "eom",
            label: "Ease of Movement (EOM)",
            category: Category::Volume,
            params: vec![
                window(14, Some(100)),
                ParamSpec::float("divisor", "Volume divisor", 1e8, 1.0, 1e12, 1.0),
            ],
            placement: Placement::OwnSubplot("EOM"),
            compute: eom,
            columns: eom_columns,
        },
        IndicatorDefinition {
            key: "vwap",
            label: "Volume Weighted Average Price (VWAP)",
            category: Category::Volume,
            params: vec![ParamSpec::boolean("reset_daily", "Reset each day", true)],
            placement: Placement::OnPrice,
            compute: vwap,
            columns: vwap_columns,
        },
    ]
}

/// Draws the base volume column; nothing to compute.
fn volume_columns(_: &Params) -> Result<Vec<String>, IndicatorError> {
    Ok(vec!["Volume".to_string()])
}

fn volume(_: &BaseSeries, _: &Params) -> Result<DerivedColumns, IndicatorError> {
    Ok(DerivedColumns::new())
}

fn volume_sma_columns(p: &Params) -> Result<Vec<String>, IndicatorError> {
    Ok(vec![format!("Volume_SMA_{}", p.usize("window")?)])
}

fn volume_sma(series: &BaseSeries, p: &Params) -> Result<DerivedColumns, IndicatorError> {
    let values = Sma::new(p.usize("window")?)?.calculate(&series.volumes())?;
    assemble(volume_sma_columns(p)?, vec![defined(values)])
}

fn obv_columns(_: &Params) -> Result<Vec<String>, IndicatorError> {
    Ok(vec!["OBV".to_string()])
}

fn obv(series: &BaseSeries, p: &Params) -> Result<DerivedColumns, IndicatorError> {
    let values = Obv.calculate(series)?;
    assemble(obv_columns(p)?, vec![defined(values)])
}

fn mfi_columns(p: &Params) -> Result<Vec<String>, IndicatorError> {
    Ok(vec![format!("mfi_{}", p.usize("window")?)])
}

fn mfi(series: &BaseSeries, p: &Params) -> Result<DerivedColumns, IndicatorError> {
    let values = Mfi::new(p.usize("window")?)?.calculate(series)?;
    assemble(mfi_columns(p)?, vec![defined(values)])
}

fn cmf_columns(p: &Params) -> Result<Vec<String>, IndicatorError> {
    Ok(vec![format!("cmf_{}", p.usize("window")?)])
}

fn cmf(series: &BaseSeries, p: &Params) -> Result<DerivedColumns, IndicatorError> {
    let values = Cmf::new(p.usize("window")?)?.calculate(series)?;
    assemble(cmf_columns(p)?, vec![defined(values)])
}

fn eom_columns(p: &Params) -> Result<Vec<String>, IndicatorError> {
    Ok(vec![format!("eom_{}", p.usize("window")?)])
}

fn eom(series: &BaseSeries, p: &Params) -> Result<DerivedColumns, IndicatorError> {
    let values = Eom::with_divisor(p.usize("window")?, p.f64("divisor")?)?.calculate(series)?;
    assemble(eom_columns(p)?, vec![defined(values)])
}

fn vwap_columns(p: &Params) -> Result<Vec<String>, IndicatorError> {
    let name = if p.bool("reset_daily")? { "VWAP_daily" } else { "VWAP" };
    Ok(vec![name.to_string()])
}

fn vwap(series: &BaseSeries, p: &Params) -> Result<DerivedColumns, IndicatorError> {
    let values = Vwap::new(p.bool("reset_daily")?).calculate(series)?;
    assemble(vwap_columns(p)?, vec![values])
}
