//! Indicator computation orchestrator.

use techchart_core::error::{EngineError, IndicatorError};
use techchart_core::types::{BaseSeries, DerivedColumns, Params, BASE_COLUMNS};
use techchart_registry::{IndicatorDefinition, IndicatorRegistry, Placement};
use tracing::{debug, info, warn};

use crate::dataset::{AugmentedDataset, DatasetBuilder};
use crate::request::ComputationRequest;
use crate::result::{
    ChartLayout, ColumnLabel, ColumnLabelMap, ComputationResult, FailureRecord, ResolvedIndicator,
};

/// Runs requested indicators against a base series.
///
/// A failing indicator is recorded and skipped; it never aborts the run.
#[derive(Debug, Clone, Copy)]
pub struct Orchestrator<'r> {
    registry: &'r IndicatorRegistry,
}

impl<'r> Orchestrator<'r> {
    /// Create an orchestrator over a registry.
    pub fn new(registry: &'r IndicatorRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r IndicatorRegistry {
        self.registry
    }

    /// Compute every requested indicator.
    ///
    /// Unknown keys fail the whole request before anything is computed.
    pub fn run(
        &self,
        series: &BaseSeries,
        request: &ComputationRequest,
    ) -> Result<ComputationResult, EngineError> {
        let definitions = request
            .selected_keys()
            .iter()
            .map(|key| self.registry.lookup(key))
            .collect::<Result<Vec<_>, _>>()?;

        let mut result = ComputationResult::empty(AugmentedDataset::from_base(series.clone()));
        if definitions.is_empty() {
            debug!(symbol = series.symbol(), "Empty request, nothing to compute");
            return Ok(result);
        }

        info!(
            symbol = series.symbol(),
            bars = series.len(),
            indicators = definitions.len(),
            "Computing indicators"
        );

        let mut builder = DatasetBuilder::new(series.clone());
        let mut computed: Vec<&IndicatorDefinition> = Vec::with_capacity(definitions.len());

        for definition in definitions {
            let overrides = request.overrides_for(definition.key);
            match self.compute_one(definition, series, overrides, &mut builder) {
                Ok((params, declared)) => {
                    debug!(key = definition.key, columns = declared.len(), "Computed indicator");
                    for column in declared {
                        if builder.dataset().contains(&column) {
                            result.labels.insert(
                                column,
                                ColumnLabel {
                                    label: definition.label.to_string(),
                                    key: definition.key.to_string(),
                                },
                            );
                        }
                    }
                    result.params.push(ResolvedIndicator {
                        key: definition.key.to_string(),
                        params,
                    });
                    computed.push(definition);
                }
                Err(e) => {
                    warn!(key = definition.key, error = %e, "Indicator failed");
                    result.failures.push(FailureRecord {
                        key: definition.key.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        result.dataset = builder.build();
        result.layout = self.layout(&computed);

        info!(
            symbol = series.symbol(),
            computed = computed.len(),
            failures = result.failures.len(),
            "Computation complete"
        );

        Ok(result)
    }

    fn compute_one(
        &self,
        definition: &IndicatorDefinition,
        series: &BaseSeries,
        overrides: Option<&Params>,
        builder: &mut DatasetBuilder,
    ) -> Result<(Params, Vec<String>), IndicatorError> {
        let params = definition.resolve_params(overrides)?;
        let declared = definition.column_names(&params)?;
        let derived = definition.compute(series, &params)?;

        verify_names(&declared, &derived)?;
        builder.append(derived)?;

        Ok((params, declared))
    }

    /// Group computed keys by placement, first-seen order.
    fn layout(&self, computed: &[&IndicatorDefinition]) -> ChartLayout {
        let mut layout = ChartLayout::default();

        for definition in computed {
            match definition.placement {
                Placement::OnPrice => layout.add_overlay(definition.key),
                Placement::OwnSubplot(name) => layout.add_to_subplot(name, definition.key),
                Placement::SharedSubplot(of) => match self.registry.get(of).map(|d| d.placement) {
                    Some(Placement::OwnSubplot(name)) => layout.add_to_subplot(name, definition.key),
                    Some(Placement::OnPrice) => layout.add_overlay(definition.key),
                    _ => layout.add_to_subplot(definition.label, definition.key),
                },
            }
        }

        layout
    }
}

impl Default for Orchestrator<'static> {
    fn default() -> Self {
        Self::new(IndicatorRegistry::global())
    }
}

/// Produced columns must be exactly the declared non-base names, in order.
fn verify_names(declared: &[String], derived: &DerivedColumns) -> Result<(), IndicatorError> {
    let expected: Vec<&str> = declared
        .iter()
        .map(String::as_str)
        .filter(|name| !BASE_COLUMNS.contains(name))
        .collect();
    let produced = derived.names();

    if produced != expected {
        return Err(IndicatorError::CalculationError(format!(
            "produced columns {:?} but declared {:?}",
            produced, expected
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use techchart_core::types::{Bar, ParamValue};
    use techchart_registry::{Category, ParamSpec};

    fn constant_series(len: usize) -> BaseSeries {
        let bars = (0..len)
            .map(|i| Bar::new(i as i64 * 86_400_000, 100.0, 100.0, 100.0, 100.0, 0.0))
            .collect();
        BaseSeries::new("FLAT", bars).unwrap()
    }

    fn rising_series(len: usize) -> BaseSeries {
        let bars = (0..len)
            .map(|i| {
                let c = 100.0 + i as f64;
                Bar::new(i as i64 * 86_400_000, c, c + 0.5, c - 0.5, c, 1_000.0)
            })
            .collect();
        BaseSeries::new("RISE", bars).unwrap()
    }

    #[test]
    fn test_empty_request_is_noop() {
        let series = rising_series(10);
        let result = Orchestrator::default()
            .run(&series, &ComputationRequest::default())
            .unwrap();

        assert!(result.dataset.derived_names().is_empty());
        assert_eq!(result.dataset.base(), &series);
        assert!(result.labels.is_empty());
        assert!(result.failures.is_empty());
        assert_eq!(result.layout, ChartLayout::default());
    }

    #[test]
    fn test_unknown_key_fails_before_computation() {
        let series = rising_series(10);
        let request = ComputationRequest::new(["sma", "does_not_exist"]);

        let err = Orchestrator::default().run(&series, &request).unwrap_err();
        assert!(matches!(err, EngineError::UnknownIndicator(ref e) if e.0 == "does_not_exist"));
    }

    #[test]
    fn test_partial_failure_keeps_other_indicators() {
        // 30 bars: ichimoku needs 52
        let series = rising_series(30);
        let request = ComputationRequest::new(["sma", "ichimoku", "rsi"]);

        let result = Orchestrator::default().run(&series, &request).unwrap();

        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].key, "ichimoku");
        assert!(result.failures[0].reason.contains("Insufficient data"));
        assert_eq!(result.dataset.derived_names(), vec!["SMA_20", "RSI_14"]);
        assert!(result.params_for("ichimoku").is_none());
        assert!(result.is_failed("ichimoku"));
    }

    #[test]
    fn test_invalid_override_is_a_failure_record() {
        let series = rising_series(30);
        let request = ComputationRequest::new(["sma", "ema"])
            .with_override("sma", Params::new().with("window", 0i64));

        let result = Orchestrator::default().run(&series, &request).unwrap();

        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].key, "sma");
        assert_eq!(result.dataset.derived_names(), vec!["EMA_20"]);
    }

    #[test]
    fn test_overrides_apply() {
        let series = rising_series(30);
        let request = ComputationRequest::new(["sma"])
            .with_override("sma", Params::new().with("window", 5i64));

        let result = Orchestrator::default().run(&series, &request).unwrap();

        assert_eq!(result.dataset.derived_names(), vec!["SMA_5"]);
        assert_eq!(
            result.params_for("sma").and_then(|p| p.get("window")),
            Some(&ParamValue::Int(5))
        );
        // mean of closes 125..=129
        assert_eq!(result.dataset.value("SMA_5", 29), Some(127.0));
    }

    #[test]
    fn test_deserialized_request_with_repeated_key() {
        let series = rising_series(30);
        let request: ComputationRequest =
            serde_json::from_str(r#"{"selected_keys":["sma","sma"]}"#).unwrap();

        let result = Orchestrator::default().run(&series, &request).unwrap();
        assert!(result.failures.is_empty());
        assert_eq!(result.dataset.derived_names(), vec!["SMA_20"]);
        assert_eq!(result.params.len(), 1);
    }

    #[test]
    fn test_runs_are_deterministic() {
        let series = rising_series(80);
        let request = ComputationRequest::new(["bollinger", "macd", "rci", "psar", "vwap"]);
        let orchestrator = Orchestrator::default();

        let first = orchestrator.run(&series, &request).unwrap();
        let second = orchestrator.run(&series, &request).unwrap();

        for name in first.dataset.derived_names() {
            assert_eq!(first.dataset.derived(name), second.dataset.derived(name), "{}", name);
        }
        assert_eq!(first.labels, second.labels);
    }

    #[test]
    fn test_base_series_is_untouched() {
        let series = rising_series(40);
        let before = series.clone();
        let request = ComputationRequest::new(["ema", "keltner", "obv"]);

        Orchestrator::default().run(&series, &request).unwrap();

        assert_eq!(series, before);
    }

    #[test]
    fn test_labels_cover_declared_columns() {
        let series = rising_series(40);
        let request = ComputationRequest::new(["volume", "bollinger"]);

        let result = Orchestrator::default().run(&series, &request).unwrap();

        assert_eq!(result.labels.get("Volume").map(|l| l.key.as_str()), Some("volume"));
        assert_eq!(result.labels.columns_of("bollinger").len(), 5);
        assert_eq!(
            result.labels.get("BB_Mid_20").map(|l| l.label.as_str()),
            Some("Bollinger Bands (2σ & 3σ)")
        );
    }

    #[test]
    fn test_layout_groups_by_placement() {
        let series = rising_series(60);
        let request = ComputationRequest::new([
            "rsi",
            "sma",
            "volume_sma",
            "macd",
            "volume",
            "bollinger",
            "ichimoku",
        ]);

        let result = Orchestrator::default().run(&series, &request).unwrap();
        let layout = &result.layout;

        assert_eq!(layout.overlays, vec!["sma", "bollinger", "ichimoku"]);
        assert_eq!(layout.subplot_names(), vec!["RSI", "Volume", "MACD"]);
        assert_eq!(layout.subplot("Volume").unwrap().keys, vec!["volume_sma", "volume"]);
    }

    #[test]
    fn test_failed_keys_are_left_out_of_layout() {
        let series = rising_series(20);
        let request = ComputationRequest::new(["rsi", "mass_index"]);

        let result = Orchestrator::default().run(&series, &request).unwrap();

        assert_eq!(result.layout.subplot_names(), vec!["RSI"]);
    }

    fn mislabeled_columns(_: &Params) -> Result<Vec<String>, IndicatorError> {
        Ok(vec!["declared".to_string()])
    }

    fn mislabeled_compute(series: &BaseSeries, _: &Params) -> Result<DerivedColumns, IndicatorError> {
        Ok(DerivedColumns::new().with("other", vec![None; series.len()]))
    }

    fn short_compute(_: &BaseSeries, _: &Params) -> Result<DerivedColumns, IndicatorError> {
        Ok(DerivedColumns::new().with("declared", vec![Some(1.0)]))
    }

    fn custom(key: &'static str, compute: techchart_registry::ComputeFn) -> IndicatorDefinition {
        IndicatorDefinition {
            key,
            label: "Custom",
            category: Category::Other,
            params: vec![ParamSpec::boolean("flag", "Flag", false)],
            placement: Placement::OwnSubplot("Custom"),
            compute,
            columns: mislabeled_columns,
        }
    }

    #[test]
    fn test_contract_violations_become_failures() {
        let mut registry = IndicatorRegistry::empty();
        registry.register(custom("renamed", mislabeled_compute)).unwrap();
        registry.register(custom("short", short_compute)).unwrap();

        let series = rising_series(5);
        let request = ComputationRequest::new(["renamed", "short"]);
        let result = Orchestrator::new(&registry).run(&series, &request).unwrap();

        assert_eq!(result.failures.len(), 2);
        assert!(result.failures[0].reason.contains("declared"));
        assert!(result.failures[1].reason.contains("values for 5 bars"));
        assert!(result.dataset.derived_names().is_empty());
    }

    #[test]
    fn test_scenario_constant_series() {
        let series = constant_series(30);
        let request = ComputationRequest::new(["sma", "rsi", "atr", "mfi", "cmf", "vwap"])
            .with_override("sma", Params::new().with("window", 5i64));

        let result = Orchestrator::default().run(&series, &request).unwrap();
        let dataset = &result.dataset;

        assert!(result.failures.is_empty(), "{:?}", result.failures);
        assert!(dataset.derived("SMA_5").unwrap().iter().all(|v| *v == Some(100.0)));
        assert!(dataset.derived("RSI_14").unwrap().iter().all(|v| *v == Some(50.0)));
        assert!(dataset.derived("ATR_14").unwrap().iter().all(|v| *v == Some(0.0)));
        // zero volume: no valid VWAP anywhere
        assert!(dataset.derived("VWAP_daily").unwrap().iter().all(|v| v.is_none()));
    }

    #[test]
    fn test_scenario_rising_series() {
        let series = rising_series(50);
        let request = ComputationRequest::new(["macd", "aroon"]);

        let result = Orchestrator::default().run(&series, &request).unwrap();
        let dataset = &result.dataset;

        let macd = dataset.derived("MACD_12_26_9").unwrap();
        assert!(macd[26..].iter().all(|v| v.map_or(false, |m| m > 0.0)));
        assert_eq!(dataset.value("aroon_up_25", 49), Some(100.0));
        assert_eq!(dataset.value("aroon_down_25", 49), Some(0.0));
    }
}
