use std::collections::BTreeMap;

use crate::ScrapeDefinition;

/// A value returned by the monitoring API for one time series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasuredValue {
    /// `None` when the API reported no data point for the interval.
    pub value: Option<f64>,
    /// Dimension values identifying the series.
    pub dimensions: BTreeMap<String, String>,
}

impl MeasuredValue {
    pub fn new(value: f64) -> Self {
        Self {
            value: Some(value),
            dimensions: BTreeMap::new(),
        }
    }

    pub fn with_dimension(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.dimensions.insert(name.into(), value.into());
        self
    }
}

/// A single sample handed to the metric sink.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    pub name: String,
    pub description: String,
    pub value: Option<f64>,
    pub labels: BTreeMap<String, String>,
}

impl MetricSample {
    /// Build the sample for one measured series of `def`.
    ///
    /// Labels are the resource identity, the static labels of the metric and the series
    /// dimensions (lower-cased), in that order of precedence from lowest to highest.
    pub fn from_measurement(def: &ScrapeDefinition, measured: &MeasuredValue) -> Self {
        let mut labels = BTreeMap::new();
        labels.insert("resource_uri".to_string(), def.resource_uri());
        labels.insert("subscription_id".to_string(), def.subscription_id.clone());
        labels.insert("resource_group".to_string(), def.resource_group_name.clone());
        for (k, v) in &def.prometheus_metric_definition.labels {
            labels.insert(k.clone(), v.clone());
        }
        for (k, v) in &measured.dimensions {
            labels.insert(k.to_ascii_lowercase(), v.clone());
        }

        Self {
            name: def.prometheus_metric_definition.name.clone(),
            description: def.prometheus_metric_definition.description.clone(),
            value: measured.value,
            labels,
        }
    }
}
