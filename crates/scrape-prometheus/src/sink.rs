use std::sync::Arc;

use async_trait::async_trait;
use prometheus::Registry;
use scrape_core::{MetricSink, ScrapeError};
use scrape_model::MetricSample;

use crate::family::GaugeFamilies;

/// Exposes scraped samples as Prometheus gauges.
///
/// A sample without a value is written as `NaN` so the series stays visible.
#[derive(Clone)]
pub struct PrometheusMetricSink {
    families: Arc<GaugeFamilies>,
}

impl PrometheusMetricSink {
    pub fn new(registry: Registry) -> Self {
        Self {
            families: Arc::new(GaugeFamilies::new(registry)),
        }
    }

    pub fn registry(&self) -> &Registry {
        self.families.registry()
    }
}

#[async_trait]
impl MetricSink for PrometheusMetricSink {
    async fn write(&self, sample: &MetricSample) -> Result<(), ScrapeError> {
        let value = sample.value.unwrap_or(f64::NAN);
        self.families
            .set(&sample.name, &sample.description, &sample.labels, value)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn sample(value: Option<f64>, labels: &[(&str, &str)]) -> MetricSample {
        MetricSample {
            name: "azure_vm_cpu".into(),
            description: "Average CPU".into(),
            value,
            labels: labels
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[tokio::test]
    async fn writes_samples_as_gauges() {
        let sink = PrometheusMetricSink::new(Registry::new());
        sink.write(&sample(Some(42.5), &[("resource_uri", "/vm-1")]))
            .await
            .unwrap();

        let text = crate::render(sink.registry()).unwrap();
        assert!(text.contains("# HELP azure_vm_cpu Average CPU"));
        assert_eq!(
            crate::sample_value(&text, r#"azure_vm_cpu{resource_uri="/vm-1"}"#),
            Some(42.5)
        );
    }

    #[tokio::test]
    async fn missing_value_is_nan() {
        let sink = PrometheusMetricSink::new(Registry::new());
        sink.write(&sample(None, &[("resource_uri", "/vm-1")]))
            .await
            .unwrap();

        let text = crate::render(sink.registry()).unwrap();
        let value = crate::sample_value(&text, r#"azure_vm_cpu{resource_uri="/vm-1"}"#);
        assert!(value.is_some_and(f64::is_nan));
    }

    #[tokio::test]
    async fn label_mismatch_surfaces_as_sink_error() {
        let sink = PrometheusMetricSink::new(Registry::new());
        sink.write(&sample(Some(1.0), &[("resource_uri", "/vm-1")]))
            .await
            .unwrap();

        let err = sink
            .write(&sample(Some(1.0), &[("instance", "0")]))
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::Sink(ref msg) if msg.contains("expects labels")));
    }
}
