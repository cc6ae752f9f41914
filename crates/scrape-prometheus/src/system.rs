use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use prometheus::Registry;
use scrape_core::{ScrapeError, SystemMetricsPublisher};

use crate::family::GaugeFamilies;

/// Agent health gauges (scrape success, run duration, ...), optionally prefixed.
#[derive(Clone)]
pub struct PrometheusSystemMetrics {
    families: Arc<GaugeFamilies>,
    prefix: Option<String>,
}

impl PrometheusSystemMetrics {
    pub fn new(registry: Registry) -> Self {
        Self {
            families: Arc::new(GaugeFamilies::new(registry)),
            prefix: None,
        }
    }

    /// Prepend `prefix_` to every gauge name.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn registry(&self) -> &Registry {
        self.families.registry()
    }

    fn full_name(&self, name: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}_{name}"),
            None => name.to_string(),
        }
    }
}

#[async_trait]
impl SystemMetricsPublisher for PrometheusSystemMetrics {
    async fn write_gauge(
        &self,
        name: &str,
        description: &str,
        value: f64,
        labels: &[(&str, &str)],
    ) -> Result<(), ScrapeError> {
        let labels: BTreeMap<String, String> = labels
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.families
            .set(&self.full_name(name), description, &labels, value)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use scrape_core::MetricSink;

    use super::*;
    use crate::PrometheusMetricSink;

    #[tokio::test]
    async fn publishes_prefixed_gauges() {
        let metrics = PrometheusSystemMetrics::new(Registry::new()).with_prefix("scraper");
        metrics
            .write_gauge("scrape_run_completed", "Last run completed", 1.0, &[("job", "vm-metrics")])
            .await
            .unwrap();

        let text = crate::render(metrics.registry()).unwrap();
        assert_eq!(
            crate::sample_value(&text, r#"scraper_scrape_run_completed{job="vm-metrics"}"#),
            Some(1.0)
        );
    }

    #[tokio::test]
    async fn shares_a_registry_with_the_sink() {
        let registry = Registry::new();
        let sink = PrometheusMetricSink::new(registry.clone());
        let metrics = PrometheusSystemMetrics::new(registry.clone());

        sink.write(&scrape_model::MetricSample {
            name: "azure_vm_cpu".into(),
            description: "cpu".into(),
            value: Some(3.0),
            labels: Default::default(),
        })
        .await
        .unwrap();
        metrics
            .write_gauge("scrape_definitions_total", "definitions", 4.0, &[])
            .await
            .unwrap();

        let text = crate::render(&registry).unwrap();
        assert_eq!(crate::sample_value(&text, "azure_vm_cpu"), Some(3.0));
        assert_eq!(crate::sample_value(&text, "scrape_definitions_total"), Some(4.0));
    }
}
