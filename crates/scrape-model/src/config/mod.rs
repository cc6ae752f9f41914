//! Runtime configuration read by the job on every run.
use std::time::Duration;

use serde::{Deserialize, Serialize};

const DEFAULT_MAX_DEGREE_OF_PARALLELISM: usize = 8;
const DEFAULT_MUTEX_TIMEOUT_SECONDS: u64 = 60;
/// Azure Monitor accepts at most 50 resources per batch query.
const DEFAULT_MAX_BATCH_SIZE: usize = 50;

/// `tracing` target carrying monitoring API query traffic.
pub const API_TRAFFIC_TARGET: &str = "monitor_api";

/// Top-level runtime settings of the scraping agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuntimeConfig {
    pub concurrency: ConcurrencyConfig,
    pub azure_monitor: AzureMonitorConfig,
}

/// Bounds on concurrent scraping work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConcurrencyConfig {
    /// Maximum number of discovery and scrape tasks in flight.
    ///
    /// `None` or `0` disables the admission gate.
    pub max_degree_of_parallelism: Option<usize>,
    /// Time after which a run stops waiting for its outstanding work.
    pub mutex_timeout_seconds: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AzureMonitorConfig {
    pub integration: IntegrationConfig,
    pub logging: AzureMonitorLoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IntegrationConfig {
    pub metrics_batching: MetricsBatchingConfig,
    /// Use the Azure Monitor SDK query path instead of the legacy management client.
    pub use_azure_monitor_sdk: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetricsBatchingConfig {
    pub enabled: bool,
    pub max_batch_size: usize,
}

/// Logging of the raw monitoring API traffic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AzureMonitorLoggingConfig {
    pub is_enabled: bool,
    pub information_level: Option<String>,
}

impl AzureMonitorLoggingConfig {
    /// Verbosity for [`API_TRAFFIC_TARGET`], or `None` when traffic logging is off.
    ///
    /// A blank `informationLevel` falls back to `info`.
    pub fn traffic_level(&self) -> Option<&str> {
        let level = self
            .information_level
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or("info");
        self.is_enabled.then_some(level)
    }
}

impl ConcurrencyConfig {
    /// Gate capacity, or `None` when concurrency is unbounded.
    pub fn gate_capacity(&self) -> Option<usize> {
        self.max_degree_of_parallelism.filter(|n| *n > 0)
    }

    #[inline]
    pub fn mutex_timeout(&self) -> Duration {
        Duration::from_secs(self.mutex_timeout_seconds)
    }
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            max_degree_of_parallelism: Some(DEFAULT_MAX_DEGREE_OF_PARALLELISM),
            mutex_timeout_seconds: DEFAULT_MUTEX_TIMEOUT_SECONDS,
        }
    }
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        Self {
            metrics_batching: MetricsBatchingConfig::default(),
            use_azure_monitor_sdk: true,
        }
    }
}

impl MetricsBatchingConfig {
    /// Batch size clamped to at least one member.
    #[inline]
    pub fn effective_max_batch_size(&self) -> usize {
        self.max_batch_size.max(1)
    }
}

impl Default for MetricsBatchingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }
}

impl RuntimeConfig {
    #[inline]
    pub fn batching(&self) -> &MetricsBatchingConfig {
        &self.azure_monitor.integration.metrics_batching
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let cfg: RuntimeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, RuntimeConfig::default());
        assert_eq!(cfg.concurrency.gate_capacity(), Some(8));
        assert_eq!(cfg.concurrency.mutex_timeout(), Duration::from_secs(60));
        assert!(!cfg.batching().enabled);
        assert!(cfg.azure_monitor.integration.use_azure_monitor_sdk);
    }

    #[test]
    fn zero_parallelism_disables_gate() {
        let cfg = ConcurrencyConfig {
            max_degree_of_parallelism: Some(0),
            ..Default::default()
        };
        assert_eq!(cfg.gate_capacity(), None);
    }

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let cfg: RuntimeConfig = serde_json::from_value(serde_json::json!({
            "azureMonitor": {
                "integration": { "metricsBatching": { "enabled": true, "maxBatchSize": 0 } }
            }
        }))
        .unwrap();
        assert!(cfg.batching().enabled);
        assert_eq!(cfg.batching().effective_max_batch_size(), 1);
        assert_eq!(cfg.concurrency, ConcurrencyConfig::default());
    }

    #[test]
    fn traffic_level_follows_the_switch() {
        let mut logging = AzureMonitorLoggingConfig {
            is_enabled: false,
            information_level: Some("Debug".into()),
        };
        assert_eq!(logging.traffic_level(), None);

        logging.is_enabled = true;
        assert_eq!(logging.traffic_level(), Some("Debug"));

        logging.information_level = Some("  ".into());
        assert_eq!(logging.traffic_level(), Some("info"));
    }
}
