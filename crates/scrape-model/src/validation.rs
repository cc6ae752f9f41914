//! Structural checks run on a declaration before any job is built from it.
use std::collections::BTreeMap;

use crate::{AzureCloud, AzureMetadata, MetricDefaults, MetricsDeclaration, ModelError, ResourceType};

/// Upper bound for the per-query time series limit.
pub const MAX_METRIC_LIMIT: u32 = 10_000;

/// Validate a declaration, collecting every problem into [`ModelError::Invalid`].
pub fn validate_declaration(decl: &MetricsDeclaration) -> Result<(), ModelError> {
    let mut errors = Vec::new();

    validate_metadata(&decl.azure_metadata, decl, &mut errors);
    validate_defaults(&decl.metric_defaults, &mut errors);
    validate_metrics(decl, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ModelError::Invalid(errors))
    }
}

impl MetricsDeclaration {
    pub fn validate(&self) -> Result<(), ModelError> {
        validate_declaration(self)
    }
}

fn validate_metadata(meta: &AzureMetadata, decl: &MetricsDeclaration, errors: &mut Vec<String>) {
    if meta.tenant_id.trim().is_empty() {
        errors.push("No tenant id is configured".into());
    }
    if meta.subscription_id.trim().is_empty() {
        errors.push("No subscription id is configured".into());
    }
    if meta.resource_group_name.trim().is_empty() {
        errors.push("No resource group name is configured".into());
    }
    if meta.cloud == AzureCloud::Custom {
        validate_custom_cloud(meta, decl, errors);
    }
}

fn validate_custom_cloud(meta: &AzureMetadata, decl: &MetricsDeclaration, errors: &mut Vec<String>) {
    let Some(endpoints) = meta.endpoints.as_ref() else {
        errors.push("Endpoints are not configured for Azure Custom cloud".into());
        return;
    };

    let required = [
        (&endpoints.authentication_endpoint, "authentication endpoint"),
        (&endpoints.resource_manager_endpoint, "resource management endpoint"),
        (&endpoints.management_endpoint, "service management endpoint"),
        (&endpoints.graph_endpoint, "graph endpoint"),
        (&endpoints.storage_endpoint_suffix, "storage service url suffix"),
        (&endpoints.key_vault_suffix, "Key Vault service url suffix"),
        (&endpoints.metrics_client_audience, "metric client audiences endpoint"),
        (&endpoints.metrics_query_audience, "metric query audiences endpoint"),
    ];
    for (value, what) in required {
        if is_blank(value) {
            errors.push(format!("Azure Custom cloud {what} was not configured to query"));
        }
    }

    let uses_log_analytics = decl
        .defined_metrics()
        .any(|m| m.resource_type == ResourceType::LogAnalytics);
    if uses_log_analytics && is_blank(&endpoints.log_analytics_endpoint) {
        errors.push(
            "Azure Custom cloud Log Analytics endpoint was not configured when Log Analytics resource type was used"
                .into(),
        );
    }
}

fn validate_defaults(defaults: &MetricDefaults, errors: &mut Vec<String>) {
    let schedule = defaults.scraping.as_ref().and_then(|s| s.schedule.as_deref());
    if schedule.is_none_or(|s| s.trim().is_empty()) {
        errors.push("No default metric scraping schedule is defined.".into());
    }
    if defaults.limit > MAX_METRIC_LIMIT {
        errors.push(format!("Limit cannot be higher than {MAX_METRIC_LIMIT}"));
    }
    if defaults.limit == 0 {
        errors.push("Limit has to be at least 1".into());
    }
}

fn validate_metrics(decl: &MetricsDeclaration, errors: &mut Vec<String>) {
    if decl.metrics.is_empty() {
        errors.push("No metrics are configured".into());
        return;
    }

    let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
    for (index, metric) in decl.metrics.iter().enumerate() {
        let Some(metric) = metric else {
            errors.push(format!("Metric at index {index} is empty"));
            continue;
        };

        match metric.name() {
            Some(name) if !name.trim().is_empty() => *seen.entry(name).or_default() += 1,
            _ => errors.push(format!("Metric at index {index} has no Prometheus metric name")),
        }

        let metric_label = metric.name().unwrap_or("<unnamed>");
        match metric.azure_metric_configuration.as_ref() {
            Some(azure) if !azure.metric_name.trim().is_empty() => {
                match azure.limit {
                    Some(limit) if limit == 0 || limit > MAX_METRIC_LIMIT => errors.push(format!(
                        "Metric {metric_label} has limit {limit}, expected 1..={MAX_METRIC_LIMIT}"
                    )),
                    _ => {}
                }
            }
            _ => errors.push(format!("Metric {metric_label} has no Azure metric name")),
        }

        if !metric.has_resource_source() {
            errors.push(format!(
                "Metric {metric_label} declares neither resources nor resource discovery groups"
            ));
        }
    }

    for (name, count) in seen {
        if count > 1 {
            errors.push(format!("Metric name '{name}' is declared multiple times"));
        }
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|s| s.trim().is_empty())
}
