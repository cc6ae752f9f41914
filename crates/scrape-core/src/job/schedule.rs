use scrape_model::{MetricDefinition, MetricsDeclaration, Scraping};

use crate::error::CoreError;

/// All metrics of one job must share the first metric's scraping schedule.
///
/// Missing metrics and metrics without scraping settings count as "no schedule".
/// Declarations with a single metric always pass.
pub fn verify_common_schedule(declaration: &MetricsDeclaration) -> Result<(), CoreError> {
    let mut metrics = declaration.metrics.iter();
    let Some(first) = metrics.next() else {
        return Ok(());
    };

    let common = schedule_of(first);
    for (offset, metric) in metrics.enumerate() {
        let schedule = schedule_of(metric);
        if schedule != common {
            return Err(CoreError::ScheduleMismatch {
                index: offset + 1,
                schedule: schedule.schedule_str().to_string(),
                common: common.schedule_str().to_string(),
            });
        }
    }
    Ok(())
}

fn schedule_of(metric: &Option<MetricDefinition>) -> Scraping {
    metric
        .as_ref()
        .and_then(|m| m.scraping.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrape_model::{AzureMetadata, MetricDefaults, ResourceType};

    fn metric(schedule: Option<&str>) -> Option<MetricDefinition> {
        Some(MetricDefinition {
            prometheus_metric_definition: None,
            azure_metric_configuration: None,
            resource_type: ResourceType::Generic,
            scraping: schedule.map(Scraping::new),
            resources: vec![],
            resource_discovery_groups: vec![],
        })
    }

    fn declaration(metrics: Vec<Option<MetricDefinition>>) -> MetricsDeclaration {
        MetricsDeclaration {
            azure_metadata: AzureMetadata::default(),
            metric_defaults: MetricDefaults::default(),
            metrics,
        }
    }

    #[test]
    fn shared_schedule_passes() {
        let decl = declaration(vec![metric(Some("* * * * *")), metric(Some("* * * * *"))]);
        assert!(verify_common_schedule(&decl).is_ok());
    }

    #[test]
    fn mismatch_reports_offending_index() {
        let decl = declaration(vec![
            metric(Some("*/5 * * * *")),
            metric(Some("*/5 * * * *")),
            metric(Some("0 * * * *")),
        ]);
        match verify_common_schedule(&decl) {
            Err(CoreError::ScheduleMismatch { index, schedule, common }) => {
                assert_eq!(index, 2);
                assert_eq!(schedule, "0 * * * *");
                assert_eq!(common, "*/5 * * * *");
            }
            other => panic!("expected schedule mismatch, got {other:?}"),
        }
    }

    #[test]
    fn null_metric_counts_as_no_schedule() {
        let decl = declaration(vec![metric(None), None]);
        assert!(verify_common_schedule(&decl).is_ok());

        let decl = declaration(vec![metric(Some("* * * * *")), None]);
        assert!(matches!(
            verify_common_schedule(&decl),
            Err(CoreError::ScheduleMismatch { index: 1, .. })
        ));
    }

    #[test]
    fn single_or_no_metric_never_fails() {
        assert!(verify_common_schedule(&declaration(vec![metric(Some("x"))])).is_ok());
        assert!(verify_common_schedule(&declaration(vec![None])).is_ok());
        assert!(verify_common_schedule(&declaration(vec![])).is_ok());
    }
}
