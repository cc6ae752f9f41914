use std::collections::HashMap;

use scrape_model::{
    BatchScrapeDefinition, ResourceType, ScrapeDefinition, ScrapeDefinitionBatchProperties,
};

#[derive(PartialEq, Eq, Hash)]
struct BatchKey {
    subscription_id: String,
    resource_type: ResourceType,
    azure_metric_name: String,
}

impl BatchKey {
    fn of(def: &ScrapeDefinition) -> Self {
        Self {
            subscription_id: def.subscription_id.clone(),
            resource_type: def.resource_type(),
            azure_metric_name: def.azure_metric_configuration.metric_name.clone(),
        }
    }
}

/// Group definitions sharing subscription, resource type and Azure metric into batches
/// of at most `max_batch_size` members.
///
/// Groups keep first-seen order and members keep input order. The batch header is
/// taken from the first member of each batch. A size of `0` is treated as `1`.
pub fn group_scrape_definitions(
    definitions: Vec<ScrapeDefinition>,
    max_batch_size: usize,
) -> Vec<BatchScrapeDefinition> {
    let max_batch_size = max_batch_size.max(1);

    let mut index: HashMap<BatchKey, usize> = HashMap::new();
    let mut groups: Vec<Vec<ScrapeDefinition>> = Vec::new();
    for def in definitions {
        let slot = *index.entry(BatchKey::of(&def)).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(def);
    }

    let mut batches = Vec::new();
    for group in groups {
        let mut members = group.into_iter().peekable();
        while members.peek().is_some() {
            let chunk: Vec<_> = members.by_ref().take(max_batch_size).collect();
            let properties = ScrapeDefinitionBatchProperties::from_definition(&chunk[0]);
            batches.push(BatchScrapeDefinition::new(properties, chunk));
        }
    }
    batches
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrape_model::{
        AzureMetadata, AzureMetricConfiguration, MetricDefinition, PrometheusMetricDefinition,
        ResourceDefinition,
    };

    fn def(sub: &str, rt: ResourceType, azure_metric: &str, name: &str) -> ScrapeDefinition {
        let metric = MetricDefinition {
            prometheus_metric_definition: Some(PrometheusMetricDefinition {
                name: format!("{azure_metric}_metric").to_lowercase(),
                ..Default::default()
            }),
            azure_metric_configuration: Some(AzureMetricConfiguration {
                metric_name: azure_metric.into(),
                ..Default::default()
            }),
            resource_type: rt,
            scraping: None,
            resources: vec![],
            resource_discovery_groups: vec![],
        };
        let metadata = AzureMetadata {
            subscription_id: "default".into(),
            resource_group_name: "rg".into(),
            ..Default::default()
        };
        metric
            .create_scrape_definition(ResourceDefinition::resource(rt, name).with_subscription(sub), &metadata)
            .unwrap()
    }

    fn names(batch: &BatchScrapeDefinition) -> Vec<&str> {
        batch
            .scrape_definitions
            .iter()
            .map(|d| d.resource.resource_name())
            .collect()
    }

    #[test]
    fn chunks_each_group_preserving_order() {
        let defs: Vec<_> = (0..7)
            .map(|i| def("sub", ResourceType::VirtualMachine, "CPU", &format!("vm-{i}")))
            .collect();

        let batches = group_scrape_definitions(defs, 3);
        assert_eq!(batches.len(), 3);
        assert_eq!(names(&batches[0]), ["vm-0", "vm-1", "vm-2"]);
        assert_eq!(names(&batches[1]), ["vm-3", "vm-4", "vm-5"]);
        assert_eq!(names(&batches[2]), ["vm-6"]);
        assert_eq!(batches[0].properties.subscription_id, "sub");
        assert_eq!(batches[0].azure_metric_name(), "CPU");
    }

    #[test]
    fn key_separates_subscription_type_and_metric() {
        let defs = vec![
            def("a", ResourceType::VirtualMachine, "CPU", "vm-1"),
            def("b", ResourceType::VirtualMachine, "CPU", "vm-2"),
            def("a", ResourceType::VirtualMachine, "Disk", "vm-3"),
            def("a", ResourceType::RedisCache, "CPU", "cache-1"),
            def("a", ResourceType::VirtualMachine, "CPU", "vm-4"),
        ];

        let batches = group_scrape_definitions(defs, 50);
        assert_eq!(batches.len(), 4);
        assert_eq!(names(&batches[0]), ["vm-1", "vm-4"]);
        assert_eq!(names(&batches[1]), ["vm-2"]);
        assert_eq!(names(&batches[2]), ["vm-3"]);
        assert_eq!(names(&batches[3]), ["cache-1"]);
    }

    #[test]
    fn zero_batch_size_means_one_per_batch() {
        let defs: Vec<_> = (0..3)
            .map(|i| def("sub", ResourceType::StorageAccount, "Used", &format!("acct-{i}")))
            .collect();

        let batches = group_scrape_definitions(defs, 0);
        assert_eq!(batches.len(), 3);
        assert!(batches.iter().all(|b| b.len() == 1));
    }

    #[test]
    fn empty_input_yields_no_batches() {
        assert!(group_scrape_definitions(Vec::new(), 10).is_empty());
    }
}
