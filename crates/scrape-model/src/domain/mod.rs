mod cloud;
pub use cloud::{AzureCloud, CloudEndpoints, CloudEnvironment};

mod declaration;
pub use declaration::{AzureMetadata, MetricDefaults, MetricsDeclaration, Scraping};

mod metric;
pub use metric::{
    AggregationType, AzureMetricConfiguration, MetricAggregation, MetricDefinition,
    PrometheusMetricDefinition, ResourceDiscoveryGroup,
};

mod resource;
pub use resource::{ResourceDefinition, ResourceScope, ResourceType};

mod scrape;
pub use scrape::{BatchScrapeDefinition, ScrapeDefinition, ScrapeDefinitionBatchProperties};

mod sample;
pub use sample::{MeasuredValue, MetricSample};

mod job_state;
pub use job_state::JobState;

/// Name of a resource discovery group as referenced from a metric definition.
pub type DiscoveryGroupName = String;

/// Azure subscription identifier.
pub type SubscriptionId = String;
