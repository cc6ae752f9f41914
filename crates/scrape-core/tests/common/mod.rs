#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use scrape_core::{
    ClientBuilder, ClientContext, Collaborators, EnvironmentCredentialProvider,
    InMemoryMetricDefinitionCache, MetricSink, MonitorClient, MonitorClientCache,
    MonitorScraperProvider, ResourceDiscovery, ScrapeError, Scraper, ScraperContext,
    ScraperProvider, ScraperRouter, ScrapingJob, SystemMetricsPublisher,
};
use scrape_model::{
    AzureMetadata, AzureMetricConfiguration, BatchScrapeDefinition, MeasuredValue, MetricDefaults,
    MetricDefinition, MetricSample, MetricsDeclaration, PrometheusMetricDefinition,
    ResourceDefinition, ResourceDiscoveryGroup, ResourceType, RuntimeConfig, ScrapeDefinition,
    Scraping,
};

pub const SCHEDULE: &str = "*/5 * * * *";

// ---- declarations ----

pub fn metric(name: &str, resources: &[&str], groups: &[&str]) -> MetricDefinition {
    MetricDefinition {
        prometheus_metric_definition: Some(PrometheusMetricDefinition {
            name: name.into(),
            description: format!("{name} description"),
            ..Default::default()
        }),
        azure_metric_configuration: Some(AzureMetricConfiguration {
            metric_name: "Percentage CPU".into(),
            ..Default::default()
        }),
        resource_type: ResourceType::VirtualMachine,
        scraping: Some(Scraping::new(SCHEDULE)),
        resources: resources
            .iter()
            .map(|r| Some(ResourceDefinition::resource(ResourceType::VirtualMachine, *r)))
            .collect(),
        resource_discovery_groups: groups
            .iter()
            .map(|g| Some(ResourceDiscoveryGroup::named(*g)))
            .collect(),
    }
}

pub fn declaration(metrics: Vec<Option<MetricDefinition>>) -> Arc<MetricsDeclaration> {
    Arc::new(MetricsDeclaration {
        azure_metadata: AzureMetadata {
            tenant_id: "tenant".into(),
            subscription_id: "sub".into(),
            resource_group_name: "rg".into(),
            ..Default::default()
        },
        metric_defaults: MetricDefaults {
            scraping: Some(Scraping::new(SCHEDULE)),
            ..Default::default()
        },
        metrics,
    })
}

pub fn vm_names(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("vm-{i}")).collect()
}

pub fn config(parallelism: Option<usize>, timeout_secs: u64) -> RuntimeConfig {
    let mut cfg = RuntimeConfig::default();
    cfg.concurrency.max_degree_of_parallelism = parallelism;
    cfg.concurrency.mutex_timeout_seconds = timeout_secs;
    cfg
}

// ---- discovery ----

#[derive(Default)]
pub struct FakeDiscovery {
    groups: HashMap<String, Result<Vec<ResourceDefinition>, String>>,
    delay: Option<Duration>,
    pub calls: AtomicUsize,
    current: AtomicUsize,
    pub peak: AtomicUsize,
}

impl FakeDiscovery {
    pub fn with_group(mut self, name: &str, resources: &[&str]) -> Self {
        let resources = resources
            .iter()
            .map(|r| ResourceDefinition::resource(ResourceType::VirtualMachine, *r))
            .collect();
        self.groups.insert(name.into(), Ok(resources));
        self
    }

    /// Every lookup takes `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_failing_group(mut self, name: &str) -> Self {
        self.groups.insert(name.into(), Err("discovery agent unreachable".into()));
        self
    }
}

#[async_trait]
impl ResourceDiscovery for FakeDiscovery {
    async fn resource_discovery_group(&self, name: &str) -> Result<Vec<ResourceDefinition>, ScrapeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        match self.delay {
            Some(delay) => tokio::time::sleep(delay).await,
            None => tokio::task::yield_now().await,
        }
        self.current.fetch_sub(1, Ordering::SeqCst);

        match self.groups.get(name) {
            Some(Ok(resources)) => Ok(resources.clone()),
            Some(Err(reason)) => Err(ScrapeError::Discovery {
                group: name.into(),
                reason: reason.clone(),
            }),
            None => Err(ScrapeError::Discovery {
                group: name.into(),
                reason: "unknown group".into(),
            }),
        }
    }
}

// ---- scrapers ----

#[derive(Clone, Copy, Debug)]
pub enum Behaviour {
    Succeed,
    Sleep(Duration),
    Hang,
    Fail,
    Panic,
}

/// Records every scrape and tracks how many run at once.
pub struct Recorder {
    behaviour: Behaviour,
    scraped: Mutex<Vec<String>>,
    batches: Mutex<Vec<Vec<String>>>,
    current: AtomicUsize,
    pub peak: AtomicUsize,
}

impl Recorder {
    pub fn new(behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            behaviour,
            scraped: Mutex::new(Vec::new()),
            batches: Mutex::new(Vec::new()),
            current: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        })
    }

    pub fn scraped(&self) -> Vec<String> {
        let mut names = self.scraped.lock().unwrap().clone();
        names.sort();
        names
    }

    pub fn batches(&self) -> Vec<Vec<String>> {
        let mut batches = self.batches.lock().unwrap().clone();
        batches.sort();
        batches
    }

    async fn act(&self) -> Result<(), ScrapeError> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let outcome = match self.behaviour {
            Behaviour::Succeed => Ok(()),
            Behaviour::Sleep(d) => {
                tokio::time::sleep(d).await;
                Ok(())
            }
            Behaviour::Hang => {
                std::future::pending::<()>().await;
                Ok(())
            }
            Behaviour::Fail => Err(ScrapeError::Remote("throttled".into())),
            Behaviour::Panic => panic!("scraper panicked"),
        };

        self.current.fetch_sub(1, Ordering::SeqCst);
        outcome
    }
}

struct RecordingScraper(Arc<Recorder>);

#[async_trait]
impl Scraper for RecordingScraper {
    async fn scrape(&self, def: &ScrapeDefinition) -> Result<(), ScrapeError> {
        self.0
            .scraped
            .lock()
            .unwrap()
            .push(def.resource.resource_name().to_string());
        self.0.act().await
    }

    async fn batch_scrape(&self, batch: &BatchScrapeDefinition) -> Result<(), ScrapeError> {
        let names = batch
            .scrape_definitions
            .iter()
            .map(|d| d.resource.resource_name().to_string())
            .collect();
        self.0.batches.lock().unwrap().push(names);
        self.0.act().await
    }
}

pub struct RecordingProvider(pub Arc<Recorder>);

impl ScraperProvider for RecordingProvider {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn supports(&self, _resource_type: ResourceType) -> bool {
        true
    }

    fn build(&self, _ctx: ScraperContext) -> Result<Box<dyn Scraper>, ScrapeError> {
        Ok(Box::new(RecordingScraper(self.0.clone())))
    }
}

// ---- clients ----

/// Reports one series per resource with a value derived from the resource name length.
pub struct StaticClient {
    subscription: String,
}

#[async_trait]
impl MonitorClient for StaticClient {
    fn tenant_id(&self) -> &str {
        "tenant"
    }

    fn subscription_id(&self) -> &str {
        &self.subscription
    }

    async fn query(&self, def: &ScrapeDefinition) -> Result<Vec<MeasuredValue>, ScrapeError> {
        let name = def.resource.resource_name();
        Ok(vec![MeasuredValue::new(name.len() as f64).with_dimension("Instance", name)])
    }
}

#[derive(Default)]
pub struct StaticClientBuilder {
    pub built: AtomicUsize,
}

impl ClientBuilder for StaticClientBuilder {
    fn build(&self, ctx: &ClientContext<'_>) -> Result<Arc<dyn MonitorClient>, ScrapeError> {
        self.built.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(StaticClient {
            subscription: ctx.subscription_id.to_string(),
        }))
    }
}

// ---- sinks ----

#[derive(Default)]
pub struct MemorySink {
    pub samples: Mutex<Vec<MetricSample>>,
}

#[async_trait]
impl MetricSink for MemorySink {
    async fn write(&self, sample: &MetricSample) -> Result<(), ScrapeError> {
        self.samples.lock().unwrap().push(sample.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryPublisher {
    pub gauges: Mutex<Vec<(String, f64)>>,
}

impl MemoryPublisher {
    pub fn last(&self, name: &str) -> Option<f64> {
        self.gauges
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }
}

#[async_trait]
impl SystemMetricsPublisher for MemoryPublisher {
    async fn write_gauge(
        &self,
        name: &str,
        _description: &str,
        value: f64,
        _labels: &[(&str, &str)],
    ) -> Result<(), ScrapeError> {
        self.gauges.lock().unwrap().push((name.to_string(), value));
        Ok(())
    }
}

// ---- harness ----

pub struct Harness {
    pub discovery: Arc<FakeDiscovery>,
    pub recorder: Arc<Recorder>,
    pub clients: Arc<StaticClientBuilder>,
    pub sink: Arc<MemorySink>,
    pub publisher: Arc<MemoryPublisher>,
    router: Arc<ScraperRouter>,
}

impl Harness {
    /// Scrapes go to a [`Recorder`] with the given behaviour.
    pub fn recording(discovery: FakeDiscovery, behaviour: Behaviour) -> Self {
        let recorder = Recorder::new(behaviour);
        let router = ScraperRouter::new().with(Arc::new(RecordingProvider(recorder.clone())));
        Self::with_router(discovery, recorder, router)
    }

    /// Scrapes go through the real monitor scraper into [`MemorySink`].
    pub fn monitor(discovery: FakeDiscovery) -> Self {
        let router = ScraperRouter::new().with(Arc::new(MonitorScraperProvider::metrics_api()));
        Self::with_router(discovery, Recorder::new(Behaviour::Succeed), router)
    }

    fn with_router(discovery: FakeDiscovery, recorder: Arc<Recorder>, router: ScraperRouter) -> Self {
        Self {
            discovery: Arc::new(discovery),
            recorder,
            clients: Arc::new(StaticClientBuilder::default()),
            sink: Arc::new(MemorySink::default()),
            publisher: Arc::new(MemoryPublisher::default()),
            router: Arc::new(router),
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            discovery: self.discovery.clone(),
            clients: Arc::new(MonitorClientCache::new(self.clients.clone())),
            credentials: Arc::new(EnvironmentCredentialProvider::new()),
            scrapers: self.router.clone(),
            sink: self.sink.clone(),
            publisher: self.publisher.clone(),
            definition_cache: Arc::new(InMemoryMetricDefinitionCache::new()),
        }
    }

    pub fn job(&self, declaration: Arc<MetricsDeclaration>, config: RuntimeConfig) -> ScrapingJob {
        let gate = scrape_core::AdmissionGate::from_config(&config.concurrency);
        ScrapingJob::new("vm-metrics", declaration, self.collaborators(), gate, config)
            .expect("valid job")
    }
}
