//! The scraping job: one declaration, executed on every trigger.
//!
//! A run expands the declaration into scrape definitions, optionally batches them and
//! scrapes everything under the job's [`AdmissionGate`] before a run deadline composed
//! of caller cancellation and the gate timeout (the configured mutex timeout when the
//! job has no gate).

mod report;
pub use report::RunReport;
use report::RunStats;

mod schedule;
pub use schedule::verify_common_schedule;

use std::{sync::Arc, time::Duration};

use scrape_model::{JobState, MetricsDeclaration, RuntimeConfig, ScrapeDefinition};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::{
    batch::group_scrape_definitions,
    client::{MetricDefinitionCache, MonitorClientFactory},
    credential::CredentialProvider,
    deadline::RunDeadline,
    discovery::ResourceDiscovery,
    error::CoreError,
    execute::ScrapeExecutor,
    expand::DiscoveryExpander,
    gate::AdmissionGate,
    scheduler::TaskScheduler,
    scraper::ScraperFactory,
    sink::{MetricSink, SystemMetricsPublisher},
    state::{RunState, log_transition, message_for},
};

/// External services a job talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub discovery: Arc<dyn ResourceDiscovery>,
    pub clients: Arc<dyn MonitorClientFactory>,
    pub credentials: Arc<dyn CredentialProvider>,
    pub scrapers: Arc<dyn ScraperFactory>,
    pub sink: Arc<dyn MetricSink>,
    pub publisher: Arc<dyn SystemMetricsPublisher>,
    pub definition_cache: Arc<dyn MetricDefinitionCache>,
}

/// Scraping job over one metrics declaration. Cheap to clone.
#[derive(Clone)]
pub struct ScrapingJob {
    inner: Arc<JobInner>,
}

struct JobInner {
    name: Arc<str>,
    declaration: Arc<MetricsDeclaration>,
    collaborators: Collaborators,
    gate: Option<AdmissionGate>,
    config: Arc<RuntimeConfig>,
    expander: DiscoveryExpander,
    executor: Arc<ScrapeExecutor>,
    state: RunState,
}

impl ScrapingJob {
    /// Build a job, checking that every metric shares one scraping schedule.
    ///
    /// `gate` is shared with other jobs when the host wants one global cap.
    pub fn new(
        name: impl Into<String>,
        declaration: Arc<MetricsDeclaration>,
        collaborators: Collaborators,
        gate: Option<AdmissionGate>,
        config: RuntimeConfig,
    ) -> Result<Self, CoreError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CoreError::InvalidJob("job name must not be blank".into()));
        }
        verify_common_schedule(&declaration)?;

        let name: Arc<str> = Arc::from(name);
        let config = Arc::new(config);
        let expander = DiscoveryExpander::new(
            name.clone(),
            declaration.clone(),
            collaborators.discovery.clone(),
        );
        let executor = Arc::new(ScrapeExecutor::new(
            name.clone(),
            declaration.clone(),
            collaborators.clone(),
            config.clone(),
        ));

        Ok(Self {
            inner: Arc::new(JobInner {
                name,
                declaration,
                collaborators,
                gate,
                config,
                expander,
                executor,
                state: RunState::new(),
            }),
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    #[inline]
    pub fn declaration(&self) -> &Arc<MetricsDeclaration> {
        &self.inner.declaration
    }

    #[inline]
    pub fn gate(&self) -> Option<&AdmissionGate> {
        self.inner.gate.as_ref()
    }

    #[inline]
    pub fn state(&self) -> &RunState {
        &self.inner.state
    }

    /// Expand the declaration into this run's scrape definitions.
    ///
    /// Failing discovery groups and broken metrics are logged and skipped; only
    /// cancellation or a panicking discovery task fails the whole phase.
    pub async fn discover(&self, deadline: &CancellationToken) -> Result<Vec<ScrapeDefinition>, CoreError> {
        let scheduler = self.scheduler(deadline);
        let bag = self.inner.expander.expand(&scheduler).await?;
        Ok(bag.drain())
    }

    /// Run the job once. Never fails and never panics: the outcome is in the report.
    pub async fn execute(&self, cancel: CancellationToken) -> RunReport {
        let run_id = Uuid::new_v4();
        let span = info_span!("scrape_run", job = %self.inner.name, %run_id);
        self.execute_run(run_id, cancel).instrument(span).await
    }

    async fn execute_run(&self, run_id: Uuid, cancel: CancellationToken) -> RunReport {
        let job = self.name();
        let started = Instant::now();
        debug!(job, "started scraping job");

        let timeout = self.run_timeout();
        info!(job, timeout_secs = timeout.as_secs(), "run deadline armed");
        let deadline = RunDeadline::start(&cancel, timeout);

        let this = self.clone();
        let token = deadline.token().clone();
        let body = tokio::spawn(async move { this.run(&token).await }.in_current_span());
        let (stats, result) = match body.await {
            Ok(out) => out,
            Err(join) => (RunStats::default(), Err(CoreError::TaskPanicked(join.to_string()))),
        };

        let (outcome, error) = match result {
            Ok(()) => {
                log_transition(job, JobState::Completed);
                (JobState::Completed, None)
            }
            Err(CoreError::Cancelled) => {
                warn!(job, timed_out = deadline.timed_out(), "{}", message_for(JobState::Cancelled));
                (JobState::Cancelled, Some(CoreError::Cancelled.to_string()))
            }
            Err(e) => {
                error!(job, error = %e, "{}", message_for(JobState::Failed));
                (JobState::Failed, Some(e.to_string()))
            }
        };

        let timed_out = outcome == JobState::Cancelled && deadline.timed_out();
        let report = RunReport {
            run_id,
            job: job.to_string(),
            outcome,
            definitions: stats.definitions,
            batches: stats.batches,
            timed_out,
            duration: started.elapsed(),
            error,
        };
        self.publish_health(&report).await;
        self.inner.state.finish(job, report.clone());

        debug!(job, "ended scraping job");
        report
    }

    async fn run(&self, deadline: &CancellationToken) -> (RunStats, Result<(), CoreError>) {
        let mut stats = RunStats::default();
        let result = self.run_phases(deadline, &mut stats).await;
        (stats, result)
    }

    async fn run_phases(&self, deadline: &CancellationToken, stats: &mut RunStats) -> Result<(), CoreError> {
        let job = self.name();
        let state = &self.inner.state;

        state.transition(job, JobState::Discovering);
        let definitions = self.discover(deadline).await?;
        stats.definitions = definitions.len();

        let scheduler = self.scheduler(deadline);
        let batching = self.inner.config.batching();
        if batching.enabled {
            state.transition(job, JobState::Batching);
            info!(
                job,
                max_batch_size = batching.max_batch_size,
                "operating in batch scraping mode"
            );
            warn!(job, "batch scraping is an experimental feature, mind its limitations and cost");

            let batches = group_scrape_definitions(definitions, batching.effective_max_batch_size());
            stats.batches = Some(batches.len());

            state.transition(job, JobState::Scraping);
            self.inner.executor.scrape_batches(batches, &scheduler).await
        } else {
            state.transition(job, JobState::Scraping);
            self.inner.executor.scrape_each(definitions, &scheduler).await
        }
    }

    /// A shared gate brings its own hold timeout; ungated jobs use the configured one.
    fn run_timeout(&self) -> Duration {
        match &self.inner.gate {
            Some(gate) => gate.timeout(),
            None => self.inner.config.concurrency.mutex_timeout(),
        }
    }

    fn scheduler(&self, deadline: &CancellationToken) -> TaskScheduler {
        TaskScheduler::new(self.inner.name.clone(), self.inner.gate.clone(), deadline.clone())
    }

    async fn publish_health(&self, report: &RunReport) {
        let publisher = &self.inner.collaborators.publisher;
        let gauges = [
            (
                "scrape_run_duration_seconds",
                "Duration of the last scraping run",
                report.duration.as_secs_f64(),
            ),
            (
                "scrape_definitions_total",
                "Scrape definitions produced by the last run",
                report.definitions as f64,
            ),
            (
                "scrape_run_completed",
                "Whether the last scraping run completed",
                if report.is_completed() { 1.0 } else { 0.0 },
            ),
        ];

        for (name, description, value) in gauges {
            if let Err(e) = publisher
                .write_gauge(name, description, value, &[("job", self.name())])
                .await
            {
                warn!(job = self.name(), gauge = name, error = %e, "failed to publish run health");
            }
        }
    }
}
