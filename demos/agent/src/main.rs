mod config;
mod http;
mod simulated;

use std::{path::PathBuf, sync::Arc, time::Duration};

use scrape_core::{
    AdmissionGate, Collaborators, EnvironmentCredentialProvider, InMemoryMetricDefinitionCache,
    MonitorClientCache, MonitorScraperProvider, ScraperRouter, ScrapingJob,
};
use scrape_observe::logger_init;
use scrape_prometheus::{PrometheusMetricSink, PrometheusSystemMetrics, Registry};
use tokio::{
    net::TcpListener,
    time::{MissedTickBehavior, interval},
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::{
    config::AgentConfig,
    simulated::{SimulatedClientBuilder, SimulatedDiscovery},
};

const JOB_NAME: &str = "azure-monitor-metrics";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1) Config + logger
    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let cfg = AgentConfig::load(path.as_deref())?;
    let logging = cfg.logging.clone().with_api_traffic(&cfg.runtime.azure_monitor.logging);
    logger_init(&logging)?;
    info!(
        metrics = cfg.metrics_declaration.metrics.len(),
        groups = cfg.discovery_groups.len(),
        "configuration loaded"
    );

    // 2) Prometheus registry shared by the sink and the health gauges
    let registry = Registry::new();
    let sink = Arc::new(PrometheusMetricSink::new(registry.clone()));
    let mut publisher = PrometheusSystemMetrics::new(registry.clone());
    if let Some(prefix) = cfg.server.metrics_prefix.clone() {
        publisher = publisher.with_prefix(prefix);
    }

    // 3) Collaborators + job
    let collaborators = Collaborators {
        discovery: Arc::new(SimulatedDiscovery::new(cfg.discovery_groups)),
        clients: Arc::new(MonitorClientCache::new(Arc::new(SimulatedClientBuilder))),
        credentials: Arc::new(EnvironmentCredentialProvider::new()),
        scrapers: Arc::new(ScraperRouter::new().with(Arc::new(MonitorScraperProvider::metrics_api()))),
        sink,
        publisher: Arc::new(publisher),
        definition_cache: Arc::new(InMemoryMetricDefinitionCache::new()),
    };
    let gate = AdmissionGate::from_config(&cfg.runtime.concurrency);
    let job = ScrapingJob::new(
        JOB_NAME,
        Arc::new(cfg.metrics_declaration),
        collaborators,
        gate,
        cfg.runtime,
    )?;
    info!(job = JOB_NAME, "scraping job ready");

    // 4) HTTP exposition
    let shutdown = CancellationToken::new();
    let listener = TcpListener::bind(cfg.server.bind).await?;
    let server = tokio::spawn(http::serve(
        listener,
        http::router(registry, job.clone()),
        shutdown.clone(),
    ));

    let on_signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("shutting down..."),
            Err(e) => error!(error = %e, "failed to listen for ctrl-c, shutting down"),
        }
        on_signal.cancel();
    });

    // 5) Trigger loop; runs never overlap
    let mut ticker = interval(Duration::from_secs(cfg.scrape_interval_seconds.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    info!(interval_secs = cfg.scrape_interval_seconds, "press Ctrl+C to stop");
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {
                let report = job.execute(shutdown.child_token()).await;
                info!(
                    job = JOB_NAME,
                    run_id = %report.run_id,
                    outcome = report.outcome.as_str(),
                    definitions = report.definitions,
                    duration_ms = report.duration.as_millis() as u64,
                    "scrape run finished"
                );
            }
        }
    }

    server.await??;
    Ok(())
}
