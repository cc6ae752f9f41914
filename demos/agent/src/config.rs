use std::{collections::BTreeMap, fs, net::SocketAddr, path::Path};

use anyhow::Context;
use scrape_model::{MetricsDeclaration, ResourceType, RuntimeConfig};
use scrape_observe::LoggerConfig;
use serde::Deserialize;

const EMBEDDED: &str = include_str!("../agent.json");

/// Everything the agent needs to start.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfig {
    #[serde(default)]
    pub logging: LoggerConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default = "default_interval")]
    pub scrape_interval_seconds: u64,
    /// Simulated discovery groups, by name.
    #[serde(default)]
    pub discovery_groups: BTreeMap<String, SimulatedGroup>,
    pub metrics_declaration: MetricsDeclaration,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    /// Prefix of the agent's own health gauges.
    pub metrics_prefix: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8888)),
            metrics_prefix: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatedGroup {
    pub resource_type: ResourceType,
    pub count: usize,
}

fn default_interval() -> u64 {
    300
}

impl AgentConfig {
    /// Read the config at `path`, or the embedded demo config when none is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                Self::from_json(&raw).with_context(|| format!("invalid config {}", path.display()))
            }
            None => Self::from_json(EMBEDDED).context("invalid embedded config"),
        }
    }

    /// Parse, apply metric defaults and validate the declaration.
    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let mut cfg: Self = serde_json::from_str(raw)?;
        cfg.metrics_declaration = cfg.metrics_declaration.with_defaults_applied();
        cfg.metrics_declaration.validate()?;
        Ok(cfg)
    }
}
