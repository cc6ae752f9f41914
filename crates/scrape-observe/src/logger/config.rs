use std::io::IsTerminal;

use scrape_model::{API_TRAFFIC_TARGET, AzureMonitorLoggingConfig};
use serde::Deserialize;

use crate::logger::format::LoggerFormat;

/// Logger settings, usually read from the `logging` section of the agent config.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    /// `EnvFilter` directive or a verbosity name (`information`, `warning`, ...).
    pub level: String,
    pub with_targets: bool,
    pub use_color: bool,
    /// Verbosity for monitoring API traffic; `None` silences it.
    #[serde(skip)]
    pub api_traffic: Option<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::Text,
            level: "info".to_string(),
            with_targets: true,
            use_color: std::io::stdout().is_terminal(),
            api_traffic: None,
        }
    }
}

impl LoggerConfig {
    /// Take the API traffic switch from the runtime's monitor logging section.
    pub fn with_api_traffic(mut self, logging: &AzureMonitorLoggingConfig) -> Self {
        self.api_traffic = logging.traffic_level().map(str::to_string);
        self
    }

    /// Filter directive with verbosity names mapped onto `tracing` levels.
    ///
    /// Anything that is not a bare verbosity name (e.g. `scrape_core=debug,info`)
    /// is passed through untouched. The API traffic target is always pinned,
    /// to `off` unless traffic logging was switched on.
    pub fn directive(&self) -> String {
        let base = map_verbosity(&self.level);
        let traffic = self.api_traffic.as_deref().map_or("off", map_verbosity);
        format!("{base},{API_TRAFFIC_TARGET}={traffic}")
    }
}

fn map_verbosity(level: &str) -> &str {
    let level = level.trim();
    match level.to_ascii_lowercase().as_str() {
        "trace" | "verbose" => "trace",
        "debug" => "debug",
        "info" | "information" => "info",
        "warn" | "warning" => "warn",
        "error" | "critical" | "fatal" => "error",
        "off" | "none" => "off",
        _ => level,
    }
}
