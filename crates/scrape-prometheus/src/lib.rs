//! Prometheus backend for scraped metrics.
//!
//! [`PrometheusMetricSink`] turns every [`scrape_model::MetricSample`] into a gauge
//! series and [`PrometheusSystemMetrics`] carries the agent's own health gauges. Both
//! write into a shared [`Registry`]; expose it with [`render`]:
//!
//! ```rust,ignore
//! async fn metrics(State(registry): State<Registry>) -> Response {
//!     match scrape_prometheus::render(&registry) {
//!         Ok(body) => ([(CONTENT_TYPE, scrape_prometheus::CONTENT_TYPE)], body).into_response(),
//!         Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
//!     }
//! }
//! ```
//!
//! Gauges are registered lazily on first write. The label names of a gauge are fixed
//! by its first sample; a later sample with another label set is rejected.

mod error;
pub use error::SinkError;

mod family;

mod sink;
pub use sink::PrometheusMetricSink;

mod system;
pub use system::PrometheusSystemMetrics;

pub use prometheus::{Encoder, Registry, TextEncoder};

/// Content type of the text exposition format.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Encode everything gathered from `registry` in the text exposition format.
pub fn render(registry: &Registry) -> Result<String, SinkError> {
    let mut buf = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buf)?;
    String::from_utf8(buf).map_err(|e| SinkError::Encode(e.to_string()))
}

#[cfg(test)]
pub(crate) fn sample_value(text: &str, series: &str) -> Option<f64> {
    text.lines()
        .find_map(|line| line.strip_prefix(series)?.strip_prefix(' '))
        .and_then(|v| v.trim().parse().ok())
}
