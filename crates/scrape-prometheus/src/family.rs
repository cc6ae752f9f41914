use std::{
    collections::{BTreeMap, HashMap, hash_map::Entry},
    sync::{Mutex, MutexGuard},
};

use prometheus::{GaugeVec, Opts, Registry};
use tracing::debug;

use crate::error::SinkError;

/// Gauges registered on demand, keyed by metric name.
pub(crate) struct GaugeFamilies {
    registry: Registry,
    gauges: Mutex<HashMap<String, Family>>,
}

struct Family {
    vec: GaugeVec,
    labels: Vec<String>,
}

impl GaugeFamilies {
    pub(crate) fn new(registry: Registry) -> Self {
        Self {
            registry,
            gauges: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Set one series of gauge `name`, registering the gauge on first use.
    pub(crate) fn set(
        &self,
        name: &str,
        help: &str,
        labels: &BTreeMap<String, String>,
        value: f64,
    ) -> Result<(), SinkError> {
        let name = sanitize(name, true);
        let series: BTreeMap<String, &str> = labels
            .iter()
            .map(|(k, v)| (sanitize(k, false), v.as_str()))
            .collect();

        let mut gauges = self.lock();
        let family = match gauges.entry(name.clone()) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => {
                let help = if help.trim().is_empty() { e.key().as_str() } else { help };
                let label_names: Vec<&str> = series.keys().map(String::as_str).collect();
                let vec = GaugeVec::new(Opts::new(e.key().as_str(), help), &label_names)?;
                self.registry.register(Box::new(vec.clone()))?;
                debug!(metric = %e.key(), labels = ?label_names, "registered gauge");

                let labels = series.keys().cloned().collect();
                e.insert(Family { vec, labels })
            }
        };

        if !family.labels.iter().eq(series.keys()) {
            return Err(SinkError::LabelMismatch {
                metric: name,
                expected: family.labels.join(","),
                got: series.keys().cloned().collect::<Vec<_>>().join(","),
            });
        }

        let values: Vec<&str> = series.values().copied().collect();
        family.vec.get_metric_with_label_values(&values)?.set(value);
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Family>> {
        self.gauges.lock().unwrap_or_else(|p| p.into_inner())
    }
}

/// Map arbitrary text onto the Prometheus name alphabet.
fn sanitize(raw: &str, metric: bool) -> String {
    let mut out: String = raw
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '_' => c,
            ':' if metric => c,
            _ => '_',
        })
        .collect();
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn sanitizes_names() {
        assert_eq!(sanitize("queue-length", true), "queue_length");
        assert_eq!(sanitize("ns:queue", true), "ns:queue");
        assert_eq!(sanitize("ns:queue", false), "ns_queue");
        assert_eq!(sanitize("5xx", false), "_5xx");
        assert_eq!(sanitize("", false), "_");
    }

    #[test]
    fn registers_once_and_updates_series() {
        let families = GaugeFamilies::new(Registry::new());
        let l = labels(&[("resource_uri", "/a")]);
        families.set("vm_cpu", "cpu", &l, 1.0).unwrap();
        families.set("vm_cpu", "cpu", &l, 2.0).unwrap();
        families
            .set("vm_cpu", "cpu", &labels(&[("resource_uri", "/b")]), 3.0)
            .unwrap();

        let text = crate::render(families.registry()).unwrap();
        assert_eq!(text.matches("# TYPE vm_cpu gauge").count(), 1);
        assert_eq!(crate::sample_value(&text, r#"vm_cpu{resource_uri="/a"}"#), Some(2.0));
        assert_eq!(crate::sample_value(&text, r#"vm_cpu{resource_uri="/b"}"#), Some(3.0));
    }

    #[test]
    fn label_set_is_fixed_by_first_sample() {
        let families = GaugeFamilies::new(Registry::new());
        families
            .set("vm_cpu", "cpu", &labels(&[("resource_uri", "/a")]), 1.0)
            .unwrap();

        let err = families
            .set("vm_cpu", "cpu", &labels(&[("resource_uri", "/a"), ("instance", "0")]), 1.0)
            .unwrap_err();
        assert!(matches!(err, SinkError::LabelMismatch { ref metric, .. } if metric == "vm_cpu"));
    }

    #[test]
    fn empty_help_falls_back_to_name() {
        let families = GaugeFamilies::new(Registry::new());
        families.set("up", "", &BTreeMap::new(), 1.0).unwrap();
        let text = crate::render(families.registry()).unwrap();
        assert!(text.contains("# HELP up up"));
    }
}
