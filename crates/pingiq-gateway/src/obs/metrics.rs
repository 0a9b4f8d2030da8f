//! Counter/gauge registry with Prometheus-compatible text exposition.
//!
//! Metrics are keyed by name and rendered in registration order. Each metric's
//! value space is partitioned by the tuple of its configured label values;
//! series render in insertion order. Cardinality is expected to stay small
//! (one series per endpoint), so series live in a plain `Vec`.

use std::fmt::Write;
use std::sync::{PoisonError, RwLock};

use pingiq_core::error::{PingIqError, Result};

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
}

impl MetricKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
        }
    }
}

#[derive(Debug)]
struct Metric {
    name: String,
    help: Option<String>,
    kind: MetricKind,
    label_names: Vec<String>,
    series: Vec<(Vec<String>, f64)>,
}

impl Metric {
    /// Project caller-supplied pairs onto the configured label order.
    /// Missing labels become empty strings; unknown ones are ignored.
    fn key(&self, labels: &[(&str, &str)]) -> Vec<String> {
        self.label_names
            .iter()
            .map(|name| {
                labels
                    .iter()
                    .find(|(k, _)| *k == name.as_str())
                    .map(|(_, v)| v.to_string())
                    .unwrap_or_default()
            })
            .collect()
    }

    fn slot(&mut self, key: Vec<String>) -> &mut f64 {
        let idx = match self.series.iter().position(|(k, _)| *k == key) {
            Some(idx) => idx,
            None => {
                self.series.push((key, 0.0));
                self.series.len() - 1
            }
        };
        &mut self.series[idx].1
    }

    fn render(&self, out: &mut String) {
        if let Some(help) = &self.help {
            let _ = writeln!(out, "# HELP {} {}", self.name, help);
        }
        let _ = writeln!(out, "# TYPE {} {}", self.name, self.kind.as_str());
        if self.series.is_empty() {
            let _ = writeln!(out, "{} 0", self.name);
            return;
        }
        for (key, val) in &self.series {
            if self.label_names.is_empty() {
                let _ = writeln!(out, "{} {}", self.name, val);
                continue;
            }
            let label_str = self
                .label_names
                .iter()
                .zip(key)
                .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
                .collect::<Vec<_>>()
                .join(",");
            let _ = writeln!(out, "{}{{{}}} {}", self.name, label_str, val);
        }
    }
}

/// Registry shared by every endpoint invocation of one service instance.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    metrics: RwLock<Vec<Metric>>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a counter. Re-registering a counter is a no-op; re-registering
    /// the name as another kind is an error.
    pub fn counter(&self, name: &str, help: Option<&str>, labels: &[&str]) -> Result<()> {
        self.register(name, help, MetricKind::Counter, labels)
    }

    /// Register a gauge. Same rules as [`MetricsRegistry::counter`].
    pub fn gauge(&self, name: &str, help: Option<&str>, labels: &[&str]) -> Result<()> {
        self.register(name, help, MetricKind::Gauge, labels)
    }

    fn register(&self, name: &str, help: Option<&str>, kind: MetricKind, labels: &[&str]) -> Result<()> {
        let mut metrics = self.metrics.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = metrics.iter().find(|m| m.name == name) {
            if existing.kind != kind {
                return Err(PingIqError::MetricKindConflict {
                    name: name.to_string(),
                    existing: existing.kind.as_str(),
                });
            }
            return Ok(());
        }
        metrics.push(Metric {
            name: name.to_string(),
            help: help.map(str::to_string),
            kind,
            label_names: labels.iter().map(|l| l.to_string()).collect(),
            series: Vec::new(),
        });
        Ok(())
    }

    /// Add `value` to a counter or gauge series.
    pub fn inc(&self, name: &str, value: f64, labels: &[(&str, &str)]) -> Result<()> {
        let mut metrics = self.metrics.write().unwrap_or_else(PoisonError::into_inner);
        let metric = metrics
            .iter_mut()
            .find(|m| m.name == name)
            .ok_or_else(|| PingIqError::UnknownMetric(name.to_string()))?;
        let key = metric.key(labels);
        *metric.slot(key) += value;
        Ok(())
    }

    /// Overwrite a gauge series.
    pub fn set(&self, name: &str, value: f64, labels: &[(&str, &str)]) -> Result<()> {
        let mut metrics = self.metrics.write().unwrap_or_else(PoisonError::into_inner);
        let metric = metrics
            .iter_mut()
            .find(|m| m.name == name)
            .ok_or_else(|| PingIqError::UnknownMetric(name.to_string()))?;
        if metric.kind != MetricKind::Gauge {
            return Err(PingIqError::NotAGauge(name.to_string()));
        }
        let key = metric.key(labels);
        *metric.slot(key) = value;
        Ok(())
    }

    /// Current value of one series, if it has been written.
    pub fn value(&self, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
        let metrics = self.metrics.read().unwrap_or_else(PoisonError::into_inner);
        let metric = metrics.iter().find(|m| m.name == name)?;
        let key = metric.key(labels);
        metric.series.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    }

    /// Render every metric; blocks are separated by a blank line.
    pub fn exposition(&self) -> String {
        let metrics = self.metrics.read().unwrap_or_else(PoisonError::into_inner);
        let mut out = String::new();
        for (i, m) in metrics.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            m.render(&mut out);
        }
        out
    }
}
