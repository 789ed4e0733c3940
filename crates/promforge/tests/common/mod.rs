//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use promforge::exposition::{MetricType, MetricsWriter, SampleValue, TextMetricsWriter};
use promforge::{Collector, CollectorRegistry, MetricFactory, Result};

/// Build a registry, apply `setup` through a factory, and return the full
/// exposition document.
pub async fn collect<F>(setup: F) -> String
where
    F: FnOnce(&MetricFactory) -> Result<()>,
{
    let registry = Arc::new(CollectorRegistry::new());
    let factory = MetricFactory::new(registry.clone());
    setup(&factory).expect("metrics setup failed");

    let mut writer = TextMetricsWriter::new(Vec::new());
    registry
        .collect_to(&mut writer, &CancellationToken::new())
        .await
        .expect("collection failed");
    writer.close().await.expect("close failed");

    String::from_utf8(writer.into_inner()).expect("non-utf8 output")
}

/// Collector stub with a fixed name and sample-name list; emits nothing.
#[derive(Debug)]
pub struct DummyCollector {
    name: String,
    metric_names: Vec<String>,
}

impl DummyCollector {
    pub fn new(name: &str, metric_names: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            metric_names: metric_names.iter().map(|m| m.to_string()).collect(),
        })
    }
}

impl Collector for DummyCollector {
    fn name(&self) -> &str {
        &self.name
    }

    fn metric_names(&self) -> &[String] {
        &self.metric_names
    }

    fn collect(&self, _writer: &mut dyn MetricsWriter) -> Result<()> {
        Ok(())
    }

    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Writer that discards samples and counts flushes.
#[derive(Default)]
pub struct CountingWriter {
    pub flushes: Arc<AtomicUsize>,
}

impl CountingWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetricsWriter for CountingWriter {
    fn write_family_header(
        &mut self,
        _name: &str,
        _help: &str,
        _metric_type: MetricType,
    ) -> Result<()> {
        Ok(())
    }

    fn write_sample(
        &mut self,
        _name: &str,
        _suffix: &str,
        _label_names: &[String],
        _label_values: &[String],
        _extra_label: Option<(&str, &str)>,
        _value: SampleValue,
        _timestamp: Option<i64>,
    ) -> Result<()> {
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
