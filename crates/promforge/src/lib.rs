//! promforge: an in-process metrics client.
//!
//! Application code registers named, typed metric families (counters,
//! gauges, histograms, summaries), updates them from any number of threads
//! through lock-free value cells, and a collection pass serializes the
//! current state into the text exposition format with a flush between
//! families.
//!
//! ```no_run
//! # async fn demo() -> promforge::Result<()> {
//! use std::sync::Arc;
//! use promforge::{CollectorRegistry, MetricFactory, TextMetricsWriter};
//! use tokio_util::sync::CancellationToken;
//!
//! let registry = Arc::new(CollectorRegistry::new());
//! let factory = MetricFactory::new(registry.clone());
//!
//! let requests = factory.counter("http_requests_total", "Requests served.", &["code"])?;
//! requests.with_labels(&["200"])?.inc();
//!
//! let mut writer = TextMetricsWriter::new(Vec::new());
//! registry.collect_to(&mut writer, &CancellationToken::new()).await?;
//! # Ok(())
//! # }
//! ```

pub mod atomics;
pub mod collector;
pub mod config;
pub mod factory;
pub mod family;
pub mod metrics;
pub mod registry;

pub use promforge_core::error;
pub use promforge_core::exposition;
pub use promforge_core::validation;
pub use promforge_core::{ErrorKind, MetricsError, Result};

pub use collector::Collector;
pub use config::{FamilyConfig, MetricConfig};
pub use exposition::{MetricType, MetricsWriter, SampleValue, TextMetricsWriter};
pub use factory::MetricFactory;
pub use family::{Metric, MetricFamily};
pub use metrics::{
    Counter, Gauge, Histogram, HistogramConfig, IntCounter, IntGauge, QuantileEpsilonPair,
    Summary, SummaryConfig, Untyped,
};
pub use registry::CollectorRegistry;
