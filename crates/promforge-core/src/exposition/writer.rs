//! Streaming writer contract for one collection pass.

use async_trait::async_trait;

use crate::error::Result;

/// Metric kind reported on the `# TYPE` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Gauge,
    Histogram,
    Summary,
    Untyped,
}

impl MetricType {
    /// Wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            MetricType::Counter => "counter",
            MetricType::Gauge => "gauge",
            MetricType::Histogram => "histogram",
            MetricType::Summary => "summary",
            MetricType::Untyped => "untyped",
        }
    }
}

/// A sample value on the wire.
///
/// Integer metrics render through `I64` so 64-bit counters do not lose
/// precision on the way out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleValue {
    F64(f64),
    I64(i64),
}

impl From<f64> for SampleValue {
    fn from(v: f64) -> Self {
        SampleValue::F64(v)
    }
}

impl From<i64> for SampleValue {
    fn from(v: i64) -> Self {
        SampleValue::I64(v)
    }
}

impl std::fmt::Display for SampleValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            SampleValue::F64(v) => f.write_str(&format_double(v)),
            SampleValue::I64(v) => write!(f, "{v}"),
        }
    }
}

/// Render a double the way scrapers expect it.
pub fn format_double(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v == f64::INFINITY {
        "+Inf".to_string()
    } else if v == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        format!("{v}")
    }
}

/// Sink for one collection pass.
///
/// Sample writes are synchronous and cheap (they stage bytes); `flush` is the
/// only suspension point, called by the registry between families so a slow
/// downstream sink applies backpressure to the whole pass.
#[async_trait]
pub trait MetricsWriter: Send {
    /// Emit the `# HELP` / `# TYPE` header for one family.
    ///
    /// Must be called exactly once per family name within a pass.
    fn write_family_header(&mut self, name: &str, help: &str, metric_type: MetricType)
        -> Result<()>;

    /// Emit one `name[suffix]{labels} value [timestamp]` line.
    ///
    /// `extra_label` carries a kind-implicit pair (`le`, `quantile`) appended
    /// after the caller labels. An empty label set renders a bare name.
    #[allow(clippy::too_many_arguments)]
    fn write_sample(
        &mut self,
        name: &str,
        suffix: &str,
        label_names: &[String],
        label_values: &[String],
        extra_label: Option<(&str, &str)>,
        value: SampleValue,
        timestamp: Option<i64>,
    ) -> Result<()>;

    /// Drain staged bytes to the underlying sink.
    async fn flush(&mut self) -> Result<()>;

    /// Finish the document: final flush, then reset per-pass state.
    async fn close(&mut self) -> Result<()>;
}
