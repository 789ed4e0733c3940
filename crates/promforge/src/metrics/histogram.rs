//! Histogram: cumulative buckets over fixed upper bounds.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use promforge_core::exposition::{format_double, MetricType, MetricsWriter, SampleValue};
use promforge_core::{MetricsError, Result};

use crate::atomics::{AtomicDouble, ObservedAt};
use crate::config::{FamilyConfig, MetricConfig};
use crate::family::{Metric, MetricFamily};

/// Default upper bounds, in seconds, for latency-shaped observations.
pub const DEFAULT_BUCKETS: [f64; 14] = [
    0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 7.5, 10.0,
];

/// `MetricConfig` plus the bucket upper bounds.
#[derive(Debug, Clone)]
pub struct HistogramConfig {
    metric: MetricConfig,
    buckets: Arc<[f64]>,
}

impl HistogramConfig {
    /// `buckets: None` selects `DEFAULT_BUCKETS`. Bounds must be finite and
    /// strictly increasing; the implicit `+Inf` bucket is always appended.
    pub fn new(metric: MetricConfig, buckets: Option<Vec<f64>>) -> Result<Self> {
        let buckets = buckets.unwrap_or_else(|| DEFAULT_BUCKETS.to_vec());
        if buckets.is_empty() {
            return Err(MetricsError::InvalidConfiguration(
                "histogram needs at least one bucket".to_string(),
            ));
        }
        for pair in buckets.windows(2) {
            if pair[1] <= pair[0] {
                return Err(MetricsError::InvalidConfiguration(
                    "histogram buckets must be strictly increasing".to_string(),
                ));
            }
        }
        if buckets.iter().any(|b| !b.is_finite()) {
            return Err(MetricsError::InvalidConfiguration(
                "histogram buckets must be finite".to_string(),
            ));
        }

        Ok(Self {
            metric,
            buckets: buckets.into(),
        })
    }

    pub fn buckets(&self) -> &[f64] {
        &self.buckets
    }
}

impl FamilyConfig for HistogramConfig {
    fn common(&self) -> &MetricConfig {
        &self.metric
    }
}

/// One histogram series: per-bucket hit counts plus a running sum.
///
/// `observe` touches exactly one bucket; the cumulative rollup happens at
/// collection time.
#[derive(Debug)]
pub struct Histogram {
    bounds: Arc<[f64]>,
    // one cell per bound, plus the +Inf overflow cell at the end
    hits: Box<[AtomicU64]>,
    sum: AtomicDouble,
    observed_at: ObservedAt,
}

impl Histogram {
    pub fn observe(&self, v: f64) {
        let idx = self
            .bounds
            .iter()
            .position(|bound| v <= *bound)
            .unwrap_or(self.bounds.len());
        self.hits[idx].fetch_add(1, Ordering::Relaxed);
        self.sum.add(v);
        self.observed_at.touch(None);
    }

    pub fn sum(&self) -> f64 {
        self.sum.get()
    }

    pub fn count(&self) -> u64 {
        self.hits.iter().map(|h| h.load(Ordering::Acquire)).sum()
    }
}

impl Metric for Histogram {
    type Config = HistogramConfig;
    const KIND: MetricType = MetricType::Histogram;

    fn new(config: &HistogramConfig) -> Self {
        let cells = config.buckets.len() + 1;
        Self {
            bounds: config.buckets.clone(),
            hits: (0..cells).map(|_| AtomicU64::new(0)).collect(),
            sum: AtomicDouble::default(),
            observed_at: ObservedAt::new(config.metric.include_timestamp()),
        }
    }

    fn reserved_label_names() -> &'static [&'static str] {
        &["le"]
    }

    fn sample_names(family_name: &str) -> Vec<String> {
        vec![
            family_name.to_string(),
            format!("{family_name}_sum"),
            format!("{family_name}_count"),
            format!("{family_name}_bucket"),
        ]
    }

    fn collect(
        &self,
        writer: &mut dyn MetricsWriter,
        config: &HistogramConfig,
        label_values: &[String],
    ) -> Result<()> {
        let name = config.metric.name();
        let label_names = config.metric.label_names_for(label_values);
        let timestamp = self.observed_at.get();

        let mut cumulative: u64 = 0;
        for (bound, hits) in self.bounds.iter().zip(self.hits.iter()) {
            cumulative += hits.load(Ordering::Acquire);
            writer.write_sample(
                name,
                "_bucket",
                label_names,
                label_values,
                Some(("le", &format_double(*bound))),
                SampleValue::I64(cumulative as i64),
                timestamp,
            )?;
        }
        cumulative += self.hits[self.bounds.len()].load(Ordering::Acquire);
        writer.write_sample(
            name,
            "_bucket",
            label_names,
            label_values,
            Some(("le", "+Inf")),
            SampleValue::I64(cumulative as i64),
            timestamp,
        )?;

        writer.write_sample(
            name,
            "_sum",
            label_names,
            label_values,
            None,
            SampleValue::F64(self.sum()),
            timestamp,
        )?;
        writer.write_sample(
            name,
            "_count",
            label_names,
            label_values,
            None,
            SampleValue::I64(cumulative as i64),
            timestamp,
        )
    }
}

impl MetricFamily<Histogram> {
    pub fn observe(&self, v: f64) {
        self.unlabelled().observe(v);
    }
}
