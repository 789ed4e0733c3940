//! Summary: quantile estimates over a sliding time window.
//!
//! The window is a ring of `age_buckets` sample buckets rotated every
//! `max_age / age_buckets`; quantiles are computed by exact rank selection
//! over the merged window at collection time, so the configured epsilon is
//! an upper bound that is always met. `_sum` and `_count` are cumulative
//! over the series lifetime, not windowed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use promforge_core::exposition::{format_double, MetricType, MetricsWriter, SampleValue};
use promforge_core::{MetricsError, Result};

use crate::atomics::{AtomicDouble, ObservedAt};
use crate::config::{FamilyConfig, MetricConfig};
use crate::family::{Metric, MetricFamily};

/// One reported quantile with its tolerated rank error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantileEpsilonPair {
    pub quantile: f64,
    pub epsilon: f64,
}

impl QuantileEpsilonPair {
    pub fn new(quantile: f64, epsilon: f64) -> Self {
        Self { quantile, epsilon }
    }
}

/// Default objectives: median, 90th and 99th percentile.
pub fn default_objectives() -> Vec<QuantileEpsilonPair> {
    vec![
        QuantileEpsilonPair::new(0.5, 0.05),
        QuantileEpsilonPair::new(0.9, 0.01),
        QuantileEpsilonPair::new(0.99, 0.001),
    ]
}

const DEFAULT_MAX_AGE: Duration = Duration::from_secs(600);
const DEFAULT_AGE_BUCKETS: usize = 5;

/// `MetricConfig` plus objectives and window settings.
#[derive(Debug, Clone)]
pub struct SummaryConfig {
    metric: MetricConfig,
    objectives: Arc<[QuantileEpsilonPair]>,
    max_age: Duration,
    age_buckets: usize,
}

impl SummaryConfig {
    pub fn new(
        metric: MetricConfig,
        objectives: Option<Vec<QuantileEpsilonPair>>,
        max_age: Option<Duration>,
        age_buckets: Option<usize>,
    ) -> Result<Self> {
        let objectives = objectives.unwrap_or_else(default_objectives);
        for o in &objectives {
            if !(0.0..=1.0).contains(&o.quantile) {
                return Err(MetricsError::InvalidConfiguration(format!(
                    "quantile {} is outside [0, 1]",
                    o.quantile
                )));
            }
            if !(0.0..1.0).contains(&o.epsilon) {
                return Err(MetricsError::InvalidConfiguration(format!(
                    "epsilon {} is outside [0, 1)",
                    o.epsilon
                )));
            }
        }

        let max_age = max_age.unwrap_or(DEFAULT_MAX_AGE);
        if max_age.is_zero() {
            return Err(MetricsError::InvalidConfiguration(
                "max_age must be positive".to_string(),
            ));
        }
        let age_buckets = age_buckets.unwrap_or(DEFAULT_AGE_BUCKETS);
        if age_buckets == 0 {
            return Err(MetricsError::InvalidConfiguration(
                "age_buckets must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            metric,
            objectives: objectives.into(),
            max_age,
            age_buckets,
        })
    }

    pub fn objectives(&self) -> &[QuantileEpsilonPair] {
        &self.objectives
    }
}

impl FamilyConfig for SummaryConfig {
    fn common(&self) -> &MetricConfig {
        &self.metric
    }
}

#[derive(Debug)]
struct Window {
    buckets: Vec<Vec<f64>>,
    head: usize,
    rotate_every: Duration,
    last_rotation: Instant,
}

impl Window {
    fn rotate_if_due(&mut self, now: Instant) {
        let elapsed = now.duration_since(self.last_rotation);
        let due = (elapsed.as_nanos() / self.rotate_every.as_nanos().max(1)) as usize;
        if due == 0 {
            return;
        }
        if due >= self.buckets.len() {
            // idle longer than the whole window
            for bucket in &mut self.buckets {
                bucket.clear();
            }
            self.last_rotation = now;
            return;
        }
        for _ in 0..due {
            self.head = (self.head + 1) % self.buckets.len();
            self.buckets[self.head].clear();
            self.last_rotation += self.rotate_every;
        }
    }

    fn merged(&self) -> Vec<f64> {
        let mut values: Vec<f64> = self.buckets.iter().flatten().copied().collect();
        values.sort_by(f64::total_cmp);
        values
    }
}

/// One summary series.
#[derive(Debug)]
pub struct Summary {
    objectives: Arc<[QuantileEpsilonPair]>,
    count: AtomicU64,
    sum: AtomicDouble,
    window: Mutex<Window>,
    observed_at: ObservedAt,
}

impl Summary {
    /// Record one observation. Safe from any thread at any time.
    pub fn observe(&self, v: f64) {
        self.count.fetch_add(1, Ordering::Relaxed);
        self.sum.add(v);
        {
            let mut window = self.window.lock().unwrap_or_else(PoisonError::into_inner);
            window.rotate_if_due(Instant::now());
            let head = window.head;
            window.buckets[head].push(v);
        }
        self.observed_at.touch(None);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Acquire)
    }

    pub fn sum(&self) -> f64 {
        self.sum.get()
    }

    /// Current estimate for `q` over the sliding window; NaN when empty.
    pub fn quantile(&self, q: f64) -> f64 {
        let mut window = self.window.lock().unwrap_or_else(PoisonError::into_inner);
        window.rotate_if_due(Instant::now());
        Self::rank(&window.merged(), q)
    }

    fn rank(sorted: &[f64], q: f64) -> f64 {
        if sorted.is_empty() {
            return f64::NAN;
        }
        let n = sorted.len();
        let idx = ((q * n as f64).ceil() as usize).clamp(1, n) - 1;
        sorted[idx]
    }
}

impl Metric for Summary {
    type Config = SummaryConfig;
    const KIND: MetricType = MetricType::Summary;

    fn new(config: &SummaryConfig) -> Self {
        Self {
            objectives: config.objectives.clone(),
            count: AtomicU64::new(0),
            sum: AtomicDouble::default(),
            window: Mutex::new(Window {
                buckets: vec![Vec::new(); config.age_buckets],
                head: 0,
                rotate_every: config.max_age / config.age_buckets as u32,
                last_rotation: Instant::now(),
            }),
            observed_at: ObservedAt::new(config.metric.include_timestamp()),
        }
    }

    fn reserved_label_names() -> &'static [&'static str] {
        &["quantile"]
    }

    fn sample_names(family_name: &str) -> Vec<String> {
        vec![
            family_name.to_string(),
            format!("{family_name}_sum"),
            format!("{family_name}_count"),
        ]
    }

    fn collect(
        &self,
        writer: &mut dyn MetricsWriter,
        config: &SummaryConfig,
        label_values: &[String],
    ) -> Result<()> {
        let name = config.metric.name();
        let label_names = config.metric.label_names_for(label_values);
        let timestamp = self.observed_at.get();

        let sorted = {
            let mut window = self.window.lock().unwrap_or_else(PoisonError::into_inner);
            window.rotate_if_due(Instant::now());
            window.merged()
        };

        for objective in self.objectives.iter() {
            writer.write_sample(
                name,
                "",
                label_names,
                label_values,
                Some(("quantile", &format_double(objective.quantile))),
                SampleValue::F64(Self::rank(&sorted, objective.quantile)),
                timestamp,
            )?;
        }

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
            SampleValue::I64(self.count() as i64),
            timestamp,
        )
    }
}

impl MetricFamily<Summary> {
    pub fn observe(&self, v: f64) {
        self.unlabelled().observe(v);
    }
}
