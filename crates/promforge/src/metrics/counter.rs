//! Monotonic counters (double and 64-bit integer).

use std::sync::atomic::{AtomicI64, Ordering};

use promforge_core::exposition::{MetricType, MetricsWriter, SampleValue};
use promforge_core::{MetricsError, Result};

use crate::atomics::{AtomicDouble, ObservedAt};
use crate::config::MetricConfig;
use crate::family::{Metric, MetricFamily};

/// A counter backed by an `f64` cell. Increments only.
#[derive(Debug)]
pub struct Counter {
    value: AtomicDouble,
    observed_at: ObservedAt,
}

impl Counter {
    pub fn inc(&self) {
        self.value.add(1.0);
        self.observed_at.touch(None);
    }

    /// Add `v`. Negative increments are rejected and leave the value
    /// unchanged.
    pub fn inc_by(&self, v: f64) -> Result<()> {
        self.inc_by_at(v, None)
    }

    /// Add `v` with an explicit observation timestamp (unix ms).
    pub fn inc_by_at(&self, v: f64, timestamp: Option<i64>) -> Result<()> {
        if v < 0.0 {
            return Err(MetricsError::MonotonicityViolation);
        }
        self.value.add(v);
        self.observed_at.touch(timestamp);
        Ok(())
    }

    pub fn value(&self) -> f64 {
        self.value.get()
    }

    pub(crate) fn reset(&self) {
        self.value.set(0.0);
    }
}

impl Metric for Counter {
    type Config = MetricConfig;
    const KIND: MetricType = MetricType::Counter;

    fn new(config: &MetricConfig) -> Self {
        Self {
            value: AtomicDouble::default(),
            observed_at: ObservedAt::new(config.include_timestamp()),
        }
    }

    fn collect(
        &self,
        writer: &mut dyn MetricsWriter,
        config: &MetricConfig,
        label_values: &[String],
    ) -> Result<()> {
        writer.write_sample(
            config.name(),
            "",
            config.label_names_for(label_values),
            label_values,
            None,
            SampleValue::F64(self.value()),
            self.observed_at.get(),
        )
    }
}

impl MetricFamily<Counter> {
    /// Increment the unlabelled series by one.
    pub fn inc(&self) {
        self.unlabelled().inc();
    }

    pub fn inc_by(&self, v: f64) -> Result<()> {
        self.unlabelled().inc_by(v)
    }

    pub fn value(&self) -> f64 {
        self.unlabelled().value()
    }

    /// Zero every materialized series in the family.
    pub fn reset(&self) {
        self.for_each_instance(Counter::reset);
    }
}

/// A counter backed by an `i64` cell, for high-frequency integer counts.
#[derive(Debug)]
pub struct IntCounter {
    value: AtomicI64,
    observed_at: ObservedAt,
}

impl IntCounter {
    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
        self.observed_at.touch(None);
    }

    /// Add `v`. Negative increments are rejected and leave the value
    /// unchanged.
    pub fn inc_by(&self, v: i64) -> Result<()> {
        if v < 0 {
            return Err(MetricsError::MonotonicityViolation);
        }
        self.value.fetch_add(v, Ordering::Relaxed);
        self.observed_at.touch(None);
        Ok(())
    }

    pub fn value(&self) -> i64 {
        self.value.load(Ordering::Acquire)
    }

    pub(crate) fn reset(&self) {
        self.value.store(0, Ordering::Release);
    }
}

impl Metric for IntCounter {
    type Config = MetricConfig;
    const KIND: MetricType = MetricType::Counter;

    fn new(config: &MetricConfig) -> Self {
        Self {
            value: AtomicI64::new(0),
            observed_at: ObservedAt::new(config.include_timestamp()),
        }
    }

    fn collect(
        &self,
        writer: &mut dyn MetricsWriter,
        config: &MetricConfig,
        label_values: &[String],
    ) -> Result<()> {
        writer.write_sample(
            config.name(),
            "",
            config.label_names_for(label_values),
            label_values,
            None,
            SampleValue::I64(self.value()),
            self.observed_at.get(),
        )
    }
}

impl MetricFamily<IntCounter> {
    pub fn inc(&self) {
        self.unlabelled().inc();
    }

    pub fn inc_by(&self, v: i64) -> Result<()> {
        self.unlabelled().inc_by(v)
    }

    pub fn value(&self) -> i64 {
        self.unlabelled().value()
    }

    pub fn reset(&self) {
        self.for_each_instance(IntCounter::reset);
    }
}
