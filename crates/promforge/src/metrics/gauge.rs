//! Gauges: arbitrary up/down values.

use std::sync::atomic::{AtomicI64, Ordering};

use promforge_core::exposition::{MetricType, MetricsWriter, SampleValue};
use promforge_core::Result;

use crate::atomics::{AtomicDouble, ObservedAt};
use crate::config::MetricConfig;
use crate::family::{Metric, MetricFamily};

#[derive(Debug)]
pub struct Gauge {
    value: AtomicDouble,
    observed_at: ObservedAt,
}

impl Gauge {
    pub fn inc(&self) {
        self.inc_by(1.0);
    }

    pub fn inc_by(&self, v: f64) {
        self.value.add(v);
        self.observed_at.touch(None);
    }

    pub fn dec(&self) {
        self.inc_by(-1.0);
    }

    pub fn dec_by(&self, v: f64) {
        self.inc_by(-v);
    }

    pub fn set(&self, v: f64) {
        self.value.set(v);
        self.observed_at.touch(None);
    }

    /// Raise to `v` if the current value is lower.
    pub fn inc_to(&self, v: f64) {
        self.value.set_max(v);
        self.observed_at.touch(None);
    }

    /// Lower to `v` if the current value is higher.
    pub fn dec_to(&self, v: f64) {
        self.value.set_min(v);
        self.observed_at.touch(None);
    }

    pub fn value(&self) -> f64 {
        self.value.get()
    }
}

impl Metric for Gauge {
    type Config = MetricConfig;
    const KIND: MetricType = MetricType::Gauge;

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

impl MetricFamily<Gauge> {
    pub fn inc(&self) {
        self.unlabelled().inc();
    }

    pub fn inc_by(&self, v: f64) {
        self.unlabelled().inc_by(v);
    }

    pub fn dec(&self) {
        self.unlabelled().dec();
    }

    pub fn dec_by(&self, v: f64) {
        self.unlabelled().dec_by(v);
    }

    pub fn set(&self, v: f64) {
        self.unlabelled().set(v);
    }

    pub fn value(&self) -> f64 {
        self.unlabelled().value()
    }
}

#[derive(Debug)]
pub struct IntGauge {
    value: AtomicI64,
    observed_at: ObservedAt,
}

impl IntGauge {
    pub fn inc(&self) {
        self.inc_by(1);
    }

    pub fn inc_by(&self, v: i64) {
        self.value.fetch_add(v, Ordering::Relaxed);
        self.observed_at.touch(None);
    }

    pub fn dec(&self) {
        self.inc_by(-1);
    }

    pub fn dec_by(&self, v: i64) {
        self.inc_by(-v);
    }

    pub fn set(&self, v: i64) {
        self.value.store(v, Ordering::Release);
        self.observed_at.touch(None);
    }

    pub fn inc_to(&self, v: i64) {
        self.value.fetch_max(v, Ordering::AcqRel);
        self.observed_at.touch(None);
    }

    pub fn dec_to(&self, v: i64) {
        self.value.fetch_min(v, Ordering::AcqRel);
        self.observed_at.touch(None);
    }

    pub fn value(&self) -> i64 {
        self.value.load(Ordering::Acquire)
    }
}

impl Metric for IntGauge {
    type Config = MetricConfig;
    const KIND: MetricType = MetricType::Gauge;

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

impl MetricFamily<IntGauge> {
    pub fn inc(&self) {
        self.unlabelled().inc();
    }

    pub fn dec(&self) {
        self.unlabelled().dec();
    }

    pub fn set(&self, v: i64) {
        self.unlabelled().set(v);
    }

    pub fn value(&self) -> i64 {
        self.unlabelled().value()
    }
}
