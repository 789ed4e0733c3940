//! Untyped metric: a bare settable value.

use promforge_core::exposition::{MetricType, MetricsWriter, SampleValue};
use promforge_core::Result;

use crate::atomics::{AtomicDouble, ObservedAt};
use crate::config::MetricConfig;
use crate::family::{Metric, MetricFamily};

#[derive(Debug)]
pub struct Untyped {
    value: AtomicDouble,
    observed_at: ObservedAt,
}

impl Untyped {
    pub fn set(&self, v: f64) {
        self.set_at(v, None);
    }

    pub fn set_at(&self, v: f64, timestamp: Option<i64>) {
        self.value.set(v);
        self.observed_at.touch(timestamp);
    }

    pub fn value(&self) -> f64 {
        self.value.get()
    }
}

impl Metric for Untyped {
    type Config = MetricConfig;
    const KIND: MetricType = MetricType::Untyped;

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

impl MetricFamily<Untyped> {
    pub fn set(&self, v: f64) {
        self.unlabelled().set(v);
    }

    pub fn value(&self) -> f64 {
        self.unlabelled().value()
    }
}
