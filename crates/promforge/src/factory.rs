//! Thin, stateless façade over the registry.
//!
//! Every creation call resolves through `CollectorRegistry::get_or_add`, so
//! repeated identical calls are idempotent and return the same family
//! handle. A repeated call with a different label-name set is rejected.

use std::sync::Arc;
use std::time::Duration;

use promforge_core::{MetricsError, Result};

use crate::config::{FamilyConfig, MetricConfig};
use crate::family::{Metric, MetricFamily};
use crate::metrics::{
    Counter, Gauge, Histogram, HistogramConfig, IntCounter, IntGauge, QuantileEpsilonPair,
    Summary, SummaryConfig, Untyped,
};
use crate::registry::CollectorRegistry;

#[derive(Clone)]
pub struct MetricFactory {
    registry: Arc<CollectorRegistry>,
}

impl MetricFactory {
    pub fn new(registry: Arc<CollectorRegistry>) -> Self {
        Self { registry }
    }

    /// Create or fetch a family for any metric kind from a prepared config.
    pub fn create<M: Metric>(&self, config: M::Config) -> Result<Arc<MetricFamily<M>>> {
        let name = config.common().name().to_string();
        let requested = config.common().label_names().to_vec();

        let family = self
            .registry
            .get_or_add(&name, move || MetricFamily::<M>::new(config).map(Arc::new))?;

        if family.label_names() != requested.as_slice() {
            return Err(MetricsError::LabelNamesMismatch(name));
        }
        Ok(family)
    }

    pub fn counter(
        &self,
        name: &str,
        help: &str,
        label_names: &[&str],
    ) -> Result<Arc<MetricFamily<Counter>>> {
        self.create(MetricConfig::new(name, help, label_names, false)?)
    }

    pub fn counter_with_timestamp(
        &self,
        name: &str,
        help: &str,
        label_names: &[&str],
    ) -> Result<Arc<MetricFamily<Counter>>> {
        self.create(MetricConfig::new(name, help, label_names, true)?)
    }

    pub fn int_counter(
        &self,
        name: &str,
        help: &str,
        label_names: &[&str],
    ) -> Result<Arc<MetricFamily<IntCounter>>> {
        self.create(MetricConfig::new(name, help, label_names, false)?)
    }

    pub fn gauge(
        &self,
        name: &str,
        help: &str,
        label_names: &[&str],
    ) -> Result<Arc<MetricFamily<Gauge>>> {
        self.create(MetricConfig::new(name, help, label_names, false)?)
    }

    pub fn gauge_with_timestamp(
        &self,
        name: &str,
        help: &str,
        label_names: &[&str],
    ) -> Result<Arc<MetricFamily<Gauge>>> {
        self.create(MetricConfig::new(name, help, label_names, true)?)
    }

    pub fn int_gauge(
        &self,
        name: &str,
        help: &str,
        label_names: &[&str],
    ) -> Result<Arc<MetricFamily<IntGauge>>> {
        self.create(MetricConfig::new(name, help, label_names, false)?)
    }

    pub fn untyped(
        &self,
        name: &str,
        help: &str,
        label_names: &[&str],
    ) -> Result<Arc<MetricFamily<Untyped>>> {
        self.create(MetricConfig::new(name, help, label_names, false)?)
    }

    pub fn histogram(
        &self,
        name: &str,
        help: &str,
        label_names: &[&str],
    ) -> Result<Arc<MetricFamily<Histogram>>> {
        let config = HistogramConfig::new(MetricConfig::new(name, help, label_names, false)?, None)?;
        self.create(config)
    }

    pub fn histogram_with_buckets(
        &self,
        name: &str,
        help: &str,
        label_names: &[&str],
        buckets: &[f64],
    ) -> Result<Arc<MetricFamily<Histogram>>> {
        let config = HistogramConfig::new(
            MetricConfig::new(name, help, label_names, false)?,
            Some(buckets.to_vec()),
        )?;
        self.create(config)
    }

    pub fn summary(
        &self,
        name: &str,
        help: &str,
        label_names: &[&str],
    ) -> Result<Arc<MetricFamily<Summary>>> {
        let config =
            SummaryConfig::new(MetricConfig::new(name, help, label_names, false)?, None, None, None)?;
        self.create(config)
    }

    pub fn summary_with_objectives(
        &self,
        name: &str,
        help: &str,
        label_names: &[&str],
        objectives: Vec<QuantileEpsilonPair>,
        max_age: Option<Duration>,
        age_buckets: Option<usize>,
    ) -> Result<Arc<MetricFamily<Summary>>> {
        let config = SummaryConfig::new(
            MetricConfig::new(name, help, label_names, false)?,
            Some(objectives),
            max_age,
            age_buckets,
        )?;
        self.create(config)
    }
}
