//! Label-keyed metric families.

use std::any::Any;
use std::sync::{Arc, Mutex, PoisonError};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use once_cell::sync::OnceCell;

use promforge_core::exposition::{MetricType, MetricsWriter};
use promforge_core::{MetricsError, Result};

use crate::collector::Collector;
use crate::config::FamilyConfig;

/// One concrete metric kind (counter, gauge, ...).
///
/// Implementations own their atomic cells; the family owns the instances.
pub trait Metric: Send + Sync + Sized + 'static {
    /// Configuration the family is built from.
    type Config: FamilyConfig;

    /// Kind reported on the `# TYPE` line.
    const KIND: MetricType;

    /// Build one zeroed instance.
    fn new(config: &Self::Config) -> Self;

    /// Label names this kind claims for itself (`le`, `quantile`).
    fn reserved_label_names() -> &'static [&'static str] {
        &[]
    }

    /// Fully-qualified sample names for a family called `family_name`.
    fn sample_names(family_name: &str) -> Vec<String> {
        vec![family_name.to_string()]
    }

    /// Emit this instance's sample line(s).
    fn collect(
        &self,
        writer: &mut dyn MetricsWriter,
        config: &Self::Config,
        label_values: &[String],
    ) -> Result<()>;
}

/// All time series sharing one metric name, keyed by label-value tuple.
///
/// Instances are created lazily, at most once per distinct key; repeated
/// `with_labels` calls with an equal tuple return the same `Arc`, so callers
/// may cache the handle across hot loops.
pub struct MetricFamily<M: Metric> {
    config: M::Config,
    metric_names: Vec<String>,
    unlabelled: OnceCell<Arc<M>>,
    labelled: DashMap<Box<[String]>, Arc<M>>,
    // insertion order of label keys; keeps collection output deterministic
    // for a fixed insertion history
    order: Mutex<Vec<Box<[String]>>>,
}

impl<M: Metric> MetricFamily<M> {
    pub fn new(config: M::Config) -> Result<Self> {
        let common = config.common();
        for reserved in M::reserved_label_names() {
            if common.label_names().iter().any(|l| l == reserved) {
                return Err(MetricsError::ReservedLabelName(reserved.to_string()));
            }
        }
        let metric_names = M::sample_names(common.name());

        Ok(Self {
            config,
            metric_names,
            unlabelled: OnceCell::new(),
            labelled: DashMap::new(),
            order: Mutex::new(Vec::new()),
        })
    }

    pub fn config(&self) -> &M::Config {
        &self.config
    }

    pub fn label_names(&self) -> &[String] {
        self.config.common().label_names()
    }

    /// The instance bound to the empty label key.
    ///
    /// Materialized on first access; a family whose unlabelled instance was
    /// never touched emits only its header.
    pub fn unlabelled(&self) -> Arc<M> {
        self.unlabelled
            .get_or_init(|| Arc::new(M::new(&self.config)))
            .clone()
    }

    /// Resolve (creating on first use) the instance for one label key.
    pub fn with_labels(&self, values: &[&str]) -> Result<Arc<M>> {
        let names = self.config.common().label_names();
        if values.len() != names.len() {
            return Err(MetricsError::LabelArityMismatch {
                expected: names.len(),
                actual: values.len(),
            });
        }
        if names.is_empty() {
            return Ok(self.unlabelled());
        }

        let key: Box<[String]> = values.iter().map(|v| v.to_string()).collect();

        // Fast path: steady-state lookups take only a shard read lock.
        if let Some(existing) = self.labelled.get(&key) {
            return Ok(existing.clone());
        }

        match self.labelled.entry(key.clone()) {
            Entry::Occupied(entry) => Ok(entry.get().clone()),
            Entry::Vacant(entry) => {
                let metric = Arc::new(M::new(&self.config));
                entry.insert(metric.clone());
                self.order
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(key);
                Ok(metric)
            }
        }
    }

    /// Visit every materialized instance (unlabelled first).
    pub(crate) fn for_each_instance(&self, f: impl Fn(&M)) {
        if let Some(unlabelled) = self.unlabelled.get() {
            f(unlabelled);
        }
        for entry in self.labelled.iter() {
            f(entry.value());
        }
    }
}

impl<M: Metric> std::fmt::Debug for MetricFamily<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricFamily")
            .field("name", &self.config.common().name())
            .field("labelled_series", &self.labelled.len())
            .finish_non_exhaustive()
    }
}

impl<M: Metric> Collector for MetricFamily<M> {
    fn name(&self) -> &str {
        self.config.common().name()
    }

    fn metric_names(&self) -> &[String] {
        &self.metric_names
    }

    fn collect(&self, writer: &mut dyn MetricsWriter) -> Result<()> {
        let common = self.config.common();
        writer.write_family_header(common.name(), common.help(), M::KIND)?;

        if let Some(unlabelled) = self.unlabelled.get() {
            unlabelled.collect(writer, &self.config, &[])?;
        }

        let keys = self
            .order
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for key in keys {
            if let Some(metric) = self.labelled.get(&key) {
                metric.collect(writer, &self.config, &key)?;
            }
        }
        Ok(())
    }

    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
