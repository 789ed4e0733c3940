//! Collector registry: global name namespace and collection driver.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};

use arc_swap::ArcSwapOption;
use tokio_util::sync::CancellationToken;

use promforge_core::exposition::MetricsWriter;
use promforge_core::validation::is_valid_metric_name;
use promforge_core::{MetricsError, Result};

use crate::collector::Collector;

struct RegistryInner {
    collectors: HashMap<String, Arc<dyn Collector>>,
    // reserved sample names, keyed case-insensitively
    used_metric_names: HashSet<String>,
}

/// Owns the mapping from family name to collector and drives collection.
///
/// Explicitly constructed, explicitly dropped; there is no ambient default
/// registry. Callers wanting a process-wide instance share one `Arc` by
/// construction.
///
/// Locking: structural mutation takes the write lock; lookups and the
/// snapshot rebuild take the read lock; value updates on already-registered
/// families take neither. The sorted snapshot is published through an
/// atomically swapped reference, so an in-flight collection keeps its view
/// even while registration continues.
pub struct CollectorRegistry {
    inner: RwLock<RegistryInner>,
    snapshot: ArcSwapOption<Vec<Arc<dyn Collector>>>,
}

impl Default for CollectorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CollectorRegistry {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(RegistryInner {
                collectors: HashMap::new(),
                used_metric_names: HashSet::new(),
            }),
            snapshot: ArcSwapOption::const_empty(),
        }
    }

    /// Register a collector under its name, reserving its sample names.
    pub fn add(&self, collector: Arc<dyn Collector>) -> Result<()> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        Self::add_locked(&mut inner, collector)?;
        self.snapshot.store(None);
        Ok(())
    }

    /// Non-blocking lookup by registry name.
    pub fn try_get(&self, name: &str) -> Option<Arc<dyn Collector>> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.collectors.get(name).cloned()
    }

    /// Return the collector registered under `name`, creating it through
    /// `factory` if absent.
    ///
    /// Double-checked: an optimistic read-locked lookup, then a serialized
    /// recheck before construction, so `factory` runs at most once per name
    /// even under concurrent callers. An existing entry of a different
    /// concrete type is a duplicate-name error.
    pub fn get_or_add<C, F>(&self, name: &str, factory: F) -> Result<Arc<C>>
    where
        C: Collector,
        F: FnOnce() -> Result<Arc<C>>,
    {
        {
            let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(existing) = inner.collectors.get(name) {
                return Self::downcast::<C>(name, existing.clone());
            }
        }

        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = inner.collectors.get(name) {
            return Self::downcast::<C>(name, existing.clone());
        }

        let collector = factory()?;
        Self::add_locked(&mut inner, collector.clone())?;
        self.snapshot.store(None);
        Ok(collector)
    }

    /// Unregister by name, releasing its reserved sample names.
    ///
    /// Empty or unknown names are a no-op returning `None`.
    pub fn remove(&self, name: &str) -> Option<Arc<dyn Collector>> {
        if name.is_empty() {
            return None;
        }
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let collector = inner.collectors.remove(name)?;
        Self::release_locked(&mut inner, &collector);
        self.snapshot.store(None);
        tracing::debug!(name, "collector removed");
        Some(collector)
    }

    /// Unregister by identity. Returns whether anything was removed.
    pub fn remove_collector(&self, collector: &Arc<dyn Collector>) -> bool {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let key = inner
            .collectors
            .iter()
            .find(|(_, v)| Arc::ptr_eq(v, collector))
            .map(|(k, _)| k.clone());

        let Some(key) = key else {
            return false;
        };
        if let Some(removed) = inner.collectors.remove(&key) {
            Self::release_locked(&mut inner, &removed);
        }
        self.snapshot.store(None);
        tracing::debug!(name = %key, "collector removed");
        true
    }

    /// Run one collection pass against `writer`.
    ///
    /// Families are visited in case-insensitive ascending name order from a
    /// snapshot taken when enumeration starts; registration during the pass
    /// does not alter that view. The writer is flushed after every family,
    /// so a slow sink backpressures the pass instead of buffering families.
    /// Cancellation is observed between families; already-flushed output
    /// stays put.
    pub async fn collect_to<W>(&self, writer: &mut W, cancel: &CancellationToken) -> Result<()>
    where
        W: MetricsWriter,
    {
        let collectors = self.sorted_collectors();
        tracing::trace!(families = collectors.len(), "collection pass started");

        for collector in collectors.iter() {
            if cancel.is_cancelled() {
                return Err(MetricsError::Cancelled);
            }
            collector.collect(writer)?;
            writer.flush().await?;
        }
        Ok(())
    }

    fn sorted_collectors(&self) -> Arc<Vec<Arc<dyn Collector>>> {
        if let Some(snapshot) = self.snapshot.load_full() {
            return snapshot;
        }

        // Rebuild and publish while holding the read lock, so a concurrent
        // add/remove (write lock) cannot interleave its invalidation with
        // this store.
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let mut collectors: Vec<Arc<dyn Collector>> = inner.collectors.values().cloned().collect();
        collectors.sort_by(|a, b| {
            a.name()
                .to_ascii_lowercase()
                .cmp(&b.name().to_ascii_lowercase())
        });
        let snapshot = Arc::new(collectors);
        self.snapshot.store(Some(snapshot.clone()));
        snapshot
    }

    fn add_locked(inner: &mut RegistryInner, collector: Arc<dyn Collector>) -> Result<()> {
        let metric_names = collector.metric_names();
        if metric_names.is_empty() {
            return Err(MetricsError::MissingMetricNames);
        }

        let name = collector.name().to_string();
        if inner.collectors.contains_key(&name) {
            return Err(MetricsError::DuplicateCollectorName(name));
        }

        for metric_name in metric_names {
            if !is_valid_metric_name(metric_name) {
                return Err(MetricsError::InvalidMetricName(metric_name.clone()));
            }
            if inner
                .used_metric_names
                .contains(&metric_name.to_ascii_lowercase())
            {
                return Err(MetricsError::DuplicateMetricName(metric_name.clone()));
            }
        }

        for metric_name in metric_names {
            inner
                .used_metric_names
                .insert(metric_name.to_ascii_lowercase());
        }
        tracing::debug!(name = %name, samples = metric_names.len(), "collector registered");
        inner.collectors.insert(name, collector);
        Ok(())
    }

    fn release_locked(inner: &mut RegistryInner, collector: &Arc<dyn Collector>) {
        for metric_name in collector.metric_names() {
            inner
                .used_metric_names
                .remove(&metric_name.to_ascii_lowercase());
        }
    }

    fn downcast<C: Collector>(name: &str, collector: Arc<dyn Collector>) -> Result<Arc<C>> {
        collector
            .as_any()
            .downcast::<C>()
            .map_err(|_| MetricsError::DuplicateCollectorName(name.to_string()))
    }
}
