//! Collector contract consumed by the registry.

use std::any::Any;
use std::sync::Arc;

use promforge_core::exposition::MetricsWriter;
use promforge_core::Result;

/// One registrable source of samples.
///
/// Metric families implement this; process/runtime statistics collectors
/// from outside this crate plug in through the same trait.
pub trait Collector: Send + Sync + 'static {
    /// Registry key. Globally unique across the owning registry.
    fn name(&self) -> &str;

    /// Every fully-qualified sample name this collector can emit.
    ///
    /// The registry reserves these process-wide; an empty list is rejected
    /// at registration.
    fn metric_names(&self) -> &[String];

    /// Serialize the current state: header once, then one line per
    /// existing instance.
    fn collect(&self, writer: &mut dyn MetricsWriter) -> Result<()>;

    /// Typed-handle recovery for `get_or_add`. A failed downcast is
    /// reported as a duplicate-name error, never a panic.
    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}
