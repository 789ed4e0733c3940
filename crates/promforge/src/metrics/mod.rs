//! Metric type implementations.

mod counter;
mod gauge;
mod histogram;
mod summary;
mod untyped;

pub use counter::{Counter, IntCounter};
pub use gauge::{Gauge, IntGauge};
pub use histogram::{Histogram, HistogramConfig, DEFAULT_BUCKETS};
pub use summary::{default_objectives, QuantileEpsilonPair, Summary, SummaryConfig};
pub use untyped::Untyped;
