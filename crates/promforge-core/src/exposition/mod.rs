//! Text exposition format (writer side).
//!
//! This module hosts the wire contract consumed by scraping clients:
//! - `MetricsWriter`: the streaming sink a collector serializes into.
//! - `TextMetricsWriter`: the line-oriented text renderer with explicit
//!   flush points between families.
//!
//! All rendering is panic-free: malformed usage (such as emitting the same
//! family header twice in one pass) is reported as `MetricsError` instead of
//! producing a corrupt document.

mod text;
mod writer;

pub use text::TextMetricsWriter;
pub use writer::{format_double, MetricType, MetricsWriter, SampleValue};
