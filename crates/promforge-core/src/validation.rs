//! Metric name validation.

use once_cell::sync::Lazy;
use regex::Regex;

// Pattern accepted by scrapers for sample names.
static METRIC_NAME: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)] // literal pattern, cannot fail
    Regex::new("^[a-zA-Z_:][a-zA-Z0-9_:]*$").unwrap()
});

/// Whether `name` is a valid sample name.
pub fn is_valid_metric_name(name: &str) -> bool {
    METRIC_NAME.is_match(name)
}
