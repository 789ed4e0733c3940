//! Family configuration, immutable after creation.

use promforge_core::validation::is_valid_metric_name;
use promforge_core::{MetricsError, Result};

/// Identity and label schema of one metric family.
///
/// The label-name list and timestamp flag are fixed when the family is
/// created; a later request for the same name with a different schema is a
/// contract violation surfaced by the factory.
#[derive(Debug, Clone)]
pub struct MetricConfig {
    name: String,
    help: String,
    label_names: Vec<String>,
    include_timestamp: bool,
}

impl MetricConfig {
    pub fn new(
        name: &str,
        help: &str,
        label_names: &[&str],
        include_timestamp: bool,
    ) -> Result<Self> {
        if !is_valid_metric_name(name) {
            return Err(MetricsError::InvalidMetricName(name.to_string()));
        }
        for label in label_names {
            if !is_valid_metric_name(label) || label.starts_with("__") {
                return Err(MetricsError::InvalidConfiguration(format!(
                    "invalid label name '{label}'"
                )));
            }
        }

        Ok(Self {
            name: name.to_string(),
            help: help.to_string(),
            label_names: label_names.iter().map(|l| l.to_string()).collect(),
            include_timestamp,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn label_names(&self) -> &[String] {
        &self.label_names
    }

    /// Label names paired with `values` on one sample line.
    ///
    /// The unlabelled root of a labelled family carries no values and
    /// renders as a bare name.
    pub fn label_names_for(&self, values: &[String]) -> &[String] {
        if values.is_empty() {
            &[]
        } else {
            &self.label_names
        }
    }

    pub fn include_timestamp(&self) -> bool {
        self.include_timestamp
    }
}

/// Anything a family accepts as its configuration.
///
/// Histogram and summary configs extend `MetricConfig` with kind-specific
/// settings; this trait gives the family and registry access to the common
/// identity part.
pub trait FamilyConfig: Send + Sync + 'static {
    fn common(&self) -> &MetricConfig;
}

impl FamilyConfig for MetricConfig {
    fn common(&self) -> &MetricConfig {
        self
    }
}
