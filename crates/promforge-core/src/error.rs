//! Shared error type across promforge crates.

use thiserror::Error;

/// Stable error discriminants (stable API).
///
/// Callers match on the kind instead of destructuring variants that carry
/// context strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A collector is already registered under this name, or the registered
    /// entry has a different concrete type.
    DuplicateCollectorName,
    /// A collector declared zero sample names.
    MissingMetricNames,
    /// A sample name does not match the metric name pattern.
    InvalidMetricName,
    /// A sample name is already reserved by another collector.
    DuplicateMetricName,
    /// `with_labels` received the wrong number of label values.
    LabelArityMismatch,
    /// A family was re-requested with a different label-name set.
    LabelNamesMismatch,
    /// A metric kind's implicit label name was supplied by the caller.
    ReservedLabelName,
    /// A counter received a negative increment.
    MonotonicityViolation,
    /// Invalid histogram buckets, summary objectives, or window settings.
    InvalidConfiguration,
    /// The same family header was emitted twice in one collection pass.
    DuplicateFamilyHeader,
    /// Collection was cancelled between families.
    Cancelled,
    /// The downstream sink failed.
    Io,
}

impl ErrorKind {
    /// String representation used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::DuplicateCollectorName => "DUPLICATE_COLLECTOR_NAME",
            ErrorKind::MissingMetricNames => "MISSING_METRIC_NAMES",
            ErrorKind::InvalidMetricName => "INVALID_METRIC_NAME",
            ErrorKind::DuplicateMetricName => "DUPLICATE_METRIC_NAME",
            ErrorKind::LabelArityMismatch => "LABEL_ARITY_MISMATCH",
            ErrorKind::LabelNamesMismatch => "LABEL_NAMES_MISMATCH",
            ErrorKind::ReservedLabelName => "RESERVED_LABEL_NAME",
            ErrorKind::MonotonicityViolation => "MONOTONICITY_VIOLATION",
            ErrorKind::InvalidConfiguration => "INVALID_CONFIGURATION",
            ErrorKind::DuplicateFamilyHeader => "DUPLICATE_FAMILY_HEADER",
            ErrorKind::Cancelled => "CANCELLED",
            ErrorKind::Io => "IO",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, MetricsError>;

/// Unified error type used by the core and client crates.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("collector with name '{0}' is already registered")]
    DuplicateCollectorName(String),
    #[error("collector should define metric names")]
    MissingMetricNames,
    #[error("metric name '{0}' does not match the metric name restriction")]
    InvalidMetricName(String),
    #[error("metric name '{0}' is already in use")]
    DuplicateMetricName(String),
    #[error("expected {expected} label values but got {actual}")]
    LabelArityMismatch { expected: usize, actual: usize },
    #[error("label names of '{0}' do not match the registered family")]
    LabelNamesMismatch(String),
    #[error("label name '{0}' is reserved for this metric type")]
    ReservedLabelName(String),
    #[error("counter cannot go down")]
    MonotonicityViolation,
    #[error("invalid metric configuration: {0}")]
    InvalidConfiguration(String),
    #[error("family header for '{0}' was already written in this pass")]
    DuplicateFamilyHeader(String),
    #[error("collection cancelled")]
    Cancelled,
    #[error("sink error: {0}")]
    Io(#[from] std::io::Error),
}

impl MetricsError {
    /// Map an error to its stable kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MetricsError::DuplicateCollectorName(_) => ErrorKind::DuplicateCollectorName,
            MetricsError::MissingMetricNames => ErrorKind::MissingMetricNames,
            MetricsError::InvalidMetricName(_) => ErrorKind::InvalidMetricName,
            MetricsError::DuplicateMetricName(_) => ErrorKind::DuplicateMetricName,
            MetricsError::LabelArityMismatch { .. } => ErrorKind::LabelArityMismatch,
            MetricsError::LabelNamesMismatch(_) => ErrorKind::LabelNamesMismatch,
            MetricsError::ReservedLabelName(_) => ErrorKind::ReservedLabelName,
            MetricsError::MonotonicityViolation => ErrorKind::MonotonicityViolation,
            MetricsError::InvalidConfiguration(_) => ErrorKind::InvalidConfiguration,
            MetricsError::DuplicateFamilyHeader(_) => ErrorKind::DuplicateFamilyHeader,
            MetricsError::Cancelled => ErrorKind::Cancelled,
            MetricsError::Io(_) => ErrorKind::Io,
        }
    }
}
