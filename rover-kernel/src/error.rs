use std::path::PathBuf;

/// Configuration problems. Raised at construction, never corrected silently.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("{stream}: min ({min}) is greater than max ({max})")]
    InvalidRange { stream: String, min: f64, max: f64 },
    #[error("{stream}: initial value {value} lies outside [{min}, {max}]")]
    InitialOutOfRange {
        stream: String,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("{stream}: {field} must be a finite number")]
    NonFinite { stream: String, field: &'static str },
    #[error("{stream}: step scale must be >= 0, got {step}")]
    InvalidStep { stream: String, step: f64 },
    #[error("{stream}: update period must be positive")]
    NonPositivePeriod { stream: String },
    #[error("{stream}: history capacity must be positive")]
    NonPositiveCapacity { stream: String },
    #[error("{stream}: {field} must lie in [0, 1], got {value}")]
    InvalidProbability {
        stream: String,
        field: &'static str,
        value: f64,
    },
    #[error("{stream}: nominal band [{low}, {high}] must sit inside [min, max]")]
    InvalidNominalBand { stream: String, low: f64, high: f64 },
    #[error("duplicate metric name: {0}")]
    DuplicateMetric(String),
    #[error("navigation: {0}")]
    InvalidNavigation(String),
}

/// Failures on the operator-facing side of a running dashboard.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("alert manager is not running")]
    AlertManagerStopped,
    #[error("unknown metric: {0}")]
    UnknownMetric(String),
}
