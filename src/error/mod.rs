//! Error types for kubeanalyzer

use thiserror::Error;

/// Main error type for kubeanalyzer
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("Invalid value '{value}' for {option}: expected {expected}")]
    InvalidOption {
        option: String,
        value: String,
        expected: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to fetch {resource}: {message}")]
    UpstreamFetch { resource: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl AnalyzerError {
    /// Build a configuration error naming the offending option and its valid domain
    pub fn invalid_option(
        option: impl Into<String>,
        value: impl ToString,
        expected: impl Into<String>,
    ) -> Self {
        AnalyzerError::InvalidOption {
            option: option.into(),
            value: value.to_string(),
            expected: expected.into(),
        }
    }

    /// Wrap a failed upstream fetch for a resource kind
    pub fn upstream(resource: impl Into<String>, source: impl ToString) -> Self {
        AnalyzerError::UpstreamFetch {
            resource: resource.into(),
            message: source.to_string(),
        }
    }

    /// Whether this error was raised by configuration validation
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, AnalyzerError::InvalidOption { .. } | AnalyzerError::Config(_))
    }
}

impl From<serde_json::Error> for AnalyzerError {
    fn from(e: serde_json::Error) -> Self {
        AnalyzerError::Serialization(e.to_string())
    }
}

impl From<serde_yaml::Error> for AnalyzerError {
    fn from(e: serde_yaml::Error) -> Self {
        AnalyzerError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for AnalyzerError {
    fn from(e: toml::de::Error) -> Self {
        AnalyzerError::Config(e.to_string())
    }
}

/// Result type alias for kubeanalyzer
pub type Result<T> = std::result::Result<T, AnalyzerError>;
