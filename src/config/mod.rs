//! Analyzer configuration
//!
//! The file model ([`RawConfig`]) is deliberately loose: every key is optional
//! and values are kept as written. [`RawConfig::validate`] turns it into an
//! [`AnalyzerConfig`] and is the only place configuration errors are raised,
//! so a bad option is rejected before any cluster data is touched.

use crate::error::{AnalyzerError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Namespaces skipped when no ignore list is configured
pub const DEFAULT_IGNORED_NAMESPACES: &[&str] = &["kube-system", "kube-public", "kube-node-lease"];

/// Default minimum running-pod percentage for a healthy cluster
pub const DEFAULT_HEALTH_THRESHOLD: f64 = 90.0;

/// Default bound on parallel API fetches
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 8;

/// Narrative analysis intents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisType {
    #[default]
    Standard,
    Health,
    Performance,
    Security,
    Troubleshooting,
    Comprehensive,
    Resource,
    Capacity,
}

impl AnalysisType {
    /// Every analysis type, in presentation order
    pub const ALL: [AnalysisType; 8] = [
        AnalysisType::Standard,
        AnalysisType::Health,
        AnalysisType::Performance,
        AnalysisType::Security,
        AnalysisType::Troubleshooting,
        AnalysisType::Comprehensive,
        AnalysisType::Resource,
        AnalysisType::Capacity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisType::Standard => "standard",
            AnalysisType::Health => "health",
            AnalysisType::Performance => "performance",
            AnalysisType::Security => "security",
            AnalysisType::Troubleshooting => "troubleshooting",
            AnalysisType::Comprehensive => "comprehensive",
            AnalysisType::Resource => "resource",
            AnalysisType::Capacity => "capacity",
        }
    }

    /// One-line description used by `ka formats`
    pub fn description(&self) -> &'static str {
        match self {
            AnalysisType::Standard => "General cluster overview with problem highlights",
            AnalysisType::Health => "Health scoring and workload stability review",
            AnalysisType::Performance => "Resource usage and performance bottlenecks",
            AnalysisType::Security => "Security posture of workloads and nodes",
            AnalysisType::Troubleshooting => "Step-by-step root-cause investigation of failing pods",
            AnalysisType::Comprehensive => "Every section, every question",
            AnalysisType::Resource => "Requests, limits and resource allocation review",
            AnalysisType::Capacity => "Node capacity and growth planning",
        }
    }

    fn valid_values() -> String {
        Self::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisType {
    type Err = AnalyzerError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| {
                AnalyzerError::invalid_option(
                    "analysis_type",
                    s,
                    format!("one of: {}", Self::valid_values()),
                )
            })
    }
}

/// Static descriptors of the analyzed cluster, copied into every report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterMetadata {
    #[serde(default = "unknown")]
    pub name: String,
    #[serde(default = "default_platform")]
    pub platform: String,
    #[serde(default = "unknown")]
    pub cpu: String,
    #[serde(default = "unknown")]
    pub memory: String,
}

impl Default for ClusterMetadata {
    fn default() -> Self {
        Self {
            name: unknown(),
            platform: default_platform(),
            cpu: unknown(),
            memory: unknown(),
        }
    }
}

fn unknown() -> String {
    "unknown".to_string()
}

fn default_platform() -> String {
    format!("{}/{}", std::env::consts::OS, std::env::consts::ARCH)
}

/// Configuration as read from `config.toml`; nothing here is validated yet
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub ignore_namespaces: Option<Vec<String>>,
    pub health_threshold: Option<f64>,
    pub include_node_info: Option<bool>,
    pub include_deployment_details: Option<bool>,
    pub include_resource_metrics: Option<bool>,
    pub analysis_type: Option<String>,
    pub debug_mode: Option<bool>,
    pub max_concurrent_fetches: Option<usize>,
    pub cluster: Option<ClusterMetadata>,
}

impl RawConfig {
    /// Apply `other` on top of `self`; keys set in `other` win
    pub fn merge(mut self, other: RawConfig) -> RawConfig {
        if other.ignore_namespaces.is_some() {
            self.ignore_namespaces = other.ignore_namespaces;
        }
        if other.health_threshold.is_some() {
            self.health_threshold = other.health_threshold;
        }
        if other.include_node_info.is_some() {
            self.include_node_info = other.include_node_info;
        }
        if other.include_deployment_details.is_some() {
            self.include_deployment_details = other.include_deployment_details;
        }
        if other.include_resource_metrics.is_some() {
            self.include_resource_metrics = other.include_resource_metrics;
        }
        if other.analysis_type.is_some() {
            self.analysis_type = other.analysis_type;
        }
        if other.debug_mode.is_some() {
            self.debug_mode = other.debug_mode;
        }
        if other.max_concurrent_fetches.is_some() {
            self.max_concurrent_fetches = other.max_concurrent_fetches;
        }
        if other.cluster.is_some() {
            self.cluster = other.cluster;
        }
        self
    }

    /// Check every option and produce the typed configuration
    pub fn validate(self) -> Result<AnalyzerConfig> {
        let analysis_type = match self.analysis_type.as_deref() {
            Some(value) => value.parse()?,
            None => AnalysisType::default(),
        };

        let health_threshold = self.health_threshold.unwrap_or(DEFAULT_HEALTH_THRESHOLD);
        validate_threshold(health_threshold)?;

        let ignore_namespaces = match self.ignore_namespaces {
            Some(entries) => {
                let mut set = BTreeSet::new();
                for entry in entries {
                    validate_namespace_name(&entry)?;
                    set.insert(entry);
                }
                set
            }
            None => DEFAULT_IGNORED_NAMESPACES.iter().map(|s| s.to_string()).collect(),
        };

        let max_concurrent_fetches = self
            .max_concurrent_fetches
            .unwrap_or(DEFAULT_MAX_CONCURRENT_FETCHES);
        if max_concurrent_fetches == 0 {
            return Err(AnalyzerError::invalid_option(
                "max_concurrent_fetches",
                max_concurrent_fetches,
                "an integer >= 1",
            ));
        }

        Ok(AnalyzerConfig {
            ignore_namespaces,
            health_threshold,
            include_node_info: self.include_node_info.unwrap_or(false),
            include_deployment_details: self.include_deployment_details.unwrap_or(false),
            include_resource_metrics: self.include_resource_metrics.unwrap_or(false),
            analysis_type,
            debug_mode: self.debug_mode.unwrap_or(false),
            max_concurrent_fetches,
            cluster: self.cluster.unwrap_or_default(),
        })
    }
}

/// Validated configuration for one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    pub ignore_namespaces: BTreeSet<String>,
    pub health_threshold: f64,
    pub include_node_info: bool,
    pub include_deployment_details: bool,
    pub include_resource_metrics: bool,
    pub analysis_type: AnalysisType,
    pub debug_mode: bool,
    pub max_concurrent_fetches: usize,
    pub cluster: ClusterMetadata,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            ignore_namespaces: DEFAULT_IGNORED_NAMESPACES.iter().map(|s| s.to_string()).collect(),
            health_threshold: DEFAULT_HEALTH_THRESHOLD,
            include_node_info: false,
            include_deployment_details: false,
            include_resource_metrics: false,
            analysis_type: AnalysisType::default(),
            debug_mode: false,
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
            cluster: ClusterMetadata::default(),
        }
    }
}

/// Threshold must be a finite percentage in (0, 100]
pub fn validate_threshold(threshold: f64) -> Result<()> {
    if threshold.is_finite() && threshold > 0.0 && threshold <= 100.0 {
        Ok(())
    } else {
        Err(AnalyzerError::invalid_option(
            "health_threshold",
            threshold,
            "a number in (0, 100]",
        ))
    }
}

/// Namespace names are RFC 1123 labels
pub fn validate_namespace_name(name: &str) -> Result<()> {
    let bytes = name.as_bytes();
    let valid_char = |b: &u8| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-';
    let alnum = |b: &u8| b.is_ascii_lowercase() || b.is_ascii_digit();

    let ok = !bytes.is_empty()
        && bytes.len() <= 63
        && bytes.iter().all(valid_char)
        && bytes.first().is_some_and(alnum)
        && bytes.last().is_some_and(alnum);

    if ok {
        Ok(())
    } else {
        Err(AnalyzerError::invalid_option(
            "ignore_namespaces",
            name,
            "RFC 1123 labels (lowercase alphanumerics and '-', 1-63 characters)",
        ))
    }
}

/// Get the config directory (~/.kubeanalyzer)
pub fn config_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|h| h.join(".kubeanalyzer"))
        .ok_or_else(|| AnalyzerError::Config("Could not determine home directory".to_string()))
}

/// Load the raw config from `path`, or from ~/.kubeanalyzer/config.toml when no path is given.
/// A missing default file yields an empty config; a missing explicit file is an error.
pub fn load_raw_config(path: Option<&Path>) -> Result<RawConfig> {
    let (path, explicit) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => (config_dir()?.join("config.toml"), false),
    };

    if !path.exists() {
        if explicit {
            return Err(AnalyzerError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        return Ok(RawConfig::default());
    }

    let content = std::fs::read_to_string(&path)?;
    parse_raw_config(&content)
}

/// Parse TOML config text
pub fn parse_raw_config(content: &str) -> Result<RawConfig> {
    Ok(toml::from_str(content)?)
}
