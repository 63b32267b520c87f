//! Snapshot input and normalized record types

use chrono::{DateTime, Utc};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Event, Node, Pod};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Sentinel for absent optional string fields
pub const UNKNOWN: &str = "unknown";

/// Point-in-time cluster data handed to the pipeline.
///
/// Optional sections use `None` for "not collected / unavailable" and
/// `Some(vec![])` for "collected, nothing there".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterSnapshot {
    #[serde(default)]
    pub namespaces: Vec<String>,
    #[serde(default)]
    pub pods: Vec<Pod>,
    #[serde(default)]
    pub nodes: Option<Vec<Node>>,
    #[serde(default)]
    pub deployments: Option<Vec<Deployment>>,
    #[serde(default)]
    pub events: Vec<Event>,
    /// Raw `metrics.k8s.io` PodMetricsList payload
    #[serde(default)]
    pub pod_metrics: Option<serde_json::Value>,
    /// Raw `metrics.k8s.io` NodeMetricsList payload
    #[serde(default)]
    pub node_metrics: Option<serde_json::Value>,
}

/// Pod lifecycle phase
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
    /// Any phase string the API server reports that isn't one of the above
    Other(String),
}

impl PodPhase {
    pub fn as_str(&self) -> &str {
        match self {
            PodPhase::Pending => "Pending",
            PodPhase::Running => "Running",
            PodPhase::Succeeded => "Succeeded",
            PodPhase::Failed => "Failed",
            PodPhase::Unknown => "Unknown",
            PodPhase::Other(s) => s,
        }
    }

    /// Neither Running nor Succeeded
    pub fn is_problematic(&self) -> bool {
        !matches!(self, PodPhase::Running | PodPhase::Succeeded)
    }
}

impl From<String> for PodPhase {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Pending" => PodPhase::Pending,
            "Running" => PodPhase::Running,
            "Succeeded" => PodPhase::Succeeded,
            "Failed" => PodPhase::Failed,
            "Unknown" => PodPhase::Unknown,
            _ => PodPhase::Other(s),
        }
    }
}

impl From<&str> for PodPhase {
    fn from(s: &str) -> Self {
        PodPhase::from(s.to_string())
    }
}

impl From<PodPhase> for String {
    fn from(p: PodPhase) -> Self {
        match p {
            PodPhase::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for PodPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pod or node condition
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConditionRecord {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: String,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// CPU/memory quantities as written in the pod spec; `None` means not set
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceAmounts {
    pub cpu: Option<String>,
    pub memory: Option<String>,
}

impl ResourceAmounts {
    pub fn is_empty(&self) -> bool {
        self.cpu.is_none() && self.memory.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContainerResources {
    pub requests: ResourceAmounts,
    pub limits: ResourceAmounts,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContainerRecord {
    pub name: String,
    pub image: String,
    pub ready: bool,
    #[serde(default)]
    pub restart_count: i32,
    #[serde(default)]
    pub resources: ContainerResources,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PodRecord {
    pub name: String,
    pub namespace: String,
    pub status: PodPhase,
    pub containers: Vec<ContainerRecord>,
    pub node_name: String,
    pub pod_ip: String,
    pub start_time: String,
    pub conditions: Vec<ConditionRecord>,
}

impl PodRecord {
    /// `namespace/name`
    pub fn key(&self) -> String {
        pod_key(&self.namespace, &self.name)
    }

    pub fn is_problematic(&self) -> bool {
        self.status.is_problematic()
    }

    /// (ready, total) containers
    pub fn ready_containers(&self) -> (usize, usize) {
        let ready = self.containers.iter().filter(|c| c.ready).count();
        (ready, self.containers.len())
    }

    pub fn restart_count(&self) -> i32 {
        self.containers.iter().map(|c| c.restart_count).sum()
    }
}

/// Join key shared by pods, events and metrics
pub fn pod_key(namespace: &str, name: &str) -> String {
    format!("{}/{}", namespace, name)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeAddressRecord {
    #[serde(rename = "type")]
    pub address_type: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub name: String,
    pub capacity: BTreeMap<String, String>,
    pub allocatable: BTreeMap<String, String>,
    pub conditions: Vec<ConditionRecord>,
    pub addresses: Vec<NodeAddressRecord>,
    pub kubelet_version: String,
    pub ready: bool,
}

impl NodeRecord {
    /// Conditions other than Ready that are currently True (pressure, network unavailable)
    pub fn pressure_conditions(&self) -> Vec<&ConditionRecord> {
        self.conditions
            .iter()
            .filter(|c| c.condition_type != "Ready" && c.status == "True")
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub name: String,
    pub namespace: String,
    pub replicas: i32,
    pub available_replicas: i32,
    pub ready_replicas: i32,
    #[serde(default)]
    pub updated_replicas: i32,
    pub strategy: String,
    pub selector: BTreeMap<String, String>,
}

impl DeploymentRecord {
    pub fn is_fully_available(&self) -> bool {
        self.available_replicas >= self.replicas
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(rename = "type")]
    pub event_type: String,
    pub reason: String,
    pub message: String,
    pub count: i32,
    pub first_timestamp: Option<DateTime<Utc>>,
    pub last_timestamp: Option<DateTime<Utc>>,
    /// Best available observation time of the event
    pub observed_at: Option<DateTime<Utc>>,
    pub involved_kind: String,
}
