// Common test utilities and helpers

use chrono::{Duration as ChronoDuration, Utc};
use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec, DeploymentStatus, DeploymentStrategy};
use k8s_openapi::api::core::v1::{
    Container, ContainerStatus, Event, Node, NodeCondition, NodeStatus, ObjectReference, Pod,
    PodSpec, PodStatus, ResourceRequirements,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta, Time};
use kubeanalyzer::analysis::ClusterSnapshot;
use kubeanalyzer::config::AnalyzerConfig;
use serde_json::json;
use std::collections::BTreeMap;

/// Create a mock Pod with one ready container named "main"
pub fn create_mock_pod(name: &str, namespace: &str, phase: &str) -> Pod {
    Pod {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            creation_timestamp: Some(Time(Utc::now() - ChronoDuration::hours(1))),
            ..Default::default()
        },
        spec: Some(PodSpec {
            containers: vec![Container {
                name: "main".to_string(),
                image: Some("nginx:latest".to_string()),
                ..Default::default()
            }],
            node_name: Some("node-1".to_string()),
            ..Default::default()
        }),
        status: Some(PodStatus {
            phase: Some(phase.to_string()),
            pod_ip: Some("10.0.0.1".to_string()),
            container_statuses: Some(vec![ContainerStatus {
                name: "main".to_string(),
                image: "nginx:latest".to_string(),
                image_id: String::new(),
                ready: phase == "Running",
                restart_count: 0,
                ..Default::default()
            }]),
            ..Default::default()
        }),
    }
}

/// Pod whose containers declare requests and limits
pub fn create_mock_pod_with_resources(
    name: &str,
    namespace: &str,
    cpu_request: &str,
    memory_limit: &str,
) -> Pod {
    let mut pod = create_mock_pod(name, namespace, "Running");
    if let Some(spec) = pod.spec.as_mut() {
        spec.containers[0].resources = Some(ResourceRequirements {
            requests: Some(BTreeMap::from([(
                "cpu".to_string(),
                Quantity(cpu_request.to_string()),
            )])),
            limits: Some(BTreeMap::from([(
                "memory".to_string(),
                Quantity(memory_limit.to_string()),
            )])),
            ..Default::default()
        });
    }
    pod
}

/// Create a mock Node; `ready` sets the Ready condition
pub fn create_mock_node(name: &str, ready: bool) -> Node {
    Node {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        status: Some(NodeStatus {
            capacity: Some(BTreeMap::from([
                ("cpu".to_string(), Quantity("4".to_string())),
                ("memory".to_string(), Quantity("16Gi".to_string())),
            ])),
            allocatable: Some(BTreeMap::from([
                ("cpu".to_string(), Quantity("3800m".to_string())),
                ("memory".to_string(), Quantity("15Gi".to_string())),
            ])),
            conditions: Some(vec![NodeCondition {
                type_: "Ready".to_string(),
                status: if ready { "True" } else { "False" }.to_string(),
                ..Default::default()
            }]),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Create a mock Deployment with `available` of `replicas` available
pub fn create_mock_deployment(name: &str, namespace: &str, replicas: i32, available: i32) -> Deployment {
    Deployment {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            creation_timestamp: Some(Time(Utc::now() - ChronoDuration::days(1))),
            ..Default::default()
        },
        spec: Some(DeploymentSpec {
            replicas: Some(replicas),
            selector: LabelSelector {
                match_labels: Some([("app".to_string(), name.to_string())].into()),
                ..Default::default()
            },
            strategy: Some(DeploymentStrategy {
                type_: Some("RollingUpdate".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }),
        status: Some(DeploymentStatus {
            replicas: Some(replicas),
            ready_replicas: Some(available),
            available_replicas: Some(available),
            updated_replicas: Some(replicas),
            ..Default::default()
        }),
    }
}

/// Create a Warning event about a pod, last seen `minutes_ago`
pub fn create_mock_event(
    namespace: &str,
    pod: &str,
    reason: &str,
    message: &str,
    minutes_ago: i64,
) -> Event {
    let at = Time(Utc::now() - ChronoDuration::minutes(minutes_ago));
    Event {
        metadata: ObjectMeta {
            name: Some(format!("{}.{}", pod, minutes_ago)),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        involved_object: ObjectReference {
            kind: Some("Pod".to_string()),
            name: Some(pod.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        reason: Some(reason.to_string()),
        message: Some(message.to_string()),
        type_: Some("Warning".to_string()),
        count: Some(1),
        first_timestamp: Some(at.clone()),
        last_timestamp: Some(at),
        ..Default::default()
    }
}

/// Snapshot with the given namespaces and pods and nothing else
pub fn create_snapshot(namespaces: &[&str], pods: Vec<Pod>) -> ClusterSnapshot {
    ClusterSnapshot {
        namespaces: namespaces.iter().map(|s| s.to_string()).collect(),
        pods,
        ..Default::default()
    }
}

/// Five pods in `test-apps`: four Running, one Pending
pub fn four_running_one_pending() -> ClusterSnapshot {
    let mut pods: Vec<Pod> = (1..=4)
        .map(|i| create_mock_pod(&format!("web-{}", i), "test-apps", "Running"))
        .collect();
    pods.push(create_mock_pod("worker-1", "test-apps", "Pending"));
    create_snapshot(&["default", "kube-system", "test-apps"], pods)
}

/// metrics.k8s.io PodMetricsList payload with one entry per (namespace, name, cpu, memory)
pub fn pod_metrics_payload(entries: &[(&str, &str, &str, &str)]) -> serde_json::Value {
    let items: Vec<serde_json::Value> = entries
        .iter()
        .map(|(ns, name, cpu, memory)| {
            json!({
                "metadata": { "name": name, "namespace": ns },
                "timestamp": "2024-01-01T00:00:00Z",
                "window": "30s",
                "containers": [
                    { "name": "main", "usage": { "cpu": cpu, "memory": memory } }
                ]
            })
        })
        .collect();
    json!({ "kind": "PodMetricsList", "apiVersion": "metrics.k8s.io/v1beta1", "items": items })
}

/// Default configuration with everything optional switched on
pub fn full_config() -> AnalyzerConfig {
    AnalyzerConfig {
        include_node_info: true,
        include_deployment_details: true,
        include_resource_metrics: true,
        ..Default::default()
    }
}
