//! Tests for src/analysis/normalize.rs

use crate::common;
use chrono::{Duration as ChronoDuration, Utc};
use k8s_openapi::api::core::v1::{Container, Event, ObjectReference, Pod, PodSpec, PodStatus};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time};
use kubeanalyzer::analysis::normalize::{
    associate_events, normalize_deployment, normalize_event, normalize_node, normalize_pod,
    normalize_pods, sort_most_recent_first,
};
use kubeanalyzer::analysis::{PodPhase, UNKNOWN};
use std::collections::BTreeSet;

fn allowed(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(|s| s.to_string()).collect()
}

// ============================================================================
// Pod normalization tests
// ============================================================================

#[test]
fn test_normalize_pod_basic_fields() {
    let pod = common::create_mock_pod("web-1", "test-apps", "Running");
    let record = normalize_pod(&pod);

    assert_eq!(record.name, "web-1");
    assert_eq!(record.namespace, "test-apps");
    assert_eq!(record.status, PodPhase::Running);
    assert_eq!(record.node_name, "node-1");
    assert_eq!(record.pod_ip, "10.0.0.1");
    assert_eq!(record.containers.len(), 1);
    assert!(record.containers[0].ready);
    assert_eq!(record.containers[0].image, "nginx:latest");
}

#[test]
fn test_normalize_pod_container_without_status_is_not_ready() {
    let mut pod = common::create_mock_pod("web-1", "test-apps", "Running");
    pod.spec.as_mut().unwrap().containers.push(Container {
        name: "sidecar".to_string(),
        image: Some("envoy:1".to_string()),
        ..Default::default()
    });

    let record = normalize_pod(&pod);

    assert_eq!(record.containers.len(), 2);
    let sidecar = record.containers.iter().find(|c| c.name == "sidecar").unwrap();
    assert!(!sidecar.ready);
    assert_eq!(sidecar.restart_count, 0);
}

#[test]
fn test_normalize_pod_missing_status_list_entirely() {
    let mut pod = common::create_mock_pod("web-1", "test-apps", "Pending");
    pod.status.as_mut().unwrap().container_statuses = None;

    let record = normalize_pod(&pod);
    assert!(record.containers.iter().all(|c| !c.ready));
}

#[test]
fn test_normalize_pod_absent_fields_use_sentinels() {
    let pod = Pod {
        metadata: ObjectMeta {
            name: Some("bare".to_string()),
            namespace: Some("default".to_string()),
            ..Default::default()
        },
        spec: Some(PodSpec {
            containers: vec![Container {
                name: "c".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        }),
        status: Some(PodStatus::default()),
    };

    let record = normalize_pod(&pod);

    assert_eq!(record.status, PodPhase::Unknown);
    assert_eq!(record.node_name, UNKNOWN);
    assert_eq!(record.pod_ip, UNKNOWN);
    assert_eq!(record.start_time, UNKNOWN);
    assert_eq!(record.containers[0].image, UNKNOWN);
    assert!(record.containers[0].resources.requests.is_empty());
    assert!(record.conditions.is_empty());
}

#[test]
fn test_normalize_pod_without_status_or_spec() {
    let pod = Pod {
        metadata: ObjectMeta {
            name: Some("ghost".to_string()),
            ..Default::default()
        },
        ..Default::default()
    };

    let record = normalize_pod(&pod);
    assert_eq!(record.namespace, "default");
    assert_eq!(record.status, PodPhase::Unknown);
    assert!(record.containers.is_empty());
}

#[test]
fn test_normalize_pod_keeps_resource_quantities_verbatim() {
    let pod = common::create_mock_pod_with_resources("api", "prod", "250m", "512Mi");
    let record = normalize_pod(&pod);
    let resources = &record.containers[0].resources;

    assert_eq!(resources.requests.cpu.as_deref(), Some("250m"));
    assert_eq!(resources.requests.memory, None);
    assert_eq!(resources.limits.memory.as_deref(), Some("512Mi"));
    assert_eq!(resources.limits.cpu, None);
}

#[test]
fn test_normalize_pod_unrecognized_phase_is_preserved() {
    let pod = common::create_mock_pod("odd", "default", "Evicted");
    let record = normalize_pod(&pod);
    assert_eq!(record.status.as_str(), "Evicted");
    assert!(record.is_problematic());
}

#[test]
fn test_normalize_pods_filters_and_sorts() {
    let pods = vec![
        common::create_mock_pod("b", "ns-2", "Running"),
        common::create_mock_pod("z", "ns-1", "Running"),
        common::create_mock_pod("a", "ns-1", "Running"),
        common::create_mock_pod("sys", "kube-system", "Running"),
    ];

    let records = normalize_pods(&pods, &allowed(&["ns-1", "ns-2"]));
    let keys: Vec<String> = records.iter().map(|p| p.key()).collect();
    assert_eq!(keys, vec!["ns-1/a", "ns-1/z", "ns-2/b"]);
}

#[test]
fn test_normalize_pods_is_order_independent() {
    let mut pods = vec![
        common::create_mock_pod("a", "ns", "Running"),
        common::create_mock_pod("b", "ns", "Pending"),
        common::create_mock_pod("c", "ns", "Failed"),
    ];
    let first = normalize_pods(&pods, &allowed(&["ns"]));
    pods.reverse();
    let second = normalize_pods(&pods, &allowed(&["ns"]));
    assert_eq!(first, second);
}

#[test]
fn test_normalize_pods_duplicate_keys_keep_same_record_in_any_order() {
    let mut pods = vec![
        common::create_mock_pod("web", "ns", "Running"),
        common::create_mock_pod("web", "ns", "Failed"),
    ];
    let forward = normalize_pods(&pods, &allowed(&["ns"]));
    pods.reverse();
    let reversed = normalize_pods(&pods, &allowed(&["ns"]));

    assert_eq!(forward.len(), 1);
    assert_eq!(forward, reversed);
}

// ============================================================================
// Node and deployment normalization tests
// ============================================================================

#[test]
fn test_normalize_node_ready_and_quantities() {
    let node = normalize_node(&common::create_mock_node("node-1", true));
    assert_eq!(node.name, "node-1");
    assert!(node.ready);
    assert_eq!(node.capacity.get("cpu").map(String::as_str), Some("4"));
    assert_eq!(node.allocatable.get("memory").map(String::as_str), Some("15Gi"));
    assert_eq!(node.kubelet_version, UNKNOWN);
}

#[test]
fn test_normalize_node_not_ready() {
    let node = normalize_node(&common::create_mock_node("node-2", false));
    assert!(!node.ready);
}

#[test]
fn test_normalize_deployment_counts() {
    let deployment = normalize_deployment(&common::create_mock_deployment("web", "prod", 3, 2));
    assert_eq!(deployment.replicas, 3);
    assert_eq!(deployment.available_replicas, 2);
    assert_eq!(deployment.ready_replicas, 2);
    assert_eq!(deployment.strategy, "RollingUpdate");
    assert!(!deployment.is_fully_available());
}

#[test]
fn test_normalize_deployment_without_status_defaults_to_zero() {
    let mut raw = common::create_mock_deployment("web", "prod", 3, 3);
    raw.status = None;
    let deployment = normalize_deployment(&raw);
    assert_eq!(deployment.available_replicas, 0);
    assert_eq!(deployment.ready_replicas, 0);
}

// ============================================================================
// Event tests
// ============================================================================

#[test]
fn test_normalize_event_falls_back_to_creation_timestamp() {
    let created = Utc::now() - ChronoDuration::minutes(3);
    let event = Event {
        metadata: ObjectMeta {
            creation_timestamp: Some(Time(created)),
            ..Default::default()
        },
        involved_object: ObjectReference::default(),
        reason: Some("BackOff".to_string()),
        ..Default::default()
    };

    let record = normalize_event(&event);
    assert_eq!(record.observed_at, Some(created));
    assert_eq!(record.count, 1);
    assert_eq!(record.event_type, "Normal");
    assert_eq!(record.message, "");
}

#[test]
fn test_associate_events_orders_most_recent_first() {
    let pods = normalize_pods(
        &[common::create_mock_pod("worker-1", "test-apps", "Pending")],
        &allowed(&["test-apps"]),
    );
    let events = vec![
        common::create_mock_event("test-apps", "worker-1", "Scheduled", "old", 30),
        common::create_mock_event("test-apps", "worker-1", "FailedScheduling", "new", 1),
    ];

    let by_pod = associate_events(&events, &pods);
    let list = &by_pod["test-apps/worker-1"];
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].reason, "FailedScheduling");
    assert_eq!(list[1].reason, "Scheduled");
}

#[test]
fn test_associate_events_skips_unknown_pods_and_other_kinds() {
    let pods = normalize_pods(
        &[common::create_mock_pod("worker-1", "test-apps", "Pending")],
        &allowed(&["test-apps"]),
    );
    let mut node_event = common::create_mock_event("test-apps", "worker-1", "NodeNotReady", "", 2);
    node_event.involved_object.kind = Some("Node".to_string());
    let events = vec![
        common::create_mock_event("test-apps", "someone-else", "BackOff", "", 1),
        common::create_mock_event("other-ns", "worker-1", "BackOff", "", 1),
        node_event,
    ];

    let by_pod = associate_events(&events, &pods);
    assert!(by_pod.is_empty());
}

#[test]
fn test_sort_most_recent_first_breaks_full_ties() {
    let base = normalize_event(&common::create_mock_event("ns", "web", "BackOff", "restarting", 5));
    let mut warning = base.clone();
    warning.event_type = "Warning".to_string();
    warning.count = 7;
    let normal = base;

    let mut forward = vec![warning.clone(), normal.clone()];
    let mut reversed = vec![normal, warning];
    sort_most_recent_first(&mut forward);
    sort_most_recent_first(&mut reversed);

    assert_eq!(forward, reversed);
    assert_eq!(forward[0].count, 7);
}
