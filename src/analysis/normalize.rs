//! Normalization of raw Kubernetes objects into canonical records
//!
//! Absent optional fields never fail normalization. Strings fall back to
//! [`UNKNOWN`], collections to empty, counters to zero, and resource
//! quantities stay `None` so "not requested" is distinguishable from "0".

use super::types::*;
use chrono::{DateTime, Utc};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Container, ContainerStatus, Event, Node, Pod};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Namespace assumed for objects that carry none
const DEFAULT_NAMESPACE: &str = "default";

/// Normalize pods, keeping only those in `namespaces`. Output is sorted by namespace, then name.
pub fn normalize_pods(pods: &[Pod], namespaces: &BTreeSet<String>) -> Vec<PodRecord> {
    let mut records: Vec<PodRecord> = pods
        .iter()
        .map(normalize_pod)
        .filter(|p| namespaces.contains(&p.namespace))
        .collect();

    // Full record as tiebreak so the surviving duplicate doesn't depend on input order
    records.sort_by(|a, b| {
        (&a.namespace, &a.name)
            .cmp(&(&b.namespace, &b.name))
            .then_with(|| a.cmp(b))
    });
    records.dedup_by(|a, b| a.namespace == b.namespace && a.name == b.name);

    debug!(input = pods.len(), kept = records.len(), "normalized pods");
    records
}

/// Normalize a single pod
pub fn normalize_pod(pod: &Pod) -> PodRecord {
    let name = pod.metadata.name.clone().unwrap_or_else(|| UNKNOWN.to_string());
    let namespace = pod
        .metadata
        .namespace
        .clone()
        .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());

    let status = pod.status.as_ref();
    let phase = status
        .and_then(|s| s.phase.clone())
        .map(PodPhase::from)
        .unwrap_or(PodPhase::Unknown);

    let statuses: &[ContainerStatus] = status
        .and_then(|s| s.container_statuses.as_deref())
        .unwrap_or_default();

    let containers = pod
        .spec
        .as_ref()
        .map(|spec| {
            spec.containers
                .iter()
                .map(|c| normalize_container(c, statuses))
                .collect()
        })
        .unwrap_or_default();

    let node_name = pod
        .spec
        .as_ref()
        .and_then(|s| s.node_name.clone())
        .unwrap_or_else(|| UNKNOWN.to_string());

    let pod_ip = status
        .and_then(|s| s.pod_ip.clone())
        .unwrap_or_else(|| UNKNOWN.to_string());

    let start_time = status
        .and_then(|s| s.start_time.as_ref())
        .map(|t| t.0.to_rfc3339())
        .unwrap_or_else(|| UNKNOWN.to_string());

    let conditions = status
        .and_then(|s| s.conditions.as_ref())
        .map(|conds| {
            conds
                .iter()
                .map(|c| ConditionRecord {
                    condition_type: c.type_.clone(),
                    status: c.status.clone(),
                    reason: c.reason.clone(),
                    message: c.message.clone(),
                })
                .collect()
        })
        .unwrap_or_default();

    PodRecord {
        name,
        namespace,
        status: phase,
        containers,
        node_name,
        pod_ip,
        start_time,
        conditions,
    }
}

/// Resolve a declared container against the pod's status list by name
fn normalize_container(container: &Container, statuses: &[ContainerStatus]) -> ContainerRecord {
    let status = statuses.iter().find(|s| s.name == container.name);

    let resources = container
        .resources
        .as_ref()
        .map(|r| ContainerResources {
            requests: amounts(r.requests.as_ref()),
            limits: amounts(r.limits.as_ref()),
        })
        .unwrap_or_default();

    ContainerRecord {
        name: container.name.clone(),
        image: container.image.clone().unwrap_or_else(|| UNKNOWN.to_string()),
        ready: status.map(|s| s.ready).unwrap_or(false),
        restart_count: status.map(|s| s.restart_count).unwrap_or(0),
        resources,
    }
}

fn amounts(map: Option<&BTreeMap<String, Quantity>>) -> ResourceAmounts {
    let get = |key: &str| map.and_then(|m| m.get(key)).map(|q| q.0.clone());
    ResourceAmounts {
        cpu: get("cpu"),
        memory: get("memory"),
    }
}

fn quantities(map: Option<&BTreeMap<String, Quantity>>) -> BTreeMap<String, String> {
    map.map(|m| m.iter().map(|(k, v)| (k.clone(), v.0.clone())).collect())
        .unwrap_or_default()
}

/// Normalize nodes, sorted by name
pub fn normalize_nodes(nodes: &[Node]) -> Vec<NodeRecord> {
    let mut records: Vec<NodeRecord> = nodes.iter().map(normalize_node).collect();
    records.sort_by(|a, b| a.name.cmp(&b.name));
    records
}

pub fn normalize_node(node: &Node) -> NodeRecord {
    let status = node.status.as_ref();

    let conditions: Vec<ConditionRecord> = status
        .and_then(|s| s.conditions.as_ref())
        .map(|conds| {
            conds
                .iter()
                .map(|c| ConditionRecord {
                    condition_type: c.type_.clone(),
                    status: c.status.clone(),
                    reason: c.reason.clone(),
                    message: c.message.clone(),
                })
                .collect()
        })
        .unwrap_or_default();

    let ready = conditions
        .iter()
        .any(|c| c.condition_type == "Ready" && c.status == "True");

    let addresses = status
        .and_then(|s| s.addresses.as_ref())
        .map(|addrs| {
            addrs
                .iter()
                .map(|a| NodeAddressRecord {
                    address_type: a.type_.clone(),
                    address: a.address.clone(),
                })
                .collect()
        })
        .unwrap_or_default();

    let kubelet_version = status
        .and_then(|s| s.node_info.as_ref())
        .map(|i| i.kubelet_version.clone())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string());

    NodeRecord {
        name: node.metadata.name.clone().unwrap_or_else(|| UNKNOWN.to_string()),
        capacity: quantities(status.and_then(|s| s.capacity.as_ref())),
        allocatable: quantities(status.and_then(|s| s.allocatable.as_ref())),
        conditions,
        addresses,
        kubelet_version,
        ready,
    }
}

/// Normalize deployments in `namespaces`, sorted by namespace, then name
pub fn normalize_deployments(
    deployments: &[Deployment],
    namespaces: &BTreeSet<String>,
) -> Vec<DeploymentRecord> {
    let mut records: Vec<DeploymentRecord> = deployments
        .iter()
        .map(normalize_deployment)
        .filter(|d| namespaces.contains(&d.namespace))
        .collect();
    records.sort_by(|a, b| (&a.namespace, &a.name).cmp(&(&b.namespace, &b.name)));
    records
}

pub fn normalize_deployment(deployment: &Deployment) -> DeploymentRecord {
    let spec = deployment.spec.as_ref();
    let status = deployment.status.as_ref();

    DeploymentRecord {
        name: deployment
            .metadata
            .name
            .clone()
            .unwrap_or_else(|| UNKNOWN.to_string()),
        namespace: deployment
            .metadata
            .namespace
            .clone()
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
        replicas: spec.and_then(|s| s.replicas).unwrap_or(0),
        available_replicas: status.and_then(|s| s.available_replicas).unwrap_or(0),
        ready_replicas: status.and_then(|s| s.ready_replicas).unwrap_or(0),
        updated_replicas: status.and_then(|s| s.updated_replicas).unwrap_or(0),
        strategy: spec
            .and_then(|s| s.strategy.as_ref())
            .and_then(|s| s.type_.clone())
            .unwrap_or_else(|| UNKNOWN.to_string()),
        selector: spec
            .and_then(|s| s.selector.match_labels.clone())
            .unwrap_or_default(),
    }
}

/// Normalize one event
pub fn normalize_event(event: &Event) -> EventRecord {
    let first = event.first_timestamp.as_ref().map(|t| t.0);
    let last = event.last_timestamp.as_ref().map(|t| t.0);
    let observed_at: Option<DateTime<Utc>> = last
        .or(first)
        .or_else(|| event.event_time.as_ref().map(|t| t.0))
        .or_else(|| event.metadata.creation_timestamp.as_ref().map(|t| t.0));

    EventRecord {
        event_type: event.type_.clone().unwrap_or_else(|| "Normal".to_string()),
        reason: event.reason.clone().unwrap_or_else(|| UNKNOWN.to_string()),
        message: event.message.clone().unwrap_or_default(),
        count: event.count.unwrap_or(1),
        first_timestamp: first,
        last_timestamp: last,
        observed_at,
        involved_kind: event
            .involved_object
            .kind
            .clone()
            .unwrap_or_else(|| "Pod".to_string()),
    }
}

/// Attach events to pods by `namespace/name`.
///
/// Only events about pods present in `pods` are kept. Each pod's events are
/// ordered most recent first; events without any timestamp sort last.
pub fn associate_events(events: &[Event], pods: &[PodRecord]) -> BTreeMap<String, Vec<EventRecord>> {
    let known: BTreeSet<String> = pods.iter().map(PodRecord::key).collect();
    let mut by_pod: BTreeMap<String, Vec<EventRecord>> = BTreeMap::new();

    for event in events {
        let involved = &event.involved_object;
        if involved.kind.as_deref().is_some_and(|k| k != "Pod") {
            continue;
        }
        let Some(name) = involved.name.as_deref() else {
            continue;
        };
        let namespace = involved
            .namespace
            .as_deref()
            .or(event.metadata.namespace.as_deref())
            .unwrap_or(DEFAULT_NAMESPACE);

        let key = pod_key(namespace, name);
        if known.contains(&key) {
            by_pod.entry(key).or_default().push(normalize_event(event));
        }
    }

    for list in by_pod.values_mut() {
        sort_most_recent_first(list);
    }

    by_pod
}

/// Most recent first, undated last, remaining ties broken on every other field
pub fn sort_most_recent_first(events: &mut [EventRecord]) {
    events.sort_by(|a, b| {
        b.observed_at
            .cmp(&a.observed_at)
            .then_with(|| a.reason.cmp(&b.reason))
            .then_with(|| a.message.cmp(&b.message))
            .then_with(|| a.event_type.cmp(&b.event_type))
            .then_with(|| b.count.cmp(&a.count))
            .then_with(|| b.last_timestamp.cmp(&a.last_timestamp))
            .then_with(|| b.first_timestamp.cmp(&a.first_timestamp))
            .then_with(|| a.involved_kind.cmp(&b.involved_kind))
    });
}
