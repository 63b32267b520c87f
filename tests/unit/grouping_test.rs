//! Tests for src/analysis/grouping.rs

use crate::common;
use kubeanalyzer::analysis::normalize::normalize_pods;
use kubeanalyzer::analysis::{PodIndex, PodRecord};
use std::collections::BTreeSet;

fn records(pods: &[(&str, &str, &str)]) -> Vec<PodRecord> {
    let raw: Vec<_> = pods
        .iter()
        .map(|(name, ns, phase)| common::create_mock_pod(name, ns, phase))
        .collect();
    let namespaces: BTreeSet<String> = pods.iter().map(|(_, ns, _)| ns.to_string()).collect();
    normalize_pods(&raw, &namespaces)
}

fn mixed() -> Vec<PodRecord> {
    records(&[
        ("web-1", "prod", "Running"),
        ("web-2", "prod", "Running"),
        ("job-1", "prod", "Succeeded"),
        ("api-1", "staging", "Pending"),
        ("api-2", "staging", "Failed"),
        ("api-3", "staging", "Running"),
        ("tool", "dev", "Unknown"),
    ])
}

// ============================================================================
// Index structure tests
// ============================================================================

#[test]
fn test_namespace_summary_counts() {
    let index = PodIndex::build(&mixed());

    let prod = &index.namespace_summary["prod"];
    assert_eq!(prod.total_pods, 3);
    assert_eq!(prod.pods, vec!["job-1", "web-1", "web-2"]);
    assert_eq!(prod.status_breakdown["Running"], 2);
    assert_eq!(prod.status_breakdown["Succeeded"], 1);
}

#[test]
fn test_status_summary_uses_pod_keys() {
    let index = PodIndex::build(&mixed());

    let running = &index.status_summary["Running"];
    assert_eq!(running.total_pods, 3);
    assert_eq!(running.pods, vec!["prod/web-1", "prod/web-2", "staging/api-3"]);
    assert_eq!(running.namespace_breakdown["prod"], 2);
    assert_eq!(running.namespace_breakdown["staging"], 1);
}

#[test]
fn test_every_pod_in_exactly_one_cell() {
    let pods = mixed();
    let index = PodIndex::build(&pods);

    let cells: usize = index
        .by_namespace_and_status
        .values()
        .flat_map(|by_status| by_status.values())
        .map(Vec::len)
        .sum();
    assert_eq!(cells, pods.len());

    for pod in &pods {
        let cell = &index.by_namespace_and_status[&pod.namespace][pod.status.as_str()];
        assert_eq!(cell.iter().filter(|p| p.name == pod.name).count(), 1);
    }
}

#[test]
fn test_summaries_sum_to_total() {
    let pods = mixed();
    let index = PodIndex::build(&pods);

    let by_ns: usize = index.namespace_summary.values().map(|g| g.total_pods).sum();
    let by_status: usize = index.status_summary.values().map(|g| g.total_pods).sum();
    assert_eq!(by_ns, pods.len());
    assert_eq!(by_status, pods.len());
    assert_eq!(index.total_pods(), pods.len());

    for group in index.namespace_summary.values() {
        assert_eq!(group.status_breakdown.values().sum::<usize>(), group.total_pods);
    }
}

#[test]
fn test_empty_input_gives_empty_index() {
    let index = PodIndex::build(&[]);
    assert_eq!(index, PodIndex::default());
    assert_eq!(index.total_pods(), 0);
    assert_eq!(index.count_with_status("Running"), 0);
}

#[test]
fn test_build_is_input_order_independent() {
    let pods = mixed();
    let mut reversed = pods.clone();
    reversed.reverse();
    assert_eq!(PodIndex::build(&pods), PodIndex::build(&reversed));
}

#[test]
fn test_round_trip_through_nested_grouping() {
    let index = PodIndex::build(&mixed());
    let rebuilt = PodIndex::from_grouped(&index.by_namespace_and_status);

    assert_eq!(rebuilt.namespace_summary, index.namespace_summary);
    assert_eq!(rebuilt.status_summary, index.status_summary);
    assert_eq!(rebuilt, index);
}

#[test]
fn test_round_trip_through_json() {
    let index = PodIndex::build(&mixed());
    let json = serde_json::to_string(&index.by_namespace_and_status).unwrap();
    let parsed = serde_json::from_str(&json).unwrap();
    let rebuilt = PodIndex::from_grouped(&parsed);

    assert_eq!(rebuilt.namespace_summary, index.namespace_summary);
    assert_eq!(rebuilt.status_summary, index.status_summary);
}

#[test]
fn test_status_counts() {
    let index = PodIndex::build(&mixed());
    let counts = index.status_counts();
    assert_eq!(counts["Running"], 3);
    assert_eq!(counts["Pending"], 1);
    assert_eq!(counts["Failed"], 1);
    assert_eq!(counts["Unknown"], 1);
    assert_eq!(counts["Succeeded"], 1);
}
