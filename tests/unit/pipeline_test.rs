//! End-to-end tests for analysis::analyze on in-memory snapshots

use crate::common;
use chrono::{TimeZone, Utc};
use kubeanalyzer::analysis::{analyze, AnalysisDocument, ClusterSnapshot, PodPhase, SectionState};
use kubeanalyzer::config::AnalyzerConfig;

fn at_noon() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

fn run(snapshot: &ClusterSnapshot, config: &AnalyzerConfig) -> AnalysisDocument {
    analyze(snapshot, config, at_noon())
}

// ============================================================================
// Health scenarios
// ============================================================================

#[test]
fn test_four_running_one_pending() {
    let doc = run(&common::four_running_one_pending(), &AnalyzerConfig::default());

    assert_eq!(doc.health.total_pods, 5);
    assert_eq!(doc.health.running_pods, 4);
    assert_eq!(doc.health.health_percentage, 80.0);
    assert!(!doc.health.is_healthy);
    assert_eq!(doc.findings.len(), 1);
    assert_eq!(doc.findings[0].status, PodPhase::Pending);
    assert_eq!(doc.findings[0].name, "worker-1");
    assert_eq!(doc.problematic_pods.len(), 1);
}

#[test]
fn test_empty_cluster() {
    let snapshot = common::create_snapshot(&["default"], Vec::new());
    let doc = run(&snapshot, &AnalyzerConfig::default());

    assert_eq!(doc.health.total_pods, 0);
    assert_eq!(doc.health.health_percentage, 100.0);
    assert!(doc.health.is_healthy);
    assert!(doc.findings.is_empty());
    assert!(doc.namespace_summary.is_empty());
    assert_eq!(doc.namespaces, vec!["default"]);
}

#[test]
fn test_ignored_namespace_pods_are_excluded() {
    let snapshot = common::create_snapshot(
        &["default", "kube-system"],
        vec![
            common::create_mock_pod("app", "default", "Running"),
            common::create_mock_pod("coredns", "kube-system", "Failed"),
        ],
    );
    let doc = run(&snapshot, &AnalyzerConfig::default());

    assert_eq!(doc.health.total_pods, 1);
    assert!(doc.findings.is_empty());
    assert!(!doc.namespace_summary.contains_key("kube-system"));
    assert_eq!(doc.ignored_namespaces, vec!["kube-system"]);
}

#[test]
fn test_findings_match_problematic_pods() {
    let snapshot = common::create_snapshot(
        &["a", "b"],
        vec![
            common::create_mock_pod("p1", "a", "Running"),
            common::create_mock_pod("p2", "a", "Failed"),
            common::create_mock_pod("p3", "b", "Pending"),
            common::create_mock_pod("p4", "b", "Succeeded"),
            common::create_mock_pod("p5", "b", "Unknown"),
        ],
    );
    let doc = run(&snapshot, &AnalyzerConfig::default());

    let problematic: Vec<String> = doc
        .pods()
        .filter(|p| p.is_problematic())
        .map(|p| p.key())
        .collect();
    let mut found: Vec<String> = doc.findings.iter().map(|f| f.key()).collect();
    found.sort();
    let mut expected = problematic.clone();
    expected.sort();
    assert_eq!(found, expected);
    assert_eq!(doc.health.problematic_pods, 3);
}

#[test]
fn test_events_are_attached_to_findings() {
    let mut snapshot = common::four_running_one_pending();
    snapshot.events = vec![common::create_mock_event(
        "test-apps",
        "worker-1",
        "FailedScheduling",
        "0/3 nodes are available: insufficient cpu",
        2,
    )];
    let doc = run(&snapshot, &AnalyzerConfig::default());

    assert_eq!(doc.findings[0].likely_cause, "FailedScheduling");
    assert_eq!(doc.problematic_pods[0].events.len(), 1);
}

// ============================================================================
// Optional section tests
// ============================================================================

#[test]
fn test_optional_sections_disabled_by_default() {
    let mut snapshot = common::four_running_one_pending();
    snapshot.nodes = Some(vec![common::create_mock_node("node-1", true)]);
    let doc = run(&snapshot, &AnalyzerConfig::default());

    assert_eq!(doc.sections.nodes, SectionState::Disabled);
    assert_eq!(doc.sections.deployments, SectionState::Disabled);
    assert_eq!(doc.sections.metrics, SectionState::Disabled);
    assert!(doc.nodes.is_empty());
}

#[test]
fn test_enabled_sections_without_data_are_unavailable() {
    let doc = run(&common::four_running_one_pending(), &common::full_config());

    assert_eq!(doc.sections.nodes, SectionState::Unavailable);
    assert_eq!(doc.sections.deployments, SectionState::Unavailable);
    assert_eq!(doc.sections.metrics, SectionState::Unavailable);
}

#[test]
fn test_enabled_sections_with_data() {
    let mut snapshot = common::four_running_one_pending();
    snapshot.nodes = Some(vec![
        common::create_mock_node("node-b", true),
        common::create_mock_node("node-a", false),
    ]);
    snapshot.deployments = Some(vec![
        common::create_mock_deployment("web", "test-apps", 4, 4),
        common::create_mock_deployment("dns", "kube-system", 2, 2),
    ]);
    snapshot.pod_metrics = Some(common::pod_metrics_payload(&[
        ("test-apps", "web-1", "100m", "64Mi"),
        ("kube-system", "coredns", "5m", "20Mi"),
    ]));

    let doc = run(&snapshot, &common::full_config());

    assert_eq!(doc.sections.nodes, SectionState::Available);
    assert_eq!(doc.nodes.iter().map(|n| n.name.as_str()).collect::<Vec<_>>(), vec!["node-a", "node-b"]);
    assert_eq!(doc.deployments.len(), 1);
    assert_eq!(doc.deployments[0].name, "web");
    assert_eq!(doc.sections.metrics, SectionState::Available);
    assert_eq!(doc.metrics.pods.len(), 1);
    assert!(doc.metrics.pod("test-apps", "web-1").found().is_some());
}

// ============================================================================
// Determinism tests
// ============================================================================

#[test]
fn test_same_snapshot_gives_same_document() {
    let snapshot = common::four_running_one_pending();
    let config = common::full_config();
    assert_eq!(run(&snapshot, &config), run(&snapshot, &config));
}

#[test]
fn test_pod_order_does_not_matter() {
    let snapshot = common::four_running_one_pending();
    let mut reversed = snapshot.clone();
    reversed.pods.reverse();
    let config = AnalyzerConfig::default();
    assert_eq!(run(&snapshot, &config), run(&reversed, &config));
}

#[test]
fn test_snapshot_survives_json_round_trip() {
    let snapshot = common::four_running_one_pending();
    let json = serde_json::to_string(&snapshot).unwrap();
    let parsed: ClusterSnapshot = serde_json::from_str(&json).unwrap();

    let config = AnalyzerConfig::default();
    assert_eq!(run(&snapshot, &config), run(&parsed, &config));
}
