//! Integration tests for snapshot collection and end-to-end analysis
//!
//! These tests require a real Kubernetes cluster.
//! Run with: cargo test --test integration -- --ignored

use chrono::Utc;
use kubeanalyzer::analysis::{analyze, SectionState};
use kubeanalyzer::client::create_client;
use kubeanalyzer::collect::collect_snapshot;
use kubeanalyzer::config::AnalyzerConfig;
use kubeanalyzer::report::render;

/// Test collecting a snapshot with the default configuration
#[tokio::test]
#[ignore]
async fn test_collect_default_snapshot() {
    let client = create_client(None).await.expect("Should create client");
    let config = AnalyzerConfig::default();

    let snapshot = collect_snapshot(&client, &config).await.expect("Should collect snapshot");
    assert!(!snapshot.namespaces.is_empty(), "Cluster should have namespaces");
    assert!(snapshot.nodes.is_none(), "Nodes are not collected by default");
    assert!(snapshot
        .pods
        .iter()
        .all(|p| p.metadata.namespace.as_deref() != Some("kube-system")));
}

/// Test collecting every optional section
#[tokio::test]
#[ignore]
async fn test_collect_with_optional_sections() {
    let client = create_client(None).await.expect("Should create client");
    let config = AnalyzerConfig {
        include_node_info: true,
        include_deployment_details: true,
        include_resource_metrics: true,
        ..Default::default()
    };

    let snapshot = collect_snapshot(&client, &config).await.expect("Should collect snapshot");
    assert!(snapshot.nodes.as_ref().is_some_and(|n| !n.is_empty()), "Cluster should have nodes");
    assert!(snapshot.deployments.is_some());

    let doc = analyze(&snapshot, &config, Utc::now());
    assert_eq!(doc.sections.nodes, SectionState::Available);
    assert_eq!(doc.sections.deployments, SectionState::Available);
}

/// Test the full pipeline against a live cluster
#[tokio::test]
#[ignore]
async fn test_live_analysis_renders() {
    let client = create_client(None).await.expect("Should create client");
    let config = AnalyzerConfig::default();

    let snapshot = collect_snapshot(&client, &config).await.expect("Should collect snapshot");
    let doc = analyze(&snapshot, &config, Utc::now());
    let report = render(&doc).expect("Should render");

    assert_eq!(doc.findings.len(), doc.pods().filter(|p| p.is_problematic()).count());
    assert!(report.narrative.contains("## Analysis Request"));
}
