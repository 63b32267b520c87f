//! Cluster snapshot analysis
//!
//! A pure, synchronous pipeline over an already-collected [`ClusterSnapshot`]:
//! namespace filtering, normalization, optional metrics join, grouping,
//! health scoring, root-cause diagnosis, and composition of the
//! [`AnalysisDocument`] that renderers consume.

pub mod types;
pub mod namespaces;
pub mod normalize;
pub mod metrics;
pub mod grouping;
pub mod health;
pub mod diagnosis;
pub mod document;

pub use types::*;
pub use document::{AnalysisDocument, ProblematicPod, SectionState, Sections};
pub use grouping::{NamespaceGroup, PodIndex, StatusGroup};
pub use health::HealthSummary;
pub use diagnosis::DiagnosticFinding;
pub use metrics::MetricsIndex;

use crate::config::AnalyzerConfig;
use chrono::{DateTime, Utc};
use document::DocumentParts;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Run the full pipeline on a snapshot
pub fn analyze(
    snapshot: &ClusterSnapshot,
    config: &AnalyzerConfig,
    generated_at: DateTime<Utc>,
) -> AnalysisDocument {
    let namespaces = namespaces::filter_namespaces(&snapshot.namespaces, &config.ignore_namespaces);
    let allowed: BTreeSet<String> = namespaces.iter().cloned().collect();
    let ignored_namespaces: Vec<String> = {
        let present: BTreeSet<&String> = snapshot.namespaces.iter().collect();
        config
            .ignore_namespaces
            .iter()
            .filter(|ns| present.contains(ns))
            .cloned()
            .collect()
    };
    debug!(analyzable = namespaces.len(), ignored = ignored_namespaces.len(), "filtered namespaces");

    let pods = normalize::normalize_pods(&snapshot.pods, &allowed);

    // Optional sections

    let (nodes, nodes_state) = if config.include_node_info {
        let state = SectionState::requested(snapshot.nodes.is_some());
        let records = snapshot
            .nodes
            .as_deref()
            .map(normalize::normalize_nodes)
            .unwrap_or_default();
        (records, state)
    } else {
        (Vec::new(), SectionState::Disabled)
    };

    let (deployments, deployments_state) = if config.include_deployment_details {
        let state = SectionState::requested(snapshot.deployments.is_some());
        let records = snapshot
            .deployments
            .as_deref()
            .map(|d| normalize::normalize_deployments(d, &allowed))
            .unwrap_or_default();
        (records, state)
    } else {
        (Vec::new(), SectionState::Disabled)
    };

    let (metrics, metrics_state) = if config.include_resource_metrics {
        let mut index = MetricsIndex::join(
            snapshot.pod_metrics.as_ref(),
            snapshot.node_metrics.as_ref(),
            &config.ignore_namespaces,
        );
        // Drop samples for pods that weren't analyzed
        let keys: BTreeSet<String> = pods.iter().map(PodRecord::key).collect();
        index.retain_pods(&keys);
        let state = SectionState::requested(index.available);
        (index, state)
    } else {
        (MetricsIndex::default(), SectionState::Disabled)
    };

    // Grouping, health and diagnosis
    let index = PodIndex::build(&pods);
    let health = HealthSummary::from_index(&index, config.health_threshold);

    let events = normalize::associate_events(&snapshot.events, &pods);
    let findings = diagnosis::diagnose(&pods, &events);

    info!(
        pods = health.total_pods,
        running = health.running_pods,
        health = health.health_percentage,
        findings = findings.len(),
        "analysis complete"
    );

    AnalysisDocument::compose(DocumentParts {
        generated_at,
        analysis_type: config.analysis_type,
        cluster: config.cluster.clone(),
        sections: Sections {
            nodes: nodes_state,
            deployments: deployments_state,
            metrics: metrics_state,
        },
        namespaces,
        ignored_namespaces,
        index,
        health,
        findings,
        nodes,
        deployments,
        metrics,
    })
}
