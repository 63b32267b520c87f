//! Machine-readable JSON projections of the analysis document

use crate::analysis::diagnosis::cause_counts;
use crate::analysis::AnalysisDocument;
use serde_json::{json, Value};

pub const CLUSTER_SUMMARY: &str = "cluster_summary.json";
pub const HEALTH_STATUS: &str = "health_status.json";
pub const NAMESPACE_SUMMARY: &str = "namespace_summary.json";
pub const STATUS_SUMMARY: &str = "status_summary.json";
pub const PODS_BY_NAMESPACE_AND_STATUS: &str = "pods_by_namespace_and_status.json";
pub const PROBLEMATIC_PODS: &str = "problematic_pods.json";
pub const ROOT_CAUSE_ANALYSIS: &str = "root_cause_analysis.json";
pub const NODE_DATA: &str = "node_data.json";
pub const DEPLOYMENT_DATA: &str = "deployment_data.json";
pub const POD_METRICS: &str = "pod_metrics.json";
pub const NARRATIVE: &str = "ai_prompt.md";

/// JSON artifacts in the order they are written
pub const JSON_ARTIFACTS: [&str; 10] = [
    CLUSTER_SUMMARY,
    HEALTH_STATUS,
    NAMESPACE_SUMMARY,
    STATUS_SUMMARY,
    PODS_BY_NAMESPACE_AND_STATUS,
    PROBLEMATIC_PODS,
    ROOT_CAUSE_ANALYSIS,
    NODE_DATA,
    DEPLOYMENT_DATA,
    POD_METRICS,
];

/// Project the document into the named artifact's JSON value
pub fn project(doc: &AnalysisDocument, artifact: &str) -> serde_json::Result<Option<Value>> {
    let value = match artifact {
        CLUSTER_SUMMARY => cluster_summary(doc),
        HEALTH_STATUS => json!({
            "timestamp": doc.generated_at,
            "total_pods": doc.health.total_pods,
            "running_pods": doc.health.running_pods,
            "problematic_pods": doc.health.problematic_pods,
            "health_percentage": doc.health.health_percentage,
            "health_threshold": doc.health.health_threshold,
            "is_healthy": doc.health.is_healthy,
            "status": doc.health.label(),
        }),
        NAMESPACE_SUMMARY => serde_json::to_value(&doc.namespace_summary)?,
        STATUS_SUMMARY => serde_json::to_value(&doc.status_summary)?,
        PODS_BY_NAMESPACE_AND_STATUS => serde_json::to_value(&doc.pods_by_namespace_and_status)?,
        PROBLEMATIC_PODS => serde_json::to_value(&doc.problematic_pods)?,
        ROOT_CAUSE_ANALYSIS => json!({
            "total_findings": doc.findings.len(),
            "cause_counts": cause_counts(&doc.findings),
            "findings": doc.findings,
        }),
        NODE_DATA => json!({
            "section": doc.sections.nodes,
            "nodes": doc.nodes,
        }),
        DEPLOYMENT_DATA => json!({
            "section": doc.sections.deployments,
            "deployments": doc.deployments,
        }),
        POD_METRICS => json!({
            "section": doc.sections.metrics,
            "pods": doc.metrics.pods,
            "nodes": doc.metrics.nodes,
        }),
        _ => return Ok(None),
    };
    Ok(Some(value))
}

fn cluster_summary(doc: &AnalysisDocument) -> Value {
    json!({
        "timestamp": doc.generated_at,
        "analysis_type": doc.analysis_type,
        "cluster": doc.cluster,
        "namespaces": doc.namespaces,
        "ignored_namespaces": doc.ignored_namespaces,
        "total_namespaces": doc.namespaces.len(),
        "total_pods": doc.health.total_pods,
        "status_counts": doc.status_counts(),
        "health_percentage": doc.health.health_percentage,
        "is_healthy": doc.health.is_healthy,
        "problematic_pods": doc.findings.len(),
        "node_count": doc.nodes.len(),
        "deployment_count": doc.deployments.len(),
        "sections": doc.sections,
    })
}
