//! Narrative fragments shared by every analysis type
//!
//! Each fragment reads the document and appends markdown. Optional sections
//! (nodes, deployments, metrics) write nothing when disabled and a short
//! notice when requested but unavailable.

use super::formats::{Fragment, FormatPlan};
use crate::analysis::diagnosis::cause_counts;
use crate::analysis::{AnalysisDocument, PodRecord, SectionState};
use std::fmt::{self, Write};

/// Events listed per problematic pod
const MAX_EVENTS_PER_POD: usize = 5;

/// Rows in the top-usage tables
const MAX_USAGE_ROWS: usize = 10;

pub fn write_fragment(
    out: &mut String,
    fragment: Fragment,
    doc: &AnalysisDocument,
    plan: &FormatPlan,
) -> fmt::Result {
    match fragment {
        Fragment::ClusterContext => cluster_context(out, doc, plan),
        Fragment::StatusDistribution => status_distribution(out, doc),
        Fragment::NamespaceDistribution => namespace_distribution(out, doc),
        Fragment::ProblematicPods => problematic_pods(out, doc),
        Fragment::RootCause => root_cause(out, doc),
        Fragment::ResourceAllocation => resource_allocation(out, doc),
        Fragment::Nodes => nodes(out, doc),
        Fragment::Deployments => deployments(out, doc),
        Fragment::Metrics => metrics(out, doc),
        Fragment::AnalysisRequest => analysis_request(out, plan),
    }
}

fn cluster_context(out: &mut String, doc: &AnalysisDocument, plan: &FormatPlan) -> fmt::Result {
    let health = &doc.health;

    // Title block
    writeln!(out, "# {}", plan.title)?;
    writeln!(out)?;
    writeln!(out, "**Generated:** {}", doc.generated_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
    writeln!(out, "**Analysis type:** {}", plan.analysis_type)?;
    writeln!(out)?;
    writeln!(out, "## Cluster Context")?;
    writeln!(out)?;
    writeln!(out, "- Cluster: {}", doc.cluster.name)?;
    writeln!(out, "- Platform: {}", doc.cluster.platform)?;
    writeln!(out, "- CPU: {}", doc.cluster.cpu)?;
    writeln!(out, "- Memory: {}", doc.cluster.memory)?;
    writeln!(out, "- Namespaces analyzed ({}): {}", doc.namespaces.len(), join_or_none(&doc.namespaces))?;
    writeln!(out, "- Namespaces ignored: {}", join_or_none(&doc.ignored_namespaces))?;
    writeln!(out)?;
    // Health table
    writeln!(out, "## Health Summary")?;
    writeln!(out)?;
    writeln!(out, "| Metric | Value |")?;
    writeln!(out, "|--------|-------|")?;
    writeln!(out, "| Total pods | {} |", health.total_pods)?;
    writeln!(out, "| Running pods | {} |", health.running_pods)?;
    writeln!(out, "| Problematic pods | {} |", health.problematic_pods)?;
    writeln!(out, "| Health | {:.2}% |", health.health_percentage)?;
    writeln!(out, "| Threshold | {:.2}% |", health.health_threshold)?;
    writeln!(out, "| Status | {} |", health.label())?;
    writeln!(out)
}

fn status_distribution(out: &mut String, doc: &AnalysisDocument) -> fmt::Result {
    writeln!(out, "## Pod Status Distribution")?;
    writeln!(out)?;
    if doc.status_summary.is_empty() {
        writeln!(out, "No pods found in the analyzed namespaces.")?;
        return writeln!(out);
    }

    let total = doc.total_pods();
    writeln!(out, "| Status | Pods | Share |")?;
    writeln!(out, "|--------|------|-------|")?;
    for (status, group) in &doc.status_summary {
        writeln!(out, "| {} | {} | {:.2}% |", status, group.total_pods, share(group.total_pods, total))?;
    }
    writeln!(out)
}

fn namespace_distribution(out: &mut String, doc: &AnalysisDocument) -> fmt::Result {
    writeln!(out, "## Namespace Distribution")?;
    writeln!(out)?;
    if doc.namespace_summary.is_empty() {
        writeln!(out, "No pods found in the analyzed namespaces.")?;
        return writeln!(out);
    }

    writeln!(out, "| Namespace | Pods | Status breakdown |")?;
    writeln!(out, "|-----------|------|------------------|")?;
    for (namespace, group) in &doc.namespace_summary {
        let breakdown = group
            .status_breakdown
            .iter()
            .map(|(status, count)| format!("{}: {}", status, count))
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(out, "| {} | {} | {} |", namespace, group.total_pods, breakdown)?;
    }
    writeln!(out)
}

fn problematic_pods(out: &mut String, doc: &AnalysisDocument) -> fmt::Result {
    writeln!(out, "## Problematic Pods")?;
    writeln!(out)?;
    if doc.problematic_pods.is_empty() {
        writeln!(out, "No problematic pods. Every pod is Running or Succeeded.")?;
        return writeln!(out);
    }

    for entry in &doc.problematic_pods {
        let pod = &entry.pod;
        let (ready, total) = pod.ready_containers();

        writeln!(out, "### {}/{}", pod.namespace, pod.name)?;
        writeln!(out)?;
        writeln!(out, "- Status: {}", pod.status)?;
        writeln!(out, "- Node: {}", pod.node_name)?;
        writeln!(out, "- Pod IP: {}", pod.pod_ip)?;
        writeln!(out, "- Started: {}", pod.start_time)?;
        writeln!(out, "- Ready containers: {}/{}", ready, total)?;
        writeln!(out, "- Restarts: {}", pod.restart_count())?;

        // Per-container readiness
        for container in &pod.containers {
            writeln!(
                out,
                "  - `{}` ({}) ready={} restarts={}",
                container.name, container.image, container.ready, container.restart_count
            )?;
        }

        let failing: Vec<_> = pod.conditions.iter().filter(|c| c.status != "True").collect();
        if !failing.is_empty() {
            writeln!(out, "- Unmet conditions:")?;
            for c in failing {
                writeln!(
                    out,
                    "  - {}={}{}",
                    c.condition_type,
                    c.status,
                    c.reason.as_deref().map(|r| format!(" ({})", r)).unwrap_or_default()
                )?;
            }
        }

        // Recent events, newest first
        writeln!(out)?;
        if entry.events.is_empty() {
            writeln!(out, "_No events found._")?;
        } else {
            writeln!(out, "| Type | Reason | Count | Last seen | Message |")?;
            writeln!(out, "|------|--------|-------|-----------|---------|")?;
            for event in entry.events.iter().take(MAX_EVENTS_PER_POD) {
                let seen = event
                    .observed_at
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                writeln!(
                    out,
                    "| {} | {} | {} | {} | {} |",
                    event.event_type,
                    event.reason,
                    event.count,
                    seen,
                    table_cell(&event.message)
                )?;
            }
            if entry.events.len() > MAX_EVENTS_PER_POD {
                writeln!(out)?;
                writeln!(out, "_{} older events omitted._", entry.events.len() - MAX_EVENTS_PER_POD)?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

fn root_cause(out: &mut String, doc: &AnalysisDocument) -> fmt::Result {
    writeln!(out, "## Root Cause Analysis")?;
    writeln!(out)?;
    if doc.findings.is_empty() {
        writeln!(out, "No root-cause findings.")?;
        return writeln!(out);
    }

    writeln!(out, "| Pod | Status | Likely cause | Suggested action |")?;
    writeln!(out, "|-----|--------|--------------|------------------|")?;
    for f in &doc.findings {
        writeln!(
            out,
            "| {}/{} | {} | {} | {} |",
            f.namespace, f.name, f.status, f.likely_cause, f.suggested_action
        )?;
    }
    writeln!(out)?;

    // Cause frequency, most common first
    writeln!(out, "Causes by frequency:")?;
    writeln!(out)?;
    let mut counts: Vec<_> = cause_counts(&doc.findings).into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    for (cause, count) in counts {
        writeln!(out, "- {}: {}", cause, count)?;
    }
    writeln!(out)
}

fn resource_allocation(out: &mut String, doc: &AnalysisDocument) -> fmt::Result {
    writeln!(out, "## Resource Requests and Limits")?;
    writeln!(out)?;

    let pods: Vec<&PodRecord> = doc.pods().collect();
    let containers: Vec<_> = pods
        .iter()
        .flat_map(|p| p.containers.iter().map(move |c| (*p, c)))
        .collect();

    if containers.is_empty() {
        writeln!(out, "No containers found.")?;
        return writeln!(out);
    }

    // Count containers missing requests or limits
    let without_requests = containers.iter().filter(|(_, c)| c.resources.requests.is_empty()).count();
    let without_limits = containers.iter().filter(|(_, c)| c.resources.limits.is_empty()).count();

    writeln!(out, "- Containers: {}", containers.len())?;
    writeln!(out, "- Without requests: {}", without_requests)?;
    writeln!(out, "- Without limits: {}", without_limits)?;
    writeln!(out)?;
    writeln!(out, "| Pod | Container | CPU req | CPU limit | Mem req | Mem limit |")?;
    writeln!(out, "|-----|-----------|---------|-----------|---------|-----------|")?;
    for (pod, c) in &containers {
        let r = &c.resources;
        writeln!(
            out,
            "| {}/{} | {} | {} | {} | {} | {} |",
            pod.namespace,
            pod.name,
            c.name,
            or_unset(&r.requests.cpu),
            or_unset(&r.limits.cpu),
            or_unset(&r.requests.memory),
            or_unset(&r.limits.memory)
        )?;
    }
    writeln!(out)
}

fn nodes(out: &mut String, doc: &AnalysisDocument) -> fmt::Result {
    match doc.sections.nodes {
        SectionState::Disabled => return Ok(()),
        SectionState::Unavailable => {
            writeln!(out, "## Nodes")?;
            writeln!(out)?;
            writeln!(out, "_Node information not available._")?;
            return writeln!(out);
        }
        SectionState::Available => {}
    }

    writeln!(out, "## Nodes")?;
    writeln!(out)?;
    if doc.nodes.is_empty() {
        writeln!(out, "No nodes reported.")?;
        return writeln!(out);
    }

    let ready = doc.nodes.iter().filter(|n| n.ready).count();
    writeln!(out, "{} of {} nodes Ready.", ready, doc.nodes.len())?;
    writeln!(out)?;
    writeln!(out, "| Node | Ready | Kubelet | CPU | Memory | Pods | Pressure |")?;
    writeln!(out, "|------|-------|---------|-----|--------|------|----------|")?;
    for node in &doc.nodes {
        let capacity = |key: &str| node.capacity.get(key).map(String::as_str).unwrap_or("unknown");
        let pressure = node
            .pressure_conditions()
            .iter()
            .map(|c| c.condition_type.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(
            out,
            "| {} | {} | {} | {} | {} | {} | {} |",
            node.name,
            if node.ready { "yes" } else { "no" },
            node.kubelet_version,
            capacity("cpu"),
            capacity("memory"),
            capacity("pods"),
            if pressure.is_empty() { "none".to_string() } else { pressure }
        )?;
    }
    writeln!(out)
}

fn deployments(out: &mut String, doc: &AnalysisDocument) -> fmt::Result {
    match doc.sections.deployments {
        SectionState::Disabled => return Ok(()),
        SectionState::Unavailable => {
            writeln!(out, "## Deployments")?;
            writeln!(out)?;
            writeln!(out, "_Deployment information not available._")?;
            return writeln!(out);
        }
        SectionState::Available => {}
    }

    writeln!(out, "## Deployments")?;
    writeln!(out)?;
    if doc.deployments.is_empty() {
        writeln!(out, "No deployments found.")?;
        return writeln!(out);
    }

    let degraded = doc.deployments.iter().filter(|d| !d.is_fully_available()).count();
    writeln!(out, "{} deployments, {} not fully available.", doc.deployments.len(), degraded)?;
    writeln!(out)?;
    writeln!(out, "| Deployment | Desired | Available | Ready | Strategy |")?;
    writeln!(out, "|------------|---------|-----------|-------|----------|")?;
    for d in &doc.deployments {
        writeln!(
            out,
            "| {}/{} | {} | {} | {} | {} |",
            d.namespace, d.name, d.replicas, d.available_replicas, d.ready_replicas, d.strategy
        )?;
    }
    writeln!(out)
}

fn metrics(out: &mut String, doc: &AnalysisDocument) -> fmt::Result {
    match doc.sections.metrics {
        SectionState::Disabled => return Ok(()),
        SectionState::Unavailable => {
            writeln!(out, "## Resource Usage")?;
            writeln!(out)?;
            writeln!(out, "_Resource metrics not available (metrics-server may not be installed)._")?;
            return writeln!(out);
        }
        SectionState::Available => {}
    }

    writeln!(out, "## Resource Usage")?;
    writeln!(out)?;

    let mut pods: Vec<_> = doc.metrics.pods.values().collect();
    if pods.is_empty() {
        writeln!(out, "No pod metrics reported.")?;
    } else {
        writeln!(out, "### Top pods by CPU")?;
        writeln!(out)?;
        writeln!(out, "| Pod | CPU (m) | Memory (MiB) |")?;
        writeln!(out, "|-----|---------|--------------|")?;
        pods.sort_by(|a, b| {
            b.total_cpu_millicores
                .cmp(&a.total_cpu_millicores)
                .then_with(|| (&a.namespace, &a.name).cmp(&(&b.namespace, &b.name)))
        });
        for s in pods.iter().take(MAX_USAGE_ROWS) {
            writeln!(
                out,
                "| {}/{} | {} | {} |",
                s.namespace,
                s.name,
                or_na(s.total_cpu_millicores),
                or_na(s.total_memory_bytes.map(mib))
            )?;
        }
        writeln!(out)?;

        // Re-sort for memory
        writeln!(out, "### Top pods by memory")?;
        writeln!(out)?;
        writeln!(out, "| Pod | Memory (MiB) | CPU (m) |")?;
        writeln!(out, "|-----|--------------|---------|")?;
        pods.sort_by(|a, b| {
            b.total_memory_bytes
                .cmp(&a.total_memory_bytes)
                .then_with(|| (&a.namespace, &a.name).cmp(&(&b.namespace, &b.name)))
        });
        for s in pods.iter().take(MAX_USAGE_ROWS) {
            writeln!(
                out,
                "| {}/{} | {} | {} |",
                s.namespace,
                s.name,
                or_na(s.total_memory_bytes.map(mib)),
                or_na(s.total_cpu_millicores)
            )?;
        }
    }
    writeln!(out)?;

    if !doc.metrics.nodes.is_empty() {
        writeln!(out, "### Node usage")?;
        writeln!(out)?;
        writeln!(out, "| Node | CPU (m) | Memory (MiB) |")?;
        writeln!(out, "|------|---------|--------------|")?;
        for s in doc.metrics.nodes.values() {
            writeln!(
                out,
                "| {} | {} | {} |",
                s.name,
                or_na(s.cpu_millicores),
                or_na(s.memory_bytes.map(mib))
            )?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn analysis_request(out: &mut String, plan: &FormatPlan) -> fmt::Result {
    writeln!(out, "## Analysis Request")?;
    writeln!(out)?;
    writeln!(out, "{}", plan.request)?;
    writeln!(out)?;
    for (i, q) in plan.questions.iter().enumerate() {
        writeln!(out, "{}. {}", i + 1, q)?;
    }
    Ok(())
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

fn share(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}

fn or_unset(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("not set")
}

fn or_na(value: Option<u64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "n/a".to_string())
}

fn mib(bytes: u64) -> u64 {
    bytes / (1024 * 1024)
}

/// Keep messages on one table row
fn table_cell(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}
