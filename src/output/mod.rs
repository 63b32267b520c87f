//! Terminal output and report files

use crate::analysis::{AnalysisDocument, ClusterSnapshot, PodPhase};
use crate::error::Result;
use crate::report::RenderedReport;
use owo_colors::{OwoColorize, Stream::Stdout, Style};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DEBUG_SNAPSHOT: &str = "debug_snapshot.json";
pub const DEBUG_DOCUMENT: &str = "debug_document.json";

/// Write every artifact of a report into `dir`, creating it if needed.
/// Returns the written paths in artifact order.
pub fn write_artifacts(dir: &Path, report: &RenderedReport) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(report.artifacts.len());
    for artifact in &report.artifacts {
        let path = dir.join(artifact.file_name);
        std::fs::write(&path, &artifact.contents)?;
        debug!("wrote {}", path.display());
        written.push(path);
    }

    info!(files = written.len(), dir = %dir.display(), "report written");
    Ok(written)
}

/// Raw snapshot and full document, for reproducing a run
pub fn write_debug_artifacts(
    dir: &Path,
    snapshot: &ClusterSnapshot,
    doc: &AnalysisDocument,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;

    let snapshot_path = dir.join(DEBUG_SNAPSHOT);
    std::fs::write(&snapshot_path, serde_json::to_string_pretty(snapshot)?)?;

    let document_path = dir.join(DEBUG_DOCUMENT);
    std::fs::write(&document_path, serde_json::to_string_pretty(doc)?)?;

    Ok(vec![snapshot_path, document_path])
}

/// Colored overview of a document for the terminal
pub fn format_summary(doc: &AnalysisDocument) -> String {
    let health = &doc.health;
    let mut out = String::new();

    // Header
    let style = if health.is_healthy {
        Style::new().green().bold()
    } else {
        Style::new().red().bold()
    };
    let label = health.label().if_supports_color(Stdout, |t| t.style(style)).to_string();
    out.push_str(&format!(
        "Cluster {} is {} ({:.2}% running, threshold {}%)\n",
        doc.cluster.name.if_supports_color(Stdout, |t| t.bold()),
        label,
        health.health_percentage,
        health.health_threshold,
    ));
    out.push_str(&format!(
        "{} pods in {} namespaces, {} problematic\n\n",
        health.total_pods,
        doc.namespace_summary.len(),
        health.problematic_pods,
    ));

    if doc.namespace_summary.is_empty() {
        out.push_str("No pods found");
        return out;
    }

    // Namespace table
    let rows: Vec<Vec<String>> = doc
        .namespace_summary
        .iter()
        .map(|(namespace, group)| {
            let breakdown = group
                .status_breakdown
                .iter()
                .map(|(status, count)| format!("{}={}", colorize_phase(status), count))
                .collect::<Vec<_>>()
                .join(" ");
            vec![namespace.clone(), group.total_pods.to_string(), breakdown]
        })
        .collect();
    out.push_str(&format_table_raw(&["NAMESPACE", "PODS", "STATUS"], &rows));

    // Findings table
    if !doc.findings.is_empty() {
        out.push_str("\n\n");
        let rows: Vec<Vec<String>> = doc
            .findings
            .iter()
            .map(|f| {
                vec![
                    f.key(),
                    colorize_phase(f.status.as_str()),
                    f.likely_cause.clone(),
                    f.suggested_action.clone(),
                ]
            })
            .collect();
        out.push_str(&format_table_raw(&["POD", "STATUS", "LIKELY CAUSE", "ACTION"], &rows));
    }

    out
}

/// Format raw headers and rows as a table
pub fn format_table_raw(headers: &[&str], rows: &[Vec<String>]) -> String {
    let num_cols = headers.len();
    // Calculate column widths
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();

    for row in rows {
        for (i, cell) in row.iter().enumerate().take(num_cols) {
            widths[i] = widths[i].max(strip_ansi_codes(cell).chars().count());
        }
    }

    let mut output = String::new();

    // Format header row
    let mut header_line = String::new();
    for (i, header) in headers.iter().enumerate() {
        let padding = widths[i].saturating_sub(header.len());
        header_line.push_str(header);
        header_line.push_str(&" ".repeat(padding + 2));
    }
    let header_line = header_line.trim_end();
    output.push_str(&header_line.if_supports_color(Stdout, |t| t.bold()).to_string());
    output.push('\n');

    // Format data rows
    for row in rows {
        let mut line = String::new();
        for (i, cell) in row.iter().enumerate().take(num_cols) {
            let padding = widths[i].saturating_sub(strip_ansi_codes(cell).chars().count());
            line.push_str(cell);
            line.push_str(&" ".repeat(padding + 2));
        }
        output.push_str(line.trim_end());
        output.push('\n');
    }

    output.trim_end().to_string()
}

/// Strip ANSI escape codes for width calculation
pub fn strip_ansi_codes(s: &str) -> String {
    let mut result = String::new();
    let mut in_escape = false;

    for c in s.chars() {
        if c == '\x1b' {
            in_escape = true;
        } else if in_escape {
            if c == 'm' {
                in_escape = false;
            }
        } else {
            result.push(c);
        }
    }

    result
}

/// Color a pod phase: green when running or done, yellow when pending, red otherwise
pub fn colorize_phase(phase: &str) -> String {
    match PodPhase::from(phase) {
        PodPhase::Running | PodPhase::Succeeded => phase.if_supports_color(Stdout, |t| t.green()).to_string(),
        PodPhase::Pending => phase.if_supports_color(Stdout, |t| t.yellow()).to_string(),
        PodPhase::Failed | PodPhase::Unknown => phase.if_supports_color(Stdout, |t| t.red()).to_string(),
        PodPhase::Other(_) => phase.to_string(),
    }
}

/// Serialize for `-o json`
pub fn format_json<T: serde::Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Serialize for `-o yaml`
pub fn format_yaml<T: serde::Serialize>(value: &T) -> Result<String> {
    Ok(serde_yaml::to_string(value)?)
}
