//! Render command: re-render a saved analysis document

use super::analyze::{is_yaml, print_document};
use crate::analysis::AnalysisDocument;
use crate::cli::{OutputFormat, RenderArgs};
use crate::config::AnalysisType;
use crate::error::Result;
use crate::output::write_artifacts;
use crate::report;
use std::path::Path;

/// Execute the render command
pub fn run_render(args: &RenderArgs, output: OutputFormat) -> Result<()> {
    let analysis_type = args
        .analysis_type
        .as_deref()
        .map(str::parse::<AnalysisType>)
        .transpose()?;

    let doc = load_document(&args.document)?;
    let rendered = report::render_as(&doc, analysis_type.unwrap_or(doc.analysis_type))?;
    write_artifacts(&args.output_dir, &rendered)?;

    print_document(&doc, output, Some(args.output_dir.as_path()))
}

/// Read a document written by `analyze --debug-mode`
pub fn load_document(path: &Path) -> Result<AnalysisDocument> {
    let content = std::fs::read_to_string(path)?;
    if is_yaml(path) {
        Ok(serde_yaml::from_str(&content)?)
    } else {
        Ok(serde_json::from_str(&content)?)
    }
}
