//! Report rendering
//!
//! Turns an [`AnalysisDocument`] into the narrative for its analysis type
//! plus the fixed set of JSON artifacts. Rendering only reads the document.

pub mod artifacts;
pub mod formats;
pub mod fragments;

use crate::analysis::AnalysisDocument;
use crate::config::AnalysisType;
use crate::error::{AnalyzerError, Result};
use serde::Serialize;

/// One output file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub file_name: &'static str,
    pub contents: String,
}

/// Narrative plus JSON artifacts of one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedReport {
    pub analysis_type: AnalysisType,
    pub narrative: String,
    pub artifacts: Vec<Artifact>,
}

impl RenderedReport {
    pub fn artifact(&self, file_name: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.file_name == file_name)
    }
}

/// Render the narrative for the document's own analysis type
pub fn render(doc: &AnalysisDocument) -> Result<RenderedReport> {
    render_as(doc, doc.analysis_type)
}

/// Render with an explicit analysis type
pub fn render_as(doc: &AnalysisDocument, analysis_type: AnalysisType) -> Result<RenderedReport> {
    let narrative = render_narrative(doc, analysis_type)?;

    let mut artifacts = Vec::with_capacity(artifacts::JSON_ARTIFACTS.len() + 1);
    for name in artifacts::JSON_ARTIFACTS {
        let value = artifacts::project(doc, name)?
            .ok_or_else(|| AnalyzerError::InvalidArgument(format!("unknown artifact {}", name)))?;
        artifacts.push(Artifact {
            file_name: name,
            contents: serde_json::to_string_pretty(&value)?,
        });
    }
    artifacts.push(Artifact {
        file_name: artifacts::NARRATIVE,
        contents: narrative.clone(),
    });

    Ok(RenderedReport {
        analysis_type,
        narrative,
        artifacts,
    })
}

/// Markdown narrative for one analysis type
pub fn render_narrative(doc: &AnalysisDocument, analysis_type: AnalysisType) -> Result<String> {
    let plan = formats::plan(analysis_type);
    let mut out = String::new();
    for fragment in plan.fragments {
        fragments::write_fragment(&mut out, *fragment, doc, &plan)
            .map_err(|e| AnalyzerError::Serialization(e.to_string()))?;
    }
    Ok(out)
}
