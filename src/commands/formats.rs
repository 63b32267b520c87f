//! Formats command: list the analysis types

use crate::cli::OutputFormat;
use crate::config::AnalysisType;
use crate::error::Result;
use crate::output::{format_json, format_table_raw, format_yaml};
use crate::report::formats::plan;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct FormatInfo {
    name: &'static str,
    title: &'static str,
    description: &'static str,
    questions: usize,
}

/// Execute the formats command
pub fn list_formats(output: OutputFormat) -> Result<()> {
    let formats: Vec<FormatInfo> = AnalysisType::ALL
        .iter()
        .map(|t| {
            let plan = plan(*t);
            FormatInfo {
                name: t.as_str(),
                title: plan.title,
                description: t.description(),
                questions: plan.questions.len(),
            }
        })
        .collect();

    let text = match output {
        OutputFormat::Json => format_json(&formats)?,
        OutputFormat::Yaml => format_yaml(&formats)?,
        OutputFormat::Table => {
            let rows: Vec<Vec<String>> = formats
                .iter()
                .map(|f| vec![f.name.to_string(), f.description.to_string()])
                .collect();
            format_table_raw(&["TYPE", "DESCRIPTION"], &rows)
        }
    };

    println!("{}", text);
    Ok(())
}
