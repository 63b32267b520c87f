//! Analyze command implementation

use crate::analysis::{self, AnalysisDocument, ClusterSnapshot, UNKNOWN};
use crate::cli::{AnalyzeArgs, OutputFormat};
use crate::client::{context_name, create_client};
use crate::collect::collect_snapshot;
use crate::config::{load_raw_config, AnalyzerConfig};
use crate::error::Result;
use crate::output::{format_json, format_summary, format_yaml, write_artifacts, write_debug_artifacts};
use crate::report;
use chrono::Utc;
use owo_colors::{OwoColorize, Stream::Stdout};
use std::path::Path;
use tracing::info;

/// Execute the analyze command
pub async fn run_analyze(
    context: Option<&str>,
    config_path: Option<&Path>,
    args: &AnalyzeArgs,
    output: OutputFormat,
) -> Result<()> {
    // Reject bad options before touching the cluster
    let mut config = resolve_config(config_path, args)?;

    let snapshot = match &args.snapshot {
        Some(path) => {
            info!("analyzing snapshot {}", path.display());
            load_snapshot(path)?
        }
        None => {
            let client = create_client(context).await?;
            if config.cluster.name == UNKNOWN {
                if let Some(name) = context_name(context) {
                    config.cluster.name = name;
                }
            }
            collect_snapshot(&client, &config).await?
        }
    };

    if let Some(path) = &args.save_snapshot {
        save_snapshot(path, &snapshot)?;
        info!("snapshot saved to {}", path.display());
    }

    let doc = analysis::analyze(&snapshot, &config, Utc::now());
    let rendered = report::render(&doc)?;

    if !args.no_write {
        write_artifacts(&args.output_dir, &rendered)?;
        if config.debug_mode {
            write_debug_artifacts(&args.output_dir, &snapshot, &doc)?;
        }
    }

    print_document(&doc, output, (!args.no_write).then_some(args.output_dir.as_path()))
}

/// Merge the config file with command line overrides and validate the result
pub fn resolve_config(config_path: Option<&Path>, args: &AnalyzeArgs) -> Result<AnalyzerConfig> {
    load_raw_config(config_path)?.merge(args.overrides()).validate()
}

/// Read a snapshot file; `.yaml`/`.yml` files are YAML, anything else JSON
pub fn load_snapshot(path: &Path) -> Result<ClusterSnapshot> {
    let content = std::fs::read_to_string(path)?;
    if is_yaml(path) {
        Ok(serde_yaml::from_str(&content)?)
    } else {
        Ok(serde_json::from_str(&content)?)
    }
}

/// Write a snapshot in the format its extension names
pub fn save_snapshot(path: &Path, snapshot: &ClusterSnapshot) -> Result<()> {
    let content = if is_yaml(path) {
        serde_yaml::to_string(snapshot)?
    } else {
        serde_json::to_string_pretty(snapshot)?
    };
    std::fs::write(path, content)?;
    Ok(())
}

pub(crate) fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    )
}

pub(crate) fn print_document(
    doc: &AnalysisDocument,
    output: OutputFormat,
    written_to: Option<&Path>,
) -> Result<()> {
    match output {
        OutputFormat::Json => println!("{}", format_json(doc)?),
        OutputFormat::Yaml => println!("{}", format_yaml(doc)?),
        OutputFormat::Table => {
            println!("{}", format_summary(doc));
            if let Some(dir) = written_to {
                println!();
                let dir = dir.display().to_string();
                println!("Report written to {}", dir.if_supports_color(Stdout, |t| t.cyan()));
            }
        }
    }
    Ok(())
}
