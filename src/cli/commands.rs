//! CLI command definitions using clap

use crate::config::RawConfig;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ka",
    version,
    about = "Analyze the health of a Kubernetes cluster snapshot",
    long_about = None,
)]
pub struct Cli {
    /// Kubernetes context to use
    #[arg(long, global = true, env = "KA_CONTEXT")]
    pub context: Option<String>,

    /// Config file (defaults to ~/.kubeanalyzer/config.toml)
    #[arg(long, global = true, env = "KA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for the terminal
    #[arg(short = 'o', long, global = true, value_enum, default_value = "table")]
    pub output: OutputFormat,

    /// Enable verbose logging
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

#[derive(Subcommand)]
pub enum Command {
    /// Analyze a live cluster or a saved snapshot
    #[command(alias = "a")]
    Analyze(AnalyzeArgs),

    /// Re-render a saved analysis document
    Render(RenderArgs),

    /// List the available analysis types
    Formats,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug, Default)]
pub struct AnalyzeArgs {
    /// Analyze this snapshot file (JSON or YAML) instead of the live cluster
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// Write the collected snapshot to this file
    #[arg(long)]
    pub save_snapshot: Option<PathBuf>,

    /// Directory receiving the report files
    #[arg(short = 'd', long, default_value = "analysis_output")]
    pub output_dir: PathBuf,

    /// Don't write report files
    #[arg(long)]
    pub no_write: bool,

    /// Analysis type (standard, health, performance, security, troubleshooting, comprehensive, resource, capacity)
    #[arg(short = 't', long)]
    pub analysis_type: Option<String>,

    /// Minimum running-pod percentage for a healthy cluster
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Namespace to skip (repeatable; replaces the configured list)
    #[arg(short = 'i', long = "ignore-namespace")]
    pub ignore_namespaces: Vec<String>,

    /// Include node information
    #[arg(long)]
    pub include_nodes: bool,

    /// Include deployment details
    #[arg(long)]
    pub include_deployments: bool,

    /// Include metrics-server usage data
    #[arg(long)]
    pub include_metrics: bool,

    /// Also write the raw snapshot and full document
    #[arg(long)]
    pub debug_mode: bool,

    /// Maximum parallel API requests
    #[arg(long)]
    pub max_concurrent_fetches: Option<usize>,
}

impl AnalyzeArgs {
    /// Options given on the command line; unset flags leave the file value alone
    pub fn overrides(&self) -> RawConfig {
        RawConfig {
            ignore_namespaces: (!self.ignore_namespaces.is_empty()).then(|| self.ignore_namespaces.clone()),
            health_threshold: self.threshold,
            include_node_info: self.include_nodes.then_some(true),
            include_deployment_details: self.include_deployments.then_some(true),
            include_resource_metrics: self.include_metrics.then_some(true),
            analysis_type: self.analysis_type.clone(),
            debug_mode: self.debug_mode.then_some(true),
            max_concurrent_fetches: self.max_concurrent_fetches,
            cluster: None,
        }
    }
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Analysis document written by `analyze --debug-mode`
    #[arg(long)]
    pub document: PathBuf,

    /// Analysis type to render (defaults to the document's own)
    #[arg(short = 't', long)]
    pub analysis_type: Option<String>,

    /// Directory receiving the report files
    #[arg(short = 'd', long, default_value = "analysis_output")]
    pub output_dir: PathBuf,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
