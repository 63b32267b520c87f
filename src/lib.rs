//! kubeanalyzer - Kubernetes cluster health analysis and reporting

pub mod analysis;
pub mod cli;
pub mod client;
pub mod collect;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod report;
