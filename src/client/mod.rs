//! Kubernetes client setup

use crate::error::{AnalyzerError, Result};
use kube::{config::KubeConfigOptions, Client, Config};

/// Create a Kubernetes client for the specified context
pub async fn create_client(context: Option<&str>) -> Result<Client> {
    let config = load_config(context).await?;
    Client::try_from(config).map_err(AnalyzerError::from)
}

/// Load Kubernetes configuration
async fn load_config(context: Option<&str>) -> Result<Config> {
    let options = KubeConfigOptions {
        context: context.map(String::from),
        ..Default::default()
    };

    Config::from_kubeconfig(&options)
        .await
        .map_err(|e| AnalyzerError::Config(format!("Failed to load kubeconfig: {e}")))
}

/// Name of the context that will be used: the requested one, else the kubeconfig's current context
pub fn context_name(requested: Option<&str>) -> Option<String> {
    if let Some(ctx) = requested {
        return Some(ctx.to_string());
    }
    kube::config::Kubeconfig::read()
        .ok()
        .and_then(|kc| kc.current_context)
}
