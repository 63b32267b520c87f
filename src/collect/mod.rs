//! Cluster data collection
//!
//! Fetches the raw objects a [`ClusterSnapshot`] holds. Per-namespace and
//! per-pod fetches run concurrently, bounded by `max_concurrent_fetches`,
//! and may complete in any order; the analysis pipeline sorts everything it
//! emits.

use crate::analysis::namespaces::filter_namespaces;
use crate::analysis::{ClusterSnapshot, PodPhase};
use crate::config::AnalyzerConfig;
use crate::error::{AnalyzerError, Result};
use futures::stream::{self, StreamExt};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Event, Namespace, Node, Pod};
use k8s_openapi::NamespaceResourceScope;
use kube::{api::ListParams, Api, Client, Resource};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use tracing::{debug, warn};

const POD_METRICS_PATH: &str = "/apis/metrics.k8s.io/v1beta1/pods";
const NODE_METRICS_PATH: &str = "/apis/metrics.k8s.io/v1beta1/nodes";

/// Collect everything the configuration asks for
pub async fn collect_snapshot(client: &Client, config: &AnalyzerConfig) -> Result<ClusterSnapshot> {
    let namespaces = list_namespaces(client).await?;
    let analyzable = filter_namespaces(&namespaces, &config.ignore_namespaces);
    let limit = config.max_concurrent_fetches;
    debug!(total = namespaces.len(), analyzable = analyzable.len(), "listed namespaces");

    // Pods per analyzable namespace
    let pods: Vec<Pod> = list_namespaced(client, &analyzable, limit, "pods").await?;

    let nodes = if config.include_node_info {
        let api: Api<Node> = Api::all(client.clone());
        let list = api
            .list(&ListParams::default())
            .await
            .map_err(|e| AnalyzerError::upstream("nodes", e))?;
        Some(list.items)
    } else {
        None
    };

    let deployments = if config.include_deployment_details {
        Some(list_namespaced::<Deployment>(client, &analyzable, limit, "deployments").await?)
    } else {
        None
    };

    // Events only for pods that aren't Running or Succeeded
    let problematic: Vec<(String, String)> = pods
        .iter()
        .filter(|p| {
            p.status
                .as_ref()
                .and_then(|s| s.phase.as_deref())
                .map(PodPhase::from)
                .unwrap_or(PodPhase::Unknown)
                .is_problematic()
        })
        .filter_map(|p| Some((p.metadata.namespace.clone()?, p.metadata.name.clone()?)))
        .collect();
    let events = pod_events(client, &problematic, limit).await;

    // Metrics API is optional; failures leave the section unavailable
    let (pod_metrics, node_metrics) = if config.include_resource_metrics {
        let node_metrics = if config.include_node_info {
            fetch_metrics(client, NODE_METRICS_PATH).await
        } else {
            None
        };
        (fetch_metrics(client, POD_METRICS_PATH).await, node_metrics)
    } else {
        (None, None)
    };

    debug!(
        pods = pods.len(),
        problematic = problematic.len(),
        events = events.len(),
        "collected snapshot"
    );

    Ok(ClusterSnapshot {
        namespaces,
        pods,
        nodes,
        deployments,
        events,
        pod_metrics,
        node_metrics,
    })
}

async fn list_namespaces(client: &Client) -> Result<Vec<String>> {
    let api: Api<Namespace> = Api::all(client.clone());
    let list = api
        .list(&ListParams::default())
        .await
        .map_err(|e| AnalyzerError::upstream("namespaces", e))?;
    Ok(list.items.into_iter().filter_map(|ns| ns.metadata.name).collect())
}

/// List a namespaced resource in every given namespace, one request per namespace
async fn list_namespaced<K>(
    client: &Client,
    namespaces: &[String],
    limit: usize,
    resource: &str,
) -> Result<Vec<K>>
where
    K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Debug,
    <K as Resource>::DynamicType: Default,
{
    let results: Vec<Result<Vec<K>>> = stream::iter(namespaces.iter().cloned())
        .map(|ns| {
            let client = client.clone();
            async move {
                let api: Api<K> = Api::namespaced(client, &ns);
                api.list(&ListParams::default())
                    .await
                    .map(|list| list.items)
                    .map_err(|e| AnalyzerError::upstream(format!("{} in namespace {}", resource, ns), e))
            }
        })
        .buffer_unordered(limit.max(1))
        .collect()
        .await;

    let mut items = Vec::new();
    for result in results {
        items.extend(result?);
    }
    Ok(items)
}

/// Events for each (namespace, name) pod. A failed lookup leaves that pod without events.
async fn pod_events(client: &Client, pods: &[(String, String)], limit: usize) -> Vec<Event> {
    let batches: Vec<Vec<Event>> = stream::iter(pods.iter().cloned())
        .map(|(namespace, name)| {
            let client = client.clone();
            async move {
                let api: Api<Event> = Api::namespaced(client, &namespace);
                let selector = format!("involvedObject.name={},involvedObject.kind=Pod", name);
                match api.list(&ListParams::default().fields(&selector)).await {
                    Ok(list) => list.items,
                    Err(e) => {
                        warn!("could not fetch events for {}/{}: {}", namespace, name, e);
                        Vec::new()
                    }
                }
            }
        })
        .buffer_unordered(limit.max(1))
        .collect()
        .await;

    batches.into_iter().flatten().collect()
}

/// Raw metrics-server payload, or `None` when the API isn't reachable
async fn fetch_metrics(client: &Client, path: &str) -> Option<serde_json::Value> {
    let request = match http::Request::builder().method("GET").uri(path).body(Vec::new()) {
        Ok(r) => r,
        Err(e) => {
            warn!("could not build metrics request for {}: {}", path, e);
            return None;
        }
    };

    let text = match client.request_text(request).await {
        Ok(t) => t,
        Err(e) => {
            warn!("metrics not available from {}: {}", path, e);
            return None;
        }
    };

    match serde_json::from_str(&text) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("metrics payload from {} is not JSON: {}", path, e);
            None
        }
    }
}
