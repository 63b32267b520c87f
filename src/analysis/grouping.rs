//! Grouping and aggregation of normalized pods

use super::types::PodRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-namespace summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceGroup {
    pub total_pods: usize,
    /// Pod names, sorted
    pub pods: Vec<String>,
    /// Pod count per status
    pub status_breakdown: BTreeMap<String, usize>,
}

/// Per-status summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusGroup {
    pub total_pods: usize,
    /// `namespace/name` keys, sorted
    pub pods: Vec<String>,
    /// Pod count per namespace
    pub namespace_breakdown: BTreeMap<String, usize>,
}

/// Namespace → status → pods
pub type NamespaceStatusMap = BTreeMap<String, BTreeMap<String, Vec<PodRecord>>>;

/// Every grouping of the pod list.
///
/// All maps are `BTreeMap`s and pods are visited in `namespace/name` order,
/// so the index is the same for the same pods whatever order they arrived in.
/// Namespaces without pods do not appear.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PodIndex {
    pub by_namespace: BTreeMap<String, Vec<PodRecord>>,
    pub by_status: BTreeMap<String, Vec<PodRecord>>,
    pub by_namespace_and_status: NamespaceStatusMap,
    pub namespace_summary: BTreeMap<String, NamespaceGroup>,
    pub status_summary: BTreeMap<String, StatusGroup>,
}

impl PodIndex {
    pub fn build(pods: &[PodRecord]) -> Self {
        let mut ordered: Vec<&PodRecord> = pods.iter().collect();
        ordered.sort_by(|a, b| (&a.namespace, &a.name).cmp(&(&b.namespace, &b.name)));

        let mut index = PodIndex::default();

        for pod in ordered {
            let namespace = pod.namespace.clone();
            let status = pod.status.as_str().to_string();

            index
                .by_namespace
                .entry(namespace.clone())
                .or_default()
                .push(pod.clone());
            index
                .by_status
                .entry(status.clone())
                .or_default()
                .push(pod.clone());
            index
                .by_namespace_and_status
                .entry(namespace.clone())
                .or_default()
                .entry(status.clone())
                .or_default()
                .push(pod.clone());

            let ns_group = index.namespace_summary.entry(namespace.clone()).or_default();
            ns_group.total_pods += 1;
            ns_group.pods.push(pod.name.clone());
            *ns_group.status_breakdown.entry(status.clone()).or_default() += 1;

            let status_group = index.status_summary.entry(status).or_default();
            status_group.total_pods += 1;
            status_group.pods.push(pod.key());
            *status_group.namespace_breakdown.entry(namespace).or_default() += 1;
        }

        index
    }

    /// Rebuild from a namespace → status grouping, as written to `pods_by_namespace_and_status.json`
    pub fn from_grouped(grouped: &NamespaceStatusMap) -> Self {
        let pods: Vec<PodRecord> = grouped
            .values()
            .flat_map(|by_status| by_status.values())
            .flatten()
            .cloned()
            .collect();
        Self::build(&pods)
    }

    pub fn total_pods(&self) -> usize {
        self.by_namespace.values().map(Vec::len).sum()
    }

    /// Pod count per status
    pub fn status_counts(&self) -> BTreeMap<String, usize> {
        self.status_summary
            .iter()
            .map(|(status, group)| (status.clone(), group.total_pods))
            .collect()
    }

    pub fn count_with_status(&self, status: &str) -> usize {
        self.status_summary.get(status).map_or(0, |g| g.total_pods)
    }
}
