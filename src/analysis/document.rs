//! The analysis document: everything a renderer may need, built once per run

use super::diagnosis::DiagnosticFinding;
use super::grouping::{NamespaceGroup, NamespaceStatusMap, PodIndex, StatusGroup};
use super::health::HealthSummary;
use super::metrics::MetricsIndex;
use super::types::{DeploymentRecord, EventRecord, NodeRecord, PodRecord};
use crate::config::{AnalysisType, ClusterMetadata};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// State of an optional document section
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionState {
    /// Not requested by configuration
    #[default]
    Disabled,
    /// Requested, but the data could not be obtained
    Unavailable,
    /// Requested and present (possibly empty)
    Available,
}

impl SectionState {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, SectionState::Disabled)
    }

    /// State for a requested section given whether its data arrived
    pub fn requested(data_present: bool) -> Self {
        if data_present {
            SectionState::Available
        } else {
            SectionState::Unavailable
        }
    }
}

impl fmt::Display for SectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionState::Disabled => write!(f, "disabled"),
            SectionState::Unavailable => write!(f, "not available"),
            SectionState::Available => write!(f, "available"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sections {
    pub nodes: SectionState,
    pub deployments: SectionState,
    pub metrics: SectionState,
}

/// A problematic pod with the events joined onto it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblematicPod {
    #[serde(flatten)]
    pub pod: PodRecord,
    pub events: Vec<EventRecord>,
}

/// Complete result of one analysis run.
///
/// Optional sections are always present; when disabled or unavailable they
/// hold empty collections and [`Sections`] says why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisDocument {
    pub generated_at: DateTime<Utc>,
    pub analysis_type: AnalysisType,
    pub cluster: ClusterMetadata,
    pub sections: Sections,
    pub namespaces: Vec<String>,
    pub ignored_namespaces: Vec<String>,
    pub health: HealthSummary,
    pub namespace_summary: BTreeMap<String, NamespaceGroup>,
    pub status_summary: BTreeMap<String, StatusGroup>,
    pub pods_by_namespace_and_status: NamespaceStatusMap,
    pub problematic_pods: Vec<ProblematicPod>,
    pub findings: Vec<DiagnosticFinding>,
    pub nodes: Vec<NodeRecord>,
    pub deployments: Vec<DeploymentRecord>,
    pub metrics: MetricsIndex,
}

/// Inputs to [`AnalysisDocument::compose`]
#[derive(Debug)]
pub struct DocumentParts {
    pub generated_at: DateTime<Utc>,
    pub analysis_type: AnalysisType,
    pub cluster: ClusterMetadata,
    pub sections: Sections,
    pub namespaces: Vec<String>,
    pub ignored_namespaces: Vec<String>,
    pub index: PodIndex,
    pub health: HealthSummary,
    pub findings: Vec<DiagnosticFinding>,
    pub nodes: Vec<NodeRecord>,
    pub deployments: Vec<DeploymentRecord>,
    pub metrics: MetricsIndex,
}

impl AnalysisDocument {
    pub fn compose(parts: DocumentParts) -> Self {
        let DocumentParts {
            generated_at,
            analysis_type,
            cluster,
            sections,
            namespaces,
            ignored_namespaces,
            index,
            health,
            findings,
            nodes,
            deployments,
            metrics,
        } = parts;

        let problematic_pods = findings
            .iter()
            .filter_map(|finding| {
                index
                    .by_namespace
                    .get(&finding.namespace)
                    .and_then(|pods| pods.iter().find(|p| p.name == finding.name))
                    .map(|pod| ProblematicPod {
                        pod: pod.clone(),
                        events: finding.events.clone(),
                    })
            })
            .collect();

        Self {
            generated_at,
            analysis_type,
            cluster,
            sections,
            namespaces,
            ignored_namespaces,
            health,
            namespace_summary: index.namespace_summary,
            status_summary: index.status_summary,
            pods_by_namespace_and_status: index.by_namespace_and_status,
            problematic_pods,
            findings,
            nodes,
            deployments,
            metrics,
        }
    }

    /// Every pod, ordered by namespace, status, name
    pub fn pods(&self) -> impl Iterator<Item = &PodRecord> {
        self.pods_by_namespace_and_status
            .values()
            .flat_map(|by_status| by_status.values())
            .flatten()
    }

    pub fn total_pods(&self) -> usize {
        self.health.total_pods
    }

    pub fn status_counts(&self) -> BTreeMap<String, usize> {
        self.status_summary
            .iter()
            .map(|(status, group)| (status.clone(), group.total_pods))
            .collect()
    }
}
