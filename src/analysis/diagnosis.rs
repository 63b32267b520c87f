//! Root-cause diagnosis for problematic pods
//!
//! Classification is a pure function of a pod's status and its events.
//! Event fetching happens upstream in the collector.

use super::types::{EventRecord, PodPhase, PodRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const CAUSE_SCHEDULING: &str = "Scheduling or Resource Issue";
pub const CAUSE_CONTAINER_ERROR: &str = "Container Error";
pub const CAUSE_UNKNOWN: &str = "Unknown";

pub const ACTION_IMAGE: &str = "verify image reference/registry access";
pub const ACTION_CRASH_LOOP: &str = "inspect container logs for application-level failure";
pub const ACTION_PROBE: &str = "check liveness/readiness probe configuration";
pub const ACTION_DEFAULT: &str = "inspect cluster events and pod logs";

/// Outcome of joining events onto a pod
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventLookup {
    Found,
    NoEventsFound,
}

impl fmt::Display for EventLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventLookup::Found => write!(f, "found"),
            EventLookup::NoEventsFound => write!(f, "no events found"),
        }
    }
}

/// Diagnosis of one problematic pod
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticFinding {
    pub name: String,
    pub namespace: String,
    pub status: PodPhase,
    pub node_name: String,
    /// Most recent first
    pub events: Vec<EventRecord>,
    pub event_lookup: EventLookup,
    pub likely_cause: String,
    /// Message of the representative event, when there is one
    pub evidence: Option<String>,
    pub suggested_action: String,
}

impl DiagnosticFinding {
    pub fn key(&self) -> String {
        super::types::pod_key(&self.namespace, &self.name)
    }
}

/// Diagnose every problematic pod, in pod order.
///
/// `events` is keyed by `namespace/name`; a missing key means no events.
pub fn diagnose(pods: &[PodRecord], events: &BTreeMap<String, Vec<EventRecord>>) -> Vec<DiagnosticFinding> {
    pods.iter()
        .filter(|p| p.is_problematic())
        .map(|pod| {
            let pod_events = events.get(&pod.key()).map(Vec::as_slice).unwrap_or_default();
            diagnose_pod(pod, pod_events)
        })
        .collect()
}

/// Diagnose one pod from its events (expected most recent first)
pub fn diagnose_pod(pod: &PodRecord, events: &[EventRecord]) -> DiagnosticFinding {
    let representative = events.first();
    let likely_cause = classify(&pod.status, representative);
    let suggested_action = suggested_action(representative.map(|e| e.reason.as_str()));

    DiagnosticFinding {
        name: pod.name.clone(),
        namespace: pod.namespace.clone(),
        status: pod.status.clone(),
        node_name: pod.node_name.clone(),
        events: events.to_vec(),
        event_lookup: if events.is_empty() {
            EventLookup::NoEventsFound
        } else {
            EventLookup::Found
        },
        likely_cause,
        evidence: representative.map(|e| e.message.clone()).filter(|m| !m.is_empty()),
        suggested_action: suggested_action.to_string(),
    }
}

/// Likely cause: the representative event's reason, else a status-based fallback
pub fn classify(status: &PodPhase, representative: Option<&EventRecord>) -> String {
    if let Some(event) = representative {
        return event.reason.clone();
    }
    match status {
        PodPhase::Pending => CAUSE_SCHEDULING.to_string(),
        PodPhase::Failed => CAUSE_CONTAINER_ERROR.to_string(),
        _ => CAUSE_UNKNOWN.to_string(),
    }
}

/// Remediation hint for an event reason
pub fn suggested_action(reason: Option<&str>) -> &'static str {
    match reason {
        Some("ImagePullBackOff" | "ErrImagePull") => ACTION_IMAGE,
        Some("CrashLoopBackOff") => ACTION_CRASH_LOOP,
        Some("Unhealthy") => ACTION_PROBE,
        _ => ACTION_DEFAULT,
    }
}

/// Finding count per likely cause
pub fn cause_counts(findings: &[DiagnosticFinding]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for f in findings {
        *counts.entry(f.likely_cause.clone()).or_default() += 1;
    }
    counts
}
