//! Usage-metrics joining
//!
//! Metrics come from the metrics-server as `PodMetricsList` / `NodeMetricsList`
//! payloads. A missing, empty or unparsable payload degrades to an empty,
//! unavailable index; lookups report [`MetricLookup::NoMetrics`] on a miss.

use super::types::pod_key;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, warn};

#[derive(Debug, Default, Deserialize)]
struct MetricsList {
    #[serde(default)]
    items: Vec<MetricsItem>,
}

#[derive(Debug, Default, Deserialize)]
struct MetricsItem {
    #[serde(default)]
    metadata: MetricsMeta,
    #[serde(default)]
    containers: Vec<ContainerMetricsRaw>,
    /// Node metrics carry usage at the top level
    #[serde(default)]
    usage: Option<UsageRaw>,
    #[serde(default)]
    timestamp: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct MetricsMeta {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    namespace: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ContainerMetricsRaw {
    #[serde(default)]
    name: String,
    #[serde(default)]
    usage: UsageRaw,
}

#[derive(Debug, Default, Deserialize)]
struct UsageRaw {
    #[serde(default)]
    cpu: Option<String>,
    #[serde(default)]
    memory: Option<String>,
}

/// Usage of one container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerUsage {
    pub name: String,
    pub cpu: Option<String>,
    pub memory: Option<String>,
}

/// Usage sample for one pod
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodMetricSample {
    pub namespace: String,
    pub name: String,
    pub containers: Vec<ContainerUsage>,
    pub timestamp: Option<String>,
    /// Sum over containers; `None` if any container quantity is missing or unparsable
    pub total_cpu_millicores: Option<u64>,
    pub total_memory_bytes: Option<u64>,
}

/// Usage sample for one node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMetricSample {
    pub name: String,
    pub cpu: Option<String>,
    pub memory: Option<String>,
    pub timestamp: Option<String>,
    pub cpu_millicores: Option<u64>,
    pub memory_bytes: Option<u64>,
}

/// Joined metrics, keyed by `namespace/name` for pods and by name for nodes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsIndex {
    /// Whether any payload was supplied and parsed
    pub available: bool,
    pub pods: BTreeMap<String, PodMetricSample>,
    pub nodes: BTreeMap<String, NodeMetricSample>,
}

/// Result of a metrics lookup
#[derive(Debug, PartialEq, Eq)]
pub enum MetricLookup<'a, T> {
    Found(&'a T),
    NoMetrics,
}

impl<'a, T> MetricLookup<'a, T> {
    pub fn found(self) -> Option<&'a T> {
        match self {
            MetricLookup::Found(t) => Some(t),
            MetricLookup::NoMetrics => None,
        }
    }
}

impl<T> fmt::Display for MetricLookup<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricLookup::Found(_) => f.write_str("found"),
            MetricLookup::NoMetrics => f.write_str("no metrics"),
        }
    }
}

impl MetricsIndex {
    /// Build the index from raw payloads, dropping pod samples in ignored namespaces
    pub fn join(
        pod_payload: Option<&serde_json::Value>,
        node_payload: Option<&serde_json::Value>,
        ignore: &BTreeSet<String>,
    ) -> Self {
        let pod_items = parse_payload("pod", pod_payload);
        let node_items = parse_payload("node", node_payload);
        let available = pod_items.is_some() || node_items.is_some();

        let mut pods = BTreeMap::new();
        for item in pod_items.unwrap_or_default() {
            let (Some(name), Some(namespace)) = (item.metadata.name, item.metadata.namespace) else {
                continue;
            };
            if ignore.contains(&namespace) {
                continue;
            }

            let containers: Vec<ContainerUsage> = item
                .containers
                .into_iter()
                .map(|c| ContainerUsage {
                    name: c.name,
                    cpu: c.usage.cpu,
                    memory: c.usage.memory,
                })
                .collect();

            let total_cpu_millicores = sum_quantities(&containers, |c| c.cpu.as_deref(), parse_cpu_millicores);
            let total_memory_bytes = sum_quantities(&containers, |c| c.memory.as_deref(), parse_memory_bytes);

            pods.insert(
                pod_key(&namespace, &name),
                PodMetricSample {
                    namespace,
                    name,
                    containers,
                    timestamp: item.timestamp,
                    total_cpu_millicores,
                    total_memory_bytes,
                },
            );
        }

        let mut nodes = BTreeMap::new();
        for item in node_items.unwrap_or_default() {
            let Some(name) = item.metadata.name else {
                continue;
            };
            let usage = item.usage.unwrap_or_default();
            nodes.insert(
                name.clone(),
                NodeMetricSample {
                    cpu_millicores: usage.cpu.as_deref().and_then(parse_cpu_millicores),
                    memory_bytes: usage.memory.as_deref().and_then(parse_memory_bytes),
                    name,
                    cpu: usage.cpu,
                    memory: usage.memory,
                    timestamp: item.timestamp,
                },
            );
        }

        debug!(pods = pods.len(), nodes = nodes.len(), available, "joined metrics");
        Self { available, pods, nodes }
    }

    pub fn pod(&self, namespace: &str, name: &str) -> MetricLookup<'_, PodMetricSample> {
        match self.pods.get(&pod_key(namespace, name)) {
            Some(sample) => MetricLookup::Found(sample),
            None => MetricLookup::NoMetrics,
        }
    }

    pub fn node(&self, name: &str) -> MetricLookup<'_, NodeMetricSample> {
        match self.nodes.get(name) {
            Some(sample) => MetricLookup::Found(sample),
            None => MetricLookup::NoMetrics,
        }
    }

    /// Keep only samples for the given pod keys
    pub fn retain_pods(&mut self, keys: &BTreeSet<String>) {
        self.pods.retain(|k, _| keys.contains(k));
    }
}

/// `None` = no usable payload; `Some(items)` = payload parsed (possibly empty)
fn parse_payload(kind: &str, payload: Option<&serde_json::Value>) -> Option<Vec<MetricsItem>> {
    let value = payload?;
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) if s.trim().is_empty() => None,
        serde_json::Value::String(s) => match serde_json::from_str::<MetricsList>(s) {
            Ok(list) => Some(list.items),
            Err(e) => {
                warn!("ignoring unparsable {} metrics payload: {}", kind, e);
                None
            }
        },
        other => match serde_json::from_value::<MetricsList>(other.clone()) {
            Ok(list) => Some(list.items),
            Err(e) => {
                warn!("ignoring unparsable {} metrics payload: {}", kind, e);
                None
            }
        },
    }
}

/// Sum a per-container quantity; `None` if any container lacks it or the total overflows
fn sum_quantities(
    containers: &[ContainerUsage],
    field: impl Fn(&ContainerUsage) -> Option<&str>,
    parse: impl Fn(&str) -> Option<u64>,
) -> Option<u64> {
    if containers.is_empty() {
        return None;
    }
    containers
        .iter()
        .try_fold(0u64, |total, c| total.checked_add(field(c).and_then(&parse)?))
}

/// Parse a CPU quantity ("250m", "1", "1500000n", "0.5") into millicores
pub fn parse_cpu_millicores(quantity: &str) -> Option<u64> {
    parse_quantity(quantity, 1000)
}

/// Parse a memory quantity ("128Mi", "1.5Gi", "500M", "129e6") into bytes
pub fn parse_memory_bytes(quantity: &str) -> Option<u64> {
    parse_quantity(quantity, 1)
}

/// Scale a quantity into `unit` base units per whole unit.
///
/// Integer amounts are computed exactly and truncated. Fractional amounts
/// are rounded to the nearest base unit. Results that don't fit in a `u64`
/// give `None`.
fn parse_quantity(quantity: &str, unit: u128) -> Option<u64> {
    let quantity = quantity.trim();
    let split = quantity
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '+'))
        .unwrap_or(quantity.len());
    let (number, suffix) = quantity.split_at(split);
    if number.is_empty() {
        return None;
    }
    let (num, den) = suffix_factor(suffix)?;

    // Exact path
    if let (Ok(amount), Some(num), Some(den)) = (number.parse::<u128>(), num, den) {
        let scaled = amount.checked_mul(num)?.checked_mul(unit)? / den;
        return u64::try_from(scaled).ok();
    }

    // Fractional or very large exponent
    let amount = number.parse::<f64>().ok()?;
    let factor = match suffix_exponent(suffix) {
        Some(exp) => 10f64.powi(exp),
        None => num.zip(den).map(|(n, d)| n as f64 / d as f64)?,
    };
    let scaled = (amount * factor * unit as f64).round();
    (scaled.is_finite() && scaled >= 0.0 && scaled < u64::MAX as f64).then_some(scaled as u64)
}

/// Multiplier for a suffix as `(numerator, denominator)`; a side is `None`
/// when it exceeds `u128` (only possible for decimal exponents)
fn suffix_factor(suffix: &str) -> Option<(Option<u128>, Option<u128>)> {
    let factor: (u128, u128) = match suffix {
        "" => (1, 1),
        "n" => (1, 1_000_000_000),
        "u" => (1, 1_000_000),
        "m" => (1, 1_000),
        "k" | "K" => (1_000, 1),
        "M" => (1_000_000, 1),
        "G" => (1_000_000_000, 1),
        "T" => (1_000_000_000_000, 1),
        "P" => (1_000_000_000_000_000, 1),
        "E" => (1_000_000_000_000_000_000, 1),
        "Ki" => (1 << 10, 1),
        "Mi" => (1 << 20, 1),
        "Gi" => (1 << 30, 1),
        "Ti" => (1 << 40, 1),
        "Pi" => (1 << 50, 1),
        "Ei" => (1 << 60, 1),
        _ => {
            let exp = suffix_exponent(suffix)?;
            let pow = 10u128.checked_pow(exp.unsigned_abs());
            return Some(if exp >= 0 { (pow, Some(1)) } else { (Some(1), pow) });
        }
    };
    Some((Some(factor.0), Some(factor.1)))
}

/// Decimal exponent suffix such as "e6" or "E-3"
fn suffix_exponent(suffix: &str) -> Option<i32> {
    suffix
        .strip_prefix(['e', 'E'])
        .filter(|rest| !rest.is_empty())
        .and_then(|rest| rest.parse::<i32>().ok())
}
