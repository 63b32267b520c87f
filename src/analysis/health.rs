//! Health scoring

use super::grouping::PodIndex;
use serde::{Deserialize, Serialize};

/// Running-pod health of the analyzed namespaces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSummary {
    pub total_pods: usize,
    pub running_pods: usize,
    pub problematic_pods: usize,
    /// Percentage of Running pods, floored to two decimals
    pub health_percentage: f64,
    pub health_threshold: f64,
    pub is_healthy: bool,
}

impl HealthSummary {
    pub fn from_index(index: &PodIndex, threshold: f64) -> Self {
        let total = index.total_pods();
        let running = index.count_with_status("Running");
        let problematic = index
            .status_summary
            .iter()
            .filter(|(status, _)| !matches!(status.as_str(), "Running" | "Succeeded"))
            .map(|(_, group)| group.total_pods)
            .sum();

        Self::evaluate(total, running, problematic, threshold)
    }

    pub fn evaluate(total: usize, running: usize, problematic: usize, threshold: f64) -> Self {
        let health_percentage = health_percentage(running, total);
        Self {
            total_pods: total,
            running_pods: running,
            problematic_pods: problematic,
            health_percentage,
            health_threshold: threshold,
            is_healthy: health_percentage >= threshold,
        }
    }

    /// "HEALTHY" / "UNHEALTHY"
    pub fn label(&self) -> &'static str {
        if self.is_healthy {
            "HEALTHY"
        } else {
            "UNHEALTHY"
        }
    }
}

/// `floor(running / total * 10000) / 100`; an empty cluster counts as 100%
pub fn health_percentage(running: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    let running = running.min(total) as u128;
    let basis_points = running * 10_000 / total as u128;
    basis_points as f64 / 100.0
}
