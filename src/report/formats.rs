//! Per-analysis-type composition of narrative fragments

use crate::config::AnalysisType;

/// A shared narrative building block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fragment {
    ClusterContext,
    StatusDistribution,
    NamespaceDistribution,
    ProblematicPods,
    RootCause,
    ResourceAllocation,
    Nodes,
    Deployments,
    Metrics,
    AnalysisRequest,
}

/// How one analysis type is rendered
#[derive(Debug, Clone, Copy)]
pub struct FormatPlan {
    pub analysis_type: AnalysisType,
    pub title: &'static str,
    /// Opening line of the closing analysis request
    pub request: &'static str,
    pub fragments: &'static [Fragment],
    pub questions: &'static [&'static str],
}

use Fragment::*;

pub fn plan(analysis_type: AnalysisType) -> FormatPlan {
    match analysis_type {
        AnalysisType::Standard => FormatPlan {
            analysis_type,
            title: "Kubernetes Cluster Analysis",
            request: "Please analyze this cluster snapshot and provide:",
            fragments: &[
                ClusterContext,
                StatusDistribution,
                NamespaceDistribution,
                ProblematicPods,
                RootCause,
                Nodes,
                Deployments,
                Metrics,
                AnalysisRequest,
            ],
            questions: &[
                "An overall assessment of cluster health",
                "The most important problems and their likely causes",
                "Concrete next steps to resolve each problem",
                "Any patterns across namespaces worth investigating",
            ],
        },
        AnalysisType::Health => FormatPlan {
            analysis_type,
            title: "Kubernetes Cluster Health Assessment",
            request: "Please assess the health of this cluster and provide:",
            fragments: &[
                ClusterContext,
                StatusDistribution,
                NamespaceDistribution,
                ProblematicPods,
                RootCause,
                Nodes,
                AnalysisRequest,
            ],
            questions: &[
                "Whether the health score reflects real risk to running workloads",
                "Which namespaces are least stable and why",
                "Which failing pods should be fixed first",
                "Early warning signs that could lower the health score",
                "Monitoring or alerting that would catch these issues sooner",
            ],
        },
        AnalysisType::Performance => FormatPlan {
            analysis_type,
            title: "Kubernetes Cluster Performance Analysis",
            request: "Please analyze cluster performance and provide:",
            fragments: &[
                ClusterContext,
                StatusDistribution,
                Metrics,
                Nodes,
                ResourceAllocation,
                ProblematicPods,
                AnalysisRequest,
            ],
            questions: &[
                "Pods or nodes that look like performance bottlenecks",
                "Containers whose usage is out of line with their requests",
                "Whether failing or pending pods point to resource starvation",
                "Tuning recommendations for requests, limits and scheduling",
            ],
        },
        AnalysisType::Security => FormatPlan {
            analysis_type,
            title: "Kubernetes Cluster Security Review",
            request: "Please review the security posture of this cluster and provide:",
            fragments: &[
                ClusterContext,
                NamespaceDistribution,
                ProblematicPods,
                Nodes,
                Deployments,
                AnalysisRequest,
            ],
            questions: &[
                "Workloads whose images or configuration raise security concerns",
                "Containers running without resource limits that could be abused",
                "Node versions or conditions that need patching or attention",
                "Namespace isolation improvements",
                "Hardening steps ordered by impact",
            ],
        },
        AnalysisType::Troubleshooting => FormatPlan {
            analysis_type,
            title: "Kubernetes Cluster Troubleshooting Guide",
            request: "Please help troubleshoot the problems above and provide:",
            fragments: &[
                ClusterContext,
                ProblematicPods,
                RootCause,
                StatusDistribution,
                Nodes,
                Deployments,
                AnalysisRequest,
            ],
            questions: &[
                "A step-by-step investigation plan for each problematic pod",
                "The kubectl commands to confirm each suspected cause",
                "Whether the problems share a common root cause",
                "How to verify each fix once applied",
            ],
        },
        AnalysisType::Comprehensive => FormatPlan {
            analysis_type,
            title: "Comprehensive Kubernetes Cluster Analysis",
            request: "Please provide a comprehensive analysis covering:",
            fragments: &[
                ClusterContext,
                StatusDistribution,
                NamespaceDistribution,
                ProblematicPods,
                RootCause,
                ResourceAllocation,
                Nodes,
                Deployments,
                Metrics,
                AnalysisRequest,
            ],
            questions: &[
                "Overall cluster health and its main risks",
                "Root causes of every problematic pod and how to fix them",
                "Resource allocation and usage efficiency",
                "Node capacity and stability",
                "Deployment rollout health",
                "Security and configuration best-practice gaps",
                "A prioritized action plan",
            ],
        },
        AnalysisType::Resource => FormatPlan {
            analysis_type,
            title: "Kubernetes Resource Allocation Review",
            request: "Please review resource allocation and provide:",
            fragments: &[
                ClusterContext,
                NamespaceDistribution,
                ResourceAllocation,
                Metrics,
                Deployments,
                AnalysisRequest,
            ],
            questions: &[
                "Containers missing requests or limits and suitable values for them",
                "Over- or under-provisioned workloads",
                "Namespaces that would benefit from quotas or limit ranges",
                "Expected impact of the recommended changes",
            ],
        },
        AnalysisType::Capacity => FormatPlan {
            analysis_type,
            title: "Kubernetes Cluster Capacity Planning",
            request: "Please analyze cluster capacity and provide:",
            fragments: &[
                ClusterContext,
                Nodes,
                Metrics,
                ResourceAllocation,
                NamespaceDistribution,
                Deployments,
                AnalysisRequest,
            ],
            questions: &[
                "How much headroom the nodes have for current workloads",
                "Whether pending pods indicate a capacity shortfall",
                "When and how the cluster should be scaled",
                "Workloads that could be consolidated or right-sized",
            ],
        },
    }
}
