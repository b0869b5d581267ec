use std::collections::HashSet;

use crate::domain::models::ImpactProjection;

/// Implicit dependency structure of one task cluster.
///
/// Every causal dependency of a projection's target vector is one edge. An edge
/// whose endpoint is another task in the cluster is internal; anything else,
/// including a task naming itself, is external. Edges are counted by set
/// membership only, so circular references (A -> B -> C -> A) are counted like
/// any other edges and never walked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterGraph {
    num_tasks: usize,
    internal_dependencies: usize,
    external_dependencies: usize,
    distinct_roles: usize,
}

impl ClusterGraph {
    /// Classify the dependency edges of a cluster.
    ///
    /// A self reference counts as external. Projections without an `agent_role` tag
    /// share a single implicit role, so an untagged cluster counts one role.
    pub fn from_projections(projections: &[ImpactProjection]) -> Self {
        let task_ids: HashSet<&str> = projections.iter().map(|p| p.task_id.as_str()).collect();

        let mut internal_dependencies = 0;
        let mut external_dependencies = 0;
        let mut roles: HashSet<Option<String>> = HashSet::new();

        for projection in projections {
            for dependency in projection.target_vector.causal_dependencies() {
                if dependency != &projection.task_id && task_ids.contains(dependency.as_str()) {
                    internal_dependencies += 1;
                } else {
                    if dependency == &projection.task_id {
                        tracing::debug!(task_id = %projection.task_id, "self dependency counted as external");
                    }
                    external_dependencies += 1;
                }
            }
            roles.insert(projection.agent_role());
        }

        Self {
            num_tasks: projections.len(),
            internal_dependencies,
            external_dependencies,
            distinct_roles: roles.len().max(1),
        }
    }

    pub const fn num_tasks(&self) -> usize {
        self.num_tasks
    }

    pub const fn internal_dependencies(&self) -> usize {
        self.internal_dependencies
    }

    pub const fn external_dependencies(&self) -> usize {
        self.external_dependencies
    }

    pub const fn distinct_roles(&self) -> usize {
        self.distinct_roles
    }

    /// Internal edges over the number of possible directed edges.
    pub fn density(&self) -> f64 {
        let possible = self.num_tasks * self.num_tasks.saturating_sub(1);
        if possible == 0 {
            return 0.0;
        }
        self.internal_dependencies as f64 / possible as f64
    }

    /// Average internal edges per task.
    pub fn interdependence(&self) -> f64 {
        if self.num_tasks == 0 {
            return 0.0;
        }
        self.internal_dependencies as f64 / self.num_tasks as f64
    }

    /// Distinct roles per task, clipped to `[0, 1]`.
    pub fn diversity(&self) -> f64 {
        if self.num_tasks == 0 {
            return 0.0;
        }
        (self.distinct_roles as f64 / self.num_tasks as f64).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{ImpactCategory, ImpactVector};

    fn projection(task_id: &str, deps: &[&str], role: Option<&str>) -> ImpactProjection {
        let vector = ImpactVector::new(ImpactCategory::Technical, 1.0, 1.0, (0.5, 1.5))
            .unwrap()
            .with_dependencies(deps.iter().copied());
        let projection = ImpactProjection::new(task_id, vector, 10.0, 1.0, (8.0, 12.0));
        match role {
            Some(role) => projection.with_agent_role(role),
            None => projection,
        }
    }

    #[test]
    fn test_empty_cluster_is_neutral() {
        let graph = ClusterGraph::from_projections(&[]);
        assert_eq!(graph.num_tasks(), 0);
        assert_eq!(graph.density(), 0.0);
        assert_eq!(graph.interdependence(), 0.0);
        assert_eq!(graph.diversity(), 0.0);
    }

    #[test]
    fn test_internal_and_external_classification() {
        let projections = vec![
            projection("t1", &[], Some("dev")),
            projection("t2", &["t1"], Some("qa")),
            projection("t3", &["ext-001"], Some("ops")),
        ];
        let graph = ClusterGraph::from_projections(&projections);

        assert_eq!(graph.internal_dependencies(), 1);
        assert_eq!(graph.external_dependencies(), 1);
        assert!((graph.density() - 1.0 / 6.0).abs() < 1e-12);
        assert!((graph.interdependence() - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(graph.diversity(), 1.0);
    }

    #[test]
    fn test_self_dependency_counts_as_external() {
        let projections = vec![projection("t1", &["t1"], None), projection("t2", &["t1"], None)];
        let graph = ClusterGraph::from_projections(&projections);
        assert_eq!(graph.internal_dependencies(), 1);
        assert_eq!(graph.external_dependencies(), 1);
    }

    #[test]
    fn test_cycle_counts_each_edge_once() {
        let projections = vec![
            projection("a", &["b"], None),
            projection("b", &["c"], None),
            projection("c", &["a"], None),
        ];
        let graph = ClusterGraph::from_projections(&projections);
        assert_eq!(graph.internal_dependencies(), 3);
        assert_eq!(graph.external_dependencies(), 0);
        assert!((graph.density() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_untagged_projections_share_one_role() {
        let projections = vec![
            projection("t1", &[], None),
            projection("t2", &[], None),
            projection("t3", &[], Some("dev")),
            projection("t4", &[], Some("DEV")),
        ];
        let graph = ClusterGraph::from_projections(&projections);
        assert_eq!(graph.distinct_roles(), 2);
        assert!((graph.diversity() - 0.5).abs() < 1e-12);
    }
}
