//! Contribution claim domain model.
//!
//! A claim is an agent's self-reported marginal value for a cluster together with
//! its negotiating posture: how uncertain it is (willingness to concede) and how
//! much of the cluster depends on it (resistance to concede).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ClaimInput")]
pub struct ContributionClaim {
    pub agent_id: String,
    pub cluster_id: String,
    pub marginal_impact_estimate: f64,
    pub uncertainty_margin: f64,
    /// Leverage in `[0, 1]`
    pub dependency_influence_weight: f64,
    pub task_ids: Vec<String>,
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl ContributionClaim {
    /// Build a validated claim.
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidClaim`] when the agent id is blank, the
    /// estimate or uncertainty is negative or non-finite, or the influence
    /// weight lies outside `[0, 1]`.
    pub fn new(
        agent_id: impl Into<String>,
        cluster_id: impl Into<String>,
        marginal_impact_estimate: f64,
        uncertainty_margin: f64,
        dependency_influence_weight: f64,
    ) -> DomainResult<Self> {
        let agent_id = agent_id.into();
        let invalid = |reason: &str| DomainError::InvalidClaim {
            agent_id: agent_id.clone(),
            reason: reason.to_string(),
        };

        if agent_id.trim().is_empty() {
            return Err(invalid("agent_id cannot be empty"));
        }
        if !marginal_impact_estimate.is_finite() || marginal_impact_estimate < 0.0 {
            return Err(invalid("marginal_impact_estimate must be finite and non-negative"));
        }
        if !uncertainty_margin.is_finite() || uncertainty_margin < 0.0 {
            return Err(invalid("uncertainty_margin must be finite and non-negative"));
        }
        if !(0.0..=1.0).contains(&dependency_influence_weight) {
            return Err(invalid("dependency_influence_weight must be within [0, 1]"));
        }

        Ok(Self {
            agent_id,
            cluster_id: cluster_id.into(),
            marginal_impact_estimate,
            uncertainty_margin,
            dependency_influence_weight,
            task_ids: Vec::new(),
            metadata: BTreeMap::new(),
        })
    }

    #[must_use]
    pub fn with_task_ids<I, S>(mut self, task_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.task_ids = task_ids.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Raw caller input for a claim, prior to validation.
#[derive(Debug, Clone, Deserialize)]
pub struct ClaimInput {
    pub agent_id: String,
    #[serde(default)]
    pub cluster_id: String,
    pub marginal_impact_estimate: f64,
    #[serde(default)]
    pub uncertainty_margin: f64,
    #[serde(default)]
    pub dependency_influence_weight: f64,
    #[serde(default)]
    pub task_ids: Vec<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl TryFrom<ClaimInput> for ContributionClaim {
    type Error = DomainError;

    fn try_from(input: ClaimInput) -> Result<Self, Self::Error> {
        let mut claim = Self::new(
            input.agent_id,
            input.cluster_id,
            input.marginal_impact_estimate,
            input.uncertainty_margin,
            input.dependency_influence_weight,
        )?;
        claim.task_ids = input.task_ids;
        claim.metadata = input.metadata;
        Ok(claim)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_claim() {
        let claim = ContributionClaim::new("agent-A", "c1", 800.0, 200.0, 0.1)
            .unwrap()
            .with_task_ids(["t1"]);
        assert_eq!(claim.agent_id, "agent-A");
        assert_eq!(claim.task_ids, vec!["t1".to_string()]);
    }

    #[test]
    fn test_rejects_blank_agent() {
        let result = ContributionClaim::new("  ", "c1", 1.0, 0.0, 0.0);
        assert!(matches!(result, Err(DomainError::InvalidClaim { .. })));
    }

    #[test]
    fn test_rejects_out_of_range_leverage() {
        for weight in [-0.1, 1.5, f64::NAN] {
            let result = ContributionClaim::new("a", "c1", 1.0, 0.0, weight);
            assert!(result.is_err(), "weight {weight} should be rejected");
        }
    }

    #[test]
    fn test_rejects_negative_estimate_and_uncertainty() {
        assert!(ContributionClaim::new("a", "c1", -1.0, 0.0, 0.5).is_err());
        assert!(ContributionClaim::new("a", "c1", 1.0, -0.1, 0.5).is_err());
    }

    #[test]
    fn test_claim_input_conversion() {
        let yaml = r"
agent_id: agent-B
cluster_id: c1
marginal_impact_estimate: 200.0
uncertainty_margin: 10.0
dependency_influence_weight: 0.9
task_ids: [t2]
";
        let claim: ContributionClaim = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(claim.agent_id, "agent-B");
        assert!((claim.dependency_influence_weight - 0.9).abs() < f64::EPSILON);

        let bad = "agent_id: x\nmarginal_impact_estimate: 1.0\ndependency_influence_weight: 2.0\n";
        assert!(serde_yaml::from_str::<ContributionClaim>(bad).is_err());
    }
}
