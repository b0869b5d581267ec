use std::collections::{BTreeMap, HashSet};

use chrono::Utc;
use tracing::instrument;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    ContributionClaim, NegotiationConfig, NegotiationResult, NegotiationRound, SurplusPool,
};
use crate::services::round4;

const BASE_VELOCITY: f64 = 0.25;
const LEVERAGE_DRAG: f64 = 0.4;
const MIN_VELOCITY: f64 = 0.05;
const MAX_VELOCITY: f64 = 0.6;
const EPSILON: f64 = 1e-9;

/// Iterative cooperative bargaining over a surplus pool.
///
/// Each agent starts from the equal split and moves toward its objective target,
/// a blend of its contribution-proportional share and the equal share controlled
/// by `fairness_weight`. Movement speed is per agent: uncertain agents concede
/// faster, high-leverage agents slower. After every round the allocations are
/// rescaled to sum to the pool total, so negotiation never creates or destroys
/// value.
///
/// The engine is stateless between calls and deterministic for identical inputs.
#[derive(Debug, Clone, Default)]
pub struct NegotiationEngine {
    config: NegotiationConfig,
}

/// Per-agent bargaining posture derived from its claim.
#[derive(Debug, Clone, Copy)]
struct Stance {
    target: f64,
    velocity: f64,
}

impl NegotiationEngine {
    pub const fn new(config: NegotiationConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> &NegotiationConfig {
        &self.config
    }

    /// Run the bargaining loop to a conserved allocation.
    ///
    /// Non-convergence within `max_iterations` is reported through
    /// `converged = false`, not as an error.
    ///
    /// # Errors
    /// Returns [`DomainError::DuplicateAgent`] if two claims share an agent id
    /// and there is a positive surplus to split.
    #[instrument(skip(self, pool, claims), fields(cluster_id = %pool.cluster_id, agents = claims.len()))]
    pub fn negotiate_splits(
        &self,
        pool: &SurplusPool,
        claims: &[ContributionClaim],
    ) -> DomainResult<NegotiationResult> {
        let total_surplus = pool.total_surplus;
        if claims.is_empty() || total_surplus <= 0.0 {
            tracing::debug!(total_surplus, "nothing to negotiate");
            return Ok(NegotiationResult::settled_empty(
                pool.cluster_id.clone(),
                total_surplus,
            ));
        }

        let mut seen = HashSet::with_capacity(claims.len());
        for claim in claims {
            if !seen.insert(claim.agent_id.as_str()) {
                return Err(DomainError::DuplicateAgent(claim.agent_id.clone()));
            }
        }

        for claim in claims.iter().filter(|c| c.cluster_id != pool.cluster_id) {
            tracing::warn!(
                agent_id = %claim.agent_id,
                claim_cluster = %claim.cluster_id,
                "claim references a different cluster than the pool"
            );
        }

        let stances = self.stances(total_surplus, claims);
        let equal_share = total_surplus / claims.len() as f64;
        let mut allocations = vec![equal_share; claims.len()];
        let mut previous_variance = variance(&allocations);
        let mut history = Vec::new();
        let mut converged = false;
        let mut deviation = total_deviation(&allocations, &stances);

        for round_number in 1..=self.config.max_iterations {
            let proposed: Vec<f64> = allocations
                .iter()
                .zip(&stances)
                .map(|(current, stance)| current + stance.velocity * (stance.target - current))
                .collect();
            allocations = conserve(proposed, total_surplus);

            let current_variance = variance(&allocations);
            deviation = total_deviation(&allocations, &stances);

            history.push(NegotiationRound {
                round_number,
                allocations: by_agent(claims, &allocations),
                deviation_from_objective: round4(deviation),
                allocation_variance: round4(current_variance),
                timestamp: Utc::now(),
            });

            if round_number > 1
                && ((current_variance - previous_variance).abs() < self.config.equilibrium_tolerance
                    || deviation < self.config.equilibrium_tolerance)
            {
                converged = true;
                break;
            }
            previous_variance = current_variance;
        }

        if converged {
            tracing::info!(rounds = history.len(), deviation, "negotiation converged");
        } else {
            tracing::warn!(
                rounds = history.len(),
                deviation,
                "negotiation did not converge within max_iterations"
            );
        }

        let targets: Vec<f64> = stances.iter().map(|stance| stance.target).collect();
        Ok(NegotiationResult {
            cluster_id: pool.cluster_id.clone(),
            total_surplus,
            final_allocations: by_agent(claims, &allocations),
            rounds_to_convergence: history.len(),
            converged,
            final_deviation: round4(deviation),
            history,
            objective_targets: by_agent(claims, &targets),
        })
    }

    /// Objective target and adjustment velocity for every claim.
    fn stances(&self, total_surplus: f64, claims: &[ContributionClaim]) -> Vec<Stance> {
        let num_agents = claims.len() as f64;
        let fairness_target = total_surplus / num_agents;
        let marginal_sum: f64 = claims.iter().map(|c| c.marginal_impact_estimate).sum();
        let fairness_weight = self.config.fairness_weight;

        claims
            .iter()
            .map(|claim| {
                let efficiency_target = if marginal_sum > 0.0 {
                    claim.marginal_impact_estimate / marginal_sum * total_surplus
                } else {
                    fairness_target
                };
                let target =
                    (1.0 - fairness_weight) * efficiency_target + fairness_weight * fairness_target;

                let leverage = claim.dependency_influence_weight;
                let flexibility =
                    (claim.uncertainty_margin / (claim.marginal_impact_estimate + EPSILON)).min(1.0);
                let velocity = (BASE_VELOCITY * (1.0 + flexibility - LEVERAGE_DRAG * leverage))
                    .clamp(MIN_VELOCITY, MAX_VELOCITY);

                Stance { target, velocity }
            })
            .collect()
    }
}

/// Rescale proposals so they sum to exactly the pool total.
fn conserve(proposed: Vec<f64>, total_surplus: f64) -> Vec<f64> {
    let sum: f64 = proposed.iter().sum();
    if sum > 0.0 {
        proposed
            .into_iter()
            .map(|value| value / sum * total_surplus)
            .collect()
    } else {
        let equal_share = total_surplus / proposed.len() as f64;
        vec![equal_share; proposed.len()]
    }
}

fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n
}

fn total_deviation(allocations: &[f64], stances: &[Stance]) -> f64 {
    allocations
        .iter()
        .zip(stances)
        .map(|(allocation, stance)| (allocation - stance.target).abs())
        .sum()
}

fn by_agent(claims: &[ContributionClaim], values: &[f64]) -> BTreeMap<String, f64> {
    claims
        .iter()
        .zip(values)
        .map(|(claim, value)| (claim.agent_id.clone(), round4(*value)))
        .collect()
}
