//! Negotiation session records.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One round of the bargaining loop, kept as an append-only audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegotiationRound {
    /// 1-based round index
    pub round_number: usize,
    pub allocations: BTreeMap<String, f64>,
    pub deviation_from_objective: f64,
    pub allocation_variance: f64,
    pub timestamp: DateTime<Utc>,
}

impl NegotiationRound {
    pub fn allocated_total(&self) -> f64 {
        self.allocations.values().sum()
    }
}

/// Outcome of one negotiation session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegotiationResult {
    pub cluster_id: String,
    pub total_surplus: f64,
    pub final_allocations: BTreeMap<String, f64>,
    pub rounds_to_convergence: usize,
    pub converged: bool,
    pub final_deviation: f64,
    pub history: Vec<NegotiationRound>,
    pub objective_targets: BTreeMap<String, f64>,
}

impl NegotiationResult {
    /// Result for a session with nothing to divide.
    pub fn settled_empty(cluster_id: impl Into<String>, total_surplus: f64) -> Self {
        Self {
            cluster_id: cluster_id.into(),
            total_surplus,
            final_allocations: BTreeMap::new(),
            rounds_to_convergence: 0,
            converged: true,
            final_deviation: 0.0,
            history: Vec::new(),
            objective_targets: BTreeMap::new(),
        }
    }

    pub fn allocated_total(&self) -> f64 {
        self.final_allocations.values().sum()
    }
}
