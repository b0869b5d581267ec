//! Surplus pool domain model.
//!
//! A surplus pool is created fresh by every cluster calculation and never mutated
//! afterwards. Negotiation consumes it once; audit and recalibration may read it
//! any number of times.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::impact::ImpactCategory;

/// Structural signature of a cluster's collaboration topology.
///
/// Density and diversity are bucketed to the nearest tenth so that clusters
/// with similar shapes share one learned modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PatternKey {
    /// Dependency density rounded to tenths, 0..=10
    pub density_decile: u8,
    /// Role diversity rounded to tenths, 0..=10
    pub diversity_decile: u8,
    /// Whether the cluster depends on anything outside itself
    pub has_external_dependencies: bool,
}

impl PatternKey {
    pub fn from_metrics(density: f64, diversity: f64, external_dependencies: usize) -> Self {
        Self {
            density_decile: decile(density),
            diversity_decile: decile(diversity),
            has_external_dependencies: external_dependencies > 0,
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn decile(value: f64) -> u8 {
    (value.clamp(0.0, 1.0) * 10.0).round() as u8
}

impl fmt::Display for PatternKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "d{}-v{}-{}",
            self.density_decile,
            self.diversity_decile,
            if self.has_external_dependencies {
                "ext"
            } else {
                "int"
            }
        )
    }
}

/// Floor for the synergy multiplier after any update
pub const MIN_SYNERGY_MULTIPLIER: f64 = 0.01;

/// One generation of the surplus engine's global adaptive scalars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SynergyParameters {
    pub synergy_multiplier: f64,
    pub dependency_risk_factor: f64,
}

impl SynergyParameters {
    pub fn new(synergy_multiplier: f64, dependency_risk_factor: f64) -> Self {
        Self {
            synergy_multiplier: synergy_multiplier.max(MIN_SYNERGY_MULTIPLIER),
            dependency_risk_factor: dependency_risk_factor.max(0.0),
        }
    }

    /// Next generation with both deltas applied and floors enforced.
    #[must_use]
    pub fn shifted(&self, multiplier_delta: f64, risk_delta: f64) -> Self {
        Self::new(
            self.synergy_multiplier + multiplier_delta,
            self.dependency_risk_factor + risk_delta,
        )
    }
}

impl Default for SynergyParameters {
    fn default() -> Self {
        Self::new(0.15, 0.1)
    }
}

/// Graph-derived synergy metrics, rounded to 4 decimals.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SynergyMetrics {
    pub diversity: f64,
    pub density: f64,
    pub interdependence: f64,
}

/// Provenance recorded alongside a pool's total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurplusMetadata {
    pub internal_dependencies: usize,
    pub external_dependencies: usize,
    pub risk_discount: f64,
    pub synergy_bonus: f64,
    pub pattern_modifier: f64,
    pub synergy_metrics: SynergyMetrics,
    pub pattern_key: PatternKey,
}

impl Default for SurplusMetadata {
    fn default() -> Self {
        Self {
            internal_dependencies: 0,
            external_dependencies: 0,
            risk_discount: 1.0,
            synergy_bonus: 1.0,
            pattern_modifier: 1.0,
            synergy_metrics: SynergyMetrics::default(),
            pattern_key: PatternKey::from_metrics(0.0, 0.0, 0),
        }
    }
}

/// Aggregate value a task cluster generates collectively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurplusPool {
    pub cluster_id: String,
    pub total_surplus: f64,
    pub confidence_interval: (f64, f64),
    #[serde(default)]
    pub aggregated_vectors: BTreeMap<ImpactCategory, f64>,
    #[serde(default)]
    pub task_ids: Vec<String>,
    #[serde(default)]
    pub metadata: SurplusMetadata,
}

impl SurplusPool {
    /// Zero-valued pool for a cluster with no projections.
    pub fn empty(cluster_id: impl Into<String>) -> Self {
        Self {
            cluster_id: cluster_id.into(),
            total_surplus: 0.0,
            confidence_interval: (0.0, 0.0),
            aggregated_vectors: BTreeMap::new(),
            task_ids: Vec::new(),
            metadata: SurplusMetadata::default(),
        }
    }

    /// Pool carrying only a total, as handed to negotiation by external callers.
    pub fn with_total(cluster_id: impl Into<String>, total_surplus: f64) -> Self {
        Self {
            total_surplus,
            confidence_interval: (total_surplus, total_surplus),
            ..Self::empty(cluster_id)
        }
    }
}
