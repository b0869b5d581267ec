use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::instrument;

use crate::domain::models::{
    ImpactProjection, PatternKey, SurplusConfig, SurplusMetadata, SurplusPool, SynergyMetrics,
    SynergyParameters,
};
use crate::domain::ports::SynergyTuning;
use crate::services::cluster_graph::ClusterGraph;
use crate::services::round4;

/// Floor for any learned pattern modifier
pub const MIN_PATTERN_MODIFIER: f64 = 0.1;

const DIVERSITY_EXPONENT: f64 = 0.4;
const INTERDEPENDENCE_EXPONENT: f64 = 1.2;
const DENSITY_SCALE: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct PatternEntry {
    modifier: f64,
    last_updated: u64,
}

/// Learned per-topology modifiers with a fixed capacity.
///
/// When full, the entry updated least recently is evicted. Reads never
/// reorder entries, so a snapshot can be shared freely between calculations.
#[derive(Debug, Clone)]
pub struct PatternModifiers {
    entries: HashMap<PatternKey, PatternEntry>,
    capacity: usize,
    clock: u64,
}

impl PatternModifiers {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: capacity.max(1),
            clock: 0,
        }
    }

    /// Modifier for a topology, 1.0 when none has been learned
    pub fn get(&self, key: &PatternKey) -> f64 {
        self.entries.get(key).map_or(1.0, |entry| entry.modifier)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Apply a delta to one topology, evicting the stalest entry if needed.
    ///
    /// Returns the evicted key, if any.
    pub fn update(&mut self, key: PatternKey, delta: f64) -> Option<PatternKey> {
        self.clock += 1;
        let current = self.get(&key);
        self.entries.insert(
            key,
            PatternEntry {
                modifier: (current + delta).max(MIN_PATTERN_MODIFIER),
                last_updated: self.clock,
            },
        );

        if self.entries.len() <= self.capacity {
            return None;
        }

        let stalest = self
            .entries
            .iter()
            .filter(|(candidate, _)| **candidate != key)
            .min_by_key(|(_, entry)| entry.last_updated)
            .map(|(candidate, _)| *candidate)?;
        self.entries.remove(&stalest);
        Some(stalest)
    }
}

/// Everything a single calculation reads, published as one immutable generation.
#[derive(Debug, Clone)]
struct EngineState {
    generation: u64,
    parameters: SynergyParameters,
    patterns: PatternModifiers,
}

/// Computes the collective surplus of task clusters.
///
/// Adaptive state lives behind a lock holding an `Arc` snapshot. A calculation
/// clones the `Arc` once and works from it, so a concurrent recalibration
/// update can never be observed half-applied.
#[derive(Debug)]
pub struct SurplusEngine {
    state: RwLock<Arc<EngineState>>,
}

impl Default for SurplusEngine {
    fn default() -> Self {
        Self::from_config(&SurplusConfig::default())
    }
}

impl SurplusEngine {
    /// Create an engine with explicit starting parameters
    pub fn new(parameters: SynergyParameters, pattern_capacity: usize) -> Self {
        Self {
            state: RwLock::new(Arc::new(EngineState {
                generation: 0,
                parameters,
                patterns: PatternModifiers::new(pattern_capacity),
            })),
        }
    }

    pub fn from_config(config: &SurplusConfig) -> Self {
        Self::new(
            SynergyParameters::new(config.synergy_multiplier, config.dependency_risk_factor),
            config.pattern_capacity,
        )
    }

    fn snapshot(&self) -> Arc<EngineState> {
        Arc::clone(&self.state.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn publish(&self, update: impl FnOnce(&mut EngineState)) -> u64 {
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = EngineState::clone(&guard);
        update(&mut next);
        next.generation += 1;
        let generation = next.generation;
        *guard = Arc::new(next);
        generation
    }

    /// Number of parameter updates published so far
    pub fn generation(&self) -> u64 {
        self.snapshot().generation
    }

    /// Number of learned pattern modifiers currently retained
    pub fn pattern_count(&self) -> usize {
        self.snapshot().patterns.len()
    }

    /// Compute the surplus pool of a cluster.
    ///
    /// `total = Σ mean · synergy_bonus · pattern_modifier · risk_discount`, where
    /// the synergy bonus rewards diverse, tightly coupled clusters and the risk
    /// discount penalises dependencies outside the cluster. Never fails: an
    /// empty cluster yields a zero pool.
    #[instrument(skip(self, projections), fields(num_tasks = projections.len()))]
    pub fn calculate_cluster_surplus(
        &self,
        cluster_id: &str,
        projections: &[ImpactProjection],
    ) -> SurplusPool {
        if projections.is_empty() {
            tracing::debug!("empty cluster, returning zero pool");
            return SurplusPool::empty(cluster_id);
        }

        let state = self.snapshot();
        let parameters = state.parameters;

        let base_surplus: f64 = projections.iter().map(|p| p.distribution_mean).sum();
        let graph = ClusterGraph::from_projections(projections);
        let density = graph.density();
        let interdependence = graph.interdependence();
        let diversity = graph.diversity();

        let synergy_bonus = diversity.powf(DIVERSITY_EXPONENT)
            * (1.0 + interdependence.powf(INTERDEPENDENCE_EXPONENT))
            * (density * parameters.synergy_multiplier * DENSITY_SCALE).exp();
        let risk_discount = 1.0
            / (1.0 + graph.external_dependencies() as f64 * parameters.dependency_risk_factor);

        let pattern_key =
            PatternKey::from_metrics(density, diversity, graph.external_dependencies());
        let pattern_modifier = state.patterns.get(&pattern_key);

        let factor = synergy_bonus * pattern_modifier * risk_discount;
        let total_surplus = base_surplus * factor;

        let (ci_low, ci_high) = projections.iter().fold((0.0, 0.0), |(low, high), p| {
            (low + p.confidence_interval.0, high + p.confidence_interval.1)
        });

        let mut aggregated_vectors = BTreeMap::new();
        for projection in projections {
            *aggregated_vectors
                .entry(projection.target_vector.category())
                .or_insert(0.0) += projection.target_vector.magnitude();
        }

        tracing::debug!(
            generation = state.generation,
            internal = graph.internal_dependencies(),
            external = graph.external_dependencies(),
            density,
            interdependence,
            diversity,
            synergy_bonus,
            risk_discount,
            pattern = %pattern_key,
            "cluster graph metrics"
        );
        tracing::info!(cluster_id, base_surplus, total_surplus, "cluster surplus calculated");

        SurplusPool {
            cluster_id: cluster_id.to_string(),
            total_surplus,
            confidence_interval: (round4(ci_low * factor), round4(ci_high * factor)),
            aggregated_vectors,
            task_ids: projections.iter().map(|p| p.task_id.clone()).collect(),
            metadata: SurplusMetadata {
                internal_dependencies: graph.internal_dependencies(),
                external_dependencies: graph.external_dependencies(),
                risk_discount: round4(risk_discount),
                synergy_bonus: round4(synergy_bonus),
                pattern_modifier,
                synergy_metrics: SynergyMetrics {
                    diversity: round4(diversity),
                    density: round4(density),
                    interdependence: round4(interdependence),
                },
                pattern_key,
            },
        }
    }
}

impl SynergyTuning for SurplusEngine {
    fn parameters(&self) -> SynergyParameters {
        self.snapshot().parameters
    }

    fn update_synergy_parameters(&self, multiplier_delta: f64, risk_delta: f64) {
        self.apply_adjustment(multiplier_delta, risk_delta, None);
    }

    fn update_pattern_modifier(&self, pattern_key: PatternKey, delta: f64) {
        self.apply_adjustment(0.0, 0.0, Some((pattern_key, delta)));
    }

    fn apply_adjustment(
        &self,
        multiplier_delta: f64,
        risk_delta: f64,
        pattern_delta: Option<(PatternKey, f64)>,
    ) {
        let shifts_parameters = multiplier_delta != 0.0 || risk_delta != 0.0;
        let mut updated = SynergyParameters::default();
        let mut evicted = None;
        let generation = self.publish(|state| {
            if shifts_parameters {
                state.parameters = state.parameters.shifted(multiplier_delta, risk_delta);
            }
            if let Some((pattern_key, delta)) = pattern_delta {
                evicted = state.patterns.update(pattern_key, delta);
            }
            updated = state.parameters;
        });

        if shifts_parameters {
            tracing::info!(
                generation,
                synergy_multiplier = updated.synergy_multiplier,
                dependency_risk_factor = updated.dependency_risk_factor,
                "synergy parameters updated"
            );
        }
        if let Some((pattern_key, delta)) = pattern_delta {
            if let Some(evicted) = evicted {
                tracing::warn!(pattern = %evicted, "pattern modifier table full, evicted stalest entry");
            }
            tracing::debug!(generation, pattern = %pattern_key, delta, "pattern modifier updated");
        }
    }

    fn pattern_modifier(&self, pattern_key: &PatternKey) -> f64 {
        self.snapshot().patterns.get(pattern_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{ImpactCategory, ImpactVector};

    fn engine(multiplier: f64, risk: f64) -> SurplusEngine {
        SurplusEngine::new(SynergyParameters::new(multiplier, risk), 16)
    }

    fn projection(
        task_id: &str,
        category: ImpactCategory,
        magnitude: f64,
        mean: f64,
        deps: &[&str],
        role: &str,
    ) -> ImpactProjection {
        let vector = ImpactVector::new(category, magnitude, 30.0, (magnitude * 0.9, magnitude * 1.1))
            .unwrap()
            .with_dependencies(deps.iter().copied());
        ImpactProjection::new(task_id, vector, mean, mean * 0.1, (mean * 0.8, mean * 1.2))
            .with_agent_role(role)
    }

    fn three_task_cluster() -> Vec<ImpactProjection> {
        vec![
            projection("t1", ImpactCategory::Technical, 10.0, 100.0, &[], "dev"),
            projection("t2", ImpactCategory::Efficiency, 5.0, 50.0, &["t1"], "qa"),
            projection("t3", ImpactCategory::Revenue, 20.0, 200.0, &["ext-001"], "ops"),
        ]
    }

    #[test]
    fn test_empty_cluster() {
        let pool = engine(0.2, 0.1).calculate_cluster_surplus("cluster-0", &[]);
        assert_eq!(pool.total_surplus, 0.0);
        assert!(pool.task_ids.is_empty());
        assert_eq!(pool.cluster_id, "cluster-0");
    }

    #[test]
    fn test_single_task_no_dependencies_is_neutral() {
        let projections = vec![projection("t1", ImpactCategory::Technical, 10.0, 100.0, &[], "dev")];
        let pool = engine(0.2, 0.1).calculate_cluster_surplus("cluster-1", &projections);

        assert_eq!(pool.total_surplus, 100.0);
        assert_eq!(pool.aggregated_vectors[&ImpactCategory::Technical], 10.0);
        assert_eq!(pool.metadata.risk_discount, 1.0);
        assert_eq!(pool.metadata.synergy_bonus, 1.0);
    }

    #[test]
    fn test_single_task_total_is_not_rounded() {
        let projections = vec![projection("t1", ImpactCategory::Social, 2.0, 123.456_789, &[], "dev")];
        let pool = SurplusEngine::default().calculate_cluster_surplus("cluster-1", &projections);

        assert_eq!(pool.total_surplus, 123.456_789);
    }

    #[test]
    fn test_synergy_and_risk() {
        let pool = engine(0.2, 0.1).calculate_cluster_surplus("cluster-multi", &three_task_cluster());

        // 350 · (1 + (1/3)^1.2) · e^(1/6 · 0.2 · 4) / 1.1
        assert!((pool.total_surplus - 460.85).abs() < 0.01, "got {}", pool.total_surplus);
        assert_eq!(pool.metadata.internal_dependencies, 1);
        assert_eq!(pool.metadata.external_dependencies, 1);
        assert_eq!(pool.metadata.risk_discount, 0.9091);
        assert_eq!(pool.metadata.synergy_metrics.density, 0.1667);
        assert_eq!(pool.metadata.synergy_metrics.interdependence, 0.3333);
        assert_eq!(pool.metadata.synergy_metrics.diversity, 1.0);
        assert_eq!(pool.aggregated_vectors[&ImpactCategory::Efficiency], 5.0);
        assert_eq!(pool.aggregated_vectors[&ImpactCategory::Revenue], 20.0);
        assert_eq!(pool.task_ids, vec!["t1", "t2", "t3"]);
    }

    #[test]
    fn test_confidence_interval_scales_with_surplus() {
        let pool = engine(0.2, 0.1).calculate_cluster_surplus("c", &three_task_cluster());
        let (low, high) = pool.confidence_interval;
        assert!(low < pool.total_surplus && pool.total_surplus < high);
        // Projection intervals are ±20% around each mean
        assert!((low / pool.total_surplus - 0.8).abs() < 1e-3);
        assert!((high / pool.total_surplus - 1.2).abs() < 1e-3);
    }

    #[test]
    fn test_higher_risk_factor_lowers_surplus() {
        let low_risk = engine(0.2, 0.01).calculate_cluster_surplus("c", &three_task_cluster());
        let high_risk = engine(0.2, 0.5).calculate_cluster_surplus("c", &three_task_cluster());
        assert!(low_risk.total_surplus > high_risk.total_surplus);
    }

    #[test]
    fn test_update_synergy_parameters_respects_floors() {
        let engine = engine(0.2, 0.1);
        engine.update_synergy_parameters(-5.0, -5.0);

        let params = engine.parameters();
        assert!((params.synergy_multiplier - 0.01).abs() < f64::EPSILON);
        assert_eq!(params.dependency_risk_factor, 0.0);
        assert_eq!(engine.generation(), 1);
    }

    #[test]
    fn test_pattern_modifier_scales_matching_clusters() {
        let engine = engine(0.2, 0.1);
        let before = engine.calculate_cluster_surplus("c", &three_task_cluster());

        engine.update_pattern_modifier(before.metadata.pattern_key, 0.5);
        let after = engine.calculate_cluster_surplus("c", &three_task_cluster());

        assert!((engine.pattern_modifier(&before.metadata.pattern_key) - 1.5).abs() < 1e-12);
        assert!((after.total_surplus / before.total_surplus - 1.5).abs() < 1e-4);
        assert_eq!(after.metadata.pattern_modifier, 1.5);
    }

    #[test]
    fn test_apply_adjustment_publishes_one_generation() {
        let engine = engine(0.2, 0.1);
        let key = PatternKey::from_metrics(0.5, 0.5, 1);

        engine.apply_adjustment(0.05, -0.02, Some((key, 0.25)));

        assert_eq!(engine.generation(), 1);
        let params = engine.parameters();
        assert!((params.synergy_multiplier - 0.25).abs() < 1e-12);
        assert!((params.dependency_risk_factor - 0.08).abs() < 1e-12);
        assert!((engine.pattern_modifier(&key) - 1.25).abs() < 1e-12);
    }

    #[test]
    fn test_pattern_modifier_floor() {
        let mut patterns = PatternModifiers::new(4);
        let key = PatternKey::from_metrics(0.5, 0.5, 0);
        patterns.update(key, -10.0);
        assert_eq!(patterns.get(&key), MIN_PATTERN_MODIFIER);
    }

    #[test]
    fn test_pattern_table_evicts_least_recently_updated() {
        let mut patterns = PatternModifiers::new(2);
        let a = PatternKey::from_metrics(0.1, 0.1, 0);
        let b = PatternKey::from_metrics(0.2, 0.2, 0);
        let c = PatternKey::from_metrics(0.3, 0.3, 0);

        assert_eq!(patterns.update(a, 0.1), None);
        assert_eq!(patterns.update(b, 0.1), None);
        assert_eq!(patterns.update(a, 0.1), None);
        assert_eq!(patterns.update(c, 0.1), Some(b));

        assert_eq!(patterns.len(), 2);
        assert_eq!(patterns.get(&b), 1.0);
        assert!((patterns.get(&a) - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_concurrent_updates_and_reads() {
        let engine = Arc::new(engine(0.2, 0.1));
        let projections = Arc::new(three_task_cluster());

        let writers: Vec<_> = (0..4)
            .map(|_| {
                let engine = Arc::clone(&engine);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        engine.update_synergy_parameters(0.001, 0.001);
                    }
                })
            })
            .collect();
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let engine = Arc::clone(&engine);
                let projections = Arc::clone(&projections);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        let pool = engine.calculate_cluster_surplus("c", &projections);
                        assert!(pool.total_surplus.is_finite() && pool.total_surplus > 0.0);
                    }
                })
            })
            .collect();

        for handle in writers.into_iter().chain(readers) {
            handle.join().unwrap();
        }

        assert_eq!(engine.generation(), 200);
        let params = engine.parameters();
        assert!((params.synergy_multiplier - 0.4).abs() < 1e-9);
        assert!((params.dependency_risk_factor - 0.3).abs() < 1e-9);
    }
}
