use std::sync::Arc;

use serde::Serialize;

use crate::domain::models::{PatternKey, SurplusPool};
use crate::domain::ports::SynergyTuning;

const LEARNING_RATE: f64 = 0.05;
const GLOBAL_SYNERGY_STEP: f64 = 0.25;
const PATTERN_STEP: f64 = 2.0;
const RISK_RAISE_STEP: f64 = 0.2;
const RISK_RELAX_STEP: f64 = 0.1;

/// Deltas applied by one recalibration pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecalibrationUpdate {
    pub deviation_ratio: f64,
    pub synergy_multiplier_delta: Option<f64>,
    pub pattern_modifier_delta: Option<(PatternKey, f64)>,
    pub risk_factor_delta: Option<f64>,
}

impl RecalibrationUpdate {
    pub const fn is_empty(&self) -> bool {
        self.synergy_multiplier_delta.is_none()
            && self.pattern_modifier_delta.is_none()
            && self.risk_factor_delta.is_none()
    }
}

/// Feeds realized cluster outcomes back into the surplus parameters.
///
/// Synergy is only corrected when the realized value falls outside the pool's
/// confidence interval; the cluster's own topology learns four times faster
/// than the global multiplier. Risk is corrected whenever the cluster had
/// external dependencies: shortfalls raise it, overperformance relaxes it at
/// half the rate.
pub struct SynergyRecalibrator {
    tuning: Arc<dyn SynergyTuning>,
}

impl SynergyRecalibrator {
    pub fn new(tuning: Arc<dyn SynergyTuning>) -> Self {
        Self { tuning }
    }

    pub fn recalibrate(&self, pool: &SurplusPool, realized_surplus: f64) -> RecalibrationUpdate {
        let predicted = pool.total_surplus;
        if predicted == 0.0 || !realized_surplus.is_finite() {
            tracing::debug!(cluster_id = %pool.cluster_id, "no prediction to recalibrate against");
            return RecalibrationUpdate::default();
        }

        let deviation_ratio = (realized_surplus - predicted) / predicted;
        let mut update = RecalibrationUpdate {
            deviation_ratio,
            ..RecalibrationUpdate::default()
        };

        let (ci_low, ci_high) = pool.confidence_interval;
        if realized_surplus < ci_low || realized_surplus > ci_high {
            update.synergy_multiplier_delta =
                Some(deviation_ratio * LEARNING_RATE * GLOBAL_SYNERGY_STEP);
            update.pattern_modifier_delta = Some((
                pool.metadata.pattern_key,
                deviation_ratio * LEARNING_RATE * PATTERN_STEP,
            ));
        }

        if pool.metadata.external_dependencies > 0 && realized_surplus != predicted {
            let magnitude = deviation_ratio.abs() * LEARNING_RATE;
            update.risk_factor_delta = Some(if realized_surplus < predicted {
                magnitude * RISK_RAISE_STEP
            } else {
                -magnitude * RISK_RELAX_STEP
            });
        }

        if !update.is_empty() {
            self.tuning.apply_adjustment(
                update.synergy_multiplier_delta.unwrap_or(0.0),
                update.risk_factor_delta.unwrap_or(0.0),
                update.pattern_modifier_delta,
            );
        }

        tracing::info!(
            cluster_id = %pool.cluster_id,
            predicted,
            realized_surplus,
            deviation_ratio,
            changed = !update.is_empty(),
            "synergy model recalibrated"
        );
        update
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::SynergyParameters;
    use crate::services::surplus_engine::SurplusEngine;

    fn setup() -> (Arc<SurplusEngine>, SynergyRecalibrator) {
        let engine = Arc::new(SurplusEngine::default());
        let recalibrator = SynergyRecalibrator::new(engine.clone());
        (engine, recalibrator)
    }

    fn pool(total: f64, ci: (f64, f64), external: usize) -> SurplusPool {
        let mut pool = SurplusPool::with_total("cluster_1", total);
        pool.confidence_interval = ci;
        pool.metadata.external_dependencies = external;
        pool
    }

    #[test]
    fn test_underestimate_outside_interval_boosts_synergy() {
        let (engine, recalibrator) = setup();
        assert_eq!(engine.parameters(), SynergyParameters::default());

        let update = recalibrator.recalibrate(&pool(100.0, (90.0, 110.0), 0), 120.0);

        assert!(engine.parameters().synergy_multiplier > 0.15);
        assert!((update.synergy_multiplier_delta.unwrap() - 0.0025).abs() < 1e-12);
        let (key, delta) = update.pattern_modifier_delta.unwrap();
        assert!((delta - 0.02).abs() < 1e-12);
        assert!((engine.pattern_modifier(&key) - 1.02).abs() < 1e-12);
        assert_eq!(update.risk_factor_delta, None);
    }

    #[test]
    fn test_within_interval_leaves_synergy_alone() {
        let (engine, recalibrator) = setup();
        let update = recalibrator.recalibrate(&pool(100.0, (90.0, 110.0), 0), 105.0);

        assert!(update.is_empty());
        assert_eq!(engine.parameters(), SynergyParameters::default());
    }

    #[test]
    fn test_shortfall_with_external_dependencies_raises_risk() {
        let (engine, recalibrator) = setup();
        let update = recalibrator.recalibrate(&pool(100.0, (90.0, 110.0), 2), 95.0);

        // |−0.05| · 0.05 · 0.2
        assert!((update.risk_factor_delta.unwrap() - 0.0005).abs() < 1e-12);
        assert!((engine.parameters().dependency_risk_factor - 0.1005).abs() < 1e-12);
    }

    #[test]
    fn test_overperformance_with_external_dependencies_relaxes_risk() {
        let (engine, recalibrator) = setup();
        let update = recalibrator.recalibrate(&pool(100.0, (90.0, 110.0), 1), 105.0);

        assert!((update.risk_factor_delta.unwrap() + 0.000_25).abs() < 1e-12);
        assert!(engine.parameters().dependency_risk_factor < 0.1);
    }

    #[test]
    fn test_full_pass_publishes_one_generation() {
        let (engine, recalibrator) = setup();
        let update = recalibrator.recalibrate(&pool(100.0, (90.0, 110.0), 2), 50.0);

        assert!(update.synergy_multiplier_delta.is_some());
        assert!(update.pattern_modifier_delta.is_some());
        assert!(update.risk_factor_delta.is_some());
        assert_eq!(engine.generation(), 1);

        // -0.5 · 0.05 · 0.25 and |-0.5| · 0.05 · 0.2
        let parameters = engine.parameters();
        assert!((parameters.synergy_multiplier - 0.14375).abs() < 1e-12);
        assert!((parameters.dependency_risk_factor - 0.105).abs() < 1e-12);
    }

    #[test]
    fn test_zero_prediction_is_ignored() {
        let (engine, recalibrator) = setup();
        let update = recalibrator.recalibrate(&pool(0.0, (0.0, 0.0), 3), 50.0);

        assert!(update.is_empty());
        assert_eq!(engine.generation(), 0);
    }
}
