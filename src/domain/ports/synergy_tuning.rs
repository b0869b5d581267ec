use crate::domain::models::{PatternKey, SynergyParameters};

/// Port for adjusting the adaptive parameters behind surplus calculation.
///
/// Implementations must publish each update atomically: a concurrent
/// calculation observes either the old or the new parameter generation,
/// never a mix of both.
///
/// # Examples
///
/// ```no_run
/// use cooperative_surplus::domain::ports::SynergyTuning;
///
/// fn dampen(tuning: &dyn SynergyTuning) {
///     let before = tuning.parameters();
///     tuning.update_synergy_parameters(-0.01, 0.0);
///     assert!(tuning.parameters().synergy_multiplier <= before.synergy_multiplier);
/// }
/// ```
pub trait SynergyTuning: Send + Sync {
    /// Current parameter snapshot
    fn parameters(&self) -> SynergyParameters;

    /// Shift the global synergy multiplier and dependency risk factor.
    ///
    /// The multiplier never drops below its floor and the risk factor never
    /// goes negative.
    fn update_synergy_parameters(&self, multiplier_delta: f64, risk_delta: f64);

    /// Shift the learned modifier for one collaboration topology.
    fn update_pattern_modifier(&self, pattern_key: PatternKey, delta: f64);

    /// Shift the global parameters and, optionally, one pattern modifier as a
    /// single generation.
    ///
    /// Readers never observe some of these deltas without the others.
    fn apply_adjustment(
        &self,
        multiplier_delta: f64,
        risk_delta: f64,
        pattern_delta: Option<(PatternKey, f64)>,
    );

    /// Learned modifier for a topology, 1.0 when never updated
    fn pattern_modifier(&self, pattern_key: &PatternKey) -> f64;
}
