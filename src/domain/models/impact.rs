//! Impact domain model.
//!
//! An impact vector is one task's projected effect in a single category. Vectors are
//! validated once, at construction, and are immutable afterwards: the surplus engine
//! relies on that contract and never re-checks magnitudes or bounds.
//!
//! Projections are produced by the upstream forecaster and only read here.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::errors::{DomainError, DomainResult};

/// Metadata key carrying the role of the agent that produced a task.
pub const AGENT_ROLE_KEY: &str = "agent_role";

/// Closed set of impact categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactCategory {
    Revenue,
    Research,
    Efficiency,
    Social,
    Ecosystem,
    Technical,
}

impl ImpactCategory {
    /// All categories in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Revenue,
        Self::Research,
        Self::Efficiency,
        Self::Social,
        Self::Ecosystem,
        Self::Technical,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Revenue => "revenue",
            Self::Research => "research",
            Self::Efficiency => "efficiency",
            Self::Social => "social",
            Self::Ecosystem => "ecosystem",
            Self::Technical => "technical",
        }
    }

    /// Lenient resolution for free-text sources.
    ///
    /// Only canonical names are accepted; anything else resolves to `fallback`
    /// and is logged so the substitution stays visible.
    pub fn resolve(raw: &str, fallback: Self) -> Self {
        raw.parse().unwrap_or_else(|_| {
            tracing::warn!(
                raw_category = raw,
                fallback = %fallback,
                "unknown impact category, using fallback"
            );
            fallback
        })
    }
}

impl fmt::Display for ImpactCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImpactCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == normalized)
            .ok_or_else(|| DomainError::UnknownCategory(s.to_string()))
    }
}

/// One task's projected effect in a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawImpactVector")]
pub struct ImpactVector {
    category: ImpactCategory,
    magnitude: f64,
    time_horizon: f64,
    uncertainty_bounds: (f64, f64),
    causal_dependencies: BTreeSet<String>,
    domain_weights: BTreeMap<String, f64>,
    metrics: BTreeMap<String, serde_json::Value>,
}

impl ImpactVector {
    /// Create a validated impact vector.
    ///
    /// # Errors
    /// - magnitude must be finite and strictly positive
    /// - time horizon must be finite and non-negative
    /// - uncertainty bounds must be finite and ordered
    pub fn new(
        category: ImpactCategory,
        magnitude: f64,
        time_horizon: f64,
        uncertainty_bounds: (f64, f64),
    ) -> DomainResult<Self> {
        if !magnitude.is_finite() || magnitude <= 0.0 {
            return Err(DomainError::InvalidMagnitude(magnitude));
        }
        if !time_horizon.is_finite() || time_horizon < 0.0 {
            return Err(DomainError::InvalidTimeHorizon(time_horizon));
        }
        let (low, high) = uncertainty_bounds;
        if !low.is_finite() || !high.is_finite() || low > high {
            return Err(DomainError::InvalidUncertaintyBounds { low, high });
        }

        Ok(Self {
            category,
            magnitude,
            time_horizon,
            uncertainty_bounds,
            causal_dependencies: BTreeSet::new(),
            domain_weights: BTreeMap::new(),
            metrics: BTreeMap::new(),
        })
    }

    /// Attach causal dependency ids. Duplicates collapse.
    #[must_use]
    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.causal_dependencies
            .extend(dependencies.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_domain_weight(mut self, domain: impl Into<String>, weight: f64) -> Self {
        self.domain_weights.insert(domain.into(), weight);
        self
    }

    #[must_use]
    pub fn with_metric(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.metrics.insert(name.into(), value);
        self
    }

    pub const fn category(&self) -> ImpactCategory {
        self.category
    }

    pub const fn magnitude(&self) -> f64 {
        self.magnitude
    }

    pub const fn time_horizon(&self) -> f64 {
        self.time_horizon
    }

    pub const fn uncertainty_bounds(&self) -> (f64, f64) {
        self.uncertainty_bounds
    }

    pub const fn causal_dependencies(&self) -> &BTreeSet<String> {
        &self.causal_dependencies
    }

    pub const fn domain_weights(&self) -> &BTreeMap<String, f64> {
        &self.domain_weights
    }

    pub const fn metrics(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.metrics
    }
}

/// Unvalidated wire shape of an [`ImpactVector`].
#[derive(Debug, Deserialize)]
struct RawImpactVector {
    category: ImpactCategory,
    magnitude: f64,
    time_horizon: f64,
    uncertainty_bounds: (f64, f64),
    #[serde(default)]
    causal_dependencies: BTreeSet<String>,
    #[serde(default)]
    domain_weights: BTreeMap<String, f64>,
    #[serde(default)]
    metrics: BTreeMap<String, serde_json::Value>,
}

impl TryFrom<RawImpactVector> for ImpactVector {
    type Error = DomainError;

    fn try_from(raw: RawImpactVector) -> Result<Self, Self::Error> {
        let mut vector = Self::new(
            raw.category,
            raw.magnitude,
            raw.time_horizon,
            raw.uncertainty_bounds,
        )?;
        vector.causal_dependencies = raw.causal_dependencies;
        vector.domain_weights = raw.domain_weights;
        vector.metrics = raw.metrics;
        Ok(vector)
    }
}

/// Forecast of one task's impact, as supplied by the forecaster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactProjection {
    pub task_id: String,
    pub target_vector: ImpactVector,
    pub distribution_mean: f64,
    pub distribution_std: f64,
    pub confidence_interval: (f64, f64),
    #[serde(default)]
    pub effect_chain: Vec<ImpactVector>,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl ImpactProjection {
    pub fn new(
        task_id: impl Into<String>,
        target_vector: ImpactVector,
        distribution_mean: f64,
        distribution_std: f64,
        confidence_interval: (f64, f64),
    ) -> Self {
        Self {
            task_id: task_id.into(),
            target_vector,
            distribution_mean,
            distribution_std,
            confidence_interval,
            effect_chain: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_effect_chain(mut self, chain: Vec<ImpactVector>) -> Self {
        self.effect_chain = chain;
        self
    }

    #[must_use]
    pub fn with_agent_role(mut self, role: impl Into<String>) -> Self {
        self.metadata
            .insert(AGENT_ROLE_KEY.to_string(), serde_json::Value::String(role.into()));
        self
    }

    /// Canonical agent role tag, trimmed and lower-cased.
    ///
    /// Returns `None` when the tag is absent, blank, or not a string.
    pub fn agent_role(&self) -> Option<String> {
        self.metadata
            .get(AGENT_ROLE_KEY)
            .and_then(serde_json::Value::as_str)
            .map(|role| role.trim().to_lowercase())
            .filter(|role| !role.is_empty())
    }
}
