//! Cooperative Surplus - value and divide what agent teams create together
//!
//! When several agents work on interdependent tasks, the cluster produces more
//! than the sum of its parts. This crate quantifies that collective surplus and
//! splits it between the contributing agents through iterative bargaining.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Impact, surplus, claim, and negotiation models plus ports
//! - **Service Layer** (`services`): Surplus engine, negotiation engine, recalibration
//! - **Infrastructure Layer** (`infrastructure`): Configuration and logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```
//! use cooperative_surplus::{
//!     ContributionClaim, ImpactCategory, ImpactProjection, ImpactVector, NegotiationEngine,
//!     SurplusEngine,
//! };
//!
//! let vector = ImpactVector::new(ImpactCategory::Technical, 1.0, 1.0, (0.8, 1.2))?;
//! let projection = ImpactProjection::new("t1", vector, 100.0, 10.0, (80.0, 120.0));
//!
//! let pool = SurplusEngine::default().calculate_cluster_surplus("c1", &[projection]);
//!
//! let claims = vec![
//!     ContributionClaim::new("agent-a", "c1", 60.0, 5.0, 0.2)?,
//!     ContributionClaim::new("agent-b", "c1", 40.0, 5.0, 0.2)?,
//! ];
//! let result = NegotiationEngine::default().negotiate_splits(&pool, &claims)?;
//! assert!((result.allocated_total() - pool.total_surplus).abs() < 1e-3);
//! # Ok::<(), cooperative_surplus::DomainError>(())
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    ClaimInput, Config, ContributionClaim, ImpactCategory, ImpactProjection, ImpactVector,
    LoggingConfig, NegotiationConfig, NegotiationResult, NegotiationRound, PatternKey,
    SurplusConfig, SurplusMetadata, SurplusPool, SynergyMetrics, SynergyParameters,
};
pub use domain::ports::SynergyTuning;
pub use domain::{DomainError, DomainResult};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{
    ClusterGraph, NegotiationEngine, RecalibrationUpdate, SurplusEngine, SynergyRecalibrator,
};
