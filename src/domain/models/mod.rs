pub mod claim;
pub mod config;
pub mod impact;
pub mod negotiation;
pub mod surplus;

pub use claim::{ClaimInput, ContributionClaim};
pub use config::{Config, LoggingConfig, NegotiationConfig, SurplusConfig};
pub use impact::{ImpactCategory, ImpactProjection, ImpactVector, AGENT_ROLE_KEY};
pub use negotiation::{NegotiationResult, NegotiationRound};
pub use surplus::{
    PatternKey, SurplusMetadata, SurplusPool, SynergyMetrics, SynergyParameters,
    MIN_SYNERGY_MULTIPLIER,
};
