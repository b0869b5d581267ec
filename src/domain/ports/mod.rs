//! Port trait definitions (Hexagonal Architecture)
//!
//! - SynergyTuning: write access to the surplus engine's adaptive parameters
//!
//! The recalibration loop depends only on this contract, never on the engine
//! type itself.

pub mod synergy_tuning;

pub use synergy_tuning::SynergyTuning;
