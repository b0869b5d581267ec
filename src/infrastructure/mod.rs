//! Infrastructure layer module
//!
//! Process-level concerns that sit outside the surplus and negotiation engines:
//! - Configuration management (figment)
//! - Logging infrastructure (tracing)

pub mod config;
pub mod logging;
