//! Domain layer for the cooperative surplus economy
//!
//! This module contains the pure data model and the ports through which
//! external collaborators (recalibration, forecasting) reach the engines.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
