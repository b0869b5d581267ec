//! CLI command implementations.

pub mod negotiate;
pub mod settle;
pub mod surplus;
