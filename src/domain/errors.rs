//! Domain errors for the cooperative surplus economy.

use thiserror::Error;

/// Domain-level errors raised when constructing inputs or running a negotiation.
///
/// Surplus computation never fails: degenerate clusters map to neutral values.
/// Everything here is either a fail-fast construction check or the one
/// negotiation precondition (unique agent ids).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    #[error("Invalid impact magnitude: {0} (must be finite and greater than zero)")]
    InvalidMagnitude(f64),

    #[error("Invalid time horizon: {0} (must be finite and non-negative)")]
    InvalidTimeHorizon(f64),

    #[error("Invalid uncertainty bounds: ({low}, {high}) (must be finite with low <= high)")]
    InvalidUncertaintyBounds { low: f64, high: f64 },

    #[error("Unknown impact category: {0}")]
    UnknownCategory(String),

    #[error("Invalid contribution claim for agent '{agent_id}': {reason}")]
    InvalidClaim { agent_id: String, reason: String },

    #[error("Duplicate agent in negotiation: {0}")]
    DuplicateAgent(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_offending_values() {
        let err = DomainError::InvalidUncertaintyBounds {
            low: 5.0,
            high: 1.0,
        };
        assert_eq!(
            err.to_string(),
            "Invalid uncertainty bounds: (5, 1) (must be finite with low <= high)"
        );

        let err = DomainError::DuplicateAgent("agent-a".to_string());
        assert_eq!(err.to_string(), "Duplicate agent in negotiation: agent-a");
    }
}
