use thiserror::Error;

use crate::models::DagActionType;

/// Errors surfaced by the DAG-action processing core.
///
/// Transient store failures and enforcement-hook failures are propagated to
/// the dispatcher unchanged; redelivery is the recovery path. A moot action is
/// never an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DagFlowError {
    /// The state store was unreachable or returned a malformed result.
    #[error("state store error: {0}")]
    Store(String),

    /// A deadline-enforcement hook failed while mutating persisted state.
    #[error("deadline enforcement error: {0}")]
    Enforcement(String),

    /// No processor in this crate handles the given action kind.
    #[error("no processor registered for action type {0}")]
    UnsupportedAction(DagActionType),

    /// Settings could not be loaded or deserialized.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A DAG failed structural validation at build time.
    #[error("invalid dag: {0}")]
    InvalidDag(String),
}

pub type Result<T> = std::result::Result<T, DagFlowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DagFlowError::Store("connection refused".to_string());
        assert_eq!(err.to_string(), "state store error: connection refused");

        let err = DagFlowError::UnsupportedAction(DagActionType::Launch);
        assert_eq!(
            err.to_string(),
            "no processor registered for action type launch"
        );
    }
}
