//! Error types for the handoff lifecycle.

use crate::domain::foundation::{ConversationId, DomainError, ErrorCode, HandoffId};

use super::HandoffStatus;

/// Failures from handoff accessors. Never raised for notification problems.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum HandoffError {
    #[error("Handoff not found: {0}")]
    NotFound(HandoffId),

    #[error("Invalid handoff transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: HandoffStatus,
        to: HandoffStatus,
    },

    #[error("Conversation {conversation_id} already has active handoff {handoff_id}")]
    AlreadyActive {
        conversation_id: ConversationId,
        handoff_id: HandoffId,
    },

    #[error("Handoff storage error: {0}")]
    Storage(String),
}

impl From<HandoffError> for DomainError {
    fn from(err: HandoffError) -> Self {
        let code = match &err {
            HandoffError::NotFound(_) => ErrorCode::HandoffNotFound,
            HandoffError::InvalidTransition { .. } => ErrorCode::InvalidStateTransition,
            HandoffError::AlreadyActive { .. } => ErrorCode::HandoffAlreadyActive,
            HandoffError::Storage(_) => ErrorCode::StorageError,
        };
        DomainError::new(code, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_transition_names_both_states() {
        let err = HandoffError::InvalidTransition {
            from: HandoffStatus::Resolved,
            to: HandoffStatus::Accepted,
        };
        assert_eq!(
            err.to_string(),
            "Invalid handoff transition from Resolved to Accepted"
        );
    }

    #[test]
    fn not_found_maps_to_domain_code() {
        let err: DomainError = HandoffError::NotFound(HandoffId::new()).into();
        assert_eq!(err.code, ErrorCode::HandoffNotFound);
    }
}
