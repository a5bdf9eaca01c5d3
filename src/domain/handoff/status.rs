//! Handoff lifecycle state machine.
//!
//! ```text
//! PENDING ──► NOTIFIED ──► ACCEPTED ──► RESOLVED
//!    │  └──────────┼──► ACCEPTED          ▲
//!    │             └───────────────────────┘
//!    └──► CANCELLED ◄── (any non-terminal)
//! ```

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Where a handoff currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HandoffStatus {
    /// Created, operators not yet told.
    Pending,
    /// Notification attempted; waiting for an operator.
    Notified,
    /// An operator took the conversation.
    Accepted,
    Resolved,
    Cancelled,
}

impl HandoffStatus {
    /// Non-terminal statuses count toward the one-active-handoff invariant.
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Waiting in the operator queue.
    pub fn is_waiting(&self) -> bool {
        matches!(self, HandoffStatus::Pending | HandoffStatus::Notified)
    }
}

impl StateMachine for HandoffStatus {
    fn valid_transitions(&self) -> Vec<Self> {
        use HandoffStatus::*;
        match self {
            Pending => vec![Notified, Accepted, Cancelled],
            Notified => vec![Accepted, Resolved, Cancelled],
            Accepted => vec![Resolved, Cancelled],
            Resolved => vec![],
            Cancelled => vec![],
        }
    }
}
