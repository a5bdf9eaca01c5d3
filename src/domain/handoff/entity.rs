//! The Handoff aggregate.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::domain::context::ConversationContext;
use crate::domain::foundation::{ConversationId, HandoffId, StateMachine, Timestamp, UserId};

use super::{HandoffError, HandoffReason, HandoffStatus, Priority};

/// Operator's closing note for a handoff.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Resolution {
    pub summary: Option<String>,
    /// Give the conversation back to the automated agent.
    pub return_to_ai: bool,
}

impl Resolution {
    pub fn new(summary: Option<String>, return_to_ai: bool) -> Self {
        Self {
            summary,
            return_to_ai,
        }
    }

    pub fn return_to_ai() -> Self {
        Self::new(None, true)
    }

    pub fn keep_human() -> Self {
        Self::new(None, false)
    }
}

/// One escalation of a conversation to a human operator.
///
/// Never deleted; terminal handoffs feed statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Handoff {
    pub id: HandoffId,
    pub conversation_id: ConversationId,
    pub user_id: UserId,
    pub reason: HandoffReason,
    /// Copy of the context at initiation time.
    pub context_snapshot: ConversationContext,
    pub initiated_at: Timestamp,
    pub notified_at: Option<Timestamp>,
    pub accepted_at: Option<Timestamp>,
    pub accepted_by: Option<String>,
    pub assigned_to: Option<String>,
    pub resolved_at: Option<Timestamp>,
    pub resolution: Option<Resolution>,
    pub cancelled_at: Option<Timestamp>,
    pub status: HandoffStatus,
    pub priority: Priority,
    /// Set once an overdue handoff has been re-sent at urgent priority.
    pub escalated: bool,
}

impl Handoff {
    /// Opens a PENDING handoff. Priority follows the reason's severity.
    pub fn new(reason: HandoffReason, context_snapshot: ConversationContext, now: Timestamp) -> Self {
        let priority = reason.priority();
        Self {
            id: HandoffId::new(),
            conversation_id: context_snapshot.conversation_id.clone(),
            user_id: context_snapshot.user_id.clone(),
            reason,
            context_snapshot,
            initiated_at: now,
            notified_at: None,
            accepted_at: None,
            accepted_by: None,
            assigned_to: None,
            resolved_at: None,
            resolution: None,
            cancelled_at: None,
            status: HandoffStatus::Pending,
            priority,
            escalated: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn mark_notified(&mut self, now: Timestamp) -> Result<(), HandoffError> {
        self.transition(HandoffStatus::Notified)?;
        self.notified_at = Some(now);
        Ok(())
    }

    pub fn accept(&mut self, manager_id: impl Into<String>, now: Timestamp) -> Result<(), HandoffError> {
        self.transition(HandoffStatus::Accepted)?;
        let manager_id = manager_id.into();
        self.accepted_at = Some(now);
        self.assigned_to = Some(manager_id.clone());
        self.accepted_by = Some(manager_id);
        Ok(())
    }

    pub fn resolve(&mut self, resolution: Resolution, now: Timestamp) -> Result<(), HandoffError> {
        self.transition(HandoffStatus::Resolved)?;
        self.resolved_at = Some(now);
        self.resolution = Some(resolution);
        Ok(())
    }

    pub fn cancel(&mut self, now: Timestamp) -> Result<(), HandoffError> {
        self.transition(HandoffStatus::Cancelled)?;
        self.cancelled_at = Some(now);
        Ok(())
    }

    /// Bumps the handoff to the front of the queue.
    pub fn escalate(&mut self) {
        self.priority = Priority::Urgent;
        self.escalated = true;
    }

    /// Notified, unanswered and waiting longer than `max_wait_secs`.
    pub fn is_overdue(&self, now: Timestamp, max_wait_secs: u64) -> bool {
        if self.status != HandoffStatus::Notified || self.escalated {
            return false;
        }
        let since = self.notified_at.unwrap_or(self.initiated_at);
        now.duration_since(&since) >= Duration::seconds(max_wait_secs as i64)
    }

    /// Time from notification to acceptance.
    pub fn response_time(&self) -> Option<Duration> {
        match (self.notified_at, self.accepted_at) {
            (Some(notified), Some(accepted)) => Some(accepted.duration_since(&notified)),
            _ => None,
        }
    }

    /// Time from initiation to resolution.
    pub fn resolution_time(&self) -> Option<Duration> {
        self.resolved_at
            .map(|resolved| resolved.duration_since(&self.initiated_at))
    }

    pub fn returned_to_ai(&self) -> bool {
        self.resolution.as_ref().is_some_and(|r| r.return_to_ai)
    }

    fn transition(&mut self, to: HandoffStatus) -> Result<(), HandoffError> {
        self.status = self
            .status
            .transition_to(to)
            .map_err(|_| HandoffError::InvalidTransition {
                from: self.status,
                to,
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::context::ContextDefaults;
    use crate::domain::handoff::{HandoffReasonKind, Severity};

    fn snapshot() -> ConversationContext {
        let defaults = ContextDefaults::new(UserId::new("u-1").unwrap(), "web", 3600);
        ConversationContext::new(
            ConversationId::new("c-1").unwrap(),
            &defaults,
            Timestamp::from_unix_secs(0),
        )
    }

    fn handoff(severity: Severity) -> Handoff {
        let reason = HandoffReason::new(
            HandoffReasonKind::ComplexQuery,
            "too many requirements",
            severity,
            "complexity",
        );
        Handoff::new(reason, snapshot(), Timestamp::from_unix_secs(100))
    }

    #[test]
    fn new_handoff_is_pending_with_mapped_priority() {
        let h = handoff(Severity::Critical);
        assert_eq!(h.status, HandoffStatus::Pending);
        assert_eq!(h.priority, Priority::Urgent);
        assert_eq!(h.conversation_id.as_str(), "c-1");
    }

    #[test]
    fn full_lifecycle_records_timestamps() {
        let mut h = handoff(Severity::Medium);
        h.mark_notified(Timestamp::from_unix_secs(110)).unwrap();
        h.accept("manager-7", Timestamp::from_unix_secs(170)).unwrap();
        h.resolve(Resolution::return_to_ai(), Timestamp::from_unix_secs(400))
            .unwrap();

        assert_eq!(h.status, HandoffStatus::Resolved);
        assert_eq!(h.accepted_by.as_deref(), Some("manager-7"));
        assert_eq!(h.response_time(), Some(Duration::seconds(60)));
        assert_eq!(h.resolution_time(), Some(Duration::seconds(300)));
        assert!(h.returned_to_ai());
    }

    #[test]
    fn resolving_a_cancelled_handoff_fails() {
        let mut h = handoff(Severity::Low);
        h.cancel(Timestamp::from_unix_secs(101)).unwrap();
        let err = h
            .resolve(Resolution::keep_human(), Timestamp::from_unix_secs(102))
            .unwrap_err();
        assert_eq!(
            err,
            HandoffError::InvalidTransition {
                from: HandoffStatus::Cancelled,
                to: HandoffStatus::Resolved,
            }
        );
    }

    #[test]
    fn overdue_only_when_notified_and_waiting_long_enough() {
        let mut h = handoff(Severity::Low);
        assert!(!h.is_overdue(Timestamp::from_unix_secs(10_000), 60));

        h.mark_notified(Timestamp::from_unix_secs(100)).unwrap();
        assert!(!h.is_overdue(Timestamp::from_unix_secs(150), 60));
        assert!(h.is_overdue(Timestamp::from_unix_secs(160), 60));

        h.escalate();
        assert_eq!(h.priority, Priority::Urgent);
        assert!(!h.is_overdue(Timestamp::from_unix_secs(500), 60));
    }
}
