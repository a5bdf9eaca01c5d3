//! Handoff state machine service.
//!
//! Owns the handoff lifecycle and the conversation mode that follows it:
//! opening a handoff flips the conversation to human mode, resolving with
//! `return_to_ai` or cancelling flips it back.
//!
//! Methods here do not take the conversation lock. Callers already inside a
//! conversation's critical section (the orchestrator) call them directly;
//! everyone else goes through the orchestrator's locked wrappers.

use std::sync::Arc;
use std::time::Duration;

use crate::config::HandoffConfig;
use crate::domain::context::{ContextUpdate, ConversationContext, ConversationMode};
use crate::domain::foundation::{ConversationId, HandoffId, Timestamp};
use crate::domain::handoff::{
    Handoff, HandoffError, HandoffReason, HandoffStats, Priority, Resolution, StallingCatalog,
    StatsPeriod,
};
use crate::ports::{ContextStore, HandoffRepository, Notifier};

/// What the customer is told when a handoff opens.
#[derive(Debug, Clone, PartialEq)]
pub struct InitiatedHandoff {
    pub handoff_id: HandoffId,
    pub stalling_message: String,
    pub estimated_wait: Duration,
    /// False when an active handoff already existed and was reused.
    pub created: bool,
}

pub struct HandoffStateMachine {
    repository: Arc<dyn HandoffRepository>,
    contexts: Arc<dyn ContextStore>,
    notifier: Arc<dyn Notifier>,
    stalling: StallingCatalog,
    estimated_wait: Duration,
    max_wait_before_escalation_secs: u64,
}

impl HandoffStateMachine {
    pub fn new(
        repository: Arc<dyn HandoffRepository>,
        contexts: Arc<dyn ContextStore>,
        notifier: Arc<dyn Notifier>,
        stalling: StallingCatalog,
        config: &HandoffConfig,
    ) -> Self {
        Self {
            repository,
            contexts,
            notifier,
            stalling,
            estimated_wait: config.estimated_wait(),
            max_wait_before_escalation_secs: config.max_wait_before_escalation_secs,
        }
    }

    /// Opens a handoff, or returns the conversation's active one.
    ///
    /// A notification failure is logged; the handoff still becomes NOTIFIED.
    pub async fn initiate_handoff(
        &self,
        conversation_id: &ConversationId,
        reason: HandoffReason,
        context_snapshot: ConversationContext,
    ) -> Result<InitiatedHandoff, HandoffError> {
        if let Some(existing) = self
            .repository
            .find_active_by_conversation(conversation_id)
            .await?
        {
            tracing::info!(
                %conversation_id,
                handoff_id = %existing.id,
                ignored_reason = %reason.kind,
                "Handoff already active, reusing"
            );
            self.set_mode(conversation_id, ConversationMode::Human, Some(existing.id))
                .await?;
            return Ok(InitiatedHandoff {
                handoff_id: existing.id,
                stalling_message: self.stalling.pick(existing.reason.kind),
                estimated_wait: self.estimated_wait,
                created: false,
            });
        }

        let now = Timestamp::now();
        let mut handoff = Handoff::new(reason, context_snapshot, now);
        self.repository.save(&handoff).await?;
        self.set_mode(conversation_id, ConversationMode::Human, Some(handoff.id))
            .await?;

        tracing::info!(
            %conversation_id,
            handoff_id = %handoff.id,
            reason = %handoff.reason.kind,
            priority = %handoff.priority,
            detected_by = %handoff.reason.detected_by,
            "Handoff initiated"
        );

        self.send_notification(&handoff, handoff.priority).await;
        handoff.mark_notified(Timestamp::now())?;
        self.repository.save(&handoff).await?;

        Ok(InitiatedHandoff {
            handoff_id: handoff.id,
            stalling_message: self.stalling.pick(handoff.reason.kind),
            estimated_wait: self.estimated_wait,
            created: true,
        })
    }

    pub async fn accept_handoff(
        &self,
        handoff_id: &HandoffId,
        manager_id: &str,
    ) -> Result<Handoff, HandoffError> {
        let mut handoff = self.load(handoff_id).await?;
        handoff.accept(manager_id, Timestamp::now())?;
        self.repository.save(&handoff).await?;

        tracing::info!(handoff_id = %handoff.id, manager_id, "Handoff accepted");
        Ok(handoff)
    }

    pub async fn resolve_handoff(
        &self,
        handoff_id: &HandoffId,
        resolution: Resolution,
    ) -> Result<Handoff, HandoffError> {
        let mut handoff = self.load(handoff_id).await?;
        let return_to_ai = resolution.return_to_ai;
        handoff.resolve(resolution, Timestamp::now())?;
        self.repository.save(&handoff).await?;

        let mode = if return_to_ai {
            ConversationMode::Ai
        } else {
            ConversationMode::Human
        };
        self.set_mode(&handoff.conversation_id, mode, None).await?;

        tracing::info!(handoff_id = %handoff.id, return_to_ai, "Handoff resolved");
        Ok(handoff)
    }

    /// Withdraws a handoff; the conversation goes back to the agent.
    pub async fn cancel_handoff(&self, handoff_id: &HandoffId) -> Result<Handoff, HandoffError> {
        let mut handoff = self.load(handoff_id).await?;
        handoff.cancel(Timestamp::now())?;
        self.repository.save(&handoff).await?;
        self.set_mode(&handoff.conversation_id, ConversationMode::Ai, None)
            .await?;

        tracing::info!(handoff_id = %handoff.id, "Handoff cancelled");
        Ok(handoff)
    }

    /// PENDING and NOTIFIED handoffs, most urgent first, oldest first within a tier.
    pub async fn get_pending_handoffs(&self) -> Result<Vec<Handoff>, HandoffError> {
        let mut pending: Vec<Handoff> = self
            .repository
            .list_active()
            .await?
            .into_iter()
            .filter(|h| h.status.is_waiting())
            .collect();
        sort_queue(&mut pending);
        Ok(pending)
    }

    pub async fn get_handoff_stats(&self, period: StatsPeriod) -> Result<HandoffStats, HandoffError> {
        let all = self.repository.list_all().await?;
        Ok(HandoffStats::compute(&all, period, Timestamp::now()))
    }

    pub async fn get_active_handoff(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Option<Handoff>, HandoffError> {
        self.repository
            .find_active_by_conversation(conversation_id)
            .await
    }

    pub async fn get_handoff(&self, handoff_id: &HandoffId) -> Result<Handoff, HandoffError> {
        self.load(handoff_id).await
    }

    /// Candidates for escalation at `now`. A snapshot only: check each again
    /// with [`Self::escalate_if_overdue`] under the conversation's lock.
    pub async fn overdue_handoffs(&self, now: Timestamp) -> Result<Vec<Handoff>, HandoffError> {
        Ok(self
            .repository
            .list_active()
            .await?
            .into_iter()
            .filter(|h| h.is_overdue(now, self.max_wait_before_escalation_secs))
            .collect())
    }

    /// Re-sends one overdue handoff at URGENT priority.
    ///
    /// Reloads the handoff first; returns `false` when it was accepted,
    /// closed or already escalated in the meantime.
    pub async fn escalate_if_overdue(
        &self,
        handoff_id: &HandoffId,
        now: Timestamp,
    ) -> Result<bool, HandoffError> {
        let mut handoff = self.load(handoff_id).await?;
        if !handoff.is_overdue(now, self.max_wait_before_escalation_secs) {
            return Ok(false);
        }

        handoff.escalate();
        self.repository.save(&handoff).await?;
        tracing::warn!(
            handoff_id = %handoff.id,
            conversation_id = %handoff.conversation_id,
            "Handoff overdue, escalating"
        );
        self.send_notification(&handoff, Priority::Urgent).await;
        Ok(true)
    }

    async fn load(&self, handoff_id: &HandoffId) -> Result<Handoff, HandoffError> {
        self.repository
            .find_by_id(handoff_id)
            .await?
            .ok_or(HandoffError::NotFound(*handoff_id))
    }

    async fn send_notification(&self, handoff: &Handoff, priority: Priority) {
        let message = notification_text(handoff);
        if let Err(e) = self.notifier.notify(&message, priority).await {
            tracing::warn!(
                handoff_id = %handoff.id,
                conversation_id = %handoff.conversation_id,
                error = %e,
                "Operator notification failed"
            );
        }
    }

    async fn set_mode(
        &self,
        conversation_id: &ConversationId,
        mode: ConversationMode,
        active_handoff: Option<HandoffId>,
    ) -> Result<(), HandoffError> {
        let update = ContextUpdate::mode(mode).with_active_handoff(active_handoff);
        let updated = self
            .contexts
            .update(conversation_id, update)
            .await
            .map_err(|e| HandoffError::Storage(e.to_string()))?;
        if updated.is_none() {
            tracing::debug!(%conversation_id, "No context to switch mode on");
        }
        Ok(())
    }
}

/// Queue order: priority rank, then initiation time.
pub fn sort_queue(handoffs: &mut [Handoff]) {
    handoffs.sort_by(|a, b| {
        a.priority
            .rank()
            .cmp(&b.priority.rank())
            .then_with(|| a.initiated_at.cmp(&b.initiated_at))
    });
}

fn notification_text(handoff: &Handoff) -> String {
    let last_message = handoff
        .context_snapshot
        .last_user_message()
        .map(|m| m.text.as_str())
        .unwrap_or("-");
    format!(
        "[{}] {}: {}\nConversation: {} ({})\nLast message: {}\nDetected by: {}",
        handoff.priority,
        handoff.reason.kind,
        handoff.reason.description,
        handoff.conversation_id,
        handoff.context_snapshot.platform,
        last_message,
        handoff.reason.detected_by,
    )
}
