//! The per-message pipeline.
//!
//! Linear and early-returning. The caller holds the conversation lock for the
//! whole run, so every read-modify-write of the context below is atomic with
//! respect to other messages of the same conversation.

use crate::application::handoff::InitiatedHandoff;
use crate::domain::context::{ContextMessage, ContextUpdate, ConversationContext, HandledBy};
use crate::domain::detection::detect_profanity;
use crate::domain::detection::lexicon::normalize;
use crate::domain::foundation::ConversationId;
use crate::domain::handoff::{HandoffReason, HandoffReasonKind, Severity};
use crate::ports::{
    AiEngineError, Attachment, ContactCategory, ContextStoreError, GenerationRequest,
    GenerationResponse, KnowledgeItem,
};

use super::sanitize::{sanitize, strip_duplicate_greeting};
use super::types::{BotResponse, ChainedMessage, UniversalMessage};
use super::{Orchestrator, PipelineError};

/// Replies produced by one branch of the pipeline, before delivery.
struct Outgoing {
    messages: Vec<String>,
    handled_by: HandledBy,
    attachment: Option<Attachment>,
}

impl Outgoing {
    fn new(messages: Vec<String>, handled_by: HandledBy) -> Self {
        Self {
            messages,
            handled_by,
            attachment: None,
        }
    }

    fn single(message: impl Into<String>, handled_by: HandledBy) -> Self {
        Self::new(vec![message.into()], handled_by)
    }

    fn with_attachment(mut self, attachment: Option<Attachment>) -> Self {
        self.attachment = attachment;
        self
    }
}

type PipelineResult = Result<Option<BotResponse>, PipelineError>;

impl Orchestrator {
    pub(super) async fn run_pipeline(&self, message: &UniversalMessage) -> PipelineResult {
        let id = &message.conversation_id;
        let text = message.content.text_or_empty();

        // 1. Context and identity.
        let mut context = self.load_context(message).await?;

        if text.is_empty() {
            tracing::debug!(conversation_id = %id, kind = ?message.content.kind, "Message without text ignored");
            return Ok(None);
        }

        // 2. Off-hours auto-reply, once per session.
        if let Some(reply) = self.off_hours_reply(&context, message) {
            self.contexts
                .add_message(id, ContextMessage::user(text, HandledBy::System))
                .await?;
            self.apply(
                id,
                ContextUpdate {
                    off_hours_notified: Some(true),
                    ..Default::default()
                },
            )
            .await?;
            tracing::info!(conversation_id = %id, "Off-hours auto-reply sent");
            return self.deliver(id, None, Outgoing::single(reply, HandledBy::System)).await;
        }

        // 3. A human owns the conversation: keep the message for them.
        if context.is_human_mode() {
            self.contexts
                .add_message(id, ContextMessage::user(text, HandledBy::Human))
                .await?;
            tracing::debug!(conversation_id = %id, "Human mode, message stored for the operator");
            return Ok(None);
        }

        // 4. Record and restart the silence timer.
        self.contexts
            .add_message(id, ContextMessage::user(text, HandledBy::Ai))
            .await?;
        self.follow_ups
            .schedule(id, self.settings.orchestrator.follow_up_delay());
        context = self.reload(id).await?;

        // 5. Scripts.
        if let Some(script) = self.scripts.match_script(text, &context) {
            tracing::info!(conversation_id = %id, script = %script.name, "Script matched");
            if let Some(reason) = script.handoff {
                self.escalate(id, reason, &context).await?;
            }
            return self
                .deliver(id, None, Outgoing::new(script.messages, HandledBy::Script))
                .await;
        }

        // 6. Greeting; a substantive remainder is answered after it.
        let mut greeting = None;
        let mut request = text.to_string();
        if let Some(found) = self.scripts.detect_greeting(text, &context) {
            match found.remainder {
                None => {
                    return self
                        .deliver(id, None, Outgoing::single(found.reply, HandledBy::Script))
                        .await;
                }
                Some(remainder) => {
                    greeting = Some(found.reply);
                    request = remainder;
                }
            }
        }
        let text = request.as_str();

        // 7. Contact classification.
        let contact = self.classifier.classify(text, &context).await;
        if contact.category == ContactCategory::Spam {
            tracing::info!(conversation_id = %id, reason = %contact.reason, "Spam dropped");
            return Ok(None);
        }
        if contact.category.is_flagged() {
            let acknowledgement = self.acknowledge_flagged(text, &context).await;
            let reason = HandoffReason::new(
                HandoffReasonKind::FlaggedContact,
                format!("{:?} contact, {}", contact.category, contact.reason),
                Severity::Medium,
                "contact_classifier",
            );
            self.escalate(id, reason, &context).await?;
            return self
                .deliver(id, greeting, Outgoing::single(acknowledgement, HandledBy::Ai))
                .await;
        }

        // 8. Profanity: de-escalate and hand over without asking the model.
        let profanity = detect_profanity(&normalize(text));
        if profanity.detected {
            let reason = HandoffReason::new(
                HandoffReasonKind::Profanity,
                format!("Profanity: {}", profanity.terms()),
                Severity::High,
                "profanity_detector",
            );
            self.escalate(id, reason, &context).await?;
            return self
                .deliver(
                    id,
                    greeting,
                    Outgoing::new(self.scripts.de_escalation(), HandledBy::Script),
                )
                .await;
        }

        // 9. Off-topic deflection, escalated when it keeps happening.
        if self.scripts.is_off_topic(text) {
            return self.handle_off_topic(id, &context, greeting).await;
        }
        if context.off_topic_count > 0 {
            context = self
                .apply(
                    id,
                    ContextUpdate {
                        off_topic_count: Some(0),
                        ..Default::default()
                    },
                )
                .await?;
        }

        // 10-11. Situation analysis.
        let analysis = self.detector.analyze(text, &context);
        tracing::debug!(
            conversation_id = %id,
            risk = ?analysis.overall_risk,
            urgency = ?analysis.urgency,
            confidence = analysis.confidence.score,
            complexity = analysis.complexity.score,
            "Situation analysed"
        );
        if let Some(reason) = analysis.handoff_reason.clone() {
            let started = self.escalate(id, reason, &context).await?;
            return self
                .deliver(id, greeting, Outgoing::single(started.stalling_message, HandledBy::Ai))
                .await;
        }

        // 12. Remember mood and suspicion.
        let mut update = ContextUpdate {
            emotional_state: Some(analysis.emotional_state.state),
            ..Default::default()
        };
        if analysis.ai_probing.detected {
            update.suspect_ai = Some(true);
        }
        context = self.apply(id, update).await?;

        // 13-14. Grounding and attachment.
        let knowledge = self.retrieve_knowledge(id, text).await;
        let attachment = self.resources.find(text, &context.sent_resources);

        // 15. Generation with bounded retry.
        let request = GenerationRequest::new(
            text,
            context.clone(),
            knowledge,
            self.settings.orchestrator.personality.clone(),
        );
        let Some(generated) = self.generate_with_retry(id, request).await else {
            let reason = HandoffReason::new(
                HandoffReasonKind::TechnicalIssue,
                format!(
                    "AI engine failed {} attempts",
                    self.settings.retry.max_attempts
                ),
                Severity::High,
                "retry_exhausted",
            );
            self.escalate(id, reason, &context).await?;
            let reply = self.settings.retry.final_stalling_message().to_string();
            return self
                .deliver(id, greeting, Outgoing::single(reply, HandledBy::System))
                .await;
        };

        // 16. The model may announce a handoff itself.
        if let Some(reason) = self.declared_handoff(&generated) {
            let started = self.escalate(id, reason, &context).await?;
            let announced = sanitize(&generated.text);
            let reply = if announced.is_empty() {
                started.stalling_message
            } else {
                announced
            };
            return self
                .deliver(id, greeting, Outgoing::single(reply, HandledBy::Ai))
                .await;
        }

        // 17-18. Styling, clean-up, one corrective pass.
        let already_greeted = greeting.is_some() || context.has_assistant_messages();
        let mut reply = self.style(&generated.text, &context, already_greeted);
        let roboticness = self.styler.check_roboticness(&reply);
        if roboticness > self.settings.orchestrator.roboticness_threshold {
            tracing::debug!(conversation_id = %id, roboticness, "Reply sounds robotic, restyling");
            reply = self.restyle(&reply, &context);
        }
        if reply.is_empty() {
            reply = generated.text.trim().to_string();
        }

        // 19. Restart the silence timer from our reply.
        self.follow_ups
            .schedule(id, self.settings.orchestrator.follow_up_delay());

        // 20. Record and return.
        if let Some(sent) = &attachment {
            self.apply(
                id,
                ContextUpdate {
                    sent_resource: Some(sent.id.clone()),
                    ..Default::default()
                },
            )
            .await?;
        }
        self.deliver(
            id,
            greeting,
            Outgoing::single(reply, HandledBy::Ai).with_attachment(attachment),
        )
        .await
    }

    async fn load_context(
        &self,
        message: &UniversalMessage,
    ) -> Result<ConversationContext, PipelineError> {
        let id = &message.conversation_id;
        let context = self
            .contexts
            .get_or_create(id, &self.defaults_for(message))
            .await?;

        let mut update = ContextUpdate::default();
        let mut changed = false;
        if context.user_id.is_unknown() && !message.user_id.is_unknown() {
            update.user_id = Some(message.user_id.clone());
            changed = true;
        }
        let platform = message.platform.trim();
        if !platform.is_empty() && context.platform != platform {
            update.platform = Some(platform.to_string());
            changed = true;
        }
        if !changed {
            return Ok(context);
        }
        self.apply(id, update).await
    }

    fn off_hours_reply(
        &self,
        context: &ConversationContext,
        message: &UniversalMessage,
    ) -> Option<String> {
        let hours = self.business_hours.as_ref()?;
        if context.off_hours_notified || context.is_human_mode() || hours.is_open(message.timestamp) {
            return None;
        }
        Some(hours.off_hours_message())
    }

    async fn handle_off_topic(
        &self,
        id: &ConversationId,
        context: &ConversationContext,
        greeting: Option<String>,
    ) -> PipelineResult {
        let offenses = context.off_topic_count + 1;
        let limit = self.settings.orchestrator.max_off_topic_offenses;
        let escalating = offenses > limit;

        self.apply(
            id,
            ContextUpdate {
                off_topic_count: Some(if escalating { 0 } else { offenses }),
                ..Default::default()
            },
        )
        .await?;

        if !escalating {
            tracing::debug!(conversation_id = %id, offenses, "Off-topic message deflected");
            return self
                .deliver(
                    id,
                    greeting,
                    Outgoing::single(self.scripts.off_topic_reply(), HandledBy::Script),
                )
                .await;
        }

        let reason = HandoffReason::new(
            HandoffReasonKind::OffTopic,
            format!("{} off-topic messages in a row", offenses),
            Severity::Low,
            "off_topic_script",
        );
        let started = self.escalate(id, reason, context).await?;
        self.deliver(id, greeting, Outgoing::single(started.stalling_message, HandledBy::Ai))
            .await
    }

    /// Single generation attempt for partners, vendors and the like.
    async fn acknowledge_flagged(&self, text: &str, context: &ConversationContext) -> String {
        let request = GenerationRequest::new(
            text,
            context.clone(),
            Vec::new(),
            self.settings.orchestrator.personality.clone(),
        );
        match self.ai.generate(request).await {
            Ok(response) if !response.text.trim().is_empty() => sanitize(&response.text),
            Ok(_) => self.settings.orchestrator.flagged_contact_message.clone(),
            Err(e) => {
                tracing::warn!(
                    conversation_id = %context.conversation_id,
                    error = %e,
                    "Acknowledgement generation failed, using static reply"
                );
                self.settings.orchestrator.flagged_contact_message.clone()
            }
        }
    }

    /// Relevant items plus every office listing, without duplicates.
    async fn retrieve_knowledge(&self, id: &ConversationId, text: &str) -> Vec<KnowledgeItem> {
        let mut items = match self
            .knowledge
            .search(text, self.settings.orchestrator.knowledge_limit)
            .await
        {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(conversation_id = %id, error = %e, "Knowledge search failed");
                Vec::new()
            }
        };
        match self.knowledge.all_office_items().await {
            Ok(offices) => {
                for office in offices {
                    if !items.iter().any(|item| item.id == office.id) {
                        items.push(office);
                    }
                }
            }
            Err(e) => {
                tracing::warn!(conversation_id = %id, error = %e, "Office listing unavailable");
            }
        }
        items
    }

    /// `None` once every attempt failed.
    ///
    /// The stalling message of each failed attempt is logged, not sent.
    async fn generate_with_retry(
        &self,
        id: &ConversationId,
        request: GenerationRequest,
    ) -> Option<GenerationResponse> {
        let retry = &self.settings.retry;
        let max_attempts = retry.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            let result = match self.ai.generate(request.clone()).await {
                Ok(response) if response.text.trim().is_empty() => {
                    Err(AiEngineError::Parse("empty reply".to_string()))
                }
                other => other,
            };

            match result {
                Ok(response) => {
                    if attempt > 1 {
                        tracing::info!(conversation_id = %id, attempt, "Generation recovered");
                    }
                    return Some(response);
                }
                Err(e) => {
                    tracing::warn!(
                        conversation_id = %id,
                        attempt,
                        max_attempts,
                        engine = self.ai.name(),
                        error = %e,
                        stalling = retry.stalling_message(attempt),
                        "Generation attempt failed"
                    );
                    if !e.is_retryable() {
                        break;
                    }
                    if attempt < max_attempts {
                        tokio::time::sleep(retry.delay()).await;
                    }
                }
            }
        }
        None
    }

    /// The model's own flag first, then handoff phrases in its text.
    fn declared_handoff(&self, generated: &GenerationResponse) -> Option<HandoffReason> {
        if generated.requires_handoff {
            let description = generated
                .handoff_reason
                .clone()
                .unwrap_or_else(|| "Model requested a human".to_string());
            return Some(HandoffReason::new(
                HandoffReasonKind::AiDeclared,
                description,
                Severity::Medium,
                "ai_engine",
            ));
        }

        let normalized = normalize(&generated.text);
        let phrase = self
            .settings
            .orchestrator
            .handoff_phrases
            .iter()
            .find(|p| !p.trim().is_empty() && normalized.contains(&normalize(p)))?;
        Some(HandoffReason::new(
            HandoffReasonKind::AiDeclared,
            format!("Reply announces a handoff: \"{}\"", phrase),
            Severity::Medium,
            "handoff_phrase",
        ))
    }

    fn style(&self, raw: &str, context: &ConversationContext, already_greeted: bool) -> String {
        let text = if already_greeted {
            strip_duplicate_greeting(raw)
        } else {
            raw.to_string()
        };
        let text = self.styler.make_natural(&text);
        let text = self.styler.add_human_touch(&text, context);
        let text = sanitize(&text);
        self.styler
            .apply_personality(&text, &self.settings.orchestrator.personality)
    }

    fn restyle(&self, text: &str, context: &ConversationContext) -> String {
        let text = self.styler.make_natural(text);
        let text = self.styler.add_human_touch(&text, context);
        sanitize(&text)
    }

    async fn escalate(
        &self,
        id: &ConversationId,
        reason: HandoffReason,
        context: &ConversationContext,
    ) -> Result<InitiatedHandoff, PipelineError> {
        let started = self
            .handoffs
            .initiate_handoff(id, reason, context.clone())
            .await?;
        self.follow_ups.cancel(id);
        Ok(started)
    }

    /// Records every outgoing text and assembles the response.
    ///
    /// A greeting goes first; the answer follows after the greeting delay.
    async fn deliver(
        &self,
        id: &ConversationId,
        greeting: Option<String>,
        outgoing: Outgoing,
    ) -> PipelineResult {
        let greeted = greeting.is_some();
        let mut texts: Vec<(String, HandledBy)> = Vec::new();
        if let Some(greeting) = greeting {
            texts.push((greeting, HandledBy::Script));
        }
        texts.extend(
            outgoing
                .messages
                .into_iter()
                .filter(|m| !m.trim().is_empty())
                .map(|m| (m, outgoing.handled_by)),
        );

        for (text, handled_by) in &texts {
            self.contexts
                .add_message(id, ContextMessage::assistant(text, *handled_by))
                .await?;
        }

        let mut texts = texts.into_iter().map(|(text, _)| text);
        let Some(primary) = texts.next() else {
            return Ok(None);
        };
        let additional_messages = texts
            .enumerate()
            .map(|(i, text)| {
                let delay = if greeted && i == 0 {
                    self.settings.orchestrator.greeting_delay()
                } else {
                    self.styler.typing_delay(&text)
                };
                ChainedMessage { text, delay }
            })
            .collect();

        Ok(Some(BotResponse {
            typing_delay: self.styler.typing_delay(&primary),
            text: primary,
            attachment: outgoing.attachment,
            additional_messages,
        }))
    }

    async fn apply(
        &self,
        id: &ConversationId,
        update: ContextUpdate,
    ) -> Result<ConversationContext, PipelineError> {
        self.contexts
            .update(id, update)
            .await?
            .ok_or_else(|| ContextStoreError::NotFound(id.clone()).into())
    }

    async fn reload(&self, id: &ConversationId) -> Result<ConversationContext, PipelineError> {
        self.contexts
            .get(id)
            .await?
            .ok_or_else(|| ContextStoreError::NotFound(id.clone()).into())
    }
}
