//! Why a conversation was escalated, and how urgently.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of an escalation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HandoffReasonKind {
    AiProbing,
    ComplexQuery,
    EmotionalEscalation,
    LowConfidence,
    ClientRequest,
    TechnicalIssue,
    Profanity,
    PromptInjection,
    MediaRequest,
    ViewingRequest,
    ClientNearby,
    PurchaseSale,
    SubleaseLongTerm,
    OfficeCustomization,
    FlaggedContact,
    OffTopic,
    AiDeclared,
}

impl HandoffReasonKind {
    pub const ALL: [HandoffReasonKind; 17] = [
        HandoffReasonKind::AiProbing,
        HandoffReasonKind::ComplexQuery,
        HandoffReasonKind::EmotionalEscalation,
        HandoffReasonKind::LowConfidence,
        HandoffReasonKind::ClientRequest,
        HandoffReasonKind::TechnicalIssue,
        HandoffReasonKind::Profanity,
        HandoffReasonKind::PromptInjection,
        HandoffReasonKind::MediaRequest,
        HandoffReasonKind::ViewingRequest,
        HandoffReasonKind::ClientNearby,
        HandoffReasonKind::PurchaseSale,
        HandoffReasonKind::SubleaseLongTerm,
        HandoffReasonKind::OfficeCustomization,
        HandoffReasonKind::FlaggedContact,
        HandoffReasonKind::OffTopic,
        HandoffReasonKind::AiDeclared,
    ];

    /// Wire name, identical to the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            HandoffReasonKind::AiProbing => "AI_PROBING",
            HandoffReasonKind::ComplexQuery => "COMPLEX_QUERY",
            HandoffReasonKind::EmotionalEscalation => "EMOTIONAL_ESCALATION",
            HandoffReasonKind::LowConfidence => "LOW_CONFIDENCE",
            HandoffReasonKind::ClientRequest => "CLIENT_REQUEST",
            HandoffReasonKind::TechnicalIssue => "TECHNICAL_ISSUE",
            HandoffReasonKind::Profanity => "PROFANITY",
            HandoffReasonKind::PromptInjection => "PROMPT_INJECTION",
            HandoffReasonKind::MediaRequest => "MEDIA_REQUEST",
            HandoffReasonKind::ViewingRequest => "VIEWING_REQUEST",
            HandoffReasonKind::ClientNearby => "CLIENT_NEARBY",
            HandoffReasonKind::PurchaseSale => "PURCHASE_SALE",
            HandoffReasonKind::SubleaseLongTerm => "SUBLEASE_LONG_TERM",
            HandoffReasonKind::OfficeCustomization => "OFFICE_CUSTOMIZATION",
            HandoffReasonKind::FlaggedContact => "FLAGGED_CONTACT",
            HandoffReasonKind::OffTopic => "OFF_TOPIC",
            HandoffReasonKind::AiDeclared => "AI_DECLARED",
        }
    }

    /// Parses the wire name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        let upper = s.trim().to_uppercase();
        Self::ALL.into_iter().find(|k| k.as_str() == upper)
    }
}

impl fmt::Display for HandoffReasonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How serious the triggering signal is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// Position of a handoff in the operator queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Low,
    Normal,
    High,
    Urgent,
}

impl Priority {
    /// Queue rank, lower is served first.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Urgent => 0,
            Priority::High => 1,
            Priority::Normal => 2,
            Priority::Low => 3,
        }
    }
}

impl From<Severity> for Priority {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Critical => Priority::Urgent,
            Severity::High => Priority::High,
            Severity::Medium => Priority::Normal,
            Severity::Low => Priority::Low,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::Low => "LOW",
            Priority::Normal => "NORMAL",
            Priority::High => "HIGH",
            Priority::Urgent => "URGENT",
        };
        write!(f, "{}", s)
    }
}

/// Auditable explanation attached to every handoff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffReason {
    pub kind: HandoffReasonKind,
    /// Human-readable summary for the operator.
    pub description: String,
    pub severity: Severity,
    /// Name of the detector or pipeline stage that fired.
    pub detected_by: String,
}

impl HandoffReason {
    pub fn new(
        kind: HandoffReasonKind,
        description: impl Into<String>,
        severity: Severity,
        detected_by: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            description: description.into(),
            severity,
            detected_by: detected_by.into(),
        }
    }

    pub fn priority(&self) -> Priority {
        self.severity.into()
    }
}
