//! Handoff statistics over a reporting window.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::{Timestamp, ValidationError};

use super::{Handoff, HandoffReasonKind, HandoffStatus, Priority};

/// Reporting window, measured back from "now" against `initiated_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatsPeriod {
    #[default]
    Day,
    Week,
    Month,
    All,
}

impl StatsPeriod {
    /// Earliest included `initiated_at`, or `None` for all time.
    pub fn cutoff(&self, now: Timestamp) -> Option<Timestamp> {
        match self {
            StatsPeriod::Day => Some(now.minus_days(1)),
            StatsPeriod::Week => Some(now.minus_days(7)),
            StatsPeriod::Month => Some(now.minus_days(30)),
            StatsPeriod::All => None,
        }
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.trim().to_lowercase().as_str() {
            "day" => Ok(StatsPeriod::Day),
            "week" => Ok(StatsPeriod::Week),
            "month" => Ok(StatsPeriod::Month),
            "all" => Ok(StatsPeriod::All),
            other => Err(ValidationError::invalid_format(
                "period",
                format!("expected day, week, month or all, got '{}'", other),
            )),
        }
    }
}

/// Aggregated view of handoffs in a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandoffStats {
    pub period: StatsPeriod,
    pub total: usize,
    pub by_status: BTreeMap<HandoffStatus, usize>,
    pub by_reason: BTreeMap<HandoffReasonKind, usize>,
    pub by_priority: BTreeMap<Priority, usize>,
    /// Mean `accepted_at - notified_at`, seconds.
    pub avg_response_time_secs: Option<f64>,
    /// Mean `resolved_at - initiated_at`, seconds.
    pub avg_resolution_time_secs: Option<f64>,
    pub resolved: usize,
    pub returned_to_ai: usize,
    /// `resolved / total`, 0 when empty.
    pub success_rate: f64,
}

impl HandoffStats {
    pub fn compute<'a>(
        handoffs: impl IntoIterator<Item = &'a Handoff>,
        period: StatsPeriod,
        now: Timestamp,
    ) -> Self {
        let cutoff = period.cutoff(now);
        let mut stats = HandoffStats {
            period,
            total: 0,
            by_status: BTreeMap::new(),
            by_reason: BTreeMap::new(),
            by_priority: BTreeMap::new(),
            avg_response_time_secs: None,
            avg_resolution_time_secs: None,
            resolved: 0,
            returned_to_ai: 0,
            success_rate: 0.0,
        };

        let mut response_times = Vec::new();
        let mut resolution_times = Vec::new();

        for handoff in handoffs {
            if let Some(cutoff) = cutoff {
                if handoff.initiated_at.is_before(&cutoff) {
                    continue;
                }
            }
            stats.total += 1;
            *stats.by_status.entry(handoff.status).or_default() += 1;
            *stats.by_reason.entry(handoff.reason.kind).or_default() += 1;
            *stats.by_priority.entry(handoff.priority).or_default() += 1;

            if let Some(d) = handoff.response_time() {
                response_times.push(d.num_milliseconds() as f64 / 1000.0);
            }
            if let Some(d) = handoff.resolution_time() {
                resolution_times.push(d.num_milliseconds() as f64 / 1000.0);
            }
            if handoff.status == HandoffStatus::Resolved {
                stats.resolved += 1;
            }
            if handoff.returned_to_ai() {
                stats.returned_to_ai += 1;
            }
        }

        stats.avg_response_time_secs = mean(&response_times);
        stats.avg_resolution_time_secs = mean(&resolution_times);
        if stats.total > 0 {
            stats.success_rate = stats.resolved as f64 / stats.total as f64;
        }
        stats
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::context::{ContextDefaults, ConversationContext};
    use crate::domain::foundation::{ConversationId, UserId};
    use crate::domain::handoff::{HandoffReason, Resolution, Severity};

    const DAY: u64 = 86_400;

    fn handoff_at(secs: u64, kind: HandoffReasonKind, severity: Severity) -> Handoff {
        let defaults = ContextDefaults::new(UserId::unknown(), "web", 3600);
        let ctx = ConversationContext::new(
            ConversationId::new(format!("c-{}", secs)).unwrap(),
            &defaults,
            Timestamp::from_unix_secs(secs),
        );
        Handoff::new(
            HandoffReason::new(kind, "test", severity, "test"),
            ctx,
            Timestamp::from_unix_secs(secs),
        )
    }

    #[test]
    fn period_parse_accepts_known_names() {
        assert_eq!(StatsPeriod::parse("Week").unwrap(), StatsPeriod::Week);
        assert!(StatsPeriod::parse("year").is_err());
    }

    #[test]
    fn compute_filters_by_window_and_aggregates() {
        let now = Timestamp::from_unix_secs(10 * DAY);

        let old = handoff_at(2 * DAY, HandoffReasonKind::Profanity, Severity::High);

        let mut resolved = handoff_at(10 * DAY - 1000, HandoffReasonKind::AiProbing, Severity::High);
        resolved.mark_notified(Timestamp::from_unix_secs(10 * DAY - 990)).unwrap();
        resolved.accept("m", Timestamp::from_unix_secs(10 * DAY - 930)).unwrap();
        resolved
            .resolve(Resolution::return_to_ai(), Timestamp::from_unix_secs(10 * DAY - 800))
            .unwrap();

        let pending = handoff_at(10 * DAY - 500, HandoffReasonKind::AiProbing, Severity::Critical);

        let all = vec![old, resolved, pending];
        let stats = HandoffStats::compute(&all, StatsPeriod::Day, now);

        assert_eq!(stats.total, 2);
        assert_eq!(stats.by_reason.get(&HandoffReasonKind::AiProbing), Some(&2));
        assert_eq!(stats.by_reason.get(&HandoffReasonKind::Profanity), None);
        assert_eq!(stats.by_priority.get(&Priority::Urgent), Some(&1));
        assert_eq!(stats.avg_response_time_secs, Some(60.0));
        assert_eq!(stats.avg_resolution_time_secs, Some(200.0));
        assert_eq!(stats.resolved, 1);
        assert_eq!(stats.returned_to_ai, 1);
        assert!((stats.success_rate - 0.5).abs() < f64::EPSILON);

        let all_time = HandoffStats::compute(&all, StatsPeriod::All, now);
        assert_eq!(all_time.total, 3);
    }

    #[test]
    fn empty_input_has_no_averages() {
        let stats = HandoffStats::compute(Vec::<Handoff>::new().iter(), StatsPeriod::All, Timestamp::now());
        assert_eq!(stats.total, 0);
        assert_eq!(stats.avg_response_time_secs, None);
        assert_eq!(stats.success_rate, 0.0);
    }
}
