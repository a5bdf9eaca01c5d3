//! Fixed weekly business hours at a fixed UTC offset.

use chrono::{Datelike, Timelike, Weekday};

use crate::domain::foundation::Timestamp;
use crate::ports::BusinessHours;

#[derive(Debug, Clone)]
pub struct FixedBusinessHours {
    /// Hours east of UTC (Moscow is +3).
    pub utc_offset_hours: i32,
    /// Opening hour, inclusive.
    pub open_hour: u32,
    /// Closing hour, exclusive.
    pub close_hour: u32,
    pub working_days: Vec<Weekday>,
    pub message: String,
}

impl Default for FixedBusinessHours {
    fn default() -> Self {
        Self {
            utc_offset_hours: 3,
            open_hour: 9,
            close_hour: 21,
            working_days: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
                Weekday::Sat,
            ],
            message: "Сейчас мы не на связи, но обязательно ответим утром. \
                      Оставьте, пожалуйста, свой вопрос."
                .to_string(),
        }
    }
}

impl FixedBusinessHours {
    /// Open around the clock.
    pub fn always_open() -> Self {
        Self {
            open_hour: 0,
            close_hour: 24,
            working_days: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
                Weekday::Sat,
                Weekday::Sun,
            ],
            ..Self::default()
        }
    }
}

impl BusinessHours for FixedBusinessHours {
    fn is_open(&self, at: Timestamp) -> bool {
        let local = at.at_offset_hours(self.utc_offset_hours);
        self.working_days.contains(&local.weekday())
            && local.hour() >= self.open_hour
            && local.hour() < self.close_hour
    }

    fn off_hours_message(&self) -> String {
        self.message.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-01-01 was a Monday.
    const MONDAY_MIDNIGHT_UTC: u64 = 1_704_067_200;

    fn at_utc(hours_after_monday: u64) -> Timestamp {
        Timestamp::from_unix_secs(MONDAY_MIDNIGHT_UTC + hours_after_monday * 3600)
    }

    #[test]
    fn open_during_local_working_hours() {
        let hours = FixedBusinessHours::default();
        // 07:00 UTC is 10:00 in Moscow.
        assert!(hours.is_open(at_utc(7)));
        // 19:00 UTC is 22:00 in Moscow.
        assert!(!hours.is_open(at_utc(19)));
    }

    #[test]
    fn closed_on_sunday() {
        let hours = FixedBusinessHours::default();
        assert!(!hours.is_open(at_utc(6 * 24 + 8)));
    }

    #[test]
    fn always_open_is_open_at_night() {
        assert!(FixedBusinessHours::always_open().is_open(at_utc(6 * 24 + 23)));
    }
}
