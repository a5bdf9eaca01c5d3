//! Business Hours Port - whether operators are around right now.

use crate::domain::foundation::Timestamp;

pub trait BusinessHours: Send + Sync {
    fn is_open(&self, at: Timestamp) -> bool;

    /// Auto-reply sent once per session outside working hours.
    fn off_hours_message(&self) -> String;
}
