//! Timer adapters.

mod follow_up;

pub use follow_up::TokioFollowUpScheduler;
