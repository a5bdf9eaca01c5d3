//! Handoff: transfer of a conversation from the automated agent to a human.
//!
//! The entity and its status machine live here; orchestration of mode flips,
//! notifications and persistence lives in `application::handoff`.

mod errors;
mod entity;
mod reason;
mod stalling;
mod stats;
mod status;

pub use errors::HandoffError;
pub use entity::{Handoff, Resolution};
pub use reason::{HandoffReason, HandoffReasonKind, Priority, Severity};
pub use stalling::{default_templates, StallingCatalog, FALLBACK_STALLING_MESSAGE};
pub use stats::{HandoffStats, StatsPeriod};
pub use status::HandoffStatus;
