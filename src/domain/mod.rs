//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, state machine trait)
//! - `context` - Per-conversation state: mode, mood, bounded history
//! - `detection` - Situation detector and the ordered handoff rules
//! - `handoff` - Handoff entity, lifecycle, stalling messages and statistics

pub mod context;
pub mod detection;
pub mod foundation;
pub mod handoff;
