//! Office Concierge - chat support automation for an office-rental business.
//!
//! Answers customer messages with an AI model grounded in a knowledge base,
//! watches every conversation for situations a bot should not handle, and
//! hands those over to a human operator with a ranked queue.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
