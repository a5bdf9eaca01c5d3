//! Storage adapters.
//!
//! In-memory implementations of the storage ports. State is process-local and
//! lost on restart.

mod in_memory_context_store;
mod in_memory_handoff_repository;

pub use in_memory_context_store::InMemoryContextStore;
pub use in_memory_handoff_repository::InMemoryHandoffRepository;
