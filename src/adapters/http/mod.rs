//! HTTP adapter - REST surface for platform bridges and the operator desk.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::{ApiError, DeskAppState};
pub use routes::{desk_router, handoff_routes};
