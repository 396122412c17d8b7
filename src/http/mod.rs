//! JSON-over-HTTP transport for the planning services.
//!
//! Maps routes onto [`crate::planning::services`] calls and service outcomes
//! onto status codes:
//!
//! - missing entities become `404` naming the entity type
//! - deadline violations become `400` with the exact rule wording
//! - malformed input (body, path or query) becomes `422`
//!
//! Every error body has the shape `{"detail": "<message>"}`.

pub mod dto;
mod error;
mod extract;
mod meta;
mod projects;
mod router;
mod state;
mod tasks;

pub use error::{ApiError, ErrorBody};
pub use router::{API_PREFIX, router};
pub use state::AppState;
