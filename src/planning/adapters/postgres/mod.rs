//! `PostgreSQL` adapters for planning persistence.

mod models;
mod schema;
mod store;

pub use store::{PlanningPgPool, PostgresPlanningStore};
