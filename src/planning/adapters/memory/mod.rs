//! In-memory adapters for planning persistence.

mod store;

pub use store::InMemoryPlanningStore;
