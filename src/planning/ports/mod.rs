//! Port contracts for project and task planning.
//!
//! Ports define infrastructure-agnostic interfaces used by planning services.

pub mod store;

pub use store::{
    PlanningReader, PlanningSession, PlanningStore, PlanningStoreError, PlanningStoreResult,
    RowLock, TaskFilter,
};
