//! Project and task planning.
//!
//! Projects own tasks, and a task's deadline may never be later than the
//! deadline of the project it belongs to. Every mutation path (creating,
//! updating and linking tasks, rescheduling projects) funnels through the
//! single consistency rule in [`domain::check_deadline_consistency`]. The
//! module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
