//! Taskboard: project and task planning service.
//!
//! This crate manages projects and the tasks they own, enforcing one
//! cross-entity rule on every mutation: a task's deadline may never be later
//! than its project's deadline.
//!
//! # Architecture
//!
//! Taskboard follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, HTTP, etc.)
//!
//! # Modules
//!
//! - [`planning`]: Projects, tasks and deadline consistency
//! - [`http`]: JSON-over-HTTP transport for the planning services
//! - [`config`]: Environment-driven runtime configuration
//! - [`telemetry`]: Structured logging bootstrap

pub mod config;
pub mod http;
pub mod planning;
pub mod telemetry;
