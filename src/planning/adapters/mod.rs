//! Adapter implementations for planning ports.

pub mod memory;
pub mod postgres;
