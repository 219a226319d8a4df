//! Infrastructure adapters and runtime bootstrap.

pub mod api;
pub mod error;
pub mod history;
pub mod telemetry;
