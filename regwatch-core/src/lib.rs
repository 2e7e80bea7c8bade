//! Core types and service wiring for the regwatch registration expiration engine.

/// Month and status counts over record batches.
pub mod aggregate;
/// Engine tunables.
pub mod config;
/// Single-record evaluation.
pub mod engine;
/// Expiration date calculation.
pub mod expiration;
/// Domain models and identifiers shared by all sources.
pub mod model;
/// Coding digit extraction from plate identifiers.
pub mod plate;
/// Registry for plugging schedule sources into the service.
pub mod plugin;
/// Traits describing schedule sources.
pub mod ports;
/// Renewal schedule table.
pub mod schedule;
/// High-level service facade used by clients.
pub mod service;
/// Registration status classification.
pub mod status;

pub use aggregate::*;
pub use config::*;
pub use engine::*;
pub use expiration::*;
pub use model::*;
pub use plate::*;
pub use plugin::*;
pub use ports::*;
pub use schedule::*;
pub use service::*;
pub use status::*;
