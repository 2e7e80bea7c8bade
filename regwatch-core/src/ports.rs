//! Traits describing schedule sources and shared helper types.

use std::io::Error as IoError;

use async_trait::async_trait;
use reqwest::Error as ReqwestError;

use crate::model::SourceMeta;
use crate::schedule::{RenewalScheduleTable, ScheduleError};

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while loading a renewal schedule.
pub enum PortError {
    /// Network layer failed.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// Reading a local schedule failed.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),
    /// The schedule document could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),
    /// The decoded rows do not form a complete schedule.
    #[error("Invalid schedule: {0}")]
    Schedule(#[from] ScheduleError),
    /// No plugin is registered under the requested id.
    #[error("Unsupported schedule source: {0}")]
    UnsupportedSource(String),
    /// Schedule file has an extension no decoder is known for.
    #[error("Unsupported schedule format: {0}")]
    UnsupportedFormat(String),
}

#[async_trait]
/// Trait for backends that supply a renewal schedule table.
pub trait SchedulePort: Send + Sync {
    /// Metadata describing this source.
    fn source(&self) -> &SourceMeta;

    /// Load the complete schedule table.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the schedule cannot be read, decoded, or
    /// does not cover every coding digit pair.
    async fn load(&self) -> Result<RenewalScheduleTable, PortError>;
}
