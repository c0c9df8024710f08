//! Error types for U-Arrange.

use thiserror::Error;

/// Result type alias for U-Arrange operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported before an arrangement run starts.
///
/// Outcomes that are expected during a run (an item that fits nowhere, a
/// cancelled run) are not errors; they are reported through each item's
/// [`BinId`](crate::BinId) and the returned packed count.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid item shape provided.
    #[error("Invalid item: {0}")]
    InvalidItem(String),

    /// Invalid bin (plate) descriptor provided.
    #[error("Invalid boundary: {0}")]
    InvalidBoundary(String),

    /// Configuration or caller misuse detected before scheduling.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}
