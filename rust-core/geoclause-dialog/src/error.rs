// SPDX-License-Identifier: PMPL-1.0-or-later
//! Error types for the query dialog and its datasource seam.

use geoclause_builder::ClauseError;
use thiserror::Error;

/// Failure reported by a feature datasource.
///
/// Each variant carries enough context to show a user-facing message.
#[derive(Error, Debug)]
pub enum DatasourceError {
    /// The feature type is not known to the datasource.
    #[error("Feature type not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Transport failure below the datasource.
    #[error("Network error: {0}")]
    Network(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The query engine rejected or failed the query.
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The query exceeded the configured timeout.
    #[error("Timeout after {0}ms")]
    Timeout(u64),
}

/// Errors from dialog operations.
///
/// Invalid user input is not an error: `run_query` reports it as
/// [`QueryOutcome::Invalid`](crate::QueryOutcome::Invalid).
#[derive(Error, Debug)]
pub enum DialogError {
    #[error("No feature type selected")]
    NoFeatureType,

    #[error("Unknown feature type: {0}")]
    UnknownFeatureType(String),

    /// A query is already running and concurrent queries are rejected.
    #[error("A query is already in progress")]
    QueryInFlight,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Clause(#[from] ClauseError),

    #[error("Query failed: {0}")]
    Datasource(#[from] DatasourceError),
}

pub type Result<T> = std::result::Result<T, DialogError>;
