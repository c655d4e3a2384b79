//! Error types for the hasura-link client.

use thiserror::Error;

use crate::schema::FieldKind;

/// Result type for hasura-link operations
pub type Result<T> = std::result::Result<T, HasuraLinkError>;

/// Errors that can occur while talking to the query API or decoding results
#[derive(Debug, Error)]
pub enum HasuraLinkError {
    /// HTTP transport failure (connect, timeout, TLS, ...)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("server returned status {status_code}: {message}")]
    Server { status_code: u16, message: String },

    /// The response body is not a valid result envelope
    #[error("failed to parse result envelope: {0}")]
    Envelope(#[from] serde_json::Error),

    /// A cell could not be coerced to its field's declared kind.
    ///
    /// `row` is the data-row index (header excluded), `field` the index of
    /// the field in the record's declaration order.
    #[error("expected {expected}, got {value}. row: {row}, column: {field}")]
    Conversion {
        expected: FieldKind,
        value: String,
        row: usize,
        field: usize,
    },

    /// A structured cell carried malformed JSON
    #[error("invalid JSON cell for field {field}. row: {row}: {source}")]
    CellJson {
        row: usize,
        field: usize,
        source: serde_json::Error,
    },

    /// A data row has fewer cells than the header has columns
    #[error("row {row} has {actual} cells, header has {expected} columns")]
    RowArity {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// A bulk response contained more tabular results than decode targets
    #[error("bulk response has more tabular results than the {supplied} supplied targets")]
    BulkTargets { supplied: usize },

    /// Client misconfiguration (missing base URL, bad TLS setup, ...)
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Invariant violation inside the decoder
    #[error("internal error: {0}")]
    Internal(String),
}
