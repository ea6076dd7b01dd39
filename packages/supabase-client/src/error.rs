//! Error types for the Supabase client.

use thiserror::Error;

/// Result type for Supabase client operations.
pub type Result<T> = std::result::Result<T, SupabaseError>;

/// Supabase client errors.
#[derive(Debug, Error)]
pub enum SupabaseError {
    /// Configuration error (missing URL or key)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network error (connection failed, timeout)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response from PostgREST or GoTrue
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The access token was rejected
    #[error("Unauthorized")]
    Unauthorized,

    /// A single-row select matched nothing
    #[error("No rows returned")]
    NoRows,

    /// A single-row select matched more than one row
    #[error("Expected a single row, got {0}")]
    MultipleRows(usize),

    /// Response body did not match the expected shape
    #[error("Parse error: {0}")]
    Parse(String),
}
