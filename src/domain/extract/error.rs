use thiserror::Error;

use crate::core::client::google::GoogleApiError;

/// Failure of one adapter call. The whole call contributes no metrics.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("{source_label} error creating client: {message}")]
    Client { source_label: &'static str, message: String },

    #[error("{source_label} call timed out after {secs}s")]
    Timeout { source_label: &'static str, secs: u64 },

    #[error("{source_label} error making call to get data: {message}")]
    Request { source_label: &'static str, message: String },

    #[error("{source_label} backend returned {status}: {body}")]
    Backend { source_label: &'static str, status: u16, body: String },

    #[error("{source_label} error with no rows returned")]
    EmptyReport { source_label: &'static str },

    #[error("{source_label} invalid request: {message}")]
    InvalidRequest { source_label: &'static str, message: String },

    #[error("{source_label} error when extracting dates: {message}")]
    RangeIndex { source_label: &'static str, message: String },

    #[error("{source_label} malformed report row: {message}")]
    Decode { source_label: &'static str, message: String },
}

impl ExtractError {
    /// Maps a Google client failure onto this source's error taxonomy.
    pub fn from_api(source_label: &'static str, timeout_secs: u64, err: GoogleApiError) -> Self {
        match err {
            GoogleApiError::Build(message) => ExtractError::Client { source_label, message },
            GoogleApiError::Timeout => ExtractError::Timeout {
                source_label,
                secs: timeout_secs,
            },
            GoogleApiError::Transport(message) => ExtractError::Request { source_label, message },
            GoogleApiError::Status { status, body } => ExtractError::Backend {
                source_label,
                status,
                body,
            },
            GoogleApiError::Decode(message) => ExtractError::Decode { source_label, message },
        }
    }

    /// True for errors raised while interpreting returned rows.
    pub fn is_decode(&self) -> bool {
        matches!(self, ExtractError::RangeIndex { .. } | ExtractError::Decode { .. })
    }
}
