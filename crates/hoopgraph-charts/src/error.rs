// Chart pipeline error type.

use thiserror::Error;

/// Why a chart request produced no payload.
///
/// Empty results and missing stats are not errors: they come back as an
/// empty payload or as completeness warnings on the payload.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("unsupported graph kind: {0}")]
    UnsupportedKind(String),

    #[error("invalid request field `{field}`: {message}")]
    InvalidRequest { field: String, message: String },

    #[error("record store failure: {0:#}")]
    Store(#[source] anyhow::Error),

    #[error("deadline exceeded before {operation}")]
    DeadlineExceeded { operation: &'static str },
}

impl GraphError {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        GraphError::InvalidRequest {
            field: field.into(),
            message: message.into(),
        }
    }
}
