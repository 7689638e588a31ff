use serde::Deserialize;
use thiserror::Error;

/// Broad category of a remote store failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// The store answered and refused the request
    Rejected,
    /// The request never produced a usable response
    Transport,
    /// A returned row did not fit the expected storage shape
    Decode,
    /// No connection parameters were supplied
    Unconfigured,
}

/// Error reported by the remote store client
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct StoreError {
    pub kind: StoreErrorKind,
    pub message: String,
    pub code: Option<String>,
    pub details: Option<String>,
    pub hint: Option<String>,
    pub status: Option<u16>,
}

/// Error body PostgREST sends alongside a non-success status
#[derive(Debug, Deserialize)]
pub(crate) struct StoreErrorBody {
    pub message: Option<String>,
    pub code: Option<String>,
    pub details: Option<String>,
    pub hint: Option<String>,
}

impl StoreError {
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            code: None,
            details: None,
            hint: None,
            status: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Rejected, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Transport, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Decode, message)
    }

    pub fn unconfigured(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Unconfigured, message)
    }

    /// Build a rejection from a response status and its raw body.
    ///
    /// Falls back to the status line when the body is not a PostgREST error object.
    pub(crate) fn from_response(status: u16, reason: Option<&str>, body: &str) -> Self {
        match serde_json::from_str::<StoreErrorBody>(body) {
            Ok(parsed) => Self {
                kind: StoreErrorKind::Rejected,
                message: parsed
                    .message
                    .unwrap_or_else(|| format!("store returned status {status}")),
                code: parsed.code,
                details: parsed.details,
                hint: parsed.hint,
                status: Some(status),
            },
            Err(_) => {
                let mut message = format!("store returned status {status}");
                if let Some(reason) = reason {
                    message.push(' ');
                    message.push_str(reason);
                }
                if !body.trim().is_empty() {
                    message.push_str(": ");
                    message.push_str(body.trim());
                }
                Self {
                    status: Some(status),
                    ..Self::rejected(message)
                }
            }
        }
    }
}

/// Errors surfaced by the listing repository and state container
#[derive(Debug, Error)]
pub enum ListingError {
    /// A read against the store failed
    #[error("failed to {operation}: {source}")]
    StoreRead {
        operation: &'static str,
        #[source]
        source: StoreError,
    },

    /// An insert, update or delete against the store failed
    #[error("failed to {operation}: {source}")]
    StoreWrite {
        operation: &'static str,
        #[source]
        source: StoreError,
    },

    /// A property expected to exist after a write was not returned by the store
    #[error("property {0} not found")]
    NotFound(String),

    /// Connection parameters are missing
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Form input failed validation
    #[error("invalid property: {0}")]
    Validation(String),
}

impl ListingError {
    pub fn read(operation: &'static str, source: StoreError) -> Self {
        if source.kind == StoreErrorKind::Unconfigured {
            return Self::Configuration(source.message);
        }
        Self::StoreRead { operation, source }
    }

    pub fn write(operation: &'static str, source: StoreError) -> Self {
        if source.kind == StoreErrorKind::Unconfigured {
            return Self::Configuration(source.message);
        }
        Self::StoreWrite { operation, source }
    }
}

pub type Result<T> = std::result::Result<T, ListingError>;
