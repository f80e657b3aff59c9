//! Error types for credential management.
//!
//! [`CredentialError`] is what the manager returns: an [`ErrorKind`] a caller
//! can branch on, plus a human-readable message. [`CredforgeError`] wraps every
//! error the crate produces for callers that just want one type.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::codec::CodecError;
use crate::store::StoreError;

/// Category of a [`CredentialError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No factory is registered for the provisioner name.
    UnknownProvisioner,

    /// A credential already exists under the key.
    Duplicate,

    /// No credential exists under the key.
    NotFound,

    /// A codec or store failure; the message carries the underlying error.
    Generic,
}

impl ErrorKind {
    /// Numeric code reported to transport layers. `Generic` has none.
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Duplicate => Some(0),
            Self::NotFound => Some(1),
            Self::UnknownProvisioner => Some(2),
            Self::Generic => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownProvisioner => "unknown_provisioner",
            Self::Duplicate => "duplicate",
            Self::NotFound => "not_found",
            Self::Generic => "generic",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned by credential manager operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CredentialError {
    kind: ErrorKind,
    message: String,
}

impl CredentialError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unknown_provisioner(provisioner: &str) -> Self {
        Self::new(
            ErrorKind::UnknownProvisioner,
            format!("unknown provisioner: {}", provisioner),
        )
    }

    pub fn duplicate(key: &str) -> Self {
        Self::new(ErrorKind::Duplicate, format!("key exists: {}", key))
    }

    pub fn not_found(key: &str) -> Self {
        Self::new(ErrorKind::NotFound, format!("credential not found: {}", key))
    }

    /// Wrap any error as [`ErrorKind::Generic`], keeping its message verbatim.
    pub fn generic(err: impl fmt::Display) -> Self {
        Self::new(ErrorKind::Generic, err.to_string())
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Shorthand for `self.kind().code()`.
    pub fn code(&self) -> Option<i32> {
        self.kind.code()
    }
}

impl From<StoreError> for CredentialError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { key } => Self::not_found(&key),
            other => Self::generic(other),
        }
    }
}

impl From<CodecError> for CredentialError {
    fn from(err: CodecError) -> Self {
        Self::generic(err)
    }
}

/// Top-level error type encompassing all Credforge errors.
#[derive(Debug, Error)]
pub enum CredforgeError {
    /// Error from a credential manager operation.
    #[error("credential error: {0}")]
    Credential(#[from] CredentialError),

    /// Error from credential storage.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Error from encoding or decoding.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}
