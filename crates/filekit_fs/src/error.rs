use std::io;

use thiserror::Error;

/// Error type for file handle operations.
///
/// The two variants are deliberately disjoint so callers can tell an
/// operation that a handle can never perform apart from one that was
/// attempted and failed.
#[derive(Error, Debug)]
pub enum Error {
    /// The handle's capability does not allow the operation. Raised before
    /// any I/O is attempted.
    #[error("Cannot {operation} an asset file: {path}")]
    Capability {
        operation: &'static str,
        path: String,
    },

    /// An I/O level failure, optionally carrying the low-level cause.
    #[error("{message}")]
    Operate {
        message: String,
        source: Option<io::Error>,
    },
}

/// Coarse classification of [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Capability,
    Operate,
}

impl Error {
    pub(crate) fn capability(operation: &'static str, path: impl Into<String>) -> Self {
        Self::Capability { operation, path: path.into() }
    }

    pub fn operate(message: impl Into<String>) -> Self {
        Self::Operate { message: message.into(), source: None }
    }

    pub fn operate_io(message: impl Into<String>, source: io::Error) -> Self {
        Self::Operate { message: message.into(), source: Some(source) }
    }

    /// Wraps another handle error as the cause of a new operate error.
    pub(crate) fn nested(message: impl Into<String>, source: Error) -> Self {
        Self::operate_io(message, io::Error::other(source))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Capability { .. } => ErrorKind::Capability,
            Self::Operate { .. } => ErrorKind::Operate,
        }
    }

    pub fn is_capability(&self) -> bool {
        self.kind() == ErrorKind::Capability
    }

    pub fn is_operate(&self) -> bool {
        self.kind() == ErrorKind::Operate
    }
}

pub type Result<T> = std::result::Result<T, Error>;
