//! JavaScript error types.
//!
//! Errors are ordinary rejection reasons: a [`JsError`] converts into
//! [`crate::Value::Error`] whenever it has to travel down a promise chain.

use std::fmt;
use thiserror::Error;

/// The kind of JavaScript error.
///
/// These correspond to JavaScript's built-in error constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Plain `Error(...)`
    Error,
    /// Type error (e.g., calling a non-function)
    TypeError,
}

impl ErrorKind {
    /// The constructor name, as JavaScript prints it.
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::Error => "Error",
            ErrorKind::TypeError => "TypeError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A JavaScript error with a kind and message.
///
/// # Examples
///
/// ```
/// use core_types::{ErrorKind, JsError};
///
/// let error = JsError::error("Not Found");
/// assert_eq!(error.kind, ErrorKind::Error);
/// assert_eq!(error.message, "Not Found");
/// assert_eq!(error.to_string(), "Error: Not Found");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct JsError {
    /// The type of error
    pub kind: ErrorKind,
    /// Human-readable error message
    pub message: String,
}

impl JsError {
    /// Creates an error of the given kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Equivalent of JavaScript's `Error(message)`.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Error, message)
    }

    /// Equivalent of JavaScript's `TypeError(message)`.
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeError, message)
    }
}
