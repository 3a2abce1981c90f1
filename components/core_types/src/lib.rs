//! Core value types and error handling shared by the deferred runtime.
//!
//! This crate provides the foundational types that flow through promises
//! and deferreds: the dynamically typed [`Value`], the [`JsError`] used as a
//! rejection reason, and the [`Thenable`] capability that marks a value as
//! something that settles later.
//!
//! # Overview
//!
//! - [`Value`] - Tagged representation of JavaScript values
//! - [`JsError`] - JavaScript errors with a kind and message
//! - [`ErrorKind`] - Types of JavaScript errors
//! - [`Thenable`] - Anything that settles once and accepts a continuation
//! - [`Settlement`] - The outcome handed to a thenable's continuation
//!
//! # Examples
//!
//! ```
//! use core_types::{ErrorKind, JsError, Value};
//!
//! let num = Value::Smi(42);
//! assert!(num.is_truthy());
//! assert_eq!(num.type_of(), "number");
//!
//! let error = JsError::new(ErrorKind::TypeError, "undefined is not a function");
//! assert_eq!(error.to_string(), "TypeError: undefined is not a function");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod value;

pub use error::{ErrorKind, JsError};
pub use value::{Settlement, Thenable, Value};
