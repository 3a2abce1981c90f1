//! Async runtime for deferred computations.
//!
//! This crate provides:
//! - Event loop with task and microtask queues
//! - A one-shot [`Promise`] whose reactions run as microtasks
//! - A jQuery-style [`Deferred`] that queues `done`/`always` callbacks and
//!   chains `then`/`fail` handlers over a promise
//!
//! # Overview
//!
//! - [`EventLoop`] - Main event loop coordinating task execution
//! - [`Promise`] / [`Resolver`] - Single-resolution future and its triggers
//! - [`Deferred`] - Callback accumulation and settlement on top of a promise
//! - [`is_promise`] - Capability check for thenable values
//!
//! # Examples
//!
//! ```
//! use async_runtime::EventLoop;
//! use core_types::{JsError, Value};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let event_loop = EventLoop::new();
//! let calls = Rc::new(RefCell::new(Vec::new()));
//!
//! let deferred = event_loop.deferred();
//! let (c1, c2) = (calls.clone(), calls.clone());
//! deferred
//!     .fail(|reason| Ok(Value::from(format!("handled {}", reason))))
//!     .done(move |v| c1.borrow_mut().push(format!("done {}", v)))
//!     .always(move |v| c2.borrow_mut().push(format!("always {}", v)));
//!
//! deferred.reject(JsError::error("bad"));
//! event_loop.run_until_done().unwrap();
//!
//! assert_eq!(*calls.borrow(), vec!["always handled Error: bad"]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod deferred;
pub mod event_loop;
pub mod promise;
pub mod task_queue;

// Re-export main types at crate root
pub use deferred::{is_promise, Callback, Deferred};
pub use event_loop::EventLoop;
pub use promise::{Function, Promise, PromiseState, Resolver};
pub use task_queue::{MicroTask, MicrotaskQueue, Task, TaskQueue};
