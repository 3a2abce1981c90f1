//! Request helper built on [`async_runtime::Deferred`].
//!
//! [`ajax`] sends a request through a [`Transport`] and hands back a
//! Deferred that resolves with the response body on a 2xx status and rejects
//! with `Error(statusText)` otherwise.
//!
//! # Examples
//!
//! ```
//! use async_runtime::EventLoop;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use xhr::{ajax, Request, RequestOptions, Response, Transport, TransportError};
//!
//! struct Echo;
//!
//! impl Transport for Echo {
//!     fn send(&self, request: &Request) -> Result<Response, TransportError> {
//!         Ok(Response::new(200, "OK", format!("{} {}", request.method, request.url)))
//!     }
//! }
//!
//! let event_loop = EventLoop::new();
//! let body = Rc::new(RefCell::new(String::new()));
//!
//! let b = body.clone();
//! ajax(&event_loop, Rc::new(Echo), RequestOptions::new("/items"))
//!     .done(move |v| *b.borrow_mut() = v.to_string());
//! event_loop.run_until_done().unwrap();
//!
//! assert_eq!(*body.borrow(), "GET /items");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod ajax;
mod options;
mod transport;

pub use ajax::ajax;
pub use options::{DataType, Method, RequestOptions};
pub use transport::{Request, Response, Transport, TransportError};
