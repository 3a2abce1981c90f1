//! jQuery-style deferred on top of [`Promise`].
//!
//! A [`Deferred`] owns a root promise and the resolver that settles it, and
//! tracks the end of the chain built by [`Deferred::then`] and
//! [`Deferred::fail`]. Those two chain eagerly: each call replaces the
//! tracked promise with the derived one, so the next call sees its output.
//!
//! [`Deferred::done`] and [`Deferred::always`] do not touch the chain when
//! called. They are queued and attached at [`Deferred::resolve`] /
//! [`Deferred::reject`] time to whatever the tracked promise is by then, in
//! registration order: done callbacks first (fulfillment only, and only when
//! resolving), then always callbacks (both outcomes).
//!
//! Callbacks registered after settlement never run.
//!
//! # Examples
//!
//! ```
//! use async_runtime::EventLoop;
//! use core_types::Value;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let event_loop = EventLoop::new();
//! let seen = Rc::new(RefCell::new(Vec::new()));
//!
//! let deferred = event_loop.deferred();
//! let s = seen.clone();
//! deferred
//!     .then(|v| Ok(Value::from(format!("{}!", v))))
//!     .done(move |v| s.borrow_mut().push(v));
//!
//! deferred.resolve("ok");
//! event_loop.run_until_done().unwrap();
//!
//! assert_eq!(*seen.borrow(), vec![Value::from("ok!")]);
//! ```

use crate::promise::{Function, Promise, PromiseState, Resolver};
use crate::task_queue::MicrotaskQueue;
use core_types::{JsError, Settlement, Thenable, Value};
use log::debug;
use std::cell::RefCell;
use std::fmt;
use std::mem;
use std::rc::Rc;

/// A callback queued by `done` or `always`. Its return value is discarded.
pub type Callback = Box<dyn FnOnce(Value)>;

struct DeferredState {
    // End of the then/fail chain.
    promise: Promise,
    resolver: Resolver,
    done_callbacks: Vec<Callback>,
    always_callbacks: Vec<Callback>,
    settled: bool,
}

// What the first resolve/reject takes out of the state.
struct Settling {
    promise: Promise,
    resolver: Resolver,
    done: Vec<Callback>,
    always: Vec<Callback>,
}

/// A promise with settlement triggers and queued done/always callbacks.
///
/// `Deferred` is a shared handle: clones refer to the same deferred, so a
/// producer can keep one to settle it while consumers register callbacks on
/// another.
#[derive(Clone)]
pub struct Deferred {
    state: Rc<RefCell<DeferredState>>,
}

impl Deferred {
    /// Creates a pending deferred whose reactions run on `jobs`.
    pub fn new(jobs: &MicrotaskQueue) -> Self {
        let (promise, resolver) = Promise::pending(jobs);
        Self {
            state: Rc::new(RefCell::new(DeferredState {
                promise,
                resolver,
                done_callbacks: Vec::new(),
                always_callbacks: Vec::new(),
                settled: false,
            })),
        }
    }

    /// Queues `callback` to run with the final chained value on fulfillment.
    pub fn done<F>(&self, callback: F) -> &Self
    where
        F: FnOnce(Value) + 'static,
    {
        self.queue_done(Box::new(callback));
        self
    }

    /// Queues every callback in `callbacks`, in order.
    pub fn done_all<I>(&self, callbacks: I) -> &Self
    where
        I: IntoIterator<Item = Callback>,
    {
        for callback in callbacks {
            self.queue_done(callback);
        }
        self
    }

    /// Chains a rejection handler onto the tracked promise.
    ///
    /// If the handler returns `Ok`, the chain recovers with that value.
    pub fn fail<F>(&self, on_rejected: F) -> &Self
    where
        F: FnOnce(Value) -> Result<Value, JsError> + 'static,
    {
        let mut state = self.state.borrow_mut();
        state.promise = state.promise.catch(Function::new(on_rejected));
        drop(state);
        self
    }

    /// Chains a fulfillment handler onto the tracked promise.
    pub fn then<F>(&self, on_fulfilled: F) -> &Self
    where
        F: FnOnce(Value) -> Result<Value, JsError> + 'static,
    {
        self.chain(Some(Function::new(on_fulfilled)), None);
        self
    }

    /// Chains a fulfillment and a rejection handler onto the tracked promise.
    pub fn then_or<F, R>(&self, on_fulfilled: F, on_rejected: R) -> &Self
    where
        F: FnOnce(Value) -> Result<Value, JsError> + 'static,
        R: FnOnce(Value) -> Result<Value, JsError> + 'static,
    {
        self.chain(
            Some(Function::new(on_fulfilled)),
            Some(Function::new(on_rejected)),
        );
        self
    }

    /// Queues `callback` to run with the final chained value or reason,
    /// whichever way the chain settles.
    pub fn always<F>(&self, callback: F) -> &Self
    where
        F: FnOnce(Value) + 'static,
    {
        let mut state = self.state.borrow_mut();
        if state.settled {
            debug!("always callback registered after settlement; it will not run");
        } else {
            state.always_callbacks.push(Box::new(callback));
        }
        drop(state);
        self
    }

    /// Attaches the queued callbacks to the tracked promise, then fulfills
    /// the root promise with `value`.
    ///
    /// Resolving an unchained deferred with itself rejects it with a
    /// `TypeError`. Does nothing if the deferred was already resolved or
    /// rejected.
    pub fn resolve(&self, value: impl Into<Value>) {
        let Some(Settling {
            promise,
            resolver,
            done,
            always,
        }) = self.take_for_settlement()
        else {
            debug!("deferred already settled; resolve ignored");
            return;
        };

        debug!(
            "resolving deferred: {} done, {} always callbacks",
            done.len(),
            always.len()
        );
        for callback in done {
            promise.then(Some(discarding(callback)), None);
        }
        for callback in always {
            promise.then_both(discarding(callback));
        }
        resolver.resolve(value);
    }

    /// Attaches the queued always callbacks to the tracked promise, then
    /// rejects the root promise with `reason`.
    ///
    /// Queued done callbacks are dropped without running. Does nothing if the
    /// deferred was already resolved or rejected.
    pub fn reject(&self, reason: impl Into<Value>) {
        let Some(Settling {
            promise,
            resolver,
            done,
            always,
        }) = self.take_for_settlement()
        else {
            debug!("deferred already settled; reject ignored");
            return;
        };

        debug!(
            "rejecting deferred: dropping {} done, attaching {} always callbacks",
            done.len(),
            always.len()
        );
        for callback in always {
            promise.then_both(discarding(callback));
        }
        resolver.reject(reason);
    }

    /// The tracked promise: the root, or the end of the then/fail chain.
    pub fn promise(&self) -> Promise {
        self.state.borrow().promise.clone()
    }

    /// State of the tracked promise.
    pub fn state(&self) -> PromiseState {
        self.state.borrow().promise.state()
    }

    /// Whether `resolve` or `reject` has been called.
    pub fn is_settled(&self) -> bool {
        self.state.borrow().settled
    }

    fn chain(&self, on_fulfilled: Option<Function>, on_rejected: Option<Function>) {
        let mut state = self.state.borrow_mut();
        state.promise = state.promise.then(on_fulfilled, on_rejected);
    }

    fn queue_done(&self, callback: Callback) {
        let mut state = self.state.borrow_mut();
        if state.settled {
            debug!("done callback registered after settlement; it will not run");
        } else {
            state.done_callbacks.push(callback);
        }
    }

    fn take_for_settlement(&self) -> Option<Settling> {
        let mut state = self.state.borrow_mut();
        if mem::replace(&mut state.settled, true) {
            return None;
        }
        Some(Settling {
            promise: state.promise.clone(),
            resolver: state.resolver.clone(),
            done: mem::take(&mut state.done_callbacks),
            always: mem::take(&mut state.always_callbacks),
        })
    }
}

fn discarding(callback: Callback) -> Function {
    Function::new(move |value| {
        callback(value);
        Ok(Value::Undefined)
    })
}

/// Whether `value` can be waited on, i.e. carries the [`Thenable`]
/// capability.
///
/// ```
/// use async_runtime::{is_promise, EventLoop};
/// use core_types::Value;
///
/// let event_loop = EventLoop::new();
/// assert!(is_promise(&Value::from(event_loop.deferred())));
/// assert!(!is_promise(&Value::Smi(42)));
/// assert!(!is_promise(&Value::Null));
/// ```
pub fn is_promise(value: &Value) -> bool {
    matches!(value, Value::Thenable(_))
}

impl Thenable for Deferred {
    fn on_settled(&self, callback: Box<dyn FnOnce(Settlement)>) {
        self.promise().on_settled(callback);
    }

    fn identity(&self) -> *const () {
        self.promise().identity()
    }
}

impl From<Deferred> for Value {
    fn from(deferred: Deferred) -> Self {
        Value::Thenable(Rc::new(deferred))
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Deferred")
            .field("promise", &state.promise)
            .field("done_callbacks", &state.done_callbacks.len())
            .field("always_callbacks", &state.always_callbacks.len())
            .field("settled", &state.settled)
            .finish()
    }
}
