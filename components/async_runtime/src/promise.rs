//! One-shot promise with microtask-scheduled reactions.
//!
//! A promise starts pending and settles exactly once, either fulfilled with a
//! value or rejected with a reason. Reactions registered through
//! [`Promise::then`] run as microtasks on the queue the promise was created
//! with, in the order they were attached, and each produces a derived promise.

use crate::task_queue::{MicroTask, MicrotaskQueue};
use core_types::{JsError, Settlement, Thenable, Value};
use log::{debug, trace};
use std::cell::RefCell;
use std::fmt;
use std::mem;
use std::rc::Rc;

/// The state of a Promise.
///
/// Once settled (Fulfilled or Rejected), a Promise cannot change state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromiseState {
    /// The initial state; the promise is neither fulfilled nor rejected.
    Pending,
    /// The promise has been resolved with a value.
    Fulfilled,
    /// The promise has been rejected with a reason.
    Rejected,
}

/// A handler that can be attached to a promise.
///
/// Returning `Err` rejects the derived promise with [`Value::Error`];
/// returning a [`Value::Thenable`] makes the derived promise follow it.
pub struct Function {
    callback: Box<dyn FnOnce(Value) -> Result<Value, JsError>>,
}

impl Function {
    /// Creates a new Function from a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(Value) -> Result<Value, JsError> + 'static,
    {
        Self {
            callback: Box::new(f),
        }
    }

    /// Calls the function with the given argument.
    pub fn call(self, arg: Value) -> Result<Value, JsError> {
        (self.callback)(arg)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function {{ ... }}")
    }
}

type Reaction = Box<dyn FnOnce(Settlement)>;

struct PromiseInner {
    state: PromiseState,
    result: Option<Value>,
    reactions: Vec<Reaction>,
    // Set by the first resolve/reject, before adoption finishes.
    locked: bool,
    jobs: MicrotaskQueue,
}

/// A shared handle to a one-shot promise.
///
/// Cloning the handle does not create a new promise.
///
/// # Examples
///
/// ```
/// use async_runtime::{EventLoop, Function, PromiseState};
/// use core_types::Value;
///
/// let event_loop = EventLoop::new();
/// let (promise, resolver) = event_loop.promise();
/// let doubled = promise.then(
///     Some(Function::new(|v| match v {
///         Value::Smi(n) => Ok(Value::Smi(n * 2)),
///         other => Ok(other),
///     })),
///     None,
/// );
///
/// resolver.resolve(21);
/// event_loop.run_until_done().unwrap();
///
/// assert_eq!(doubled.state(), PromiseState::Fulfilled);
/// assert_eq!(doubled.result(), Some(Value::Smi(42)));
/// ```
#[derive(Clone)]
pub struct Promise {
    inner: Rc<RefCell<PromiseInner>>,
}

/// The settlement triggers of a promise.
///
/// Only the first `resolve` or `reject` has any effect.
#[derive(Clone)]
pub struct Resolver {
    promise: Promise,
}

impl Promise {
    /// Creates a pending promise and the resolver that settles it.
    pub fn pending(jobs: &MicrotaskQueue) -> (Promise, Resolver) {
        let promise = Promise {
            inner: Rc::new(RefCell::new(PromiseInner {
                state: PromiseState::Pending,
                result: None,
                reactions: Vec::new(),
                locked: false,
                jobs: jobs.clone(),
            })),
        };
        let resolver = Resolver {
            promise: promise.clone(),
        };
        (promise, resolver)
    }

    /// Returns a promise resolved with `value`.
    pub fn resolved(jobs: &MicrotaskQueue, value: impl Into<Value>) -> Promise {
        let (promise, resolver) = Promise::pending(jobs);
        resolver.resolve(value);
        promise
    }

    /// Returns a promise rejected with `reason`.
    pub fn rejected(jobs: &MicrotaskQueue, reason: impl Into<Value>) -> Promise {
        let (promise, resolver) = Promise::pending(jobs);
        resolver.reject(reason);
        promise
    }

    /// The current state.
    pub fn state(&self) -> PromiseState {
        self.inner.borrow().state
    }

    /// The fulfillment value or rejection reason, once settled.
    pub fn result(&self) -> Option<Value> {
        self.inner.borrow().result.clone()
    }

    /// Checks if there are reactions waiting for settlement.
    pub fn has_pending_reactions(&self) -> bool {
        !self.inner.borrow().reactions.is_empty()
    }

    /// Adds handlers for fulfillment and/or rejection.
    ///
    /// A missing handler passes the outcome through to the returned promise
    /// unchanged.
    pub fn then(&self, on_fulfilled: Option<Function>, on_rejected: Option<Function>) -> Promise {
        let (derived, resolver) = Promise::pending(&self.jobs());
        self.subscribe(Box::new(move |outcome| {
            let next = match outcome {
                Ok(value) => match on_fulfilled {
                    Some(handler) => handler.call(value).map_err(Value::from),
                    None => Ok(value),
                },
                Err(reason) => match on_rejected {
                    Some(handler) => handler.call(reason).map_err(Value::from),
                    None => Err(reason),
                },
            };
            resolver.settle(next);
        }));
        derived
    }

    /// Adds a rejection handler, `then(None, Some(on_rejected))`.
    pub fn catch(&self, on_rejected: Function) -> Promise {
        self.then(None, Some(on_rejected))
    }

    /// Uses one handler for both outcomes, like `then(f, f)`.
    ///
    /// The handler receives the value or the reason, and the returned
    /// promise settles from whatever the handler returns.
    pub fn then_both(&self, handler: Function) -> Promise {
        let (derived, resolver) = Promise::pending(&self.jobs());
        self.subscribe(Box::new(move |outcome| {
            let (Ok(arg) | Err(arg)) = outcome;
            resolver.settle(handler.call(arg).map_err(Value::from));
        }));
        derived
    }

    fn jobs(&self) -> MicrotaskQueue {
        self.inner.borrow().jobs.clone()
    }

    fn outcome(&self) -> Option<Settlement> {
        let inner = self.inner.borrow();
        let result = inner.result.clone().unwrap_or(Value::Undefined);
        match inner.state {
            PromiseState::Pending => None,
            PromiseState::Fulfilled => Some(Ok(result)),
            PromiseState::Rejected => Some(Err(result)),
        }
    }

    fn subscribe(&self, reaction: Reaction) {
        match self.outcome() {
            Some(outcome) => schedule(&self.jobs(), reaction, outcome),
            None => self.inner.borrow_mut().reactions.push(reaction),
        }
    }

    // Claims the right to settle. False if resolve/reject already ran.
    fn lock(&self) -> bool {
        let mut inner = self.inner.borrow_mut();
        !mem::replace(&mut inner.locked, true)
    }

    fn complete(&self, outcome: Settlement) {
        let (reactions, jobs) = {
            let mut inner = self.inner.borrow_mut();
            if inner.state != PromiseState::Pending {
                return;
            }
            let (state, result) = match &outcome {
                Ok(value) => (PromiseState::Fulfilled, value.clone()),
                Err(reason) => (PromiseState::Rejected, reason.clone()),
            };
            inner.state = state;
            inner.result = Some(result);
            (mem::take(&mut inner.reactions), inner.jobs.clone())
        };

        trace!("promise settled, scheduling {} reactions", reactions.len());
        for reaction in reactions {
            schedule(&jobs, reaction, outcome.clone());
        }
    }
}

fn schedule(jobs: &MicrotaskQueue, reaction: Reaction, outcome: Settlement) {
    jobs.enqueue(MicroTask::new(move || {
        reaction(outcome);
        Ok(())
    }));
}

impl Resolver {
    /// Fulfills the promise with `value`.
    ///
    /// If `value` is a thenable, the promise instead follows it and settles
    /// the same way once it does. Resolving a promise with itself rejects it
    /// with a `TypeError`.
    pub fn resolve(&self, value: impl Into<Value>) {
        if !self.promise.lock() {
            return;
        }
        match value.into() {
            Value::Thenable(thenable) if thenable.identity() == self.promise.identity() => {
                debug!("promise resolved with itself");
                let cycle = JsError::type_error("Chaining cycle detected for promise");
                self.promise.complete(Err(cycle.into()));
            }
            Value::Thenable(thenable) => {
                let promise = self.promise.clone();
                self.promise.jobs().enqueue(MicroTask::new(move || {
                    thenable.on_settled(Box::new(move |outcome| promise.complete(outcome)));
                    Ok(())
                }));
            }
            value => self.promise.complete(Ok(value)),
        }
    }

    /// Rejects the promise with `reason`.
    pub fn reject(&self, reason: impl Into<Value>) {
        if self.promise.lock() {
            self.promise.complete(Err(reason.into()));
        }
    }

    /// The promise this resolver settles.
    pub fn promise(&self) -> &Promise {
        &self.promise
    }

    fn settle(&self, outcome: Settlement) {
        match outcome {
            Ok(value) => self.resolve(value),
            Err(reason) => self.reject(reason),
        }
    }
}

impl Thenable for Promise {
    fn on_settled(&self, callback: Box<dyn FnOnce(Settlement)>) {
        self.subscribe(callback);
    }

    fn identity(&self) -> *const () {
        Rc::as_ptr(&self.inner).cast()
    }
}

impl From<Promise> for Value {
    fn from(promise: Promise) -> Self {
        Value::Thenable(Rc::new(promise))
    }
}

impl fmt::Debug for Promise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Promise")
            .field("state", &inner.state)
            .field("result", &inner.result)
            .field("reactions", &inner.reactions.len())
            .finish()
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("promise", &self.promise)
            .finish()
    }
}
