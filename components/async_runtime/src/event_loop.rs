//! Event loop implementation.
//!
//! This module provides the cooperative loop that runs tasks and drains the
//! microtask queue on which promise reactions are scheduled.

use crate::deferred::Deferred;
use crate::promise::{Promise, Resolver};
use crate::task_queue::{MicroTask, MicrotaskQueue, Task, TaskQueue};
use core_types::JsError;
use log::trace;

/// A single-threaded event loop.
///
/// Each iteration (turn) of the loop:
/// 1. Takes the oldest task from the task queue and executes it
/// 2. Drains all microtasks in the microtask queue
/// 3. Repeats
///
/// # Examples
///
/// ```
/// use async_runtime::{EventLoop, Task};
///
/// let event_loop = EventLoop::new();
/// event_loop.enqueue_task(Task::new(|| Ok(())));
/// event_loop.run_until_done().unwrap();
/// ```
#[derive(Debug, Default)]
pub struct EventLoop {
    task_queue: TaskQueue,
    microtask_queue: MicrotaskQueue,
}

impl EventLoop {
    /// Creates a new EventLoop with empty queues.
    pub fn new() -> Self {
        Self {
            task_queue: TaskQueue::new(),
            microtask_queue: MicrotaskQueue::new(),
        }
    }

    /// Creates a Deferred whose reactions run on this loop.
    pub fn deferred(&self) -> Deferred {
        Deferred::new(&self.microtask_queue)
    }

    /// Creates a pending promise and its resolver, bound to this loop.
    pub fn promise(&self) -> (Promise, Resolver) {
        Promise::pending(&self.microtask_queue)
    }

    /// Returns a handle to the task queue.
    pub fn task_queue(&self) -> TaskQueue {
        self.task_queue.clone()
    }

    /// Returns a handle to the microtask queue.
    pub fn microtask_queue(&self) -> MicrotaskQueue {
        self.microtask_queue.clone()
    }

    /// Runs the event loop until all tasks and microtasks are processed.
    ///
    /// Stops at the first task or microtask that returns an error.
    pub fn run_until_done(&self) -> Result<(), JsError> {
        while !self.task_queue.is_empty() || !self.microtask_queue.is_empty() {
            self.process_one_cycle()?;
        }

        Ok(())
    }

    /// Adds a task to the task queue.
    pub fn enqueue_task(&self, task: Task) {
        self.task_queue.enqueue(task);
    }

    /// Adds a microtask to the microtask queue.
    pub fn enqueue_microtask(&self, microtask: MicroTask) {
        self.microtask_queue.enqueue(microtask);
    }

    /// Returns true if the task queue is empty.
    pub fn is_task_queue_empty(&self) -> bool {
        self.task_queue.is_empty()
    }

    /// Returns true if the microtask queue is empty.
    pub fn is_microtask_queue_empty(&self) -> bool {
        self.microtask_queue.is_empty()
    }

    /// Runs all microtasks in the queue until empty.
    ///
    /// New microtasks added during execution are also processed before this
    /// method returns.
    pub fn run_all_microtasks(&self) -> Result<(), JsError> {
        let mut ran = 0usize;
        while let Some(microtask) = self.microtask_queue.dequeue() {
            microtask.run()?;
            ran += 1;
        }
        if ran > 0 {
            trace!("drained {} microtasks", ran);
        }
        Ok(())
    }

    /// Processes one complete cycle: one task followed by all microtasks.
    pub fn process_one_cycle(&self) -> Result<(), JsError> {
        if let Some(task) = self.task_queue.dequeue() {
            trace!("running task, {} left", self.task_queue.len());
            task.run()?;
        }

        self.run_all_microtasks()
    }
}
