//! Task and microtask queue management.
//!
//! Both queues are shared FIFO handles: cloning a queue yields another handle
//! to the same underlying storage, so promises can schedule reactions on the
//! queue their event loop drains.

use core_types::JsError;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// A task to be executed by the event loop.
///
/// Tasks represent macrotask-level work such as a transport completing a
/// request.
pub struct Task {
    callback: Box<dyn FnOnce() -> Result<(), JsError>>,
}

impl Task {
    /// Creates a new Task from a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() -> Result<(), JsError> + 'static,
    {
        Self {
            callback: Box::new(f),
        }
    }

    /// Executes the task.
    pub fn run(self) -> Result<(), JsError> {
        (self.callback)()
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Task {{ ... }}")
    }
}

/// A microtask to be executed by the event loop.
///
/// Promise reactions and thenable adoption run as microtasks, after the
/// current task and before the next one.
pub struct MicroTask {
    callback: Box<dyn FnOnce() -> Result<(), JsError>>,
}

impl MicroTask {
    /// Creates a new MicroTask from a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() -> Result<(), JsError> + 'static,
    {
        Self {
            callback: Box::new(f),
        }
    }

    /// Executes the microtask.
    pub fn run(self) -> Result<(), JsError> {
        (self.callback)()
    }
}

impl std::fmt::Debug for MicroTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MicroTask {{ ... }}")
    }
}

/// A shared queue for tasks.
#[derive(Debug, Default, Clone)]
pub struct TaskQueue {
    queue: Rc<RefCell<VecDeque<Task>>>,
}

impl TaskQueue {
    /// Creates a new empty TaskQueue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a task to the end of the queue.
    pub fn enqueue(&self, task: Task) {
        self.queue.borrow_mut().push_back(task);
    }

    /// Removes and returns the next task from the queue.
    pub fn dequeue(&self) -> Option<Task> {
        self.queue.borrow_mut().pop_front()
    }

    /// Returns true if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    /// Returns the number of tasks in the queue.
    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }
}

/// A shared queue for microtasks.
///
/// Microtasks are drained completely after each task.
#[derive(Debug, Default, Clone)]
pub struct MicrotaskQueue {
    queue: Rc<RefCell<VecDeque<MicroTask>>>,
}

impl MicrotaskQueue {
    /// Creates a new empty MicrotaskQueue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a microtask to the end of the queue.
    pub fn enqueue(&self, microtask: MicroTask) {
        self.queue.borrow_mut().push_back(microtask);
    }

    /// Removes and returns the next microtask from the queue.
    pub fn dequeue(&self) -> Option<MicroTask> {
        self.queue.borrow_mut().pop_front()
    }

    /// Returns true if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    /// Returns the number of microtasks in the queue.
    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }
}
