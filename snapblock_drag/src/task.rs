// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A single-threaded queue of deferred work.
//!
//! Touch handlers must not start a drag inline, because starting one can
//! reshape the view tree the event is still travelling through. They post
//! the work here instead, and the host drains the queue once the event has
//! been dispatched.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

type Task = Box<dyn FnOnce()>;

#[derive(Default)]
struct QueueInner {
    next_id: u64,
    tasks: VecDeque<(u64, Task)>,
}

/// FIFO queue of deferred closures.
///
/// Cloning yields another handle to the same queue.
#[derive(Clone, Default)]
pub struct TaskQueue {
    inner: Rc<RefCell<QueueInner>>,
}

impl TaskQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `task` and returns a handle that can cancel it.
    pub fn post(&self, task: impl FnOnce() + 'static) -> PendingTask {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.tasks.push_back((id, Box::new(task)));
        PendingTask {
            id,
            queue: Rc::downgrade(&self.inner),
        }
    }

    /// Number of tasks waiting to run.
    pub fn len(&self) -> usize {
        self.inner.borrow().tasks.len()
    }

    /// Returns `true` if nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs the tasks queued at the time of the call, oldest first.
    ///
    /// Tasks posted while draining wait for the next call. Returns the
    /// number of tasks run.
    pub fn run_pending(&self) -> usize {
        let budget = self.len();
        let mut ran = 0;
        for _ in 0..budget {
            // Release the borrow before running so tasks can post more work.
            let Some((_, task)) = self.inner.borrow_mut().tasks.pop_front() else {
                break;
            };
            task();
            ran += 1;
        }
        ran
    }
}

impl fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskQueue")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

/// Handle to a posted task.
#[derive(Debug)]
pub struct PendingTask {
    id: u64,
    queue: Weak<RefCell<QueueInner>>,
}

impl PendingTask {
    /// Removes the task if it has not run yet. Returns `true` if it was removed.
    pub fn cancel(&self) -> bool {
        let Some(queue) = self.queue.upgrade() else {
            return false;
        };
        let mut inner = queue.borrow_mut();
        let before = inner.tasks.len();
        inner.tasks.retain(|(id, _)| *id != self.id);
        inner.tasks.len() != before
    }

    /// Returns `true` while the task is still queued.
    pub fn is_pending(&self) -> bool {
        self.queue
            .upgrade()
            .is_some_and(|q| q.borrow().tasks.iter().any(|(id, _)| *id == self.id))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::TaskQueue;

    #[test]
    fn tasks_run_in_post_order() {
        let queue = TaskQueue::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for i in 0..3 {
            let log = log.clone();
            queue.post(move || log.borrow_mut().push(i));
        }
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.run_pending(), 3);
        assert_eq!(*log.borrow(), vec![0, 1, 2]);
        assert!(queue.is_empty());
    }

    #[test]
    fn cancelled_task_never_runs() {
        let queue = TaskQueue::new();
        let ran = Rc::new(RefCell::new(false));
        let flag = ran.clone();
        let handle = queue.post(move || *flag.borrow_mut() = true);

        assert!(handle.is_pending());
        assert!(handle.cancel());
        assert!(!handle.cancel());
        assert_eq!(queue.run_pending(), 0);
        assert!(!*ran.borrow());
    }

    #[test]
    fn tasks_posted_while_draining_wait() {
        let queue = TaskQueue::new();
        let inner = queue.clone();
        queue.post(move || {
            inner.post(|| {});
        });
        assert_eq!(queue.run_pending(), 1);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.run_pending(), 1);
    }

    #[test]
    fn handle_outliving_queue_is_inert() {
        let queue = TaskQueue::new();
        let handle = queue.post(|| {});
        drop(queue);
        assert!(!handle.is_pending());
        assert!(!handle.cancel());
    }
}
