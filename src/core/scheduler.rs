//! # Scheduler - cooperative round-robin task driver.
//!
//! The scheduler owns every registered task's body and advances exactly one
//! of them per [`Scheduler::run_once`] call, by polling its future until the
//! next `yield_now().await`, completion, or fault.
//!
//! ## Architecture
//! ```text
//! register(task) ──► Slot { id, name, state: Runnable, body, cancel }
//!                     (registration order = round-robin order)
//!
//! run_once():
//!   next Runnable slot after the cursor
//!     └─► poll(body) with a no-op waker, panics caught
//!           ├─ Pending          ──► Yielded    (stays Runnable)
//!           ├─ Ready(Ok)        ──► Completed  (Done,   TaskStopped)
//!           ├─ Ready(Canceled)  ──► Completed  (Done,   TaskStopped)
//!           └─ Ready(Err/panic) ──► Faulted    (Killed, TaskFailed)
//!
//! kill(id): Runnable ──► Killed, body dropped, token cancelled, TaskKilled
//! ```
//!
//! ## Rules
//! - One thread, no preemption. A body that never yields starves every other task.
//! - Bodies are dropped as soon as their task leaves `Runnable`; `Drop` impls
//!   inside a body (pool teardown) therefore run at kill/complete time.
//! - A fault in one task never stops the scheduler from driving the others.

use std::future::Future;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::task::noop_waker_ref;
use tokio_util::sync::CancellationToken;

use crate::error::{TaskError, panic_info};
use crate::events::{Bus, Event, EventKind};
use crate::tasks::{BoxTaskFuture, TaskRef};

/// Scheduler-assigned task identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

/// Lifecycle state of a registered task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Will be resumed on its next turn.
    Runnable,
    /// Body returned.
    Done,
    /// Faulted or explicitly killed; never resumed again.
    Killed,
}

/// What happened during one [`Scheduler::run_once`] call.
#[derive(Debug)]
pub enum TurnOutcome {
    /// The task yielded and stays runnable.
    Yielded,
    /// The task finished (including a graceful `Canceled` exit).
    Completed,
    /// The task faulted and is now killed.
    Faulted(TaskError),
}

/// Result of resuming one task.
#[derive(Debug)]
pub struct Turn {
    pub id: TaskId,
    pub name: Arc<str>,
    pub outcome: TurnOutcome,
}

/// Registered task.
struct Slot {
    id: TaskId,
    name: Arc<str>,
    state: TaskState,
    body: Option<BoxTaskFuture>,
    cancel: CancellationToken,
}

/// Cooperative, single-threaded task driver.
pub struct Scheduler {
    slots: Vec<Slot>,
    cursor: usize,
    next_id: u64,
    bus: Bus,
    runtime_token: CancellationToken,
}

impl Scheduler {
    /// Creates an empty scheduler. Task tokens are children of `runtime_token`.
    pub fn new(bus: Bus, runtime_token: CancellationToken) -> Self {
        Self {
            slots: Vec::new(),
            cursor: 0,
            next_id: 0,
            bus,
            runtime_token,
        }
    }

    /// Adds a task in `Runnable` state and builds its body.
    ///
    /// A task whose `spawn` panics is registered directly as `Killed`.
    pub fn register(&mut self, task: TaskRef) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;

        let name: Arc<str> = Arc::from(task.name());
        let cancel = self.runtime_token.child_token();
        let spawned = catch_unwind(AssertUnwindSafe(|| task.spawn(cancel.clone())));

        self.bus
            .publish(Event::new(EventKind::TaskRegistered).with_task(name.clone()));

        let (state, body) = match spawned {
            Ok(body) => (TaskState::Runnable, Some(contain_panics(body))),
            Err(payload) => {
                let err = TaskError::Panicked {
                    info: panic_info(&*payload),
                };
                self.publish_failed(&name, &err);
                (TaskState::Killed, None)
            }
        };

        self.slots.push(Slot {
            id,
            name,
            state,
            body,
            cancel,
        });
        id
    }

    /// Resumes the next runnable task until it yields, completes or faults.
    ///
    /// Returns `None` when no task is runnable.
    pub fn run_once(&mut self) -> Option<Turn> {
        let idx = self.next_runnable()?;
        self.cursor = idx + 1;

        let slot = &mut self.slots[idx];
        let body = slot.body.as_mut()?;
        let mut cx = Context::from_waker(noop_waker_ref());
        let polled = body.as_mut().poll(&mut cx);

        let outcome = match polled {
            Poll::Pending => TurnOutcome::Yielded,
            Poll::Ready(Ok(())) | Poll::Ready(Err(TaskError::Canceled)) => {
                slot.state = TaskState::Done;
                slot.body = None;
                self.bus
                    .publish(Event::new(EventKind::TaskStopped).with_task(slot.name.clone()));
                TurnOutcome::Completed
            }
            Poll::Ready(Err(err)) => {
                slot.state = TaskState::Killed;
                slot.body = None;
                slot.cancel.cancel();
                let name = slot.name.clone();
                self.publish_failed(&name, &err);
                TurnOutcome::Faulted(err)
            }
        };

        let slot = &self.slots[idx];
        Some(Turn {
            id: slot.id,
            name: slot.name.clone(),
            outcome,
        })
    }

    /// Number of tasks still `Runnable`.
    pub fn live_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| s.state == TaskState::Runnable)
            .count()
    }

    /// Forces a task to `Killed`, abandoning its in-progress step.
    ///
    /// Returns `false` if the task is unknown or already finished.
    pub fn kill(&mut self, id: TaskId) -> bool {
        self.kill_with_reason(id, "requested")
    }

    /// Kills every runnable task; returns how many were killed.
    pub fn kill_all(&mut self, reason: &str) -> usize {
        let live: Vec<TaskId> = self
            .slots
            .iter()
            .filter(|s| s.state == TaskState::Runnable)
            .map(|s| s.id)
            .collect();
        live.into_iter()
            .filter(|id| self.kill_with_reason(*id, reason))
            .count()
    }

    /// Kills one task, tagging the `TaskKilled` event with `reason`.
    pub fn kill_with_reason(&mut self, id: TaskId, reason: &str) -> bool {
        let Some(slot) = self.slots.iter_mut().find(|s| s.id == id) else {
            return false;
        };
        if slot.state != TaskState::Runnable {
            return false;
        }
        slot.state = TaskState::Killed;
        slot.cancel.cancel();
        let name = slot.name.clone();
        // Dropping the body may run teardown that publishes its own events.
        drop(slot.body.take());
        self.bus.publish(
            Event::new(EventKind::TaskKilled)
                .with_task(name)
                .with_reason(reason),
        );
        true
    }

    /// State of a task, if registered.
    pub fn state(&self, id: TaskId) -> Option<TaskState> {
        self.slots.iter().find(|s| s.id == id).map(|s| s.state)
    }

    /// Name of a task, if registered.
    pub fn name(&self, id: TaskId) -> Option<&str> {
        self.slots
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.name.as_ref())
    }

    /// Number of tasks in `state`.
    pub fn count(&self, state: TaskState) -> usize {
        self.slots.iter().filter(|s| s.state == state).count()
    }

    /// Total number of registered tasks, finished ones included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn next_runnable(&self) -> Option<usize> {
        let n = self.slots.len();
        (0..n)
            .map(|off| (self.cursor + off) % n)
            .find(|&i| self.slots[i].state == TaskState::Runnable)
    }

    fn publish_failed(&self, name: &Arc<str>, err: &TaskError) {
        self.bus.publish(
            Event::new(EventKind::TaskFailed)
                .with_task(name.clone())
                .with_reason(err.as_message()),
        );
    }
}

/// Converts a panic escaping the body into `TaskError::Panicked`.
fn contain_panics(body: BoxTaskFuture) -> BoxTaskFuture {
    AssertUnwindSafe(body)
        .catch_unwind()
        .map(|res| {
            res.unwrap_or_else(|payload| {
                Err(TaskError::Panicked {
                    info: panic_info(&*payload),
                })
            })
        })
        .boxed_local()
}
