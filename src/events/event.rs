//! # Runtime events emitted by the scheduler, the supervisor and the tasks.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Task lifecycle**: registration, completion, faults, kills
//! - **World**: static world population and setup failure
//! - **Debris**: spawn, eviction, rejection and teardown of pooled shapes
//! - **Runtime / subscribers**: shutdown and subscriber health
//!
//! The [`Event`] struct carries optional metadata such as the task name,
//! a reason, shape details and the simulation time.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use orbitvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::TaskFailed)
//!     .with_task("spawner")
//!     .with_reason("boom");
//!
//! assert_eq!(ev.kind, EventKind::TaskFailed);
//! assert_eq!(ev.task.as_deref(), Some("spawner"));
//! assert_eq!(ev.reason.as_deref(), Some("boom"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::engine::{ShapeHandle, ShapeKind};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Task lifecycle ===
    /// Task added to the scheduler.
    ///
    /// Sets:
    /// - `task`: task name
    TaskRegistered,

    /// Task body returned `Ok(())` (or bailed out with `Canceled`).
    ///
    /// Sets:
    /// - `task`: task name
    TaskStopped,

    /// Task body faulted (error or panic); the task is now killed.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `reason`: fault message
    TaskFailed,

    /// Task was killed before completing.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `reason`: why (`"shutdown"`, `"fault"`, `"requested"`)
    TaskKilled,

    // === World ===
    /// Static bodies created and camera placed.
    ///
    /// Sets:
    /// - `count`: number of bodies created
    WorldPopulated,

    /// One-time world setup failed.
    ///
    /// Sets:
    /// - `reason`: engine error message
    SetupFailed,

    // === Debris ===
    /// A shape entered the pool.
    ///
    /// Sets:
    /// - `shape`, `handle`, `sim_time` (creation time), `count` (pool length after insert)
    ShapeSpawned,

    /// The oldest shape was evicted to make room.
    ///
    /// Sets:
    /// - `shape`, `handle`, `sim_time` (its creation time), `count` (pool length after evict)
    ShapeEvicted,

    /// A spawn tick found the pool full under `RejectNew`; not an error.
    ///
    /// Sets:
    /// - `shape` (the discarded candidate's kind), `sim_time`, `count`
    ShapeRejected,

    /// All pooled shapes handed back to the engine at teardown.
    ///
    /// Sets:
    /// - `count`: number of shapes released
    ShapesReleased,

    // === Runtime ===
    /// External shutdown requested (OS signal or token cancelled).
    ShutdownRequested,

    /// The drive loop ended and no task is left alive.
    ///
    /// Sets:
    /// - `count`: turns driven
    AllStopped,

    // === Subscribers ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `task`: subscriber name
    /// - `reason`: panic info
    SubscriberPanicked,

    /// Events were lost before reaching subscribers (bus lag).
    ///
    /// Sets:
    /// - `count`: number of events skipped
    SubscriberOverflow,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the task (or subscriber), if applicable.
    pub task: Option<Arc<str>>,
    /// Human-readable reason (errors, kill cause, etc.).
    pub reason: Option<Arc<str>>,
    /// Kind of the shape involved.
    pub shape: Option<ShapeKind>,
    /// Engine handle of the shape involved.
    pub handle: Option<ShapeHandle>,
    /// Simulation time in seconds, from the engine clock.
    pub sim_time: Option<f64>,
    /// Count (pool length, bodies created, events skipped...).
    pub count: Option<usize>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            reason: None,
            shape: None,
            handle: None,
            sim_time: None,
            count: None,
        }
    }

    /// Attaches a task name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches the shape kind.
    #[inline]
    pub fn with_shape(mut self, shape: ShapeKind) -> Self {
        self.shape = Some(shape);
        self
    }

    /// Attaches the engine shape handle.
    #[inline]
    pub fn with_handle(mut self, handle: ShapeHandle) -> Self {
        self.handle = Some(handle);
        self
    }

    /// Attaches a simulation timestamp.
    #[inline]
    pub fn with_sim_time(mut self, t: f64) -> Self {
        self.sim_time = Some(t);
        self
    }

    /// Attaches a count.
    #[inline]
    pub fn with_count(mut self, n: usize) -> Self {
        self.count = Some(n);
        self
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_task(subscriber)
            .with_reason(info)
    }

    /// Creates a bus lag event.
    #[inline]
    pub fn subscriber_overflow(skipped: u64) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_count(usize::try_from(skipped).unwrap_or(usize::MAX))
    }

    #[inline]
    pub fn is_subscriber_panic(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberPanicked)
    }

    /// `true` for the debris kinds, which log at debug verbosity.
    #[inline]
    pub fn is_debris(&self) -> bool {
        matches!(
            self.kind,
            EventKind::ShapeSpawned | EventKind::ShapeEvicted | EventKind::ShapeRejected
        )
    }
}
