//! # Supervisor reaction to task faults.
//!
//! - [`FaultPolicy::Shutdown`] a faulted task brings the whole run down:
//!   remaining tasks are killed and `Supervisor::run` returns the fault (default).
//! - [`FaultPolicy::Continue`] the faulted task is gone, the others keep running.
//!
//! Either way the scheduler itself has already contained the fault and
//! published `TaskFailed`.

/// What the supervisor does after a task faults.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaultPolicy {
    /// Kill remaining tasks and stop driving (default).
    Shutdown,
    /// Keep driving the surviving tasks.
    Continue,
}

impl Default for FaultPolicy {
    /// Returns [`FaultPolicy::Shutdown`].
    fn default() -> Self {
        FaultPolicy::Shutdown
    }
}
