//! # Task abstractions.
//!
//! This module provides the core task-related types:
//! - [`Task`] - trait for a named, cooperatively scheduled unit of work
//! - [`TaskFn`] - closure-backed task implementation
//! - [`TaskRef`] - owned handle to a task (`Box<dyn Task>`)
//! - [`yield_now`] - the cooperative suspension point

mod task;
mod task_fn;
mod yield_now;

pub use task::{BoxTaskFuture, Task, TaskRef};
pub use task_fn::TaskFn;
pub use yield_now::{YieldNow, yield_now};
