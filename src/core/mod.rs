//! Runtime core: scheduling and supervision.
//!
//! - [`scheduler`]: cooperative round-robin driver of task bodies;
//! - [`supervisor`]: world setup, drive loop, fault policy, shutdown;
//! - [`builder`]: wiring of bus, subscribers and shutdown token;
//! - [`shutdown`]: cross-platform OS signal handling.

mod builder;
mod scheduler;
pub mod shutdown;
mod supervisor;

pub use builder::SupervisorBuilder;
pub use scheduler::{Scheduler, TaskId, TaskState, Turn, TurnOutcome};
pub use supervisor::{RunReport, Supervisor};
