//! # Cooperative task abstraction.
//!
//! A [`Task`] is turned into a future exactly once, when it is registered
//! with the scheduler. The scheduler then polls that future one step per turn;
//! every `.await` on [`yield_now`](crate::tasks::yield_now) is a point where
//! control goes back to the scheduler.
//!
//! Futures are `!Send`: everything runs on one thread, so task bodies may
//! freely hold `Rc`/`RefCell` state.
//!
//! A task receives a [`CancellationToken`]. A killed task is simply never
//! polled again, so checking the token is only needed to stop early on a
//! graceful shutdown request.
//!
//! # Example
//! ```
//! use tokio_util::sync::CancellationToken;
//! use orbitvisor::{BoxTaskFuture, Task, TaskError, yield_now};
//!
//! struct Ticker { ticks: u32 }
//!
//! impl Task for Ticker {
//!     fn name(&self) -> &str { "ticker" }
//!
//!     fn spawn(self: Box<Self>, ctx: CancellationToken) -> BoxTaskFuture {
//!         Box::pin(async move {
//!             for _ in 0..self.ticks {
//!                 if ctx.is_cancelled() {
//!                     return Err(TaskError::Canceled);
//!                 }
//!                 yield_now().await;
//!             }
//!             Ok(())
//!         })
//!     }
//! }
//! ```

use futures::future::LocalBoxFuture;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// Boxed, single-threaded task body.
pub type BoxTaskFuture = LocalBoxFuture<'static, Result<(), TaskError>>;

/// Owned handle to a task, as accepted by the scheduler.
pub type TaskRef = Box<dyn Task>;

/// # Named, cooperatively scheduled unit of work.
pub trait Task: 'static {
    /// Returns a stable, human-readable task name.
    fn name(&self) -> &str;

    /// Consumes the task and produces its body.
    fn spawn(self: Box<Self>, ctx: CancellationToken) -> BoxTaskFuture;
}
