//! # Function-backed task (`TaskFn`)
//!
//! [`TaskFn`] wraps a closure `F: FnOnce(CancellationToken) -> Fut`. The
//! closure runs once, at registration, and the future it returns becomes the
//! task body. State the body needs is moved into the closure.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use orbitvisor::{TaskFn, TaskRef, TaskError, yield_now};
//!
//! let t: TaskRef = TaskFn::boxed("worker", |_ctx: CancellationToken| async move {
//!     yield_now().await;
//!     Ok::<_, TaskError>(())
//! });
//!
//! assert_eq!(t.name(), "worker");
//! ```

use std::borrow::Cow;
use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::tasks::task::{BoxTaskFuture, Task, TaskRef};

/// Function-backed task implementation.
#[derive(Debug)]
pub struct TaskFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> TaskFn<F> {
    /// Creates a new function-backed task.
    ///
    /// Prefer [`TaskFn::boxed`] when you immediately need a [`TaskRef`].
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self { name: name.into(), f }
    }
}

impl<F, Fut> TaskFn<F>
where
    F: FnOnce(CancellationToken) -> Fut + 'static,
    Fut: Future<Output = Result<(), TaskError>> + 'static,
{
    /// Creates the task and returns it as an owned handle (`Box<dyn Task>`).
    pub fn boxed(name: impl Into<Cow<'static, str>>, f: F) -> TaskRef {
        Box::new(Self::new(name, f))
    }
}

impl<F, Fut> Task for TaskFn<F>
where
    F: FnOnce(CancellationToken) -> Fut + 'static,
    Fut: Future<Output = Result<(), TaskError>> + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn spawn(self: Box<Self>, ctx: CancellationToken) -> BoxTaskFuture {
        Box::pin((self.f)(ctx))
    }
}
