//! Error types used by the orbitvisor runtime, its tasks and the engine boundary.
//!
//! This module defines three error enums:
//!
//! - [`RuntimeError`]: faults that escape task containment and end the drive loop.
//! - [`TaskError`]: faults raised by an individual task body.
//! - [`EngineError`]: failures reported by the external simulation engine.
//!
//! All of them provide `as_label` (stable snake_case label for logs) and `as_message`.

use std::any::Any;

use thiserror::Error;

/// # Errors produced by the orbitvisor runtime.
///
/// These end the supervisor's drive loop. By the time one is returned,
/// every registered task has already been killed.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// One-time world setup (static bodies, camera) failed before any task ran.
    #[error("world setup failed: {source}")]
    SetupFailed {
        /// The engine failure that aborted setup.
        #[source]
        source: EngineError,
    },

    /// A task faulted and the fault policy requested shutdown.
    #[error("task {task} faulted: {error}")]
    TaskFaulted {
        /// Name of the faulted task.
        task: String,
        /// The captured task fault.
        #[source]
        error: TaskError,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use orbitvisor::{EngineError, RuntimeError};
    ///
    /// let err = RuntimeError::SetupFailed { source: EngineError::Rejected { what: "planet".into() } };
    /// assert_eq!(err.as_label(), "runtime_setup_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::SetupFailed { .. } => "runtime_setup_failed",
            RuntimeError::TaskFaulted { .. } => "runtime_task_faulted",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::SetupFailed { source } => format!("setup failed: {source}"),
            RuntimeError::TaskFaulted { task, error } => {
                format!("task={task} fault={}", error.as_message())
            }
        }
    }
}

/// # Errors produced by task bodies.
///
/// Any of these, returned from a task or captured from a panic, makes the
/// scheduler mark the task `Killed`.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError {
    /// Task step failed.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Non-recoverable fatal error.
    #[error("fatal error: {error}")]
    Fatal {
        /// The underlying error message.
        error: String,
    },

    /// Task body panicked; the panic was caught at the scheduler boundary.
    #[error("panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },

    /// Task observed its cancellation token and bailed out.
    #[error("context cancelled")]
    Canceled,
}

impl TaskError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use orbitvisor::TaskError;
    ///
    /// let err = TaskError::Panicked { info: "boom".into() };
    /// assert_eq!(err.as_label(), "task_panicked");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Fatal { .. } => "task_fatal",
            TaskError::Panicked { .. } => "task_panicked",
            TaskError::Canceled => "task_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Fatal { error } => format!("fatal: {error}"),
            TaskError::Panicked { info } => format!("panic: {info}"),
            TaskError::Canceled => "context cancelled".to_string(),
        }
    }

    /// `Canceled` is a graceful exit, everything else is a fault.
    pub fn is_fault(&self) -> bool {
        !matches!(self, TaskError::Canceled)
    }
}

impl From<EngineError> for TaskError {
    fn from(err: EngineError) -> Self {
        TaskError::Fail {
            error: err.to_string(),
        }
    }
}

/// # Errors reported by the external engine.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The engine refused to create the requested body or shape.
    #[error("engine rejected {what}")]
    Rejected {
        /// What was being created.
        what: String,
    },

    /// The engine is no longer accepting requests.
    #[error("engine unavailable")]
    Unavailable,
}

impl EngineError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            EngineError::Rejected { .. } => "engine_rejected",
            EngineError::Unavailable => "engine_unavailable",
        }
    }
}

/// Renders a caught panic payload as text.
pub(crate) fn panic_info(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canceled_is_not_a_fault() {
        assert!(!TaskError::Canceled.is_fault());
        assert!(TaskError::Fail { error: "x".into() }.is_fault());
        assert!(TaskError::Panicked { info: "x".into() }.is_fault());
    }

    #[test]
    fn engine_error_converts_into_task_failure() {
        let err: TaskError = EngineError::Unavailable.into();
        assert_eq!(err.as_label(), "task_failed");
        assert_eq!(err.as_message(), "error: engine unavailable");
    }

    #[test]
    fn panic_payloads_render_as_text() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let fixed: Box<dyn Any + Send> = Box::new("fixed");
        let other: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_info(&*owned), "owned");
        assert_eq!(panic_info(&*fixed), "fixed");
        assert_eq!(panic_info(&*other), "unknown panic");
    }

    #[test]
    fn runtime_message_names_the_task() {
        let err = RuntimeError::TaskFaulted {
            task: "spawner".into(),
            error: TaskError::Fatal { error: "nope".into() },
        };
        assert_eq!(err.as_message(), "task=spawner fault=fatal: nope");
        assert_eq!(err.to_string(), "task spawner faulted: fatal error: nope");
    }
}
