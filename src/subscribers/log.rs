//! # LogWriter: simple event printer
//!
//! A minimal subscriber that prints incoming [`Event`]s, one line each.
//! Faults go to stderr, everything else to stdout. Debris events
//! (spawned/evicted/rejected) are only printed when `verbose` is set.
//!
//! ## Example output
//! ```text
//! [registered] task=Some("observer")
//! [world-populated] bodies=Some(4)
//! [spawned] shape=Some(Sphere) handle=Some(7) t=1.000 pool=Some(1)
//! [failed] task=Some("spawner") err=Some("panic: boom")
//! [killed] task=Some("observer") reason=Some("fault")
//! [all-stopped] turns=Some(1200)
//! ```

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter {
    verbose: bool,
}

impl LogWriter {
    /// Construct a new [`LogWriter`] that skips debris events.
    #[must_use]
    pub fn new() -> Self {
        Self { verbose: false }
    }

    /// Construct a [`LogWriter`] that also prints every debris event.
    #[must_use]
    pub fn verbose() -> Self {
        Self { verbose: true }
    }

    /// Renders the log line for `e`, or `None` when it is filtered out.
    pub fn render(&self, e: &Event) -> Option<String> {
        if e.is_debris() && !self.verbose {
            return None;
        }
        let line = match e.kind {
            EventKind::TaskRegistered => format!("[registered] task={:?}", e.task),
            EventKind::TaskStopped => format!("[stopped] task={:?}", e.task),
            EventKind::TaskFailed => {
                format!("[failed] task={:?} err={:?}", e.task, e.reason)
            }
            EventKind::TaskKilled => {
                format!("[killed] task={:?} reason={:?}", e.task, e.reason)
            }
            EventKind::WorldPopulated => format!("[world-populated] bodies={:?}", e.count),
            EventKind::SetupFailed => format!("[setup-failed] err={:?}", e.reason),
            EventKind::ShapeSpawned | EventKind::ShapeEvicted | EventKind::ShapeRejected => {
                let tag = match e.kind {
                    EventKind::ShapeSpawned => "spawned",
                    EventKind::ShapeEvicted => "evicted",
                    _ => "rejected",
                };
                format!(
                    "[{tag}] shape={:?} handle={:?} t={:.3} pool={:?}",
                    e.shape,
                    e.handle.map(|h| h.0),
                    e.sim_time.unwrap_or_default(),
                    e.count
                )
            }
            EventKind::ShapesReleased => format!("[shapes-released] count={:?}", e.count),
            EventKind::ShutdownRequested => "[shutdown-requested]".to_string(),
            EventKind::AllStopped => format!("[all-stopped] turns={:?}", e.count),
            EventKind::SubscriberPanicked => format!(
                "[subscriber-panicked] subscriber={} info={}",
                e.task.as_deref().unwrap_or("unknown"),
                e.reason.as_deref().unwrap_or("unknown"),
            ),
            EventKind::SubscriberOverflow => {
                format!("[subscriber-overflow] skipped={:?}", e.count)
            }
        };
        Some(line)
    }
}

impl Subscribe for LogWriter {
    fn on_event(&self, e: &Event) {
        let Some(line) = self.render(e) else {
            return;
        };
        match e.kind {
            EventKind::TaskFailed | EventKind::SetupFailed | EventKind::SubscriberPanicked => {
                eprintln!("{line}");
            }
            _ => println!("{line}"),
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ShapeHandle, ShapeKind};

    #[test]
    fn debris_is_filtered_unless_verbose() {
        let ev = Event::new(EventKind::ShapeSpawned)
            .with_shape(ShapeKind::Sphere)
            .with_handle(ShapeHandle(7))
            .with_sim_time(1.0)
            .with_count(1);

        assert_eq!(LogWriter::new().render(&ev), None);
        assert_eq!(
            LogWriter::verbose().render(&ev).as_deref(),
            Some("[spawned] shape=Some(Sphere) handle=Some(7) t=1.000 pool=Some(1)")
        );
    }

    #[test]
    fn faults_carry_task_and_reason() {
        let ev = Event::new(EventKind::TaskFailed)
            .with_task("spawner")
            .with_reason("panic: boom");
        assert_eq!(
            LogWriter::new().render(&ev).as_deref(),
            Some(r#"[failed] task=Some("spawner") err=Some("panic: boom")"#)
        );
    }
}
