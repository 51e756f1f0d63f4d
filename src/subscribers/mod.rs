//! # Event subscribers for the orbitvisor runtime.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`]
//! fan-out and the built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Scheduler / Spawner ── publish(Event) ──► Bus ──► Tap (in Supervisor)
//!                                                        │ drain() after each turn
//!                                                        ▼
//!                                                  SubscriberSet::emit(&Event)
//!                                                   ┌────┴────┬─────────┐
//!                                                   ▼         ▼         ▼
//!                                               LogWriter  Metrics   Custom
//! ```
//!
//! ## Implementing custom subscribers
//! ```
//! use orbitvisor::{Event, EventKind, Subscribe};
//!
//! struct FaultCounter(std::cell::Cell<u32>);
//!
//! impl Subscribe for FaultCounter {
//!     fn on_event(&self, event: &Event) {
//!         if matches!(event.kind, EventKind::TaskFailed) {
//!             self.0.set(self.0.get() + 1);
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "fault-counter" }
//! }
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscriber;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;
