//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish runtime events emitted by the scheduler, the supervisor and the
//! spawn task.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`], [`Tap`] thin wrapper over `tokio::sync::broadcast` and its polling receiver
//!
//! ## Quick reference
//! - **Publishers**: `Scheduler` (task lifecycle), `Supervisor` (world, shutdown),
//!   `SpawnPolicy` / `EntityPool` (debris), `SubscriberSet` (subscriber panics).
//! - **Consumer**: `Supervisor` drains its [`Tap`] after every turn and fans
//!   out to the `SubscriberSet`.

mod bus;
mod event;

pub use bus::{Bus, Tap};
pub use event::{Event, EventKind};
