//! # Event bus for broadcasting runtime events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`]. Publishers
//! (scheduler, supervisor, spawn task) hand events to it without blocking; the
//! supervisor holds a [`Tap`] and drains it between scheduler turns.
//!
//! ## Architecture
//! ```text
//! Publishers:                        Drained by:
//!   Scheduler ──┐
//!   Spawner   ──┼──────► Bus ───────► Tap::drain() ────► SubscriberSet
//!   Supervisor──┘  (broadcast chan)   (in Supervisor, once per turn)
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks; it calls `broadcast::Sender::send`.
//! - **Non-blocking drain**: `Tap::drain()` uses `try_recv` and stops at the first empty read.
//! - **Bounded capacity**: a single ring buffer stores recent events for all receivers.
//! - **Lag handling**: a tap that fell behind yields one `SubscriberOverflow` event
//!   carrying the number of skipped items, then continues with what is left.
//! - **No persistence**: events are lost if there are no active taps at send time.

use tokio::sync::broadcast::{self, error::TryRecvError};

use super::event::Event;

/// Broadcast channel for runtime events.
///
/// ### Properties
/// - **Non-blocking**: `publish()` returns immediately.
/// - **Fire-and-forget**: no delivery or durability guarantees.
/// - **Cloneable**: cheap to clone (internally holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity.
    ///
    /// ### Notes
    /// - Capacity is **shared** across all taps.
    /// - The minimum capacity is 1 (clamped).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self { tx }
    }

    /// Publishes an event to all active taps.
    ///
    /// If there are no taps, the event is dropped.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a tap that observes events published from now on.
    pub fn tap(&self) -> Tap {
        Tap {
            rx: self.tx.subscribe(),
        }
    }
}

/// Polling receiver end of the [`Bus`].
#[derive(Debug)]
pub struct Tap {
    rx: broadcast::Receiver<Event>,
}

impl Tap {
    /// Takes every event currently buffered, in publish order.
    ///
    /// A lag gap is reported in place as a `SubscriberOverflow` event.
    pub fn drain(&mut self) -> Vec<Event> {
        let mut out = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(ev) => out.push(ev),
                Err(TryRecvError::Lagged(skipped)) => {
                    out.push(Event::subscriber_overflow(skipped));
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        out
    }
}
