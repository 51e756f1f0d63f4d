//! # Event subscriber trait.
//!
//! Provides [`Subscribe`] an extension point for plugging custom event handlers into the runtime.
//!
//! ## Rules
//! - Subscribers run on the scheduler thread, between turns; keep them cheap.
//! - Events are delivered in publish order.
//! - A panicking subscriber is isolated: the panic is caught and reported as
//!   `EventKind::SubscriberPanicked`, other subscribers still get the event.

use crate::events::Event;

/// Event subscriber for runtime observability.
pub trait Subscribe {
    /// Processes a single event.
    ///
    /// Panics are caught; the runtime publishes `EventKind::SubscriberPanicked`.
    fn on_event(&self, event: &Event);

    /// Returns the subscriber name used in logs and panic events.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
