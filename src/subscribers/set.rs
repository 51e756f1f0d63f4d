//! # SubscriberSet: panic-isolated fan-out over multiple subscribers
//!
//! [`SubscriberSet`] hands each [`Event`] to every subscriber in turn.
//!
//! ## What it guarantees
//! - Every subscriber sees every event, in publish order.
//! - A panic inside one subscriber is caught; the remaining subscribers still
//!   get the event and a `SubscriberPanicked` event is published on the bus.
//!
//! ## What it does **not** guarantee
//! - No retry of an event a subscriber panicked on.
//!
//! ## Diagram
//! ```text
//!    emit(&Event)
//!        ├──► catch_unwind(S1.on_event) ──► panic → Bus: SubscriberPanicked
//!        ├──► catch_unwind(S2.on_event)
//!        └──► catch_unwind(SN.on_event)
//! ```
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave a subscriber's own
//! `RefCell` state inconsistent if it panics mid-update.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;

use crate::error::panic_info;
use crate::events::{Bus, Event};

use super::Subscribe;

/// Fan-out over subscribers with panic isolation.
pub struct SubscriberSet {
    subs: Vec<Rc<dyn Subscribe>>,
    bus: Bus,
}

impl SubscriberSet {
    /// Creates a set that reports subscriber panics on `bus`.
    #[must_use]
    pub fn new(subs: Vec<Rc<dyn Subscribe>>, bus: Bus) -> Self {
        Self { subs, bus }
    }

    /// Number of subscribers.
    pub fn len(&self) -> usize {
        self.subs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subs.is_empty()
    }

    /// Delivers `event` to every subscriber.
    ///
    /// A panic while handling a `SubscriberPanicked` event is not re-published,
    /// so a subscriber that always panics cannot feed itself forever.
    pub fn emit(&self, event: &Event) {
        for sub in &self.subs {
            let res = catch_unwind(AssertUnwindSafe(|| sub.on_event(event)));
            if let Err(payload) = res {
                if !event.is_subscriber_panic() {
                    self.bus
                        .publish(Event::subscriber_panicked(sub.name(), panic_info(&*payload)));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder(RefCell<Vec<EventKind>>);

    impl Subscribe for Recorder {
        fn on_event(&self, event: &Event) {
            self.0.borrow_mut().push(event.kind);
        }
        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    struct Grumpy;

    impl Subscribe for Grumpy {
        fn on_event(&self, _event: &Event) {
            panic!("grumpy subscriber");
        }
        fn name(&self) -> &'static str {
            "grumpy"
        }
    }

    #[test]
    fn panic_is_isolated_and_reported() {
        let bus = Bus::new(16);
        let mut tap = bus.tap();
        let rec = Rc::new(Recorder::default());
        let set = SubscriberSet::new(vec![Rc::new(Grumpy), rec.clone()], bus);

        set.emit(&Event::new(EventKind::TaskStopped));
        assert_eq!(*rec.0.borrow(), vec![EventKind::TaskStopped]);

        let published = tap.drain();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].kind, EventKind::SubscriberPanicked);
        assert_eq!(published[0].task.as_deref(), Some("grumpy"));
        assert_eq!(published[0].reason.as_deref(), Some("grumpy subscriber"));

        // panic on a panic event is swallowed instead of looping
        set.emit(&published[0]);
        assert!(tap.drain().is_empty());
    }
}
