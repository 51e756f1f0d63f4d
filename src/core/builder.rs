use std::rc::Rc;

use tokio_util::sync::CancellationToken;

use super::supervisor::Supervisor;
use crate::{
    config::Config,
    engine::SharedWorld,
    events::Bus,
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for constructing a [`Supervisor`].
pub struct SupervisorBuilder {
    cfg: Config,
    world: SharedWorld,
    subscribers: Vec<Rc<dyn Subscribe>>,
    token: Option<CancellationToken>,
}

impl SupervisorBuilder {
    /// Creates a new builder with the given configuration and engine world.
    pub fn new(cfg: Config, world: SharedWorld) -> Self {
        Self {
            cfg,
            world,
            subscribers: Vec::new(),
            token: None,
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events (task lifecycle, world setup,
    /// debris) synchronously, after every scheduler turn.
    pub fn with_subscribers(mut self, subscribers: Vec<Rc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Uses an existing token as the shutdown token, e.g. one already wired
    /// to an OS signal listener.
    pub fn with_shutdown_token(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Builds the supervisor:
    /// - event bus sized from `cfg.bus_capacity`
    /// - subscriber set reporting panics on that bus
    /// - scheduler whose task tokens derive from the shutdown token
    pub fn build(self) -> Supervisor {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let subs = SubscriberSet::new(self.subscribers, bus.clone());
        let token = self.token.unwrap_or_default();
        Supervisor::new_internal(self.cfg, bus, subs, self.world, token)
    }
}
