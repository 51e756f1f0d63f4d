//! # SpawnPolicy: timer-gated debris generation.
//!
//! Every resumption samples the clock. Once it reads strictly past the
//! deadline a random candidate is offered to the [`EntityPool`] and the deadline moves to
//! `now + drop_period`, whatever the pool decided.
//!
//! ## Candidate shape
//! - kind: sphere or box, equally likely
//! - size: each parameter is `exp(-U)`, `U ~ Uniform[0, size_exponent]`
//! - position: `(drop_x ± jitter, spawn_height, drop_z ± jitter)`

use std::rc::Rc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio_util::sync::CancellationToken;

use crate::config::SpawnConfig;
use crate::engine::{Clock, Shape, SharedWorld, Vec3};
use crate::error::TaskError;
use crate::events::Bus;
use crate::tasks::{BoxTaskFuture, Task, TaskRef, yield_now};

use super::pool::{EntityPool, ReleaseCounter, SpawnOutcome};

/// Periodic spawner feeding an [`EntityPool`].
pub struct SpawnPolicy {
    cfg: SpawnConfig,
    pool: EntityPool,
    rng: StdRng,
    clock: Rc<dyn Clock>,
    next_drop_time: f64,
}

impl SpawnPolicy {
    /// Creates the policy; the first spawn is due one period from now.
    pub fn new(cfg: SpawnConfig, world: SharedWorld, clock: Rc<dyn Clock>, bus: Bus) -> Self {
        let rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random()),
        };
        let pool = EntityPool::new(cfg.max_shapes, cfg.overflow, world, bus);
        let next_drop_time = clock.now() + cfg.drop_period_clamped();
        Self {
            cfg,
            pool,
            rng,
            clock,
            next_drop_time,
        }
    }

    /// Counts teardown releases of this policy's pool into `counter`.
    pub fn with_release_counter(mut self, counter: ReleaseCounter) -> Self {
        self.pool = self.pool.with_release_counter(counter);
        self
    }

    /// Runs one spawn opportunity at the current clock reading.
    pub fn tick(&mut self) -> Result<SpawnOutcome, TaskError> {
        let now = self.clock.now();
        self.tick_at(now)
    }

    /// Runs one spawn opportunity at `now`.
    ///
    /// Spawns only once `now` is strictly past the deadline; a sample landing
    /// exactly on it stays idle.
    pub fn tick_at(&mut self, now: f64) -> Result<SpawnOutcome, TaskError> {
        if self.cfg.is_disabled() {
            return Ok(SpawnOutcome::Disabled);
        }
        if now <= self.next_drop_time {
            return Ok(SpawnOutcome::Idle);
        }

        let (shape, position) = self.candidate();
        let outcome = self.pool.admit(shape, position, now);
        self.next_drop_time = now + self.cfg.drop_period_clamped();
        Ok(outcome?)
    }

    fn candidate(&mut self) -> (Shape, Vec3) {
        let shape = if self.rng.random_bool(0.5) {
            Shape::Sphere {
                radius: self.size(),
            }
        } else {
            Shape::Box {
                extents: Vec3::new(self.size(), self.size(), self.size()),
            }
        };
        let jitter = self.cfg.jitter_clamped();
        let position = Vec3::new(
            self.cfg.drop_x + self.rng.random_range(-jitter..=jitter),
            self.cfg.spawn_height,
            self.cfg.drop_z + self.rng.random_range(-jitter..=jitter),
        );
        (shape, position)
    }

    fn size(&mut self) -> f64 {
        let max = self.cfg.size_exponent_clamped();
        (-self.rng.random_range(0.0..=max)).exp()
    }

    pub fn pool(&self) -> &EntityPool {
        &self.pool
    }

    /// Deadline of the next spawn, in clock seconds.
    pub fn next_drop_time(&self) -> f64 {
        self.next_drop_time
    }

    /// Turns the policy into a task that ticks once per turn, forever.
    pub fn into_task(self) -> TaskRef {
        Box::new(SpawnTask { policy: self })
    }
}

struct SpawnTask {
    policy: SpawnPolicy,
}

impl Task for SpawnTask {
    fn name(&self) -> &str {
        "spawner"
    }

    fn spawn(self: Box<Self>, ctx: CancellationToken) -> BoxTaskFuture {
        let mut policy = self.policy;
        Box::pin(async move {
            loop {
                if ctx.is_cancelled() {
                    return Err(TaskError::Canceled);
                }
                policy.tick()?;
                yield_now().await;
            }
        })
    }
}
