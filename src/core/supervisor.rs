//! # Supervisor: world setup, drive loop, fault containment and shutdown.
//!
//! The [`Supervisor`] owns the [`Scheduler`], the event [`Bus`] and the
//! [`SubscriberSet`]. It creates the static world once, then drives the
//! scheduler one turn at a time until only the background task is left.
//!
//! ## Drive loop
//! ```text
//! run():
//!   populate_world()            camera + static bodies, once
//!     └─ engine error ──► SetupFailed, kill_all, Err(RuntimeError::SetupFailed)
//!
//!   while live_count() > 1:
//!     ├─ shutdown token cancelled ──► ShutdownRequested, kill_all, break
//!     ├─ scheduler.run_once()
//!     │     └─ Faulted(err):
//!     │          ├─ FaultPolicy::Shutdown ──► kill_all, Err(RuntimeError::TaskFaulted)
//!     │          └─ FaultPolicy::Continue ──► keep driving
//!     └─ flush(): Tap.drain() ──► SubscriberSet::emit(&Event)
//!
//!   kill_all("shutdown")        remaining background task(s)
//!   AllStopped, flush           ──► Ok(RunReport)
//! ```
//!
//! Pending events are flushed before every `kill_all`, so the event that
//! triggered a teardown reaches subscribers even on a tiny bus. Shapes
//! released at teardown are counted through a [`ReleaseCounter`] shared with
//! the spawner built by [`Supervisor::spawn_policy`], not through the bus.
//!
//! Exactly one task is left running when the observer exits: the spawner
//! never finishes on its own. The loop therefore stops at one live task and
//! kills it, which is what makes shutdown deterministic.
//!
//! ## Example
//! ```rust
//! use std::rc::Rc;
//! use orbitvisor::engine::headless::{HeadlessWorld, ManualClock, RecordingObserver, ScriptedEvents};
//! use orbitvisor::engine::InputEvent;
//! use orbitvisor::{Config, ObserverController, Supervisor};
//!
//! let cfg = Config::default();
//! let world = HeadlessWorld::shared();
//! let clock = Rc::new(ManualClock::new(0.0));
//!
//! let mut sup = Supervisor::builder(cfg.clone(), world.clone()).build();
//! let observer = ObserverController::new(cfg.observer.clone(), Box::new(RecordingObserver::new()));
//! let spawner = sup.spawn_policy(cfg.spawn.clone(), clock);
//!
//! sup.register(observer.into_task(Box::new(ScriptedEvents::new([InputEvent::Exit]))));
//! sup.register(spawner.into_task());
//!
//! let report = sup.run().unwrap();
//! assert_eq!(report.killed, 1);
//! assert_eq!(world.borrow().bodies().len(), 4);
//! ```

use std::rc::Rc;

use tokio_util::sync::CancellationToken;

use crate::config::{Config, SpawnConfig};
use crate::core::scheduler::{Scheduler, TaskId, TaskState, TurnOutcome};
use crate::engine::{BodyHandle, Clock, SharedWorld};
use crate::error::{EngineError, RuntimeError};
use crate::events::{Bus, Event, EventKind, Tap};
use crate::policies::FaultPolicy;
use crate::spawn::{ReleaseCounter, SpawnPolicy};
use crate::subscribers::SubscriberSet;
use crate::tasks::TaskRef;

/// The drive loop stops once this many tasks (or fewer) are still live.
const BACKGROUND_TASKS: usize = 1;

/// Summary of a completed [`Supervisor::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunReport {
    /// Scheduler turns driven.
    pub turns: u64,
    /// Tasks whose body returned.
    pub finished: usize,
    /// Tasks killed (faulted, shut down, or left over at the end).
    pub killed: usize,
    /// Debris shapes handed back to the engine at teardown.
    pub shapes_released: usize,
}

/// Top-level driver of one run.
pub struct Supervisor {
    cfg: Config,
    bus: Bus,
    tap: Tap,
    subs: SubscriberSet,
    scheduler: Scheduler,
    token: CancellationToken,
    world: SharedWorld,
    bodies: Vec<BodyHandle>,
    populated: bool,
    shutdown_seen: bool,
    turns: u64,
    releases: ReleaseCounter,
}

impl Supervisor {
    /// Starts building a supervisor for `world`.
    pub fn builder(cfg: Config, world: SharedWorld) -> super::builder::SupervisorBuilder {
        super::builder::SupervisorBuilder::new(cfg, world)
    }

    pub(super) fn new_internal(
        cfg: Config,
        bus: Bus,
        subs: SubscriberSet,
        world: SharedWorld,
        token: CancellationToken,
    ) -> Self {
        let tap = bus.tap();
        let scheduler = Scheduler::new(bus.clone(), token.clone());
        Self {
            cfg,
            bus,
            tap,
            subs,
            scheduler,
            token,
            world,
            bodies: Vec::new(),
            populated: false,
            shutdown_seen: false,
            turns: 0,
            releases: ReleaseCounter::new(),
        }
    }

    /// Bus to hand to tasks that publish their own events.
    pub fn bus(&self) -> Bus {
        self.bus.clone()
    }

    /// Builds a spawner over this supervisor's world and bus whose teardown
    /// releases count toward [`RunReport::shapes_released`].
    pub fn spawn_policy(&self, cfg: SpawnConfig, clock: Rc<dyn Clock>) -> SpawnPolicy {
        SpawnPolicy::new(cfg, self.world.clone(), clock, self.bus())
            .with_release_counter(self.releases.clone())
    }

    /// Tally behind [`RunReport::shapes_released`], for pools built by hand.
    pub fn release_counter(&self) -> ReleaseCounter {
        self.releases.clone()
    }

    /// Cancelling this token asks the running loop to shut down.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Handles of the static bodies created by [`Supervisor::populate_world`].
    pub fn bodies(&self) -> &[BodyHandle] {
        &self.bodies
    }

    /// Places the camera and creates every configured static body.
    ///
    /// Runs at most once; later calls return the existing handles. A failed
    /// body is not retried: the supervisor kills every registered task and
    /// reports `SetupFailed`.
    pub fn populate_world(&mut self) -> Result<&[BodyHandle], RuntimeError> {
        if self.populated {
            return Ok(&self.bodies);
        }

        let created = match self.world.try_borrow_mut() {
            Ok(mut world) => {
                world.set_camera(self.cfg.world.camera);
                self.cfg
                    .world
                    .bodies
                    .iter()
                    .map(|body| world.create_static_body(body))
                    .collect::<Result<Vec<_>, _>>()
            }
            Err(_) => Err(EngineError::Unavailable),
        };

        match created {
            Ok(bodies) => {
                self.bodies = bodies;
                self.populated = true;
                self.bus
                    .publish(Event::new(EventKind::WorldPopulated).with_count(self.bodies.len()));
                self.flush();
                Ok(&self.bodies)
            }
            Err(source) => {
                self.bus
                    .publish(Event::new(EventKind::SetupFailed).with_reason(source.to_string()));
                self.flush();
                self.scheduler.kill_all("setup");
                self.flush();
                Err(RuntimeError::SetupFailed { source })
            }
        }
    }

    /// Adds a task; registration order is round-robin order.
    pub fn register(&mut self, task: TaskRef) -> TaskId {
        let id = self.scheduler.register(task);
        self.flush();
        id
    }

    /// Drives a single turn.
    ///
    /// Returns `Ok(true)` while the loop should keep going, `Ok(false)` once
    /// it is over (background only, nothing runnable, or shutdown).
    pub fn turn(&mut self) -> Result<bool, RuntimeError> {
        if self.token.is_cancelled() {
            if !self.shutdown_seen {
                self.shutdown_seen = true;
                self.bus.publish(Event::new(EventKind::ShutdownRequested));
                self.flush();
            }
            self.scheduler.kill_all("shutdown");
            self.flush();
            return Ok(false);
        }
        if self.scheduler.live_count() <= BACKGROUND_TASKS {
            return Ok(false);
        }

        let Some(turn) = self.scheduler.run_once() else {
            self.flush();
            return Ok(false);
        };
        self.turns += 1;

        let result = match turn.outcome {
            TurnOutcome::Faulted(error) if self.cfg.fault_policy == FaultPolicy::Shutdown => {
                self.flush();
                self.scheduler.kill_all("fault");
                Err(RuntimeError::TaskFaulted {
                    task: turn.name.to_string(),
                    error,
                })
            }
            _ => Ok(self.scheduler.live_count() > BACKGROUND_TASKS),
        };
        self.flush();
        result
    }

    /// Populates the world, drives turns until the loop ends, then tears down.
    ///
    /// On error every task has already been killed and its events delivered.
    pub fn run(&mut self) -> Result<RunReport, RuntimeError> {
        let populated = self.populate_world().map(|_| ());
        if let Err(err) = populated {
            self.finish();
            return Err(err);
        }
        loop {
            match self.turn() {
                Ok(true) => continue,
                Ok(false) => break,
                Err(err) => {
                    self.finish();
                    return Err(err);
                }
            }
        }
        Ok(self.finish())
    }

    /// Kills what is left, announces `AllStopped` and builds the report.
    pub fn finish(&mut self) -> RunReport {
        self.flush();
        self.scheduler.kill_all("shutdown");
        self.bus
            .publish(Event::new(EventKind::AllStopped).with_count(self.turns_usize()));
        self.flush();
        self.report()
    }

    /// Snapshot of the counters so far.
    pub fn report(&self) -> RunReport {
        RunReport {
            turns: self.turns,
            finished: self.scheduler.count(TaskState::Done),
            killed: self.scheduler.count(TaskState::Killed),
            shapes_released: self.releases.get(),
        }
    }

    /// Delivers everything published so far to the subscribers.
    fn flush(&mut self) {
        loop {
            let events = self.tap.drain();
            if events.is_empty() {
                break;
            }
            for ev in &events {
                self.subs.emit(ev);
            }
        }
    }

    fn turns_usize(&self) -> usize {
        usize::try_from(self.turns).unwrap_or(usize::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::headless::HeadlessWorld;
    use crate::error::TaskError;
    use crate::subscribers::Subscribe;
    use crate::tasks::{TaskFn, yield_now};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Kinds(RefCell<Vec<EventKind>>);

    impl Subscribe for Kinds {
        fn on_event(&self, e: &Event) {
            self.0.borrow_mut().push(e.kind);
        }
    }

    fn forever(name: &'static str) -> TaskRef {
        TaskFn::boxed(name, |ctx| async move {
            while !ctx.is_cancelled() {
                yield_now().await;
            }
            Ok(())
        })
    }

    fn steps(name: &'static str, n: u32) -> TaskRef {
        TaskFn::boxed(name, move |_ctx| async move {
            for _ in 0..n {
                yield_now().await;
            }
            Ok(())
        })
    }

    fn supervisor(cfg: Config) -> (Supervisor, Rc<Kinds>, Rc<RefCell<HeadlessWorld>>) {
        let world = HeadlessWorld::shared();
        let kinds = Rc::new(Kinds::default());
        let sup = Supervisor::builder(cfg, world.clone())
            .with_subscribers(vec![kinds.clone() as Rc<dyn Subscribe>])
            .build();
        (sup, kinds, world)
    }

    #[test]
    fn background_task_is_killed_when_foreground_ends() {
        let (mut sup, kinds, world) = supervisor(Config::default());
        sup.register(steps("foreground", 3));
        let bg = sup.register(forever("background"));

        let report = sup.run().unwrap();
        assert_eq!(report.finished, 1);
        assert_eq!(report.killed, 1);
        assert_eq!(sup.scheduler().state(bg), Some(TaskState::Killed));
        assert_eq!(world.borrow().bodies().len(), 4);

        let kinds = kinds.0.borrow();
        assert_eq!(kinds.first(), Some(&EventKind::TaskRegistered));
        assert!(kinds.contains(&EventKind::WorldPopulated));
        assert_eq!(kinds.last(), Some(&EventKind::AllStopped));
    }

    #[test]
    fn fault_shuts_everything_down_by_default() {
        let (mut sup, kinds, _world) = supervisor(Config::default());
        sup.register(forever("observer"));
        sup.register(TaskFn::boxed("spawner", |_ctx| async {
            yield_now().await;
            Err(TaskError::Fatal { error: "engine gone".into() })
        }));
        sup.register(forever("extra"));

        let err = sup.run().unwrap_err();
        match err {
            RuntimeError::TaskFaulted { task, .. } => assert_eq!(task, "spawner"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(sup.scheduler().live_count(), 0);
        let kinds = kinds.0.borrow();
        assert!(kinds.contains(&EventKind::TaskFailed));
        assert_eq!(kinds.iter().filter(|k| **k == EventKind::TaskKilled).count(), 2);
    }

    #[test]
    fn fault_event_reaches_subscribers_on_a_tiny_bus() {
        let mut cfg = Config::default();
        cfg.bus_capacity = 1;
        let (mut sup, kinds, _world) = supervisor(cfg);
        sup.register(forever("observer"));
        sup.register(TaskFn::boxed("spawner", |_ctx| async {
            yield_now().await;
            Err(TaskError::Fatal { error: "engine gone".into() })
        }));
        sup.register(forever("extra"));

        assert!(sup.run().is_err());
        let kinds = kinds.0.borrow();
        assert_eq!(kinds.iter().filter(|k| **k == EventKind::TaskFailed).count(), 1);
    }

    #[test]
    fn continue_policy_keeps_survivors_running() {
        let mut cfg = Config::default();
        cfg.fault_policy = FaultPolicy::Continue;
        let (mut sup, _kinds, _world) = supervisor(cfg);
        sup.register(steps("foreground", 5));
        sup.register(TaskFn::boxed("flaky", |_ctx| async {
            Err(TaskError::Fail { error: "x".into() })
        }));
        sup.register(forever("background"));

        let report = sup.run().unwrap();
        assert_eq!(report.finished, 1);
        assert_eq!(report.killed, 2);
    }

    #[test]
    fn setup_failure_kills_registered_tasks() {
        let (mut sup, kinds, world) = supervisor(Config::default());
        world.borrow_mut().refuse_static_bodies();
        sup.register(forever("a"));
        sup.register(forever("b"));

        let err = sup.run().unwrap_err();
        assert_eq!(err.as_label(), "runtime_setup_failed");
        assert_eq!(sup.scheduler().live_count(), 0);
        assert!(kinds.0.borrow().contains(&EventKind::SetupFailed));
    }

    #[test]
    fn populate_world_is_idempotent() {
        let (mut sup, _kinds, world) = supervisor(Config::default());
        let first = sup.populate_world().unwrap().to_vec();
        let second = sup.populate_world().unwrap().to_vec();
        assert_eq!(first, second);
        assert_eq!(world.borrow().bodies().len(), 4);
        assert_eq!(world.borrow().camera(), Some(Config::default().world.camera));
    }

    #[test]
    fn cancelled_token_stops_the_loop() {
        let (mut sup, kinds, _world) = supervisor(Config::default());
        sup.register(forever("a"));
        sup.register(forever("b"));
        sup.populate_world().unwrap();

        assert!(sup.turn().unwrap());
        sup.shutdown_token().cancel();
        assert!(!sup.turn().unwrap());
        assert!(!sup.turn().unwrap());
        let report = sup.finish();
        assert_eq!(report.killed, 2);
        assert_eq!(report.turns, 1);

        let requested = kinds
            .0
            .borrow()
            .iter()
            .filter(|k| **k == EventKind::ShutdownRequested)
            .count();
        assert_eq!(requested, 1);
    }
}
