//! # orbitvisor
//!
//! **Orbitvisor** is the cooperative scheduling and entity-lifecycle core of
//! a real-time 3D world: a home planet, moons, a star, a user-steered
//! observer and a stream of falling debris.
//!
//! The simulation engine itself lives elsewhere and is reached only through
//! the small traits in [`engine`]. This crate decides *when* things happen:
//! which task runs next, when debris spawns and dies, and how input moves
//! the observer.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────────────┐          ┌──────────────────────┐
//!     │  ObserverController  │          │     SpawnPolicy      │
//!     │  (input → observer)  │          │ (timer → EntityPool) │
//!     └──────────┬───────────┘          └──────────┬───────────┘
//!                ▼ into_task()                     ▼ into_task()
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Supervisor                                                       │
//! │  - populate_world() once: camera + static bodies                  │
//! │  - Scheduler (round-robin, one poll per turn)                     │
//! │  - FaultPolicy, shutdown token                                    │
//! └──────┬──────────────────────────────────────────────────┬─────────┘
//!        │ publish(Event)                                   │ drain after each turn
//!        ▼                                                  ▼
//! ┌──────────────────────────────┐                ┌───────────────────┐
//! │ Bus (tokio broadcast)        │ ─────────────► │   SubscriberSet   │
//! └──────────────────────────────┘                └─────────┬─────────┘
//!                                                           ▼
//!                                                LogWriter / custom subscribers
//! ```
//!
//! ### Lifecycle
//! ```text
//! Supervisor::run()
//!   ├─► populate_world()                    (SetupFailed → kill_all, Err)
//!   ├─► while live_count() > 1:
//!   │     ├─ run_once(): observer polls one event, or spawner checks its deadline
//!   │     ├─ task fault ──► FaultPolicy::Shutdown → kill_all, Err(TaskFaulted)
//!   │     └─ shutdown token cancelled ──► kill_all
//!   └─► kill the spawner (pool releases its shapes), AllStopped, Ok(RunReport)
//! ```
//!
//! ## Features
//! | Area              | Description                                                | Key types / traits                          |
//! |-------------------|------------------------------------------------------------|---------------------------------------------|
//! | **Scheduling**    | Cooperative `!Send` tasks, one poll per turn.              | [`Scheduler`], [`Task`], [`yield_now`]       |
//! | **Supervision**   | World setup, drive loop, fault policy, shutdown.           | [`Supervisor`], [`RunReport`]               |
//! | **Observer**      | Input event state machine.                                 | [`ObserverController`], [`ZeroKeySpeed`]    |
//! | **Debris**        | Bounded shape pool with two overflow disciplines.          | [`SpawnPolicy`], [`EntityPool`]             |
//! | **Subscriber API**| Hook into runtime events.                                  | [`Subscribe`], [`Event`]                    |
//! | **Errors**        | Typed errors for tasks, runtime and engine.                | [`TaskError`], [`RuntimeError`]             |
//! | **Configuration** | Centralized, immutable settings.                           | [`Config`]                                  |
//!
//! ## Optional features
//! - `logging`: exports the built-in [`LogWriter`] subscriber.
//!
//! ## Example
//! ```rust
//! use std::rc::Rc;
//! use orbitvisor::engine::headless::{HeadlessWorld, ManualClock, RecordingObserver, ScriptedEvents};
//! use orbitvisor::engine::{InputEvent, keys};
//! use orbitvisor::{Config, ObserverController, Supervisor};
//!
//! let mut cfg = Config::default();
//! cfg.spawn.seed = Some(42);
//!
//! let world = HeadlessWorld::shared();
//! let clock = ManualClock::new(0.0);
//! let events = ScriptedEvents::new([
//!     InputEvent::key_down(keys::DIGIT_1 + 4),
//!     InputEvent::MouseMove { dx: 10.0, dy: -5.0 },
//!     InputEvent::Exit,
//! ]);
//! let observer = RecordingObserver::new();
//!
//! let mut sup = Supervisor::builder(cfg.clone(), world.clone()).build();
//! let controller = ObserverController::new(cfg.observer.clone(), Box::new(observer.clone()));
//! let spawner = sup.spawn_policy(cfg.spawn.clone(), Rc::new(clock));
//!
//! sup.register(controller.into_task(Box::new(events)));
//! sup.register(spawner.into_task());
//!
//! let report = sup.run()?;
//! assert_eq!(report.finished, 1);
//! assert_eq!(observer.log().speed, Some(5));
//! # Ok::<(), orbitvisor::RuntimeError>(())
//! ```

mod config;
mod core;
pub mod engine;
mod error;
mod events;
mod observer;
mod policies;
mod spawn;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use self::core::shutdown;
pub use self::core::{
    RunReport, Scheduler, Supervisor, SupervisorBuilder, TaskId, TaskState, Turn, TurnOutcome,
};
pub use config::{Config, ObserverConfig, SpawnConfig, WorldConfig};
pub use error::{EngineError, RuntimeError, TaskError};
pub use events::{Bus, Event, EventKind, Tap};
pub use observer::{ControllerPhase, ObserverController, ObserverState};
pub use policies::{FaultPolicy, OverflowPolicy, ZeroKeySpeed};
pub use spawn::{EntityPool, ReleaseCounter, ShapeEntity, SpawnOutcome, SpawnPolicy};
pub use subscribers::{Subscribe, SubscriberSet};
pub use tasks::{BoxTaskFuture, Task, TaskFn, TaskRef, YieldNow, yield_now};

// Optional: expose a simple built-in logger subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
