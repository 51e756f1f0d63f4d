//! # ObserverController: input event state machine.
//!
//! Two phases, `Running` and the terminal `Exiting`. Each dispatched event
//! is applied to [`ObserverState`] and mirrored to the engine through the
//! [`ObserverHandle`]. Once `Exiting`, events are dropped untouched.
//!
//! As a task (see [`ObserverController::into_task`]) the controller polls
//! its [`EventSource`] once per turn and yields after every poll, so at most
//! one event is handled per turn.

use tokio_util::sync::CancellationToken;

use crate::config::ObserverConfig;
use crate::engine::{EventSource, InputEvent, ObserverHandle, Rotation, Vec3, keys};
use crate::error::TaskError;
use crate::tasks::{BoxTaskFuture, Task, TaskRef, yield_now};

/// Controller lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerPhase {
    Running,
    /// Terminal: the task body returns.
    Exiting,
}

/// Observer state as last set by the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct ObserverState {
    pub position: Vec3,
    /// Cumulative rotation applied since startup.
    pub rotation: Rotation,
    /// Movement speed, `0..=10`.
    pub speed: u8,
    pub collidable: bool,
}

/// Applies input events to the observer.
pub struct ObserverController {
    cfg: ObserverConfig,
    state: ObserverState,
    handle: Box<dyn ObserverHandle>,
    phase: ControllerPhase,
}

impl ObserverController {
    /// Creates a running controller with the observer at its start position.
    pub fn new(cfg: ObserverConfig, handle: Box<dyn ObserverHandle>) -> Self {
        let state = ObserverState {
            position: cfg.start_position,
            rotation: Rotation::default(),
            speed: 0,
            collidable: cfg.initially_collidable,
        };
        Self {
            cfg,
            state,
            handle,
            phase: ControllerPhase::Running,
        }
    }

    pub fn state(&self) -> &ObserverState {
        &self.state
    }

    pub fn phase(&self) -> ControllerPhase {
        self.phase
    }

    /// Applies one event and returns the phase after it.
    pub fn dispatch(&mut self, event: InputEvent) -> ControllerPhase {
        if self.phase == ControllerPhase::Exiting {
            return self.phase;
        }

        match event {
            InputEvent::Exit => self.phase = ControllerPhase::Exiting,
            InputEvent::Key { is_down: false, .. } => {}
            InputEvent::Key { code, .. } => self.on_key_down(code),
            InputEvent::MouseMove { dx, dy } => {
                let s = self.cfg.sensitivity;
                let delta = Rotation {
                    pitch: -dy * s,
                    yaw: -dx * s,
                    roll: 0.0,
                };
                self.state.rotation += delta;
                self.handle.add_rotation(delta);
            }
        }
        self.phase
    }

    fn on_key_down(&mut self, code: u32) {
        match code {
            keys::ESCAPE => self.phase = ControllerPhase::Exiting,
            keys::DIGIT_0 => self.set_speed(self.cfg.zero_key_speed.speed()),
            keys::DIGIT_1..=keys::DIGIT_9 => {
                // DIGIT_1..=DIGIT_9 spans 9 codes, so this always fits
                let speed = u8::try_from(code - keys::DIGIT_1 + 1).unwrap_or(9);
                self.set_speed(speed);
            }
            c if c == self.cfg.toggle_collision_key => {
                self.state.collidable = !self.state.collidable;
                self.handle.set_collidable(self.state.collidable);
            }
            _ => {}
        }
    }

    fn set_speed(&mut self, speed: u8) {
        self.state.speed = speed;
        self.handle.set_speed(speed);
    }

    /// Turns the controller into a task that drains `source` until exit.
    pub fn into_task(self, source: Box<dyn EventSource>) -> TaskRef {
        Box::new(ObserverTask {
            controller: self,
            source,
        })
    }
}

struct ObserverTask {
    controller: ObserverController,
    source: Box<dyn EventSource>,
}

impl Task for ObserverTask {
    fn name(&self) -> &str {
        "observer"
    }

    fn spawn(self: Box<Self>, ctx: CancellationToken) -> BoxTaskFuture {
        let ObserverTask {
            mut controller,
            mut source,
        } = *self;
        Box::pin(async move {
            loop {
                if ctx.is_cancelled() {
                    return Err(TaskError::Canceled);
                }
                if let Some(event) = source.poll_event() {
                    if controller.dispatch(event) == ControllerPhase::Exiting {
                        return Ok(());
                    }
                }
                yield_now().await;
            }
        })
    }
}
