//! # In-memory engine collaborators.
//!
//! Stand-ins for the external engine used by tests and the headless demo.
//! Every type here is a cheap clonable handle over shared state, so a test can
//! keep one clone for inspection while the runtime owns another.
//!
//! - [`HeadlessWorld`]: records bodies, live shapes and releases
//! - [`ScriptedEvents`]: FIFO of pre-loaded events
//! - [`ChannelEvents`]: events fed from a `tokio::sync::mpsc` channel
//! - [`ManualClock`] / [`MonotonicClock`]: simulated and real time
//! - [`RecordingObserver`]: accumulates observer calls

use std::cell::{Cell, Ref, RefCell};
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;
use std::time::Instant;

use tokio::sync::mpsc;

use super::{
    BodyHandle, Clock, EventSource, InputEvent, ObserverHandle, Rotation, Shape, ShapeHandle,
    StaticBody, Vec3, World,
};
use crate::error::EngineError;

/// Engine world that keeps everything in memory.
#[derive(Debug, Default)]
pub struct HeadlessWorld {
    next_id: u64,
    camera: Option<Vec3>,
    bodies: Vec<(BodyHandle, StaticBody)>,
    shapes: BTreeMap<ShapeHandle, (Shape, Vec3)>,
    released: Vec<ShapeHandle>,
    refuse_bodies: bool,
    refuse_shapes: bool,
}

impl HeadlessWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a fresh world for sharing with the runtime.
    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Makes every later `create_static_body` fail.
    pub fn refuse_static_bodies(&mut self) {
        self.refuse_bodies = true;
    }

    /// Makes every later `create_dynamic_shape` fail.
    pub fn refuse_shapes(&mut self) {
        self.refuse_shapes = true;
    }

    pub fn camera(&self) -> Option<Vec3> {
        self.camera
    }

    pub fn bodies(&self) -> &[(BodyHandle, StaticBody)] {
        &self.bodies
    }

    /// Shapes created and not yet released.
    pub fn live_shapes(&self) -> usize {
        self.shapes.len()
    }

    pub fn shape(&self, handle: ShapeHandle) -> Option<&(Shape, Vec3)> {
        self.shapes.get(&handle)
    }

    /// Release order, oldest call first.
    pub fn released(&self) -> &[ShapeHandle] {
        &self.released
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl World for HeadlessWorld {
    fn set_camera(&mut self, position: Vec3) {
        self.camera = Some(position);
    }

    fn create_static_body(&mut self, body: &StaticBody) -> Result<BodyHandle, EngineError> {
        if self.refuse_bodies {
            return Err(EngineError::Rejected {
                what: body.name.to_string(),
            });
        }
        let handle = BodyHandle(self.next_id());
        self.bodies.push((handle, body.clone()));
        Ok(handle)
    }

    fn create_dynamic_shape(
        &mut self,
        shape: &Shape,
        position: Vec3,
    ) -> Result<ShapeHandle, EngineError> {
        if self.refuse_shapes {
            return Err(EngineError::Rejected {
                what: format!("{:?}", shape.kind()).to_lowercase(),
            });
        }
        let handle = ShapeHandle(self.next_id());
        self.shapes.insert(handle, (*shape, position));
        Ok(handle)
    }

    fn release_shape(&mut self, handle: ShapeHandle) {
        if self.shapes.remove(&handle).is_some() {
            self.released.push(handle);
        }
    }
}

/// Pre-loaded event queue; clones share the queue.
#[derive(Debug, Clone, Default)]
pub struct ScriptedEvents {
    queue: Rc<RefCell<VecDeque<InputEvent>>>,
}

impl ScriptedEvents {
    pub fn new(events: impl IntoIterator<Item = InputEvent>) -> Self {
        Self {
            queue: Rc::new(RefCell::new(events.into_iter().collect())),
        }
    }

    pub fn push(&self, event: InputEvent) {
        self.queue.borrow_mut().push_back(event);
    }

    /// Events not yet polled.
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }
}

impl EventSource for ScriptedEvents {
    fn poll_event(&mut self) -> Option<InputEvent> {
        self.queue.borrow_mut().pop_front()
    }
}

/// Event source fed by another producer (stdin reader, window thread).
///
/// A closed channel is reported as [`InputEvent::Exit`] once, so the
/// controller shuts down when its producer goes away.
#[derive(Debug)]
pub struct ChannelEvents {
    rx: mpsc::UnboundedReceiver<InputEvent>,
    closed: bool,
}

impl ChannelEvents {
    pub fn new(rx: mpsc::UnboundedReceiver<InputEvent>) -> Self {
        Self { rx, closed: false }
    }
}

impl EventSource for ChannelEvents {
    fn poll_event(&mut self) -> Option<InputEvent> {
        match self.rx.try_recv() {
            Ok(ev) => Some(ev),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                if self.closed {
                    None
                } else {
                    self.closed = true;
                    Some(InputEvent::Exit)
                }
            }
        }
    }
}

/// Simulated clock advanced by hand; clones share the time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn set(&self, now: f64) {
        self.now.set(now);
    }

    pub fn advance(&self, dt: f64) {
        self.now.set(self.now.get() + dt);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }
}

/// Wall-clock seconds since construction.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// What a [`RecordingObserver`] has been told so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObserverLog {
    pub speed: Option<u8>,
    pub collidable: Option<bool>,
    pub rotation: Rotation,
    pub calls: usize,
}

/// Observer handle that records every call; clones share the log.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    log: Rc<RefCell<ObserverLog>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> Ref<'_, ObserverLog> {
        self.log.borrow()
    }
}

impl ObserverHandle for RecordingObserver {
    fn set_speed(&mut self, speed: u8) {
        let mut log = self.log.borrow_mut();
        log.speed = Some(speed);
        log.calls += 1;
    }

    fn set_collidable(&mut self, collidable: bool) {
        let mut log = self.log.borrow_mut();
        log.collidable = Some(collidable);
        log.calls += 1;
    }

    fn add_rotation(&mut self, rotation: Rotation) {
        let mut log = self.log.borrow_mut();
        log.rotation += rotation;
        log.calls += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_tracks_release() {
        let mut world = HeadlessWorld::new();
        let a = world
            .create_dynamic_shape(&Shape::Sphere { radius: 1.0 }, Vec3::ZERO)
            .unwrap();
        let b = world
            .create_dynamic_shape(&Shape::Sphere { radius: 0.5 }, Vec3::ZERO)
            .unwrap();
        world.release_shape(a);
        world.release_shape(a);
        assert_eq!(world.live_shapes(), 1);
        assert_eq!(world.released(), &[a]);
        assert!(world.shape(b).is_some());
    }

    #[test]
    fn channel_reports_exit_once_when_closed() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut events = ChannelEvents::new(rx);
        tx.send(InputEvent::key_down(30)).unwrap();
        assert_eq!(events.poll_event(), Some(InputEvent::key_down(30)));
        assert_eq!(events.poll_event(), None);
        drop(tx);
        assert_eq!(events.poll_event(), Some(InputEvent::Exit));
        assert_eq!(events.poll_event(), None);
    }

    #[test]
    fn manual_clock_is_shared() {
        let clock = ManualClock::new(1.0);
        let view = clock.clone();
        clock.advance(0.5);
        assert_eq!(view.now(), 1.5);
    }
}
