//! # EntityPool: bounded FIFO of live debris shapes.
//!
//! The pool owns the engine handles of every shape it admitted. Shapes leave
//! the pool either by eviction (oldest first) or at teardown, when the pool
//! is dropped and releases whatever is left, newest first. Because teardown
//! lives in `Drop`, a spawn task that is killed mid-run still hands its
//! shapes back.
//!
//! Teardown releases are also added to a [`ReleaseCounter`]. The counter is
//! shared directly with whoever reports on the run, so the total survives a
//! lagging bus.

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::engine::{Shape, ShapeHandle, ShapeKind, SharedWorld, Vec3};
use crate::error::EngineError;
use crate::events::{Bus, Event, EventKind};
use crate::policies::OverflowPolicy;

/// A dynamic shape owned by the pool.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeEntity {
    pub handle: ShapeHandle,
    pub shape: Shape,
    pub position: Vec3,
    /// Clock reading at spawn.
    pub creation_time: f64,
}

impl ShapeEntity {
    pub fn kind(&self) -> ShapeKind {
        self.shape.kind()
    }
}

/// Result of one spawn opportunity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnOutcome {
    /// Deadline not reached yet.
    Idle,
    /// Spawning is turned off (`max_shapes == 0`).
    Disabled,
    /// A shape entered the pool, possibly pushing the oldest one out.
    Spawned {
        handle: ShapeHandle,
        evicted: Option<ShapeHandle>,
    },
    /// Pool full under `RejectNew`; nothing was created.
    Rejected,
}

/// Shared tally of shapes released at teardown. Clones count into the same total.
#[derive(Debug, Clone, Default)]
pub struct ReleaseCounter(Rc<Cell<usize>>);

impl ReleaseCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> usize {
        self.0.get()
    }

    fn add(&self, n: usize) {
        self.0.set(self.0.get().saturating_add(n));
    }
}

/// Bounded, spawn-ordered pool of debris shapes.
pub struct EntityPool {
    entities: VecDeque<ShapeEntity>,
    max_shapes: usize,
    overflow: OverflowPolicy,
    world: SharedWorld,
    bus: Bus,
    released: ReleaseCounter,
}

impl EntityPool {
    pub fn new(max_shapes: usize, overflow: OverflowPolicy, world: SharedWorld, bus: Bus) -> Self {
        Self {
            entities: VecDeque::with_capacity(max_shapes.saturating_add(1)),
            max_shapes,
            overflow,
            world,
            bus,
            released: ReleaseCounter::new(),
        }
    }

    /// Counts teardown releases into `counter` instead of a private tally.
    pub fn with_release_counter(mut self, counter: ReleaseCounter) -> Self {
        self.released = counter;
        self
    }

    /// Tally this pool adds its teardown releases to.
    pub fn release_counter(&self) -> &ReleaseCounter {
        &self.released
    }

    /// Offers a candidate shape to the pool.
    ///
    /// Under `RejectNew` a full pool discards the candidate before any engine
    /// call. Under `EvictOldest` the candidate is always created and the
    /// oldest shape is released if the pool went over capacity.
    pub fn admit(
        &mut self,
        shape: Shape,
        position: Vec3,
        now: f64,
    ) -> Result<SpawnOutcome, EngineError> {
        if self.max_shapes == 0 {
            return Ok(SpawnOutcome::Disabled);
        }
        if self.overflow == OverflowPolicy::RejectNew && self.entities.len() >= self.max_shapes {
            self.bus.publish(
                Event::new(EventKind::ShapeRejected)
                    .with_shape(shape.kind())
                    .with_sim_time(now)
                    .with_count(self.entities.len()),
            );
            return Ok(SpawnOutcome::Rejected);
        }

        let handle = self
            .world
            .try_borrow_mut()
            .map_err(|_| EngineError::Unavailable)?
            .create_dynamic_shape(&shape, position)?;
        self.entities.push_back(ShapeEntity {
            handle,
            shape,
            position,
            creation_time: now,
        });
        self.bus.publish(
            Event::new(EventKind::ShapeSpawned)
                .with_shape(shape.kind())
                .with_handle(handle)
                .with_sim_time(now)
                .with_count(self.entities.len()),
        );

        let evicted = if self.entities.len() > self.max_shapes {
            self.evict_oldest()
        } else {
            None
        };
        Ok(SpawnOutcome::Spawned { handle, evicted })
    }

    fn evict_oldest(&mut self) -> Option<ShapeHandle> {
        let oldest = self.entities.pop_front()?;
        self.release(oldest.handle);
        self.bus.publish(
            Event::new(EventKind::ShapeEvicted)
                .with_shape(oldest.kind())
                .with_handle(oldest.handle)
                .with_sim_time(oldest.creation_time)
                .with_count(self.entities.len()),
        );
        Some(oldest.handle)
    }

    /// Releases every pooled shape, newest first. Returns how many.
    pub fn release_all(&mut self) -> usize {
        let mut released = 0;
        while let Some(entity) = self.entities.pop_back() {
            self.release(entity.handle);
            released += 1;
        }
        self.released.add(released);
        self.bus
            .publish(Event::new(EventKind::ShapesReleased).with_count(released));
        released
    }

    fn release(&self, handle: ShapeHandle) {
        // A world borrowed elsewhere cannot take the handle back; the shape leaks.
        if let Ok(mut world) = self.world.try_borrow_mut() {
            world.release_shape(handle);
        }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn max_shapes(&self) -> usize {
        self.max_shapes
    }

    pub fn overflow(&self) -> OverflowPolicy {
        self.overflow
    }

    /// Oldest surviving shape.
    pub fn oldest(&self) -> Option<&ShapeEntity> {
        self.entities.front()
    }

    /// Shapes in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &ShapeEntity> {
        self.entities.iter()
    }
}

impl Drop for EntityPool {
    fn drop(&mut self) {
        if !self.entities.is_empty() {
            self.release_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::headless::HeadlessWorld;
    use std::cell::RefCell;
    use std::rc::Rc;

    const BALL: Shape = Shape::Sphere { radius: 0.5 };

    fn pool(max: usize, overflow: OverflowPolicy) -> (EntityPool, Rc<RefCell<HeadlessWorld>>, Bus) {
        let world = HeadlessWorld::shared();
        let bus = Bus::new(256);
        let pool = EntityPool::new(max, overflow, world.clone(), bus.clone());
        (pool, world, bus)
    }

    #[test]
    fn evict_oldest_keeps_most_recent_in_order() {
        let (mut pool, world, _bus) = pool(3, OverflowPolicy::EvictOldest);
        let mut handles = Vec::new();
        for t in 0..5 {
            match pool.admit(BALL, Vec3::ZERO, f64::from(t)).unwrap() {
                SpawnOutcome::Spawned { handle, .. } => handles.push(handle),
                other => panic!("unexpected {other:?}"),
            }
            assert!(pool.len() <= 3);
        }

        let kept: Vec<_> = pool.iter().map(|e| e.handle).collect();
        assert_eq!(kept, handles[2..].to_vec());
        assert_eq!(pool.oldest().unwrap().creation_time, 2.0);
        assert_eq!(world.borrow().released(), &handles[..2]);
        assert_eq!(world.borrow().live_shapes(), 3);
    }

    #[test]
    fn reject_new_never_creates_engine_shapes_when_full() {
        let (mut pool, world, bus) = pool(2, OverflowPolicy::RejectNew);
        let mut tap = bus.tap();
        pool.admit(BALL, Vec3::ZERO, 0.0).unwrap();
        pool.admit(BALL, Vec3::ZERO, 1.0).unwrap();

        assert_eq!(pool.admit(BALL, Vec3::ZERO, 2.0).unwrap(), SpawnOutcome::Rejected);
        assert_eq!(pool.len(), 2);
        assert_eq!(world.borrow().live_shapes(), 2);
        assert!(world.borrow().released().is_empty());

        let last = tap.drain().pop().unwrap();
        assert_eq!(last.kind, EventKind::ShapeRejected);
        assert_eq!(last.count, Some(2));
    }

    #[test]
    fn zero_capacity_is_disabled() {
        let (mut pool, world, _bus) = pool(0, OverflowPolicy::EvictOldest);
        assert_eq!(pool.admit(BALL, Vec3::ZERO, 0.0).unwrap(), SpawnOutcome::Disabled);
        assert_eq!(world.borrow().live_shapes(), 0);
    }

    #[test]
    fn drop_releases_newest_first() {
        let (mut pool, world, bus) = pool(10, OverflowPolicy::RejectNew);
        let mut tap = bus.tap();
        for t in 0..3 {
            pool.admit(BALL, Vec3::ZERO, f64::from(t)).unwrap();
        }
        let spawned: Vec<_> = pool.iter().map(|e| e.handle).collect();
        drop(pool);

        let mut expected = spawned;
        expected.reverse();
        assert_eq!(world.borrow().released(), expected.as_slice());
        assert_eq!(world.borrow().live_shapes(), 0);

        let released = tap.drain().pop().unwrap();
        assert_eq!(released.kind, EventKind::ShapesReleased);
        assert_eq!(released.count, Some(3));
    }

    #[test]
    fn release_counter_survives_bus_lag() {
        let world = HeadlessWorld::shared();
        let bus = Bus::new(1);
        let mut tap = bus.tap();
        let counter = ReleaseCounter::new();
        let mut pool = EntityPool::new(8, OverflowPolicy::EvictOldest, world.clone(), bus.clone())
            .with_release_counter(counter.clone());
        for t in 0..6 {
            pool.admit(BALL, Vec3::ZERO, f64::from(t)).unwrap();
        }
        drop(pool);
        bus.publish(Event::new(EventKind::AllStopped));

        let seen = tap.drain();
        assert!(seen.iter().all(|e| e.kind != EventKind::ShapesReleased));
        assert_eq!(counter.get(), 6);
        assert_eq!(world.borrow().released().len(), 6);
    }

    #[test]
    fn engine_refusal_propagates() {
        let (mut pool, world, _bus) = pool(4, OverflowPolicy::EvictOldest);
        world.borrow_mut().refuse_shapes();
        assert!(pool.admit(BALL, Vec3::ZERO, 0.0).is_err());
        assert!(pool.is_empty());
    }
}
