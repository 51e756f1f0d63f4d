//! # Boundary with the external simulation engine.
//!
//! The physics/rendering engine is not part of this crate. Everything the
//! control core needs from it is expressed by four small traits:
//!
//! - [`World`]: static bodies, dynamic shapes, camera placement
//! - [`EventSource`]: non-blocking input polling
//! - [`Clock`]: monotonic seconds
//! - [`ObserverHandle`]: the camera-attached observer entity
//!
//! All of them are used from a single thread, so shared access goes through
//! `Rc<RefCell<..>>` rather than locks.
//!
//! [`headless`] provides in-memory implementations for tests and demos.

use std::borrow::Cow;
use std::cell::RefCell;
use std::rc::Rc;

use crate::error::EngineError;

pub mod headless;
mod input;

pub use input::{InputEvent, ParseEventError, keys};

/// Position or extent in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Euler rotation delta, in the engine's angular units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rotation {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

impl std::ops::AddAssign for Rotation {
    fn add_assign(&mut self, rhs: Rotation) {
        self.pitch += rhs.pitch;
        self.yaw += rhs.yaw;
        self.roll += rhs.roll;
    }
}

/// Kind of a dynamic debris shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Sphere,
    Box,
}

/// Size parameters of a dynamic shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Sphere { radius: f64 },
    Box { extents: Vec3 },
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Sphere { .. } => ShapeKind::Sphere,
            Shape::Box { .. } => ShapeKind::Box,
        }
    }
}

/// Kind-specific parameters of a static body.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyKind {
    /// Procedurally formed planet or moon.
    Planet { seed: u32, craters: u32 },
    /// Light-emitting star.
    Star { luminosity: f64 },
}

/// A static world body created once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticBody {
    pub name: Cow<'static, str>,
    pub kind: BodyKind,
    pub center: Vec3,
    pub radius: f64,
}

/// Engine-side handle to a static body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub u64);

/// Engine-side handle to a dynamic shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeHandle(pub u64);

/// Entity construction and camera control.
pub trait World {
    /// Places the viewport camera.
    fn set_camera(&mut self, position: Vec3);

    /// Creates a static body. Called once per body at startup, never retried.
    fn create_static_body(&mut self, body: &StaticBody) -> Result<BodyHandle, EngineError>;

    /// Creates a dynamic shape at `position`.
    fn create_dynamic_shape(
        &mut self,
        shape: &Shape,
        position: Vec3,
    ) -> Result<ShapeHandle, EngineError>;

    /// Hands a dynamic shape back to the engine for destruction.
    fn release_shape(&mut self, handle: ShapeHandle);
}

/// World shared between the supervisor and the spawn task.
pub type SharedWorld = Rc<RefCell<dyn World>>;

/// Non-blocking input source.
pub trait EventSource {
    /// Returns at most one pending event; never blocks.
    fn poll_event(&mut self) -> Option<InputEvent>;
}

/// Monotonic time source.
pub trait Clock {
    /// Seconds since an arbitrary fixed origin.
    fn now(&self) -> f64;
}

/// Operations on the observer entity.
pub trait ObserverHandle {
    fn set_speed(&mut self, speed: u8);
    fn set_collidable(&mut self, collidable: bool);
    fn add_rotation(&mut self, rotation: Rotation);
}
