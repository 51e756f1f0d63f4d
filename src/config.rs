//! # Runtime configuration.
//!
//! [`Config`] gathers every setting of a run: event bus capacity, fault
//! policy, spawn cadence and capacity, observer input mapping, and the static
//! world layout. All values are immutable once handed to a constructor.
//!
//! ## Sentinel values
//! - `spawn.max_shapes = 0` → spawning disabled (the spawn task only yields)
//! - `bus_capacity = 0` → clamped to 1
//! - non-finite `spawn.drop_period`, `spawn.jitter` or `spawn.size_exponent` → 0
//!
//! # Example
//! ```
//! use orbitvisor::{Config, OverflowPolicy, ZeroKeySpeed};
//!
//! let mut cfg = Config::default();
//! cfg.spawn.max_shapes = 20;
//! cfg.spawn.overflow = OverflowPolicy::RejectNew;
//! cfg.observer.zero_key_speed = ZeroKeySpeed::Full;
//!
//! assert_eq!(cfg.spawn.drop_period, 0.5);
//! assert!(!cfg.spawn.is_disabled());
//! ```

use crate::engine::{BodyKind, StaticBody, Vec3, keys};
use crate::policies::{FaultPolicy, OverflowPolicy, ZeroKeySpeed};

/// Radius of the home planet; moon placement is expressed in multiples of it.
const PLANET_RADIUS: f64 = 10_000_000.0;

/// Global configuration for one supervised run.
///
/// ## Field semantics
/// - `bus_capacity`: event bus ring buffer size (min 1)
/// - `fault_policy`: supervisor reaction to a faulted task
/// - `spawn`: debris spawn task settings
/// - `observer`: input mapping for the observer controller
/// - `world`: static bodies and camera placement created once at startup
#[derive(Clone, Debug)]
pub struct Config {
    /// Capacity of the event bus broadcast channel.
    ///
    /// The supervisor drains the bus after every turn, so this only needs to
    /// cover the events of a single turn. Lag is reported as `SubscriberOverflow`.
    pub bus_capacity: usize,

    /// Reaction to a task fault. See [`FaultPolicy`].
    pub fault_policy: FaultPolicy,

    pub spawn: SpawnConfig,
    pub observer: ObserverConfig,
    pub world: WorldConfig,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `bus_capacity = 1024`
    /// - `fault_policy = FaultPolicy::Shutdown`
    /// - `spawn`, `observer`, `world`: see their `Default` impls
    fn default() -> Self {
        Self {
            bus_capacity: 1024,
            fault_policy: FaultPolicy::default(),
            spawn: SpawnConfig::default(),
            observer: ObserverConfig::default(),
            world: WorldConfig::default(),
        }
    }
}

/// Debris spawn settings.
#[derive(Clone, Debug)]
pub struct SpawnConfig {
    /// Pool capacity. `0` disables spawning.
    pub max_shapes: usize,
    /// Seconds between spawn ticks.
    pub drop_period: f64,
    /// Behavior when the pool is full.
    pub overflow: OverflowPolicy,
    /// X coordinate of the drop line.
    pub drop_x: f64,
    /// Z coordinate of the drop line.
    pub drop_z: f64,
    /// Half-width of the uniform x/z offset around the drop line.
    pub jitter: f64,
    /// Y coordinate of every spawned shape.
    pub spawn_height: f64,
    /// Size parameters are `exp(-U)` with `U` uniform over `[0, size_exponent]`.
    pub size_exponent: f64,
    /// RNG seed; `None` draws a fresh seed from the thread RNG.
    pub seed: Option<u64>,
}

impl SpawnConfig {
    /// `true` when `max_shapes == 0`.
    #[inline]
    pub fn is_disabled(&self) -> bool {
        self.max_shapes == 0
    }

    /// Drop period clamped to a finite, non-negative value.
    #[inline]
    pub fn drop_period_clamped(&self) -> f64 {
        if self.drop_period.is_finite() {
            self.drop_period.max(0.0)
        } else {
            0.0
        }
    }

    /// Jitter half-width as a finite magnitude; NaN or infinite means none.
    #[inline]
    pub fn jitter_clamped(&self) -> f64 {
        if self.jitter.is_finite() {
            self.jitter.abs()
        } else {
            0.0
        }
    }

    /// Size exponent clamped to a finite, non-negative value.
    #[inline]
    pub fn size_exponent_clamped(&self) -> f64 {
        if self.size_exponent.is_finite() {
            self.size_exponent.max(0.0)
        } else {
            0.0
        }
    }
}

impl Default for SpawnConfig {
    /// Default spawn settings:
    ///
    /// - `max_shapes = 50`, `drop_period = 0.5s`, `overflow = EvictOldest`
    /// - drop line 5 units in front of the default observer, 10 units above it
    /// - `jitter = 2.5`, `size_exponent = 2.0`, randomly seeded RNG
    fn default() -> Self {
        let origin = ObserverConfig::default().start_position;
        Self {
            max_shapes: 50,
            drop_period: 0.5,
            overflow: OverflowPolicy::default(),
            drop_x: origin.x,
            drop_z: origin.z + 5.0,
            jitter: 2.5,
            spawn_height: origin.y + 10.0,
            size_exponent: 2.0,
            seed: None,
        }
    }
}

/// Observer input mapping.
#[derive(Clone, Debug)]
pub struct ObserverConfig {
    /// Where the observer is created.
    pub start_position: Vec3,
    /// Rotation per unit of pointer motion.
    pub sensitivity: f64,
    /// Speed selected by digit `0`.
    pub zero_key_speed: ZeroKeySpeed,
    /// Key that flips collidability.
    pub toggle_collision_key: u32,
    /// Initial collidability.
    pub initially_collidable: bool,
}

impl Default for ObserverConfig {
    /// Observer just above the home planet's surface, sensitivity 0.1,
    /// digit `0` stops, `C` toggles collision, collidable at start.
    fn default() -> Self {
        Self {
            start_position: Vec3::new(0.0, PLANET_RADIUS - 600.0, -5.0),
            sensitivity: 0.1,
            zero_key_speed: ZeroKeySpeed::default(),
            toggle_collision_key: keys::C,
            initially_collidable: true,
        }
    }
}

/// Static world layout.
#[derive(Clone, Debug)]
pub struct WorldConfig {
    /// Initial camera position.
    pub camera: Vec3,
    /// Bodies created once, in order, before any task runs.
    pub bodies: Vec<StaticBody>,
}

impl WorldConfig {
    /// World with no static bodies; the camera at the origin.
    pub fn empty() -> Self {
        Self {
            camera: Vec3::ZERO,
            bodies: Vec::new(),
        }
    }
}

impl Default for WorldConfig {
    /// Home planet, two moons and a star; camera at the observer start.
    fn default() -> Self {
        let r = PLANET_RADIUS;
        Self {
            camera: ObserverConfig::default().start_position,
            bodies: vec![
                StaticBody {
                    name: "planet".into(),
                    kind: BodyKind::Planet {
                        seed: 3634,
                        craters: 0,
                    },
                    center: Vec3::ZERO,
                    radius: r,
                },
                StaticBody {
                    name: "moon1".into(),
                    kind: BodyKind::Planet {
                        seed: 10,
                        craters: 250,
                    },
                    center: Vec3::new(r * 1.5, r * 2.5, r * 1.0),
                    radius: 1_500_000.0,
                },
                StaticBody {
                    name: "moon2".into(),
                    kind: BodyKind::Planet {
                        seed: 13,
                        craters: 0,
                    },
                    center: Vec3::new(r * -2.5, r * 0.5, r * -1.0),
                    radius: 2_500_000.0,
                },
                StaticBody {
                    name: "sun".into(),
                    kind: BodyKind::Star { luminosity: 7.5e25 },
                    center: Vec3::new(65_062_512.0, 75_939_904.0, 0.0),
                    radius: 1_000_000.0,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_scene() {
        let cfg = Config::default();
        assert_eq!(cfg.spawn.max_shapes, 50);
        assert_eq!(cfg.spawn.overflow, OverflowPolicy::EvictOldest);
        assert_eq!(cfg.observer.sensitivity, 0.1);
        assert_eq!(cfg.observer.start_position, Vec3::new(0.0, 9_999_400.0, -5.0));
        assert_eq!(cfg.world.bodies.len(), 4);
        assert_eq!(cfg.world.camera, cfg.observer.start_position);
    }

    #[test]
    fn sentinels_are_clamped() {
        let mut cfg = Config::default();
        cfg.bus_capacity = 0;
        assert_eq!(cfg.bus_capacity_clamped(), 1);

        cfg.spawn.drop_period = f64::NAN;
        assert_eq!(cfg.spawn.drop_period_clamped(), 0.0);
        cfg.spawn.drop_period = -3.0;
        assert_eq!(cfg.spawn.drop_period_clamped(), 0.0);

        cfg.spawn.jitter = f64::NAN;
        assert_eq!(cfg.spawn.jitter_clamped(), 0.0);
        cfg.spawn.jitter = -1.5;
        assert_eq!(cfg.spawn.jitter_clamped(), 1.5);
        cfg.spawn.size_exponent = f64::INFINITY;
        assert_eq!(cfg.spawn.size_exponent_clamped(), 0.0);

        cfg.spawn.max_shapes = 0;
        assert!(cfg.spawn.is_disabled());
    }
}
