//! Behavior knobs shared by the runtime and its tasks.
//!
//! This module groups the small enums that select between equally supported
//! behaviors. None of them has a "correct" value; each is chosen per run via
//! [`Config`](crate::Config).
//!
//! ## Contents
//! - [`OverflowPolicy`] what the entity pool does when it is full (evict oldest / reject new)
//! - [`ZeroKeySpeed`]   what speed digit `0` selects (stop / full)
//! - [`FaultPolicy`]    whether a task fault shuts the supervisor down
//!
//! ## Quick wiring
//! ```text
//! Config { fault_policy, spawn: SpawnConfig { overflow, .. }, observer: ObserverConfig { zero_key_speed, .. } }
//!      ├─► Supervisor::run  uses fault_policy after every faulted turn
//!      ├─► EntityPool       uses overflow on every admitted shape
//!      └─► ObserverController uses zero_key_speed on DIGIT_0 key-down
//! ```

mod fault;
mod overflow;
mod zero_key;

pub use fault::FaultPolicy;
pub use overflow::OverflowPolicy;
pub use zero_key::ZeroKeySpeed;
