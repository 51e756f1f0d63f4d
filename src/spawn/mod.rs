//! Debris spawning.
//!
//! - [`EntityPool`]: the bounded, spawn-ordered set of live debris shapes,
//!   enforcing an [`OverflowPolicy`](crate::OverflowPolicy)
//! - [`SpawnPolicy`]: timer-gated generation of random shapes into the pool,
//!   runnable as a task via [`SpawnPolicy::into_task`]
//!
//! ## Pool bounds
//! ```text
//! EvictOldest: insert ──► len > max ? release oldest   (len ≤ max+1 transiently)
//! RejectNew:   len ≥ max ? discard candidate : insert  (len ≤ max always)
//! teardown:    release newest → oldest, then ShapesReleased
//! ```

mod policy;
mod pool;

pub use policy::SpawnPolicy;
pub use pool::{EntityPool, ReleaseCounter, ShapeEntity, SpawnOutcome};
