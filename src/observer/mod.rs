//! Observer input handling.
//!
//! The observer is the camera-attached entity the user steers. Its state is
//! owned by an [`ObserverController`] that lives inside its own task and is
//! mutated only there.
//!
//! ## Dispatch table
//! ```text
//! Exit                         ──► Exiting
//! Key(ESCAPE, down)            ──► Exiting
//! Key(DIGIT_0, down)           ──► speed = zero-key speed      (Stop=0 / Full=10)
//! Key(DIGIT_1..=DIGIT_9, down) ──► speed = 1..=9
//! Key(toggle key, down)        ──► collidable = !collidable
//! MouseMove(dx, dy)            ──► pitch += -dy*S, yaw += -dx*S
//! anything else                ──► ignored
//! ```

mod controller;

pub use controller::{ControllerPhase, ObserverController, ObserverState};
