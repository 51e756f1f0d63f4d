//! # Overflow disciplines for the entity pool.
//!
//! [`OverflowPolicy`] decides what happens when a spawn tick produces a shape
//! while the pool already holds `max_shapes` entities.
//!
//! ```text
//! EvictOldest:  [a b c] + d ──► [a b c d] ──► evict a ──► [b c d]   (transient len = max + 1)
//! RejectNew:    [a b c] + d ──► full, d discarded      ──► [a b c]   (len never above max)
//! ```

/// Policy applied when the entity pool is at capacity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Always insert; then remove the single oldest entity if over capacity.
    EvictOldest,
    /// Check capacity first; discard the candidate silently when full.
    RejectNew,
}

impl OverflowPolicy {
    /// Returns a short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            OverflowPolicy::EvictOldest => "evict_oldest",
            OverflowPolicy::RejectNew => "reject_new",
        }
    }
}

impl Default for OverflowPolicy {
    /// Returns [`OverflowPolicy::EvictOldest`].
    fn default() -> Self {
        OverflowPolicy::EvictOldest
    }
}
