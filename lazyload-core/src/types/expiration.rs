//! Expiration bookkeeping for lazy caches.
//!
//! - [`Expiration`]: When the held value stops being fresh
//! - [`CacheState`]: The observable state machine derived from it

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════════
// EXPIRATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Expiration of a cached value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Expiration {
    /// Nothing loaded (or explicitly expired). Always counts as expired.
    #[default]
    Unloaded,
    /// Loaded; fresh until this instant.
    At(Instant),
    /// Loaded without a TTL; never goes stale on its own.
    Never,
}

impl Expiration {
    /// Computes the expiration for a value loaded at `now`.
    ///
    /// A missing TTL, or one so large that `now + ttl` overflows, never expires.
    pub fn after(now: Instant, ttl: Option<Duration>) -> Self {
        match ttl.and_then(|ttl| now.checked_add(ttl)) {
            Some(deadline) => Expiration::At(deadline),
            None => Expiration::Never,
        }
    }

    /// Returns true if some value has been loaded (it may still be stale).
    pub fn is_loaded(&self) -> bool {
        !matches!(self, Expiration::Unloaded)
    }

    /// Returns true if the value must be reloaded when observed at `now`.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self {
            Expiration::Unloaded => true,
            Expiration::At(deadline) => *deadline <= now,
            Expiration::Never => false,
        }
    }

    /// Time left before the value goes stale, if it is loaded and has a deadline.
    pub fn remaining_at(&self, now: Instant) -> Option<Duration> {
        match self {
            Expiration::At(deadline) => Some(deadline.saturating_duration_since(now)),
            Expiration::Unloaded | Expiration::Never => None,
        }
    }

    /// Maps the expiration onto the cache state machine.
    pub fn state_at(&self, now: Instant) -> CacheState {
        if !self.is_loaded() {
            CacheState::Unloaded
        } else if self.is_expired_at(now) {
            CacheState::Stale
        } else {
            CacheState::Fresh
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// STATE
// ═══════════════════════════════════════════════════════════════════════════════

/// Observable state of a lazy cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheState {
    /// Never loaded, expired by hand, or unloaded.
    Unloaded,
    /// Loaded and within its TTL.
    Fresh,
    /// Loaded but past its TTL; the next access reloads.
    Stale,
}

impl std::fmt::Display for CacheState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CacheState::Unloaded => "unloaded",
            CacheState::Fresh => "fresh",
            CacheState::Stale => "stale",
        };
        f.write_str(name)
    }
}
