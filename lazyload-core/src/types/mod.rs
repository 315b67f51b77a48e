//! Shared types for lazyload caches.
//!
//! - [`Expiration`]: When a held value stops being fresh
//! - [`CacheState`]: Unloaded / fresh / stale
//! - [`CacheConfig`]: Label and TTL settings
//! - [`CacheStats`]: Load and hit counters

mod config;
mod expiration;
mod stats;

pub use config::*;
pub use expiration::*;
pub use stats::*;
