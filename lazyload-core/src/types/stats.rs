//! Cache statistics.

use serde::{Deserialize, Serialize};

use super::CacheState;

/// Point-in-time statistics for one lazy cache.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Successful loader invocations
    pub loads: u64,
    /// Failed loader invocations
    pub load_failures: u64,
    /// Accesses served without invoking the loader
    pub hits: u64,
    /// State at the time the statistics were taken
    pub state: CacheState,
}

impl CacheStats {
    /// Fraction of accesses served from the cache.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.loads + self.load_failures;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
