//! Error types for lazyload.
//!
//! A cache has exactly one runtime failure: the loader failing during a triggered load.
//! Configuration parsing has its own variant so that it never masquerades as a load
//! failure.

use thiserror::Error;

/// Boxed error produced by a loader.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// What a loader returns.
pub type LoadResult<T> = std::result::Result<T, BoxError>;

/// Result type alias using `LazyError`.
pub type Result<T> = std::result::Result<T, LazyError>;

/// Main error type for all lazyload operations.
#[derive(Debug, Error)]
pub enum LazyError {
    // ═══════════════════════════════════════════════════════════════════════════
    // LOAD ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// The loader failed while the cache was (re)loading its value.
    ///
    /// The cache stays unloaded, so the next access invokes the loader again.
    #[error("Load failed for cache '{cache}': {source}")]
    LoadFailed {
        /// Label of the cache that attempted the load.
        cache: String,
        /// The loader's own error.
        #[source]
        source: BoxError,
    },

    // ═══════════════════════════════════════════════════════════════════════════
    // CONFIGURATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Configuration could not be read or parsed.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl LazyError {
    /// Wraps a loader error for the named cache.
    pub fn load_failed(cache: impl Into<String>, source: impl Into<BoxError>) -> Self {
        LazyError::LoadFailed {
            cache: cache.into(),
            source: source.into(),
        }
    }

    /// Returns true if retrying the same call may succeed.
    ///
    /// Load failures are never cached, so every subsequent access retries the loader.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, LazyError::LoadFailed { .. })
    }

    /// Returns true if this error came from a loader.
    pub fn is_load_failure(&self) -> bool {
        matches!(self, LazyError::LoadFailed { .. })
    }

    /// Label of the cache that failed to load, if this is a load failure.
    pub fn cache_label(&self) -> Option<&str> {
        match self {
            LazyError::LoadFailed { cache, .. } => Some(cache),
            LazyError::ConfigError(_) => None,
        }
    }
}
