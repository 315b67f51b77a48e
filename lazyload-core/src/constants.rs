//! Defaults and well-known names for lazyload caches.

/// Label used in logs and errors when a cache is not given a name.
pub const DEFAULT_CACHE_LABEL: &str = "lazy";

/// Suffix appended to an environment prefix to read a cache TTL in milliseconds.
///
/// `CacheConfig::from_env("USERS")` reads `USERS_TTL_MS`.
pub const ENV_TTL_MS_SUFFIX: &str = "_TTL_MS";

/// Suffix appended to an environment prefix to read a cache label.
pub const ENV_LABEL_SUFFIX: &str = "_LABEL";

/// TTL value (case-insensitive) that means "never expire once loaded".
pub const TTL_NONE: &str = "none";
