//! Cache configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CACHE_LABEL, ENV_LABEL_SUFFIX, ENV_TTL_MS_SUFFIX, TTL_NONE};
use crate::error::{LazyError, Result};

/// Construction-time settings shared by every lazy cache type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Name used in log events and load errors
    pub label: String,
    /// Time-to-live; `None` means the value never expires once loaded.
    ///
    /// Held exactly. Serialized as whole milliseconds under `ttl_millis`.
    #[serde(rename = "ttl_millis", with = "ttl_as_millis")]
    pub ttl: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            label: DEFAULT_CACHE_LABEL.into(),
            ttl: None,
        }
    }
}

impl CacheConfig {
    /// Creates a never-expiring configuration with the given label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ttl: None,
        }
    }

    /// Sets the time-to-live.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Removes the time-to-live.
    pub fn no_ttl(mut self) -> Self {
        self.ttl = None;
        self
    }

    /// Returns the configured time-to-live.
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Reads `<PREFIX>_TTL_MS` and `<PREFIX>_LABEL` from the environment.
    ///
    /// Missing variables fall back to the defaults; the label defaults to the
    /// lowercased prefix. A TTL of `none` or an empty string means no TTL.
    ///
    /// # Errors
    /// Returns `ConfigError` if the TTL is not a whole number of milliseconds.
    pub fn from_env(prefix: &str) -> Result<Self> {
        let label = std::env::var(format!("{prefix}{ENV_LABEL_SUFFIX}"))
            .unwrap_or_else(|_| prefix.to_lowercase());

        let ttl = match std::env::var(format!("{prefix}{ENV_TTL_MS_SUFFIX}")) {
            Ok(raw) => parse_ttl_millis(&raw)?.map(Duration::from_millis),
            Err(_) => None,
        };

        Ok(Self { label, ttl })
    }
}

/// Serde adapter storing an optional TTL as whole milliseconds.
mod ttl_as_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        ttl: &Option<Duration>,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        match ttl {
            Some(ttl) => {
                serializer.serialize_some(&u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX))
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}

/// Parses a TTL in milliseconds, accepting `none` (any case) or blank as "no TTL".
pub fn parse_ttl_millis(raw: &str) -> Result<Option<u64>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(TTL_NONE) {
        return Ok(None);
    }

    trimmed
        .parse::<u64>()
        .map(Some)
        .map_err(|e| LazyError::ConfigError(format!("invalid TTL '{trimmed}': {e}")))
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.label, DEFAULT_CACHE_LABEL);
        assert_eq!(config.ttl(), None);
    }

    #[test]
    fn test_builder() {
        let config = CacheConfig::new("accounts").with_ttl(Duration::from_millis(1500));
        assert_eq!(config.label, "accounts");
        assert_eq!(config.ttl(), Some(Duration::from_millis(1500)));
        assert_eq!(config.no_ttl().ttl(), None);
    }

    #[test]
    fn test_sub_millisecond_ttl_is_kept() {
        let config = CacheConfig::new("x").with_ttl(Duration::from_micros(999));
        assert_eq!(config.ttl(), Some(Duration::from_micros(999)));

        let config = CacheConfig::new("x").with_ttl(Duration::from_micros(1999));
        assert_eq!(config.ttl(), Some(Duration::from_micros(1999)));
    }

    #[test]
    fn test_serialize_ttl_as_millis() {
        let config = CacheConfig::new("x").with_ttl(Duration::from_millis(1500));
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["ttl_millis"], 1500);

        let saturated = serde_json::to_value(CacheConfig::new("x").with_ttl(Duration::MAX)).unwrap();
        assert_eq!(saturated["ttl_millis"], u64::MAX);

        let never = serde_json::to_value(CacheConfig::new("x")).unwrap();
        assert!(never["ttl_millis"].is_null());
    }

    #[test_case("300", Some(300) ; "plain millis")]
    #[test_case("  42 ", Some(42) ; "surrounding whitespace")]
    #[test_case("none", None ; "none keyword")]
    #[test_case("NONE", None ; "none uppercase")]
    #[test_case("", None ; "blank")]
    fn test_parse_ttl(raw: &str, expected: Option<u64>) {
        assert_eq!(parse_ttl_millis(raw).unwrap(), expected);
    }

    #[test_case("-1" ; "negative")]
    #[test_case("5s" ; "unit suffix")]
    #[test_case("1.5" ; "fractional")]
    fn test_parse_ttl_rejects(raw: &str) {
        assert!(matches!(parse_ttl_millis(raw), Err(LazyError::ConfigError(_))));
    }

    #[test]
    fn test_from_env() {
        std::env::set_var("LAZYLOAD_TEST_ENV_TTL_MS", "250");
        std::env::set_var("LAZYLOAD_TEST_ENV_LABEL", "catalog");

        let config = CacheConfig::from_env("LAZYLOAD_TEST_ENV").unwrap();
        assert_eq!(config.label, "catalog");
        assert_eq!(config.ttl(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_from_env_defaults() {
        let config = CacheConfig::from_env("LAZYLOAD_TEST_UNSET").unwrap();
        assert_eq!(config.label, "lazyload_test_unset");
        assert_eq!(config.ttl(), None);
    }

    #[test]
    fn test_from_env_invalid_ttl() {
        std::env::set_var("LAZYLOAD_TEST_BAD_TTL_MS", "soon");
        assert!(CacheConfig::from_env("LAZYLOAD_TEST_BAD").is_err());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: CacheConfig = serde_json::from_str(r#"{"ttl_millis": 1000}"#).unwrap();
        assert_eq!(config.label, DEFAULT_CACHE_LABEL);
        assert_eq!(config.ttl(), Some(Duration::from_secs(1)));
    }
}
