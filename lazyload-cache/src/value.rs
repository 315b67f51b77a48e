//! Lazily loaded scalar values.

use std::marker::PhantomData;
use std::time::Duration;

use lazyload_core::{BoxError, CacheConfig, CacheHooks, LazyError, Result};

use crate::cell::{delegate_cell_ops, LazyCell};

/// Hooks for scalars: nothing before the first load, wholesale replacement after.
pub struct ScalarHooks<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> Default for ScalarHooks<T> {
    fn default() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T: Send> CacheHooks for ScalarHooks<T> {
    type Value = Option<T>;
    type Loaded = T;

    fn prepopulate(&self) -> Option<T> {
        None
    }

    fn apply_data(&self, current: &mut Option<T>, loaded: T) {
        *current = Some(loaded);
    }
}

/// A lazily loaded value such as a string, a number, or an immutable record.
///
/// ```rust
/// use lazyload_cache::LazyValue;
/// use lazyload_core::LoadResult;
///
/// let greeting = LazyValue::new(|| -> LoadResult<String> { Ok("hello".into()) });
/// assert!(!greeting.is_loaded());
/// assert_eq!(greeting.value().unwrap(), "hello");
/// ```
pub struct LazyValue<T: Send> {
    cell: LazyCell<ScalarHooks<T>>,
}

impl<T: Send> LazyValue<T> {
    /// Creates a value that never expires once loaded.
    pub fn new<F, E>(loader: F) -> Self
    where
        F: Fn() -> std::result::Result<T, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        Self::with_config(loader, &CacheConfig::default())
    }

    /// Creates a value that goes stale `ttl` after each load.
    pub fn with_ttl<F, E>(loader: F, ttl: Duration) -> Self
    where
        F: Fn() -> std::result::Result<T, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        Self::with_config(loader, &CacheConfig::default().with_ttl(ttl))
    }

    /// Creates a value from a full configuration.
    pub fn with_config<F, E>(loader: F, config: &CacheConfig) -> Self
    where
        F: Fn() -> std::result::Result<T, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        Self {
            cell: LazyCell::with_hooks(ScalarHooks::default(), loader, config),
        }
    }

    /// Loads if needed and returns the value.
    pub fn value(&self) -> Result<T>
    where
        T: Clone,
    {
        self.with_value(T::clone)
    }

    /// Loads if needed and runs `f` on the value while the cache is locked.
    pub fn with_value<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R> {
        let mut state = self.cell.lock_state();

        // renew() after unload() leaves a fresh cell with nothing in it
        let forceful = state.value.is_none();
        if let Err(error) = self.cell.load_locked(&mut state, forceful) {
            drop(state);
            return Err(self.cell.report(error));
        }

        state
            .value
            .as_ref()
            .map(f)
            .ok_or_else(|| LazyError::load_failed(self.cell.label(), "loader stored no value"))
    }

    delegate_cell_ops!();
}

impl<T: Send> std::fmt::Debug for LazyValue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyValue").field("cell", &self.cell).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use lazyload_core::{CacheState, LoadResult};
    use parking_lot::Mutex;

    use super::*;

    fn backed_value(backend: &Arc<Mutex<String>>, ttl: Option<Duration>) -> LazyValue<String> {
        let source = backend.clone();
        let loader = move || -> LoadResult<String> { Ok(source.lock().clone()) };
        match ttl {
            Some(ttl) => LazyValue::with_ttl(loader, ttl),
            None => LazyValue::new(loader),
        }
    }

    #[test]
    fn test_creation_does_not_load() {
        let backend = Arc::new(Mutex::new("Test1".to_string()));
        let value = backed_value(&backend, None);
        assert!(!value.is_loaded());
    }

    #[test]
    fn test_creation_with_ttl() {
        let backend = Arc::new(Mutex::new("Test1".to_string()));
        let value = backed_value(&backend, Some(Duration::from_millis(300)));

        assert!(!value.is_loaded());
        value.value().unwrap();
        assert!(!value.is_expired());

        std::thread::sleep(Duration::from_millis(350));
        assert!(value.is_expired());
    }

    #[test]
    fn test_loading() {
        let backend = Arc::new(Mutex::new("Test1".to_string()));
        let value = backed_value(&backend, None);

        assert!(!value.is_loaded());
        assert_eq!(value.value().unwrap(), "Test1");
        assert!(value.is_loaded());
    }

    #[test]
    fn test_loading_with_changed_backend() {
        let backend = Arc::new(Mutex::new("Test1".to_string()));
        let value = backed_value(&backend, None);

        assert_eq!(value.value().unwrap(), "Test1");

        *backend.lock() = "TestB".into();
        assert_ne!(value.value().unwrap(), "TestB");

        value.expire();
        assert_eq!(value.value().unwrap(), "TestB");
    }

    #[test]
    fn test_expiration_and_renew() {
        let backend = Arc::new(Mutex::new("Test1".to_string()));
        let value = backed_value(&backend, None);

        let original = value.value().unwrap();
        assert!(!value.is_expired());
        value.expire();
        assert!(value.is_expired());

        *backend.lock() = "BackendChange".into();
        value.renew();

        assert!(!value.is_expired());
        assert_eq!(value.value().unwrap(), original);
    }

    #[test]
    fn test_renew_after_unload_still_loads() {
        let backend = Arc::new(Mutex::new("Test1".to_string()));
        let value = backed_value(&backend, None);

        value.value().unwrap();
        value.unload();
        *backend.lock() = "Reloaded".into();
        value.renew();

        assert_eq!(value.state(), CacheState::Fresh);
        assert_eq!(value.value().unwrap(), "Reloaded");

        let stats = value.stats();
        assert_eq!(stats.loads, 2);
        assert_eq!(stats.hits, 0);

        assert_eq!(value.value().unwrap(), "Reloaded");
        assert_eq!(value.stats().hits, 1);
    }

    #[test]
    fn test_ttl_keeps_sub_millisecond_precision() {
        let value = LazyValue::with_ttl(|| -> LoadResult<u8> { Ok(1) }, Duration::from_micros(999));
        assert_eq!(value.ttl(), Some(Duration::from_micros(999)));
    }

    #[test]
    fn test_listener_can_query_after_failure() {
        let seen = Arc::new(Mutex::new(None));
        let sink = seen.clone();
        let value: Arc<LazyValue<u64>> = Arc::new_cyclic(|own: &std::sync::Weak<LazyValue<u64>>| {
            let own = own.clone();
            LazyValue::new(|| Err::<u64, _>("offline")).on_load_error(move |_| {
                if let Some(value) = own.upgrade() {
                    *sink.lock() = Some(value.is_loaded());
                }
            })
        });

        assert!(value.value().is_err());
        assert_eq!(*seen.lock(), Some(false));
    }

    #[test]
    fn test_with_value_borrows() {
        let value = LazyValue::new(|| -> LoadResult<Vec<u32>> { Ok(vec![1, 2, 3]) });
        let sum: u32 = value.with_value(|v| v.iter().sum()).unwrap();
        assert_eq!(sum, 6);
    }

    #[test]
    fn test_failure_propagates() {
        let value = LazyValue::with_config(
            || Err::<u64, _>("no route to host"),
            &CacheConfig::new("remote-counter"),
        );

        let err = value.value().unwrap_err();
        assert_eq!(err.cache_label(), Some("remote-counter"));
        assert!(!value.is_loaded());
        assert_eq!(value.stats().load_failures, 1);
    }
}
