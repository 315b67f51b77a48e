//! Lazily loaded sets reconciled in place.
//!
//! The cache owns a single [`DashSet`] for its whole life (until `unload()`). Each reload
//! removes elements that disappeared and adds the new ones, so a handle obtained from
//! [`LazySet::values`] before a reload observes the reloaded contents.

use std::collections::HashSet;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashSet;
use futures::stream::{self, Iter};

use lazyload_core::{BoxError, CacheConfig, CacheHooks, Result};

use crate::cell::{delegate_cell_ops, LazyCell};

/// Hooks for sets: starts empty, reconciles in place.
pub struct SetHooks<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> Default for SetHooks<T> {
    fn default() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> CacheHooks for SetHooks<T>
where
    T: Eq + Hash + Send + Sync,
{
    type Value = Arc<DashSet<T>>;
    type Loaded = HashSet<T>;

    fn prepopulate(&self) -> Arc<DashSet<T>> {
        Arc::new(DashSet::new())
    }

    fn apply_data(&self, current: &mut Arc<DashSet<T>>, loaded: HashSet<T>) {
        current.retain(|item| loaded.contains(item));

        for item in loaded {
            if !current.contains(&item) {
                current.insert(item);
            }
        }
    }
}

/// A lazily loaded set whose container survives reloads.
///
/// ```rust
/// use std::collections::HashSet;
/// use std::sync::Arc;
/// use lazyload_cache::LazySet;
/// use lazyload_core::LoadResult;
///
/// let tags = LazySet::new(|| -> LoadResult<HashSet<&'static str>> {
///     Ok(["red", "green"].into_iter().collect())
/// });
///
/// let live = tags.values().unwrap();
/// tags.load_forced().unwrap();
/// assert!(Arc::ptr_eq(&live, &tags.values().unwrap()));
/// assert!(live.contains("red"));
/// ```
pub struct LazySet<T>
where
    T: Eq + Hash + Send + Sync,
{
    cell: LazyCell<SetHooks<T>>,
}

impl<T> LazySet<T>
where
    T: Eq + Hash + Send + Sync,
{
    /// Creates a set that never expires once loaded.
    pub fn new<F, E>(loader: F) -> Self
    where
        F: Fn() -> std::result::Result<HashSet<T>, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        Self::with_config(loader, &CacheConfig::default())
    }

    /// Creates a set that goes stale `ttl` after each load.
    pub fn with_ttl<F, E>(loader: F, ttl: Duration) -> Self
    where
        F: Fn() -> std::result::Result<HashSet<T>, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        Self::with_config(loader, &CacheConfig::default().with_ttl(ttl))
    }

    /// Creates a set from a full configuration.
    pub fn with_config<F, E>(loader: F, config: &CacheConfig) -> Self
    where
        F: Fn() -> std::result::Result<HashSet<T>, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        Self {
            cell: LazyCell::with_hooks(SetHooks::default(), loader, config),
        }
    }

    /// Loads if needed and returns the live container.
    ///
    /// The handle is not a snapshot: later reloads reconcile it in place. Copy it if a
    /// stable view is needed.
    pub fn values(&self) -> Result<Arc<DashSet<T>>> {
        self.cell.value()
    }

    /// Loads if needed and returns a snapshot iterator over the current elements.
    ///
    /// The elements are cloned into the iterator when this is called. Reloads that happen
    /// afterwards are not reflected in it; use [`values`](Self::values) for a live view.
    /// The iterator holds no lock on the container and can be cloned to restart it.
    pub fn iter(&self) -> Result<std::vec::IntoIter<T>>
    where
        T: Clone,
    {
        let set = self.values()?;
        let items: Vec<T> = set.iter().map(|item| item.key().clone()).collect();
        Ok(items.into_iter())
    }

    /// Loads if needed and returns a snapshot of the current elements as a stream.
    ///
    /// Same point-in-time semantics as [`iter`](Self::iter).
    pub fn stream(&self) -> Result<Iter<std::vec::IntoIter<T>>>
    where
        T: Clone,
    {
        Ok(stream::iter(self.iter()?))
    }

    /// Loads if needed and returns the number of elements.
    pub fn len(&self) -> Result<usize> {
        self.cell.with_value(|set| set.len())
    }

    /// Loads if needed and returns true if there are no elements.
    pub fn is_empty(&self) -> Result<bool> {
        self.cell.with_value(|set| set.is_empty())
    }

    delegate_cell_ops!();
}

impl<T> std::fmt::Debug for LazySet<T>
where
    T: Eq + Hash + Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazySet").field("cell", &self.cell).finish()
    }
}
