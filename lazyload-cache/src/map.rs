//! Lazily loaded maps reconciled in place.
//!
//! Reloads drop keys that disappeared and overwrite every loaded entry. The container
//! itself is kept, so handles returned by [`LazyMap::map`] stay live; individual values
//! are replaced, not merged.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use futures::stream::{self, Iter};

use lazyload_core::{BoxError, CacheConfig, CacheHooks, Result};

use crate::cell::{delegate_cell_ops, LazyCell};

/// Hooks for maps: starts empty, replaces by key.
pub struct MapHooks<K, V> {
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V> Default for MapHooks<K, V> {
    fn default() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<K, V> CacheHooks for MapHooks<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Send + Sync,
{
    type Value = Arc<DashMap<K, V>>;
    type Loaded = HashMap<K, V>;

    fn prepopulate(&self) -> Arc<DashMap<K, V>> {
        Arc::new(DashMap::new())
    }

    fn apply_data(&self, current: &mut Arc<DashMap<K, V>>, loaded: HashMap<K, V>) {
        current.retain(|key, _| loaded.contains_key(key));

        for (key, value) in loaded {
            current.insert(key, value);
        }
    }
}

/// A lazily loaded key/value map whose container survives reloads.
pub struct LazyMap<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Send + Sync,
{
    cell: LazyCell<MapHooks<K, V>>,
}

impl<K, V> LazyMap<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Send + Sync,
{
    /// Creates a map that never expires once loaded.
    pub fn new<F, E>(loader: F) -> Self
    where
        F: Fn() -> std::result::Result<HashMap<K, V>, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        Self::with_config(loader, &CacheConfig::default())
    }

    /// Creates a map that goes stale `ttl` after each load.
    pub fn with_ttl<F, E>(loader: F, ttl: Duration) -> Self
    where
        F: Fn() -> std::result::Result<HashMap<K, V>, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        Self::with_config(loader, &CacheConfig::default().with_ttl(ttl))
    }

    /// Creates a map from a full configuration.
    pub fn with_config<F, E>(loader: F, config: &CacheConfig) -> Self
    where
        F: Fn() -> std::result::Result<HashMap<K, V>, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        Self {
            cell: LazyCell::with_hooks(MapHooks::default(), loader, config),
        }
    }

    /// Loads if needed and returns the live container.
    ///
    /// The handle is not a snapshot: later reloads reconcile it in place.
    pub fn map(&self) -> Result<Arc<DashMap<K, V>>> {
        self.cell.value()
    }

    /// Loads if needed and returns a copy of the value stored under `key`.
    pub fn get<Q>(&self, key: &Q) -> Result<Option<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.cell
            .with_value(|map| map.get(key).map(|entry| entry.value().clone()))
    }

    /// Loads if needed and returns a snapshot iterator over the current values.
    ///
    /// The values are cloned into the iterator when this is called. Reloads that happen
    /// afterwards are not reflected in it; use [`map`](Self::map) for a live view. Keys are
    /// not exposed.
    pub fn iter(&self) -> Result<std::vec::IntoIter<V>>
    where
        V: Clone,
    {
        let map = self.map()?;
        let values: Vec<V> = map.iter().map(|entry| entry.value().clone()).collect();
        Ok(values.into_iter())
    }

    /// Loads if needed and returns a snapshot of the current values as a stream.
    ///
    /// Same point-in-time semantics as [`iter`](Self::iter).
    pub fn stream(&self) -> Result<Iter<std::vec::IntoIter<V>>>
    where
        V: Clone,
    {
        Ok(stream::iter(self.iter()?))
    }

    /// Loads if needed and returns the number of entries.
    pub fn len(&self) -> Result<usize> {
        self.cell.with_value(|map| map.len())
    }

    /// Loads if needed and returns true if there are no entries.
    pub fn is_empty(&self) -> Result<bool> {
        self.cell.with_value(|map| map.is_empty())
    }

    delegate_cell_ops!();
}

impl<K, V> std::fmt::Debug for LazyMap<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyMap").field("cell", &self.cell).finish()
    }
}
