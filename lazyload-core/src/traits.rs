//! Extension points for cache specializations.
//!
//! A lazy cache is split in two: the cell, which owns locking, expiration and the loader,
//! and a [`CacheHooks`] implementation, which decides what the value looks like before the
//! first load and how a freshly loaded value is folded into the one already held.

use crate::error::LazyError;

/// Callback invoked with every load failure before it is returned to the caller.
///
/// Runs after the cell lock is released, so it may call back into the cache.
pub type ErrorListener = Box<dyn Fn(&LazyError) + Send + Sync>;

/// Strategy plugged into a lazy cache cell.
///
/// `Value` is what the cell stores and hands out; `Loaded` is what the loader produces.
/// They differ for collection caches, where the loader returns a plain collection and the
/// cell keeps a shared container that is reconciled in place.
///
/// Implementations might:
/// - Replace the held value wholesale (scalars)
/// - Reconcile a shared container so existing handles keep observing it (sets, maps)
/// - Record failures or expirations for their own bookkeeping
pub trait CacheHooks: Send + Sync {
    /// The type held by the cell and returned from `value()`.
    type Value: Send;

    /// The type produced by the loader.
    type Loaded;

    /// Produces the value held before the first load and after `unload()`.
    ///
    /// Must always succeed and return a well-formed value.
    fn prepopulate(&self) -> Self::Value;

    /// Folds a freshly loaded value into the current one.
    fn apply_data(&self, current: &mut Self::Value, loaded: Self::Loaded);

    /// Called with every load failure before it propagates. Cannot suppress it.
    ///
    /// Runs after the cell lock is released. The other hooks run while it is held and must
    /// not call back into the cell.
    fn report_load_error(&self, _error: &LazyError) {}

    /// Called whenever the cell is marked unloaded.
    fn on_expiration(&self) {}
}
