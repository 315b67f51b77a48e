//! The generic lazy cache cell.
//!
//! A [`LazyCell`] owns a value, the loader that produces it, and the instant at which it
//! goes stale. Every state read or write, including the loader call itself, happens under
//! one per-cell mutex, so racing readers of an expired cell trigger a single load.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, instrument, warn};

use lazyload_core::{
    BoxError, CacheConfig, CacheHooks, CacheState, CacheStats, ErrorListener, Expiration,
    LazyError, LoadResult, Result,
};

type LoaderFn<L> = Box<dyn Fn() -> LoadResult<L> + Send + Sync>;

/// Value and expiration, guarded together.
pub(crate) struct CellState<T> {
    pub(crate) value: T,
    pub(crate) expiration: Expiration,
}

/// A lazily loaded, TTL-expiring value.
///
/// Nothing is loaded at construction. The first access invokes the loader and hands the
/// result to the [`CacheHooks`]; later accesses return the held value until the TTL
/// elapses, at which point the next access reloads.
///
/// # Thread Safety
///
/// All operations lock the cell. A slow loader therefore blocks every other caller of the
/// same cell until it returns; callers never see a half-applied reload.
///
/// Load failures reach [`CacheHooks::report_load_error`] and the `on_load_error` listener
/// after the lock is released, so both may query the cell they belong to.
pub struct LazyCell<H: CacheHooks> {
    hooks: H,
    loader: LoaderFn<H::Loaded>,
    ttl: Option<Duration>,
    label: String,
    error_listener: Option<ErrorListener>,
    state: Mutex<CellState<H::Value>>,
    loads: AtomicU64,
    load_failures: AtomicU64,
    hits: AtomicU64,
}

impl<H: CacheHooks> LazyCell<H> {
    /// Creates a cell driven by `hooks`, loading through `loader`.
    ///
    /// The initial value comes from `hooks.prepopulate()`; the loader is not called.
    pub fn with_hooks<F, E>(hooks: H, loader: F, config: &CacheConfig) -> Self
    where
        F: Fn() -> std::result::Result<H::Loaded, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        let value = hooks.prepopulate();
        Self {
            hooks,
            loader: Box::new(move || -> LoadResult<H::Loaded> { loader().map_err(Into::into) }),
            ttl: config.ttl(),
            label: config.label.clone(),
            error_listener: None,
            state: Mutex::new(CellState {
                value,
                expiration: Expiration::Unloaded,
            }),
            loads: AtomicU64::new(0),
            load_failures: AtomicU64::new(0),
            hits: AtomicU64::new(0),
        }
    }

    /// Registers a callback that sees every load failure before it is returned.
    ///
    /// The callback runs after the cell lock is released and may call back into the cell.
    pub fn on_load_error<F>(mut self, listener: F) -> Self
    where
        F: Fn(&LazyError) + Send + Sync + 'static,
    {
        self.error_listener = Some(Box::new(listener));
        self
    }

    /// Loads the value if it was never loaded or has gone stale.
    ///
    /// # Errors
    /// Returns `LoadFailed` if the loader fails. The held value is left untouched and the
    /// cell stays expired, so the next access retries.
    pub fn load(&self) -> Result<()> {
        let loaded = self.load_locked(&mut self.state.lock(), false);
        loaded.map_err(|error| self.report(error))
    }

    /// Invokes the loader regardless of the current expiration.
    pub fn load_forced(&self) -> Result<()> {
        let loaded = self.load_locked(&mut self.state.lock(), true);
        loaded.map_err(|error| self.report(error))
    }

    /// Loads if needed, then returns a clone of the held value.
    ///
    /// For collection caches the clone is a handle to the same live container.
    pub fn value(&self) -> Result<H::Value>
    where
        H::Value: Clone,
    {
        self.with_value(Clone::clone)
    }

    /// Loads if needed, then runs `f` on the held value while the cell is locked.
    pub fn with_value<R>(&self, f: impl FnOnce(&H::Value) -> R) -> Result<R> {
        let result = {
            let mut state = self.state.lock();
            self.load_locked(&mut state, false).map(|()| f(&state.value))
        };
        result.map_err(|error| self.report(error))
    }

    /// Marks the cell unloaded. The held value is kept until the next load replaces it.
    pub fn expire(&self) {
        let mut state = self.state.lock();
        self.expire_locked(&mut state);
    }

    /// Resets the held value to its initial state and marks the cell unloaded.
    ///
    /// Releases whatever the previous value referenced. For collection caches this also
    /// detaches previously returned handles from future reloads.
    pub fn unload(&self) {
        let mut state = self.state.lock();
        state.value = self.hooks.prepopulate();
        self.expire_locked(&mut state);
        debug!(cache = %self.label, "Unloaded value");
    }

    /// Returns true if a value has been loaded, even if it is now stale.
    pub fn is_loaded(&self) -> bool {
        self.state.lock().expiration.is_loaded()
    }

    /// Returns true if the next access will invoke the loader.
    ///
    /// Informational only: another thread may reload the cell right after this returns.
    pub fn is_expired(&self) -> bool {
        self.state.lock().expiration.is_expired_at(Instant::now())
    }

    /// Starts a new TTL period from now without invoking the loader.
    pub fn renew(&self) {
        let mut state = self.state.lock();
        self.renew_locked(&mut state);
        debug!(cache = %self.label, "Renewed expiration");
    }

    /// Current position in the unloaded / fresh / stale state machine.
    pub fn state(&self) -> CacheState {
        self.state.lock().expiration.state_at(Instant::now())
    }

    /// Time left before the value goes stale, if it is loaded and has a TTL.
    pub fn remaining_ttl(&self) -> Option<Duration> {
        self.state.lock().expiration.remaining_at(Instant::now())
    }

    /// Returns load and hit counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            loads: self.loads.load(Ordering::Relaxed),
            load_failures: self.load_failures.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            state: self.state(),
        }
    }

    /// The configured time-to-live.
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// The label used in logs and errors.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The hooks driving this cell.
    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub(crate) fn lock_state(&self) -> MutexGuard<'_, CellState<H::Value>> {
        self.state.lock()
    }

    /// Hands a load failure to the hooks and the listener, then gives it back.
    ///
    /// Must be called with the state lock released.
    pub(crate) fn report(&self, error: LazyError) -> LazyError {
        self.hooks.report_load_error(&error);
        if let Some(listener) = &self.error_listener {
            listener(&error);
        }
        error
    }

    /// Loads under a held lock. Failures are returned unreported; see [`Self::report`].
    pub(crate) fn load_locked(
        &self,
        state: &mut CellState<H::Value>,
        forceful: bool,
    ) -> Result<()> {
        if !forceful && !state.expiration.is_expired_at(Instant::now()) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(());
        }
        self.fetch(state)
    }

    #[instrument(level = "debug", skip_all, fields(cache = %self.label))]
    fn fetch(&self, state: &mut CellState<H::Value>) -> Result<()> {
        let started = Instant::now();

        match (self.loader)() {
            Ok(loaded) => {
                self.hooks.apply_data(&mut state.value, loaded);
                self.renew_locked(state);
                self.loads.fetch_add(1, Ordering::Relaxed);
                debug!(elapsed_ms = (started.elapsed().as_millis() as u64), "Loaded value");
                Ok(())
            }
            Err(source) => {
                self.load_failures.fetch_add(1, Ordering::Relaxed);
                let error = LazyError::load_failed(&self.label, source);
                warn!(error = %error, "Load failed");
                Err(error)
            }
        }
    }

    fn renew_locked(&self, state: &mut CellState<H::Value>) {
        state.expiration = Expiration::after(Instant::now(), self.ttl);
    }

    fn expire_locked(&self, state: &mut CellState<H::Value>) {
        state.expiration = Expiration::Unloaded;
        self.hooks.on_expiration();
        debug!(cache = %self.label, "Expired value");
    }
}

impl<H: CacheHooks> std::fmt::Debug for LazyCell<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyCell")
            .field("label", &self.label)
            .field("ttl", &self.ttl)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Generates the cell operations every cache wrapper re-exposes.
macro_rules! delegate_cell_ops {
    () => {
        /// Registers a callback that sees every load failure before it is returned.
        ///
        /// The callback runs after the cache lock is released and may call back into it.
        pub fn on_load_error<F>(mut self, listener: F) -> Self
        where
            F: Fn(&lazyload_core::LazyError) + Send + Sync + 'static,
        {
            self.cell = self.cell.on_load_error(listener);
            self
        }

        /// Loads the value if it was never loaded or has gone stale.
        pub fn load(&self) -> lazyload_core::Result<()> {
            self.cell.load()
        }

        /// Invokes the loader regardless of the current expiration.
        pub fn load_forced(&self) -> lazyload_core::Result<()> {
            self.cell.load_forced()
        }

        /// Marks the cache unloaded, keeping the held value until the next load.
        pub fn expire(&self) {
            self.cell.expire()
        }

        /// Resets the held value to its initial state and marks the cache unloaded.
        pub fn unload(&self) {
            self.cell.unload()
        }

        /// Returns true if a value has been loaded, even if it is now stale.
        pub fn is_loaded(&self) -> bool {
            self.cell.is_loaded()
        }

        /// Returns true if the next access will invoke the loader.
        pub fn is_expired(&self) -> bool {
            self.cell.is_expired()
        }

        /// Starts a new TTL period from now without invoking the loader.
        pub fn renew(&self) {
            self.cell.renew()
        }

        /// Current position in the unloaded / fresh / stale state machine.
        pub fn state(&self) -> lazyload_core::CacheState {
            self.cell.state()
        }

        /// Time left before the value goes stale, if it is loaded and has a TTL.
        pub fn remaining_ttl(&self) -> Option<std::time::Duration> {
            self.cell.remaining_ttl()
        }

        /// Returns load and hit counters.
        pub fn stats(&self) -> lazyload_core::CacheStats {
            self.cell.stats()
        }

        /// The configured time-to-live.
        pub fn ttl(&self) -> Option<std::time::Duration> {
            self.cell.ttl()
        }

        /// The label used in logs and errors.
        pub fn label(&self) -> &str {
            self.cell.label()
        }
    };
}

pub(crate) use delegate_cell_ops;
