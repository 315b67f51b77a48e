//! # lazyload cache
//!
//! Lazily loaded, TTL-expiring caches.
//!
//! Nothing is loaded until the first access. After a successful load the value is served
//! from memory until its TTL elapses; the next access after that reloads it. There is no
//! background refresh.
//!
//! - [`LazyValue`]: Scalars, replaced wholesale on reload
//! - [`LazySet`]: Sets, reconciled in place so live handles keep working
//! - [`LazyMap`]: Maps, reconciled by key in place
//! - [`LazyCell`]: The generic cell, for custom [`CacheHooks`](lazyload_core::CacheHooks)
//!
//! ## Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use std::time::Duration;
//! use lazyload_cache::LazyMap;
//! use lazyload_core::LoadResult;
//!
//! let prices = LazyMap::with_ttl(
//!     || -> LoadResult<HashMap<String, u32>> {
//!         Ok(HashMap::from([("apple".to_string(), 3)]))
//!     },
//!     Duration::from_secs(60),
//! );
//!
//! assert_eq!(prices.get("apple").unwrap(), Some(3));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod cell;
mod map;
mod set;
mod value;

pub use cell::LazyCell;
pub use map::{LazyMap, MapHooks};
pub use set::{LazySet, SetHooks};
pub use value::{LazyValue, ScalarHooks};
