//! # lazyload core
//!
//! Core types, errors, and traits shared by the lazyload cache family.
//!
//! This crate provides the building blocks used by `lazyload-cache`:
//!
//! - **Types**: Expiration bookkeeping, cache state, statistics, and configuration
//! - **Errors**: The load failure error and its classification helpers
//! - **Constants**: Defaults and environment variable names
//! - **Traits**: The [`CacheHooks`] extension points every cache specialization implements
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//! use lazyload_core::CacheConfig;
//!
//! let config = CacheConfig::new("users").with_ttl(Duration::from_secs(30));
//! assert_eq!(config.ttl(), Some(Duration::from_secs(30)));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{BoxError, LazyError, LoadResult, Result};
pub use traits::*;
pub use types::*;
