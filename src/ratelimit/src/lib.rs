//! # Concord Rate Limiter
//!
//! Fixed-window request budgets for the forum's write paths.
//!
//! ## Features
//!
//! - **Per-class budgets** for posts, comments, votes, and flags
//! - **Deny without consuming** budget; only admitted actions count
//! - **Fail open** when the counter store is unreachable
//! - **Pluggable counters** (in-process, PostgreSQL)
//!
//! ## Example
//!
//! ```rust
//! use concord_ratelimit::{ActionClass, MemoryCounterStore, RateLimitConfig, RateLimiter};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = Arc::new(MemoryCounterStore::new());
//!     let limiter = RateLimiter::new(store, RateLimitConfig::default());
//!
//!     if limiter.check(ActionClass::Vote, "actor:alice").await {
//!         // proceed with the vote
//!     }
//! }
//! ```

pub mod config;
pub mod error;
pub mod limiter;
pub mod store;

// Re-export commonly used types
pub use config::{ActionClass, Budget, RateLimitConfig};
pub use error::{RateLimitError, Result};
pub use limiter::{client_key, register_metrics, RateLimiter};
pub use store::{CounterStore, MemoryCounterStore};
#[cfg(feature = "postgres")]
pub use store::PostgresCounterStore;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
