//! Rate limiter error types

use thiserror::Error;

/// Errors surfaced by counter stores
///
/// [`RateLimiter::check`](crate::RateLimiter::check) never propagates these;
/// a failing store fails open at that boundary.
#[derive(Error, Debug)]
pub enum RateLimitError {
    #[error("Counter store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, RateLimitError>;
