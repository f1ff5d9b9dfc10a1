//! Rate limit counter stores
//!
//! The in-memory store serves a single instance. The Redis store shares
//! counters between instances through an atomic server-side script.

mod in_memory;
mod redis;

pub use in_memory::InMemoryRateLimitStore;
pub use self::redis::{RedisRateLimitConfig, RedisRateLimitStore};
