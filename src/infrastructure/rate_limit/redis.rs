//! Redis-backed counters shared between gateway instances

use std::fmt;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{Client, Script};

use crate::domain::client::RateLimitRule;
use crate::domain::rate_limit::{RateLimitDecision, RateLimitStatus, RateLimitStore};
use crate::domain::DomainError;

/// Count one request unless the ceiling is reached. The window starts with
/// the first request and expires with the key. Returns
/// `{allowed, count, ttl_ms}`.
const HIT_SCRIPT: &str = r"
local window = tonumber(ARGV[1])
local limit = tonumber(ARGV[2])
local ttl = redis.call('PTTL', KEYS[1])
if ttl < 0 then
  redis.call('SET', KEYS[1], 1, 'PX', window)
  return {1, 1, window}
end
local count = tonumber(redis.call('GET', KEYS[1]))
if count >= limit then
  return {0, count, ttl}
end
count = redis.call('INCR', KEYS[1])
return {1, count, ttl}
";

#[derive(Debug, Clone)]
pub struct RedisRateLimitConfig {
    /// Redis connection URL (e.g., "redis://127.0.0.1:6379")
    pub url: String,
    /// Namespace for counter keys
    pub key_prefix: String,
}

impl Default for RedisRateLimitConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            key_prefix: "mai:ratelimit".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct RedisRateLimitStore {
    connection: ConnectionManager,
    config: RedisRateLimitConfig,
    script: Script,
}

impl fmt::Debug for RedisRateLimitStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisRateLimitStore")
            .field("config", &self.config)
            .field("connection", &"<ConnectionManager>")
            .finish()
    }
}

impl RedisRateLimitStore {
    pub async fn new(config: RedisRateLimitConfig) -> Result<Self, DomainError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| DomainError::storage(format!("Failed to create Redis client: {}", e)))?;

        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to connect to Redis: {}", e)))?;

        Ok(Self {
            connection,
            config,
            script: Script::new(HIT_SCRIPT),
        })
    }

    fn prefix_key(&self, key: &str) -> String {
        format!("{}:{}", self.config.key_prefix, key)
    }
}

/// Map the script reply onto a decision
fn decision(limit: u32, reply: &[i64]) -> Result<RateLimitDecision, DomainError> {
    let [allowed, count, ttl_ms] = reply else {
        return Err(DomainError::storage(format!(
            "Unexpected rate limit script reply: {:?}",
            reply
        )));
    };

    let reset_after_secs = (*ttl_ms).max(0).unsigned_abs().div_ceil(1000);

    if *allowed == 1 {
        let count = u32::try_from(*count).unwrap_or(u32::MAX);
        Ok(RateLimitDecision::Allowed(RateLimitStatus {
            limit,
            remaining: limit.saturating_sub(count),
            reset_after_secs,
        }))
    } else {
        Ok(RateLimitDecision::Limited {
            limit,
            retry_after_secs: reset_after_secs.max(1),
        })
    }
}

#[async_trait]
impl RateLimitStore for RedisRateLimitStore {
    async fn hit(&self, key: &str, rule: &RateLimitRule) -> Result<RateLimitDecision, DomainError> {
        let mut conn = self.connection.clone();
        let window_ms = u64::try_from(rule.window.as_millis()).unwrap_or(u64::MAX).max(1);

        let reply: Vec<i64> = self
            .script
            .key(self.prefix_key(key))
            .arg(window_ms)
            .arg(rule.max_requests)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| DomainError::storage(format!("Rate limit check failed: {}", e)))?;

        decision(rule.max_requests, &reply)
    }

    async fn reset(&self, key: &str) -> Result<(), DomainError> {
        let mut conn = self.connection.clone();

        let _: i64 = redis::cmd("DEL")
            .arg(self.prefix_key(key))
            .query_async(&mut conn)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to reset '{}': {}", key, e)))?;

        Ok(())
    }

    fn backend(&self) -> &'static str {
        "redis"
    }

    async fn health_check(&self) -> Result<(), DomainError> {
        let mut conn = self.connection.clone();

        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| DomainError::storage(format!("Redis ping failed: {}", e)))?;

        Ok(())
    }
}
