//! Fixed-window request counter

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use crate::domain::client::RateLimitRule;

/// Windows longer than this are clamped
const MAX_WINDOW: Duration = Duration::from_secs(100 * 365 * 24 * 3600);

/// Quota left in the current window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitStatus {
    pub limit: u32,
    pub remaining: u32,
    /// Seconds until the current window ends
    pub reset_after_secs: u64,
}

/// Outcome of counting one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed(RateLimitStatus),
    Limited { limit: u32, retry_after_secs: u64 },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed(_))
    }
}

/// Requests counted for one client identity in the current window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitCounter {
    pub client_key: String,
    pub window_start: DateTime<Utc>,
    pub count: u32,
}

impl RateLimitCounter {
    pub fn new(client_key: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            client_key: client_key.into(),
            window_start: now,
            count: 0,
        }
    }

    pub fn window_end(&self, rule: &RateLimitRule) -> DateTime<Utc> {
        self.window_start + window_delta(rule)
    }

    pub fn is_expired(&self, rule: &RateLimitRule, now: DateTime<Utc>) -> bool {
        now >= self.window_end(rule)
    }

    /// Count one request. A new window starts with the first request after the
    /// previous one elapsed. Rejected requests are not counted.
    pub fn hit(&mut self, rule: &RateLimitRule, now: DateTime<Utc>) -> RateLimitDecision {
        if self.is_expired(rule, now) {
            self.window_start = now;
            self.count = 0;
        }

        let reset_in = self.window_end(rule) - now;

        if self.count >= rule.max_requests {
            return RateLimitDecision::Limited {
                limit: rule.max_requests,
                retry_after_secs: ceil_secs(reset_in).max(1),
            };
        }

        self.count += 1;

        RateLimitDecision::Allowed(RateLimitStatus {
            limit: rule.max_requests,
            remaining: rule.max_requests - self.count,
            reset_after_secs: ceil_secs(reset_in),
        })
    }
}

fn window_delta(rule: &RateLimitRule) -> TimeDelta {
    TimeDelta::from_std(rule.window.min(MAX_WINDOW)).unwrap_or(TimeDelta::zero())
}

fn ceil_secs(delta: TimeDelta) -> u64 {
    let millis = delta.num_milliseconds().max(0) as u64;
    millis.div_ceil(1000)
}
