//! Rate limiting domain: fixed-window counters and the counter store seam

mod clock;
mod counter;
mod store;

pub use clock::{Clock, SystemClock};
pub use counter::{RateLimitCounter, RateLimitDecision, RateLimitStatus};
pub use store::RateLimitStore;

#[cfg(test)]
pub use clock::mock;
