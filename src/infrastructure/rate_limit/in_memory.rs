//! In-process fixed-window counters

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::domain::client::RateLimitRule;
use crate::domain::rate_limit::{
    Clock, RateLimitCounter, RateLimitDecision, RateLimitStore, SystemClock,
};
use crate::domain::DomainError;

#[derive(Debug)]
struct Slot {
    counter: RateLimitCounter,
    /// Rule of the most recent hit, used to expire the slot
    rule: RateLimitRule,
}

/// Counters keyed by client identity, each behind its own lock so that
/// different clients never contend
#[derive(Debug)]
pub struct InMemoryRateLimitStore {
    slots: RwLock<HashMap<String, Arc<Mutex<Slot>>>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            clock,
        }
    }

    fn new_slot(&self, key: &str, rule: &RateLimitRule) -> Arc<Mutex<Slot>> {
        Arc::new(Mutex::new(Slot {
            counter: RateLimitCounter::new(key, self.clock.now()),
            rule: *rule,
        }))
    }

    fn count(&self, slot: &mut Slot, rule: &RateLimitRule) -> RateLimitDecision {
        slot.rule = *rule;
        slot.counter.hit(rule, self.clock.now())
    }

    /// Drop counters whose window has elapsed. Returns how many were removed.
    pub async fn cleanup(&self) -> usize {
        let now = self.clock.now();
        let mut slots = self.slots.write().await;
        let before = slots.len();

        let mut expired = Vec::new();
        for (key, slot) in slots.iter() {
            // Hits lock their slot under the map lock, so none is held here
            if let Ok(slot) = slot.try_lock() {
                if slot.counter.is_expired(&slot.rule, now) {
                    expired.push(key.clone());
                }
            }
        }
        for key in expired {
            slots.remove(&key);
        }

        before - slots.len()
    }

    /// Run `cleanup` every `interval` until the handle is aborted
    pub fn spawn_cleanup(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let store = Arc::clone(self);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let removed = store.cleanup().await;
                if removed > 0 {
                    debug!(removed, "Expired rate limit counters removed");
                }
            }
        })
    }

    pub async fn len(&self) -> usize {
        self.slots.read().await.len()
    }
}

impl Default for InMemoryRateLimitStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    async fn hit(&self, key: &str, rule: &RateLimitRule) -> Result<RateLimitDecision, DomainError> {
        // The map guard stays alive until the slot is counted so that
        // `cleanup` cannot detach a slot between lookup and increment.
        {
            let slots = self.slots.read().await;
            if let Some(slot) = slots.get(key) {
                let mut slot = slot.lock().await;
                return Ok(self.count(&mut slot, rule));
            }
        }

        let mut slots = self.slots.write().await;
        let slot = slots
            .entry(key.to_string())
            .or_insert_with(|| self.new_slot(key, rule));
        let mut slot = slot.lock().await;
        Ok(self.count(&mut slot, rule))
    }

    async fn reset(&self, key: &str) -> Result<(), DomainError> {
        self.slots.write().await.remove(key);
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rate_limit::mock::ManualClock;
    use crate::domain::rate_limit::RateLimitStatus;
    use chrono::TimeDelta;

    fn store() -> (InMemoryRateLimitStore, ManualClock) {
        let clock = ManualClock::default();
        (InMemoryRateLimitStore::with_clock(Arc::new(clock.clone())), clock)
    }

    #[tokio::test]
    async fn test_ceiling_then_new_window() {
        let (store, clock) = store();
        let rule = RateLimitRule::new(2, Duration::from_secs(60));

        assert!(store.hit("chatbot:a", &rule).await.unwrap().is_allowed());
        assert_eq!(
            store.hit("chatbot:a", &rule).await.unwrap(),
            RateLimitDecision::Allowed(RateLimitStatus {
                limit: 2,
                remaining: 0,
                reset_after_secs: 60
            })
        );

        clock.advance(TimeDelta::seconds(15));
        assert_eq!(
            store.hit("chatbot:a", &rule).await.unwrap(),
            RateLimitDecision::Limited {
                limit: 2,
                retry_after_secs: 45
            }
        );

        clock.advance(TimeDelta::seconds(45));
        assert!(store.hit("chatbot:a", &rule).await.unwrap().is_allowed());
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let (store, _) = store();
        let rule = RateLimitRule::new(1, Duration::from_secs(60));

        assert!(store.hit("chatbot:a", &rule).await.unwrap().is_allowed());
        assert!(store.hit("chatbot:b", &rule).await.unwrap().is_allowed());
        assert!(store.hit("mobile_app:a", &rule).await.unwrap().is_allowed());
        assert!(!store.hit("chatbot:a", &rule).await.unwrap().is_allowed());
    }

    #[tokio::test]
    async fn test_reset() {
        let (store, _) = store();
        let rule = RateLimitRule::new(1, Duration::from_secs(60));

        store.hit("k", &rule).await.unwrap();
        assert!(!store.hit("k", &rule).await.unwrap().is_allowed());

        store.reset("k").await.unwrap();
        assert!(store.hit("k", &rule).await.unwrap().is_allowed());
    }

    #[tokio::test]
    async fn test_cleanup_removes_expired() {
        let (store, clock) = store();
        store
            .hit("short", &RateLimitRule::new(5, Duration::from_secs(10)))
            .await
            .unwrap();
        store
            .hit("long", &RateLimitRule::new(5, Duration::from_secs(3600)))
            .await
            .unwrap();

        clock.advance(TimeDelta::seconds(11));
        assert_eq!(store.cleanup().await, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_hits_never_exceed_ceiling() {
        let store = Arc::new(InMemoryRateLimitStore::new());
        let rule = RateLimitRule::new(25, Duration::from_secs(3600));

        let handles: Vec<_> = (0..100)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.hit("mobile_app:m", &rule).await.unwrap() })
            })
            .collect();

        let mut allowed = 0;
        for handle in handles {
            if handle.await.unwrap().is_allowed() {
                allowed += 1;
            }
        }

        assert_eq!(allowed, 25);
    }

    #[tokio::test]
    async fn test_cleanup_during_hits_never_exceeds_ceiling() {
        let clock = ManualClock::default();
        let store = Arc::new(InMemoryRateLimitStore::with_clock(Arc::new(clock.clone())));
        let rule = RateLimitRule::new(3, Duration::from_secs(10));

        for _ in 0..3 {
            store.hit("chatbot:c", &rule).await.unwrap();
        }
        clock.advance(TimeDelta::seconds(11));

        let hits: Vec<_> = (0..50)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.hit("chatbot:c", &rule).await.unwrap() })
            })
            .collect();
        let sweeps: Vec<_> = (0..50)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.cleanup().await })
            })
            .collect();

        let mut allowed = 0;
        for handle in hits {
            if handle.await.unwrap().is_allowed() {
                allowed += 1;
            }
        }
        for handle in sweeps {
            handle.await.unwrap();
        }

        assert_eq!(allowed, 3);
        assert_eq!(store.len().await, 1);
    }
}
