use std::{
    collections::{HashMap, VecDeque},
    time::Duration,
};

use tokio::{sync::Mutex, time::Instant};

use crate::config::RateLimitConfig;

/// Keys are only swept once the map grows past this size.
const SWEEP_THRESHOLD: usize = 4096;

/// Sliding-window limiter keyed by client address.
pub struct RateLimiter {
    windows: Mutex<HashMap<String, VecDeque<Instant>>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            max_requests: config.max_requests,
            window: Duration::from_secs(config.window_secs),
        }
    }

    pub fn window_secs(&self) -> u64 {
        self.window.as_secs()
    }

    pub async fn allow(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut lock = self.windows.lock().await;

        if lock.len() > SWEEP_THRESHOLD {
            lock.retain(|_, hits| hits.back().is_some_and(|last| now.duration_since(*last) < self.window));
        }

        let hits = lock.entry(key.to_string()).or_default();
        prune(hits, now, self.window);

        if hits.len() >= self.max_requests {
            return false;
        }

        hits.push_back(now);
        true
    }
}

fn prune(hits: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while hits
        .front()
        .is_some_and(|first| now.duration_since(*first) >= window)
    {
        hits.pop_front();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: usize, window_secs: u64) -> RateLimiter {
        RateLimiter::new(&RateLimitConfig {
            enabled: true,
            max_requests,
            window_secs,
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_blocks_after_limit() {
        let limiter = limiter(3, 60);

        for _ in 0..3 {
            assert!(limiter.allow("10.0.0.1").await);
        }
        assert!(!limiter.allow("10.0.0.1").await);

        assert!(limiter.allow("10.0.0.2").await);
        assert!(limiter.allow("10.0.0.2").await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_slides() {
        let limiter = limiter(2, 10);

        assert!(limiter.allow("a").await);
        tokio::time::advance(Duration::from_secs(6)).await;
        assert!(limiter.allow("a").await);
        assert!(!limiter.allow("a").await);

        tokio::time::advance(Duration::from_secs(5)).await;
        assert!(limiter.allow("a").await);
        assert!(!limiter.allow("a").await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_keys_are_swept() {
        let limiter = limiter(1, 10);

        for i in 0..=SWEEP_THRESHOLD {
            assert!(limiter.allow(&format!("10.1.{}.{}", i / 256, i % 256)).await);
        }
        tokio::time::advance(Duration::from_secs(11)).await;

        assert!(limiter.allow("fresh").await);
        assert_eq!(limiter.windows.lock().await.len(), 1);
    }
}
