//! Token-bucket throttle for outbound API requests
//!
//! The bucket holds up to `burst` tokens and refills continuously at
//! `burst` tokens per `interval`. Every request takes one token, waiting
//! for the refill when the bucket is empty.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::config::ThrottleConfig;

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Gate that paces outbound requests
#[derive(Debug)]
pub struct Throttle {
    capacity: f64,
    /// Tokens added per second
    rate: f64,
    bucket: Option<Mutex<Bucket>>,
}

impl Throttle {
    /// Create a throttle admitting `burst` requests per `interval`
    ///
    /// A zero burst or zero interval yields a disabled throttle.
    pub fn new(burst: u32, interval: Duration) -> Self {
        if burst == 0 || interval.is_zero() {
            return Self::disabled();
        }

        let capacity = f64::from(burst);
        Self {
            capacity,
            rate: capacity / interval.as_secs_f64(),
            bucket: Some(Mutex::new(Bucket {
                tokens: capacity,
                last_refill: Instant::now(),
            })),
        }
    }

    /// A throttle that never waits
    pub fn disabled() -> Self {
        Self {
            capacity: 0.0,
            rate: 0.0,
            bucket: None,
        }
    }

    pub fn from_config(config: &ThrottleConfig) -> Self {
        if config.enabled {
            Self::new(config.burst, config.interval)
        } else {
            Self::disabled()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.bucket.is_some()
    }

    /// Take one token, sleeping until one is available
    pub async fn acquire(&self) {
        let Some(bucket) = &self.bucket else {
            return;
        };

        let mut bucket = bucket.lock().await;
        self.refill(&mut bucket);

        if bucket.tokens < 1.0 {
            let wait = Duration::from_secs_f64((1.0 - bucket.tokens) / self.rate);
            debug!(wait_ms = wait.as_millis() as u64, "Throttling request");
            tokio::time::sleep(wait).await;
            self.refill(&mut bucket);
        }

        bucket.tokens = (bucket.tokens - 1.0).max(0.0);
    }

    fn refill(&self, bucket: &mut Bucket) {
        let now = Instant::now();
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.rate).min(self.capacity);
        bucket.last_refill = now;
    }
}
