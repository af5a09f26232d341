//! Client-side call throttling.
//!
//! Uses a `governor` GCRA limiter with a burst of one, so consecutive
//! requests are spaced by at least one interval.

use crate::error::{ApiError, Result};
use governor::{
    clock::DefaultClock,
    middleware::NoOpMiddleware,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovernorRateLimiter,
};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

type Limiter = GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

struct Bucket {
    requests_per_second: f64,
    limiter: Limiter,
}

/// Enforces a minimum gap between consecutive requests.
///
/// The rate is passed per call. The governor limiter is rebuilt when it
/// changes. The bucket stays locked while waiting, so concurrent callers
/// sharing one limiter queue up.
#[derive(Default)]
pub struct RateLimiter {
    bucket: Mutex<Option<Bucket>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until a request at `requests_per_second` may be issued.
    pub async fn throttle(&self, requests_per_second: f64) {
        let mut bucket = self.bucket.lock().await;

        let Some(period) = interval(requests_per_second) else {
            return;
        };

        if bucket.as_ref().map_or(true, |b| b.requests_per_second != requests_per_second) {
            let Some(quota) = Quota::with_period(period) else {
                return;
            };
            let limiter = GovernorRateLimiter::direct(quota);

            // A fresh limiter starts with a full cell. After a rate change the
            // previous request counts as just issued.
            if bucket.is_some() {
                let _ = limiter.check();
            }
            debug!("Rate limiter set to {} req/s ({:?} interval)", requests_per_second, period);
            *bucket = Some(Bucket { requests_per_second, limiter });
        }

        if let Some(bucket) = bucket.as_ref() {
            if bucket.limiter.check().is_err() {
                debug!("Throttling at {} req/s", requests_per_second);
                bucket.limiter.until_ready().await;
            }
        }
    }
}

/// Minimum interval for a rate; `None` disables throttling.
///
/// Rates so small that the interval does not fit in `u64` nanoseconds also
/// yield `None`; [`check_rate`] rejects them up front.
pub fn interval(requests_per_second: f64) -> Option<Duration> {
    if requests_per_second.is_finite() && requests_per_second > 0.0 {
        Duration::try_from_secs_f64(1.0 / requests_per_second)
            .ok()
            .filter(|d| d.as_nanos() <= u128::from(u64::MAX))
    } else {
        None
    }
}

/// Rejects positive rates whose interval is out of range.
pub fn check_rate(requests_per_second: f64) -> Result<()> {
    let enabled = requests_per_second.is_finite() && requests_per_second > 0.0;
    if enabled && interval(requests_per_second).is_none() {
        return Err(ApiError::Config(format!(
            "requests_per_second {} is too small: interval out of range",
            requests_per_second
        )));
    }
    Ok(())
}
