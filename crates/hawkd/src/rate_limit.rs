//! Token bucket admission control for inbound commands.
//!
//! Every decoded command costs one token. Tokens refill continuously from
//! elapsed monotonic time up to the burst capacity, so idle periods never
//! bank more than one burst. Nothing is queued: a command that finds the
//! bucket empty is refused immediately with a retry hint.

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Clock abstraction so tests can drive refill deterministically.
pub trait Clock: Send + Sync {
    /// Returns the current monotonic instant.
    fn now(&self) -> Instant;
}

/// Clock backed by [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RealClock;

impl Clock for RealClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Refusal returned when the bucket is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimited {
    /// Milliseconds until the next token becomes available.
    pub retry_after_ms: u64,
}

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Thread-safe token bucket.
pub struct RateLimiter<C: Clock = RealClock> {
    bucket: Mutex<Bucket>,
    capacity: f64,
    refill_per_sec: f64,
    clock: C,
}

impl RateLimiter<RealClock> {
    /// Creates a full bucket using the system clock.
    #[must_use]
    pub fn new(rate_per_sec: f64, burst_capacity: u32) -> Self {
        Self::with_clock(rate_per_sec, burst_capacity, RealClock)
    }
}

impl<C: Clock> RateLimiter<C> {
    /// Creates a full bucket using the supplied clock.
    ///
    /// The caller is expected to have validated that `rate_per_sec` is
    /// positive and finite and that `burst_capacity` is at least one.
    pub fn with_clock(rate_per_sec: f64, burst_capacity: u32, clock: C) -> Self {
        let capacity = f64::from(burst_capacity);
        let now = clock.now();
        Self {
            bucket: Mutex::new(Bucket {
                tokens: capacity,
                last_refill: now,
            }),
            capacity,
            refill_per_sec: rate_per_sec,
            clock,
        }
    }

    /// Takes one token.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimited`] when the bucket holds less than one token.
    pub fn try_acquire(&self) -> Result<(), RateLimited> {
        let mut bucket = self
            .bucket
            .lock()
            .unwrap_or_else(|poison| poison.into_inner());
        self.refill(&mut bucket);

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            return Ok(());
        }

        let wait = Duration::try_from_secs_f64((1.0 - bucket.tokens) / self.refill_per_sec)
            .unwrap_or(Duration::MAX);
        Err(RateLimited {
            retry_after_ms: u64::try_from(wait.as_millis())
                .unwrap_or(u64::MAX)
                .max(1),
        })
    }

    /// Returns the whole tokens currently available.
    #[must_use]
    pub fn available(&self) -> u32 {
        let mut bucket = self
            .bucket
            .lock()
            .unwrap_or_else(|poison| poison.into_inner());
        self.refill(&mut bucket);
        whole_tokens(bucket.tokens)
    }

    fn refill(&self, bucket: &mut Bucket) {
        let now = self.clock.now();
        let elapsed = now.saturating_duration_since(bucket.last_refill);
        if elapsed.is_zero() {
            return;
        }
        bucket.tokens = elapsed
            .as_secs_f64()
            .mul_add(self.refill_per_sec, bucket.tokens)
            .min(self.capacity);
        bucket.last_refill = now;
    }
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "tokens are clamped to 0..=u32::MAX before conversion"
)]
fn whole_tokens(tokens: f64) -> u32 {
    tokens.floor().clamp(0.0, f64::from(u32::MAX)) as u32
}

#[cfg(test)]
pub(crate) mod test_clock {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{Duration, Instant};

    use super::Clock;

    /// Clock that only moves when told to.
    #[derive(Debug, Clone)]
    pub(crate) struct ManualClock {
        base: Instant,
        offset_nanos: Arc<AtomicU64>,
    }

    impl ManualClock {
        pub(crate) fn new() -> Self {
            Self {
                base: Instant::now(),
                offset_nanos: Arc::new(AtomicU64::new(0)),
            }
        }

        pub(crate) fn advance(&self, duration: Duration) {
            let nanos = u64::try_from(duration.as_nanos()).expect("duration fits in u64");
            self.offset_nanos.fetch_add(nanos, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            self.base + Duration::from_nanos(self.offset_nanos.load(Ordering::SeqCst))
        }
    }
}
