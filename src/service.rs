//! Service-level policies wrapped around the aggregator.
//!
//! Three concerns live here, all applied at the caller boundary rather than
//! inside the aggregation itself:
//!
//! - bounded retry around the *entire* aggregation call (a retry re-runs
//!   every upstream fetch, never a single adapter)
//! - a "latest request wins" guard that discards responses superseded by a
//!   newer request
//! - a single-slot TTL cache with an explicit clock, owned by the
//!   composition root

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::aggregation::{AggregationError, Aggregator};
use crate::model::{Coordinate, TimeWindow, WeatherRecord};

/// Retry configuration for the aggregation retry loop.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure.
    pub max_retries: u32,

    /// The n-th retry waits `base_delay * n`.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Delay before the given retry attempt (1-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

/// The aggregator plus the retry and staleness policies around it.
#[derive(Clone)]
pub struct WeatherService {
    aggregator: Aggregator,
    retry: RetryPolicy,
    sequence: Arc<AtomicU64>,
}

impl WeatherService {
    /// Wrap an aggregator with the default retry policy.
    pub fn new(aggregator: Aggregator) -> Self {
        Self::with_retry(aggregator, RetryPolicy::default())
    }

    /// Wrap an aggregator with a custom retry policy (tests use a zero
    /// policy to avoid sleeping).
    pub fn with_retry(aggregator: Aggregator, retry: RetryPolicy) -> Self {
        Self {
            aggregator,
            retry,
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Aggregate with bounded retry. Each retry re-runs all upstream
    /// fetches; the delay grows linearly with the attempt number.
    pub async fn fetch(
        &self,
        coord: Coordinate,
        window: TimeWindow,
    ) -> Result<WeatherRecord, AggregationError> {
        let mut attempt = 0;
        loop {
            match self.aggregator.aggregate(coord, window).await {
                Ok(record) => {
                    if attempt > 0 {
                        info!(attempt, "aggregation succeeded after retry");
                    }
                    return Ok(record);
                }
                Err(err) if attempt < self.retry.max_retries => {
                    attempt += 1;
                    let delay = self.retry.delay_for_attempt(attempt);
                    warn!(%err, attempt, ?delay, "aggregation failed, backing off");
                    sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Aggregate with retry, returning `None` when a newer request was
    /// started while this one was in flight. A stale response must never
    /// be applied once newer parameters have been requested.
    pub async fn fetch_latest(
        &self,
        coord: Coordinate,
        window: TimeWindow,
    ) -> Option<Result<WeatherRecord, AggregationError>> {
        let ticket = self.begin_request();
        let result = self.fetch(coord, window).await;
        if !self.is_current(ticket) {
            info!(ticket, "discarding superseded aggregation result");
            return None;
        }
        Some(result)
    }

    /// Take a ticket for a new request, superseding all earlier ones.
    pub fn begin_request(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether the ticket still names the newest request.
    pub fn is_current(&self, ticket: u64) -> bool {
        self.sequence.load(Ordering::SeqCst) == ticket
    }
}

/// A single-slot cache with a time-to-live and an explicit clock.
///
/// This replaces the usual module-level "remember the detected location"
/// variable: the slot is owned by the composition root and handed to
/// whoever needs it, and `now` is an argument so expiry is testable.
/// A filled, unexpired slot is never overwritten: the first success wins
/// until it expires.
#[derive(Debug)]
pub struct SingleSlotCache<T> {
    slot: Mutex<Option<(T, Instant)>>,
    ttl: Duration,
}

impl<T: Clone> SingleSlotCache<T> {
    /// Create an empty slot with the given time-to-live.
    pub fn new(ttl: Duration) -> Self {
        Self {
            slot: Mutex::new(None),
            ttl,
        }
    }

    /// The cached value, if one is present and not expired at `now`.
    pub fn get(&self, now: Instant) -> Option<T> {
        let slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        match slot.as_ref() {
            Some((value, stored_at)) if now.duration_since(*stored_at) < self.ttl => {
                Some(value.clone())
            }
            _ => None,
        }
    }

    /// Store a value unless a live one is already present.
    pub fn put(&self, value: T, now: Instant) {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        let live = matches!(
            slot.as_ref(),
            Some((_, stored_at)) if now.duration_since(*stored_at) < self.ttl
        );
        if !live {
            *slot = Some((value, now));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_delay_scales_linearly() {
        let policy = RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(100),
        };

        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(300));
    }

    #[test]
    fn test_latest_request_wins() {
        let service = WeatherService::new(Aggregator::new());

        let first = service.begin_request();
        let second = service.begin_request();

        assert!(!service.is_current(first));
        assert!(service.is_current(second));

        let third = service.begin_request();
        assert!(!service.is_current(second));
        assert!(service.is_current(third));
    }

    async fn mock_backed_service(upstreams: &wiremock::MockServer) -> WeatherService {
        use crate::data_sources::{
            AirQualityClient, ForecastClient, HistoricalClient, UvIndexClient,
        };

        // Only the forecast mock is mounted; the secondary sources 404 and
        // degrade, which is enough for aggregation to succeed.
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/forecast"))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({}))
                    .set_delay(Duration::from_millis(200)),
            )
            .mount(upstreams)
            .await;

        let aggregator = Aggregator::with_clients(
            ForecastClient::with_base_url(&format!("{}/forecast", upstreams.uri())),
            HistoricalClient::with_base_url(&format!("{}/historical", upstreams.uri())),
            AirQualityClient::with_base_url(&format!("{}/air-quality", upstreams.uri())),
            UvIndexClient::with_base_url(&format!("{}/uv", upstreams.uri())),
        );
        WeatherService::with_retry(
            aggregator,
            RetryPolicy {
                max_retries: 0,
                base_delay: Duration::ZERO,
            },
        )
    }

    fn test_params() -> (Coordinate, TimeWindow) {
        (
            Coordinate::new(40.71, -74.0).expect("valid coordinate"),
            TimeWindow::new(0, 1),
        )
    }

    #[tokio::test]
    async fn test_fetch_latest_returns_current_response() {
        let upstreams = wiremock::MockServer::start().await;
        let service = mock_backed_service(&upstreams).await;
        let (coord, window) = test_params();

        let result = service.fetch_latest(coord, window).await;
        assert!(matches!(result, Some(Ok(_))));
    }

    #[tokio::test]
    async fn test_fetch_latest_discards_superseded_response() {
        let upstreams = wiremock::MockServer::start().await;
        let service = mock_backed_service(&upstreams).await;
        let (coord, window) = test_params();

        // Supersede the in-flight request well before its 200ms response lands
        let (result, ()) = tokio::join!(service.fetch_latest(coord, window), async {
            sleep(Duration::from_millis(50)).await;
            service.begin_request();
        });

        assert!(result.is_none());
    }

    #[test]
    fn test_cache_returns_live_value() {
        let cache = SingleSlotCache::new(Duration::from_secs(60));
        let start = Instant::now();

        cache.put(7u32, start);
        assert_eq!(cache.get(start + Duration::from_secs(30)), Some(7));
    }

    #[test]
    fn test_cache_expires_by_ttl() {
        let cache = SingleSlotCache::new(Duration::from_secs(60));
        let start = Instant::now();

        cache.put(7u32, start);
        assert_eq!(cache.get(start + Duration::from_secs(61)), None);
    }

    #[test]
    fn test_cache_first_success_wins() {
        let cache = SingleSlotCache::new(Duration::from_secs(60));
        let start = Instant::now();

        cache.put(7u32, start);
        cache.put(9u32, start + Duration::from_secs(1));
        assert_eq!(cache.get(start + Duration::from_secs(2)), Some(7));
    }

    #[test]
    fn test_cache_refills_after_expiry() {
        let cache = SingleSlotCache::new(Duration::from_secs(60));
        let start = Instant::now();

        cache.put(7u32, start);
        cache.put(9u32, start + Duration::from_secs(120));
        assert_eq!(cache.get(start + Duration::from_secs(121)), Some(9));
    }
}
