//! Rate-floor cache for departure sources.
//!
//! The data provider forbids polling a station more often than every 15
//! seconds. The poller's own cadence respects that, but manual refreshes do
//! not go through the timer. Wrapping the source in [`CachedSource`] serves
//! the last successful result for a station until it is at least the floor
//! interval old. Callers that arrive while a fetch for the same station is in
//! flight wait for that fetch instead of starting their own.
//!
//! Failures are not cached: the next request after an error goes upstream
//! again. Only the latest snapshot per station is held, in memory.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::debug;

use crate::domain::{DepartureRecord, Diva};
use crate::monitor::{DepartureSource, NetworkError};

/// Minimum interval between upstream requests for one station.
pub const MIN_REQUEST_INTERVAL: Duration = Duration::from_secs(15);

/// Cached departure list.
type Entry = Arc<Vec<DepartureRecord>>;

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long a fetched list is served before the upstream is asked again.
    pub ttl: Duration,

    /// Maximum number of stations held.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: MIN_REQUEST_INTERVAL,
            max_capacity: 64,
        }
    }
}

/// A departure source with a per-station freshness floor.
pub struct CachedSource<S> {
    source: S,
    cache: MokaCache<Diva, Entry>,
}

impl<S: DepartureSource> CachedSource<S> {
    /// Wrap a source.
    pub fn new(source: S, config: &CacheConfig) -> Self {
        let cache = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { source, cache }
    }

    /// Get departures, using the cached list if it is fresh enough.
    ///
    /// Concurrent calls for one station share a single upstream fetch and
    /// all receive its result, error included.
    pub async fn get_departures(&self, diva: Diva) -> Result<Entry, NetworkError> {
        self.cache
            .try_get_with(diva, async {
                debug!(%diva, "departure cache miss");
                self.source.fetch_departures(diva).await.map(Arc::new)
            })
            .await
            .map_err(Arc::unwrap_or_clone)
    }

    /// Access the underlying source for operations that bypass the cache.
    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: DepartureSource> DepartureSource for CachedSource<S> {
    async fn fetch_departures(&self, diva: Diva) -> Result<Vec<DepartureRecord>, NetworkError> {
        let entry = self.get_departures(diva).await?;
        Ok(entry.as_ref().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Source that counts calls and replays scripted results.
    struct ScriptedSource {
        calls: AtomicUsize,
        fail: Mutex<bool>,
        delay: Duration,
    }

    impl ScriptedSource {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: Mutex::new(false),
                delay: Duration::ZERO,
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }
    }

    impl DepartureSource for ScriptedSource {
        async fn fetch_departures(
            &self,
            diva: Diva,
        ) -> Result<Vec<DepartureRecord>, NetworkError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            if *self.fail.lock().unwrap() {
                return Err(NetworkError::Status {
                    status: 503,
                    message: String::new(),
                });
            }
            Ok(vec![DepartureRecord {
                id: format!("{diva}-{n}"),
                line_name: "U3".to_string(),
                line_type: "ptMetro".to_string(),
                destination: "Ottakring".to_string(),
                countdown: n as i32,
                next_countdown: None,
            }])
        }
    }

    #[test]
    fn default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(15));
        assert_eq!(config.max_capacity, 64);
    }

    #[tokio::test]
    async fn second_request_within_ttl_is_served_from_cache() {
        let cached = CachedSource::new(ScriptedSource::new(), &CacheConfig::default());

        let first = cached.fetch_departures(Diva::new(1)).await.unwrap();
        let second = cached.fetch_departures(Diva::new(1)).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(cached.source().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stations_are_cached_separately() {
        let cached = CachedSource::new(ScriptedSource::new(), &CacheConfig::default());

        cached.fetch_departures(Diva::new(1)).await.unwrap();
        cached.fetch_departures(Diva::new(2)).await.unwrap();

        assert_eq!(cached.source().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let cached = CachedSource::new(ScriptedSource::new(), &CacheConfig::default());
        *cached.source().fail.lock().unwrap() = true;

        assert!(cached.fetch_departures(Diva::new(1)).await.is_err());

        *cached.source().fail.lock().unwrap() = false;
        assert!(cached.fetch_departures(Diva::new(1)).await.is_ok());
        assert_eq!(cached.source().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn concurrent_requests_share_one_fetch() {
        let source = ScriptedSource::new().with_delay(Duration::from_millis(200));
        let cached = CachedSource::new(source, &CacheConfig::default());

        let (a, b, c) = tokio::join!(
            cached.fetch_departures(Diva::new(1)),
            cached.fetch_departures(Diva::new(1)),
            cached.fetch_departures(Diva::new(1)),
        );

        assert_eq!(cached.source().calls.load(Ordering::SeqCst), 1);
        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(c.unwrap()[0].countdown, 0);
    }

    #[tokio::test]
    async fn concurrent_requests_share_one_failure() {
        let source = ScriptedSource::new().with_delay(Duration::from_millis(200));
        *source.fail.lock().unwrap() = true;
        let cached = CachedSource::new(source, &CacheConfig::default());

        let (a, b) = tokio::join!(
            cached.fetch_departures(Diva::new(1)),
            cached.fetch_departures(Diva::new(1)),
        );

        assert_eq!(a.unwrap_err().status(), Some(503));
        assert_eq!(b.unwrap_err().status(), Some(503));
        assert_eq!(cached.source().calls.load(Ordering::SeqCst), 1);
    }
}
