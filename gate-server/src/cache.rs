//! Caching layer for junction boards.
//!
//! Several batches arriving close together usually ask about the same few
//! junctions. We cache each junction's converted board so the collector is
//! only driven once per junction per time bucket.
//!
//! Time bucketing (5-minute buckets) bounds cache cardinality while ensuring
//! reasonable freshness. Failed fetches are never cached.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use moka::future::Cache as MokaCache;

use crate::domain::{StationCode, TrainObservation};

/// Cache key for junction boards: (station, date, time bucket).
/// Time bucket is minutes from midnight divided by the bucket size.
type BoardKey = (StationCode, NaiveDate, u16);

/// Cached junction board.
pub type BoardEntry = Arc<Vec<TrainObservation>>;

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,

    /// Time bucket size in minutes.
    pub bucket_mins: u16,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            max_capacity: 1000,
            bucket_mins: 5,
        }
    }
}

/// Cache of junction boards.
pub struct BoardCache {
    boards: MokaCache<BoardKey, BoardEntry>,
    bucket_mins: u16,
}

impl BoardCache {
    pub fn new(config: &CacheConfig) -> Self {
        let boards = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self {
            boards,
            bucket_mins: config.bucket_mins.max(1),
        }
    }

    /// Minutes from midnight divided by bucket size.
    fn time_bucket(&self, now: NaiveDateTime) -> u16 {
        let mins = (now.hour() * 60 + now.minute()) as u16;
        mins / self.bucket_mins
    }

    fn key(&self, station: StationCode, now: NaiveDateTime) -> BoardKey {
        (station, now.date(), self.time_bucket(now))
    }

    /// Board for `station` fetched in the same bucket as `now`.
    pub async fn get(&self, station: StationCode, now: NaiveDateTime) -> Option<BoardEntry> {
        self.boards.get(&self.key(station, now)).await
    }

    pub async fn insert(&self, station: StationCode, now: NaiveDateTime, entry: BoardEntry) {
        self.boards.insert(self.key(station, now), entry).await;
    }

}

impl std::fmt::Debug for BoardCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoardCache")
            .field("entries", &self.boards.entry_count())
            .field("bucket_mins", &self.bucket_mins)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn qln() -> StationCode {
        StationCode::parse("QLN").unwrap()
    }

    #[test]
    fn time_bucket_calculation() {
        let cache = BoardCache::new(&CacheConfig::default());

        // 10:00 = 600 mins, bucket size 5 → bucket 120
        assert_eq!(cache.time_bucket(at(10, 0)), 120);
        // 10:04 → still bucket 120
        assert_eq!(cache.time_bucket(at(10, 4)), 120);
        // 10:05 → bucket 121
        assert_eq!(cache.time_bucket(at(10, 5)), 121);
        // 23:59 = 1439 mins → bucket 287
        assert_eq!(cache.time_bucket(at(23, 59)), 287);
    }

    #[test]
    fn default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(60));
        assert_eq!(config.max_capacity, 1000);
        assert_eq!(config.bucket_mins, 5);
    }

    #[tokio::test]
    async fn hit_within_bucket_miss_across_buckets() {
        let cache = BoardCache::new(&CacheConfig::default());
        cache.insert(qln(), at(10, 1), Arc::new(Vec::new())).await;

        assert!(cache.get(qln(), at(10, 4)).await.is_some());
        assert!(cache.get(qln(), at(10, 5)).await.is_none());
        assert!(
            cache
                .get(StationCode::parse("KYJ").unwrap(), at(10, 1))
                .await
                .is_none()
        );
    }
}
