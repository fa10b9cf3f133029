use std::sync::Arc;
use std::time::Duration;

use stockwire::stats::MetricsCollector;
use stockwire::{CacheConfig, ExpiringCache, QuoteCache, QuoteResult};

fn cache(capacity: usize, ttl_secs: u64) -> ExpiringCache<String, u32> {
    ExpiringCache::new(capacity, Duration::from_secs(ttl_secs))
}

#[test]
fn size_never_exceeds_capacity() {
    let cache = cache(3, 60);
    for i in 0..10 {
        cache.set(format!("K{i}"), i);
        assert!(cache.len() <= 3);
    }
    assert_eq!(cache.len(), 3);
    assert_eq!(cache.get("K9"), Some(9));
    assert_eq!(cache.get("K8"), Some(8));
    assert_eq!(cache.get("K7"), Some(7));
    assert_eq!(cache.get("K6"), None);
}

#[test]
fn least_recently_inserted_goes_first() {
    let cache = cache(2, 60);
    cache.set("A".into(), 1);
    cache.set("B".into(), 2);
    cache.set("C".into(), 3);

    assert_eq!(cache.get("A"), None);
    assert_eq!(cache.get("B"), Some(2));
    assert_eq!(cache.get("C"), Some(3));
}

#[test]
fn get_promotes_recency() {
    let cache = cache(2, 60);
    cache.set("A".into(), 1);
    cache.set("B".into(), 2);

    // Touch A so B becomes the eviction candidate.
    assert_eq!(cache.get("A"), Some(1));
    cache.set("C".into(), 3);

    assert_eq!(cache.get("A"), Some(1));
    assert_eq!(cache.get("B"), None);
    assert_eq!(cache.get("C"), Some(3));
}

#[test]
fn overwrite_replaces_value_without_eviction() {
    let cache = cache(2, 60);
    cache.set("A".into(), 1);
    cache.set("B".into(), 2);
    cache.set("A".into(), 10);

    assert_eq!(cache.len(), 2);
    assert_eq!(cache.get("A"), Some(10));
    assert_eq!(cache.get("B"), Some(2));
}

#[test]
fn zero_capacity_is_clamped_to_one() {
    let cache = cache(0, 60);
    assert_eq!(cache.capacity(), 1);
    cache.set("A".into(), 1);
    cache.set("B".into(), 2);
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get("B"), Some(2));
}

#[tokio::test(start_paused = true)]
async fn entries_expire_after_ttl() {
    let cache = cache(10, 60);
    cache.set("A".into(), 1);

    tokio::time::advance(Duration::from_secs(59)).await;
    assert_eq!(cache.get("A"), Some(1));

    tokio::time::advance(Duration::from_secs(2)).await;
    assert_eq!(cache.get("A"), None);
    // The stale entry is dropped on access.
    assert_eq!(cache.len(), 0);
}

#[tokio::test(start_paused = true)]
async fn access_does_not_extend_lifetime() {
    let cache = cache(10, 60);
    cache.set("A".into(), 1);

    for _ in 0..5 {
        tokio::time::advance(Duration::from_secs(11)).await;
        assert_eq!(cache.get("A"), Some(1));
    }
    tokio::time::advance(Duration::from_secs(11)).await;
    assert_eq!(cache.get("A"), None);
}

#[tokio::test(start_paused = true)]
async fn overwrite_refreshes_timestamp() {
    let cache = cache(10, 60);
    cache.set("A".into(), 1);
    tokio::time::advance(Duration::from_secs(50)).await;
    cache.set("A".into(), 2);
    tokio::time::advance(Duration::from_secs(50)).await;

    assert_eq!(cache.get("A"), Some(2));
}

#[tokio::test(start_paused = true)]
async fn sweep_removes_only_expired_entries() {
    let cache = cache(10, 60);
    cache.set("old-1".into(), 1);
    cache.set("old-2".into(), 2);
    tokio::time::advance(Duration::from_secs(45)).await;
    cache.set("new".into(), 3);
    tokio::time::advance(Duration::from_secs(30)).await;

    assert_eq!(cache.sweep_expired(), 2);
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get("new"), Some(3));
    assert_eq!(cache.sweep_expired(), 0);
}

#[test]
fn hits_and_misses_are_reported() {
    let stats = Arc::new(MetricsCollector::new());
    let cache: QuoteCache =
        QuoteCache::from_config(&CacheConfig::new().capacity(4)).with_stats(stats.clone());

    assert!(cache.get("AAPL").is_none());
    cache.set(
        "AAPL".into(),
        ("Apple".into(), QuoteResult::error("Invalid ticker format")),
    );
    let (name, result) = cache.get("AAPL").unwrap();
    assert_eq!(name, "Apple");
    assert!(result.is_error());

    assert_eq!(stats.cache_hits(), 1);
    assert_eq!(stats.cache_misses(), 1);
    assert!((stats.hit_ratio() - 0.5).abs() < f64::EPSILON);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_access_keeps_capacity() {
    let cache = Arc::new(cache(16, 60));
    let tasks: Vec<_> = (0..8)
        .map(|t| {
            let cache = cache.clone();
            tokio::spawn(async move {
                for i in 0..200u32 {
                    let key = format!("K{}", (t * 31 + i) % 40);
                    cache.set(key.clone(), i);
                    let _ = cache.get(&key);
                    assert!(cache.len() <= 16);
                }
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }
    assert_eq!(cache.len(), 16);
}
