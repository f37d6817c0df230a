//! Cache behavior: TTL, eviction, isolation, maintenance, stats.

use std::time::Duration;

use chrono::Utc;
use folio::{CacheConfig, ChapterCache};
use folio_backend::Backend;
use folio_core::{ChapterKey, ChapterRecord, KeyScope};
use folio_memory::MemoryBackend;
use folio_test::{description, image, inject_raw, inject_record, record_with_times};

fn cache_with_ceiling(backend: MemoryBackend, ceiling: usize) -> ChapterCache<MemoryBackend> {
    ChapterCache::with_config(
        backend,
        CacheConfig::new().with_max_records_per_book(ceiling),
    )
}

#[tokio::test]
async fn end_to_end_scenario() {
    let cache = ChapterCache::new(MemoryBackend::new());

    let stored = cache
        .set(
            "u1",
            "b1",
            1,
            vec![
                description("d1", "the captain on the quarterdeck"),
                description("d2", "whales breaching at dawn"),
            ],
            vec![image("i1", "d2")],
        )
        .await;
    assert!(stored);

    assert!(cache.has("u1", "b1", 1).await);

    let payload = cache.get("u1", "b1", 1).await.expect("cached chapter");
    assert_eq!(payload.descriptions.len(), 2);
    assert!(payload.descriptions[0].image.is_none());
    assert_eq!(payload.descriptions[1].image.as_ref().unwrap().id, "i1");

    assert_eq!(cache.clear_book("u1", "b1").await, 1);
    assert!(!cache.has("u1", "b1", 1).await);
}

#[tokio::test]
async fn get_deletes_expired_record_before_reporting_miss() {
    let backend = MemoryBackend::new();
    let cache = ChapterCache::new(backend.clone());
    let key = ChapterKey::new("u1", "b1", 1);

    let stale = Utc::now() - chrono::Duration::days(8);
    inject_record(&backend, &key, &record_with_times(&key, stale, stale)).await;

    assert!(cache.get("u1", "b1", 1).await.is_none());
    // The stale record is physically gone, not just hidden.
    assert!(backend.read(&key).await.unwrap().is_none());
}

#[tokio::test]
async fn has_reports_expiry_synchronously_and_deletes_in_background() {
    let backend = MemoryBackend::new();
    let cache = ChapterCache::new(backend.clone());
    let key = ChapterKey::new("u1", "b1", 1);

    let stale = Utc::now() - chrono::Duration::days(8);
    inject_record(&backend, &key, &record_with_times(&key, stale, stale)).await;

    assert!(!cache.has("u1", "b1", 1).await);

    // Deletion happens on a detached task; poll briefly for it.
    for _ in 0..100 {
        if backend.read(&key).await.unwrap().is_none() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("expired record was never deleted in the background");
}

#[tokio::test]
async fn record_at_exact_ttl_age_is_absent() {
    let backend = MemoryBackend::new();
    let cache = ChapterCache::new(backend.clone());
    let key = ChapterKey::new("u1", "b1", 1);

    let boundary = Utc::now() - chrono::Duration::days(7);
    inject_record(&backend, &key, &record_with_times(&key, boundary, boundary)).await;

    assert!(cache.get("u1", "b1", 1).await.is_none());
}

#[tokio::test]
async fn fresh_record_stays_present_until_ttl() {
    let backend = MemoryBackend::new();
    let cache = ChapterCache::new(backend.clone());
    let key = ChapterKey::new("u1", "b1", 1);

    let recent = Utc::now() - chrono::Duration::days(6);
    inject_record(&backend, &key, &record_with_times(&key, recent, recent)).await;

    assert!(cache.has("u1", "b1", 1).await);
    assert!(cache.get("u1", "b1", 1).await.is_some());
}

#[tokio::test]
async fn ceiling_evicts_oldest_insertions_first() {
    let backend = MemoryBackend::new();
    let cache = cache_with_ceiling(backend.clone(), 5);

    // No intervening reads, so insertion order is recency order.
    for chapter in 1..=8u32 {
        assert!(
            cache
                .set("u1", "b1", chapter, vec![description("d", "words")], vec![])
                .await
        );
        tokio::time::sleep(Duration::from_millis(3)).await;
    }

    let remaining = backend.scan(&KeyScope::book("u1", "b1")).await.unwrap();
    let mut chapters: Vec<u32> = remaining.iter().map(|(key, _)| key.chapter()).collect();
    chapters.sort_unstable();
    assert_eq!(chapters, vec![4, 5, 6, 7, 8]);
}

#[tokio::test]
async fn eviction_picks_least_recently_accessed_victim() {
    let backend = MemoryBackend::new();
    let cache = cache_with_ceiling(backend.clone(), 3);
    let now = Utc::now();

    for (chapter, minutes_ago) in [(1u32, 30i64), (2, 20), (3, 10)] {
        let key = ChapterKey::new("u1", "b1", chapter);
        let at = now - chrono::Duration::minutes(minutes_ago);
        inject_record(&backend, &key, &record_with_times(&key, at, at)).await;
    }

    assert!(
        cache
            .set("u1", "b1", 4, vec![description("d", "new chapter")], vec![])
            .await
    );

    assert!(!cache.has("u1", "b1", 1).await);
    assert!(cache.has("u1", "b1", 2).await);
    assert!(cache.has("u1", "b1", 3).await);
    assert!(cache.has("u1", "b1", 4).await);
}

#[tokio::test]
async fn read_bumps_recency_past_newer_records() {
    let cache = cache_with_ceiling(MemoryBackend::new(), 2);

    cache.set("u1", "b1", 1, vec![description("d", "a")], vec![]).await;
    tokio::time::sleep(Duration::from_millis(3)).await;
    cache.set("u1", "b1", 2, vec![description("d", "b")], vec![]).await;
    tokio::time::sleep(Duration::from_millis(3)).await;

    // Chapter 1 is older by insertion; reading it makes chapter 2 the
    // least recently accessed.
    assert!(cache.get("u1", "b1", 1).await.is_some());
    tokio::time::sleep(Duration::from_millis(3)).await;

    cache.set("u1", "b1", 3, vec![description("d", "c")], vec![]).await;

    assert!(cache.has("u1", "b1", 1).await);
    assert!(!cache.has("u1", "b1", 2).await);
    assert!(cache.has("u1", "b1", 3).await);
}

#[tokio::test]
async fn users_are_isolated() {
    let cache = ChapterCache::new(MemoryBackend::new());

    cache.set("u1", "b1", 1, vec![description("d", "u1 copy")], vec![]).await;
    cache.set("u2", "b1", 1, vec![description("d", "u2 copy")], vec![]).await;

    assert_eq!(cache.clear_all("u1").await, 1);
    assert!(!cache.has("u1", "b1", 1).await);
    assert!(cache.has("u2", "b1", 1).await);
}

#[tokio::test]
async fn clear_book_leaves_other_books_alone() {
    let cache = ChapterCache::new(MemoryBackend::new());

    for chapter in 1..=3u32 {
        cache.set("u1", "b1", chapter, vec![description("d", "x")], vec![]).await;
    }
    cache.set("u1", "b2", 1, vec![description("d", "x")], vec![]).await;

    assert_eq!(cache.clear_book("u1", "b1").await, 3);
    assert!(cache.has("u1", "b2", 1).await);
}

#[tokio::test]
async fn maintenance_sweeps_in_order() {
    let backend = MemoryBackend::new();
    let cache = ChapterCache::new(backend.clone());
    let now = Utc::now();

    // Pre-isolation record: decodes, but with no owning user.
    let legacy_key = ChapterKey::new("u0", "b0", 1);
    let mut legacy = record_with_times(&legacy_key, now, now);
    legacy.user_id = "".into();
    inject_record(&backend, &legacy_key, &legacy).await;

    // Record a previous schema left undecodable.
    inject_raw(&backend, &ChapterKey::new("u0", "b0", 2), b"not a record").await;

    // Unread for longer than the TTL.
    let expired_key = ChapterKey::new("u1", "b1", 1);
    let stale = now - chrono::Duration::days(9);
    inject_record(&backend, &expired_key, &record_with_times(&expired_key, stale, stale)).await;

    // Placeholder row without content.
    let empty_key = ChapterKey::new("u1", "b1", 2);
    inject_record(&backend, &empty_key, &ChapterRecord::new(&empty_key, vec![], now)).await;

    // A healthy record that must survive.
    let live_key = ChapterKey::new("u1", "b1", 3);
    inject_record(&backend, &live_key, &record_with_times(&live_key, now, now)).await;

    let report = cache.perform_maintenance().await;

    assert_eq!(report.legacy_removed, 2);
    assert_eq!(report.expired_removed, 1);
    assert_eq!(report.empty_removed, 1);
    assert_eq!(report.total(), 4);
    assert_eq!(backend.len().await, 1);
    assert!(cache.has("u1", "b1", 3).await);
}

#[tokio::test]
async fn clear_expired_uses_last_access_not_write_time() {
    let backend = MemoryBackend::new();
    let cache = ChapterCache::new(backend.clone());
    let now = Utc::now();

    // Written long ago but read recently: the sweep keeps it.
    let read_recently = ChapterKey::new("u1", "b1", 1);
    inject_record(
        &backend,
        &read_recently,
        &record_with_times(&read_recently, now - chrono::Duration::days(30), now),
    )
    .await;

    // Never read since it went stale: the sweep reclaims it.
    let abandoned = ChapterKey::new("u1", "b1", 2);
    let stale = now - chrono::Duration::days(8);
    inject_record(&backend, &abandoned, &record_with_times(&abandoned, stale, stale)).await;

    assert_eq!(cache.clear_expired().await, 1);
    assert!(backend.read(&read_recently).await.unwrap().is_some());
    assert!(backend.read(&abandoned).await.unwrap().is_none());
}

#[tokio::test]
async fn stats_report_physical_state() {
    let backend = MemoryBackend::new();
    let cache = ChapterCache::new(backend.clone());
    let now = Utc::now();
    let oldest = now - chrono::Duration::days(3);

    let k1 = ChapterKey::new("u1", "b1", 1);
    inject_record(&backend, &k1, &record_with_times(&k1, oldest, oldest)).await;
    let k2 = ChapterKey::new("u2", "b1", 1);
    inject_record(&backend, &k2, &record_with_times(&k2, now, now)).await;
    let k3 = ChapterKey::new("u1", "b2", 1);
    inject_record(&backend, &k3, &record_with_times(&k3, now, now)).await;
    // Undecodable data still counts toward the physical total.
    inject_raw(&backend, &ChapterKey::new("u1", "b3", 1), b"???").await;

    let stats = cache.stats().await;

    assert_eq!(stats.total_records, 4);
    assert_eq!(stats.records_by_book.get("b1").copied(), Some(2));
    assert_eq!(stats.records_by_book.get("b2").copied(), Some(1));
    assert!(!stats.records_by_book.contains_key("b3"));
    assert_eq!(stats.oldest_cached_at, Some(oldest));
    assert_eq!(stats.newest_cached_at, Some(now));
}

#[tokio::test]
async fn stats_on_empty_store() {
    let cache = ChapterCache::new(MemoryBackend::new());
    let stats = cache.stats().await;
    assert_eq!(stats.total_records, 0);
    assert!(stats.records_by_book.is_empty());
    assert!(stats.oldest_cached_at.is_none());
    assert!(stats.newest_cached_at.is_none());
}
