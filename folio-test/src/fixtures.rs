use chrono::{DateTime, Utc};
use folio_backend::Backend;
use folio_core::{
    ChapterKey, ChapterRecord, Description, DescriptionCategory, GeneratedImage, ImageStatus, Raw,
};

/// A scene description with fixed confidence.
pub fn description(id: &str, content: &str) -> Description {
    Description::new(id, DescriptionCategory::Scene, content, 0.8)
}

/// A ready illustration linked to `description_id`.
pub fn image(id: &str, description_id: &str) -> GeneratedImage {
    GeneratedImage {
        id: id.into(),
        description_id: description_id.into(),
        url: format!("https://img.example/{id}.png"),
        status: ImageStatus::Ready,
    }
}

/// A record with explicit timestamps, for backdating TTL and LRU state.
pub fn record_with_times(
    key: &ChapterKey,
    cached_at: DateTime<Utc>,
    last_accessed_at: DateTime<Utc>,
) -> ChapterRecord {
    let mut record = ChapterRecord::new(
        key,
        vec![description("d1", "a storm gathers over the bay")],
        cached_at,
    );
    record.touch(last_accessed_at);
    record
}

/// Serializes `record` straight into the backend, bypassing the cache.
pub async fn inject_record(backend: &impl Backend, key: &ChapterKey, record: &ChapterRecord) {
    let raw = Raw::from(serde_json::to_vec(record).expect("record serializes"));
    backend.write(key, raw).await.expect("backend write");
}

/// Writes arbitrary bytes under `key`, for undecodable-record scenarios.
pub async fn inject_raw(backend: &impl Backend, key: &ChapterKey, bytes: &[u8]) {
    backend
        .write(key, Raw::copy_from_slice(bytes))
        .await
        .expect("backend write");
}
