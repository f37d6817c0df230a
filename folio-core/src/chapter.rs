//! Chapter content types and the stored record shape.
//!
//! A cached chapter is an ordered list of [`Description`]s — the passages an
//! illustration model extracted from the chapter text — each optionally
//! carrying the [`GeneratedImage`] rendered for it. The stored entity is
//! [`ChapterRecord`]; readers get the lighter [`ChapterPayload`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::key::ChapterKey;

/// Category of an extracted description.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DescriptionCategory {
    /// A character portrait or introduction.
    Character,
    /// A scene or location.
    Scene,
    /// A notable object.
    Object,
    /// Mood or atmosphere of a passage.
    Atmosphere,
    /// Anything the extractor could not classify further.
    Other,
}

/// Readiness of a generated illustration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageStatus {
    /// Queued, generation not started.
    Pending,
    /// Generation in progress.
    Generating,
    /// Image is available at its URL.
    Ready,
    /// Generation failed; the URL may be empty.
    Failed,
}

/// Reference to an illustration generated for one description.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneratedImage {
    /// Image identifier.
    pub id: SmolStr,
    /// Identifier of the description this image was generated for.
    pub description_id: SmolStr,
    /// Where the rendered image can be fetched from.
    pub url: String,
    /// Readiness state.
    pub status: ImageStatus,
}

/// One extracted description, optionally with its generated image embedded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Description {
    /// Description identifier.
    pub id: SmolStr,
    /// Extracted category.
    pub category: DescriptionCategory,
    /// The passage text the description was extracted from.
    pub content: String,
    /// Extractor confidence, clamped to `[0, 1]`.
    pub confidence: f32,
    /// The illustration generated for this description, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<GeneratedImage>,
}

impl Description {
    /// Creates a description with no embedded image.
    ///
    /// Confidence is clamped into `[0, 1]` rather than trusting the fetch
    /// layer.
    pub fn new(
        id: impl Into<SmolStr>,
        category: DescriptionCategory,
        content: impl Into<String>,
        confidence: f32,
    ) -> Self {
        Description {
            id: id.into(),
            category,
            content: content.into(),
            confidence: confidence.clamp(0.0, 1.0),
            image: None,
        }
    }
}

/// Merges generated images into their descriptions by identity match.
///
/// An image attaches to the first description whose id equals the image's
/// `description_id`. A description that already carries an embedded image
/// keeps it. Images matching no description are dropped.
pub fn merge_images(
    descriptions: Vec<Description>,
    images: Vec<GeneratedImage>,
) -> Vec<Description> {
    descriptions
        .into_iter()
        .map(|mut description| {
            if description.image.is_none() {
                description.image = images
                    .iter()
                    .find(|image| image.description_id == description.id)
                    .cloned();
            }
            description
        })
        .collect()
}

/// The stored form of one cached chapter.
///
/// `user_id` is serde-defaulted: records written before per-user isolation
/// existed deserialize with an empty id, which marks them for the legacy
/// maintenance sweep.
///
/// Invariant: `cached_at <= last_accessed_at`, maintained by [`new`] and
/// [`touch`].
///
/// [`new`]: ChapterRecord::new
/// [`touch`]: ChapterRecord::touch
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChapterRecord {
    /// Owning user, empty on pre-isolation records.
    #[serde(default)]
    pub user_id: SmolStr,
    /// Book identifier.
    pub book_id: SmolStr,
    /// Chapter number.
    pub chapter: u32,
    /// Extracted descriptions with embedded images.
    pub descriptions: Vec<Description>,
    /// Total words across the description contents.
    pub word_count: u32,
    /// When the content was fetched and stored.
    pub cached_at: DateTime<Utc>,
    /// When the record was last stored or read.
    pub last_accessed_at: DateTime<Utc>,
}

impl ChapterRecord {
    /// Creates a fresh record with `cached_at = last_accessed_at = now`.
    ///
    /// The word count is derived from the description contents so the
    /// stored aggregate is always consistent with the stored descriptions.
    pub fn new(key: &ChapterKey, descriptions: Vec<Description>, now: DateTime<Utc>) -> Self {
        let word_count = descriptions
            .iter()
            .map(|d| d.content.split_whitespace().count())
            .sum::<usize>() as u32;
        ChapterRecord {
            user_id: key.user().into(),
            book_id: key.book().into(),
            chapter: key.chapter(),
            descriptions,
            word_count,
            cached_at: now,
            last_accessed_at: now,
        }
    }

    /// Bumps `last_accessed_at` to `now`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_accessed_at = now;
    }

    /// True for records written before per-user isolation existed.
    pub fn is_legacy(&self) -> bool {
        self.user_id.is_empty()
    }

    /// Converts the record into the caller-facing payload.
    pub fn into_payload(self) -> ChapterPayload {
        ChapterPayload {
            descriptions: self.descriptions,
            word_count: self.word_count,
            cached_at: self.cached_at,
        }
    }
}

/// What a cache read hands back to the reader.
#[derive(Clone, Debug, PartialEq)]
pub struct ChapterPayload {
    /// Descriptions with their generated images merged in.
    pub descriptions: Vec<Description>,
    /// Total words across the description contents.
    pub word_count: u32,
    /// When this content was originally fetched.
    pub cached_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(id: &str, description_id: &str) -> GeneratedImage {
        GeneratedImage {
            id: id.into(),
            description_id: description_id.into(),
            url: format!("https://img.example/{id}.png"),
            status: ImageStatus::Ready,
        }
    }

    #[test]
    fn merge_attaches_by_description_id() {
        let descriptions = vec![
            Description::new("d1", DescriptionCategory::Character, "the captain", 0.9),
            Description::new("d2", DescriptionCategory::Scene, "the deck at dawn", 0.7),
        ];
        let merged = merge_images(descriptions, vec![image("i1", "d2")]);

        assert!(merged[0].image.is_none());
        assert_eq!(merged[1].image.as_ref().unwrap().id, "i1");
    }

    #[test]
    fn merge_keeps_existing_embedded_image() {
        let mut description =
            Description::new("d1", DescriptionCategory::Object, "a brass compass", 0.8);
        description.image = Some(image("original", "d1"));

        let merged = merge_images(vec![description], vec![image("replacement", "d1")]);
        assert_eq!(merged[0].image.as_ref().unwrap().id, "original");
    }

    #[test]
    fn merge_drops_unmatched_images() {
        let descriptions = vec![Description::new(
            "d1",
            DescriptionCategory::Atmosphere,
            "fog over the harbor",
            0.6,
        )];
        let merged = merge_images(descriptions, vec![image("i1", "no-such-description")]);
        assert!(merged[0].image.is_none());
    }

    #[test]
    fn confidence_is_clamped() {
        assert_eq!(
            Description::new("d", DescriptionCategory::Other, "", 1.7).confidence,
            1.0
        );
        assert_eq!(
            Description::new("d", DescriptionCategory::Other, "", -0.2).confidence,
            0.0
        );
    }

    #[test]
    fn word_count_derived_from_contents() {
        let key = ChapterKey::new("u1", "b1", 1);
        let record = ChapterRecord::new(
            &key,
            vec![
                Description::new("d1", DescriptionCategory::Scene, "one two three", 0.5),
                Description::new("d2", DescriptionCategory::Scene, "  four   five ", 0.5),
            ],
            Utc::now(),
        );
        assert_eq!(record.word_count, 5);
    }

    #[test]
    fn new_record_upholds_timestamp_invariant() {
        let key = ChapterKey::new("u1", "b1", 1);
        let now = Utc::now();
        let mut record = ChapterRecord::new(&key, vec![], now);
        assert_eq!(record.cached_at, record.last_accessed_at);

        let later = now + chrono::Duration::minutes(5);
        record.touch(later);
        assert!(record.cached_at <= record.last_accessed_at);
        assert_eq!(record.last_accessed_at, later);
    }

    #[test]
    fn missing_user_id_deserializes_as_legacy() {
        let json = serde_json::json!({
            "book_id": "b1",
            "chapter": 1,
            "descriptions": [],
            "word_count": 0,
            "cached_at": Utc::now(),
            "last_accessed_at": Utc::now(),
        });
        let record: ChapterRecord = serde_json::from_value(json).unwrap();
        assert!(record.is_legacy());
    }
}
