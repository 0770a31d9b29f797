//! Search document structure and the content → document mapper

use crate::models::{AccessType, Content, ContentStatus, ContentType};
use crate::search::analysis::normalize;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Languages with explicit field mappings; others go through dynamic templates
pub const PRIMARY_LANGUAGE: &str = "fa";
pub const SECONDARY_LANGUAGE: &str = "en";

/// Weight given to featured titles in the completion suggester
const FEATURED_SUGGEST_WEIGHT: i32 = 10;

/// Flattened field name for a localized title
pub fn localized_title_field(lang: &str) -> String {
    format!("localizedTitle_{}", lang)
}

/// Flattened field name for a localized description
pub fn localized_description_field(lang: &str) -> String {
    format!("localizedDescription_{}", lang)
}

/// Denormalized document stored in the search index, one per content item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchDocument {
    pub id: String,

    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,

    /// `localizedTitle_<lang>` / `localizedDescription_<lang>` columns
    #[serde(flatten)]
    pub localized: BTreeMap<String, String>,

    #[serde(rename = "type")]
    pub content_type: ContentType,

    pub status: ContentStatus,

    pub access_type: AccessType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,

    pub featured: bool,
    pub is_dubbed: bool,
    pub is_kids: bool,
    pub is_coming_soon: bool,

    pub genres: Vec<String>,
    pub tags: Vec<String>,
    pub seo_keywords: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,

    pub cast_names: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub backdrop_url: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    pub suggest: SuggestField,
}

/// Completion-suggester payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestField {
    pub input: Vec<String>,
    pub weight: i32,
    pub contexts: SuggestContexts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestContexts {
    #[serde(rename = "type")]
    pub content_type: Vec<String>,
}

impl From<&Content> for SearchDocument {
    fn from(content: &Content) -> Self {
        to_document(content)
    }
}

/// Map a primary content record to its search document.
///
/// Pure and deterministic: the same record always yields an equal document.
pub fn to_document(content: &Content) -> SearchDocument {
    SearchDocument {
        id: content.id.clone(),
        title: content.title.trim().to_string(),
        original_title: non_blank(content.original_title.as_deref()),
        description: non_blank(content.description.as_deref()),
        short_description: non_blank(content.short_description.as_deref()),
        tagline: non_blank(content.tagline.as_deref()),
        localized: flatten_localized(content),
        content_type: content.content_type,
        status: content.status,
        access_type: content.access_type,
        year: content.year,
        rating: content.rating,
        duration: content.duration,
        priority: content.priority,
        featured: content.featured,
        is_dubbed: content.is_dubbed,
        is_kids: content.is_kids,
        is_coming_soon: content.is_coming_soon,
        genres: non_blank_list(&content.genres),
        tags: non_blank_list(&content.tags),
        seo_keywords: non_blank_list(&content.seo_keywords),
        director: non_blank(content.director.as_deref()),
        cast_names: content
            .cast
            .iter()
            .filter_map(|member| non_blank(Some(member.name.as_str())))
            .collect(),
        country: non_blank(content.country.as_deref()),
        poster_url: non_blank(content.poster_url.as_deref()),
        thumbnail_url: non_blank(content.thumbnail_url.as_deref()),
        backdrop_url: non_blank(content.backdrop_url.as_deref()),
        created_at: content.created_at,
        updated_at: content.updated_at,
        suggest: SuggestField {
            input: suggest_inputs(content),
            weight: suggest_weight(content),
            contexts: SuggestContexts {
                content_type: vec![content.content_type.to_string()],
            },
        },
    }
}

/// Read-side projection of an indexed document's `_source`.
///
/// Every field is optional so partial `_source` filters deserialize cleanly.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IndexedContent {
    pub title: String,
    pub original_title: Option<String>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    #[serde(rename = "type")]
    pub content_type: Option<ContentType>,
    pub status: Option<ContentStatus>,
    pub access_type: Option<AccessType>,
    pub year: Option<i32>,
    pub rating: Option<f32>,
    pub duration: Option<u32>,
    pub featured: bool,
    pub is_dubbed: bool,
    pub is_kids: bool,
    pub is_coming_soon: bool,
    pub genres: Vec<String>,
    pub poster_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub backdrop_url: Option<String>,
}

impl IndexedContent {
    pub fn is_published(&self) -> bool {
        self.status == Some(ContentStatus::Published)
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn non_blank_list(values: &[String]) -> Vec<String> {
    values
        .iter()
        .filter_map(|v| non_blank(Some(v.as_str())))
        .collect()
}

/// Language codes become part of field names, so only accept plain ones
fn is_valid_language_code(lang: &str) -> bool {
    !lang.is_empty()
        && lang.len() <= 8
        && lang.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn flatten_localized(content: &Content) -> BTreeMap<String, String> {
    let mut fields = BTreeMap::new();

    let Some(ref localized) = content.localized_content else {
        return fields;
    };

    for (lang, values) in localized {
        let lang = lang.trim().to_ascii_lowercase();
        if !is_valid_language_code(&lang) {
            tracing::debug!(content_id = %content.id, lang = %lang, "Skipping unsupported language code");
            continue;
        }
        if let Some(title) = non_blank(values.title.as_deref()) {
            fields.insert(localized_title_field(&lang), title);
        }
        if let Some(description) = non_blank(values.description.as_deref()) {
            fields.insert(localized_description_field(&lang), description);
        }
    }

    fields
}

/// Every known title variant, first spelling wins among normalized duplicates
fn suggest_inputs(content: &Content) -> Vec<String> {
    let localized_titles = content
        .localized_content
        .iter()
        .flat_map(|map| map.values())
        .map(|l| l.title.as_deref());

    let candidates = [Some(content.title.as_str()), content.original_title.as_deref()]
        .into_iter()
        .chain(localized_titles);

    let mut seen = HashSet::new();
    candidates
        .filter_map(non_blank)
        .filter(|title| seen.insert(normalize(title)))
        .collect()
}

fn suggest_weight(content: &Content) -> i32 {
    if content.featured {
        FEATURED_SUGGEST_WEIGHT
    } else {
        content.priority.unwrap_or(1).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CastMember, LocalizedContent};

    fn sample() -> Content {
        let mut content = Content::new("m1", "Desert Sonata", ContentType::Movie);
        content.status = ContentStatus::Published;
        content.original_title = Some("Sonata del Deserto".to_string());
        content.rating = Some(8.5);
        content.genres = vec!["Drama".to_string(), "  ".to_string()];
        content.cast = vec![
            CastMember::new("Leila Hatami"),
            CastMember {
                name: "Payman Maadi".to_string(),
                role: Some("actor".to_string()),
                character: Some("Nader".to_string()),
            },
            CastMember::new(" "),
        ];
        content.localized_content = Some(BTreeMap::from([
            (
                "fa".to_string(),
                LocalizedContent {
                    title: Some("سونات صحرا".to_string()),
                    description: Some("داستانی در کویر".to_string()),
                },
            ),
            (
                "en".to_string(),
                LocalizedContent {
                    title: Some("Desert Sonata".to_string()),
                    description: None,
                },
            ),
        ]));
        content
    }

    #[test]
    fn test_mapping_is_deterministic() {
        let content = sample();
        let first = serde_json::to_vec(&to_document(&content)).unwrap();
        let second = serde_json::to_vec(&to_document(&content)).unwrap();
        assert_eq!(first, second);
        assert_eq!(to_document(&content), SearchDocument::from(&content));
    }

    #[test]
    fn test_cast_flattened_to_names() {
        let doc = to_document(&sample());
        assert_eq!(doc.cast_names, vec!["Leila Hatami", "Payman Maadi"]);
        assert_eq!(doc.genres, vec!["Drama"]);
    }

    #[test]
    fn test_localized_fields_only_for_present_languages() {
        let doc = to_document(&sample());
        assert_eq!(doc.localized.get("localizedTitle_fa").unwrap(), "سونات صحرا");
        assert_eq!(doc.localized.get("localizedDescription_fa").unwrap(), "داستانی در کویر");
        assert_eq!(doc.localized.get("localizedTitle_en").unwrap(), "Desert Sonata");
        assert!(!doc.localized.contains_key("localizedDescription_en"));
        assert_eq!(doc.localized.len(), 3);

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["localizedTitle_fa"], "سونات صحرا");
        assert_eq!(json["type"], "movie");
        assert_eq!(json["castNames"][1], "Payman Maadi");
    }

    #[test]
    fn test_null_localized_content() {
        let mut content = sample();
        content.localized_content = None;
        let doc = to_document(&content);
        assert!(doc.localized.is_empty());
        assert_eq!(doc.suggest.input, vec!["Desert Sonata", "Sonata del Deserto"]);
    }

    #[test]
    fn test_invalid_language_codes_skipped() {
        let mut content = sample();
        content.localized_content = Some(BTreeMap::from([(
            "fa\"x".to_string(),
            LocalizedContent {
                title: Some("x".to_string()),
                description: None,
            },
        )]));
        assert!(to_document(&content).localized.is_empty());
    }

    #[test]
    fn test_suggest_inputs_deduplicated() {
        let doc = to_document(&sample());
        // en title duplicates the primary title
        assert_eq!(
            doc.suggest.input,
            vec!["Desert Sonata", "Sonata del Deserto", "سونات صحرا"]
        );
        assert_eq!(doc.suggest.contexts.content_type, vec!["movie"]);
    }

    #[test]
    fn test_suggest_dedup_is_case_insensitive() {
        let mut content = Content::new("m2", "Desert Sonata", ContentType::Series);
        content.original_title = Some("DESERT SONATA".to_string());
        let doc = to_document(&content);
        assert_eq!(doc.suggest.input, vec!["Desert Sonata"]);
        assert_eq!(doc.suggest.contexts.content_type, vec!["series"]);
    }

    #[test]
    fn test_suggest_weight() {
        let mut content = sample();
        assert_eq!(to_document(&content).suggest.weight, 1);

        content.priority = Some(0);
        assert_eq!(to_document(&content).suggest.weight, 1);

        content.priority = Some(7);
        assert_eq!(to_document(&content).suggest.weight, 7);

        content.featured = true;
        assert_eq!(to_document(&content).suggest.weight, 10);
    }

    #[test]
    fn test_minimal_content_omits_missing_fields() {
        let content = Content::new("m3", "Bare", ContentType::Movie);
        let json = serde_json::to_value(to_document(&content)).unwrap();

        assert!(json.get("originalTitle").is_none());
        assert!(json.get("rating").is_none());
        assert_eq!(json["genres"], serde_json::json!([]));
        assert_eq!(json["castNames"], serde_json::json!([]));
        assert_eq!(json["status"], "draft");
        assert_eq!(json["suggest"]["input"], serde_json::json!(["Bare"]));
    }
}
