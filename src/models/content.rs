use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{Display, EnumString};
use validator::Validate;

/// A catalog item as stored in the primary content store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    /// Stable identifier shared with the search document
    #[validate(length(min = 1, max = 128))]
    pub id: String,

    /// Primary display title
    #[validate(length(min = 1, max = 500))]
    pub title: String,

    #[serde(default)]
    pub original_title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub short_description: Option<String>,

    #[serde(default)]
    pub tagline: Option<String>,

    #[serde(rename = "type")]
    pub content_type: ContentType,

    pub status: ContentStatus,

    #[serde(default)]
    pub access_type: AccessType,

    #[serde(default)]
    pub year: Option<i32>,

    /// Average rating on a 0-10 scale
    #[serde(default)]
    #[validate(range(min = 0.0, max = 10.0))]
    pub rating: Option<f32>,

    /// Runtime in seconds
    #[serde(default)]
    pub duration: Option<u32>,

    /// Editorial priority, higher ranks first
    #[serde(default)]
    pub priority: Option<i32>,

    #[serde(default)]
    pub featured: bool,

    #[serde(default)]
    pub is_dubbed: bool,

    #[serde(default)]
    pub is_kids: bool,

    #[serde(default)]
    pub is_coming_soon: bool,

    #[serde(default)]
    pub genres: Vec<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub seo_keywords: Vec<String>,

    #[serde(default)]
    pub director: Option<String>,

    #[serde(default)]
    pub cast: Vec<CastMember>,

    #[serde(default)]
    pub country: Option<String>,

    #[serde(default)]
    pub poster_url: Option<String>,

    #[serde(default)]
    pub thumbnail_url: Option<String>,

    #[serde(default)]
    pub backdrop_url: Option<String>,

    /// Per-language overrides keyed by language code (`fa`, `en`, ...)
    #[serde(default)]
    pub localized_content: Option<BTreeMap<String, LocalizedContent>>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Content {
    /// Create a draft content record with only the required fields set
    pub fn new(id: impl Into<String>, title: impl Into<String>, content_type: ContentType) -> Self {
        let now = Utc::now();

        Self {
            id: id.into(),
            title: title.into(),
            original_title: None,
            description: None,
            short_description: None,
            tagline: None,
            content_type,
            status: ContentStatus::Draft,
            access_type: AccessType::default(),
            year: None,
            rating: None,
            duration: None,
            priority: None,
            featured: false,
            is_dubbed: false,
            is_kids: false,
            is_coming_soon: false,
            genres: Vec::new(),
            tags: Vec::new(),
            seo_keywords: Vec::new(),
            director: None,
            cast: Vec::new(),
            country: None,
            poster_url: None,
            thumbnail_url: None,
            backdrop_url: None,
            localized_content: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this record may appear in public search results
    pub fn is_published(&self) -> bool {
        self.status == ContentStatus::Published
    }

    /// Check that the record can be turned into a search document
    pub fn validate_for_index(&self) -> Result<()> {
        self.validate()?;

        if self.title.trim().is_empty() {
            return Err(AppError::Validation("title is blank".to_string()));
        }
        if let Some(rating) = self.rating {
            if !rating.is_finite() {
                return Err(AppError::Validation(format!("rating {} is not finite", rating)));
            }
        }
        Ok(())
    }

    /// Localized title for a language, if present and non-blank
    pub fn localized_title(&self, lang: &str) -> Option<&str> {
        self.localized_content
            .as_ref()
            .and_then(|map| map.get(lang))
            .and_then(|l| l.title.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, EnumString, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ContentType {
    Movie,
    Series,
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, EnumString, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ContentStatus {
    Draft,
    Scheduled,
    Published,
    Unpublished,
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    EnumString,
    Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AccessType {
    #[default]
    Free,
    Subscription,
    Rent,
    Purchase,
}

/// A credited person on a title
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastMember {
    pub name: String,

    #[serde(default)]
    pub role: Option<String>,

    #[serde(default)]
    pub character: Option<String>,
}

impl CastMember {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: None,
            character: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalizedContent {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
}
