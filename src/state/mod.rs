pub mod store;

pub use store::*;

use crate::error::Result;
use crate::models::{Content, ContentType};
use crate::search::analysis::{contains_normalized, normalize};
use async_trait::async_trait;

/// Read access to the authoritative content records.
///
/// The surrounding CRUD system owns writes; the search subsystem only reads.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Get a content record by ID
    async fn get_content(&self, id: &str) -> Result<Option<Content>>;

    /// All records with `status == published`
    async fn list_published(&self) -> Result<Vec<Content>>;

    /// Published records matching a substring query.
    ///
    /// The default filters `list_published` in memory; relational adapters
    /// should push this down as a case-insensitive `LIKE`.
    async fn find_published_matching(&self, criteria: &ContentMatch) -> Result<Vec<Content>> {
        Ok(self
            .list_published()
            .await?
            .into_iter()
            .filter(|content| criteria.matches(content))
            .collect())
    }
}

/// Which text columns a substring match looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchFields {
    /// title, original title, description, director
    Search,
    /// title, original title
    Suggest,
}

/// Substring criteria used by the degraded-mode query path
#[derive(Debug, Clone)]
pub struct ContentMatch {
    /// Normalized needle
    pub text: String,
    pub fields: MatchFields,
    pub content_type: Option<ContentType>,
    pub genre: Option<String>,
    pub year: Option<i32>,
    pub country: Option<String>,
}

impl ContentMatch {
    pub fn new(text: &str, fields: MatchFields) -> Self {
        Self {
            text: normalize(text),
            fields,
            content_type: None,
            genre: None,
            year: None,
            country: None,
        }
    }

    pub fn with_type(mut self, content_type: Option<ContentType>) -> Self {
        self.content_type = content_type;
        self
    }

    pub fn with_genre(mut self, genre: Option<String>) -> Self {
        self.genre = genre.map(|g| normalize(&g)).filter(|g| !g.is_empty());
        self
    }

    pub fn with_year(mut self, year: Option<i32>) -> Self {
        self.year = year;
        self
    }

    pub fn with_country(mut self, country: Option<String>) -> Self {
        self.country = country.map(|c| normalize(&c)).filter(|c| !c.is_empty());
        self
    }

    /// Whether a record satisfies every criterion, including `published`
    pub fn matches(&self, content: &Content) -> bool {
        if !content.is_published() {
            return false;
        }

        if let Some(content_type) = self.content_type {
            if content.content_type != content_type {
                return false;
            }
        }

        if let Some(year) = self.year {
            if content.year != Some(year) {
                return false;
            }
        }

        if let Some(ref genre) = self.genre {
            if !content.genres.iter().any(|g| normalize(g) == *genre) {
                return false;
            }
        }

        if let Some(ref country) = self.country {
            match content.country {
                Some(ref c) if contains_normalized(c, country) => {}
                _ => return false,
            }
        }

        let text_match = |value: Option<&str>| value.is_some_and(|v| contains_normalized(v, &self.text));

        match self.fields {
            MatchFields::Search => {
                text_match(Some(content.title.as_str()))
                    || text_match(content.original_title.as_deref())
                    || text_match(content.description.as_deref())
                    || text_match(content.director.as_deref())
            }
            MatchFields::Suggest => {
                text_match(Some(content.title.as_str())) || text_match(content.original_title.as_deref())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContentStatus;

    fn published(id: &str, title: &str) -> Content {
        let mut content = Content::new(id, title, ContentType::Movie);
        content.status = ContentStatus::Published;
        content
    }

    #[test]
    fn test_match_requires_published() {
        let mut content = published("m1", "Desert Sonata");
        let criteria = ContentMatch::new("desert", MatchFields::Search);
        assert!(criteria.matches(&content));

        content.status = ContentStatus::Unpublished;
        assert!(!criteria.matches(&content));
    }

    #[test]
    fn test_suggest_fields_ignore_description() {
        let mut content = published("m1", "Ocean Drift");
        content.description = Some("A desert story".to_string());
        content.director = Some("Desmond Hale".to_string());

        assert!(ContentMatch::new("desert", MatchFields::Search).matches(&content));
        assert!(ContentMatch::new("desmond", MatchFields::Search).matches(&content));
        assert!(!ContentMatch::new("desert", MatchFields::Suggest).matches(&content));
    }

    #[test]
    fn test_filters() {
        let mut content = published("m1", "Desert Sonata");
        content.genres = vec!["Drama".to_string()];
        content.year = Some(2021);
        content.country = Some("Iran".to_string());

        let base = || ContentMatch::new("sonata", MatchFields::Search);

        assert!(base().with_genre(Some("drama".into())).matches(&content));
        assert!(!base().with_genre(Some("comedy".into())).matches(&content));
        assert!(base().with_year(Some(2021)).matches(&content));
        assert!(!base().with_year(Some(2020)).matches(&content));
        assert!(base().with_country(Some("IRAN".into())).matches(&content));
        assert!(!base().with_type(Some(ContentType::Series)).matches(&content));
    }
}
