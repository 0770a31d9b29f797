use crate::error::{AppError, Result};
use crate::models::Content;
use crate::state::ContentStore;
use async_trait::async_trait;
use dashmap::DashMap;
use std::path::Path;
use std::sync::Arc;

/// In-memory content store (for the CLI and testing)
#[derive(Clone)]
pub struct InMemoryStore {
    contents: Arc<DashMap<String, Content>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            contents: Arc::new(DashMap::new()),
        }
    }

    /// Build a store pre-populated with the given records
    pub fn from_contents(contents: impl IntoIterator<Item = Content>) -> Self {
        let store = Self::new();
        for content in contents {
            store.contents.insert(content.id.clone(), content);
        }
        store
    }

    /// Load a JSON array of content records from disk
    pub fn load_json(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let contents: Vec<Content> = serde_json::from_str(&raw)?;
        tracing::info!(path = ?path, records = contents.len(), "Loaded catalog snapshot");
        Ok(Self::from_contents(contents))
    }

    /// Insert or replace a record
    pub fn save_content(&self, content: Content) {
        tracing::debug!(content_id = %content.id, "Content saved");
        self.contents.insert(content.id.clone(), content);
    }

    /// Remove a record
    pub fn delete_content(&self, id: &str) -> Result<Content> {
        self.contents
            .remove(id)
            .map(|(_, content)| {
                tracing::debug!(content_id = %id, "Content deleted");
                content
            })
            .ok_or_else(|| AppError::NotFound(format!("Content {} not found", id)))
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentStore for InMemoryStore {
    async fn get_content(&self, id: &str) -> Result<Option<Content>> {
        Ok(self.contents.get(id).map(|entry| entry.clone()))
    }

    async fn list_published(&self) -> Result<Vec<Content>> {
        let mut contents: Vec<Content> = self
            .contents
            .iter()
            .filter(|entry| entry.value().is_published())
            .map(|entry| entry.value().clone())
            .collect();

        // Stable order so batch boundaries are reproducible
        contents.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(contents)
    }
}
