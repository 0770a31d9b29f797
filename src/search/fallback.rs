//! Degraded-mode search served straight from the primary store

use crate::models::Content;
use crate::search::query::{
    total_pages, SearchItem, SearchQuery, SearchResponse, SuggestItem, SuggestQuery,
    SuggestResponse,
};
use crate::state::{ContentMatch, ContentStore, MatchFields};
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;

/// Substring search over published records, ordered by rating.
///
/// Returns the same response shapes as the index path. Store failures
/// produce an empty response rather than an error.
#[derive(Clone)]
pub struct FallbackSearch {
    store: Arc<dyn ContentStore>,
}

impl FallbackSearch {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Expects a normalized, non-empty query
    pub async fn search(&self, query: &SearchQuery) -> SearchResponse {
        let started = Instant::now();
        let criteria = ContentMatch::new(&query.q, MatchFields::Search)
            .with_type(query.content_type)
            .with_genre(query.genre.clone())
            .with_year(query.year)
            .with_country(query.country.clone());

        let mut matches = match self.store.find_published_matching(&criteria).await {
            Ok(matches) => matches,
            Err(e) => {
                tracing::error!(query = %query.q, error = %e, "Fallback search failed");
                return SearchResponse::empty(query);
            }
        };
        matches.sort_by(by_rating_then_title);

        let total = matches.len() as u64;
        let items = matches
            .iter()
            .skip(query.offset())
            .take(query.limit)
            .map(SearchItem::from)
            .collect();

        SearchResponse {
            items,
            total,
            page: query.page,
            limit: query.limit,
            total_pages: total_pages(total, query.limit),
            took_ms: started.elapsed().as_millis() as u64,
            query: query.q.clone(),
        }
    }

    /// Expects a normalized, non-empty query
    pub async fn suggest(&self, query: &SuggestQuery) -> SuggestResponse {
        let started = Instant::now();
        let criteria = ContentMatch::new(&query.q, MatchFields::Suggest);

        let mut matches = match self.store.find_published_matching(&criteria).await {
            Ok(matches) => matches,
            Err(e) => {
                tracing::error!(query = %query.q, error = %e, "Fallback suggest failed");
                return SuggestResponse::empty(query);
            }
        };
        matches.sort_by(by_rating_then_title);

        let items = matches
            .iter()
            .take(query.limit)
            .map(SuggestItem::from)
            .collect();

        SuggestResponse::new(items, started.elapsed().as_millis() as u64, query.q.clone())
    }
}

/// Rating descending with unrated last, then title for a stable order
fn by_rating_then_title(a: &Content, b: &Content) -> Ordering {
    let rating = match (a.rating, b.rating) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    rating.then_with(|| a.title.cmp(&b.title))
}
