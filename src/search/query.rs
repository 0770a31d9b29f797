//! Query parameters, backend query DSL and response reconstruction

use crate::models::{AccessType, Content, ContentType};
use crate::search::analysis::matched_prefix_end;
use crate::search::client::{RawHit, RawSearchResponse};
use crate::search::document::IndexedContent;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashSet};
use std::hash::Hash;
use strum::{Display, EnumString};

pub const DEFAULT_SEARCH_LIMIT: usize = 20;
pub const MAX_SEARCH_LIMIT: usize = 100;
pub const DEFAULT_SUGGEST_LIMIT: usize = 8;
pub const MAX_SUGGEST_LIMIT: usize = 15;

/// Name of the completion suggestion in the request and response
pub const COMPLETION_SUGGESTION: &str = "title_suggest";

pub const HIGHLIGHT_PRE_TAG: &str = "<mark>";
pub const HIGHLIGHT_POST_TAG: &str = "</mark>";

/// Boosted fields for the ranked search
const SEARCH_FIELDS: &[&str] = &[
    "title^5",
    "localizedTitle_fa^4",
    "originalTitle^3",
    "localizedTitle_en^3",
    "director^2",
    "castNames^2",
    "description^1.5",
    "shortDescription^1.5",
    "localizedDescription_fa^1.5",
    "localizedDescription_en^1.5",
    "tags^1.5",
    "seoKeywords^1",
    "tagline^1",
];

/// Short fields highlighted whole
const TITLE_HIGHLIGHT_FIELDS: &[&str] = &[
    "title",
    "originalTitle",
    "localizedTitle_fa",
    "localizedTitle_en",
];

/// Long fields highlighted as a single best fragment
const DESCRIPTION_HIGHLIGHT_FIELDS: &[&str] = &[
    "description",
    "shortDescription",
    "localizedDescription_fa",
    "localizedDescription_en",
];

const AUTOCOMPLETE_FIELDS: &[&str] = &[
    "title.autocomplete^3",
    "originalTitle.autocomplete^2",
    "localizedTitle_fa.autocomplete^2",
    "localizedTitle_en.autocomplete^1",
];

/// `_source` fields needed to build a suggestion item
const SUGGEST_SOURCE_FIELDS: &[&str] = &[
    "title",
    "originalTitle",
    "type",
    "status",
    "year",
    "rating",
    "posterUrl",
    "thumbnailUrl",
    "genres",
    "accessType",
];

/// Result ordering
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SearchSort {
    #[default]
    Relevance,
    Rating,
    Year,
    Newest,
}

/// Parameters of a ranked search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub q: String,

    #[serde(rename = "type")]
    pub content_type: Option<ContentType>,

    pub genre: Option<String>,

    pub year: Option<i32>,

    pub country: Option<String>,

    /// 1-based page number
    pub page: usize,

    pub limit: usize,

    pub sort: SearchSort,
}

impl SearchQuery {
    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            content_type: None,
            genre: None,
            year: None,
            country: None,
            page: 1,
            limit: DEFAULT_SEARCH_LIMIT,
            sort: SearchSort::default(),
        }
    }

    pub fn with_type(mut self, content_type: ContentType) -> Self {
        self.content_type = Some(content_type);
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_sort(mut self, sort: SearchSort) -> Self {
        self.sort = sort;
        self
    }

    /// Trim text, drop blank filters and clamp paging
    pub fn normalized(&self) -> Self {
        Self {
            q: self.q.trim().to_string(),
            content_type: self.content_type,
            genre: trimmed(self.genre.as_deref()),
            year: self.year,
            country: trimmed(self.country.as_deref()),
            page: self.page.max(1),
            limit: self.limit.clamp(1, MAX_SEARCH_LIMIT),
            sort: self.sort,
        }
    }

    /// Offset of the first hit on the current page
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

/// Parameters of an autocomplete request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestQuery {
    pub q: String,
    pub limit: usize,
}

impl SuggestQuery {
    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            limit: DEFAULT_SUGGEST_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn normalized(&self) -> Self {
        Self {
            q: self.q.trim().to_string(),
            limit: self.limit.clamp(1, MAX_SUGGEST_LIMIT),
        }
    }
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// One ranked search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchItem {
    pub id: String,
    pub title: String,
    pub original_title: Option<String>,
    pub short_description: Option<String>,
    #[serde(rename = "type")]
    pub content_type: Option<ContentType>,
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
    pub score: Option<f32>,

    /// Marked fragments keyed by field name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub highlights: BTreeMap<String, Vec<String>>,
}

impl SearchItem {
    fn from_hit(hit: RawHit, source: IndexedContent) -> Self {
        Self {
            id: hit.id,
            title: source.title,
            original_title: source.original_title,
            short_description: source.short_description,
            content_type: source.content_type,
            access_type: source.access_type,
            year: source.year,
            rating: source.rating,
            duration: source.duration,
            featured: source.featured,
            is_dubbed: source.is_dubbed,
            is_kids: source.is_kids,
            is_coming_soon: source.is_coming_soon,
            genres: source.genres,
            poster_url: source.poster_url,
            thumbnail_url: source.thumbnail_url,
            backdrop_url: source.backdrop_url,
            score: hit.score,
            highlights: hit.highlight.into_iter().collect(),
        }
    }
}

impl From<&Content> for SearchItem {
    fn from(content: &Content) -> Self {
        Self {
            id: content.id.clone(),
            title: content.title.clone(),
            original_title: content.original_title.clone(),
            short_description: content.short_description.clone(),
            content_type: Some(content.content_type),
            access_type: Some(content.access_type),
            year: content.year,
            rating: content.rating,
            duration: content.duration,
            featured: content.featured,
            is_dubbed: content.is_dubbed,
            is_kids: content.is_kids,
            is_coming_soon: content.is_coming_soon,
            genres: content.genres.clone(),
            poster_url: content.poster_url.clone(),
            thumbnail_url: content.thumbnail_url.clone(),
            backdrop_url: content.backdrop_url.clone(),
            score: None,
            highlights: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub items: Vec<SearchItem>,
    pub total: u64,
    pub page: usize,
    pub limit: usize,
    pub total_pages: u64,
    pub took_ms: u64,
    pub query: String,
}

impl SearchResponse {
    /// Response for a query that matched nothing
    pub fn empty(query: &SearchQuery) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: query.page,
            limit: query.limit,
            total_pages: 0,
            took_ms: 0,
            query: query.q.clone(),
        }
    }
}

/// Pages needed to show `total` hits at `limit` per page
pub fn total_pages(total: u64, limit: usize) -> u64 {
    let limit = limit.max(1) as u64;
    total.div_ceil(limit)
}

/// Minimal display fields for one autocomplete entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestItem {
    pub id: String,
    pub title: String,
    pub original_title: Option<String>,
    #[serde(rename = "type")]
    pub content_type: Option<ContentType>,
    pub year: Option<i32>,
    pub rating: Option<f32>,
    pub poster_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub genres: Vec<String>,
    pub access_type: Option<AccessType>,
    pub highlight: Option<String>,
}

impl SuggestItem {
    fn from_source(id: String, source: IndexedContent, highlight: Option<String>) -> Self {
        Self {
            id,
            title: source.title,
            original_title: source.original_title,
            content_type: source.content_type,
            year: source.year,
            rating: source.rating,
            poster_url: source.poster_url,
            thumbnail_url: source.thumbnail_url,
            genres: source.genres,
            access_type: source.access_type,
            highlight,
        }
    }
}

impl From<&Content> for SuggestItem {
    fn from(content: &Content) -> Self {
        Self {
            id: content.id.clone(),
            title: content.title.clone(),
            original_title: content.original_title.clone(),
            content_type: Some(content.content_type),
            year: content.year,
            rating: content.rating,
            poster_url: content.poster_url.clone(),
            thumbnail_url: content.thumbnail_url.clone(),
            genres: content.genres.clone(),
            access_type: Some(content.access_type),
            highlight: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestResponse {
    pub items: Vec<SuggestItem>,
    pub total: usize,
    pub took_ms: u64,
    pub query: String,
}

impl SuggestResponse {
    pub fn new(items: Vec<SuggestItem>, took_ms: u64, query: impl Into<String>) -> Self {
        Self {
            total: items.len(),
            items,
            took_ms,
            query: query.into(),
        }
    }

    pub fn empty(query: &SuggestQuery) -> Self {
        Self::new(Vec::new(), 0, query.q.clone())
    }
}

/// Field name without its `^boost` suffix
fn unboosted(field: &str) -> &str {
    field.split('^').next().unwrap_or(field)
}

fn published_filter() -> Value {
    json!({ "term": { "status": "published" } })
}

fn sort_clause(sort: SearchSort) -> Value {
    match sort {
        SearchSort::Relevance => json!([
            { "_score": { "order": "desc" } },
            { "featured": { "order": "desc" } },
            { "priority": { "order": "desc", "missing": "_last" } }
        ]),
        SearchSort::Rating => json!([
            { "rating": { "order": "desc", "missing": "_last" } },
            { "_score": { "order": "desc" } }
        ]),
        SearchSort::Year => json!([
            { "year": { "order": "desc", "missing": "_last" } },
            { "_score": { "order": "desc" } }
        ]),
        SearchSort::Newest => json!([
            { "createdAt": { "order": "desc" } }
        ]),
    }
}

fn search_highlight() -> Value {
    let mut fields = Map::new();
    for field in TITLE_HIGHLIGHT_FIELDS {
        fields.insert(field.to_string(), json!({ "number_of_fragments": 0 }));
    }
    for field in DESCRIPTION_HIGHLIGHT_FIELDS {
        fields.insert(
            field.to_string(),
            json!({ "fragment_size": 150, "number_of_fragments": 1 }),
        );
    }

    json!({
        "pre_tags": [HIGHLIGHT_PRE_TAG],
        "post_tags": [HIGHLIGHT_POST_TAG],
        "fields": fields,
    })
}

/// Ranked multi-field query; expects a normalized `SearchQuery`
pub fn build_search_body(query: &SearchQuery) -> Value {
    let mut filter = vec![published_filter()];
    if let Some(content_type) = query.content_type {
        filter.push(json!({ "term": { "type": content_type.to_string() } }));
    }
    if let Some(ref genre) = query.genre {
        filter.push(json!({ "term": { "genres": genre } }));
    }
    if let Some(year) = query.year {
        filter.push(json!({ "term": { "year": year } }));
    }
    if let Some(ref country) = query.country {
        filter.push(json!({ "match": { "country": { "query": country, "operator": "and" } } }));
    }

    json!({
        "from": query.offset(),
        "size": query.limit,
        "track_total_hits": true,
        "query": {
            "bool": {
                "must": [{
                    "multi_match": {
                        "query": query.q,
                        "type": "best_fields",
                        "fields": SEARCH_FIELDS,
                        "fuzziness": "AUTO",
                        "prefix_length": 1,
                        "minimum_should_match": "75%"
                    }
                }],
                "filter": filter
            }
        },
        "sort": sort_clause(query.sort),
        "highlight": search_highlight(),
    })
}

/// Completion-suggester lookup against `suggest.input`
pub fn build_completion_body(query: &SuggestQuery) -> Value {
    json!({
        "size": 0,
        "_source": SUGGEST_SOURCE_FIELDS,
        "suggest": {
            COMPLETION_SUGGESTION: {
                "prefix": query.q,
                "completion": {
                    "field": "suggest",
                    "size": query.limit,
                    "skip_duplicates": true,
                    "fuzzy": {
                        "fuzziness": "AUTO",
                        "prefix_length": 1
                    }
                }
            }
        }
    })
}

/// Bool-prefix match against the edge-n-gram title sub-fields
pub fn build_prefix_body(query: &SuggestQuery) -> Value {
    let mut highlight_fields = Map::new();
    for field in AUTOCOMPLETE_FIELDS {
        highlight_fields.insert(
            unboosted(field).to_string(),
            json!({ "number_of_fragments": 0 }),
        );
    }

    json!({
        "size": query.limit,
        "_source": SUGGEST_SOURCE_FIELDS,
        "query": {
            "bool": {
                "must": [{
                    "multi_match": {
                        "query": query.q,
                        "type": "bool_prefix",
                        "fields": AUTOCOMPLETE_FIELDS
                    }
                }],
                "filter": [published_filter()]
            }
        },
        "highlight": {
            "pre_tags": [HIGHLIGHT_PRE_TAG],
            "post_tags": [HIGHLIGHT_POST_TAG],
            "fields": highlight_fields,
        }
    })
}

/// Rebuild a search response from raw hits
pub fn parse_search_response(
    raw: RawSearchResponse,
    query: &SearchQuery,
    took_ms: u64,
) -> SearchResponse {
    let total = raw
        .hits
        .total
        .map(|t| t.value)
        .unwrap_or(raw.hits.hits.len() as u64);

    let items = raw
        .hits
        .hits
        .into_iter()
        .filter_map(|mut hit| {
            let source = hit.source.take()?;
            Some(SearchItem::from_hit(hit, source))
        })
        .collect();

    SearchResponse {
        items,
        total,
        page: query.page,
        limit: query.limit,
        total_pages: total_pages(total, query.limit),
        took_ms,
        query: query.q.clone(),
    }
}

/// Wrap the part of `text` matching `prefix` in highlight tags
pub fn highlight_prefix(text: &str, prefix: &str) -> Option<String> {
    let end = matched_prefix_end(text, prefix)?;
    Some(format!(
        "{}{}{}{}",
        HIGHLIGHT_PRE_TAG,
        &text[..end],
        HIGHLIGHT_POST_TAG,
        &text[end..]
    ))
}

/// Completion options, restricted to published documents
pub fn parse_completion_response(raw: RawSearchResponse, query: &SuggestQuery) -> Vec<SuggestItem> {
    let mut suggest = raw.suggest;
    let Some(entries) = suggest.remove(COMPLETION_SUGGESTION) else {
        return Vec::new();
    };

    entries
        .into_iter()
        .flat_map(|entry| entry.options)
        .filter_map(|option| {
            // The completion suggester cannot filter on status
            let source = option.source.filter(IndexedContent::is_published)?;
            let highlight = highlight_prefix(&option.text, &query.q);
            Some(SuggestItem::from_source(option.id, source, highlight))
        })
        .collect()
}

/// Bool-prefix hits with their first highlighted title fragment
pub fn parse_prefix_response(raw: RawSearchResponse) -> Vec<SuggestItem> {
    raw.hits
        .hits
        .into_iter()
        .filter_map(|mut hit| {
            let source = hit.source.take()?;
            let highlight = AUTOCOMPLETE_FIELDS
                .iter()
                .map(|field| unboosted(field))
                .find_map(|field| hit.highlight.get_mut(field).and_then(|f| f.drain(..).next()));
            Some(SuggestItem::from_source(hit.id, source, highlight))
        })
        .collect()
}

/// Concatenate `lists` in order, keeping the first item seen for each key,
/// and stop after `limit` items
pub fn merge_first_seen<T, K, F>(lists: impl IntoIterator<Item = Vec<T>>, key: F, limit: usize) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    let mut merged = Vec::with_capacity(limit);

    for item in lists.into_iter().flatten() {
        if merged.len() >= limit {
            break;
        }
        if seen.insert(key(&item)) {
            merged.push(item);
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn raw(value: Value) -> RawSearchResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_normalized_clamps() {
        let query = SearchQuery::new("  dune ")
            .with_page(0)
            .with_limit(500)
            .with_genre("  ")
            .normalized();

        assert_eq!(query.q, "dune");
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, MAX_SEARCH_LIMIT);
        assert_eq!(query.genre, None);
        assert_eq!(SearchQuery::new("x").with_limit(0).normalized().limit, 1);

        let suggest = SuggestQuery::new("d").with_limit(50).normalized();
        assert_eq!(suggest.limit, MAX_SUGGEST_LIMIT);
        assert_eq!(SuggestQuery::new("d").limit, DEFAULT_SUGGEST_LIMIT);
    }

    #[test]
    fn test_sort_parsing() {
        assert_eq!(SearchSort::from_str("Rating").unwrap(), SearchSort::Rating);
        assert_eq!(SearchSort::default(), SearchSort::Relevance);
        assert!(SearchSort::from_str("popularity").is_err());
        assert_eq!(SearchSort::Newest.to_string(), "newest");
    }

    #[test]
    fn test_offset() {
        let query = SearchQuery::new("x").with_page(3).with_limit(20);
        assert_eq!(query.offset(), 40);
        assert_eq!(total_pages(41, 20), 3);
        assert_eq!(total_pages(0, 20), 0);
    }

    #[test]
    fn test_search_body_is_fuzzy_and_published_only() {
        let query = SearchQuery::new("desret sonata").normalized();
        let body = build_search_body(&query);

        let multi_match = &body["query"]["bool"]["must"][0]["multi_match"];
        assert_eq!(multi_match["fuzziness"], "AUTO");
        assert_eq!(multi_match["prefix_length"], 1);
        assert_eq!(multi_match["minimum_should_match"], "75%");
        assert_eq!(multi_match["type"], "best_fields");
        assert_eq!(multi_match["fields"][0], "title^5");

        let filters = body["query"]["bool"]["filter"].as_array().unwrap();
        assert_eq!(filters.len(), 1);
        assert_eq!(filters[0]["term"]["status"], "published");
        assert_eq!(body["track_total_hits"], true);
        assert_eq!(body["from"], 0);
        assert_eq!(body["size"], 20);
    }

    #[test]
    fn test_search_body_filters_and_sort() {
        let query = SearchQuery::new("war")
            .with_type(ContentType::Series)
            .with_genre("Drama")
            .with_year(2020)
            .with_country("Iran")
            .with_sort(SearchSort::Rating)
            .with_page(2)
            .normalized();
        let body = build_search_body(&query);

        let filters = body["query"]["bool"]["filter"].as_array().unwrap();
        assert_eq!(filters.len(), 5);
        assert_eq!(filters[1]["term"]["type"], "series");
        assert_eq!(filters[2]["term"]["genres"], "Drama");
        assert_eq!(filters[3]["term"]["year"], 2020);
        assert_eq!(filters[4]["match"]["country"]["operator"], "and");

        assert_eq!(body["sort"][0]["rating"]["missing"], "_last");
        assert_eq!(body["from"], 20);
    }

    #[test]
    fn test_relevance_sort_breaks_ties() {
        let body = build_search_body(&SearchQuery::new("x"));
        assert!(body["sort"][0]["_score"].is_object());
        assert!(body["sort"][1]["featured"].is_object());
        assert_eq!(body["sort"][2]["priority"]["missing"], "_last");
    }

    #[test]
    fn test_highlight_settings() {
        let body = build_search_body(&SearchQuery::new("x"));
        let highlight = &body["highlight"];
        assert_eq!(highlight["pre_tags"][0], "<mark>");
        assert_eq!(highlight["fields"]["title"]["number_of_fragments"], 0);
        assert_eq!(highlight["fields"]["description"]["fragment_size"], 150);
        assert_eq!(highlight["fields"]["description"]["number_of_fragments"], 1);
    }

    #[test]
    fn test_suggest_bodies() {
        let query = SuggestQuery::new("Des").normalized();

        let completion = build_completion_body(&query);
        let suggester = &completion["suggest"][COMPLETION_SUGGESTION];
        assert_eq!(suggester["prefix"], "Des");
        assert_eq!(suggester["completion"]["field"], "suggest");
        assert_eq!(suggester["completion"]["size"], 8);
        assert_eq!(suggester["completion"]["skip_duplicates"], true);
        assert_eq!(suggester["completion"]["fuzzy"]["prefix_length"], 1);

        let prefix = build_prefix_body(&query);
        let multi_match = &prefix["query"]["bool"]["must"][0]["multi_match"];
        assert_eq!(multi_match["type"], "bool_prefix");
        assert_eq!(multi_match["fields"][0], "title.autocomplete^3");
        assert_eq!(prefix["query"]["bool"]["filter"][0]["term"]["status"], "published");
        assert!(prefix["highlight"]["fields"]["title.autocomplete"].is_object());
    }

    #[test]
    fn test_parse_search_response() {
        let query = SearchQuery::new("sonata").with_limit(1).normalized();
        let response = parse_search_response(
            raw(json!({
                "took": 3,
                "hits": {
                    "total": { "value": 2, "relation": "eq" },
                    "hits": [{
                        "_id": "m1",
                        "_score": 4.2,
                        "_source": {
                            "title": "Desert Sonata",
                            "type": "movie",
                            "status": "published",
                            "rating": 8.5,
                            "genres": ["drama"]
                        },
                        "highlight": { "title": ["Desert <mark>Sonata</mark>"] }
                    }]
                }
            })),
            &query,
            7,
        );

        assert_eq!(response.total, 2);
        assert_eq!(response.total_pages, 2);
        assert_eq!(response.took_ms, 7);
        assert_eq!(response.items.len(), 1);

        let item = &response.items[0];
        assert_eq!(item.id, "m1");
        assert_eq!(item.content_type, Some(ContentType::Movie));
        assert_eq!(item.highlights["title"][0], "Desert <mark>Sonata</mark>");

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["totalPages"], 2);
        assert_eq!(json["items"][0]["type"], "movie");
    }

    #[test]
    fn test_completion_options_filtered_to_published() {
        let query = SuggestQuery::new("des");
        let items = parse_completion_response(
            raw(json!({
                "suggest": {
                    "title_suggest": [{
                        "text": "des",
                        "options": [
                            { "text": "Desert Sonata", "_id": "m1", "_score": 10.0,
                              "_source": { "title": "Desert Sonata", "status": "published" } },
                            { "text": "Destiny", "_id": "m2", "_score": 5.0,
                              "_source": { "title": "Destiny", "status": "draft" } }
                        ]
                    }]
                }
            })),
            &query,
        );

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "m1");
        assert_eq!(items[0].highlight.as_deref(), Some("<mark>Des</mark>ert Sonata"));
    }

    #[test]
    fn test_prefix_hits_take_title_highlight() {
        let items = parse_prefix_response(raw(json!({
            "hits": {
                "hits": [{
                    "_id": "s1",
                    "_source": { "title": "Night Train", "status": "published" },
                    "highlight": {
                        "originalTitle.autocomplete": ["<mark>Nig</mark>ht"],
                        "title.autocomplete": ["<mark>Nig</mark>ht Train"]
                    }
                }]
            }
        })));

        assert_eq!(items[0].highlight.as_deref(), Some("<mark>Nig</mark>ht Train"));
    }

    #[test]
    fn test_merge_first_seen() {
        let completion = vec![("m1", "a"), ("m2", "a")];
        let prefix = vec![("m2", "b"), ("m3", "b"), ("m4", "b")];

        let merged = merge_first_seen(vec![completion, prefix], |(id, _)| *id, 3);
        assert_eq!(merged, vec![("m1", "a"), ("m2", "a"), ("m3", "b")]);

        let merged = merge_first_seen(vec![vec![1, 1, 2], vec![2, 3]], |n| *n, 10);
        assert_eq!(merged, vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_responses() {
        let response = SearchResponse::empty(&SearchQuery::new("").normalized());
        assert!(response.items.is_empty());
        assert_eq!(response.total, 0);
        assert_eq!(response.total_pages, 0);

        let suggest = SuggestResponse::empty(&SuggestQuery::new(" ").normalized());
        assert_eq!(suggest.total, 0);
    }
}
