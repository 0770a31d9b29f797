//! Index settings, analyzers and field mappings for the content index.

use crate::search::document::{
    localized_description_field, localized_title_field, PRIMARY_LANGUAGE, SECONDARY_LANGUAGE,
};
use serde_json::{json, Map, Value};

/// Analyzer for Latin-script text
pub const LATIN_ANALYZER: &str = "latin_standard";

/// Lowercase + Arabic/Persian normalization + Persian stopwords
pub const PERSIAN_ANALYZER: &str = "persian_normalized";

/// Edge-n-gram analyzer applied at index time on autocomplete sub-fields
pub const AUTOCOMPLETE_INDEX_ANALYZER: &str = "autocomplete_index";

/// Plain normalizing analyzer applied at search time on autocomplete sub-fields
pub const AUTOCOMPLETE_SEARCH_ANALYZER: &str = "autocomplete_search";

/// Keyword normalizer for case-insensitive list filters
pub const LOWERCASE_NORMALIZER: &str = "lowercase_normalizer";

pub const EDGE_NGRAM_MIN: u32 = 2;
pub const EDGE_NGRAM_MAX: u32 = 15;

/// Full `PUT /<index>` body: settings plus mappings
pub fn index_body(number_of_replicas: u32) -> Value {
    json!({
        "settings": {
            "number_of_shards": 1,
            "number_of_replicas": number_of_replicas,
            "analysis": analysis_settings(),
        },
        "mappings": mappings(),
    })
}

fn analysis_settings() -> Value {
    json!({
        "char_filter": {
            "zwnj_to_space": {
                "type": "mapping",
                "mappings": ["\\u200C=>\\u0020"]
            }
        },
        "filter": {
            "persian_stop": {
                "type": "stop",
                "stopwords": "_persian_"
            }
        },
        "tokenizer": {
            "autocomplete_tokenizer": {
                "type": "edge_ngram",
                "min_gram": EDGE_NGRAM_MIN,
                "max_gram": EDGE_NGRAM_MAX,
                "token_chars": ["letter", "digit"]
            }
        },
        "analyzer": {
            LATIN_ANALYZER: {
                "type": "standard"
            },
            PERSIAN_ANALYZER: {
                "type": "custom",
                "char_filter": ["zwnj_to_space"],
                "tokenizer": "standard",
                "filter": [
                    "lowercase",
                    "decimal_digit",
                    "arabic_normalization",
                    "persian_normalization",
                    "persian_stop"
                ]
            },
            AUTOCOMPLETE_INDEX_ANALYZER: {
                "type": "custom",
                "char_filter": ["zwnj_to_space"],
                "tokenizer": "autocomplete_tokenizer",
                "filter": [
                    "lowercase",
                    "decimal_digit",
                    "arabic_normalization",
                    "persian_normalization"
                ]
            },
            AUTOCOMPLETE_SEARCH_ANALYZER: {
                "type": "custom",
                "char_filter": ["zwnj_to_space"],
                "tokenizer": "standard",
                "filter": [
                    "lowercase",
                    "decimal_digit",
                    "arabic_normalization",
                    "persian_normalization"
                ]
            }
        },
        "normalizer": {
            LOWERCASE_NORMALIZER: {
                "type": "custom",
                "filter": ["lowercase"]
            }
        }
    })
}

/// Analyzed text with an exact `.keyword` sub-field, plus `.autocomplete`
/// for title-like fields
fn text_field(analyzer: &str, autocomplete: bool) -> Value {
    let mut fields = Map::new();
    fields.insert(
        "keyword".to_string(),
        json!({ "type": "keyword", "ignore_above": 256 }),
    );
    if autocomplete {
        fields.insert(
            "autocomplete".to_string(),
            json!({
                "type": "text",
                "analyzer": AUTOCOMPLETE_INDEX_ANALYZER,
                "search_analyzer": AUTOCOMPLETE_SEARCH_ANALYZER
            }),
        );
    }

    json!({
        "type": "text",
        "analyzer": analyzer,
        "fields": fields,
    })
}

fn keyword_list() -> Value {
    json!({ "type": "keyword", "normalizer": LOWERCASE_NORMALIZER })
}

fn display_only() -> Value {
    json!({ "type": "keyword", "index": false, "doc_values": false })
}

fn language_analyzer(lang: &str) -> &'static str {
    if lang == SECONDARY_LANGUAGE {
        LATIN_ANALYZER
    } else {
        PERSIAN_ANALYZER
    }
}

fn mappings() -> Value {
    let mut properties = Map::new();

    properties.insert("id".into(), json!({ "type": "keyword" }));
    properties.insert("title".into(), text_field(PERSIAN_ANALYZER, true));
    properties.insert("originalTitle".into(), text_field(LATIN_ANALYZER, true));
    properties.insert("description".into(), text_field(PERSIAN_ANALYZER, false));
    properties.insert("shortDescription".into(), text_field(PERSIAN_ANALYZER, false));
    properties.insert("tagline".into(), text_field(PERSIAN_ANALYZER, false));

    for lang in [PRIMARY_LANGUAGE, SECONDARY_LANGUAGE] {
        let analyzer = language_analyzer(lang);
        properties.insert(localized_title_field(lang), text_field(analyzer, true));
        properties.insert(localized_description_field(lang), text_field(analyzer, false));
    }

    for field in ["type", "status", "accessType"] {
        properties.insert(field.into(), json!({ "type": "keyword" }));
    }
    properties.insert("year".into(), json!({ "type": "integer" }));
    properties.insert("rating".into(), json!({ "type": "float" }));
    properties.insert("duration".into(), json!({ "type": "integer" }));
    properties.insert("priority".into(), json!({ "type": "integer" }));
    for field in ["featured", "isDubbed", "isKids", "isComingSoon"] {
        properties.insert(field.into(), json!({ "type": "boolean" }));
    }

    for field in ["genres", "tags", "seoKeywords"] {
        properties.insert(field.into(), keyword_list());
    }

    properties.insert("director".into(), text_field(PERSIAN_ANALYZER, false));
    properties.insert("castNames".into(), text_field(PERSIAN_ANALYZER, false));
    properties.insert("country".into(), text_field(PERSIAN_ANALYZER, false));

    for field in ["posterUrl", "thumbnailUrl", "backdropUrl"] {
        properties.insert(field.into(), display_only());
    }

    properties.insert("createdAt".into(), json!({ "type": "date" }));
    properties.insert("updatedAt".into(), json!({ "type": "date" }));

    properties.insert(
        "suggest".into(),
        json!({
            "type": "completion",
            "analyzer": AUTOCOMPLETE_SEARCH_ANALYZER,
            "preserve_separators": true,
            "preserve_position_increments": true,
            "max_input_length": 50,
            "contexts": [
                { "name": "type", "type": "category" }
            ]
        }),
    );

    json!({
        "dynamic_templates": [
            {
                "localized_titles": {
                    "match": "localizedTitle_*",
                    "match_mapping_type": "string",
                    "mapping": text_field(PERSIAN_ANALYZER, true)
                }
            },
            {
                "localized_descriptions": {
                    "match": "localizedDescription_*",
                    "match_mapping_type": "string",
                    "mapping": text_field(PERSIAN_ANALYZER, false)
                }
            }
        ],
        "properties": properties,
    })
}
