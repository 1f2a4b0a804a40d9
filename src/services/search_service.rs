//! src/services/search_service.rs
//!
//! SearchService — turns free text into label keywords and runs the
//! should-match-any search. Intent recognition is optional at runtime
//! (unset bot config skips it) and every external failure is surfaced as
//! a `Result` so the handler can degrade to the stop-word fallback or an
//! empty result list.

use crate::models::intent::RecognizeTextResponse;
use crate::models::search::{PhotoResult, SearchResponse};
use crate::services::index_client::{IndexClient, IndexError};
use crate::services::intent_client::{IntentClient, IntentError};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

const MAX_RESULTS: usize = 50;

/// Filler words stripped from raw queries when intent recognition yields
/// nothing.
const STOP_WORDS: [&str; 18] = [
    "show", "me", "find", "search", "for", "photos", "pictures", "images", "with", "of", "the",
    "a", "an", "and", "or", "in", "them", "please",
];

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("intent recognition failed: {0}")]
    Intent(#[from] IntentError),
    #[error(transparent)]
    Index(#[from] IndexError),
}

pub type SearchResult<T> = Result<T, SearchError>;

#[derive(Clone)]
pub struct SearchService {
    intent: Option<IntentClient>,
    index: IndexClient,

    /// Bucket assumed for hits that carry no bucket of their own.
    photos_bucket: String,
}

impl SearchService {
    pub fn new(
        intent: Option<IntentClient>,
        index: IndexClient,
        photos_bucket: impl Into<String>,
    ) -> Self {
        Self {
            intent,
            index,
            photos_bucket: photos_bucket.into(),
        }
    }

    /// Extract keywords from the query via intent recognition. Returns an
    /// empty list when no bot is configured or the recognized intent has
    /// no usable slots; the caller falls back to stop-word filtering.
    pub async fn intent_keywords(&self, query: &str) -> SearchResult<Vec<String>> {
        let Some(intent) = &self.intent else {
            debug!("no intent bot configured, skipping recognition");
            return Ok(Vec::new());
        };
        let response = intent.recognize(query).await?;
        if let Some(name) = response
            .session_state
            .intent
            .as_ref()
            .and_then(|intent| intent.name.as_deref())
        {
            debug!("recognized intent {} for {:?}", name, query);
        }
        Ok(keywords_from_slots(&response))
    }

    /// Run the should-match-any label search and map hits to result
    /// records.
    pub async fn find_photos(&self, keywords: &[String]) -> SearchResult<Vec<PhotoResult>> {
        let query = build_search_query(keywords);
        let response = self.index.search(&query).await?;
        Ok(photo_results(response, &self.photos_bucket))
    }
}

/// Collect lowercased `interpretedValue`s from the recognized intent's
/// slots. Scalar slots contribute their value; multi-valued slots
/// contribute each nested value; null slots contribute nothing.
pub(crate) fn keywords_from_slots(response: &RecognizeTextResponse) -> Vec<String> {
    let mut keywords = Vec::new();
    let Some(intent) = &response.session_state.intent else {
        return keywords;
    };
    for slot in intent.slots.values().flatten() {
        if let Some(value) = &slot.value {
            if let Some(interpreted) = value.interpreted_value.as_deref() {
                if !interpreted.is_empty() {
                    keywords.push(interpreted.to_lowercase());
                }
            }
        } else {
            for nested in &slot.values {
                if let Some(interpreted) = nested
                    .value
                    .as_ref()
                    .and_then(|value| value.interpreted_value.as_deref())
                {
                    if !interpreted.is_empty() {
                        keywords.push(interpreted.to_lowercase());
                    }
                }
            }
        }
    }
    keywords
}

/// Manual keyword extraction: lowercase, split on whitespace, drop stop
/// words and single-character tokens.
pub(crate) fn fallback_keywords(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .filter(|word| word.len() > 1 && !STOP_WORDS.contains(word))
        .map(str::to_string)
        .collect()
}

/// One `match` clause per keyword against `labels`, any single match
/// qualifies, capped result page.
pub(crate) fn build_search_query(keywords: &[String]) -> Value {
    let should: Vec<Value> = keywords
        .iter()
        .map(|keyword| json!({ "match": { "labels": keyword } }))
        .collect();
    json!({
        "query": {
            "bool": {
                "should": should,
                "minimum_should_match": 1
            }
        },
        "size": MAX_RESULTS
    })
}

fn photo_results(response: SearchResponse, default_bucket: &str) -> Vec<PhotoResult> {
    response
        .hits
        .hits
        .into_iter()
        .filter_map(|hit| {
            let source = hit.source;
            let object_key = source.object_key.filter(|key| !key.is_empty())?;
            let bucket = source
                .bucket
                .unwrap_or_else(|| default_bucket.to_string());
            Some(PhotoResult {
                url: format!("https://{}.s3.amazonaws.com/{}", bucket, object_key),
                labels: source.labels,
                object_key,
                bucket,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::search::{HitSource, SearchHit, SearchHits};

    #[test]
    fn fallback_strips_stop_words_and_short_tokens() {
        assert_eq!(fallback_keywords("show me cat photos"), vec!["cat"]);
        assert_eq!(fallback_keywords("Find DOGS and a cat"), vec!["dogs", "cat"]);
        assert!(fallback_keywords("show me the photos").is_empty());
        assert!(fallback_keywords("").is_empty());
    }

    #[test]
    fn slot_extraction_handles_scalar_list_and_null_slots() {
        let response: RecognizeTextResponse = serde_json::from_str(
            r#"{"sessionState":{"intent":{"name":"SearchPhotos","slots":{
                "Keyword":{"value":{"interpretedValue":"Cat"}},
                "More":{"values":[
                    {"value":{"interpretedValue":"Dog"}},
                    {"value":{"originalValue":"x"}}
                ]},
                "Unfilled":null
            }}}}"#,
        )
        .unwrap();
        let mut keywords = keywords_from_slots(&response);
        keywords.sort();
        assert_eq!(keywords, vec!["cat", "dog"]);
    }

    #[test]
    fn slot_extraction_without_intent_yields_nothing() {
        let response: RecognizeTextResponse = serde_json::from_str(r#"{"sessionState":{}}"#).unwrap();
        assert!(keywords_from_slots(&response).is_empty());
    }

    #[test]
    fn query_matches_any_keyword_with_capped_size() {
        let query = build_search_query(&["cat".to_string(), "dog".to_string()]);
        assert_eq!(
            query,
            serde_json::json!({
                "query": {
                    "bool": {
                        "should": [
                            {"match": {"labels": "cat"}},
                            {"match": {"labels": "dog"}}
                        ],
                        "minimum_should_match": 1
                    }
                },
                "size": 50
            })
        );
    }

    fn hit(object_key: Option<&str>, bucket: Option<&str>, labels: &[&str]) -> SearchHit {
        SearchHit {
            source: HitSource {
                object_key: object_key.map(str::to_string),
                bucket: bucket.map(str::to_string),
                labels: labels.iter().map(|l| l.to_string()).collect(),
            },
        }
    }

    #[test]
    fn hits_map_to_public_urls() {
        let response = SearchResponse {
            hits: SearchHits {
                hits: vec![
                    hit(Some("x.jpg"), Some("b"), &["cat"]),
                    hit(Some("y.jpg"), Some("b"), &[]),
                ],
            },
        };
        let results = photo_results(response, "fallback");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].url, "https://b.s3.amazonaws.com/x.jpg");
        assert_eq!(results[1].url, "https://b.s3.amazonaws.com/y.jpg");
        assert_eq!(results[0].labels, vec!["cat"]);
    }

    #[test]
    fn keyless_hits_are_skipped_and_missing_buckets_fall_back() {
        let response = SearchResponse {
            hits: SearchHits {
                hits: vec![
                    hit(None, Some("b"), &[]),
                    hit(Some(""), Some("b"), &[]),
                    hit(Some("z.jpg"), None, &["dog"]),
                ],
            },
        };
        let results = photo_results(response, "album");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].url, "https://album.s3.amazonaws.com/z.jpg");
        assert_eq!(results[0].bucket, "album");
    }
}
