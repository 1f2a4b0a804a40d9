//! Wire shapes of the search index `_search` response, and the per-hit
//! record returned to callers.

use serde::{Deserialize, Serialize};

/// `_search` response envelope. Defaults are lenient so a partial or
/// unexpected response deserializes to "no hits" rather than failing.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub hits: SearchHits,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct SearchHits {
    #[serde(default)]
    pub hits: Vec<SearchHit>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "_source", default)]
    pub source: HitSource,
}

/// The indexed document as it comes back in a hit. Every field is
/// optional-or-defaulted; hits without an object key are dropped later.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HitSource {
    #[serde(default)]
    pub object_key: Option<String>,

    #[serde(default)]
    pub bucket: Option<String>,

    #[serde(default)]
    pub labels: Vec<String>,
}

/// One photo in a query response. Derived per hit, never persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoResult {
    /// Public object URL, `https://{bucket}.s3.amazonaws.com/{key}`.
    pub url: String,

    pub labels: Vec<String>,

    pub object_key: String,

    pub bucket: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenient_deserialization_of_partial_hits() {
        let response: SearchResponse = serde_json::from_str(
            r#"{"took":3,"hits":{"total":{"value":2},"hits":[
                {"_index":"photos","_source":{"objectKey":"x.jpg","bucket":"b","labels":["cat"]}},
                {"_source":{}}
            ]}}"#,
        )
        .unwrap();
        assert_eq!(response.hits.hits.len(), 2);
        assert_eq!(response.hits.hits[0].source.object_key.as_deref(), Some("x.jpg"));
        assert!(response.hits.hits[1].source.object_key.is_none());
        assert!(response.hits.hits[1].source.labels.is_empty());
    }

    #[test]
    fn empty_body_means_no_hits() {
        let response: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(response.hits.hits.is_empty());
    }
}
