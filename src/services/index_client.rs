//! src/services/index_client.rs
//!
//! IndexClient — document writes and label searches against the `photos`
//! index, issued through the signed-request client. Error propagation is
//! the caller's concern: an index-write failure is fatal to ingestion
//! while a search failure degrades to an empty result.

use crate::models::document::PhotoDocument;
use crate::models::search::SearchResponse;
use crate::services::signed_client::{SignedClient, SignedClientError};
use http::Method;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

const INDEX_NAME: &str = "photos";
const SIGNING_SERVICE: &str = "es";

#[derive(Debug, Error)]
pub enum IndexError {
    #[error(transparent)]
    Client(#[from] SignedClientError),
    #[error("could not decode index response: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type IndexResult<T> = Result<T, IndexError>;

#[derive(Clone)]
pub struct IndexClient {
    client: SignedClient,

    /// Index endpoint base URL, no trailing slash.
    endpoint: String,
}

impl IndexClient {
    pub fn new(client: SignedClient, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Self { client, endpoint }
    }

    /// Upsert a photo document at its derived id. Replaces any existing
    /// document for the same object key (last writer wins).
    pub async fn put_document(&self, document: &PhotoDocument) -> IndexResult<()> {
        let url = format!("{}/{}/_doc/{}", self.endpoint, INDEX_NAME, document.doc_id());
        let body = serde_json::to_vec(document)?;
        let response = self.client.request(SIGNING_SERVICE, Method::PUT, &url, Some(body)).await?;
        debug!("index write response for {}: {}", document.doc_id(), response);
        Ok(())
    }

    /// Run a `_search` with the given query body and decode the hit
    /// envelope.
    pub async fn search(&self, query: &Value) -> IndexResult<SearchResponse> {
        let url = format!("{}/{}/_search", self.endpoint, INDEX_NAME);
        let body = serde_json::to_vec(query)?;
        let text = self.client.request(SIGNING_SERVICE, Method::POST, &url, Some(body)).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Readiness probe: a signed GET on the endpoint root.
    pub async fn ping(&self) -> IndexResult<()> {
        self.client.request(SIGNING_SERVICE, Method::GET, &self.endpoint, None).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_credential_types::provider::SharedCredentialsProvider;
    use aws_credential_types::Credentials;
    use chrono::Utc;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_index(endpoint: String) -> IndexClient {
        let credentials = Credentials::new("AKIDEXAMPLE", "wJalrXUt", None, None, "tests");
        let client = SignedClient::new("us-east-1", SharedCredentialsProvider::new(credentials));
        IndexClient::new(client, endpoint)
    }

    fn document(key: &str, labels: &[&str]) -> PhotoDocument {
        PhotoDocument {
            object_key: key.into(),
            bucket: "album".into(),
            created_timestamp: Utc::now(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn put_document_targets_derived_doc_id() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/photos/_doc/a_b_c.jpg"))
            .and(header_exists("authorization"))
            .and(body_string_contains(r#""labels":["cat","dog"]"#))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"result": "created"})))
            .expect(1)
            .mount(&server)
            .await;

        let index = test_index(server.uri());
        index.put_document(&document("a/b c.jpg", &["cat", "dog"])).await.unwrap();
    }

    #[tokio::test]
    async fn put_document_failure_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(500).set_body_string("mapper_parsing_exception"))
            .mount(&server)
            .await;

        let index = test_index(server.uri());
        let err = index.put_document(&document("x.jpg", &[])).await.unwrap_err();
        assert!(matches!(
            err,
            IndexError::Client(SignedClientError::Status { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn search_decodes_hits() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/photos/_search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "hits": {"hits": [
                    {"_source": {"objectKey": "x.jpg", "bucket": "b", "labels": ["cat"]}}
                ]}
            })))
            .mount(&server)
            .await;

        let index = test_index(server.uri());
        let response = index.search(&json!({"query": {"match_all": {}}})).await.unwrap();
        assert_eq!(response.hits.hits.len(), 1);
        assert_eq!(response.hits.hits[0].source.object_key.as_deref(), Some("x.jpg"));
    }
}
