//! src/services/intent_client.rs
//!
//! IntentClient — calls the intent-recognition runtime (Lex V2) through
//! the signed-request client and decodes the slot structure the query
//! pipeline mines for keywords. Each call uses a fresh session id; the
//! service is stateless from our side.

use crate::config::LexBot;
use crate::models::intent::RecognizeTextResponse;
use crate::services::signed_client::{SignedClient, SignedClientError};
use http::Method;
use serde_json::json;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

const SIGNING_SERVICE: &str = "lex";
const LOCALE_ID: &str = "en_US";

#[derive(Debug, Error)]
pub enum IntentError {
    #[error(transparent)]
    Client(#[from] SignedClientError),
    #[error("could not decode intent response: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type IntentResult<T> = Result<T, IntentError>;

#[derive(Clone)]
pub struct IntentClient {
    client: SignedClient,

    /// Runtime endpoint base URL, no trailing slash.
    endpoint: String,

    bot: LexBot,
}

impl IntentClient {
    pub fn new(client: SignedClient, endpoint: impl Into<String>, bot: LexBot) -> Self {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Self { client, endpoint, bot }
    }

    /// Recognize free text against the configured bot, returning the raw
    /// session state for slot extraction.
    pub async fn recognize(&self, text: &str) -> IntentResult<RecognizeTextResponse> {
        let session_id = format!("user-session-{}", Uuid::new_v4());
        let url = format!(
            "{}/bots/{}/botAliases/{}/botLocales/{}/sessions/{}/text",
            self.endpoint, self.bot.bot_id, self.bot.bot_alias_id, LOCALE_ID, session_id
        );
        let body = serde_json::to_vec(&json!({ "text": text }))?;
        let response = self.client.request(SIGNING_SERVICE, Method::POST, &url, Some(body)).await?;
        debug!("intent response for {:?}: {}", text, response);
        Ok(serde_json::from_str(&response)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_credential_types::provider::SharedCredentialsProvider;
    use aws_credential_types::Credentials;
    use wiremock::matchers::{body_string_contains, method, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn posts_text_to_bot_session_and_decodes_slots() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(
                r"^/bots/B123/botAliases/A456/botLocales/en_US/sessions/user-session-[0-9a-f-]+/text$",
            ))
            .and(body_string_contains(r#""text":"show me cats""#))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "sessionState": {
                    "intent": {
                        "name": "SearchPhotos",
                        "slots": {
                            "Keyword": {"value": {"interpretedValue": "Cat"}}
                        }
                    }
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let credentials = Credentials::new("AKIDEXAMPLE", "wJalrXUt", None, None, "tests");
        let client = IntentClient::new(
            SignedClient::new("us-east-1", SharedCredentialsProvider::new(credentials)),
            server.uri(),
            LexBot {
                bot_id: "B123".into(),
                bot_alias_id: "A456".into(),
            },
        );

        let response = client.recognize("show me cats").await.unwrap();
        let intent = response.session_state.intent.unwrap();
        assert_eq!(intent.name.as_deref(), Some("SearchPhotos"));
        let slot = intent.slots["Keyword"].as_ref().unwrap();
        assert_eq!(
            slot.value.as_ref().unwrap().interpreted_value.as_deref(),
            Some("Cat")
        );
    }
}
