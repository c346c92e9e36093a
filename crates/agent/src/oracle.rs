use std::sync::Arc;

use async_trait::async_trait;
use kiosk_core::config::{OracleConfig, OracleProvider};
use kiosk_core::recommendations::{OracleReply, SuggestionOracle};
use tracing::{debug, info, warn};

use crate::gemini::{GeminiClient, GeminiError};
use crate::llm::LlmClient;
use crate::reply::parse_reply;

/// Oracle backed by any [`LlmClient`]. Client errors and unparsable replies
/// are logged and reported as [`OracleReply::Empty`].
pub struct LlmSuggestionOracle {
    client: Arc<dyn LlmClient>,
}

impl LlmSuggestionOracle {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SuggestionOracle for LlmSuggestionOracle {
    async fn suggest(&self, prompt: &str) -> OracleReply {
        let text = match self.client.complete(prompt).await {
            Ok(text) => text,
            Err(error) => {
                warn!(
                    event_name = "oracle.request.failed",
                    error = %error,
                    "suggestion oracle call failed; continuing without ai picks"
                );
                return OracleReply::Empty;
            }
        };

        let reply = parse_reply(&text);
        match &reply {
            OracleReply::Parsed(suggestions) => debug!(
                event_name = "oracle.reply.parsed",
                suggestions = suggestions.len(),
                "oracle reply parsed"
            ),
            OracleReply::Empty => warn!(
                event_name = "oracle.reply.unparsable",
                reply_chars = text.len(),
                "oracle reply held no json array; continuing without ai picks"
            ),
        }
        reply
    }
}

/// Oracle used when no provider is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledOracle;

#[async_trait]
impl SuggestionOracle for DisabledOracle {
    async fn suggest(&self, _prompt: &str) -> OracleReply {
        OracleReply::Empty
    }
}

pub fn build_oracle(config: &OracleConfig) -> Result<Arc<dyn SuggestionOracle>, GeminiError> {
    match config.provider {
        OracleProvider::Disabled => {
            info!(event_name = "oracle.disabled", "suggestion oracle disabled; trending only");
            Ok(Arc::new(DisabledOracle))
        }
        OracleProvider::Gemini => {
            let client = GeminiClient::from_config(config)?;
            info!(
                event_name = "oracle.configured",
                provider = "gemini",
                model = client.model(),
                timeout_secs = config.timeout_secs,
                "suggestion oracle configured"
            );
            Ok(Arc::new(LlmSuggestionOracle::new(Arc::new(client))))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use anyhow::anyhow;
    use kiosk_core::recommendations::OracleSuggestion;
    use secrecy::SecretString;
    use serde_json::json;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    struct ScriptedClient {
        reply: Option<String>,
        calls: AtomicU32,
    }

    impl ScriptedClient {
        fn replying(text: &str) -> Self {
            Self { reply: Some(text.to_string()), calls: AtomicU32::new(0) }
        }

        fn failing() -> Self {
            Self { reply: None, calls: AtomicU32::new(0) }
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedClient {
        async fn complete(&self, _prompt: &str) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone().ok_or_else(|| anyhow!("connection refused"))
        }
    }

    fn gemini_config(base_url: String) -> OracleConfig {
        OracleConfig {
            provider: OracleProvider::Gemini,
            api_key: Some(SecretString::from("test-key".to_string())),
            base_url,
            model: "gemini-1.5-pro".to_string(),
            timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn client_failure_is_swallowed() {
        let client = Arc::new(ScriptedClient::failing());
        let oracle = LlmSuggestionOracle::new(client.clone());

        assert_eq!(oracle.suggest("prompt").await, OracleReply::Empty);
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn prose_reply_is_parsed() {
        let oracle = LlmSuggestionOracle::new(Arc::new(ScriptedClient::replying(
            r#"Sure! [{"name":"Coffee","reason":"morning staple"}]"#,
        )));

        assert_eq!(
            oracle.suggest("prompt").await,
            OracleReply::Parsed(vec![OracleSuggestion::new("Coffee", "morning staple")])
        );
    }

    #[tokio::test]
    async fn disabled_provider_never_suggests() {
        let config = OracleConfig {
            provider: OracleProvider::Disabled,
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-1.5-pro".to_string(),
            timeout_secs: 30,
        };

        let oracle = build_oracle(&config).unwrap();

        assert_eq!(oracle.suggest("prompt").await, OracleReply::Empty);
    }

    #[tokio::test]
    async fn gemini_provider_round_trips_through_http() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{
                    "text": "Here are picks: [{\"name\":\"p3\",\"reason\":\"popular\"}] enjoy"
                }]}}]
            })))
            .mount(&server)
            .await;

        let oracle = build_oracle(&gemini_config(server.uri())).unwrap();

        assert_eq!(
            oracle.suggest("prompt").await,
            OracleReply::Parsed(vec![OracleSuggestion::new("p3", "popular")])
        );
    }

    #[tokio::test]
    async fn gemini_server_error_degrades_to_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let oracle = build_oracle(&gemini_config(server.uri())).unwrap();

        assert_eq!(oracle.suggest("prompt").await, OracleReply::Empty);
    }

    #[tokio::test]
    async fn unreachable_gemini_degrades_to_empty() {
        let oracle = build_oracle(&gemini_config("http://127.0.0.1:9".to_string())).unwrap();

        assert_eq!(oracle.suggest("prompt").await, OracleReply::Empty);
    }
}
