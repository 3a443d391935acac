use serde::Deserialize;
use serde_json::Value;

use super::ai_service::{ChatRequest, CompletionError, CompletionService};

pub const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
const FALLBACK_ERROR: &str = "Falha ao gerar a dieta.";

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Debug, Deserialize)]
struct MessageContent {
    content: String,
}

pub struct OpenRouterService {
    api_key: String,
    api_url: String,
    referer: Option<String>,
    title: Option<String>,
    client: reqwest::Client,
}

impl OpenRouterService {
    pub fn new(api_key: String, api_url: String) -> Self {
        Self {
            api_key,
            api_url,
            referer: None,
            title: None,
            client: reqwest::Client::new(),
        }
    }

    /// OpenRouter attribution headers (`HTTP-Referer`, `X-Title`), both optional.
    pub fn with_attribution(mut self, referer: Option<String>, title: Option<String>) -> Self {
        self.referer = referer;
        self.title = title;
        self
    }
}

#[async_trait::async_trait]
impl CompletionService for OpenRouterService {
    async fn complete(&self, request: &ChatRequest) -> Result<String, CompletionError> {
        log::info!("🤖 Sending request to OpenRouter with model: {}", request.model);
        if let Ok(payload) = serde_json::to_string(request) {
            log::debug!("📤 Request payload size: {} bytes", payload.len());
        }

        let mut builder = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json");
        if let Some(referer) = &self.referer {
            builder = builder.header("HTTP-Referer", referer);
        }
        if let Some(title) = &self.title {
            builder = builder.header("X-Title", title);
        }

        let response = builder
            .json(request)
            .send()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        let status = response.status();
        log::debug!("📥 OpenRouter response status: {}", status);

        let body = response
            .text()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        if !status.is_success() {
            log::error!("❌ OpenRouter API error ({}): {}", status, body);
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message: extract_error_message(&body),
            });
        }

        log::debug!("📄 Raw OpenRouter response size: {} bytes", body.len());
        let content = parse_completion(&body)?;
        log::info!("✅ Received completion ({} chars)", content.len());
        Ok(content)
    }
}

/// First choice's message content from a success body.
fn parse_completion(body: &str) -> Result<String, CompletionError> {
    let chat_response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| CompletionError::MalformedResponse(e.to_string()))?;

    chat_response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| CompletionError::MalformedResponse("response has no choices".to_string()))
}

/// Pulls a human readable message out of an error body.
///
/// OpenRouter sends `{"error": {"message": ..}}`; some proxies send
/// `{"error": "..."}`. Non-JSON bodies are returned as-is.
fn extract_error_message(body: &str) -> String {
    let message = match serde_json::from_str::<Value>(body) {
        Ok(json) => match json.get("error") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Object(obj)) => obj
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| Value::Object(obj.clone()).to_string()),
            _ => String::new(),
        },
        Err(_) => body.to_string(),
    };

    let message = message.trim();
    if message.is_empty() {
        FALLBACK_ERROR.to_string()
    } else {
        message.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_completion() {
        let body = r#"{
            "id": "gen-1",
            "choices": [
                {"message": {"role": "assistant", "content": "  **Sugestão de Dieta:** ovos  \n"}},
                {"message": {"role": "assistant", "content": "second"}}
            ]
        }"#;

        let content = parse_completion(body).unwrap();
        assert_eq!(content, "  **Sugestão de Dieta:** ovos  \n");
    }

    #[test]
    fn test_parse_completion_without_choices() {
        let err = parse_completion(r#"{"choices": []}"#).unwrap_err();
        assert!(matches!(err, CompletionError::MalformedResponse(_)));

        let err = parse_completion("<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, CompletionError::MalformedResponse(_)));
    }

    #[test]
    fn test_extract_error_message_object() {
        let body = r#"{"error": {"message": "Invalid API key", "code": 401}}"#;
        assert_eq!(extract_error_message(body), "Invalid API key");
    }

    #[test]
    fn test_extract_error_message_string() {
        assert_eq!(extract_error_message(r#"{"error": "quota exceeded"}"#), "quota exceeded");
    }

    #[test]
    fn test_extract_error_message_object_without_message() {
        let message = extract_error_message(r#"{"error": {"code": 429}}"#);
        assert!(message.contains("429"));
    }

    #[test]
    fn test_extract_error_message_fallbacks() {
        assert_eq!(extract_error_message("upstream timeout"), "upstream timeout");
        assert_eq!(extract_error_message(""), FALLBACK_ERROR);
        assert_eq!(extract_error_message(r#"{"detail": "x"}"#), FALLBACK_ERROR);
    }

    mod http {
        use super::super::*;
        use crate::models::IngredientList;
        use crate::services::prompt::{build_diet_request, CompletionSettings};
        use serde_json::json;
        use wiremock::matchers::{body_partial_json, header, header_exists, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        const COMPLETIONS_PATH: &str = "/api/v1/chat/completions";

        fn diet_request() -> ChatRequest {
            let ingredients: IngredientList = ["ovo", "arroz"].into_iter().collect();
            build_diet_request(&CompletionSettings::default(), &ingredients, 2069)
        }

        fn service(server: &MockServer) -> OpenRouterService {
            OpenRouterService::new(
                "sk-test".to_string(),
                format!("{}{}", server.uri(), COMPLETIONS_PATH),
            )
        }

        #[tokio::test]
        async fn test_complete_sends_credentials_and_attribution() {
            let mock_server = MockServer::start().await;

            Mock::given(method("POST"))
                .and(path(COMPLETIONS_PATH))
                .and(header("authorization", "Bearer sk-test"))
                .and(header("content-type", "application/json"))
                .and(header("http-referer", "https://example.org/dieta"))
                .and(header("x-title", "Dieta Generator"))
                .and(body_partial_json(json!({
                    "model": "gpt-3.5-turbo",
                    "max_tokens": 500
                })))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "id": "gen-123",
                    "choices": [{"message": {"role": "assistant", "content": "  Dieta pronta \n"}}]
                })))
                .expect(1)
                .mount(&mock_server)
                .await;

            let content = service(&mock_server)
                .with_attribution(
                    Some("https://example.org/dieta".to_string()),
                    Some("Dieta Generator".to_string()),
                )
                .complete(&diet_request())
                .await
                .unwrap();

            assert_eq!(content, "  Dieta pronta \n");
        }

        #[tokio::test]
        async fn test_complete_omits_unset_attribution() {
            let mock_server = MockServer::start().await;

            Mock::given(header_exists("http-referer"))
                .respond_with(ResponseTemplate::new(500))
                .expect(0)
                .mount(&mock_server)
                .await;
            Mock::given(header_exists("x-title"))
                .respond_with(ResponseTemplate::new(500))
                .expect(0)
                .mount(&mock_server)
                .await;
            Mock::given(method("POST"))
                .and(path(COMPLETIONS_PATH))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "choices": [{"message": {"content": "ok"}}]
                })))
                .expect(1)
                .mount(&mock_server)
                .await;

            let content = service(&mock_server).complete(&diet_request()).await.unwrap();
            assert_eq!(content, "ok");
        }

        #[tokio::test]
        async fn test_error_status_maps_to_api_error() {
            let mock_server = MockServer::start().await;

            Mock::given(method("POST"))
                .and(path(COMPLETIONS_PATH))
                .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                    "error": {"message": "No auth credentials found", "code": 401}
                })))
                .mount(&mock_server)
                .await;

            let err = service(&mock_server).complete(&diet_request()).await.unwrap_err();
            match err {
                CompletionError::Api { status, message } => {
                    assert_eq!(status, 401);
                    assert_eq!(message, "No auth credentials found");
                }
                other => panic!("expected Api error, got {:?}", other),
            }
        }

        #[tokio::test]
        async fn test_unparsable_success_body_is_malformed() {
            let mock_server = MockServer::start().await;

            Mock::given(method("POST"))
                .and(path(COMPLETIONS_PATH))
                .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
                .mount(&mock_server)
                .await;

            let err = service(&mock_server).complete(&diet_request()).await.unwrap_err();
            assert!(matches!(err, CompletionError::MalformedResponse(_)));
        }

        #[tokio::test]
        async fn test_unreachable_host_is_transport_error() {
            // grab a free port, then close it so nothing is listening
            let addr = std::net::TcpListener::bind("127.0.0.1:0")
                .unwrap()
                .local_addr()
                .unwrap();
            let service = OpenRouterService::new(
                "sk-test".to_string(),
                format!("http://{}{}", addr, COMPLETIONS_PATH),
            );

            let err = service.complete(&diet_request()).await.unwrap_err();
            assert!(matches!(err, CompletionError::Transport(_)));
        }
    }

    #[test]
    fn test_attribution_headers_are_optional() {
        let service = OpenRouterService::new("test_key".to_string(), DEFAULT_API_URL.to_string())
            .with_attribution(None, Some("Dieta Generator".to_string()));

        assert!(service.referer.is_none());
        assert_eq!(service.title.as_deref(), Some("Dieta Generator"));
    }
}
