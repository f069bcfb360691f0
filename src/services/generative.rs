use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// System message sent with every completion request
const SYSTEM_PROMPT: &str = "あなたは日本酒の専門家です。ユーザーの好みに基づいて、最適な日本酒をレコメンドしてください。回答は必ずJSON形式で返してください。";

/// Errors that can occur when calling the generative ranking service
#[derive(Debug, Error)]
pub enum GenerativeError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Completion request timed out after {0:?}")]
    Timeout(Duration),
}

/// Produces text completions for a prompt
#[async_trait]
pub trait GenerativeService: Send + Sync {
    /// Complete `prompt`. With `json_mode` the service is asked to answer with
    /// a single JSON object; the returned text is still unvalidated.
    async fn complete(&self, prompt: &str, json_mode: bool) -> Result<String, GenerativeError>;
}

/// OpenAI-compatible `/chat/completions` client
pub struct OpenAiChatClient {
    base_url: String,
    path: String,
    api_key: String,
    model: String,
    temperature: f32,
    client: Client,
}

impl OpenAiChatClient {
    /// Create a new chat-completion client
    pub fn new(
        base_url: String,
        path: String,
        api_key: String,
        model: String,
        temperature: f32,
        timeout: Duration,
    ) -> Result<Self, GenerativeError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            path,
            api_key,
            model,
            temperature,
            client,
        })
    }

    fn request_body(&self, prompt: &str, json_mode: bool) -> Value {
        let mut body = serde_json::json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt },
            ],
        });

        if json_mode {
            if let Some(obj) = body.as_object_mut() {
                obj.insert(
                    "response_format".to_string(),
                    serde_json::json!({ "type": "json_object" }),
                );
            }
        }

        body
    }
}

#[async_trait]
impl GenerativeService for OpenAiChatClient {
    async fn complete(&self, prompt: &str, json_mode: bool) -> Result<String, GenerativeError> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), self.path);

        tracing::debug!("Requesting completion from: {} (model: {})", url, self.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(prompt, json_mode))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::warn!("Chat completion failed: {} - {}", status, body);
            return Err(GenerativeError::ApiError(format!(
                "Failed to create completion: {}",
                status
            )));
        }

        let json: Value = response.json().await?;

        parse_completion_content(&json)
    }
}

/// Extract `choices[0].message.content` from a chat-completion response
fn parse_completion_content(json: &Value) -> Result<String, GenerativeError> {
    json.get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|msg| msg.get("content"))
        .and_then(|c| c.as_str())
        .map(str::to_string)
        .ok_or_else(|| GenerativeError::InvalidResponse("Missing choices[0].message.content".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_client(base_url: String) -> OpenAiChatClient {
        OpenAiChatClient::new(
            base_url,
            "/chat/completions".to_string(),
            "test_key".to_string(),
            "gpt-4o-mini".to_string(),
            0.7,
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_parse_completion_content() {
        let json = serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": "{\"recommendations\": []}" } }]
        });

        assert_eq!(parse_completion_content(&json).unwrap(), "{\"recommendations\": []}");
    }

    #[test]
    fn test_parse_completion_missing_choices() {
        let json = serde_json::json!({ "error": { "message": "quota" } });
        assert!(matches!(
            parse_completion_content(&json),
            Err(GenerativeError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_request_body_json_mode() {
        let client = create_client("http://localhost".to_string());

        let body = client.request_body("hello", true);
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["messages"][1]["content"], "hello");

        let body = client.request_body("hello", false);
        assert!(body.get("response_format").is_none());
    }

    #[tokio::test]
    async fn test_complete_against_mock_server() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test_key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"content":"{\"recommendations\":[]}"}}]}"#)
            .create_async()
            .await;

        let client = create_client(server.url());

        let text = client.complete("prompt", true).await.unwrap();
        assert_eq!(text, r#"{"recommendations":[]}"#);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_complete_maps_http_errors() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_body("rate limited")
            .create_async()
            .await;

        let client = create_client(server.url());

        assert!(matches!(
            client.complete("prompt", true).await,
            Err(GenerativeError::ApiError(_))
        ));
    }
}
