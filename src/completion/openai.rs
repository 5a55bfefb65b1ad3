// Copyright 2026 Muvon Un Limited
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use super::{CompletionError, CompletionProvider, CompletionRequest};
use crate::config::CompletionConfig;

const SNIPPET_CHARS: usize = 300;

/// Chat completions client for OpenAI-compatible endpoints
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    url_chat: String,
}

impl OpenAiProvider {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        endpoint: &str,
        timeout: Duration,
    ) -> Result<Self, CompletionError> {
        let endpoint = endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(CompletionError::InvalidEndpoint(endpoint.to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("patent-qa/0.1")
            .build()?;

        let url_chat = format!("{}/v1/chat/completions", endpoint.trim_end_matches('/'));
        let model = model.into();

        info!(model = %model, url = %url_chat, "Completion provider initialized");

        Ok(Self {
            client,
            api_key: api_key.into(),
            model,
            url_chat,
        })
    }

    /// Read the API key from the environment variable named in config
    pub fn from_config(config: &CompletionConfig) -> Result<Self, CompletionError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| CompletionError::MissingApiKey {
                env: config.api_key_env.clone(),
            })?;

        Self::new(
            api_key,
            config.model.clone(),
            &config.endpoint,
            Duration::from_secs(config.timeout_secs),
        )
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let started = Instant::now();
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        debug!(
            model = %self.model,
            prompt_len = request.prompt.len(),
            max_tokens = request.max_tokens,
            "POST {}", self.url_chat
        );

        let response = self
            .client
            .post(&self.url_chat)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            let snippet: String = text.chars().take(SNIPPET_CHARS).collect();

            error!(
                %status,
                %snippet,
                model = %self.model,
                latency_ms = started.elapsed().as_millis(),
                "Chat completion returned non-success status"
            );

            return Err(CompletionError::HttpStatus {
                status: status.as_u16(),
                snippet,
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| {
                CompletionError::Decode(format!("{e}; expected choices[0].message.content"))
            })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(CompletionError::EmptyChoices)?;

        debug!(
            model = %self.model,
            latency_ms = started.elapsed().as_millis(),
            output_len = content.len(),
            "Chat completion finished"
        );

        Ok(content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_http_endpoint() {
        let result = OpenAiProvider::new(
            "key",
            "gpt-4o-mini",
            "ftp://example.com",
            Duration::from_secs(5),
        );
        assert!(matches!(result, Err(CompletionError::InvalidEndpoint(_))));
    }

    #[test]
    fn test_chat_url_is_built_from_endpoint() {
        let provider = OpenAiProvider::new(
            "key",
            "gpt-4o-mini",
            "http://localhost:8080/",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(provider.url_chat, "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn test_missing_api_key_env() {
        let config = CompletionConfig {
            api_key_env: "PATENT_QA_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..CompletionConfig::default()
        };
        assert!(matches!(
            OpenAiProvider::from_config(&config),
            Err(CompletionError::MissingApiKey { .. })
        ));
    }

    #[test]
    fn test_request_body_shape() {
        let body = ChatCompletionRequest {
            model: "gpt-4o-mini",
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "sys",
                },
                ChatMessage {
                    role: "user",
                    content: "hi",
                },
            ],
            max_tokens: 400,
            temperature: 0.3,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hi");
        assert_eq!(json["max_tokens"], 400);
    }

    #[test]
    fn test_response_without_content_decodes() {
        let parsed: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant"}}]}"#).unwrap();
        assert!(parsed.choices[0].message.content.is_none());
    }
}
