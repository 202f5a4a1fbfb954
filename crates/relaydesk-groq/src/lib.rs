// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Groq text generator for Relaydesk.
//!
//! Implements [`TextGenerator`] over Groq's OpenAI-compatible chat
//! completions API, including function calling for the support agent's
//! tools.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::SecretString;
use tracing::debug;

use relaydesk_config::model::GroqConfig;
use relaydesk_core::traits::generator::{
    ChatMessage, GenerationRequest, GenerationResponse, ToolCall,
};
use relaydesk_core::{AdapterType, HealthStatus, PluginAdapter, RelaydeskError, TextGenerator};

use crate::client::GroqClient;
use crate::types::{
    ApiFunction, ApiFunctionCall, ApiMessage, ApiTool, ApiToolCall, ChatCompletionRequest,
    ChatCompletionResponse,
};

/// Environment variable consulted when `groq.api_key` is unset.
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

pub struct GroqGenerator {
    client: GroqClient,
    model: String,
    max_tokens: u32,
}

impl GroqGenerator {
    /// Builds a generator, or `None` when no API key is configured.
    ///
    /// Key resolution: `groq.api_key`, then `GROQ_API_KEY`.
    pub fn from_config(config: &GroqConfig) -> Result<Option<Self>, RelaydeskError> {
        let key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok().filter(|k| !k.trim().is_empty()));
        match key {
            Some(key) => Self::new(SecretString::from(key), config).map(Some),
            None => Ok(None),
        }
    }

    pub fn new(api_key: SecretString, config: &GroqConfig) -> Result<Self, RelaydeskError> {
        let client = GroqClient::new(
            api_key,
            &config.base_url,
            Duration::from_secs(config.timeout_secs),
        )?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: GroqClient, config: &GroqConfig) -> Self {
        Self {
            client,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn to_api_request(&self, request: GenerationRequest) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        messages.push(ApiMessage::text("system", request.system));
        messages.extend(request.messages.into_iter().map(to_api_message));

        ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            tools: request
                .tools
                .into_iter()
                .map(|t| ApiTool {
                    kind: "function",
                    function: ApiFunction {
                        name: t.name,
                        description: t.description,
                        parameters: t.input_schema,
                    },
                })
                .collect(),
            max_tokens: Some(request.max_tokens.unwrap_or(self.max_tokens)),
        }
    }
}

fn to_api_message(message: ChatMessage) -> ApiMessage {
    match message {
        ChatMessage::User { content } => ApiMessage::text("user", content),
        ChatMessage::Assistant {
            content,
            tool_calls,
        } => ApiMessage {
            role: "assistant".to_string(),
            content,
            tool_calls: tool_calls
                .into_iter()
                .map(|c| ApiToolCall {
                    id: c.id,
                    kind: "function".to_string(),
                    function: ApiFunctionCall {
                        name: c.name,
                        arguments: c.arguments.to_string(),
                    },
                })
                .collect(),
            tool_call_id: None,
        },
        ChatMessage::Tool { call_id, content } => ApiMessage {
            role: "tool".to_string(),
            content: Some(content),
            tool_calls: Vec::new(),
            tool_call_id: Some(call_id),
        },
    }
}

fn from_api_response(response: ChatCompletionResponse) -> Result<GenerationResponse, RelaydeskError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| RelaydeskError::generation("response contained no choices"))?;
    let tool_calls = choice
        .message
        .tool_calls
        .into_iter()
        .map(|c| ToolCall {
            id: c.id,
            name: c.function.name,
            arguments: if c.function.arguments.trim().is_empty() {
                serde_json::Value::Object(Default::default())
            } else {
                serde_json::from_str(&c.function.arguments)
                    .unwrap_or(serde_json::Value::String(c.function.arguments))
            },
        })
        .collect();
    Ok(GenerationResponse {
        text: choice.message.content.filter(|t| !t.trim().is_empty()),
        tool_calls,
    })
}

#[async_trait]
impl PluginAdapter for GroqGenerator {
    fn name(&self) -> &str {
        "groq"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Generator
    }

    async fn health_check(&self) -> Result<HealthStatus, RelaydeskError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RelaydeskError> {
        Ok(())
    }
}

#[async_trait]
impl TextGenerator for GroqGenerator {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, RelaydeskError> {
        let api_request = self.to_api_request(request);
        let response = self.client.complete(&api_request).await?;
        if let Some(usage) = response.usage {
            debug!(
                model = %self.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "generation complete"
            );
        }
        from_api_response(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relaydesk_core::traits::generator::ToolDefinition;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: &str) -> GroqConfig {
        GroqConfig {
            base_url: base_url.to_string(),
            ..GroqConfig::default()
        }
    }

    fn generator(base_url: &str) -> GroqGenerator {
        GroqGenerator::new(SecretString::from("gsk-test".to_string()), &config(base_url)).unwrap()
    }

    fn request_with_tool() -> GenerationRequest {
        GenerationRequest {
            system: "Be helpful.".into(),
            messages: vec![
                ChatMessage::user("How do refunds work?"),
                ChatMessage::Assistant {
                    content: None,
                    tool_calls: vec![ToolCall {
                        id: "call_1".into(),
                        name: "search_knowledge".into(),
                        arguments: serde_json::json!({"query": "refunds"}),
                    }],
                },
                ChatMessage::Tool {
                    call_id: "call_1".into(),
                    content: "Refunds take 5 days.".into(),
                },
            ],
            tools: vec![ToolDefinition {
                name: "search_knowledge".into(),
                description: "Search".into(),
                input_schema: serde_json::json!({"type": "object"}),
            }],
            max_tokens: None,
        }
    }

    #[test]
    fn request_maps_roles_tools_and_defaults() {
        let generator = generator("http://localhost");
        let api = generator.to_api_request(request_with_tool());
        let json = serde_json::to_value(&api).unwrap();

        assert_eq!(json["model"], "moonshotai/kimi-k2-instruct-0905");
        assert_eq!(json["max_tokens"], 1024);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][2]["tool_calls"][0]["type"], "function");
        assert_eq!(
            json["messages"][2]["tool_calls"][0]["function"]["arguments"],
            "{\"query\":\"refunds\"}"
        );
        assert_eq!(json["messages"][3]["role"], "tool");
        assert_eq!(json["messages"][3]["tool_call_id"], "call_1");
        assert_eq!(json["tools"][0]["function"]["name"], "search_knowledge");
    }

    #[test]
    fn missing_key_means_no_generator() {
        if std::env::var(API_KEY_ENV).is_ok() {
            return;
        }
        assert!(GroqGenerator::from_config(&GroqConfig::default()).unwrap().is_none());
        let configured = GroqConfig {
            api_key: Some("gsk-live".into()),
            ..GroqConfig::default()
        };
        assert!(GroqGenerator::from_config(&configured).unwrap().is_some());
    }

    #[tokio::test]
    async fn tool_calls_are_decoded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "model": "moonshotai/kimi-k2-instruct-0905"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-2",
                "choices": [{
                    "index": 0,
                    "message": {
                        "role": "assistant",
                        "content": null,
                        "tool_calls": [{
                            "id": "call_9",
                            "type": "function",
                            "function": {"name": "resolve_conversation", "arguments": "{}"}
                        }]
                    },
                    "finish_reason": "tool_calls"
                }]
            })))
            .mount(&server)
            .await;

        let response = generator(&server.uri())
            .generate(request_with_tool())
            .await
            .unwrap();
        assert!(response.text.is_none());
        assert_eq!(response.tool_calls.len(), 1);
        assert_eq!(response.tool_calls[0].name, "resolve_conversation");
        assert_eq!(response.tool_calls[0].arguments, serde_json::json!({}));
    }

    #[tokio::test]
    async fn empty_choices_is_a_generation_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let err = generator(&server.uri())
            .generate(request_with_tool())
            .await
            .unwrap_err();
        assert!(matches!(err, RelaydeskError::GenerationFailed { .. }));
    }
}
