use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::error::{LlmError, LlmResult};
use crate::profile::{is_gpt5_family, ModelProfile, TokenField, DEFAULT_TEMPERATURE, FIXED_TEMPERATURE};
use crate::request::ChatRequest;
use crate::types::*;

/// Returned verbatim when fake runs are enabled. Shaped so every structured
/// phase payload can be read from it.
pub const FAKE_RUN_RESPONSE: &str = r#"{"fake":true,"summary":"Fake run: no model was called.","routes":[{"name":"Fake Route","hook":"Win a weekend away","mechanic":"Buy any participating product and enter online","prize":"A weekend away","rationale":"Placeholder route for offline runs."}],"scores":[{"criterion":"overall","score":5,"comment":"Placeholder score."}],"overall":5,"verdict":"Placeholder verdict.","winner":"Fake Route","ranking":["Fake Route"],"risks":[],"recommendations":[]}"#;

/// Anything that can answer a chat request with text.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, request: ChatRequest) -> LlmResult<String>;

    /// True when replies are placeholders rather than model output.
    fn is_fake(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub api_key: String,
    pub base_url: String,
    pub fallback_model: String,
    pub fake_runs: bool,
    /// Log prompts and responses in full.
    pub trace: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".to_string(),
            fallback_model: "gpt-4o".to_string(),
            fake_runs: false,
            trace: false,
        }
    }
}

/// Client for an OpenAI-compatible chat-completion API.
#[derive(Clone)]
pub struct ChatGateway {
    client: Client,
    config: GatewayConfig,
}

impl ChatGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    fn build_body(&self, request: &ChatRequest) -> ChatCompletionRequest {
        let profile = ModelProfile::for_model(&request.model);

        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(system) = request.system.as_deref().filter(|s| !s.trim().is_empty()) {
            messages.push(ChatMessage::system(system));
        }
        messages.extend(request.messages.iter().cloned());

        let (temperature, top_p) = if profile.fixed_sampling {
            (Some(FIXED_TEMPERATURE), None)
        } else {
            (
                Some(request.temperature.unwrap_or(DEFAULT_TEMPERATURE)),
                request.top_p,
            )
        };

        let (max_tokens, max_completion_tokens) = match profile.token_field {
            TokenField::MaxTokens => (request.max_tokens, None),
            TokenField::MaxCompletionTokens => (None, request.max_tokens),
        };

        ChatCompletionRequest {
            model: request.model.clone(),
            messages,
            temperature,
            top_p,
            max_tokens,
            max_completion_tokens,
            response_format: request.json.then(ResponseFormat::json_object),
        }
    }

    /// One provider call. Errors are logged and returned, never retried.
    async fn send(&self, request: &ChatRequest) -> LlmResult<String> {
        let metadata = Value::Object(request.metadata.clone());
        let body = self.build_body(request);
        let started = Instant::now();

        info!(
            model = %request.model,
            json = request.json,
            messages = body.messages.len(),
            metadata = %metadata,
            "llm.request"
        );
        if self.config.trace {
            info!(model = %request.model, body = %serde_json::to_string(&body)?, "llm.request.trace");
        }

        match self.post(&body).await {
            Ok(text) => {
                let duration_ms = started.elapsed().as_millis() as u64;
                info!(
                    model = %request.model,
                    duration_ms,
                    chars = text.len(),
                    metadata = %metadata,
                    "llm.response"
                );
                if self.config.trace {
                    info!(model = %request.model, content = %text, "llm.response.trace");
                }
                Ok(text)
            }
            Err(err) => {
                let duration_ms = started.elapsed().as_millis() as u64;
                error!(
                    model = %request.model,
                    duration_ms,
                    metadata = %metadata,
                    error = %err,
                    "llm.error"
                );
                Err(err)
            }
        }
    }

    async fn post(&self, body: &ChatCompletionRequest) -> LlmResult<String> {
        if self.config.api_key.trim().is_empty() {
            return Err(LlmError::MissingApiKey);
        }

        let response = self
            .client
            .post(format!(
                "{}/chat/completions",
                self.config.base_url.trim_end_matches('/')
            ))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            if let Ok(error_resp) = serde_json::from_str::<ProviderError>(&error_text) {
                return Err(LlmError::Api {
                    message: error_resp.error.message,
                    status_code: Some(status.as_u16()),
                });
            }

            return Err(LlmError::Api {
                message: error_text,
                status_code: Some(status.as_u16()),
            });
        }

        let completion: ChatCompletionResponse = response.json().await?;
        if let Some(usage) = &completion.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "llm.usage"
            );
        }

        let choice = completion.choices.into_iter().next();
        let finish_reason = choice.as_ref().and_then(|c| c.finish_reason.clone());
        let text = choice
            .and_then(|choice| choice.message.content)
            .map(MessageContent::into_text)
            .unwrap_or_default()
            .trim()
            .to_string();

        if text.is_empty() {
            warn!(
                model = %body.model,
                finish_reason = finish_reason.as_deref().unwrap_or("none"),
                "llm.empty_response"
            );
        }
        Ok(text)
    }
}

#[async_trait]
impl ChatModel for ChatGateway {
    fn is_fake(&self) -> bool {
        self.config.fake_runs
    }

    async fn complete(&self, request: ChatRequest) -> LlmResult<String> {
        if self.config.fake_runs {
            debug!(model = %request.model, "Fake run, skipping provider call");
            return Ok(FAKE_RUN_RESPONSE.to_string());
        }

        let text = self.send(&request).await?;
        if !text.is_empty() || request.json || !is_gpt5_family(&request.model) {
            return Ok(text);
        }

        warn!(
            model = %request.model,
            fallback = %self.config.fallback_model,
            "Empty response, retrying once with fallback model"
        );
        let original = request.model.clone();
        let mut fallback = request;
        fallback.model = self.config.fallback_model.clone();
        fallback
            .metadata
            .insert("fallbackFrom".to_string(), Value::String(original));
        fallback.metadata.insert(
            "fallbackReason".to_string(),
            Value::String("empty_response".to_string()),
        );

        self.send(&fallback).await
    }
}
