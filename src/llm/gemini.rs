//! Gemini REST client — single-turn `generateContent` with function
//! declarations.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::LlmError;
use crate::llm::{ChatModel, FunctionCall, ModelTurn};
use crate::tools::ToolDefinition;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Bound on the model call. A slow call degrades to the apology reply
/// rather than holding the webhook worker; there is no retry.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// REST client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    api_key: SecretString,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_key: SecretString, model: impl Into<String>) -> Self {
        Self {
            api_key,
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Override the API base URL (tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn request_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url,
            self.model,
            self.api_key.expose_secret()
        )
    }

    fn request_body(user_text: &str, tools: &[ToolDefinition]) -> Value {
        let declarations: Vec<Value> = tools
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.name,
                    "description": tool.description,
                    "parameters": tool.parameters
                })
            })
            .collect();

        json!({
            "contents": [{"role": "user", "parts": [{"text": user_text}]}],
            "tools": [{"functionDeclarations": declarations}]
        })
    }
}

#[async_trait]
impl ChatModel for GeminiClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        user_text: &str,
        tools: &[ToolDefinition],
    ) -> Result<ModelTurn, LlmError> {
        let body = Self::request_body(user_text, tools);

        let resp = self
            .client
            .post(self.request_url())
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed {
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        Ok(resolve_turn(parsed))
    }
}

// ── Response wire types ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
    #[serde(rename = "functionCall")]
    function_call: Option<FunctionCallPart>,
}

#[derive(Debug, Deserialize)]
struct FunctionCallPart {
    name: String,
    #[serde(default)]
    args: Value,
}

/// Resolve the wire response into a turn.
///
/// Only the first part of the first candidate is inspected (the model
/// yields at most one actionable directive per turn under this contract),
/// and a function call wins over text carried in the same part.
fn resolve_turn(response: GenerateContentResponse) -> ModelTurn {
    let part = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().next());

    let Some(part) = part else {
        return ModelTurn::Empty;
    };

    if let Some(call) = part.function_call {
        return ModelTurn::FunctionCall(FunctionCall {
            name: call.name,
            args: call.args,
        });
    }

    match part.text {
        Some(text) if !text.is_empty() => ModelTurn::Text(text),
        _ => ModelTurn::Empty,
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> GenerateContentResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn resolve_plain_text() {
        let turn = resolve_turn(parse(json!({
            "candidates": [{"content": {"parts": [{"text": "你好"}]}}]
        })));
        assert_eq!(turn, ModelTurn::Text("你好".to_string()));
    }

    #[test]
    fn resolve_function_call() {
        let turn = resolve_turn(parse(json!({
            "candidates": [{"content": {"parts": [{
                "functionCall": {"name": "get_activity_card", "args": {"activity_name": "馬拉松"}}
            }]}}]
        })));
        let ModelTurn::FunctionCall(call) = turn else {
            panic!("expected a function call");
        };
        assert_eq!(call.name, "get_activity_card");
        assert_eq!(call.args["activity_name"], "馬拉松");
    }

    #[test]
    fn function_call_wins_over_text_in_the_same_part() {
        let turn = resolve_turn(parse(json!({
            "candidates": [{"content": {"parts": [{
                "text": "我來查詢",
                "functionCall": {"name": "get_recent_activities", "args": {}}
            }]}}]
        })));
        assert!(matches!(turn, ModelTurn::FunctionCall(_)));
    }

    #[test]
    fn only_the_first_part_is_inspected() {
        let turn = resolve_turn(parse(json!({
            "candidates": [{"content": {"parts": [
                {"text": "第一段"},
                {"functionCall": {"name": "get_recent_activities", "args": {}}}
            ]}}]
        })));
        assert_eq!(turn, ModelTurn::Text("第一段".to_string()));
    }

    #[test]
    fn empty_response_shapes_resolve_to_empty() {
        assert_eq!(resolve_turn(parse(json!({}))), ModelTurn::Empty);
        assert_eq!(
            resolve_turn(parse(json!({"candidates": []}))),
            ModelTurn::Empty
        );
        assert_eq!(
            resolve_turn(parse(json!({"candidates": [{"content": {"parts": []}}]}))),
            ModelTurn::Empty
        );
        assert_eq!(
            resolve_turn(parse(json!({"candidates": [{"content": {"parts": [{"text": ""}]}}]}))),
            ModelTurn::Empty
        );
    }

    #[test]
    fn function_call_args_default_to_null_when_absent() {
        let turn = resolve_turn(parse(json!({
            "candidates": [{"content": {"parts": [{
                "functionCall": {"name": "get_studio_introduction"}
            }]}}]
        })));
        let ModelTurn::FunctionCall(call) = turn else {
            panic!("expected a function call");
        };
        assert!(call.args.is_null());
    }

    #[test]
    fn request_body_advertises_function_declarations() {
        let tools = vec![ToolDefinition {
            name: "get_recent_activities".to_string(),
            description: "列出活動".to_string(),
            parameters: json!({"type": "object", "properties": {}}),
        }];

        let body = GeminiClient::request_body("最近有什麼活動", &tools);
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "最近有什麼活動");
        let declarations = body["tools"][0]["functionDeclarations"].as_array().unwrap();
        assert_eq!(declarations.len(), 1);
        assert_eq!(declarations[0]["name"], "get_recent_activities");
    }

    #[test]
    fn request_url_contains_model_and_key() {
        let client = GeminiClient::new(SecretString::from("test-key"), "gemini-2.5-flash")
            .with_base_url("http://127.0.0.1:9/v1beta/");
        assert_eq!(
            client.request_url(),
            "http://127.0.0.1:9/v1beta/models/gemini-2.5-flash:generateContent?key=test-key"
        );
    }
}
