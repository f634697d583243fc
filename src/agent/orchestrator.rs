//! The reply brain: one Gemini turn per inbound message.
//!
//! Each inbound message is an independent single-turn request; no
//! conversation memory is carried. A function-call directive is executed
//! through the tool registry and its result IS the reply — the model is
//! never asked to incorporate tool output into a conversational turn.

use std::sync::Arc;

use crate::cards::BotReply;
use crate::config::GeminiConfig;
use crate::llm::{ChatModel, GeminiClient, ModelTurn};
use crate::tools::ToolRegistry;

/// Operator-facing reply when no Gemini credential is configured.
pub const MISSING_KEY_TEXT: &str = "系統設定錯誤：找不到 GEMINI_API_KEY，請檢查環境變數。";

/// User-safe reply for any model or dispatch failure. Raw error detail
/// goes to the log, never to the chat.
pub const APOLOGY_TEXT: &str = "抱歉，我現在有點忙不過來，請稍後再試一次。";

/// Reply when the model returns neither text nor a function call.
pub const EMPTY_RESPONSE_TEXT: &str = "Gemini 沒有回應任何內容。";

/// Orchestrates model calls and tool dispatch into one normalized reply.
pub struct Orchestrator {
    model: Option<Arc<dyn ChatModel>>,
    tools: ToolRegistry,
}

impl Orchestrator {
    /// Build from configuration.
    ///
    /// A missing API key yields an orchestrator that answers with a fixed
    /// operator-facing message and never makes a network call.
    pub fn from_config(config: &GeminiConfig, tools: ToolRegistry) -> Self {
        let model = config.api_key.clone().map(|key| {
            Arc::new(GeminiClient::new(key, config.model.clone())) as Arc<dyn ChatModel>
        });
        if model.is_none() {
            tracing::warn!("GEMINI_API_KEY is not set; AI replies are disabled");
        }
        Self { model, tools }
    }

    /// Build with an explicit model (tests use a stub).
    pub fn new(model: Option<Arc<dyn ChatModel>>, tools: ToolRegistry) -> Self {
        Self { model, tools }
    }

    /// Produce the reply for one inbound text message.
    ///
    /// Never fails: every error path degrades to a fixed text reply, so
    /// nothing propagates past the event handler.
    pub async fn respond(&self, user_text: &str) -> BotReply {
        let Some(model) = &self.model else {
            return BotReply::Text(MISSING_KEY_TEXT.to_string());
        };

        let turn = match model.generate(user_text, &self.tools.definitions()).await {
            Ok(turn) => turn,
            Err(e) => {
                tracing::error!(model = model.model_name(), error = %e, "Gemini request failed");
                return BotReply::Text(APOLOGY_TEXT.to_string());
            }
        };

        match turn {
            ModelTurn::FunctionCall(call) => {
                match self.tools.dispatch(&call.name, &call.args).await {
                    Ok(reply) => reply,
                    Err(e) => {
                        tracing::error!(tool = %call.name, error = %e, "Tool dispatch failed");
                        BotReply::Text(APOLOGY_TEXT.to_string())
                    }
                }
            }
            ModelTurn::Text(text) => BotReply::Text(text),
            ModelTurn::Empty => BotReply::Text(EMPTY_RESPONSE_TEXT.to_string()),
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::flex::{FALLBACK_LINK_URI, PLACEHOLDER_IMAGE_URL};
    use crate::error::LlmError;
    use crate::llm::FunctionCall;
    use crate::store::{ActivityStore, LibSqlBackend, NewActivity};
    use crate::tools::ToolDefinition;
    use async_trait::async_trait;
    use chrono::NaiveDate;

    /// Stub model returning a canned result (no network).
    struct StubModel {
        result: Result<ModelTurn, LlmError>,
    }

    #[async_trait]
    impl ChatModel for StubModel {
        fn model_name(&self) -> &str {
            "stub"
        }

        async fn generate(
            &self,
            _user_text: &str,
            _tools: &[ToolDefinition],
        ) -> Result<ModelTurn, LlmError> {
            match &self.result {
                Ok(turn) => Ok(turn.clone()),
                Err(e) => Err(LlmError::RequestFailed {
                    reason: e.to_string(),
                }),
            }
        }
    }

    async fn empty_registry() -> ToolRegistry {
        let store = LibSqlBackend::new_memory().await.unwrap();
        ToolRegistry::new(Arc::new(store))
    }

    fn orchestrator_with(turn: Result<ModelTurn, LlmError>, tools: ToolRegistry) -> Orchestrator {
        Orchestrator::new(Some(Arc::new(StubModel { result: turn })), tools)
    }

    #[tokio::test]
    async fn missing_credential_short_circuits() {
        let orchestrator = Orchestrator::new(None, empty_registry().await);
        let reply = orchestrator.respond("你好").await;
        assert_eq!(reply, BotReply::Text(MISSING_KEY_TEXT.to_string()));
    }

    #[tokio::test]
    async fn plain_text_is_returned_verbatim() {
        let orchestrator = orchestrator_with(
            Ok(ModelTurn::Text("你好".to_string())),
            empty_registry().await,
        );
        let reply = orchestrator.respond("你好").await;
        assert_eq!(reply, BotReply::Text("你好".to_string()));
    }

    #[tokio::test]
    async fn empty_turn_yields_fixed_text() {
        let orchestrator = orchestrator_with(Ok(ModelTurn::Empty), empty_registry().await);
        let reply = orchestrator.respond("hi").await;
        assert_eq!(reply, BotReply::Text(EMPTY_RESPONSE_TEXT.to_string()));
    }

    #[tokio::test]
    async fn transport_error_becomes_apology_and_never_leaks() {
        let orchestrator = orchestrator_with(
            Err(LlmError::RequestFailed {
                reason: "connection reset by upstream proxy".to_string(),
            }),
            empty_registry().await,
        );
        let reply = orchestrator.respond("hi").await;
        let BotReply::Text(text) = reply else {
            panic!("expected a text reply");
        };
        assert_eq!(text, APOLOGY_TEXT);
        assert!(!text.contains("connection reset"));
    }

    #[tokio::test]
    async fn function_call_dispatches_and_returns_tool_result() {
        let store = LibSqlBackend::new_memory().await.unwrap();
        store
            .insert(NewActivity {
                name: "台北馬拉松".to_string(),
                end_date: NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
                location: "台北".to_string(),
                description: "年度路跑活動".to_string(),
                image_url: None,
                activity_link: None,
            })
            .await
            .unwrap();
        let tools = ToolRegistry::new(Arc::new(store));

        let orchestrator = orchestrator_with(
            Ok(ModelTurn::FunctionCall(FunctionCall {
                name: "get_activity_card".to_string(),
                args: serde_json::json!({"activity_name": "馬拉松"}),
            })),
            tools,
        );

        let reply = orchestrator.respond("台北馬拉松是什麼").await;
        let BotReply::Flex(flex) = reply else {
            panic!("expected the dispatch result as the reply");
        };
        assert_eq!(flex.contents["hero"]["url"], PLACEHOLDER_IMAGE_URL);
        assert_eq!(
            flex.contents["footer"]["contents"][0]["action"]["uri"],
            FALLBACK_LINK_URI
        );
    }

    #[tokio::test]
    async fn dispatch_contract_violation_degrades_to_apology() {
        // Missing required argument: logged as a contract violation, user
        // sees only the apology text.
        let orchestrator = orchestrator_with(
            Ok(ModelTurn::FunctionCall(FunctionCall {
                name: "get_activity_card".to_string(),
                args: serde_json::json!({}),
            })),
            empty_registry().await,
        );
        let reply = orchestrator.respond("查活動").await;
        assert_eq!(reply, BotReply::Text(APOLOGY_TEXT.to_string()));
    }
}
