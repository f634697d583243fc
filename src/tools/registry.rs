//! Enum-keyed tool dispatch over the activity store.
//!
//! The catalog is closed: the model is only ever shown names this enum can
//! resolve, so an unknown name at dispatch time is a contract violation
//! rather than a user-facing case.

use std::sync::Arc;

use serde_json::{Value, json};

use crate::cards::{self, BotReply};
use crate::error::ToolError;
use crate::store::{ActivityStore, DEFAULT_UPCOMING_LIMIT};
use crate::tools::{ToolDefinition, require_str};

/// Fixed text for an activity lookup that matches nothing.
pub const NO_MATCH_TEXT: &str = "找不到相關活動資訊。";

/// The closed set of tools this bot exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotTool {
    GetActivityCard,
    GetRecentActivities,
    GetStudioIntroduction,
}

impl BotTool {
    /// All tools, in the order they are advertised to the model.
    pub const ALL: [BotTool; 3] = [
        BotTool::GetActivityCard,
        BotTool::GetRecentActivities,
        BotTool::GetStudioIntroduction,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::GetActivityCard => "get_activity_card",
            Self::GetRecentActivities => "get_recent_activities",
            Self::GetStudioIntroduction => "get_studio_introduction",
        }
    }

    /// Resolve a model-echoed name back to its handler key.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    /// The definition advertised to the model.
    pub fn definition(&self) -> ToolDefinition {
        match self {
            Self::GetActivityCard => ToolDefinition {
                name: self.name().to_string(),
                description: "取得特定活動的詳細資訊。當使用者詢問活動內容、時間或地點時呼叫。"
                    .to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "activity_name": {
                            "type": "string",
                            "description": "活動名稱 (例如: 台北馬拉松, 跨年晚會, 科技展)"
                        }
                    },
                    "required": ["activity_name"]
                }),
            },
            Self::GetRecentActivities => ToolDefinition {
                name: self.name().to_string(),
                description:
                    "取得最近的所有活動列表。當使用者詢問「最近有什麼活動」、「有哪些活動」時呼叫。"
                        .to_string(),
                parameters: json!({"type": "object", "properties": {}}),
            },
            Self::GetStudioIntroduction => ToolDefinition {
                name: self.name().to_string(),
                description: "介紹工作室資訊。當使用者詢問「介紹工作室」、「關於我們」、「你們是誰」時呼叫。"
                    .to_string(),
                parameters: json!({"type": "object", "properties": {}}),
            },
        }
    }
}

/// Dispatch table mapping advertised tool names to handlers backed by the
/// activity store.
pub struct ToolRegistry {
    store: Arc<dyn ActivityStore>,
}

impl ToolRegistry {
    /// Build the registry.
    ///
    /// Asserts that every advertised definition resolves back to its
    /// handler, so a catalog/dispatch mismatch dies at startup instead of
    /// surfacing as a runtime miss.
    pub fn new(store: Arc<dyn ActivityStore>) -> Self {
        for tool in BotTool::ALL {
            let definition = tool.definition();
            assert_eq!(
                BotTool::from_name(&definition.name),
                Some(tool),
                "advertised tool {} does not resolve to its handler",
                definition.name
            );
        }
        Self { store }
    }

    /// Definitions advertised to the model on every request.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        BotTool::ALL.iter().map(BotTool::definition).collect()
    }

    /// Execute the named tool with the model-provided arguments.
    pub async fn dispatch(&self, name: &str, args: &Value) -> Result<BotReply, ToolError> {
        let Some(tool) = BotTool::from_name(name) else {
            return Err(ToolError::UnknownTool {
                name: name.to_string(),
            });
        };

        match tool {
            BotTool::GetActivityCard => {
                let query = require_str(name, args, "activity_name")?;
                tracing::info!(query, "Looking up activity");
                let found = self.store.find_by_name(query).await.map_err(|e| {
                    ToolError::ExecutionFailed {
                        name: name.to_string(),
                        reason: e.to_string(),
                    }
                })?;
                match found {
                    Some(activity) => Ok(BotReply::Flex(cards::activity_card(&activity))),
                    None => Ok(BotReply::Text(NO_MATCH_TEXT.to_string())),
                }
            }
            BotTool::GetRecentActivities => {
                tracing::info!("Listing upcoming activities");
                let activities = self
                    .store
                    .list_upcoming(DEFAULT_UPCOMING_LIMIT)
                    .await
                    .map_err(|e| ToolError::ExecutionFailed {
                        name: name.to_string(),
                        reason: e.to_string(),
                    })?;
                Ok(cards::activity_carousel(&activities))
            }
            BotTool::GetStudioIntroduction => {
                tracing::info!("Serving studio introduction");
                Ok(BotReply::Flex(cards::intro_card()))
            }
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────
