//! The fixed tool catalog advertised to the language model.

pub mod registry;

pub use registry::{BotTool, ToolRegistry};

use serde_json::Value;

use crate::error::ToolError;

/// A callable capability advertised to the language model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDefinition {
    /// Unique name, echoed back verbatim in function-call directives.
    pub name: String,
    /// Natural-language hint guiding the model on when to invoke it.
    pub description: String,
    /// JSON schema for the arguments object.
    pub parameters: Value,
}

/// Extract a required string argument from a function-call args object.
///
/// A missing key is a contract violation, not an empty query: silently
/// substituting "" would change search semantics.
pub fn require_str<'a>(tool: &str, args: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::InvalidArguments {
            name: tool.to_string(),
            reason: format!("missing required argument: {key}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn require_str_reads_present_key() {
        let args = json!({"activity_name": "馬拉松"});
        assert_eq!(
            require_str("get_activity_card", &args, "activity_name").unwrap(),
            "馬拉松"
        );
    }

    #[test]
    fn require_str_rejects_missing_key() {
        let err = require_str("get_activity_card", &json!({}), "activity_name").unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));
    }

    #[test]
    fn require_str_rejects_non_string_value() {
        let err =
            require_str("get_activity_card", &json!({"activity_name": 7}), "activity_name")
                .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));
    }
}
