//! # MCP Module
//!
//! The tool-call surface of the engine: tool definitions and argument
//! validation, the turn orchestrator, per-turn reports and UI snapshots.
//! With the `mcp-server` feature a JSON-RPC adapter serves it over stdio.

#[cfg(feature = "mcp-server")]
pub mod jsonrpc;
pub mod server;
pub mod snapshot;
pub mod tools;
pub mod turn;

#[cfg(feature = "mcp-server")]
pub use jsonrpc::*;
pub use server::*;
pub use snapshot::*;
pub use tools::*;
pub use turn::*;

use serde::{Deserialize, Serialize};

/// A block of tool output. Only text blocks are produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            text: text.into(),
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// The answer to one tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub content: Vec<ContentBlock>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_error: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_state: Option<GameStateSnapshot>,
}

impl ToolResult {
    /// A narrative result.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::text(text)],
            is_error: false,
            game_state: None,
        }
    }

    /// A result flagged as a failure of the engine itself.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::text(text)
        }
    }

    pub fn with_snapshot(mut self, snapshot: GameStateSnapshot) -> Self {
        self.game_state = Some(snapshot);
        self
    }

    /// All text blocks joined by newlines.
    pub fn text_content(&self) -> String {
        self.content
            .iter()
            .map(|block| block.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_result_json() {
        let json = serde_json::to_value(ToolResult::text("Hello")).unwrap();
        assert_eq!(json["content"][0]["type"], "text");
        assert_eq!(json["content"][0]["text"], "Hello");
        assert!(json.get("isError").is_none());
        assert!(json.get("gameState").is_none());

        let json = serde_json::to_value(ToolResult::error("Broken")).unwrap();
        assert_eq!(json["isError"], true);
    }

    #[test]
    fn test_text_content_joins_blocks() {
        let mut result = ToolResult::text("one");
        result.content.push(ContentBlock::text("two"));
        assert_eq!(result.text_content(), "one\ntwo");
    }
}
