//! # Dungeon Crawler Engine
//!
//! A single-player, turn-based dungeon crawler driven entirely through
//! tool calls in the style of the Model Context Protocol (MCP).
//!
//! ## Architecture Overview
//!
//! - **Game**: entity records, the in-memory game state store and the
//!   combat resolver
//! - **Generation**: procedural grid dungeons with monster and item placement
//! - **MCP**: tool definitions, the turn orchestrator and UI snapshots
//! - **Rendering**: plain-text views such as the box-drawing map
//! - **Input**: console command parsing for the bundled binary
//! - **Utils**: dice and graph search helpers
//!
//! ## Quick Start
//!
//! ```
//! use dungeon_crawler::{EngineConfig, McpServer};
//! use serde_json::json;
//!
//! let mut server = McpServer::new(EngineConfig::seeded(7, 11));
//! let result = server.call_tool("new_game", &json!({ "character_name": "Hero" })).unwrap();
//! assert!(!result.is_error);
//! assert!(result.game_state.is_some());
//! ```

pub mod config;
pub mod game;
pub mod generation;
pub mod input;
pub mod mcp;
pub mod rendering;
pub mod utils;

pub use config::EngineConfig;
pub use game::*;
pub use generation::*;
pub use input::*;
pub use mcp::*;
pub use rendering::*;
pub use utils::*;

/// Core error type for the dungeon crawler engine.
#[derive(thiserror::Error, Debug)]
pub enum CrawlerError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Game state is invalid
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// A caller supplied a malformed argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Generation failed
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// An in-game rule rejected the action
    #[error("{0}")]
    Rule(#[from] RuleViolation),
}

/// Result type used throughout the crawler codebase.
pub type CrawlerResult<T> = Result<T, CrawlerError>;

/// Version information for the engine.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
