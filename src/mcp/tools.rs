//! # Tool Surface
//!
//! Tool definitions advertised by `tools/list` and the boundary parser that
//! turns a tool name plus JSON arguments into a typed [`ToolCall`].

use crate::config::DEFAULT_CHARACTER_NAME;
use crate::game::{Direction, EntityId, ItemId, MonsterId};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use uuid::Uuid;

/// A malformed tool request, rejected before any game logic runs.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("missing argument '{argument}' for tool '{tool}'")]
    MissingArgument {
        tool: &'static str,
        argument: &'static str,
    },

    #[error("invalid argument '{argument}': {reason}")]
    InvalidArgument {
        argument: &'static str,
        reason: String,
    },
}

/// One entry of the `tools/list` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl ToolDefinition {
    fn new(name: &str, description: &str, input_schema: Value) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            input_schema,
        }
    }
}

fn no_arguments() -> Value {
    json!({ "type": "object", "properties": {} })
}

fn id_argument(name: &str, description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            name: { "type": "string", "description": description }
        },
        "required": [name]
    })
}

/// Every tool the server exposes, in listing order.
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            "new_game",
            "Start a new game with a character",
            json!({
                "type": "object",
                "properties": {
                    "character_name": {
                        "type": "string",
                        "description": "Name of your character"
                    }
                },
                "required": ["character_name"]
            }),
        ),
        ToolDefinition::new(
            "look",
            "Look around the current room to see exits, monsters, items, and traps",
            no_arguments(),
        ),
        ToolDefinition::new(
            "move",
            "Move in a direction (north, south, east, west)",
            json!({
                "type": "object",
                "properties": {
                    "direction": {
                        "type": "string",
                        "description": "Direction to move (north, south, east, west)",
                        "enum": ["north", "south", "east", "west"]
                    }
                },
                "required": ["direction"]
            }),
        ),
        ToolDefinition::new(
            "attack",
            "Attack a monster in the current room",
            id_argument("target_id", "ID of the monster to attack"),
        ),
        ToolDefinition::new(
            "take",
            "Pick up an item from the current room",
            id_argument("item_id", "ID of the item to pick up"),
        ),
        ToolDefinition::new(
            "use",
            "Use an item from inventory",
            id_argument("item_id", "ID of the item to use"),
        ),
        ToolDefinition::new("inventory", "View current inventory", no_arguments()),
        ToolDefinition::new("stats", "View character stats", no_arguments()),
        ToolDefinition::new(
            "map",
            "View the dungeon map showing explored areas",
            no_arguments(),
        ),
        ToolDefinition::new(
            "equip",
            "Equip a weapon or armor from your inventory",
            id_argument("item_id", "ID of the item to equip"),
        ),
    ]
}

/// A state-changing player action. Refused once the game is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    Look,
    Move { direction: Direction },
    Attack { target_id: MonsterId },
    Take { item_id: ItemId },
    Use { item_id: ItemId },
    Equip { item_id: ItemId },
}

impl GameAction {
    pub fn name(&self) -> &'static str {
        match self {
            GameAction::Look => "look",
            GameAction::Move { .. } => "move",
            GameAction::Attack { .. } => "attack",
            GameAction::Take { .. } => "take",
            GameAction::Use { .. } => "use",
            GameAction::Equip { .. } => "equip",
        }
    }
}

/// A read-only view, available in any state once a game exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameQuery {
    Inventory,
    Stats,
    Map,
}

impl GameQuery {
    pub fn name(&self) -> &'static str {
        match self {
            GameQuery::Inventory => "inventory",
            GameQuery::Stats => "stats",
            GameQuery::Map => "map",
        }
    }
}

/// A validated tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    NewGame { character_name: String },
    Action(GameAction),
    Query(GameQuery),
}

impl ToolCall {
    /// Validates a raw tool call.
    ///
    /// `arguments` may be `null` or an object. A missing or blank character
    /// name falls back to the default; every other required argument must
    /// be present and a string.
    ///
    /// # Examples
    ///
    /// ```
    /// use dungeon_crawler::{Direction, GameAction, ToolCall};
    /// use serde_json::json;
    ///
    /// let call = ToolCall::parse("move", &json!({ "direction": "north" })).unwrap();
    /// assert_eq!(call, ToolCall::Action(GameAction::Move { direction: Direction::North }));
    /// assert!(ToolCall::parse("dance", &json!({})).is_err());
    /// ```
    pub fn parse(name: &str, arguments: &Value) -> Result<Self, ToolError> {
        let empty = Map::new();
        let args = match arguments {
            Value::Null => &empty,
            Value::Object(map) => map,
            other => {
                return Err(ToolError::InvalidArgument {
                    argument: "arguments",
                    reason: format!("expected an object, got {}", other),
                })
            }
        };

        let call = match name {
            "new_game" => {
                let character_name = optional_string(args, "character_name")?
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .unwrap_or(DEFAULT_CHARACTER_NAME);
                ToolCall::NewGame {
                    character_name: character_name.to_string(),
                }
            }
            "look" => ToolCall::Action(GameAction::Look),
            "move" => {
                let raw = required_string(args, "move", "direction")?;
                let direction = raw.parse().map_err(|_| ToolError::InvalidArgument {
                    argument: "direction",
                    reason: format!("'{}' is not one of north, south, east, west", raw),
                })?;
                ToolCall::Action(GameAction::Move { direction })
            }
            "attack" => ToolCall::Action(GameAction::Attack {
                target_id: required_id(args, "attack", "target_id")?,
            }),
            "take" => ToolCall::Action(GameAction::Take {
                item_id: required_id(args, "take", "item_id")?,
            }),
            "use" => ToolCall::Action(GameAction::Use {
                item_id: required_id(args, "use", "item_id")?,
            }),
            "equip" => ToolCall::Action(GameAction::Equip {
                item_id: required_id(args, "equip", "item_id")?,
            }),
            "inventory" => ToolCall::Query(GameQuery::Inventory),
            "stats" => ToolCall::Query(GameQuery::Stats),
            "map" => ToolCall::Query(GameQuery::Map),
            other => return Err(ToolError::UnknownTool(other.to_string())),
        };

        Ok(call)
    }

    /// The tool name this call was parsed from.
    pub fn name(&self) -> &'static str {
        match self {
            ToolCall::NewGame { .. } => "new_game",
            ToolCall::Action(action) => action.name(),
            ToolCall::Query(query) => query.name(),
        }
    }
}

fn optional_string<'a>(
    args: &'a Map<String, Value>,
    argument: &'static str,
) -> Result<Option<&'a str>, ToolError> {
    match args.get(argument) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value)),
        Some(other) => Err(ToolError::InvalidArgument {
            argument,
            reason: format!("expected a string, got {}", other),
        }),
    }
}

fn required_string<'a>(
    args: &'a Map<String, Value>,
    tool: &'static str,
    argument: &'static str,
) -> Result<&'a str, ToolError> {
    optional_string(args, argument)?.ok_or(ToolError::MissingArgument { tool, argument })
}

fn required_id(
    args: &Map<String, Value>,
    tool: &'static str,
    argument: &'static str,
) -> Result<EntityId, ToolError> {
    let raw = required_string(args, tool, argument)?;
    Uuid::parse_str(raw.trim()).map_err(|err| ToolError::InvalidArgument {
        argument,
        reason: format!("'{}' is not a valid id ({})", raw, err),
    })
}
