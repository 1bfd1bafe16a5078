//! # Input Module
//!
//! Console input handling: typed lines become tool calls.

pub mod commands;

pub use commands::*;

use crate::config::DEFAULT_CHARACTER_NAME;
use crate::game::{EntityId, GameState};
use crate::mcp::{GameAction, GameQuery, ToolCall};
use crate::{CrawlerError, CrawlerResult};
use uuid::Uuid;

/// Input handler for the console front end.
///
/// Resolves the monster and item references of a [`Command`] against the
/// running game, so players can type names instead of ids.
#[derive(Debug, Clone)]
pub struct InputHandler {
    /// Whether monsters and items may be referred to by name
    pub name_lookup_enabled: bool,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl InputHandler {
    /// Creates a new input handler.
    ///
    /// # Examples
    ///
    /// ```
    /// use dungeon_crawler::InputHandler;
    ///
    /// let input_handler = InputHandler::new();
    /// assert!(input_handler.name_lookup_enabled);
    /// ```
    pub fn new() -> Self {
        Self {
            name_lookup_enabled: true,
        }
    }

    /// Parses a line and resolves it against `game`.
    ///
    /// Returns `None` for blank lines.
    pub fn read_line(
        &self,
        line: &str,
        game: Option<&GameState>,
    ) -> CrawlerResult<Option<PlayerInput>> {
        match Command::parse(line)? {
            Some(command) => self.command_to_input(command, game).map(Some),
            None => Ok(None),
        }
    }

    /// Converts a parsed command to player input.
    pub fn command_to_input(
        &self,
        command: Command,
        game: Option<&GameState>,
    ) -> CrawlerResult<PlayerInput> {
        let call = match command {
            Command::Help => return Ok(PlayerInput::Help),
            Command::Quit => return Ok(PlayerInput::Quit),
            Command::NewGame(name) => ToolCall::NewGame {
                character_name: name.unwrap_or_else(|| DEFAULT_CHARACTER_NAME.to_string()),
            },
            Command::Look => ToolCall::Action(GameAction::Look),
            Command::Move(direction) => ToolCall::Action(GameAction::Move { direction }),
            Command::Attack(target) => ToolCall::Action(GameAction::Attack {
                target_id: self.resolve(&target, game, Target::Monster)?,
            }),
            Command::Take(target) => ToolCall::Action(GameAction::Take {
                item_id: self.resolve(&target, game, Target::FloorItem)?,
            }),
            Command::Use(target) => ToolCall::Action(GameAction::Use {
                item_id: self.resolve(&target, game, Target::CarriedItem)?,
            }),
            Command::Equip(target) => ToolCall::Action(GameAction::Equip {
                item_id: self.resolve(&target, game, Target::CarriedItem)?,
            }),
            Command::Inventory => ToolCall::Query(GameQuery::Inventory),
            Command::Stats => ToolCall::Query(GameQuery::Stats),
            Command::Map => ToolCall::Query(GameQuery::Map),
        };

        Ok(PlayerInput::Call(call))
    }

    /// Finds the entity a player meant by `reference`.
    ///
    /// A full id is taken as is, even if nothing matches it, so the game
    /// rules produce the usual narrative. Otherwise the reference must be
    /// an id prefix or a case-insensitive part of a name matching exactly
    /// one candidate in the current room or the inventory.
    fn resolve(
        &self,
        reference: &str,
        game: Option<&GameState>,
        target: Target,
    ) -> CrawlerResult<EntityId> {
        if let Ok(id) = Uuid::parse_str(reference) {
            return Ok(id);
        }

        let game = game.ok_or_else(|| {
            CrawlerError::InvalidArgument("no game in progress; use 'new' to start".to_string())
        })?;
        let room_id = game.character.current_room_id;
        let candidates: Vec<(EntityId, &str)> = match target {
            Target::Monster => game
                .room_monsters(room_id)
                .into_iter()
                .map(|monster| (monster.id, monster.name.as_str()))
                .collect(),
            Target::FloorItem => game
                .room_items(room_id)
                .into_iter()
                .map(|item| (item.id, item.name.as_str()))
                .collect(),
            Target::CarriedItem => game
                .inventory()
                .into_iter()
                .map(|item| (item.id, item.name.as_str()))
                .collect(),
        };

        let needle = reference.to_lowercase();
        let by_prefix: Vec<EntityId> = candidates
            .iter()
            .filter(|(id, _)| id.to_string().starts_with(&needle))
            .map(|(id, _)| *id)
            .collect();
        let matches = if by_prefix.is_empty() && self.name_lookup_enabled {
            let exact: Vec<EntityId> = candidates
                .iter()
                .filter(|(_, name)| name.to_lowercase() == needle)
                .map(|(id, _)| *id)
                .collect();
            if exact.is_empty() {
                candidates
                    .iter()
                    .filter(|(_, name)| name.to_lowercase().contains(&needle))
                    .map(|(id, _)| *id)
                    .collect()
            } else {
                exact
            }
        } else {
            by_prefix
        };

        match matches.as_slice() {
            [id] => Ok(*id),
            [] => Err(CrawlerError::InvalidArgument(format!(
                "no {} matches '{}'",
                target.noun(),
                reference
            ))),
            _ => Err(CrawlerError::InvalidArgument(format!(
                "'{}' matches more than one {}; use the id",
                reference,
                target.noun()
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Monster,
    FloorItem,
    CarriedItem,
}

impl Target {
    fn noun(self) -> &'static str {
        match self {
            Target::Monster => "monster here",
            Target::FloorItem => "item here",
            Target::CarriedItem => "carried item",
        }
    }
}

/// What the player asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerInput {
    /// Run a tool
    Call(ToolCall),
    /// Show help information
    Help,
    /// Quit the game
    Quit,
}
