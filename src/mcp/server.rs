//! # Turn Orchestrator
//!
//! [`McpServer`] owns one game session. Each tool call is validated,
//! dispatched to a [`GameState`] operation, classified into an event and
//! answered with narrative text plus a [`GameStateSnapshot`].
//!
//! Outcomes fall into four groups:
//! - malformed requests are a [`ToolError`] from [`McpServer::call_tool`]
//! - missing or finished games answer with a fixed message and never mutate
//! - rule violations answer with their narrative and the unchanged snapshot
//! - anything else is an engine failure, flagged with `isError`

use crate::config::EngineConfig;
use crate::game::{Direction, EquipmentSlot, GameState, ItemId, ItemKind, MonsterId, Room};
use crate::generation::{generate_dungeon, GenerationConfig};
use crate::mcp::{
    health_status, tool_definitions, EventRecord, EventSubtype, GameAction, GameQuery,
    GameStateSnapshot, Pacing, SnapshotBuilder, ToolCall, ToolDefinition, ToolError, ToolResult,
    TurnReport,
};
use crate::rendering::render_box_map;
use crate::utils::Dice;
use crate::{CrawlerError, CrawlerResult};
use log::{debug, info, warn};
use serde_json::Value;
use std::sync::Arc;

/// Answer to every call except `new_game` before a game exists.
pub const NO_GAME_MESSAGE: &str = "No game in progress. Use 'new_game' to start.";

/// Answer to actions after the character escaped.
pub const VICTORY_MESSAGE: &str =
    "You have escaped the dungeon! Victory! Use 'new_game' to play again.";

/// Answer to actions after the character died.
pub const DEATH_MESSAGE: &str = "You are dead. Use 'new_game' to play again.";

/// Most event rows kept for one game. Older rows are dropped first.
pub const EVENT_LOG_CAPACITY: usize = 1000;

const ESCAPE_NARRATIVE: &str = "You step through the exit and escape the dungeon!\n\n\
    VICTORY!\n\n\
    Congratulations, brave adventurer! Use 'new_game' to play again.";

/// One game session driven by tool calls.
///
/// # Examples
///
/// ```
/// use dungeon_crawler::{EngineConfig, McpServer, NO_GAME_MESSAGE};
/// use serde_json::json;
///
/// let mut server = McpServer::new(EngineConfig::seeded(3, 4));
/// let result = server.call_tool("look", &json!({})).unwrap();
/// assert_eq!(result.text_content(), NO_GAME_MESSAGE);
///
/// server.call_tool("new_game", &json!({ "character_name": "Aria" })).unwrap();
/// let look = server.call_tool("look", &json!({})).unwrap();
/// assert!(look.text_content().contains("[This is the dungeon entrance]"));
/// ```
#[derive(Debug)]
pub struct McpServer {
    config: EngineConfig,
    dice: Arc<Dice>,
    state: Option<GameState>,
    report: TurnReport,
    pacing: Pacing,
    turn_number: u64,
    event_log: Vec<EventRecord>,
}

impl McpServer {
    pub fn new(config: EngineConfig) -> Self {
        let dice = match config.combat_seed {
            Some(seed) => Dice::new(seed),
            None => Dice::from_entropy(),
        };

        Self {
            config,
            dice: Arc::new(dice),
            state: None,
            report: TurnReport::new(),
            pacing: Pacing::default(),
            turn_number: 0,
            event_log: Vec::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The running game, if `new_game` has been called.
    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    /// Direct access to the running game, for tooling and tests.
    pub fn state_mut(&mut self) -> Option<&mut GameState> {
        self.state.as_mut()
    }

    /// Report of the most recent action.
    pub fn last_report(&self) -> &TurnReport {
        &self.report
    }

    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    /// Accepted actions since the current game started.
    pub fn turn_number(&self) -> u64 {
        self.turn_number
    }

    /// Event rows of the current game, oldest first, up to
    /// [`EVENT_LOG_CAPACITY`].
    pub fn event_log(&self) -> &[EventRecord] {
        &self.event_log
    }

    /// Drains the event rows collected so far, for a persistence layer.
    pub fn take_event_log(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.event_log)
    }

    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        tool_definitions()
    }

    /// Validates and runs a raw tool call.
    pub fn call_tool(&mut self, name: &str, arguments: &Value) -> Result<ToolResult, ToolError> {
        let call = ToolCall::parse(name, arguments)?;
        Ok(self.execute(call))
    }

    /// Runs an already validated tool call.
    pub fn execute(&mut self, call: ToolCall) -> ToolResult {
        debug!("Executing tool '{}'", call.name());

        match call {
            ToolCall::NewGame { character_name } => self.new_game(&character_name),
            ToolCall::Action(action) => {
                self.with_state(|server, state| server.run_action(state, action))
            }
            ToolCall::Query(query) => self.with_state(|server, state| server.run_query(state, query)),
        }
    }

    /// Lends the running game to `f`, or answers that there is none.
    fn with_state(
        &mut self,
        f: impl FnOnce(&mut Self, &mut GameState) -> ToolResult,
    ) -> ToolResult {
        let Some(mut state) = self.state.take() else {
            return ToolResult::text(NO_GAME_MESSAGE);
        };
        let result = f(self, &mut state);
        self.state = Some(state);
        result
    }

    fn new_game(&mut self, character_name: &str) -> ToolResult {
        self.state = None;
        self.report = TurnReport::new();
        self.pacing = Pacing::default();
        self.turn_number = 0;
        self.event_log.clear();

        if let Some(seed) = self.config.combat_seed {
            self.dice.reseed(seed);
        }
        let seed = self.config.dungeon_seed.unwrap_or_else(rand::random);

        let state = match self.start_game(character_name, seed) {
            Ok(state) => state,
            Err(err) => {
                warn!("Failed to start a new game: {}", err);
                return ToolResult::error(format!("Failed to generate dungeon: {}", err));
            }
        };
        info!(
            "New game for {} in dungeon {} (seed {})",
            state.character.name, state.dungeon.id, seed
        );

        self.report.set_event(EventSubtype::GameStart, Vec::new());
        self.record_event(&state);

        let character = &state.character;
        let mut text = String::from("=== NEW GAME STARTED ===\n\n");
        text.push_str(&format!(
            "Welcome, {}!\n\n\
             You find yourself at the entrance of a dark dungeon.\n\
             Your goal: reach the exit on the other side.\n\
             Beware of the monsters that lurk within!\n\n\
             Stats: HP {}/{} | STR {} | DEX {}\n\n\
             Use 'look' to see your surroundings.",
            character.name,
            character.hp,
            character.max_hp,
            character.strength,
            character.dexterity
        ));

        let result = ToolResult::text(text).with_snapshot(self.action_snapshot(&state));
        self.state = Some(state);
        result
    }

    fn start_game(&self, character_name: &str, seed: u64) -> CrawlerResult<GameState> {
        let generation = GenerationConfig::from_engine(&self.config, seed);
        let generated = generate_dungeon(&generation)?;
        GameState::new(character_name, generated)
    }

    fn run_action(&mut self, state: &mut GameState, action: GameAction) -> ToolResult {
        if state.is_game_over() {
            debug!("Refusing '{}' after the game ended", action.name());
            let message = if state.is_victory() {
                VICTORY_MESSAGE
            } else {
                DEATH_MESSAGE
            };
            return ToolResult::text(message).with_snapshot(self.query_snapshot(state));
        }

        self.report = TurnReport::new();

        let outcome = match action {
            GameAction::Look => {
                self.pacing.standard_action();
                self.look(state)
            }
            GameAction::Move { direction } => {
                self.pacing.movement();
                self.move_character(state, direction)
            }
            GameAction::Attack { target_id } => {
                self.pacing.combat_action();
                self.attack(state, target_id)
            }
            GameAction::Take { item_id } => {
                self.pacing.standard_action();
                self.take(state, item_id)
            }
            GameAction::Use { item_id } => {
                self.pacing.standard_action();
                self.use_item(state, item_id)
            }
            GameAction::Equip { item_id } => {
                self.pacing.standard_action();
                self.equip(state, item_id)
            }
        };

        match outcome {
            Ok(text) => {
                self.turn_number += 1;
                self.record_event(state);
                ToolResult::text(text).with_snapshot(self.action_snapshot(state))
            }
            Err(CrawlerError::Rule(violation)) => {
                debug!("'{}' rejected: {}", action.name(), violation);
                ToolResult::text(violation.to_string()).with_snapshot(self.action_snapshot(state))
            }
            Err(err) => {
                warn!("'{}' failed: {}", action.name(), err);
                ToolResult::error(format!("Error: {}", err))
                    .with_snapshot(self.action_snapshot(state))
            }
        }
    }

    fn run_query(&self, state: &GameState, query: GameQuery) -> ToolResult {
        let text = match query {
            GameQuery::Inventory => describe_inventory(state),
            GameQuery::Stats => describe_stats(state),
            GameQuery::Map => render_box_map(state),
        };
        ToolResult::text(text).with_snapshot(self.query_snapshot(state))
    }

    fn look(&mut self, state: &GameState) -> CrawlerResult<String> {
        let room = state
            .current_room()
            .ok_or_else(|| CrawlerError::InvalidState("Current room not found".to_string()))?;
        self.report.set_event(EventSubtype::Look, Vec::new());
        Ok(describe_room(state, room))
    }

    fn move_character(&mut self, state: &mut GameState, direction: Direction) -> CrawlerResult<String> {
        let seen_before = state
            .room_exits(state.character.current_room_id)
            .get(&direction)
            .is_some_and(|room_id| state.is_room_visited(*room_id));

        let room_id = state.move_character(direction)?;
        self.report.first_visit = !seen_before;

        if state.is_victory() {
            self.report
                .set_event(EventSubtype::DungeonEscaped, vec![room_id]);
            return Ok(ESCAPE_NARRATIVE.to_string());
        }
        self.report.set_event(EventSubtype::RoomEnter, vec![room_id]);

        let room = state
            .room(room_id)
            .ok_or_else(|| CrawlerError::InvalidState(format!("Room {} not found", room_id)))?;
        let mut text = format!(
            "You move {}...\n\n=== {} ===\n\n{}\n",
            direction, room.name, room.description
        );

        let monsters = state.room_monsters(room_id);
        if !monsters.is_empty() {
            text.push_str("\nDanger! Monsters ahead!\n");
            for monster in monsters {
                text.push_str(&format!(
                    "  - {} (HP: {}/{}) [ID: {}]\n",
                    monster.name, monster.hp, monster.max_hp, monster.id
                ));
            }
        }

        Ok(text)
    }

    fn attack(&mut self, state: &mut GameState, target_id: MonsterId) -> CrawlerResult<String> {
        let round = state.attack_monster(target_id, &self.dice)?;
        let monster_name = state
            .monsters
            .get(&target_id)
            .map(|monster| monster.name.clone())
            .unwrap_or_default();

        let mut text = format!("=== COMBAT ===\n\n{}\n", round.summary.message);

        if round.summary.attacker_died {
            self.report
                .set_event(EventSubtype::PlayerDied, vec![target_id]);
            text.push_str("\nYOU HAVE DIED\n\nUse 'new_game' to try again.");
        } else if round.summary.defender_died {
            self.report.record_monster_defeated(target_id);
            self.report
                .set_event(EventSubtype::EnemyDefeated, vec![target_id]);
            text.push_str(&format!("\nThe {} has been defeated!\n", monster_name));
            if !state.has_monsters_in_room(state.character.current_room_id) {
                text.push_str("\nThe room is now clear. You may proceed.");
            }
        } else {
            let hit = round
                .detail
                .player_attack
                .as_ref()
                .is_some_and(|attack| attack.was_hit);
            let subtype = if hit {
                EventSubtype::AttackHit
            } else {
                EventSubtype::AttackMiss
            };
            self.report.set_event(subtype, vec![target_id]);
        }

        self.report.combat = Some(round.detail);
        Ok(text)
    }

    fn take(&mut self, state: &mut GameState, item_id: ItemId) -> CrawlerResult<String> {
        state.take_item(item_id)?;
        let name = state
            .items
            .get(&item_id)
            .map(|item| item.name.as_str())
            .unwrap_or("item");

        self.report.record_item_taken(item_id);
        self.report.set_event(EventSubtype::ItemFound, vec![item_id]);
        Ok(format!("You pick up the {}.", name))
    }

    fn use_item(&mut self, state: &mut GameState, item_id: ItemId) -> CrawlerResult<String> {
        let used = state.use_item(item_id)?;
        self.report.record_item_used(item_id);
        self.report.set_event(EventSubtype::ItemUsed, vec![item_id]);

        if used.item.healing > 0 {
            Ok(format!(
                "You drink the {} and recover {} HP! (HP: {}/{})",
                used.item.name, used.healed, state.character.hp, state.character.max_hp
            ))
        } else {
            Ok(format!("You use the {}.", used.item.name))
        }
    }

    fn equip(&mut self, state: &mut GameState, item_id: ItemId) -> CrawlerResult<String> {
        let change = state.equip_item(item_id)?;
        self.report
            .set_event(EventSubtype::ItemEquipped, vec![item_id]);

        let mut text = String::new();
        if let Some(old) = &change.replaced {
            text.push_str(&format!("You unequip the {}.\n", old));
        }
        let label = match change.slot {
            EquipmentSlot::Weapon => "Damage",
            EquipmentSlot::Armor => "Armor",
        };
        text.push_str(&format!(
            "You equip the {}. ({} +{})",
            change.item_name, label, change.bonus
        ));
        Ok(text)
    }

    fn record_event(&mut self, state: &GameState) {
        match self.report.to_event_record(state.character.id) {
            Ok(Some(record)) => {
                if self.event_log.len() >= EVENT_LOG_CAPACITY {
                    let overflow = self.event_log.len() + 1 - EVENT_LOG_CAPACITY;
                    self.event_log.drain(..overflow);
                }
                self.event_log.push(record);
            }
            Ok(None) => {}
            Err(err) => warn!("Could not record event: {}", err),
        }
    }

    fn action_snapshot(&self, state: &GameState) -> GameStateSnapshot {
        SnapshotBuilder::new(state)
            .with_report(&self.report)
            .with_pacing(self.pacing)
            .with_turn_number(self.turn_number)
            .build()
    }

    /// Snapshot for calls that did not act: no event is replayed.
    fn query_snapshot(&self, state: &GameState) -> GameStateSnapshot {
        SnapshotBuilder::new(state)
            .with_pacing(self.pacing)
            .with_turn_number(self.turn_number)
            .build()
    }
}

impl Default for McpServer {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

fn describe_room(state: &GameState, room: &Room) -> String {
    let mut text = format!("=== {} ===\n\n{}\n\n", room.name, room.description);

    if room.is_entrance {
        text.push_str("[This is the dungeon entrance]\n\n");
    }
    if room.is_exit {
        text.push_str("[This is the dungeon exit - reach here to win!]\n\n");
    }

    let exits: Vec<&str> = state
        .room_exits(room.id)
        .keys()
        .map(|direction| direction.as_str())
        .collect();
    if exits.is_empty() {
        text.push_str("Exits: none\n\n");
    } else {
        text.push_str(&format!("Exits: {}\n\n", exits.join(", ")));
    }

    let monsters = state.room_monsters(room.id);
    if !monsters.is_empty() {
        text.push_str("Monsters:\n");
        for monster in &monsters {
            text.push_str(&format!(
                "  - {} (HP: {}/{}) [ID: {}]\n",
                monster.name, monster.hp, monster.max_hp, monster.id
            ));
            text.push_str(&format!("    {}\n", monster.description));
        }
        text.push('\n');
    }

    let items = state.room_items(room.id);
    if !items.is_empty() {
        text.push_str("Items:\n");
        for item in items {
            text.push_str(&format!("  - {} [ID: {}]\n", item.name, item.id));
            text.push_str(&format!("    {}\n", item.description));
        }
        text.push('\n');
    }

    if !monsters.is_empty() {
        text.push_str("Monsters block your path! Defeat them to proceed.\n");
    }

    text
}

fn describe_inventory(state: &GameState) -> String {
    let mut text = String::from("=== INVENTORY ===\n\n");
    let items = state.inventory();

    if items.is_empty() {
        text.push_str("Your inventory is empty.\n");
        return text;
    }

    for item in items {
        let marker = if item.is_equipped { " [EQUIPPED]" } else { "" };
        text.push_str(&format!("- {}{} [ID: {}]\n", item.name, marker, item.id));
        text.push_str(&format!("  {}\n", item.description));
        match item.kind {
            ItemKind::Consumable if item.healing > 0 => {
                text.push_str(&format!("  (Heals {} HP)\n", item.healing));
            }
            ItemKind::Weapon if item.damage > 0 => {
                text.push_str(&format!("  (Damage +{})\n", item.damage));
            }
            ItemKind::Armor if item.armor > 0 => {
                text.push_str(&format!("  (Armor +{})\n", item.armor));
            }
            _ => {}
        }
    }

    text
}

fn describe_stats(state: &GameState) -> String {
    let character = &state.character;
    let mut text = String::from("=== CHARACTER STATS ===\n\n");
    text.push_str(&format!("Name: {}\n", character.name));
    text.push_str(&format!("HP: {}/{}\n", character.hp, character.max_hp));
    text.push_str(&format!("Strength: {}\n", character.strength));
    text.push_str(&format!("Dexterity: {}\n", character.dexterity));
    text.push_str(&format!("Status: {}\n", health_status(character)));

    text.push_str("\n--- Equipment ---\n");
    match state.equipped_weapon() {
        Some(weapon) => {
            text.push_str(&format!(
                "Weapon: {} (+{} damage)\n",
                weapon.name, weapon.damage
            ));
        }
        None => text.push_str("Weapon: None (bare hands)\n"),
    }
    match state.equipped_armor() {
        Some(armor) => {
            text.push_str(&format!(
                "Armor: {} (+{} defense)\n",
                armor.name, armor.armor
            ));
        }
        None => text.push_str("Armor: None\n"),
    }

    if state.is_victory() {
        text.push_str("\nVICTORIOUS\n");
    }
    if let Some(room) = state.current_room() {
        text.push_str(&format!("\nLocation: {}\n", room.name));
    }
    text.push_str(&format!("Inventory: {} items\n", state.inventory().len()));

    text
}
