//! # UI Snapshots
//!
//! Read-only projection of a [`GameState`] into the structured
//! `gameState` payload returned with every tool result.
//!
//! Nothing here mutates the game. The derived labels (threat, atmosphere,
//! phase, health status) are recomputed from scratch on every build.

use crate::config::combat::AVERAGE_D6;
use crate::game::{
    Character, CharacterId, CombatDetail, Direction, GameState, Item, ItemId, ItemKind, Monster,
    MonsterId, Position, Rarity, Room, RoomId,
};
use crate::mcp::{EventInfo, InventoryDelta, Pacing, TurnReport};
use crate::rendering::{cell_status, CellStatus};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse health label shown beside the hit points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    Healthy,
    Wounded,
    Critical,
    Dead,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HealthStatus::Healthy => "Healthy",
            HealthStatus::Wounded => "Wounded",
            HealthStatus::Critical => "Critical",
            HealthStatus::Dead => "Dead",
        };
        f.write_str(label)
    }
}

/// How dangerous a monster is to the character right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Threat {
    Trivial,
    Normal,
    Dangerous,
    Deadly,
}

/// Mood of the current room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Atmosphere {
    Safe,
    Tense,
    Dangerous,
    Mysterious,
    Ominous,
}

/// Progress through the dungeon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    EarlyGame,
    MidGame,
    LateGame,
    Exit,
}

pub fn health_status(character: &Character) -> HealthStatus {
    if !character.is_alive {
        HealthStatus::Dead
    } else if character.hp <= character.max_hp / 4 {
        HealthStatus::Critical
    } else if character.hp <= character.max_hp / 2 {
        HealthStatus::Wounded
    } else {
        HealthStatus::Healthy
    }
}

/// Rates a monster against the character.
///
/// Compares the monster's damage to the character's remaining hp, and
/// the monster's hp to the character's average damage per hit (half the
/// strength, plus an average d6, plus the weapon bonus).
///
/// # Examples
///
/// ```
/// use dungeon_crawler::{classify_threat, new_entity_id, Character, Monster, Threat};
///
/// let hero = Character::new("Hero", new_entity_id());
/// let rat = Monster {
///     id: new_entity_id(),
///     name: "Rat".to_string(),
///     description: String::new(),
///     hp: 5,
///     max_hp: 5,
///     damage: 1,
///     room_id: hero.current_room_id,
///     is_alive: true,
///     loot_table: Vec::new(),
/// };
/// assert_eq!(classify_threat(&rat, &hero, 0), Threat::Trivial);
/// ```
pub fn classify_threat(monster: &Monster, character: &Character, weapon_bonus: i32) -> Threat {
    let monster_threat = f64::from(monster.damage) / f64::from(character.hp.max(1));
    let player_damage =
        f64::from(character.strength) / 2.0 + AVERAGE_D6 + f64::from(weapon_bonus);
    let turns_to_kill = f64::from(monster.hp) / player_damage.max(1.0);

    if monster_threat < 0.1 && turns_to_kill < 2.0 {
        Threat::Trivial
    } else if monster_threat >= 0.5 || turns_to_kill >= 8.0 {
        Threat::Deadly
    } else if monster_threat >= 0.3 || turns_to_kill >= 5.0 {
        Threat::Dangerous
    } else {
        Threat::Normal
    }
}

/// Mood of a room given the threats of the monsters in it.
pub fn classify_atmosphere(room: &Room, threats: &[Threat]) -> Atmosphere {
    let distance = room.x + room.y;

    if threats.is_empty() {
        return if distance <= 1 {
            Atmosphere::Safe
        } else if distance >= 6 {
            Atmosphere::Mysterious
        } else {
            Atmosphere::Tense
        };
    }

    if threats.iter().any(|threat| *threat >= Threat::Dangerous) {
        if distance >= 6 {
            Atmosphere::Ominous
        } else {
            Atmosphere::Dangerous
        }
    } else {
        Atmosphere::Tense
    }
}

pub fn game_phase(room: Option<&Room>) -> GamePhase {
    let Some(room) = room else {
        return GamePhase::EarlyGame;
    };

    let distance = room.x + room.y;
    if room.is_exit {
        GamePhase::Exit
    } else if distance <= 2 {
        GamePhase::EarlyGame
    } else if distance <= 5 {
        GamePhase::MidGame
    } else {
        GamePhase::LateGame
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterView {
    pub id: CharacterId,
    pub name: String,
    pub hp: i32,
    pub max_hp: i32,
    pub strength: i32,
    pub dexterity: i32,
    pub is_alive: bool,
    pub status: HealthStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomView {
    pub id: RoomId,
    pub name: String,
    pub description: String,
    pub is_entrance: bool,
    pub is_exit: bool,
    pub x: i32,
    pub y: i32,
    pub exits: Vec<Direction>,
    pub atmosphere: Atmosphere,
    pub is_first_visit: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonsterView {
    pub id: MonsterId,
    pub name: String,
    pub description: String,
    pub hp: i32,
    pub max_hp: i32,
    pub damage: i32,
    pub threat: Threat,
    /// True only for monsters killed by the action that produced the snapshot
    pub is_defeated: bool,
}

fn is_zero(value: &i32) -> bool {
    *value == 0
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub damage: i32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub armor: i32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub healing: i32,
    pub rarity: Rarity,
    pub is_equipped: bool,
    /// Set on items picked up by the action that produced the snapshot
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_new: bool,
}

impl ItemView {
    fn new(item: &Item, is_new: bool) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            description: item.description.clone(),
            kind: item.kind,
            damage: item.damage,
            armor: item.armor,
            healing: item.healing,
            rarity: item.rarity,
            is_equipped: item.is_equipped,
            is_new,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentView {
    pub weapon: Option<ItemView>,
    pub armor: Option<ItemView>,
}

/// One cell of the map grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapCell {
    pub x: i32,
    pub y: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<RoomId>,
    pub status: CellStatus,
    pub has_player: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exits: Vec<Direction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameContext {
    pub phase: GamePhase,
    pub turns_in_room: u32,
    pub consecutive_combat: u32,
    pub exploration_pct: f64,
}

/// Everything a UI needs to draw the game after one tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateSnapshot {
    pub character: CharacterView,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_room: Option<RoomView>,
    pub monsters: Vec<MonsterView>,
    pub room_items: Vec<ItemView>,
    pub inventory: Vec<ItemView>,
    pub equipment: EquipmentView,
    /// Rows indexed by `y`, cells by `x`
    pub map_grid: Vec<Vec<MapCell>>,
    pub game_over: bool,
    pub victory: bool,
    pub turn_number: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<EventInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combat_result: Option<CombatDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory_delta: Option<InventoryDelta>,
    pub context: GameContext,
}

/// Builds a [`GameStateSnapshot`] from a state and optional turn data.
///
/// # Examples
///
/// ```
/// use dungeon_crawler::{generate_dungeon, GameState, GenerationConfig, SnapshotBuilder};
///
/// let state = GameState::new("Hero", generate_dungeon(&GenerationConfig::new(5)).unwrap()).unwrap();
/// let snapshot = SnapshotBuilder::new(&state).build();
/// assert_eq!(snapshot.map_grid.len(), 5);
/// assert!(snapshot.event.is_none());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SnapshotBuilder<'a> {
    state: &'a GameState,
    report: Option<&'a TurnReport>,
    pacing: Pacing,
    turn_number: u64,
}

impl<'a> SnapshotBuilder<'a> {
    pub fn new(state: &'a GameState) -> Self {
        Self {
            state,
            report: None,
            pacing: Pacing::default(),
            turn_number: 0,
        }
    }

    /// Includes the event, combat and inventory data of the last action.
    pub fn with_report(mut self, report: &'a TurnReport) -> Self {
        self.report = Some(report);
        self
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_turn_number(mut self, turn_number: u64) -> Self {
        self.turn_number = turn_number;
        self
    }

    pub fn build(&self) -> GameStateSnapshot {
        let state = self.state;
        let room = state.current_room();
        let monsters = room.map(|room| self.monster_views(room)).unwrap_or_default();

        let current_room = room.map(|room| {
            let threats: Vec<Threat> = monsters
                .iter()
                .filter(|monster| !monster.is_defeated)
                .map(|monster| monster.threat)
                .collect();
            RoomView {
                id: room.id,
                name: room.name.clone(),
                description: room.description.clone(),
                is_entrance: room.is_entrance,
                is_exit: room.is_exit,
                x: room.x,
                y: room.y,
                exits: state.room_exits(room.id).into_keys().collect(),
                atmosphere: classify_atmosphere(room, &threats),
                is_first_visit: self.report.is_some_and(|report| report.first_visit),
            }
        });

        let room_items = room
            .map(|room| {
                state
                    .room_items(room.id)
                    .into_iter()
                    .map(|item| ItemView::new(item, self.is_item_new(item.id)))
                    .collect()
            })
            .unwrap_or_default();

        let inventory = state
            .inventory()
            .into_iter()
            .map(|item| ItemView::new(item, self.is_item_new(item.id)))
            .collect();

        let equipment = EquipmentView {
            weapon: state.equipped_weapon().map(|item| ItemView::new(item, false)),
            armor: state.equipped_armor().map(|item| ItemView::new(item, false)),
        };

        GameStateSnapshot {
            character: character_view(&state.character),
            current_room,
            monsters,
            room_items,
            inventory,
            equipment,
            map_grid: self.map_grid(),
            game_over: state.is_game_over(),
            victory: state.is_victory(),
            turn_number: self.turn_number,
            event: self.report.and_then(|report| report.event.clone()),
            combat_result: self.report.and_then(|report| report.combat.clone()),
            inventory_delta: self
                .report
                .map(|report| report.inventory_delta.clone())
                .filter(|delta| !delta.is_empty()),
            context: GameContext {
                phase: game_phase(room),
                turns_in_room: self.pacing.turns_in_room,
                consecutive_combat: self.pacing.consecutive_combat,
                exploration_pct: state.exploration_pct(),
            },
        }
    }

    /// Alive monsters, then the ones this turn killed.
    fn monster_views(&self, room: &Room) -> Vec<MonsterView> {
        let state = self.state;
        let weapon_bonus = state.weapon_bonus();

        let room_id = room.id;
        let defeated = self.report.into_iter().flat_map(move |report| {
            report
                .defeated_monsters
                .iter()
                .filter_map(move |monster_id| state.monsters.get(monster_id))
                .filter(move |monster| monster.room_id == room_id && !monster.is_alive)
        });

        state
            .room_monsters(room.id)
            .into_iter()
            .chain(defeated)
            .map(|monster| MonsterView {
                id: monster.id,
                name: monster.name.clone(),
                description: monster.description.clone(),
                hp: monster.hp,
                max_hp: monster.max_hp,
                damage: monster.damage,
                threat: classify_threat(monster, &state.character, weapon_bonus),
                is_defeated: self
                    .report
                    .is_some_and(|report| report.is_monster_defeated(monster.id)),
            })
            .collect()
    }

    fn map_grid(&self) -> Vec<Vec<MapCell>> {
        let state = self.state;
        let size = state.grid_size() as i32;

        (0..size)
            .map(|y| {
                (0..size)
                    .map(|x| match state.room_at(Position::new(x, y)) {
                        Some(room) => {
                            let status = cell_status(state, room);
                            MapCell {
                                x,
                                y,
                                room_id: Some(room.id),
                                status,
                                has_player: status == CellStatus::Current,
                                exits: state.room_exits(room.id).into_keys().collect(),
                            }
                        }
                        None => MapCell {
                            x,
                            y,
                            room_id: None,
                            status: CellStatus::Unknown,
                            has_player: false,
                            exits: Vec::new(),
                        },
                    })
                    .collect()
            })
            .collect()
    }

    fn is_item_new(&self, item_id: ItemId) -> bool {
        self.report.is_some_and(|report| report.is_item_new(item_id))
    }
}

fn character_view(character: &Character) -> CharacterView {
    CharacterView {
        id: character.id,
        name: character.name.clone(),
        hp: character.hp,
        max_hp: character.max_hp,
        strength: character.strength,
        dexterity: character.dexterity,
        is_alive: character.is_alive,
        status: health_status(character),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{new_entity_id, ItemLocation};
    use crate::generation::{generate_dungeon, GenerationConfig};
    use crate::mcp::EventSubtype;

    fn new_state(seed: u64) -> GameState {
        let generated = generate_dungeon(&GenerationConfig::new(seed)).unwrap();
        GameState::new("Hero", generated).unwrap()
    }

    fn monster(hp: i32, damage: i32, room_id: RoomId) -> Monster {
        Monster {
            id: new_entity_id(),
            name: "Orc".to_string(),
            description: String::new(),
            hp,
            max_hp: hp,
            damage,
            room_id,
            is_alive: true,
            loot_table: Vec::new(),
        }
    }

    fn room_at(x: i32, y: i32) -> Room {
        Room {
            id: new_entity_id(),
            dungeon_id: new_entity_id(),
            name: "Hall".to_string(),
            description: String::new(),
            is_entrance: false,
            is_exit: false,
            x,
            y,
        }
    }

    #[test]
    fn test_health_status_thresholds() {
        let mut hero = Character::new("Hero", new_entity_id());
        assert_eq!(health_status(&hero), HealthStatus::Healthy);
        hero.hp = 10;
        assert_eq!(health_status(&hero), HealthStatus::Wounded);
        hero.hp = 5;
        assert_eq!(health_status(&hero), HealthStatus::Critical);
        hero.die();
        assert_eq!(health_status(&hero), HealthStatus::Dead);
        assert_eq!(HealthStatus::Critical.to_string(), "Critical");
    }

    #[test]
    fn test_threat_levels() {
        let hero = Character::new("Hero", new_entity_id());
        let room = hero.current_room_id;
        // 8.5 average damage per hit at strength 10.
        assert_eq!(classify_threat(&monster(5, 1, room), &hero, 0), Threat::Trivial);
        assert_eq!(classify_threat(&monster(10, 4, room), &hero, 0), Threat::Normal);
        assert_eq!(classify_threat(&monster(10, 6, room), &hero, 0), Threat::Dangerous);
        assert_eq!(classify_threat(&monster(10, 10, room), &hero, 0), Threat::Deadly);
        assert_eq!(classify_threat(&monster(70, 2, room), &hero, 0), Threat::Deadly);
        assert_eq!(classify_threat(&monster(45, 2, room), &hero, 0), Threat::Dangerous);
        // A better weapon shortens the fight.
        assert_eq!(classify_threat(&monster(45, 2, room), &hero, 5), Threat::Normal);
    }

    #[test]
    fn test_atmosphere_rules() {
        assert_eq!(classify_atmosphere(&room_at(1, 0), &[]), Atmosphere::Safe);
        assert_eq!(classify_atmosphere(&room_at(2, 2), &[]), Atmosphere::Tense);
        assert_eq!(classify_atmosphere(&room_at(3, 3), &[]), Atmosphere::Mysterious);
        assert_eq!(
            classify_atmosphere(&room_at(1, 1), &[Threat::Trivial, Threat::Normal]),
            Atmosphere::Tense
        );
        assert_eq!(
            classify_atmosphere(&room_at(1, 1), &[Threat::Normal, Threat::Dangerous]),
            Atmosphere::Dangerous
        );
        assert_eq!(
            classify_atmosphere(&room_at(4, 3), &[Threat::Deadly]),
            Atmosphere::Ominous
        );
    }

    #[test]
    fn test_game_phase() {
        assert_eq!(game_phase(None), GamePhase::EarlyGame);
        assert_eq!(game_phase(Some(&room_at(1, 1))), GamePhase::EarlyGame);
        assert_eq!(game_phase(Some(&room_at(3, 2))), GamePhase::MidGame);
        assert_eq!(game_phase(Some(&room_at(4, 3))), GamePhase::LateGame);
        let mut exit = room_at(4, 4);
        exit.is_exit = true;
        assert_eq!(game_phase(Some(&exit)), GamePhase::Exit);
    }

    #[test]
    fn test_fresh_snapshot() {
        let state = new_state(11);
        let snapshot = SnapshotBuilder::new(&state).build();

        assert_eq!(snapshot.character.status, HealthStatus::Healthy);
        let room = snapshot.current_room.as_ref().unwrap();
        assert!(room.is_entrance);
        assert_eq!(room.atmosphere, Atmosphere::Safe);
        assert!(!room.is_first_visit);
        assert!(snapshot.monsters.is_empty());
        assert_eq!(snapshot.room_items.len(), 1);
        assert!(snapshot.inventory.is_empty());
        assert!(snapshot.equipment.weapon.is_none());
        assert!(!snapshot.game_over);
        assert_eq!(snapshot.context.phase, GamePhase::EarlyGame);
        assert!((snapshot.context.exploration_pct - 4.0).abs() < 1e-9);

        let origin = &snapshot.map_grid[0][0];
        assert_eq!(origin.status, CellStatus::Current);
        assert!(origin.has_player);
        assert_eq!(origin.exits, room.exits);
        assert_eq!(snapshot.map_grid[4][4].status, CellStatus::Unknown);
        assert_eq!(snapshot.map_grid.iter().flatten().filter(|c| c.has_player).count(), 1);
    }

    #[test]
    fn test_snapshot_json_shape() {
        let state = new_state(12);
        let json = serde_json::to_value(SnapshotBuilder::new(&state).build()).unwrap();

        assert_eq!(json["character"]["maxHp"], 20);
        assert_eq!(json["character"]["status"], "Healthy");
        assert_eq!(json["currentRoom"]["isEntrance"], true);
        assert_eq!(json["mapGrid"][0][0]["status"], "current");
        assert_eq!(json["context"]["phase"], "early_game");
        assert_eq!(json["roomItems"][0]["type"], "consumable");
        assert_eq!(json["roomItems"][0]["healing"], 10);
        assert!(json["roomItems"][0].get("damage").is_none());
        assert!(json["roomItems"][0].get("isNew").is_none());
        assert!(json.get("event").is_none());
        assert!(json.get("inventoryDelta").is_none());
    }

    #[test]
    fn test_report_marks_new_items_and_defeats() {
        let mut state = new_state(13);
        let room_id = state.character.current_room_id;
        let potion_id = state.room_items(room_id)[0].id;
        state.take_item(potion_id).unwrap();

        let orc = monster(1, 1, room_id);
        let orc_id = orc.id;
        state.add_monster(orc);
        state.kill_monster(orc_id);

        let mut report = TurnReport::new();
        report.record_item_taken(potion_id);
        report.record_monster_defeated(orc_id);
        report.set_event(EventSubtype::EnemyDefeated, vec![orc_id]);

        let snapshot = SnapshotBuilder::new(&state)
            .with_report(&report)
            .with_turn_number(4)
            .build();
        assert_eq!(snapshot.turn_number, 4);
        assert!(snapshot.inventory[0].is_new);
        assert_eq!(snapshot.monsters.len(), 1);
        assert!(snapshot.monsters[0].is_defeated);
        assert_eq!(snapshot.event.unwrap().subtype, EventSubtype::EnemyDefeated);
        assert_eq!(snapshot.inventory_delta.unwrap().added, vec![potion_id]);
        // The dead orc does not darken the room.
        assert_eq!(snapshot.current_room.unwrap().atmosphere, Atmosphere::Safe);

        // Without the report the corpse is gone from the view.
        let later = SnapshotBuilder::new(&state).build();
        assert!(later.monsters.is_empty());
        assert!(!later.inventory[0].is_new);
    }

    #[test]
    fn test_equipment_view() {
        let mut state = new_state(14);
        let sword = Item {
            id: new_entity_id(),
            name: "Short Sword".to_string(),
            description: String::new(),
            kind: ItemKind::Weapon,
            damage: 5,
            armor: 0,
            healing: 0,
            rarity: Rarity::Uncommon,
            location: ItemLocation::Carried(state.character.id),
            is_equipped: false,
        };
        let sword_id = sword.id;
        state.add_item(sword);
        state.equip_item(sword_id).unwrap();

        let snapshot = SnapshotBuilder::new(&state).build();
        let weapon = snapshot.equipment.weapon.unwrap();
        assert_eq!(weapon.id, sword_id);
        assert!(weapon.is_equipped);
        assert!(snapshot.equipment.armor.is_none());
        assert!(snapshot.inventory[0].is_equipped);
    }
}
