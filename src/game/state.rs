//! # Game State Module
//!
//! The in-memory store for one running game.
//!
//! [`GameState`] owns every entity of a dungeon run and is the only place
//! where rules about movement, inventory and death are enforced. Each
//! mutation validates completely before touching anything, so a rejected
//! action leaves the state exactly as it was.

use crate::game::{
    execute_combat_turn, Character, CombatRound, Connection, Direction, Dungeon, EntityId,
    EquipmentSlot, Item, ItemId, ItemKind, ItemLocation, Monster, MonsterId, Position, Room,
    RoomId, Trap,
};
use crate::generation::GeneratedDungeon;
use crate::utils::{reachable_rooms, route_between, Dice};
use crate::{CrawlerError, CrawlerResult};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Reasons the game rules refuse an action.
///
/// The display strings double as the narrative shown to the player.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleViolation {
    #[error("You are dead.")]
    CharacterDead,

    #[error("The game is over.")]
    GameOver,

    #[error("Cannot leave while monsters are present - defeat them first.")]
    MonstersBlocking,

    #[error("Cannot move {0} - no exit in that direction.")]
    NoExit(Direction),

    #[error("Item not found. Use 'look' to see available items.")]
    ItemNotFound,

    #[error("That item is not in this room.")]
    ItemNotInRoom,

    #[error("That item is already being carried.")]
    ItemAlreadyCarried,

    #[error("That item is not in your inventory. Pick it up first with 'take'.")]
    ItemNotCarried,

    #[error("Cannot use the {0} - it's not consumable.")]
    NotConsumable(String),

    #[error("Cannot equip the {0} - it's not a weapon or armor.")]
    NotEquippable(String),

    #[error("Monster not found. Use 'look' to see available targets.")]
    MonsterNotFound,

    #[error("That monster is not in this room.")]
    MonsterNotHere,

    #[error("That monster is already dead.")]
    MonsterAlreadyDead,
}

/// How the current run stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameCompletionState {
    /// Game is still in progress
    #[default]
    Playing,
    /// The character reached the exit room
    Victory,
    /// The character died
    PlayerDied,
}

/// Result of consuming an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemUse {
    /// The item as it was before it was consumed
    pub item: Item,
    /// Hit points actually restored
    pub healed: i32,
}

/// Result of equipping an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquipChange {
    pub slot: EquipmentSlot,
    pub item_id: ItemId,
    pub item_name: String,
    /// Damage or armor bonus granted by the new item
    pub bonus: i32,
    /// Name of the item that was unequipped from the same slot
    pub replaced: Option<String>,
}

/// All entities of one game, keyed by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// The player character
    pub character: Character,
    /// The dungeon being explored
    pub dungeon: Dungeon,
    /// Rooms by id
    pub rooms: HashMap<RoomId, Room>,
    /// Outgoing connections by source room id
    pub connections: HashMap<RoomId, Vec<Connection>>,
    /// Monsters by id, dead ones included
    pub monsters: HashMap<MonsterId, Monster>,
    /// Items by id; consumed items are removed
    pub items: HashMap<ItemId, Item>,
    /// Traps by id
    pub traps: HashMap<EntityId, Trap>,
    /// Rooms the character has entered
    pub visited_rooms: HashSet<RoomId>,
    /// Whether the run is still going
    pub completion_state: GameCompletionState,
    /// Coordinate index, rebuilt from `rooms` after loading
    #[serde(skip)]
    rooms_by_coord: HashMap<Position, RoomId>,
}

impl GameState {
    /// Builds the state for a freshly generated dungeon and places a new
    /// character at its entrance.
    ///
    /// # Examples
    ///
    /// ```
    /// use dungeon_crawler::{generate_dungeon, GameState, GenerationConfig};
    ///
    /// let generated = generate_dungeon(&GenerationConfig::for_testing(3)).unwrap();
    /// let state = GameState::new("Hero", generated).unwrap();
    /// assert!(state.current_room().unwrap().is_entrance);
    /// assert!(state.is_room_visited(state.character.current_room_id));
    /// ```
    pub fn new(character_name: &str, generated: GeneratedDungeon) -> CrawlerResult<Self> {
        let entrance_id = generated
            .layout
            .rooms
            .iter()
            .find(|room| room.is_entrance)
            .map(|room| room.id)
            .ok_or_else(|| CrawlerError::InvalidState("Dungeon has no entrance".to_string()))?;

        let mut state = Self {
            character: Character::new(character_name, entrance_id),
            dungeon: generated.layout.dungeon,
            rooms: HashMap::new(),
            connections: HashMap::new(),
            monsters: HashMap::new(),
            items: HashMap::new(),
            traps: HashMap::new(),
            visited_rooms: HashSet::new(),
            completion_state: GameCompletionState::Playing,
            rooms_by_coord: HashMap::new(),
        };

        for room in generated.layout.rooms {
            state.add_room(room);
        }
        for connection in generated.layout.connections {
            state.add_connection(connection);
        }
        for monster in generated.monsters {
            state.add_monster(monster);
        }
        for item in generated.items {
            state.add_item(item);
        }
        for trap in generated.traps {
            state.add_trap(trap);
        }
        state.mark_room_visited(entrance_id);

        Ok(state)
    }

    /// Adds a room to the state and the coordinate index.
    pub fn add_room(&mut self, room: Room) {
        self.rooms_by_coord.insert(room.position(), room.id);
        self.rooms.insert(room.id, room);
    }

    /// Adds a directed connection.
    pub fn add_connection(&mut self, connection: Connection) {
        self.connections
            .entry(connection.room_id)
            .or_default()
            .push(connection);
    }

    pub fn add_monster(&mut self, monster: Monster) {
        self.monsters.insert(monster.id, monster);
    }

    pub fn add_item(&mut self, item: Item) {
        self.items.insert(item.id, item);
    }

    pub fn add_trap(&mut self, trap: Trap) {
        self.traps.insert(trap.id, trap);
    }

    pub fn mark_room_visited(&mut self, room_id: RoomId) {
        self.visited_rooms.insert(room_id);
    }

    /// True once the run ended in victory or death.
    pub fn is_game_over(&self) -> bool {
        self.completion_state != GameCompletionState::Playing
    }

    pub fn is_victory(&self) -> bool {
        self.completion_state == GameCompletionState::Victory
    }

    /// Width and height of the room grid.
    pub fn grid_size(&self) -> u32 {
        self.dungeon.grid_size
    }

    pub fn room(&self, room_id: RoomId) -> Option<&Room> {
        self.rooms.get(&room_id)
    }

    /// The room the character is standing in.
    pub fn current_room(&self) -> Option<&Room> {
        self.room(self.character.current_room_id)
    }

    pub fn room_at(&self, position: Position) -> Option<&Room> {
        self.rooms_by_coord
            .get(&position)
            .and_then(|room_id| self.rooms.get(room_id))
    }

    pub fn exit_room(&self) -> Option<&Room> {
        self.rooms.values().find(|room| room.is_exit)
    }

    /// Exits of a room as direction → destination, in north/south/east/west
    /// order.
    pub fn room_exits(&self, room_id: RoomId) -> BTreeMap<Direction, RoomId> {
        self.connections
            .get(&room_id)
            .map(|outgoing| {
                outgoing
                    .iter()
                    .map(|c| (c.direction, c.connected_room_id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Alive monsters in a room, ordered by name.
    pub fn room_monsters(&self, room_id: RoomId) -> Vec<&Monster> {
        let mut monsters: Vec<&Monster> = self
            .monsters
            .values()
            .filter(|m| m.room_id == room_id && m.is_alive)
            .collect();
        monsters.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        monsters
    }

    pub fn has_monsters_in_room(&self, room_id: RoomId) -> bool {
        self.monsters
            .values()
            .any(|m| m.room_id == room_id && m.is_alive)
    }

    /// Items lying on a room's floor, ordered by name.
    pub fn room_items(&self, room_id: RoomId) -> Vec<&Item> {
        self.sorted_items(|item| item.is_on_floor_of(room_id))
    }

    /// Items carried by the character, ordered by name.
    pub fn inventory(&self) -> Vec<&Item> {
        let character_id = self.character.id;
        self.sorted_items(|item| item.is_carried_by(character_id))
    }

    pub fn room_traps(&self, room_id: RoomId) -> Vec<&Trap> {
        self.traps
            .values()
            .filter(|trap| trap.room_id == room_id)
            .collect()
    }

    pub fn is_room_visited(&self, room_id: RoomId) -> bool {
        self.visited_rooms.contains(&room_id)
    }

    /// True if a visited grid neighbour has a connection leading into
    /// `room_id`.
    pub fn is_room_adjacent(&self, room_id: RoomId) -> bool {
        let Some(room) = self.room(room_id) else {
            return false;
        };

        room.position()
            .cardinal_adjacent_positions()
            .into_iter()
            .filter_map(|position| self.room_at(position))
            .filter(|neighbour| self.is_room_visited(neighbour.id))
            .any(|neighbour| self.room_exits(neighbour.id).values().any(|id| *id == room_id))
    }

    /// Share of rooms visited, in percent.
    pub fn exploration_pct(&self) -> f64 {
        if self.rooms.is_empty() {
            return 0.0;
        }
        let visited = self
            .rooms
            .keys()
            .filter(|room_id| self.is_room_visited(**room_id))
            .count();
        visited as f64 / self.rooms.len() as f64 * 100.0
    }

    pub fn equipped_weapon(&self) -> Option<&Item> {
        self.character
            .equipped_weapon_id
            .and_then(|item_id| self.items.get(&item_id))
    }

    pub fn equipped_armor(&self) -> Option<&Item> {
        self.character
            .equipped_armor_id
            .and_then(|item_id| self.items.get(&item_id))
    }

    /// Extra damage from the equipped weapon.
    pub fn weapon_bonus(&self) -> i32 {
        self.equipped_weapon().map(|item| item.damage).unwrap_or(0)
    }

    /// Extra defense from the equipped armor.
    pub fn armor_bonus(&self) -> i32 {
        self.equipped_armor().map(|item| item.armor).unwrap_or(0)
    }

    /// Every room reachable from the character's position.
    pub fn reachable_rooms(&self) -> HashSet<RoomId> {
        reachable_rooms(self.character.current_room_id, &self.connections)
    }

    /// Shortest list of moves from the character's room to `room_id`.
    pub fn route_to(&self, room_id: RoomId) -> Option<Vec<Direction>> {
        route_between(self.character.current_room_id, room_id, &self.connections)
    }

    /// Moves the character through the exit in `direction`.
    ///
    /// Entering the exit room wins the game.
    pub fn move_character(&mut self, direction: Direction) -> CrawlerResult<RoomId> {
        self.ensure_playing()?;

        let current_room_id = self.character.current_room_id;
        if self.has_monsters_in_room(current_room_id) {
            return Err(RuleViolation::MonstersBlocking.into());
        }

        let destination = self
            .room_exits(current_room_id)
            .get(&direction)
            .copied()
            .ok_or(RuleViolation::NoExit(direction))?;

        self.character.current_room_id = destination;
        self.mark_room_visited(destination);
        debug!("Character moved {} into room {}", direction, destination);

        if self.room(destination).is_some_and(|room| room.is_exit) {
            self.completion_state = GameCompletionState::Victory;
            debug!("Character reached the exit");
        }

        Ok(destination)
    }

    /// Picks an item up from the floor of the current room.
    pub fn take_item(&mut self, item_id: ItemId) -> CrawlerResult<()> {
        self.ensure_playing()?;

        let character_id = self.character.id;
        let current_room_id = self.character.current_room_id;
        let item = self
            .items
            .get_mut(&item_id)
            .ok_or(RuleViolation::ItemNotFound)?;

        match item.location {
            ItemLocation::Carried(_) => return Err(RuleViolation::ItemAlreadyCarried.into()),
            ItemLocation::Floor(room_id) if room_id != current_room_id => {
                return Err(RuleViolation::ItemNotInRoom.into())
            }
            ItemLocation::Floor(_) => {}
        }

        item.location = ItemLocation::Carried(character_id);
        debug!("Character picked up {}", item.name);
        Ok(())
    }

    /// Consumes an item from the inventory, applying its healing.
    ///
    /// The item is removed from the game.
    pub fn use_item(&mut self, item_id: ItemId) -> CrawlerResult<ItemUse> {
        self.ensure_playing()?;

        let item = self
            .items
            .get(&item_id)
            .ok_or(RuleViolation::ItemNotFound)?;
        if !item.is_carried_by(self.character.id) {
            return Err(RuleViolation::ItemNotCarried.into());
        }
        if item.kind != ItemKind::Consumable {
            return Err(RuleViolation::NotConsumable(item.name.clone()).into());
        }

        let item = self
            .items
            .remove(&item_id)
            .ok_or(RuleViolation::ItemNotFound)?;
        let healed = self.character.heal(item.healing);
        debug!("Character used {} and healed {}", item.name, healed);

        Ok(ItemUse { item, healed })
    }

    /// Equips a carried weapon or armor, unequipping whatever held the slot.
    pub fn equip_item(&mut self, item_id: ItemId) -> CrawlerResult<EquipChange> {
        self.ensure_playing()?;

        let item = self
            .items
            .get(&item_id)
            .ok_or(RuleViolation::ItemNotFound)?;
        if !item.is_carried_by(self.character.id) {
            return Err(RuleViolation::ItemNotCarried.into());
        }
        let slot = item
            .kind
            .slot()
            .ok_or_else(|| RuleViolation::NotEquippable(item.name.clone()))?;

        let previous = match slot {
            EquipmentSlot::Weapon => self.character.equipped_weapon_id.replace(item_id),
            EquipmentSlot::Armor => self.character.equipped_armor_id.replace(item_id),
        };

        let replaced = previous
            .filter(|previous_id| *previous_id != item_id)
            .and_then(|previous_id| self.items.get_mut(&previous_id))
            .map(|old| {
                old.is_equipped = false;
                old.name.clone()
            });

        let item = self
            .items
            .get_mut(&item_id)
            .ok_or(RuleViolation::ItemNotFound)?;
        item.is_equipped = true;
        let bonus = match slot {
            EquipmentSlot::Weapon => item.damage,
            EquipmentSlot::Armor => item.armor,
        };

        Ok(EquipChange {
            slot,
            item_id,
            item_name: item.name.clone(),
            bonus,
            replaced,
        })
    }

    /// Fights one combat round against a monster in the current room.
    ///
    /// Kill transitions are applied here, so after this returns the monster
    /// or the character is marked dead as the round dictates.
    pub fn attack_monster(&mut self, monster_id: MonsterId, dice: &Dice) -> CrawlerResult<CombatRound> {
        self.ensure_playing()?;

        let weapon_bonus = self.weapon_bonus();
        let armor_bonus = self.armor_bonus();
        let current_room_id = self.character.current_room_id;

        let monster = self
            .monsters
            .get_mut(&monster_id)
            .ok_or(RuleViolation::MonsterNotFound)?;
        if monster.room_id != current_room_id {
            return Err(RuleViolation::MonsterNotHere.into());
        }
        if !monster.is_alive {
            return Err(RuleViolation::MonsterAlreadyDead.into());
        }

        let round = execute_combat_turn(
            dice,
            &mut self.character,
            monster,
            weapon_bonus,
            armor_bonus,
        );

        if round.summary.attacker_died {
            self.kill_character();
        } else if round.summary.defender_died {
            self.kill_monster(monster_id);
        }

        Ok(round)
    }

    /// Marks a monster dead and returns the loot it dropped.
    ///
    /// Loot drops are not implemented, so the list is always empty.
    pub fn kill_monster(&mut self, monster_id: MonsterId) -> Vec<Item> {
        if let Some(monster) = self.monsters.get_mut(&monster_id) {
            monster.die();
        }
        Vec::new()
    }

    /// Marks the character dead and ends the game. Idempotent.
    pub fn kill_character(&mut self) {
        self.character.die();
        self.completion_state = GameCompletionState::PlayerDied;
    }

    /// Saves the game state to JSON.
    pub fn save_to_json(&self) -> CrawlerResult<String> {
        serde_json::to_string_pretty(self).map_err(CrawlerError::from)
    }

    /// Loads game state from JSON.
    pub fn load_from_json(json: &str) -> CrawlerResult<Self> {
        let mut state: Self = serde_json::from_str(json)?;
        state.rooms_by_coord = state
            .rooms
            .values()
            .map(|room| (room.position(), room.id))
            .collect();
        Ok(state)
    }

    fn ensure_playing(&self) -> CrawlerResult<()> {
        if !self.character.is_alive {
            return Err(RuleViolation::CharacterDead.into());
        }
        if self.is_game_over() {
            return Err(RuleViolation::GameOver.into());
        }
        Ok(())
    }

    fn sorted_items(&self, keep: impl Fn(&Item) -> bool) -> Vec<&Item> {
        let mut items: Vec<&Item> = self.items.values().filter(|item| keep(item)).collect();
        items.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{new_entity_id, Rarity};
    use crate::generation::{generate_dungeon, GenerationConfig};

    fn new_state(seed: u64) -> GameState {
        let generated = generate_dungeon(&GenerationConfig::for_testing(seed)).unwrap();
        GameState::new("Hero", generated).unwrap()
    }

    fn item(kind: ItemKind, location: ItemLocation) -> Item {
        Item {
            id: new_entity_id(),
            name: format!("Test {}", kind),
            description: String::new(),
            kind,
            damage: 3,
            armor: 2,
            healing: 10,
            rarity: Rarity::Common,
            location,
            is_equipped: false,
        }
    }

    fn monster_in(room_id: RoomId) -> Monster {
        Monster {
            id: new_entity_id(),
            name: "Rat".to_string(),
            description: String::new(),
            hp: 5,
            max_hp: 5,
            damage: 2,
            room_id,
            is_alive: true,
            loot_table: Vec::new(),
        }
    }

    fn first_exit(state: &GameState) -> (Direction, RoomId) {
        state
            .room_exits(state.character.current_room_id)
            .into_iter()
            .next()
            .unwrap()
    }

    #[test]
    fn test_new_state_starts_at_entrance() {
        let state = new_state(1);
        let room = state.current_room().unwrap();
        assert!(room.is_entrance);
        assert_eq!(room.position(), Position::origin());
        assert_eq!(state.visited_rooms.len(), 1);
        assert_eq!(state.completion_state, GameCompletionState::Playing);
        assert!(state.room_monsters(room.id).is_empty());
        assert_eq!(state.room_items(room.id).len(), 1);
        assert!(state.inventory().is_empty());
    }

    #[test]
    fn test_room_at_uses_coordinates() {
        let state = new_state(2);
        let exit = state.room_at(Position::new(4, 4)).unwrap();
        assert!(exit.is_exit);
        assert!(state.room_at(Position::new(5, 5)).is_none());
        assert_eq!(state.exit_room().unwrap().id, exit.id);
    }

    #[test]
    fn test_move_character_follows_exit() {
        let mut state = new_state(3);
        let start = state.character.current_room_id;
        let (direction, destination) = first_exit(&state);

        let moved_to = state.move_character(direction).unwrap();
        assert_eq!(moved_to, destination);
        assert_eq!(state.character.current_room_id, destination);
        assert!(state.is_room_visited(destination));
        assert!(state.room_exits(destination).values().any(|id| *id == start));
    }

    #[test]
    fn test_move_without_exit_fails() {
        let mut state = new_state(4);
        // The entrance is in the south-west corner.
        let err = state.move_character(Direction::South).unwrap_err();
        assert!(matches!(
            err,
            CrawlerError::Rule(RuleViolation::NoExit(Direction::South))
        ));
        assert!(state.current_room().unwrap().is_entrance);
    }

    #[test]
    fn test_monsters_block_movement() {
        let mut state = new_state(5);
        let start = state.character.current_room_id;
        state.add_monster(monster_in(start));

        for direction in Direction::cardinal() {
            let err = state.move_character(direction).unwrap_err();
            assert!(matches!(err, CrawlerError::Rule(RuleViolation::MonstersBlocking)));
            assert_eq!(state.character.current_room_id, start);
        }
    }

    #[test]
    fn test_dead_monsters_do_not_block() {
        let mut state = new_state(6);
        let start = state.character.current_room_id;
        let rat = monster_in(start);
        let rat_id = rat.id;
        state.add_monster(rat);

        assert!(state.kill_monster(rat_id).is_empty());
        assert!(state.kill_monster(rat_id).is_empty());
        assert!(!state.has_monsters_in_room(start));
        assert_eq!(state.monsters[&rat_id].hp, 0);

        let (direction, _) = first_exit(&state);
        assert!(state.move_character(direction).is_ok());
    }

    #[test]
    fn test_reaching_exit_is_victory() {
        let mut state = new_state(7);
        for monster in state.monsters.values_mut() {
            monster.die();
        }
        let exit_id = state.exit_room().unwrap().id;
        let route = state.route_to(exit_id).unwrap();
        assert!(!route.is_empty());

        for direction in route {
            state.move_character(direction).unwrap();
        }

        assert_eq!(state.character.current_room_id, exit_id);
        assert!(state.is_victory());
        assert!(state.is_game_over());

        let err = state.move_character(Direction::South).unwrap_err();
        assert!(matches!(err, CrawlerError::Rule(RuleViolation::GameOver)));
        assert_eq!(state.character.current_room_id, exit_id);
    }

    #[test]
    fn test_take_item_moves_it_to_inventory() {
        let mut state = new_state(8);
        let room_id = state.character.current_room_id;
        let potion_id = state.room_items(room_id)[0].id;

        state.take_item(potion_id).unwrap();
        let potion = &state.items[&potion_id];
        assert_eq!(potion.room_id(), None);
        assert_eq!(potion.character_id(), Some(state.character.id));
        assert_eq!(state.inventory().len(), 1);
        assert!(state.room_items(room_id).is_empty());

        let err = state.take_item(potion_id).unwrap_err();
        assert!(matches!(err, CrawlerError::Rule(RuleViolation::ItemAlreadyCarried)));
    }

    #[test]
    fn test_take_item_elsewhere_fails() {
        let mut state = new_state(9);
        let (_, neighbour) = first_exit(&state);
        let dagger = item(ItemKind::Weapon, ItemLocation::Floor(neighbour));
        let dagger_id = dagger.id;
        state.add_item(dagger);

        let err = state.take_item(dagger_id).unwrap_err();
        assert!(matches!(err, CrawlerError::Rule(RuleViolation::ItemNotInRoom)));
        assert!(state.items[&dagger_id].is_on_floor_of(neighbour));

        let err = state.take_item(new_entity_id()).unwrap_err();
        assert!(matches!(err, CrawlerError::Rule(RuleViolation::ItemNotFound)));
    }

    #[test]
    fn test_use_potion_heals_and_consumes() {
        let mut state = new_state(10);
        let room_id = state.character.current_room_id;
        let potion_id = state.room_items(room_id)[0].id;
        state.take_item(potion_id).unwrap();
        state.character.hp = 5;

        let used = state.use_item(potion_id).unwrap();
        assert_eq!(used.healed, 10);
        assert_eq!(state.character.hp, 15);
        assert!(!state.items.contains_key(&potion_id));
        assert!(state.inventory().is_empty());
    }

    #[test]
    fn test_use_potion_at_full_health_is_clamped() {
        let mut state = new_state(11);
        let room_id = state.character.current_room_id;
        let potion_id = state.room_items(room_id)[0].id;
        state.take_item(potion_id).unwrap();

        let used = state.use_item(potion_id).unwrap();
        assert_eq!(used.healed, 0);
        assert_eq!(state.character.hp, state.character.max_hp);
        assert!(!state.items.contains_key(&potion_id));
    }

    #[test]
    fn test_use_rejects_floor_items_and_non_consumables() {
        let mut state = new_state(12);
        let room_id = state.character.current_room_id;
        let potion_id = state.room_items(room_id)[0].id;
        let err = state.use_item(potion_id).unwrap_err();
        assert!(matches!(err, CrawlerError::Rule(RuleViolation::ItemNotCarried)));
        assert!(state.items.contains_key(&potion_id));

        let sword = item(ItemKind::Weapon, ItemLocation::Carried(state.character.id));
        let sword_id = sword.id;
        state.add_item(sword);
        let err = state.use_item(sword_id).unwrap_err();
        assert!(matches!(err, CrawlerError::Rule(RuleViolation::NotConsumable(_))));
        assert!(state.items.contains_key(&sword_id));
    }

    #[test]
    fn test_equip_swaps_slot() {
        let mut state = new_state(13);
        let owner = ItemLocation::Carried(state.character.id);
        let first = item(ItemKind::Weapon, owner);
        let second = item(ItemKind::Weapon, owner);
        let armor = item(ItemKind::Armor, owner);
        let (first_id, second_id, armor_id) = (first.id, second.id, armor.id);
        state.add_item(first);
        state.add_item(second);
        state.add_item(armor);

        let change = state.equip_item(first_id).unwrap();
        assert_eq!(change.slot, EquipmentSlot::Weapon);
        assert_eq!(change.replaced, None);
        assert_eq!(state.weapon_bonus(), 3);

        let change = state.equip_item(second_id).unwrap();
        assert!(change.replaced.is_some());
        assert!(!state.items[&first_id].is_equipped);
        assert!(state.items[&second_id].is_equipped);
        assert_eq!(state.character.equipped_weapon_id, Some(second_id));

        state.equip_item(armor_id).unwrap();
        assert_eq!(state.armor_bonus(), 2);
        assert_eq!(state.character.equipped_weapon_id, Some(second_id));

        // Re-equipping the same item does not unequip it.
        let change = state.equip_item(armor_id).unwrap();
        assert_eq!(change.replaced, None);
        assert!(state.items[&armor_id].is_equipped);
    }

    #[test]
    fn test_equip_rejects_wrong_kind_or_owner() {
        let mut state = new_state(14);
        let room_id = state.character.current_room_id;
        let floor_sword = item(ItemKind::Weapon, ItemLocation::Floor(room_id));
        let key = item(ItemKind::Key, ItemLocation::Carried(state.character.id));
        let (sword_id, key_id) = (floor_sword.id, key.id);
        state.add_item(floor_sword);
        state.add_item(key);

        let err = state.equip_item(sword_id).unwrap_err();
        assert!(matches!(err, CrawlerError::Rule(RuleViolation::ItemNotCarried)));
        let err = state.equip_item(key_id).unwrap_err();
        assert!(matches!(err, CrawlerError::Rule(RuleViolation::NotEquippable(_))));
        assert!(state.character.equipped_weapon_id.is_none());
        assert!(!state.items[&key_id].is_equipped);
    }

    #[test]
    fn test_attack_validation() {
        let mut state = new_state(15);
        let dice = Dice::new(1);
        let (_, neighbour) = first_exit(&state);
        let far_rat = monster_in(neighbour);
        let far_id = far_rat.id;
        state.add_monster(far_rat);

        let err = state.attack_monster(new_entity_id(), &dice).unwrap_err();
        assert!(matches!(err, CrawlerError::Rule(RuleViolation::MonsterNotFound)));
        let err = state.attack_monster(far_id, &dice).unwrap_err();
        assert!(matches!(err, CrawlerError::Rule(RuleViolation::MonsterNotHere)));

        let here = monster_in(state.character.current_room_id);
        let here_id = here.id;
        state.add_monster(here);
        state.kill_monster(here_id);
        let err = state.attack_monster(here_id, &dice).unwrap_err();
        assert!(matches!(err, CrawlerError::Rule(RuleViolation::MonsterAlreadyDead)));
    }

    #[test]
    fn test_attack_until_monster_falls() {
        let mut state = new_state(16);
        let dice = Dice::new(3);
        let mut rat = monster_in(state.character.current_room_id);
        rat.damage = 0;
        let rat_id = rat.id;
        state.add_monster(rat);

        for _ in 0..100 {
            let round = state.attack_monster(rat_id, &dice).unwrap();
            if round.detail.enemy_defeated {
                break;
            }
        }

        assert!(!state.monsters[&rat_id].is_alive);
        assert!(state.character.is_alive);
        assert!(!state.is_game_over());
    }

    #[test]
    fn test_kill_character_is_terminal() {
        let mut state = new_state(17);
        state.kill_character();
        let died_at = state.character.died_at;
        assert!(died_at.is_some());
        assert_eq!(state.completion_state, GameCompletionState::PlayerDied);
        assert!(!state.is_victory());

        state.kill_character();
        assert_eq!(state.character.died_at, died_at);

        let err = state.move_character(Direction::North).unwrap_err();
        assert!(matches!(err, CrawlerError::Rule(RuleViolation::CharacterDead)));
    }

    #[test]
    fn test_adjacency_requires_connection() {
        let state = new_state(18);
        let start = state.character.current_room_id;
        let exits = state.room_exits(start);

        for position in Position::origin().cardinal_adjacent_positions() {
            if let Some(room) = state.room_at(position) {
                let connected = exits.values().any(|id| *id == room.id);
                assert_eq!(state.is_room_adjacent(room.id), connected);
            }
        }
        let far = state.room_at(Position::new(3, 3)).unwrap();
        assert!(!state.is_room_adjacent(far.id));
    }

    #[test]
    fn test_room_traps_are_per_room() {
        let mut state = new_state(18);
        let here = state.character.current_room_id;
        assert!(state.room_traps(here).is_empty());

        let (_, next) = first_exit(&state);
        let trap = Trap {
            id: new_entity_id(),
            room_id: next,
            description: "A loose flagstone.".to_string(),
            damage: 4,
            is_triggered: false,
            is_discovered: false,
            difficulty: 1,
        };
        state.add_trap(trap.clone());

        assert!(state.room_traps(here).is_empty());
        assert_eq!(state.room_traps(next), vec![&trap]);
    }

    #[test]
    fn test_exploration_percentage() {
        let mut state = new_state(19);
        assert!((state.exploration_pct() - 4.0).abs() < 1e-9);
        let (direction, _) = first_exit(&state);
        state.move_character(direction).unwrap();
        assert!((state.exploration_pct() - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_game_state_serialization() {
        let state = new_state(20);
        let json = state.save_to_json().unwrap();

        let _: serde_json::Value = serde_json::from_str(&json).unwrap();

        let loaded = GameState::load_from_json(&json).unwrap();
        assert_eq!(loaded.rooms.len(), state.rooms.len());
        assert_eq!(loaded.character, state.character);
        assert_eq!(
            loaded.room_at(Position::new(4, 4)).map(|room| room.id),
            state.room_at(Position::new(4, 4)).map(|room| room.id)
        );
    }
}
