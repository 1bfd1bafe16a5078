//! # Table Records
//!
//! Flattened, per-table rows for handing a game to a relational store.
//! Row layouts follow the tables' columns: foreign keys are plain ids and
//! an item's location is split into nullable `room_id` and `character_id`.

use crate::game::{
    Character, CharacterId, Connection, Dungeon, EntityId, GameState, Item, ItemId, ItemKind,
    ItemLocation, Monster, Rarity, Room, RoomId, Trap,
};
use serde::{Deserialize, Serialize};

/// Row of the `items` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub item_type: ItemKind,
    pub damage: i32,
    pub armor: i32,
    pub healing: i32,
    pub rarity: Rarity,
    pub room_id: Option<RoomId>,
    pub character_id: Option<CharacterId>,
    pub is_equipped: bool,
}

impl From<&Item> for ItemRecord {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            description: item.description.clone(),
            item_type: item.kind,
            damage: item.damage,
            armor: item.armor,
            healing: item.healing,
            rarity: item.rarity,
            room_id: item.room_id(),
            character_id: item.character_id(),
            is_equipped: item.is_equipped,
        }
    }
}

impl ItemRecord {
    /// Rebuilds the item, or `None` if the row has no location or two.
    pub fn into_item(self) -> Option<Item> {
        let location = match (self.room_id, self.character_id) {
            (Some(room_id), None) => ItemLocation::Floor(room_id),
            (None, Some(character_id)) => ItemLocation::Carried(character_id),
            _ => return None,
        };
        Some(Item {
            id: self.id,
            name: self.name,
            description: self.description,
            kind: self.item_type,
            damage: self.damage,
            armor: self.armor,
            healing: self.healing,
            rarity: self.rarity,
            location,
            is_equipped: self.is_equipped,
        })
    }
}

/// Row of the `monsters` table. The loot table is not a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterRecord {
    pub id: EntityId,
    pub name: String,
    pub description: String,
    pub hp: i32,
    pub max_hp: i32,
    pub damage: i32,
    pub room_id: RoomId,
    pub is_alive: bool,
}

impl From<&Monster> for MonsterRecord {
    fn from(monster: &Monster) -> Self {
        Self {
            id: monster.id,
            name: monster.name.clone(),
            description: monster.description.clone(),
            hp: monster.hp,
            max_hp: monster.max_hp,
            damage: monster.damage,
            room_id: monster.room_id,
            is_alive: monster.is_alive,
        }
    }
}

/// One game flattened into table rows.
///
/// Rows are sorted by id so two exports of the same state compare equal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DungeonRecords {
    pub characters: Vec<Character>,
    pub dungeons: Vec<Dungeon>,
    pub rooms: Vec<Room>,
    pub connections: Vec<Connection>,
    pub monsters: Vec<MonsterRecord>,
    pub items: Vec<ItemRecord>,
    pub traps: Vec<Trap>,
}

impl DungeonRecords {
    /// Total number of rows across all tables.
    pub fn row_count(&self) -> usize {
        self.characters.len()
            + self.dungeons.len()
            + self.rooms.len()
            + self.connections.len()
            + self.monsters.len()
            + self.items.len()
            + self.traps.len()
    }
}

impl GameState {
    /// Exports every entity as table rows.
    pub fn to_records(&self) -> DungeonRecords {
        let mut rooms: Vec<Room> = self.rooms.values().cloned().collect();
        rooms.sort_by_key(|room| room.id);

        let mut connections: Vec<Connection> =
            self.connections.values().flatten().copied().collect();
        connections.sort_by_key(|connection| connection.id);

        let mut monsters: Vec<MonsterRecord> =
            self.monsters.values().map(MonsterRecord::from).collect();
        monsters.sort_by_key(|monster| monster.id);

        let mut items: Vec<ItemRecord> = self.items.values().map(ItemRecord::from).collect();
        items.sort_by_key(|item| item.id);

        let mut traps: Vec<Trap> = self.traps.values().cloned().collect();
        traps.sort_by_key(|trap| trap.id);

        DungeonRecords {
            characters: vec![self.character.clone()],
            dungeons: vec![self.dungeon.clone()],
            rooms,
            connections,
            monsters,
            items,
            traps,
        }
    }
}
