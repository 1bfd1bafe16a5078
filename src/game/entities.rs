//! # Entity Records
//!
//! Plain data records for everything that lives in a dungeon: the player
//! character, rooms and their connections, monsters, items, traps and the
//! dungeon itself.
//!
//! References between entities are ids resolved through the owning
//! [`crate::GameState`] mappings; an id may outlive its target (consumed
//! items are deleted), so lookups always return `Option`.

use crate::config::{STARTING_DEXTERITY, STARTING_HP, STARTING_STRENGTH};
use crate::game::{
    new_entity_id, CharacterId, Direction, EntityId, ItemId, MonsterId, Position, RoomId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The player character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub hp: i32,
    pub max_hp: i32,
    pub strength: i32,
    pub dexterity: i32,
    pub current_room_id: RoomId,
    pub is_alive: bool,
    pub created_at: DateTime<Utc>,
    pub died_at: Option<DateTime<Utc>>,
    pub equipped_weapon_id: Option<ItemId>,
    pub equipped_armor_id: Option<ItemId>,
}

impl Character {
    /// Creates a fresh character standing in `room_id`.
    ///
    /// # Examples
    ///
    /// ```
    /// use dungeon_crawler::{new_entity_id, Character};
    ///
    /// let hero = Character::new("Hero", new_entity_id());
    /// assert_eq!(hero.hp, 20);
    /// assert_eq!(hero.max_hp, 20);
    /// assert!(hero.is_alive);
    /// ```
    pub fn new(name: impl Into<String>, room_id: RoomId) -> Self {
        Self {
            id: new_entity_id(),
            name: name.into(),
            hp: STARTING_HP,
            max_hp: STARTING_HP,
            strength: STARTING_STRENGTH,
            dexterity: STARTING_DEXTERITY,
            current_room_id: room_id,
            is_alive: true,
            created_at: Utc::now(),
            died_at: None,
            equipped_weapon_id: None,
            equipped_armor_id: None,
        }
    }

    /// Applies damage, killing the character when hp reaches zero.
    ///
    /// Death is recorded only once; further damage to a dead character is
    /// ignored.
    pub fn take_damage(&mut self, damage: i32) {
        if !self.is_alive {
            return;
        }
        self.hp = (self.hp - damage.max(0)).max(0);
        if self.hp == 0 {
            self.die();
        }
    }

    /// Restores hp up to `max_hp` and returns the amount actually healed.
    pub fn heal(&mut self, amount: i32) -> i32 {
        if !self.is_alive {
            return 0;
        }
        let before = self.hp;
        self.hp = (self.hp + amount.max(0)).min(self.max_hp);
        self.hp - before
    }

    /// Marks the character dead. Idempotent.
    pub fn die(&mut self) {
        self.hp = 0;
        self.is_alive = false;
        self.died_at.get_or_insert_with(Utc::now);
    }

    /// Fraction of hit points remaining, in `[0, 1]`.
    pub fn health_fraction(&self) -> f64 {
        if self.max_hp <= 0 {
            return 0.0;
        }
        f64::from(self.hp) / f64::from(self.max_hp)
    }
}

/// A room on the dungeon grid.
///
/// Exits are not stored here; they are derived from [`Connection`]s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub dungeon_id: EntityId,
    pub name: String,
    pub description: String,
    pub is_entrance: bool,
    pub is_exit: bool,
    pub x: i32,
    pub y: i32,
}

impl Room {
    /// Grid coordinates of the room.
    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    /// Difficulty of the room: Manhattan distance from the entrance.
    pub fn difficulty(&self) -> u32 {
        self.position().manhattan_distance(Position::origin())
    }
}

/// A directed passage from one room to a neighbour.
///
/// Passages are stored once per direction; a walkable doorway between A and
/// B is the pair `A -east-> B` and `B -west-> A`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    pub id: EntityId,
    pub room_id: RoomId,
    pub direction: Direction,
    pub connected_room_id: RoomId,
}

/// A hostile creature bound to a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monster {
    pub id: MonsterId,
    pub name: String,
    pub description: String,
    pub hp: i32,
    pub max_hp: i32,
    pub damage: i32,
    pub room_id: RoomId,
    pub is_alive: bool,
    /// Item ids this monster could drop. Loot drops are not implemented,
    /// so this stays empty.
    #[serde(default)]
    pub loot_table: Vec<ItemId>,
}

impl Monster {
    /// Applies damage and returns true if the monster died from it.
    pub fn take_damage(&mut self, damage: i32) -> bool {
        if !self.is_alive {
            return false;
        }
        self.hp -= damage.max(0);
        if self.hp <= 0 {
            self.die();
            return true;
        }
        false
    }

    /// Marks the monster dead with zero hp. Idempotent.
    pub fn die(&mut self) {
        self.hp = 0;
        self.is_alive = false;
    }
}

/// Broad category of an item, deciding what can be done with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Weapon,
    Armor,
    Consumable,
    Key,
    Treasure,
}

impl ItemKind {
    /// The equipment slot this kind occupies, if any.
    pub fn slot(self) -> Option<EquipmentSlot> {
        match self {
            ItemKind::Weapon => Some(EquipmentSlot::Weapon),
            ItemKind::Armor => Some(EquipmentSlot::Armor),
            ItemKind::Consumable | ItemKind::Key | ItemKind::Treasure => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ItemKind::Weapon => "weapon",
            ItemKind::Armor => "armor",
            ItemKind::Consumable => "consumable",
            ItemKind::Key => "key",
            ItemKind::Treasure => "treasure",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Item rarity tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Legendary,
}

/// The two equipment slots a character has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquipmentSlot {
    Weapon,
    Armor,
}

/// Where an item currently is: on a room's floor or carried.
///
/// Consumed items are removed from the game entirely, so every live item
/// has exactly one location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ItemLocation {
    Floor(RoomId),
    Carried(CharacterId),
}

/// Something that can be picked up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub kind: ItemKind,
    pub damage: i32,
    pub armor: i32,
    pub healing: i32,
    pub rarity: Rarity,
    pub location: ItemLocation,
    pub is_equipped: bool,
}

impl Item {
    /// Room whose floor holds the item, if it is on the floor.
    pub fn room_id(&self) -> Option<RoomId> {
        match self.location {
            ItemLocation::Floor(room_id) => Some(room_id),
            ItemLocation::Carried(_) => None,
        }
    }

    /// Character carrying the item, if anyone is.
    pub fn character_id(&self) -> Option<CharacterId> {
        match self.location {
            ItemLocation::Carried(character_id) => Some(character_id),
            ItemLocation::Floor(_) => None,
        }
    }

    pub fn is_on_floor_of(&self, room_id: RoomId) -> bool {
        self.room_id() == Some(room_id)
    }

    pub fn is_carried_by(&self, character_id: CharacterId) -> bool {
        self.character_id() == Some(character_id)
    }
}

/// A hazard hidden in a room. Generation never places traps yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trap {
    pub id: EntityId,
    pub room_id: RoomId,
    pub description: String,
    pub damage: i32,
    pub is_triggered: bool,
    pub is_discovered: bool,
    pub difficulty: u32,
}

/// One generated dungeon instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dungeon {
    pub id: EntityId,
    pub seed: u64,
    pub depth: u32,
    pub grid_size: u32,
    pub created_at: DateTime<Utc>,
}
