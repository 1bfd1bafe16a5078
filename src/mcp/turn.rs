//! # Turn Reports
//!
//! Per-action scratch data that only feeds the UI snapshot, plus the
//! session pacing counters that survive across turns.

use crate::game::{CharacterId, CombatDetail, EntityId, ItemId, MonsterId};
use crate::CrawlerResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;

/// Broad category of a game event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Combat,
    Discovery,
    Movement,
    Interaction,
    Death,
    Victory,
}

/// Specific event; each subtype belongs to exactly one [`EventKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSubtype {
    GameStart,
    Look,
    RoomEnter,
    DungeonEscaped,
    AttackHit,
    AttackMiss,
    EnemyDefeated,
    PlayerDied,
    ItemFound,
    ItemUsed,
    ItemEquipped,
}

impl EventSubtype {
    pub fn kind(self) -> EventKind {
        match self {
            EventSubtype::GameStart
            | EventSubtype::Look
            | EventSubtype::ItemUsed
            | EventSubtype::ItemEquipped => EventKind::Interaction,
            EventSubtype::RoomEnter => EventKind::Movement,
            EventSubtype::DungeonEscaped => EventKind::Victory,
            EventSubtype::AttackHit | EventSubtype::AttackMiss | EventSubtype::EnemyDefeated => {
                EventKind::Combat
            }
            EventSubtype::PlayerDied => EventKind::Death,
            EventSubtype::ItemFound => EventKind::Discovery,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::Combat => "combat",
            EventKind::Discovery => "discovery",
            EventKind::Movement => "movement",
            EventKind::Interaction => "interaction",
            EventKind::Death => "death",
            EventKind::Victory => "victory",
        };
        f.write_str(name)
    }
}

/// The classified event of one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventInfo {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub subtype: EventSubtype,
    /// Ids of the monsters or items involved
    pub entities: Vec<EntityId>,
}

impl EventInfo {
    pub fn new(subtype: EventSubtype, entities: Vec<EntityId>) -> Self {
        Self {
            kind: subtype.kind(),
            subtype,
            entities,
        }
    }
}

/// Inventory changes made during one turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryDelta {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub added: Vec<ItemId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub removed: Vec<ItemId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub used: Vec<ItemId>,
}

impl InventoryDelta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.used.is_empty()
    }
}

/// What happened during one state-changing action.
///
/// A fresh report is started by every action and replaced by the next;
/// it never becomes part of the saved game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnReport {
    pub event: Option<EventInfo>,
    pub combat: Option<CombatDetail>,
    pub inventory_delta: InventoryDelta,
    /// Items that entered the inventory this turn
    pub new_items: Vec<ItemId>,
    /// Monsters killed this turn
    pub defeated_monsters: Vec<MonsterId>,
    /// True when a move entered a room for the first time
    pub first_visit: bool,
}

impl TurnReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_event(&mut self, subtype: EventSubtype, entities: Vec<EntityId>) {
        self.event = Some(EventInfo::new(subtype, entities));
    }

    pub fn record_item_taken(&mut self, item_id: ItemId) {
        self.inventory_delta.added.push(item_id);
        self.new_items.push(item_id);
    }

    pub fn record_item_used(&mut self, item_id: ItemId) {
        self.inventory_delta.used.push(item_id);
        self.inventory_delta.removed.push(item_id);
    }

    pub fn record_monster_defeated(&mut self, monster_id: MonsterId) {
        self.defeated_monsters.push(monster_id);
    }

    pub fn is_item_new(&self, item_id: ItemId) -> bool {
        self.new_items.contains(&item_id)
    }

    pub fn is_monster_defeated(&self, monster_id: MonsterId) -> bool {
        self.defeated_monsters.contains(&monster_id)
    }

    /// Converts the report into an event log row, if an event was recorded.
    pub fn to_event_record(&self, character_id: CharacterId) -> CrawlerResult<Option<EventRecord>> {
        let Some(event) = &self.event else {
            return Ok(None);
        };

        let event_data = json!({
            "subtype": event.subtype,
            "entities": event.entities,
            "combat": serde_json::to_value(&self.combat)?,
            "inventoryDelta": serde_json::to_value(&self.inventory_delta)?,
        });

        Ok(Some(EventRecord {
            id: crate::game::new_entity_id(),
            character_id,
            event_type: event.kind.to_string(),
            event_data,
            timestamp: Utc::now(),
        }))
    }
}

/// Counters that pace the narration across turns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pacing {
    pub turns_in_room: u32,
    pub consecutive_combat: u32,
}

impl Pacing {
    /// Look, take, use or equip.
    pub fn standard_action(&mut self) {
        self.turns_in_room += 1;
    }

    pub fn combat_action(&mut self) {
        self.turns_in_room += 1;
        self.consecutive_combat += 1;
    }

    pub fn movement(&mut self) {
        *self = Self::default();
    }
}

/// Row of the event log table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: EntityId,
    pub character_id: CharacterId,
    pub event_type: String,
    pub event_data: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}
