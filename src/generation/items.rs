//! # Item Generation
//!
//! Item templates, the starter kit and random floor loot.

use crate::game::{seeded_entity_id, Item, ItemKind, ItemLocation, Rarity, Room};
use crate::generation::{roll_chance, GenerationConfig};
use rand::seq::SliceRandom;
use rand::Rng;

/// Blueprint for an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemTemplate {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: ItemKind,
    pub damage: i32,
    pub armor: i32,
    pub healing: i32,
    pub rarity: Rarity,
}

impl ItemTemplate {
    /// Creates an item from this template at `location`.
    pub fn instantiate<R: Rng>(&self, location: ItemLocation, rng: &mut R) -> Item {
        Item {
            id: seeded_entity_id(rng),
            name: self.name.to_string(),
            description: self.description.to_string(),
            kind: self.kind,
            damage: self.damage,
            armor: self.armor,
            healing: self.healing,
            rarity: self.rarity,
            location,
            is_equipped: false,
        }
    }

    /// Relative chance of this template being picked as floor loot.
    pub fn weight(&self) -> u32 {
        match self.rarity {
            Rarity::Common => 10,
            Rarity::Uncommon => 5,
            Rarity::Rare => 2,
            Rarity::Legendary => 1,
        }
    }
}

const fn template(
    name: &'static str,
    description: &'static str,
    kind: ItemKind,
    rarity: Rarity,
) -> ItemTemplate {
    ItemTemplate {
        name,
        description,
        kind,
        damage: 0,
        armor: 0,
        healing: 0,
        rarity,
    }
}

/// The potion every character finds at the entrance.
pub const STARTER_POTION: ItemTemplate = ItemTemplate {
    healing: 10,
    ..template(
        "Health Potion",
        "A red vial that restores health.",
        ItemKind::Consumable,
        Rarity::Common,
    )
};

pub const ITEM_TEMPLATES: &[ItemTemplate] = &[
    STARTER_POTION,
    ItemTemplate {
        healing: 20,
        ..template(
            "Greater Health Potion",
            "A large red vial that restores significant health.",
            ItemKind::Consumable,
            Rarity::Uncommon,
        )
    },
    ItemTemplate {
        damage: 3,
        ..template(
            "Rusty Sword",
            "An old sword, still sharp enough to cut.",
            ItemKind::Weapon,
            Rarity::Common,
        )
    },
    ItemTemplate {
        damage: 5,
        ..template(
            "Short Sword",
            "A well-balanced blade.",
            ItemKind::Weapon,
            Rarity::Uncommon,
        )
    },
    ItemTemplate {
        armor: 2,
        ..template(
            "Leather Armor",
            "Stiff boiled leather, scuffed but serviceable.",
            ItemKind::Armor,
            Rarity::Common,
        )
    },
    ItemTemplate {
        armor: 4,
        ..template(
            "Chainmail",
            "Interlocking iron rings that turn aside a careless blow.",
            ItemKind::Armor,
            Rarity::Rare,
        )
    },
    template(
        "Gold Coins",
        "A small pouch of tarnished gold coins.",
        ItemKind::Treasure,
        Rarity::Uncommon,
    ),
    template(
        "Rusty Key",
        "A heavy iron key. Whatever lock it fit is long gone.",
        ItemKind::Key,
        Rarity::Common,
    ),
];

/// Places items in rooms.
#[derive(Debug, Clone)]
pub struct ItemGenerator {
    templates: &'static [ItemTemplate],
}

impl ItemGenerator {
    pub fn new() -> Self {
        Self {
            templates: ITEM_TEMPLATES,
        }
    }

    /// Items placed on the entrance floor: a single health potion.
    pub fn starter_items<R: Rng>(&self, room: &Room, rng: &mut R) -> Vec<Item> {
        vec![STARTER_POTION.instantiate(ItemLocation::Floor(room.id), rng)]
    }

    /// Rolls the optional floor item of a regular room.
    pub fn floor_item<R: Rng>(
        &self,
        room: &Room,
        config: &GenerationConfig,
        rng: &mut R,
    ) -> Option<Item> {
        if !roll_chance(rng, config.item_chance(room.difficulty())) {
            return None;
        }

        let template = *self
            .templates
            .choose_weighted(rng, ItemTemplate::weight)
            .ok()?;
        Some(template.instantiate(ItemLocation::Floor(room.id), rng))
    }
}

impl Default for ItemGenerator {
    fn default() -> Self {
        Self::new()
    }
}
