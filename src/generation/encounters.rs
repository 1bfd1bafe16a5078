//! # Encounter Generation
//!
//! Monster templates and their placement in rooms by difficulty.

use crate::game::{seeded_entity_id, Monster, Room, RoomId};
use crate::generation::{roll_chance, GenerationConfig};
use rand::seq::SliceRandom;
use rand::Rng;

/// Base stats of a monster kind before difficulty scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonsterTemplate {
    pub name: &'static str,
    pub description: &'static str,
    pub base_hp: i32,
    pub base_damage: i32,
    /// Lowest room difficulty this monster appears at
    pub min_difficulty: u32,
}

pub const MONSTER_TEMPLATES: &[MonsterTemplate] = &[
    MonsterTemplate {
        name: "Rat",
        description: "A large, mangy rat with beady red eyes.",
        base_hp: 5,
        base_damage: 2,
        min_difficulty: 0,
    },
    MonsterTemplate {
        name: "Goblin",
        description: "A small, green-skinned creature with a wicked grin.",
        base_hp: 10,
        base_damage: 4,
        min_difficulty: 1,
    },
    MonsterTemplate {
        name: "Skeleton",
        description: "The animated bones of a long-dead warrior.",
        base_hp: 15,
        base_damage: 5,
        min_difficulty: 2,
    },
    MonsterTemplate {
        name: "Cave Spider",
        description: "A spider the size of a dog, dripping venom from its fangs.",
        base_hp: 12,
        base_damage: 6,
        min_difficulty: 2,
    },
    MonsterTemplate {
        name: "Orc",
        description: "A hulking brute with tusks and a massive club.",
        base_hp: 25,
        base_damage: 8,
        min_difficulty: 3,
    },
    MonsterTemplate {
        name: "Wraith",
        description: "A cold, shifting shadow that drinks the light around it.",
        base_hp: 30,
        base_damage: 9,
        min_difficulty: 5,
    },
];

impl MonsterTemplate {
    /// Creates a live monster in `room_id` with stats multiplied by `scale`
    /// and rounded down.
    pub fn spawn<R: Rng>(&self, room_id: RoomId, scale: f64, rng: &mut R) -> Monster {
        let hp = ((f64::from(self.base_hp) * scale).floor() as i32).max(1);
        Monster {
            id: seeded_entity_id(rng),
            name: self.name.to_string(),
            description: self.description.to_string(),
            hp,
            max_hp: hp,
            damage: (f64::from(self.base_damage) * scale).floor() as i32,
            room_id,
            is_alive: true,
            loot_table: Vec::new(),
        }
    }
}

/// Places monsters in rooms.
#[derive(Debug, Clone)]
pub struct EncounterGenerator {
    templates: &'static [MonsterTemplate],
}

impl EncounterGenerator {
    pub fn new() -> Self {
        Self {
            templates: MONSTER_TEMPLATES,
        }
    }

    /// Uses a custom template table.
    pub fn with_templates(templates: &'static [MonsterTemplate]) -> Self {
        Self { templates }
    }

    /// Templates allowed in a room of the given difficulty.
    pub fn eligible_templates(&self, difficulty: u32) -> Vec<&'static MonsterTemplate> {
        self.templates
            .iter()
            .filter(|template| template.min_difficulty <= difficulty)
            .collect()
    }

    /// Rolls the monsters for one room.
    ///
    /// # Examples
    ///
    /// ```
    /// use dungeon_crawler::{create_rng, EncounterGenerator, GenerationConfig};
    /// use dungeon_crawler::{new_entity_id, Room};
    ///
    /// let config = GenerationConfig::new(1);
    /// let room = Room {
    ///     id: new_entity_id(),
    ///     dungeon_id: new_entity_id(),
    ///     name: "Dark Hall".to_string(),
    ///     description: String::new(),
    ///     is_entrance: false,
    ///     is_exit: false,
    ///     x: 1,
    ///     y: 0,
    /// };
    /// let monsters = EncounterGenerator::new().spawn_monsters(&room, &config, &mut create_rng(&config));
    /// assert!(monsters.len() <= 1);
    /// ```
    pub fn spawn_monsters<R: Rng>(
        &self,
        room: &Room,
        config: &GenerationConfig,
        rng: &mut R,
    ) -> Vec<Monster> {
        let difficulty = room.difficulty();
        if !roll_chance(rng, config.monster_chance) {
            return Vec::new();
        }

        let eligible = self.eligible_templates(difficulty);
        if eligible.is_empty() {
            return Vec::new();
        }

        let count = if difficulty >= config.second_monster_min_difficulty
            && roll_chance(rng, config.second_monster_chance)
        {
            2
        } else {
            1
        };

        let scale = config.monster_scale(difficulty);
        let mut monsters = Vec::with_capacity(count);
        for _ in 0..count {
            if let Some(template) = eligible.choose(rng) {
                monsters.push(template.spawn(room.id, scale, rng));
            }
        }
        monsters
    }
}

impl Default for EncounterGenerator {
    fn default() -> Self {
        Self::new()
    }
}
