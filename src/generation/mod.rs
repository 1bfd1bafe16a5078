//! # Generation Module
//!
//! Procedural content generation for dungeons, monsters and items.
//!
//! A dungeon is generated in two passes. [`GridDungeonGenerator`] lays out
//! the room grid and its passages, then every room is populated according
//! to its difficulty (its Manhattan distance from the entrance). Both passes
//! draw from one seeded [`StdRng`], so a seed reproduces the whole dungeon,
//! entity ids included.

pub mod dungeon;
pub mod encounters;
pub mod flavor;
pub mod items;

pub use dungeon::*;
pub use encounters::*;
pub use flavor::*;
pub use items::*;

use crate::config::{DEFAULT_DEPTH, DEFAULT_GRID_SIZE, MAX_DOORS_PER_ROOM, MAX_GRID_SIZE};
use crate::game::{Connection, Dungeon, Item, Monster, Position, Room, RoomId, Trap};
use crate::utils::ConnectionMap;
use crate::{CrawlerError, CrawlerResult, EngineConfig};
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Configuration for procedural generation.
///
/// Controls the grid size, the door budget of the layout pass and the
/// spawn probabilities of the population pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation
    pub seed: u64,
    /// Width and height of the room grid
    pub grid_size: u32,
    /// Depth recorded on the dungeon
    pub depth: u32,
    /// Most doors a room may have
    pub max_doors_per_room: usize,
    /// Door-capped spanning tree attempts before falling back to a
    /// serpentine path
    pub tree_attempts: u32,
    /// Chance that a regular room holds monsters
    pub monster_chance: f64,
    /// Chance of a second monster in rooms deep enough for one
    pub second_monster_chance: f64,
    /// Difficulty at which a second monster may appear
    pub second_monster_min_difficulty: u32,
    /// Monster hp/damage growth per point of difficulty
    pub monster_scale_per_difficulty: f64,
    /// Item chance at difficulty 0
    pub item_base_chance: f64,
    /// Item chance added per point of difficulty
    pub item_chance_per_difficulty: f64,
    /// Upper bound of the item chance
    pub max_item_chance: f64,
    /// Distance past which room descriptions may turn scarier
    pub scary_description_distance: u32,
    /// Chance to reroll a far room's description from the scary half
    pub scary_description_chance: f64,
}

impl GenerationConfig {
    /// Creates the standard configuration for `seed`.
    ///
    /// # Examples
    ///
    /// ```
    /// use dungeon_crawler::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(7);
    /// assert_eq!(config.grid_size, 5);
    /// assert_eq!(config.max_doors_per_room, 3);
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            grid_size: DEFAULT_GRID_SIZE,
            depth: DEFAULT_DEPTH,
            max_doors_per_room: MAX_DOORS_PER_ROOM,
            tree_attempts: 20,
            monster_chance: 0.7,
            second_monster_chance: 0.4,
            second_monster_min_difficulty: 3,
            monster_scale_per_difficulty: 0.15,
            item_base_chance: 0.25,
            item_chance_per_difficulty: 0.05,
            max_item_chance: 0.5,
            scary_description_distance: 4,
            scary_description_chance: 0.5,
        }
    }

    /// Creates a configuration for testing: the standard grid with fewer
    /// tree attempts, so the serpentine fallback stays exercised.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            tree_attempts: 5,
            ..Self::new(seed)
        }
    }

    /// Builds the generation settings for one `new_game` of a session.
    pub fn from_engine(engine: &EngineConfig, seed: u64) -> Self {
        Self {
            grid_size: engine.grid_size,
            depth: engine.depth,
            ..Self::new(seed)
        }
    }

    pub fn with_grid_size(mut self, grid_size: u32) -> Self {
        self.grid_size = grid_size;
        self
    }

    /// Item spawn chance for a room of the given difficulty.
    pub fn item_chance(&self, difficulty: u32) -> f64 {
        (self.item_base_chance + self.item_chance_per_difficulty * f64::from(difficulty))
            .min(self.max_item_chance)
    }

    /// Multiplier applied to monster stats at the given difficulty.
    pub fn monster_scale(&self, difficulty: u32) -> f64 {
        1.0 + self.monster_scale_per_difficulty * f64::from(difficulty)
    }

    /// Number of rooms on the grid.
    pub fn room_count(&self) -> usize {
        let side = self.grid_size as usize;
        side.saturating_mul(side)
    }

    /// Checks that the grid size is within `1..=MAX_GRID_SIZE`.
    pub fn check_grid_size(&self) -> CrawlerResult<()> {
        if self.grid_size == 0 || self.grid_size > MAX_GRID_SIZE {
            return Err(CrawlerError::GenerationFailed(format!(
                "Grid size must be between 1 and {}, got {}",
                MAX_GRID_SIZE, self.grid_size
            )));
        }
        Ok(())
    }

    /// Grid cell of the exit room.
    pub fn exit_position(&self) -> Position {
        let last = self.grid_size.saturating_sub(1) as i32;
        Position::new(last, last)
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Trait for procedural generators.
///
/// Generators take their randomness from the caller so that several passes
/// can share one seeded sequence.
pub trait Generator<T> {
    /// Generates content using the provided configuration and random number generator.
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> CrawlerResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> CrawlerResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// The structural part of a dungeon: rooms and passages, no contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonLayout {
    pub dungeon: Dungeon,
    pub rooms: Vec<Room>,
    pub connections: Vec<Connection>,
}

impl DungeonLayout {
    pub fn entrance(&self) -> Option<&Room> {
        self.rooms.iter().find(|room| room.is_entrance)
    }

    pub fn exit(&self) -> Option<&Room> {
        self.rooms.iter().find(|room| room.is_exit)
    }

    pub fn room_at(&self, position: Position) -> Option<&Room> {
        self.rooms.iter().find(|room| room.position() == position)
    }

    /// Number of outgoing passages of a room.
    pub fn door_count(&self, room_id: RoomId) -> usize {
        self.connections
            .iter()
            .filter(|c| c.room_id == room_id)
            .count()
    }

    /// Connections grouped by source room.
    pub fn connection_map(&self) -> ConnectionMap {
        let mut map = ConnectionMap::new();
        for connection in &self.connections {
            map.entry(connection.room_id).or_default().push(*connection);
        }
        map
    }
}

/// Everything placed inside one room.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoomContents {
    pub monsters: Vec<Monster>,
    pub items: Vec<Item>,
    pub traps: Vec<Trap>,
}

/// A laid-out and populated dungeon, ready to become a game.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedDungeon {
    pub layout: DungeonLayout,
    pub monsters: Vec<Monster>,
    pub items: Vec<Item>,
    pub traps: Vec<Trap>,
}

/// Creates a seeded random number generator from the config.
pub fn create_rng(config: &GenerationConfig) -> StdRng {
    StdRng::seed_from_u64(config.seed)
}

/// Bernoulli trial that tolerates probabilities outside `[0, 1]`.
pub(crate) fn roll_chance<R: Rng>(rng: &mut R, probability: f64) -> bool {
    rng.gen_bool(probability.clamp(0.0, 1.0))
}

/// Fills one room according to its role and difficulty.
///
/// The entrance only receives the starter items and the exit stays empty.
/// Traps are never placed.
pub fn populate_room(room: &Room, config: &GenerationConfig, rng: &mut StdRng) -> RoomContents {
    let items = ItemGenerator::new();

    if room.is_entrance {
        return RoomContents {
            items: items.starter_items(room, rng),
            ..RoomContents::default()
        };
    }
    if room.is_exit {
        return RoomContents::default();
    }

    let monsters = EncounterGenerator::new().spawn_monsters(room, config, rng);
    let floor_item = items.floor_item(room, config, rng);

    RoomContents {
        monsters,
        items: floor_item.into_iter().collect(),
        traps: Vec::new(),
    }
}

/// Generates and populates a complete dungeon.
///
/// # Examples
///
/// ```
/// use dungeon_crawler::{generate_dungeon, GenerationConfig};
///
/// let dungeon = generate_dungeon(&GenerationConfig::new(99)).unwrap();
/// assert_eq!(dungeon.layout.rooms.len(), 25);
/// assert!(dungeon.traps.is_empty());
/// ```
pub fn generate_dungeon(config: &GenerationConfig) -> CrawlerResult<GeneratedDungeon> {
    let mut rng = create_rng(config);
    let generator = GridDungeonGenerator::new(config);

    let layout = generator.generate(config, &mut rng)?;

    let mut generated = GeneratedDungeon {
        layout,
        monsters: Vec::new(),
        items: Vec::new(),
        traps: Vec::new(),
    };

    for room in &generated.layout.rooms {
        let contents = populate_room(room, config, &mut rng);
        generated.monsters.extend(contents.monsters);
        generated.items.extend(contents.items);
        generated.traps.extend(contents.traps);
    }

    info!(
        "Generated {}x{} dungeon (seed {}) with {} monsters and {} items",
        config.grid_size,
        config.grid_size,
        config.seed,
        generated.monsters.len(),
        generated.items.len()
    );

    Ok(generated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::ItemKind;
    use crate::CrawlerError;

    #[test]
    fn test_item_chance_is_capped() {
        let config = GenerationConfig::new(1);
        assert!((config.item_chance(0) - 0.25).abs() < 1e-9);
        assert!((config.item_chance(3) - 0.40).abs() < 1e-9);
        assert!((config.item_chance(5) - 0.50).abs() < 1e-9);
        assert!((config.item_chance(8) - 0.50).abs() < 1e-9);
    }

    #[test]
    fn test_monster_scale() {
        let config = GenerationConfig::new(1);
        assert!((config.monster_scale(0) - 1.0).abs() < 1e-9);
        assert!((config.monster_scale(4) - 1.6).abs() < 1e-9);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let config = GenerationConfig::new(555);
        let a = generate_dungeon(&config).unwrap();
        let b = generate_dungeon(&config).unwrap();

        assert_eq!(a.layout.rooms, b.layout.rooms);
        assert_eq!(a.layout.connections, b.layout.connections);
        assert_eq!(a.monsters, b.monsters);
        assert_eq!(a.items, b.items);
        assert_eq!(a.layout.dungeon.id, b.layout.dungeon.id);
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = generate_dungeon(&GenerationConfig::new(1)).unwrap();
        let b = generate_dungeon(&GenerationConfig::new(2)).unwrap();
        assert_ne!(a.layout.dungeon.id, b.layout.dungeon.id);
    }

    #[test]
    fn test_entrance_and_exit_contents() {
        for seed in 0..20 {
            let generated = generate_dungeon(&GenerationConfig::new(seed)).unwrap();
            let entrance = generated.layout.entrance().unwrap().id;
            let exit = generated.layout.exit().unwrap().id;

            assert!(generated.monsters.iter().all(|m| m.room_id != entrance));
            assert!(generated.monsters.iter().all(|m| m.room_id != exit));

            let entrance_items: Vec<&Item> = generated
                .items
                .iter()
                .filter(|item| item.is_on_floor_of(entrance))
                .collect();
            assert_eq!(entrance_items.len(), 1);
            assert_eq!(entrance_items[0].name, "Health Potion");
            assert_eq!(entrance_items[0].kind, ItemKind::Consumable);
            assert_eq!(entrance_items[0].healing, 10);

            assert!(generated.items.iter().all(|item| !item.is_on_floor_of(exit)));
        }
    }

    #[test]
    fn test_populated_rooms_respect_limits() {
        for seed in 0..20 {
            let config = GenerationConfig::new(seed);
            let generated = generate_dungeon(&config).unwrap();
            for room in &generated.layout.rooms {
                let here: Vec<&Monster> = generated
                    .monsters
                    .iter()
                    .filter(|m| m.room_id == room.id)
                    .collect();
                let limit = if room.difficulty() >= 3 { 2 } else { 1 };
                assert!(here.len() <= limit);

                let items_here = generated
                    .items
                    .iter()
                    .filter(|item| item.is_on_floor_of(room.id))
                    .count();
                assert!(items_here <= 1);
            }
        }
    }

    #[test]
    fn test_single_room_dungeon() {
        let config = GenerationConfig::new(3).with_grid_size(1);
        let generated = generate_dungeon(&config).unwrap();

        assert_eq!(generated.layout.rooms.len(), 1);
        let room = &generated.layout.rooms[0];
        assert!(room.is_entrance && room.is_exit);
        assert!(generated.layout.connections.is_empty());
        assert!(generated.monsters.is_empty());
        assert_eq!(generated.items.len(), 1);
    }

    #[test]
    fn test_out_of_range_grids_are_rejected() {
        for grid_size in [0, MAX_GRID_SIZE + 1, 65_536, u32::MAX] {
            let config = GenerationConfig::new(3).with_grid_size(grid_size);
            assert!(matches!(
                generate_dungeon(&config),
                Err(CrawlerError::GenerationFailed(_))
            ));
        }
        assert!(GenerationConfig::new(3)
            .with_grid_size(MAX_GRID_SIZE)
            .check_grid_size()
            .is_ok());
    }

    #[test]
    fn test_room_count_does_not_overflow() {
        assert_eq!(GenerationConfig::new(1).room_count(), 25);
        let huge = GenerationConfig::new(1).with_grid_size(u32::MAX);
        assert!(huge.room_count() > 0);
    }

    #[test]
    fn test_from_engine_config() {
        let engine = EngineConfig::seeded(1, 2).with_grid_size(7);
        let config = GenerationConfig::from_engine(&engine, 1);
        assert_eq!(config.grid_size, 7);
        assert_eq!(config.seed, 1);
        assert_eq!(config.exit_position(), Position::new(6, 6));
    }
}
