//! # Engine Configuration
//!
//! Compile-time defaults for the game rules and the runtime [`EngineConfig`]
//! handed to [`crate::McpServer`].

use serde::{Deserialize, Serialize};

/// Default width and height of the room grid.
pub const DEFAULT_GRID_SIZE: u32 = 5;

/// Largest supported grid. Bigger grids are rejected before generation.
pub const MAX_GRID_SIZE: u32 = 64;

/// Depth recorded on freshly generated dungeons.
pub const DEFAULT_DEPTH: u32 = 1;

/// Starting hit points for a new character.
pub const STARTING_HP: i32 = 20;

/// Starting strength for a new character.
pub const STARTING_STRENGTH: i32 = 10;

/// Starting dexterity for a new character.
pub const STARTING_DEXTERITY: i32 = 10;

/// Name used when `new_game` is called without one.
pub const DEFAULT_CHARACTER_NAME: &str = "Hero";

/// Most doors a single room may have.
pub const MAX_DOORS_PER_ROOM: usize = 3;

/// Combat constants.
pub mod combat {
    /// Twenty-sided die for attack rolls
    pub const D20: u32 = 20;

    /// Six-sided die for damage rolls
    pub const D6: u32 = 6;

    /// Base defense value for both sides
    pub const BASE_DEFENSE: i32 = 10;

    /// Minimum d6 roll that counts as a critical hit
    pub const CRITICAL_THRESHOLD: i32 = 5;

    /// Minimum damage dealt by any hit
    pub const MIN_DAMAGE: i32 = 1;

    /// Average of a d6, used for threat estimates
    pub const AVERAGE_D6: f64 = 3.5;
}

/// Runtime configuration for a game session.
///
/// Seeds left as `None` are drawn from the thread RNG, so every
/// `new_game` produces a different dungeon.
///
/// # Examples
///
/// ```
/// use dungeon_crawler::EngineConfig;
///
/// let config = EngineConfig::seeded(1, 2);
/// assert_eq!(config.grid_size, 5);
/// assert_eq!(config.dungeon_seed, Some(1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Width and height of the room grid
    pub grid_size: u32,
    /// Depth recorded on generated dungeons
    pub depth: u32,
    /// Fixed seed for dungeon generation
    pub dungeon_seed: Option<u64>,
    /// Fixed seed for combat rolls
    pub combat_seed: Option<u64>,
}

impl EngineConfig {
    /// Creates a fully reproducible configuration.
    pub fn seeded(dungeon_seed: u64, combat_seed: u64) -> Self {
        Self {
            dungeon_seed: Some(dungeon_seed),
            combat_seed: Some(combat_seed),
            ..Self::default()
        }
    }

    /// Overrides the grid size.
    pub fn with_grid_size(mut self, grid_size: u32) -> Self {
        self.grid_size = grid_size;
        self
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            depth: DEFAULT_DEPTH,
            dungeon_seed: None,
            combat_seed: None,
        }
    }
}
