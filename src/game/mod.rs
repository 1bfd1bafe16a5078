//! # Game Module
//!
//! Core game state management, entity records and combat.
//!
//! This module contains the fundamental building blocks of the crawler:
//! - Grid coordinates and cardinal directions
//! - Entity records (characters, rooms, monsters, items, traps)
//! - The in-memory game state store and its rule checks
//! - Flat table records for relational export
//! - The combat resolver

pub mod combat;
pub mod entities;
pub mod records;
pub mod state;

pub use combat::*;
pub use entities::*;
pub use records::*;
pub use state::*;

use crate::{CrawlerError, CrawlerResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Represents a cell on the dungeon's room grid.
///
/// `y` grows northwards, so the entrance at `(0, 0)` is the south-west
/// corner of the grid.
///
/// # Examples
///
/// ```
/// use dungeon_crawler::Position;
///
/// let pos = Position::new(2, 3);
/// assert_eq!(pos.x, 2);
/// assert_eq!(pos.y, 3);
/// assert_eq!(pos.cardinal_adjacent_positions().len(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a new position with the given coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the origin position (0, 0).
    pub fn origin() -> Self {
        Self::new(0, 0)
    }

    /// Calculates the Manhattan distance to another position.
    ///
    /// # Examples
    ///
    /// ```
    /// use dungeon_crawler::Position;
    ///
    /// let pos1 = Position::new(0, 0);
    /// let pos2 = Position::new(3, 4);
    /// assert_eq!(pos1.manhattan_distance(pos2), 7);
    /// ```
    pub fn manhattan_distance(self, other: Position) -> u32 {
        (self.x - other.x).unsigned_abs() + (self.y - other.y).unsigned_abs()
    }

    /// Returns the neighbouring position one step in `direction`.
    pub fn step(self, direction: Direction) -> Position {
        self + direction.to_delta()
    }

    /// Returns the 4 cardinal adjacent positions (no diagonals).
    pub fn cardinal_adjacent_positions(self) -> Vec<Position> {
        Direction::cardinal()
            .into_iter()
            .map(|direction| self.step(direction))
            .collect()
    }

    /// Checks whether the position lies on a square grid of the given size.
    pub fn within_grid(self, grid_size: u32) -> bool {
        let size = grid_size as i32;
        self.x >= 0 && self.y >= 0 && self.x < size && self.y < size
    }
}

impl std::ops::Add for Position {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Position {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

/// Cardinal directions for moving between rooms.
///
/// Serialised in lowercase (`"north"`), which is also the form accepted by
/// the `move` tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// Converts a direction to a grid delta.
    ///
    /// # Examples
    ///
    /// ```
    /// use dungeon_crawler::{Direction, Position};
    ///
    /// assert_eq!(Direction::North.to_delta(), Position::new(0, 1));
    /// assert_eq!(Direction::West.to_delta(), Position::new(-1, 0));
    /// ```
    pub fn to_delta(self) -> Position {
        match self {
            Direction::North => Position::new(0, 1),
            Direction::South => Position::new(0, -1),
            Direction::East => Position::new(1, 0),
            Direction::West => Position::new(-1, 0),
        }
    }

    /// Converts a grid delta to a direction.
    ///
    /// Returns None if the delta is not a single cardinal step.
    pub fn from_delta(delta: Position) -> Option<Direction> {
        match (delta.x, delta.y) {
            (0, 1) => Some(Direction::North),
            (0, -1) => Some(Direction::South),
            (1, 0) => Some(Direction::East),
            (-1, 0) => Some(Direction::West),
            _ => None,
        }
    }

    /// Returns the direction pointing the other way.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    /// Returns the 4 cardinal directions.
    pub fn cardinal() -> Vec<Direction> {
        vec![
            Direction::North,
            Direction::South,
            Direction::East,
            Direction::West,
        ]
    }

    /// Lowercase name as used by the tool interface.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = CrawlerError;

    fn from_str(s: &str) -> CrawlerResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "north" | "n" => Ok(Direction::North),
            "south" | "s" => Ok(Direction::South),
            "east" | "e" => Ok(Direction::East),
            "west" | "w" => Ok(Direction::West),
            other => Err(CrawlerError::InvalidArgument(format!(
                "unknown direction '{}' (expected north, south, east or west)",
                other
            ))),
        }
    }
}

/// Unique identifier for game entities.
pub type EntityId = Uuid;

/// Identifier of a [`Character`].
pub type CharacterId = EntityId;

/// Identifier of a [`Room`].
pub type RoomId = EntityId;

/// Identifier of a [`Monster`].
pub type MonsterId = EntityId;

/// Identifier of an [`Item`].
pub type ItemId = EntityId;

/// Creates a new random entity ID.
pub fn new_entity_id() -> EntityId {
    Uuid::new_v4()
}

/// Creates an entity ID from a seeded random source, so generated
/// dungeons are reproducible down to their ids.
pub fn seeded_entity_id<R: rand::Rng>(rng: &mut R) -> EntityId {
    uuid::Builder::from_random_bytes(rng.gen()).into_uuid()
}
