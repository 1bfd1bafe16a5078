//! # Dungeon Map
//!
//! Classifies grid cells by what the character knows about them and draws
//! the known dungeon as a box-drawing text map.

use crate::game::{GameState, Position, Room};
use serde::{Deserialize, Serialize};

/// What the character knows about a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellStatus {
    Unknown,
    Visited,
    Current,
    Adjacent,
    Exit,
}

impl CellStatus {
    /// Three-character cell body used by [`render_box_map`].
    pub fn glyph(self) -> &'static str {
        match self {
            CellStatus::Current => " @ ",
            CellStatus::Exit => " E ",
            CellStatus::Visited => " # ",
            CellStatus::Adjacent => " ? ",
            CellStatus::Unknown => "   ",
        }
    }
}

/// Legend printed under the map.
pub const MAP_LEGEND: &str = "@ = You  # = Explored  ? = Adjacent  E = Exit";

/// Classifies a room for the map.
///
/// The current room wins over everything; the exit only shows once it has
/// been visited; an unvisited room shows as adjacent when a visited
/// neighbour has a passage into it.
pub fn cell_status(state: &GameState, room: &Room) -> CellStatus {
    if room.id == state.character.current_room_id {
        CellStatus::Current
    } else if room.is_exit && state.is_room_visited(room.id) {
        CellStatus::Exit
    } else if state.is_room_visited(room.id) {
        CellStatus::Visited
    } else if state.is_room_adjacent(room.id) {
        CellStatus::Adjacent
    } else {
        CellStatus::Unknown
    }
}

/// Status of the cell at `position`; cells without a room are unknown.
pub fn cell_status_at(state: &GameState, position: Position) -> CellStatus {
    state
        .room_at(position)
        .map(|room| cell_status(state, room))
        .unwrap_or(CellStatus::Unknown)
}

/// Draws the grid with north at the top.
///
/// # Examples
///
/// ```
/// use dungeon_crawler::{generate_dungeon, render_box_map, GameState, GenerationConfig};
///
/// let state = GameState::new("Hero", generate_dungeon(&GenerationConfig::new(1)).unwrap()).unwrap();
/// let map = render_box_map(&state);
/// assert!(map.starts_with('┌'));
/// assert_eq!(map.matches('@').count(), 2); // the cell and the legend
/// ```
pub fn render_box_map(state: &GameState) -> String {
    if state.current_room().is_none() {
        return "No map available".to_string();
    }

    let size = state.grid_size() as i32;
    let mut map = String::new();
    map.push_str(&border('┌', '┬', '┐', size));

    for y in (0..size).rev() {
        map.push('│');
        for x in 0..size {
            map.push_str(cell_status_at(state, Position::new(x, y)).glyph());
            map.push('│');
        }
        map.push('\n');

        if y > 0 {
            map.push_str(&border('├', '┼', '┤', size));
        }
    }

    map.push_str(&border('└', '┴', '┘', size));
    map.push_str(&format!("\n{}", MAP_LEGEND));
    map
}

fn border(left: char, joint: char, right: char, size: i32) -> String {
    let mut line = String::new();
    line.push(left);
    for x in 0..size {
        line.push_str("───");
        if x < size - 1 {
            line.push(joint);
        }
    }
    line.push(right);
    line.push('\n');
    line
}
