//! # Dungeon Generation
//!
//! Grid dungeon layout generation using a randomized Prim's algorithm.
//!
//! The generator creates layouts by:
//! 1. Placing one room on every cell of an N×N grid
//! 2. Connecting the rooms with a door-capped random spanning tree
//! 3. Adding extra passages that steer the door-count mix toward
//!    roughly 25% one-door, 50% two-door and 25% three-door rooms
//! 4. Validating connectivity, reciprocity and door counts

use crate::game::{seeded_entity_id, Connection, Direction, Dungeon, Position, Room};
use crate::generation::{
    room_description, room_name, DungeonLayout, GenerationConfig, Generator, ENTRANCE_DESCRIPTION,
    ENTRANCE_NAME, EXIT_DESCRIPTION, EXIT_NAME,
};
use crate::utils::reachable_rooms;
use crate::{CrawlerError, CrawlerResult};
use chrono::Utc;
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// An undirected passage between two grid cells, by cell index.
type Edge = (usize, usize);

/// Share of rooms each door count should settle around, indexed by door
/// count. Counts past the end have a target of zero.
pub const TARGET_DOOR_SHARES: [f64; 4] = [0.0, 0.25, 0.5, 0.25];

/// Chance that an extra passage improving the door mix is kept.
const EXTRA_EDGE_ACCEPTANCE: f64 = 0.85;

/// Primary dungeon generator for room grids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridDungeonGenerator {
    /// Most doors a room may have
    pub max_doors: usize,
    /// Door-capped tree attempts before the serpentine fallback
    pub tree_attempts: u32,
}

impl GridDungeonGenerator {
    /// Creates a generator using the door budget of `config`.
    ///
    /// # Examples
    ///
    /// ```
    /// use dungeon_crawler::{create_rng, GenerationConfig, Generator, GridDungeonGenerator};
    ///
    /// let config = GenerationConfig::new(5);
    /// let generator = GridDungeonGenerator::new(&config);
    /// let layout = generator.generate(&config, &mut create_rng(&config)).unwrap();
    /// assert_eq!(layout.rooms.len(), 25);
    /// ```
    pub fn new(config: &GenerationConfig) -> Self {
        Self {
            max_doors: config.max_doors_per_room,
            tree_attempts: config.tree_attempts,
        }
    }

    fn create_rooms(
        &self,
        dungeon: &Dungeon,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> Vec<Room> {
        let size = config.grid_size as i32;
        let exit = config.exit_position();
        let mut rooms = Vec::with_capacity(config.room_count());

        for y in 0..size {
            for x in 0..size {
                let position = Position::new(x, y);
                let is_entrance = position == Position::origin();
                let is_exit = position == exit;

                let (name, description) = if is_entrance {
                    (ENTRANCE_NAME.to_string(), ENTRANCE_DESCRIPTION.to_string())
                } else if is_exit {
                    (EXIT_NAME.to_string(), EXIT_DESCRIPTION.to_string())
                } else {
                    let distance = position.manhattan_distance(Position::origin());
                    (room_name(rng), room_description(distance, config, rng))
                };

                rooms.push(Room {
                    id: seeded_entity_id(rng),
                    dungeon_id: dungeon.id,
                    name,
                    description,
                    is_entrance,
                    is_exit,
                    x,
                    y,
                });
            }
        }

        rooms
    }

    /// Builds the base spanning tree, retrying the capped construction and
    /// falling back to a serpentine path.
    fn spanning_tree(&self, size: usize, rng: &mut StdRng) -> Vec<Edge> {
        for attempt in 1..=self.tree_attempts {
            if let Some(edges) = self.try_capped_prim(size, rng) {
                return edges;
            }
            debug!("Capped spanning tree attempt {} left cells unreached", attempt);
        }

        warn!(
            "No door-capped spanning tree after {} attempts, using a serpentine path",
            self.tree_attempts
        );
        serpentine_path(size)
    }

    /// One randomized Prim's pass. Edges leaving a room that is already at
    /// the door cap are discarded, so the pass can strand cells.
    fn try_capped_prim(&self, size: usize, rng: &mut StdRng) -> Option<Vec<Edge>> {
        let total = size * size;
        let mut visited = vec![false; total];
        let mut doors = vec![0usize; total];
        let mut edges = Vec::with_capacity(total.saturating_sub(1));

        visited[0] = true;
        let mut frontier: Vec<Edge> = grid_neighbours(0, size)
            .into_iter()
            .map(|next| (0, next))
            .collect();

        while !frontier.is_empty() {
            let (from, to) = frontier.swap_remove(rng.gen_range(0..frontier.len()));
            if visited[to] || doors[from] >= self.max_doors {
                continue;
            }

            visited[to] = true;
            doors[from] += 1;
            doors[to] += 1;
            edges.push((from, to));

            frontier.extend(
                grid_neighbours(to, size)
                    .into_iter()
                    .filter(|next| !visited[*next])
                    .map(|next| (to, next)),
            );
        }

        (edges.len() + 1 == total).then_some(edges)
    }

    /// Adds non-tree passages that move the door-count histogram closer to
    /// the target mix. Candidates are tried in random order and an
    /// improving one is accepted with [`EXTRA_EDGE_ACCEPTANCE`].
    ///
    /// Only doors can be added, and a tree has two fewer three-door rooms
    /// than leaves, so the three-door share never drops below the tree's.
    fn add_extra_edges(&self, size: usize, tree: &[Edge], rng: &mut StdRng) -> Vec<Edge> {
        let total = size * size;
        let mut doors = vec![0usize; total];
        for &(a, b) in tree {
            doors[a] += 1;
            doors[b] += 1;
        }

        let buckets = doors.iter().copied().max().unwrap_or(0).max(self.max_doors) + 1;
        let mut histogram = vec![0usize; buckets];
        for &count in &doors {
            histogram[count] += 1;
        }

        let existing: HashSet<Edge> = tree.iter().map(|&(a, b)| normalized(a, b)).collect();
        let mut candidates: Vec<Edge> = (0..total)
            .flat_map(|cell| {
                grid_neighbours(cell, size)
                    .into_iter()
                    .filter(move |next| *next > cell)
                    .map(move |next| (cell, next))
            })
            .filter(|edge| !existing.contains(edge))
            .collect();
        candidates.shuffle(rng);

        let mut extra = Vec::new();
        for (a, b) in candidates {
            if doors[a] >= self.max_doors || doors[b] >= self.max_doors {
                continue;
            }

            let mut proposed = histogram.clone();
            add_door(&mut proposed, doors[a]);
            add_door(&mut proposed, doors[b]);
            if histogram_error(&proposed, total) >= histogram_error(&histogram, total) {
                continue;
            }

            if rng.gen_bool(EXTRA_EDGE_ACCEPTANCE) {
                histogram = proposed;
                doors[a] += 1;
                doors[b] += 1;
                extra.push((a, b));
            }
        }

        debug!("Added {} extra passages, door histogram {:?}", extra.len(), histogram);
        extra
    }

    fn edges_to_connections(
        &self,
        edges: &[Edge],
        rooms: &[Room],
        rng: &mut StdRng,
    ) -> CrawlerResult<Vec<Connection>> {
        let mut connections = Vec::with_capacity(edges.len() * 2);

        for &(a, b) in edges {
            let (from, to) = (&rooms[a], &rooms[b]);
            let direction = Direction::from_delta(to.position() - from.position()).ok_or_else(
                || {
                    CrawlerError::GenerationFailed(format!(
                        "Rooms at {:?} and {:?} are not grid neighbours",
                        from.position(),
                        to.position()
                    ))
                },
            )?;

            connections.push(Connection {
                id: seeded_entity_id(rng),
                room_id: from.id,
                direction,
                connected_room_id: to.id,
            });
            connections.push(Connection {
                id: seeded_entity_id(rng),
                room_id: to.id,
                direction: direction.opposite(),
                connected_room_id: from.id,
            });
        }

        Ok(connections)
    }
}

impl Default for GridDungeonGenerator {
    fn default() -> Self {
        Self::new(&GenerationConfig::default())
    }
}

impl Generator<DungeonLayout> for GridDungeonGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> CrawlerResult<DungeonLayout> {
        config.check_grid_size()?;
        let size = config.grid_size as usize;

        let dungeon = Dungeon {
            id: seeded_entity_id(rng),
            seed: config.seed,
            depth: config.depth,
            grid_size: config.grid_size,
            created_at: Utc::now(),
        };

        let rooms = self.create_rooms(&dungeon, config, rng);

        let mut edges = self.spanning_tree(size, rng);
        let extra = self.add_extra_edges(size, &edges, rng);
        edges.extend(extra);

        let connections = self.edges_to_connections(&edges, &rooms, rng)?;

        let layout = DungeonLayout {
            dungeon,
            rooms,
            connections,
        };

        // Final validation
        self.validate(&layout, config)?;

        Ok(layout)
    }

    fn validate(&self, layout: &DungeonLayout, config: &GenerationConfig) -> CrawlerResult<()> {
        let fail = |reason: String| Err(CrawlerError::GenerationFailed(reason));
        let expected_rooms = config.room_count();

        if layout.rooms.len() != expected_rooms {
            return fail(format!(
                "Expected {} rooms, found {}",
                expected_rooms,
                layout.rooms.len()
            ));
        }

        let entrances: Vec<&Room> = layout.rooms.iter().filter(|r| r.is_entrance).collect();
        let exits: Vec<&Room> = layout.rooms.iter().filter(|r| r.is_exit).collect();
        if entrances.len() != 1 || entrances[0].position() != Position::origin() {
            return fail("Dungeon must have exactly one entrance at (0, 0)".to_string());
        }
        if exits.len() != 1 || exits[0].position() != config.exit_position() {
            return fail("Dungeon must have exactly one exit in the far corner".to_string());
        }

        let passages: HashSet<(Position, Direction, Position)> = layout
            .connections
            .iter()
            .filter_map(|c| {
                let from = layout.rooms.iter().find(|r| r.id == c.room_id)?;
                let to = layout.rooms.iter().find(|r| r.id == c.connected_room_id)?;
                Some((from.position(), c.direction, to.position()))
            })
            .collect();
        if passages.len() != layout.connections.len() {
            return fail("Connections reference unknown rooms or repeat".to_string());
        }
        for &(from, direction, to) in &passages {
            if from.step(direction) != to {
                return fail(format!("Passage {:?} -> {:?} skips cells", from, to));
            }
            if !passages.contains(&(to, direction.opposite(), from)) {
                return fail(format!("Passage {:?} -> {:?} has no way back", from, to));
            }
        }

        let reachable = reachable_rooms(entrances[0].id, &layout.connection_map());
        if reachable.len() != layout.rooms.len() {
            return fail(format!(
                "Only {} of {} rooms are reachable from the entrance",
                reachable.len(),
                layout.rooms.len()
            ));
        }

        if config.grid_size >= 2 {
            for room in &layout.rooms {
                let doors = layout.door_count(room.id);
                if doors == 0 || doors > self.max_doors {
                    return fail(format!(
                        "Room at {:?} has {} doors",
                        room.position(),
                        doors
                    ));
                }
            }
        }

        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "GridDungeonGenerator"
    }
}

fn normalized(a: usize, b: usize) -> Edge {
    (a.min(b), a.max(b))
}

/// Cells sharing a side with `cell` on a `size`×`size` grid, where cell
/// index is `y * size + x`.
fn grid_neighbours(cell: usize, size: usize) -> Vec<usize> {
    let (x, y) = (cell % size, cell / size);
    let mut neighbours = Vec::with_capacity(4);
    if y + 1 < size {
        neighbours.push(cell + size);
    }
    if y > 0 {
        neighbours.push(cell - size);
    }
    if x + 1 < size {
        neighbours.push(cell + 1);
    }
    if x > 0 {
        neighbours.push(cell - 1);
    }
    neighbours
}

/// Moves one room from `current` doors to `current + 1`.
fn add_door(histogram: &mut [usize], current: usize) {
    histogram[current] -= 1;
    histogram[current + 1] += 1;
}

/// Squared distance between a door-count histogram over `rooms` rooms and
/// [`TARGET_DOOR_SHARES`].
fn histogram_error(histogram: &[usize], rooms: usize) -> f64 {
    histogram
        .iter()
        .enumerate()
        .map(|(count, &with_count)| {
            let target = TARGET_DOOR_SHARES.get(count).copied().unwrap_or(0.0) * rooms as f64;
            (with_count as f64 - target).powi(2)
        })
        .sum()
}

/// Boustrophedon path through every row. Every cell has at most two doors.
fn serpentine_path(size: usize) -> Vec<Edge> {
    let order: Vec<usize> = (0..size)
        .flat_map(|y| {
            let row: Vec<usize> = if y % 2 == 0 {
                (0..size).map(|x| y * size + x).collect()
            } else {
                (0..size).rev().map(|x| y * size + x).collect()
            };
            row
        })
        .collect();

    order.windows(2).map(|pair| (pair[0], pair[1])).collect()
}
