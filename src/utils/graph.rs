//! # Room Graph Search
//!
//! Breadth-first searches over the room connection graph.

use crate::game::{Connection, Direction, RoomId};
use pathfinding::prelude::{bfs, bfs_reach};
use std::collections::{HashMap, HashSet};

/// Outgoing connections keyed by source room.
pub type ConnectionMap = HashMap<RoomId, Vec<Connection>>;

fn neighbours(connections: &ConnectionMap, room_id: &RoomId) -> Vec<RoomId> {
    connections
        .get(room_id)
        .map(|outgoing| outgoing.iter().map(|c| c.connected_room_id).collect())
        .unwrap_or_default()
}

/// Every room reachable from `start` (including `start`).
pub fn reachable_rooms(start: RoomId, connections: &ConnectionMap) -> HashSet<RoomId> {
    bfs_reach(start, |room_id| neighbours(connections, room_id)).collect()
}

/// Shortest sequence of moves leading from `start` to `goal`.
///
/// Returns an empty route when `start == goal` and `None` when the goal
/// cannot be reached.
pub fn route_between(
    start: RoomId,
    goal: RoomId,
    connections: &ConnectionMap,
) -> Option<Vec<Direction>> {
    let rooms = bfs(
        &start,
        |room_id| neighbours(connections, room_id),
        |room_id| *room_id == goal,
    )?;

    rooms
        .windows(2)
        .map(|pair| {
            connections.get(&pair[0]).and_then(|outgoing| {
                outgoing
                    .iter()
                    .find(|c| c.connected_room_id == pair[1])
                    .map(|c| c.direction)
            })
        })
        .collect()
}
