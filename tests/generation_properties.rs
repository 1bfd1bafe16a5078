//! Structural properties every generated dungeon must have.

use dungeon_crawler::config::MAX_DOORS_PER_ROOM;
use dungeon_crawler::{
    generate_dungeon, GameState, GenerationConfig, Position, TARGET_DOOR_SHARES,
};
use proptest::prelude::*;
use std::collections::HashMap;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_layout_invariants(seed in any::<u64>(), grid_size in 2u32..8) {
        let config = GenerationConfig::new(seed).with_grid_size(grid_size);
        let generated = generate_dungeon(&config).unwrap();
        let layout = &generated.layout;

        prop_assert_eq!(layout.rooms.len(), (grid_size * grid_size) as usize);
        prop_assert_eq!(layout.dungeon.grid_size, grid_size);

        let entrance = layout.entrance().unwrap();
        let exit = layout.exit().unwrap();
        prop_assert_eq!(entrance.position(), Position::origin());
        let last = grid_size as i32 - 1;
        prop_assert_eq!(exit.position(), Position::new(last, last));
        prop_assert_eq!(layout.rooms.iter().filter(|r| r.is_entrance).count(), 1);
        prop_assert_eq!(layout.rooms.iter().filter(|r| r.is_exit).count(), 1);

        let positions: HashMap<_, _> = layout.rooms.iter().map(|r| (r.id, r.position())).collect();
        for room in &layout.rooms {
            let doors = layout.door_count(room.id);
            prop_assert!((1..=MAX_DOORS_PER_ROOM).contains(&doors), "room has {} doors", doors);
        }
        for connection in &layout.connections {
            let from = positions[&connection.room_id];
            let to = positions[&connection.connected_room_id];
            prop_assert_eq!(from.step(connection.direction), to);
            let has_reverse = layout.connections.iter().any(|back| {
                back.room_id == connection.connected_room_id
                    && back.connected_room_id == connection.room_id
                    && back.direction == connection.direction.opposite()
            });
            prop_assert!(has_reverse);
        }

        let state = GameState::new("Prop", generated.clone()).unwrap();
        prop_assert_eq!(state.reachable_rooms().len(), layout.rooms.len());
    }

    #[test]
    fn test_population_rules(seed in any::<u64>()) {
        let generated = generate_dungeon(&GenerationConfig::new(seed)).unwrap();
        let entrance_id = generated.layout.entrance().unwrap().id;
        let exit_id = generated.layout.exit().unwrap().id;

        prop_assert!(generated
            .monsters
            .iter()
            .all(|m| m.room_id != entrance_id && m.room_id != exit_id));
        prop_assert!(generated
            .monsters
            .iter()
            .all(|m| m.is_alive && m.hp == m.max_hp && m.hp > 0));
        prop_assert!(generated.traps.is_empty());
        prop_assert!(generated.items.iter().all(|item| item.room_id() != Some(exit_id)));
        prop_assert!(generated.items.iter().any(|item| item.room_id() == Some(entrance_id)));
    }

    #[test]
    fn test_seed_reproduces_dungeon(seed in any::<u64>()) {
        let one = generate_dungeon(&GenerationConfig::new(seed)).unwrap();
        let two = generate_dungeon(&GenerationConfig::new(seed)).unwrap();
        prop_assert_eq!(&one.layout.rooms, &two.layout.rooms);
        prop_assert_eq!(&one.layout.connections, &two.layout.connections);
        prop_assert_eq!(&one.monsters, &two.monsters);
        prop_assert_eq!(&one.items, &two.items);
    }
}

#[test]
fn test_single_cell_dungeon() {
    let generated = generate_dungeon(&GenerationConfig::new(3).with_grid_size(1)).unwrap();
    let room = &generated.layout.rooms[0];
    assert!(room.is_entrance && room.is_exit);
    assert!(generated.layout.connections.is_empty());
    assert_eq!(generated.layout.door_count(room.id), 0);
}

#[test]
fn test_door_mix_tracks_target() {
    let mut histogram = [0usize; 4];
    for seed in 0..200 {
        let generated = generate_dungeon(&GenerationConfig::new(seed)).unwrap();
        for room in &generated.layout.rooms {
            histogram[generated.layout.door_count(room.id)] += 1;
        }
    }

    let rooms: usize = histogram.iter().sum();
    assert_eq!(histogram[0], 0);
    for doors in 1..=3 {
        let share = histogram[doors] as f64 / rooms as f64;
        assert!(
            (share - TARGET_DOOR_SHARES[doors]).abs() < 0.05,
            "{} doors: share {:.3}, histogram {:?}",
            doors,
            share,
            histogram
        );
    }
}
