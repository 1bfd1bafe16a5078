//! Full games played through the tool interface.

use dungeon_crawler::{
    new_entity_id, CrawlerResult, EngineConfig, EventSubtype, McpServer, Monster, ToolResult,
    DEATH_MESSAGE, NO_GAME_MESSAGE, VICTORY_MESSAGE,
};
use serde_json::json;

fn started(dungeon_seed: u64) -> McpServer {
    let mut server = McpServer::new(EngineConfig::seeded(dungeon_seed, dungeon_seed + 1));
    let result = server
        .call_tool("new_game", &json!({ "character_name": "Tester" }))
        .unwrap();
    assert!(!result.is_error);
    server
}

fn call(server: &mut McpServer, name: &str, arguments: serde_json::Value) -> ToolResult {
    server.call_tool(name, &arguments).unwrap()
}

#[test]
fn test_walk_to_the_exit() -> CrawlerResult<()> {
    for seed in [1, 7, 42] {
        let mut server = started(seed);
        {
            let state = server.state_mut().unwrap();
            state.character.max_hp = 100_000;
            state.character.hp = 100_000;
        }

        let mut last = None;
        for _ in 0..500 {
            let state = server.state().unwrap();
            if state.is_game_over() {
                break;
            }
            let here = state.character.current_room_id;

            if let Some(monster) = state.room_monsters(here).first() {
                let target = monster.id.to_string();
                last = Some(call(&mut server, "attack", json!({ "target_id": target })));
                continue;
            }

            let exit_id = state.exit_room().unwrap().id;
            let route = state.route_to(exit_id).unwrap();
            let direction = route[0].as_str();
            last = Some(call(&mut server, "move", json!({ "direction": direction })));
        }

        let last = last.unwrap();
        assert!(last.text_content().contains("VICTORY!"));
        let snapshot = last.game_state.unwrap();
        assert!(snapshot.game_over);
        assert!(snapshot.victory);
        assert_eq!(snapshot.event.unwrap().subtype, EventSubtype::DungeonEscaped);

        let after = call(&mut server, "look", json!({}));
        assert_eq!(after.text_content(), VICTORY_MESSAGE);
        let refused = call(&mut server, "move", json!({ "direction": "south" }));
        assert_eq!(refused.text_content(), VICTORY_MESSAGE);
    }
    Ok(())
}

#[test]
fn test_death_ends_the_game() {
    let mut server = started(5);
    let ogre = new_entity_id();
    {
        let state = server.state_mut().unwrap();
        state.character.hp = 1;
        let room_id = state.character.current_room_id;
        state.add_monster(Monster {
            id: ogre,
            name: "Ogre".to_string(),
            description: "Far too strong.".to_string(),
            hp: 100_000,
            max_hp: 100_000,
            damage: 50,
            room_id,
            is_alive: true,
            loot_table: Vec::new(),
        });
    }

    let mut died = false;
    for _ in 0..500 {
        let result = call(&mut server, "attack", json!({ "target_id": ogre.to_string() }));
        if result.text_content().contains("YOU HAVE DIED") {
            let snapshot = result.game_state.unwrap();
            assert!(snapshot.game_over);
            assert!(!snapshot.victory);
            died = true;
            break;
        }
    }
    assert!(died);

    let refused = call(&mut server, "attack", json!({ "target_id": ogre.to_string() }));
    assert_eq!(refused.text_content(), DEATH_MESSAGE);
    assert!(!refused.is_error);

    // Queries still answer after death.
    let stats = call(&mut server, "stats", json!({}));
    assert!(stats.text_content().contains("Tester"));

    // A new game starts over.
    let fresh = call(&mut server, "new_game", json!({}));
    assert!(!fresh.game_state.unwrap().game_over);
    assert_eq!(server.state().unwrap().character.name, "Hero");
}

#[test]
fn test_queries_do_not_change_the_game() {
    let mut server = started(11);
    let before = server.state().unwrap().save_to_json().unwrap();
    let turn = server.turn_number();
    let events = server.event_log().len();

    for tool in ["inventory", "stats", "map", "inventory"] {
        let first = call(&mut server, tool, json!({}));
        let second = call(&mut server, tool, json!({}));
        assert_eq!(first, second);
    }

    assert_eq!(server.state().unwrap().save_to_json().unwrap(), before);
    assert_eq!(server.turn_number(), turn);
    assert_eq!(server.event_log().len(), events);
}

#[test]
fn test_every_tool_needs_a_game() {
    let mut server = McpServer::new(EngineConfig::default());
    let id = new_entity_id().to_string();
    let calls = [
        ("look", json!({})),
        ("move", json!({ "direction": "north" })),
        ("attack", json!({ "target_id": id })),
        ("take", json!({ "item_id": id })),
        ("use", json!({ "item_id": id })),
        ("equip", json!({ "item_id": id })),
        ("inventory", json!({})),
        ("stats", json!({})),
        ("map", json!({})),
    ];
    for (name, arguments) in calls {
        let result = call(&mut server, name, arguments);
        assert_eq!(result.text_content(), NO_GAME_MESSAGE, "tool {}", name);
        assert!(result.game_state.is_none());
    }
}

#[test]
fn test_same_seeds_replay_the_same_game() {
    let play = || {
        let mut server = started(99);
        let mut transcript = Vec::new();
        for direction in ["north", "east", "south", "west", "north"] {
            let result = call(&mut server, "move", json!({ "direction": direction }));
            transcript.push(result.text_content());
        }
        transcript
    };
    assert_eq!(play(), play());
}
