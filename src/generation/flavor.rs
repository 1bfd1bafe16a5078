//! # Room Flavor
//!
//! Weighted name and description pools for generated rooms.

use crate::generation::{roll_chance, GenerationConfig};
use rand::seq::SliceRandom;
use rand::Rng;

/// A pool entry: text and its relative weight.
pub type WeightedText = (&'static str, u32);

pub const ENTRANCE_NAME: &str = "Dungeon Entrance";
pub const ENTRANCE_DESCRIPTION: &str =
    "Daylight spills down the worn stone steps behind you. The air ahead is cold and still.";
pub const EXIT_NAME: &str = "Exit Stairway";
pub const EXIT_DESCRIPTION: &str =
    "A narrow stairway climbs toward a faint breeze. Freedom lies just above.";

pub const ROOM_ADJECTIVES: &[WeightedText] = &[
    ("Dark", 10),
    ("Dusty", 10),
    ("Damp", 8),
    ("Ancient", 7),
    ("Silent", 6),
    ("Echoing", 6),
    ("Crumbling", 5),
    ("Forgotten", 5),
    ("Flooded", 3),
    ("Cursed", 2),
];

pub const ROOM_NOUNS: &[WeightedText] = &[
    ("Chamber", 10),
    ("Hall", 8),
    ("Corridor", 8),
    ("Passage", 7),
    ("Alcove", 5),
    ("Vault", 4),
    ("Cellar", 4),
    ("Crypt", 3),
    ("Shrine", 2),
];

/// Room descriptions, ordered from mundane to unsettling. The back half is
/// the pool far rooms reroll into.
pub const ROOM_DESCRIPTIONS: &[WeightedText] = &[
    ("Water drips steadily from the low ceiling into shallow puddles.", 10),
    ("Broken crates and rotting barrels are stacked against the walls.", 9),
    ("Faded tapestries hang in tatters from iron hooks.", 8),
    ("The floor is covered in a thick layer of undisturbed dust.", 8),
    ("Torch sconces line the walls, long since burnt out.", 7),
    ("A cold draft whistles through cracks in the masonry.", 6),
    ("Scratch marks score the stone, as if something tried to dig its way out.", 5),
    ("Old bones lie scattered across the floor, picked clean.", 4),
    ("Strange symbols are carved into every surface, glowing faintly.", 3),
    ("The air is thick with the stench of decay and something worse.", 3),
    ("Whispers seem to come from the walls themselves.", 2),
    ("Dried blood stains the floor in long, desperate streaks.", 2),
];

/// Picks a weighted entry from a pool; an empty pool yields `""`.
pub fn choose_weighted<R: Rng>(pool: &[WeightedText], rng: &mut R) -> &'static str {
    pool.choose_weighted(rng, |entry| entry.1)
        .map(|entry| entry.0)
        .unwrap_or_default()
}

/// Random "Adjective Noun" room name.
pub fn room_name<R: Rng>(rng: &mut R) -> String {
    let adjective = choose_weighted(ROOM_ADJECTIVES, rng);
    let noun = choose_weighted(ROOM_NOUNS, rng);
    format!("{} {}", adjective, noun)
}

/// Random room description for a room `distance` steps from the entrance.
pub fn room_description<R: Rng>(distance: u32, config: &GenerationConfig, rng: &mut R) -> String {
    let description = choose_weighted(ROOM_DESCRIPTIONS, rng);

    if distance > config.scary_description_distance
        && roll_chance(rng, config.scary_description_chance)
    {
        let scary = &ROOM_DESCRIPTIONS[ROOM_DESCRIPTIONS.len() / 2..];
        return choose_weighted(scary, rng).to_string();
    }

    description.to_string()
}
