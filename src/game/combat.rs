//! # Combat Resolver
//!
//! One round of melee: the player swings, and a surviving monster strikes
//! back. The only state consulted besides the two combatants is the
//! shared [`Dice`].

use crate::config::combat::{BASE_DEFENSE, CRITICAL_THRESHOLD, D20, D6, MIN_DAMAGE};
use crate::game::{Character, Monster};
use crate::utils::Dice;
use serde::{Deserialize, Serialize};

/// Flat outcome of a combat round, shaped like the event log rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatSummary {
    /// Damage the monster dealt to the player
    pub attacker_damage: i32,
    /// Damage the player dealt to the monster
    pub defender_damage: i32,
    /// Player hp after the round
    pub attacker_hp: i32,
    /// Monster hp after the round
    pub defender_hp: i32,
    pub attacker_died: bool,
    pub defender_died: bool,
    /// Narrative description of the round
    pub message: String,
}

/// Detail of a single attack for UI consumption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackResult {
    pub attacker_name: String,
    pub target_name: String,
    pub damage: i32,
    pub was_hit: bool,
    pub was_critical: bool,
    pub remaining_hp: i32,
}

/// Per-attack breakdown of a combat round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_attack: Option<AttackResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enemy_attack: Option<AttackResult>,
    pub enemy_defeated: bool,
    pub player_died: bool,
}

/// Everything one call to [`execute_combat_turn`] produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatRound {
    pub summary: CombatSummary,
    pub detail: CombatDetail,
    /// False once either side has died
    pub continues: bool,
}

/// Resolves one round of combat between `player` and `monster`.
///
/// The player attacks first with d20 + dex/2 against a defense of 10,
/// dealing d6 + str/2 + `weapon_bonus`. A monster that survives answers
/// with d20 against 10 + dex/2 + `armor_bonus`, dealing its damage plus a
/// d6 - 3 swing. Every hit deals at least 1 damage and a d6 of 5 or 6 is a
/// critical. Hit points and alive flags on both combatants are updated.
///
/// # Examples
///
/// ```
/// use dungeon_crawler::{execute_combat_turn, new_entity_id, Character, Dice, Monster};
///
/// let room = new_entity_id();
/// let mut hero = Character::new("Hero", room);
/// let mut rat = Monster {
///     id: new_entity_id(),
///     name: "Rat".to_string(),
///     description: String::new(),
///     hp: 5,
///     max_hp: 5,
///     damage: 2,
///     room_id: room,
///     is_alive: true,
///     loot_table: Vec::new(),
/// };
///
/// let round = execute_combat_turn(&Dice::new(1), &mut hero, &mut rat, 0, 0);
/// assert!(round.detail.player_attack.is_some());
/// assert_eq!(round.continues, hero.is_alive && rat.is_alive);
/// ```
pub fn execute_combat_turn(
    dice: &Dice,
    player: &mut Character,
    monster: &mut Monster,
    weapon_bonus: i32,
    armor_bonus: i32,
) -> CombatRound {
    let mut summary = CombatSummary {
        attacker_hp: player.hp,
        defender_hp: monster.hp,
        ..CombatSummary::default()
    };
    let mut detail = CombatDetail::default();

    let player_damage_bonus = player.strength / 2 + weapon_bonus;
    let attack_roll = dice.roll_die(D20) + player.dexterity / 2;

    let mut player_attack = AttackResult {
        attacker_name: player.name.clone(),
        target_name: monster.name.clone(),
        damage: 0,
        was_hit: false,
        was_critical: false,
        remaining_hp: monster.hp,
    };

    if attack_roll >= BASE_DEFENSE {
        let damage_roll = dice.roll_die(D6);
        let damage = (damage_roll + player_damage_bonus).max(MIN_DAMAGE);
        player_attack.was_hit = true;
        player_attack.damage = damage;
        player_attack.was_critical = damage_roll >= CRITICAL_THRESHOLD;

        let killed = monster.take_damage(damage);
        summary.defender_damage = damage;
        summary.defender_hp = monster.hp;
        player_attack.remaining_hp = monster.hp;

        let prefix = if player_attack.was_critical {
            "CRITICAL HIT! "
        } else {
            ""
        };

        if killed {
            summary.defender_died = true;
            summary.message = format!(
                "{}You strike the {} for {} damage! The {} collapses!",
                prefix, monster.name, damage, monster.name
            );
            detail.player_attack = Some(player_attack);
            detail.enemy_defeated = true;
            return CombatRound {
                summary,
                detail,
                continues: false,
            };
        }

        summary.message = format!(
            "{}You strike the {} for {} damage! ({}/{} HP)",
            prefix, monster.name, damage, monster.hp, monster.max_hp
        );
    } else {
        summary.message = format!("You swing at the {} but miss!", monster.name);
    }
    detail.player_attack = Some(player_attack);

    let monster_roll = dice.roll_die(D20);
    let player_defense = BASE_DEFENSE + player.dexterity / 2 + armor_bonus;

    let mut enemy_attack = AttackResult {
        attacker_name: monster.name.clone(),
        target_name: player.name.clone(),
        damage: 0,
        was_hit: false,
        was_critical: false,
        remaining_hp: player.hp,
    };

    if monster_roll >= player_defense {
        let damage_roll = dice.roll_die(D6);
        let damage = (monster.damage + damage_roll - 3).max(MIN_DAMAGE);
        enemy_attack.was_hit = true;
        enemy_attack.damage = damage;
        enemy_attack.was_critical = damage_roll >= CRITICAL_THRESHOLD;

        player.take_damage(damage);
        summary.attacker_damage = damage;
        summary.attacker_hp = player.hp;
        enemy_attack.remaining_hp = player.hp;

        let prefix = if enemy_attack.was_critical {
            " CRITICAL HIT!"
        } else {
            ""
        };

        if !player.is_alive {
            summary.attacker_died = true;
            summary.message.push_str(&format!(
                "{} The {} strikes back for {} damage! You have fallen...",
                prefix, monster.name, damage
            ));
            detail.enemy_attack = Some(enemy_attack);
            detail.player_died = true;
            return CombatRound {
                summary,
                detail,
                continues: false,
            };
        }

        summary.message.push_str(&format!(
            "{} The {} strikes back for {} damage! (HP: {}/{})",
            prefix, monster.name, damage, player.hp, player.max_hp
        ));
    } else {
        summary
            .message
            .push_str(&format!(" The {} tries to attack but misses!", monster.name));
    }
    detail.enemy_attack = Some(enemy_attack);

    CombatRound {
        summary,
        detail,
        continues: true,
    }
}
