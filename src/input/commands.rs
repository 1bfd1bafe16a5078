//! # Command Definitions
//!
//! Parsing of typed console lines into [`Command`]s.

use crate::game::Direction;
use crate::{CrawlerError, CrawlerResult};

/// Help shown by the `help` command.
pub const HELP_TEXT: &str = "\
Commands:
  new [name]          start a new game
  look (l)            describe the current room
  move <dir> (go, n/s/e/w)
                      walk north, south, east or west
  attack <monster>    fight a monster in this room
  take <item>         pick an item up
  use <item>          drink or use a carried item
  equip <item>        wield a weapon or wear armor
  inventory (i)       list carried items
  stats               show character stats
  map (m)             show the explored map
  help (?)            show this help
  quit (q)            leave the game

Monsters and items can be named by id, id prefix or name.";

/// A console command before its targets are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    NewGame(Option<String>),
    Look,
    Move(Direction),
    /// Target reference: an id, id prefix or name
    Attack(String),
    Take(String),
    Use(String),
    Equip(String),
    Inventory,
    Stats,
    Map,
    Help,
    Quit,
}

impl Command {
    /// Parses one line. Blank lines yield `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use dungeon_crawler::{Command, Direction};
    ///
    /// assert_eq!(Command::parse("go north").unwrap(), Some(Command::Move(Direction::North)));
    /// assert_eq!(Command::parse("n").unwrap(), Some(Command::Move(Direction::North)));
    /// assert_eq!(Command::parse("take health potion").unwrap(),
    ///            Some(Command::Take("health potion".to_string())));
    /// assert!(Command::parse("   ").unwrap().is_none());
    /// ```
    pub fn parse(line: &str) -> CrawlerResult<Option<Command>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };
        let verb = verb.to_lowercase();

        let command = match verb.as_str() {
            "new" | "new_game" | "start" => {
                Command::NewGame(Some(rest).filter(|name| !name.is_empty()).map(str::to_string))
            }
            "look" | "l" => Command::Look,
            "move" | "go" | "walk" => Command::Move(rest.parse()?),
            "north" | "south" | "east" | "west" | "n" | "s" | "e" | "w" => {
                Command::Move(verb.parse()?)
            }
            "attack" | "fight" | "hit" => Command::Attack(target(&verb, rest)?),
            "take" | "get" | "pick" => {
                let rest = rest.strip_prefix("up ").unwrap_or(rest);
                Command::Take(target(&verb, rest)?)
            }
            "use" | "drink" => Command::Use(target(&verb, rest)?),
            "equip" | "wield" | "wear" => Command::Equip(target(&verb, rest)?),
            "inventory" | "inv" | "i" => Command::Inventory,
            "stats" | "status" => Command::Stats,
            "map" | "m" => Command::Map,
            "help" | "?" | "h" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => {
                return Err(CrawlerError::InvalidArgument(format!(
                    "unknown command '{}' (type 'help' for a list)",
                    other
                )))
            }
        };

        Ok(Some(command))
    }
}

fn target(verb: &str, rest: &str) -> CrawlerResult<String> {
    if rest.is_empty() {
        return Err(CrawlerError::InvalidArgument(format!(
            "'{}' needs a target",
            verb
        )));
    }
    Ok(rest.to_string())
}
