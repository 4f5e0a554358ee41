//! The fixed table of REPL commands

use std::collections::BTreeMap;

/// What a command does when dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Help,
    Exit,
    Map,
    MapBack,
    Explore,
    Catch,
    Inspect,
    Pokedex,
}

/// A named command shown in help and matched against user input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    pub name: &'static str,
    pub description: &'static str,
    /// Argument synopsis shown in help, empty for commands without arguments
    pub usage: &'static str,
    pub kind: CommandKind,
}

/// Immutable mapping from command name to command
///
/// Built once at startup and handed to the `Repl`; it never changes afterwards.
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    commands: BTreeMap<&'static str, Command>,
}

impl CommandRegistry {
    /// Builds a registry from an explicit list of commands
    ///
    /// Later entries replace earlier ones with the same name.
    pub fn from_commands(commands: impl IntoIterator<Item = Command>) -> Self {
        Self {
            commands: commands.into_iter().map(|c| (c.name, c)).collect(),
        }
    }

    /// The full set of explorer commands
    pub fn standard() -> Self {
        Self::from_commands([
            Command {
                name: "help",
                description: "Displays a help message",
                usage: "",
                kind: CommandKind::Help,
            },
            Command {
                name: "exit",
                description: "Exit the Pokedex",
                usage: "",
                kind: CommandKind::Exit,
            },
            Command {
                name: "map",
                description: "Show the next page of location areas",
                usage: "",
                kind: CommandKind::Map,
            },
            Command {
                name: "mapb",
                description: "Show the previous page of location areas",
                usage: "",
                kind: CommandKind::MapBack,
            },
            Command {
                name: "explore",
                description: "List the Pokemon found in a location area",
                usage: "<location_area>",
                kind: CommandKind::Explore,
            },
            Command {
                name: "catch",
                description: "Try to catch a Pokemon",
                usage: "<pokemon_name>",
                kind: CommandKind::Catch,
            },
            Command {
                name: "inspect",
                description: "Inspect a caught Pokemon",
                usage: "<pokemon_name>",
                kind: CommandKind::Inspect,
            },
            Command {
                name: "pokedex",
                description: "Show Pokemon in your Pokedex",
                usage: "",
                kind: CommandKind::Pokedex,
            },
        ])
    }

    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    /// Commands in name order
    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.values()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
