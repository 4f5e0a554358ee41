//! Command handlers

use std::io::Write;

use super::{Command, CommandError, CommandKind, Flow, Repl};
use crate::api::{ApiError, LocationAreaPage};
use crate::cache::Retrieve;
use crate::catch::attempt_catch;

impl<R: Retrieve> Repl<R> {
    pub(super) async fn dispatch<W: Write>(
        &mut self,
        command: Command,
        args: &[String],
        out: &mut W,
    ) -> Result<Flow, CommandError> {
        match command.kind {
            CommandKind::Help => self.help(out)?,
            CommandKind::Exit => {
                writeln!(out, "Closing the Pokedex... Goodbye!")?;
                return Ok(Flow::Exit);
            }
            CommandKind::Map => self.map_forward(out).await?,
            CommandKind::MapBack => self.map_back(out).await?,
            CommandKind::Explore => {
                let area = single_arg(&command, args)?;
                self.explore(area, out).await?
            }
            CommandKind::Catch => {
                let name = single_arg(&command, args)?;
                self.catch(name, out).await?
            }
            CommandKind::Inspect => {
                let name = single_arg(&command, args)?;
                self.inspect(name, out)?
            }
            CommandKind::Pokedex => self.list_pokedex(out)?,
        }
        Ok(Flow::Continue)
    }

    fn help<W: Write>(&self, out: &mut W) -> Result<(), CommandError> {
        write!(out, "Welcome to the Pokedex!\nUsage:\n\n")?;
        for command in self.registry.iter() {
            if command.usage.is_empty() {
                writeln!(out, "{}: {}", command.name, command.description)?;
            } else {
                writeln!(out, "{} {}: {}", command.name, command.usage, command.description)?;
            }
        }
        Ok(())
    }

    async fn map_forward<W: Write>(&mut self, out: &mut W) -> Result<(), CommandError> {
        // Once the listing has started, a missing `next` means the end
        if self.session.started && self.session.next.is_none() {
            return Err(CommandError::LastPage);
        }
        let locator = self.session.next.clone();
        let page = self.client.location_areas(locator.as_deref()).await?;
        self.show_page(page, out)
    }

    async fn map_back<W: Write>(&mut self, out: &mut W) -> Result<(), CommandError> {
        let Some(locator) = self.session.previous.clone() else {
            return Err(CommandError::FirstPage);
        };
        let page = self.client.location_areas(Some(locator.as_str())).await?;
        self.show_page(page, out)
    }

    fn show_page<W: Write>(&mut self, page: LocationAreaPage, out: &mut W) -> Result<(), CommandError> {
        self.session.next = page.next;
        self.session.previous = page.previous;
        self.session.started = true;

        for area in &page.results {
            writeln!(out, "{}", area.name)?;
        }
        Ok(())
    }

    async fn explore<W: Write>(&self, area: &str, out: &mut W) -> Result<(), CommandError> {
        writeln!(out, "Exploring {}...", area)?;
        let location = self
            .client
            .location_area(area)
            .await
            .map_err(|err| not_found_as("location area", area, err))?;

        writeln!(out, "Found Pokemon:")?;
        for encounter in &location.pokemon_encounters {
            writeln!(out, " - {}", encounter.pokemon.name)?;
        }
        Ok(())
    }

    async fn catch<W: Write>(&mut self, name: &str, out: &mut W) -> Result<(), CommandError> {
        writeln!(out, "Throwing a Pokeball at {}...", name)?;
        let pokemon = self
            .client
            .pokemon(name)
            .await
            .map_err(|err| not_found_as("Pokemon", name, err))?;

        if !attempt_catch(self.policy.as_ref(), pokemon.base_experience, &mut self.rng) {
            writeln!(out, "{} escaped!", name)?;
            return Ok(());
        }

        writeln!(out, "{} was caught!", name)?;
        writeln!(out, "You may now inspect it with the inspect command.")?;
        self.pokedex.insert(name.to_string(), pokemon);
        Ok(())
    }

    fn inspect<W: Write>(&self, name: &str, out: &mut W) -> Result<(), CommandError> {
        let pokemon = self
            .pokedex
            .get(name)
            .ok_or_else(|| CommandError::NotCaught(name.to_string()))?;

        writeln!(out, "Name: {}", pokemon.name)?;
        writeln!(out, "Height: {}", pokemon.height)?;
        writeln!(out, "Weight: {}", pokemon.weight)?;
        writeln!(out, "Stats:")?;
        for stat in &pokemon.stats {
            writeln!(out, "  - {}: {}", stat.stat.name, stat.base_stat)?;
        }
        writeln!(out, "Types:")?;
        for pokemon_type in &pokemon.types {
            writeln!(out, "  - {}", pokemon_type.kind.name)?;
        }
        Ok(())
    }

    fn list_pokedex<W: Write>(&self, out: &mut W) -> Result<(), CommandError> {
        writeln!(out, "Your Pokedex:")?;
        for name in self.pokedex.keys() {
            writeln!(out, " - {}", name)?;
        }
        Ok(())
    }
}

fn single_arg<'a>(command: &Command, args: &'a [String]) -> Result<&'a str, CommandError> {
    match args {
        [arg] => Ok(arg.as_str()),
        _ => Err(CommandError::Usage(format!("{} {}", command.name, command.usage))),
    }
}

fn not_found_as(kind: &'static str, name: &str, err: ApiError) -> CommandError {
    if err.is_not_found() {
        CommandError::NotFound {
            kind,
            name: name.to_string(),
        }
    } else {
        CommandError::Api(err)
    }
}
