//! Interactive command loop
//!
//! Reads lines, cleans them into words, looks the first word up in an
//! immutable `CommandRegistry`, and dispatches to the matching handler.
//! Handler errors are printed and the loop carries on; only `exit`, end of
//! input, or a broken output stream ends it.

mod commands;
mod registry;

pub use registry::{Command, CommandKind, CommandRegistry};

use std::collections::BTreeMap;
use std::io::{self, Write};

use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use crate::api::{ApiError, HttpRetriever, PokeApiClient, Pokemon};
use crate::cache::Retrieve;
use crate::catch::{BaseExperiencePolicy, CatchPolicy};

/// Prompt printed before each line is read
pub const PROMPT: &str = "Pokedex > ";

/// Errors reported back to the user by a command
#[derive(Debug, Error)]
pub enum CommandError {
    /// The first word did not name a registered command
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// Wrong number of arguments
    #[error("usage: {0}")]
    Usage(String),

    /// `mapb` with no earlier page to go back to
    #[error("you're on the first page")]
    FirstPage,

    /// `map` after the final page was shown
    #[error("you're on the last page")]
    LastPage,

    /// The API has no resource by this name
    #[error("no {kind} named {name}")]
    NotFound { kind: &'static str, name: String },

    /// `inspect` on a Pokemon that is not in the Pokedex
    #[error("you haven't caught {0} yet")]
    NotCaught(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// What the loop should do after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Pagination cursor over the location-area listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Locator of the page `map` shows next
    pub next: Option<String>,
    /// Locator of the page `mapb` shows next
    pub previous: Option<String>,
    /// Whether any page has been shown yet
    pub started: bool,
}

/// REPL state: command table, API client, pagination and caught Pokemon
pub struct Repl<R = HttpRetriever> {
    registry: CommandRegistry,
    client: PokeApiClient<R>,
    session: Session,
    pokedex: BTreeMap<String, Pokemon>,
    policy: Box<dyn CatchPolicy>,
    rng: StdRng,
}

impl<R: Retrieve> Repl<R> {
    /// Creates a REPL with the default catch policy and an entropy-seeded RNG
    pub fn new(registry: CommandRegistry, client: PokeApiClient<R>) -> Self {
        Self {
            registry,
            client,
            session: Session::default(),
            pokedex: BTreeMap::new(),
            policy: Box::new(BaseExperiencePolicy),
            rng: StdRng::from_entropy(),
        }
    }

    /// Replaces the catch policy and RNG (useful for deterministic tests)
    pub fn with_catch_policy(mut self, policy: impl CatchPolicy + 'static, rng: StdRng) -> Self {
        self.policy = Box::new(policy);
        self.rng = rng;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Caught Pokemon, keyed by name
    pub fn pokedex(&self) -> &BTreeMap<String, Pokemon> {
        &self.pokedex
    }

    /// Runs one input line
    ///
    /// Blank lines are a no-op. Output goes to `out`; failures come back as
    /// `CommandError` for the caller to report.
    pub async fn execute<W: Write>(&mut self, line: &str, out: &mut W) -> Result<Flow, CommandError> {
        let words = clean_input(line);
        let Some((name, args)) = words.split_first() else {
            return Ok(Flow::Continue);
        };

        let command = *self
            .registry
            .get(name)
            .ok_or_else(|| CommandError::UnknownCommand(name.clone()))?;

        debug!(command = command.name, ?args, "dispatching command");
        self.dispatch(command, args, out).await
    }

    /// Reads lines from `input` until end of input or `exit`
    ///
    /// Lines that are not valid UTF-8 are decoded lossily, so a stray byte
    /// becomes an unknown command rather than ending the session.
    ///
    /// # Returns
    /// * `Ok(())` when the loop finished normally
    /// * `Err` if reading input or writing output failed
    pub async fn run<I, W>(&mut self, mut input: I, out: &mut W) -> io::Result<()>
    where
        I: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut buf = Vec::new();

        loop {
            write!(out, "{}", PROMPT)?;
            out.flush()?;

            buf.clear();
            if input.read_until(b'\n', &mut buf).await? == 0 {
                writeln!(out)?;
                break;
            }
            let line = String::from_utf8_lossy(&buf);

            match self.execute(&line, out).await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => break,
                Err(CommandError::Io(err)) => return Err(err),
                Err(err) => {
                    debug!(error = %err, "command failed");
                    writeln!(out, "{}", err)?;
                }
            }
        }

        Ok(())
    }
}

/// Lowercases `text` and splits it into whitespace-separated words
pub fn clean_input(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::DEFAULT_BASE_URL;
    use crate::cache::{ExpiringCache, FetchError};
    use crate::catch::FixedChance;
    use async_trait::async_trait;
    use bytes::Bytes;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    const ROOT: &str = "https://pokeapi.co/api/v2/location-area/";
    const PAGE_2: &str = "https://pokeapi.co/api/v2/location-area/?offset=2&limit=2";

    const PAGE_1_BODY: &str = r#"{"count": 3,
        "next": "https://pokeapi.co/api/v2/location-area/?offset=2&limit=2",
        "previous": null,
        "results": [{"name": "canalave-city-area", "url": "u"}, {"name": "eterna-city-area", "url": "u"}]}"#;

    const PAGE_2_BODY: &str = r#"{"count": 3,
        "next": null,
        "previous": "https://pokeapi.co/api/v2/location-area/",
        "results": [{"name": "pastoria-city-area", "url": "u"}]}"#;

    const AREA_BODY: &str = r#"{"name": "pastoria-city-area",
        "pokemon_encounters": [
            {"pokemon": {"name": "tentacool", "url": "u"}},
            {"pokemon": {"name": "magikarp", "url": "u"}}
        ]}"#;

    const PIKACHU_BODY: &str = r#"{"name": "pikachu", "base_experience": 112, "height": 4, "weight": 60,
        "stats": [{"base_stat": 35, "stat": {"name": "hp", "url": "u"}}],
        "types": [{"slot": 1, "type": {"name": "electric", "url": "u"}}]}"#;

    /// Serves canned bodies by locator and 404s everything else
    #[derive(Clone, Default)]
    struct StubRetriever {
        bodies: HashMap<&'static str, &'static str>,
        requested: Arc<Mutex<Vec<String>>>,
    }

    impl StubRetriever {
        fn standard() -> Self {
            let mut bodies = HashMap::new();
            bodies.insert(ROOT, PAGE_1_BODY);
            bodies.insert(PAGE_2, PAGE_2_BODY);
            bodies.insert(
                "https://pokeapi.co/api/v2/location-area/pastoria-city-area",
                AREA_BODY,
            );
            bodies.insert("https://pokeapi.co/api/v2/pokemon/pikachu", PIKACHU_BODY);
            Self {
                bodies,
                ..Default::default()
            }
        }

        fn requests_for(&self, locator: &str) -> usize {
            self.requested.lock().iter().filter(|l| *l == locator).count()
        }
    }

    #[async_trait]
    impl Retrieve for StubRetriever {
        async fn retrieve(&self, locator: &str) -> Result<Bytes, FetchError> {
            self.requested.lock().push(locator.to_string());
            match self.bodies.get(locator) {
                Some(body) => Ok(Bytes::from_static(body.as_bytes())),
                None => Err(FetchError::Status {
                    locator: locator.to_string(),
                    status: 404,
                }),
            }
        }
    }

    fn repl_with(chance: f64) -> (Repl<StubRetriever>, StubRetriever) {
        let (cache, _sweeper) = ExpiringCache::new(Duration::from_secs(60));
        let retriever = StubRetriever::standard();
        let client = PokeApiClient::with_retriever(cache, retriever.clone(), DEFAULT_BASE_URL);
        let repl = Repl::new(CommandRegistry::standard(), client)
            .with_catch_policy(FixedChance(chance), StdRng::seed_from_u64(1));
        (repl, retriever)
    }

    async fn exec(repl: &mut Repl<StubRetriever>, line: &str) -> (Result<Flow, CommandError>, String) {
        let mut out = Vec::new();
        let result = repl.execute(line, &mut out).await;
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_clean_input() {
        let cases = [
            ("  hello  world  ", vec!["hello", "world"]),
            ("HELLO WORLD ", vec!["hello", "world"]),
            (" heLLo World", vec!["hello", "world"]),
            (" Hello ", vec!["hello"]),
            ("   ", vec![]),
            ("catch\tPikachu", vec!["catch", "pikachu"]),
        ];

        for (input, expected) in cases {
            assert_eq!(clean_input(input), expected, "input: {:?}", input);
        }
    }

    #[tokio::test]
    async fn test_blank_line_is_a_no_op() {
        let (mut repl, retriever) = repl_with(1.0);

        let (result, output) = exec(&mut repl, "   ").await;

        assert_eq!(result.unwrap(), Flow::Continue);
        assert!(output.is_empty());
        assert!(retriever.requested.lock().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_command() {
        let (mut repl, _) = repl_with(1.0);

        let (result, _) = exec(&mut repl, "fly cerulean").await;

        let err = result.unwrap_err();
        assert!(matches!(err, CommandError::UnknownCommand(ref name) if name == "fly"));
        assert!(err.to_string().starts_with("Unknown command"));
    }

    #[tokio::test]
    async fn test_help_lists_every_command() {
        let (mut repl, _) = repl_with(1.0);

        let (result, output) = exec(&mut repl, "HELP").await;

        assert_eq!(result.unwrap(), Flow::Continue);
        assert!(output.starts_with("Welcome to the Pokedex!"));
        for command in CommandRegistry::standard().iter() {
            assert!(output.contains(command.description), "missing {}", command.name);
        }
        assert!(output.contains("explore <location_area>"));
    }

    #[tokio::test]
    async fn test_exit_ends_the_loop() {
        let (mut repl, _) = repl_with(1.0);

        let (result, output) = exec(&mut repl, "exit").await;

        assert_eq!(result.unwrap(), Flow::Exit);
        assert!(output.contains("Goodbye"));
    }

    #[tokio::test]
    async fn test_map_pages_forward_and_back() {
        let (mut repl, retriever) = repl_with(1.0);

        let (result, output) = exec(&mut repl, "map").await;
        result.unwrap();
        assert_eq!(output, "canalave-city-area\neterna-city-area\n");
        assert_eq!(repl.session().next.as_deref(), Some(PAGE_2));

        let (result, output) = exec(&mut repl, "map").await;
        result.unwrap();
        assert_eq!(output, "pastoria-city-area\n");

        let (result, _) = exec(&mut repl, "map").await;
        assert!(matches!(result, Err(CommandError::LastPage)));

        let (result, output) = exec(&mut repl, "mapb").await;
        result.unwrap();
        assert_eq!(output, "canalave-city-area\neterna-city-area\n");

        let (result, _) = exec(&mut repl, "mapb").await;
        assert!(matches!(result, Err(CommandError::FirstPage)));

        // Going back to the first page was served from cache
        assert_eq!(retriever.requests_for(ROOT), 1);
        assert_eq!(retriever.requests_for(PAGE_2), 1);
    }

    #[tokio::test]
    async fn test_mapb_before_map_is_first_page() {
        let (mut repl, retriever) = repl_with(1.0);

        let (result, _) = exec(&mut repl, "mapb").await;

        assert!(matches!(result, Err(CommandError::FirstPage)));
        assert!(retriever.requested.lock().is_empty());
    }

    #[tokio::test]
    async fn test_explore_lists_encounters() {
        let (mut repl, _) = repl_with(1.0);

        let (result, output) = exec(&mut repl, "explore pastoria-city-area").await;

        result.unwrap();
        assert!(output.contains("Exploring pastoria-city-area..."));
        assert!(output.contains(" - tentacool\n"));
        assert!(output.contains(" - magikarp\n"));
    }

    #[tokio::test]
    async fn test_explore_requires_one_argument() {
        let (mut repl, _) = repl_with(1.0);

        let (result, _) = exec(&mut repl, "explore").await;

        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "usage: explore <location_area>");
    }

    #[tokio::test]
    async fn test_explore_unknown_area() {
        let (mut repl, _) = repl_with(1.0);

        let (result, _) = exec(&mut repl, "explore nowhere").await;

        assert!(matches!(
            result,
            Err(CommandError::NotFound { kind: "location area", ref name }) if name == "nowhere"
        ));
    }

    #[tokio::test]
    async fn test_catch_then_inspect_and_list() {
        let (mut repl, _) = repl_with(1.0);

        let (result, output) = exec(&mut repl, "catch pikachu").await;
        result.unwrap();
        assert!(output.contains("Throwing a Pokeball at pikachu..."));
        assert!(output.contains("pikachu was caught!"));
        assert!(repl.pokedex().contains_key("pikachu"));

        let (result, output) = exec(&mut repl, "inspect pikachu").await;
        result.unwrap();
        assert!(output.contains("Name: pikachu"));
        assert!(output.contains("Height: 4"));
        assert!(output.contains("Weight: 60"));
        assert!(output.contains("  - hp: 35"));
        assert!(output.contains("  - electric"));

        let (result, output) = exec(&mut repl, "pokedex").await;
        result.unwrap();
        assert_eq!(output, "Your Pokedex:\n - pikachu\n");
    }

    #[tokio::test]
    async fn test_escaped_pokemon_cannot_be_inspected() {
        let (mut repl, _) = repl_with(0.0);

        let (result, output) = exec(&mut repl, "catch pikachu").await;
        result.unwrap();
        assert!(output.contains("pikachu escaped!"));
        assert!(repl.pokedex().is_empty());

        let (result, _) = exec(&mut repl, "inspect pikachu").await;
        assert_eq!(result.unwrap_err().to_string(), "you haven't caught pikachu yet");
    }

    #[tokio::test]
    async fn test_catch_unknown_pokemon() {
        let (mut repl, _) = repl_with(1.0);

        let (result, _) = exec(&mut repl, "catch agumon").await;

        assert_eq!(result.unwrap_err().to_string(), "no Pokemon named agumon");
    }

    #[tokio::test]
    async fn test_run_reports_errors_and_stops_at_exit() {
        let (mut repl, retriever) = repl_with(1.0);
        let input: &[u8] = b"help\n\nbogus\nmapb\nexit\nmap\n";
        let mut out = Vec::new();

        repl.run(input, &mut out).await.expect("Loop should finish");

        let output = String::from_utf8(out).unwrap();
        assert!(output.starts_with(PROMPT));
        assert!(output.contains("Unknown command: bogus"));
        assert!(output.contains("you're on the first page"));
        assert!(output.contains("Goodbye"));
        assert_eq!(output.matches(PROMPT).count(), 5);
        assert!(retriever.requested.lock().is_empty(), "Nothing after exit runs");
    }

    #[tokio::test]
    async fn test_run_survives_invalid_utf8_line() {
        let (mut repl, _) = repl_with(1.0);
        let input: &[u8] = b"catch pikachu\n\xffhello\npokedex\nexit\n";
        let mut out = Vec::new();

        repl.run(input, &mut out).await.expect("Bad bytes should not end the loop");

        let output = String::from_utf8(out).unwrap();
        assert!(output.contains("pikachu was caught!"));
        assert!(output.contains("Unknown command: \u{fffd}hello"));
        assert!(output.contains("Your Pokedex:\n - pikachu\n"));
        assert!(output.contains("Goodbye"));
    }

    #[tokio::test]
    async fn test_run_handles_crlf_line_endings() {
        let (mut repl, _) = repl_with(1.0);
        let input: &[u8] = b"pokedex\r\nexit\r\n";
        let mut out = Vec::new();

        repl.run(input, &mut out).await.unwrap();

        let output = String::from_utf8(out).unwrap();
        assert!(output.contains("Your Pokedex:"));
        assert!(output.contains("Goodbye"));
    }

    #[tokio::test]
    async fn test_run_ends_at_end_of_input() {
        let (mut repl, _) = repl_with(1.0);
        let input: &[u8] = b"pokedex";
        let mut out = Vec::new();

        repl.run(input, &mut out).await.unwrap();

        let output = String::from_utf8(out).unwrap();
        assert!(output.contains("Your Pokedex:"));
        assert!(output.ends_with(&format!("{}\n", PROMPT)));
    }
}
