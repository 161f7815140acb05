//! Command table: registration, alias resolution, cooldowns and help.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::error::{FrameworkError, FrameworkResult};
use crate::handler::{BoxedHandler, Handler, into_handler};

/// A registered chat command.
pub struct Command {
    name: String,
    description: Option<String>,
    usage: Option<String>,
    aliases: Vec<String>,
    cooldown: u64,
    handler: BoxedHandler,
}

impl Command {
    /// Starts building a command with the given canonical name.
    pub fn new(name: impl Into<String>) -> CommandBuilder {
        CommandBuilder {
            name: name.into(),
            description: None,
            usage: None,
            aliases: Vec::new(),
            cooldown: 0,
        }
    }

    /// Canonical name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Help description, if one was set.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Usage hint, if one was set.
    pub fn usage(&self) -> Option<&str> {
        self.usage.as_deref()
    }

    /// Alternate invocation names.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Per-user cooldown in whole seconds. Zero means no cooldown.
    pub fn cooldown(&self) -> u64 {
        self.cooldown
    }

    /// The handler invoked when the command matches.
    pub fn handler(&self) -> BoxedHandler {
        self.handler.clone()
    }
}

/// Fluent builder for [`Command`].
pub struct CommandBuilder {
    name: String,
    description: Option<String>,
    usage: Option<String>,
    aliases: Vec<String>,
    cooldown: u64,
}

impl CommandBuilder {
    /// Sets the help description. Commands without one stay out of the
    /// generated help text.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the usage hint.
    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    /// Adds alternate invocation names.
    pub fn aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    /// Sets the per-user cooldown in seconds.
    pub fn cooldown(mut self, seconds: u64) -> Self {
        self.cooldown = seconds;
        self
    }

    /// Attaches the handler and finishes the command.
    pub fn handler<F, T>(self, f: F) -> Command
    where
        F: Handler<T>,
        T: 'static,
    {
        Command {
            name: self.name,
            description: self.description,
            usage: self.usage,
            aliases: self.aliases,
            cooldown: self.cooldown,
            handler: into_handler(f),
        }
    }
}

/// Registry of commands with alias and cooldown bookkeeping.
#[derive(Default)]
pub struct CommandTable {
    commands: HashMap<String, Command>,
    aliases: HashMap<String, String>,
    /// `(command, user)` to the instant the cooldown expires.
    cooldowns: Mutex<HashMap<(String, String), Instant>>,
}

impl CommandTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a command. Re-registering a name or alias overwrites the
    /// previous binding.
    pub fn insert(&mut self, command: Command) {
        for alias in &command.aliases {
            self.aliases.insert(alias.clone(), command.name.clone());
        }
        self.commands.insert(command.name.clone(), command);
    }

    /// Maps an alias to its canonical name. Unknown tokens pass through
    /// unchanged.
    pub fn resolve_alias<'a>(&'a self, token: &'a str) -> &'a str {
        self.aliases.get(token).map(String::as_str).unwrap_or(token)
    }

    /// Whether the token names a command, canonically or via alias.
    pub fn contains(&self, token: &str) -> bool {
        self.commands.contains_key(self.resolve_alias(token))
    }

    /// Looks up a command by canonical name or alias.
    pub fn fetch(&self, token: &str) -> FrameworkResult<&Command> {
        let name = self.resolve_alias(token);
        self.commands
            .get(name)
            .ok_or_else(|| FrameworkError::CommandNotFound(token.to_string()))
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether no commands are registered.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Starts a cooldown window for `(name, user_id)`.
    pub fn set_cooldown(&self, name: &str, user_id: &str, seconds: u64) {
        if seconds == 0 {
            return;
        }
        self.cooldowns.lock().insert(
            (name.to_string(), user_id.to_string()),
            Instant::now() + Duration::from_secs(seconds),
        );
    }

    /// Whole seconds left on the cooldown for `(name, user_id)`. Absent or
    /// expired records count as zero; expired records are dropped.
    pub fn cooldown_remaining(&self, name: &str, user_id: &str) -> u64 {
        let key = (name.to_string(), user_id.to_string());
        let mut cooldowns = self.cooldowns.lock();
        match cooldowns.get(&key) {
            Some(expires) => {
                let remaining = expires.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    cooldowns.remove(&key);
                    0
                } else {
                    remaining.as_secs().max(1)
                }
            }
            None => 0,
        }
    }

    /// Renders the help listing. Commands without a description are hidden.
    pub fn render_help(&self, prefix: &str) -> String {
        let mut entries: Vec<&Command> = self
            .commands
            .values()
            .filter(|command| command.description.is_some())
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        let mut help = String::from("[COMMANDS]\n\n");
        for command in entries {
            help.push_str(&format!(
                "{prefix}{} - {}\n",
                command.name,
                command.description.as_deref().unwrap_or_default()
            ));
            if let Some(usage) = &command.usage {
                help.push_str(&format!("  usage: {usage}\n"));
            }
        }
        help
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn noop() {}

    fn table_with(commands: Vec<Command>) -> CommandTable {
        let mut table = CommandTable::new();
        for command in commands {
            table.insert(command);
        }
        table
    }

    #[test]
    fn aliases_resolve_to_the_canonical_name() {
        let table = table_with(vec![
            Command::new("ping").aliases(["p", "pong"]).handler(noop),
        ]);

        assert_eq!(table.resolve_alias("p"), "ping");
        assert_eq!(table.resolve_alias("pong"), "ping");
        assert_eq!(table.resolve_alias("unknown"), "unknown");
        assert!(table.contains("p"));
        assert!(table.contains("ping"));
        assert!(!table.contains("nope"));
    }

    #[test]
    fn fetch_reports_unknown_commands() {
        let table = table_with(vec![Command::new("ping").handler(noop)]);
        assert!(table.fetch("ping").is_ok());
        assert!(matches!(
            table.fetch("missing"),
            Err(FrameworkError::CommandNotFound(name)) if name == "missing"
        ));
    }

    #[test]
    fn cooldowns_are_scoped_per_user() {
        let table = table_with(vec![
            Command::new("roll").cooldown(30).handler(noop),
        ]);

        table.set_cooldown("roll", "userA", 30);
        assert!(table.cooldown_remaining("roll", "userA") > 0);
        assert_eq!(table.cooldown_remaining("roll", "userB"), 0);
    }

    #[test]
    fn zero_cooldown_records_nothing() {
        let table = table_with(vec![Command::new("ping").handler(noop)]);
        table.set_cooldown("ping", "userA", 0);
        assert_eq!(table.cooldown_remaining("ping", "userA"), 0);
    }

    #[test]
    fn help_hides_undocumented_commands() {
        let table = table_with(vec![
            Command::new("ping")
                .description("checks the bot is alive")
                .handler(noop),
            Command::new("secret").handler(noop),
        ]);

        let help = table.render_help("!");
        assert!(help.contains("!ping - checks the bot is alive"));
        assert!(!help.contains("secret"));
    }

    #[test]
    fn reregistration_overwrites_the_previous_binding() {
        let mut table = CommandTable::new();
        table.insert(Command::new("ping").description("old").handler(noop));
        table.insert(Command::new("ping").description("new").handler(noop));

        assert_eq!(table.len(), 1);
        assert_eq!(table.fetch("ping").unwrap().description(), Some("new"));
    }
}
