//! Event registry and dispatch.
//!
//! One slot per [`EventKind`], filled at startup and read-only afterwards.
//! Text-message events additionally run through the command router, which
//! owns prefix matching, alias resolution, cooldowns, the built-in help
//! reply and the reply-wait recording path.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error};

use trellis_core::entities::Message;
use trellis_core::{Client, EventKind, EventPayload};

use crate::commands::{Command, CommandTable};
use crate::context::Context;
use crate::error::FrameworkError;
use crate::handler::{BoxFuture, BoxedHandler, Handler, into_handler};
use crate::reply_wait::ReplyWaitCache;

/// Handler for raw-payload kinds and internal signals. Receives the event
/// payload verbatim, without a [`Context`].
pub type RawHandler = Arc<dyn Fn(Value) -> BoxFuture<'static, ()> + Send + Sync>;

/// Event registry plus command router.
pub struct Dispatcher {
    slots: HashMap<EventKind, BoxedHandler>,
    raw_slots: HashMap<EventKind, RawHandler>,
    commands: CommandTable,
    reply_wait: Arc<ReplyWaitCache>,
    client: Arc<dyn Client>,
    prefix: String,
    intents: bool,
}

impl Dispatcher {
    /// Creates an empty dispatcher bound to a transport client.
    pub fn new(client: Arc<dyn Client>, prefix: impl Into<String>, intents: bool) -> Self {
        Self {
            slots: HashMap::new(),
            raw_slots: HashMap::new(),
            commands: CommandTable::new(),
            reply_wait: Arc::new(ReplyWaitCache::new()),
            client,
            prefix: prefix.into(),
            intents,
        }
    }

    /// Registers a handler for an event kind. Last write wins.
    pub fn register<F, T>(&mut self, kind: EventKind, f: F)
    where
        F: Handler<T>,
        T: 'static,
    {
        self.slots.insert(kind, into_handler(f));
    }

    /// Registers a raw handler for payload-only kinds and internal signals.
    pub fn register_raw<F, Fut>(&mut self, kind: EventKind, f: F)
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.raw_slots
            .insert(kind, Arc::new(move |value| Box::pin(f(value))));
    }

    /// Registers a command.
    pub fn register_command(&mut self, command: Command) {
        self.commands.insert(command);
    }

    /// The command table.
    pub fn commands(&self) -> &CommandTable {
        &self.commands
    }

    /// The shared reply-wait cache.
    pub fn reply_wait(&self) -> Arc<ReplyWaitCache> {
        Arc::clone(&self.reply_wait)
    }

    /// The command prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Invokes the raw slot for `kind` with the payload verbatim. A missing
    /// slot is a no-op.
    pub async fn emit(&self, kind: EventKind, payload: Value) {
        match self.raw_slots.get(&kind) {
            Some(handler) => handler(payload).await,
            None => debug!(event = kind.as_str(), "no raw handler registered"),
        }
    }

    /// Routes one event to its handler.
    pub async fn dispatch(&self, kind: EventKind, payload: EventPayload) {
        if kind.is_raw_payload() {
            self.emit(kind, payload_value(payload)).await;
            return;
        }

        let message = match payload {
            EventPayload::Message(message) => message,
            EventPayload::Notification(notification) => Message {
                chat_id: notification.chat_id,
                com_id: notification.com_id,
                ..Message::default()
            },
            EventPayload::Presence(presence) => Message {
                com_id: presence.com_id,
                ..Message::default()
            },
            EventPayload::Signal(value) => {
                debug!(event = kind.as_str(), ?value, "signal for non-raw kind dropped");
                return;
            }
        };

        let outcome = match kind {
            EventKind::TextMessage | EventKind::ConsoleTextMessage => {
                self.dispatch_text(kind, message).await
            }
            _ => self.run_slot(kind, message).await,
        };

        if let Err(err) = outcome {
            self.report_error(kind, err).await;
        }
    }

    async fn run_slot(&self, kind: EventKind, message: Message) -> Result<(), FrameworkError> {
        let Some(handler) = self.slots.get(&kind) else {
            debug!(event = kind.as_str(), "no handler registered");
            return Ok(());
        };
        let ctx = self.make_context(message);
        handler.call(ctx).await
    }

    /// Text-message path: reply-wait recording, then the command router.
    async fn dispatch_text(&self, kind: EventKind, message: Message) -> Result<(), FrameworkError> {
        let content = message.content.clone().unwrap_or_default();
        // The command token must immediately follow the prefix; "! ping"
        // has an empty token and is plain text.
        let candidate = content
            .strip_prefix(&self.prefix)
            .and_then(|rest| rest.split(' ').next())
            .filter(|token| !token.is_empty())
            .map(str::to_string);
        let is_command = candidate
            .as_deref()
            .is_some_and(|token| self.commands.contains(token));

        // Non-command text from a known author feeds waiting handlers.
        if self.intents
            && !is_command
            && let Some(author) = &message.author
        {
            self.reply_wait
                .record(&message.chat_id, &author.user_id, &content);
        }

        let Some(token) = candidate.filter(|_| is_command) else {
            return self.dispatch_text_fallback(kind, message, &content).await;
        };

        let user_id = message
            .author
            .as_ref()
            .map(|author| author.user_id.clone())
            .unwrap_or_default();
        let name = self.commands.resolve_alias(&token).to_string();
        let command = self.commands.fetch(&name)?;
        let ctx = self.make_context(message);

        if command.cooldown() > 0 {
            let remaining = self.commands.cooldown_remaining(&name, &user_id);
            if remaining > 0 {
                debug!(command = %name, user = %user_id, remaining, "command on cooldown");
                ctx.reply(&format!("You are on cooldown for {remaining} seconds."))
                    .await?;
                return Ok(());
            }
            self.commands.set_cooldown(&name, &user_id, command.cooldown());
        }

        // Everything after "<prefix><token> " becomes the handler's text.
        let consumed = self.prefix.len() + token.len();
        let remainder = content
            .get(consumed..)
            .map(|rest| rest.strip_prefix(' ').unwrap_or(rest))
            .unwrap_or_default();
        ctx.set_command_text(remainder.to_string());

        debug!(command = %name, user = %user_id, "running command");
        command.handler().call(ctx).await
    }

    /// No-match path: built-in help, then the generic text slot.
    async fn dispatch_text_fallback(
        &self,
        kind: EventKind,
        message: Message,
        content: &str,
    ) -> Result<(), FrameworkError> {
        if content == format!("{}help", self.prefix) && !self.commands.contains("help") {
            let ctx = self.make_context(message);
            ctx.reply(&self.commands.render_help(&self.prefix)).await?;
            return Ok(());
        }
        self.run_slot(kind, message.clone()).await?;
        // Plain text is also forwarded to the console slot, if one exists.
        if kind == EventKind::TextMessage && self.slots.contains_key(&EventKind::ConsoleTextMessage)
        {
            self.run_slot(EventKind::ConsoleTextMessage, message).await?;
        }
        Ok(())
    }

    fn make_context(&self, message: Message) -> Arc<Context> {
        Arc::new(Context::new(
            message,
            Arc::clone(&self.client),
            self.intents,
            Arc::clone(&self.reply_wait),
        ))
    }

    async fn report_error(&self, kind: EventKind, err: FrameworkError) {
        match self.raw_slots.get(&EventKind::Error) {
            Some(hook) => {
                let payload = serde_json::json!({
                    "event": kind.as_str(),
                    "error": err.to_string(),
                });
                hook(payload).await;
            }
            None => error!(event = kind.as_str(), %err, "handler failed"),
        }
    }
}

fn payload_value(payload: EventPayload) -> Value {
    match payload {
        EventPayload::Signal(value) => value,
        EventPayload::Message(message) => serde_json::to_value(message).unwrap_or(Value::Null),
        EventPayload::Notification(notification) => {
            serde_json::to_value(notification).unwrap_or(Value::Null)
        }
        EventPayload::Presence(presence) => serde_json::to_value(presence).unwrap_or(Value::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::tests::RecordingClient;
    use crate::extractor::MessageText;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use trellis_core::entities::{Author, Notification, OnlineMembers};

    fn text_message(content: &str) -> EventPayload {
        EventPayload::Message(Message {
            message_id: "m1".into(),
            chat_id: "c1".into(),
            com_id: 3,
            content: Some(content.into()),
            author: Some(Author {
                user_id: "u1".into(),
                username: Some("Ada".into()),
            }),
            mentioned_user_ids: Vec::new(),
        })
    }

    fn dispatcher(client: Arc<RecordingClient>, intents: bool) -> Dispatcher {
        Dispatcher::new(client, "!", intents)
    }

    #[tokio::test]
    async fn commands_receive_the_remainder_text() {
        static SEEN: Mutex<Option<String>> = Mutex::new(None);
        async fn ping(text: MessageText) {
            *SEEN.lock() = text.0;
        }

        let client = Arc::new(RecordingClient::new());
        let mut d = dispatcher(client, false);
        d.register_command(Command::new("ping").handler(ping));

        d.dispatch(EventKind::TextMessage, text_message("!ping one two"))
            .await;
        assert_eq!(SEEN.lock().as_deref(), Some("one two"));
    }

    #[tokio::test]
    async fn whitespace_between_prefix_and_token_is_plain_text() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);
        async fn ping(_text: MessageText) {
            CALLS.fetch_add(1, Ordering::SeqCst);
        }

        let client = Arc::new(RecordingClient::new());
        let mut d = dispatcher(client, true);
        d.register_command(Command::new("ping").handler(ping));

        d.dispatch(EventKind::TextMessage, text_message("! ping")).await;

        assert_eq!(CALLS.load(Ordering::SeqCst), 0);
        // It went down the ordinary text path instead.
        assert_eq!(d.reply_wait().len(), 1);
    }

    #[tokio::test]
    async fn aliases_route_to_the_canonical_command() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);
        async fn roll() {
            CALLS.fetch_add(1, Ordering::SeqCst);
        }

        let client = Arc::new(RecordingClient::new());
        let mut d = dispatcher(client, false);
        d.register_command(Command::new("roll").aliases(["r"]).handler(roll));

        d.dispatch(EventKind::TextMessage, text_message("!r")).await;
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn second_invocation_inside_the_cooldown_gets_a_reply() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);
        async fn slow() {
            CALLS.fetch_add(1, Ordering::SeqCst);
        }

        let client = Arc::new(RecordingClient::new());
        let mut d = dispatcher(Arc::clone(&client), false);
        d.register_command(Command::new("slow").cooldown(30).handler(slow));

        d.dispatch(EventKind::TextMessage, text_message("!slow")).await;
        d.dispatch(EventKind::TextMessage, text_message("!slow")).await;

        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
        let requests = client.requests.lock();
        let body = requests.last().unwrap().2.as_ref().unwrap();
        let content = body["content"].as_str().unwrap();
        assert!(content.starts_with("You are on cooldown for"));
        assert!(content.ends_with("seconds."));
    }

    #[tokio::test]
    async fn builtin_help_replies_when_no_help_command_exists() {
        async fn noop() {}

        let client = Arc::new(RecordingClient::new());
        let mut d = dispatcher(Arc::clone(&client), false);
        d.register_command(
            Command::new("ping")
                .description("checks the bot is alive")
                .handler(noop),
        );

        d.dispatch(EventKind::TextMessage, text_message("!help")).await;

        let requests = client.requests.lock();
        let body = requests[0].2.as_ref().unwrap();
        let content = body["content"].as_str().unwrap();
        assert!(content.contains("[COMMANDS]"));
        assert!(content.contains("!ping - checks the bot is alive"));
    }

    #[tokio::test]
    async fn registered_help_command_shadows_the_builtin() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);
        async fn help() {
            CALLS.fetch_add(1, Ordering::SeqCst);
        }

        let client = Arc::new(RecordingClient::new());
        let mut d = dispatcher(Arc::clone(&client), false);
        d.register_command(Command::new("help").handler(help));

        d.dispatch(EventKind::TextMessage, text_message("!help")).await;

        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
        assert!(client.requests.lock().is_empty());
    }

    #[tokio::test]
    async fn noncommand_text_feeds_the_reply_wait_cache() {
        async fn noop() {}

        let client = Arc::new(RecordingClient::new());
        let mut d = dispatcher(client, true);
        d.register_command(Command::new("ping").handler(noop));

        d.dispatch(EventKind::TextMessage, text_message("just chatting"))
            .await;
        assert_eq!(d.reply_wait().len(), 1);

        d.dispatch(EventKind::TextMessage, text_message("!ping")).await;
        // Command invocations never land in the cache.
        assert_eq!(d.reply_wait().len(), 1);
    }

    #[tokio::test]
    async fn nothing_is_recorded_with_intents_off() {
        let client = Arc::new(RecordingClient::new());
        let d = dispatcher(client, false);

        d.dispatch(EventKind::TextMessage, text_message("just chatting"))
            .await;
        assert!(d.reply_wait().is_empty());
    }

    #[tokio::test]
    async fn handler_errors_reach_the_error_hook() {
        static LAST_ERROR: Mutex<Option<Value>> = Mutex::new(None);
        async fn failing(_ctx: Arc<Context>) -> Result<(), FrameworkError> {
            Err(FrameworkError::Handler("boom".into()))
        }

        let client = Arc::new(RecordingClient::new());
        let mut d = dispatcher(client, false);
        d.register_command(Command::new("bad").handler(failing));
        d.register_raw(EventKind::Error, |value| async move {
            *LAST_ERROR.lock() = Some(value);
        });

        d.dispatch(EventKind::TextMessage, text_message("!bad")).await;

        let payload = LAST_ERROR.lock().clone().unwrap();
        assert_eq!(payload["event"], "text_message");
        assert!(payload["error"].as_str().unwrap().contains("boom"));
    }

    #[tokio::test]
    async fn notification_events_build_a_chat_scoped_context() {
        static SEEN_CHAT: Mutex<Option<String>> = Mutex::new(None);
        async fn on_join(ctx: Arc<Context>) {
            *SEEN_CHAT.lock() = Some(ctx.chat_id().to_string());
        }

        let client = Arc::new(RecordingClient::new());
        let mut d = dispatcher(client, false);
        d.register(EventKind::MemberJoin, on_join);

        d.dispatch(
            EventKind::MemberJoin,
            EventPayload::Notification(Notification {
                chat_id: "c9".into(),
                com_id: 3,
            }),
        )
        .await;

        assert_eq!(SEEN_CHAT.lock().as_deref(), Some("c9"));
    }

    #[tokio::test]
    async fn raw_kinds_bypass_context_resolution() {
        static SEEN: Mutex<Option<Value>> = Mutex::new(None);

        let client = Arc::new(RecordingClient::new());
        let mut d = dispatcher(client, false);
        d.register_raw(EventKind::UserOnline, |value| async move {
            *SEEN.lock() = Some(value);
        });

        d.dispatch(
            EventKind::UserOnline,
            EventPayload::Presence(OnlineMembers {
                users_online: 12,
                com_id: 3,
            }),
        )
        .await;

        let value = SEEN.lock().clone().unwrap();
        assert_eq!(value["usersOnline"], 12);
    }

    #[tokio::test]
    async fn events_without_handlers_are_a_quiet_noop() {
        let client = Arc::new(RecordingClient::new());
        let d = dispatcher(Arc::clone(&client), false);

        d.dispatch(EventKind::TextMessage, text_message("hello")).await;
        d.dispatch(
            EventKind::MemberLeave,
            EventPayload::Notification(Notification::default()),
        )
        .await;
        assert!(client.requests.lock().is_empty());
    }
}
