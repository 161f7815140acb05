//! Bot assembly and lifecycle.
//!
//! [`Bot`] is the registration surface: handlers, commands and periodic
//! tasks are attached before startup. [`Bot::start`] freezes the registry,
//! spawns the tasks, fires the ready signal and returns a [`RunningBot`]
//! that feeds inbound events into the dispatcher.

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use trellis_core::{Client, EventKind, EventPayload};
use trellis_framework::commands::Command;
use trellis_framework::dispatcher::Dispatcher;
use trellis_framework::handler::Handler;
use trellis_framework::task::TaskSet;

use crate::config::TrellisConfig;

/// A bot under construction.
pub struct Bot {
    client: Arc<dyn Client>,
    dispatcher: Dispatcher,
    tasks: TaskSet,
}

impl Bot {
    /// Creates a bot over a transport client with the given configuration.
    pub fn new(client: Arc<dyn Client>, config: &TrellisConfig) -> Self {
        let dispatcher = Dispatcher::new(
            Arc::clone(&client),
            config.bot.prefix.clone(),
            config.bot.intents,
        );
        Self {
            client,
            dispatcher,
            tasks: TaskSet::new(),
        }
    }

    /// Registers an event handler.
    pub fn on<F, T>(mut self, kind: EventKind, f: F) -> Self
    where
        F: Handler<T>,
        T: 'static,
    {
        self.dispatcher.register(kind, f);
        self
    }

    /// Registers a raw handler for payload-only event kinds.
    pub fn on_raw<F, Fut>(mut self, kind: EventKind, f: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.dispatcher.register_raw(kind, f);
        self
    }

    /// Registers a command.
    pub fn command(mut self, command: Command) -> Self {
        self.dispatcher.register_command(command);
        self
    }

    /// Registers a periodic task running every `interval_secs` seconds.
    pub fn task<F, Fut>(mut self, interval_secs: u64, f: F) -> Self
    where
        F: Fn(Arc<dyn Client>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.tasks.add(interval_secs, f);
        self
    }

    /// Registers the error hook, invoked with a payload describing any
    /// handler failure.
    pub fn on_error<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.dispatcher.register_raw(EventKind::Error, f);
        self
    }

    /// Starts the bot: spawns periodic tasks and fires the ready signal.
    pub async fn start(self) -> RunningBot {
        let task_handles = self.tasks.spawn_all(Arc::clone(&self.client));
        let dispatcher = Arc::new(self.dispatcher);

        info!(
            prefix = dispatcher.prefix(),
            commands = dispatcher.commands().len(),
            tasks = task_handles.len(),
            "bot started"
        );
        dispatcher
            .emit(
                EventKind::Ready,
                serde_json::json!({ "userId": self.client.user_id() }),
            )
            .await;

        RunningBot {
            dispatcher,
            tasks: self.tasks,
            task_handles,
        }
    }
}

/// A started bot.
pub struct RunningBot {
    dispatcher: Arc<Dispatcher>,
    tasks: TaskSet,
    task_handles: Vec<JoinHandle<()>>,
}

impl RunningBot {
    /// Feeds one inbound event into the dispatcher on its own task, so a
    /// handler blocked in `wait_for_message` never stalls other events.
    pub fn handle_event(&self, kind: EventKind, payload: EventPayload) -> JoinHandle<()> {
        let dispatcher = Arc::clone(&self.dispatcher);
        tokio::spawn(async move {
            dispatcher.dispatch(kind, payload).await;
        })
    }

    /// The shared dispatcher.
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Runs until Ctrl-C, then shuts down.
    pub async fn run_until_ctrl_c(self) {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(%err, "failed to listen for shutdown signal");
        }
        self.shutdown().await;
    }

    /// Stops periodic tasks and waits for them to finish.
    pub async fn shutdown(self) {
        self.tasks.cancel();
        for handle in self.task_handles {
            let _ = handle.await;
        }
        info!("bot stopped");
    }
}
