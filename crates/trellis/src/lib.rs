//! # Trellis
//!
//! An event-driven chat bot framework with command routing and reply
//! waiting.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐    ┌────────────┐    ┌─────────────────────────────┐
//! │ Transport │───▶│ Dispatcher │───▶│ command router / event slot │──▶ handlers
//! │ (Client)  │    │            │    │ (own task per event)        │
//! └───────────┘    └────────────┘    └─────────────────────────────┘
//! ```
//!
//! - **trellis-core**: entity models, the event catalog, the [`Client`]
//!   transport contract and outbound payload construction
//! - **trellis-framework**: the dispatcher, command table, parameter
//!   resolver, per-event [`Context`] and the reply-wait cache
//! - **trellis-runtime**: configuration, logging and the [`Bot`] lifecycle
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use trellis::prelude::*;
//!
//! async fn ping(ctx: Arc<Context>) -> FrameworkResult<()> {
//!     ctx.reply("pong").await?;
//!     Ok(())
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = TrellisConfig::load().unwrap();
//!     trellis::runtime::logging::init_from_config(&config.logging);
//!
//!     let client: Arc<dyn Client> = make_client();
//!     let bot = Bot::new(client, &config)
//!         .command(Command::new("ping").description("checks the bot").handler(ping))
//!         .start()
//!         .await;
//!
//!     // feed events from the transport with bot.handle_event(..)
//!     bot.run_until_ctrl_c().await;
//! }
//! ```
//!
//! [`Client`]: trellis_core::Client
//! [`Context`]: trellis_framework::Context
//! [`Bot`]: trellis_runtime::Bot

pub use trellis_core as core;
pub use trellis_framework as framework;
pub use trellis_runtime as runtime;

/// Commonly used types for building bot applications.
pub mod prelude {
    pub use trellis_core::{
        ApiError, ApiResult, Author, Client, EventKind, EventPayload, MediaSource, Member,
        Message, MessageRequest, Method, Notification, OnlineMembers, SentMessage,
    };

    pub use trellis_framework::{
        Command, CommandTable, Context, Dispatcher, FrameworkError, FrameworkResult, FromContext,
        MessageText, ReplyWaitCache, SendOptions, TaskSet, UserId, Username,
    };

    pub use trellis_runtime::{Bot, RunningBot, TrellisConfig};
}
