//! # Trellis Framework
//!
//! Event dispatch and command routing on top of [`trellis_core`].
//!
//! The layering mirrors how an event travels through the system: a
//! transport feeds `(EventKind, EventPayload)` pairs into the
//! [`Dispatcher`], which either runs the command router (for text
//! messages), hands a raw payload to a raw slot, or builds a per-event
//! [`Context`] and invokes the registered handler through the parameter
//! resolver.

pub mod commands;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod extractor;
pub mod handler;
pub mod reply_wait;
pub mod task;

pub use commands::{Command, CommandBuilder, CommandTable};
pub use context::{Context, SendOptions};
pub use dispatcher::{Dispatcher, RawHandler};
pub use error::{FrameworkError, FrameworkResult};
pub use extractor::{FromContext, MessageText, UserId, Username};
pub use handler::{BoxFuture, BoxedHandler, Handler, IntoHandlerOutcome, into_handler};
pub use reply_wait::{REPLY_TTL, ReplyWaitCache};
pub use task::TaskSet;
