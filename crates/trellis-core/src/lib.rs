//! # Trellis Core
//!
//! Foundation layer for the Trellis bot framework.
//!
//! This crate defines everything the dispatch layer consumes but does not
//! own: the platform entity models, the normalized event catalog, the
//! [`Client`] transport contract, outbound request-body construction, and
//! the shared error taxonomy.
//!
//! The HTTP session itself (authentication, retries, request signing) is an
//! external collaborator - it lives behind the [`Client`] trait and is
//! injected into the framework at startup.

pub mod client;
pub mod entities;
pub mod error;
pub mod event;
pub mod media;
pub mod payload;

pub use client::{Client, Method, community_scope};
pub use entities::{ApiResponse, Author, Member, Message, Notification, OnlineMembers, SentMessage};
pub use error::{ApiError, ApiResult};
pub use event::{EventKind, EventPayload};
pub use media::MediaSource;
pub use payload::MessageRequest;
