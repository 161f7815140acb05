//! # Trellis Runtime
//!
//! Orchestration layer: configuration loading, logging setup and the
//! [`Bot`] lifecycle around the dispatch machinery in
//! [`trellis_framework`].

pub mod bot;
pub mod config;
pub mod logging;

pub use bot::{Bot, RunningBot};
pub use config::{BotSection, ConfigError, ConfigResult, LoggingSection, TrellisConfig};
