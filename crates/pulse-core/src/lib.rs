//! Core types, configuration, and error handling for issuepulse.
//!
//! This crate provides the shared foundation used by all other crates:
//! - [`PulseError`]: unified error type using `thiserror`
//! - [`PulseConfig`]: configuration loaded from `.issuepulse.toml`
//! - Shared types: [`Item`], [`ItemKind`], [`Sentiment`], [`SentimentTally`],
//!   [`AnalyzedItem`], [`ReplyStatus`]

mod config;
mod error;
mod types;

pub use config::{GitHubConfig, LlmConfig, PulseConfig, ReviewConfig};
pub use error::PulseError;
pub use types::{AnalyzedItem, Item, ItemKind, ReplyStatus, Sentiment, SentimentTally, User};

/// A convenience `Result` type for issuepulse operations.
pub type Result<T> = std::result::Result<T, PulseError>;
