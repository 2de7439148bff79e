//! Filter implementations for the tweet pipeline.

pub mod bot_author;

pub use bot_author::BotAuthorFilter;
