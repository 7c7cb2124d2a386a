//! Core domain + application logic for the moderation bot.
//!
//! This crate is intentionally framework-agnostic. The chat platform lives
//! behind the `ModerationPort` trait, implemented in adapter crates.

pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod logging;
pub mod moderation;
pub mod ports;
pub mod security;
pub mod store;

pub use errors::{Error, Result};
