//! Completion provider abstraction.

pub mod client;

pub use client::CompletionClient;
