//! OpenAI-compatible completion client.
//!
//! Works against the `/chat/completions` endpoint of OpenAI or any
//! compatible server via a configurable base URL.

pub mod client;
pub mod types;

pub use client::OpenAiClient;
