//! Infrastructure layer for Parley.
//!
//! Contains implementations of the storage and provider traits defined in
//! `parley-core`: the SQLite document store, the filesystem JSON store, the
//! filesystem blob store, the OpenAI-compatible completion client, the
//! webhook notifier, and the TOML config loader.

pub mod blob;
pub mod config;
pub mod filesystem;
pub mod llm;
pub mod notify;
pub mod sqlite;
