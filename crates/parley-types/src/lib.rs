//! Shared domain types for Parley.
//!
//! This crate contains the core domain types used across the Parley engine:
//! Conversation, Message, completion request/response shapes, bug-report
//! records, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod report;
