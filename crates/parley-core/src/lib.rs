//! Business logic and storage trait definitions for Parley.
//!
//! This crate defines the "ports" (storage and provider traits) that the
//! infrastructure layer implements. It depends only on `parley-types` --
//! never on `parley-infra` or any database/IO crate.

pub mod chat;
pub mod llm;
pub mod report;
pub mod share;
pub mod store;
