//! Filesystem-backed persistence.

pub mod conversation;

pub use conversation::FsConversationStore;
