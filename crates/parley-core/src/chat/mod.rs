//! Chat orchestration: the per-turn engine and conversation auto-titling.

pub mod engine;
pub mod title;

pub use engine::Chatbot;
