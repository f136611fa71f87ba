//! SQLite-backed persistence.

pub mod conversation;
pub mod pool;
pub mod report;

pub use conversation::SqliteConversationStore;
pub use pool::DatabasePool;
pub use report::SqliteReportStore;
