//! Bug-report attachment pipeline.
//!
//! Blob storage, metadata storage, and notification are separate ports;
//! [`pipeline::ReportPipeline`] sequences them with compensating rollback.

pub mod pipeline;
pub mod stores;

pub use pipeline::{generate_report_id, ReportPipeline};
pub use stores::{BlobStore, Notifier, NoopNotifier, ReportStore};
