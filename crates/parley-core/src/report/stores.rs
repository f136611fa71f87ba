//! Ports consumed by the bug-report pipeline.
//!
//! Implementations live in parley-infra (`FsBlobStore`, `SqliteReportStore`,
//! `WebhookNotifier`). Uses native async fn in traits (RPITIT).

use parley_types::error::{NotifyError, ReportError};
use parley_types::report::{BlobMetadata, BlobRef, BugReport};

/// Binary attachment storage.
pub trait BlobStore: Send + Sync {
    /// Store one attachment's bytes, tagged with its report metadata.
    fn put(
        &self,
        data: &[u8],
        metadata: &BlobMetadata,
    ) -> impl std::future::Future<Output = Result<BlobRef, ReportError>> + Send;

    /// Remove a stored blob. Used by compensating rollback.
    fn delete(
        &self,
        blob: &BlobRef,
    ) -> impl std::future::Future<Output = Result<(), ReportError>> + Send;
}

/// Durable bug-report metadata storage.
pub trait ReportStore: Send + Sync {
    /// Commit the single metadata record for a report.
    fn insert(
        &self,
        report: &BugReport,
    ) -> impl std::future::Future<Output = Result<(), ReportError>> + Send;

    /// Fetch a committed report. Fails with [`ReportError::NotFound`] if absent.
    fn get(
        &self,
        report_id: &str,
    ) -> impl std::future::Future<Output = Result<BugReport, ReportError>> + Send;
}

/// Best-effort post-commit notification channel.
///
/// A notifier failure is logged and reflected in the receipt; it never
/// fails a submission.
pub trait Notifier: Send + Sync {
    fn notify(
        &self,
        report: &BugReport,
    ) -> impl std::future::Future<Output = Result<(), NotifyError>> + Send;
}

/// Type filler for pipelines constructed without a notifier. Never invoked.
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    async fn notify(&self, _report: &BugReport) -> Result<(), NotifyError> {
        Ok(())
    }
}
