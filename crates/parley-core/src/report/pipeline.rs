//! Bug-report submission pipeline.
//!
//! Order of operations: validate limits, upload every attachment blob,
//! commit one metadata record, then notify. Any failure before the metadata
//! commit deletes exactly the blobs that were uploaded for this report, so
//! a failed submission leaves nothing behind.

use tracing::{info, warn};
use uuid::Uuid;

use parley_types::chat::utc_now;
use parley_types::config::ReportLimits;
use parley_types::error::ReportError;
use parley_types::report::{
    AttachmentRef, BlobMetadata, BlobRef, BugReport, ReportReceipt, ReportSubmission,
};

use super::stores::{BlobStore, Notifier, NoopNotifier, ReportStore};

/// Generate an opaque report id (32-char UUIDv7 hex).
pub fn generate_report_id() -> String {
    Uuid::now_v7().simple().to_string()
}

/// Sequences blob uploads, the metadata commit, and best-effort notification.
pub struct ReportPipeline<B, M, N> {
    blobs: B,
    reports: M,
    notifier: Option<N>,
    limits: ReportLimits,
}

impl<B: BlobStore, M: ReportStore> ReportPipeline<B, M, NoopNotifier> {
    /// Pipeline without a notification channel; receipts carry
    /// `email_sent: false`.
    pub fn new(blobs: B, reports: M, limits: ReportLimits) -> Self {
        Self {
            blobs,
            reports,
            notifier: None,
            limits,
        }
    }
}

impl<B: BlobStore, M: ReportStore, N: Notifier> ReportPipeline<B, M, N> {
    /// Attach a notification channel.
    pub fn with_notifier<N2: Notifier>(self, notifier: N2) -> ReportPipeline<B, M, N2> {
        ReportPipeline {
            blobs: self.blobs,
            reports: self.reports,
            notifier: Some(notifier),
            limits: self.limits,
        }
    }

    /// Access the metadata store.
    pub fn reports(&self) -> &M {
        &self.reports
    }

    /// Submit a bug report.
    ///
    /// All limit violations fail before any storage write. After the
    /// metadata record is committed the submission cannot fail anymore;
    /// notification problems only flip `email_sent` in the receipt.
    #[tracing::instrument(
        name = "submit_report",
        skip(self, submission),
        fields(attachments = submission.attachments.len())
    )]
    pub async fn submit(&self, submission: ReportSubmission) -> Result<ReportReceipt, ReportError> {
        let description = submission.description.trim();
        if description.is_empty() {
            return Err(ReportError::Validation(
                "description is required".to_string(),
            ));
        }
        if submission.attachments.len() > self.limits.max_attachments {
            return Err(ReportError::Validation(format!(
                "too many attachments: {} > {}",
                submission.attachments.len(),
                self.limits.max_attachments
            )));
        }
        let mut total_bytes = 0u64;
        for upload in &submission.attachments {
            let size = upload.data.len() as u64;
            if size > self.limits.max_attachment_bytes {
                return Err(ReportError::Validation(format!(
                    "attachment '{}' is {} bytes, limit is {}",
                    upload.filename, size, self.limits.max_attachment_bytes
                )));
            }
            total_bytes += size;
        }
        if total_bytes > self.limits.max_total_bytes {
            return Err(ReportError::Validation(format!(
                "attachments total {} bytes, limit is {}",
                total_bytes, self.limits.max_total_bytes
            )));
        }

        let report_id = generate_report_id();
        let mut uploaded: Vec<BlobRef> = Vec::with_capacity(submission.attachments.len());
        let mut attachments: Vec<AttachmentRef> = Vec::with_capacity(submission.attachments.len());

        for upload in &submission.attachments {
            let metadata = BlobMetadata {
                report_id: report_id.clone(),
                filename: upload.filename.clone(),
                content_type: upload.content_type.clone(),
                size_bytes: upload.data.len() as u64,
                submitter: submission.submitter.clone(),
            };
            match self.blobs.put(&upload.data, &metadata).await {
                Ok(blob) => {
                    attachments.push(AttachmentRef {
                        blob_key: blob.key.clone(),
                        filename: upload.filename.clone(),
                        content_type: upload.content_type.clone(),
                        size_bytes: upload.data.len() as u64,
                    });
                    uploaded.push(blob);
                }
                Err(err) => {
                    warn!(
                        report_id = %report_id,
                        filename = %upload.filename,
                        error = %err,
                        "attachment upload failed, rolling back"
                    );
                    self.rollback(&report_id, &uploaded).await;
                    return Err(err);
                }
            }
        }

        let report = BugReport {
            report_id: report_id.clone(),
            description: description.to_string(),
            contact: submission.contact,
            submitter: submission.submitter,
            client_ip: submission.client_ip,
            user_agent: submission.user_agent,
            submitted_at: utc_now(),
            attachments,
            total_bytes,
        };
        if let Err(err) = self.reports.insert(&report).await {
            warn!(
                report_id = %report_id,
                error = %err,
                "metadata write failed, rolling back blobs"
            );
            self.rollback(&report_id, &uploaded).await;
            return Err(err);
        }

        let email_sent = match &self.notifier {
            Some(notifier) => match notifier.notify(&report).await {
                Ok(()) => true,
                Err(err) => {
                    warn!(
                        report_id = %report_id,
                        error = %err,
                        "notification failed; report is already recorded"
                    );
                    false
                }
            },
            None => false,
        };

        info!(report_id = %report_id, email_sent, "bug report recorded");
        Ok(ReportReceipt {
            report_id,
            attachment_count: report.attachments.len(),
            email_sent,
        })
    }

    /// Delete every blob uploaded for this report so far. Individual delete
    /// failures are logged with enough context for manual remediation.
    async fn rollback(&self, report_id: &str, uploaded: &[BlobRef]) {
        for blob in uploaded {
            if let Err(err) = self.blobs.delete(blob).await {
                warn!(
                    report_id = %report_id,
                    blob_key = %blob.key,
                    error = %err,
                    "rollback delete failed"
                );
            }
        }
    }
}
