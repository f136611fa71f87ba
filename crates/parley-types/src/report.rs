//! Bug-report types for Parley.
//!
//! A submission carries a description plus raw attachment bytes; the
//! committed [`BugReport`] record references attachments by blob key only.
//! Actual bytes live in the blob store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chat::timestamp;

/// One attachment as received from the caller, bytes included.
#[derive(Debug, Clone)]
pub struct AttachmentUpload {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Opaque handle to a stored blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobRef {
    pub key: String,
}

/// Tags recorded alongside blob bytes at upload time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobMetadata {
    pub report_id: String,
    pub filename: String,
    pub content_type: String,
    pub size_bytes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitter: Option<String>,
}

/// Reference to one committed attachment within a report record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
    pub blob_key: String,
    pub filename: String,
    pub content_type: String,
    pub size_bytes: u64,
}

/// A bug-report submission before any storage write.
#[derive(Debug, Clone, Default)]
pub struct ReportSubmission {
    pub description: String,
    pub contact: Option<String>,
    pub submitter: Option<String>,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
    pub attachments: Vec<AttachmentUpload>,
}

/// The single durable metadata record committed per report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BugReport {
    pub report_id: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(with = "timestamp")]
    pub submitted_at: DateTime<Utc>,
    pub attachments: Vec<AttachmentRef>,
    pub total_bytes: u64,
}

/// What the caller gets back after a successful submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportReceipt {
    pub report_id: String,
    pub attachment_count: usize,
    /// Outcome of the best-effort post-commit notification.
    pub email_sent: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::utc_now;

    #[test]
    fn test_receipt_serializes_camel_case() {
        let receipt = ReportReceipt {
            report_id: "abc123".to_string(),
            attachment_count: 2,
            email_sent: false,
        };
        let json = serde_json::to_string(&receipt).unwrap();
        assert!(json.contains("\"emailSent\":false"));
        assert!(json.contains("\"reportId\":\"abc123\""));
    }

    #[test]
    fn test_bug_report_roundtrip() {
        let report = BugReport {
            report_id: "r1".to_string(),
            description: "crash on save".to_string(),
            contact: Some("user@example.com".to_string()),
            submitter: None,
            client_ip: Some("203.0.113.9".to_string()),
            user_agent: None,
            submitted_at: utc_now(),
            attachments: vec![AttachmentRef {
                blob_key: "r1/0_log.txt".to_string(),
                filename: "log.txt".to_string(),
                content_type: "text/plain".to_string(),
                size_bytes: 42,
            }],
            total_bytes: 42,
        };
        let json = serde_json::to_string(&report).unwrap();
        let parsed: BugReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
    }
}
