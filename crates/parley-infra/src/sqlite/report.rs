//! SQLite bug-report metadata store.
//!
//! One row per report; attachment references are stored as a JSON column so
//! the whole report commits as a single record. Attachment bytes live in the
//! blob store.

use sqlx::Row;

use parley_core::report::stores::ReportStore;
use parley_types::chat::timestamp;
use parley_types::error::ReportError;
use parley_types::report::{AttachmentRef, BugReport};

use super::pool::DatabasePool;

/// SQLite-backed implementation of `ReportStore`.
pub struct SqliteReportStore {
    pool: DatabasePool,
}

impl SqliteReportStore {
    /// Create a new report store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Idempotent schema setup. Invoke once before first use.
    pub async fn ensure_indexes(&self) -> Result<(), ReportError> {
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS bug_reports (
                report_id TEXT NOT NULL,
                description TEXT NOT NULL,
                contact TEXT,
                submitter TEXT,
                client_ip TEXT,
                user_agent TEXT,
                submitted_at TEXT NOT NULL,
                attachments TEXT NOT NULL,
                total_bytes INTEGER NOT NULL
            )"#,
        )
        .execute(&self.pool.writer)
        .await
        .map_err(to_metadata)?;

        sqlx::query(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_bug_reports_id ON bug_reports (report_id)",
        )
        .execute(&self.pool.writer)
        .await
        .map_err(to_metadata)?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_bug_reports_submitted
             ON bug_reports (submitted_at DESC)",
        )
        .execute(&self.pool.writer)
        .await
        .map_err(to_metadata)?;

        Ok(())
    }
}

fn to_metadata(err: sqlx::Error) -> ReportError {
    ReportError::Metadata(err.to_string())
}

/// Internal row type for mapping SQLite rows to domain BugReport.
struct ReportRow {
    report_id: String,
    description: String,
    contact: Option<String>,
    submitter: Option<String>,
    client_ip: Option<String>,
    user_agent: Option<String>,
    submitted_at: String,
    attachments: String,
    total_bytes: i64,
}

impl ReportRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            report_id: row.try_get("report_id")?,
            description: row.try_get("description")?,
            contact: row.try_get("contact")?,
            submitter: row.try_get("submitter")?,
            client_ip: row.try_get("client_ip")?,
            user_agent: row.try_get("user_agent")?,
            submitted_at: row.try_get("submitted_at")?,
            attachments: row.try_get("attachments")?,
            total_bytes: row.try_get("total_bytes")?,
        })
    }

    fn into_report(self) -> Result<BugReport, ReportError> {
        let submitted_at = chrono::NaiveDateTime::parse_from_str(&self.submitted_at, timestamp::FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(|e| ReportError::Metadata(format!("invalid submitted_at: {e}")))?;
        let attachments: Vec<AttachmentRef> = serde_json::from_str(&self.attachments)
            .map_err(|e| ReportError::Metadata(format!("corrupt attachment refs: {e}")))?;

        Ok(BugReport {
            report_id: self.report_id,
            description: self.description,
            contact: self.contact,
            submitter: self.submitter,
            client_ip: self.client_ip,
            user_agent: self.user_agent,
            submitted_at,
            attachments,
            total_bytes: self.total_bytes as u64,
        })
    }
}

impl ReportStore for SqliteReportStore {
    async fn insert(&self, report: &BugReport) -> Result<(), ReportError> {
        let attachments = serde_json::to_string(&report.attachments)
            .map_err(|e| ReportError::Metadata(format!("serialize attachment refs: {e}")))?;

        sqlx::query(
            r#"INSERT INTO bug_reports
               (report_id, description, contact, submitter, client_ip, user_agent, submitted_at, attachments, total_bytes)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&report.report_id)
        .bind(&report.description)
        .bind(&report.contact)
        .bind(&report.submitter)
        .bind(&report.client_ip)
        .bind(&report.user_agent)
        .bind(report.submitted_at.format(timestamp::FORMAT).to_string())
        .bind(attachments)
        .bind(report.total_bytes as i64)
        .execute(&self.pool.writer)
        .await
        .map_err(to_metadata)?;

        Ok(())
    }

    async fn get(&self, report_id: &str) -> Result<BugReport, ReportError> {
        let row = sqlx::query("SELECT * FROM bug_reports WHERE report_id = ?")
            .bind(report_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(to_metadata)?;

        match row {
            Some(row) => {
                let report_row = ReportRow::from_row(&row).map_err(to_metadata)?;
                report_row.into_report()
            }
            None => Err(ReportError::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_types::chat::utc_now;

    async fn test_store() -> SqliteReportStore {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        std::mem::forget(dir);
        let pool = DatabasePool::new(&url).await.unwrap();
        let store = SqliteReportStore::new(pool);
        store.ensure_indexes().await.unwrap();
        store
    }

    fn sample_report() -> BugReport {
        BugReport {
            report_id: "r1".to_string(),
            description: "save button crashes".to_string(),
            contact: Some("user@example.com".to_string()),
            submitter: Some("alice".to_string()),
            client_ip: Some("203.0.113.9".to_string()),
            user_agent: Some("parley-cli".to_string()),
            submitted_at: utc_now(),
            attachments: vec![AttachmentRef {
                blob_key: "r1/0_crash.log".to_string(),
                filename: "crash.log".to_string(),
                content_type: "text/plain".to_string(),
                size_bytes: 512,
            }],
            total_bytes: 512,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_roundtrip() {
        let store = test_store().await;
        let report = sample_report();
        store.insert(&report).await.unwrap();

        let loaded = store.get("r1").await.unwrap();
        assert_eq!(loaded, report);
    }

    #[tokio::test]
    async fn test_get_missing_fails() {
        let store = test_store().await;
        let err = store.get("ghost").await.unwrap_err();
        assert!(matches!(err, ReportError::NotFound));
    }

    #[tokio::test]
    async fn test_duplicate_report_id_rejected() {
        let store = test_store().await;
        let report = sample_report();
        store.insert(&report).await.unwrap();
        let err = store.insert(&report).await.unwrap_err();
        assert!(matches!(err, ReportError::Metadata(_)));
    }
}
