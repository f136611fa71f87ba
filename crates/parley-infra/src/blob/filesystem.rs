//! Filesystem blob store for bug-report attachments.
//!
//! Attachment bytes live under `{root}/{report_id}/{uuid}_{filename}`; the
//! upload tags (report id, submitter, content type, size) are written to a
//! `.meta.json` sidecar next to each blob.

use std::path::PathBuf;

use uuid::Uuid;

use parley_core::report::stores::BlobStore;
use parley_types::error::ReportError;
use parley_types::report::{BlobMetadata, BlobRef};

/// Filesystem-backed implementation of `BlobStore`.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Open a blob store rooted at `root`, creating the directory if needed.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, ReportError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| ReportError::Blob(format!("create blob root: {e}")))?;
        Ok(Self { root })
    }

    fn data_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    fn meta_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.meta.json"))
    }

    /// Keep filenames directory-safe: anything outside alphanumerics and
    /// `-_.` becomes `_`.
    fn sanitize_filename(filename: &str) -> String {
        filename
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }
}

impl BlobStore for FsBlobStore {
    async fn put(&self, data: &[u8], metadata: &BlobMetadata) -> Result<BlobRef, ReportError> {
        let dir = self.root.join(&metadata.report_id);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| ReportError::Blob(format!("create report dir: {e}")))?;

        let key = format!(
            "{}/{}_{}",
            metadata.report_id,
            Uuid::now_v7().simple(),
            Self::sanitize_filename(&metadata.filename)
        );
        tokio::fs::write(self.data_path(&key), data)
            .await
            .map_err(|e| ReportError::Blob(format!("write blob: {e}")))?;

        let tags = serde_json::to_vec_pretty(metadata)
            .map_err(|e| ReportError::Blob(format!("serialize blob tags: {e}")))?;
        tokio::fs::write(self.meta_path(&key), tags)
            .await
            .map_err(|e| ReportError::Blob(format!("write blob tags: {e}")))?;

        Ok(BlobRef { key })
    }

    async fn delete(&self, blob: &BlobRef) -> Result<(), ReportError> {
        tokio::fs::remove_file(self.data_path(&blob.key))
            .await
            .map_err(|e| ReportError::Blob(format!("delete blob '{}': {e}", blob.key)))?;
        // The sidecar is best-effort cleanup.
        let _ = tokio::fs::remove_file(self.meta_path(&blob.key)).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(report_id: &str, filename: &str, size: u64) -> BlobMetadata {
        BlobMetadata {
            report_id: report_id.to_string(),
            filename: filename.to_string(),
            content_type: "text/plain".to_string(),
            size_bytes: size,
            submitter: Some("alice".to_string()),
        }
    }

    #[tokio::test]
    async fn test_put_then_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::open(dir.path().join("blobs")).await.unwrap();

        let blob = store
            .put(b"crash log", &metadata("r1", "crash.log", 9))
            .await
            .unwrap();
        assert!(blob.key.starts_with("r1/"));
        assert!(blob.key.ends_with("_crash.log"));

        let stored = tokio::fs::read(store.data_path(&blob.key)).await.unwrap();
        assert_eq!(stored, b"crash log");
        assert!(tokio::fs::try_exists(store.meta_path(&blob.key))
            .await
            .unwrap());

        store.delete(&blob).await.unwrap();
        assert!(!tokio::fs::try_exists(store.data_path(&blob.key))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_delete_missing_blob_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::open(dir.path().join("blobs")).await.unwrap();
        let err = store
            .delete(&BlobRef {
                key: "r1/nope.log".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::Blob(_)));
    }

    #[tokio::test]
    async fn test_filename_sanitized_in_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::open(dir.path().join("blobs")).await.unwrap();
        let blob = store
            .put(b"x", &metadata("r1", "../evil name.log", 1))
            .await
            .unwrap();
        assert!(blob.key.ends_with("_.._evil_name.log"));
        assert!(!blob.key.contains('/') || blob.key.matches('/').count() == 1);
    }
}
