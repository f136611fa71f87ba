//! Bug-report submission command.

use std::path::{Path, PathBuf};

use anyhow::Context;

use parley_core::report::ReportPipeline;
use parley_infra::blob::FsBlobStore;
use parley_infra::notify::WebhookNotifier;
use parley_infra::sqlite::{DatabasePool, SqliteReportStore};
use parley_types::config::EngineConfig;
use parley_types::report::{AttachmentUpload, ReportReceipt, ReportSubmission};

/// Guess a declared content type from the file extension.
fn detect_content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "txt" | "log" => "text/plain",
        "md" => "text/markdown",
        "json" => "application/json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        _ => "application/octet-stream",
    }
}

async fn read_attachment(path: &PathBuf) -> anyhow::Result<AttachmentUpload> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read attachment '{}'", path.display()))?;
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("attachment")
        .to_string();
    Ok(AttachmentUpload {
        content_type: detect_content_type(path).to_string(),
        filename,
        data,
    })
}

fn print_receipt(receipt: &ReportReceipt) {
    println!(
        "Report {} recorded with {} attachment(s).",
        receipt.report_id, receipt.attachment_count
    );
    if !receipt.email_sent {
        println!("Note: no notification was delivered; the report itself is saved.");
    }
}

pub async fn submit(
    pool: DatabasePool,
    data_dir: &Path,
    config: &EngineConfig,
    description: String,
    contact: Option<String>,
    submitter: Option<String>,
    attachment_paths: Vec<PathBuf>,
) -> anyhow::Result<()> {
    let mut attachments = Vec::with_capacity(attachment_paths.len());
    for path in &attachment_paths {
        attachments.push(read_attachment(path).await?);
    }

    let blobs = FsBlobStore::open(data_dir.join("attachments")).await?;
    let reports = SqliteReportStore::new(pool);
    reports.ensure_indexes().await?;
    let pipeline = ReportPipeline::new(blobs, reports, config.report);

    let submission = ReportSubmission {
        description,
        contact,
        submitter,
        client_ip: None,
        user_agent: Some(format!("parley-cli/{}", env!("CARGO_PKG_VERSION"))),
        attachments,
    };

    let receipt = match &config.notify_url {
        Some(url) => {
            pipeline
                .with_notifier(WebhookNotifier::new(url.clone()))
                .submit(submission)
                .await?
        }
        None => pipeline.submit(submission).await?,
    };
    print_receipt(&receipt);
    Ok(())
}
