use thiserror::Error;

/// Errors from conversation storage backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("conversation not found")]
    NotFound,

    #[error("conversation id '{0}' already exists")]
    AlreadyExists(String),

    #[error("invalid conversation id: {0}")]
    InvalidId(String),

    #[error("storage backend error: {0}")]
    Backend(String),

    /// A load immediately following a successful save found nothing.
    /// Surfaced, never swallowed.
    #[error("conversation '{0}' missing immediately after save")]
    Inconsistent(String),
}

/// Errors from the external completion provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    Transport(String),

    #[error("provider returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("provider authentication failed")]
    AuthenticationFailed,

    #[error("malformed provider response: {0}")]
    Deserialization(String),
}

/// Errors from a chat turn.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("completion provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("message content is required")]
    EmptyMessage,
}

/// Errors from the sharing/claim workflow.
#[derive(Debug, Error)]
pub enum ShareError {
    /// The source conversation is absent or has no owner.
    #[error("conversation not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors from bug-report submission.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("invalid report: {0}")]
    Validation(String),

    #[error("attachment upload failed: {0}")]
    Blob(String),

    #[error("report metadata write failed: {0}")]
    Metadata(String),

    #[error("report not found")]
    NotFound,
}

/// Errors from the best-effort notifier. Never propagated past the pipeline.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::AlreadyExists("alice_travel".to_string());
        assert_eq!(
            err.to_string(),
            "conversation id 'alice_travel' already exists"
        );
    }

    #[test]
    fn test_chat_error_wraps_store_transparently() {
        let err = ChatError::from(StoreError::NotFound);
        assert_eq!(err.to_string(), "conversation not found");
    }

    #[test]
    fn test_provider_error_display() {
        let err = ProviderError::Api {
            status: 503,
            message: "overloaded".to_string(),
        };
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("overloaded"));
    }

    #[test]
    fn test_report_error_display() {
        let err = ReportError::Validation("too many attachments: 6 > 5".to_string());
        assert!(err.to_string().contains("6 > 5"));
    }
}
