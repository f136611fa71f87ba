//! Engine configuration types.
//!
//! Deserialized from `parley.toml` in the data directory; every field has a
//! default so a partial (or absent) file is fine.

use serde::{Deserialize, Serialize};

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_system_prompt() -> String {
    "You are a helpful assistant.".to_string()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_top_p() -> f64 {
    1.0
}

fn default_max_attachments() -> usize {
    5
}

fn default_max_attachment_bytes() -> u64 {
    10 * 1024 * 1024
}

fn default_max_total_bytes() -> u64 {
    25 * 1024 * 1024
}

/// Bug-report attachment limits, enforced before any storage write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportLimits {
    #[serde(default = "default_max_attachments")]
    pub max_attachments: usize,
    #[serde(default = "default_max_attachment_bytes")]
    pub max_attachment_bytes: u64,
    #[serde(default = "default_max_total_bytes")]
    pub max_total_bytes: u64,
}

impl Default for ReportLimits {
    fn default() -> Self {
        Self {
            max_attachments: default_max_attachments(),
            max_attachment_bytes: default_max_attachment_bytes(),
            max_total_bytes: default_max_total_bytes(),
        }
    }
}

/// Engine-wide configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_top_p")]
    pub top_p: f64,
    #[serde(default)]
    pub report: ReportLimits,
    /// Webhook URL for best-effort bug-report notifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify_url: Option<String>,
    /// Override for the completion provider base URL (proxies, self-hosted).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_base_url: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            system_prompt: default_system_prompt(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            report: ReportLimits::default(),
            notify_url: None,
            provider_base_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.top_p, 1.0);
        assert_eq!(config.report.max_attachments, 5);
        assert!(config.notify_url.is_none());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: EngineConfig = toml::from_str(
            r#"
model = "gpt-4o"

[report]
max_attachments = 3
"#,
        )
        .unwrap();
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.system_prompt, "You are a helpful assistant.");
        assert_eq!(config.report.max_attachments, 3);
        assert_eq!(config.report.max_attachment_bytes, 10 * 1024 * 1024);
    }
}
