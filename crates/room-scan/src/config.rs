use std::env;

use validator::{Validate, ValidateEmail, ValidationError};

use crate::scan_types::ScanError;
use crate::ur_client::UR_MAP_MARKER_URL;

/// Recipients, as a JSON array of addresses
pub const RECIPIENTS_VAR: &str = "UR_PROPERTY_MONITOR_NOTIFICATIONS_EMAIL_LIST";
/// Sender address
pub const SENDER_VAR: &str = "UR_PROPERTY_MONITOR_NOTIFICATIONS_SENDER_EMAIL";
/// Bucket holding the cached snapshot
pub const CACHE_BUCKET_VAR: &str = "CACHE_BUCKET";
/// Object key of the cached snapshot
pub const CACHE_KEY_VAR: &str = "CACHE_KEY";
/// Enables debug logging when set to `true`
pub const DEBUG_VAR: &str = "UR_PROPERTY_MONITOR_DEBUG";
/// AWS region for S3 and SES
pub const AWS_REGION_VAR: &str = "AWS_REGION";
/// Overrides the UR endpoint
pub const API_URL_VAR: &str = "UR_API_URL";

/// Default object key of the cached snapshot.
pub const DEFAULT_CACHE_KEY: &str = "cache.json";

/// Everything a run needs to know, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct MonitorConfig {
    /// Addresses that receive the notification
    #[validate(
        length(min = 1, message = "at least one recipient is required"),
        custom(function = "validate_recipients")
    )]
    pub recipients: Vec<String>,

    /// Address the notification is sent from
    #[validate(email(message = "sender must be an email address"))]
    pub sender: String,

    /// Bucket holding the cached snapshot
    #[validate(length(min = 1, message = "cache bucket is required"))]
    pub cache_bucket: String,

    /// Object key of the cached snapshot
    #[validate(length(min = 1, message = "cache key must not be empty"))]
    pub cache_key: String,

    /// Whether per-listing debug logging is enabled
    pub debug: bool,

    /// AWS region override; the AWS default chain is used when absent
    pub aws_region: Option<String>,

    /// UR map marker endpoint
    #[validate(custom(function = "validate_http_url"))]
    pub api_url: String,
}

fn validate_recipients(recipients: &Vec<String>) -> Result<(), ValidationError> {
    if recipients.iter().all(|recipient| recipient.validate_email()) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_recipient"))
    }
}

fn validate_http_url(url: &str) -> Result<(), ValidationError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_api_url"))
    }
}

fn parse_flag(value: Option<String>) -> bool {
    value
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1"))
        .unwrap_or(false)
}

impl MonitorConfig {
    /// Loads the configuration from environment variables.
    pub fn from_env() -> Result<Self, ScanError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads the configuration through `lookup`, which maps a variable name
    /// to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ScanError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| {
                    ScanError::ConfigError(format!("{} environment variable not set", name))
                })
        };

        let recipients_json = required(RECIPIENTS_VAR)?;
        let recipients: Vec<String> = serde_json::from_str(&recipients_json).map_err(|e| {
            ScanError::ConfigError(format!("{} must be a JSON array of addresses: {}", RECIPIENTS_VAR, e))
        })?;

        let config = Self {
            recipients,
            sender: required(SENDER_VAR)?,
            cache_bucket: required(CACHE_BUCKET_VAR)?,
            cache_key: lookup(CACHE_KEY_VAR)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CACHE_KEY.to_string()),
            debug: parse_flag(lookup(DEBUG_VAR)),
            aws_region: lookup(AWS_REGION_VAR).filter(|value| !value.trim().is_empty()),
            api_url: lookup(API_URL_VAR)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| UR_MAP_MARKER_URL.to_string()),
        };

        config
            .validate()
            .map_err(|e| ScanError::ConfigError(e.to_string()))?;

        Ok(config)
    }
}
