//! Sanity checks applied to a fully-assembled [`Config`].

use super::Config;
use crate::core::error::{AppError, Result};
use url::Url;

/// Rejects configurations that cannot produce a meaningful run.
pub(crate) fn validate(config: &Config) -> Result<()> {
    if config.max_workers == 0 {
        return Err(AppError::Config(
            "max_workers must be at least 1".to_string(),
        ));
    }
    if config.batch_size == 0 {
        return Err(AppError::Config(
            "batch_size must be at least 1".to_string(),
        ));
    }
    if config.smtp_ports.is_empty() {
        return Err(AppError::Config(
            "smtp_ports must list at least one port".to_string(),
        ));
    }
    if config.proxy_rotation_threshold == 0 {
        return Err(AppError::Config(
            "proxy rotation_threshold must be at least 1".to_string(),
        ));
    }
    if !config.smtp_sender_email.contains('@') {
        return Err(AppError::Config(format!(
            "smtp_sender_email '{}' is not an email address",
            config.smtp_sender_email
        )));
    }
    if let Some(recipient) = &config.test_recipient {
        if !recipient.contains('@') {
            return Err(AppError::Config(format!(
                "test_recipient '{}' is not an email address",
                recipient
            )));
        }
    }
    if config.spam_medium_threshold >= config.spam_high_threshold {
        return Err(AppError::Config(format!(
            "spam_medium_threshold ({}) must be below spam_high_threshold ({})",
            config.spam_medium_threshold, config.spam_high_threshold
        )));
    }
    for proxy in &config.proxies {
        Url::parse(proxy).map_err(|e| {
            AppError::Config(format!("invalid proxy address '{}': {}", proxy, e))
        })?;
    }
    for endpoint in &config.geo_api_endpoints {
        if !endpoint.contains("{ip}") {
            return Err(AppError::Config(format!(
                "geo API endpoint '{}' is missing the {{ip}} placeholder",
                endpoint
            )));
        }
    }
    Ok(())
}
