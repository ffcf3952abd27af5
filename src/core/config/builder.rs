//! Fluent builder for assembling a [`Config`] from defaults, an optional
//! TOML file, and programmatic overrides (typically CLI flags).

use super::file::ConfigFile;
use super::validation::validate;
use super::{Config, PolicyChoice};
use crate::core::error::{AppError, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Builds a [`Config`] in layers: defaults, then file values, then overrides.
/// Later layers win.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
    file_error: Option<AppError>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            file_error: None,
        }
    }

    /// Applies a parsed configuration file. Must be called before the
    /// `with_*` overrides so CLI flags take precedence; any error is
    /// surfaced from [`ConfigBuilder::build`].
    pub fn with_config_file(mut self, file: ConfigFile, path: Option<String>) -> Self {
        if let Err(e) = apply_file(&mut self.config, &file) {
            self.file_error = Some(e);
        }
        self.config.loaded_config_path = path;
        self
    }

    pub fn with_max_workers(mut self, workers: Option<usize>) -> Self {
        if let Some(w) = workers {
            self.config.max_workers = w;
        }
        self
    }

    pub fn with_batch_size(mut self, size: Option<usize>) -> Self {
        if let Some(s) = size {
            self.config.batch_size = s;
        }
        self
    }

    pub fn with_smtp_timeout(mut self, secs: Option<u64>) -> Self {
        if let Some(t) = secs {
            self.config.smtp_timeout = Duration::from_secs(t);
        }
        self
    }

    pub fn with_dns_timeout(mut self, secs: Option<u64>) -> Self {
        if let Some(t) = secs {
            self.config.dns_timeout = Duration::from_secs(t);
        }
        self
    }

    pub fn with_proxies(mut self, proxies: Vec<String>) -> Self {
        if !proxies.is_empty() {
            self.config.proxies = proxies;
        }
        self
    }

    pub fn with_proxy_rotation_threshold(mut self, threshold: Option<u32>) -> Self {
        if let Some(t) = threshold {
            self.config.proxy_rotation_threshold = t;
        }
        self
    }

    pub fn with_enable_auth_checks(mut self, enabled: bool) -> Self {
        if enabled {
            self.config.enable_auth_checks = true;
        }
        self
    }

    pub fn with_test_recipient(mut self, recipient: Option<String>) -> Self {
        if recipient.is_some() {
            self.config.test_recipient = recipient;
        }
        self
    }

    pub fn with_policy(mut self, policy: Option<PolicyChoice>) -> Self {
        if let Some(p) = policy {
            self.config.classification_policy = p;
        }
        self
    }

    pub fn with_input_dir(mut self, dir: Option<PathBuf>) -> Self {
        if let Some(d) = dir {
            self.config.input_dir = d;
        }
        self
    }

    pub fn with_output_dir(mut self, dir: Option<PathBuf>) -> Self {
        if let Some(d) = dir {
            self.config.output_dir = d;
        }
        self
    }

    pub fn with_progress_file(mut self, path: Option<PathBuf>) -> Self {
        if let Some(p) = path {
            self.config.progress_file = p;
        }
        self
    }

    /// Validates and yields the final configuration.
    pub fn build(self) -> Result<Config> {
        if let Some(e) = self.file_error {
            return Err(e);
        }
        validate(&self.config)?;
        Ok(self.config)
    }
}

/// Copies every `Some` field of the file mirror into the runtime config.
fn apply_file(config: &mut Config, file: &ConfigFile) -> Result<()> {
    if let Some(t) = file.network.request_timeout {
        config.request_timeout = Duration::from_secs(t);
    }
    if let Some(ua) = &file.network.user_agent {
        config.user_agent = ua.clone();
    }
    if let Some(endpoints) = &file.network.geo_api_endpoints {
        config.geo_api_endpoints = endpoints.clone();
    }

    if let Some(t) = file.dns.dns_timeout {
        config.dns_timeout = Duration::from_secs(t);
    }
    if let Some(servers) = &file.dns.dns_servers {
        config.dns_servers = servers.clone();
    }

    if let Some(t) = file.smtp.smtp_timeout {
        config.smtp_timeout = Duration::from_secs(t);
    }
    if let Some(sender) = &file.smtp.smtp_sender_email {
        config.smtp_sender_email = sender.clone();
    }
    if let Some(ports) = &file.smtp.smtp_ports {
        config.smtp_ports = ports.clone();
    }
    if let Some(recipient) = &file.smtp.test_recipient {
        config.test_recipient = Some(recipient.clone());
    }

    if let Some(w) = file.validation.max_workers {
        config.max_workers = w;
    }
    if let Some(b) = file.validation.batch_size {
        config.batch_size = b;
    }
    if let Some(policy) = &file.validation.classification_policy {
        config.classification_policy = policy
            .parse()
            .map_err(|e: String| AppError::Config(e))?;
    }
    if let Some(domains) = &file.validation.disposable_domains {
        config.disposable_domains = domains.iter().map(|d| d.to_lowercase()).collect();
    }
    if let Some(enabled) = file.validation.enable_auth_checks {
        config.enable_auth_checks = enabled;
    }

    if let Some(proxies) = &file.proxy.proxies {
        config.proxies = proxies.clone();
    }
    if let Some(t) = file.proxy.rotation_threshold {
        config.proxy_rotation_threshold = t;
    }

    if let Some(t) = file.scoring.spam_high_threshold {
        config.spam_high_threshold = t;
    }
    if let Some(t) = file.scoring.spam_medium_threshold {
        config.spam_medium_threshold = t;
    }
    if let Some(domains) = &file.scoring.suspicious_domains {
        config.suspicious_domains = domains.iter().map(|d| d.to_lowercase()).collect();
    }

    Ok(())
}
