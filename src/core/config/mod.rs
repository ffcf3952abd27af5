//! Defines the core runtime `Config` struct, its defaults, and related utilities.
//! Submodules handle loading, building, and validation.

pub(crate) mod builder;
pub(crate) mod file;
pub(crate) mod loading;
pub(crate) mod validation;

pub use builder::ConfigBuilder;
pub use file::ConfigFile;
pub use loading::load_config_file;

use regex::Regex;
use std::collections::HashSet;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Which classification policy maps check outcomes to a final status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyChoice {
    /// All gates must pass, any failure is an early exit.
    Strict,
    /// Percentage-band classification over the composite score.
    Weighted,
}

impl FromStr for PolicyChoice {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(PolicyChoice::Strict),
            "weighted" => Ok(PolicyChoice::Weighted),
            other => Err(format!(
                "unknown policy '{}', expected 'strict' or 'weighted'",
                other
            )),
        }
    }
}

/// Runtime configuration settings used by the mailvet core logic.
pub struct Config {
    pub request_timeout: Duration,
    pub user_agent: String,

    pub dns_timeout: Duration,
    pub dns_servers: Vec<String>,

    pub smtp_timeout: Duration,
    pub smtp_sender_email: String,
    pub smtp_ports: Vec<u16>,

    pub email_regex: Regex,
    pub disposable_domains: HashSet<String>,
    pub suspicious_domains: HashSet<String>,

    pub max_workers: usize,
    pub batch_size: usize,

    pub proxies: Vec<String>,
    pub proxy_rotation_threshold: u32,

    pub enable_auth_checks: bool,
    pub test_recipient: Option<String>,

    pub classification_policy: PolicyChoice,
    pub spam_high_threshold: u32,
    pub spam_medium_threshold: u32,

    pub geo_api_endpoints: Vec<String>,

    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub progress_file: PathBuf,

    pub loaded_config_path: Option<String>,
}

impl Config {
    fn build_default() -> Self {
        let disposable_domains: HashSet<String> = [
            "mailinator.com",
            "tempmail.com",
            "temp-mail.org",
            "10minutemail.com",
            "guerrillamail.com",
            "guerrillamail.net",
            "throwaway.email",
            "fakeinbox.com",
            "yopmail.com",
            "getnada.com",
            "trashmail.com",
            "sharklasers.com",
            "dispostable.com",
            "maildrop.cc",
            "mintemail.com",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let suspicious_domains: HashSet<String> = [
            "spamtrap.com",
            "spamgourmet.com",
            "honeypot.net",
            "spamcop.net",
            "abuse.net",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let email_regex_pattern = r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$";
        let email_regex = Regex::new(email_regex_pattern)
            .expect("Default email regex pattern failed to compile. This is a bug.");

        let dns_servers = vec![
            "8.8.8.8".to_string(),
            "8.8.4.4".to_string(),
            "1.1.1.1".to_string(),
            "1.0.0.1".to_string(),
        ];

        let geo_api_endpoints = vec![
            "http://ip-api.com/json/{ip}".to_string(),
            "https://ipapi.co/{ip}/json/".to_string(),
            "https://ipwhois.app/json/{ip}".to_string(),
        ];

        Config {
            request_timeout: Duration::from_secs(10),
            user_agent: format!("mailvet/{}", env!("CARGO_PKG_VERSION")),
            dns_timeout: Duration::from_secs(5),
            dns_servers,
            smtp_timeout: Duration::from_secs(3),
            smtp_sender_email: "verify-probe@example.com".to_string(),
            smtp_ports: vec![587, 25, 465, 2525],
            email_regex,
            disposable_domains,
            suspicious_domains,
            max_workers: 5,
            batch_size: 10,
            proxies: Vec::new(),
            proxy_rotation_threshold: 5,
            enable_auth_checks: false,
            test_recipient: None,
            classification_policy: PolicyChoice::Strict,
            spam_high_threshold: 50,
            spam_medium_threshold: 25,
            geo_api_endpoints,
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("results"),
            progress_file: PathBuf::from("validation_progress.json"),
            loaded_config_path: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::build_default()
    }
}

impl Clone for Config {
    fn clone(&self) -> Self {
        Self {
            request_timeout: self.request_timeout,
            user_agent: self.user_agent.clone(),
            dns_timeout: self.dns_timeout,
            dns_servers: self.dns_servers.clone(),
            smtp_timeout: self.smtp_timeout,
            smtp_sender_email: self.smtp_sender_email.clone(),
            smtp_ports: self.smtp_ports.clone(),
            email_regex: self.email_regex.clone(),
            disposable_domains: self.disposable_domains.clone(),
            suspicious_domains: self.suspicious_domains.clone(),
            max_workers: self.max_workers,
            batch_size: self.batch_size,
            proxies: self.proxies.clone(),
            proxy_rotation_threshold: self.proxy_rotation_threshold,
            enable_auth_checks: self.enable_auth_checks,
            test_recipient: self.test_recipient.clone(),
            classification_policy: self.classification_policy,
            spam_high_threshold: self.spam_high_threshold,
            spam_medium_threshold: self.spam_medium_threshold,
            geo_api_endpoints: self.geo_api_endpoints.clone(),
            input_dir: self.input_dir.clone(),
            output_dir: self.output_dir.clone(),
            progress_file: self.progress_file.clone(),
            loaded_config_path: self.loaded_config_path.clone(),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("request_timeout", &self.request_timeout)
            .field("user_agent", &self.user_agent)
            .field("dns_timeout", &self.dns_timeout)
            .field("dns_servers_count", &self.dns_servers.len())
            .field("smtp_timeout", &self.smtp_timeout)
            .field("smtp_sender_email", &self.smtp_sender_email)
            .field("smtp_ports", &self.smtp_ports)
            .field("email_regex", &self.email_regex.as_str())
            .field("disposable_domains_count", &self.disposable_domains.len())
            .field("suspicious_domains_count", &self.suspicious_domains.len())
            .field("max_workers", &self.max_workers)
            .field("batch_size", &self.batch_size)
            .field("proxies_count", &self.proxies.len())
            .field("proxy_rotation_threshold", &self.proxy_rotation_threshold)
            .field("enable_auth_checks", &self.enable_auth_checks)
            .field("test_recipient", &self.test_recipient)
            .field("classification_policy", &self.classification_policy)
            .field("spam_high_threshold", &self.spam_high_threshold)
            .field("spam_medium_threshold", &self.spam_medium_threshold)
            .field("geo_api_endpoints_count", &self.geo_api_endpoints.len())
            .field("input_dir", &self.input_dir)
            .field("output_dir", &self.output_dir)
            .field("progress_file", &self.progress_file)
            .field("loaded_config_path", &self.loaded_config_path)
            .finish()
    }
}
