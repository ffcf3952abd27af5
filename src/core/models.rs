//! Data model for input records, domain reports and validation results.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A single record read from an input file. Immutable once ingested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRecord {
    /// Raw identifier: an email address or a bare domain.
    pub identifier: String,
    /// Optional password; empty string when the line carried none.
    pub secret: String,
    /// Stem of the input file this record came from.
    pub source_tag: String,
}

impl InputRecord {
    pub fn new(
        identifier: impl Into<String>,
        secret: impl Into<String>,
        source_tag: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            secret: secret.into(),
            source_tag: source_tag.into(),
        }
    }
}

/// An identifier parsed once at pipeline entry, so downstream logic can
/// dispatch on an explicit tag instead of re-inspecting the raw string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    /// A full email address split into its local part and domain.
    Email { local: String, domain: String },
    /// A bare domain (no `@` present).
    Domain(String),
}

impl Identifier {
    /// Parses a raw identifier. Presence of `@` selects the email shape,
    /// which must match `email_regex`; otherwise the string must be a
    /// structurally valid domain name.
    pub fn parse(raw: &str, email_regex: &Regex) -> std::result::Result<Self, String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err("empty identifier".to_string());
        }

        if trimmed.contains('@') {
            if !email_regex.is_match(trimmed) {
                return Err(format!("'{}' is not a valid email address", trimmed));
            }
            let (local, domain) = trimmed
                .rsplit_once('@')
                .ok_or_else(|| "missing '@' separator".to_string())?;
            if local.is_empty() || domain.is_empty() {
                return Err(format!("'{}' is not a valid email address", trimmed));
            }
            Ok(Identifier::Email {
                local: local.to_string(),
                domain: domain.to_lowercase(),
            })
        } else if is_valid_domain_name(trimmed) {
            Ok(Identifier::Domain(trimmed.to_lowercase()))
        } else {
            Err(format!("'{}' is not a valid domain name", trimmed))
        }
    }

    /// The domain part, for either variant.
    pub fn domain(&self) -> &str {
        match self {
            Identifier::Email { domain, .. } => domain,
            Identifier::Domain(domain) => domain,
        }
    }

    /// The local part, if this identifier is a full address.
    pub fn local(&self) -> Option<&str> {
        match self {
            Identifier::Email { local, .. } => Some(local),
            Identifier::Domain(_) => None,
        }
    }
}

/// Basic structural validation of a bare domain name.
fn is_valid_domain_name(domain: &str) -> bool {
    if domain.is_empty() || domain.len() > 253 || !domain.contains('.') {
        return false;
    }
    if domain.starts_with('.') || domain.ends_with('.') {
        return false;
    }
    domain.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}

/// Final classification of an input record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationStatus {
    Valid,
    Invalid,
    /// Deliberately excluded (e.g. disposable domain), distinct from malformed.
    Skipped,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStatus::Valid => "VALID",
            ValidationStatus::Invalid => "INVALID",
            ValidationStatus::Skipped => "SKIPPED",
        }
    }
}

/// Spam-trap risk band computed by the scoring heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpamRisk {
    Low,
    Medium,
    High,
    Unknown,
}

impl SpamRisk {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpamRisk::Low => "LOW",
            SpamRisk::Medium => "MEDIUM",
            SpamRisk::High => "HIGH",
            SpamRisk::Unknown => "UNKNOWN",
        }
    }
}

/// Outcome of the optional SMTP authentication test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthOutcome {
    Success,
    Failed,
    Error,
    NotTested,
}

impl AuthOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthOutcome::Success => "SUCCESS",
            AuthOutcome::Failed => "FAILED",
            AuthOutcome::Error => "ERROR",
            AuthOutcome::NotTested => "NOT_TESTED",
        }
    }
}

/// The classified result produced once per input record. Never mutated after
/// the pipeline completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub identifier: String,
    #[serde(default)]
    pub secret: String,
    pub status: ValidationStatus,
    pub country: String,
    /// Composite check score, 0-100.
    pub score: u8,
    pub spam_risk: SpamRisk,
    pub auth_result: AuthOutcome,
    /// Ordered trail of per-check explanations.
    pub details: Vec<String>,
    /// Primary MX host, when DNS resolution got that far.
    pub mx_primary: Option<String>,
}

impl ValidationResult {
    /// A fresh result in its pre-validation state.
    pub fn pending(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            secret: secret.into(),
            status: ValidationStatus::Invalid,
            country: "Unknown".to_string(),
            score: 0,
            spam_risk: SpamRisk::Unknown,
            auth_result: AuthOutcome::NotTested,
            details: Vec::new(),
            mx_primary: None,
        }
    }
}

/// A single MX record entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MxHost {
    pub host: String,
    /// DNS preference value; lower means higher precedence.
    pub priority: u16,
}

/// DNS resolution outcome for one domain. Produced fresh per validation;
/// never cached across records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainReport {
    pub domain: String,
    pub has_mx: bool,
    /// MX hosts sorted ascending by priority; index 0 is the primary.
    pub mx_hosts: Vec<MxHost>,
    pub has_a: bool,
    /// First resolved address, when A/AAAA lookup succeeded.
    pub ip: Option<String>,
}

impl DomainReport {
    /// Builds a report, sorting MX hosts ascending by priority so that
    /// `mx_hosts[0]` is always the preferred exchange.
    pub fn new(domain: impl Into<String>, mut mx_hosts: Vec<MxHost>, ip: Option<String>) -> Self {
        mx_hosts.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.host.cmp(&b.host)));
        Self {
            domain: domain.into(),
            has_mx: !mx_hosts.is_empty(),
            mx_hosts,
            has_a: ip.is_some(),
            ip,
        }
    }

    /// A report with no usable records (lookup failure of any kind).
    pub fn unresolved(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            has_mx: false,
            mx_hosts: Vec::new(),
            has_a: false,
            ip: None,
        }
    }

    /// A domain has deliverable potential if it has MX records or at least
    /// fallback A records. The pipeline additionally requires MX explicitly.
    pub fn is_valid(&self) -> bool {
        self.has_mx || self.has_a
    }

    /// The lowest-priority (preferred) MX host, if any.
    pub fn primary_mx(&self) -> Option<&MxHost> {
        self.mx_hosts.first()
    }
}
