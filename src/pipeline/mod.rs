//! The per-record validation chain: syntax, disposable-domain exclusion,
//! DNS, MX, SMTP reachability, mailbox probing, geolocation, optional
//! authentication and spam-trap scoring.

pub mod policy;
pub mod spam;

pub use policy::{ClassificationPolicy, GateOutcomes, StrictChain, WeightedScore};

use crate::core::config::Config;
use crate::core::models::{
    AuthOutcome, Identifier, InputRecord, ValidationResult, ValidationStatus,
};
use crate::utils::dns::DomainResolver;
use crate::utils::geo::CountryResolver;
use crate::utils::proxy::ProxyRotator;
use crate::utils::smtp::SmtpProber;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Points added to the composite score per passed gate.
const GATE_WEIGHT: u8 = 20;

/// Orchestrates the ordered check chain for one input record at a time.
/// Holds its collaborators behind trait objects so tests can substitute
/// deterministic backends.
pub struct Pipeline {
    config: Arc<Config>,
    resolver: Arc<dyn DomainResolver>,
    prober: Arc<dyn SmtpProber>,
    geo: Arc<dyn CountryResolver>,
    proxies: Arc<ProxyRotator>,
    policy: Box<dyn ClassificationPolicy>,
}

impl Pipeline {
    pub fn new(
        config: Arc<Config>,
        resolver: Arc<dyn DomainResolver>,
        prober: Arc<dyn SmtpProber>,
        geo: Arc<dyn CountryResolver>,
        proxies: Arc<ProxyRotator>,
    ) -> Self {
        let policy = policy::policy_for(config.classification_policy);
        Self {
            config,
            resolver,
            prober,
            geo,
            proxies,
            policy,
        }
    }

    /// Restarts the proxy rotation window, so each batch begins with a
    /// fresh use count on the current proxy.
    pub fn reset_proxy_usage(&self) {
        self.proxies.reset_usage();
    }

    /// Runs the full chain for one record. Gates run strictly in order and
    /// the first failure stops all later network work; the configured policy
    /// then maps the gate outcomes to a final status.
    #[instrument(skip(self, record), fields(identifier = %record.identifier))]
    pub async fn validate(&self, record: &InputRecord) -> ValidationResult {
        let mut result = ValidationResult::pending(&record.identifier, &record.secret);
        let mut gates = GateOutcomes::default();

        // Gate 1: syntax. The identifier is parsed exactly once; everything
        // downstream dispatches on the parsed shape.
        let identifier = match Identifier::parse(&record.identifier, &self.config.email_regex) {
            Ok(id) => id,
            Err(msg) => {
                result.details.push(format!("Invalid syntax: {}", msg));
                return self.finish(result, gates);
            }
        };
        gates.syntax = true;
        gates.score += GATE_WEIGHT;
        result.details.push("Valid syntax".to_string());

        let domain = identifier.domain().to_string();

        // Gate 2: disposable domains are excluded, not failed.
        if self.config.disposable_domains.contains(&domain) {
            debug!(target: "pipeline", "{} uses a disposable domain", record.identifier);
            result.status = ValidationStatus::Skipped;
            result.details.push("Disposable email domain".to_string());
            result.score = gates.score;
            return result;
        }

        // Gate 3: DNS validity (MX or A records present).
        let report = self.resolver.resolve(&domain).await;
        if !report.is_valid() {
            result
                .details
                .push("Domain does not exist (no MX or A records)".to_string());
            return self.finish(result, gates);
        }
        gates.dns = true;
        gates.score += GATE_WEIGHT;
        result.details.push("Valid DNS records".to_string());

        // Geolocation never gates and runs as soon as the domain resolves,
        // so records failing the later gates still carry a real country.
        self.attach_country(&mut result, &domain, report.ip.as_deref())
            .await;

        // Gate 4: MX presence, strictly. A-record fallback alone is not
        // enough for full validity.
        let Some(primary_mx) = report.primary_mx().map(|mx| mx.host.clone()) else {
            result.details.push("No MX records found".to_string());
            return self.finish(result, gates);
        };
        gates.mx = true;
        gates.score += GATE_WEIGHT;
        result.mx_primary = Some(primary_mx.clone());
        result
            .details
            .push(format!("MX records found: {}", primary_mx));

        // Gate 5: SMTP reachability against the primary MX.
        let port_probe = self.prober.probe_port(&primary_mx).await;
        if !port_probe.reachable {
            result
                .details
                .push("SMTP server unreachable on all candidate ports".to_string());
            return self.finish(result, gates);
        }
        gates.smtp = true;
        gates.score += GATE_WEIGHT;
        if let Some(port) = port_probe.port_used {
            result.details.push(format!("SMTP reachable on port {}", port));
        }

        // Gate 6: mailbox existence, for full addresses only.
        match &identifier {
            Identifier::Email { .. } => {
                gates.mailbox_applicable = true;
                let probe = self
                    .prober
                    .probe_mailbox(&record.identifier, &primary_mx)
                    .await;
                if !probe.deliverable {
                    result.details.push(format!(
                        "Mailbox rejected ({}): {}",
                        probe.code, probe.message
                    ));
                    return self.finish(result, gates);
                }
                gates.mailbox = true;
                gates.score += GATE_WEIGHT;
                result
                    .details
                    .push(format!("Mailbox accepted ({})", probe.code));
            }
            Identifier::Domain(_) => {
                // No mailbox to probe; the gate passes vacuously.
                gates.score += GATE_WEIGHT;
                result.details.push("Domain-level checks only".to_string());
            }
        }

        // Optional authentication: opt-in and only with a non-empty secret.
        // Never changes the VALID/INVALID outcome.
        if !record.secret.is_empty() {
            if self.config.enable_auth_checks {
                result.auth_result = self.run_auth(&record.identifier, &record.secret).await;
            } else {
                debug!(
                    target: "pipeline",
                    "Secret present for {} but authentication checks are disabled",
                    record.identifier
                );
            }
        }

        result.spam_risk = spam::assess_spam_risk(
            identifier.local(),
            &domain,
            gates.score,
            &self.config,
        );

        self.finish(result, gates)
    }

    /// Applies the classification policy and freezes the score.
    fn finish(&self, mut result: ValidationResult, gates: GateOutcomes) -> ValidationResult {
        let (status, detail) = self.policy.classify(&gates);
        result.status = status;
        result.score = gates.score;
        if let Some(detail) = detail {
            result.details.push(detail);
        }
        debug!(
            target: "pipeline",
            "{} -> {} (score {}, policy {})",
            result.identifier,
            result.status.as_str(),
            result.score,
            self.policy.name()
        );
        result
    }

    async fn attach_country(
        &self,
        result: &mut ValidationResult,
        domain: &str,
        ip: Option<&str>,
    ) {
        let proxy = self.proxies.get_proxy();
        let info = self.geo.locate(domain, ip, proxy.as_deref()).await;
        if let Some(addr) = proxy {
            if info.proxy_failed {
                self.proxies.mark_failed(&addr);
            } else {
                self.proxies.mark_success(&addr);
            }
        }
        result.country = info.country;
        result
            .details
            .push(format!("Country: {} (via {})", result.country, info.method));
    }

    async fn run_auth(&self, identifier: &str, secret: &str) -> AuthOutcome {
        warn!(
            target: "pipeline",
            "Authentication check requested for {}", identifier
        );
        let probe = self.prober.probe_authentication(identifier, secret).await;
        info!(
            target: "pipeline",
            "Authentication for {}: {} ({})",
            identifier,
            if probe.authenticated { "success" } else { "failure" },
            probe.reason
        );
        if probe.authenticated {
            AuthOutcome::Success
        } else if probe.server_used.is_some() {
            AuthOutcome::Failed
        } else {
            AuthOutcome::Error
        }
    }
}
