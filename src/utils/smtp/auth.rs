// src/utils/smtp/auth.rs
//! Opt-in SMTP authentication testing against provider submission endpoints.
//!
//! Every attempt here transmits the caller-supplied secret to a third-party
//! server, so attempts are audit-logged at WARN with the target endpoint.
//! The secret itself is never logged.

use super::result::AuthProbe;
use crate::core::config::Config;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TlsMode {
    StartTls,
    Implicit,
    Plain,
}

/// Known submission endpoints keyed by account domain.
static PROVIDER_ENDPOINTS: Lazy<HashMap<&'static str, (&'static str, u16, TlsMode)>> =
    Lazy::new(|| {
        HashMap::from([
            ("gmail.com", ("smtp.gmail.com", 587, TlsMode::StartTls)),
            ("googlemail.com", ("smtp.gmail.com", 587, TlsMode::StartTls)),
            ("yahoo.com", ("smtp.mail.yahoo.com", 587, TlsMode::StartTls)),
            ("hotmail.com", ("smtp-mail.outlook.com", 587, TlsMode::StartTls)),
            ("outlook.com", ("smtp-mail.outlook.com", 587, TlsMode::StartTls)),
            ("live.com", ("smtp-mail.outlook.com", 587, TlsMode::StartTls)),
            ("aol.com", ("smtp.aol.com", 587, TlsMode::StartTls)),
            ("icloud.com", ("smtp.mail.me.com", 587, TlsMode::StartTls)),
            ("me.com", ("smtp.mail.me.com", 587, TlsMode::StartTls)),
            ("gmx.de", ("mail.gmx.net", 587, TlsMode::StartTls)),
            ("gmx.net", ("mail.gmx.net", 587, TlsMode::StartTls)),
            ("web.de", ("smtp.web.de", 587, TlsMode::StartTls)),
            ("t-online.de", ("securesmtp.t-online.de", 465, TlsMode::Implicit)),
            ("mail.ru", ("smtp.mail.ru", 465, TlsMode::Implicit)),
            ("yandex.ru", ("smtp.yandex.com", 465, TlsMode::Implicit)),
            ("yandex.com", ("smtp.yandex.com", 465, TlsMode::Implicit)),
            ("zoho.com", ("smtp.zoho.com", 587, TlsMode::StartTls)),
            ("comcast.net", ("smtp.comcast.net", 587, TlsMode::StartTls)),
        ])
    });

/// Conventional hostnames probed for domains missing from the table.
const DISCOVERY_PREFIXES: [&str; 4] = ["smtp.", "mail.", "mx.", ""];

/// Ports and their TLS modes tried during discovery, in order.
const DISCOVERY_PORTS: [(u16, TlsMode); 3] = [
    (587, TlsMode::StartTls),
    (465, TlsMode::Implicit),
    (25, TlsMode::Plain),
];

/// Endpoints to try for `domain`: the table entry when known, otherwise the
/// discovery grid of conventional hostnames and standard ports.
fn candidate_endpoints(domain: &str) -> Vec<(String, u16, TlsMode)> {
    if let Some(&(host, port, mode)) = PROVIDER_ENDPOINTS.get(domain) {
        return vec![(host.to_string(), port, mode)];
    }
    let mut candidates = Vec::with_capacity(DISCOVERY_PREFIXES.len() * DISCOVERY_PORTS.len());
    for prefix in DISCOVERY_PREFIXES {
        let host = format!("{}{}", prefix, domain);
        for (port, mode) in DISCOVERY_PORTS {
            candidates.push((host.clone(), port, mode));
        }
    }
    candidates
}

fn build_transport(
    config: &Config,
    host: &str,
    port: u16,
    mode: TlsMode,
    email: &str,
    secret: &str,
) -> Result<SmtpTransport, lettre::transport::smtp::Error> {
    let builder = match mode {
        TlsMode::StartTls => SmtpTransport::starttls_relay(host)?,
        TlsMode::Implicit => SmtpTransport::relay(host)?,
        TlsMode::Plain => SmtpTransport::builder_dangerous(host),
    };
    Ok(builder
        .port(port)
        .credentials(Credentials::new(email.to_string(), secret.to_string()))
        .timeout(Some(config.smtp_timeout))
        .build())
}

/// Tries each candidate endpoint until one accepts the credentials. Blocking;
/// callers run this on the blocking pool.
pub(crate) fn attempt_authentication(config: &Config, email: &str, secret: &str) -> AuthProbe {
    let Some((_, domain)) = email.rsplit_once('@') else {
        return AuthProbe::failed(None, "Identifier has no domain part".to_string());
    };

    let mut last_refusal: Option<(String, String)> = None;
    for (host, port, mode) in candidate_endpoints(domain) {
        let endpoint = format!("{}:{}", host, port);
        warn!(
            target: "smtp_auth",
            "Transmitting credentials for {} to {} ({:?})", email, endpoint, mode
        );

        let transport = match build_transport(config, &host, port, mode, email, secret) {
            Ok(t) => t,
            Err(e) => {
                debug!(target: "smtp_auth", "Cannot build transport for {}: {}", endpoint, e);
                continue;
            }
        };

        match transport.test_connection() {
            Ok(true) => {
                info!(target: "smtp_auth", "Authentication succeeded for {} via {}", email, endpoint);
                let reason = match confirm_with_test_send(config, &transport, email) {
                    Some(send_note) => format!("Authenticated via {}; {}", endpoint, send_note),
                    None => format!("Authenticated via {}", endpoint),
                };
                return AuthProbe::success(endpoint, reason);
            }
            Ok(false) => {
                last_refusal = Some((endpoint, "Server refused the connection test".to_string()));
            }
            Err(e) => {
                debug!(target: "smtp_auth", "Attempt via {} failed: {}", endpoint, e);
                last_refusal = Some((endpoint, e.to_string()));
            }
        }
    }

    match last_refusal {
        Some((endpoint, reason)) => AuthProbe::failed(
            Some(endpoint),
            format!("All endpoints refused: {}", reason),
        ),
        None => AuthProbe::failed(None, "No usable endpoint found".to_string()),
    }
}

/// When a test recipient is configured, confirms the authenticated session
/// can actually submit mail. Failure here does not revoke the auth success.
fn confirm_with_test_send(
    config: &Config,
    transport: &SmtpTransport,
    email: &str,
) -> Option<String> {
    let recipient = config.test_recipient.as_deref()?;

    let from: Mailbox = email.parse().ok()?;
    let to: Mailbox = recipient.parse().ok()?;
    let message = Message::builder()
        .from(from)
        .to(to)
        .subject("Delivery confirmation")
        .body(String::from("Automated delivery confirmation message."))
        .ok()?;

    match transport.send(&message) {
        Ok(_) => {
            info!(target: "smtp_auth", "Test message accepted for delivery to {}", recipient);
            Some("test send accepted".to_string())
        }
        Err(e) => {
            debug!(target: "smtp_auth", "Test send failed: {}", e);
            Some(format!("test send failed: {}", e))
        }
    }
}
