// src/utils/smtp/probe.rs
//! Port reachability and RCPT TO mailbox probing over raw SMTP sessions.

use super::result::{AuthProbe, MailboxProbe, PortProbe};
use super::SmtpProber;
use crate::core::config::Config;
use async_trait::async_trait;
use lettre::transport::smtp::client::SmtpConnection;
use lettre::transport::smtp::commands::{Ehlo, Mail, Rcpt};
use lettre::transport::smtp::extension::ClientId;
use lettre::Address;
use std::net::ToSocketAddrs;
use std::sync::Arc;
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

/// Delivery port used for the RCPT TO conversation with an MX host.
const MX_DELIVERY_PORT: u16 = 25;

/// Production prober speaking SMTP through lettre's low-level connection.
pub struct SmtpClient {
    config: Arc<Config>,
    helo_name: ClientId,
}

impl SmtpClient {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            helo_name: ClientId::Domain("localhost".to_string()),
        }
    }

    fn parse_code(response: &lettre::transport::smtp::response::Response) -> u16 {
        response.code().to_string().parse::<u16>().unwrap_or(0)
    }

    fn rcpt_conversation(&self, email: &str, mx_host: &str) -> MailboxProbe {
        let socket_addr = match (mx_host, MX_DELIVERY_PORT).to_socket_addrs() {
            Ok(mut addrs) => match addrs.next() {
                Some(addr) => addr,
                None => {
                    return MailboxProbe::connection_failure(format!(
                        "No address resolved for {}",
                        mx_host
                    ));
                }
            },
            Err(e) => {
                return MailboxProbe::connection_failure(format!(
                    "Cannot resolve {}: {}",
                    mx_host, e
                ));
            }
        };

        let mut conn = match SmtpConnection::connect(
            socket_addr,
            Some(self.config.smtp_timeout),
            &self.helo_name,
            None,
            None,
        ) {
            Ok(conn) => conn,
            Err(e) => {
                warn!(target: "smtp_task", "Connection to {} failed: {}", mx_host, e);
                return MailboxProbe::connection_failure(format!(
                    "Connection to {} failed: {}",
                    mx_host, e
                ));
            }
        };

        if let Err(e) = conn.command(Ehlo::new(self.helo_name.clone())) {
            conn.quit().ok();
            return MailboxProbe::connection_failure(format!("EHLO failed: {}", e));
        }

        let sender: Address = match self.config.smtp_sender_email.parse() {
            Ok(addr) => addr,
            Err(e) => {
                conn.quit().ok();
                return MailboxProbe::connection_failure(format!(
                    "Probe sender address unusable: {}",
                    e
                ));
            }
        };
        match conn.command(Mail::new(Some(sender), vec![])) {
            Ok(response) if response.is_positive() => {}
            Ok(response) => {
                let code = Self::parse_code(&response);
                let message = response.message().collect::<Vec<&str>>().join(" ");
                conn.quit().ok();
                return MailboxProbe::rejected(
                    code,
                    format!("MAIL FROM rejected: {}", message),
                );
            }
            Err(e) => {
                conn.quit().ok();
                return MailboxProbe::connection_failure(format!("MAIL FROM failed: {}", e));
            }
        }

        let recipient: Address = match email.parse() {
            Ok(addr) => addr,
            Err(e) => {
                conn.quit().ok();
                return MailboxProbe::rejected(553, format!("Unparseable recipient: {}", e));
            }
        };
        let probe = match conn.command(Rcpt::new(recipient, vec![])) {
            Ok(response) => {
                let code = Self::parse_code(&response);
                let message = response.message().collect::<Vec<&str>>().join(" ");
                debug!(
                    target: "smtp_task",
                    "RCPT TO:<{}> on {}: {} {}", email, mx_host, code, message
                );
                if code == 250 || code == 251 {
                    MailboxProbe::deliverable(code, message)
                } else {
                    MailboxProbe::rejected(code, message)
                }
            }
            Err(e) => {
                // Servers that slam the door on RCPT are protocol rejections,
                // not connection failures.
                let text = e.to_string();
                if text.contains("550") || text.contains("553") {
                    MailboxProbe::rejected(550, text)
                } else {
                    MailboxProbe::connection_failure(format!("RCPT TO failed: {}", text))
                }
            }
        };

        conn.quit().ok();
        probe
    }
}

#[async_trait]
impl SmtpProber for SmtpClient {
    async fn probe_port(&self, host: &str) -> PortProbe {
        for &port in &self.config.smtp_ports {
            let target = format!("{}:{}", host, port);
            match tokio::time::timeout(self.config.smtp_timeout, TcpStream::connect(&target))
                .await
            {
                Ok(Ok(_stream)) => {
                    debug!(target: "smtp_task", "{} reachable on port {}", host, port);
                    return PortProbe::reachable(port);
                }
                Ok(Err(e)) => {
                    debug!(target: "smtp_task", "{}:{} connect error: {}", host, port, e);
                }
                Err(_) => {
                    debug!(target: "smtp_task", "{}:{} connect timed out", host, port);
                }
            }
        }
        info!(target: "smtp_task", "No SMTP port reachable on {}", host);
        PortProbe::unreachable()
    }

    async fn probe_mailbox(&self, email: &str, mx_host: &str) -> MailboxProbe {
        let client = self.clone_for_blocking();
        let email = email.to_string();
        let mx_host = mx_host.to_string();
        match tokio::task::spawn_blocking(move || client.rcpt_conversation(&email, &mx_host))
            .await
        {
            Ok(probe) => probe,
            Err(e) => MailboxProbe::connection_failure(format!("Probe task failed: {}", e)),
        }
    }

    async fn probe_authentication(&self, email: &str, secret: &str) -> AuthProbe {
        auth_entry(self.config.clone(), email, secret).await
    }
}

impl SmtpClient {
    /// The RCPT conversation is synchronous lettre I/O, so it runs on the
    /// blocking pool with its own handle to the shared state.
    fn clone_for_blocking(&self) -> Self {
        Self {
            config: self.config.clone(),
            helo_name: self.helo_name.clone(),
        }
    }
}

async fn auth_entry(config: Arc<Config>, email: &str, secret: &str) -> AuthProbe {
    let email = email.to_string();
    let secret = secret.to_string();
    match tokio::task::spawn_blocking(move || {
        super::auth::attempt_authentication(&config, &email, &secret)
    })
    .await
    {
        Ok(probe) => probe,
        Err(e) => AuthProbe::failed(None, format!("Auth task failed: {}", e)),
    }
}
