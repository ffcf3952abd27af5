// src/utils/smtp/result.rs
//! Defines the result types for SMTP probing operations.

/// Outcome of the port-reachability scan against a mail host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortProbe {
    /// True when any candidate port accepted a TCP connection.
    pub reachable: bool,
    /// The first port that connected, if any.
    pub port_used: Option<u16>,
}

impl PortProbe {
    pub fn reachable(port: u16) -> Self {
        Self {
            reachable: true,
            port_used: Some(port),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            port_used: None,
        }
    }
}

/// Outcome of the RCPT TO mailbox probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailboxProbe {
    pub deliverable: bool,
    /// SMTP status code; 421 by convention for connection-level failures.
    pub code: u16,
    /// Detailed message about the outcome.
    pub message: String,
}

impl MailboxProbe {
    /// The server accepted the recipient (250/251).
    pub fn deliverable(code: u16, message: String) -> Self {
        Self {
            deliverable: true,
            code,
            message,
        }
    }

    /// The server rejected the recipient with a protocol-level response.
    pub fn rejected(code: u16, message: String) -> Self {
        Self {
            deliverable: false,
            code,
            message,
        }
    }

    /// The session could not be established or broke mid-conversation.
    pub fn connection_failure(message: String) -> Self {
        Self {
            deliverable: false,
            code: 421,
            message,
        }
    }
}

/// Outcome of an opt-in authentication attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthProbe {
    pub authenticated: bool,
    /// The endpoint that accepted (or last refused) the credentials.
    pub server_used: Option<String>,
    pub reason: String,
}

impl AuthProbe {
    pub fn success(server: String, reason: String) -> Self {
        Self {
            authenticated: true,
            server_used: Some(server),
            reason,
        }
    }

    pub fn failed(server: Option<String>, reason: String) -> Self {
        Self {
            authenticated: false,
            server_used: server,
            reason,
        }
    }
}
