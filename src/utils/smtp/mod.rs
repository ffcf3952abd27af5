//! SMTP-level probing: port reachability, RCPT TO mailbox checks and the
//! opt-in authentication test.

pub(crate) mod auth;
pub(crate) mod probe;
pub mod result;

pub use probe::SmtpClient;
pub use result::{AuthProbe, MailboxProbe, PortProbe};

use async_trait::async_trait;

/// The SMTP probing surface the validation pipeline depends on. Every probe
/// degrades gracefully: an unreachable or hostile server maps to a negative
/// result, never to an error bubbling out of the trait.
#[async_trait]
pub trait SmtpProber: Send + Sync {
    /// Tries the configured candidate ports in order against `host`,
    /// returning on the first successful TCP connect.
    async fn probe_port(&self, host: &str) -> PortProbe;

    /// Opens an SMTP session to `mx_host`, issues MAIL FROM with the probe
    /// sender and RCPT TO with `email`, and reports deliverability.
    async fn probe_mailbox(&self, email: &str, mx_host: &str) -> MailboxProbe;

    /// Attempts to authenticate as `email` with `secret` against known or
    /// discovered submission endpoints. Sends the caller's secret over the
    /// network; only invoked when authentication checks are enabled.
    async fn probe_authentication(&self, email: &str, secret: &str) -> AuthProbe;
}
