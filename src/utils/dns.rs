//! DNS resolution of MX and A records for candidate domains.

use crate::core::config::Config;
use crate::core::error::{AppError, Result};
use crate::core::models::{DomainReport, MxHost};
use async_trait::async_trait;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use trust_dns_resolver::config::{
    NameServerConfig, Protocol, ResolverConfig, ResolverOpts,
};
use trust_dns_resolver::TokioAsyncResolver;
use tracing::{debug, trace, warn};

/// Resolves a domain to its mail-relevant DNS records. Implementations must
/// never error: every lookup failure collapses into an unresolved report.
#[async_trait]
pub trait DomainResolver: Send + Sync {
    async fn resolve(&self, domain: &str) -> DomainReport;
}

/// Production resolver backed by trust-dns with the configured upstream
/// servers and timeout.
pub struct DnsClient {
    resolver: TokioAsyncResolver,
}

impl DnsClient {
    pub fn new(config: &Arc<Config>) -> Result<Self> {
        let mut resolver_config = ResolverConfig::new();
        for server in &config.dns_servers {
            let ip: IpAddr = server.parse().map_err(|e| {
                AppError::Initialization(format!("invalid DNS server '{}': {}", server, e))
            })?;
            resolver_config.add_name_server(NameServerConfig {
                socket_addr: SocketAddr::new(ip, 53),
                protocol: Protocol::Udp,
                tls_dns_name: None,
                trust_negative_responses: true,
                bind_addr: None,
            });
        }

        let mut opts = ResolverOpts::default();
        opts.timeout = config.dns_timeout;
        opts.attempts = 2;

        Ok(Self {
            resolver: TokioAsyncResolver::tokio(resolver_config, opts),
        })
    }
}

#[async_trait]
impl DomainResolver for DnsClient {
    async fn resolve(&self, domain: &str) -> DomainReport {
        trace!(target: "dns", "Resolving MX/A records for {}", domain);

        let mx_hosts: Vec<MxHost> = match self.resolver.mx_lookup(domain).await {
            Ok(response) => response
                .iter()
                .map(|mx| MxHost {
                    host: mx.exchange().to_utf8().trim_end_matches('.').to_string(),
                    priority: mx.preference(),
                })
                .collect(),
            Err(e) => {
                debug!(target: "dns", "MX lookup failed for {}: {}", domain, e);
                Vec::new()
            }
        };

        let ip = match self.resolver.lookup_ip(domain).await {
            Ok(response) => response.iter().next().map(|addr| addr.to_string()),
            Err(e) => {
                debug!(target: "dns", "A/AAAA lookup failed for {}: {}", domain, e);
                None
            }
        };

        if mx_hosts.is_empty() && ip.is_none() {
            warn!(target: "dns", "No usable DNS records for {}", domain);
            return DomainReport::unresolved(domain);
        }

        debug!(
            target: "dns",
            "{}: {} MX record(s), A record present: {}",
            domain,
            mx_hosts.len(),
            ip.is_some()
        );
        DomainReport::new(domain, mx_hosts, ip)
    }
}
