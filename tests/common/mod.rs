//! Deterministic in-memory backends for exercising the pipeline without
//! touching the network.
#![allow(dead_code)]

use async_trait::async_trait;
use mailvet_core::core::config::Config;
use mailvet_core::core::models::{DomainReport, MxHost};
use mailvet_core::utils::dns::DomainResolver;
use mailvet_core::utils::geo::{CountryResolver, GeoInfo};
use mailvet_core::utils::smtp::{AuthProbe, MailboxProbe, PortProbe, SmtpProber};
use mailvet_core::{Pipeline, ProxyRotator};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub struct MockResolver {
    reports: HashMap<String, DomainReport>,
    pub calls: AtomicUsize,
}

impl MockResolver {
    pub fn new() -> Self {
        Self {
            reports: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_mx(mut self, domain: &str, mx_host: &str, ip: &str) -> Self {
        self.reports.insert(
            domain.to_string(),
            DomainReport::new(
                domain,
                vec![MxHost {
                    host: mx_host.to_string(),
                    priority: 10,
                }],
                Some(ip.to_string()),
            ),
        );
        self
    }

    pub fn with_a_only(mut self, domain: &str, ip: &str) -> Self {
        self.reports.insert(
            domain.to_string(),
            DomainReport::new(domain, Vec::new(), Some(ip.to_string())),
        );
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DomainResolver for MockResolver {
    async fn resolve(&self, domain: &str) -> DomainReport {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reports
            .get(domain)
            .cloned()
            .unwrap_or_else(|| DomainReport::unresolved(domain))
    }
}

pub struct MockProber {
    reachable_port: Option<u16>,
    deliverable: bool,
    reject_code: u16,
    reject_message: String,
    auth_ok: bool,
    pub port_calls: AtomicUsize,
    pub mailbox_calls: AtomicUsize,
    pub auth_calls: AtomicUsize,
}

impl MockProber {
    pub fn accepting() -> Self {
        Self {
            reachable_port: Some(587),
            deliverable: true,
            reject_code: 0,
            reject_message: String::new(),
            auth_ok: true,
            port_calls: AtomicUsize::new(0),
            mailbox_calls: AtomicUsize::new(0),
            auth_calls: AtomicUsize::new(0),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            reachable_port: None,
            ..Self::accepting()
        }
    }

    pub fn rejecting(code: u16, message: &str) -> Self {
        Self {
            deliverable: false,
            reject_code: code,
            reject_message: message.to_string(),
            ..Self::accepting()
        }
    }

    pub fn with_auth_refused(mut self) -> Self {
        self.auth_ok = false;
        self
    }

    pub fn port_call_count(&self) -> usize {
        self.port_calls.load(Ordering::SeqCst)
    }

    pub fn mailbox_call_count(&self) -> usize {
        self.mailbox_calls.load(Ordering::SeqCst)
    }

    pub fn auth_call_count(&self) -> usize {
        self.auth_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SmtpProber for MockProber {
    async fn probe_port(&self, _host: &str) -> PortProbe {
        self.port_calls.fetch_add(1, Ordering::SeqCst);
        match self.reachable_port {
            Some(port) => PortProbe::reachable(port),
            None => PortProbe::unreachable(),
        }
    }

    async fn probe_mailbox(&self, _email: &str, _mx_host: &str) -> MailboxProbe {
        self.mailbox_calls.fetch_add(1, Ordering::SeqCst);
        if self.deliverable {
            MailboxProbe::deliverable(250, "OK".to_string())
        } else {
            MailboxProbe::rejected(self.reject_code, self.reject_message.clone())
        }
    }

    async fn probe_authentication(&self, _email: &str, _secret: &str) -> AuthProbe {
        self.auth_calls.fetch_add(1, Ordering::SeqCst);
        if self.auth_ok {
            AuthProbe::success("smtp.example.com:587".to_string(), "Authenticated".to_string())
        } else {
            AuthProbe::failed(
                Some("smtp.example.com:587".to_string()),
                "Credentials refused".to_string(),
            )
        }
    }
}

pub struct MockGeo {
    countries: HashMap<String, String>,
}

impl MockGeo {
    pub fn new() -> Self {
        Self {
            countries: HashMap::new(),
        }
    }

    pub fn with_country(mut self, domain: &str, country: &str) -> Self {
        self.countries
            .insert(domain.to_string(), country.to_string());
        self
    }
}

#[async_trait]
impl CountryResolver for MockGeo {
    async fn locate(&self, domain: &str, _ip: Option<&str>, _proxy: Option<&str>) -> GeoInfo {
        match self.countries.get(domain) {
            Some(country) => GeoInfo {
                country: country.clone(),
                method: "tld".to_string(),
                proxy_failed: false,
            },
            None => GeoInfo {
                country: "Unknown".to_string(),
                method: "none".to_string(),
                proxy_failed: false,
            },
        }
    }
}

/// Wires a pipeline around the given mocks with an empty proxy pool.
pub fn pipeline_with(
    config: Arc<Config>,
    resolver: Arc<MockResolver>,
    prober: Arc<MockProber>,
    geo: Arc<MockGeo>,
) -> Pipeline {
    let proxies = Arc::new(ProxyRotator::new(&[], config.proxy_rotation_threshold));
    Pipeline::new(config, resolver, prober, geo, proxies)
}
