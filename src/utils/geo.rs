//! Best-effort country inference for validated domains.
//!
//! Resolution order: multi-level ccTLD table, single-level ccTLD table,
//! known-provider table, then external IP geolocation APIs. Each step runs
//! only when the previous one yields nothing.

use crate::core::config::Config;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Country inference outcome. `method` names the strategy that succeeded
/// ("tld", "provider", "ip_api") or "none" when everything failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoInfo {
    pub country: String,
    pub method: String,
    /// Set when a supplied proxy could not complete the API request, so the
    /// caller can report the failure to the rotator.
    pub proxy_failed: bool,
}

impl GeoInfo {
    fn found(country: impl Into<String>, method: &str) -> Self {
        Self {
            country: country.into(),
            method: method.to_string(),
            proxy_failed: false,
        }
    }

    fn unknown() -> Self {
        Self {
            country: "Unknown".to_string(),
            method: "none".to_string(),
            proxy_failed: false,
        }
    }
}

/// Infers a country for a domain. Never gates validation; callers attach the
/// result regardless of outcome.
#[async_trait]
pub trait CountryResolver: Send + Sync {
    async fn locate(&self, domain: &str, ip: Option<&str>, proxy: Option<&str>) -> GeoInfo;
}

static MULTI_LEVEL_TLDS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (".co.uk", "United Kingdom"),
        (".org.uk", "United Kingdom"),
        (".ac.uk", "United Kingdom"),
        (".com.au", "Australia"),
        (".net.au", "Australia"),
        (".co.nz", "New Zealand"),
        (".co.jp", "Japan"),
        (".co.kr", "South Korea"),
        (".com.br", "Brazil"),
        (".com.mx", "Mexico"),
        (".co.in", "India"),
        (".com.cn", "China"),
        (".com.tr", "Turkey"),
        (".com.ar", "Argentina"),
        (".co.za", "South Africa"),
    ])
});

static SINGLE_LEVEL_TLDS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (".uk", "United Kingdom"),
        (".de", "Germany"),
        (".fr", "France"),
        (".it", "Italy"),
        (".es", "Spain"),
        (".nl", "Netherlands"),
        (".be", "Belgium"),
        (".ch", "Switzerland"),
        (".at", "Austria"),
        (".pl", "Poland"),
        (".ru", "Russia"),
        (".ua", "Ukraine"),
        (".cz", "Czech Republic"),
        (".se", "Sweden"),
        (".no", "Norway"),
        (".dk", "Denmark"),
        (".fi", "Finland"),
        (".pt", "Portugal"),
        (".gr", "Greece"),
        (".ro", "Romania"),
        (".hu", "Hungary"),
        (".ie", "Ireland"),
        (".ca", "Canada"),
        (".mx", "Mexico"),
        (".br", "Brazil"),
        (".ar", "Argentina"),
        (".cl", "Chile"),
        (".au", "Australia"),
        (".nz", "New Zealand"),
        (".jp", "Japan"),
        (".kr", "South Korea"),
        (".cn", "China"),
        (".in", "India"),
        (".sg", "Singapore"),
        (".hk", "Hong Kong"),
        (".tw", "Taiwan"),
        (".tr", "Turkey"),
        (".il", "Israel"),
        (".ae", "United Arab Emirates"),
        (".sa", "Saudi Arabia"),
        (".za", "South Africa"),
        (".ng", "Nigeria"),
        (".ke", "Kenya"),
        (".eg", "Egypt"),
        (".us", "United States"),
    ])
});

static PROVIDER_COUNTRIES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("gmail.com", "United States"),
        ("googlemail.com", "United States"),
        ("yahoo.com", "United States"),
        ("hotmail.com", "United States"),
        ("outlook.com", "United States"),
        ("live.com", "United States"),
        ("msn.com", "United States"),
        ("aol.com", "United States"),
        ("icloud.com", "United States"),
        ("me.com", "United States"),
        ("protonmail.com", "Switzerland"),
        ("proton.me", "Switzerland"),
        ("gmx.de", "Germany"),
        ("gmx.net", "Germany"),
        ("web.de", "Germany"),
        ("t-online.de", "Germany"),
        ("freenet.de", "Germany"),
        ("orange.fr", "France"),
        ("laposte.net", "France"),
        ("free.fr", "France"),
        ("libero.it", "Italy"),
        ("virgilio.it", "Italy"),
        ("mail.ru", "Russia"),
        ("yandex.ru", "Russia"),
        ("yandex.com", "Russia"),
        ("qq.com", "China"),
        ("163.com", "China"),
        ("126.com", "China"),
        ("naver.com", "South Korea"),
        ("daum.net", "South Korea"),
        ("rediffmail.com", "India"),
        ("uol.com.br", "Brazil"),
        ("bol.com.br", "Brazil"),
        ("wp.pl", "Poland"),
        ("o2.pl", "Poland"),
        ("interia.pl", "Poland"),
        ("seznam.cz", "Czech Republic"),
        ("ziggo.nl", "Netherlands"),
        ("telenet.be", "Belgium"),
        ("bluewin.ch", "Switzerland"),
        ("btinternet.com", "United Kingdom"),
        ("sky.com", "United Kingdom"),
    ])
});

/// Longest-match ccTLD lookup: multi-level suffixes take precedence over
/// their single-level tails (`.co.uk` before `.uk`).
pub fn country_from_tld(domain: &str) -> Option<&'static str> {
    let domain = domain.to_lowercase();
    for (suffix, country) in MULTI_LEVEL_TLDS.iter() {
        if domain.ends_with(suffix) {
            return Some(country);
        }
    }
    for (suffix, country) in SINGLE_LEVEL_TLDS.iter() {
        if domain.ends_with(suffix) {
            return Some(country);
        }
    }
    None
}

/// Exact-match lookup against the known-provider table.
pub fn country_from_provider(domain: &str) -> Option<&'static str> {
    PROVIDER_COUNTRIES.get(domain.to_lowercase().as_str()).copied()
}

/// Addresses that no public geolocation API can place.
fn is_non_routable(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback() || v4.is_private() || v4.is_link_local() || v4.is_unspecified()
        }
        IpAddr::V6(v6) => v6.is_loopback() || v6.is_unspecified(),
    }
}

/// Production resolver combining the static tables with external IP APIs.
pub struct GeoLocator {
    config: Arc<Config>,
}

impl GeoLocator {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    /// Queries the configured geolocation endpoints in order, stopping at
    /// the first HTTP 200 with a parseable country field. A fresh client is
    /// built per call so the supplied proxy applies to this request only.
    async fn lookup_ip_country(&self, ip: &str, proxy: Option<&str>) -> (Option<String>, bool) {
        let mut builder = reqwest::Client::builder()
            .timeout(self.config.request_timeout)
            .user_agent(self.config.user_agent.clone());
        if let Some(addr) = proxy {
            match reqwest::Proxy::all(addr) {
                Ok(p) => builder = builder.proxy(p),
                Err(e) => {
                    warn!(target: "geo", "Unusable proxy {}: {}", addr, e);
                    return (None, true);
                }
            }
        }
        let client = match builder.build() {
            Ok(c) => c,
            Err(e) => {
                warn!(target: "geo", "Failed to build HTTP client: {}", e);
                return (None, proxy.is_some());
            }
        };

        let mut any_proxy_failure = false;
        for endpoint in &self.config.geo_api_endpoints {
            let url = endpoint.replace("{ip}", ip);
            trace!(target: "geo", "Querying {}", url);
            match client.get(&url).send().await {
                Ok(response) if response.status().is_success() => {
                    match response.json::<serde_json::Value>().await {
                        Ok(body) => {
                            if let Some(country) = extract_country(&body) {
                                debug!(target: "geo", "{} located via {}", ip, endpoint);
                                return (Some(country), false);
                            }
                        }
                        Err(e) => {
                            debug!(target: "geo", "Unparseable body from {}: {}", url, e);
                        }
                    }
                }
                Ok(response) => {
                    debug!(target: "geo", "{} returned HTTP {}", url, response.status());
                }
                Err(e) => {
                    debug!(target: "geo", "Request to {} failed: {}", url, e);
                    if proxy.is_some() && (e.is_connect() || e.is_timeout()) {
                        any_proxy_failure = true;
                    }
                }
            }
        }
        (None, any_proxy_failure)
    }
}

/// Pulls a country name out of the differing response shapes the public
/// APIs return ("country" or "country_name").
fn extract_country(body: &serde_json::Value) -> Option<String> {
    for key in ["country", "country_name"] {
        if let Some(value) = body.get(key).and_then(|v| v.as_str()) {
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

#[async_trait]
impl CountryResolver for GeoLocator {
    async fn locate(&self, domain: &str, ip: Option<&str>, proxy: Option<&str>) -> GeoInfo {
        if let Some(country) = country_from_tld(domain) {
            return GeoInfo::found(country, "tld");
        }
        if let Some(country) = country_from_provider(domain) {
            return GeoInfo::found(country, "provider");
        }

        let Some(ip_str) = ip else {
            return GeoInfo::unknown();
        };
        match ip_str.parse::<IpAddr>() {
            Ok(addr) if is_non_routable(&addr) => {
                debug!(target: "geo", "Skipping non-routable address {}", ip_str);
                GeoInfo::unknown()
            }
            Ok(_) => {
                let (country, proxy_failed) = self.lookup_ip_country(ip_str, proxy).await;
                match country {
                    Some(c) => GeoInfo::found(c, "ip_api"),
                    None => GeoInfo {
                        proxy_failed,
                        ..GeoInfo::unknown()
                    },
                }
            }
            Err(_) => GeoInfo::unknown(),
        }
    }
}
