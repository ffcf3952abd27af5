//! Spam-trap risk heuristic over the local part, domain and composite score.

use crate::core::config::Config;
use crate::core::models::SpamRisk;
use once_cell::sync::Lazy;

/// Trap-like local-part tokens and their risk weights. Exact matches score
/// the full weight; substring matches of tokens four characters or longer
/// score half.
static TRAP_TOKENS: Lazy<Vec<(&'static str, u32)>> = Lazy::new(|| {
    vec![
        ("spamtrap", 50),
        ("honeypot", 50),
        ("trap", 40),
        ("mailer-daemon", 40),
        ("postmaster", 35),
        ("abuse", 35),
        ("admin", 25),
        ("webmaster", 25),
        ("hostmaster", 25),
        ("noreply", 20),
        ("no-reply", 20),
        ("donotreply", 20),
        ("test", 15),
    ]
});

fn token_risk(local: &str) -> u32 {
    let local = local.to_lowercase();
    let mut risk = 0u32;
    for &(token, weight) in TRAP_TOKENS.iter() {
        if local == token {
            risk += weight;
        } else if token.len() >= 4 && local.contains(token) {
            risk += weight / 2;
        }
    }
    risk
}

fn numeric_risk(local: &str) -> u32 {
    if local.len() <= 15 {
        return 0;
    }
    let digits = local.chars().filter(|c| c.is_ascii_digit()).count();
    if digits * 100 > local.len() * 40 {
        20
    } else {
        0
    }
}

/// Assesses the spam-trap risk of an address. Domain-only records carry no
/// local part and always come back UNKNOWN.
pub fn assess_spam_risk(
    local: Option<&str>,
    domain: &str,
    score: u8,
    config: &Config,
) -> SpamRisk {
    let Some(local) = local else {
        return SpamRisk::Unknown;
    };

    let mut risk = token_risk(local);
    risk += numeric_risk(local);
    if config.suspicious_domains.contains(&domain.to_lowercase()) {
        risk += 30;
    }
    if score < 40 {
        risk += 15;
    }

    if risk >= config.spam_high_threshold {
        SpamRisk::High
    } else if risk >= config.spam_medium_threshold {
        SpamRisk::Medium
    } else {
        SpamRisk::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::default()
    }

    #[test]
    fn trap_tokens_score_high() {
        let cfg = config();
        assert_eq!(
            assess_spam_risk(Some("spamtrap"), "example.com", 100, &cfg),
            SpamRisk::High
        );
        assert_eq!(
            assess_spam_risk(Some("honeypot"), "example.com", 100, &cfg),
            SpamRisk::High
        );
    }

    #[test]
    fn role_accounts_score_medium() {
        let cfg = config();
        assert_eq!(
            assess_spam_risk(Some("postmaster"), "example.com", 100, &cfg),
            SpamRisk::Medium
        );
        assert_eq!(
            assess_spam_risk(Some("admin"), "example.com", 100, &cfg),
            SpamRisk::Medium
        );
    }

    #[test]
    fn substring_matches_score_half_weight() {
        let cfg = config();
        // "trap" inside a longer local part contributes 20, below the
        // medium cutoff; "spamtrap" inside stacks 25 + 20 and crosses it.
        assert_eq!(
            assess_spam_risk(Some("wiretrap99"), "example.com", 100, &cfg),
            SpamRisk::Low
        );
        assert_eq!(
            assess_spam_risk(Some("my-spamtrap-box"), "example.com", 100, &cfg),
            SpamRisk::Medium
        );
    }

    #[test]
    fn numeric_heavy_long_locals_add_risk() {
        let cfg = config();
        // 16 chars, 10 digits: over the 40% digit cutoff.
        assert_eq!(
            assess_spam_risk(Some("user123456789012"), "example.com", 100, &cfg),
            SpamRisk::Low
        );
        // Stacks with a token hit to cross the medium bar.
        assert_eq!(
            assess_spam_risk(Some("test123456789012"), "example.com", 100, &cfg),
            SpamRisk::Medium
        );
    }

    #[test]
    fn suspicious_domain_and_low_score_stack() {
        let cfg = config();
        assert_eq!(
            assess_spam_risk(Some("alice"), "spamtrap.com", 20, &cfg),
            SpamRisk::Medium
        );
    }

    #[test]
    fn plain_addresses_are_low_risk() {
        let cfg = config();
        assert_eq!(
            assess_spam_risk(Some("alice.smith"), "example.com", 100, &cfg),
            SpamRisk::Low
        );
    }

    #[test]
    fn domain_only_records_are_unknown() {
        let cfg = config();
        assert_eq!(
            assess_spam_risk(None, "example.com", 100, &cfg),
            SpamRisk::Unknown
        );
    }
}
