//! End-to-end pipeline behavior over mocked network backends.

mod common;

use common::{pipeline_with, MockGeo, MockProber, MockResolver};
use mailvet_core::core::config::{Config, PolicyChoice};
use mailvet_core::core::models::{AuthOutcome, SpamRisk, ValidationStatus};
use mailvet_core::InputRecord;
use std::sync::Arc;

fn config() -> Arc<Config> {
    Arc::new(Config::default())
}

fn happy_resolver() -> Arc<MockResolver> {
    Arc::new(MockResolver::new().with_mx("example.de", "mx1.example.de", "93.184.216.34"))
}

#[tokio::test]
async fn valid_email_passes_every_gate() {
    let resolver = happy_resolver();
    let prober = Arc::new(MockProber::accepting());
    let geo = Arc::new(MockGeo::new().with_country("example.de", "Germany"));
    let pipeline = pipeline_with(config(), resolver.clone(), prober.clone(), geo);

    let record = InputRecord::new("alice@example.de", "", "list_a");
    let result = pipeline.validate(&record).await;

    assert_eq!(result.status, ValidationStatus::Valid);
    assert_eq!(result.score, 100);
    assert_eq!(result.country, "Germany");
    assert_eq!(result.mx_primary.as_deref(), Some("mx1.example.de"));
    assert_eq!(result.spam_risk, SpamRisk::Low);
    assert_eq!(result.auth_result, AuthOutcome::NotTested);
    assert_eq!(resolver.call_count(), 1);
    assert_eq!(prober.mailbox_call_count(), 1);
}

#[tokio::test]
async fn malformed_identifier_fails_without_network_calls() {
    let resolver = Arc::new(MockResolver::new());
    let prober = Arc::new(MockProber::accepting());
    let pipeline = pipeline_with(
        config(),
        resolver.clone(),
        prober.clone(),
        Arc::new(MockGeo::new()),
    );

    let record = InputRecord::new("not-an-email@@", "", "list_a");
    let result = pipeline.validate(&record).await;

    assert_eq!(result.status, ValidationStatus::Invalid);
    assert_eq!(result.score, 0);
    assert!(result.details[0].starts_with("Invalid syntax"));
    assert_eq!(resolver.call_count(), 0);
    assert_eq!(prober.port_call_count(), 0);
}

#[tokio::test]
async fn disposable_domain_is_skipped_without_network_calls() {
    let resolver = Arc::new(MockResolver::new());
    let prober = Arc::new(MockProber::accepting());
    let pipeline = pipeline_with(
        config(),
        resolver.clone(),
        prober.clone(),
        Arc::new(MockGeo::new()),
    );

    let record = InputRecord::new("anyone@mailinator.com", "", "list_a");
    let result = pipeline.validate(&record).await;

    assert_eq!(result.status, ValidationStatus::Skipped);
    assert!(result
        .details
        .iter()
        .any(|d| d == "Disposable email domain"));
    assert_eq!(resolver.call_count(), 0);
    assert_eq!(prober.port_call_count(), 0);
}

#[tokio::test]
async fn unresolvable_domain_is_invalid() {
    let resolver = Arc::new(MockResolver::new());
    let pipeline = pipeline_with(
        config(),
        resolver,
        Arc::new(MockProber::accepting()),
        Arc::new(MockGeo::new()),
    );

    let record = InputRecord::new("bob@nodomainexists.invalid", "", "list_a");
    let result = pipeline.validate(&record).await;

    assert_eq!(result.status, ValidationStatus::Invalid);
    assert_eq!(result.score, 20);
    assert!(result
        .details
        .iter()
        .any(|d| d == "Domain does not exist (no MX or A records)"));
}

#[tokio::test]
async fn a_record_without_mx_fails_the_mx_gate() {
    let resolver = Arc::new(MockResolver::new().with_a_only("webonly.net", "93.184.216.34"));
    let prober = Arc::new(MockProber::accepting());
    let pipeline = pipeline_with(
        config(),
        resolver,
        prober.clone(),
        Arc::new(MockGeo::new()),
    );

    let record = InputRecord::new("bob@webonly.net", "", "list_a");
    let result = pipeline.validate(&record).await;

    assert_eq!(result.status, ValidationStatus::Invalid);
    assert_eq!(result.score, 40);
    assert!(result.details.iter().any(|d| d == "No MX records found"));
    assert_eq!(prober.port_call_count(), 0);
}

#[tokio::test]
async fn unreachable_smtp_server_is_invalid() {
    let resolver = happy_resolver();
    let prober = Arc::new(MockProber::unreachable());
    let pipeline = pipeline_with(config(), resolver, prober.clone(), Arc::new(MockGeo::new()));

    let record = InputRecord::new("alice@example.de", "", "list_a");
    let result = pipeline.validate(&record).await;

    assert_eq!(result.status, ValidationStatus::Invalid);
    assert_eq!(result.score, 60);
    assert!(result
        .details
        .iter()
        .any(|d| d == "SMTP server unreachable on all candidate ports"));
    assert_eq!(prober.mailbox_call_count(), 0);
}

#[tokio::test]
async fn rejected_mailbox_carries_the_server_response() {
    let resolver = happy_resolver();
    let prober = Arc::new(MockProber::rejecting(550, "No such user"));
    let pipeline = pipeline_with(config(), resolver, prober, Arc::new(MockGeo::new()));

    let record = InputRecord::new("ghost@example.de", "", "list_a");
    let result = pipeline.validate(&record).await;

    assert_eq!(result.status, ValidationStatus::Invalid);
    assert_eq!(result.score, 80);
    assert!(result
        .details
        .iter()
        .any(|d| d.contains("Mailbox rejected (550)") && d.contains("No such user")));
}

#[tokio::test]
async fn rejected_mailbox_still_carries_the_resolved_country() {
    let resolver = happy_resolver();
    let prober = Arc::new(MockProber::rejecting(550, "No such user"));
    let geo = Arc::new(MockGeo::new().with_country("example.de", "Germany"));
    let pipeline = pipeline_with(config(), resolver, prober, geo);

    let record = InputRecord::new("ghost@example.de", "", "list_a");
    let result = pipeline.validate(&record).await;

    assert_eq!(result.status, ValidationStatus::Invalid);
    assert_eq!(result.country, "Germany");
}

#[tokio::test]
async fn unreachable_smtp_server_still_carries_the_resolved_country() {
    let resolver = happy_resolver();
    let prober = Arc::new(MockProber::unreachable());
    let geo = Arc::new(MockGeo::new().with_country("example.de", "Germany"));
    let pipeline = pipeline_with(config(), resolver, prober, geo);

    let record = InputRecord::new("alice@example.de", "", "list_a");
    let result = pipeline.validate(&record).await;

    assert_eq!(result.status, ValidationStatus::Invalid);
    assert_eq!(result.country, "Germany");
}

#[tokio::test]
async fn domain_only_record_skips_the_mailbox_probe() {
    let resolver = happy_resolver();
    let prober = Arc::new(MockProber::accepting());
    let geo = Arc::new(MockGeo::new().with_country("example.de", "Germany"));
    let pipeline = pipeline_with(config(), resolver, prober.clone(), geo);

    let record = InputRecord::new("example.de", "", "list_a");
    let result = pipeline.validate(&record).await;

    assert_eq!(result.status, ValidationStatus::Valid);
    assert_eq!(result.score, 100);
    assert_eq!(result.spam_risk, SpamRisk::Unknown);
    assert_eq!(prober.mailbox_call_count(), 0);
    assert!(result
        .details
        .iter()
        .any(|d| d == "Domain-level checks only"));
}

#[tokio::test]
async fn auth_runs_only_when_enabled_and_secret_present() {
    // Secret supplied but checks disabled: nothing is transmitted.
    let prober = Arc::new(MockProber::accepting());
    let pipeline = pipeline_with(
        config(),
        happy_resolver(),
        prober.clone(),
        Arc::new(MockGeo::new()),
    );
    let record = InputRecord::new("alice@example.de", "hunter2", "list_a");
    let result = pipeline.validate(&record).await;
    assert_eq!(result.auth_result, AuthOutcome::NotTested);
    assert_eq!(prober.auth_call_count(), 0);

    // Checks enabled: the outcome is recorded without changing the status.
    let mut cfg = Config::default();
    cfg.enable_auth_checks = true;
    let prober = Arc::new(MockProber::accepting());
    let pipeline = pipeline_with(
        Arc::new(cfg),
        happy_resolver(),
        prober.clone(),
        Arc::new(MockGeo::new()),
    );
    let result = pipeline.validate(&record).await;
    assert_eq!(result.status, ValidationStatus::Valid);
    assert_eq!(result.auth_result, AuthOutcome::Success);
    assert_eq!(prober.auth_call_count(), 1);
}

#[tokio::test]
async fn refused_credentials_do_not_invalidate_the_record() {
    let mut cfg = Config::default();
    cfg.enable_auth_checks = true;
    let prober = Arc::new(MockProber::accepting().with_auth_refused());
    let pipeline = pipeline_with(
        Arc::new(cfg),
        happy_resolver(),
        prober,
        Arc::new(MockGeo::new()),
    );

    let record = InputRecord::new("alice@example.de", "wrong-secret", "list_a");
    let result = pipeline.validate(&record).await;

    assert_eq!(result.status, ValidationStatus::Valid);
    assert_eq!(result.auth_result, AuthOutcome::Failed);
}

#[tokio::test]
async fn empty_secret_never_triggers_auth_even_when_enabled() {
    let mut cfg = Config::default();
    cfg.enable_auth_checks = true;
    let prober = Arc::new(MockProber::accepting());
    let pipeline = pipeline_with(
        Arc::new(cfg),
        happy_resolver(),
        prober.clone(),
        Arc::new(MockGeo::new()),
    );

    let record = InputRecord::new("alice@example.de", "", "list_a");
    let result = pipeline.validate(&record).await;

    assert_eq!(result.auth_result, AuthOutcome::NotTested);
    assert_eq!(prober.auth_call_count(), 0);
}

#[tokio::test]
async fn weighted_policy_accepts_a_mailbox_failure_at_score_eighty() {
    let mut cfg = Config::default();
    cfg.classification_policy = PolicyChoice::Weighted;
    let prober = Arc::new(MockProber::rejecting(550, "No such user"));
    let pipeline = pipeline_with(
        Arc::new(cfg),
        happy_resolver(),
        prober,
        Arc::new(MockGeo::new()),
    );

    let record = InputRecord::new("ghost@example.de", "", "list_a");
    let result = pipeline.validate(&record).await;

    assert_eq!(result.status, ValidationStatus::Valid);
    assert_eq!(result.score, 80);
    assert!(result.details.iter().any(|d| d == "Score band: VALID"));
}

#[tokio::test]
async fn validation_is_idempotent_over_deterministic_backends() {
    let resolver = happy_resolver();
    let prober = Arc::new(MockProber::accepting());
    let geo = Arc::new(MockGeo::new().with_country("example.de", "Germany"));
    let pipeline = pipeline_with(config(), resolver, prober, geo);

    let record = InputRecord::new("alice@example.de", "", "list_a");
    let first = pipeline.validate(&record).await;
    let second = pipeline.validate(&record).await;

    assert_eq!(first.status, second.status);
    assert_eq!(first.score, second.score);
    assert_eq!(first.country, second.country);
    assert_eq!(first.details, second.details);
}

#[tokio::test]
async fn spam_trap_locals_are_flagged_on_valid_records() {
    let resolver = happy_resolver();
    let prober = Arc::new(MockProber::accepting());
    let pipeline = pipeline_with(config(), resolver, prober, Arc::new(MockGeo::new()));

    let record = InputRecord::new("spamtrap@example.de", "", "list_a");
    let result = pipeline.validate(&record).await;

    assert_eq!(result.status, ValidationStatus::Valid);
    assert_eq!(result.spam_risk, SpamRisk::High);
}
