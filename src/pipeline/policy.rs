//! Classification policies mapping gate outcomes to a final status.

use crate::core::config::PolicyChoice;
use crate::core::models::ValidationStatus;

/// Which gates of the check chain passed, plus the accumulated score.
/// `mailbox_applicable` is false for domain-only records, where no RCPT
/// probe is possible.
#[derive(Debug, Clone, Copy, Default)]
pub struct GateOutcomes {
    pub syntax: bool,
    pub dns: bool,
    pub mx: bool,
    pub smtp: bool,
    pub mailbox: bool,
    pub mailbox_applicable: bool,
    pub score: u8,
}

impl GateOutcomes {
    fn all_passed(&self) -> bool {
        self.syntax
            && self.dns
            && self.mx
            && self.smtp
            && (!self.mailbox_applicable || self.mailbox)
    }
}

/// Decides VALID vs INVALID once the chain has run. The returned detail, if
/// any, is appended to the result's detail trail.
pub trait ClassificationPolicy: Send + Sync {
    fn classify(&self, gates: &GateOutcomes) -> (ValidationStatus, Option<String>);
    fn name(&self) -> &'static str;
}

/// Default policy: every gate must pass, any failure is INVALID.
pub struct StrictChain;

impl ClassificationPolicy for StrictChain {
    fn classify(&self, gates: &GateOutcomes) -> (ValidationStatus, Option<String>) {
        if gates.all_passed() {
            (ValidationStatus::Valid, None)
        } else {
            (ValidationStatus::Invalid, None)
        }
    }

    fn name(&self) -> &'static str {
        "strict"
    }
}

/// Band-based policy over the composite score. Only the top band maps to
/// VALID; the band label is recorded in the details for reporting.
pub struct WeightedScore;

impl WeightedScore {
    fn band(score: u8) -> &'static str {
        if score >= 80 {
            "VALID"
        } else if score >= 60 {
            "PROBABLY_VALID"
        } else if score >= 40 {
            "PROBABLY_INVALID"
        } else {
            "INVALID"
        }
    }
}

impl ClassificationPolicy for WeightedScore {
    fn classify(&self, gates: &GateOutcomes) -> (ValidationStatus, Option<String>) {
        let band = Self::band(gates.score);
        let status = if gates.score >= 80 {
            ValidationStatus::Valid
        } else {
            ValidationStatus::Invalid
        };
        (status, Some(format!("Score band: {}", band)))
    }

    fn name(&self) -> &'static str {
        "weighted"
    }
}

/// Policy selected by the configuration.
pub fn policy_for(choice: PolicyChoice) -> Box<dyn ClassificationPolicy> {
    match choice {
        PolicyChoice::Strict => Box::new(StrictChain),
        PolicyChoice::Weighted => Box::new(WeightedScore),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_pass() -> GateOutcomes {
        GateOutcomes {
            syntax: true,
            dns: true,
            mx: true,
            smtp: true,
            mailbox: true,
            mailbox_applicable: true,
            score: 100,
        }
    }

    #[test]
    fn strict_requires_every_gate() {
        let policy = StrictChain;
        assert_eq!(policy.classify(&full_pass()).0, ValidationStatus::Valid);

        let mut gates = full_pass();
        gates.mailbox = false;
        assert_eq!(policy.classify(&gates).0, ValidationStatus::Invalid);
    }

    #[test]
    fn strict_skips_mailbox_gate_for_domain_records() {
        let mut gates = full_pass();
        gates.mailbox = false;
        gates.mailbox_applicable = false;
        assert_eq!(StrictChain.classify(&gates).0, ValidationStatus::Valid);
    }

    #[test]
    fn weighted_bands_follow_the_score() {
        let policy = WeightedScore;
        let mut gates = full_pass();

        gates.score = 100;
        let (status, detail) = policy.classify(&gates);
        assert_eq!(status, ValidationStatus::Valid);
        assert_eq!(detail.as_deref(), Some("Score band: VALID"));

        // A mailbox failure at score 80 still clears the weighted bar.
        gates.mailbox = false;
        gates.score = 80;
        assert_eq!(policy.classify(&gates).0, ValidationStatus::Valid);

        gates.score = 60;
        let (status, detail) = policy.classify(&gates);
        assert_eq!(status, ValidationStatus::Invalid);
        assert_eq!(detail.as_deref(), Some("Score band: PROBABLY_VALID"));

        gates.score = 40;
        assert_eq!(
            policy.classify(&gates).1.as_deref(),
            Some("Score band: PROBABLY_INVALID")
        );

        gates.score = 20;
        assert_eq!(policy.classify(&gates).1.as_deref(), Some("Score band: INVALID"));
    }
}
