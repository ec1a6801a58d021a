//! Retail copy compliance for campaign headlines and subheads.
//!
//! Rules are checked in a fixed order; a call reports the first category
//! that matches. Word boundaries and digits are ASCII-only, so a keyword
//! next to an accented letter still counts as a separate word.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Category of prohibited copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CopyCategory {
    /// Prices, discounts and deals.
    Pricing,
    /// Call-to-action phrasing.
    CallToAction,
    /// Competitions and prizes.
    Competition,
    /// Green or environmental claims.
    Sustainability,
    /// Charity and donations.
    Charity,
    /// Terms and legal disclaimers.
    LegalDisclaimer,
    /// Guarantees and refunds.
    Guarantee,
    /// Superlatives, evidence claims and asterisks.
    Claims,
    /// Urgency and pressure.
    Urgency,
}

/// A copy rule violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CopyViolation {
    /// Matched category.
    pub category: CopyCategory,
    /// Message shown to the user.
    pub message: &'static str,
}

struct CopyRule {
    category: CopyCategory,
    pattern: Regex,
    message: &'static str,
}

const RULE_TABLE: [(CopyCategory, &str, &str); 9] = [
    (
        CopyCategory::Pricing,
        r"(?i)£|\$|(?-u:\b)[0-9]+(\.[0-9]+)?\s?(off|save|saving|discount|deal|offer|only|now|was|from)(?-u:\b)",
        "Price, discount, or deal references are not allowed in headline or subhead.",
    ),
    (
        CopyCategory::CallToAction,
        r"(?i)(?-u:\b)(shop now|buy now|order now|try now|get now|learn more|find out|discover|explore|click|tap|swipe|sign up|register)(?-u:\b)",
        "Call-to-action language is not allowed in headline or subhead.",
    ),
    (
        CopyCategory::Competition,
        r"(?i)(?-u:\b)(win|competition|enter|chance|prize|giveaway|contest)(?-u:\b)",
        "Competition-related copy is not allowed.",
    ),
    (
        CopyCategory::Sustainability,
        r"(?i)(?-u:\b)(eco|green|sustainable|environment|planet|carbon|recyclable|organic|ethical)(?-u:\b)",
        "Sustainability or environmental claims are not allowed.",
    ),
    (
        CopyCategory::Charity,
        r"(?i)(?-u:\b)(charity|donate|donation|foundation|non-profit|ngo|support a cause)(?-u:\b)",
        "Charity or donation references are not allowed.",
    ),
    (
        CopyCategory::LegalDisclaimer,
        r"(?i)(?-u:\b)(terms apply|t&c|conditions apply|see website|see details|small print)(?-u:\b)",
        "T&Cs or legal disclaimers are not allowed in copy.",
    ),
    (
        CopyCategory::Guarantee,
        r"(?i)(?-u:\b)(money back|refund|guarantee|risk free|no risk)(?-u:\b)",
        "Guarantees or refund claims are not allowed.",
    ),
    (
        CopyCategory::Claims,
        r"(?i)\*|(?-u:\b)(proven|tested|survey|study|research|clinically|rated|award-winning|best|number one|#1)(?-u:\b)",
        "Claims, superlatives, asterisks, or evidence-based copy are not allowed.",
    ),
    (
        CopyCategory::Urgency,
        r"(?i)(?-u:\b)(hurry|limited time|don’t miss|last chance|today only|ending soon|while stocks last)(?-u:\b)",
        "Urgency or pressure-based language is not allowed.",
    ),
];

static RULES: LazyLock<Vec<CopyRule>> = LazyLock::new(|| {
    RULE_TABLE
        .iter()
        .map(|&(category, pattern, message)| CopyRule {
            category,
            // Patterns are constants covered by tests.
            pattern: Regex::new(pattern).expect("copy rule pattern is valid"),
            message,
        })
        .collect()
});

/// First rule `text` breaks, if any. Empty text is always compliant.
#[must_use]
pub fn check_copy(text: &str) -> Option<CopyViolation> {
    if text.is_empty() {
        return None;
    }
    RULES
        .iter()
        .find(|rule| rule.pattern.is_match(text))
        .map(|rule| CopyViolation {
            category: rule.category,
            message: rule.message,
        })
}

/// Every rule `text` breaks, in rule order.
#[must_use]
pub fn check_copy_all(text: &str) -> Vec<CopyViolation> {
    if text.is_empty() {
        return Vec::new();
    }
    RULES
        .iter()
        .filter(|rule| rule.pattern.is_match(text))
        .map(|rule| CopyViolation {
            category: rule.category,
            message: rule.message,
        })
        .collect()
}

/// Message of the first rule `text` breaks, or `None` when compliant.
#[must_use]
pub fn validate_copy(text: &str) -> Option<&'static str> {
    check_copy(text).map(|v| v.message)
}
