//! Matrix classification: project description → role.
//!
//! Classification priority (first match wins):
//!   1. Rules in sheet order
//!   2. A rule matches when any keyword is a substring of the lowercased
//!      description AND the sales amount is inside the rule's band
//!   3. Keyword hit outside the band → skip, keep scanning
//!   4. Nothing matched → last rule's role
//!
//! Step 4 decides where every unmatched project is bucketed. It is not an
//! "unclassified" sentinel; changing it changes what the capacity numbers mean.

use super::{ClassifiedRecord, CriterionRule, ProjectRecord, RuleSet};
use crate::error::CapacityError;

/// Classify one description. `None` only for an empty rule set.
pub fn classify<'a>(description: &str, sales_amount: f64, rules: &'a RuleSet) -> Option<&'a str> {
    let normalized = description.to_lowercase();

    rules
        .iter()
        .find(|rule| matches_keywords(rule, &normalized) && rule.in_band(sales_amount))
        .or_else(|| rules.fallback())
        .map(|rule| rule.role.as_str())
}

/// Classify a batch against one rule set. An empty rule set is a
/// configuration error, not a batch of unclassified rows.
pub fn classify_records(
    records: &[ProjectRecord],
    rules: &RuleSet,
) -> Result<Vec<ClassifiedRecord>, CapacityError> {
    if rules.is_empty() {
        return Err(CapacityError::EmptyRuleSet);
    }

    Ok(records
        .iter()
        .filter_map(|record| {
            classify(&record.description, record.sales_amount, rules).map(|role| {
                ClassifiedRecord {
                    record: record.clone(),
                    assigned_role: role.to_string(),
                }
            })
        })
        .collect())
}

fn matches_keywords(rule: &CriterionRule, normalized: &str) -> bool {
    contains_any(normalized, &rule.keywords)
}

/// Check if a string contains any of the given keywords, case-insensitively.
fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles
        .iter()
        .map(|needle| needle.trim().to_lowercase())
        .any(|needle| !needle.is_empty() && haystack.contains(&needle))
}
