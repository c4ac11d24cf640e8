//! Matrix criteria: role-classification rules with sales bands.
//!
//! A `RuleSet` is ordered; position is priority. The last rule doubles as
//! the catch-all bucket for descriptions no rule matches.

pub mod classifier;
pub mod repository;

use serde::Serialize;

use crate::error::CapacityError;

pub use classifier::{classify, classify_records};
pub use repository::CriteriaRepository;

/// Lower sales bound when the sheet leaves it blank.
pub const DEFAULT_MIN_SALES: f64 = 0.0;
/// Upper sales bound when the sheet leaves it blank. A finite sentinel so
/// band checks never compare against infinity or NaN.
pub const DEFAULT_MAX_SALES: f64 = 999_999_999.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionRule {
    pub role: String,
    pub keywords: Vec<String>,
    pub min_sales: f64,
    pub max_sales: f64,
}

impl CriterionRule {
    /// Build a rule, enforcing a non-empty role, at least one keyword and
    /// `min_sales <= max_sales`.
    pub fn new(
        role: &str,
        keywords: Vec<String>,
        min_sales: f64,
        max_sales: f64,
    ) -> Result<Self, CapacityError> {
        let role = role.trim();
        if role.is_empty() {
            return Err(CapacityError::MalformedCriteria(
                "rule has an empty role".to_string(),
            ));
        }
        let keywords: Vec<String> = keywords
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        if keywords.is_empty() {
            return Err(CapacityError::MalformedCriteria(format!(
                "rule '{}' has no keywords",
                role
            )));
        }
        // Keywords share one comma-separated sheet cell.
        if let Some(bad) = keywords.iter().find(|k| k.contains(',')) {
            return Err(CapacityError::MalformedCriteria(format!(
                "rule '{}' keyword '{}' contains a comma",
                role, bad
            )));
        }
        if min_sales.is_nan() || max_sales.is_nan() || min_sales > max_sales {
            return Err(CapacityError::MalformedCriteria(format!(
                "rule '{}' has min sales {} above max sales {}",
                role, min_sales, max_sales
            )));
        }
        Ok(Self {
            role: role.to_string(),
            keywords,
            min_sales,
            max_sales,
        })
    }

    /// True when `amount` falls inside `[min_sales, max_sales]`.
    pub fn in_band(&self, amount: f64) -> bool {
        self.min_sales <= amount && amount <= self.max_sales
    }
}

/// Split a comma-separated keyword cell into trimmed, non-empty keywords.
pub fn parse_keywords(cell: &str) -> Vec<String> {
    cell.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

/// Ordered rules with unique roles.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RuleSet {
    rules: Vec<CriterionRule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule. A rule for an existing role replaces that rule in place,
    /// so the role keeps its original priority.
    pub fn insert(&mut self, rule: CriterionRule) {
        match self.rules.iter_mut().find(|r| r.role == rule.role) {
            Some(existing) => {
                log::warn!("Duplicate matrix role '{}'; later row wins", rule.role);
                *existing = rule;
            }
            None => self.rules.push(rule),
        }
    }

    pub fn rules(&self) -> &[CriterionRule] {
        &self.rules
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CriterionRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, role: &str) -> Option<&CriterionRule> {
        self.rules.iter().find(|r| r.role == role)
    }

    /// The catch-all rule.
    pub fn fallback(&self) -> Option<&CriterionRule> {
        self.rules.last()
    }
}

impl FromIterator<CriterionRule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = CriterionRule>>(iter: I) -> Self {
        let mut set = RuleSet::new();
        for rule in iter {
            set.insert(rule);
        }
        set
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a CriterionRule;
    type IntoIter = std::slice::Iter<'a, CriterionRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

/// A project awaiting classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    pub description: String,
    pub sales_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedRecord {
    #[serde(flatten)]
    pub record: ProjectRecord,
    pub assigned_role: String,
}
