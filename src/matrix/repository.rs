//! Load and save the matrix criteria table.
//!
//! Sheet layout (header row first):
//!
//! | Role | Keywords | Min Sales ($) | Max Sales ($) |
//!
//! Keywords are one comma-separated cell. Blank or unparsable band cells
//! fall back to `DEFAULT_MIN_SALES` / `DEFAULT_MAX_SALES`.

use std::path::Path;

use serde::Deserialize;

use super::{parse_keywords, CriterionRule, RuleSet, DEFAULT_MAX_SALES, DEFAULT_MIN_SALES};
use crate::error::CapacityError;
use crate::sheets::{CapacitySheets, Rows};
use crate::util::{format_number, parse_number};

pub const CRITERIA_HEADER: [&str; 4] = ["Role", "Keywords", "Min Sales ($)", "Max Sales ($)"];

/// Criteria table stored in the spreadsheet's matrix tab.
pub struct CriteriaRepository<'a> {
    sheets: &'a CapacitySheets,
}

impl<'a> CriteriaRepository<'a> {
    pub fn new(sheets: &'a CapacitySheets) -> Self {
        Self { sheets }
    }

    /// Read the current rules. Always hits the sheet so live edits apply.
    pub async fn load(&self) -> Result<RuleSet, CapacityError> {
        let sheet = &self.sheets.sheet_names().matrix;
        let rows = self.sheets.read_range(sheet, None).await?;
        let rules = rules_from_rows(&rows);
        log::info!("Loaded {} matrix rules from {}", rules.len(), sheet);
        Ok(rules)
    }

    /// Replace the criteria table with `rules`, header first, in rule order.
    ///
    /// The new table is written over the old one before anything is cleared,
    /// so a rejected write leaves the previous criteria intact. Rows left over
    /// from a longer table are cleared afterwards.
    pub async fn save(&self, rules: &RuleSet) -> Result<bool, CapacityError> {
        let sheet = &self.sheets.sheet_names().matrix;
        let rows = rows_from_rules(rules);
        if !self.sheets.write_range(sheet, &rows, Some("A1")).await? {
            return Ok(false);
        }

        let leftover = format!("A{}:D", rows.len() + 1);
        if !self.sheets.clear_range(sheet, Some(&leftover)).await? {
            log::warn!("New criteria written but stale rows below remain in {}", sheet);
            return Ok(false);
        }
        Ok(true)
    }
}

/// Parse sheet rows into rules. Row 0 is the header.
///
/// Rows without a role and keywords are skipped silently; rows that break a
/// rule invariant are skipped with a warning.
pub fn rules_from_rows(rows: &[Vec<String>]) -> RuleSet {
    let mut rules = RuleSet::new();
    for (index, row) in rows.iter().enumerate().skip(1) {
        let role = row.first().map(|c| c.trim()).unwrap_or("");
        let keywords = row.get(1).map(|c| c.trim()).unwrap_or("");
        if role.is_empty() || keywords.is_empty() {
            continue;
        }

        let min_sales = row
            .get(2)
            .and_then(|c| parse_number(c))
            .unwrap_or(DEFAULT_MIN_SALES);
        let max_sales = row
            .get(3)
            .and_then(|c| parse_number(c))
            .unwrap_or(DEFAULT_MAX_SALES);

        match CriterionRule::new(role, parse_keywords(keywords), min_sales, max_sales) {
            Ok(rule) => rules.insert(rule),
            Err(e) => log::warn!("Skipping matrix row {}: {}", index + 1, e),
        }
    }
    rules
}

/// Serialize rules into the four-column sheet layout.
pub fn rows_from_rules(rules: &RuleSet) -> Rows {
    let mut rows: Rows = Vec::with_capacity(rules.len() + 1);
    rows.push(CRITERIA_HEADER.iter().map(|h| h.to_string()).collect());
    for rule in rules {
        rows.push(vec![
            rule.role.clone(),
            rule.keywords.join(", "),
            format_number(rule.min_sales),
            format_number(rule.max_sales),
        ]);
    }
    rows
}

// ============================================================================
// Criteria file (update-matrix)
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum KeywordsField {
    Joined(String),
    List(Vec<String>),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CriterionEntry {
    keywords: KeywordsField,
    #[serde(default)]
    min_sales: Option<serde_json::Value>,
    #[serde(default)]
    max_sales: Option<serde_json::Value>,
}

/// Parse a criteria file: `{ "<role>": { "keywords", "minSales", "maxSales" } }`.
///
/// Object order is rule order.
pub fn parse_criteria_json(text: &str) -> Result<RuleSet, CapacityError> {
    let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(text)?;

    let mut rules = RuleSet::new();
    for (role, value) in object {
        let entry: CriterionEntry = serde_json::from_value(value).map_err(|e| {
            CapacityError::MalformedCriteria(format!("role '{}': {}", role, e))
        })?;

        // The sheet stores keywords as one comma-joined cell, so list entries
        // are split the same way a cell would be.
        let keywords = match entry.keywords {
            KeywordsField::Joined(cell) => parse_keywords(&cell),
            KeywordsField::List(list) => list.iter().flat_map(|k| parse_keywords(k)).collect(),
        };
        let min_sales = band_value(&role, "minSales", entry.min_sales, DEFAULT_MIN_SALES)?;
        let max_sales = band_value(&role, "maxSales", entry.max_sales, DEFAULT_MAX_SALES)?;

        rules.insert(CriterionRule::new(&role, keywords, min_sales, max_sales)?);
    }
    Ok(rules)
}

impl RuleSet {
    pub fn from_criteria_json(text: &str) -> Result<Self, CapacityError> {
        parse_criteria_json(text)
    }
}

/// Read and parse a criteria file from disk.
pub fn load_criteria_file(path: &Path) -> Result<RuleSet, CapacityError> {
    if !path.exists() {
        return Err(CapacityError::FileNotFound(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path)?;
    RuleSet::from_criteria_json(&text)
}

fn band_value(
    role: &str,
    field: &str,
    value: Option<serde_json::Value>,
    default: f64,
) -> Result<f64, CapacityError> {
    match value {
        None | Some(serde_json::Value::Null) => Ok(default),
        Some(serde_json::Value::Number(n)) => n.as_f64().ok_or_else(|| {
            CapacityError::MalformedCriteria(format!("role '{}': {} out of range", role, field))
        }),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => Ok(default),
        Some(serde_json::Value::String(s)) => parse_number(&s).ok_or_else(|| {
            CapacityError::MalformedCriteria(format!(
                "role '{}': {} is not a number: {}",
                role, field, s
            ))
        }),
        Some(other) => Err(CapacityError::MalformedCriteria(format!(
            "role '{}': {} is not a number: {}",
            role, field, other
        ))),
    }
}
