//! The spreadsheet's own "Capacity Summary" tab.
//!
//! Two columns, label then value. Values come back formatted ("$12,000.00",
//! "42.5%"), so known labels are parsed back into numbers.

use serde::Serialize;

use crate::error::CapacityError;
use crate::sheets::CapacitySheets;
use crate::util::parse_number;

const INTEGER_KEYS: &[&str] = &["Total Sales Reps", "Total Projects", "International Projects"];
const AMOUNT_KEYS: &[&str] = &["Total Sales", "Average Sales per Rep", "Top Performer Sales"];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SummaryValue {
    Integer(i64),
    Amount(f64),
    Percentage(f64),
    Text(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CapacitySummarySheet {
    pub entries: Vec<(String, SummaryValue)>,
}

impl CapacitySummarySheet {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&SummaryValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

/// Parse label/value rows. Rows missing either cell are skipped; numbers
/// that fail to parse read as 0.
pub fn parse_summary_rows(rows: &[Vec<String>]) -> CapacitySummarySheet {
    let entries = rows
        .iter()
        .filter_map(|row| {
            let key = row.first()?.trim();
            let raw = row.get(1)?.trim();
            if key.is_empty() || raw.is_empty() {
                return None;
            }

            let value = if INTEGER_KEYS.contains(&key) {
                SummaryValue::Integer(parse_number(raw).map(|v| v as i64).unwrap_or(0))
            } else if AMOUNT_KEYS.contains(&key) {
                SummaryValue::Amount(parse_number(raw).unwrap_or(0.0))
            } else if key.contains("Percentage") {
                SummaryValue::Percentage(parse_number(raw).unwrap_or(0.0))
            } else {
                SummaryValue::Text(raw.to_string())
            };
            Some((key.to_string(), value))
        })
        .collect();

    CapacitySummarySheet { entries }
}

pub async fn load_summary_sheet(
    sheets: &CapacitySheets,
) -> Result<CapacitySummarySheet, CapacityError> {
    let rows = sheets
        .read_range(&sheets.sheet_names().summary, None)
        .await?;
    Ok(parse_summary_rows(&rows))
}
