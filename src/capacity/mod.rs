//! Capacity model rows: one sales rep per row with per-role project counts.
//!
//! Modules:
//! - insights: aggregate statistics over the rows
//! - summary_sheet: the spreadsheet's own "Capacity Summary" tab

pub mod insights;
pub mod summary_sheet;

use std::collections::HashMap;

use serde::Serialize;

use crate::error::CapacityError;
use crate::sheets::{CapacitySheets, Rows};
use crate::util::parse_number;

pub use insights::{summarize, InsightsSummary};
pub use summary_sheet::{CapacitySummarySheet, SummaryValue};

pub const FIRST_NAME_COLUMN: &str = "Sales Rep First";
pub const LAST_NAME_COLUMN: &str = "Sales Rep Last";
pub const SALES_COLUMN: &str = "Sales ($)";
pub const INTERNATIONAL_COLUMN: &str = "Intl Project Count";

/// Role count columns in declared order. Role name = header minus " Count".
pub const ROLE_COLUMNS: [&str; 4] = [
    "Admin Count",
    "Prod Spec Count",
    "Sr. Prod Count",
    "Team Lead Count",
];

const COUNT_SUFFIX: &str = " Count";

/// Role name for a count column header ("Team Lead Count" → "Team Lead").
pub fn role_from_header(header: &str) -> &str {
    header.strip_suffix(COUNT_SUFFIX).unwrap_or(header)
}

/// Count column header for a role ("Team Lead" → "Team Lead Count").
pub fn header_for_role(role: &str) -> String {
    format!("{}{}", role, COUNT_SUFFIX)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleCount {
    pub role: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapacityRow {
    pub first_name: String,
    pub last_name: String,
    pub sales: f64,
    /// Ordered as the table's role columns.
    pub role_counts: Vec<RoleCount>,
    pub international_projects: u64,
}

impl CapacityRow {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn count(&self, role: &str) -> u64 {
        self.role_counts
            .iter()
            .find(|rc| rc.role == role)
            .map(|rc| rc.count)
            .unwrap_or(0)
    }
}

/// Parsed capacity tab: role columns plus one row per rep.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CapacityTable {
    /// Declared roles first, then any extra "<Role> Count" columns in sheet order.
    pub roles: Vec<String>,
    pub rows: Vec<CapacityRow>,
}

impl CapacityTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Parse the capacity tab. Row 0 is the header; columns are found by name.
///
/// Missing or unparsable numbers read as 0, negative counts clamp to 0, and
/// fully blank rows are dropped.
pub fn parse_capacity_rows(rows: &[Vec<String>]) -> CapacityTable {
    let Some((header, body)) = rows.split_first() else {
        return CapacityTable::default();
    };

    let index: HashMap<&str, usize> = header
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim(), i))
        .collect();

    let mut role_headers: Vec<String> = ROLE_COLUMNS.iter().map(|h| h.to_string()).collect();
    for h in header.iter().map(|h| h.trim()) {
        if h.ends_with(COUNT_SUFFIX)
            && h != INTERNATIONAL_COLUMN
            && !role_headers.iter().any(|known| known == h)
        {
            role_headers.push(h.to_string());
        }
    }

    let cell = |row: &[String], column: &str| -> String {
        index
            .get(column)
            .and_then(|&i| row.get(i))
            .map(|c| c.trim().to_string())
            .unwrap_or_default()
    };
    let count = |row: &[String], column: &str| -> u64 {
        let value = parse_number(&cell(row, column)).unwrap_or(0.0);
        if value < 0.0 {
            log::warn!("Negative '{}' value {} clamped to 0", column, value);
            return 0;
        }
        value.round() as u64
    };

    let parsed = body
        .iter()
        .filter(|row| row.iter().any(|c| !c.trim().is_empty()))
        .map(|row| CapacityRow {
            first_name: cell(row, FIRST_NAME_COLUMN),
            last_name: cell(row, LAST_NAME_COLUMN),
            sales: parse_number(&cell(row, SALES_COLUMN)).unwrap_or(0.0),
            role_counts: role_headers
                .iter()
                .map(|h| RoleCount {
                    role: role_from_header(h).to_string(),
                    count: count(row, h),
                })
                .collect(),
            international_projects: count(row, INTERNATIONAL_COLUMN),
        })
        .collect();

    CapacityTable {
        roles: role_headers
            .iter()
            .map(|h| role_from_header(h).to_string())
            .collect(),
        rows: parsed,
    }
}

/// Raw table with a header row, for tabs without a fixed schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SheetTable {
    pub headers: Vec<String>,
    pub rows: Rows,
}

impl SheetTable {
    pub fn from_rows(rows: Rows) -> Self {
        let mut iter = rows.into_iter();
        match iter.next() {
            Some(headers) => Self {
                headers,
                rows: iter.collect(),
            },
            None => Self::default(),
        }
    }
}

/// Read and parse the capacity projection tab.
pub async fn load_capacity_table(sheets: &CapacitySheets) -> Result<CapacityTable, CapacityError> {
    let rows = sheets
        .read_range(&sheets.sheet_names().capacity, None)
        .await?;
    Ok(parse_capacity_rows(&rows))
}

/// Read the raw sales tab the projection is generated from.
pub async fn load_sales_table(sheets: &CapacitySheets) -> Result<SheetTable, CapacityError> {
    let rows = sheets.read_range(&sheets.sheet_names().sales, None).await?;
    Ok(SheetTable::from_rows(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_parse_partial_header() {
        let table = parse_capacity_rows(&[
            row(&["Sales Rep First", "Sales Rep Last", "Sales ($)", "Admin Count"]),
            row(&["John", "Doe", "1000", "2"]),
            row(&["Jane", "Smith", "2000", "1"]),
        ]);

        assert_eq!(table.len(), 2);
        assert_eq!(table.roles, vec!["Admin", "Prod Spec", "Sr. Prod", "Team Lead"]);
        assert_eq!(table.rows[0].full_name(), "John Doe");
        assert_eq!(table.rows[1].sales, 2000.0);
        assert_eq!(table.rows[0].count("Admin"), 2);
        assert_eq!(table.rows[0].count("Team Lead"), 0);
    }

    #[test]
    fn test_parse_coerces_bad_numbers() {
        let table = parse_capacity_rows(&[
            row(&["Sales Rep First", "Sales ($)", "Admin Count", "Intl Project Count"]),
            row(&["Ana", "$12,500.50", "-3", "two"]),
            row(&["Bo", "", "1.6", "1"]),
        ]);

        assert_eq!(table.rows[0].sales, 12_500.5);
        assert_eq!(table.rows[0].count("Admin"), 0);
        assert_eq!(table.rows[0].international_projects, 0);
        assert_eq!(table.rows[1].sales, 0.0);
        assert_eq!(table.rows[1].count("Admin"), 2);
        assert_eq!(table.rows[1].international_projects, 1);
    }

    #[test]
    fn test_parse_extra_role_columns_follow_declared() {
        let table = parse_capacity_rows(&[
            row(&[
                "Sales Rep First",
                "Warehouse Count",
                "Admin Count",
                "Intl Project Count",
            ]),
            row(&["Ana", "4", "1", "2"]),
        ]);

        assert_eq!(
            table.roles,
            vec!["Admin", "Prod Spec", "Sr. Prod", "Team Lead", "Warehouse"]
        );
        assert_eq!(table.rows[0].count("Warehouse"), 4);
        assert_eq!(table.rows[0].international_projects, 2);
    }

    #[test]
    fn test_parse_skips_blank_rows_and_short_rows() {
        let table = parse_capacity_rows(&[
            row(&["Sales Rep First", "Sales Rep Last", "Sales ($)"]),
            row(&["", " ", ""]),
            row(&["Solo"]),
        ]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].full_name(), "Solo");
        assert_eq!(table.rows[0].sales, 0.0);
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse_capacity_rows(&[]).is_empty());
        assert!(parse_capacity_rows(&[row(&["Sales Rep First"])]).is_empty());
    }

    #[test]
    fn test_role_header_mapping() {
        assert_eq!(role_from_header("Sr. Prod Count"), "Sr. Prod");
        assert_eq!(header_for_role("Sr. Prod"), "Sr. Prod Count");
        assert_eq!(role_from_header("Other"), "Other");
    }

    #[test]
    fn test_sheet_table_from_rows() {
        let table = SheetTable::from_rows(vec![row(&["Rep", "Project"]), row(&["Ana", "Admin"])]);
        assert_eq!(table.headers, vec!["Rep", "Project"]);
        assert_eq!(table.rows.len(), 1);
        assert!(SheetTable::from_rows(Vec::new()).headers.is_empty());
    }
}
