//! In-process `RangeStore`.
//!
//! Each sheet is a grid of strings keyed by sheet name. Reads return the whole
//! sheet and writes overlay from the top-left. Clears honor only the starting
//! row of an A1 range ("A3:D" drops row 3 onward); no range clears the sheet.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{RangeSpec, RangeStore, Rows, UpdateResponse};
use crate::google_api::GoogleApiError;

#[derive(Default)]
pub struct MemoryRangeStore {
    sheets: Mutex<HashMap<String, Rows>>,
    /// When set, every call fails with this HTTP status.
    failing_status: Mutex<Option<u16>>,
    /// When set, only `update` fails with this HTTP status.
    failing_update_status: Mutex<Option<u16>>,
}

impl MemoryRangeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a sheet with rows.
    pub fn with_sheet(self, sheet: &str, rows: Rows) -> Self {
        self.sheets.lock().insert(sheet.to_string(), rows);
        self
    }

    /// Make every subsequent call fail as if the API returned `status`.
    pub fn fail_with(&self, status: u16) {
        *self.failing_status.lock() = Some(status);
    }

    /// Make `update` fail while reads and clears keep working.
    pub fn fail_updates_with(&self, status: u16) {
        *self.failing_update_status.lock() = Some(status);
    }

    /// Snapshot of a sheet's current contents.
    pub fn sheet_rows(&self, sheet: &str) -> Rows {
        self.sheets.lock().get(sheet).cloned().unwrap_or_default()
    }

    fn check_failure(&self) -> Result<(), GoogleApiError> {
        simulated(*self.failing_status.lock())
    }
}

fn simulated(status: Option<u16>) -> Result<(), GoogleApiError> {
    match status {
        Some(status) => Err(GoogleApiError::ApiError {
            status,
            message: "simulated failure".to_string(),
        }),
        None => Ok(()),
    }
}

/// First row number of an A1 range: "A3:D" → 3, "B12" → 12.
fn start_row(cells: &str) -> Option<usize> {
    let start = cells.split(':').next()?;
    let digits: String = start
        .trim_start_matches(|c: char| c.is_ascii_alphabetic())
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok().filter(|row| *row >= 1)
}

#[async_trait]
impl RangeStore for MemoryRangeStore {
    async fn get(&self, _spreadsheet_id: &str, range: &RangeSpec) -> Result<Rows, GoogleApiError> {
        self.check_failure()?;
        let sheets = self.sheets.lock();
        match sheets.get(&range.sheet) {
            Some(rows) => Ok(rows.clone()),
            None => Err(GoogleApiError::ApiError {
                status: 400,
                message: format!("Unable to parse range: {}", range),
            }),
        }
    }

    async fn update(
        &self,
        _spreadsheet_id: &str,
        range: &RangeSpec,
        rows: &[Vec<String>],
    ) -> Result<UpdateResponse, GoogleApiError> {
        self.check_failure()?;
        simulated(*self.failing_update_status.lock())?;
        let mut sheets = self.sheets.lock();
        let grid = sheets.entry(range.sheet.clone()).or_default();

        let mut updated_cells = 0u64;
        for (i, row) in rows.iter().enumerate() {
            if grid.len() <= i {
                grid.push(Vec::new());
            }
            let target = &mut grid[i];
            for (j, cell) in row.iter().enumerate() {
                if target.len() <= j {
                    target.resize(j + 1, String::new());
                }
                target[j] = cell.clone();
                updated_cells += 1;
            }
        }
        Ok(UpdateResponse { updated_cells })
    }

    async fn clear(&self, _spreadsheet_id: &str, range: &RangeSpec) -> Result<(), GoogleApiError> {
        self.check_failure()?;
        let mut sheets = self.sheets.lock();
        match range.cells.as_deref().and_then(start_row) {
            Some(row) => {
                if let Some(grid) = sheets.get_mut(&range.sheet) {
                    grid.truncate(row - 1);
                }
            }
            None => {
                sheets.insert(range.sheet.clone(), Vec::new());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[tokio::test]
    async fn test_update_overlays_from_top_left() {
        let store = MemoryRangeStore::new().with_sheet(
            "Matrix",
            vec![row(&["Role", "Keywords"]), row(&["Old", "x"]), row(&["Stale", "y"])],
        );

        let result = store
            .update(
                "id",
                &RangeSpec::sheet("Matrix"),
                &[row(&["Role", "Keywords", "Min"]), row(&["New", "z"])],
            )
            .await
            .unwrap();

        assert_eq!(result.updated_cells, 5);
        let rows = store.sheet_rows("Matrix");
        assert_eq!(rows[0], row(&["Role", "Keywords", "Min"]));
        assert_eq!(rows[1], row(&["New", "z"]));
        assert_eq!(rows[2], row(&["Stale", "y"]));
    }

    #[tokio::test]
    async fn test_unknown_sheet_is_range_error() {
        let store = MemoryRangeStore::new();
        let err = store.get("id", &RangeSpec::sheet("Nope")).await.unwrap_err();
        assert!(matches!(err, GoogleApiError::ApiError { status: 400, .. }));
    }

    #[tokio::test]
    async fn test_fail_with_applies_to_all_calls() {
        let store = MemoryRangeStore::new().with_sheet("Matrix", vec![]);
        store.fail_with(503);
        assert!(store.get("id", &RangeSpec::sheet("Matrix")).await.is_err());
        assert!(store.clear("id", &RangeSpec::sheet("Matrix")).await.is_err());
    }

    #[tokio::test]
    async fn test_clear_from_start_row_keeps_rows_above() {
        let store = MemoryRangeStore::new().with_sheet(
            "Matrix",
            vec![row(&["Role"]), row(&["Admin"]), row(&["Stale"]), row(&["Stale"])],
        );
        store
            .clear("id", &RangeSpec::new("Matrix", Some("A3:D")))
            .await
            .unwrap();
        assert_eq!(store.sheet_rows("Matrix"), vec![row(&["Role"]), row(&["Admin"])]);

        store.clear("id", &RangeSpec::sheet("Matrix")).await.unwrap();
        assert!(store.sheet_rows("Matrix").is_empty());
    }

    #[tokio::test]
    async fn test_fail_updates_with_leaves_reads_and_clears() {
        let store = MemoryRangeStore::new().with_sheet("Matrix", vec![row(&["Role"])]);
        store.fail_updates_with(503);

        let err = store
            .update("id", &RangeSpec::sheet("Matrix"), &[row(&["New"])])
            .await
            .unwrap_err();
        assert!(matches!(err, GoogleApiError::ApiError { status: 503, .. }));
        assert_eq!(store.sheet_rows("Matrix"), vec![row(&["Role"])]);
        assert!(store.get("id", &RangeSpec::sheet("Matrix")).await.is_ok());
    }

    #[test]
    fn test_start_row() {
        assert_eq!(start_row("A3:D"), Some(3));
        assert_eq!(start_row("B12"), Some(12));
        assert_eq!(start_row("A:D"), None);
        assert_eq!(start_row("A0"), None);
    }
}
