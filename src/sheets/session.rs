//! Authenticated access to the capacity spreadsheet.
//!
//! Every range operation goes through [`CapacitySheets::session`], so a read
//! or write before `authenticate` is a `NotAuthenticated` error rather than a
//! null handle. API failures past that point are logged and turned into
//! empty reads or `false` writes.

use super::{RangeSpec, RangeStore, Rows, SheetsClient};
use crate::config::{Config, SheetNames};
use crate::error::CapacityError;
use crate::google_api::Authenticator;

/// A live connection to a range store.
pub struct Session {
    store: Box<dyn RangeStore>,
}

pub enum SessionState {
    Unauthenticated,
    Authenticated(Session),
}

/// The capacity spreadsheet, addressed by ID, with its tab names.
pub struct CapacitySheets {
    spreadsheet_id: String,
    sheets: SheetNames,
    state: SessionState,
}

impl CapacitySheets {
    pub fn new(spreadsheet_id: &str, sheets: SheetNames) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.to_string(),
            sheets,
            state: SessionState::Unauthenticated,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.spreadsheet_id, config.sheets.clone())
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    pub fn sheet_names(&self) -> &SheetNames {
        &self.sheets
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::Authenticated(_))
    }

    /// Obtain an access token and open a Sheets API session.
    pub async fn authenticate(&mut self, auth: &Authenticator) -> Result<(), CapacityError> {
        let access_token = auth.authenticate().await?;
        self.connect(Box::new(SheetsClient::new(&access_token)));
        log::info!("Authenticated with Google Sheets");
        Ok(())
    }

    /// Open a session on an already-authorized store.
    pub fn connect(&mut self, store: Box<dyn RangeStore>) {
        self.state = SessionState::Authenticated(Session { store });
    }

    fn session(&self) -> Result<&Session, CapacityError> {
        match &self.state {
            SessionState::Authenticated(session) => Ok(session),
            SessionState::Unauthenticated => Err(CapacityError::NotAuthenticated),
        }
    }

    /// Read a sheet (optionally an A1 sub-range). API failures read as no rows.
    pub async fn read_range(&self, sheet: &str, cells: Option<&str>) -> Result<Rows, CapacityError> {
        let session = self.session()?;
        let range = RangeSpec::new(sheet, cells);
        match session.store.get(&self.spreadsheet_id, &range).await {
            Ok(rows) => Ok(rows),
            Err(source) => {
                let err = CapacityError::RangeAccess {
                    range: range.to_string(),
                    source,
                };
                log::warn!("Error reading sheet {}: {}", sheet, err);
                Ok(Vec::new())
            }
        }
    }

    /// Write rows starting at the range's top-left, values stored as-is.
    pub async fn write_range(
        &self,
        sheet: &str,
        rows: &[Vec<String>],
        cells: Option<&str>,
    ) -> Result<bool, CapacityError> {
        let session = self.session()?;
        let range = RangeSpec::new(sheet, cells);
        match session.store.update(&self.spreadsheet_id, &range, rows).await {
            Ok(result) => {
                log::info!("Updated {} cells in {}", result.updated_cells, range);
                Ok(true)
            }
            Err(source) => {
                let err = CapacityError::RangeAccess {
                    range: range.to_string(),
                    source,
                };
                log::warn!("Error writing to sheet {}: {}", sheet, err);
                Ok(false)
            }
        }
    }

    /// Blank a sheet (optionally an A1 sub-range).
    pub async fn clear_range(&self, sheet: &str, cells: Option<&str>) -> Result<bool, CapacityError> {
        let session = self.session()?;
        let range = RangeSpec::new(sheet, cells);
        match session.store.clear(&self.spreadsheet_id, &range).await {
            Ok(()) => Ok(true),
            Err(source) => {
                let err = CapacityError::RangeAccess {
                    range: range.to_string(),
                    source,
                };
                log::warn!("Error clearing sheet {}: {}", sheet, err);
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheets::MemoryRangeStore;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn connected(store: MemoryRangeStore) -> CapacitySheets {
        let mut sheets = CapacitySheets::new("sheet-1", SheetNames::default());
        sheets.connect(Box::new(store));
        sheets
    }

    #[tokio::test]
    async fn test_read_before_authenticate_is_error() {
        let sheets = CapacitySheets::new("sheet-1", SheetNames::default());
        assert!(!sheets.is_authenticated());
        let err = sheets.read_range("Sheet1", None).await.unwrap_err();
        assert!(matches!(err, CapacityError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_write_before_authenticate_is_error() {
        let sheets = CapacitySheets::new("sheet-1", SheetNames::default());
        let err = sheets
            .write_range("Sheet1", &[row(&["a"])], None)
            .await
            .unwrap_err();
        assert!(matches!(err, CapacityError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_read_success() {
        let store = MemoryRangeStore::new().with_sheet(
            "Sheet1",
            vec![row(&["Header1", "Header2"]), row(&["Value1", "Value2"])],
        );
        let sheets = connected(store);
        assert!(sheets.is_authenticated());

        let rows = sheets.read_range("Sheet1", None).await.unwrap();
        assert_eq!(rows, vec![row(&["Header1", "Header2"]), row(&["Value1", "Value2"])]);
    }

    #[tokio::test]
    async fn test_read_api_error_is_empty() {
        let store = MemoryRangeStore::new().with_sheet("Sheet1", vec![row(&["x"])]);
        store.fail_with(500);
        let sheets = connected(store);

        assert!(sheets.read_range("Sheet1", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_success_and_failure() {
        let sheets = connected(MemoryRangeStore::new());
        assert!(sheets
            .write_range("Sheet1", &[row(&["Header1"]), row(&["Value1"])], Some("A1"))
            .await
            .unwrap());

        let failing = MemoryRangeStore::new();
        failing.fail_with(403);
        let sheets = connected(failing);
        assert!(!sheets
            .write_range("Sheet1", &[row(&["Header1"])], None)
            .await
            .unwrap());
        assert!(!sheets.clear_range("Sheet1", None).await.unwrap());
    }
}
