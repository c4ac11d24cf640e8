//! Spreadsheet range access.
//!
//! The spreadsheet is treated as a key-value store of ranges: `get` returns
//! rows of cell strings, `update` overwrites a rectangle starting at the
//! range's top-left, `clear` blanks it.
//!
//! Modules:
//! - client: Sheets v4 REST implementation
//! - memory: in-process implementation for tests and dry runs
//! - session: authenticated/unauthenticated state guarding all range I/O

pub mod client;
pub mod memory;
pub mod session;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::google_api::GoogleApiError;

pub use client::SheetsClient;
pub use memory::MemoryRangeStore;
pub use session::{CapacitySheets, Session, SessionState};

/// Rows of cell values, top to bottom.
pub type Rows = Vec<Vec<String>>;

/// `"<sheet>"` or `"<sheet>!<A1 range>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeSpec {
    pub sheet: String,
    pub cells: Option<String>,
}

impl RangeSpec {
    pub fn sheet(sheet: &str) -> Self {
        Self {
            sheet: sheet.to_string(),
            cells: None,
        }
    }

    pub fn new(sheet: &str, cells: Option<&str>) -> Self {
        Self {
            sheet: sheet.to_string(),
            cells: cells.filter(|c| !c.trim().is_empty()).map(str::to_string),
        }
    }
}

impl fmt::Display for RangeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cells {
            Some(cells) => write!(f, "{}!{}", self.sheet, cells),
            None => write!(f, "{}", self.sheet),
        }
    }
}

/// Outcome of an `update` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateResponse {
    pub updated_cells: u64,
}

/// Read/write access to spreadsheet ranges.
///
/// Written values are stored exactly as sent, with no formula or number parsing.
#[async_trait]
pub trait RangeStore: Send + Sync {
    async fn get(&self, spreadsheet_id: &str, range: &RangeSpec) -> Result<Rows, GoogleApiError>;

    async fn update(
        &self,
        spreadsheet_id: &str,
        range: &RangeSpec,
        rows: &[Vec<String>],
    ) -> Result<UpdateResponse, GoogleApiError>;

    async fn clear(&self, spreadsheet_id: &str, range: &RangeSpec) -> Result<(), GoogleApiError>;
}

/// A shared store, so callers can keep a handle on what a session writes.
#[async_trait]
impl<T: RangeStore + ?Sized> RangeStore for Arc<T> {
    async fn get(&self, spreadsheet_id: &str, range: &RangeSpec) -> Result<Rows, GoogleApiError> {
        (**self).get(spreadsheet_id, range).await
    }

    async fn update(
        &self,
        spreadsheet_id: &str,
        range: &RangeSpec,
        rows: &[Vec<String>],
    ) -> Result<UpdateResponse, GoogleApiError> {
        (**self).update(spreadsheet_id, range, rows).await
    }

    async fn clear(&self, spreadsheet_id: &str, range: &RangeSpec) -> Result<(), GoogleApiError> {
        (**self).clear(spreadsheet_id, range).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_spec_display() {
        assert_eq!(RangeSpec::sheet("Matrix").to_string(), "Matrix");
        assert_eq!(
            RangeSpec::new("Capacity Summary", Some("A1:B20")).to_string(),
            "Capacity Summary!A1:B20"
        );
        assert_eq!(RangeSpec::new("Matrix", Some("  ")).to_string(), "Matrix");
    }
}
