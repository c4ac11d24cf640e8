//! Command handlers for the `capacity` binary.
//!
//! Each handler prints its own progress and result lines and returns `Err`
//! for anything the caller should report as a failed command.

use std::path::{Path, PathBuf};

use crate::capacity::{self, summary_sheet};
use crate::cli::{Cli, Commands};
use crate::config::{load_config, Config};
use crate::error::CapacityError;
use crate::google_api::{Authenticator, FileCredentialStore};
use crate::matrix::{classify, repository, CriteriaRepository};
use crate::report;
use crate::sheets::CapacitySheets;
use crate::webhook;

/// Rows shown by `generate`.
const PREVIEW_ROWS: usize = 5;

pub async fn run(cli: Cli) -> Result<(), CapacityError> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Auth { reset } => {
            let config = load_config(config_path)?;
            if reset {
                authenticator(&config).sign_out()?;
                println!("Cleared cached token at {}", config.token_path.display());
            }
            println!("Authenticating with Google Sheets...");
            connect(&config).await?;
            println!("✅ Authentication successful!");
            Ok(())
        }
        Commands::Generate => {
            let sheets = connect(&load_config(config_path)?).await?;
            generate(&sheets).await
        }
        Commands::Export { output } => {
            let sheets = connect(&load_config(config_path)?).await?;
            let path = output.unwrap_or_else(|| PathBuf::from(report::default_export_filename()));
            export(&sheets, &path).await
        }
        Commands::Insights => {
            let sheets = connect(&load_config(config_path)?).await?;
            insights(&sheets).await
        }
        Commands::Matrix { description, sales } => {
            let sheets = connect(&load_config(config_path)?).await?;
            match description {
                Some(description) => {
                    classify_project(&sheets, &description, sales.unwrap_or(0.0)).await
                }
                None => show_matrix(&sheets).await,
            }
        }
        Commands::UpdateMatrix { criteria } => {
            let sheets = connect(&load_config(config_path)?).await?;
            update_matrix(&sheets, &criteria).await
        }
        Commands::Trigger { webhook_url } => {
            let url = match webhook_url {
                Some(url) => url,
                None => load_config(config_path)?.webhook_url.ok_or_else(|| {
                    CapacityError::Config(
                        "Please provide webhook URL with --webhook-url".to_string(),
                    )
                })?,
            };
            trigger(&url).await
        }
    }
}

pub fn authenticator(config: &Config) -> Authenticator {
    Authenticator::new(
        config.credentials_path.clone(),
        Box::new(FileCredentialStore::new(config.token_path.clone())),
    )
}

/// Build an authenticated session from config.
pub async fn connect(config: &Config) -> Result<CapacitySheets, CapacityError> {
    let mut sheets = CapacitySheets::from_config(config);
    sheets.authenticate(&authenticator(config)).await?;
    Ok(sheets)
}

pub async fn generate(sheets: &CapacitySheets) -> Result<(), CapacityError> {
    println!("Generating capacity model...");
    let table = capacity::load_capacity_table(sheets).await?;

    if table.is_empty() {
        let sales = capacity::load_sales_table(sheets).await?;
        println!("⚠️  No capacity model data found. Run the Apps Script in Google Sheets first.");
        if !sales.rows.is_empty() {
            println!(
                "   '{}' has {} sales rows ready; 'capacity trigger' regenerates the projection.",
                sheets.sheet_names().sales,
                sales.rows.len()
            );
        }
        return Ok(());
    }

    println!("✅ Capacity model data retrieved: {} sales reps", table.len());
    print!("{}", report::render_preview(&table, PREVIEW_ROWS));
    Ok(())
}

pub async fn export(sheets: &CapacitySheets, path: &Path) -> Result<(), CapacityError> {
    println!("Exporting capacity model...");
    let table = capacity::load_capacity_table(sheets).await?;
    if table.is_empty() {
        return Err(CapacityError::NoData(format!(
            "'{}' is empty, nothing to export",
            sheets.sheet_names().capacity
        )));
    }

    report::export_csv(path, &table)?;
    println!("✅ Exported to: {}", path.display());
    Ok(())
}

pub async fn insights(sheets: &CapacitySheets) -> Result<(), CapacityError> {
    println!("Generating insights...");
    let table = capacity::load_capacity_table(sheets).await?;
    let summary = capacity::summarize(&table.rows).ok_or_else(|| {
        CapacityError::NoData("No insights available. Generate capacity model first.".to_string())
    })?;
    print!("{}", report::render_insights(&summary));

    let sheet_summary = summary_sheet::load_summary_sheet(sheets).await?;
    if !sheet_summary.is_empty() {
        print!("{}", report::render_summary_sheet(&sheet_summary));
    }
    Ok(())
}

pub async fn show_matrix(sheets: &CapacitySheets) -> Result<(), CapacityError> {
    println!("Retrieving matrix criteria...");
    let rules = CriteriaRepository::new(sheets).load().await?;
    if rules.is_empty() {
        return Err(CapacityError::NoData("No matrix criteria found.".to_string()));
    }
    print!("{}", report::render_criteria(&rules));
    Ok(())
}

pub async fn classify_project(
    sheets: &CapacitySheets,
    description: &str,
    sales: f64,
) -> Result<(), CapacityError> {
    let rules = CriteriaRepository::new(sheets).load().await?;
    let role = classify(description, sales, &rules).ok_or(CapacityError::EmptyRuleSet)?;
    println!("✅ {}", role);
    Ok(())
}

pub async fn update_matrix(sheets: &CapacitySheets, criteria: &Path) -> Result<(), CapacityError> {
    println!("Updating matrix criteria...");
    let rules = repository::load_criteria_file(criteria)?;
    if rules.is_empty() {
        return Err(CapacityError::EmptyRuleSet);
    }

    if !CriteriaRepository::new(sheets).save(&rules).await? {
        return Err(CapacityError::UpdateFailed(
            "Failed to update matrix criteria".to_string(),
        ));
    }
    println!("✅ Matrix criteria updated successfully! ({} rules)", rules.len());
    Ok(())
}

pub async fn trigger(url: &str) -> Result<(), CapacityError> {
    println!("Triggering capacity model generation...");
    if !webhook::trigger(url).await {
        return Err(CapacityError::Webhook(
            "Failed to trigger capacity model generation".to_string(),
        ));
    }
    println!("✅ Capacity model generation triggered successfully!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::SheetNames;
    use crate::sheets::MemoryRangeStore;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn capacity_rows() -> Vec<Vec<String>> {
        vec![
            row(&["Sales Rep First", "Sales Rep Last", "Sales ($)", "Admin Count"]),
            row(&["John", "Doe", "1000", "2"]),
            row(&["Jane", "Smith", "2000", "1"]),
        ]
    }

    fn connected(store: Arc<MemoryRangeStore>) -> CapacitySheets {
        let mut sheets = CapacitySheets::new("sheet-1", SheetNames::default());
        sheets.connect(Box::new(store));
        sheets
    }

    #[tokio::test]
    async fn test_generate_with_and_without_data() {
        let store = Arc::new(
            MemoryRangeStore::new().with_sheet("Capacity Rep Projection", capacity_rows()),
        );
        generate(&connected(store)).await.unwrap();

        let empty = Arc::new(
            MemoryRangeStore::new().with_sheet("Sheet1", vec![row(&["Rep"]), row(&["Ana"])]),
        );
        generate(&connected(empty)).await.unwrap();
    }

    #[tokio::test]
    async fn test_export_writes_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.csv");
        let store = Arc::new(
            MemoryRangeStore::new().with_sheet("Capacity Rep Projection", capacity_rows()),
        );

        export(&connected(store), &path).await.unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("Jane,Smith,2000,1,0,0,0,0"));
    }

    #[tokio::test]
    async fn test_export_empty_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = export(&connected(Arc::new(MemoryRangeStore::new())), &dir.path().join("x.csv"))
            .await
            .unwrap_err();
        assert!(matches!(err, CapacityError::NoData(_)));
        assert!(!dir.path().join("x.csv").exists());
    }

    #[tokio::test]
    async fn test_insights_requires_rows() {
        let err = insights(&connected(Arc::new(MemoryRangeStore::new())))
            .await
            .unwrap_err();
        assert!(matches!(err, CapacityError::NoData(_)));

        let store = Arc::new(
            MemoryRangeStore::new()
                .with_sheet("Capacity Rep Projection", capacity_rows())
                .with_sheet("Capacity Summary", vec![row(&["Total Sales Reps", "2"])]),
        );
        insights(&connected(store)).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_matrix_then_classify() {
        let dir = tempfile::tempdir().unwrap();
        let criteria = dir.path().join("criteria.json");
        std::fs::write(
            &criteria,
            r#"{
                "Admin": { "keywords": "admin, management" },
                "Prod Spec": { "keywords": ["production", "assembly"], "minSales": 0, "maxSales": 50000 }
            }"#,
        )
        .unwrap();

        let store = Arc::new(MemoryRangeStore::new());
        let sheets = connected(store.clone());
        update_matrix(&sheets, &criteria).await.unwrap();

        let written = store.sheet_rows("Matrix");
        assert_eq!(written[0], row(&["Role", "Keywords", "Min Sales ($)", "Max Sales ($)"]));
        assert_eq!(written[1], row(&["Admin", "admin, management", "0", "999999999"]));
        assert_eq!(written[2], row(&["Prod Spec", "production, assembly", "0", "50000"]));

        show_matrix(&sheets).await.unwrap();
        classify_project(&sheets, "Admin management project", 100.0)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_matrix_rejects_empty_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let criteria = dir.path().join("criteria.json");
        std::fs::write(&criteria, "{}").unwrap();
        let sheets = connected(Arc::new(MemoryRangeStore::new()));

        let err = update_matrix(&sheets, &criteria).await.unwrap_err();
        assert!(matches!(err, CapacityError::EmptyRuleSet));

        let err = update_matrix(&sheets, &dir.path().join("missing.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, CapacityError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn test_update_matrix_write_failure() {
        let dir = tempfile::tempdir().unwrap();
        let criteria = dir.path().join("criteria.json");
        std::fs::write(&criteria, r#"{ "Admin": { "keywords": "admin" } }"#).unwrap();
        let store = Arc::new(MemoryRangeStore::new());
        store.fail_with(403);

        let err = update_matrix(&connected(store), &criteria)
            .await
            .unwrap_err();
        assert!(matches!(err, CapacityError::UpdateFailed(_)));
    }

    #[tokio::test]
    async fn test_classify_without_rules_is_error() {
        let sheets = connected(Arc::new(MemoryRangeStore::new()));
        let err = classify_project(&sheets, "anything", 0.0).await.unwrap_err();
        assert!(matches!(err, CapacityError::EmptyRuleSet));
    }
}
