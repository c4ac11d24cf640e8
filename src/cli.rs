use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "capacity")]
#[command(author, version, about = "Google Sheets capacity model tooling", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config.json (default: ./config.json, then ~/.capacity-model/config.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in to Google and cache the token
    Auth {
        /// Discard the cached token and run the browser consent flow again
        #[arg(long)]
        reset: bool,
    },

    /// Read the generated capacity model and preview it
    Generate,

    /// Export the capacity model to CSV
    Export {
        /// Output file (default: capacity_model_YYYY-MM-DD_HH-MM.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show aggregate insights for the capacity model
    Insights,

    /// Show the matrix criteria, or classify one project against them
    Matrix {
        /// Project description to classify
        #[arg(long)]
        description: Option<String>,

        /// Sales amount for the project
        #[arg(long, requires = "description")]
        sales: Option<f64>,
    },

    /// Replace the matrix criteria from a JSON file
    UpdateMatrix {
        /// Criteria file: { "<role>": { "keywords", "minSales", "maxSales" } }
        #[arg(long)]
        criteria: PathBuf,
    },

    /// Ask the Apps Script web app to regenerate the capacity model
    Trigger {
        /// Web app URL (default: webhook_url from config.json)
        #[arg(long)]
        webhook_url: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_matrix_classify() {
        let cli = Cli::try_parse_from([
            "capacity",
            "matrix",
            "--description",
            "admin rollout",
            "--sales",
            "2500",
        ])
        .unwrap();
        match cli.command {
            Commands::Matrix { description, sales } => {
                assert_eq!(description.as_deref(), Some("admin rollout"));
                assert_eq!(sales, Some(2500.0));
            }
            _ => panic!("expected matrix"),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["capacity", "export", "-o", "out.csv", "--config", "c.json", "-v"])
                .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("c.json")));
        assert!(matches!(cli.command, Commands::Export { output: Some(_) }));
    }

    #[test]
    fn test_update_matrix_requires_criteria() {
        assert!(Cli::try_parse_from(["capacity", "update-matrix"]).is_err());
    }
}
