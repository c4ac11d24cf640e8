use std::process::ExitCode;

use clap::Parser;

use capacity_model::cli::Cli;
use capacity_model::commands;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match commands::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            if e.requires_user_action() {
                eprintln!("   {}", e.recovery_suggestion());
            }
            ExitCode::FAILURE
        }
    }
}

/// `warn` by default, `info` with -v. RUST_LOG overrides both.
fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}
