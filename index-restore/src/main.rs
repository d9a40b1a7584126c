use clap::Parser;
use tracing::{error, info};

use index_restore::commands::{execute, needs_search_index};
use index_restore::{logging, Cli, CliError, Dependencies};

#[tokio::main]
async fn main() {
    // .env must be loaded before clap reads the environment
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    logging::init(cli.log_format);

    if let Err(e) = run(&cli).await {
        error!(error = %e, "Restore failed");
        eprintln!("Error: {}", e);
        if let Some(detail) = e.failure_detail() {
            eprintln!("First rejected operation:\n{}", detail);
        }
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<(), CliError> {
    let deps = Dependencies::from_args(
        &cli.storage,
        &cli.search,
        needs_search_index(&cli.command),
    )?;

    info!(command = ?cli.command, "Running restore command");
    execute(&cli.command, &deps).await
}
