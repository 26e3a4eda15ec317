use tokio::io::BufReader;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use wallet_ledger::commands;
use wallet_ledger::{db, LedgerConfig, LedgerStore};

#[tokio::main]
async fn main() {
    let config = match LedgerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };

    // Logs go to stderr so stdout carries only command replies
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("wallet_ledger=debug".parse().expect("static directive"))
                .add_directive("sqlx=warn".parse().expect("static directive")),
        )
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting wallet ledger...");

    info!("Opening storage...");
    let storage = match db::open(&config).await {
        Ok(storage) => {
            info!("Storage opened successfully");
            storage
        }
        Err(e) => {
            error!("Failed to open storage: {}", e);
            std::process::exit(1);
        }
    };
    let ledger = LedgerStore::new(storage, config.op_timeout);

    println!("{}", commands::help::text());

    let input = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    if let Err(e) = commands::serve(&ledger, config.history_page_size, input, &mut stdout).await {
        error!("Command loop stopped on I/O failure: {}", e);
    }

    ledger.close().await;
}
