//! keyrelay - command-line front-end for the external message client
//!
//! Sends and fetches keyed messages and files through the message client
//! executable, with per-attempt timeouts, bounded retries and optional
//! dt#<key> timestamp publishing and checking.
//!
//! Examples:
//!   keyrelay 10.0.0.1 9000 sendmessage -k px -a 100.5 -t
//!   keyrelay 10.0.0.1 9000 getfile -k report -a ./in/report.csv -t -g 60

use keyrelay::msgclient::commands::report;
use keyrelay::msgclient::{execute_command, KeyRelayCli};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "keyrelay=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Parse CLI arguments
    let cli = KeyRelayCli::parse_args();

    // Execute command
    let result = match execute_command(&cli).await {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(2);
        }
    };

    if !report(&cli, result.as_ref())? {
        std::process::exit(1);
    }

    Ok(())
}
