//! protopipe binary entry point.

use clap::Parser;
use protopipe::telemetry;
use protopipe_cli::Cli;
use tracing::error;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    telemetry::init(&cli.verbose);

    if let Err(err) = protopipe_cli::run(cli).await {
        error!(error = %err, "Command failed");
        std::process::exit(1);
    }
}
