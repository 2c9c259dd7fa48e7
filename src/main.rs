//! turbo-affected CLI
//!
//! Entry point for the turbo-affected command-line application.

use anyhow::Result;
use clap::Parser;

use turbo_affected::cli::output::{display_error, OutputConfig};
use turbo_affected::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber; RUST_LOG overrides --verbose
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(cli.log_level().into())
                .from_env_lossy(),
        )
        .init();

    // Apply output configuration globally
    let output_config = OutputConfig::new(cli.quiet, cli.json);
    output_config.apply_global();

    // Run the command and handle errors
    match cli.run().await {
        Ok(()) => Ok(()),
        Err(e) => {
            display_error(&e);
            std::process::exit(1);
        }
    }
}
