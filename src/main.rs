use clap::Parser;
use tracing_subscriber::EnvFilter;

use cyberimpact::cli::{self, Cli, Commands};
use cyberimpact::errors::CyberImpactError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_ansi(!cli.no_color)
            .with_writer(std::io::stderr)
            .init();
    }

    let result = match cli.command {
        Commands::Serve(args) => cli::serve::handle_serve(args).await,
        Commands::Scan(args) => cli::scan::handle_scan(args).await,
        Commands::Validate(args) => cli::handle_validate(args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        let exit_code = match &e {
            CyberImpactError::Config(_) => 2,
            CyberImpactError::Unauthorized(_) => 4,
            CyberImpactError::InvalidRepository(_) => 5,
            _ => 1,
        };
        std::process::exit(exit_code);
    }
}
