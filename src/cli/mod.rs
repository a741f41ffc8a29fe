pub mod commands;
pub mod scan;
pub mod serve;

pub use commands::{Cli, Commands};

use std::path::PathBuf;

use crate::config;
use crate::errors::CyberImpactError;

pub async fn handle_validate(args: commands::ValidateArgs) -> Result<(), CyberImpactError> {
    let path = PathBuf::from(&args.config);
    let config = config::parse_config(&path).await?;
    println!("Configuration is valid: {}", args.config);
    println!("  scanner parallelism: {}", config.scanner.max_parallel);
    println!("  custom tools: {}", config.scanner.tools.len());
    println!("  LLM provider: {}", config.llm.provider);
    println!("  financial matcher: {}", config.financial.matcher);
    Ok(())
}
