use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cyberimpact", version, about = "Repository security scanning with financial impact analysis")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    Serve(ServeArgs),
    /// Clone and scan one repository without the API (headless)
    Scan(ScanArgs),
    /// Validate a configuration file
    Validate(ValidateArgs),
}

#[derive(Args, Clone)]
pub struct ServeArgs {
    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Listen address (overrides config)
    #[arg(long)]
    pub host: Option<String>,

    /// Listen port (overrides config)
    #[arg(long)]
    pub port: Option<u16>,

    /// SQLite database path (overrides config)
    #[arg(long)]
    pub db: Option<String>,
}

#[derive(Args, Clone)]
pub struct ScanArgs {
    /// Repository URL to clone
    #[arg(short, long = "repo")]
    pub repo_url: String,

    /// Comma-separated tools to run (defaults to the suggested set)
    #[arg(short, long)]
    pub tools: Option<String>,

    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// JSON asset inventory for financial impact analysis
    #[arg(long)]
    pub assets: Option<String>,

    /// Write the markdown report here instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,

    /// Print the raw results as JSON instead of the report
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Clone)]
pub struct ValidateArgs {
    /// Config file to validate
    pub config: String,
}

impl ScanArgs {
    pub fn tool_list(&self) -> Option<Vec<String>> {
        self.tools
            .as_ref()
            .map(|t| t.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
    }
}
