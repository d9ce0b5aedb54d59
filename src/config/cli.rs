use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "rating-monitor")]
#[command(about = "Checks an applicant's standing in university rating lists")]
pub struct CliArgs {
    #[arg(long, short, default_value = "rating.toml")]
    pub config: PathBuf,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Pretty-print the JSON result")]
    pub pretty: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}
