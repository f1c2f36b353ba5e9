use std::path::PathBuf;

use clap::Parser;

const TAGLINE: &str = "Flag error lines in application logs and classify them against a remediation taxonomy";

#[derive(Parser, Debug)]
#[command(name = "log-triage")]
#[command(version)]
#[command(about = TAGLINE, long_about = None)]
pub struct Args {
    /// Log file to analyze
    #[arg(default_value = "./production.log")]
    pub log_file: PathBuf,

    /// Where to write the JSON report
    #[arg(short, long, default_value = "error_report.json")]
    pub output: PathBuf,

    /// Do not write the JSON report to disk
    #[arg(long)]
    pub no_save: bool,

    /// Print the report as JSON instead of human readable
    #[arg(long)]
    pub json: bool,

    /// Print summary only
    #[arg(long)]
    pub summary: bool,

    /// Show full log lines and code examples
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the taxonomy and exit
    #[arg(long)]
    pub legend: bool,

    /// JSON taxonomy to use instead of the built-in one (overrides LOG_TRIAGE_TAXONOMY)
    #[arg(long)]
    pub taxonomy: Option<PathBuf>,

    /// Classification calls in flight at once (overrides LOG_TRIAGE_BATCH_SIZE)
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub batch_size: Option<u16>,
}

pub fn parse() -> Args {
    Args::parse()
}
