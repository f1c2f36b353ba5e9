use anyhow::{Context, Result};
use colored::*;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use log_triage::cli;
use log_triage::config::Config;
use log_triage::gemini::GeminiClient;
use log_triage::report::{self, DisplayOptions, Report};
use log_triage::source;
use log_triage::{Detector, Orchestrator, TaxonomyRegistry};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let args = cli::parse();

    let mut config = Config::from_env()?;
    if let Some(path) = &args.taxonomy {
        config.taxonomy_path = Some(path.clone());
    }
    if let Some(n) = args.batch_size {
        config.batch.batch_size = usize::from(n);
    }

    let registry = match &config.taxonomy_path {
        Some(path) => TaxonomyRegistry::from_file(path)?,
        None => TaxonomyRegistry::builtin()?,
    };
    info!(
        version = registry.version(),
        categories = registry.categories().len(),
        severities = registry.severities().len(),
        "taxonomy loaded"
    );

    if args.legend {
        report::print_taxonomy(&registry);
        return Ok(());
    }

    if !args.json {
        report::print_banner();
        report::print_run_header(&args.log_file, &registry);
    }

    let lines = source::read_lines(&args.log_file)?;
    let detector = Detector::default();
    let candidates: Vec<_> = detector.detect(&lines).collect();
    info!(
        lines = lines.len(),
        candidates = candidates.len(),
        "parsing complete"
    );

    let client = GeminiClient::new(config.gemini.clone())
        .context("failed to build classification client")?;
    if !candidates.is_empty() && !client.has_api_key() {
        warn!("GEMINI_API_KEY is not set, every candidate will be reported as UNKNOWN");
    }

    let orchestrator = Orchestrator::new(&registry, config.batch.clone());
    let records = orchestrator
        .run(candidates, |candidate| client.classify(&registry, candidate))
        .await;

    let report = Report::aggregate(records, &registry);

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        report::print_report(
            &report,
            &registry,
            DisplayOptions {
                summary_only: args.summary,
                verbose: args.verbose,
            },
        );
    }

    if !args.no_save {
        report
            .save(&args.output)
            .with_context(|| format!("failed to write report to {}", args.output.display()))?;
        info!(path = %args.output.display(), "report saved");
    }

    if !args.json {
        println!("\n{}", "═".repeat(80).bright_black());
        println!("\n{}", "✅ Analysis complete!".green().bold());
        let unknown = report.summary.severity_counts.get("UNKNOWN").copied().unwrap_or(0);
        if unknown > 0 {
            println!(
                "   {} of {} errors could not be classified and need manual review.",
                unknown, report.summary.total_errors
            );
        }
    }

    Ok(())
}
