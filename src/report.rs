use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use colored::*;
use serde::{Deserialize, Serialize};

use crate::taxonomy::TaxonomyRegistry;
use crate::types::{NormalizedRecord, Severity};

const PREVIEW_CHARS: usize = 150;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_errors: usize,
    pub severity_counts: BTreeMap<String, usize>,
    pub category_counts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub summary: Summary,
    pub taxonomy_version: String,
    pub errors: Vec<NormalizedRecord>,
}

impl Report {
    /// Tallies records and orders them by severity rank. The sort is stable,
    /// so records of equal rank keep detection order.
    pub fn aggregate(mut records: Vec<NormalizedRecord>, registry: &TaxonomyRegistry) -> Self {
        let mut severity_counts = BTreeMap::new();
        let mut category_counts = BTreeMap::new();
        for record in &records {
            *severity_counts
                .entry(record.analysis.severity.to_string())
                .or_insert(0) += 1;
            *category_counts
                .entry(record.analysis.category.clone())
                .or_insert(0) += 1;
        }

        records.sort_by_key(|r| registry.rank(&r.analysis.severity));

        Self {
            summary: Summary {
                total_errors: records.len(),
                severity_counts,
                category_counts,
            },
            taxonomy_version: registry.version().to_string(),
            errors: records,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut out, self)?;
        out.write_all(b"\n")?;
        out.flush()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayOptions {
    pub summary_only: bool,
    pub verbose: bool,
}

pub fn severity_icon(severity: &str) -> &'static str {
    match severity {
        "CRITICAL" => "🔴",
        "HIGH" => "🟠",
        "MEDIUM" => "🟡",
        "LOW" => "🟢",
        _ => "⚪",
    }
}

fn paint_severity(label: &str, registry: &TaxonomyRegistry) -> ColoredString {
    match registry.rank(&Severity::from(label.to_string())) {
        0 => label.red().bold(),
        1 => label.yellow().bold(),
        2 => label.bold(),
        n if n < registry.severities().len() => label.normal(),
        _ => label.bright_black(),
    }
}

fn rule() -> ColoredString {
    "═".repeat(80).bright_black()
}

fn thin_rule() -> ColoredString {
    "─".repeat(80).bright_black()
}

pub fn print_banner() {
    println!("\n{}", "╔═══════════════════════════════════════════════════════════════════════════════╗".bright_black());
    println!(
        "{}{}{}",
        "║  ".bright_black(),
        format!("log-triage v{:<10}", env!("CARGO_PKG_VERSION")).bold().cyan(),
        "                                                     ║".bright_black()
    );
    println!(
        "{}{}{}",
        "║  ".bright_black(),
        "Flag log errors and map them onto a remediation taxonomy".italic(),
        "                     ║".bright_black()
    );
    println!("{}", "╚═══════════════════════════════════════════════════════════════════════════════╝".bright_black());
}

pub fn print_run_header(log_path: &Path, registry: &TaxonomyRegistry) {
    println!("\n📁 Log file: {}", log_path.display().to_string().yellow());
    println!(
        "📋 Categories: {}",
        registry
            .categories()
            .iter()
            .map(|c| c.name())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("🔥 Severity levels: {}", registry.severities().join(", "));
}

/// Prints every severity, category and subcategory with its suggestion.
pub fn print_taxonomy(registry: &TaxonomyRegistry) {
    println!(
        "\n{} {}",
        "TAXONOMY".bold().white(),
        format!("(version {})", registry.version()).bright_black()
    );
    println!("{}", rule());

    println!("\n{}", "SEVERITY LEVELS (most severe first)".bold());
    println!("{}", thin_rule());
    for label in registry.severities() {
        let marker = if Severity::Level(label.clone()) == registry.fallback_severity() {
            " (default)".bright_black()
        } else {
            "".normal()
        };
        println!("  {} {}{}", severity_icon(label), paint_severity(label, registry), marker);
    }

    let (fallback_category, fallback_subcategory) = registry.fallback_category_and_subcategory();
    for category in registry.categories() {
        println!("\n{}", category.name().cyan().bold());
        for sub in category.subcategories() {
            let marker = if category.name() == fallback_category.name()
                && sub.name == fallback_subcategory.name
            {
                " (fallback)".bright_black()
            } else {
                "".normal()
            };
            println!("  • {}{}", sub.name.bold(), marker);
            println!("    {}", sub.suggestion);
            println!("    {}", registry.reference_link(sub).bright_black());
        }
    }
}

pub fn print_report(report: &Report, registry: &TaxonomyRegistry, options: DisplayOptions) {
    println!("\n{}", rule());
    println!("{}", "📊 ERROR ANALYSIS REPORT".bold().white());
    println!("{}", rule());

    if report.errors.is_empty() {
        println!("\n{}", "✅ No errors found in the log file.".green().bold());
        return;
    }

    print_summary(&report.summary, registry);

    if options.summary_only {
        return;
    }

    println!("\n{}", rule());
    println!("{}", "🔍 DETAILED ERROR ANALYSIS".bold());
    println!("{}", rule());

    for (i, record) in report.errors.iter().enumerate() {
        let a = &record.analysis;
        let label = a.severity.as_str();
        println!(
            "\n{} {} {}",
            severity_icon(label),
            format!("ERROR #{}", i + 1).bold(),
            format!("[Line {}]", record.candidate.line_number).bright_black()
        );
        println!("   Severity:         {}", paint_severity(label, registry));
        println!("   Category:         {}", a.category.cyan());
        println!("   Subcategory:      {}", a.subcategory);
        println!(
            "   Timestamp:        {}",
            record.candidate.timestamp.as_deref().unwrap_or("N/A")
        );
        println!("   Description:      {}", a.description);
        println!("   Impact:           {}", a.impact);
        println!("   Suggested Action: {}", a.suggested_action);
        println!("   Reference:        {}", a.reference_link.bright_black());
        if options.verbose {
            if let Some(example) = &a.code_example {
                println!("   Example:");
                for line in example.lines() {
                    println!("      {}", line.bright_white());
                }
            }
            println!("   Log Content:      {}", record.candidate.content);
        } else {
            println!("   Log Content:      {}", preview(&record.candidate.content));
        }
        println!("{}", thin_rule());
    }
}

fn print_summary(summary: &Summary, registry: &TaxonomyRegistry) {
    println!("\n{}", "📈 SUMMARY".bold());
    println!("   Total Errors: {}", summary.total_errors.to_string().bold());

    println!("\n{}", "🔥 Severity Breakdown:".bold());
    let mut by_severity: Vec<_> = summary.severity_counts.iter().collect();
    by_severity.sort_by_key(|(label, _)| registry.rank(&Severity::from(label.to_string())));
    for (label, count) in by_severity {
        println!(
            "   {} {}: {}",
            severity_icon(label),
            paint_severity(label, registry),
            count
        );
    }

    println!("\n{}", "📁 Category Breakdown:".bold());
    let mut by_category: Vec<_> = summary.category_counts.iter().collect();
    by_category.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    for (category, count) in by_category {
        println!("   • {}: {}", category.cyan(), count);
    }
}

fn preview(content: &str) -> String {
    if content.chars().count() > PREVIEW_CHARS {
        format!("{}...", content.chars().take(PREVIEW_CHARS).collect::<String>())
    } else {
        content.to_string()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::normalizer::{degraded, normalize};
    use crate::types::{CandidateError, RawJudgment};

    fn record(line: usize, severity: &str, category: &str, registry: &TaxonomyRegistry) -> NormalizedRecord {
        let raw = RawJudgment {
            severity: Some(severity.to_string()),
            category: Some(category.to_string()),
            ..RawJudgment::default()
        };
        normalize(CandidateError::new(line, format!("error {line}"), None), &raw, registry)
    }

    #[test]
    fn empty_report() {
        let registry = TaxonomyRegistry::builtin().unwrap();
        let report = Report::aggregate(Vec::new(), &registry);

        assert_eq!(report.summary.total_errors, 0);
        assert!(report.summary.severity_counts.is_empty());
        assert!(report.summary.category_counts.is_empty());
        assert!(report.errors.is_empty());
    }

    #[test]
    fn sorts_by_rank_stably_with_unknown_last() {
        let registry = TaxonomyRegistry::builtin().unwrap();
        let records = vec![
            degraded(CandidateError::new(1, "error 1".into(), None), &registry),
            record(2, "LOW", "Routing", &registry),
            record(3, "HIGH", "Syntax", &registry),
            record(4, "CRITICAL", "Migration", &registry),
            record(5, "HIGH", "Routing", &registry),
            record(6, "LOW", "Syntax", &registry),
        ];

        let report = Report::aggregate(records, &registry);
        let order: Vec<usize> = report.errors.iter().map(|r| r.candidate.line_number).collect();
        assert_eq!(order, vec![4, 3, 5, 2, 6, 1]);
    }

    #[test]
    fn counts_every_observed_label() {
        let registry = TaxonomyRegistry::builtin().unwrap();
        let records = vec![
            record(1, "HIGH", "Routing", &registry),
            record(2, "HIGH", "Syntax", &registry),
            record(3, "nonsense", "Routing", &registry),
            degraded(CandidateError::new(4, "error 4".into(), None), &registry),
        ];

        let report = Report::aggregate(records, &registry);
        let s = &report.summary;
        assert_eq!(s.total_errors, 4);
        assert_eq!(s.severity_counts.get("HIGH"), Some(&2));
        assert_eq!(s.severity_counts.get("MEDIUM"), Some(&1));
        assert_eq!(s.severity_counts.get("UNKNOWN"), Some(&1));
        assert_eq!(s.severity_counts.get("CRITICAL"), None);
        assert_eq!(s.category_counts.get("Routing"), Some(&2));
        assert_eq!(s.category_counts.get("Syntax"), Some(&1));
        assert_eq!(s.category_counts.get("Unknown"), Some(&1));
        assert_eq!(s.category_counts.values().sum::<usize>(), 4);
    }

    #[test]
    fn wire_shape_matches_dashboard_contract() {
        let registry = TaxonomyRegistry::builtin().unwrap();
        let report = Report::aggregate(vec![record(9, "LOW", "Routing", &registry)], &registry);
        let v: Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        assert_eq!(v["summary"]["totalErrors"], json!(1));
        assert_eq!(v["summary"]["severityCounts"], json!({"LOW": 1}));
        assert_eq!(v["summary"]["categoryCounts"], json!({"Routing": 1}));
        assert_eq!(v["taxonomyVersion"], json!(registry.version()));

        let e = &v["errors"][0];
        assert_eq!(e["lineNumber"], json!(9));
        assert_eq!(e["content"], json!("error 9"));
        assert!(e["timestamp"].is_null());
        for key in [
            "severity",
            "category",
            "subcategory",
            "description",
            "impact",
            "suggestedAction",
            "referenceLink",
        ] {
            assert!(e["analysis"].get(key).is_some(), "missing analysis.{key}");
        }
    }

    #[test]
    fn save_writes_readable_json() {
        let registry = TaxonomyRegistry::builtin().unwrap();
        let report = Report::aggregate(vec![record(1, "HIGH", "Syntax", &registry)], &registry);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("error_report.json");

        report.save(&path).unwrap();
        let back: Report = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn preview_truncates_long_content() {
        let long = "x".repeat(200);
        let p = preview(&long);
        assert_eq!(p.chars().count(), PREVIEW_CHARS + 3);
        assert!(p.ends_with("..."));
        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn icons_cover_known_labels() {
        assert_eq!(severity_icon("CRITICAL"), "🔴");
        assert_eq!(severity_icon("UNKNOWN"), "⚪");
        assert_eq!(severity_icon("WHATEVER"), "⚪");
    }
}
