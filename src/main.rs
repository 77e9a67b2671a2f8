//! Claims Analytics CLI
//!
//! Command-line interface for running the claims analytics pipeline

use anyhow::{Context, Result};
use claims_analytics::claim::load_claims;
use claims_analytics::{AnalysisConfig, AnalysisReport, AnalyticsRunner, TrendGrouping, YearRecord};
use clap::{Parser, ValueEnum};
use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TrendArg {
    Global,
    Company,
    CompanyThreat,
}

impl From<TrendArg> for TrendGrouping {
    fn from(arg: TrendArg) -> Self {
        match arg {
            TrendArg::Global => TrendGrouping::Global,
            TrendArg::Company => TrendGrouping::Company,
            TrendArg::CompanyThreat => TrendGrouping::CompanyThreat,
        }
    }
}

/// Anomaly and trend analytics over a cyber-insurance claims extract
#[derive(Debug, Parser)]
#[command(name = "claims_analytics", version)]
struct Args {
    /// Claims CSV file
    claims: PathBuf,

    /// JSON analysis configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the full report as JSON
    #[arg(long)]
    json_out: Option<PathBuf>,

    /// Write the yearly trend table as CSV
    #[arg(long)]
    trend_csv: Option<PathBuf>,

    /// Maximum companies per discrepancy direction
    #[arg(long)]
    limit: Option<usize>,

    /// Partitioning for the yearly trend
    #[arg(long, value_enum)]
    trend: Option<TrendArg>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => AnalysisConfig::from_json_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    if let Some(limit) = args.limit {
        config.detection_limit = limit;
    }
    if let Some(trend) = args.trend {
        config.trend_grouping = trend.into();
    }

    let claims = load_claims(&args.claims)
        .with_context(|| format!("loading claims from {}", args.claims.display()))?;
    let runner = AnalyticsRunner::new(claims, config)?;
    let report = runner.run()?;

    print_report(&report);

    if let Some(path) = &args.json_out {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        serde_json::to_writer_pretty(file, &report)?;
        println!("\nReport written to: {}", path.display());
    }

    if let Some(path) = &args.trend_csv {
        write_trend_csv(path, &report.trend)?;
        println!("Trend table written to: {}", path.display());
    }

    Ok(())
}

fn print_report(report: &AnalysisReport) {
    println!("Claims Analytics v{}", env!("CARGO_PKG_VERSION"));
    println!("========================\n");
    println!("Claims: {}  Companies: {}", report.claim_count, report.company_count);

    println!("\nClaims by threat type:");
    for (threat, count) in &report.threat_counts {
        println!("  {:<12} {:>8}", threat.as_str(), count);
    }

    println!("\n{} by {:?}:", report.aggregate_field, report.aggregate_by);
    println!("  {:<32} {:>6} {:>14} {:>14} {:>14} {:>14}", "Group", "Count", "Total", "Mean", "Median", "P95");
    println!("  {}", "-".repeat(98));
    for row in &report.aggregates {
        let s = &row.stats;
        println!("  {:<32} {:>6} {:>14.2} {:>14.2} {:>14.2} {:>14.2}",
            row.key.to_string(), s.count, s.sum, s.mean, s.median, s.p95);
    }

    match &report.discrepancy_thresholds {
        Some(t) => println!("\nDiscrepancy thresholds: lower={:.2} upper={:.2} ({} companies)",
            t.lower, t.upper, t.companies),
        None => println!("\nDiscrepancy thresholds: not enough companies"),
    }
    for (title, rows) in [
        ("Possible loss inflation", &report.overstatement),
        ("Possible underreporting", &report.understatement),
    ] {
        println!("\n{}:", title);
        if rows.is_empty() {
            println!("  (none)");
        }
        for row in rows {
            println!("  {:<32} {:>14.2} ({} claims)", row.company_name, row.discrepancy_score, row.claim_count);
        }
    }

    println!("\nHigh-severity companies:");
    if report.high_severity.is_empty() {
        println!("  (none)");
    }
    for flag in &report.high_severity {
        println!("  {:<32} median {:>14.2} > {:.2}", flag.company_name, flag.median, flag.threshold);
    }

    println!("\nYearly trend ({:?}, first 24 rows):", report.trend_grouping);
    println!("  {:<32} {:>6} {:>6} {:>8} {:>14} {:>14}", "Partition", "Year", "Count", "ΔCount", "Total", "ΔTotal");
    for row in report.trend.iter().take(24) {
        println!("  {:<32} {:>6} {:>6} {:>8} {:>14.2} {:>14}",
            partition_label(row),
            row.year,
            row.claim_count,
            row.claim_count_delta.map_or_else(|| "-".to_string(), |d| d.to_string()),
            row.total_payout,
            row.total_payout_delta.map_or_else(|| "-".to_string(), |d| format!("{:.2}", d)),
        );
    }
    if report.trend.len() > 24 {
        println!("  ... ({} more rows)", report.trend.len() - 24);
    }
}

fn partition_label(row: &YearRecord) -> String {
    match (&row.company, row.threat_type) {
        (Some(company), Some(threat)) => format!("{} / {}", company, threat),
        (Some(company), None) => company.clone(),
        _ => "all".to_string(),
    }
}

fn write_trend_csv(path: &Path, rows: &[YearRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
