//! Perk Catalog Audit
//!
//! Loads every school's perk tree the way the engine would and reports
//! what it found, including every entry that was skipped or looks wrong.

use clap::Parser;
use perk_progression::core::error::{ProgressionError, Result};
use perk_progression::perks::{CatalogLoadReport, IssueSeverity, PerkCatalog};
use perk_progression::{ProgressionConfig, School};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

/// Perk catalog audit - validate perk tree definitions
#[derive(Parser, Debug)]
#[command(name = "perk_audit")]
#[command(about = "Load perk tree definitions and report per-school summaries and load issues")]
struct Args {
    /// Progression config (TOML); defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Catalog directory, overriding the config's catalog_dir
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Only report this school (short or namespaced id)
    #[arg(long)]
    school: Option<String>,

    /// Exit with failure if any issue was found
    #[arg(long)]
    strict: bool,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[derive(Serialize)]
struct SchoolSummary {
    school: School,
    nodes: usize,
    max_points: u32,
    max_tier: u32,
    roots: Vec<String>,
    issues: Vec<String>,
}

fn summarize(catalog: &PerkCatalog, report: &CatalogLoadReport, school: School) -> SchoolSummary {
    SchoolSummary {
        school,
        nodes: catalog.nodes_for_school(school).count(),
        max_points: catalog.max_points(school),
        max_tier: catalog.max_tier(school),
        roots: catalog.root_nodes(school).map(|n| n.id.clone()).collect(),
        issues: report.for_school(school).map(|i| i.to_string()).collect(),
    }
}

fn print_text(summaries: &[SchoolSummary], report: &CatalogLoadReport) {
    for s in summaries {
        println!(
            "{:<13} {:>3} nodes  max points {:>3}  max tier {:>2}  roots: {}",
            s.school.short_id(),
            s.nodes,
            s.max_points,
            s.max_tier,
            if s.roots.is_empty() { "-".to_string() } else { s.roots.join(", ") }
        );
        for issue in &s.issues {
            println!("    ! {}", issue);
        }
    }

    let warnings = report
        .issues
        .iter()
        .filter(|i| i.severity == IssueSeverity::Warning)
        .count();
    println!();
    println!("{} skipped, {} warnings", report.skipped(), warnings);
}

/// Returns whether the audit found issues in the reported schools
fn run(args: &Args) -> Result<bool> {
    let config = match &args.config {
        Some(path) => ProgressionConfig::load(path)?,
        None => ProgressionConfig::default(),
    };
    let catalog_dir = args.catalog.clone().unwrap_or(config.catalog_dir);

    let schools: Vec<School> = match &args.school {
        Some(id) => vec![School::from_id(id).ok_or_else(|| ProgressionError::UnknownSchool(id.clone()))?],
        None => School::ALL.to_vec(),
    };

    tracing::info!("Auditing perk catalog in {}", catalog_dir.display());
    let (catalog, report) = PerkCatalog::load_dir(&catalog_dir);

    let summaries: Vec<SchoolSummary> = schools
        .iter()
        .map(|&school| summarize(&catalog, &report, school))
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        print_text(&summaries, &report);
    }

    Ok(summaries.iter().any(|s| !s.issues.is_empty()))
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = if args.verbose {
        "perk_progression=debug"
    } else {
        "perk_progression=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(found_issues) if found_issues && args.strict => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("perk_audit: {}", e);
            ExitCode::FAILURE
        }
    }
}
