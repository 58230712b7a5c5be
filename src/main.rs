//! xsect - geologic cross-section builder
//!
//! # Usage
//!
//! ```bash
//! # Render one or more datasets to JSON reports
//! xsect render sections/line-a.toml sections/line-b.toml --output out/
//!
//! # Clip the base formation and exaggerate vertically
//! xsect render line-a.toml --max-td -1500 --vertical-exaggeration 10
//!
//! # Validate a dataset and list its pinch/fade occurrences
//! xsect check line-a.toml
//!
//! # Print the effective configuration
//! xsect config
//! ```
//!
//! # Environment Variables
//!
//! - `XSECT_CONFIG`: Path to a section config TOML file (default: ./xsect.toml)
//! - `RUST_LOG`: Logging level (default: info)

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use rayon::prelude::*;
use tracing::{error, info, warn};

use xsect::config::{self, SectionConfig};
use xsect::section::describe_occurrence;
use xsect::{load_section, RenderReport};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "xsect")]
#[command(about = "Geologic cross-section geometry from borehole formation tops")]
#[command(version)]
struct CliArgs {
    #[command(subcommand)]
    command: SubCommand,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Compute polygons and contact lines and write one JSON report per dataset
    Render {
        /// Dataset TOML files
        #[arg(required = true)]
        datasets: Vec<PathBuf>,

        /// Report directory (default: next to each dataset)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Clip the base formation at this elevation
        #[arg(long, value_name = "ELEV", allow_negative_numbers = true)]
        max_td: Option<f64>,

        /// Divide horizontal distances by this factor
        #[arg(long, value_name = "VE")]
        vertical_exaggeration: Option<f64>,
    },

    /// Validate a dataset and list its transitions
    Check {
        dataset: PathBuf,
    },

    /// Print the effective configuration as TOML
    Config,
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();

    config::init(SectionConfig::load());

    match args.command {
        SubCommand::Render {
            datasets,
            output,
            max_td,
            vertical_exaggeration,
        } => {
            let mut section_config = config::get().clone();
            if let Some(floor) = max_td {
                section_config.geometry.total_depth_floor = Some(floor);
            }
            if let Some(ve) = vertical_exaggeration {
                section_config.export.vertical_exaggeration = ve;
            }
            section_config
                .validate()
                .context("Invalid command-line overrides")?;
            run_render(&datasets, output.as_deref(), &section_config)
        }
        SubCommand::Check { dataset } => run_check(&dataset, config::get()),
        SubCommand::Config => {
            print!("{}", config::get().to_toml()?);
            Ok(())
        }
    }
}

// ============================================================================
// Subcommands
// ============================================================================

fn run_render(datasets: &[PathBuf], output: Option<&Path>, config: &SectionConfig) -> Result<()> {
    if let Some(dir) = output {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    }

    // Sections are independent; each one is built sequentially inside
    let results: Vec<(PathBuf, Result<PathBuf>)> = datasets
        .par_iter()
        .map(|path| (path.clone(), render_one(path, output, config)))
        .collect();

    let mut failed = 0;
    for (dataset, result) in &results {
        match result {
            Ok(report) => info!(dataset = %dataset.display(), report = %report.display(), "Rendered"),
            Err(e) => {
                error!(dataset = %dataset.display(), error = %format!("{e:#}"), "Render failed");
                failed += 1;
            }
        }
    }
    if failed > 0 {
        bail!("{failed} of {} dataset(s) failed to render", results.len());
    }
    Ok(())
}

fn render_one(path: &Path, output: Option<&Path>, config: &SectionConfig) -> Result<PathBuf> {
    let section = load_section(path, config)
        .with_context(|| format!("Failed to load dataset {}", path.display()))?;
    let geometry = section.compute(config)?;
    for (formation, e) in geometry.failures() {
        warn!(dataset = %path.display(), formation, error = %e, "Formation not drawn");
    }

    let ve = config.export.vertical_exaggeration;
    let geometry = if (ve - 1.0).abs() > f64::EPSILON {
        geometry.exaggerated(ve)
    } else {
        geometry
    };

    let report = RenderReport::new(&path.display().to_string(), &section, &geometry, ve);
    let report_path = report_path(path, output);
    report.write(&report_path)?;
    Ok(report_path)
}

fn report_path(dataset: &Path, output: Option<&Path>) -> PathBuf {
    let stem = dataset
        .file_stem()
        .map_or_else(|| "section".into(), |s| s.to_string_lossy().into_owned());
    let file = format!("{stem}.xsect.json");
    match output {
        Some(dir) => dir.join(file),
        None => dataset.with_file_name(file),
    }
}

fn run_check(path: &Path, config: &SectionConfig) -> Result<()> {
    let section = load_section(path, config)
        .with_context(|| format!("Failed to load dataset {}", path.display()))?;

    println!(
        "{}: {} boreholes, {} formations (+ base), length {}",
        path.display(),
        section.borehole_names().len(),
        section.styles().formation_count(),
        section.locations().total_length()
    );
    for (row, name) in section
        .formation_names()
        .iter()
        .enumerate()
        .take(section.styles().formation_count())
    {
        let occurrences = section.transitions().row(row);
        if occurrences.is_empty() {
            continue;
        }
        println!("  {name}");
        for (i, occurrence) in occurrences.iter().enumerate() {
            println!("    [{i}] {}", describe_occurrence(occurrence));
        }
    }

    let geometry = section.compute(config)?;
    let mut failed = 0;
    for (formation, e) in geometry.failures() {
        println!("  ERROR {formation}: {e}");
        failed += 1;
    }
    if failed > 0 {
        bail!("{failed} formation(s) could not be built");
    }
    println!("  OK");
    Ok(())
}
