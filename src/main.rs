//! Interface Detector CLI Application

use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use interface_detector::catalog::FaceCatalog;
use interface_detector::config::AnalysisConfig;
use interface_detector::contact::{
    detect_contacts, DetectionCriteria, DetectionReport, DiagnosticLog, GroupFilter,
};
use interface_detector::io::{read_json_bodies, write_log, ContactReport};
use interface_detector::model::Body;
use std::path::{Path, PathBuf};
use std::time::Duration;

mod cli;
use cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    // Dispatch to command handlers
    match cli.command {
        Commands::Info { input } => cmd_info(input),
        Commands::Detect {
            input,
            tolerance,
            keyword_a,
            keyword_b,
            no_planar,
            no_cylindrical,
            no_edges,
            output,
            log,
        } => {
            let criteria = DetectionCriteria {
                tolerance,
                detect_planar: !no_planar,
                detect_cylindrical: !no_cylindrical,
                detect_edges: !no_edges,
                ..DetectionCriteria::default()
            };
            let filter = GroupFilter::from_keywords(keyword_a.as_deref(), keyword_b.as_deref())?;
            cmd_detect(&input, &criteria, &filter, output.as_deref(), log)
        }
        Commands::Run { config } => cmd_run(config),
    }
}

fn load_bodies(input: &Path) -> anyhow::Result<Vec<Body>> {
    println!("Reading body set: {}", input.display());
    read_json_bodies(input).with_context(|| format!("Failed to load {}", input.display()))
}

fn cmd_info(input: PathBuf) -> anyhow::Result<()> {
    let bodies = load_bodies(&input)?;

    let mut log = DiagnosticLog::new();
    let catalog = FaceCatalog::build(&bodies, &mut log);
    let stats = catalog.stats();

    println!("\n{}", "=".repeat(60));
    println!("BODY SET INFORMATION");
    println!("{}", "=".repeat(60));
    println!();
    println!("  Bodies:        {}", bodies.len());
    println!("  Faces:         {}", stats.total_faces);
    println!("    Planar:      {}", stats.planar);
    println!("    Cylindrical: {}", stats.cylindrical);
    println!("    Skipped:     {}", stats.skipped());
    println!();

    if !catalog.bodies.is_empty() {
        println!("Bodies:");
        for body in &catalog.bodies {
            println!(
                "  - [{}] {}: {} planar, {} cylindrical, {} skipped, {} straight edges",
                body.id,
                body.name,
                body.stats.planar,
                body.stats.cylindrical,
                body.stats.skipped(),
                body.edges.len()
            );
        }
        println!();
    }

    println!("{}", "=".repeat(60));

    Ok(())
}

fn run_detection(
    bodies: &[Body],
    criteria: &DetectionCriteria,
    filter: &GroupFilter,
) -> anyhow::Result<DetectionReport> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg} [{elapsed}]")?);
    spinner.set_message(format!("Detecting contacts between {} bodies", bodies.len()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = detect_contacts(bodies, criteria, filter);
    spinner.finish_and_clear();

    Ok(result?)
}

fn cmd_detect(
    input: &Path,
    criteria: &DetectionCriteria,
    filter: &GroupFilter,
    output: Option<&Path>,
    write_text_log: bool,
) -> anyhow::Result<()> {
    let bodies = load_bodies(input)?;
    let report = run_detection(&bodies, criteria, filter)?;
    report.print_summary();

    if let Some(output) = output {
        ContactReport::new(input.display().to_string(), &report)
            .export(output)
            .with_context(|| format!("Failed to write report {}", output.display()))?;
        println!("Report written to {}", output.display());

        if write_text_log {
            let log_path = output.with_extension("log");
            write_log(&report.log, &log_path)?;
            println!("Diagnostic log written to {}", log_path.display());
        }
    } else if write_text_log {
        print!("{}", report.log.to_text());
    }

    Ok(())
}

fn cmd_run(config: PathBuf) -> anyhow::Result<()> {
    let config = AnalysisConfig::from_file(&config)
        .with_context(|| format!("Failed to load config {}", config.display()))?;
    let filter = config.group_filter()?;

    let output = config.output_file.as_ref().map(PathBuf::from);
    cmd_detect(
        Path::new(&config.input_file),
        &config.criteria,
        &filter,
        output.as_deref(),
        false,
    )
}
