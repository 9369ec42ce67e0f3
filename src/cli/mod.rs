//! CLI commands and interface

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "interface-detector")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Display information about a body-set file
    Info {
        /// Path to the body-set JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Detect contacts between bodies
    Detect {
        /// Path to the body-set JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Maximum plane distance and tangency gap in mm
        #[arg(long, default_value = "1.0")]
        tolerance: f64,

        /// Body name keyword for the first side
        #[arg(long)]
        keyword_a: Option<String>,

        /// Body name keyword for the second side (requires --keyword-a)
        #[arg(long)]
        keyword_b: Option<String>,

        /// Skip planar face-to-face detection
        #[arg(long)]
        no_planar: bool,

        /// Skip coaxial cylinder detection
        #[arg(long)]
        no_cylindrical: bool,

        /// Skip the shared edge pass
        #[arg(long)]
        no_edges: bool,

        /// Output JSON report path
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Also write the diagnostic log next to the report
        #[arg(long)]
        log: bool,
    },

    /// Run detection from a configuration file
    Run {
        /// Configuration file (JSON)
        #[arg(short, long, value_name = "FILE")]
        config: PathBuf,
    },
}
