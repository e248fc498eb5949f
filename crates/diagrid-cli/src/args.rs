//! Command-line argument definitions for the Diagrid CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the input graph document, the output
//! path, an optional configuration file and overrides for the archetype and
//! the layout seed.

use clap::Parser;

use diagrid::model::Archetype;

/// Command-line arguments for the Diagrid layout tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input graph document (JSON or TOML)
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Path to the output layout file (JSON)
    #[arg(short, long, default_value = "layout.json")]
    pub output: String,

    /// Archetype to lay the graph out as, overriding the document
    #[arg(short, long)]
    pub archetype: Option<Archetype>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Seed for the randomized stages, overriding the configuration
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
