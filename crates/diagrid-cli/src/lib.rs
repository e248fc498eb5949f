//! CLI logic for the Diagrid layout tool.
//!
//! The CLI reads a graph document, lays it out with the configured
//! [`LayoutEngine`] and writes the resulting [`LayoutResult`] as pretty JSON.

pub mod error_adapter;

mod args;
mod config;
mod document;
mod error;

pub use args::Args;
pub use config::ConfigError;
pub use document::GraphDocument;
pub use error::CliError;

use std::{fs, path::Path};

use log::{info, warn};

use diagrid::{LayoutEngine, model::LayoutResult};

/// Run the Diagrid CLI application
///
/// This function loads the configuration, lays out the input document and
/// writes the resulting layout to the output file. Layout warnings are
/// logged but do not fail the run.
///
/// # Errors
///
/// Returns `CliError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Malformed or unsupported input documents
/// - Output serialization errors
pub fn run(args: &Args) -> Result<LayoutResult, CliError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing graph"
    );

    let mut layout_config = config::load_config(args.config.as_ref())?;
    if let Some(seed) = args.seed {
        layout_config.seed = seed;
    }

    let input = Path::new(&args.input);
    let source = fs::read_to_string(input)?;
    let document = GraphDocument::parse(input, &source)?;
    let archetype = args.archetype.unwrap_or_else(|| document.archetype());

    let engine = LayoutEngine::new(layout_config)?;
    let result = engine.layout(&document.nodes, &document.edges, archetype);

    for warning in &result.warnings {
        warn!(warning = warning.to_string(); "Layout degraded");
    }

    let json = serde_json::to_string_pretty(&result)?;
    fs::write(&args.output, json)?;

    info!(
        output_file = args.output,
        pipeline:? = result.pipeline,
        nodes = result.nodes.len();
        "Layout exported successfully"
    );

    Ok(result)
}
