//! Graph documents accepted by the CLI.
//!
//! A document names its archetype and lists nodes and edges in the same
//! shape the library exchanges them. JSON and TOML are both accepted; the
//! format is chosen from the file extension.

use std::{ops::Range, path::Path};

use serde::Deserialize;

use diagrid::model::{Archetype, EdgeSpec, NodeSpec};

use crate::error::CliError;

/// A graph to lay out, as read from disk.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphDocument {
    #[serde(default)]
    pub archetype: Option<Archetype>,
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub edges: Vec<EdgeSpec>,
}

/// Serialization format of a graph document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Toml,
}

impl Format {
    /// Pick the format from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?;
        if extension.eq_ignore_ascii_case("json") {
            Some(Format::Json)
        } else if extension.eq_ignore_ascii_case("toml") {
            Some(Format::Toml)
        } else {
            None
        }
    }
}

impl GraphDocument {
    /// The archetype to use, falling back to flow when the document names none.
    pub fn archetype(&self) -> Archetype {
        self.archetype.unwrap_or(Archetype::Flow)
    }

    /// Parse `source`, read from `path`, as a graph document.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::UnsupportedFormat`] for unknown extensions and
    /// [`CliError::Document`] when the content does not parse.
    pub fn parse(path: &Path, source: &str) -> Result<Self, CliError> {
        let format = Format::from_path(path)
            .ok_or_else(|| CliError::UnsupportedFormat(path.to_path_buf()))?;

        let parsed: Result<Self, (String, Option<Range<usize>>)> = match format {
            Format::Json => serde_json::from_str(source).map_err(|err| {
                let span = json_offset(source, err.line(), err.column())
                    .map(|offset| offset..offset);
                (err.to_string(), span)
            }),
            Format::Toml => {
                toml::from_str(source).map_err(|err| (err.message().to_string(), err.span()))
            }
        };

        parsed.map_err(|(message, span)| CliError::Document {
            path: path.to_path_buf(),
            source_code: source.to_string(),
            message,
            span,
        })
    }
}

/// Byte offset of a 1-based line and column as reported by `serde_json`.
fn json_offset(source: &str, line: usize, column: usize) -> Option<usize> {
    let line_start = source
        .split_inclusive('\n')
        .take(line.checked_sub(1)?)
        .map(str::len)
        .sum::<usize>();
    let offset = line_start + column.saturating_sub(1);
    (offset <= source.len()).then_some(offset)
}

/// Clamp a span into `source` so it can always be rendered.
pub(crate) fn clamp_span(span: &Range<usize>, source: &str) -> Range<usize> {
    let start = span.start.min(source.len());
    start..span.end.clamp(start, source.len())
}
