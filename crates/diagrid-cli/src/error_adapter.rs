//! Error adapter for converting [`CliError`] to miette diagnostics.
//!
//! The library reports plain `thiserror` errors. This module attaches the
//! codes, help texts and source snippets that miette renders in the terminal.

use std::fmt;

use miette::{Diagnostic, LabeledSpan, SourceCode};

use crate::{document::clamp_span, error::CliError};

/// Adapter that renders a [`CliError`] through miette.
pub struct ErrorAdapter<'a>(pub &'a CliError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(self.0)
    }
}

impl Diagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self.0 {
            CliError::Io(_) => "diagrid::io",
            CliError::Config(_) => "diagrid::config",
            CliError::UnsupportedFormat(_) => "diagrid::format",
            CliError::Document { .. } => "diagrid::document",
            CliError::Layout(_) => "diagrid::layout",
            CliError::Serialize(_) => "diagrid::serialize",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match self.0 {
            CliError::UnsupportedFormat(_) => "rename the input to end in .json or .toml",
            CliError::Document { .. } => {
                "a document has an optional `archetype` and lists of `nodes` and `edges`"
            }
            CliError::Config(_) | CliError::Layout(_) => {
                "canvas and node dimensions must be positive and the margins must leave room"
            }
            CliError::Io(_) | CliError::Serialize(_) => return None,
        };
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        match self.0 {
            CliError::Document {
                source_code,
                span: Some(_),
                ..
            } => Some(source_code as &dyn SourceCode),
            _ => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let CliError::Document {
            source_code,
            message,
            span: Some(span),
            ..
        } = self.0
        else {
            return None;
        };

        let span = clamp_span(span, source_code);
        let label = LabeledSpan::new_primary_with_span(
            Some(message.clone()),
            (span.start, span.end - span.start),
        );
        Some(Box::new(std::iter::once(label)))
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_document_error_renders_snippet() {
        let err = CliError::Document {
            path: PathBuf::from("graph.json"),
            source_code: "{\"nodes\": 4}".to_string(),
            message: "expected a sequence".to_string(),
            span: Some(10..11),
        };
        let adapter = ErrorAdapter(&err);

        let mut rendered = String::new();
        miette::GraphicalReportHandler::new()
            .render_report(&mut rendered, &adapter)
            .unwrap();

        assert!(rendered.contains("diagrid::document"));
        assert!(rendered.contains("expected a sequence"));
        assert!(adapter.labels().is_some());
    }

    #[test]
    fn test_plain_error_has_no_labels() {
        let err = CliError::UnsupportedFormat(PathBuf::from("graph.yaml"));
        let adapter = ErrorAdapter(&err);

        assert!(adapter.labels().is_none());
        assert!(adapter.source_code().is_none());
        assert_eq!(adapter.code().unwrap().to_string(), "diagrid::format");
    }
}
