//! Diagnostic renderer.
//!
//! Produces the boxed, source-annotated block used throughout plume:
//!
//! ```text
//!   × Expected an argument
//!    ╭────
//!  1 │ {{ foo|center }}
//!    ·        ───┬──
//!    ·           ╰── here
//!    ╰────
//! ```
//!
//! Layout is miette's graphical handler with the plain unicode theme; this
//! module adapts plume diagnostics to it. Spans are treated as single-line: a
//! span that crosses a line break is clipped to the end of its first line, and
//! an empty span is widened to the character under it.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use miette::{GraphicalReportHandler, GraphicalTheme, LabeledSpan, SourceCode};

use crate::diagnostic::{Diagnostic, Label, Severity};
use crate::span::LineIndex;

/// Rendering knobs. The default shows labelled lines only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReportOptions {
    /// Extra source lines shown above and below each labelled line.
    pub context_lines: usize,
}

impl ReportOptions {
    fn handler(self) -> GraphicalReportHandler {
        GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor())
            .with_links(false)
            .with_wrap_lines(false)
            .with_context_lines(self.context_lines)
    }
}

/// Render `diagnostic` against `source` with default options.
pub fn render(diagnostic: &Diagnostic, source: &str) -> String {
    render_with(diagnostic, source, ReportOptions::default())
}

pub fn render_with(diagnostic: &Diagnostic, source: &str, options: ReportOptions) -> String {
    let annotated = Annotated::new(diagnostic, source);
    let mut out = String::new();
    if options.handler().render_report(&mut out, &annotated).is_err() {
        // Labels are clipped into the source, so this only guards a
        // formatter failure. The message alone still says what went wrong.
        out = format!("  {} {}\n", marker(diagnostic), diagnostic.message);
    }
    out
}

fn marker(diagnostic: &Diagnostic) -> &'static str {
    match diagnostic.severity {
        Severity::Error => "×",
        Severity::Warning => "⚠",
    }
}

/// A diagnostic bundled with the source it points into.
///
/// Its `Display` output is the fully rendered report, which makes it suitable
/// as the user-facing error of a compile or render call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", render(.diagnostic, .source_code))]
pub struct Report {
    pub diagnostic: Diagnostic,
    pub source_code: Arc<str>,
}

impl Report {
    pub fn new(diagnostic: Diagnostic, source: impl Into<Arc<str>>) -> Self {
        Self {
            diagnostic,
            source_code: source.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.diagnostic.message
    }

    pub fn render_with(&self, options: ReportOptions) -> String {
        render_with(&self.diagnostic, &self.source_code, options)
    }

    /// Borrow this report as a [`miette::Diagnostic`], for callers that
    /// print through their own miette handler.
    pub fn as_miette(&self) -> impl miette::Diagnostic + '_ {
        Annotated::new(&self.diagnostic, &self.source_code)
    }
}

/// miette's view of a diagnostic. `Display` is the bare message, since
/// the handler prints it as the report title.
#[derive(Debug)]
struct Annotated<'a> {
    diagnostic: &'a Diagnostic,
    source: &'a str,
    labels: Vec<LabeledSpan>,
}

impl<'a> Annotated<'a> {
    fn new(diagnostic: &'a Diagnostic, source: &'a str) -> Self {
        let index = LineIndex::new(source);
        let primary = &diagnostic.primary;
        let labels = std::iter::once(LabeledSpan::new_primary_with_span(
            label_text(primary),
            clip(primary, &index),
        ))
        .chain(
            diagnostic
                .secondary
                .iter()
                .map(|label| LabeledSpan::new_with_span(label_text(label), clip(label, &index))),
        )
        .collect();
        Self {
            diagnostic,
            source,
            labels,
        }
    }
}

impl fmt::Display for Annotated<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.diagnostic.message)
    }
}

impl std::error::Error for Annotated<'_> {}

impl miette::Diagnostic for Annotated<'_> {
    fn severity(&self) -> Option<miette::Severity> {
        Some(self.diagnostic.severity.into())
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        Some(&self.source)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        Some(Box::new(self.labels.iter().cloned()))
    }
}

/// An empty label text draws a bare underline with no connector.
fn label_text(label: &Label) -> Option<String> {
    (!label.text.is_empty()).then(|| label.text.clone())
}

/// Byte range of a label, kept inside the line it starts on.
fn clip(label: &Label, index: &LineIndex<'_>) -> Range<usize> {
    let source = index.source();
    let start = label.span.start.min(source.len());
    let line_end = index
        .line_span(index.line_of(start))
        .map_or(start, |line| line.end.max(start));
    let end = label.span.end.clamp(start, line_end);
    if end > start {
        return start..end;
    }

    let rest = source.get(start..line_end).unwrap_or("");
    if let Some(c) = rest.chars().next() {
        return start..start + c.len_utf8();
    }
    // Point at the end of a line: use the last character before it.
    match source.get(..start).and_then(|before| before.chars().next_back()) {
        Some(c) if c != '\n' && c != '\r' => start - c.len_utf8()..start,
        _ => start..start,
    }
}
