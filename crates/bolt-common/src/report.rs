//! Diagnostic sink for every compiler phase.
//!
//! Phases never print: they push [`Diagnostic`] values into a [`Reporter`]
//! and the driver renders them at the end. `note` and `help` attach to the
//! most recent diagnostic, so a phase can write
//! `reporter.error(..); reporter.note(..)` the way the original passes do.
//!
//! The reporter also carries the error counter consulted at phase
//! boundaries: the parser emits an empty source file when lexing reported
//! errors, and resolution is skipped when registration failed.

use std::fmt;

use crate::span::Span;

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A single diagnostic with its location and any attached notes/helps.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// File the diagnostic was reported against (the reporter's current
    /// file at the time of the report).
    pub file: String,
    pub span: Option<Span>,
    pub notes: Vec<String>,
    pub helps: Vec<String>,
}

/// Collects diagnostics across all phases of a compilation.
#[derive(Debug, Default)]
pub struct Reporter {
    diagnostics: Vec<Diagnostic>,
    errors: usize,
    cur_file: String,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the file that subsequent diagnostics are reported against.
    pub fn set_file(&mut self, file: impl Into<String>) {
        self.cur_file = file.into();
    }

    /// The file currently being processed.
    pub fn file(&self) -> &str {
        &self.cur_file
    }

    /// Report an error at a span. Increments the error counter.
    pub fn error(&mut self, message: impl Into<String>, span: Span) {
        self.errors += 1;
        self.push(Severity::Error, message.into(), Some(span));
    }

    /// Report a warning at a span.
    pub fn warn(&mut self, message: impl Into<String>, span: Span) {
        self.push(Severity::Warning, message.into(), Some(span));
    }

    /// Attach a note to the most recent diagnostic.
    pub fn note(&mut self, message: impl Into<String>) {
        if let Some(d) = self.diagnostics.last_mut() {
            d.notes.push(message.into());
        }
    }

    /// Attach a help line to the most recent diagnostic.
    pub fn help(&mut self, message: impl Into<String>) {
        if let Some(d) = self.diagnostics.last_mut() {
            d.helps.push(message.into());
        }
    }

    fn push(&mut self, severity: Severity, message: String, span: Option<Span>) {
        self.diagnostics.push(Diagnostic {
            severity,
            message,
            file: self.cur_file.clone(),
            span,
            notes: Vec::new(),
            helps: Vec::new(),
        });
    }

    /// Number of errors reported so far. Phase boundaries gate on this.
    pub fn error_count(&self) -> usize {
        self.errors
    }

    /// Whether any error has been reported.
    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    /// All collected diagnostics, in report order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Whether some diagnostic message contains `needle`. Test helper.
    pub fn has_message(&self, needle: &str) -> bool {
        self.diagnostics.iter().any(|d| d.message.contains(needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_increments_counter() {
        let mut r = Reporter::new();
        assert_eq!(r.error_count(), 0);
        r.error("boom", Span::new(0, 1));
        r.warn("meh", Span::new(1, 2));
        assert_eq!(r.error_count(), 1);
        assert_eq!(r.diagnostics().len(), 2);
    }

    #[test]
    fn notes_attach_to_last_diagnostic() {
        let mut r = Reporter::new();
        r.error("first", Span::new(0, 1));
        r.error("second", Span::new(1, 2));
        r.note("about the second");
        r.help("try this");
        assert!(r.diagnostics()[0].notes.is_empty());
        assert_eq!(r.diagnostics()[1].notes, vec!["about the second"]);
        assert_eq!(r.diagnostics()[1].helps, vec!["try this"]);
    }

    #[test]
    fn diagnostics_carry_current_file() {
        let mut r = Reporter::new();
        r.set_file("a.bolt");
        r.error("x", Span::new(0, 1));
        r.set_file("b.bolt");
        r.error("y", Span::new(0, 1));
        assert_eq!(r.diagnostics()[0].file, "a.bolt");
        assert_eq!(r.diagnostics()[1].file, "b.bolt");
    }
}
