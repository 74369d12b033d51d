//! Diagnostic collection — the single failure channel for the parser.
//!
//!     Per the error-handling design, nothing the parser does is fatal: lexical,
//!     grammatical, and cross-reference failures are all reported here and the
//!     parser keeps building the best tree it can. `parse_doc` always returns a
//!     `Tree`; callers that care about failures inspect the returned
//!     `Vec<Diagnostic>` instead of matching on a `Result`.

use std::fmt;

/// Diagnostic severity. Only `Error` and `Warning` are produced by this crate
/// today; `Information`/`Hint` exist so a future LSP-style consumer has room to
/// grow without a breaking change to this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Information,
    Hint,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Information => write!(f, "info"),
            Severity::Hint => write!(f, "hint"),
        }
    }
}

/// A single parser diagnostic: file, line, severity, and message.
///
/// `code` is an optional machine-stable tag (e.g. `"copy-cycle"`,
/// `"mismatched-style-close"`) so tests and future tooling can match on
/// diagnostic *kind* without depending on message wording.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub file: String,
    pub line: u32,
    pub severity: Severity,
    pub message: String,
    pub code: Option<&'static str>,
}

impl Diagnostic {
    pub fn new(file: impl Into<String>, line: u32, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line,
            severity,
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}: {}", self.file, self.line, self.severity, self.message)
    }
}

/// Multi-producer sink. Diagnostics are appended in source order per parse;
/// `warn_doc_error` matches the "file + line" collaborator named in the
/// external-interfaces section, `warn_uncond` is line-less (used by the
/// validation pass's grouped "missing parameters" warning).
#[derive(Debug, Default, Clone)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn_doc_error(&mut self, file: &str, line: u32, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::new(file, line, Severity::Warning, message));
    }

    pub fn error_doc(&mut self, file: &str, line: u32, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::new(file, line, Severity::Error, message));
    }

    pub fn warn_uncond(&mut self, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::new("", 0, Severity::Warning, message));
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_records_in_order() {
        let mut sink = DiagnosticSink::new();
        sink.warn_doc_error("a.h", 3, "first");
        sink.error_doc("a.h", 5, "second");
        let msgs: Vec<_> = sink.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(msgs, vec!["first", "second"]);
    }

    #[test]
    fn display_matches_file_line_severity_message() {
        let d = Diagnostic::new("x.h", 10, Severity::Error, "bad").with_code("demo");
        assert_eq!(format!("{d}"), "x.h:10: error: bad");
        assert_eq!(d.code, Some("demo"));
    }
}
