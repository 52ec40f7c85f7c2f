//! Diagnostic rendering for parse errors.

use ariadne::{Color, Label, Report, ReportKind, Source};
use parm_tokenizer::{LexError, ParseErrorKind, Span, SyntaxError};

/// A parse error with its source location.
#[derive(Debug)]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// Source location.
    pub span: Span,
    /// Physical line number (1-based; 0 when no line was read yet).
    pub line: u32,
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(kind: impl Into<ParseErrorKind>, span: Span, line: u32) -> Self {
        Self {
            kind: kind.into(),
            span,
            line,
        }
    }

    /// Render this error with ariadne.
    ///
    /// Returns a string containing the formatted error message with source context.
    pub fn render(&self, filename: &str, source: &str) -> String {
        let mut output = Vec::new();
        self.write_report(filename, source, &mut output);
        String::from_utf8(output).unwrap_or_else(|_| format!("{}", self))
    }

    /// Write the error report to a writer.
    pub fn write_report<W: std::io::Write>(&self, filename: &str, source: &str, writer: W) {
        let report = self.build_report(filename);
        let _ = report
            .finish()
            .write((filename, Source::from(source)), writer);
    }

    fn build_report<'a>(
        &self,
        filename: &'a str,
    ) -> ariadne::ReportBuilder<'static, (&'a str, std::ops::Range<usize>)> {
        let range: std::ops::Range<usize> = self.span.into();
        let report = Report::build(ReportKind::Error, (filename, range.clone()))
            .with_message(self.kind.to_string());

        let (label, help) = match &self.kind {
            ParseErrorKind::Io(_) => return report,
            ParseErrorKind::LineTooLong { max, .. } => (
                "this line",
                Some(format!("lines may hold at most {max} bytes")),
            ),
            ParseErrorKind::TokenTooLong { max } => (
                "this token",
                Some(format!("keys and values may hold at most {max} bytes")),
            ),
            ParseErrorKind::UnexpectedEof if self.span.len() == 1 => (
                "block opened here",
                Some("add a closing '}'".to_string()),
            ),
            ParseErrorKind::UnexpectedEof => ("input ends here", None),
            ParseErrorKind::OutOfMemory => ("while parsing this", None),
            ParseErrorKind::Syntax(syntax) => syntax_label(*syntax),
        };

        let report = report.with_label(
            Label::new((filename, range))
                .with_message(label)
                .with_color(Color::Red),
        );
        match help {
            Some(help) => report.with_help(help),
            None => report,
        }
    }
}

fn syntax_label(error: SyntaxError) -> (&'static str, Option<String>) {
    let (label, help) = match error {
        SyntaxError::UnterminatedQuote => (
            "quote opened here",
            "add the matching closing quote; '#' does not start a comment inside quotes",
        ),
        SyntaxError::MixedQuoting => (
            "quoted and bare text meet here",
            "quote the whole token, or separate the parts with a space",
        ),
        SyntaxError::MissingKey => ("expected a key here", "write entries as `key: value`"),
        SyntaxError::EmptyKey => ("empty key", "keys must contain at least one character"),
        SyntaxError::ExpectedColon => ("this key", "add ':' between the key and its value"),
        SyntaxError::MissingValue => (
            "expected a value here",
            "values must not be empty; use `{}` for an empty block",
        ),
        SyntaxError::ValueBeforeBlock => (
            "text before '{'",
            "a value is either a string or a `{ ... }` block",
        ),
        SyntaxError::UnexpectedColon => (
            "this value",
            "quote the value if it contains ':'",
        ),
        SyntaxError::UnexpectedOpenBrace => ("unexpected '{'", "blocks must follow `key:`"),
        SyntaxError::UnbalancedCloseBrace => (
            "no block to close",
            "remove the '}' or add the '{' it belongs to",
        ),
    };
    (label, Some(help.to_string()))
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        Self {
            kind: err.kind,
            span: err.span,
            line: err.line,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)?;
        if self.line > 0 {
            write!(f, " at line {}", self.line)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ParseErrorKind::Io(err) => Some(err),
            _ => None,
        }
    }
}
