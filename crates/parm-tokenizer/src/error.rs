//! Error taxonomy shared by the scanner, tokenizer and tree builder.

use thiserror::Error;

use crate::Span;

/// Everything that can abort a parse.
///
/// Every kind is terminal: the first one raised ends the parse and no
/// partial tree is produced.
#[derive(Debug, Error)]
pub enum ParseErrorKind {
    /// The source could not be opened or read.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// A physical line holds more content bytes than allowed.
    ///
    /// `length` counts the bytes read before giving up, which is at most
    /// `max + 2`; the rest of the line is never read.
    #[error("line too long ({length} bytes, maximum is {max})")]
    LineTooLong { length: usize, max: usize },
    /// A key or value does not fit in the token buffer.
    #[error("token too long (maximum is {max} bytes)")]
    TokenTooLong { max: usize },
    /// The input breaks the grammar.
    #[error("syntax error: {0}")]
    Syntax(SyntaxError),
    /// Input ended while a value or the rest of a block was expected.
    #[error("unexpected end of input")]
    UnexpectedEof,
    /// Growing the tree failed to allocate.
    #[error("out of memory")]
    OutOfMemory,
}

impl ParseErrorKind {
    /// Short, stable name of the kind, without any payload.
    pub fn name(&self) -> &'static str {
        match self {
            ParseErrorKind::Io(_) => "IoError",
            ParseErrorKind::LineTooLong { .. } => "LineTooLong",
            ParseErrorKind::TokenTooLong { .. } => "TokenTooLong",
            ParseErrorKind::Syntax(_) => "SyntaxError",
            ParseErrorKind::UnexpectedEof => "UnexpectedEof",
            ParseErrorKind::OutOfMemory => "OutOfMemory",
        }
    }

    /// Whether this is a syntax error.
    pub fn is_syntax(&self) -> bool {
        matches!(self, ParseErrorKind::Syntax(_))
    }
}

impl From<SyntaxError> for ParseErrorKind {
    fn from(err: SyntaxError) -> Self {
        ParseErrorKind::Syntax(err)
    }
}

/// The grammar rule a syntax error broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SyntaxError {
    /// A quoted token reached end of input before its closing quote.
    #[error("unterminated quoted string")]
    UnterminatedQuote,
    /// A quote after bare characters, or a bare character right after a closing quote.
    #[error("quoted and bare text mixed in one token")]
    MixedQuoting,
    /// `:` with no key in front of it.
    #[error("missing key before ':'")]
    MissingKey,
    /// A quoted key with nothing between the quotes.
    #[error("key is empty")]
    EmptyKey,
    /// A key not followed by `:`.
    #[error("expected ':' after key")]
    ExpectedColon,
    /// A `:` with no value after it, or with an empty quoted value.
    #[error("missing value after ':'")]
    MissingValue,
    /// Text between `:` and `{`; a value is either a string or a block.
    #[error("value cannot be both a string and a block")]
    ValueBeforeBlock,
    /// A value followed directly by another `:`.
    #[error("unexpected ':' after value")]
    UnexpectedColon,
    /// A `{` where a key was expected.
    #[error("unexpected '{{' where a key was expected")]
    UnexpectedOpenBrace,
    /// A `}` with no open block to close.
    #[error("'}}' without a matching '{{'")]
    UnbalancedCloseBrace,
}

/// A parse error raised while scanning or tokenizing.
#[derive(Debug, Error)]
#[error("{kind} at line {line}")]
pub struct LexError {
    /// What went wrong.
    pub kind: ParseErrorKind,
    /// Where in the source.
    pub span: Span,
    /// Physical line number (1-based, 0 before the first line is read).
    pub line: u32,
}

impl LexError {
    /// Create a new error.
    pub fn new(kind: impl Into<ParseErrorKind>, span: Span, line: u32) -> Self {
        Self {
            kind: kind.into(),
            span,
            line,
        }
    }
}
