//! Token types for the parm tokenizer.

use crate::Span;

/// How a token's text was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// No characters were collected before the terminator.
    Empty,
    /// Bare (unquoted) text: `localhost`, `c&*$(01$`
    Bare,
    /// Quoted text, quotes removed: `"a b"` or `'a b'`
    Quoted,
}

/// The structural character (or lack of one) that ended a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Terminator {
    /// `:`
    Colon,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// Whitespace or end of line, with something other than `:`, `{` or `}` next.
    Space,
    /// End of input
    Eof,
}

/// Where the parser expects the token to sit in an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPosition {
    /// Before the `:`
    Key,
    /// After the `:`
    Value,
}

/// A token: its text, how it was written, and what ended it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// Token text with any quotes stripped.
    pub text: String,
    /// What ended the token.
    pub terminator: Terminator,
    /// The span of the token body in the source text.
    pub span: Span,
    /// Physical line the token starts on.
    pub line: u32,
}

impl Token {
    /// Create a new token.
    pub fn new(kind: TokenKind, text: String, terminator: Terminator, span: Span, line: u32) -> Self {
        Self {
            kind,
            text,
            terminator,
            span,
            line,
        }
    }

    /// Whether no text at all was written (a quoted `""` is present, not empty).
    pub fn is_empty(&self) -> bool {
        self.kind == TokenKind::Empty
    }
}
