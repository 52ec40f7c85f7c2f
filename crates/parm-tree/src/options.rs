//! Options for parsing parameter files.

use parm_tokenizer::{DEFAULT_MAX_LINE_LENGTH, DEFAULT_MAX_TOKEN_LENGTH};

/// Limits applied while parsing.
///
/// Nesting depth is not limited here: blocks nest as deep as memory allows.
/// How deep a [`Cursor`](crate::Cursor) may descend is configured on the
/// cursor itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Max content bytes on one physical line, terminator excluded (default: 511)
    pub max_line_length: usize,

    /// Max bytes in a single key or value, quotes excluded (default: 511)
    pub max_token_length: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            max_token_length: DEFAULT_MAX_TOKEN_LENGTH,
        }
    }
}

impl ParseOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options with no line or token length limits.
    pub fn unlimited() -> Self {
        Self {
            max_line_length: usize::MAX,
            max_token_length: usize::MAX,
        }
    }

    /// Set the maximum line length.
    pub fn max_line_length(mut self, max: usize) -> Self {
        self.max_line_length = max;
        self
    }

    /// Set the maximum token length.
    pub fn max_token_length(mut self, max: usize) -> Self {
        self.max_token_length = max;
        self
    }
}
