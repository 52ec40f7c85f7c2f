//! Tree builder driven by the tokenizer.
//!
//! Each level is parsed as a small state machine: read a key (which must end
//! in `:`), then a value. A value ending in `{` opens a child level; the
//! builder keeps the unfinished parents on an explicit stack, so nesting is
//! bounded by memory only. An empty key position ending in `}` or EOF closes
//! the current level.

use std::io::BufRead;

use parm_tokenizer::{
    ParseErrorKind, Scanner, Span, SyntaxError, Terminator, Token, TokenKind, TokenPosition,
    Tokenizer,
};
use tracing::trace;

use crate::value::{Entry, Level, Tree, Value};
use crate::{ParseError, ParseOptions};

/// Builds a [`Tree`] from a reader.
pub struct TreeBuilder<R> {
    tokenizer: Tokenizer<R>,
    stack: Vec<BuilderFrame>,
}

/// A parent level waiting for its child block to close.
struct BuilderFrame {
    key: String,
    key_span: Span,
    /// Span of the `{` that opened the child.
    open: Span,
    entries: Vec<Entry>,
}

impl<R: BufRead> TreeBuilder<R> {
    /// Create a builder reading from `reader`.
    pub fn new(reader: R, options: &ParseOptions) -> Self {
        let scanner = Scanner::with_max_line_length(reader, options.max_line_length);
        Self {
            tokenizer: Tokenizer::from_scanner(scanner, options.max_token_length),
            stack: Vec::new(),
        }
    }

    /// Consume the whole input and return the tree.
    ///
    /// The first error aborts the build; nothing built so far is returned.
    pub fn build(mut self) -> Result<Tree, ParseError> {
        let mut entries = Vec::new();

        loop {
            let key = self.tokenizer.next_token(TokenPosition::Key)?;

            if key.is_empty() {
                match key.terminator {
                    Terminator::Eof => match self.stack.last() {
                        None => break,
                        Some(frame) => {
                            return Err(self.error(ParseErrorKind::UnexpectedEof, frame.open));
                        }
                    },
                    Terminator::RBrace => {
                        entries = self.close_level(entries)?;
                        continue;
                    }
                    Terminator::LBrace => {
                        return Err(token_error(SyntaxError::UnexpectedOpenBrace, &key));
                    }
                    Terminator::Colon | Terminator::Space => {
                        return Err(token_error(SyntaxError::MissingKey, &key));
                    }
                }
            }
            if key.text.is_empty() {
                return Err(token_error(SyntaxError::EmptyKey, &key));
            }
            if key.terminator != Terminator::Colon {
                return Err(token_error(SyntaxError::ExpectedColon, &key));
            }

            let value = self.tokenizer.next_token(TokenPosition::Value)?;

            if value.terminator == Terminator::LBrace {
                if !value.is_empty() {
                    return Err(token_error(SyntaxError::ValueBeforeBlock, &value));
                }
                self.open_level(key, std::mem::take(&mut entries))?;
                continue;
            }

            if value.kind == TokenKind::Empty {
                return Err(match value.terminator {
                    Terminator::Eof => self.unexpected_eof(),
                    _ => token_error(SyntaxError::MissingValue, &value),
                });
            }
            // `""` is written but still empty.
            if value.text.is_empty() {
                return Err(token_error(SyntaxError::MissingValue, &value));
            }
            if value.terminator == Terminator::Colon {
                return Err(token_error(SyntaxError::UnexpectedColon, &value));
            }

            push_entry(
                &mut entries,
                Entry::new(key.text, Value::Scalar(value.text), key.span),
                key.span,
                key.line,
            )?;

            // A value can end its level too: `to: x }` or the last line of the file.
            match value.terminator {
                Terminator::RBrace => entries = self.close_level(entries)?,
                Terminator::Eof if self.stack.is_empty() => break,
                Terminator::Eof => return Err(self.unexpected_eof()),
                _ => {}
            }
        }

        trace!(entries = entries.len(), "document complete");
        Ok(Tree::new(Level::new(entries, None)))
    }

    /// Park the current entries under `key` and start a child level.
    fn open_level(&mut self, key: Token, entries: Vec<Entry>) -> Result<(), ParseError> {
        let open = self.last_char_span();
        if self.stack.try_reserve(1).is_err() {
            return Err(self.error(ParseErrorKind::OutOfMemory, open));
        }
        trace!(key = %key.text, depth = self.stack.len() + 1, "open level");
        self.stack.push(BuilderFrame {
            key: key.text,
            key_span: key.span,
            open,
            entries,
        });
        Ok(())
    }

    /// Finish the current level at a `}` and append it to its parent.
    ///
    /// Returns the parent's entries, which become the current level again.
    fn close_level(&mut self, entries: Vec<Entry>) -> Result<Vec<Entry>, ParseError> {
        let close = self.last_char_span();
        let Some(frame) = self.stack.pop() else {
            return Err(self.error(SyntaxError::UnbalancedCloseBrace, close));
        };
        trace!(key = %frame.key, depth = self.stack.len(), entries = entries.len(), "close level");

        let level = Level::new(entries, Some(frame.open.extend(close)));
        let mut parent = frame.entries;
        push_entry(
            &mut parent,
            Entry::new(frame.key, Value::Nested(level), frame.key_span),
            frame.key_span,
            self.tokenizer.line_number(),
        )?;
        Ok(parent)
    }

    /// Input ended inside a block, or right after a `:`.
    fn unexpected_eof(&self) -> ParseError {
        match self.stack.last() {
            // Inside a block the span points at its `{`.
            Some(frame) => self.error(ParseErrorKind::UnexpectedEof, frame.open),
            None => self.error(
                ParseErrorKind::UnexpectedEof,
                Span::empty(self.tokenizer.offset()),
            ),
        }
    }

    /// Span of the structural character the tokenizer consumed last.
    fn last_char_span(&self) -> Span {
        let end = self.tokenizer.offset();
        Span::new(end.saturating_sub(1), end)
    }

    fn error(&self, kind: impl Into<ParseErrorKind>, span: Span) -> ParseError {
        ParseError::new(kind, span, self.tokenizer.line_number())
    }
}

fn token_error(error: SyntaxError, token: &Token) -> ParseError {
    ParseError::new(error, token.span, token.line)
}

fn push_entry(entries: &mut Vec<Entry>, entry: Entry, span: Span, line: u32) -> Result<(), ParseError> {
    if entries.try_reserve(1).is_err() {
        return Err(ParseError::new(ParseErrorKind::OutOfMemory, span, line));
    }
    entries.push(entry);
    Ok(())
}
