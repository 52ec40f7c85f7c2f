//! Tokenizer for the parm parameter file format.

use std::io::BufRead;

use tracing::trace;

use crate::scanner::{Char, Scanner};
use crate::{LexError, ParseErrorKind, Span, SyntaxError, Terminator, Token, TokenKind, TokenPosition};

/// Default maximum number of bytes in a single key or value.
pub const DEFAULT_MAX_TOKEN_LENGTH: usize = 511;

/// Pulls keys and values, one token at a time, out of a [`Scanner`].
pub struct Tokenizer<R> {
    scanner: Scanner<R>,
    /// Work buffer for the token being collected.
    buf: Vec<u8>,
    max_token_length: usize,
}

impl<R: BufRead> Tokenizer<R> {
    /// Create a tokenizer with the default line and token limits.
    pub fn new(reader: R) -> Self {
        Self::from_scanner(Scanner::new(reader), DEFAULT_MAX_TOKEN_LENGTH)
    }

    /// Create a tokenizer over an existing scanner.
    pub fn from_scanner(scanner: Scanner<R>, max_token_length: usize) -> Self {
        Self {
            scanner,
            buf: Vec::new(),
            max_token_length,
        }
    }

    /// Physical line number the scanner is on.
    #[inline]
    pub fn line_number(&self) -> u32 {
        self.scanner.line_number()
    }

    /// Byte offset of the next unread character.
    #[inline]
    pub fn offset(&self) -> u32 {
        self.scanner.offset()
    }

    /// Collect the next token and classify what terminated it.
    ///
    /// Whitespace trailing the token is consumed with lookahead, so `key :`
    /// and `key:` both end in [`Terminator::Colon`]; a token followed by
    /// anything else ends in [`Terminator::Space`] and leaves that character
    /// unread.
    pub fn next_token(&mut self, position: TokenPosition) -> Result<Token, LexError> {
        self.buf.clear();

        while self.scanner.peek()?.is_space() {
            self.scanner.next_char(false)?;
        }

        let start = self.scanner.offset();
        let line = self.scanner.line_number();
        let mut end = start;
        let mut kind = TokenKind::Empty;
        let mut quote: Option<u8> = None;
        let mut c = self.scanner.next_char(false)?;

        let terminator = loop {
            let b = match c {
                Char::Byte(b) => b,
                Char::Eof if quote.is_some() => {
                    let span = Span::new(start, self.scanner.offset());
                    return Err(self.error(SyntaxError::UnterminatedQuote, span));
                }
                Char::Eof => break Terminator::Eof,
            };

            match quote {
                Some(q) if b == q => {
                    end = self.scanner.offset();
                    break self.terminator_after(true)?;
                }
                Some(_) => {}
                None => match b {
                    b'"' | b'\'' => {
                        if kind != TokenKind::Empty {
                            let span = Span::new(start, self.scanner.offset());
                            return Err(self.error(SyntaxError::MixedQuoting, span));
                        }
                        quote = Some(b);
                        kind = TokenKind::Quoted;
                        c = self.scanner.next_char(true)?;
                        continue;
                    }
                    b':' => break Terminator::Colon,
                    b'{' => break Terminator::LBrace,
                    b'}' => break Terminator::RBrace,
                    b' ' | b'\t' => break self.terminator_after(false)?,
                    _ => kind = TokenKind::Bare,
                },
            }

            self.push(b, start)?;
            end = self.scanner.offset();
            c = self.scanner.next_char(quote.is_some())?;
        };

        let span = Span::new(start, end);
        let text = decode(&self.buf);

        trace!(?position, ?kind, ?terminator, ?span, line, text = %text, "token");
        Ok(Token::new(kind, text, terminator, span, line))
    }

    /// Gobble whitespace after a token body and find the real terminator.
    ///
    /// With `adjacent` set (right after a closing quote), anything but
    /// whitespace or a structural character is an error.
    fn terminator_after(&mut self, mut adjacent: bool) -> Result<Terminator, LexError> {
        loop {
            let terminator = match self.scanner.peek()? {
                Char::Eof => return Ok(Terminator::Eof),
                Char::Byte(b':') => Terminator::Colon,
                Char::Byte(b'{') => Terminator::LBrace,
                Char::Byte(b'}') => Terminator::RBrace,
                c if c.is_space() => {
                    self.scanner.next_char(false)?;
                    adjacent = false;
                    continue;
                }
                Char::Byte(_) if adjacent => {
                    let span = Span::empty(self.scanner.offset());
                    return Err(self.error(SyntaxError::MixedQuoting, span));
                }
                Char::Byte(_) => return Ok(Terminator::Space),
            };
            self.scanner.next_char(false)?;
            return Ok(terminator);
        }
    }

    fn push(&mut self, b: u8, start: u32) -> Result<(), LexError> {
        if self.buf.len() >= self.max_token_length {
            let span = Span::new(start, self.scanner.offset());
            return Err(self.error(
                ParseErrorKind::TokenTooLong {
                    max: self.max_token_length,
                },
                span,
            ));
        }
        if self.buf.try_reserve(1).is_err() {
            let span = Span::new(start, self.scanner.offset());
            return Err(self.error(ParseErrorKind::OutOfMemory, span));
        }
        self.buf.push(b);
        Ok(())
    }

    fn error(&self, kind: impl Into<ParseErrorKind>, span: Span) -> LexError {
        LexError::new(kind, span, self.scanner.line_number())
    }
}

/// Token bytes as text: UTF-8 when valid, otherwise one char per byte (Latin-1).
fn decode(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_owned(),
        Err(_) => bytes.iter().copied().map(char::from).collect(),
    }
}
