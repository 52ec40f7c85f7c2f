//! Line-buffered character source.
//!
//! The scanner hands out one byte at a time from the current physical line.
//! Line terminators are stripped, blank lines are skipped, and outside of
//! quotes a `#` turns the rest of the line into a comment. The end of a line
//! (or the start of a comment) reads as a single space: it ends a bare token,
//! and inside quotes it folds the line break into the text.
//!
//! At most `max_line_length` content bytes plus a `\r\n` are read for one
//! line; a longer line is rejected without reading the rest of it.

use std::io::{BufRead, Read};

use tracing::trace;

use crate::{LexError, ParseErrorKind, Span};

/// Default maximum number of content bytes on one physical line.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 511;

/// One unit of scanner output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Char {
    /// A byte of input, or `b' '` for an end of line or comment.
    Byte(u8),
    /// End of input. Once returned, it is returned forever.
    Eof,
}

impl Char {
    /// Whether this is a space, tab, or end-of-line marker.
    #[inline]
    pub fn is_space(self) -> bool {
        matches!(self, Char::Byte(b' ' | b'\t'))
    }
}

/// Reads a parameter file line by line and yields significant characters.
pub struct Scanner<R> {
    reader: R,
    /// Current line with its terminator removed.
    line: Vec<u8>,
    /// Index of the next unread byte in `line`.
    pos: usize,
    /// `line` still has bytes (or its end-of-line space) to give out.
    have_line: bool,
    /// A lookahead saw the end of the line; the next read returns its space.
    eol_peeked: bool,
    eof: bool,
    line_number: u32,
    /// Byte offset of `line` within the whole input.
    line_start: u32,
    /// Byte offset of the first byte not yet read from `reader`.
    consumed: u32,
    max_line_length: usize,
}

impl<R: BufRead> Scanner<R> {
    /// Create a scanner with the default line length limit.
    pub fn new(reader: R) -> Self {
        Self::with_max_line_length(reader, DEFAULT_MAX_LINE_LENGTH)
    }

    /// Create a scanner that rejects lines longer than `max_line_length` bytes.
    pub fn with_max_line_length(reader: R, max_line_length: usize) -> Self {
        Self {
            reader,
            line: Vec::new(),
            pos: 0,
            have_line: false,
            eol_peeked: false,
            eof: false,
            line_number: 0,
            line_start: 0,
            consumed: 0,
            max_line_length,
        }
    }

    /// Physical line number of the current line (1-based, 0 before the first read).
    #[inline]
    pub fn line_number(&self) -> u32 {
        self.line_number
    }

    /// Byte offset of the next character to be consumed.
    #[inline]
    pub fn offset(&self) -> u32 {
        let pos = if self.have_line { self.pos } else { self.line.len() };
        self.line_start.saturating_add(pos as u32)
    }

    /// Whether end of input has been reached.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.eof && !self.have_line && !self.eol_peeked
    }

    /// Peek at the next significant character without consuming it.
    ///
    /// Comments are always recognized here; lookahead is only used between
    /// tokens, never inside quotes.
    pub fn peek(&mut self) -> Result<Char, LexError> {
        self.read(true, false)
    }

    /// Consume and return the next character.
    ///
    /// When `in_quotes` is set, `#` is ordinary text.
    pub fn next_char(&mut self, in_quotes: bool) -> Result<Char, LexError> {
        self.read(false, in_quotes)
    }

    fn read(&mut self, lookahead: bool, in_quotes: bool) -> Result<Char, LexError> {
        if !self.have_line {
            if self.eol_peeked {
                if !lookahead {
                    self.eol_peeked = false;
                }
                return Ok(Char::Byte(b' '));
            }
            if self.eof || !self.refill()? {
                return Ok(Char::Eof);
            }
        }

        // End of line, or the start of a comment: hand out a single space and
        // move on to the next line afterwards.
        if self.pos == self.line.len() || (self.line[self.pos] == b'#' && !in_quotes) {
            self.have_line = false;
            self.pos = self.line.len();
            if lookahead {
                self.eol_peeked = true;
            }
            return Ok(Char::Byte(b' '));
        }

        let c = self.line[self.pos];
        if !lookahead {
            self.pos += 1;
        }
        Ok(Char::Byte(c))
    }

    /// Load the next non-blank line. Returns `false` at end of input.
    fn refill(&mut self) -> Result<bool, LexError> {
        loop {
            self.line.clear();
            // Room for a full line and its `\r\n`; anything past that is an error anyway.
            let limit = u64::try_from(self.max_line_length)
                .unwrap_or(u64::MAX)
                .saturating_add(2);
            let read = match (&mut self.reader).take(limit).read_until(b'\n', &mut self.line) {
                Ok(read) => read,
                Err(err) => {
                    self.eof = true;
                    return Err(LexError::new(
                        err,
                        Span::empty(self.consumed),
                        self.line_number,
                    ));
                }
            };
            if read == 0 {
                self.eof = true;
                self.line_start = self.consumed;
                trace!(line = self.line_number, "end of input");
                return Ok(false);
            }

            self.line_start = self.consumed;
            self.consumed = self.consumed.saturating_add(read as u32);
            self.line_number += 1;

            if self.line.last() == Some(&b'\n') {
                self.line.pop();
            }
            if self.line.last() == Some(&b'\r') {
                self.line.pop();
            }

            // Without a `\n` the line was either cut at `limit` or is the last one.
            if self.line.len() > self.max_line_length {
                let length = self.line.len();
                let span = Span::new(self.line_start, self.line_start.saturating_add(length as u32));
                self.line.clear();
                self.eof = true;
                return Err(LexError::new(
                    ParseErrorKind::LineTooLong {
                        length,
                        max: self.max_line_length,
                    },
                    span,
                    self.line_number,
                ));
            }

            if self.line.is_empty() {
                continue;
            }

            trace!(line = self.line_number, len = self.line.len(), "read line");
            self.pos = 0;
            self.have_line = true;
            return Ok(true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(source: &str) -> String {
        let mut scanner = Scanner::new(source.as_bytes());
        let mut out = String::new();
        while let Char::Byte(b) = scanner.next_char(false).unwrap() {
            out.push(b as char);
        }
        out
    }

    #[test]
    fn test_line_endings_become_spaces() {
        parm_testhelpers::init_tracing();
        assert_eq!(drain("ab\ncd\n"), "ab cd ");
        assert_eq!(drain("ab\r\ncd\r\n"), "ab cd ");
        assert_eq!(drain("ab\ncd"), "ab cd ");
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        assert_eq!(drain("\n\nab\n\r\n\ncd\n"), "ab cd ");
        assert_eq!(drain(""), "");
        assert_eq!(drain("\n\r\n"), "");
    }

    #[test]
    fn test_comment_reads_as_single_space() {
        assert_eq!(drain("# only a comment\nab # trailing\ncd"), " ab  cd ");
    }

    #[test]
    fn test_hash_is_literal_in_quotes() {
        let mut scanner = Scanner::new("#x".as_bytes());
        assert_eq!(scanner.next_char(true).unwrap(), Char::Byte(b'#'));
        assert_eq!(scanner.next_char(true).unwrap(), Char::Byte(b'x'));
        assert_eq!(scanner.next_char(true).unwrap(), Char::Byte(b' '));
        assert_eq!(scanner.next_char(true).unwrap(), Char::Eof);
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut scanner = Scanner::new("ab".as_bytes());
        assert_eq!(scanner.peek().unwrap(), Char::Byte(b'a'));
        assert_eq!(scanner.peek().unwrap(), Char::Byte(b'a'));
        assert_eq!(scanner.next_char(false).unwrap(), Char::Byte(b'a'));
        assert_eq!(scanner.next_char(false).unwrap(), Char::Byte(b'b'));
    }

    #[test]
    fn test_peek_at_end_of_line() {
        let mut scanner = Scanner::new("a\n:".as_bytes());
        assert_eq!(scanner.next_char(false).unwrap(), Char::Byte(b'a'));
        // The end of line is seen as a space, twice, without moving on.
        assert_eq!(scanner.peek().unwrap(), Char::Byte(b' '));
        assert_eq!(scanner.peek().unwrap(), Char::Byte(b' '));
        // Consuming it returns exactly what was peeked.
        assert_eq!(scanner.next_char(false).unwrap(), Char::Byte(b' '));
        assert_eq!(scanner.peek().unwrap(), Char::Byte(b':'));
        assert_eq!(scanner.next_char(false).unwrap(), Char::Byte(b':'));
        assert_eq!(scanner.next_char(false).unwrap(), Char::Byte(b' '));
        assert_eq!(scanner.peek().unwrap(), Char::Eof);
    }

    #[test]
    fn test_eof_is_sticky() {
        let mut scanner = Scanner::new("a".as_bytes());
        scanner.next_char(false).unwrap();
        scanner.next_char(false).unwrap();
        for _ in 0..3 {
            assert_eq!(scanner.next_char(false).unwrap(), Char::Eof);
            assert_eq!(scanner.peek().unwrap(), Char::Eof);
        }
        assert!(scanner.is_eof());
    }

    #[test]
    fn test_line_too_long() {
        let source = format!("ok\n{}\n", "x".repeat(DEFAULT_MAX_LINE_LENGTH + 1));
        let mut scanner = Scanner::new(source.as_bytes());
        assert_eq!(scanner.next_char(false).unwrap(), Char::Byte(b'o'));
        assert_eq!(scanner.next_char(false).unwrap(), Char::Byte(b'k'));
        assert_eq!(scanner.next_char(false).unwrap(), Char::Byte(b' '));
        let err = scanner.next_char(false).unwrap_err();
        assert!(matches!(
            err.kind,
            ParseErrorKind::LineTooLong { length: 512, max: 511 }
        ));
        assert_eq!(err.line, 2);
        assert_eq!(err.span, Span::new(3, 515));
    }

    /// Endless `x` bytes with no line break, counting what is consumed.
    struct Endless {
        chunk: [u8; 64],
        consumed: usize,
    }

    impl std::io::Read for Endless {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let n = buf.len().min(self.chunk.len());
            buf[..n].copy_from_slice(&self.chunk[..n]);
            self.consumed += n;
            Ok(n)
        }
    }

    impl BufRead for Endless {
        fn fill_buf(&mut self) -> std::io::Result<&[u8]> {
            Ok(&self.chunk)
        }

        fn consume(&mut self, amt: usize) {
            self.consumed += amt;
        }
    }

    #[test]
    fn test_long_line_is_not_buffered() {
        let mut source = Endless {
            chunk: [b'x'; 64],
            consumed: 0,
        };
        let mut scanner = Scanner::with_max_line_length(&mut source, 100);
        let err = scanner.next_char(false).unwrap_err();
        assert!(matches!(
            err.kind,
            ParseErrorKind::LineTooLong { length: 102, max: 100 }
        ));
        assert_eq!(scanner.next_char(false).unwrap(), Char::Eof);
        drop(scanner);
        assert_eq!(source.consumed, 102);
    }

    #[test]
    fn test_line_at_limit_with_crlf() {
        let mut scanner = Scanner::with_max_line_length("abc\r\nd".as_bytes(), 3);
        assert_eq!(scanner.next_char(false).unwrap(), Char::Byte(b'a'));
        assert_eq!(scanner.next_char(false).unwrap(), Char::Byte(b'b'));
        assert_eq!(scanner.next_char(false).unwrap(), Char::Byte(b'c'));
        assert_eq!(scanner.next_char(false).unwrap(), Char::Byte(b' '));
        assert_eq!(scanner.next_char(false).unwrap(), Char::Byte(b'd'));

        let mut scanner = Scanner::with_max_line_length("abcd\r\n".as_bytes(), 3);
        let err = scanner.next_char(false).unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::LineTooLong { length: 4, max: 3 }));
    }

    #[test]
    fn test_offset_saturates() {
        let mut scanner = Scanner::new("ab".as_bytes());
        scanner.next_char(false).unwrap();
        scanner.line_start = u32::MAX;
        assert_eq!(scanner.offset(), u32::MAX);
    }

    #[test]
    fn test_line_at_limit_is_accepted() {
        let line = "x".repeat(DEFAULT_MAX_LINE_LENGTH);
        assert_eq!(drain(&format!("{line}\r\n")), format!("{line} "));
    }

    #[test]
    fn test_offsets_and_line_numbers() {
        let mut scanner = Scanner::new("a\n\nbc".as_bytes());
        assert_eq!(scanner.next_char(false).unwrap(), Char::Byte(b'a'));
        assert_eq!(scanner.line_number(), 1);
        assert_eq!(scanner.next_char(false).unwrap(), Char::Byte(b' '));
        assert_eq!(scanner.next_char(false).unwrap(), Char::Byte(b'b'));
        assert_eq!(scanner.line_number(), 3);
        assert_eq!(scanner.offset(), 4);
    }
}
