#![doc = include_str!("../README.md")]
//! Parameter trees for parm files.
//!
//! This crate parses a parameter file into an immutable [`Tree`] and walks it
//! with a [`Cursor`].

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

mod builder;
mod cursor;
mod diagnostic;
mod options;
mod value;

pub use builder::TreeBuilder;
pub use cursor::{Cursor, DEFAULT_MAX_DEPTH, FindResult, NavError, NextResult};
pub use diagnostic::ParseError;
pub use options::ParseOptions;
pub use parm_tokenizer::{ParseErrorKind, Span, SyntaxError};
pub use value::{Entry, Level, Tree, Value};

/// Parse a parameter file with default options.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Tree, ParseError> {
    parse_file_with(path, &ParseOptions::default())
}

/// Parse a parameter file.
pub fn parse_file_with(path: impl AsRef<Path>, options: &ParseOptions) -> Result<Tree, ParseError> {
    let path = path.as_ref();
    debug!(path = %path.display(), "parsing parameter file");
    let file = File::open(path).map_err(|err| {
        debug!(path = %path.display(), error = %err, "cannot open parameter file");
        ParseError::new(err, Span::default(), 0)
    })?;
    parse_reader(BufReader::new(file), options)
}

/// Parse parameters from any buffered reader.
pub fn parse_reader<R: BufRead>(reader: R, options: &ParseOptions) -> Result<Tree, ParseError> {
    match TreeBuilder::new(reader, options).build() {
        Ok(tree) => {
            debug!(entries = tree.root().len(), "parsed parameters");
            Ok(tree)
        }
        Err(err) => {
            debug!(kind = err.kind.name(), line = err.line, error = %err, "parse failed");
            Err(err)
        }
    }
}

/// Parse parameters from a string with default options.
pub fn parse_str(source: &str) -> Result<Tree, ParseError> {
    parse_reader(source.as_bytes(), &ParseOptions::default())
}
