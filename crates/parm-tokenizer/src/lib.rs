#![doc = include_str!("../README.md")]

mod error;
pub use error::{LexError, ParseErrorKind, SyntaxError};

mod span;
pub use span::Span;

pub mod scanner;
pub use scanner::{Char, DEFAULT_MAX_LINE_LENGTH, Scanner};

mod token;
pub use token::{Terminator, Token, TokenKind, TokenPosition};

mod tokenizer;
pub use tokenizer::{DEFAULT_MAX_TOKEN_LENGTH, Tokenizer};
