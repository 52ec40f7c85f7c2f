//! The parameter tree.
//!
//! A [`Tree`] owns its root [`Level`]; every level owns its [`Entry`]s in
//! file order, and every entry owns its [`Value`], which is either a string or
//! a nested level. Dropping the tree frees everything at once. There is no
//! way to change a tree after parsing.

use std::str::FromStr;

use parm_tokenizer::Span;

use crate::{Cursor, ParseError};

/// A parsed parameter file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    root: Level,
}

/// The entries of one nesting scope, in file order.
///
/// Duplicate keys are kept; they are told apart only by position. A level
/// holds no link to its parent: the enclosing level is reached only through
/// [`Cursor::ascend`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Level {
    entries: Vec<Entry>,
    /// From `{` to `}`; `None` for the root.
    span: Option<Span>,
}

/// A key bound to a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    key: String,
    value: Value,
    /// Span of the key.
    span: Span,
}

/// The value of an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A string, quotes removed.
    Scalar(String),
    /// A `{ ... }` block.
    Nested(Level),
}

impl Tree {
    pub(crate) fn new(root: Level) -> Self {
        Self { root }
    }

    /// Parse a tree from a string with default options.
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        crate::parse_str(source)
    }

    /// The top-level entries.
    pub fn root(&self) -> &Level {
        &self.root
    }

    /// A cursor positioned before the first root entry.
    pub fn cursor(&self) -> Cursor<'_> {
        Cursor::new(self)
    }

    /// A cursor that may descend at most `max_depth` levels (`None`: unbounded).
    pub fn cursor_with_max_depth(&self, max_depth: Option<usize>) -> Cursor<'_> {
        Cursor::with_max_depth(self, max_depth)
    }
}

impl FromStr for Tree {
    type Err = ParseError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        Tree::parse(source)
    }
}

impl Level {
    pub(crate) fn new(entries: Vec<Entry>, span: Option<Span>) -> Self {
        Self { entries, span }
    }

    /// All entries, in file order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the entries.
    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    /// Value of the first entry with this key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| &entry.value)
    }

    /// Values of every entry with this key, in file order.
    pub fn get_all<'a>(&'a self, key: &str) -> impl Iterator<Item = &'a Value> {
        self.entries
            .iter()
            .filter(move |entry| entry.key == key)
            .map(|entry| &entry.value)
    }

    /// Source span from `{` to `}`, or `None` for the root.
    pub fn span(&self) -> Option<Span> {
        self.span
    }
}

impl<'a> IntoIterator for &'a Level {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Entry {
    pub(crate) fn new(key: String, value: Value, span: Span) -> Self {
        Self { key, value, span }
    }

    /// The key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Source span of the key.
    pub fn span(&self) -> Span {
        self.span
    }

    /// The string value, if this entry holds one.
    pub fn as_str(&self) -> Option<&str> {
        self.value.as_str()
    }

    /// The nested level, if this entry holds one.
    pub fn as_level(&self) -> Option<&Level> {
        self.value.as_level()
    }
}

impl Value {
    /// Get as string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Scalar(text) => Some(text),
            Value::Nested(_) => None,
        }
    }

    /// Get as nested level.
    pub fn as_level(&self) -> Option<&Level> {
        match self {
            Value::Nested(level) => Some(level),
            Value::Scalar(_) => None,
        }
    }

    /// Whether this is a nested level.
    pub fn is_nested(&self) -> bool {
        matches!(self, Value::Nested(_))
    }

    /// Whether this is a string.
    pub fn is_scalar(&self) -> bool {
        matches!(self, Value::Scalar(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty() {
        let tree = Tree::parse("").unwrap();
        assert!(tree.root().is_empty());
        assert_eq!(tree.root().span(), None);
    }

    #[test]
    fn test_get_and_duplicates() {
        let tree: Tree = "a: 1\nb: 2\na: 3\n".parse().unwrap();
        let root = tree.root();
        assert_eq!(root.len(), 3);
        assert_eq!(root.get("a").and_then(Value::as_str), Some("1"));
        assert_eq!(root.get("b").and_then(Value::as_str), Some("2"));
        assert_eq!(root.get("c"), None);
        let all: Vec<_> = root.get_all("a").filter_map(Value::as_str).collect();
        assert_eq!(all, vec!["1", "3"]);
    }

    #[test]
    fn test_nested_access() {
        let tree = Tree::parse("server: {\n  host: localhost\n}\nport: 80\n").unwrap();
        let keys: Vec<_> = tree.root().iter().map(Entry::key).collect();
        assert_eq!(keys, vec!["server", "port"]);

        let server = &tree.root().entries()[0];
        assert!(server.value().is_nested());
        assert_eq!(server.as_str(), None);
        let level = server.as_level().unwrap();
        assert_eq!(level.get("host").and_then(Value::as_str), Some("localhost"));

        let port = &tree.root().entries()[1];
        assert!(port.value().is_scalar());
        assert_eq!(port.as_level(), None);
        assert_eq!(port.as_str(), Some("80"));
    }

    #[test]
    fn test_spans() {
        let source = "server: {\n  host: localhost\n}\n";
        let tree = Tree::parse(source).unwrap();
        let server = &tree.root().entries()[0];
        assert_eq!(server.span().slice(source), Some("server"));
        let block = server.as_level().unwrap().span().unwrap();
        assert_eq!(block.slice(source), Some("{\n  host: localhost\n}"));
        let host = &server.as_level().unwrap().entries()[0];
        assert_eq!(host.span().slice(source), Some("host"));
    }

    #[test]
    fn test_into_iterator() {
        let tree = Tree::parse("x: 1\ny: 2").unwrap();
        let mut seen = Vec::new();
        for entry in tree.root() {
            seen.push((entry.key(), entry.as_str()));
        }
        assert_eq!(seen, vec![("x", Some("1")), ("y", Some("2"))]);
    }
}
