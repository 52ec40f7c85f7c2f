//! Stateful navigation over a parsed [`Tree`].
//!
//! A [`Cursor`] borrows the tree and keeps its own position: the current
//! level, the current entry in it, and a stack with one frame per
//! [`Cursor::descend`]. Several cursors can walk the same tree at once.

use tracing::trace;

use crate::value::{Entry, Level, Tree, Value};

/// Default number of levels a cursor may descend below the root.
pub const DEFAULT_MAX_DEPTH: usize = 5;

/// What a cursor step landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextResult<'t> {
    /// The level has no more (matching) entries.
    End,
    /// An entry holding a string.
    Scalar {
        /// The entry key.
        key: &'t str,
        /// The entry value.
        value: &'t str,
    },
    /// An entry holding a nested level; [`Cursor::descend`] enters it.
    Nested {
        /// The entry key.
        key: &'t str,
    },
}

/// Result of [`Cursor::find_first`] and [`Cursor::find_next`].
pub type FindResult<'t> = NextResult<'t>;

impl<'t> NextResult<'t> {
    fn of(entry: &'t Entry) -> Self {
        match entry.value() {
            Value::Scalar(value) => NextResult::Scalar {
                key: entry.key(),
                value: value.as_str(),
            },
            Value::Nested(_) => NextResult::Nested { key: entry.key() },
        }
    }

    /// Whether the level was exhausted.
    pub fn is_end(&self) -> bool {
        matches!(self, NextResult::End)
    }

    /// Key of the entry, unless at the end.
    pub fn key(&self) -> Option<&'t str> {
        match *self {
            NextResult::End => None,
            NextResult::Scalar { key, .. } | NextResult::Nested { key } => Some(key),
        }
    }

    /// String value of the entry, if it holds one.
    pub fn value(&self) -> Option<&'t str> {
        match *self {
            NextResult::Scalar { value, .. } => Some(value),
            _ => None,
        }
    }
}

/// Why a cursor could not move. The cursor is left where it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavError {
    /// `descend` needs the cursor to sit on an entry.
    #[error("cursor is not on an entry")]
    NoCurrentEntry,
    /// `descend` on an entry holding a string.
    #[error("entry '{key}' is not a nested level")]
    NotNested {
        /// Key of the current entry.
        key: String,
    },
    /// The navigation stack is full.
    #[error("cannot descend more than {max} levels")]
    DepthExceeded {
        /// The configured maximum depth.
        max: usize,
    },
    /// `ascend` at the top level.
    #[error("already at the root level")]
    AtRoot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    BeforeFirst,
    At(usize),
    End,
}

/// The level a descent left, and the nested entry it went through.
#[derive(Debug, Clone)]
struct CursorFrame<'t> {
    level: &'t Level,
    index: usize,
}

/// A read-only walker over a [`Tree`].
#[derive(Debug, Clone)]
pub struct Cursor<'t> {
    tree: &'t Tree,
    level: &'t Level,
    position: Position,
    stack: Vec<CursorFrame<'t>>,
    max_depth: Option<usize>,
}

impl<'t> Cursor<'t> {
    /// A cursor before the first root entry, limited to [`DEFAULT_MAX_DEPTH`].
    pub fn new(tree: &'t Tree) -> Self {
        Self::with_max_depth(tree, Some(DEFAULT_MAX_DEPTH))
    }

    /// A cursor with a custom depth limit; `None` lifts the limit.
    pub fn with_max_depth(tree: &'t Tree, max_depth: Option<usize>) -> Self {
        Self {
            tree,
            level: tree.root(),
            position: Position::BeforeFirst,
            stack: Vec::new(),
            max_depth,
        }
    }

    /// Go back to before the first root entry.
    pub fn reset(&mut self) {
        self.level = self.tree.root();
        self.position = Position::BeforeFirst;
        self.stack.clear();
    }

    /// Advance to the next entry of the current level.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> NextResult<'t> {
        match self.resume_index() {
            Some(from) => self.seek(from, None),
            None => NextResult::End,
        }
    }

    /// Enter the nested level of the current entry.
    ///
    /// The cursor ends up before the first entry of the child level.
    pub fn descend(&mut self) -> Result<(), NavError> {
        let Position::At(index) = self.position else {
            return Err(NavError::NoCurrentEntry);
        };
        let entry = self.current().ok_or(NavError::NoCurrentEntry)?;
        let Value::Nested(child) = entry.value() else {
            return Err(NavError::NotNested {
                key: entry.key().to_owned(),
            });
        };
        if let Some(max) = self.max_depth
            && self.stack.len() >= max
        {
            return Err(NavError::DepthExceeded { max });
        }

        self.stack.push(CursorFrame {
            level: self.level,
            index,
        });
        self.level = child;
        self.position = Position::BeforeFirst;
        trace!(key = entry.key(), depth = self.stack.len(), "descend");
        Ok(())
    }

    /// Leave the current level.
    ///
    /// The cursor ends up on the nested entry it descended through, so
    /// [`Cursor::next`] continues after the block.
    pub fn ascend(&mut self) -> Result<(), NavError> {
        let frame = self.stack.pop().ok_or(NavError::AtRoot)?;
        self.level = frame.level;
        self.position = Position::At(frame.index);
        trace!(depth = self.stack.len(), "ascend");
        Ok(())
    }

    /// Find the first entry of the current level with this key.
    ///
    /// On a miss the cursor is left at the end of the level.
    pub fn find_first(&mut self, key: &str) -> FindResult<'t> {
        self.seek(0, Some(key))
    }

    /// Find the next entry with this key after the current one.
    pub fn find_next(&mut self, key: &str) -> FindResult<'t> {
        match self.resume_index() {
            Some(from) => self.seek(from, Some(key)),
            None => NextResult::End,
        }
    }

    /// The entry the cursor is on, if any.
    pub fn current(&self) -> Option<&'t Entry> {
        match self.position {
            Position::At(index) => self.level.entries().get(index),
            Position::BeforeFirst | Position::End => None,
        }
    }

    /// Number of levels below the root.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// The level the cursor is in.
    pub fn level(&self) -> &'t Level {
        self.level
    }

    /// The configured depth limit; `None` means unbounded.
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Index to continue scanning from; `None` once the level is exhausted.
    fn resume_index(&self) -> Option<usize> {
        match self.position {
            Position::BeforeFirst => Some(0),
            Position::At(index) => Some(index + 1),
            Position::End => None,
        }
    }

    fn seek(&mut self, from: usize, key: Option<&str>) -> NextResult<'t> {
        let level = self.level;
        let found = level
            .entries()
            .iter()
            .enumerate()
            .skip(from)
            .find(|(_, entry)| key.is_none_or(|key| entry.key() == key));

        match found {
            Some((index, entry)) => {
                self.position = Position::At(index);
                NextResult::of(entry)
            }
            None => {
                self.position = Position::End;
                NextResult::End
            }
        }
    }
}
