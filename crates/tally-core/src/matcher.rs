//! Wildcard name matching for bulk registry operations.
//!
//! Patterns are either a literal name (full, case-sensitive equality) or a
//! literal prefix followed by a single trailing `*`. Anything else is
//! rejected up front rather than guessed at. Patterns are never used for
//! metric lookup, only for bulk mutation and descriptor filtering.

use std::fmt;

use crate::error::Error;

/// A parsed match pattern: a literal, or a prefix with a trailing wildcard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamePattern {
    literal: String,
    wildcard: bool,
}

impl NamePattern {
    /// Parse a pattern, rejecting multiple or non-trailing wildcards.
    pub fn parse(pattern: &str) -> Result<Self, Error> {
        match pattern.find('*') {
            None => Ok(Self {
                literal: pattern.to_string(),
                wildcard: false,
            }),
            Some(pos) if pos == pattern.len() - 1 => Ok(Self {
                literal: pattern[..pos].to_string(),
                wildcard: true,
            }),
            Some(_) => Err(Error::InvalidPattern(pattern.to_string())),
        }
    }

    /// Whether `name` matches this pattern.
    pub fn matches(&self, name: &str) -> bool {
        if self.wildcard {
            name.starts_with(&self.literal)
        } else {
            name == self.literal
        }
    }

    /// True for prefix patterns, false for exact literals.
    pub fn is_wildcard(&self) -> bool {
        self.wildcard
    }
}

impl fmt::Display for NamePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.wildcard {
            write!(f, "{}*", self.literal)
        } else {
            f.write_str(&self.literal)
        }
    }
}
