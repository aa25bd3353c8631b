//! Source locations reported by format plugins.

use std::fmt;

/// Position in the underlying character stream.
///
/// Lines and columns are 1-based, the character offset is 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location {
    pub character_offset: u64,
    pub line: u64,
    pub column: u64,
}

impl Location {
    #[inline]
    pub const fn new(character_offset: u64, line: u64, column: u64) -> Self {
        Self { character_offset, line, column }
    }

    /// Start of a stream.
    pub const START: Location = Location::new(0, 1, 1);

    /// Advance over `text`, counting `\n` as a line break.
    pub fn advance(&mut self, text: &str) {
        for ch in text.chars() {
            self.character_offset += 1;
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::START
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance() {
        let mut location = Location::START;
        location.advance("ab\ncd");
        assert_eq!(location, Location::new(5, 2, 3));
        location.advance("\n");
        assert_eq!(location, Location::new(6, 3, 1));
    }
}
