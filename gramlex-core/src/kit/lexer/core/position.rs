//! Source position tracking
//!
//! - line/column: human readable diagnostics (1-based, column counts code points)
//! - offset: byte offset into the source (0-based), used for slicing and seeking

/// Position inside the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourcePosition {
    /// Line, 1-based
    pub line: usize,
    /// Column, 1-based, in Unicode code points
    pub column: usize,
    /// Byte offset, 0-based, UTF-8
    pub offset: usize,
}

impl Default for SourcePosition {
    fn default() -> Self {
        Self::start()
    }
}

impl SourcePosition {
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }

    /// Start of the input
    pub fn start() -> Self {
        Self {
            line: 1,
            column: 1,
            offset: 0,
        }
    }

    /// Move past one character
    pub fn advance(&mut self, c: char) {
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        self.offset += c.len_utf8();
    }
}

/// Half-open source range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceSpan {
    pub start: SourcePosition,
    pub end: SourcePosition,
}

impl SourceSpan {
    /// Empty span at a single position
    pub fn at(pos: SourcePosition) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    pub fn range(start: SourcePosition, end: SourcePosition) -> Self {
        Self { start, end }
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.end.offset - self.start.offset
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_start() {
        let pos = SourcePosition::start();
        assert_eq!(pos.line, 1);
        assert_eq!(pos.column, 1);
        assert_eq!(pos.offset, 0);
    }

    #[test]
    fn test_position_advance_ascii() {
        let mut pos = SourcePosition::start();
        pos.advance('a');
        pos.advance('b');
        assert_eq!(pos.column, 3);
        assert_eq!(pos.offset, 2);
    }

    #[test]
    fn test_position_advance_newline() {
        let mut pos = SourcePosition::start();
        pos.advance('a');
        pos.advance('\n');
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 1);
        assert_eq!(pos.offset, 2);
    }

    #[test]
    fn test_position_advance_multibyte() {
        let mut pos = SourcePosition::start();
        pos.advance('é');
        assert_eq!(pos.column, 2);
        assert_eq!(pos.offset, 2);
    }

    #[test]
    fn test_span_len() {
        let span = SourceSpan::range(SourcePosition::new(1, 1, 3), SourcePosition::new(1, 4, 6));
        assert_eq!(span.len(), 3);
        assert!(!span.is_empty());
        assert!(SourceSpan::at(SourcePosition::start()).is_empty());
    }
}
