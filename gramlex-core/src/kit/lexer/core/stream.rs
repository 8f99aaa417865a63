//! Character stream
//!
//! A positionable view over the source text: lookahead at any distance,
//! consumption with line/column tracking, and mark/rewind checkpoints for
//! speculative sub-scans.

use super::position::{SourcePosition, SourceSpan};

/// Character stream errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StreamError {
    #[error("seek offset {offset} is past the end of input ({len} bytes)")]
    OutOfBounds { offset: usize, len: usize },

    #[error("seek offset {0} is not on a UTF-8 character boundary")]
    NotCharBoundary(usize),
}

/// Saved stream position, restored by [`CharStream::rewind`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark {
    position: SourcePosition,
}

impl Mark {
    pub fn position(&self) -> SourcePosition {
        self.position
    }

    pub fn offset(&self) -> usize {
        self.position.offset
    }
}

/// Character stream over an in-memory source
#[derive(Debug, Clone)]
pub struct CharStream<'src> {
    source: &'src str,
    position: SourcePosition,
}

impl<'src> CharStream<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            position: SourcePosition::start(),
        }
    }

    /// The whole underlying source
    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Current position
    pub fn position(&self) -> SourcePosition {
        self.position
    }

    /// Current byte offset
    pub fn offset(&self) -> usize {
        self.position.offset
    }

    pub fn is_eof(&self) -> bool {
        self.position.offset >= self.source.len()
    }

    /// Look `k` characters ahead without consuming (`peek(0)` is the current char)
    pub fn peek(&self, k: usize) -> Option<char> {
        self.remaining().chars().nth(k)
    }

    /// Consume one character
    pub fn advance(&mut self) -> Option<char> {
        let c = self.remaining().chars().next()?;
        self.position.advance(c);
        Some(c)
    }

    /// Consume characters while `pred` holds; returns how many were consumed
    pub fn advance_while(&mut self, mut pred: impl FnMut(char) -> bool) -> usize {
        let mut count = 0;
        while let Some(c) = self.peek(0) {
            if !pred(c) {
                break;
            }
            self.advance();
            count += 1;
        }
        count
    }

    /// Check whether the current character matches (does not consume)
    pub fn check(&self, expected: char) -> bool {
        self.peek(0) == Some(expected)
    }

    /// Check whether the current character is one of `chars` (does not consume)
    pub fn check_in(&self, chars: &[char]) -> bool {
        matches!(self.peek(0), Some(c) if chars.contains(&c))
    }

    /// Check whether the remaining input starts with `text` (does not consume)
    pub fn check_str(&self, text: &str) -> bool {
        self.remaining().starts_with(text)
    }

    /// Consume the current character if it matches
    pub fn match_char(&mut self, expected: char) -> bool {
        if self.check(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume `text` if the remaining input starts with it
    pub fn match_str(&mut self, text: &str) -> bool {
        if !self.check_str(text) {
            return false;
        }
        for c in text.chars() {
            self.position.advance(c);
        }
        true
    }

    /// Take a checkpoint of the current position
    pub fn mark(&self) -> Mark {
        Mark {
            position: self.position,
        }
    }

    /// Return to a checkpoint taken on this stream
    pub fn rewind(&mut self, mark: Mark) {
        self.position = mark.position;
    }

    /// Move to an absolute byte offset, recomputing line and column
    pub fn seek(&mut self, offset: usize) -> Result<(), StreamError> {
        if offset > self.source.len() {
            return Err(StreamError::OutOfBounds {
                offset,
                len: self.source.len(),
            });
        }
        if !self.source.is_char_boundary(offset) {
            return Err(StreamError::NotCharBoundary(offset));
        }
        if offset < self.position.offset {
            self.position = SourcePosition::start();
        }
        while self.position.offset < offset {
            if self.advance().is_none() {
                break;
            }
        }
        Ok(())
    }

    /// Text between a checkpoint and the current position
    pub fn text_since(&self, mark: Mark) -> &'src str {
        &self.source[mark.position.offset..self.position.offset]
    }

    /// Span between a checkpoint and the current position
    pub fn span_since(&self, mark: Mark) -> SourceSpan {
        SourceSpan::range(mark.position, self.position)
    }

    /// Unconsumed input
    pub fn remaining(&self) -> &'src str {
        &self.source[self.position.offset..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_ascii() {
        let mut stream = CharStream::new("abc");
        assert!(stream.check('a'));
        assert_eq!(stream.advance(), Some('a'));
        assert_eq!(stream.advance(), Some('b'));
        assert_eq!(stream.advance(), Some('c'));
        assert_eq!(stream.advance(), None);
        assert!(stream.is_eof());
    }

    #[test]
    fn test_stream_lookahead() {
        let stream = CharStream::new("/**/");
        assert_eq!(stream.peek(0), Some('/'));
        assert_eq!(stream.peek(1), Some('*'));
        assert_eq!(stream.peek(3), Some('/'));
        assert_eq!(stream.peek(4), None);
    }

    #[test]
    fn test_stream_multibyte() {
        let mut stream = CharStream::new("中é");
        assert_eq!(stream.advance(), Some('中'));
        assert_eq!(stream.offset(), 3);
        assert_eq!(stream.advance(), Some('é'));
        assert_eq!(stream.position().column, 3);
    }

    #[test]
    fn test_stream_position_tracking() {
        let mut stream = CharStream::new("a\nb");
        stream.advance();
        stream.advance();
        let pos = stream.position();
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 1);
    }

    #[test]
    fn test_stream_mark_rewind() {
        let mut stream = CharStream::new("options {");
        let mark = stream.mark();
        assert!(stream.match_str("options"));
        assert_eq!(stream.text_since(mark), "options");
        stream.rewind(mark);
        assert_eq!(stream.offset(), 0);
        assert_eq!(stream.position(), SourcePosition::start());
    }

    #[test]
    fn test_stream_match_char() {
        let mut stream = CharStream::new("abc");
        assert!(stream.match_char('a'));
        assert!(!stream.match_char('a'));
        assert!(stream.match_char('b'));
    }

    #[test]
    fn test_stream_seek_recomputes_line() {
        let mut stream = CharStream::new("ab\ncd\nef");
        stream.seek(7).unwrap();
        assert_eq!(stream.position(), SourcePosition::new(3, 2, 7));
        stream.seek(1).unwrap();
        assert_eq!(stream.position(), SourcePosition::new(1, 2, 1));
    }

    #[test]
    fn test_stream_seek_errors() {
        let mut stream = CharStream::new("é");
        assert_eq!(stream.seek(1), Err(StreamError::NotCharBoundary(1)));
        assert_eq!(
            stream.seek(9),
            Err(StreamError::OutOfBounds { offset: 9, len: 2 })
        );
    }
}
