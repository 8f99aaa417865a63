//! Scanner trait definition
//!
//! Every concrete scanner drives a [`CharStream`] and hands back one
//! classified token per call.

use super::core::{CharStream, SourcePosition, SourceSpan};
use crate::kit::diagnostics::Diagnostic;

/// Scanner seam
pub trait Scanner<'src> {
    /// Token type
    type TokenKind: Copy + PartialEq + std::fmt::Debug;
    /// Scanning mode for context-sensitive classification
    type Mode: Copy + PartialEq + std::fmt::Debug;

    fn set_mode(&mut self, mode: Self::Mode);

    fn current_mode(&self) -> Self::Mode;

    /// Scan the next token starting at the stream's current position
    fn next_token(&mut self, stream: &mut CharStream<'src>) -> ScanResult<Token<'src, Self::TokenKind>>;
}

/// Visibility lane of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Channel {
    /// Seen by the parser
    #[default]
    Default = 0,
    /// Whitespace
    Hidden = 1,
    /// Comment text kept for documentation extraction
    Comments = 2,
}

/// Token borrowing its text from the source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src, K> {
    pub kind: K,
    pub channel: Channel,
    pub text: &'src str,
    pub span: SourceSpan,
}

impl<'src, K: Copy> Token<'src, K> {
    pub fn new(kind: K, channel: Channel, text: &'src str, span: SourceSpan) -> Self {
        Self {
            kind,
            channel,
            text,
            span,
        }
    }

    pub fn start(&self) -> SourcePosition {
        self.span.start
    }

    pub fn end(&self) -> SourcePosition {
        self.span.end
    }

    pub fn line(&self) -> usize {
        self.span.start.line
    }

    pub fn column(&self) -> usize {
        self.span.start.column
    }

    /// Detach from the source buffer
    pub fn to_owned_token(&self) -> OwnedToken<K> {
        OwnedToken {
            kind: self.kind,
            channel: self.channel,
            text: self.text.to_string(),
            span: self.span,
        }
    }
}

/// Token that owns its text, for structures that outlive the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedToken<K> {
    pub kind: K,
    pub channel: Channel,
    pub text: String,
    pub span: SourceSpan,
}

impl<K> OwnedToken<K> {
    pub fn new(kind: K, text: impl Into<String>, span: SourceSpan) -> Self {
        Self {
            kind,
            channel: Channel::Default,
            text: text.into(),
            span,
        }
    }
}

/// Outcome of one scanner step
#[derive(Debug, Clone, PartialEq)]
pub enum ScanResult<T> {
    /// A token for the stream
    Token(T),
    /// Consumed input that must not reach the parser
    Skip(T),
    /// Consumed input that matched nothing; the diagnostic describes it
    Error(T, Diagnostic),
    /// End of input
    Eof,
}

/// Grammar identifier start characters
pub fn is_name_start(c: char) -> bool {
    matches!(c,
        'A'..='Z'
        | 'a'..='z'
        | '\u{00C0}'..='\u{00D6}'
        | '\u{00D8}'..='\u{00F6}'
        | '\u{00F8}'..='\u{02FF}'
        | '\u{0370}'..='\u{037D}'
        | '\u{037F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FEFE}'
        | '\u{FF00}'..='\u{FFFD}'
    )
}

/// Grammar identifier continuation characters
pub fn is_name_char(c: char) -> bool {
    is_name_start(c)
        || matches!(c,
            '0'..='9'
            | '_'
            | '\u{00B7}'
            | '\u{0300}'..='\u{036F}'
            | '\u{203F}'..='\u{2040}'
        )
}
