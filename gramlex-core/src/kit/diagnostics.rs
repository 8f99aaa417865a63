//! Structured diagnostics
//!
//! Every recoverable problem found by the scanner or the tree walker is
//! classified as a [`GrammarErrorKind`] and forwarded to a [`DiagnosticSink`]
//! together with its location and raw arguments. Message wording belongs to
//! whoever consumes the sink.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::kit::lexer::core::SourceSpan;

/// Diagnostic classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrammarErrorKind {
    // Lexical, recoverable
    UnterminatedComment,
    UnterminatedDocComment,
    UnterminatedStringLiteral,
    UnterminatedAction,
    UnterminatedArgAction,
    UnterminatedCharSet,
    InvalidEscapeSequence,
    UnrecognizedCharacter,

    // Tree shape
    StructuralMismatch,

    // Named dispatch
    UnknownProduction,
    RecursionLimit,
}

impl GrammarErrorKind {
    /// Stable code for the kind
    pub fn code(&self) -> &'static str {
        match self {
            GrammarErrorKind::UnterminatedComment => "UNTERMINATED_COMMENT",
            GrammarErrorKind::UnterminatedDocComment => "UNTERMINATED_DOC_COMMENT",
            GrammarErrorKind::UnterminatedStringLiteral => "UNTERMINATED_STRING_LITERAL",
            GrammarErrorKind::UnterminatedAction => "UNTERMINATED_ACTION",
            GrammarErrorKind::UnterminatedArgAction => "UNTERMINATED_ARG_ACTION",
            GrammarErrorKind::UnterminatedCharSet => "UNTERMINATED_CHAR_SET",
            GrammarErrorKind::InvalidEscapeSequence => "INVALID_ESCAPE_SEQUENCE",
            GrammarErrorKind::UnrecognizedCharacter => "UNRECOGNIZED_CHARACTER",
            GrammarErrorKind::StructuralMismatch => "STRUCTURAL_MISMATCH",
            GrammarErrorKind::UnknownProduction => "UNKNOWN_PRODUCTION",
            GrammarErrorKind::RecursionLimit => "RECURSION_LIMIT",
        }
    }

    /// Lexical conditions never stop tokenization
    pub fn is_lexical(&self) -> bool {
        !matches!(
            self,
            GrammarErrorKind::StructuralMismatch
                | GrammarErrorKind::UnknownProduction
                | GrammarErrorKind::RecursionLimit
        )
    }
}

/// One reported condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: GrammarErrorKind,
    /// Offending text, when the condition is tied to the source
    pub span: Option<SourceSpan>,
    /// Raw arguments (offending text, expected shape, ...)
    pub args: Vec<String>,
}

impl Diagnostic {
    pub fn new(kind: GrammarErrorKind) -> Self {
        Self {
            kind,
            span: None,
            args: Vec::new(),
        }
    }

    /// Diagnostic tied to a source range
    pub fn at(kind: GrammarErrorKind, span: SourceSpan) -> Self {
        Self {
            kind,
            span: Some(span),
            args: Vec::new(),
        }
    }

    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// 1-based line, when known
    pub fn line(&self) -> Option<usize> {
        self.span.map(|s| s.start.line)
    }

    /// 1-based column, when known
    pub fn column(&self) -> Option<usize> {
        self.span.map(|s| s.start.column)
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.span {
            Some(span) => write!(f, "[{}:{}] ", span.start.line, span.start.column)?,
            None => write!(f, "[?:?] ")?,
        }
        write!(f, "{}", self.kind.code())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Receiver of diagnostics
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for Arc<S> {
    fn report(&self, diagnostic: Diagnostic) {
        (**self).report(diagnostic)
    }
}

/// Cloneable in-memory collector; clones share the same storage
#[derive(Debug, Clone, Default)]
pub struct DiagnosticBuffer {
    records: Arc<Mutex<Vec<Diagnostic>>>,
}

impl DiagnosticBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Diagnostic>> {
        // a panic while holding the lock cannot leave a Vec half-pushed
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of diagnostics received so far
    pub fn error_count(&self) -> usize {
        self.lock().len()
    }

    /// Number of diagnostics of one kind
    pub fn count_of(&self, kind: GrammarErrorKind) -> usize {
        self.lock().iter().filter(|d| d.kind == kind).count()
    }

    /// Copy of everything received, in report order
    pub fn dump(&self) -> Vec<Diagnostic> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl DiagnosticSink for DiagnosticBuffer {
    fn report(&self, diagnostic: Diagnostic) {
        self.lock().push(diagnostic);
    }
}

/// Fallback sink writing each diagnostic to standard error
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrSink;

impl DiagnosticSink for StderrSink {
    fn report(&self, diagnostic: Diagnostic) {
        eprintln!("{diagnostic}");
    }
}
