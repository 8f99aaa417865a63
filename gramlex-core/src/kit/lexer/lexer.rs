//! Lexer driver
//!
//! Owns the character stream and a [`GrammarScanner`], hands out tokens one
//! at a time, and keeps the input the scanner discarded (BOMs, unrecognized
//! characters) so the token stream can still be mapped back to the source.
//!
//! ```rust,ignore
//! use gramlex_core::kit::lexer::Lexer;
//!
//! let stream = Lexer::new("grammar T; a : B ;").tokenize();
//! assert_eq!(stream.reconstruct(), "grammar T; a : B ;");
//! ```

use std::sync::Arc;

use tracing::{debug, trace, warn};

use super::core::CharStream;
use super::grammar::{eof_token, GrammarScanner, GrammarToken, ScanMode, SourceDirective, TokenNamePredicate};
use super::scanner::{Channel, ScanResult, Scanner};
use crate::compiler::lexer::token_kind::TokenKind;
use crate::kit::diagnostics::DiagnosticSink;
use gramlex_config::ScannerConfig;

/// Grammar lexer over one in-memory source
#[derive(Debug)]
pub struct Lexer<'src> {
    scanner: GrammarScanner<'src>,
    stream: CharStream<'src>,
    discarded: Vec<GrammarToken<'src>>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self::with_config(source, &ScannerConfig::default())
    }

    pub fn with_config(source: &'src str, config: &ScannerConfig) -> Self {
        trace!(target: "gramlex::lexer", bytes = source.len(), "Creating new Lexer");
        Self {
            scanner: GrammarScanner::new().with_config(config),
            stream: CharStream::new(source),
            discarded: Vec::new(),
        }
    }

    /// Route lexical diagnostics to `sink` instead of standard error
    pub fn with_sink(self, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            scanner: self.scanner.with_sink(sink),
            ..self
        }
    }

    /// Replace the token-vs-rule naming convention
    pub fn with_token_names(self, predicate: impl TokenNamePredicate + 'static) -> Self {
        Self {
            scanner: self.scanner.with_token_names(predicate),
            ..self
        }
    }

    /// Next token; keeps returning an empty `Eof` token once input is exhausted
    pub fn next_token(&mut self) -> GrammarToken<'src> {
        loop {
            match self.scanner.next_token(&mut self.stream) {
                ScanResult::Token(token) => {
                    debug!(
                        target: "gramlex::lexer",
                        kind = %token.kind,
                        text = token.text,
                        line = token.line(),
                        column = token.column(),
                        "Produced token"
                    );
                    return token;
                }
                ScanResult::Skip(token) => {
                    trace!(target: "gramlex::lexer", kind = %token.kind, "Skipped input");
                    self.discarded.push(token);
                }
                ScanResult::Error(token, diagnostic) => {
                    warn!(target: "gramlex::lexer", %diagnostic, "Lex error encountered");
                    self.scanner.sink().report(diagnostic);
                    self.discarded.push(token);
                }
                ScanResult::Eof => {
                    trace!(target: "gramlex::lexer", "Reached EOF");
                    return eof_token(&self.stream);
                }
            }
        }
    }

    /// Scan the rest of the input and return everything seen so far
    pub fn tokenize(mut self) -> TokenStream<'src> {
        while self.next_token().kind != TokenKind::Eof {}

        let mut tokens = self.scanner.tokens().to_vec();
        tokens.push(eof_token(&self.stream));
        debug!(
            target: "gramlex::lexer",
            tokens = tokens.len(),
            discarded = self.discarded.len(),
            "Tokenized input"
        );
        TokenStream {
            tokens,
            discarded: self.discarded,
            directives: self.scanner.source_directives().to_vec(),
        }
    }

    /// Tokens returned so far
    pub fn tokens(&self) -> &[GrammarToken<'src>] {
        self.scanner.tokens()
    }

    /// Input consumed without producing a token
    pub fn discarded(&self) -> &[GrammarToken<'src>] {
        &self.discarded
    }

    pub fn source_directives(&self) -> &[SourceDirective] {
        self.scanner.source_directives()
    }

    /// Current rule context
    pub fn mode(&self) -> ScanMode {
        self.scanner.current_mode()
    }

    /// Override the rule context, e.g. when resuming inside a lexer rule
    pub fn set_mode(&mut self, mode: ScanMode) {
        self.scanner.set_mode(mode);
    }
}

/// Complete token sequence of one source, ending with `Eof`
#[derive(Debug, Clone, Default)]
pub struct TokenStream<'src> {
    tokens: Vec<GrammarToken<'src>>,
    discarded: Vec<GrammarToken<'src>>,
    directives: Vec<SourceDirective>,
}

impl<'src> TokenStream<'src> {
    /// Every token on every channel, in source order
    pub fn all(&self) -> &[GrammarToken<'src>] {
        &self.tokens
    }

    pub fn on_channel(&self, channel: Channel) -> impl Iterator<Item = &GrammarToken<'src>> + '_ {
        self.tokens.iter().filter(move |t| t.channel == channel)
    }

    /// What a parser consumes
    pub fn default_channel(&self) -> impl Iterator<Item = &GrammarToken<'src>> + '_ {
        self.on_channel(Channel::Default)
    }

    pub fn kinds(&self) -> Vec<TokenKind> {
        self.tokens.iter().map(|t| t.kind).collect()
    }

    pub fn discarded(&self) -> &[GrammarToken<'src>] {
        &self.discarded
    }

    pub fn source_directives(&self) -> &[SourceDirective] {
        &self.directives
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Concatenate token and discarded text in offset order
    pub fn reconstruct(&self) -> String {
        let mut out = String::new();
        let mut kept = self.tokens.iter().peekable();
        let mut dropped = self.discarded.iter().peekable();
        loop {
            let take_dropped = match (kept.peek(), dropped.peek()) {
                (Some(a), Some(b)) => b.span.start.offset < a.span.start.offset,
                (None, Some(_)) => true,
                (_, None) => false,
            };
            let next = if take_dropped { dropped.next() } else { kept.next() };
            let Some(token) = next else {
                break;
            };
            out.push_str(token.text);
        }
        out
    }
}
