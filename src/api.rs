//! API layer - source in, structured output out
//!
//! Each entry point collects its diagnostics instead of printing them; how
//! they are shown is up to the caller.

use std::sync::Arc;

use tracing::{info, instrument};

use gramlex_config::GramlexConfig;
use gramlex_core::compiler::lexer::build_lexer_with_config;
use gramlex_core::compiler::tree::GrammarAst;
use gramlex_core::compiler::walker::{GrammarListener, GrammarWalker};
use gramlex_core::kit::diagnostics::{Diagnostic, DiagnosticBuffer};
use gramlex_core::kit::lexer::TokenStream;

/// Result of scanning one source
#[derive(Debug)]
pub struct LexOutput<'src> {
    pub tokens: TokenStream<'src>,
    pub diagnostics: Vec<Diagnostic>,
}

impl LexOutput<'_> {
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Result of walking one tree
#[derive(Debug)]
pub struct WalkOutput<L> {
    pub listener: L,
    pub diagnostics: Vec<Diagnostic>,
    /// False when an error escaped the walk
    pub completed: bool,
}

impl<L> WalkOutput<L> {
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Scan `source` into a token stream
///
/// Lexical problems never stop the scan; they are returned alongside the tokens.
#[instrument(target = "gramlex::lexer", skip(source, config), fields(len = source.len()))]
pub fn lex<'src>(source: &'src str, config: &GramlexConfig) -> LexOutput<'src> {
    info!(target: "gramlex::lexer", "Starting lexer");

    let buffer = DiagnosticBuffer::new();
    let tokens = build_lexer_with_config(source, &config.scanner, Arc::new(buffer.clone())).tokenize();
    let diagnostics = buffer.dump();

    info!(
        target: "gramlex::lexer",
        tokens = tokens.len(),
        errors = diagnostics.len(),
        "Lexer completed"
    );
    LexOutput { tokens, diagnostics }
}

/// Walk `tree` from the configured start production, feeding `listener`
#[instrument(target = "gramlex::walker", skip_all, fields(root = %tree.kind()))]
pub fn walk<L: GrammarListener>(tree: &GrammarAst, listener: L, config: &GramlexConfig) -> WalkOutput<L> {
    info!(target: "gramlex::walker", "Starting walk");

    let buffer = DiagnosticBuffer::new();
    let mut walker = GrammarWalker::with_config(listener, config.walker.clone()).with_sink(Arc::new(buffer.clone()));
    let completed = walker.visit_grammar(tree).is_ok();
    let diagnostics = buffer.dump();

    info!(
        target: "gramlex::walker",
        completed,
        errors = diagnostics.len(),
        "Walk completed"
    );
    WalkOutput {
        listener: walker.into_listener(),
        diagnostics,
        completed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gramlex_core::compiler::lexer::TokenKind;
    use gramlex_core::compiler::walker::NoopListener;
    use gramlex_core::kit::diagnostics::GrammarErrorKind;

    #[test]
    fn test_lex_collects_diagnostics() {
        let output = lex("a : 'x ;", &GramlexConfig::default());
        assert!(output.has_errors());
        assert_eq!(output.diagnostics[0].kind, GrammarErrorKind::UnterminatedStringLiteral);
        assert_eq!(output.tokens.all().last().map(|t| t.kind), Some(TokenKind::Eof));
    }

    #[test]
    fn test_walk_reports_bad_root() {
        let tree = GrammarAst::new(gramlex_core::compiler::tree::NodeKind::Rules);
        let output = walk(&tree, NoopListener, &GramlexConfig::default());
        assert!(!output.completed);
        assert_eq!(output.diagnostics.len(), 1);
    }
}
