//! Lexer construction helpers

use std::sync::Arc;

use crate::kit::diagnostics::DiagnosticSink;
use crate::kit::lexer::Lexer;
use gramlex_config::ScannerConfig;

/// Lexer with default settings, reporting to standard error
pub fn build_lexer(source: &str) -> Lexer<'_> {
    Lexer::new(source)
}

/// Lexer reporting to `sink`
pub fn build_lexer_with_sink(source: &str, sink: Arc<dyn DiagnosticSink>) -> Lexer<'_> {
    Lexer::new(source).with_sink(sink)
}

/// Lexer configured from `config`, reporting to `sink`
pub fn build_lexer_with_config<'src>(
    source: &'src str,
    config: &ScannerConfig,
    sink: Arc<dyn DiagnosticSink>,
) -> Lexer<'src> {
    Lexer::with_config(source, config).with_sink(sink)
}
