//! Gramlex Core - grammar front end (pure logic, no IO)
//!
//! Contains the grammar scanner, the grammar syntax tree and the tree walker.
//! Only operates on in-memory data; diagnostics go to a caller-supplied sink.
//!
//! Configuration is passed explicitly via parameters, not via global state.

pub mod compiler;
pub mod kit;

// Re-export common types
pub use compiler::lexer::{build_lexer, TokenKind};
pub use compiler::tree::{GrammarAst, GrammarType, NodeKind};
pub use compiler::walker::{GrammarListener, GrammarWalker, WalkContext, WalkError};
pub use kit::diagnostics::{Diagnostic, DiagnosticBuffer, DiagnosticSink, GrammarErrorKind};
pub use kit::lexer::{GrammarScanner, Lexer, ScanMode, TokenStream};

// Re-export config types from gramlex-config
pub use gramlex_config::{GramlexConfig, Phase, ScannerConfig, WalkerConfig};
