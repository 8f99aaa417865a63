//! Gramlex - front end for ANTLR-style grammar files
//!
//! Gramlex scans grammar source text into a token stream and walks grammar
//! syntax trees, reporting what it finds to a listener.
//!
//! # Architecture
//!
//! ```text
//! gramlex-config/  - Configuration data (serde)
//! gramlex-core/    - Scanner, syntax tree, tree walker (no IO)
//! src/             - API layer and logging setup
//! ```
//!
//! # Quick Start
//!
//! ```ignore
//! use gramlex::{lex, GramlexConfig};
//!
//! let output = lex("grammar T; a : B ;", &GramlexConfig::default());
//! assert!(!output.has_errors());
//! ```

// API layer
pub mod api;

// Logging setup
pub mod logger;

// Re-export common types
pub use api::{lex, walk, LexOutput, WalkOutput};
pub use gramlex_config::{GramlexConfig, Phase, ScannerConfig, WalkerConfig};
pub use gramlex_core::compiler::lexer::TokenKind;
pub use gramlex_core::compiler::tree::{GrammarAst, GrammarType, NodeKind};
pub use gramlex_core::compiler::walker::{
    GrammarListener, GrammarWalker, Production, RuleDiscovery, WalkContext, WalkError,
};
pub use gramlex_core::kit::diagnostics::{Diagnostic, DiagnosticSink, GrammarErrorKind};
pub use gramlex_core::kit::lexer::{ScanMode, TokenStream};
pub use logger::{init_logger, LogFormat};
