//! Grammar lexer
//!
//! - `core`: positions and the markable character stream
//! - `scanner`: the `Scanner` seam and token types
//! - `grammar`: the grammar language scanner
//! - `lexer`: the driver that turns a source into a token stream

pub mod core;
pub mod grammar;
pub mod lexer;
pub mod scanner;

pub use core::{CharStream, Mark, SourcePosition, SourceSpan, StreamError};
pub use grammar::{GrammarScanner, GrammarToken, ScanMode, SourceDirective, TokenNamePredicate, UppercaseTokenNames};
pub use lexer::{Lexer, TokenStream};
pub use scanner::{Channel, OwnedToken, ScanResult, Scanner, Token};
