//! Grammar language token alphabet and lexer helpers

pub mod builder;
pub mod literal;
pub mod token_kind;

pub use builder::{build_lexer, build_lexer_with_config, build_lexer_with_sink};
pub use literal::{unescape_literal, LiteralError};
pub use token_kind::TokenKind;
