//! Grammar syntax tree

pub mod node;

pub use node::{AstPayload, GrammarAst, GrammarType, NodeKind};
