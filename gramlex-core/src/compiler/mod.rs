//! Grammar front end: token alphabet, syntax tree and tree walker

pub mod lexer;
pub mod tree;
pub mod walker;
