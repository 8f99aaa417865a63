//! Reusable building blocks: character stream, scanner seam, diagnostics

pub mod diagnostics;
pub mod lexer;
