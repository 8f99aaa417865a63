//! Scanner building blocks: positions and the character stream

pub mod position;
pub mod stream;

pub use position::{SourcePosition, SourceSpan};
pub use stream::{CharStream, Mark, StreamError};
