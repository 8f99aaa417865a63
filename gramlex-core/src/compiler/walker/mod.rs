//! Grammar tree traversal
//!
//! A [`GrammarWalker`] visits a [`GrammarAst`](crate::compiler::tree::GrammarAst)
//! depth-first and reports what it finds to a [`GrammarListener`].

pub mod context;
pub mod error;
pub mod listener;
pub mod production;
pub mod registry;
#[allow(clippy::module_inception)]
pub mod walker;

pub use context::{WalkContext, DEFAULT_MODE_NAME};
pub use error::{WalkError, WalkResult};
pub use listener::{GrammarListener, NoopListener, RuleDiscovery};
pub use production::Production;
pub use registry::{ProductionHandler, ProductionRegistry};
pub use walker::GrammarWalker;
