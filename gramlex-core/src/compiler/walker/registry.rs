//! Production registry
//!
//! Maps production names to walker entry points so a caller can start a walk
//! at any production, e.g. `walker.visit(node, "ruleBlock")`.

use std::collections::HashMap;

use super::error::WalkResult;
use super::listener::GrammarListener;
use super::production::Production;
use super::walker::GrammarWalker;
use crate::compiler::tree::GrammarAst;

/// Entry point of one production
pub type ProductionHandler<'ast, L> = fn(&mut GrammarWalker<'ast, L>, &'ast GrammarAst) -> WalkResult;

pub struct ProductionRegistry<'ast, L> {
    handlers: HashMap<String, ProductionHandler<'ast, L>>,
}

impl<L> Default for ProductionRegistry<'_, L> {
    fn default() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }
}

impl<L> std::fmt::Debug for ProductionRegistry<'_, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductionRegistry")
            .field("count", &self.handlers.len())
            .finish()
    }
}

impl<'ast, L> ProductionRegistry<'ast, L> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `name`, replacing any previous entry
    pub fn register(&mut self, name: impl Into<String>, handler: ProductionHandler<'ast, L>) {
        self.handlers.insert(name.into(), handler);
    }

    pub fn get(&self, name: &str) -> Option<ProductionHandler<'ast, L>> {
        self.handlers.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<ProductionHandler<'ast, L>> {
        self.handlers.remove(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.handlers.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<'ast, L: GrammarListener> ProductionRegistry<'ast, L> {
    /// Registry holding every production of the tree grammar
    pub fn with_productions() -> Self {
        let mut registry = Self::new();
        for production in Production::ALL {
            registry.register(production.name(), GrammarWalker::<'ast, L>::handler_for(*production));
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::walker::NoopListener;

    #[test]
    fn test_with_productions_covers_all() {
        let registry = ProductionRegistry::<NoopListener>::with_productions();
        assert_eq!(registry.len(), Production::ALL.len());
        for production in Production::ALL {
            assert!(registry.contains(production.name()), "{production} missing");
        }
        assert!(!registry.contains("grammarSpecs"));
    }

    #[test]
    fn test_register_and_remove() {
        let mut registry = ProductionRegistry::<NoopListener>::new();
        assert!(registry.is_empty());

        registry.register("entry", |_, _| Ok(()));
        assert!(registry.get("entry").is_some());
        assert_eq!(registry.names(), vec!["entry"]);

        assert!(registry.remove("entry").is_some());
        assert!(registry.get("entry").is_none());
    }
}
