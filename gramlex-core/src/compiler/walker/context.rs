//! Traversal context shared with listeners

use crate::compiler::tree::{GrammarAst, NodeKind};

pub const DEFAULT_MODE_NAME: &str = "DEFAULT_MODE";

/// Where the walker currently is
#[derive(Debug, Clone)]
pub struct WalkContext<'ast> {
    pub grammar_name: Option<String>,
    pub current_mode_name: String,
    /// Set only while inside a rule
    pub current_rule_name: Option<String>,
    /// Set only while inside a rule
    pub current_rule_ast: Option<&'ast GrammarAst>,
    pub current_outer_alt_root: Option<&'ast GrammarAst>,
    /// 1-based within a rule; 0 before its first outer alternative
    pub current_outer_alt_number: usize,
    /// Number of enclosing `?`/`*`/`+` subrules
    pub ebnf_depth: usize,
    /// Kinds of the nodes being visited, root first
    pub path: Vec<NodeKind>,
}

impl Default for WalkContext<'_> {
    fn default() -> Self {
        Self::new(DEFAULT_MODE_NAME)
    }
}

impl<'ast> WalkContext<'ast> {
    pub fn new(default_mode_name: impl Into<String>) -> Self {
        Self {
            grammar_name: None,
            current_mode_name: default_mode_name.into(),
            current_rule_name: None,
            current_rule_ast: None,
            current_outer_alt_root: None,
            current_outer_alt_number: 0,
            ebnf_depth: 0,
            path: Vec::new(),
        }
    }

    pub fn in_rule(&self) -> bool {
        self.current_rule_name.is_some()
    }

    /// Innermost enclosing node of one of `kinds`, excluding the current node
    pub fn nearest_ancestor(&self, kinds: &[NodeKind]) -> Option<NodeKind> {
        self.path
            .iter()
            .rev()
            .skip(1)
            .copied()
            .find(|kind| kinds.contains(kind))
    }

    pub(crate) fn enter_rule(&mut self, name: &str, rule: &'ast GrammarAst) -> RuleScope<'ast> {
        RuleScope {
            name: self.current_rule_name.replace(name.to_string()),
            ast: self.current_rule_ast.replace(rule),
            alt_root: self.current_outer_alt_root.take(),
            alt_number: std::mem::take(&mut self.current_outer_alt_number),
        }
    }

    pub(crate) fn leave_rule(&mut self, saved: RuleScope<'ast>) {
        self.current_rule_name = saved.name;
        self.current_rule_ast = saved.ast;
        self.current_outer_alt_root = saved.alt_root;
        self.current_outer_alt_number = saved.alt_number;
    }
}

/// Rule fields as they were before a rule was entered
#[derive(Debug)]
pub(crate) struct RuleScope<'ast> {
    name: Option<String>,
    ast: Option<&'ast GrammarAst>,
    alt_root: Option<&'ast GrammarAst>,
    alt_number: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_context() {
        let ctx = WalkContext::default();
        assert_eq!(ctx.current_mode_name, "DEFAULT_MODE");
        assert!(!ctx.in_rule());
        assert_eq!(ctx.current_outer_alt_number, 0);
    }

    #[test]
    fn test_rule_scope_restores() {
        let rule = GrammarAst::rule(vec![GrammarAst::leaf(NodeKind::RuleRef, "a")]);
        let mut ctx = WalkContext::default();
        let saved = ctx.enter_rule("a", &rule);
        ctx.current_outer_alt_number = 3;
        assert_eq!(ctx.current_rule_name.as_deref(), Some("a"));

        ctx.leave_rule(saved);
        assert!(!ctx.in_rule());
        assert!(ctx.current_rule_ast.is_none());
        assert_eq!(ctx.current_outer_alt_number, 0);
    }

    #[test]
    fn test_nearest_ancestor() {
        let mut ctx = WalkContext::default();
        ctx.path = vec![NodeKind::Grammar, NodeKind::Rule, NodeKind::Block, NodeKind::Options, NodeKind::Assign];
        assert_eq!(
            ctx.nearest_ancestor(&[NodeKind::Rule, NodeKind::Block]),
            Some(NodeKind::Block)
        );
        assert_eq!(ctx.nearest_ancestor(&[NodeKind::Mode]), None);
    }
}
