//! Grammar tree walker
//!
//! Depth-first walk over a grammar tree following a fixed production order:
//!
//! ```text
//! grammarSpec   : (GRAMMAR ID prequelConstruct* RULES MODE*)
//! rules         : (RULES (rule | lexerRule)*)
//! rule          : (RULE RULE_REF DOC_COMMENT? RULEMODIFIERS? ARG_ACTION?
//!                   RETURNS? THROWS? LOCALS? (OPTIONS | AT)* BLOCK exceptionGroup)
//! lexerRule     : (RULE TOKEN_REF DOC_COMMENT? RULEMODIFIERS? BLOCK)
//! ruleBlock     : (BLOCK outerAlternative+)
//! alternative   : (ALT ELEMENT_OPTIONS? (element+ | EPSILON))
//! ```
//!
//! Every production fires `enter`/`exit` on the listener; semantic callbacks
//! fire with resolved arguments. Shape errors are reported to the sink and
//! the walk resumes with the next sibling.

use std::sync::Arc;

use tracing::{debug, trace, warn};

use super::context::WalkContext;
use super::error::{WalkError, WalkResult};
use super::listener::{GrammarListener, RuleDiscovery};
use super::production::Production;
use super::registry::{ProductionHandler, ProductionRegistry};
use crate::compiler::tree::{GrammarAst, NodeKind};
use crate::kit::diagnostics::{DiagnosticSink, StderrSink};
use gramlex_config::WalkerConfig;

const EBNF_SUFFIXES: [NodeKind; 3] = [NodeKind::Optional, NodeKind::Closure, NodeKind::PositiveClosure];
const PREQUEL_KINDS: [NodeKind; 5] = [
    NodeKind::Options,
    NodeKind::Import,
    NodeKind::TokensSpec,
    NodeKind::Channels,
    NodeKind::At,
];

/// Walker over one grammar tree at a time
pub struct GrammarWalker<'ast, L> {
    listener: L,
    ctx: WalkContext<'ast>,
    registry: ProductionRegistry<'ast, L>,
    sink: Arc<dyn DiagnosticSink>,
    config: WalkerConfig,
    /// Nodes of the productions being visited, outermost first
    stack: Vec<&'ast GrammarAst>,
    /// Nesting of `visit` calls; only the outermost one reports
    visits: usize,
    error_count: usize,
}

impl<L> std::fmt::Debug for GrammarWalker<'_, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrammarWalker")
            .field("ctx", &self.ctx)
            .field("registry", &self.registry)
            .field("depth", &self.stack.len())
            .field("error_count", &self.error_count)
            .finish()
    }
}

impl<'ast, L: GrammarListener> GrammarWalker<'ast, L> {
    pub fn new(listener: L) -> Self {
        Self::with_config(listener, WalkerConfig::default())
    }

    pub fn with_config(listener: L, config: WalkerConfig) -> Self {
        Self {
            listener,
            ctx: WalkContext::new(config.default_mode_name.clone()),
            registry: ProductionRegistry::with_productions(),
            sink: Arc::new(StderrSink),
            config,
            stack: Vec::new(),
            visits: 0,
            error_count: 0,
        }
    }

    /// Report walk errors to `sink` instead of standard error
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn context(&self) -> &WalkContext<'ast> {
        &self.ctx
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    pub fn into_listener(self) -> L {
        self.listener
    }

    pub fn registry(&self) -> &ProductionRegistry<'ast, L> {
        &self.registry
    }

    /// Register extra named entry points
    pub fn registry_mut(&mut self) -> &mut ProductionRegistry<'ast, L> {
        &mut self.registry
    }

    /// Errors reported so far
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Walk a whole tree from the configured start production
    pub fn visit_grammar(&mut self, root: &'ast GrammarAst) -> WalkResult {
        self.ctx = WalkContext::new(self.config.default_mode_name.clone());
        self.stack.clear();
        let start = self.config.start_production.clone();
        self.visit(root, &start)
    }

    /// Walk `node` as the production registered under `name`
    ///
    /// Registered entries may call `visit` again; an error is reported once,
    /// by the outermost call.
    pub fn visit(&mut self, node: &'ast GrammarAst, name: &str) -> WalkResult {
        let outermost = self.visits == 0;
        let result = match self.registry.get(name) {
            Some(handler) => {
                debug!(target: "gramlex::walker", production = name, node = %node.kind(), "Visiting by name");
                self.visits += 1;
                let result = handler(self, node);
                self.visits -= 1;
                result
            }
            None => Err(WalkError::UnknownProduction(name.to_string())),
        };
        if outermost {
            if let Err(err) = &result {
                self.report(err);
            }
        }
        result
    }

    // ---- plumbing --------------------------------------------------------

    fn report(&mut self, err: &WalkError) {
        self.error_count += 1;
        warn!(
            target: "gramlex::walker",
            error = %err,
            rule = self.ctx.current_rule_name.as_deref().unwrap_or(""),
            "Walk error"
        );
        self.sink.report(err.to_diagnostic());
    }

    /// Report a sibling's error and carry on, unless resuming is disabled
    fn recover(&mut self, err: WalkError) -> WalkResult {
        if !self.config.resume_on_mismatch {
            return Err(err);
        }
        self.report(&err);
        Ok(())
    }

    fn each(
        &mut self,
        nodes: &'ast [GrammarAst],
        mut visit: impl FnMut(&mut Self, &'ast GrammarAst) -> WalkResult,
    ) -> WalkResult {
        for node in nodes {
            if let Err(err) = visit(self, node) {
                self.recover(err)?;
            }
        }
        Ok(())
    }

    /// `each` over a list that must not be empty
    fn each_required(
        &mut self,
        production: Production,
        expected: NodeKind,
        nodes: &'ast [GrammarAst],
        visit: impl FnMut(&mut Self, &'ast GrammarAst) -> WalkResult,
    ) -> WalkResult {
        if nodes.is_empty() {
            return Err(WalkError::mismatch(production.name(), expected.name(), None));
        }
        self.each(nodes, visit)
    }

    /// Run one production: depth check, `enter`, body, `exit`
    fn scoped<T>(
        &mut self,
        production: Production,
        node: &'ast GrammarAst,
        body: impl FnOnce(&mut Self) -> Result<T, WalkError>,
    ) -> Result<T, WalkError> {
        if self.stack.len() >= self.config.max_depth {
            return Err(WalkError::RecursionLimit(self.config.max_depth));
        }
        trace!(target: "gramlex::walker", %production, node = %node.kind(), "Enter");
        self.stack.push(node);
        self.ctx.path.push(node.kind());
        self.listener.enter(&self.ctx, production, node);

        let result = body(self).map_err(|err| err.with_span(node.span()));

        self.listener.exit(&self.ctx, production, node);
        self.ctx.path.pop();
        self.stack.pop();
        result
    }

    /// Innermost enclosing production node of one of `kinds`, excluding the current one
    fn enclosing(&self, kinds: &[NodeKind]) -> Option<&'ast GrammarAst> {
        self.stack
            .iter()
            .rev()
            .skip(1)
            .find(|n| kinds.contains(&n.kind()))
            .copied()
    }

    // ---- grammar level ---------------------------------------------------

    pub(crate) fn grammar_spec(&mut self, node: &'ast GrammarAst) -> WalkResult {
        self.scoped(Production::GrammarSpec, node, |w| {
            expect_kind(Production::GrammarSpec, node, &[NodeKind::Grammar])?;
            let mut cursor = Cursor::new(Production::GrammarSpec, node);
            let id = cursor.expect(NodeKind::Id)?;

            w.ctx.grammar_name = Some(id.text().to_string());
            debug!(target: "gramlex::walker", grammar = id.text(), "Discovered grammar");
            w.listener.discover_grammar(&w.ctx, node, id);

            let prequels = cursor.take_while(&PREQUEL_KINDS);
            w.prequel_constructs(node, prequels)?;
            w.listener.finish_prequels(&w.ctx, prequels.first());

            let rules = cursor.expect(NodeKind::Rules)?;
            if let Err(err) = w.rules(rules) {
                w.recover(err)?;
            }
            let modes = cursor.rest();
            w.each(modes, Self::mode)?;

            w.listener.finish_grammar(&w.ctx, node, id);
            Ok(())
        })
    }

    pub(crate) fn prequel_constructs(&mut self, parent: &'ast GrammarAst, prequels: &'ast [GrammarAst]) -> WalkResult {
        self.scoped(Production::PrequelConstructs, parent, |w| {
            w.each(prequels, Self::prequel_construct)
        })
    }

    pub(crate) fn prequel_construct(&mut self, node: &'ast GrammarAst) -> WalkResult {
        self.scoped(Production::PrequelConstruct, node, |w| match node.kind() {
            NodeKind::Options => w.options_spec(node),
            NodeKind::Import => w.delegate_grammars(node),
            NodeKind::TokensSpec => w.tokens_spec(node),
            NodeKind::Channels => w.channels_spec(node),
            NodeKind::At => w.action(node),
            _ => Err(unexpected(Production::PrequelConstruct, &PREQUEL_KINDS, node)),
        })
    }

    pub(crate) fn options_spec(&mut self, node: &'ast GrammarAst) -> WalkResult {
        self.scoped(Production::OptionsSpec, node, |w| {
            expect_kind(Production::OptionsSpec, node, &[NodeKind::Options])?;
            w.each(node.children(), Self::option)
        })
    }

    /// `(ASSIGN ID value)`, classified by the nearest enclosing rule or block
    pub(crate) fn option(&mut self, node: &'ast GrammarAst) -> WalkResult {
        self.scoped(Production::OptionDef, node, |w| {
            expect_kind(Production::OptionDef, node, &[NodeKind::Assign])?;
            let mut cursor = Cursor::new(Production::OptionDef, node);
            let id = cursor.expect(NodeKind::Id)?;
            let value = cursor.expect_any(&[NodeKind::Id, NodeKind::StringLiteral, NodeKind::Int])?;
            cursor.finish()?;
            w.option_value(value)?;

            match w.enclosing(&[NodeKind::Rule, NodeKind::Block]) {
                Some(block) if block.kind() == NodeKind::Block => {
                    w.listener.block_option(&w.ctx, block, id, value)
                }
                Some(_) => w.listener.rule_option(&w.ctx, id, value),
                None => w.listener.grammar_option(&w.ctx, id, value),
            }
            Ok(())
        })
    }

    pub(crate) fn option_value(&mut self, node: &'ast GrammarAst) -> WalkResult {
        self.scoped(Production::OptionValue, node, |_| {
            expect_kind(
                Production::OptionValue,
                node,
                &[NodeKind::Id, NodeKind::StringLiteral, NodeKind::Int],
            )
        })
    }

    pub(crate) fn delegate_grammars(&mut self, node: &'ast GrammarAst) -> WalkResult {
        self.scoped(Production::DelegateGrammars, node, |w| {
            expect_kind(Production::DelegateGrammars, node, &[NodeKind::Import])?;
            w.each_required(Production::DelegateGrammars, NodeKind::Id, node.children(), Self::delegate_grammar)
        })
    }

    /// `(ASSIGN label ID)` or `ID`
    pub(crate) fn delegate_grammar(&mut self, node: &'ast GrammarAst) -> WalkResult {
        self.scoped(Production::DelegateGrammar, node, |w| match node.kind() {
            NodeKind::Assign => {
                let mut cursor = Cursor::new(Production::DelegateGrammar, node);
                let label = cursor.expect(NodeKind::Id)?;
                let id = cursor.expect(NodeKind::Id)?;
                cursor.finish()?;
                w.listener.import_grammar(&w.ctx, Some(label), id);
                Ok(())
            }
            NodeKind::Id => {
                w.listener.import_grammar(&w.ctx, None, node);
                Ok(())
            }
            _ => Err(unexpected(Production::DelegateGrammar, &[NodeKind::Assign, NodeKind::Id], node)),
        })
    }

    pub(crate) fn tokens_spec(&mut self, node: &'ast GrammarAst) -> WalkResult {
        self.scoped(Production::TokensSpec, node, |w| {
            expect_kind(Production::TokensSpec, node, &[NodeKind::TokensSpec])?;
            w.each_required(Production::TokensSpec, NodeKind::Id, node.children(), Self::token_spec)
        })
    }

    pub(crate) fn token_spec(&mut self, node: &'ast GrammarAst) -> WalkResult {
        self.scoped(Production::TokenSpec, node, |w| {
            expect_kind(Production::TokenSpec, node, &[NodeKind::Id])?;
            w.listener.define_token(&w.ctx, node);
            Ok(())
        })
    }

    pub(crate) fn channels_spec(&mut self, node: &'ast GrammarAst) -> WalkResult {
        self.scoped(Production::ChannelsSpec, node, |w| {
            expect_kind(Production::ChannelsSpec, node, &[NodeKind::Channels])?;
            w.each(node.children(), Self::channel_spec)
        })
    }

    pub(crate) fn channel_spec(&mut self, node: &'ast GrammarAst) -> WalkResult {
        self.scoped(Production::ChannelSpec, node, |w| {
            expect_kind(Production::ChannelSpec, node, &[NodeKind::Id])?;
            w.listener.define_channel(&w.ctx, node);
            Ok(())
        })
    }

    /// `(AT scope? name ACTION)`
    pub(crate) fn action(&mut self, node: &'ast GrammarAst) -> WalkResult {
        self.scoped(Production::Action, node, |w| {
            expect_kind(Production::Action, node, &[NodeKind::At])?;
            let mut cursor = Cursor::new(Production::Action, node);
            let first = cursor.expect(NodeKind::Id)?;
            let (scope, name) = match cursor.next_if(NodeKind::Id) {
                Some(name) => (Some(first), name),
                None => (None, first),
            };
            let action = cursor.expect(NodeKind::Action)?;
            cursor.finish()?;
            w.listener.global_named_action(&w.ctx, scope, name, action);
            Ok(())
        })
    }

    // ---- rules -----------------------------------------------------------

    pub(crate) fn rules(&mut self, node: &'ast GrammarAst) -> WalkResult {
        self.scoped(Production::Rules, node, |w| {
            expect_kind(Production::Rules, node, &[NodeKind::Rules])?;
            debug!(target: "gramlex::walker", count = node.child_count(), "Discovered rules");
            w.listener.discover_rules(&w.ctx, node);
            w.each(node.children(), |w, rule| match rule.child(0).map(GrammarAst::kind) {
                Some(NodeKind::TokenRef) => w.lexer_rule(rule),
                _ => w.rule(rule),
            })?;
            w.listener.finish_rules(&w.ctx, node);
            Ok(())
        })
    }

    /// `(MODE ID lexerRule*)`
    pub(crate) fn mode(&mut self, node: &'ast GrammarAst) -> WalkResult {
        self.scoped(Production::Mode, node, |w| {
            expect_kind(Production::Mode, node, &[NodeKind::Mode])?;
            let mut cursor = Cursor::new(Production::Mode, node);
            let id = cursor.expect(NodeKind::Id)?;
            w.ctx.current_mode_name = id.text().to_string();
            debug!(target: "gramlex::walker", mode = id.text(), "Entering mode");
            w.listener.mode_def(&w.ctx, node, id);
            w.each(cursor.rest(), Self::lexer_rule)
        })
    }

    pub(crate) fn lexer_rule(&mut self, node: &'ast GrammarAst) -> WalkResult {
        self.scoped(Production::LexerRule, node, |w| {
            expect_kind(Production::LexerRule, node, &[NodeKind::Rule])?;
            let mut cursor = Cursor::new(Production::LexerRule, node);
            let id = cursor.expect(NodeKind::TokenRef)?;

            let scope = w.ctx.enter_rule(id.text(), node);
            let result = (|| -> WalkResult {
                cursor.next_if(NodeKind::DocComment);
                let mut modifiers = Vec::new();
                if let Some(list) = cursor.next_if(NodeKind::RuleModifiers) {
                    for modifier in list.children() {
                        w.rule_modifier(modifier)?;
                        modifiers.push(modifier);
                    }
                }
                let block = cursor.expect(NodeKind::Block)?;
                cursor.finish()?;

                debug!(
                    target: "gramlex::walker",
                    rule = id.text(),
                    mode = %w.ctx.current_mode_name,
                    "Discovered lexer rule"
                );
                w.listener.discover_lexer_rule(&w.ctx, node, id, &modifiers, block);
                w.lexer_rule_block(block)?;
                w.listener.finish_lexer_rule(&w.ctx, node, id, block);
                Ok(())
            })();
            w.ctx.leave_rule(scope);
            result
        })
    }

    pub(crate) fn rule(&mut self, node: &'ast GrammarAst) -> WalkResult {
        self.scoped(Production::Rule, node, |w| {
            expect_kind(Production::Rule, node, &[NodeKind::Rule])?;
            let mut cursor = Cursor::new(Production::Rule, node);
            let id = cursor.expect(NodeKind::RuleRef)?;

            let scope = w.ctx.enter_rule(id.text(), node);
            let result = (|| -> WalkResult {
                cursor.next_if(NodeKind::DocComment);
                let mut modifiers = Vec::new();
                if let Some(list) = cursor.next_if(NodeKind::RuleModifiers) {
                    for modifier in list.children() {
                        w.rule_modifier(modifier)?;
                        modifiers.push(modifier);
                    }
                }
                let arg_action = cursor.next_if(NodeKind::ArgAction);
                let returns = match cursor.next_if(NodeKind::Returns) {
                    Some(n) => Some(w.rule_returns(n)?),
                    None => None,
                };
                let throws = match cursor.next_if(NodeKind::Throws) {
                    Some(n) => Some(w.throws_spec(n)?),
                    None => None,
                };
                let locals = match cursor.next_if(NodeKind::Locals) {
                    Some(n) => Some(w.locals(n)?),
                    None => None,
                };
                let mut options = None;
                let mut actions = Vec::new();
                while let Some(prequel) = cursor.next_if_any(&[NodeKind::Options, NodeKind::At]) {
                    if prequel.kind() == NodeKind::Options {
                        w.options_spec(prequel)?;
                        options = Some(prequel);
                    } else {
                        actions.push(w.rule_action(prequel)?);
                    }
                }
                let block = cursor.expect(NodeKind::Block)?;

                let discovery = RuleDiscovery {
                    rule: node,
                    id,
                    modifiers,
                    arg_action,
                    returns,
                    throws,
                    options,
                    locals,
                    actions,
                    block,
                };
                debug!(target: "gramlex::walker", rule = id.text(), "Discovered rule");
                w.listener.discover_rule(&w.ctx, &discovery);

                w.rule_block(block)?;
                w.exception_group(node, cursor.rest())?;
                w.listener.finish_rule(&w.ctx, node, id, block);
                Ok(())
            })();
            w.ctx.leave_rule(scope);
            result
        })
    }

    /// `CATCH*` followed by at most one `FINALLY`
    pub(crate) fn exception_group(&mut self, parent: &'ast GrammarAst, handlers: &'ast [GrammarAst]) -> WalkResult {
        self.scoped(Production::ExceptionGroup, parent, |w| {
            let split = handlers
                .iter()
                .position(|n| n.kind() != NodeKind::Catch)
                .unwrap_or(handlers.len());
            let (catches, tail) = handlers.split_at(split);
            w.each(catches, Self::exception_handler)?;
            match tail {
                [] => Ok(()),
                [finally] => w.finally_clause(finally),
                [_, extra, ..] => Err(unexpected(Production::ExceptionGroup, &[NodeKind::Catch], extra)),
            }
        })
    }

    pub(crate) fn exception_handler(&mut self, node: &'ast GrammarAst) -> WalkResult {
        self.scoped(Production::ExceptionHandler, node, |w| {
            expect_kind(Production::ExceptionHandler, node, &[NodeKind::Catch])?;
            let mut cursor = Cursor::new(Production::ExceptionHandler, node);
            let arg = cursor.expect(NodeKind::ArgAction)?;
            let action = cursor.expect(NodeKind::Action)?;
            cursor.finish()?;
            w.listener.rule_catch(&w.ctx, arg, action);
            Ok(())
        })
    }

    pub(crate) fn finally_clause(&mut self, node: &'ast GrammarAst) -> WalkResult {
        self.scoped(Production::FinallyClause, node, |w| {
            expect_kind(Production::FinallyClause, node, &[NodeKind::Finally])?;
            let mut cursor = Cursor::new(Production::FinallyClause, node);
            let action = cursor.expect(NodeKind::Action)?;
            cursor.finish()?;
            w.listener.finally_action(&w.ctx, action);
            Ok(())
        })
    }

    /// `(LOCALS ARG_ACTION)`; yields the action
    pub(crate) fn locals(&mut self, node: &'ast GrammarAst) -> Result<&'ast GrammarAst, WalkError> {
        self.scoped(Production::Locals, node, |_| single_child(Production::Locals, node, NodeKind::Locals, NodeKind::ArgAction))
    }

    /// `(RETURNS ARG_ACTION)`; yields the action
    pub(crate) fn rule_returns(&mut self, node: &'ast GrammarAst) -> Result<&'ast GrammarAst, WalkError> {
        self.scoped(Production::RuleReturns, node, |_| {
            single_child(Production::RuleReturns, node, NodeKind::Returns, NodeKind::ArgAction)
        })
    }

    /// `(THROWS ID+)`
    pub(crate) fn throws_spec(&mut self, node: &'ast GrammarAst) -> Result<&'ast GrammarAst, WalkError> {
        self.scoped(Production::ThrowsSpec, node, |_| {
            expect_kind(Production::ThrowsSpec, node, &[NodeKind::Throws])?;
            if node.children().is_empty() {
                return Err(WalkError::mismatch(Production::ThrowsSpec.name(), "ID", None));
            }
            match node.children().iter().find(|c| c.kind() != NodeKind::Id) {
                Some(other) => Err(unexpected(Production::ThrowsSpec, &[NodeKind::Id], other)),
                None => Ok(node),
            }
        })
    }

    /// `(AT ID ACTION)` inside a rule
    pub(crate) fn rule_action(&mut self, node: &'ast GrammarAst) -> Result<&'ast GrammarAst, WalkError> {
        self.scoped(Production::RuleAction, node, |_| {
            expect_kind(Production::RuleAction, node, &[NodeKind::At])?;
            let mut cursor = Cursor::new(Production::RuleAction, node);
            cursor.expect(NodeKind::Id)?;
            cursor.expect(NodeKind::Action)?;
            cursor.finish()?;
            Ok(node)
        })
    }

    pub(crate) fn rule_modifier(&mut self, node: &'ast GrammarAst) -> WalkResult {
        self.scoped(Production::RuleModifier, node, |_| {
            expect_kind(
                Production::RuleModifier,
                node,
                &[NodeKind::Public, NodeKind::Private, NodeKind::Protected, NodeKind::Fragment],
            )
        })
    }

    // ---- rule blocks and alternatives ------------------------------------

    pub(crate) fn lexer_rule_block(&mut self, node: &'ast GrammarAst) -> WalkResult {
        self.scoped(Production::LexerRuleBlock, node, |w| {
            expect_kind(Production::LexerRuleBlock, node, &[NodeKind::Block])?;
            w.each_required(Production::LexerRuleBlock, NodeKind::Alt, node.children(), |w, alt| {
                w.ctx.current_outer_alt_root = Some(alt);
                w.ctx.current_outer_alt_number += 1;
                w.lexer_outer_alternative(alt)
            })
        })
    }

    pub(crate) fn rule_block(&mut self, node: &'ast GrammarAst) -> WalkResult {
        self.scoped(Production::RuleBlock, node, |w| {
            expect_kind(Production::RuleBlock, node, &[NodeKind::Block])?;
            w.each_required(Production::RuleBlock, NodeKind::Alt, node.children(), |w, alt| {
                w.ctx.current_outer_alt_root = Some(alt);
                w.ctx.current_outer_alt_number += 1;
                w.outer_alternative(alt)
            })
        })
    }

    pub(crate) fn lexer_outer_alternative(&mut self, node: &'ast GrammarAst) -> WalkResult {
        self.scoped(Production::LexerOuterAlternative, node, |w| {
            trace!(
                target: "gramlex::walker",
                alt = w.ctx.current_outer_alt_number,
                "Discovered lexer outer alternative"
            );
            w.listener.discover_outer_alt(&w.ctx, node);
            w.lexer_alternative(node)?;
            w.listener.finish_outer_alt(&w.ctx, node);
            Ok(())
        })
    }

    pub(crate) fn outer_alternative(&mut self, node: &'ast GrammarAst) -> WalkResult {
        self.scoped(Production::OuterAlternative, node, |w| {
            debug!(
                target: "gramlex::walker",
                rule = w.ctx.current_rule_name.as_deref().unwrap_or(""),
                alt = w.ctx.current_outer_alt_number,
                "Discovered outer alternative"
            );
            w.listener.discover_outer_alt(&w.ctx, node);
            w.alternative(node)?;
            w.listener.finish_outer_alt(&w.ctx, node);
            Ok(())
        })
    }

    /// `(LEXER_ALT_ACTION ALT command+)` or a plain `ALT`
    pub(crate) fn lexer_alternative(&mut self, node: &'ast GrammarAst) -> WalkResult {
        self.scoped(Production::LexerAlternative, node, |w| match node.kind() {
            NodeKind::LexerAltAction => {
                let mut cursor = Cursor::new(Production::LexerAlternative, node);
                let elements = cursor.expect(NodeKind::Alt)?;
                w.lexer_elements(elements)?;
                w.each_required(Production::LexerAlternative, NodeKind::Id, cursor.rest(), Self::lexer_command)
            }
            NodeKind::Alt => w.lexer_elements(node),
            _ => Err(unexpected(
                Production::LexerAlternative,
                &[NodeKind::LexerAltAction, NodeKind::Alt],
                node,
            )),
        })
    }

    pub(crate) fn lexer_elements(&mut self, node: &'ast GrammarAst) -> WalkResult {
        self.scoped(Production::LexerElements, node, |w| {
            w.alt_body(Production::LexerElements, node, Self::lexer_element)
        })
    }

    pub(crate) fn alternative(&mut self, node: &'ast GrammarAst) -> WalkResult {
        self.scoped(Production::Alternative, node, |w| {
            w.alt_body(Production::Alternative, node, Self::element)
        })
    }

    /// `(ALT ELEMENT_OPTIONS? (element+ | EPSILON))`
    fn alt_body(
        &mut self,
        production: Production,
        node: &'ast GrammarAst,
        element: fn(&mut Self, &'ast GrammarAst) -> WalkResult,
    ) -> WalkResult {
        expect_kind(production, node, &[NodeKind::Alt])?;
        self.listener.enter_alternative(&self.ctx, node);
        let mut cursor = Cursor::new(production, node);
        let result = (|| -> WalkResult {
            if let Some(options) = cursor.next_if(NodeKind::ElementOptions) {
                self.element_options(options, node)?;
            }
            match cursor.rest() {
                [] => Err(WalkError::mismatch(production.name(), "element or EPSILON", None)),
                [only] if only.kind() == NodeKind::Epsilon => Ok(()),
                elements => self.each(elements, element),
            }
        })();
        self.listener.exit_alternative(&self.ctx, node);
        result
    }

    /// `(LEXER_ACTION_CALL ID expr)` or `ID`
    pub(crate) fn lexer_command(&mut self, node: &'ast GrammarAst) -> WalkResult {
        self.scoped(Production::LexerCommand, node, |w| {
            let alt = w.ctx.current_outer_alt_number;
            match node.kind() {
                NodeKind::LexerActionCall => {
                    let mut cursor = Cursor::new(Production::LexerCommand, node);
                    let id = cursor.expect(NodeKind::Id)?;
                    let arg = cursor.expect_any(&[NodeKind::Id, NodeKind::Int])?;
                    cursor.finish()?;
                    w.lexer_command_expr(arg)?;
                    w.listener.lexer_call_command(&w.ctx, alt, id, arg);
                    Ok(())
                }
                NodeKind::Id => {
                    w.listener.lexer_command(&w.ctx, alt, node);
                    Ok(())
                }
                _ => Err(unexpected(
                    Production::LexerCommand,
                    &[NodeKind::LexerActionCall, NodeKind::Id],
                    node,
                )),
            }
        })
    }

    pub(crate) fn lexer_command_expr(&mut self, node: &'ast GrammarAst) -> WalkResult {
        self.scoped(Production::LexerCommandExpr, node, |_| {
            expect_kind(Production::LexerCommandExpr, node, &[NodeKind::Id, NodeKind::Int])
        })
    }

    // ---- elements --------------------------------------------------------

    pub(crate) fn lexer_element(&mut self, node: &'ast GrammarAst) -> WalkResult {
        self.scoped(Production::LexerElement, node, |w| match node.kind() {
            NodeKind::Action | NodeKind::Sempred => w.action_element(node),
            NodeKind::Epsilon => Ok(()),
            NodeKind::Block | NodeKind::Optional | NodeKind::Closure | NodeKind::PositiveClosure => {
                w.lexer_subrule(node)
            }
            _ => w.lexer_atom(node),
        })
    }

    pub(crate) fn lexer_atom(&mut self, node: &'ast GrammarAst) -> WalkResult {
        self.scoped(Production::LexerAtom, node, |w| match node.kind() {
            NodeKind::StringLiteral | NodeKind::TokenRef => w.terminal(node),
            NodeKind::Not => w.not_set(Production::LexerAtom, node, false),
            NodeKind::Set => w.block_set(node),
            NodeKind::Wildcard => w.wildcard(node),
            NodeKind::LexerCharSet => Ok(()),
            NodeKind::Range => w.range(node),
            NodeKind::RuleRef => w.ruleref(node),
            _ => Err(unexpected(
                Production::LexerAtom,
                &[
                    NodeKind::StringLiteral,
                    NodeKind::TokenRef,
                    NodeKind::Not,
                    NodeKind::Set,
                    NodeKind::Wildcard,
                    NodeKind::LexerCharSet,
                    NodeKind::Range,
                    NodeKind::RuleRef,
                ],
                node,
            )),
        })
    }

    pub(crate) fn lexer_subrule(&mut self, node: &'ast GrammarAst) -> WalkResult {
        self.scoped(Production::LexerSubrule, node, |w| w.suffixed_block(node, Self::lexer_block))
    }

    /// `(BLOCK OPTIONS? lexerAlternative+)`
    pub(crate) fn lexer_block(&mut self, node: &'ast GrammarAst) -> WalkResult {
        self.scoped(Production::LexerBlock, node, |w| {
            expect_kind(Production::LexerBlock, node, &[NodeKind::Block])?;
            let mut cursor = Cursor::new(Production::LexerBlock, node);
            if let Some(options) = cursor.next_if(NodeKind::Options) {
                w.options_spec(options)?;
            }
            w.each_required(Production::LexerBlock, NodeKind::Alt, cursor.rest(), Self::lexer_alternative)
        })
    }

    pub(crate) fn element(&mut self, node: &'ast GrammarAst) -> WalkResult {
        self.scoped(Production::Element, node, |w| match node.kind() {
            NodeKind::Assign | NodeKind::PlusAssign => w.labeled_element(node),
            NodeKind::Block | NodeKind::Optional | NodeKind::Closure | NodeKind::PositiveClosure => w.subrule(node),
            NodeKind::Action | NodeKind::Sempred => w.action_element(node),
            NodeKind::Range => w.range(node),
            NodeKind::Not => w.not_set(Production::Element, node, true),
            _ => w.atom(node),
        })
    }

    /// `(ACTION ELEMENT_OPTIONS?)` or `(SEMPRED ELEMENT_OPTIONS?)`
    pub(crate) fn action_element(&mut self, node: &'ast GrammarAst) -> WalkResult {
        self.scoped(Production::ActionElement, node, |w| {
            expect_kind(Production::ActionElement, node, &[NodeKind::Action, NodeKind::Sempred])?;
            let mut cursor = Cursor::new(Production::ActionElement, node);
            if let Some(options) = cursor.next_if(NodeKind::ElementOptions) {
                w.element_options(options, node)?;
            }
            cursor.finish()?;
            if node.kind() == NodeKind::Action {
                w.listener.action_in_alt(&w.ctx, node);
            } else {
                w.listener.sempred_in_alt(&w.ctx, node);
            }
            Ok(())
        })
    }

    /// `(ASSIGN ID element)` or `(PLUS_ASSIGN ID element)`
    pub(crate) fn labeled_element(&mut self, node: &'ast GrammarAst) -> WalkResult {
        self.scoped(Production::LabeledElement, node, |w| {
            expect_kind(Production::LabeledElement, node, &[NodeKind::Assign, NodeKind::PlusAssign])?;
            let mut cursor = Cursor::new(Production::LabeledElement, node);
            let id = cursor.expect(NodeKind::Id)?;
            let Some(element) = cursor.next() else {
                return Err(WalkError::mismatch(Production::LabeledElement.name(), "element", None));
            };
            cursor.finish()?;
            w.element(element)?;
            w.listener.label(&w.ctx, node, id, element);
            Ok(())
        })
    }

    pub(crate) fn subrule(&mut self, node: &'ast GrammarAst) -> WalkResult {
        self.scoped(Production::Subrule, node, |w| w.suffixed_block(node, Self::block))
    }

    /// `(suffix BLOCK)` or a bare `BLOCK`; suffixes deepen the ebnf nesting
    fn suffixed_block(&mut self, node: &'ast GrammarAst, block: fn(&mut Self, &'ast GrammarAst) -> WalkResult) -> WalkResult {
        if !node.kind().is_ebnf_suffix() {
            return block(self, node);
        }
        self.block_suffix(node)?;
        let mut cursor = Cursor::new(Production::BlockSuffix, node);
        let inner = cursor.expect(NodeKind::Block)?;
        cursor.finish()?;
        self.ctx.ebnf_depth += 1;
        let result = block(self, inner);
        self.ctx.ebnf_depth -= 1;
        result
    }

    pub(crate) fn block_suffix(&mut self, node: &'ast GrammarAst) -> WalkResult {
        self.scoped(Production::BlockSuffix, node, |w| w.ebnf_suffix(node))
    }

    pub(crate) fn ebnf_suffix(&mut self, node: &'ast GrammarAst) -> WalkResult {
        self.scoped(Production::EbnfSuffix, node, |_| {
            expect_kind(Production::EbnfSuffix, node, &EBNF_SUFFIXES)
        })
    }

    pub(crate) fn atom(&mut self, node: &'ast GrammarAst) -> WalkResult {
        self.scoped(Production::Atom, node, |w| match node.kind() {
            NodeKind::Not => w.not_set(Production::Atom, node, false),
            NodeKind::Set => w.block_set(node),
            NodeKind::Wildcard => w.wildcard(node),
            NodeKind::Dot => {
                let mut cursor = Cursor::new(Production::Atom, node);
                cursor.expect(NodeKind::Id)?;
                let target = cursor.expect_any(&[NodeKind::StringLiteral, NodeKind::TokenRef, NodeKind::RuleRef])?;
                cursor.finish()?;
                if target.kind() == NodeKind::RuleRef {
                    w.ruleref(target)
                } else {
                    w.terminal(target)
                }
            }
            NodeKind::StringLiteral | NodeKind::TokenRef => w.terminal(node),
            NodeKind::RuleRef => w.ruleref(node),
            _ => Err(unexpected(
                Production::Atom,
                &[
                    NodeKind::Not,
                    NodeKind::Set,
                    NodeKind::Wildcard,
                    NodeKind::Dot,
                    NodeKind::StringLiteral,
                    NodeKind::TokenRef,
                    NodeKind::RuleRef,
                ],
                node,
            )),
        })
    }

    /// `(NOT SET)`, or `(NOT BLOCK)` where a block is allowed
    fn not_set(&mut self, production: Production, node: &'ast GrammarAst, allow_block: bool) -> WalkResult {
        let mut cursor = Cursor::new(production, node);
        let target = if allow_block {
            cursor.expect_any(&[NodeKind::Set, NodeKind::Block])?
        } else {
            cursor.expect(NodeKind::Set)?
        };
        cursor.finish()?;
        if target.kind() == NodeKind::Block {
            self.block(target)
        } else {
            self.block_set(target)
        }
    }

    /// `(WILDCARD ELEMENT_OPTIONS?)`
    fn wildcard(&mut self, node: &'ast GrammarAst) -> WalkResult {
        let mut cursor = Cursor::new(Production::Atom, node);
        if let Some(options) = cursor.next_if(NodeKind::ElementOptions) {
            self.element_options(options, node)?;
        }
        cursor.finish()?;
        self.listener.wildcard_ref(&self.ctx, node);
        Ok(())
    }

    pub(crate) fn block_set(&mut self, node: &'ast GrammarAst) -> WalkResult {
        self.scoped(Production::BlockSet, node, |w| {
            expect_kind(Production::BlockSet, node, &[NodeKind::Set])?;
            w.each_required(Production::BlockSet, NodeKind::TokenRef, node.children(), Self::set_element)
        })
    }

    pub(crate) fn set_element(&mut self, node: &'ast GrammarAst) -> WalkResult {
        self.scoped(Production::SetElement, node, |w| match node.kind() {
            NodeKind::StringLiteral | NodeKind::TokenRef => w.terminal_ref(Production::SetElement, node),
            NodeKind::Range => w.range(node),
            NodeKind::LexerCharSet => Ok(()),
            _ => Err(unexpected(
                Production::SetElement,
                &[NodeKind::StringLiteral, NodeKind::TokenRef, NodeKind::Range, NodeKind::LexerCharSet],
                node,
            )),
        })
    }

    /// `(BLOCK OPTIONS? AT* ACTION? alternative+)`
    pub(crate) fn block(&mut self, node: &'ast GrammarAst) -> WalkResult {
        self.scoped(Production::Block, node, |w| {
            expect_kind(Production::Block, node, &[NodeKind::Block])?;
            let mut cursor = Cursor::new(Production::Block, node);
            if let Some(options) = cursor.next_if(NodeKind::Options) {
                w.options_spec(options)?;
            }
            while let Some(action) = cursor.next_if(NodeKind::At) {
                w.rule_action(action)?;
            }
            cursor.next_if(NodeKind::Action);
            w.each_required(Production::Block, NodeKind::Alt, cursor.rest(), Self::alternative)
        })
    }

    /// `(RULE_REF ARG_ACTION? ELEMENT_OPTIONS?)`
    pub(crate) fn ruleref(&mut self, node: &'ast GrammarAst) -> WalkResult {
        self.scoped(Production::Ruleref, node, |w| {
            expect_kind(Production::Ruleref, node, &[NodeKind::RuleRef])?;
            let mut cursor = Cursor::new(Production::Ruleref, node);
            let arg = cursor.next_if(NodeKind::ArgAction);
            if let Some(options) = cursor.next_if(NodeKind::ElementOptions) {
                w.element_options(options, node)?;
            }
            cursor.finish()?;
            w.listener.rule_ref(&w.ctx, node, arg);
            Ok(())
        })
    }

    /// `(RANGE STRING_LITERAL STRING_LITERAL)`
    pub(crate) fn range(&mut self, node: &'ast GrammarAst) -> WalkResult {
        self.scoped(Production::Range, node, |_| {
            expect_kind(Production::Range, node, &[NodeKind::Range])?;
            let mut cursor = Cursor::new(Production::Range, node);
            cursor.expect(NodeKind::StringLiteral)?;
            cursor.expect(NodeKind::StringLiteral)?;
            cursor.finish()
        })
    }

    pub(crate) fn terminal(&mut self, node: &'ast GrammarAst) -> WalkResult {
        self.scoped(Production::Terminal, node, |w| w.terminal_ref(Production::Terminal, node))
    }

    /// `STRING_LITERAL` or `TOKEN_REF`, each with optional element options
    fn terminal_ref(&mut self, production: Production, node: &'ast GrammarAst) -> WalkResult {
        expect_kind(production, node, &[NodeKind::StringLiteral, NodeKind::TokenRef])?;
        let mut cursor = Cursor::new(production, node);
        if let Some(options) = cursor.next_if(NodeKind::ElementOptions) {
            self.element_options(options, node)?;
        }
        cursor.finish()?;
        if node.kind() == NodeKind::StringLiteral {
            self.listener.string_ref(&self.ctx, node);
        } else {
            self.listener.token_ref(&self.ctx, node);
        }
        Ok(())
    }

    pub(crate) fn element_options(&mut self, node: &'ast GrammarAst, element: &'ast GrammarAst) -> WalkResult {
        self.scoped(Production::ElementOptions, node, |w| {
            expect_kind(Production::ElementOptions, node, &[NodeKind::ElementOptions])?;
            w.each(node.children(), |w, option| w.element_option(option, element))
        })
    }

    /// `ID` or `(ASSIGN ID value)`
    pub(crate) fn element_option(&mut self, node: &'ast GrammarAst, element: &'ast GrammarAst) -> WalkResult {
        self.scoped(Production::ElementOption, node, |w| match node.kind() {
            NodeKind::Id => {
                w.listener.element_option(&w.ctx, element, node, None);
                Ok(())
            }
            NodeKind::Assign => {
                let mut cursor = Cursor::new(Production::ElementOption, node);
                let id = cursor.expect(NodeKind::Id)?;
                let value = cursor.expect_any(&[
                    NodeKind::Id,
                    NodeKind::StringLiteral,
                    NodeKind::Action,
                    NodeKind::Int,
                ])?;
                cursor.finish()?;
                w.listener.element_option(&w.ctx, element, id, Some(value));
                Ok(())
            }
            _ => Err(unexpected(Production::ElementOption, &[NodeKind::Id, NodeKind::Assign], node)),
        })
    }

    /// Entry point for `production` when looked up by name
    pub(crate) fn handler_for(production: Production) -> ProductionHandler<'ast, L> {
        match production {
            Production::GrammarSpec => Self::grammar_spec,
            Production::PrequelConstructs => |w, n| w.prequel_constructs(n, n.children()),
            Production::PrequelConstruct => Self::prequel_construct,
            Production::OptionsSpec => Self::options_spec,
            Production::OptionDef => Self::option,
            Production::OptionValue => Self::option_value,
            Production::DelegateGrammars => Self::delegate_grammars,
            Production::DelegateGrammar => Self::delegate_grammar,
            Production::TokensSpec => Self::tokens_spec,
            Production::TokenSpec => Self::token_spec,
            Production::ChannelsSpec => Self::channels_spec,
            Production::ChannelSpec => Self::channel_spec,
            Production::Action => Self::action,
            Production::Rules => Self::rules,
            Production::Mode => Self::mode,
            Production::LexerRule => Self::lexer_rule,
            Production::Rule => Self::rule,
            Production::ExceptionGroup => |w, n| w.exception_group(n, n.children()),
            Production::ExceptionHandler => Self::exception_handler,
            Production::FinallyClause => Self::finally_clause,
            Production::Locals => |w, n| w.locals(n).map(drop),
            Production::RuleReturns => |w, n| w.rule_returns(n).map(drop),
            Production::ThrowsSpec => |w, n| w.throws_spec(n).map(drop),
            Production::RuleAction => |w, n| w.rule_action(n).map(drop),
            Production::RuleModifier => Self::rule_modifier,
            Production::LexerRuleBlock => Self::lexer_rule_block,
            Production::RuleBlock => Self::rule_block,
            Production::LexerOuterAlternative => Self::lexer_outer_alternative,
            Production::OuterAlternative => Self::outer_alternative,
            Production::LexerAlternative => Self::lexer_alternative,
            Production::LexerElements => Self::lexer_elements,
            Production::LexerElement => Self::lexer_element,
            Production::LexerBlock => Self::lexer_block,
            Production::LexerAtom => Self::lexer_atom,
            Production::Alternative => Self::alternative,
            Production::LexerCommand => Self::lexer_command,
            Production::LexerCommandExpr => Self::lexer_command_expr,
            Production::Element => Self::element,
            Production::LabeledElement => Self::labeled_element,
            Production::Subrule => Self::subrule,
            Production::LexerSubrule => Self::lexer_subrule,
            Production::BlockSuffix => Self::block_suffix,
            Production::EbnfSuffix => Self::ebnf_suffix,
            Production::Atom => Self::atom,
            Production::BlockSet => Self::block_set,
            Production::SetElement => Self::set_element,
            Production::Block => Self::block,
            Production::Ruleref => Self::ruleref,
            Production::Range => Self::range,
            Production::Terminal => Self::terminal,
            Production::ElementOptions => |w, n| w.element_options(n, n),
            Production::ElementOption => |w, n| w.element_option(n, n),
            Production::ActionElement => Self::action_element,
        }
    }
}

/// Sequential reader over a node's children
struct Cursor<'ast> {
    production: Production,
    nodes: &'ast [GrammarAst],
    pos: usize,
}

impl<'ast> Cursor<'ast> {
    fn new(production: Production, node: &'ast GrammarAst) -> Self {
        Self {
            production,
            nodes: node.children(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<&'ast GrammarAst> {
        self.nodes.get(self.pos)
    }

    fn next(&mut self) -> Option<&'ast GrammarAst> {
        let node = self.nodes.get(self.pos)?;
        self.pos += 1;
        Some(node)
    }

    fn next_if(&mut self, kind: NodeKind) -> Option<&'ast GrammarAst> {
        self.next_if_any(&[kind])
    }

    fn next_if_any(&mut self, kinds: &[NodeKind]) -> Option<&'ast GrammarAst> {
        match self.peek() {
            Some(node) if kinds.contains(&node.kind()) => self.next(),
            _ => None,
        }
    }

    fn expect(&mut self, kind: NodeKind) -> Result<&'ast GrammarAst, WalkError> {
        self.expect_any(&[kind])
    }

    fn expect_any(&mut self, kinds: &[NodeKind]) -> Result<&'ast GrammarAst, WalkError> {
        match self.peek() {
            Some(node) if kinds.contains(&node.kind()) => {
                self.pos += 1;
                Ok(node)
            }
            Some(node) => Err(unexpected(self.production, kinds, node)),
            None => Err(WalkError::mismatch(self.production.name(), expected_names(kinds), None)),
        }
    }

    /// Consume the run of children whose kind is in `kinds`
    fn take_while(&mut self, kinds: &[NodeKind]) -> &'ast [GrammarAst] {
        let start = self.pos;
        while self.next_if_any(kinds).is_some() {}
        &self.nodes[start..self.pos]
    }

    /// Consume everything left
    fn rest(&mut self) -> &'ast [GrammarAst] {
        let rest = &self.nodes[self.pos..];
        self.pos = self.nodes.len();
        rest
    }

    /// Fail if children remain
    fn finish(&self) -> WalkResult {
        match self.peek() {
            None => Ok(()),
            Some(node) => Err(WalkError::mismatch(
                self.production.name(),
                "no further children",
                Some(node.kind()),
            )
            .with_span(node.span())),
        }
    }
}

fn expected_names(kinds: &[NodeKind]) -> String {
    kinds.iter().map(|k| k.name()).collect::<Vec<_>>().join(" | ")
}

fn unexpected(production: Production, kinds: &[NodeKind], node: &GrammarAst) -> WalkError {
    WalkError::mismatch(production.name(), expected_names(kinds), Some(node.kind())).with_span(node.span())
}

fn expect_kind(production: Production, node: &GrammarAst, kinds: &[NodeKind]) -> WalkResult {
    if kinds.contains(&node.kind()) {
        Ok(())
    } else {
        Err(unexpected(production, kinds, node))
    }
}

/// `(KIND CHILD)`; yields the child
fn single_child<'ast>(
    production: Production,
    node: &'ast GrammarAst,
    kind: NodeKind,
    child: NodeKind,
) -> Result<&'ast GrammarAst, WalkError> {
    expect_kind(production, node, &[kind])?;
    let mut cursor = Cursor::new(production, node);
    let found = cursor.expect(child)?;
    cursor.finish()?;
    Ok(found)
}
