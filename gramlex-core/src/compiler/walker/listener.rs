//! Walker callbacks
//!
//! Every method has an empty default body; implement only what you need.
//! `enter`/`exit` fire around every production. The other callbacks fire
//! once per construct with their arguments already resolved.

use super::context::WalkContext;
use super::production::Production;
use crate::compiler::tree::GrammarAst;

/// Everything known about a parser rule before its body is visited
#[derive(Debug, Clone)]
pub struct RuleDiscovery<'a> {
    pub rule: &'a GrammarAst,
    /// `RULE_REF` naming the rule
    pub id: &'a GrammarAst,
    pub modifiers: Vec<&'a GrammarAst>,
    pub arg_action: Option<&'a GrammarAst>,
    /// `ARG_ACTION` under `RETURNS`
    pub returns: Option<&'a GrammarAst>,
    pub throws: Option<&'a GrammarAst>,
    pub options: Option<&'a GrammarAst>,
    /// `ARG_ACTION` under `LOCALS`
    pub locals: Option<&'a GrammarAst>,
    /// `@name {...}` rule actions
    pub actions: Vec<&'a GrammarAst>,
    pub block: &'a GrammarAst,
}

#[allow(unused_variables)]
pub trait GrammarListener {
    fn enter(&mut self, ctx: &WalkContext<'_>, production: Production, node: &GrammarAst) {}
    fn exit(&mut self, ctx: &WalkContext<'_>, production: Production, node: &GrammarAst) {}

    // Grammar level

    fn discover_grammar(&mut self, ctx: &WalkContext<'_>, root: &GrammarAst, id: &GrammarAst) {}
    /// `first` is the first prequel construct, if any
    fn finish_prequels(&mut self, ctx: &WalkContext<'_>, first: Option<&GrammarAst>) {}
    fn finish_grammar(&mut self, ctx: &WalkContext<'_>, root: &GrammarAst, id: &GrammarAst) {}

    fn grammar_option(&mut self, ctx: &WalkContext<'_>, id: &GrammarAst, value: &GrammarAst) {}
    fn rule_option(&mut self, ctx: &WalkContext<'_>, id: &GrammarAst, value: &GrammarAst) {}
    fn block_option(&mut self, ctx: &WalkContext<'_>, block: &GrammarAst, id: &GrammarAst, value: &GrammarAst) {}

    /// `import label = Id` or `import Id`
    fn import_grammar(&mut self, ctx: &WalkContext<'_>, label: Option<&GrammarAst>, id: &GrammarAst) {}
    fn define_token(&mut self, ctx: &WalkContext<'_>, id: &GrammarAst) {}
    fn define_channel(&mut self, ctx: &WalkContext<'_>, id: &GrammarAst) {}
    /// `@scope::name {...}`
    fn global_named_action(
        &mut self,
        ctx: &WalkContext<'_>,
        scope: Option<&GrammarAst>,
        name: &GrammarAst,
        action: &GrammarAst,
    ) {
    }

    // Rules

    fn discover_rules(&mut self, ctx: &WalkContext<'_>, rules: &GrammarAst) {}
    fn finish_rules(&mut self, ctx: &WalkContext<'_>, rules: &GrammarAst) {}
    fn mode_def(&mut self, ctx: &WalkContext<'_>, mode: &GrammarAst, id: &GrammarAst) {}

    fn discover_rule(&mut self, ctx: &WalkContext<'_>, rule: &RuleDiscovery<'_>) {}
    fn finish_rule(&mut self, ctx: &WalkContext<'_>, rule: &GrammarAst, id: &GrammarAst, block: &GrammarAst) {}
    fn discover_lexer_rule(
        &mut self,
        ctx: &WalkContext<'_>,
        rule: &GrammarAst,
        id: &GrammarAst,
        modifiers: &[&GrammarAst],
        block: &GrammarAst,
    ) {
    }
    fn finish_lexer_rule(&mut self, ctx: &WalkContext<'_>, rule: &GrammarAst, id: &GrammarAst, block: &GrammarAst) {}

    fn rule_catch(&mut self, ctx: &WalkContext<'_>, arg: &GrammarAst, action: &GrammarAst) {}
    fn finally_action(&mut self, ctx: &WalkContext<'_>, action: &GrammarAst) {}

    // Alternatives

    /// Outer alternative, after the context counter moved to it
    fn discover_outer_alt(&mut self, ctx: &WalkContext<'_>, alt: &GrammarAst) {}
    fn finish_outer_alt(&mut self, ctx: &WalkContext<'_>, alt: &GrammarAst) {}
    /// Any alternative, outer or nested
    fn enter_alternative(&mut self, ctx: &WalkContext<'_>, alt: &GrammarAst) {}
    fn exit_alternative(&mut self, ctx: &WalkContext<'_>, alt: &GrammarAst) {}

    fn lexer_command(&mut self, ctx: &WalkContext<'_>, outer_alt_number: usize, id: &GrammarAst) {}
    fn lexer_call_command(&mut self, ctx: &WalkContext<'_>, outer_alt_number: usize, id: &GrammarAst, arg: &GrammarAst) {}

    // Elements

    fn action_in_alt(&mut self, ctx: &WalkContext<'_>, action: &GrammarAst) {}
    fn sempred_in_alt(&mut self, ctx: &WalkContext<'_>, pred: &GrammarAst) {}
    /// `id = element` or `id += element`; `op` is the `ASSIGN`/`PLUS_ASSIGN` node
    fn label(&mut self, ctx: &WalkContext<'_>, op: &GrammarAst, id: &GrammarAst, element: &GrammarAst) {}
    fn rule_ref(&mut self, ctx: &WalkContext<'_>, node: &GrammarAst, arg: Option<&GrammarAst>) {}
    fn token_ref(&mut self, ctx: &WalkContext<'_>, node: &GrammarAst) {}
    fn string_ref(&mut self, ctx: &WalkContext<'_>, node: &GrammarAst) {}
    fn wildcard_ref(&mut self, ctx: &WalkContext<'_>, node: &GrammarAst) {}
    /// `<id>` or `<id = value>` attached to `element`
    fn element_option(&mut self, ctx: &WalkContext<'_>, element: &GrammarAst, id: &GrammarAst, value: Option<&GrammarAst>) {}
}

/// Listener that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopListener;

impl GrammarListener for NoopListener {}

impl<L: GrammarListener + ?Sized> GrammarListener for &mut L {
    fn enter(&mut self, ctx: &WalkContext<'_>, production: Production, node: &GrammarAst) {
        (**self).enter(ctx, production, node)
    }
    fn exit(&mut self, ctx: &WalkContext<'_>, production: Production, node: &GrammarAst) {
        (**self).exit(ctx, production, node)
    }
    fn discover_grammar(&mut self, ctx: &WalkContext<'_>, root: &GrammarAst, id: &GrammarAst) {
        (**self).discover_grammar(ctx, root, id)
    }
    fn finish_prequels(&mut self, ctx: &WalkContext<'_>, first: Option<&GrammarAst>) {
        (**self).finish_prequels(ctx, first)
    }
    fn finish_grammar(&mut self, ctx: &WalkContext<'_>, root: &GrammarAst, id: &GrammarAst) {
        (**self).finish_grammar(ctx, root, id)
    }
    fn grammar_option(&mut self, ctx: &WalkContext<'_>, id: &GrammarAst, value: &GrammarAst) {
        (**self).grammar_option(ctx, id, value)
    }
    fn rule_option(&mut self, ctx: &WalkContext<'_>, id: &GrammarAst, value: &GrammarAst) {
        (**self).rule_option(ctx, id, value)
    }
    fn block_option(&mut self, ctx: &WalkContext<'_>, block: &GrammarAst, id: &GrammarAst, value: &GrammarAst) {
        (**self).block_option(ctx, block, id, value)
    }
    fn import_grammar(&mut self, ctx: &WalkContext<'_>, label: Option<&GrammarAst>, id: &GrammarAst) {
        (**self).import_grammar(ctx, label, id)
    }
    fn define_token(&mut self, ctx: &WalkContext<'_>, id: &GrammarAst) {
        (**self).define_token(ctx, id)
    }
    fn define_channel(&mut self, ctx: &WalkContext<'_>, id: &GrammarAst) {
        (**self).define_channel(ctx, id)
    }
    fn global_named_action(
        &mut self,
        ctx: &WalkContext<'_>,
        scope: Option<&GrammarAst>,
        name: &GrammarAst,
        action: &GrammarAst,
    ) {
        (**self).global_named_action(ctx, scope, name, action)
    }
    fn discover_rules(&mut self, ctx: &WalkContext<'_>, rules: &GrammarAst) {
        (**self).discover_rules(ctx, rules)
    }
    fn finish_rules(&mut self, ctx: &WalkContext<'_>, rules: &GrammarAst) {
        (**self).finish_rules(ctx, rules)
    }
    fn mode_def(&mut self, ctx: &WalkContext<'_>, mode: &GrammarAst, id: &GrammarAst) {
        (**self).mode_def(ctx, mode, id)
    }
    fn discover_rule(&mut self, ctx: &WalkContext<'_>, rule: &RuleDiscovery<'_>) {
        (**self).discover_rule(ctx, rule)
    }
    fn finish_rule(&mut self, ctx: &WalkContext<'_>, rule: &GrammarAst, id: &GrammarAst, block: &GrammarAst) {
        (**self).finish_rule(ctx, rule, id, block)
    }
    fn discover_lexer_rule(
        &mut self,
        ctx: &WalkContext<'_>,
        rule: &GrammarAst,
        id: &GrammarAst,
        modifiers: &[&GrammarAst],
        block: &GrammarAst,
    ) {
        (**self).discover_lexer_rule(ctx, rule, id, modifiers, block)
    }
    fn finish_lexer_rule(&mut self, ctx: &WalkContext<'_>, rule: &GrammarAst, id: &GrammarAst, block: &GrammarAst) {
        (**self).finish_lexer_rule(ctx, rule, id, block)
    }
    fn rule_catch(&mut self, ctx: &WalkContext<'_>, arg: &GrammarAst, action: &GrammarAst) {
        (**self).rule_catch(ctx, arg, action)
    }
    fn finally_action(&mut self, ctx: &WalkContext<'_>, action: &GrammarAst) {
        (**self).finally_action(ctx, action)
    }
    fn discover_outer_alt(&mut self, ctx: &WalkContext<'_>, alt: &GrammarAst) {
        (**self).discover_outer_alt(ctx, alt)
    }
    fn finish_outer_alt(&mut self, ctx: &WalkContext<'_>, alt: &GrammarAst) {
        (**self).finish_outer_alt(ctx, alt)
    }
    fn enter_alternative(&mut self, ctx: &WalkContext<'_>, alt: &GrammarAst) {
        (**self).enter_alternative(ctx, alt)
    }
    fn exit_alternative(&mut self, ctx: &WalkContext<'_>, alt: &GrammarAst) {
        (**self).exit_alternative(ctx, alt)
    }
    fn lexer_command(&mut self, ctx: &WalkContext<'_>, outer_alt_number: usize, id: &GrammarAst) {
        (**self).lexer_command(ctx, outer_alt_number, id)
    }
    fn lexer_call_command(&mut self, ctx: &WalkContext<'_>, outer_alt_number: usize, id: &GrammarAst, arg: &GrammarAst) {
        (**self).lexer_call_command(ctx, outer_alt_number, id, arg)
    }
    fn action_in_alt(&mut self, ctx: &WalkContext<'_>, action: &GrammarAst) {
        (**self).action_in_alt(ctx, action)
    }
    fn sempred_in_alt(&mut self, ctx: &WalkContext<'_>, pred: &GrammarAst) {
        (**self).sempred_in_alt(ctx, pred)
    }
    fn label(&mut self, ctx: &WalkContext<'_>, op: &GrammarAst, id: &GrammarAst, element: &GrammarAst) {
        (**self).label(ctx, op, id, element)
    }
    fn rule_ref(&mut self, ctx: &WalkContext<'_>, node: &GrammarAst, arg: Option<&GrammarAst>) {
        (**self).rule_ref(ctx, node, arg)
    }
    fn token_ref(&mut self, ctx: &WalkContext<'_>, node: &GrammarAst) {
        (**self).token_ref(ctx, node)
    }
    fn string_ref(&mut self, ctx: &WalkContext<'_>, node: &GrammarAst) {
        (**self).string_ref(ctx, node)
    }
    fn wildcard_ref(&mut self, ctx: &WalkContext<'_>, node: &GrammarAst) {
        (**self).wildcard_ref(ctx, node)
    }
    fn element_option(&mut self, ctx: &WalkContext<'_>, element: &GrammarAst, id: &GrammarAst, value: Option<&GrammarAst>) {
        (**self).element_option(ctx, element, id, value)
    }
}
