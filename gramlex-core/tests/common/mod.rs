//! Test helpers shared by the integration suites

#![allow(dead_code)]

use std::sync::Arc;

use gramlex_core::compiler::lexer::{build_lexer_with_sink, TokenKind};
use gramlex_core::compiler::tree::{GrammarAst, GrammarType, NodeKind};
use gramlex_core::compiler::walker::{GrammarListener, Production, RuleDiscovery, WalkContext};
use gramlex_core::kit::diagnostics::DiagnosticBuffer;
use gramlex_core::kit::lexer::TokenStream;

/// Install a test subscriber once; `RUST_LOG=gramlex=trace` shows scanner output
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Tokenize `source`, collecting diagnostics instead of printing them
pub fn lex(source: &str) -> (TokenStream<'_>, DiagnosticBuffer) {
    init_tracing();
    let buffer = DiagnosticBuffer::new();
    let stream = build_lexer_with_sink(source, Arc::new(buffer.clone())).tokenize();
    (stream, buffer)
}

/// Default-channel `(kind, text)` pairs, `Eof` excluded
pub fn visible(stream: &TokenStream<'_>) -> Vec<(TokenKind, String)> {
    stream
        .default_channel()
        .filter(|t| t.kind != TokenKind::Eof)
        .map(|t| (t.kind, t.text.to_string()))
        .collect()
}

// ---- tree builders ----

pub fn id(text: &str) -> GrammarAst {
    GrammarAst::leaf(NodeKind::Id, text)
}

pub fn token_ref(name: &str) -> GrammarAst {
    GrammarAst::leaf(NodeKind::TokenRef, name)
}

pub fn rule_ref(name: &str) -> GrammarAst {
    GrammarAst::leaf(NodeKind::RuleRef, name)
}

pub fn literal(text: &str) -> GrammarAst {
    GrammarAst::leaf(NodeKind::StringLiteral, text)
}

pub fn alt(elements: Vec<GrammarAst>) -> GrammarAst {
    GrammarAst::with_children(NodeKind::Alt, elements)
}

pub fn block(alts: Vec<GrammarAst>) -> GrammarAst {
    GrammarAst::with_children(NodeKind::Block, alts)
}

pub fn parser_rule(name: &str, alts: Vec<GrammarAst>) -> GrammarAst {
    GrammarAst::rule(vec![rule_ref(name), block(alts)])
}

pub fn lexer_rule(name: &str, alts: Vec<GrammarAst>) -> GrammarAst {
    GrammarAst::rule(vec![token_ref(name), block(alts)])
}

pub fn option(name: &str, value: GrammarAst) -> GrammarAst {
    GrammarAst::with_children(NodeKind::Assign, vec![id(name), value])
}

pub fn grammar(name: &str, mut rest: Vec<GrammarAst>) -> GrammarAst {
    rest.insert(0, id(name));
    GrammarAst::grammar(GrammarType::Combined, rest)
}

pub fn rules(rules: Vec<GrammarAst>) -> GrammarAst {
    GrammarAst::with_children(NodeKind::Rules, rules)
}

/// Listener that logs every semantic callback as a short string
#[derive(Debug, Default)]
pub struct RecordingListener {
    pub events: Vec<String>,
    pub enters: Vec<Production>,
    pub exits: Vec<Production>,
}

impl RecordingListener {
    fn push(&mut self, event: String) {
        self.events.push(event);
    }

    /// Events whose label starts with `prefix`
    pub fn events_of(&self, prefix: &str) -> Vec<&str> {
        self.events
            .iter()
            .filter(|e| e.starts_with(prefix))
            .map(String::as_str)
            .collect()
    }
}

impl GrammarListener for RecordingListener {
    fn enter(&mut self, _: &WalkContext<'_>, production: Production, _: &GrammarAst) {
        self.enters.push(production);
    }

    fn exit(&mut self, _: &WalkContext<'_>, production: Production, _: &GrammarAst) {
        self.exits.push(production);
    }

    fn discover_grammar(&mut self, _: &WalkContext<'_>, _: &GrammarAst, id: &GrammarAst) {
        self.push(format!("grammar {}", id.text()));
    }

    fn finish_prequels(&mut self, _: &WalkContext<'_>, first: Option<&GrammarAst>) {
        self.push(format!("prequels {}", first.map_or("-", |n| n.kind().name())));
    }

    fn finish_grammar(&mut self, _: &WalkContext<'_>, _: &GrammarAst, id: &GrammarAst) {
        self.push(format!("end-grammar {}", id.text()));
    }

    fn grammar_option(&mut self, _: &WalkContext<'_>, id: &GrammarAst, value: &GrammarAst) {
        self.push(format!("grammar-option {}={}", id.text(), value.text()));
    }

    fn rule_option(&mut self, ctx: &WalkContext<'_>, id: &GrammarAst, value: &GrammarAst) {
        let rule = ctx.current_rule_name.as_deref().unwrap_or("?");
        self.push(format!("rule-option {rule} {}={}", id.text(), value.text()));
    }

    fn block_option(&mut self, _: &WalkContext<'_>, _: &GrammarAst, id: &GrammarAst, value: &GrammarAst) {
        self.push(format!("block-option {}={}", id.text(), value.text()));
    }

    fn import_grammar(&mut self, _: &WalkContext<'_>, label: Option<&GrammarAst>, id: &GrammarAst) {
        self.push(format!("import {}{}", label.map_or(String::new(), |l| format!("{}=", l.text())), id.text()));
    }

    fn define_token(&mut self, _: &WalkContext<'_>, id: &GrammarAst) {
        self.push(format!("token {}", id.text()));
    }

    fn define_channel(&mut self, _: &WalkContext<'_>, id: &GrammarAst) {
        self.push(format!("channel {}", id.text()));
    }

    fn global_named_action(
        &mut self,
        _: &WalkContext<'_>,
        scope: Option<&GrammarAst>,
        name: &GrammarAst,
        _: &GrammarAst,
    ) {
        self.push(format!("action {}::{}", scope.map_or("-", |s| s.text()), name.text()));
    }

    fn mode_def(&mut self, _: &WalkContext<'_>, _: &GrammarAst, id: &GrammarAst) {
        self.push(format!("mode {}", id.text()));
    }

    fn discover_rule(&mut self, _: &WalkContext<'_>, rule: &RuleDiscovery<'_>) {
        self.push(format!("rule {}", rule.id.text()));
    }

    fn finish_rule(&mut self, _: &WalkContext<'_>, _: &GrammarAst, id: &GrammarAst, _: &GrammarAst) {
        self.push(format!("end-rule {}", id.text()));
    }

    fn discover_lexer_rule(
        &mut self,
        ctx: &WalkContext<'_>,
        _: &GrammarAst,
        id: &GrammarAst,
        modifiers: &[&GrammarAst],
        _: &GrammarAst,
    ) {
        let fragment = if modifiers.is_empty() { "" } else { " fragment" };
        self.push(format!("lexer-rule {}{fragment} in {}", id.text(), ctx.current_mode_name));
    }

    fn rule_catch(&mut self, _: &WalkContext<'_>, arg: &GrammarAst, _: &GrammarAst) {
        self.push(format!("catch {}", arg.text()));
    }

    fn finally_action(&mut self, _: &WalkContext<'_>, _: &GrammarAst) {
        self.push("finally".to_string());
    }

    fn discover_outer_alt(&mut self, ctx: &WalkContext<'_>, _: &GrammarAst) {
        let rule = ctx.current_rule_name.as_deref().unwrap_or("?");
        self.push(format!("alt {rule}#{}", ctx.current_outer_alt_number));
    }

    fn lexer_command(&mut self, _: &WalkContext<'_>, outer_alt_number: usize, id: &GrammarAst) {
        self.push(format!("command {}@{outer_alt_number}", id.text()));
    }

    fn lexer_call_command(&mut self, _: &WalkContext<'_>, outer_alt_number: usize, id: &GrammarAst, arg: &GrammarAst) {
        self.push(format!("command {}({})@{outer_alt_number}", id.text(), arg.text()));
    }

    fn action_in_alt(&mut self, _: &WalkContext<'_>, action: &GrammarAst) {
        self.push(format!("inline-action {}", action.text()));
    }

    fn sempred_in_alt(&mut self, _: &WalkContext<'_>, pred: &GrammarAst) {
        self.push(format!("sempred {}", pred.text()));
    }

    fn label(&mut self, _: &WalkContext<'_>, op: &GrammarAst, id: &GrammarAst, element: &GrammarAst) {
        self.push(format!("label {} {} {}", id.text(), op.kind().name(), element.text()));
    }

    fn rule_ref(&mut self, ctx: &WalkContext<'_>, node: &GrammarAst, arg: Option<&GrammarAst>) {
        self.push(format!(
            "ruleref {}{} depth={}",
            node.text(),
            arg.map_or(String::new(), |a| format!("[{}]", a.text())),
            ctx.ebnf_depth
        ));
    }

    fn token_ref(&mut self, ctx: &WalkContext<'_>, node: &GrammarAst) {
        self.push(format!("tokenref {} depth={}", node.text(), ctx.ebnf_depth));
    }

    fn string_ref(&mut self, _: &WalkContext<'_>, node: &GrammarAst) {
        self.push(format!("stringref {}", node.text()));
    }

    fn wildcard_ref(&mut self, _: &WalkContext<'_>, _: &GrammarAst) {
        self.push("wildcard".to_string());
    }

    fn element_option(&mut self, _: &WalkContext<'_>, element: &GrammarAst, id: &GrammarAst, value: Option<&GrammarAst>) {
        self.push(format!(
            "element-option {} {}{}",
            element.text(),
            id.text(),
            value.map_or(String::new(), |v| format!("={}", v.text()))
        ));
    }
}
