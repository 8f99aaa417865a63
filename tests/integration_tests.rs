//! End-to-end checks through the public API

use gramlex::{
    lex, walk, GramlexConfig, GrammarAst, GrammarErrorKind, GrammarListener, GrammarType, NodeKind, RuleDiscovery,
    ScanMode, TokenKind, WalkContext,
};

const GRAMMAR: &str = "grammar Hello;\n\
                       options { language = Rust; }\n\
                       greet : 'hello' ID ;\n\
                       ID : [a-z]+ ;\n\
                       WS : [ \\t\\r\\n]+ -> skip ;\n";

#[derive(Default)]
struct RuleNames {
    parser: Vec<String>,
    lexer: Vec<String>,
}

impl GrammarListener for RuleNames {
    fn discover_rule(&mut self, _: &WalkContext<'_>, rule: &RuleDiscovery<'_>) {
        self.parser.push(rule.id.text().to_string());
    }

    fn discover_lexer_rule(
        &mut self,
        _: &WalkContext<'_>,
        _: &GrammarAst,
        id: &GrammarAst,
        _: &[&GrammarAst],
        _: &GrammarAst,
    ) {
        self.lexer.push(id.text().to_string());
    }
}

fn leaf(kind: NodeKind, text: &str) -> GrammarAst {
    GrammarAst::leaf(kind, text)
}

fn single_alt_rule(name: GrammarAst, elements: Vec<GrammarAst>) -> GrammarAst {
    GrammarAst::rule(vec![
        name,
        GrammarAst::with_children(
            NodeKind::Block,
            vec![GrammarAst::with_children(NodeKind::Alt, elements)],
        ),
    ])
}

/// Tree a parser would build for `GRAMMAR`
fn hello_tree() -> GrammarAst {
    GrammarAst::grammar(
        GrammarType::Combined,
        vec![
            leaf(NodeKind::Id, "Hello"),
            GrammarAst::with_children(
                NodeKind::Options,
                vec![GrammarAst::with_children(
                    NodeKind::Assign,
                    vec![leaf(NodeKind::Id, "language"), leaf(NodeKind::Id, "Rust")],
                )],
            ),
            GrammarAst::with_children(
                NodeKind::Rules,
                vec![
                    single_alt_rule(
                        leaf(NodeKind::RuleRef, "greet"),
                        vec![leaf(NodeKind::StringLiteral, "'hello'"), leaf(NodeKind::TokenRef, "ID")],
                    ),
                    single_alt_rule(
                        leaf(NodeKind::TokenRef, "ID"),
                        vec![GrammarAst::with_children(
                            NodeKind::PositiveClosure,
                            vec![GrammarAst::with_children(
                                NodeKind::Block,
                                vec![GrammarAst::with_children(
                                    NodeKind::Alt,
                                    vec![leaf(NodeKind::LexerCharSet, "[a-z]")],
                                )],
                            )],
                        )],
                    ),
                ],
            ),
        ],
    )
}

#[test]
fn test_lex_grammar_file() {
    let output = lex(GRAMMAR, &GramlexConfig::default());
    assert!(!output.has_errors(), "{:?}", output.diagnostics);
    assert_eq!(output.tokens.reconstruct(), GRAMMAR);

    let kinds: Vec<TokenKind> = output
        .tokens
        .default_channel()
        .map(|t| t.kind)
        .collect();
    assert_eq!(&kinds[..3], &[TokenKind::Grammar, TokenKind::TokenRef, TokenKind::Semi]);
    assert_eq!(kinds.iter().filter(|k| **k == TokenKind::LexerCharSet).count(), 2);
    assert_eq!(kinds.last(), Some(&TokenKind::Eof));
}

#[test]
fn test_lex_with_lexer_start_mode() {
    let config = GramlexConfig::from_json_str(r#"{ "scanner": { "initial_mode_is_lexer": true } }"#).unwrap();
    let output = lex("[a-z]", &config);
    assert_eq!(output.tokens.kinds(), vec![TokenKind::LexerCharSet, TokenKind::Eof]);

    let output = lex("[a-z]", &GramlexConfig::default());
    assert_eq!(output.tokens.kinds(), vec![TokenKind::ArgAction, TokenKind::Eof]);
    assert_eq!(ScanMode::default(), ScanMode::ParserRule);
}

#[test]
fn test_walk_grammar_tree() {
    let tree = hello_tree();
    let output = walk(&tree, RuleNames::default(), &GramlexConfig::default());

    assert!(output.completed);
    assert!(!output.has_errors(), "{:?}", output.diagnostics);
    assert_eq!(output.listener.parser, vec!["greet".to_string()]);
    assert_eq!(output.listener.lexer, vec!["ID".to_string()]);
}

#[test]
fn test_walk_with_small_depth_limit() {
    let tree = hello_tree();
    let config = GramlexConfig::from_json_str(r#"{ "walker": { "max_depth": 3 } }"#).unwrap();
    let output = walk(&tree, RuleNames::default(), &config);

    assert!(output.completed);
    assert!(output
        .diagnostics
        .iter()
        .all(|d| d.kind == GrammarErrorKind::RecursionLimit));
    assert_eq!(output.diagnostics.len(), 3);
    // rules are discovered before their bodies hit the limit
    assert_eq!(output.listener.parser, vec!["greet".to_string()]);
    assert_eq!(output.listener.lexer, vec!["ID".to_string()]);
}
