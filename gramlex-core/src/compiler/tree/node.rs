//! Grammar syntax tree
//!
//! Trees are built once by a parser (or by hand in tests) and only read
//! afterwards. Each node owns its children.

use crate::compiler::lexer::token_kind::TokenKind;
use crate::kit::lexer::core::SourceSpan;
use crate::kit::lexer::scanner::OwnedToken;

/// Node alphabet of the grammar tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Grammar,
    Id,
    Options,
    Assign,
    PlusAssign,
    Import,
    TokensSpec,
    Channels,
    At,
    Rules,
    Rule,
    RuleModifiers,
    Fragment,
    Public,
    Private,
    Protected,
    DocComment,
    ArgAction,
    Returns,
    Throws,
    Locals,
    Catch,
    Finally,
    Mode,
    Block,
    Alt,
    Epsilon,
    LexerAltAction,
    LexerActionCall,
    Action,
    Sempred,
    Set,
    Range,
    Not,
    TokenRef,
    RuleRef,
    StringLiteral,
    Int,
    Wildcard,
    LexerCharSet,
    Optional,
    Closure,
    PositiveClosure,
    ElementOptions,
    Dot,
}

impl NodeKind {
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Grammar => "GRAMMAR",
            NodeKind::Id => "ID",
            NodeKind::Options => "OPTIONS",
            NodeKind::Assign => "ASSIGN",
            NodeKind::PlusAssign => "PLUS_ASSIGN",
            NodeKind::Import => "IMPORT",
            NodeKind::TokensSpec => "TOKENS_SPEC",
            NodeKind::Channels => "CHANNELS",
            NodeKind::At => "AT",
            NodeKind::Rules => "RULES",
            NodeKind::Rule => "RULE",
            NodeKind::RuleModifiers => "RULEMODIFIERS",
            NodeKind::Fragment => "FRAGMENT",
            NodeKind::Public => "PUBLIC",
            NodeKind::Private => "PRIVATE",
            NodeKind::Protected => "PROTECTED",
            NodeKind::DocComment => "DOC_COMMENT",
            NodeKind::ArgAction => "ARG_ACTION",
            NodeKind::Returns => "RETURNS",
            NodeKind::Throws => "THROWS",
            NodeKind::Locals => "LOCALS",
            NodeKind::Catch => "CATCH",
            NodeKind::Finally => "FINALLY",
            NodeKind::Mode => "MODE",
            NodeKind::Block => "BLOCK",
            NodeKind::Alt => "ALT",
            NodeKind::Epsilon => "EPSILON",
            NodeKind::LexerAltAction => "LEXER_ALT_ACTION",
            NodeKind::LexerActionCall => "LEXER_ACTION_CALL",
            NodeKind::Action => "ACTION",
            NodeKind::Sempred => "SEMPRED",
            NodeKind::Set => "SET",
            NodeKind::Range => "RANGE",
            NodeKind::Not => "NOT",
            NodeKind::TokenRef => "TOKEN_REF",
            NodeKind::RuleRef => "RULE_REF",
            NodeKind::StringLiteral => "STRING_LITERAL",
            NodeKind::Int => "INT",
            NodeKind::Wildcard => "WILDCARD",
            NodeKind::LexerCharSet => "LEXER_CHAR_SET",
            NodeKind::Optional => "OPTIONAL",
            NodeKind::Closure => "CLOSURE",
            NodeKind::PositiveClosure => "POSITIVE_CLOSURE",
            NodeKind::ElementOptions => "ELEMENT_OPTIONS",
            NodeKind::Dot => "DOT",
        }
    }

    /// `?`, `*` or `+` wrapped around a block
    pub fn is_ebnf_suffix(self) -> bool {
        matches!(self, NodeKind::Optional | NodeKind::Closure | NodeKind::PositiveClosure)
    }

    pub fn is_rule_modifier(self) -> bool {
        matches!(
            self,
            NodeKind::Public | NodeKind::Private | NodeKind::Protected | NodeKind::Fragment
        )
    }

    /// Node kind a leaf built from a token of `kind` gets, if any
    pub fn from_token_kind(kind: TokenKind) -> Option<Self> {
        let node = match kind {
            TokenKind::TokenRef => NodeKind::TokenRef,
            TokenKind::RuleRef => NodeKind::RuleRef,
            TokenKind::StringLiteral => NodeKind::StringLiteral,
            TokenKind::Int => NodeKind::Int,
            TokenKind::Action => NodeKind::Action,
            TokenKind::Sempred => NodeKind::Sempred,
            TokenKind::ArgAction => NodeKind::ArgAction,
            TokenKind::LexerCharSet => NodeKind::LexerCharSet,
            TokenKind::DocComment => NodeKind::DocComment,
            TokenKind::Fragment => NodeKind::Fragment,
            TokenKind::Options => NodeKind::Options,
            TokenKind::TokensSpec => NodeKind::TokensSpec,
            TokenKind::Channels => NodeKind::Channels,
            TokenKind::Import => NodeKind::Import,
            TokenKind::Returns => NodeKind::Returns,
            TokenKind::Throws => NodeKind::Throws,
            TokenKind::Locals => NodeKind::Locals,
            TokenKind::Catch => NodeKind::Catch,
            TokenKind::Finally => NodeKind::Finally,
            TokenKind::Mode => NodeKind::Mode,
            TokenKind::Assign => NodeKind::Assign,
            TokenKind::PlusAssign => NodeKind::PlusAssign,
            TokenKind::At => NodeKind::At,
            TokenKind::Range => NodeKind::Range,
            TokenKind::Not => NodeKind::Not,
            TokenKind::Dot => NodeKind::Wildcard,
            _ => return None,
        };
        Some(node)
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Kind of grammar a root node declares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GrammarType {
    Lexer,
    Parser,
    #[default]
    Combined,
}

/// Extra data some node kinds carry
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AstPayload {
    #[default]
    None,
    Grammar { grammar_type: GrammarType },
    Rule { name: String },
}

/// One grammar tree node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarAst {
    kind: NodeKind,
    token: Option<OwnedToken<TokenKind>>,
    text: String,
    children: Vec<GrammarAst>,
    payload: AstPayload,
}

impl GrammarAst {
    /// Imaginary node; its text is the kind name
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            token: None,
            text: kind.name().to_string(),
            children: Vec::new(),
            payload: AstPayload::None,
        }
    }

    /// Leaf carrying source text
    pub fn leaf(kind: NodeKind, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::new(kind)
        }
    }

    /// Imaginary node with children
    pub fn with_children(kind: NodeKind, children: Vec<GrammarAst>) -> Self {
        Self {
            children,
            ..Self::new(kind)
        }
    }

    /// Leaf built from a scanned token
    pub fn from_token(kind: NodeKind, token: OwnedToken<TokenKind>) -> Self {
        Self {
            text: token.text.clone(),
            token: Some(token),
            ..Self::new(kind)
        }
    }

    /// `GRAMMAR` root; the first child is the grammar `ID`
    pub fn grammar(grammar_type: GrammarType, children: Vec<GrammarAst>) -> Self {
        Self::with_children(NodeKind::Grammar, children)
            .with_payload(AstPayload::Grammar { grammar_type })
    }

    /// `RULE` node; the rule name is taken from the first child
    pub fn rule(children: Vec<GrammarAst>) -> Self {
        let name = children.first().map(|c| c.text.clone()).unwrap_or_default();
        Self::with_children(NodeKind::Rule, children).with_payload(AstPayload::Rule { name })
    }

    pub fn with_child(mut self, child: GrammarAst) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_payload(mut self, payload: AstPayload) -> Self {
        self.payload = payload;
        self
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn token(&self) -> Option<&OwnedToken<TokenKind>> {
        self.token.as_ref()
    }

    pub fn span(&self) -> Option<SourceSpan> {
        self.token.as_ref().map(|t| t.span)
    }

    pub fn children(&self) -> &[GrammarAst] {
        &self.children
    }

    pub fn child(&self, index: usize) -> Option<&GrammarAst> {
        self.children.get(index)
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// First direct child of `kind`
    pub fn first_child_of(&self, kind: NodeKind) -> Option<&GrammarAst> {
        self.children.iter().find(|c| c.kind == kind)
    }

    pub fn payload(&self) -> &AstPayload {
        &self.payload
    }

    pub fn rule_name(&self) -> Option<&str> {
        match &self.payload {
            AstPayload::Rule { name } => Some(name),
            _ => None,
        }
    }

    pub fn grammar_type(&self) -> Option<GrammarType> {
        match self.payload {
            AstPayload::Grammar { grammar_type } => Some(grammar_type),
            _ => None,
        }
    }

    /// LISP-style rendering, e.g. `(RULE a (BLOCK (ALT B)))`
    pub fn to_string_tree(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for GrammarAst {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.children.is_empty() {
            return f.write_str(&self.text);
        }
        write!(f, "({}", self.text)?;
        for child in &self.children {
            write!(f, " {child}")?;
        }
        f.write_str(")")
    }
}
