//! Grammar token kinds

use crate::kit::lexer::scanner::Channel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Ord, PartialOrd, Hash, Default)]
#[repr(u8)]
pub enum TokenKind {
    // Comments
    DocComment = 0,
    Comment,

    // Embedded code
    Action = 10,
    Sempred,
    ArgAction,
    LexerCharSet,

    // Keywords that open a brace block; the token text includes the `{`
    Options = 20,
    TokensSpec,
    Channels,

    // Keywords
    Import = 30,
    Fragment,
    Lexer,
    Parser,
    Grammar,
    Returns,
    Locals,
    Throws,
    Catch,
    Finally,
    Mode,

    // Punctuation
    Colon = 60,
    ColonColon,
    Comma,
    Semi,
    LParen,
    RParen,
    RArrow,
    Lt,
    Gt,
    Assign,
    Question,
    Synpred,
    Star,
    Plus,
    PlusAssign,
    Or,
    Dollar,
    Dot,
    Range,
    Etc,
    At,
    Pound,
    Not,
    RBrace,

    // Identifiers and literals
    TokenRef = 100,
    RuleRef,
    StringLiteral,
    Int,

    // Trivia and discarded input
    Ws = 120,
    UnicodeBom,
    ErrChar,

    #[default]
    Eof = 255,
}

/// Keywords recognized as soon as an identifier run matches them exactly
pub(crate) const KEYWORD_TABLE: [(&str, TokenKind); 11] = [
    ("import", TokenKind::Import),
    ("fragment", TokenKind::Fragment),
    ("lexer", TokenKind::Lexer),
    ("parser", TokenKind::Parser),
    ("grammar", TokenKind::Grammar),
    ("returns", TokenKind::Returns),
    ("locals", TokenKind::Locals),
    ("throws", TokenKind::Throws),
    ("catch", TokenKind::Catch),
    ("finally", TokenKind::Finally),
    ("mode", TokenKind::Mode),
];

/// Words that become a block opener when followed by optional whitespace and `{`
pub(crate) const BLOCK_OPENER_TABLE: [(&str, TokenKind); 3] = [
    ("options", TokenKind::Options),
    ("tokens", TokenKind::TokensSpec),
    ("channels", TokenKind::Channels),
];

impl TokenKind {
    /// Channel a token of this kind is emitted on
    pub fn default_channel(self) -> Channel {
        match self {
            TokenKind::Ws => Channel::Hidden,
            TokenKind::Comment => Channel::Comments,
            _ => Channel::Default,
        }
    }

    /// Kinds that are never handed to a parser
    pub fn is_discarded(self) -> bool {
        matches!(self, TokenKind::UnicodeBom | TokenKind::ErrChar)
    }

    pub fn is_keyword(self) -> bool {
        KEYWORD_TABLE.iter().any(|(_, kind)| *kind == self)
    }

    /// Conventional upper-case token name
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::DocComment => "DOC_COMMENT",
            TokenKind::Comment => "COMMENT",
            TokenKind::Action => "ACTION",
            TokenKind::Sempred => "SEMPRED",
            TokenKind::ArgAction => "ARG_ACTION",
            TokenKind::LexerCharSet => "LEXER_CHAR_SET",
            TokenKind::Options => "OPTIONS",
            TokenKind::TokensSpec => "TOKENS_SPEC",
            TokenKind::Channels => "CHANNELS",
            TokenKind::Import => "IMPORT",
            TokenKind::Fragment => "FRAGMENT",
            TokenKind::Lexer => "LEXER",
            TokenKind::Parser => "PARSER",
            TokenKind::Grammar => "GRAMMAR",
            TokenKind::Returns => "RETURNS",
            TokenKind::Locals => "LOCALS",
            TokenKind::Throws => "THROWS",
            TokenKind::Catch => "CATCH",
            TokenKind::Finally => "FINALLY",
            TokenKind::Mode => "MODE",
            TokenKind::Colon => "COLON",
            TokenKind::ColonColon => "COLONCOLON",
            TokenKind::Comma => "COMMA",
            TokenKind::Semi => "SEMI",
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
            TokenKind::RArrow => "RARROW",
            TokenKind::Lt => "LT",
            TokenKind::Gt => "GT",
            TokenKind::Assign => "ASSIGN",
            TokenKind::Question => "QUESTION",
            TokenKind::Synpred => "SYNPRED",
            TokenKind::Star => "STAR",
            TokenKind::Plus => "PLUS",
            TokenKind::PlusAssign => "PLUS_ASSIGN",
            TokenKind::Or => "OR",
            TokenKind::Dollar => "DOLLAR",
            TokenKind::Dot => "DOT",
            TokenKind::Range => "RANGE",
            TokenKind::Etc => "ETC",
            TokenKind::At => "AT",
            TokenKind::Pound => "POUND",
            TokenKind::Not => "NOT",
            TokenKind::RBrace => "RBRACE",
            TokenKind::TokenRef => "TOKEN_REF",
            TokenKind::RuleRef => "RULE_REF",
            TokenKind::StringLiteral => "STRING_LITERAL",
            TokenKind::Int => "INT",
            TokenKind::Ws => "WS",
            TokenKind::UnicodeBom => "UnicodeBOM",
            TokenKind::ErrChar => "ERRCHAR",
            TokenKind::Eof => "EOF",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl From<TokenKind> for u8 {
    fn from(val: TokenKind) -> Self {
        val as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channels() {
        assert_eq!(TokenKind::Ws.default_channel(), Channel::Hidden);
        assert_eq!(TokenKind::Comment.default_channel(), Channel::Comments);
        assert_eq!(TokenKind::DocComment.default_channel(), Channel::Default);
        assert_eq!(TokenKind::RuleRef.default_channel(), Channel::Default);
    }

    #[test]
    fn test_keyword_table() {
        assert!(TokenKind::Fragment.is_keyword());
        assert!(!TokenKind::Options.is_keyword());
        assert!(!TokenKind::RuleRef.is_keyword());
    }

    #[test]
    fn test_names() {
        assert_eq!(TokenKind::TokenRef.to_string(), "TOKEN_REF");
        assert_eq!(u8::from(TokenKind::Eof), 255);
    }
}
