//! Grammar language scanner
//!
//! Recognizes grammar source text:
//! - comments, doc comments and `// $ANTLR src` directives
//! - nested `{...}` actions and `{...}?` predicates
//! - `[...]` as either an argument action or a lexer character set
//! - string literals with escape validation
//! - identifiers classified as token or rule references
//! - keywords, `options {` style block openers, punctuation
//!
//! Where one character of lookahead cannot decide, the scanner runs a
//! speculative sub-scan from a stream mark and rewinds on failure.

use std::sync::Arc;

use tracing::{debug, trace};

use super::core::{CharStream, Mark, SourcePosition, SourceSpan};
use super::scanner::{is_name_char, is_name_start, Channel, ScanResult, Scanner, Token};
use crate::compiler::lexer::token_kind::{TokenKind, BLOCK_OPENER_TABLE, KEYWORD_TABLE};
use crate::kit::diagnostics::{Diagnostic, DiagnosticSink, GrammarErrorKind, StderrSink};
use gramlex_config::ScannerConfig;

/// Token produced by the grammar scanner
pub type GrammarToken<'src> = Token<'src, TokenKind>;

/// Naming convention deciding whether an identifier names a token
pub trait TokenNamePredicate {
    fn is_token_name(&self, text: &str) -> bool;
}

impl<F> TokenNamePredicate for F
where
    F: Fn(&str) -> bool,
{
    fn is_token_name(&self, text: &str) -> bool {
        self(text)
    }
}

/// Default convention: token names start with an upper-case letter
#[derive(Debug, Clone, Copy, Default)]
pub struct UppercaseTokenNames;

impl TokenNamePredicate for UppercaseTokenNames {
    fn is_token_name(&self, text: &str) -> bool {
        text.chars().next().is_some_and(char::is_uppercase)
    }
}

/// Which kind of rule body the scanner believes it is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
    /// `[...]` is an argument action
    #[default]
    ParserRule,
    /// `[...]` is a character set
    LexerRule,
}

/// `// $ANTLR src "file" line` directive found in a line comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDirective {
    pub file: String,
    pub line: usize,
    pub span: SourceSpan,
}

/// Scanner for grammar source text
pub struct GrammarScanner<'src> {
    mode: ScanMode,
    /// Start of the token being scanned
    token_start: Mark,
    /// Every token handed out so far; read back by the colon rule
    tokens: Vec<GrammarToken<'src>>,
    /// Nesting depth of speculative sub-scans
    backtracking: usize,
    /// Whether the most recent speculative sub-scan was rolled back
    failed: bool,
    token_names: Box<dyn TokenNamePredicate>,
    sink: Arc<dyn DiagnosticSink>,
    directives: Vec<SourceDirective>,
    record_directives: bool,
}

impl std::fmt::Debug for GrammarScanner<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrammarScanner")
            .field("mode", &self.mode)
            .field("tokens", &self.tokens.len())
            .field("backtracking", &self.backtracking)
            .field("failed", &self.failed)
            .finish()
    }
}

impl Default for GrammarScanner<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'src> Scanner<'src> for GrammarScanner<'src> {
    type TokenKind = TokenKind;
    type Mode = ScanMode;

    fn set_mode(&mut self, mode: ScanMode) {
        if self.mode != mode {
            debug!(target: "gramlex::lexer::scanner", ?mode, "Switching scan mode");
        }
        self.mode = mode;
    }

    fn current_mode(&self) -> ScanMode {
        self.mode
    }

    fn next_token(&mut self, stream: &mut CharStream<'src>) -> ScanResult<GrammarToken<'src>> {
        self.token_start = stream.mark();
        let Some(c) = stream.peek(0) else {
            return ScanResult::Eof;
        };
        trace!(
            target: "gramlex::lexer::scanner",
            line = self.token_start.position().line,
            column = self.token_start.position().column,
            "Scanning next token"
        );

        let result = match c {
            '\u{FEFF}' => {
                stream.advance();
                ScanResult::Skip(self.token(stream, TokenKind::UnicodeBom))
            }
            ' ' | '\t' | '\r' | '\n' | '\u{000C}' => self.scan_whitespace(stream),
            '/' => match stream.peek(1) {
                Some('*') => self.scan_block_comment(stream),
                Some('/') => self.scan_line_comment(stream),
                _ => self.scan_error_char(stream, c),
            },
            '{' => self.scan_action(stream),
            '[' => self.scan_bracket(stream),
            '\'' => self.scan_string_literal(stream),
            '0'..='9' => {
                stream.advance_while(|c| c.is_ascii_digit());
                self.emit(stream, TokenKind::Int)
            }
            ':' => {
                if stream.peek(1) == Some(':') {
                    stream.advance();
                    self.single(stream, TokenKind::ColonColon)
                } else {
                    self.scan_colon(stream)
                }
            }
            '-' if stream.peek(1) == Some('>') => {
                stream.advance();
                self.single(stream, TokenKind::RArrow)
            }
            '=' => {
                if stream.peek(1) == Some('>') {
                    stream.advance();
                    self.single(stream, TokenKind::Synpred)
                } else {
                    self.single(stream, TokenKind::Assign)
                }
            }
            '+' => {
                if stream.peek(1) == Some('=') {
                    stream.advance();
                    self.single(stream, TokenKind::PlusAssign)
                } else {
                    self.single(stream, TokenKind::Plus)
                }
            }
            '.' => match (stream.peek(1), stream.peek(2)) {
                (Some('.'), Some('.')) => {
                    stream.match_str("..");
                    self.single(stream, TokenKind::Etc)
                }
                (Some('.'), _) => {
                    stream.advance();
                    self.single(stream, TokenKind::Range)
                }
                _ => self.single(stream, TokenKind::Dot),
            },
            ',' => self.single(stream, TokenKind::Comma),
            ';' => self.single(stream, TokenKind::Semi),
            '(' => self.single(stream, TokenKind::LParen),
            ')' => self.single(stream, TokenKind::RParen),
            '<' => self.single(stream, TokenKind::Lt),
            '>' => self.single(stream, TokenKind::Gt),
            '?' => self.single(stream, TokenKind::Question),
            '*' => self.single(stream, TokenKind::Star),
            '|' => self.single(stream, TokenKind::Or),
            '$' => self.single(stream, TokenKind::Dollar),
            '@' => self.single(stream, TokenKind::At),
            '#' => self.single(stream, TokenKind::Pound),
            '~' => self.single(stream, TokenKind::Not),
            '}' => self.single(stream, TokenKind::RBrace),
            c if is_name_start(c) => self.scan_identifier(stream),
            c => self.scan_error_char(stream, c),
        };

        if let ScanResult::Token(token) = &result {
            trace!(
                target: "gramlex::lexer::scanner",
                kind = %token.kind,
                text = token.text,
                "Scanned token"
            );
            self.tokens.push(*token);
        }
        result
    }
}

impl<'src> GrammarScanner<'src> {
    pub fn new() -> Self {
        trace!(target: "gramlex::lexer::scanner", "Creating new GrammarScanner");
        Self {
            mode: ScanMode::ParserRule,
            token_start: CharStream::new("").mark(),
            tokens: Vec::new(),
            backtracking: 0,
            failed: false,
            token_names: Box::new(UppercaseTokenNames),
            sink: Arc::new(StderrSink),
            directives: Vec::new(),
            record_directives: true,
        }
    }

    pub fn with_config(mut self, config: &ScannerConfig) -> Self {
        if config.initial_mode_is_lexer {
            self.mode = ScanMode::LexerRule;
        }
        self.record_directives = config.record_source_directives;
        self
    }

    /// Route lexical diagnostics to `sink`
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Replace the identifier naming convention
    pub fn with_token_names(mut self, predicate: impl TokenNamePredicate + 'static) -> Self {
        self.token_names = Box::new(predicate);
        self
    }

    /// Tokens handed out so far (skipped and erroneous input excluded)
    pub fn tokens(&self) -> &[GrammarToken<'src>] {
        &self.tokens
    }

    pub fn source_directives(&self) -> &[SourceDirective] {
        &self.directives
    }

    pub fn backtracking_depth(&self) -> usize {
        self.backtracking
    }

    /// Whether the most recent speculative sub-scan was rolled back
    pub fn last_speculation_failed(&self) -> bool {
        self.failed
    }

    pub fn sink(&self) -> &Arc<dyn DiagnosticSink> {
        &self.sink
    }

    // ---- helpers ---------------------------------------------------------

    fn token(&self, stream: &CharStream<'src>, kind: TokenKind) -> GrammarToken<'src> {
        Token::new(
            kind,
            kind.default_channel(),
            stream.text_since(self.token_start),
            stream.span_since(self.token_start),
        )
    }

    fn emit(&self, stream: &CharStream<'src>, kind: TokenKind) -> ScanResult<GrammarToken<'src>> {
        ScanResult::Token(self.token(stream, kind))
    }

    /// Consume one character and emit it as `kind`
    fn single(&self, stream: &mut CharStream<'src>, kind: TokenKind) -> ScanResult<GrammarToken<'src>> {
        stream.advance();
        self.emit(stream, kind)
    }

    /// Forward a diagnostic unless a speculative sub-scan is running
    fn report(&self, diagnostic: Diagnostic) {
        if self.backtracking > 0 {
            return;
        }
        debug!(target: "gramlex::lexer::scanner", %diagnostic, "Lexical diagnostic");
        self.sink.report(diagnostic);
    }

    fn report_unterminated(&self, stream: &CharStream<'src>, kind: GrammarErrorKind) {
        self.report(
            Diagnostic::at(kind, stream.span_since(self.token_start))
                .with_arg(stream.text_since(self.token_start)),
        );
    }

    /// Run `attempt` from a mark; keep its progress only if it succeeds.
    ///
    /// A failed attempt leaves the stream position and the token history
    /// exactly as they were, and reports nothing.
    fn speculate<T>(
        &mut self,
        stream: &mut CharStream<'src>,
        attempt: impl FnOnce(&mut Self, &mut CharStream<'src>) -> Option<T>,
    ) -> Option<T> {
        let mark = stream.mark();
        let emitted = self.tokens.len();
        self.backtracking += 1;
        let outcome = attempt(self, stream);
        self.backtracking -= 1;
        self.failed = outcome.is_none();
        if outcome.is_none() {
            stream.rewind(mark);
            self.tokens.truncate(emitted);
        }
        outcome
    }

    // ---- categories ------------------------------------------------------

    fn scan_whitespace(&mut self, stream: &mut CharStream<'src>) -> ScanResult<GrammarToken<'src>> {
        stream.advance_while(is_ws_char);
        self.emit(stream, TokenKind::Ws)
    }

    fn scan_error_char(&mut self, stream: &mut CharStream<'src>, c: char) -> ScanResult<GrammarToken<'src>> {
        stream.advance();
        let token = self.token(stream, TokenKind::ErrChar);
        let diagnostic = Diagnostic::at(GrammarErrorKind::UnrecognizedCharacter, token.span)
            .with_arg(c.to_string());
        ScanResult::Error(token, diagnostic)
    }

    /// `/* ... */` or `/** ... */`
    fn scan_block_comment(&mut self, stream: &mut CharStream<'src>) -> ScanResult<GrammarToken<'src>> {
        stream.match_str("/*");

        // `/**/` is an empty ordinary comment, `/**x` opens a doc comment
        let is_doc = self
            .speculate(stream, |_, st| {
                (st.match_char('*') && st.peek(0) != Some('/')).then_some(())
            })
            .is_some();
        let kind = if is_doc {
            TokenKind::DocComment
        } else {
            TokenKind::Comment
        };

        let mut closed = false;
        while !stream.is_eof() {
            if stream.match_str("*/") {
                closed = true;
                break;
            }
            stream.advance();
        }
        if !closed {
            let error = if is_doc {
                GrammarErrorKind::UnterminatedDocComment
            } else {
                GrammarErrorKind::UnterminatedComment
            };
            self.report_unterminated(stream, error);
        }
        self.emit(stream, kind)
    }

    /// `// ...` up to (not including) the line break
    fn scan_line_comment(&mut self, stream: &mut CharStream<'src>) -> ScanResult<GrammarToken<'src>> {
        stream.match_str("//");
        let directive_start = self.token_start;

        if let Some((file, line)) = self.speculate(stream, Self::match_source_directive) {
            if self.record_directives {
                debug!(target: "gramlex::lexer::scanner", %file, line, "Source directive");
                self.directives.push(SourceDirective {
                    file,
                    line,
                    span: stream.span_since(directive_start),
                });
            }
        }

        stream.advance_while(|c| c != '\r' && c != '\n');
        self.emit(stream, TokenKind::Comment)
    }

    /// ` $ANTLR src "file" 12`
    fn match_source_directive(&mut self, stream: &mut CharStream<'src>) -> Option<(String, usize)> {
        if !stream.match_str(" $ANTLR") {
            return None;
        }
        if stream.advance_while(is_inline_ws) == 0 || !stream.match_str("src") {
            return None;
        }
        if stream.advance_while(is_inline_ws) == 0 {
            return None;
        }
        let file_start = stream.mark();
        match_action_literal(stream, '"')?;
        let quoted = stream.text_since(file_start);
        let file = quoted[1..quoted.len() - 1].to_string();
        if stream.advance_while(is_inline_ws) == 0 {
            return None;
        }
        let line_start = stream.mark();
        if stream.advance_while(|c| c.is_ascii_digit()) == 0 {
            return None;
        }
        let line = stream.text_since(line_start).parse().ok()?;
        Some((file, line))
    }

    /// `{ ... }` with nesting, optionally followed by `?`
    fn scan_action(&mut self, stream: &mut CharStream<'src>) -> ScanResult<GrammarToken<'src>> {
        if !self.match_nested_action(stream) {
            self.report_unterminated(stream, GrammarErrorKind::UnterminatedAction);
            return self.emit(stream, TokenKind::Action);
        }
        if stream.match_char('?') {
            return self.emit(stream, TokenKind::Sempred);
        }
        self.emit(stream, TokenKind::Action)
    }

    /// Consume a brace-balanced action; `false` when input ends first
    fn match_nested_action(&mut self, stream: &mut CharStream<'src>) -> bool {
        let mut depth = 0usize;
        while let Some(c) = stream.peek(0) {
            match c {
                '{' => {
                    depth += 1;
                    stream.advance();
                }
                '}' => {
                    stream.advance();
                    depth -= 1;
                    if depth == 0 {
                        return true;
                    }
                }
                '\\' => {
                    stream.advance();
                    stream.advance();
                }
                '"' | '\'' => {
                    let quote = c;
                    if self
                        .speculate(stream, |_, st| match_action_literal(st, quote))
                        .is_none()
                    {
                        stream.advance();
                    }
                }
                '/' if stream.peek(1) == Some('*') => {
                    stream.match_str("/*");
                    while !stream.is_eof() && !stream.match_str("*/") {
                        stream.advance();
                    }
                }
                '/' if stream.peek(1) == Some('/') => {
                    stream.advance_while(|c| c != '\r' && c != '\n');
                }
                _ => {
                    stream.advance();
                }
            }
        }
        false
    }

    /// `[` classified by the current rule context
    fn scan_bracket(&mut self, stream: &mut CharStream<'src>) -> ScanResult<GrammarToken<'src>> {
        match self.mode {
            ScanMode::LexerRule => self.scan_lexer_char_set(stream),
            ScanMode::ParserRule => self.scan_arg_action(stream),
        }
    }

    /// `[a-z\]]`, single line
    fn scan_lexer_char_set(&mut self, stream: &mut CharStream<'src>) -> ScanResult<GrammarToken<'src>> {
        stream.advance();
        let mut closed = false;
        while let Some(c) = stream.peek(0) {
            match c {
                '\r' | '\n' => break,
                ']' => {
                    stream.advance();
                    closed = true;
                    break;
                }
                '\\' => {
                    stream.advance();
                    if !stream.check_in(&['\r', '\n']) {
                        stream.advance();
                    }
                }
                _ => {
                    stream.advance();
                }
            }
        }
        if !closed {
            self.report_unterminated(stream, GrammarErrorKind::UnterminatedCharSet);
        }
        self.emit(stream, TokenKind::LexerCharSet)
    }

    /// `[int x, String s]`, brackets nest, quoted text is opaque
    fn scan_arg_action(&mut self, stream: &mut CharStream<'src>) -> ScanResult<GrammarToken<'src>> {
        let mut depth = 0usize;
        let mut closed = false;
        while let Some(c) = stream.peek(0) {
            match c {
                '[' => {
                    depth += 1;
                    stream.advance();
                }
                ']' => {
                    stream.advance();
                    depth -= 1;
                    if depth == 0 {
                        closed = true;
                        break;
                    }
                }
                '\\' => {
                    stream.advance();
                    stream.advance();
                }
                '"' | '\'' => {
                    let quote = c;
                    if self
                        .speculate(stream, |_, st| match_action_literal(st, quote))
                        .is_none()
                    {
                        stream.advance();
                    }
                }
                _ => {
                    stream.advance();
                }
            }
        }
        if !closed {
            self.report_unterminated(stream, GrammarErrorKind::UnterminatedArgAction);
        }
        self.emit(stream, TokenKind::ArgAction)
    }

    /// `'...'`, single line, escapes validated
    fn scan_string_literal(&mut self, stream: &mut CharStream<'src>) -> ScanResult<GrammarToken<'src>> {
        stream.advance();
        loop {
            match stream.peek(0) {
                None | Some('\r') | Some('\n') => {
                    self.report_unterminated(stream, GrammarErrorKind::UnterminatedStringLiteral);
                    break;
                }
                Some('\'') => {
                    stream.advance();
                    break;
                }
                Some('\\') => self.scan_escape(stream),
                Some(_) => {
                    stream.advance();
                }
            }
        }
        self.emit(stream, TokenKind::StringLiteral)
    }

    /// One escape sequence starting at `\`; invalid sequences are consumed and reported
    fn scan_escape(&mut self, stream: &mut CharStream<'src>) {
        let start = stream.mark();
        stream.advance();
        let valid = match stream.peek(0) {
            Some('b' | 't' | 'n' | 'f' | 'r' | '\'' | '\\') => {
                stream.advance();
                true
            }
            Some('u') => {
                stream.advance();
                if stream.match_char('{') {
                    let digits = stream.advance_while(|c| c.is_ascii_hexdigit());
                    let closed = stream.match_char('}');
                    closed && (1..=6).contains(&digits)
                } else {
                    let mut digits = 0;
                    while digits < 4 && stream.peek(0).is_some_and(|c| c.is_ascii_hexdigit()) {
                        stream.advance();
                        digits += 1;
                    }
                    digits == 4
                }
            }
            // the line break or end of input belongs to the enclosing literal
            None | Some('\r') | Some('\n') => false,
            Some(_) => {
                stream.advance();
                false
            }
        };
        if !valid {
            self.report(
                Diagnostic::at(GrammarErrorKind::InvalidEscapeSequence, stream.span_since(start))
                    .with_arg(stream.text_since(start)),
            );
        }
    }

    /// Identifier, keyword, or `options {` style block opener
    fn scan_identifier(&mut self, stream: &mut CharStream<'src>) -> ScanResult<GrammarToken<'src>> {
        stream.advance_while(is_name_char);
        let text = stream.text_since(self.token_start);

        if let Some((_, kind)) = BLOCK_OPENER_TABLE.iter().find(|(word, _)| *word == text) {
            let opened = self.speculate(stream, |_, st| {
                st.advance_while(is_ws_char);
                st.match_char('{').then_some(())
            });
            if opened.is_some() {
                return self.emit(stream, *kind);
            }
        }

        if let Some((_, kind)) = KEYWORD_TABLE.iter().find(|(word, _)| *word == text) {
            return self.emit(stream, *kind);
        }

        let kind = if self.token_names.is_token_name(text) {
            TokenKind::TokenRef
        } else {
            TokenKind::RuleRef
        };
        self.emit(stream, kind)
    }

    /// `:`; re-derives the rule context from the tokens already emitted
    fn scan_colon(&mut self, stream: &mut CharStream<'src>) -> ScanResult<GrammarToken<'src>> {
        stream.advance();
        if let Some(mode) = self.enclosing_rule_mode() {
            self.set_mode(mode);
        }
        self.emit(stream, TokenKind::Colon)
    }

    /// Walk the history backwards to the token that starts the current rule.
    ///
    /// `None` means a subrule colon or no rule start at all; the mode stays.
    fn enclosing_rule_mode(&self) -> Option<ScanMode> {
        let mut i = self.tokens.len();
        while i > 0 {
            i -= 1;
            match self.tokens[i].kind {
                TokenKind::RBrace => {
                    // skip an `options { ... }` block
                    i = self.tokens[..i]
                        .iter()
                        .rposition(|t| t.kind == TokenKind::Options)?;
                }
                TokenKind::LParen => return None,
                TokenKind::TokenRef => return Some(ScanMode::LexerRule),
                TokenKind::RuleRef => return Some(ScanMode::ParserRule),
                _ => {}
            }
        }
        None
    }
}

/// `"..."` or `'...'` inside embedded code; fails on a line break or end of input
fn match_action_literal(stream: &mut CharStream<'_>, quote: char) -> Option<()> {
    if !stream.match_char(quote) {
        return None;
    }
    loop {
        match stream.advance()? {
            '\\' => {
                if stream.check_in(&['\r', '\n']) {
                    return None;
                }
                stream.advance()?;
            }
            '\r' | '\n' => return None,
            c if c == quote => return Some(()),
            _ => {}
        }
    }
}

fn is_ws_char(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n' | '\u{000C}')
}

fn is_inline_ws(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\u{000C}')
}

/// Empty end-of-input token at the stream's current position
pub(crate) fn eof_token<'src>(stream: &CharStream<'src>) -> GrammarToken<'src> {
    let position: SourcePosition = stream.position();
    Token::new(TokenKind::Eof, Channel::Default, "", SourceSpan::at(position))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kit::diagnostics::DiagnosticBuffer;

    fn scan_all(input: &str) -> (Vec<(TokenKind, String)>, DiagnosticBuffer) {
        let buffer = DiagnosticBuffer::new();
        let mut scanner = GrammarScanner::new().with_sink(Arc::new(buffer.clone()));
        let mut stream = CharStream::new(input);
        let mut tokens = Vec::new();
        loop {
            match scanner.next_token(&mut stream) {
                ScanResult::Token(t) => tokens.push((t.kind, t.text.to_string())),
                ScanResult::Skip(_) | ScanResult::Error(..) => {}
                ScanResult::Eof => break,
            }
        }
        (tokens, buffer)
    }

    fn kinds(input: &str) -> Vec<TokenKind> {
        scan_all(input)
            .0
            .into_iter()
            .map(|(k, _)| k)
            .filter(|k| *k != TokenKind::Ws)
            .collect()
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(
            kinds(": :: -> => += + . .. ... ~ # @ $ | ? * ; , ( ) < > = }"),
            vec![
                TokenKind::Colon,
                TokenKind::ColonColon,
                TokenKind::RArrow,
                TokenKind::Synpred,
                TokenKind::PlusAssign,
                TokenKind::Plus,
                TokenKind::Dot,
                TokenKind::Range,
                TokenKind::Etc,
                TokenKind::Not,
                TokenKind::Pound,
                TokenKind::At,
                TokenKind::Dollar,
                TokenKind::Or,
                TokenKind::Question,
                TokenKind::Star,
                TokenKind::Semi,
                TokenKind::Comma,
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::Assign,
                TokenKind::RBrace,
            ]
        );
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            kinds("grammar fragment mode returns expr ID Expr"),
            vec![
                TokenKind::Grammar,
                TokenKind::Fragment,
                TokenKind::Mode,
                TokenKind::Returns,
                TokenKind::RuleRef,
                TokenKind::TokenRef,
                TokenKind::TokenRef,
            ]
        );
    }

    #[test]
    fn test_block_openers_need_a_brace() {
        let (tokens, _) = scan_all("options {");
        assert_eq!(tokens[0], (TokenKind::Options, "options {".to_string()));

        let (tokens, _) = scan_all("tokens\n{");
        assert_eq!(tokens[0], (TokenKind::TokensSpec, "tokens\n{".to_string()));

        assert_eq!(kinds("options ;"), vec![TokenKind::RuleRef, TokenKind::Semi]);
        assert_eq!(kinds("channelsX {}"), vec![TokenKind::RuleRef, TokenKind::Action]);
    }

    #[test]
    fn test_injected_token_name_predicate() {
        let buffer = DiagnosticBuffer::new();
        let mut scanner = GrammarScanner::new()
            .with_sink(Arc::new(buffer))
            .with_token_names(|text: &str| text.starts_with("tok_"));
        let mut stream = CharStream::new("tok_a Rule");
        let ScanResult::Token(first) = scanner.next_token(&mut stream) else {
            panic!("expected a token");
        };
        assert_eq!(first.kind, TokenKind::TokenRef);
        scanner.next_token(&mut stream);
        let ScanResult::Token(third) = scanner.next_token(&mut stream) else {
            panic!("expected a token");
        };
        assert_eq!(third.kind, TokenKind::RuleRef);
    }

    #[test]
    fn test_comment_channels() {
        let buffer = DiagnosticBuffer::new();
        let mut scanner = GrammarScanner::new().with_sink(Arc::new(buffer));
        let mut stream = CharStream::new("/** doc */ // line\n/* block */");
        let mut channels = Vec::new();
        while let ScanResult::Token(t) = scanner.next_token(&mut stream) {
            channels.push((t.kind, t.channel));
        }
        assert_eq!(
            channels,
            vec![
                (TokenKind::DocComment, Channel::Default),
                (TokenKind::Ws, Channel::Hidden),
                (TokenKind::Comment, Channel::Comments),
                (TokenKind::Ws, Channel::Hidden),
                (TokenKind::Comment, Channel::Comments),
            ]
        );
    }

    #[test]
    fn test_empty_block_comment_is_not_doc() {
        let (tokens, diags) = scan_all("/**/");
        assert_eq!(tokens, vec![(TokenKind::Comment, "/**/".to_string())]);
        assert_eq!(diags.error_count(), 0);
    }

    #[test]
    fn test_doc_comment() {
        let (tokens, _) = scan_all("/** x */");
        assert_eq!(tokens, vec![(TokenKind::DocComment, "/** x */".to_string())]);
    }

    #[test]
    fn test_unterminated_comment() {
        let (tokens, diags) = scan_all("/* open");
        assert_eq!(tokens, vec![(TokenKind::Comment, "/* open".to_string())]);
        assert_eq!(diags.count_of(GrammarErrorKind::UnterminatedComment), 1);

        let (_, diags) = scan_all("/** open");
        assert_eq!(diags.count_of(GrammarErrorKind::UnterminatedDocComment), 1);
    }

    #[test]
    fn test_source_directive() {
        let buffer = DiagnosticBuffer::new();
        let mut scanner = GrammarScanner::new().with_sink(Arc::new(buffer));
        let mut stream = CharStream::new("// $ANTLR src \"T.g\" 42 trailing\nx");
        let ScanResult::Token(comment) = scanner.next_token(&mut stream) else {
            panic!("expected a comment");
        };
        assert_eq!(comment.kind, TokenKind::Comment);
        assert_eq!(comment.text, "// $ANTLR src \"T.g\" 42 trailing");
        assert_eq!(scanner.source_directives().len(), 1);
        assert_eq!(scanner.source_directives()[0].file, "T.g");
        assert_eq!(scanner.source_directives()[0].line, 42);
        assert!(!scanner.last_speculation_failed());
    }

    #[test]
    fn test_broken_source_directive_is_plain_comment() {
        let buffer = DiagnosticBuffer::new();
        let mut scanner = GrammarScanner::new().with_sink(Arc::new(buffer.clone()));
        let mut stream = CharStream::new("// $ANTLR src \"T.g\n");
        let ScanResult::Token(comment) = scanner.next_token(&mut stream) else {
            panic!("expected a comment");
        };
        assert_eq!(comment.text, "// $ANTLR src \"T.g");
        assert_eq!(comment.span.start.offset, 0);
        assert!(scanner.source_directives().is_empty());
        assert!(scanner.last_speculation_failed());
        assert_eq!(scanner.backtracking_depth(), 0);
        assert_eq!(buffer.error_count(), 0);
    }

    #[test]
    fn test_nested_action() {
        let (tokens, diags) = scan_all("{ a { b } \"}\" '}' /* } */ }");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].0, TokenKind::Action);
        assert_eq!(diags.error_count(), 0);
    }

    #[test]
    fn test_action_apostrophe_falls_back_to_plain_char() {
        let (tokens, diags) = scan_all("{ // don't\n}");
        assert_eq!(tokens, vec![(TokenKind::Action, "{ // don't\n}".to_string())]);
        assert_eq!(diags.error_count(), 0);

        let (tokens, _) = scan_all("{ x = \"open\n}");
        assert_eq!(tokens, vec![(TokenKind::Action, "{ x = \"open\n}".to_string())]);
    }

    #[test]
    fn test_sempred() {
        let (tokens, _) = scan_all("{p}?");
        assert_eq!(tokens, vec![(TokenKind::Sempred, "{p}?".to_string())]);
    }

    #[test]
    fn test_unterminated_action() {
        let (tokens, diags) = scan_all("{ a { b }");
        assert_eq!(tokens, vec![(TokenKind::Action, "{ a { b }".to_string())]);
        assert_eq!(diags.count_of(GrammarErrorKind::UnterminatedAction), 1);
    }

    #[test]
    fn test_bracket_in_parser_context_is_arg_action() {
        let (tokens, _) = scan_all("[int x, List<int[]> y]");
        assert_eq!(tokens, vec![(TokenKind::ArgAction, "[int x, List<int[]> y]".to_string())]);
    }

    #[test]
    fn test_bracket_in_lexer_context_is_char_set() {
        let buffer = DiagnosticBuffer::new();
        let mut scanner = GrammarScanner::new()
            .with_sink(Arc::new(buffer))
            .with_config(&ScannerConfig {
                initial_mode_is_lexer: true,
                ..ScannerConfig::default()
            });
        let mut stream = CharStream::new("[a-z\\]]");
        let ScanResult::Token(token) = scanner.next_token(&mut stream) else {
            panic!("expected a token");
        };
        assert_eq!(token.kind, TokenKind::LexerCharSet);
        assert_eq!(token.text, "[a-z\\]]");
    }

    #[test]
    fn test_colon_switches_context() {
        let buffer = DiagnosticBuffer::new();
        let mut scanner = GrammarScanner::new().with_sink(Arc::new(buffer));
        let mut stream = CharStream::new("A : 'a' ; b : 'b' ;");
        let mut modes = Vec::new();
        loop {
            match scanner.next_token(&mut stream) {
                ScanResult::Token(t) if t.kind == TokenKind::Colon => modes.push(scanner.current_mode()),
                ScanResult::Eof => break,
                _ => {}
            }
        }
        assert_eq!(modes, vec![ScanMode::LexerRule, ScanMode::ParserRule]);
    }

    #[test]
    fn test_colon_skips_rule_options_and_stops_at_subrule() {
        let buffer = DiagnosticBuffer::new();
        let mut scanner = GrammarScanner::new().with_sink(Arc::new(buffer));
        let mut stream = CharStream::new("a options { tokenVocab = X ; } : ( options { k = 1 ; } : B ) ;");
        let mut modes = Vec::new();
        loop {
            match scanner.next_token(&mut stream) {
                ScanResult::Token(t) if t.kind == TokenKind::Colon => modes.push(scanner.current_mode()),
                ScanResult::Eof => break,
                _ => {}
            }
        }
        assert_eq!(modes, vec![ScanMode::ParserRule, ScanMode::ParserRule]);
    }

    #[test]
    fn test_colon_without_rule_start_keeps_mode() {
        let buffer = DiagnosticBuffer::new();
        let mut scanner = GrammarScanner::new()
            .with_sink(Arc::new(buffer))
            .with_config(&ScannerConfig {
                initial_mode_is_lexer: true,
                ..ScannerConfig::default()
            });
        let mut stream = CharStream::new("; :");
        while !matches!(scanner.next_token(&mut stream), ScanResult::Eof) {}
        assert_eq!(scanner.current_mode(), ScanMode::LexerRule);
    }

    #[test]
    fn test_error_char_is_reported_not_emitted() {
        let buffer = DiagnosticBuffer::new();
        let mut scanner = GrammarScanner::new().with_sink(Arc::new(buffer));
        let mut stream = CharStream::new("%a");
        let result = scanner.next_token(&mut stream);
        let ScanResult::Error(token, diagnostic) = result else {
            panic!("expected an error char");
        };
        assert_eq!(token.kind, TokenKind::ErrChar);
        assert_eq!(token.text, "%");
        assert_eq!(diagnostic.kind, GrammarErrorKind::UnrecognizedCharacter);
        assert!(scanner.tokens().is_empty());
    }

    #[test]
    fn test_bom_is_skipped() {
        let buffer = DiagnosticBuffer::new();
        let mut scanner = GrammarScanner::new().with_sink(Arc::new(buffer));
        let mut stream = CharStream::new("\u{FEFF}a");
        assert!(matches!(
            scanner.next_token(&mut stream),
            ScanResult::Skip(t) if t.kind == TokenKind::UnicodeBom
        ));
        assert!(matches!(
            scanner.next_token(&mut stream),
            ScanResult::Token(t) if t.kind == TokenKind::RuleRef
        ));
    }
}
