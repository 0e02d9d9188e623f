//! Hand-written longest-match scanner for QueryCat scripts
//!
//! [`scan`] is a pure function: given the unconsumed input it reports the
//! kind and byte length of the next token, plus a lexical problem if the
//! token is malformed. [`LexicalAnalyzer`] drives it over the whole input,
//! attaches spans, enforces resource limits and collects diagnostics.
//!
//! Every byte of input lands in exactly one token, so the lexemes always
//! concatenate back to the source.

use crate::config::runtime::LexicalPreferences;
use crate::diagnostics::Diagnostic;
use crate::file_processor::FileProcessingResult;
use crate::logging::codes;
use crate::tokens::{classify_symbol, classify_word, Token, TokenKind, TokenStream};
use crate::utils::{Position, SourceMap, Span};
use crate::{log_debug, log_error, log_success};
use std::collections::HashMap;

/// Fatal tokenizer failures; everything else is reported as a diagnostic
#[derive(Debug, Clone, thiserror::Error)]
pub enum LexerError {
    #[error("Too many tokens: {count} (max {limit})")]
    TooManyTokens { count: usize, limit: usize, span: Span },
}

impl LexerError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            LexerError::TooManyTokens { .. } => codes::lexical::TOO_MANY_TOKENS,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            LexerError::TooManyTokens { span, .. } => *span,
        }
    }
}

/// Malformed-token conditions detected by the scanner itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexProblem {
    UnrecognizedCharacter,
    UnterminatedString,
    UnterminatedComment,
}

impl LexProblem {
    fn code(self) -> crate::logging::Code {
        match self {
            LexProblem::UnrecognizedCharacter => codes::lexical::UNRECOGNIZED_CHARACTER,
            LexProblem::UnterminatedString => codes::lexical::UNTERMINATED_STRING,
            LexProblem::UnterminatedComment => codes::lexical::UNTERMINATED_COMMENT,
        }
    }

    fn message(self, lexeme: &str) -> String {
        match self {
            LexProblem::UnrecognizedCharacter => {
                format!("token recognition error at: '{}'", lexeme)
            }
            LexProblem::UnterminatedString => "unterminated string literal".to_string(),
            LexProblem::UnterminatedComment => "unterminated multiline comment".to_string(),
        }
    }
}

/// Result of scanning one token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scanned {
    pub kind: TokenKind,
    /// Length in bytes; always ends on a char boundary
    pub len: usize,
    pub problem: Option<LexProblem>,
}

impl Scanned {
    fn ok(kind: TokenKind, len: usize) -> Self {
        Self {
            kind,
            len,
            problem: None,
        }
    }

    fn problem(kind: TokenKind, len: usize, problem: LexProblem) -> Self {
        Self {
            kind,
            len,
            problem: Some(problem),
        }
    }
}

/// Scan the next token at the start of `rest`; `None` at end of input
pub fn scan(rest: &str) -> Option<Scanned> {
    let first = rest.chars().next()?;

    let scanned = match first {
        ' ' | '\t' | '\r' | '\n' => Scanned::ok(
            TokenKind::Spaces,
            prefix_len(rest, |c| matches!(c, ' ' | '\t' | '\r' | '\n')),
        ),
        '#' => Scanned::ok(
            TokenKind::SingleLineComment,
            rest.find(|c| c == '\r' || c == '\n').unwrap_or(rest.len()),
        ),
        '/' if rest.starts_with("/*") => scan_multiline_comment(rest),
        '\'' => scan_string(rest),
        c if c.is_ascii_digit() => scan_number(rest),
        c if c.is_alphabetic() || c == '_' => {
            let len = prefix_len(rest, |c| c.is_alphanumeric() || c == '_');
            Scanned::ok(classify_word(&rest[..len]), len)
        }
        _ => scan_symbol(rest).unwrap_or_else(|| {
            Scanned::problem(
                TokenKind::Error,
                first.len_utf8(),
                LexProblem::UnrecognizedCharacter,
            )
        }),
    };

    Some(scanned)
}

fn prefix_len(text: &str, pred: impl Fn(char) -> bool) -> usize {
    text.find(|c: char| !pred(c)).unwrap_or(text.len())
}

fn digit_count(bytes: &[u8], from: usize, pred: fn(&u8) -> bool) -> usize {
    bytes
        .get(from..)
        .map(|tail| tail.iter().take_while(|&b| pred(b)).count())
        .unwrap_or(0)
}

fn scan_multiline_comment(rest: &str) -> Scanned {
    match rest[2..].find("*/") {
        Some(end) => Scanned::ok(TokenKind::MultilineComment, end + 4),
        None => Scanned::problem(
            TokenKind::MultilineComment,
            rest.len(),
            LexProblem::UnterminatedComment,
        ),
    }
}

// Quotes are ASCII, so byte scanning never splits a multi-byte character
fn scan_string(rest: &str) -> Scanned {
    let bytes = rest.as_bytes();
    let mut i = 1;
    while i < bytes.len() {
        if bytes[i] == b'\'' {
            if bytes.get(i + 1) == Some(&b'\'') {
                i += 2;
                continue;
            }
            return Scanned::ok(TokenKind::StringLiteral, i + 1);
        }
        i += 1;
    }
    Scanned::problem(TokenKind::Error, rest.len(), LexProblem::UnterminatedString)
}

fn scan_number(rest: &str) -> Scanned {
    let bytes = rest.as_bytes();

    if rest.starts_with("0x") {
        let hex_digits = digit_count(bytes, 2, u8::is_ascii_hexdigit);
        if hex_digits > 0 {
            return with_numeric_suffix(bytes, 2 + hex_digits);
        }
    }

    let mut len = digit_count(bytes, 0, u8::is_ascii_digit);
    let mut is_float = false;

    if bytes.get(len) == Some(&b'.') {
        let fraction = digit_count(bytes, len + 1, u8::is_ascii_digit);
        if fraction > 0 {
            len += 1 + fraction;
            is_float = true;
        }
    }

    if let Some(exponent) = exponent_len(bytes, len) {
        len += exponent;
        is_float = true;
    }

    if is_float {
        with_numeric_suffix(bytes, len)
    } else {
        Scanned::ok(TokenKind::IntegerLiteral, len)
    }
}

/// Length of `e[+-]digits` at `at`, if a complete exponent is there
fn exponent_len(bytes: &[u8], at: usize) -> Option<usize> {
    if !matches!(bytes.get(at), Some(b'e' | b'E')) {
        return None;
    }
    let mut i = at + 1;
    if matches!(bytes.get(i), Some(b'+' | b'-')) {
        i += 1;
    }
    let digits = digit_count(bytes, i, u8::is_ascii_digit);
    (digits > 0).then(|| i + digits - at)
}

fn with_numeric_suffix(bytes: &[u8], float_len: usize) -> Scanned {
    if bytes.get(float_len) == Some(&b'm') {
        Scanned::ok(TokenKind::NumericLiteral, float_len + 1)
    } else {
        Scanned::ok(TokenKind::FloatLiteral, float_len)
    }
}

fn scan_symbol(rest: &str) -> Option<Scanned> {
    (1..=3)
        .rev()
        .find_map(|n| rest.get(..n).and_then(classify_symbol).map(|kind| Scanned::ok(kind, n)))
}

/// Strip the quotes of a string literal and collapse `''` to `'`
pub fn decode_string_literal(lexeme: &str) -> String {
    let inner = lexeme
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(lexeme);
    inner.replace("''", "'")
}

/// Tokens plus the non-fatal diagnostics found while producing them
#[derive(Debug, Clone)]
pub struct LexOutput {
    /// Every token in source order, ending with EOF
    pub tokens: Vec<Token>,
    pub diagnostics: Vec<Diagnostic>,
}

impl LexOutput {
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn reconstruct_text(&self) -> String {
        self.tokens.iter().map(|t| t.lexeme.as_str()).collect()
    }

    pub fn significant_tokens(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().filter(|t| t.is_significant())
    }

    /// Hand the tokens to the parser; diagnostics stay with the caller
    pub fn into_stream(self, source: &str) -> (TokenStream, Vec<Diagnostic>) {
        let stream = TokenStream::with_source_map(self.tokens, SourceMap::new(source.to_string()));
        (stream, self.diagnostics)
    }
}

#[derive(Debug, Default, Clone)]
pub struct LexicalMetrics {
    pub total_tokens: usize,
    pub keyword_tokens: usize,
    pub identifier_tokens: usize,
    pub literal_tokens: usize,
    pub operator_tokens: usize,
    pub hidden_tokens: usize,
    pub error_tokens: usize,
    pub comment_count: usize,
    pub max_string_length: usize,
    pub max_comment_length: usize,

    /// Per-kind counts, only with `collect_detailed_metrics`
    pub kind_counts: HashMap<&'static str, usize>,
}

impl LexicalMetrics {
    pub(crate) fn record_token(&mut self, token: &Token, preferences: &LexicalPreferences) {
        self.total_tokens += 1;

        match token.kind {
            TokenKind::Keyword(_) => self.keyword_tokens += 1,
            TokenKind::Identifier => self.identifier_tokens += 1,
            TokenKind::StringLiteral => {
                self.literal_tokens += 1;
                self.max_string_length = self.max_string_length.max(token.lexeme.len());
            }
            kind if kind.is_literal() => self.literal_tokens += 1,
            kind if kind.is_operator() => self.operator_tokens += 1,
            TokenKind::SingleLineComment | TokenKind::MultilineComment => {
                self.comment_count += 1;
                self.max_comment_length = self.max_comment_length.max(token.lexeme.len());
            }
            TokenKind::Error => self.error_tokens += 1,
            _ => {}
        }

        if token.is_hidden() {
            self.hidden_tokens += 1;
        }

        if preferences.collect_detailed_metrics {
            *self.kind_counts.entry(token.kind.symbolic_name()).or_insert(0) += 1;
        }
    }

    pub fn significant_tokens(&self) -> usize {
        self.total_tokens - self.hidden_tokens - self.error_tokens
    }
}

pub struct LexicalAnalyzer {
    metrics: LexicalMetrics,
    preferences: LexicalPreferences,
}

impl LexicalAnalyzer {
    pub fn new() -> Self {
        Self::with_preferences(LexicalPreferences::default())
    }

    pub fn with_preferences(preferences: LexicalPreferences) -> Self {
        Self {
            metrics: LexicalMetrics::default(),
            preferences,
        }
    }

    /// Tokenize `source` into tokens ending with EOF
    pub fn tokenize(&mut self, source: &str) -> Result<LexOutput, LexerError> {
        self.metrics = LexicalMetrics::default();
        let limit = self.preferences.max_token_count;

        log_debug!("Starting lexical analysis",
            "bytes" => source.len(),
            "max_tokens_allowed" => limit
        );

        let mut tokens = Vec::new();
        let mut diagnostics = Vec::new();
        let mut offset = 0;
        let mut position = Position::start();

        while let Some(scanned) = source.get(offset..).and_then(scan) {
            if tokens.len() >= limit {
                let error = LexerError::TooManyTokens {
                    count: tokens.len(),
                    limit,
                    span: Span::empty_at(position),
                };
                log_error!(error.error_code(), "Token limit exceeded",
                    span = error.span(),
                    "token_count" => tokens.len(),
                    "limit" => limit
                );
                return Err(error);
            }

            let lexeme = &source[offset..offset + scanned.len];
            let end = position.advance_str(lexeme);
            let token = Token::new(scanned.kind, lexeme, Span::new(position, end));

            if let Some(problem) = scanned.problem {
                diagnostics.push(self.report(problem.code(), problem.message(lexeme), token.span));
            }
            if let Some((code, message)) = self.check_size_limits(&token) {
                diagnostics.push(self.report(code, message, token.span));
            }

            self.metrics.record_token(&token, &self.preferences);
            tokens.push(token);
            offset += scanned.len;
            position = end;
        }

        tokens.push(Token::eof(Span::empty_at(position)));

        log_success!(codes::success::TOKENIZATION_COMPLETE, "Tokenization completed",
            "total_tokens" => self.metrics.total_tokens,
            "significant_tokens" => self.metrics.significant_tokens(),
            "diagnostics" => diagnostics.len()
        );

        Ok(LexOutput {
            tokens,
            diagnostics,
        })
    }

    /// Tokenize a processed script file with the file path in log context
    pub fn tokenize_file_result(
        &mut self,
        file_result: &FileProcessingResult,
    ) -> Result<LexOutput, LexerError> {
        log_debug!("Tokenizing file",
            "file" => file_result.metadata.path.display(),
            "line_count" => file_result.metadata.line_count,
            "char_count" => file_result.char_count()
        );
        self.tokenize(&file_result.source)
    }

    fn report(&self, code: crate::logging::Code, message: String, span: Span) -> Diagnostic {
        log_error!(code, &message, span = span);
        Diagnostic::lexical(code, message, span)
    }

    fn check_size_limits(&self, token: &Token) -> Option<(crate::logging::Code, String)> {
        match token.kind {
            TokenKind::Identifier => {
                let length = token.lexeme.chars().count();
                (length > self.preferences.max_identifier_length).then(|| {
                    (
                        codes::lexical::IDENTIFIER_TOO_LONG,
                        format!(
                            "identifier is {} characters long (max {})",
                            length, self.preferences.max_identifier_length
                        ),
                    )
                })
            }
            TokenKind::StringLiteral => {
                let size = token.lexeme.len();
                (size > self.preferences.max_string_size).then(|| {
                    (
                        codes::lexical::STRING_TOO_LARGE,
                        format!(
                            "string literal is {} bytes (max {})",
                            size, self.preferences.max_string_size
                        ),
                    )
                })
            }
            TokenKind::SingleLineComment | TokenKind::MultilineComment => {
                let length = token.lexeme.chars().count();
                (length > self.preferences.max_comment_length).then(|| {
                    (
                        codes::lexical::COMMENT_TOO_LONG,
                        format!(
                            "comment is {} characters long (max {})",
                            length, self.preferences.max_comment_length
                        ),
                    )
                })
            }
            _ => None,
        }
    }

    /// Metrics of the most recent run
    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    pub fn preferences(&self) -> &LexicalPreferences {
        &self.preferences
    }

    pub fn set_preferences(&mut self, preferences: LexicalPreferences) {
        self.preferences = preferences;
    }
}

impl Default for LexicalAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::keywords::Keyword;
    use assert_matches::assert_matches;

    fn lex(source: &str) -> LexOutput {
        LexicalAnalyzer::new().tokenize(source).unwrap()
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).tokens.iter().map(|t| t.kind).collect()
    }

    fn significant(source: &str) -> Vec<(TokenKind, String)> {
        lex(source)
            .significant_tokens()
            .map(|t| (t.kind, t.lexeme.clone()))
            .collect()
    }

    #[test]
    fn test_lexemes_reconstruct_input() {
        let inputs = [
            "",
            "2+3*4",
            "ECHO 'it''s' ; 1.5m\n# trailing",
            "/* unterminated",
            "'unterminated",
            "\r\n\t 1 @ 2 ! 3",
            "SELECT naïve_ñame, 0x1F, 1e10 FROM t WHERE a <> b || c;",
            "1. 1e 1e+ ... := => ?[]",
        ];
        for input in inputs {
            let output = lex(input);
            assert_eq!(output.reconstruct_text(), input, "input: {:?}", input);
            assert!(output.tokens.last().unwrap().is_eof());
            assert_eq!(output.tokens.iter().filter(|t| t.is_eof()).count(), 1);
        }
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        assert_eq!(kinds("ECHO"), vec![TokenKind::Keyword(Keyword::Echo), TokenKind::Eof]);
        assert_eq!(kinds("echo"), vec![TokenKind::Identifier, TokenKind::Eof]);
        assert_eq!(kinds("Echo"), vec![TokenKind::Identifier, TokenKind::Eof]);
        // Longest match: keyword prefix inside a longer word stays an identifier
        assert_eq!(kinds("ECHOED"), vec![TokenKind::Identifier, TokenKind::Eof]);
    }

    #[test]
    fn test_boolean_literals() {
        assert_eq!(kinds("TRUE"), vec![TokenKind::BooleanLiteral, TokenKind::Eof]);
        assert_eq!(kinds("FALSE"), vec![TokenKind::BooleanLiteral, TokenKind::Eof]);
        assert_eq!(kinds("true"), vec![TokenKind::Identifier, TokenKind::Eof]);
    }

    #[test]
    fn test_numeric_forms() {
        use TokenKind::*;
        let cases: &[(&str, &[(TokenKind, &str)])] = &[
            ("42", &[(IntegerLiteral, "42")]),
            ("1.5", &[(FloatLiteral, "1.5")]),
            ("1.5m", &[(NumericLiteral, "1.5m")]),
            ("1e10", &[(FloatLiteral, "1e10")]),
            ("2.5E-3", &[(FloatLiteral, "2.5E-3")]),
            ("0x1F", &[(FloatLiteral, "0x1F")]),
            ("0x", &[(IntegerLiteral, "0"), (Identifier, "x")]),
            ("1.", &[(IntegerLiteral, "1"), (Period, ".")]),
            ("1e", &[(IntegerLiteral, "1"), (Identifier, "e")]),
            ("1m", &[(IntegerLiteral, "1"), (Identifier, "m")]),
            ("12abc", &[(IntegerLiteral, "12"), (Identifier, "abc")]),
        ];

        for (input, expected) in cases {
            let actual = significant(input);
            let expected: Vec<(TokenKind, String)> =
                expected.iter().map(|(k, s)| (*k, s.to_string())).collect();
            assert_eq!(actual[..actual.len() - 1], expected[..], "input: {}", input);
        }
    }

    #[test]
    fn test_symbols_longest_match() {
        use TokenKind::*;
        assert_eq!(
            kinds("...:=:<>>=<=||.=>"),
            vec![
                Ellipsis, Assign, Colon, NotEquals, GreaterOrEquals, LessOrEquals,
                Concat, Period, Association, Eof
            ]
        );
        assert_eq!(kinds(".."), vec![Period, Period, Eof]);
    }

    #[test]
    fn test_string_literals() {
        let output = lex("'it''s'");
        assert_eq!(output.tokens[0].kind, TokenKind::StringLiteral);
        assert_eq!(decode_string_literal(&output.tokens[0].lexeme), "it's");
        assert_eq!(decode_string_literal("''"), "");
        assert_eq!(decode_string_literal("''''"), "'");
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn test_unterminated_string_becomes_error_token() {
        let output = lex("1 'abc");
        let last = &output.tokens[output.tokens.len() - 2];
        assert_eq!(last.kind, TokenKind::Error);
        assert_eq!(last.lexeme, "'abc");
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.diagnostics[0].code, codes::lexical::UNTERMINATED_STRING);
        assert_eq!(output.diagnostics[0].offset, 2);
    }

    #[test]
    fn test_comments_are_hidden() {
        let output = lex("# comment\n1");
        assert_eq!(output.tokens[0].kind, TokenKind::SingleLineComment);
        assert_eq!(output.tokens[0].lexeme, "# comment");
        assert_eq!(output.tokens[1].kind, TokenKind::Spaces);
        assert!(output.tokens[0].is_hidden());

        assert_eq!(significant("/* c */ 1"), significant("1"));
        assert_eq!(kinds("/* a */*/"), vec![
            TokenKind::MultilineComment,
            TokenKind::Star,
            TokenKind::Div,
            TokenKind::Eof
        ]);
    }

    #[test]
    fn test_unterminated_comment_reports_but_stays_comment() {
        let output = lex("1 /* open");
        assert_eq!(output.tokens[2].kind, TokenKind::MultilineComment);
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.diagnostics[0].code, codes::lexical::UNTERMINATED_COMMENT);
    }

    #[test]
    fn test_unrecognized_character_recovery() {
        let output = lex("1 @ 2 é!");
        let errors: Vec<&str> = output
            .tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Error)
            .map(|t| t.lexeme.as_str())
            .collect();
        assert_eq!(errors, vec!["@", "!"]);
        assert_eq!(output.diagnostics.len(), 2);
        assert!(output.diagnostics.iter().all(|d| d.is_lexical()));
        assert_eq!(output.diagnostics[0].message, "token recognition error at: '@'");
        // 'é' is a letter, so it starts an identifier
        assert!(output.tokens.iter().any(|t| t.kind == TokenKind::Identifier && t.lexeme == "é"));
    }

    #[test]
    fn test_positions_track_lines_and_columns() {
        let output = lex("1\r\n  é 2");
        let two = output.tokens.iter().find(|t| t.lexeme == "2").unwrap();
        assert_eq!(two.span.start.line, 2);
        assert_eq!(two.span.start.column, 5);
        assert_eq!(two.span.start.offset, 8);
    }

    #[test]
    fn test_size_limit_diagnostics_are_non_fatal() {
        let preferences = LexicalPreferences {
            max_identifier_length: 3,
            max_string_size: 4,
            max_comment_length: 5,
            ..Default::default()
        };
        let mut analyzer = LexicalAnalyzer::with_preferences(preferences);
        let source = "abcd 'hello' # long comment";
        let output = analyzer.tokenize(source).unwrap();

        let found: Vec<_> = output.diagnostics.iter().map(|d| d.code).collect();
        assert_eq!(
            found,
            vec![
                codes::lexical::IDENTIFIER_TOO_LONG,
                codes::lexical::STRING_TOO_LARGE,
                codes::lexical::COMMENT_TOO_LONG
            ]
        );
        assert_eq!(output.reconstruct_text(), source);
    }

    #[test]
    fn test_token_limit_is_fatal() {
        let preferences = LexicalPreferences {
            max_token_count: 3,
            ..Default::default()
        };
        let mut analyzer = LexicalAnalyzer::with_preferences(preferences);
        assert!(analyzer.tokenize("1+2").is_ok());

        let error = analyzer.tokenize("1 + 2").unwrap_err();
        assert_matches!(error, LexerError::TooManyTokens { count: 3, limit: 3, .. });
        assert_eq!(error.error_code(), codes::lexical::TOO_MANY_TOKENS);
        assert_eq!(error.span().start.offset, 3);
    }

    #[test]
    fn test_metrics() {
        let mut analyzer = LexicalAnalyzer::new();
        analyzer.tokenize("ECHO x + 'ab' # c\n@").unwrap();
        let metrics = analyzer.metrics();
        assert_eq!(metrics.keyword_tokens, 1);
        assert_eq!(metrics.identifier_tokens, 1);
        assert_eq!(metrics.literal_tokens, 1);
        assert_eq!(metrics.operator_tokens, 1);
        assert_eq!(metrics.comment_count, 1);
        assert_eq!(metrics.error_tokens, 1);
        assert_eq!(metrics.max_string_length, 4);
        assert_eq!(metrics.significant_tokens(), 4);
    }

    #[test]
    fn test_scan_is_pure() {
        assert_eq!(scan(""), None);
        assert_eq!(scan("1.5m rest"), Some(Scanned::ok(TokenKind::NumericLiteral, 4)));
        assert_eq!(
            scan("'abc"),
            Some(Scanned::problem(TokenKind::Error, 4, LexProblem::UnterminatedString))
        );
    }
}
