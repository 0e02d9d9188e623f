//! Buffered token stream with a significant-token view for the parser
//!
//! The stream keeps every token the lexer produced, so the source text can be
//! reconstructed and hidden tokens listed, while navigation (`current`,
//! `peek`, `advance`) only visits significant tokens. The stream always ends
//! in exactly one EOF token, and navigation never moves past it.

use crate::tokens::token::{Token, TokenKind};
use crate::utils::{Position, SourceMap, Span};

#[derive(Debug, Clone)]
pub struct TokenStream {
    /// All tokens, hidden channel and error markers included
    all_tokens: Vec<Token>,
    /// Indices into `all_tokens` of the tokens the parser sees
    significant_indices: Vec<usize>,
    /// Current position in `significant_indices`
    position: usize,
    source_map: Option<SourceMap>,
}

impl TokenStream {
    /// Build a stream; a missing terminal EOF is appended
    pub fn new(tokens: Vec<Token>) -> Self {
        let mut stream = Self {
            all_tokens: tokens,
            significant_indices: Vec::new(),
            position: 0,
            source_map: None,
        };
        stream.ensure_eof();
        stream.rebuild_significant_indices();
        stream
    }

    pub fn with_source_map(tokens: Vec<Token>, source_map: SourceMap) -> Self {
        let mut stream = Self::new(tokens);
        stream.source_map = Some(source_map);
        stream
    }

    fn ensure_eof(&mut self) {
        if self.all_tokens.last().map(Token::is_eof) != Some(true) {
            let end = self
                .all_tokens
                .last()
                .map(|t| t.span.end)
                .unwrap_or_else(Position::start);
            self.all_tokens.push(Token::eof(Span::empty_at(end)));
        }
    }

    fn rebuild_significant_indices(&mut self) {
        self.significant_indices = self
            .all_tokens
            .iter()
            .enumerate()
            .filter(|(_, token)| token.is_significant())
            .map(|(i, _)| i)
            .collect();
        self.position = 0;

        crate::log_debug!("Token stream built",
            "total_tokens" => self.all_tokens.len(),
            "significant_tokens" => self.significant_indices.len()
        );
    }

    fn last_position(&self) -> usize {
        self.significant_indices.len() - 1
    }

    fn token_at(&self, position: usize) -> &Token {
        let position = position.min(self.last_position());
        &self.all_tokens[self.significant_indices[position]]
    }

    // === NAVIGATION ===

    /// Current significant token; EOF once the input is exhausted
    pub fn current(&self) -> &Token {
        self.token_at(self.position)
    }

    pub fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    pub fn current_span(&self) -> Span {
        self.current().span
    }

    /// Next significant token after the current one
    pub fn peek(&self) -> &Token {
        self.peek_ahead(1)
    }

    /// Significant token `n` positions ahead; EOF past the end
    pub fn peek_ahead(&self, n: usize) -> &Token {
        self.token_at(self.position.saturating_add(n))
    }

    /// Move to the next significant token and return the one moved past
    pub fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.position < self.last_position() {
            self.position += 1;
        }
        token
    }

    /// Consume the current token if it has the given kind
    pub fn advance_if(&mut self, kind: TokenKind) -> Option<Token> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    pub fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    pub fn is_at_end(&self) -> bool {
        self.current().is_eof()
    }

    /// Skip forward until the current token is one of `kinds` or EOF
    pub fn skip_until(&mut self, kinds: &[TokenKind]) -> usize {
        let mut skipped = 0;
        while !self.is_at_end() && !kinds.contains(&self.current_kind()) {
            self.advance();
            skipped += 1;
        }
        skipped
    }

    pub fn save_position(&self) -> usize {
        self.position
    }

    pub fn restore_position(&mut self, saved_position: usize) {
        self.position = saved_position.min(self.last_position());
    }

    // === VIEWS ===

    /// Number of significant tokens, EOF included
    pub fn len(&self) -> usize {
        self.significant_indices.len()
    }

    /// Whether the stream holds nothing but EOF
    pub fn is_empty(&self) -> bool {
        self.significant_indices.len() == 1
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining_count(&self) -> usize {
        self.last_position().saturating_sub(self.position)
    }

    pub fn all_tokens(&self) -> &[Token] {
        &self.all_tokens
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.all_tokens
    }

    pub fn iter_significant(&self) -> impl Iterator<Item = &Token> {
        self.significant_indices.iter().map(|&i| &self.all_tokens[i])
    }

    /// Tokens of the hidden channel
    pub fn iter_hidden(&self) -> impl Iterator<Item = &Token> {
        self.all_tokens.iter().filter(|t| t.is_hidden())
    }

    /// Concatenation of every lexeme; equals the lexed source
    pub fn reconstruct_text(&self) -> String {
        self.all_tokens.iter().map(|t| t.lexeme.as_str()).collect()
    }

    pub fn source_map(&self) -> Option<&SourceMap> {
        self.source_map.as_ref()
    }

    pub fn format_error(&self, span: Span, message: &str) -> String {
        match &self.source_map {
            Some(source_map) => source_map.format_error(&span, message),
            None => format!("{} at {}", message, span.start),
        }
    }

    /// One-line state summary for debug logging
    pub fn diagnostic(&self) -> String {
        format!(
            "TokenStream(pos: {}/{}, current: {} at {})",
            self.position,
            self.significant_indices.len(),
            self.current().describe(),
            self.current_span().start
        )
    }
}

/// Consistency checks over lexer output
pub mod validation {
    use super::*;

    /// Spans must be contiguous: each token starts where the previous ended
    pub fn validate_span_order(tokens: &[Token]) -> Result<(), String> {
        for window in tokens.windows(2) {
            let current = window[0].span;
            let next = window[1].span;

            if current.end.offset != next.start.offset {
                return Err(format!(
                    "Span gap: token ending at {} followed by token starting at {}",
                    current.end.offset, next.start.offset
                ));
            }
        }
        Ok(())
    }

    /// Every lexeme must match the source text under its span
    pub fn validate_lexemes(tokens: &[Token], source: &str) -> Result<(), String> {
        for token in tokens {
            if token.span.slice(source) != token.lexeme {
                return Err(format!(
                    "Lexeme mismatch at offset {}: token text '{}'",
                    token.span.start.offset, token.lexeme
                ));
            }
        }
        Ok(())
    }

    pub fn validate_token_stream(stream: &TokenStream, source: &str) -> Result<(), String> {
        validate_span_order(stream.all_tokens())?;
        validate_lexemes(stream.all_tokens(), source)?;
        if stream.reconstruct_text() != source {
            return Err("Token lexemes do not reconstruct the source".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(kind: TokenKind, text: &str, start: usize) -> Token {
        let start_pos = Position::new(start, 1, start as u32 + 1);
        Token::new(kind, text, Span::new(start_pos, start_pos.advance_str(text)))
    }

    fn sample() -> TokenStream {
        // "1 + @2"
        TokenStream::new(vec![
            tok(TokenKind::IntegerLiteral, "1", 0),
            tok(TokenKind::Spaces, " ", 1),
            tok(TokenKind::Plus, "+", 2),
            tok(TokenKind::Spaces, " ", 3),
            tok(TokenKind::Error, "@", 4),
            tok(TokenKind::IntegerLiteral, "2", 5),
        ])
    }

    #[test]
    fn test_eof_is_appended() {
        let stream = sample();
        assert!(stream.all_tokens().last().unwrap().is_eof());
        assert_eq!(stream.all_tokens().last().unwrap().span.start.offset, 6);
        assert_eq!(stream.len(), 4);
    }

    #[test]
    fn test_navigation_skips_hidden_and_error_tokens() {
        let mut stream = sample();

        assert_eq!(stream.current_kind(), TokenKind::IntegerLiteral);
        assert_eq!(stream.peek().kind, TokenKind::Plus);
        assert_eq!(stream.peek_ahead(2).lexeme, "2");

        assert_eq!(stream.advance().lexeme, "1");
        assert_eq!(stream.advance().kind, TokenKind::Plus);
        assert_eq!(stream.current().lexeme, "2");
    }

    #[test]
    fn test_navigation_stops_at_eof() {
        let mut stream = sample();
        for _ in 0..10 {
            stream.advance();
        }
        assert!(stream.is_at_end());
        assert_eq!(stream.peek_ahead(5).kind, TokenKind::Eof);
        assert_eq!(stream.remaining_count(), 0);
    }

    #[test]
    fn test_skip_until_and_restore() {
        let mut stream = sample();
        let saved = stream.save_position();

        let skipped = stream.skip_until(&[TokenKind::Semicolon]);
        assert_eq!(skipped, 3);
        assert!(stream.is_at_end());

        stream.restore_position(saved);
        assert_eq!(stream.advance_if(TokenKind::IntegerLiteral).unwrap().lexeme, "1");
        assert!(stream.advance_if(TokenKind::Semicolon).is_none());
    }

    #[test]
    fn test_reconstruction_and_validation() {
        let stream = sample();
        assert_eq!(stream.reconstruct_text(), "1 + @2");
        assert!(validation::validate_token_stream(&stream, "1 + @2").is_ok());
        assert!(validation::validate_token_stream(&stream, "1 + @3").is_err());
        assert_eq!(stream.iter_hidden().count(), 2);
    }

    #[test]
    fn test_empty_input_stream() {
        let stream = TokenStream::new(Vec::new());
        assert!(stream.is_empty());
        assert!(stream.is_at_end());
        assert_eq!(stream.current().span, Span::empty_at(Position::start()));
    }
}
