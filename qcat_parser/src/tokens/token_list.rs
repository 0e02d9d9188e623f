//! Flat token listing for editor tooling
//!
//! Positions here are character indices, not byte offsets, so they can be
//! used directly against the text an editor holds.

use crate::tokens::token::{Token, TokenKind};
use serde::Serialize;
use std::fmt;

/// Symbolic kinds that separate words for completion and highlighting.
/// Brackets are not among them, so `a[0]` reads as one word.
const SEPARATOR_KINDS: &[&str] = &[
    "SPACES",
    "SEMICOLON",
    "LEFT_PAREN",
    "RIGHT_PAREN",
    "ASSIGN",
    "ASSOCIATION",
    "COLON",
    "COMMA",
    "ELLIPSIS",
    "QUESTION",
    "PLUS",
    "MINUS",
    "STAR",
    "DIV",
    "MOD",
    "EQUALS",
    "NOT_EQUALS",
    "GREATER",
    "GREATER_OR_EQUALS",
    "LESS",
    "LESS_OR_EQUALS",
    "CONCAT",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParserToken {
    pub text: String,
    /// Symbolic kind name, e.g. `INTEGER_LITERAL`
    pub kind: &'static str,
    /// Character index of the first character
    pub start_index: usize,
}

impl ParserToken {
    pub fn new(text: impl Into<String>, kind: &'static str, start_index: usize) -> Self {
        Self {
            text: text.into(),
            kind,
            start_index,
        }
    }

    /// Character index one past the last character
    pub fn end_index(&self) -> usize {
        self.start_index + self.text.chars().count()
    }

    /// Whitespace, `;`, an operator, or punctuation other than `.`, `[` and `]`
    pub fn is_separator(&self) -> bool {
        SEPARATOR_KINDS.contains(&self.kind)
    }
}

impl fmt::Display for ParserToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.text)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TokenList {
    tokens: Vec<ParserToken>,
}

impl TokenList {
    pub fn new(tokens: Vec<ParserToken>) -> Self {
        Self { tokens }
    }

    /// Convert lexer output, dropping EOF
    pub fn from_tokens(tokens: &[Token]) -> Self {
        let mut start_index = 0;
        let tokens = tokens
            .iter()
            .filter(|t| t.kind != TokenKind::Eof)
            .map(|t| {
                let token = ParserToken::new(t.lexeme.clone(), t.kind.symbolic_name(), start_index);
                start_index = token.end_index();
                token
            })
            .collect();
        Self { tokens }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ParserToken> {
        self.tokens.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParserToken> {
        self.tokens.iter()
    }

    fn bounds(&self, start: usize, length: Option<usize>) -> (usize, usize) {
        let start = start.min(self.tokens.len());
        let end = match length {
            Some(length) => start.saturating_add(length).min(self.tokens.len()),
            None => self.tokens.len(),
        };
        (start, end)
    }

    /// Text of `length` tokens from `start`, or of all remaining tokens
    pub fn join(&self, start: usize, length: Option<usize>) -> String {
        let (start, end) = self.bounds(start, length);
        self.tokens[start..end]
            .iter()
            .map(|t| t.text.as_str())
            .collect()
    }

    pub fn find_index(&self, kind: &str) -> Option<usize> {
        self.find_index_from(0, kind)
    }

    pub fn find_index_from(&self, start: usize, kind: &str) -> Option<usize> {
        self.find_index_by(start, |t| t.kind == kind)
    }

    pub fn find_index_by<F>(&self, start: usize, predicate: F) -> Option<usize>
    where
        F: Fn(&ParserToken) -> bool,
    {
        self.tokens
            .iter()
            .enumerate()
            .skip(start)
            .find(|(_, t)| predicate(t))
            .map(|(i, _)| i)
    }

    pub fn find_last_index(&self, kind: &str) -> Option<usize> {
        self.find_last_index_by(|t| t.kind == kind)
    }

    pub fn find_last_index_by<F>(&self, predicate: F) -> Option<usize>
    where
        F: Fn(&ParserToken) -> bool,
    {
        self.tokens.iter().rposition(predicate)
    }

    /// Character position of token `token_index` within the query text
    pub fn query_position(&self, token_index: usize) -> usize {
        self.tokens
            .iter()
            .take(token_index)
            .map(|t| t.text.chars().count())
            .sum()
    }

    /// Copy of `count` tokens from `start`, or of all remaining tokens
    pub fn range(&self, start: usize, count: Option<usize>) -> TokenList {
        let (start, end) = self.bounds(start, count);
        TokenList::new(self.tokens[start..end].to_vec())
    }
}

impl<'a> IntoIterator for &'a TokenList {
    type Item = &'a ParserToken;
    type IntoIter = std::slice::Iter<'a, ParserToken>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

impl std::ops::Index<usize> for TokenList {
    type Output = ParserToken;

    fn index(&self, index: usize) -> &ParserToken {
        &self.tokens[index]
    }
}
