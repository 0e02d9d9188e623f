//! Token kinds and the positioned token produced by the lexer

use crate::grammar::keywords::Keyword;
use crate::utils::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of token kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    // === PUNCTUATION ===
    LeftParen,    // (
    RightParen,   // )
    Assign,       // :=
    Association,  // =>
    Colon,        // :
    Comma,        // ,
    Period,       // .
    Ellipsis,     // ...
    Semicolon,    // ;
    Question,     // ?
    LeftBracket,  // [
    RightBracket, // ]

    // === OPERATORS ===
    Plus,            // +
    Minus,           // -
    Star,            // *
    Div,             // /
    Mod,             // %
    Equals,          // =
    NotEquals,       // <>
    Greater,         // >
    GreaterOrEquals, // >=
    Less,            // <
    LessOrEquals,    // <=
    Concat,          // ||

    Keyword(Keyword),
    Identifier,

    // === LITERALS ===
    IntegerLiteral,
    FloatLiteral,
    NumericLiteral,
    StringLiteral,
    BooleanLiteral,

    // === HIDDEN CHANNEL ===
    SingleLineComment,
    MultilineComment,
    Spaces,

    /// Unrecognized character or unterminated string
    Error,
    Eof,
}

impl TokenKind {
    /// Stable upper-snake name used by token listings
    pub const fn symbolic_name(self) -> &'static str {
        match self {
            Self::LeftParen => "LEFT_PAREN",
            Self::RightParen => "RIGHT_PAREN",
            Self::Assign => "ASSIGN",
            Self::Association => "ASSOCIATION",
            Self::Colon => "COLON",
            Self::Comma => "COMMA",
            Self::Period => "PERIOD",
            Self::Ellipsis => "ELLIPSIS",
            Self::Semicolon => "SEMICOLON",
            Self::Question => "QUESTION",
            Self::LeftBracket => "LEFT_BRACKET",
            Self::RightBracket => "RIGHT_BRACKET",
            Self::Plus => "PLUS",
            Self::Minus => "MINUS",
            Self::Star => "STAR",
            Self::Div => "DIV",
            Self::Mod => "MOD",
            Self::Equals => "EQUALS",
            Self::NotEquals => "NOT_EQUALS",
            Self::Greater => "GREATER",
            Self::GreaterOrEquals => "GREATER_OR_EQUALS",
            Self::Less => "LESS",
            Self::LessOrEquals => "LESS_OR_EQUALS",
            Self::Concat => "CONCAT",
            Self::Keyword(keyword) => keyword.as_str(),
            Self::Identifier => "IDENTIFIER",
            Self::IntegerLiteral => "INTEGER_LITERAL",
            Self::FloatLiteral => "FLOAT_LITERAL",
            Self::NumericLiteral => "NUMERIC_LITERAL",
            Self::StringLiteral => "STRING_LITERAL",
            Self::BooleanLiteral => "BOOLEAN_LITERAL",
            Self::SingleLineComment => "SINGLE_LINE_COMMENT",
            Self::MultilineComment => "MULTILINE_COMMENT",
            Self::Spaces => "SPACES",
            Self::Error => "ERROR",
            Self::Eof => "EOF",
        }
    }

    /// Fixed source text for punctuation and operators
    pub const fn fixed_text(self) -> Option<&'static str> {
        match self {
            Self::LeftParen => Some("("),
            Self::RightParen => Some(")"),
            Self::Assign => Some(":="),
            Self::Association => Some("=>"),
            Self::Colon => Some(":"),
            Self::Comma => Some(","),
            Self::Period => Some("."),
            Self::Ellipsis => Some("..."),
            Self::Semicolon => Some(";"),
            Self::Question => Some("?"),
            Self::LeftBracket => Some("["),
            Self::RightBracket => Some("]"),
            Self::Plus => Some("+"),
            Self::Minus => Some("-"),
            Self::Star => Some("*"),
            Self::Div => Some("/"),
            Self::Mod => Some("%"),
            Self::Equals => Some("="),
            Self::NotEquals => Some("<>"),
            Self::Greater => Some(">"),
            Self::GreaterOrEquals => Some(">="),
            Self::Less => Some("<"),
            Self::LessOrEquals => Some("<="),
            Self::Concat => Some("||"),
            Self::Keyword(keyword) => Some(keyword.as_str()),
            _ => None,
        }
    }

    /// Name used in diagnostics: quoted text for fixed tokens, the symbolic
    /// name otherwise, `<EOF>` for end of input
    pub fn display_name(self) -> String {
        match self {
            Self::Eof => "<EOF>".to_string(),
            _ => match self.fixed_text() {
                Some(text) => format!("'{}'", text),
                None => self.symbolic_name().to_string(),
            },
        }
    }

    pub const fn is_literal(self) -> bool {
        matches!(
            self,
            Self::IntegerLiteral
                | Self::FloatLiteral
                | Self::NumericLiteral
                | Self::StringLiteral
                | Self::BooleanLiteral
        )
    }

    pub const fn is_operator(self) -> bool {
        matches!(
            self,
            Self::Plus
                | Self::Minus
                | Self::Star
                | Self::Div
                | Self::Mod
                | Self::Equals
                | Self::NotEquals
                | Self::Greater
                | Self::GreaterOrEquals
                | Self::Less
                | Self::LessOrEquals
                | Self::Concat
        )
    }

    pub const fn is_punctuation(self) -> bool {
        matches!(
            self,
            Self::LeftParen
                | Self::RightParen
                | Self::Assign
                | Self::Association
                | Self::Colon
                | Self::Comma
                | Self::Period
                | Self::Ellipsis
                | Self::Semicolon
                | Self::Question
                | Self::LeftBracket
                | Self::RightBracket
        )
    }

    pub const fn is_keyword(self) -> bool {
        matches!(self, Self::Keyword(_))
    }

    /// Whitespace and comments
    pub const fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::Spaces | Self::SingleLineComment | Self::MultilineComment
        )
    }

    /// Channel the lexer routes this kind to
    pub const fn channel(self) -> Channel {
        if self.is_trivia() {
            Channel::Hidden
        } else {
            Channel::Default
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbolic_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Default,
    /// Whitespace and comments: kept for reconstruction, skipped by the parser
    Hidden,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Exact source text; empty only for EOF
    pub lexeme: String,
    pub span: Span,
    pub channel: Channel,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            span,
            channel: kind.channel(),
        }
    }

    pub fn eof(span: Span) -> Self {
        Self::new(TokenKind::Eof, String::new(), span)
    }

    pub fn is_hidden(&self) -> bool {
        self.channel == Channel::Hidden
    }

    /// Whether the parser sees this token
    pub fn is_significant(&self) -> bool {
        !self.is_hidden() && self.kind != TokenKind::Error
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// How the token is quoted in diagnostics
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => "<EOF>".to_string(),
            _ => format!("'{}'", self.lexeme),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.symbolic_name(), self.lexeme)
    }
}

/// Classify a scanned word as keyword, boolean literal or identifier
pub fn classify_word(word: &str) -> TokenKind {
    match word {
        "TRUE" | "FALSE" => TokenKind::BooleanLiteral,
        _ => match Keyword::from_str(word) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Identifier,
        },
    }
}

/// Map operator and punctuation text to its kind
pub fn classify_symbol(symbol: &str) -> Option<TokenKind> {
    let kind = match symbol {
        "(" => TokenKind::LeftParen,
        ")" => TokenKind::RightParen,
        ":=" => TokenKind::Assign,
        "=>" => TokenKind::Association,
        ":" => TokenKind::Colon,
        "," => TokenKind::Comma,
        "." => TokenKind::Period,
        "..." => TokenKind::Ellipsis,
        ";" => TokenKind::Semicolon,
        "?" => TokenKind::Question,
        "[" => TokenKind::LeftBracket,
        "]" => TokenKind::RightBracket,
        "+" => TokenKind::Plus,
        "-" => TokenKind::Minus,
        "*" => TokenKind::Star,
        "/" => TokenKind::Div,
        "%" => TokenKind::Mod,
        "=" => TokenKind::Equals,
        "<>" => TokenKind::NotEquals,
        ">" => TokenKind::Greater,
        ">=" => TokenKind::GreaterOrEquals,
        "<" => TokenKind::Less,
        "<=" => TokenKind::LessOrEquals,
        "||" => TokenKind::Concat,
        _ => return None,
    };
    Some(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_word() {
        assert_eq!(classify_word("TRUE"), TokenKind::BooleanLiteral);
        assert_eq!(classify_word("FALSE"), TokenKind::BooleanLiteral);
        assert_eq!(classify_word("true"), TokenKind::Identifier);
        assert_eq!(classify_word("ECHO"), TokenKind::Keyword(Keyword::Echo));
        assert_eq!(classify_word("Echo"), TokenKind::Identifier);
    }

    #[test]
    fn test_symbols_round_trip_through_fixed_text() {
        for symbol in [
            "(", ")", ":=", "=>", ":", ",", ".", "...", ";", "?", "[", "]", "+", "-", "*", "/",
            "%", "=", "<>", ">", ">=", "<", "<=", "||",
        ] {
            let kind = classify_symbol(symbol).unwrap();
            assert_eq!(kind.fixed_text(), Some(symbol));
        }
        assert_eq!(classify_symbol("!"), None);
    }

    #[test]
    fn test_symbolic_names() {
        assert_eq!(TokenKind::Assign.symbolic_name(), "ASSIGN");
        assert_eq!(TokenKind::Association.symbolic_name(), "ASSOCIATION");
        assert_eq!(TokenKind::Concat.symbolic_name(), "CONCAT");
        assert_eq!(TokenKind::Keyword(Keyword::Select).symbolic_name(), "SELECT");
        assert_eq!(TokenKind::Eof.symbolic_name(), "EOF");
    }

    #[test]
    fn test_display_names() {
        assert_eq!(TokenKind::Semicolon.display_name(), "';'");
        assert_eq!(TokenKind::Keyword(Keyword::Echo).display_name(), "'ECHO'");
        assert_eq!(TokenKind::IntegerLiteral.display_name(), "INTEGER_LITERAL");
        assert_eq!(TokenKind::Eof.display_name(), "<EOF>");
    }

    #[test]
    fn test_channels() {
        assert_eq!(TokenKind::Spaces.channel(), Channel::Hidden);
        assert_eq!(TokenKind::MultilineComment.channel(), Channel::Hidden);
        assert_eq!(TokenKind::Error.channel(), Channel::Default);

        let error = Token::new(TokenKind::Error, "@", Span::dummy());
        assert!(!error.is_hidden());
        assert!(!error.is_significant());
    }
}
