//! Error type for callers that want a parse to either succeed or fail
//!
//! The parser itself never returns this: it reports through diagnostics on
//! [`ParseOutput`](super::ParseOutput). `SyntaxError` is what
//! [`AstBuilder`](super::AstBuilder) turns the first diagnostic into.

use crate::diagnostics::Diagnostic;
use crate::lexical::LexerError;
use crate::logging::{codes, Code};

pub type SyntaxResult<T> = Result<T, SyntaxError>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum SyntaxError {
    #[error("{message} at line {line}, column {column}")]
    Located {
        code: Code,
        message: String,
        line: u32,
        column: u32,
    },

    #[error(transparent)]
    Lexer(#[from] LexerError),

    #[error("Internal parser error: {message}")]
    InternalParserError { message: String },
}

impl SyntaxError {
    /// Located error from a diagnostic's code, message and start position
    pub fn from_diagnostic(diagnostic: &Diagnostic) -> Self {
        Self::Located {
            code: diagnostic.code,
            message: diagnostic.message.clone(),
            line: diagnostic.span.start.line,
            column: diagnostic.span.start.column,
        }
    }

    pub fn internal_parser_error(message: &str) -> Self {
        Self::InternalParserError {
            message: message.to_string(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::Located { code, .. } => *code,
            Self::Lexer(error) => error.error_code(),
            Self::InternalParserError { .. } => codes::syntax::INTERNAL_PARSER_ERROR,
        }
    }

    /// 1-based line and column, if the error has a location
    pub fn location(&self) -> Option<(u32, u32)> {
        match self {
            Self::Located { line, column, .. } => Some((*line, *column)),
            Self::Lexer(error) => {
                let start = error.span().start;
                Some((start.line, start.column))
            }
            Self::InternalParserError { .. } => None,
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.error_code().as_str()).as_str()
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.error_code().as_str())
    }

    pub fn recommended_action(&self) -> &'static str {
        codes::get_action(self.error_code().as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{Position, Span};
    use assert_matches::assert_matches;

    #[test]
    fn test_from_diagnostic() {
        let start = Position::new(5, 2, 3);
        let diagnostic = Diagnostic::syntax(
            codes::syntax::EXTRANEOUS_INPUT,
            "extraneous input ')' expecting ';'",
            Span::new(start, start.advance(')')),
        );

        let error = SyntaxError::from_diagnostic(&diagnostic);
        assert_matches!(&error, SyntaxError::Located { line: 2, column: 3, .. });
        assert_eq!(error.error_code(), codes::syntax::EXTRANEOUS_INPUT);
        assert_eq!(error.location(), Some((2, 3)));
        assert_eq!(
            error.to_string(),
            "extraneous input ')' expecting ';' at line 2, column 3"
        );
        assert!(error.is_recoverable());
        assert_eq!(error.category(), "Syntax");
    }

    #[test]
    fn test_lexer_error_conversion() {
        let lexer_error = LexerError::TooManyTokens {
            count: 10,
            limit: 10,
            span: Span::empty_at(Position::new(20, 1, 21)),
        };
        let error: SyntaxError = lexer_error.into();
        assert_eq!(error.error_code(), codes::lexical::TOO_MANY_TOKENS);
        assert_eq!(error.location(), Some((1, 21)));
        assert!(error.requires_halt());
    }

    #[test]
    fn test_internal_error() {
        let error = SyntaxError::internal_parser_error("incomplete parse without diagnostics");
        assert_eq!(error.location(), None);
        assert_eq!(error.severity(), "Critical");
    }
}
