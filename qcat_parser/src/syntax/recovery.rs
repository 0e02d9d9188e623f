//! Error recovery policy
//!
//! The parser consults [`decide`] at every failure point. The decision only
//! depends on the offending token, the token after it, the set of kinds that
//! would have been accepted, and optionally a single token that could be
//! assumed missing. It has no state of its own.

use crate::tokens::TokenKind;

/// Kinds that begin a literal
pub const LITERAL_START: &[TokenKind] = &[
    TokenKind::IntegerLiteral,
    TokenKind::FloatLiteral,
    TokenKind::NumericLiteral,
    TokenKind::StringLiteral,
    TokenKind::BooleanLiteral,
];

/// Kinds that begin a statement: any literal, or ECHO
pub const STATEMENT_START: &[TokenKind] = &[
    TokenKind::IntegerLiteral,
    TokenKind::FloatLiteral,
    TokenKind::NumericLiteral,
    TokenKind::StringLiteral,
    TokenKind::BooleanLiteral,
    TokenKind::Keyword(crate::grammar::keywords::Keyword::Echo),
];

/// Kinds accepted right after a complete operand
pub const AFTER_OPERAND: &[TokenKind] = &[
    TokenKind::Plus,
    TokenKind::Minus,
    TokenKind::Star,
    TokenKind::Div,
    TokenKind::Mod,
    TokenKind::Semicolon,
    TokenKind::Eof,
];

/// Where resynchronization stops skipping
pub const SYNC_SET: &[TokenKind] = &[TokenKind::Semicolon, TokenKind::Eof];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Drop the offending token; the one after it is acceptable
    DeleteToken,
    /// Behave as if this kind had been present before the offending token
    InsertMissing(TokenKind),
    /// Abandon the current statement and skip to the next `;` or EOF
    Resynchronize,
    /// Input ended where a token was required
    Abort,
}

impl RecoveryAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DeleteToken => "DeleteToken",
            Self::InsertMissing(_) => "InsertMissing",
            Self::Resynchronize => "Resynchronize",
            Self::Abort => "Abort",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RecoveryContext<'a> {
    pub found: TokenKind,
    pub next: TokenKind,
    pub expected: &'a [TokenKind],
    /// A token that may be assumed missing, with the kinds that may follow it
    pub insertable: Option<(TokenKind, &'a [TokenKind])>,
}

/// Pick the recovery for a failure. Deletion is preferred over insertion.
pub fn decide(context: &RecoveryContext<'_>) -> RecoveryAction {
    if context.found == TokenKind::Eof {
        return RecoveryAction::Abort;
    }

    if context.expected.contains(&context.next) {
        return RecoveryAction::DeleteToken;
    }

    match context.insertable {
        Some((missing, follow)) if follow.contains(&context.found) => {
            RecoveryAction::InsertMissing(missing)
        }
        _ => RecoveryAction::Resynchronize,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::keywords::Keyword;

    fn boundary(found: TokenKind, next: TokenKind) -> RecoveryAction {
        decide(&RecoveryContext {
            found,
            next,
            expected: AFTER_OPERAND,
            insertable: Some((TokenKind::Semicolon, STATEMENT_START)),
        })
    }

    #[test]
    fn test_eof_aborts() {
        let action = decide(&RecoveryContext {
            found: TokenKind::Eof,
            next: TokenKind::Eof,
            expected: LITERAL_START,
            insertable: None,
        });
        assert_eq!(action, RecoveryAction::Abort);
    }

    #[test]
    fn test_deletion_when_next_token_fits() {
        // "1 2;3"
        assert_eq!(
            boundary(TokenKind::IntegerLiteral, TokenKind::Semicolon),
            RecoveryAction::DeleteToken
        );
        // "1 2" deletes too: EOF may follow an operand
        assert_eq!(
            boundary(TokenKind::IntegerLiteral, TokenKind::Eof),
            RecoveryAction::DeleteToken
        );
    }

    #[test]
    fn test_insertion_before_statement_start() {
        // "1 ECHO 2"
        assert_eq!(
            boundary(TokenKind::Keyword(Keyword::Echo), TokenKind::IntegerLiteral),
            RecoveryAction::InsertMissing(TokenKind::Semicolon)
        );
    }

    #[test]
    fn test_resynchronize_otherwise() {
        assert_eq!(
            boundary(TokenKind::RightParen, TokenKind::RightParen),
            RecoveryAction::Resynchronize
        );
        let action = decide(&RecoveryContext {
            found: TokenKind::Identifier,
            next: TokenKind::Identifier,
            expected: STATEMENT_START,
            insertable: None,
        });
        assert_eq!(action, RecoveryAction::Resynchronize);
    }

    #[test]
    fn test_sets() {
        assert!(STATEMENT_START.starts_with(LITERAL_START));
        assert!(AFTER_OPERAND.ends_with(SYNC_SET));
        assert_eq!(RecoveryAction::InsertMissing(TokenKind::Semicolon).as_str(), "InsertMissing");
    }
}
