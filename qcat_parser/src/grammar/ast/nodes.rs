//! AST node definitions for QueryCat scripts
//!
//! Nodes are built bottom-up by the parser and never mutated afterwards.
//! Each node owns its children outright, so the tree has no sharing and no
//! cycles. Nodes carry no spans: two parses of the same statements compare
//! equal whatever whitespace and comments surround them.

use crate::lexical::decode_string_literal;
use crate::tokens::{Token, TokenKind};
use serde::{Deserialize, Serialize};
use std::fmt;

// === OPERATORS ===

/// Arithmetic operators (EBNF: additive and multiplicative tiers)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperator {
    Add,      // +
    Subtract, // -
    Multiply, // *
    Divide,   // /
    Modulus,  // %
}

impl BinaryOperator {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "+" => Some(Self::Add),
            "-" => Some(Self::Subtract),
            "*" => Some(Self::Multiply),
            "/" => Some(Self::Divide),
            "%" => Some(Self::Modulus),
            _ => None,
        }
    }

    /// Operator for an arithmetic token kind
    pub fn from_token_kind(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Plus => Some(Self::Add),
            TokenKind::Minus => Some(Self::Subtract),
            TokenKind::Star => Some(Self::Multiply),
            TokenKind::Div => Some(Self::Divide),
            TokenKind::Mod => Some(Self::Modulus),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulus => "%",
        }
    }

    /// Binding strength: multiplicative 2, additive 1. Both tiers are
    /// left-associative.
    pub const fn precedence(&self) -> u8 {
        match self {
            Self::Add | Self::Subtract => 1,
            Self::Multiply | Self::Divide | Self::Modulus => 2,
        }
    }
}

// === LITERALS ===

/// Literal values (EBNF: literal)
///
/// Numbers keep their source text; conversion to machine values belongs to
/// whoever evaluates the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LiteralValue {
    Integer(String),
    Float(String),
    /// Arbitrary-precision decimal, text includes the `m` suffix
    Numeric(String),
    /// Decoded string content, quotes removed and `''` collapsed
    String(String),
    Boolean(bool),
}

impl LiteralValue {
    /// Literal for a literal-kind token, `None` for any other kind
    pub fn from_token(token: &Token) -> Option<Self> {
        let value = match token.kind {
            TokenKind::IntegerLiteral => Self::Integer(token.lexeme.clone()),
            TokenKind::FloatLiteral => Self::Float(token.lexeme.clone()),
            TokenKind::NumericLiteral => Self::Numeric(token.lexeme.clone()),
            TokenKind::StringLiteral => Self::String(decode_string_literal(&token.lexeme)),
            TokenKind::BooleanLiteral => Self::Boolean(token.lexeme == "TRUE"),
            _ => return None,
        };
        Some(value)
    }

    pub fn integer(text: impl Into<String>) -> Self {
        Self::Integer(text.into())
    }

    pub fn float(text: impl Into<String>) -> Self {
        Self::Float(text.into())
    }

    pub fn numeric(text: impl Into<String>) -> Self {
        Self::Numeric(text.into())
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    pub fn boolean(value: bool) -> Self {
        Self::Boolean(value)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Numeric(_) => "numeric",
            Self::String(_) => "string",
            Self::Boolean(_) => "boolean",
        }
    }
}

// === EXPRESSIONS AND STATEMENTS ===

/// EBNF: expression ::= additive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    Literal(LiteralValue),
    BinaryOp {
        left: Box<Expression>,
        operator: BinaryOperator,
        right: Box<Expression>,
    },
}

impl Expression {
    pub fn literal(value: LiteralValue) -> Self {
        Self::Literal(value)
    }

    pub fn binary(left: Expression, operator: BinaryOperator, right: Expression) -> Self {
        Self::BinaryOp {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        }
    }

    /// Nesting depth; a literal has depth 1
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1)];

        while let Some((expression, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            if let Self::BinaryOp { left, right, .. } = expression {
                pending.push((&**left, depth + 1));
                pending.push((&**right, depth + 1));
            }
        }

        deepest
    }

    /// Move both operands out, leaving cheap literals behind
    fn take_operands(&mut self) -> Option<(Expression, Expression)> {
        match self {
            Self::Literal(_) => None,
            Self::BinaryOp { left, right, .. } => Some((
                std::mem::replace(left.as_mut(), Self::placeholder()),
                std::mem::replace(right.as_mut(), Self::placeholder()),
            )),
        }
    }

    fn placeholder() -> Self {
        Self::Literal(LiteralValue::Boolean(false))
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }
}

// Left-associative chains grow a spine as long as the chain, so the tree
// is torn down with an explicit stack instead of one frame per node.
impl Drop for Expression {
    fn drop(&mut self) {
        if let Self::BinaryOp { left, right, .. } = self {
            if left.is_literal() && right.is_literal() {
                return;
            }
        }
        let Some((left, right)) = self.take_operands() else {
            return;
        };

        let mut pending = vec![left, right];
        while let Some(mut expression) = pending.pop() {
            if let Some((left, right)) = expression.take_operands() {
                pending.push(left);
                pending.push(right);
            }
        }
    }
}

/// EBNF: statement ::= expression | ECHO expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    #[serde(rename = "ExpressionStatement")]
    Expression(Expression),
    #[serde(rename = "EchoStatement")]
    Echo(Expression),
}

impl Statement {
    pub fn expression(&self) -> &Expression {
        match self {
            Self::Expression(expression) | Self::Echo(expression) => expression,
        }
    }

    pub fn is_echo(&self) -> bool {
        matches!(self, Self::Echo(_))
    }
}

/// Root node
/// EBNF: program ::= statement (SEMICOLON statement)* EOF
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Statement> {
        self.statements.iter()
    }
}

// === DISPLAY IMPLEMENTATIONS ===
// S-expression form: `(+ 2 (* 3 4))`, `(echo 'it''s')`

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(text) | Self::Float(text) | Self::Numeric(text) => write!(f, "{}", text),
            Self::String(value) => write!(f, "'{}'", value.replace('\'', "''")),
            Self::Boolean(true) => write!(f, "TRUE"),
            Self::Boolean(false) => write!(f, "FALSE"),
        }
    }
}

enum Piece<'a> {
    Node(&'a Expression),
    Text(&'static str),
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pending = vec![Piece::Node(self)];

        while let Some(piece) = pending.pop() {
            match piece {
                Piece::Text(text) => f.write_str(text)?,
                Piece::Node(Self::Literal(value)) => write!(f, "{}", value)?,
                Piece::Node(Self::BinaryOp {
                    left,
                    operator,
                    right,
                }) => {
                    write!(f, "({} ", operator)?;
                    pending.push(Piece::Text(")"));
                    pending.push(Piece::Node(right));
                    pending.push(Piece::Text(" "));
                    pending.push(Piece::Node(left));
                }
            }
        }

        Ok(())
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expression(expression) => write!(f, "{}", expression),
            Self::Echo(expression) => write!(f, "(echo {})", expression),
        }
    }
}

/// One statement per line
impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            writeln!(f, "{}", statement)?;
        }
        Ok(())
    }
}
