//! Abstract syntax tree for QueryCat scripts

pub mod nodes;
pub mod visitor;

pub use nodes::{BinaryOperator, Expression, LiteralValue, Program, Statement};
pub use visitor::{walk_binary_op, walk_expression, walk_program, walk_statement, Visitor};
