//! Read-only traversal over the AST
//!
//! Override the `visit_*` methods of interest; the defaults call the
//! matching `walk_*` function, which recurses into owned children in source
//! order. An override that still wants the children visited calls the walk
//! function itself.

use super::nodes::{BinaryOperator, Expression, LiteralValue, Program, Statement};

pub trait Visitor {
    fn visit_program(&mut self, program: &Program) {
        walk_program(self, program);
    }

    fn visit_statement(&mut self, statement: &Statement) {
        walk_statement(self, statement);
    }

    fn visit_expression(&mut self, expression: &Expression) {
        walk_expression(self, expression);
    }

    fn visit_binary_op(&mut self, left: &Expression, operator: BinaryOperator, right: &Expression) {
        walk_binary_op(self, left, operator, right);
    }

    fn visit_literal(&mut self, _literal: &LiteralValue) {}
}

pub fn walk_program<V: Visitor + ?Sized>(visitor: &mut V, program: &Program) {
    for statement in &program.statements {
        visitor.visit_statement(statement);
    }
}

pub fn walk_statement<V: Visitor + ?Sized>(visitor: &mut V, statement: &Statement) {
    visitor.visit_expression(statement.expression());
}

pub fn walk_expression<V: Visitor + ?Sized>(visitor: &mut V, expression: &Expression) {
    match expression {
        Expression::Literal(literal) => visitor.visit_literal(literal),
        Expression::BinaryOp {
            left,
            operator,
            right,
        } => visitor.visit_binary_op(left, *operator, right),
    }
}

pub fn walk_binary_op<V: Visitor + ?Sized>(
    visitor: &mut V,
    left: &Expression,
    _operator: BinaryOperator,
    right: &Expression,
) {
    visitor.visit_expression(left);
    visitor.visit_expression(right);
}
