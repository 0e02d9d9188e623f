//! Recursive-descent parser with precedence climbing for expressions
//!
//! ```text
//! program        := statement (SEMICOLON statement)* EOF
//! statement      := expression | ECHO expression
//! expression     := additive
//! additive       := multiplicative ((PLUS | MINUS) multiplicative)*
//! multiplicative := literal ((STAR | DIV | MOD) literal)*
//! literal        := INTEGER_LITERAL | FLOAT_LITERAL | NUMERIC_LITERAL
//!                 | STRING_LITERAL | BOOLEAN_LITERAL
//! ```
//!
//! Failures never unwind the whole parse on their own: each failure point
//! asks [`recovery::decide`] what to do, records a diagnostic, and carries
//! on. Only premature end of input and the configured limits stop the parse.

use crate::config::runtime::ParserPreferences;
use crate::diagnostics::{describe_kinds, Diagnostic};
use crate::grammar::ast::{BinaryOperator, Expression, LiteralValue, Program, Statement};
use crate::grammar::keywords::Keyword;
use crate::logging::{codes, Code};
use crate::syntax::recovery::{
    self, RecoveryAction, RecoveryContext, AFTER_OPERAND, LITERAL_START, STATEMENT_START, SYNC_SET,
};
use crate::tokens::{TokenKind, TokenStream};
use crate::utils::Span;
use crate::{log_debug, log_error, log_success};
use serde::Serialize;

/// Program plus every diagnostic produced on the way
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseOutput {
    /// Statements completed before any fatal error
    pub program: Program,
    /// Lexical and syntax diagnostics ordered by offset
    pub diagnostics: Vec<Diagnostic>,
    /// False when a fatal error stopped the parse
    pub complete: bool,
}

impl ParseOutput {
    pub fn is_success(&self) -> bool {
        self.complete && self.diagnostics.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn first_error(&self) -> Option<&Diagnostic> {
        self.diagnostics.first()
    }

    pub fn lexical_diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_lexical())
    }

    pub fn syntax_diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_syntax())
    }

    /// Fold tokenizer diagnostics in, keeping offset order. At equal offsets
    /// the lexical diagnostic comes first.
    pub(crate) fn with_lexical_diagnostics(mut self, lexical: Vec<Diagnostic>) -> Self {
        let mut merged = lexical;
        merged.append(&mut self.diagnostics);
        merged.sort_by_key(|d| d.offset);
        self.diagnostics = merged;
        self
    }
}

/// Why a grammar procedure stopped early
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interrupt {
    /// Drop the current statement and skip to `;` or EOF
    Resynchronize,
    /// Stop parsing altogether
    Fatal,
}

type Step<T> = Result<T, Interrupt>;

pub struct QueryParser {
    tokens: TokenStream,
    preferences: ParserPreferences,
    diagnostics: Vec<Diagnostic>,
}

impl QueryParser {
    pub fn new(tokens: TokenStream) -> Self {
        Self::with_preferences(tokens, ParserPreferences::default())
    }

    pub fn with_preferences(tokens: TokenStream, preferences: ParserPreferences) -> Self {
        log_debug!("Creating query parser",
            "tokens" => tokens.len(),
            "max_expression_depth" => preferences.max_expression_depth
        );

        Self {
            tokens,
            preferences,
            diagnostics: Vec::new(),
        }
    }

    /// Parse the whole stream. Syntax diagnostics only; the caller merges
    /// in lexical ones.
    pub fn parse_program(mut self) -> ParseOutput {
        let mut statements = Vec::new();
        let complete = self.parse_statements(&mut statements).is_ok();

        if complete && self.diagnostics.is_empty() {
            log_success!(codes::success::AST_CONSTRUCTION_COMPLETE, "Parsing completed",
                "statements" => statements.len()
            );
        } else {
            log_debug!("Parsing finished with errors",
                "statements" => statements.len(),
                "diagnostics" => self.diagnostics.len(),
                "complete" => complete
            );
        }

        ParseOutput {
            program: Program::new(statements),
            diagnostics: self.diagnostics,
            complete,
        }
    }

    // program := statement (SEMICOLON statement)* EOF
    fn parse_statements(&mut self, statements: &mut Vec<Statement>) -> Step<()> {
        loop {
            match self.parse_statement() {
                Ok(statement) => statements.push(statement),
                Err(Interrupt::Resynchronize) => {
                    self.tokens.skip_until(SYNC_SET);
                }
                Err(Interrupt::Fatal) => return Err(Interrupt::Fatal),
            }

            if !self.finish_statement()? {
                return Ok(());
            }
        }
    }

    /// Consume what follows a statement; true if another statement follows
    fn finish_statement(&mut self) -> Step<bool> {
        loop {
            match self.tokens.current_kind() {
                TokenKind::Eof => return Ok(false),
                TokenKind::Semicolon => {
                    self.tokens.advance();
                    return Ok(true);
                }
                found => {
                    let context = RecoveryContext {
                        found,
                        next: self.tokens.peek().kind,
                        expected: AFTER_OPERAND,
                        insertable: Some((TokenKind::Semicolon, STATEMENT_START)),
                    };
                    match self.recover(&context, codes::syntax::UNEXPECTED_TOKEN)? {
                        RecoveryAction::DeleteToken => {}
                        RecoveryAction::InsertMissing(_) => return Ok(true),
                        RecoveryAction::Resynchronize => {
                            self.tokens.skip_until(SYNC_SET);
                        }
                        RecoveryAction::Abort => return Err(Interrupt::Fatal),
                    }
                }
            }
        }
    }

    // statement := expression | ECHO expression
    fn parse_statement(&mut self) -> Step<Statement> {
        loop {
            match self.tokens.current_kind() {
                TokenKind::Keyword(Keyword::Echo) => {
                    self.tokens.advance();
                    return Ok(Statement::Echo(self.parse_expression()?));
                }
                kind if kind.is_literal() => {
                    return Ok(Statement::Expression(self.parse_expression()?));
                }
                found => {
                    let context = RecoveryContext {
                        found,
                        next: self.tokens.peek().kind,
                        expected: STATEMENT_START,
                        insertable: None,
                    };
                    match self.recover(&context, codes::syntax::NO_VIABLE_ALTERNATIVE)? {
                        RecoveryAction::DeleteToken => {}
                        _ => return Err(Interrupt::Resynchronize),
                    }
                }
            }
        }
    }

    // expression := additive
    fn parse_expression(&mut self) -> Step<Expression> {
        self.parse_binary(1, 1)
    }

    /// Precedence climbing: fold every operator binding at least
    /// `min_precedence`, parsing right operands one level higher so equal
    /// precedence associates to the left.
    ///
    /// `nesting` counts active `parse_binary` calls. Operators folded by
    /// the loop do not nest, so a long left-associative chain stays at the
    /// level it started on.
    fn parse_binary(&mut self, min_precedence: u8, nesting: usize) -> Step<Expression> {
        let mut left = self.parse_literal()?;

        while let Some(operator) = BinaryOperator::from_token_kind(self.tokens.current_kind()) {
            if operator.precedence() < min_precedence {
                break;
            }
            let operator_span = self.tokens.advance().span;

            if nesting >= self.preferences.max_expression_depth {
                let message = format!(
                    "expression nesting exceeds maximum depth of {}",
                    self.preferences.max_expression_depth
                );
                self.report(codes::syntax::MAX_EXPRESSION_DEPTH, message, operator_span, &[])?;
                return Err(Interrupt::Fatal);
            }
            let right = self.parse_binary(operator.precedence() + 1, nesting + 1)?;

            left = Expression::binary(left, operator, right);
        }

        Ok(left)
    }

    // literal := INTEGER_LITERAL | FLOAT_LITERAL | NUMERIC_LITERAL | STRING_LITERAL | BOOLEAN_LITERAL
    fn parse_literal(&mut self) -> Step<Expression> {
        loop {
            let current = self.tokens.current();
            if let Some(value) = LiteralValue::from_token(current) {
                self.tokens.advance();
                return Ok(Expression::Literal(value));
            }

            let context = RecoveryContext {
                found: current.kind,
                next: self.tokens.peek().kind,
                expected: LITERAL_START,
                insertable: None,
            };
            match self.recover(&context, codes::syntax::UNEXPECTED_TOKEN)? {
                RecoveryAction::DeleteToken => {}
                _ => return Err(Interrupt::Resynchronize),
            }
        }
    }

    /// Apply the recovery policy at the current token and report it.
    /// `mismatch_code` is used when the decision is to resynchronize.
    fn recover(&mut self, context: &RecoveryContext<'_>, mismatch_code: Code) -> Step<RecoveryAction> {
        let action = recovery::decide(context);
        let found = self.tokens.current().describe();
        let span = self.tokens.current_span();

        if self.preferences.log_recovery_actions {
            log_debug!("Recovery decision",
                "action" => action.as_str(),
                "found" => found,
                "offset" => span.start.offset
            );
        }

        match action {
            RecoveryAction::DeleteToken => {
                let message = format!(
                    "extraneous input {} expecting {}",
                    found,
                    describe_kinds(context.expected)
                );
                self.report(codes::syntax::EXTRANEOUS_INPUT, message, span, context.expected)?;
                self.tokens.advance();
            }
            RecoveryAction::InsertMissing(kind) => {
                let message = format!("missing {} at {}", kind.display_name(), found);
                self.report(codes::syntax::MISSING_TOKEN, message, span, &[kind])?;
            }
            RecoveryAction::Resynchronize => {
                let message = if mismatch_code == codes::syntax::NO_VIABLE_ALTERNATIVE {
                    format!("no viable alternative at input {}", found)
                } else {
                    format!(
                        "mismatched input {} expecting {}",
                        found,
                        describe_kinds(context.expected)
                    )
                };
                self.report(mismatch_code, message, span, context.expected)?;
            }
            RecoveryAction::Abort => {
                let message = format!(
                    "mismatched input {} expecting {}",
                    found,
                    describe_kinds(context.expected)
                );
                self.report(codes::syntax::PREMATURE_END_OF_INPUT, message, span, context.expected)?;
                return Err(Interrupt::Fatal);
            }
        }

        Ok(action)
    }

    /// Record a syntax diagnostic; fails once the diagnostic limit is reached
    fn report(&mut self, code: Code, message: String, span: Span, expected: &[TokenKind]) -> Step<()> {
        log_error!(code, &message, span = span);
        self.diagnostics
            .push(Diagnostic::syntax(code, message, span).with_expected(expected));

        if self.diagnostics.len() >= self.preferences.max_diagnostics
            && codes::is_recoverable(code.as_str())
        {
            let message = format!(
                "too many syntax errors ({}); parsing stopped",
                self.diagnostics.len()
            );
            log_error!(codes::syntax::TOO_MANY_DIAGNOSTICS, &message, span = span);
            self.diagnostics.push(Diagnostic::syntax(
                codes::syntax::TOO_MANY_DIAGNOSTICS,
                message,
                span,
            ));
            return Err(Interrupt::Fatal);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::runtime::LexicalPreferences;
    use crate::syntax::{parse, parse_with_preferences};

    fn int(text: &str) -> Expression {
        Expression::literal(LiteralValue::integer(text))
    }

    fn parse_ok(text: &str) -> Program {
        let output = parse(text).unwrap();
        assert!(output.is_success(), "{:?}", output.diagnostics);
        output.program
    }

    fn codes_of(output: &ParseOutput) -> Vec<Code> {
        output.diagnostics.iter().map(|d| d.code).collect()
    }

    fn with_parser(preferences: ParserPreferences, text: &str) -> ParseOutput {
        parse_with_preferences(text, LexicalPreferences::default(), preferences).unwrap()
    }

    #[test]
    fn test_multiplicative_binds_tighter() {
        let program = parse_ok("2+3*4");
        let expected = Expression::binary(
            int("2"),
            BinaryOperator::Add,
            Expression::binary(int("3"), BinaryOperator::Multiply, int("4")),
        );
        assert_eq!(program.statements, vec![Statement::Expression(expected)]);
    }

    #[test]
    fn test_left_associativity() {
        let program = parse_ok("1-2-3");
        let expected = Expression::binary(
            Expression::binary(int("1"), BinaryOperator::Subtract, int("2")),
            BinaryOperator::Subtract,
            int("3"),
        );
        assert_eq!(program.statements, vec![Statement::Expression(expected)]);

        let program = parse_ok("8 / 4 % 3 * 2");
        assert_eq!(program.to_string(), "(* (% (/ 8 4) 3) 2)\n");
    }

    #[test]
    fn test_statements_in_order() {
        let program = parse_ok("1;2;3");
        assert_eq!(
            program.statements,
            vec![
                Statement::Expression(int("1")),
                Statement::Expression(int("2")),
                Statement::Expression(int("3")),
            ]
        );
    }

    #[test]
    fn test_echo_statement() {
        let program = parse_ok("ECHO 1+1");
        assert_eq!(
            program.statements,
            vec![Statement::Echo(Expression::binary(int("1"), BinaryOperator::Add, int("1")))]
        );
    }

    #[test]
    fn test_comments_never_reach_the_tree() {
        let plain = parse_ok("1");
        assert_eq!(parse_ok("# comment\n1"), plain);
        assert_eq!(parse_ok("/* c */ 1"), plain);
        assert_eq!(plain.statements, vec![Statement::Expression(int("1"))]);
    }

    #[test]
    fn test_literal_kinds() {
        let program = parse_ok("1.5m; 1.5; 'it''s'; TRUE; 0x1F");
        assert_eq!(
            program.statements,
            vec![
                Statement::Expression(Expression::literal(LiteralValue::numeric("1.5m"))),
                Statement::Expression(Expression::literal(LiteralValue::float("1.5"))),
                Statement::Expression(Expression::literal(LiteralValue::string("it's"))),
                Statement::Expression(Expression::literal(LiteralValue::boolean(true))),
                Statement::Expression(Expression::literal(LiteralValue::float("0x1F"))),
            ]
        );
    }

    #[test]
    fn test_unterminated_string_does_not_crash() {
        let output = parse("'abc").unwrap();
        assert_eq!(output.diagnostics[0].code, codes::lexical::UNTERMINATED_STRING);
        assert!(output.diagnostics[0].is_lexical());
        assert!(output.program.is_empty());
        assert!(!output.complete);
    }

    #[test]
    fn test_trailing_separator_is_premature_end() {
        let output = parse("1;").unwrap();
        assert_eq!(codes_of(&output), vec![codes::syntax::PREMATURE_END_OF_INPUT]);
        assert!(!output.complete);
        assert_eq!(output.program.statements, vec![Statement::Expression(int("1"))]);
        assert_eq!(output.diagnostics[0].expected, STATEMENT_START);
    }

    #[test]
    fn test_incomplete_statement_is_dropped() {
        let output = parse("1; 2 +").unwrap();
        assert_eq!(codes_of(&output), vec![codes::syntax::PREMATURE_END_OF_INPUT]);
        assert_eq!(output.program.len(), 1);
        assert!(!output.complete);

        let output = parse("ECHO").unwrap();
        assert!(output.program.is_empty());
        assert!(!output.complete);
    }

    #[test]
    fn test_empty_input_reports_error() {
        for text in ["", "   ", "# only a comment"] {
            let output = parse(text).unwrap();
            assert!(output.program.is_empty());
            assert_eq!(codes_of(&output), vec![codes::syntax::PREMATURE_END_OF_INPUT]);
        }
    }

    #[test]
    fn test_single_token_deletion() {
        let output = parse("1 2;3").unwrap();
        assert_eq!(codes_of(&output), vec![codes::syntax::EXTRANEOUS_INPUT]);
        assert_eq!(output.program.len(), 2);
        assert!(output.complete);

        let diagnostic = &output.diagnostics[0];
        assert_eq!(diagnostic.offset, 2);
        assert_eq!(diagnostic.expected, AFTER_OPERAND);
        assert_eq!(
            diagnostic.message,
            "extraneous input '2' expecting {'+', '-', '*', '/', '%', ';', <EOF>}"
        );

        // Deletion applies whenever the token after the offender is acceptable
        let output = parse("1 2").unwrap();
        assert_eq!(codes_of(&output), vec![codes::syntax::EXTRANEOUS_INPUT]);
        assert_eq!(output.program.len(), 1);
    }

    #[test]
    fn test_missing_separator_insertion() {
        let output = parse("1 ECHO 2").unwrap();
        assert_eq!(codes_of(&output), vec![codes::syntax::MISSING_TOKEN]);
        assert_eq!(output.diagnostics[0].message, "missing ';' at 'ECHO'");
        assert_eq!(
            output.program.statements,
            vec![Statement::Expression(int("1")), Statement::Echo(int("2"))]
        );
        assert!(output.complete);
    }

    #[test]
    fn test_deletion_inside_expression() {
        let output = parse("1 + ) 2").unwrap();
        assert_eq!(codes_of(&output), vec![codes::syntax::EXTRANEOUS_INPUT]);
        assert_eq!(output.program.to_string(), "(+ 1 2)\n");
    }

    #[test]
    fn test_resynchronize_keeps_later_statements() {
        let output = parse("x y; 2").unwrap();
        assert_eq!(codes_of(&output), vec![codes::syntax::NO_VIABLE_ALTERNATIVE]);
        assert_eq!(output.diagnostics[0].message, "no viable alternative at input 'x'");
        assert_eq!(output.program.statements, vec![Statement::Expression(int("2"))]);
        assert!(output.complete);

        let output = parse("1 ) ); 2").unwrap();
        assert_eq!(codes_of(&output), vec![codes::syntax::UNEXPECTED_TOKEN]);
        assert_eq!(output.program.len(), 2);
    }

    #[test]
    fn test_error_tokens_are_not_reported_twice() {
        let output = parse("1 @; 2").unwrap();
        assert_eq!(codes_of(&output), vec![codes::lexical::UNRECOGNIZED_CHARACTER]);
        assert_eq!(output.program.len(), 2);
        assert!(output.complete);
    }

    #[test]
    fn test_diagnostics_are_ordered_by_offset() {
        let output = parse("1 2 @").unwrap();
        assert_eq!(
            codes_of(&output),
            vec![codes::syntax::EXTRANEOUS_INPUT, codes::lexical::UNRECOGNIZED_CHARACTER]
        );
        assert_eq!(output.lexical_diagnostics().count(), 1);
        assert_eq!(output.syntax_diagnostics().count(), 1);
    }

    #[test]
    fn test_expression_depth_limit_is_fatal() {
        let preferences = ParserPreferences {
            max_expression_depth: 2,
            ..Default::default()
        };
        assert!(with_parser(preferences.clone(), "1+2+3+4+5").is_success());
        assert!(with_parser(preferences.clone(), "1*2*3+4").is_success());

        // The right operand of `+` nests once, the right operand of `*` inside it twice
        let output = with_parser(preferences, "0; 1+2; 1+2*3");
        assert_eq!(codes_of(&output), vec![codes::syntax::MAX_EXPRESSION_DEPTH]);
        assert_eq!(output.diagnostics[0].offset, 11);
        assert!(!output.complete);
        assert_eq!(output.program.len(), 2);
    }

    #[test]
    fn test_long_chains_are_not_limited_by_length() {
        let text = vec!["1"; 10_000].join("+");
        let output = parse(&text).unwrap();
        assert!(output.is_success(), "{:?}", output.diagnostics);
        assert_eq!(output.program.len(), 1);
        assert_eq!(output.program.statements[0].expression().depth(), 10_000);

        let text = vec!["2"; 10_000].join(" * ");
        let output = with_parser(
            ParserPreferences {
                max_expression_depth: 2,
                ..Default::default()
            },
            &format!("ECHO {}", text),
        );
        assert!(output.is_success(), "{:?}", output.diagnostics);
    }

    #[test]
    fn test_diagnostic_limit_stops_parse() {
        let preferences = ParserPreferences {
            max_diagnostics: 2,
            ..Default::default()
        };
        let output = with_parser(preferences, "1 ) ;2 ) ;3 ) ;4");
        assert_eq!(
            codes_of(&output),
            vec![
                codes::syntax::EXTRANEOUS_INPUT,
                codes::syntax::EXTRANEOUS_INPUT,
                codes::syntax::TOO_MANY_DIAGNOSTICS
            ]
        );
        assert!(!output.complete);
        assert_eq!(output.program.len(), 2);
    }

    #[test]
    fn test_fatal_diagnostics_are_flagged() {
        let output = parse("1 2; 3;").unwrap();
        assert!(!output.diagnostics[0].is_fatal());
        assert!(output.diagnostics[1].is_fatal());
    }
}
