//! JSON shapes printed by the binary

use super::PipelineResult;
use crate::diagnostics::Diagnostic;
use crate::grammar::ast::Program;
use crate::tokens::Token;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct PipelineOutput<'a> {
    pub program: &'a Program,
    pub diagnostics: &'a [Diagnostic],
    pub complete: bool,
}

impl<'a> PipelineOutput<'a> {
    pub fn new(result: &'a PipelineResult) -> Self {
        Self {
            program: &result.output.program,
            diagnostics: &result.output.diagnostics,
            complete: result.output.complete,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// One token as printed by `--tokens --json`
#[derive(Debug, Serialize)]
pub struct TokenOutput<'a> {
    pub kind: &'static str,
    pub text: &'a str,
    pub line: u32,
    pub column: u32,
    pub hidden: bool,
}

impl<'a> From<&'a Token> for TokenOutput<'a> {
    fn from(token: &'a Token) -> Self {
        Self {
            kind: token.kind.symbolic_name(),
            text: &token.lexeme,
            line: token.span.start.line,
            column: token.span.start.column,
            hidden: token.is_hidden(),
        }
    }
}

/// EOF is never listed; hidden tokens only when asked for
pub fn token_listing(tokens: &[Token], include_hidden: bool) -> Vec<TokenOutput<'_>> {
    tokens
        .iter()
        .filter(|t| !t.is_eof() && (include_hidden || !t.is_hidden()))
        .map(TokenOutput::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical;

    #[test]
    fn test_token_listing_filters() {
        let tokens = lexical::tokenize("1 /* c */ + 2").unwrap().tokens;

        let visible = token_listing(&tokens, false);
        let kinds: Vec<_> = visible.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec!["INTEGER_LITERAL", "PLUS", "INTEGER_LITERAL"]);

        let all = token_listing(&tokens, true);
        let text: String = all.iter().map(|t| t.text).collect();
        assert_eq!(text, "1 /* c */ + 2");
        assert!(all.iter().any(|t| t.hidden));
    }
}
