//! Lexical and syntax diagnostics
//!
//! Diagnostics are plain records collected by the lexer and parser and handed
//! back alongside their output. They are never printed by the library itself;
//! rendering against the source is the caller's choice.

use crate::logging::codes::{self, Code, Severity};
use crate::tokens::TokenKind;
use crate::utils::{SourceMap, Span};
use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosticKind {
    Lexical,
    Syntax,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub code: Code,
    pub message: String,
    /// Byte offset of the offending text
    pub offset: usize,
    pub span: Span,
    /// Tokens that would have been accepted; empty for lexical diagnostics
    #[serde(serialize_with = "serialize_kinds")]
    pub expected: Vec<TokenKind>,
}

fn serialize_kinds<S: Serializer>(kinds: &[TokenKind], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(kinds.iter().map(|k| k.symbolic_name()))
}

impl Diagnostic {
    pub fn lexical(code: Code, message: impl Into<String>, span: Span) -> Self {
        Self {
            kind: DiagnosticKind::Lexical,
            code,
            message: message.into(),
            offset: span.start.offset,
            span,
            expected: Vec::new(),
        }
    }

    pub fn syntax(code: Code, message: impl Into<String>, span: Span) -> Self {
        Self {
            kind: DiagnosticKind::Syntax,
            code,
            message: message.into(),
            offset: span.start.offset,
            span,
            expected: Vec::new(),
        }
    }

    pub fn with_expected(mut self, expected: &[TokenKind]) -> Self {
        self.expected = expected.to_vec();
        self
    }

    pub fn is_lexical(&self) -> bool {
        self.kind == DiagnosticKind::Lexical
    }

    pub fn is_syntax(&self) -> bool {
        self.kind == DiagnosticKind::Syntax
    }

    /// Whether this diagnostic ended the parse
    pub fn is_fatal(&self) -> bool {
        !codes::is_recoverable(self.code.as_str())
    }

    pub fn severity(&self) -> Severity {
        codes::get_severity(self.code.as_str())
    }

    /// Expected set in `{';', <EOF>}` form, or `None` if empty
    pub fn expected_description(&self) -> Option<String> {
        (!self.expected.is_empty()).then(|| describe_kinds(&self.expected))
    }

    /// First line of the rendered form: `error[E042]: message`
    pub fn header(&self) -> String {
        format!("error[{}]: {}", self.code, self.message)
    }

    /// Compiler-style rendering with the offending source line underlined
    pub fn render(&self, source_map: &SourceMap) -> String {
        let mut rendered = source_map.format_error(&self.span, &self.header());
        if let Some(expected) = self.expected_description() {
            rendered.push_str(&format!("  = expected: {}\n", expected));
        }
        let action = codes::get_action(self.code.as_str());
        if action != "No specific action available" {
            rendered.push_str(&format!("  = help: {}\n", action));
        }
        rendered
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}",
            self.span.start.line,
            self.span.start.column,
            self.header()
        )
    }
}

/// A single kind as its display name, several as `{'+', ';', <EOF>}`
pub fn describe_kinds(kinds: &[TokenKind]) -> String {
    match kinds {
        [single] => single.display_name(),
        many => format!(
            "{{{}}}",
            many.iter()
                .map(|k| k.display_name())
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

/// Render every diagnostic in order, separated by blank lines
pub fn render_all(diagnostics: &[Diagnostic], source_map: &SourceMap) -> String {
    diagnostics
        .iter()
        .map(|d| d.render(source_map))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Position;

    fn span_at(offset: usize, len: usize) -> Span {
        let start = Position::new(offset, 1, offset as u32 + 1);
        let end = Position::new(offset + len, 1, (offset + len) as u32 + 1);
        Span::new(start, end)
    }

    #[test]
    fn test_expected_description() {
        let d = Diagnostic::syntax(codes::syntax::EXTRANEOUS_INPUT, "extraneous input", span_at(2, 1));
        assert_eq!(d.expected_description(), None);

        let d = d.with_expected(&[TokenKind::Semicolon]);
        assert_eq!(d.expected_description().as_deref(), Some("';'"));

        let d = d.with_expected(&[TokenKind::Semicolon, TokenKind::Eof]);
        assert_eq!(d.expected_description().as_deref(), Some("{';', <EOF>}"));
    }

    #[test]
    fn test_render() {
        let source_map = SourceMap::new("1 2".to_string());
        let d = Diagnostic::syntax(
            codes::syntax::MISSING_TOKEN,
            "missing ';' at '2'",
            span_at(2, 1),
        )
        .with_expected(&[TokenKind::Semicolon]);

        let rendered = d.render(&source_map);
        assert!(rendered.starts_with("error[E043]: missing ';' at '2'\n  --> 1:3\n"));
        assert!(rendered.contains("1 | 1 2\n"));
        assert!(rendered.contains("= expected: ';'"));
        assert!(rendered.contains("= help: Insert the missing token"));
    }

    #[test]
    fn test_fatality_follows_registry() {
        let premature = Diagnostic::syntax(codes::syntax::PREMATURE_END_OF_INPUT, "eof", span_at(0, 0));
        let extraneous = Diagnostic::syntax(codes::syntax::EXTRANEOUS_INPUT, "x", span_at(0, 1));
        assert!(premature.is_fatal());
        assert!(!extraneous.is_fatal());
        assert!(extraneous.is_syntax());
    }

    #[test]
    fn test_json_shape() {
        let d = Diagnostic::lexical(codes::lexical::UNRECOGNIZED_CHARACTER, "token recognition error at: '@'", span_at(4, 1));
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["kind"], "Lexical");
        assert_eq!(json["code"], "E020");
        assert_eq!(json["offset"], 4);
        assert_eq!(json["expected"], serde_json::json!([]));

        let d = d.with_expected(&[TokenKind::Eof]);
        assert_eq!(serde_json::to_value(&d).unwrap()["expected"], serde_json::json!(["EOF"]));
    }

    #[test]
    fn test_display() {
        let d = Diagnostic::lexical(codes::lexical::UNTERMINATED_STRING, "unterminated string literal", span_at(0, 4));
        assert_eq!(d.to_string(), "1:1: error[E021]: unterminated string literal");
    }
}
